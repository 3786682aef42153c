//! Tokenizing of typed answers.

use crate::error::QuizError;

fn is_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

/// Split `s` on runs of commas and/or whitespace and parse every token as
/// an integer. A trailing separator run is ignored, but a leading one
/// produces an empty token that fails to parse, naming the token. The empty
/// string yields an empty list, which callers treat as "nothing submitted".
pub fn parse_int_list(s: &str) -> Result<Vec<i64>, QuizError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens: Vec<&str> = Vec::new();
    let mut start = 0;
    let mut in_separator = false;

    for (i, c) in s.char_indices() {
        if is_separator(c) {
            if !in_separator {
                tokens.push(&s[start..i]);
                in_separator = true;
            }
        } else if in_separator {
            start = i;
            in_separator = false;
        }
    }
    if !in_separator {
        tokens.push(&s[start..]);
    }

    tokens
        .into_iter()
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| QuizError::InvalidInputToken(token.to_string()))
        })
        .collect()
}
