//! Shared error type for the quiz engine.
//!
//! Every failure the engine can produce is a variant here so callers can
//! branch on the kind without string matching. All of them are synchronous
//! and surfaced immediately; nothing is retried internally.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Group selection outside the valid range (`max` is the largest legal
    /// value in the caller's indexing). The session stays unstarted.
    #[error("invalid group number {group}, max is {max}")]
    InvalidGroupNumber { group: i64, max: u32 },

    /// A submitted token is not parseable as an integer.
    #[error("invalid response, \"{0}\" is not a number")]
    InvalidInputToken(String),

    /// A sampled number has no entry in the level map. Fatal to session
    /// start, since weighting cannot proceed without it.
    #[error("no mastery level recorded for {0}")]
    MissingLevelData(u32),

    /// Asked to factor a value below 1. The universe is [1, max_num], so
    /// this is an invariant check, not an expected path.
    #[error("cannot factor {0}")]
    DomainError(i64),
}
