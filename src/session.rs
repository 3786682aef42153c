//! The quiz session state machine.
//!
//! A session is created by `Session::start` (the NotStarted -> Active
//! transition; NotStarted itself is simply the absence of a `Session`) and
//! mutated by `submit` until the pool of numbers is exhausted, at which
//! point it is Finished and further submissions are ignored. All state is
//! owned by the session, so sequential and concurrent sessions are
//! independent.

use crate::distribution::Distribution;
use crate::error::QuizError;
use crate::factor::factor;
use crate::partition::get_group;
use crate::verify::verify;
use std::collections::HashMap;

/// Mastery level per number, supplied by the progress store.
pub type LevelMap = HashMap<u32, u32>;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub max_num: u32,
    pub num_groups: u32,
    /// 0-indexed; the CLI converts from the human's 1-indexed view.
    pub group_num: u32,
    pub ignore_levels: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_num: 100,
            num_groups: 10,
            group_num: 0,
            ignore_levels: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Presented {
    number: u32,
    factor_count: usize,
    /// Cleared on the first incorrect answer and never reset, so at most
    /// one Correct outcome per number carries `first_try: true`.
    first_try: bool,
}

/// What a single submission did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Empty submission, or the session was already finished.
    Ignored,
    /// The answer was right; the session has advanced (check `is_finished`).
    Correct { number: u32, first_try: bool },
    /// The answer was wrong; the same number stays presented.
    Incorrect { number: u32 },
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    remaining: Distribution,
    initial_count: usize,
    error_count: u32,
    current: Option<Presented>,
}

impl Session {
    /// Build the group's member pool, weight it, and present the first
    /// number. `levels` must cover every member when weighting applies;
    /// pass None when no user is tracked (every weight is then 1.0, as
    /// with `ignore_levels`).
    pub fn start(config: SessionConfig, levels: Option<&LevelMap>) -> Result<Self, QuizError> {
        let members = get_group(config.group_num, config.num_groups, config.max_num)?;

        let mut remaining = Distribution::new();
        for &number in &members {
            let weight = if config.ignore_levels {
                1.0
            } else {
                match levels {
                    Some(map) => {
                        let level = *map
                            .get(&number)
                            .ok_or(QuizError::MissingLevelData(number))?;
                        1.0 / (f64::from(level) + 1.0)
                    }
                    None => 1.0,
                }
            };
            remaining.add(number, weight);
        }

        let mut session = Self {
            config,
            initial_count: remaining.len(),
            remaining,
            error_count: 0,
            current: None,
        };
        session.advance()?;
        Ok(session)
    }

    /// Judge one submission. Drawing the next number happens here on a
    /// correct answer; recording to the progress store is the caller's job,
    /// driven by the returned outcome.
    pub fn submit(&mut self, answer: &[i64]) -> Result<Outcome, QuizError> {
        let Some(presented) = self.current else {
            return Ok(Outcome::Ignored);
        };
        if answer.is_empty() {
            return Ok(Outcome::Ignored);
        }

        if verify(answer, presented.factor_count, i64::from(presented.number)) {
            self.advance()?;
            Ok(Outcome::Correct {
                number: presented.number,
                first_try: presented.first_try,
            })
        } else {
            self.error_count += 1;
            if let Some(presented) = &mut self.current {
                presented.first_try = false;
            }
            Ok(Outcome::Incorrect {
                number: presented.number,
            })
        }
    }

    fn advance(&mut self) -> Result<(), QuizError> {
        self.current = match self.remaining.pop_random() {
            Some(number) => {
                let factors = factor(i64::from(number))?;
                Some(Presented {
                    number,
                    factor_count: factors.len(),
                    first_try: true,
                })
            }
            None => None,
        };
        Ok(())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The pool of numbers not yet presented (excludes the current one).
    pub fn remaining(&self) -> &Distribution {
        &self.remaining
    }

    pub fn initial_count(&self) -> usize {
        self.initial_count
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn current_number(&self) -> Option<u32> {
        self.current.map(|p| p.number)
    }

    pub fn expected_factor_count(&self) -> Option<usize> {
        self.current.map(|p| p.factor_count)
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }
}
