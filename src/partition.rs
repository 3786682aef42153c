//! Deterministic partitioning of the number universe.
//!
//! Every integer in [1, max_num] is assigned to one of `num_groups` groups
//! and one of ten display colors, purely as a function of the integer and
//! the bounds. The assignment is a cheap pseudo-hash built from modular
//! exponentiation with two fixed primes in swapped roles, so the same
//! inputs always land in the same bucket across process runs without any
//! stored lookup table.

use crate::error::QuizError;

const PRIME_1: u64 = 3_759_289;
const PRIME_2: u64 = 8_619_943;

/// Number of entries in the display palette (see `ui::PALETTE`).
pub const NUM_COLORS: u32 = 10;

/// a^b mod n by square-and-multiply, O(log b).
fn mod_exp(a: u64, mut b: u64, n: u64) -> u64 {
    let mut result = 1;
    let mut x = a % n;

    while b > 0 {
        if b % 2 == 1 {
            result = result * x % n;
        }
        b /= 2;
        x = x * x % n;
    }
    result
}

/// Group index of `x` in [0, num_groups).
pub fn group_of(x: u32, num_groups: u32) -> u32 {
    (mod_exp(u64::from(x), PRIME_2, PRIME_1) % u64::from(num_groups)) as u32
}

/// Palette index of `x` in [0, NUM_COLORS).
pub fn color_index_of(x: u32) -> u32 {
    (mod_exp(u64::from(x), PRIME_1, PRIME_2) % u64::from(NUM_COLORS)) as u32
}

/// All members of a group, ascending.
pub fn get_group(group_num: u32, num_groups: u32, max_num: u32) -> Result<Vec<u32>, QuizError> {
    if group_num >= num_groups {
        return Err(QuizError::InvalidGroupNumber {
            group: i64::from(group_num),
            max: num_groups.saturating_sub(1),
        });
    }
    Ok((1..=max_num)
        .filter(|&x| group_of(x, num_groups) == group_num)
        .collect())
}
