//! Prime factorization by trial division.

use crate::error::QuizError;

/// Ascending prime factorization of `x`. By convention the factorization
/// of 1 is `[1]`. Values below 1 are a `DomainError`.
pub fn factor(x: i64) -> Result<Vec<i64>, QuizError> {
    if x < 1 {
        return Err(QuizError::DomainError(x));
    }
    if x == 1 {
        return Ok(vec![1]);
    }

    let mut factors = Vec::new();
    let mut n = x;
    let mut i = 2;

    // Once n has been divided by i, its smallest remaining divisor is >= i,
    // so i never needs to reset.
    while i * i <= n {
        if n % i == 0 {
            factors.push(i);
            n /= i;
        } else {
            i += 1;
        }
    }
    factors.push(n);

    Ok(factors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_one_is_one() {
        assert_eq!(factor(1).unwrap(), vec![1]);
    }

    #[test]
    fn factor_known_values() {
        assert_eq!(factor(12).unwrap(), vec![2, 2, 3]);
        assert_eq!(factor(97).unwrap(), vec![97]);
        assert_eq!(factor(2).unwrap(), vec![2]);
        assert_eq!(factor(100).unwrap(), vec![2, 2, 5, 5]);
        assert_eq!(factor(1024).unwrap(), vec![2; 10]);
    }

    #[test]
    fn factor_rejects_values_below_one() {
        assert_eq!(factor(0), Err(QuizError::DomainError(0)));
        assert_eq!(factor(-6), Err(QuizError::DomainError(-6)));
    }

    #[test]
    fn factor_product_and_ordering_hold_up_to_ten_thousand() {
        for x in 1..=10_000i64 {
            let factors = factor(x).unwrap();
            assert_eq!(factors.iter().product::<i64>(), x, "product of {factors:?}");
            assert!(
                factors.windows(2).all(|w| w[0] <= w[1]),
                "{factors:?} not non-decreasing"
            );
            if x > 1 {
                assert!(factors.iter().all(|&f| f >= 2));
            }
        }
    }
}
