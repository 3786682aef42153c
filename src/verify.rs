//! Answer verification.

/// Check a submitted factor list against the expected factor count and
/// product. A single submitted value must equal the product exactly, which
/// is how a prime (or 1) is answered. With multiple values, 1 is not a
/// legal factor and the product of all values must match. Order does not
/// matter.
pub fn verify(submitted: &[i64], expected_factor_count: usize, expected_product: i64) -> bool {
    if submitted.len() != expected_factor_count {
        return false;
    }
    if let [single] = submitted {
        return *single == expected_product;
    }

    let mut product: i64 = 1;
    for &value in submitted {
        if value < 2 {
            return false;
        }
        match product.checked_mul(value) {
            Some(p) => product = p,
            None => return false,
        }
    }
    product == expected_product
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_canonical_factorization() {
        assert!(verify(&[2, 2, 3], 3, 12));
    }

    #[test]
    fn accepts_any_order() {
        assert!(verify(&[3, 2, 2], 3, 12));
        assert!(verify(&[2, 3, 2], 3, 12));
    }

    #[test]
    fn accepts_composite_splits_with_matching_count() {
        assert!(verify(&[3, 4], 2, 12));
        assert!(verify(&[2, 6], 2, 12));
    }

    #[test]
    fn rejects_one_as_a_factor_among_multiple() {
        assert!(!verify(&[1, 12], 2, 12));
        assert!(!verify(&[1, 2, 6], 3, 12));
    }

    #[test]
    fn accepts_a_single_value_equal_to_the_product() {
        assert!(verify(&[12], 1, 12));
        assert!(verify(&[97], 1, 97));
        assert!(verify(&[1], 1, 1));
    }

    #[test]
    fn rejects_count_mismatch() {
        assert!(!verify(&[2, 2, 3], 2, 12));
        assert!(!verify(&[12], 3, 12));
        assert!(!verify(&[], 1, 12));
    }

    #[test]
    fn rejects_wrong_product() {
        assert!(!verify(&[2, 5], 2, 12));
        assert!(!verify(&[11], 1, 12));
        assert!(!verify(&[-3, -4], 2, 12));
    }
}
