use core::cmp::Ordering;

/// `f64::total_cmp` with `-0.0 == 0.0` and every NaN equal to every other.
///
/// Used for sort keys (BVH splits, pick distances) so that ordering does not
/// depend on the sign of zero or NaN payloads.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    fn canonical(v: f64) -> f64 {
        if v == 0.0 {
            0.0
        } else if v.is_nan() {
            f64::NAN
        } else {
            v
        }
    }
    canonical(a).total_cmp(&canonical(b))
}

#[cfg(test)]
mod tests {
    use super::stable_total_cmp_f64;
    use core::cmp::Ordering;

    #[test]
    fn zero_signs_and_nans_compare_equal() {
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(f64::NAN, -f64::NAN), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(f64::NAN, 1.0e300), Ordering::Greater);
        assert_eq!(stable_total_cmp_f64(-1.0, 2.0), Ordering::Less);
    }
}
