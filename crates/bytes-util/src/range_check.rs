//! A helper macro to ensure that a number is within the specified [$lower, $upper] bounds.

/// Enforces that a number is within the specified \[LOWER, UPPER\] bounds.
///
/// The brackets indicate that this range is inclusive on both sides.
#[macro_export]
macro_rules! range_check {
    ($n:expr, $lower:expr, $upper:expr) => {{
        let n = $n;

        #[allow(unused_comparisons, clippy::manual_range_contains)]
        if n < $lower || n > $upper {
            ::std::result::Result::Err(::std::io::Error::new(
                ::std::io::ErrorKind::InvalidData,
                format!(
                    "{} is out of range [{}, {}]: {}",
                    stringify!($n),
                    $lower,
                    $upper,
                    n
                ),
            ))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    #[test]
    fn test_in_range() {
        let count = 64u64;
        range_check!(count, 0, 64).unwrap();
        range_check!(0u8, 0, 16).unwrap();
    }

    #[test]
    fn test_out_of_range() {
        let num_short_term_ref_pic_sets = 65u64;
        let err = range_check!(num_short_term_ref_pic_sets, 0, 64).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert_eq!(
            err.to_string(),
            "num_short_term_ref_pic_sets is out of range [0, 64]: 65"
        );
    }
}
