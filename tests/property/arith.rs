use proptest::prelude::*;
use rulebook::arith::eval;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn literal_roundtrip(n in -1_000_000_000i64..=1_000_000_000) {
        let result = eval(&n.to_string());
        prop_assert_eq!(result, Ok(n as f64));
    }

    #[test]
    fn addition_matches_f64(a in -1_000_000i32..=1_000_000, b in -1_000_000i32..=1_000_000) {
        let expr = format!("{} + {}", a, b);
        prop_assert_eq!(eval(&expr), Ok(a as f64 + b as f64), "{}", expr);
    }

    #[test]
    fn subtraction_matches_f64(a in -1_000_000i32..=1_000_000, b in -1_000_000i32..=1_000_000) {
        let expr = format!("{} - {}", a, b);
        prop_assert_eq!(eval(&expr), Ok(a as f64 - b as f64), "{}", expr);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition(
        a in -1000i32..=1000,
        b in -1000i32..=1000,
        c in -1000i32..=1000,
    ) {
        let expr = format!("{} + {} * {}", a, b, c);
        prop_assert_eq!(eval(&expr), Ok(a as f64 + b as f64 * c as f64), "{}", expr);
    }

    #[test]
    fn parentheses_override_precedence(
        a in -1000i32..=1000,
        b in -1000i32..=1000,
        c in -1000i32..=1000,
    ) {
        let expr = format!("({} + {}) * {}", a, b, c);
        prop_assert_eq!(eval(&expr), Ok((a as f64 + b as f64) * c as f64), "{}", expr);
    }

    #[test]
    fn division_matches_f64(a in -1_000_000i32..=1_000_000, b in 1i32..=1_000_000) {
        let expr = format!("{} / {}", a, b);
        prop_assert_eq!(eval(&expr), Ok(a as f64 / b as f64), "{}", expr);
    }

    #[test]
    fn division_by_zero_is_an_error(a in -1_000_000i32..=1_000_000) {
        let expr = format!("{} / 0", a);
        prop_assert!(eval(&expr).is_err(), "{}", expr);
    }

    #[test]
    fn whitespace_is_insignificant(a in -1000i32..=1000, b in -1000i32..=1000) {
        let spaced = format!(" {} +  {} ", a, b);
        let dense = format!("{}+{}", a, b);
        prop_assert_eq!(eval(&spaced), eval(&dense));
    }

    #[test]
    fn double_negation_cancels(n in 0i32..=1_000_000) {
        let expr = format!("--{}", n);
        prop_assert_eq!(eval(&expr), Ok(n as f64), "{}", expr);
    }

    #[test]
    fn trailing_garbage_is_rejected(n in 0i32..=1_000_000, tail in "[a-z]{1,4}") {
        let expr = format!("{} {}", n, tail);
        prop_assert!(eval(&expr).is_err(), "{}", expr);
    }

    #[test]
    fn literals_beyond_f64_range_overflow(digits in 309usize..=340) {
        // 309 nines already exceeds f64::MAX.
        let expr = "9".repeat(digits);
        prop_assert!(eval(&expr).is_err(), "{}", expr);
        prop_assert!(eval(&format!("-{}", expr)).is_err(), "-{}", expr);
    }

    #[test]
    fn products_beyond_f64_range_overflow(a in 160usize..=300, b in 160usize..=300) {
        let expr = format!("{} * {}", "9".repeat(a), "9".repeat(b));
        prop_assert!(eval(&expr).is_err(), "{}", expr);
    }

    #[test]
    fn sums_within_range_do_not_overflow(a in 1usize..=100, b in 1usize..=100) {
        let expr = format!("{} + {}", "9".repeat(a), "9".repeat(b));
        prop_assert!(eval(&expr).is_ok(), "{}", expr);
    }
}
