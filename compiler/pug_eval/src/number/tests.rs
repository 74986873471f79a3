#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn to_string_switches_to_exponent_at_the_script_thresholds() {
    assert_eq!(to_string(3.0), "3");
    assert_eq!(to_string(-0.0), "0");
    assert_eq!(to_string(123.456), "123.456");
    assert_eq!(to_string(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(to_string(1e21), "1e+21");
    assert_eq!(to_string(1e20), "100000000000000000000");
    assert_eq!(to_string(0.000_001), "0.000001");
    assert_eq!(to_string(1e-7), "1e-7");
    assert_eq!(to_string(1.5e-10), "1.5e-10");
    assert_eq!(to_string(f64::NAN), "NaN");
    assert_eq!(to_string(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn to_fixed_rounds_ties_up() {
    assert_eq!(to_fixed(2.5, 0).as_deref(), Some("3"));
    assert_eq!(to_fixed(1.005, 2).as_deref(), Some("1.00"));
    assert_eq!(to_fixed(1.45, 1).as_deref(), Some("1.4"));
    assert_eq!(to_fixed(0.000_1, 2).as_deref(), Some("0.00"));
    assert_eq!(to_fixed(-1.5, 0).as_deref(), Some("-2"));
    assert_eq!(to_fixed(99.995, 1).as_deref(), Some("100.0"));
    assert_eq!(to_fixed(0.5, 0).as_deref(), Some("1"));
    assert_eq!(to_fixed(1e21, 2).as_deref(), Some("1e+21"));
    assert_eq!(to_fixed(1.0, 101), None);
}

#[test]
fn exponential_and_precision() {
    assert_eq!(to_exponential(123_456.0, Some(2)).as_deref(), Some("1.23e+5"));
    assert_eq!(to_exponential(0.000_15, None).as_deref(), Some("1.5e-4"));
    assert_eq!(to_exponential(0.0, Some(2)).as_deref(), Some("0.00e+0"));
    assert_eq!(to_exponential(9.99, Some(1)).as_deref(), Some("1.0e+1"));
    assert_eq!(to_precision(123.456, Some(4)).as_deref(), Some("123.5"));
    assert_eq!(to_precision(0.000_123, Some(2)).as_deref(), Some("0.00012"));
    assert_eq!(to_precision(123_456.0, Some(2)).as_deref(), Some("1.2e+5"));
    assert_eq!(to_precision(1e-7, Some(1)).as_deref(), Some("1e-7"));
    assert_eq!(to_precision(0.0, Some(3)).as_deref(), Some("0.00"));
    assert_eq!(to_precision(5.0, Some(0)), None);
}

#[test]
fn radix_strings() {
    assert_eq!(to_radix_string(255.0, 16).as_deref(), Some("ff"));
    assert_eq!(to_radix_string(-5.0, 2).as_deref(), Some("-101"));
    assert_eq!(to_radix_string(0.5, 2), None);
    assert_eq!(to_radix_string(1.0, 37), None);
}

#[test]
fn string_to_number() {
    assert_eq!(parse(""), 0.0);
    assert_eq!(parse("  42 "), 42.0);
    assert_eq!(parse("0x1F"), 31.0);
    assert_eq!(parse("0b101"), 5.0);
    assert_eq!(parse(".5"), 0.5);
    assert_eq!(parse("5."), 5.0);
    assert_eq!(parse("-1e3"), -1000.0);
    assert_eq!(parse("-Infinity"), f64::NEG_INFINITY);
    assert!(parse("inf").is_nan());
    assert!(parse("1e").is_nan());
    assert!(parse("12px").is_nan());
    assert!(parse(".").is_nan());
}

#[test]
fn int32_wraps() {
    assert_eq!(to_int32(4_294_967_295.0), -1);
    assert_eq!(to_int32(2_147_483_648.0), -2_147_483_648);
    assert_eq!(to_int32(-1.7), -1);
    assert_eq!(to_uint32(-1.0), 4_294_967_295);
    assert_eq!(to_int32(f64::NAN), 0);
}

proptest! {
    #[test]
    fn integers_format_like_rust(n in -9_007_199_254_740_991_i64..9_007_199_254_740_991_i64) {
        #[allow(clippy::cast_precision_loss)]
        let x = n as f64;
        prop_assert_eq!(to_string(x), n.to_string());
    }

    #[test]
    fn to_string_round_trips(x in proptest::num::f64::NORMAL) {
        prop_assert_eq!(parse(&to_string(x)), x);
    }
}
