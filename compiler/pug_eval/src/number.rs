//! Number formatting and parsing with script semantics.
//!
//! Formatting works on decimal digit strings: [`shortest`] for
//! `Number.prototype.toString`, and [`exact`] (the full binary expansion)
//! where a method rounds to a fixed number of digits, so ties round up as
//! the script methods require.

/// `Number.prototype.toString()` for radix 10.
pub fn to_string(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    if x < 0.0 {
        return format!("-{}", to_string(-x));
    }
    if x.is_infinite() {
        return "Infinity".to_string();
    }
    let (digits, exp) = shortest(x);
    let k = to_i32(digits.len());
    let n = exp + 1;
    if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat(to_usize(n - k)))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(to_usize(n));
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat(to_usize(-n)))
    } else {
        exponential(&digits, n - 1)
    }
}

/// `Number.prototype.toFixed(digits)`.
pub fn to_fixed(x: f64, digits: i32) -> Option<String> {
    if !(0..=100).contains(&digits) {
        return None;
    }
    if !x.is_finite() || x.abs() >= 1e21 {
        return Some(to_string(x));
    }
    if x < 0.0 {
        return Some(format!("-{}", to_fixed(-x, digits)?));
    }
    let n = if x == 0.0 {
        "0".to_string()
    } else {
        let (d, e) = exact(x);
        scaled_round(&d, e, digits)
    };
    if digits == 0 {
        return Some(n);
    }
    let f = to_usize(digits);
    let padded = format!("{n:0>width$}", width = f + 1);
    let (int, frac) = padded.split_at(padded.len() - f);
    Some(format!("{int}.{frac}"))
}

/// `Number.prototype.toExponential(digits)`.
pub fn to_exponential(x: f64, digits: Option<i32>) -> Option<String> {
    if let Some(f) = digits {
        if !(0..=100).contains(&f) {
            return None;
        }
    }
    if !x.is_finite() {
        return Some(to_string(x));
    }
    if x < 0.0 {
        return Some(format!("-{}", to_exponential(-x, digits)?));
    }
    let (d, e) = match digits {
        _ if x == 0.0 => ("0".repeat(to_usize(digits.unwrap_or(0)) + 1), 0),
        None => shortest(x),
        Some(f) => {
            let (d, e) = exact(x);
            round_significant(&d, e, to_usize(f) + 1)
        }
    };
    Some(exponential(&d, e))
}

/// `Number.prototype.toPrecision(precision)`.
pub fn to_precision(x: f64, precision: Option<i32>) -> Option<String> {
    let Some(p) = precision else {
        return Some(to_string(x));
    };
    if !x.is_finite() {
        return Some(to_string(x));
    }
    if !(1..=100).contains(&p) {
        return None;
    }
    if x < 0.0 {
        return Some(format!("-{}", to_precision(-x, precision)?));
    }
    let (d, e) = if x == 0.0 {
        ("0".repeat(to_usize(p)), 0)
    } else {
        let (d, e) = exact(x);
        round_significant(&d, e, to_usize(p))
    };
    if e < -6 || e >= p {
        return Some(exponential(&d, e));
    }
    if e == p - 1 {
        return Some(d);
    }
    if e >= 0 {
        let (int, frac) = d.split_at(to_usize(e + 1));
        return Some(format!("{int}.{frac}"));
    }
    Some(format!("0.{}{d}", "0".repeat(to_usize(-(e + 1)))))
}

/// `Number.prototype.toString(radix)`. Only integers are formatted in
/// radixes other than 10.
pub fn to_radix_string(x: f64, radix: u32) -> Option<String> {
    if !(2..=36).contains(&radix) {
        return None;
    }
    if radix == 10 || !x.is_finite() {
        return Some(to_string(x));
    }
    if x.fract() != 0.0 || x.abs() > 9_007_199_254_740_991.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let mut n = x.abs() as u64;
    if n == 0 {
        return Some("0".to_string());
    }
    let mut out = Vec::new();
    while n > 0 {
        let digit = u32::try_from(n % u64::from(radix)).ok()?;
        out.push(char::from_digit(digit, radix)?);
        n /= u64::from(radix);
    }
    if x < 0.0 {
        out.push('-');
    }
    Some(out.iter().rev().collect())
}

/// `ToNumber` applied to a string.
pub fn parse(s: &str) -> f64 {
    let s = s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }
    decimal(s).map_or(f64::NAN, |normal| normal.parse().unwrap_or(f64::NAN))
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut n = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => n = n * f64::from(radix) + f64::from(d),
            None => return f64::NAN,
        }
    }
    n
}

/// Validate a decimal literal and rewrite it into a form `f64::from_str`
/// accepts (`.5` and `5.` gain a zero).
fn decimal(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len() + 2);
    let mut rest = s;
    if let Some(sign @ ('+' | '-')) = rest.chars().next() {
        out.push(sign);
        rest = &rest[1..];
    }
    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(at) => (&rest[..at], Some(&rest[at + 1..])),
        None => (rest, None),
    };
    let (int, frac) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (mantissa, None),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int) || !frac.map_or(true, all_digits) {
        return None;
    }
    if int.is_empty() && frac.map_or(true, str::is_empty) {
        return None;
    }
    out.push_str(if int.is_empty() { "0" } else { int });
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(if frac.is_empty() { "0" } else { frac });
    }
    if let Some(exponent) = exponent {
        let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
        out.push('e');
        out.push_str(exponent);
    }
    Some(out)
}

/// `ToInt32`.
pub fn to_int32(x: f64) -> i32 {
    #[allow(clippy::cast_possible_wrap)]
    let bits = to_uint32(x) as i32;
    bits
}

/// `ToUint32`.
pub fn to_uint32(x: f64) -> u32 {
    if !x.is_finite() {
        return 0;
    }
    let m = x.trunc().rem_euclid(4_294_967_296.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bits = m as u32;
    bits
}

/// `ToIntegerOrInfinity`.
pub fn to_integer(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.trunc()
    }
}

/// Shortest round-trip digits of a positive finite `x`, and the decimal
/// exponent of the first digit.
fn shortest(x: f64) -> (String, i32) {
    split_exponential(&format!("{x:e}"))
}

/// Every significant digit of the binary value of a positive finite `x`.
fn exact(x: f64) -> (String, i32) {
    let (digits, exp) = split_exponential(&format!("{x:.1100e}"));
    let trimmed = digits.trim_end_matches('0');
    let digits = if trimmed.is_empty() { "0" } else { trimmed };
    (digits.to_string(), exp)
}

fn split_exponential(formatted: &str) -> (String, i32) {
    let (mantissa, exp) = formatted.split_once('e').unwrap_or((formatted, "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    (digits, exp.parse().unwrap_or(0))
}

/// Round `digits × 10^(exp - len + 1)` to an integer multiple of
/// `10^-places`, ties up. Returns the multiple as a digit string.
fn scaled_round(digits: &str, exp: i32, places: i32) -> String {
    let keep = exp + places + 1;
    if keep < 0 {
        return "0".to_string();
    }
    if keep == 0 {
        return if digits.as_bytes()[0] >= b'5' { "1" } else { "0" }.to_string();
    }
    let (rounded, carried) = round_digits(digits, to_usize(keep));
    if carried {
        format!("1{rounded}")
    } else {
        rounded
    }
}

/// Round to `keep` significant digits, ties up.
fn round_significant(digits: &str, exp: i32, keep: usize) -> (String, i32) {
    let (rounded, carried) = round_digits(digits, keep);
    if carried {
        let mut shifted = format!("1{rounded}");
        shifted.truncate(keep);
        (shifted, exp + 1)
    } else {
        (rounded, exp)
    }
}

/// The first `keep` digits, padded with zeros, rounded on the next digit.
/// The flag reports a carry out of the leading digit.
fn round_digits(digits: &str, keep: usize) -> (String, bool) {
    let mut kept: Vec<u8> = digits.bytes().take(keep).collect();
    kept.resize(keep, b'0');
    let round_up = digits.as_bytes().get(keep).is_some_and(|d| *d >= b'5');
    if !round_up {
        return (String::from_utf8_lossy(&kept).into_owned(), false);
    }
    for d in kept.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return (String::from_utf8_lossy(&kept).into_owned(), false);
        }
    }
    (String::from_utf8_lossy(&kept).into_owned(), true)
}

/// `d.ddde±x`
fn exponential(digits: &str, exp: i32) -> String {
    let (first, rest) = digits.split_at(1);
    let sign = if exp < 0 { '-' } else { '+' };
    if rest.is_empty() {
        format!("{first}e{sign}{}", exp.abs())
    } else {
        format!("{first}.{rest}e{sign}{}", exp.abs())
    }
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn to_usize(n: i32) -> usize {
    usize::try_from(n).unwrap_or(0)
}

#[cfg(test)]
mod tests;
