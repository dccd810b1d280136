//! Number formatting for the calculator display.
//!
//! Numbers are shown in their shortest round-trip decimal form. Exponent
//! notation is only used for magnitudes below 1e-6 or at/above 1e21, where
//! a positional rendering would be unreadable.

/// Results whose rendering is longer than this are rounded before display.
const MAX_RESULT_LEN: usize = 12;

/// Fractional digits kept when a long result is rounded.
const ROUND_DIGITS: usize = 10;

/// Format a number as the calculator displays it.
///
/// Negative zero renders as `"0"`. Non-finite values are never stored in the
/// display buffer, but still get a readable rendering.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value.is_sign_negative() { "-" } else { "" };
        return format!("{sign}Infinity");
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.2345e3".
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let body = if (-6..=20).contains(&exponent) {
        positional(&digits, exponent)
    } else {
        exponential(&digits, exponent)
    };

    if value < 0.0 { format!("-{body}") } else { body }
}

fn positional(digits: &str, exponent: i32) -> String {
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("0.{zeros}{digits}");
    }

    let int_len = exponent as usize + 1;
    if digits.len() <= int_len {
        format!("{digits}{}", "0".repeat(int_len - digits.len()))
    } else {
        let (int_part, frac_part) = digits.split_at(int_len);
        format!("{int_part}.{frac_part}")
    }
}

fn exponential(digits: &str, exponent: i32) -> String {
    let (lead, rest) = digits.split_at(1);
    let sign = if exponent < 0 { '-' } else { '+' };
    if rest.is_empty() {
        format!("{lead}e{sign}{}", exponent.abs())
    } else {
        format!("{lead}.{rest}e{sign}{}", exponent.abs())
    }
}

/// Bound floating-point noise in a computed result.
///
/// If the result renders longer than twelve characters it is rounded to ten
/// fractional digits, so `0.1 + 0.2` settles to `0.3`.
pub fn settle(value: f64) -> f64 {
    if format_number(value).len() <= MAX_RESULT_LEN {
        return value;
    }
    to_fixed(value, ROUND_DIGITS).parse().unwrap_or(value)
}

/// Render `value` with exactly `digits` fractional digits.
///
/// Exact ties round away from zero. Rust's fixed-precision formatting
/// rounds them to even, which would show `1 / 2048` as `0.0004882812`.
fn to_fixed(value: f64, digits: usize) -> String {
    let magnitude = value.abs();

    // A finite f64 has at most 1074 fractional digits, so this is exact.
    let exact = format!("{magnitude:.1100}");
    let is_tie = exact.split_once('.').is_some_and(|(_, frac)| {
        frac.as_bytes().get(digits) == Some(&b'5')
            && frac.bytes().skip(digits + 1).all(|b| b == b'0')
    });
    let magnitude = if is_tie { magnitude.next_up() } else { magnitude };

    let fixed = format!("{:.*}", digits, magnitude);
    if value < 0.0 { format!("-{fixed}") } else { fixed }
}

/// Parse a display numeral back into a number.
///
/// The display buffer only ever holds numerals produced by digit entry or
/// by [`format_number`], so this does not fail in practice; anything else
/// reads as zero.
pub fn parse_numeral(numeral: &str) -> f64 {
    numeral.parse().unwrap_or(0.0)
}

/// Insert thousand separators into the integer part of a numeral.
///
/// The fractional part is kept verbatim (including a trailing "." while the
/// user is still typing). Exponent forms are returned unchanged.
pub fn group_thousands(numeral: &str) -> String {
    if numeral.contains('e') || !numeral.chars().any(|c| c.is_ascii_digit()) {
        return numeral.to_string();
    }

    let (sign, unsigned) = match numeral.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", numeral),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot_pos) => unsigned.split_at(dot_pos),
        None => (unsigned, ""),
    };

    let mut result = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    let grouped: String = result.chars().rev().collect();
    format!("{sign}{grouped}{frac_part}")
}
