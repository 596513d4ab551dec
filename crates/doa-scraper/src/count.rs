//! Parsing of human-formatted follower counts.
//!
//! Handles the shapes profile pages actually render: `"1.200"`, `"1,234"`,
//! `"1,2K"`, `"2M"`, `"34 mil"`, `"1,5 mi"`.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Suffixes in match order. `mil` must precede `mi`.
const SUFFIXES: [(&str, u64); 10] = [
    ("milhões", 1_000_000),
    ("milhoes", 1_000_000),
    ("milhão", 1_000_000),
    ("milhao", 1_000_000),
    ("mil", 1_000),
    ("bi", 1_000_000_000),
    ("mi", 1_000_000),
    ("k", 1_000),
    ("m", 1_000_000),
    ("b", 1_000_000_000),
];

/// Parses a count string, returning `0` when nothing can be parsed.
///
/// A `0` result is ambiguous; use [`try_parse_count`] where "no number" must
/// be told apart from "zero".
#[must_use]
pub fn parse_count(input: &str) -> u64 {
    try_parse_count(input).unwrap_or(0)
}

/// Parses a count string.
///
/// Without a suffix, `,` and `.` are both grouping separators and are dropped.
/// With a `K`/`M`/`B` (or Portuguese `mil`/`mi`/`bi`) suffix, the last
/// separator is the decimal point and the result is rounded to the nearest
/// integer, halves away from zero.
#[must_use]
pub fn try_parse_count(input: &str) -> Option<u64> {
    let mut s = input.trim().to_lowercase();
    s.retain(|c| !c.is_whitespace());
    let s = s.trim_end_matches('+');

    let (number, multiplier) = split_suffix(s);
    if !number.chars().any(|c| c.is_ascii_digit())
        || !number
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    if multiplier == 1 {
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        return digits.parse::<u64>().ok();
    }

    let (int_part, frac_part) = match number.rfind([',', '.']) {
        Some(pos) => (&number[..pos], &number[pos + 1..]),
        None => (number, ""),
    };
    let int_digits: String = int_part.chars().filter(char::is_ascii_digit).collect();
    let int_digits = if int_digits.is_empty() {
        "0".to_string()
    } else {
        int_digits
    };
    let literal = if frac_part.is_empty() {
        int_digits
    } else {
        format!("{int_digits}.{frac_part}")
    };

    let value = Decimal::from_str(&literal).ok()?;
    value
        .checked_mul(Decimal::from(multiplier))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
}

fn split_suffix(s: &str) -> (&str, u64) {
    for (suffix, multiplier) in SUFFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            return (number, multiplier);
        }
    }
    (s, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_separators_are_removed() {
        assert_eq!(parse_count("1.200"), 1200);
        assert_eq!(parse_count("1,234,567"), 1_234_567);
        assert_eq!(parse_count("987"), 987);
    }

    #[test]
    fn suffix_uses_last_separator_as_decimal_point() {
        assert_eq!(parse_count("1,2K"), 1200);
        assert_eq!(parse_count("1.5M"), 1_500_000);
        assert_eq!(parse_count("2M"), 2_000_000);
        assert_eq!(parse_count("3b"), 3_000_000_000);
        assert_eq!(parse_count("500K"), 500_000);
    }

    #[test]
    fn suffix_result_is_rounded() {
        assert_eq!(parse_count("1.2345K"), 1235);
        assert_eq!(parse_count("12.34K"), 12_340);
    }

    #[test]
    fn halves_round_up_not_to_even() {
        assert_eq!(parse_count("1.0005K"), 1001);
        assert_eq!(parse_count("2,0025 mil"), 2003);
        assert_eq!(parse_count("0.0000005M"), 1);
    }

    #[test]
    fn portuguese_suffixes() {
        assert_eq!(parse_count("34 mil"), 34_000);
        assert_eq!(parse_count("1,5 mi"), 1_500_000);
        assert_eq!(parse_count("2 bi"), 2_000_000_000);
        assert_eq!(parse_count("12 milhões"), 12_000_000);
        assert_eq!(parse_count("1,5 milhão"), 1_500_000);
    }

    #[test]
    fn whitespace_and_plus_are_tolerated() {
        assert_eq!(parse_count("  10K+ "), 10_000);
        assert_eq!(parse_count("1\u{a0}234"), 1234);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(parse_count("garbage"), 0);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("K"), 0);
    }

    #[test]
    fn try_parse_distinguishes_zero_from_failure() {
        assert_eq!(try_parse_count("0"), Some(0));
        assert_eq!(try_parse_count("garbage"), None);
        assert_eq!(try_parse_count("12 followers"), None);
    }
}
