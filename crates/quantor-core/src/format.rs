//! Exponent rendering and parsing for unit symbols

use num_rational::Ratio;

use crate::error::{Error, Result};
use crate::types::Exponent;

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];
const FRACTION_SLASH: char = '⁄';

fn map_digits(n: i32, digits: &[char; 10], minus: char) -> String {
    let mut out = String::new();
    if n < 0 {
        out.push(minus);
    }
    for c in n.unsigned_abs().to_string().chars() {
        if let Some(d) = c.to_digit(10) {
            out.push(digits[d as usize]);
        }
    }
    out
}

/// Unicode form of an exponent: `""` for 1, `⁰` for 0, `⁻¹`, `¹⁄₂`
pub fn superscript(e: Exponent) -> String {
    if e == Ratio::from_integer(1) {
        return String::new();
    }
    let numer = map_digits(*e.numer(), &SUPERSCRIPT_DIGITS, '⁻');
    if e.is_integer() {
        return numer;
    }
    format!(
        "{numer}{FRACTION_SLASH}{}",
        map_digits(*e.denom(), &SUBSCRIPT_DIGITS, '₋')
    )
}

/// ASCII form of an exponent: `""` for 1, `-1`, `1/2`
pub fn ascii_exponent(e: Exponent) -> String {
    if e == Ratio::from_integer(1) {
        return String::new();
    }
    if e.is_integer() {
        return e.numer().to_string();
    }
    format!("{}/{}", e.numer(), e.denom())
}

pub fn exponent_suffix(e: Exponent, superscripts: bool) -> String {
    if superscripts {
        superscript(e)
    } else {
        ascii_exponent(e)
    }
}

fn digit_value(c: char) -> Option<(u32, bool)> {
    if let Some(d) = c.to_digit(10) {
        return Some((d, false));
    }
    if let Some(i) = SUPERSCRIPT_DIGITS.iter().position(|s| *s == c) {
        return Some((i as u32, false));
    }
    SUBSCRIPT_DIGITS
        .iter()
        .position(|s| *s == c)
        .map(|i| (i as u32, true))
}

/// Parse an exponent written as `2`, `-1`, `^-1`, `**2`, `-1/2`, `⁻¹`, `⁻¹⁄₂` or `¹/₂`
pub fn parse_exponent(s: &str) -> Result<Exponent> {
    let body = s.trim_start_matches('^').trim_start_matches("**");
    let invalid = || Error::Parsing(format!("invalid exponent '{s}'"));

    let mut negative = false;
    let mut numer: Option<i64> = None;
    let mut denom: Option<i64> = None;
    let mut in_denominator = false;

    for c in body.chars() {
        match c {
            '-' | '−' | '⁻' | '₋' => {
                let current = if in_denominator { &denom } else { &numer };
                if current.is_some() {
                    return Err(invalid());
                }
                negative = !negative;
            }
            '+' | '⁺' => {}
            '/' | FRACTION_SLASH | '∕' => {
                if in_denominator || numer.is_none() {
                    return Err(invalid());
                }
                in_denominator = true;
            }
            _ => {
                let (d, _) = digit_value(c).ok_or_else(invalid)?;
                let slot = if in_denominator { &mut denom } else { &mut numer };
                let value = slot.unwrap_or(0) * 10 + i64::from(d);
                if value > i64::from(i32::MAX) {
                    return Err(invalid());
                }
                *slot = Some(value);
            }
        }
    }

    let numer = numer.ok_or_else(invalid)? as i32;
    let denom = match (in_denominator, denom) {
        (false, _) => 1,
        (true, Some(0)) | (true, None) => return Err(invalid()),
        (true, Some(d)) => d as i32,
    };
    let sign = if negative { -1 } else { 1 };
    Ok(Ratio::new(sign * numer, denom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_superscript() {
        assert_eq!(superscript(Ratio::from_integer(1)), "");
        assert_eq!(superscript(Ratio::from_integer(0)), "⁰");
        assert_eq!(superscript(Ratio::from_integer(-1)), "⁻¹");
        assert_eq!(superscript(Ratio::from_integer(12)), "¹²");
        assert_eq!(superscript(Ratio::new(1, 2)), "¹⁄₂");
        assert_eq!(superscript(Ratio::new(-3, 2)), "⁻³⁄₂");
    }

    #[test]
    fn test_ascii_exponent() {
        assert_eq!(ascii_exponent(Ratio::from_integer(-2)), "-2");
        assert_eq!(ascii_exponent(Ratio::new(1, 2)), "1/2");
    }

    #[test]
    fn test_parse_exponent() {
        assert_eq!(parse_exponent("2").unwrap(), Ratio::from_integer(2));
        assert_eq!(parse_exponent("^-1").unwrap(), Ratio::from_integer(-1));
        assert_eq!(parse_exponent("**3").unwrap(), Ratio::from_integer(3));
        assert_eq!(parse_exponent("-1/2").unwrap(), Ratio::new(-1, 2));
        assert_eq!(parse_exponent("⁻¹").unwrap(), Ratio::from_integer(-1));
        assert_eq!(parse_exponent("⁻¹⁄₂").unwrap(), Ratio::new(-1, 2));
        assert_eq!(parse_exponent("2/4").unwrap(), Ratio::new(1, 2));
    }

    #[test]
    fn test_parse_exponent_rejects_garbage() {
        assert!(parse_exponent("").is_err());
        assert!(parse_exponent("1/0").is_err());
        assert!(parse_exponent("1//2").is_err());
        assert!(parse_exponent("x").is_err());
    }

    #[test]
    fn test_round_trip() {
        for e in [Ratio::from_integer(-3), Ratio::new(2, 3), Ratio::from_integer(10)] {
            assert_eq!(parse_exponent(&superscript(e)).unwrap(), e);
            assert_eq!(parse_exponent(&ascii_exponent(e)).unwrap(), e);
        }
    }
}
