//! Decimal number core
//!
//! Every numeric input is normalised to [`Decimal`] here, and every
//! multiplication, division and power the engine performs goes through the
//! checked helpers below so that overflow or a zero divisor surfaces as
//! [`Error::Arithmetic`] instead of a panic.

use std::str::FromStr;

use num_rational::Ratio;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Rounding modes offered to users, named after the usual decimal conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Ties away from zero
    #[default]
    HalfUp,
    /// Ties to the even neighbour
    HalfEven,
    /// Ties towards zero
    HalfDown,
    /// Away from zero
    Up,
    /// Towards zero
    Down,
    Ceiling,
    Floor,
}

impl RoundingMode {
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::HalfDown => RoundingStrategy::MidpointTowardZero,
            RoundingMode::Up => RoundingStrategy::AwayFromZero,
            RoundingMode::Down => RoundingStrategy::ToZero,
            RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
        }
    }
}

/// Which precision `Quantity::round` targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMethod {
    /// A number of decimal places
    Places,
    /// A number of significant figures
    Figures,
    /// The decimal place of the uncertainty, itself rounded to figures
    Uncertainty,
}

/// How binary floats become decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatPolicy {
    /// Go through the float's shortest round-tripping string, so 0.1 stays 0.1
    #[default]
    String,
    /// Keep the exact binary value, so 0.1 becomes 0.1000000000000000055511151231
    Exact,
}

/// Any number-like input accepted at the API edge
#[derive(Debug, Clone, PartialEq)]
pub enum NumberInput {
    Decimal(Decimal),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumberInput {
    /// Normalise to a decimal
    pub fn to_decimal(&self, policy: FloatPolicy) -> Result<Decimal> {
        match self {
            NumberInput::Decimal(d) => Ok(*d),
            NumberInput::Integer(i) => Ok(Decimal::from(*i)),
            NumberInput::Float(f) => {
                if !f.is_finite() {
                    return Err(Error::Parsing(format!("{f} is not a finite number")));
                }
                match policy {
                    FloatPolicy::String => parse_decimal(&f.to_string()),
                    FloatPolicy::Exact => Decimal::from_f64_retain(*f)
                        .ok_or_else(|| Error::arithmetic(format!("{f} is out of decimal range"))),
                }
            }
            NumberInput::Text(s) => parse_decimal(s),
        }
    }
}

impl From<Decimal> for NumberInput {
    fn from(d: Decimal) -> Self {
        NumberInput::Decimal(d)
    }
}

impl From<i64> for NumberInput {
    fn from(i: i64) -> Self {
        NumberInput::Integer(i)
    }
}

impl From<i32> for NumberInput {
    fn from(i: i32) -> Self {
        NumberInput::Integer(i64::from(i))
    }
}

impl From<f64> for NumberInput {
    fn from(f: f64) -> Self {
        NumberInput::Float(f)
    }
}

impl From<&str> for NumberInput {
    fn from(s: &str) -> Self {
        NumberInput::Text(s.to_string())
    }
}

impl From<String> for NumberInput {
    fn from(s: String) -> Self {
        NumberInput::Text(s)
    }
}

/// Parse plain ("1.5", "-3") or scientific ("6.674e-11") decimal notation
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s.trim().replace('−', "-").replace('_', "");
    let parsed = if cleaned.contains(['e', 'E']) {
        Decimal::from_scientific(&cleaned)
    } else {
        Decimal::from_str(&cleaned)
    };
    parsed.map_err(|e| Error::Parsing(format!("invalid number '{s}': {e}")))
}

pub fn add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| Error::arithmetic(format!("overflow adding {a} and {b}")))
}

pub fn sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| Error::arithmetic(format!("overflow subtracting {b} from {a}")))
}

pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| Error::arithmetic(format!("overflow multiplying {a} by {b}")))
}

pub fn div(a: Decimal, b: Decimal) -> Result<Decimal> {
    if b.is_zero() {
        return Err(Error::arithmetic(format!("division of {a} by zero")));
    }
    a.checked_div(b)
        .ok_or_else(|| Error::arithmetic(format!("overflow dividing {a} by {b}")))
}

pub fn sqrt(a: Decimal) -> Result<Decimal> {
    a.sqrt()
        .ok_or_else(|| Error::arithmetic(format!("square root of negative number {a}")))
}

pub fn ln(a: Decimal) -> Result<Decimal> {
    if a <= Decimal::ZERO {
        return Err(Error::arithmetic(format!("logarithm of non-positive number {a}")));
    }
    a.checked_ln()
        .ok_or_else(|| Error::arithmetic(format!("logarithm of {a} failed")))
}

pub fn log10(a: Decimal) -> Result<Decimal> {
    if a <= Decimal::ZERO {
        return Err(Error::arithmetic(format!("logarithm of non-positive number {a}")));
    }
    a.checked_log10()
        .ok_or_else(|| Error::arithmetic(format!("logarithm of {a} failed")))
}

/// Logarithm to an arbitrary base
pub fn log(a: Decimal, base: Decimal) -> Result<Decimal> {
    div(ln(a)?, ln(base)?)
}

pub fn exp(a: Decimal) -> Result<Decimal> {
    a.checked_exp()
        .ok_or_else(|| Error::arithmetic(format!("overflow computing exp({a})")))
}

/// Integer power, exact for both signs of the exponent
pub fn powi(a: Decimal, n: i64) -> Result<Decimal> {
    if n < 0 {
        return div(Decimal::ONE, powi(a, -n)?);
    }
    a.checked_powi(n)
        .ok_or_else(|| Error::arithmetic(format!("overflow computing {a}^{n}")))
}

/// Decimal power; integral exponents stay exact
pub fn powd(a: Decimal, x: Decimal) -> Result<Decimal> {
    if x.fract().is_zero() {
        if let Some(n) = x.to_i64() {
            return powi(a, n);
        }
    }
    if x == Decimal::new(5, 1) {
        return sqrt(a);
    }
    if a.is_sign_negative() {
        return Err(Error::arithmetic(format!(
            "fractional power {x} of negative number {a}"
        )));
    }
    if a.is_zero() {
        return Ok(Decimal::ZERO);
    }
    a.checked_powd(x)
        .ok_or_else(|| Error::arithmetic(format!("overflow computing {a}^{x}")))
}

/// Rational power; `1/2` goes through the square root
pub fn pow_ratio(a: Decimal, e: Ratio<i32>) -> Result<Decimal> {
    if e.is_integer() {
        return powi(a, i64::from(*e.numer()));
    }
    if e == Ratio::new(1, 2) {
        return sqrt(a);
    }
    if e == Ratio::new(-1, 2) {
        return div(Decimal::ONE, sqrt(a)?);
    }
    powd(a, ratio_to_decimal(e)?)
}

pub fn ratio_to_decimal(e: Ratio<i32>) -> Result<Decimal> {
    div(Decimal::from(*e.numer()), Decimal::from(*e.denom()))
}

/// Exact rational form of a decimal, if numerator and denominator fit in `i32`
pub fn decimal_to_ratio(d: Decimal) -> Option<Ratio<i32>> {
    let normalized = d.normalize();
    let numer = i32::try_from(normalized.mantissa()).ok()?;
    let denom = 10i32.checked_pow(normalized.scale())?;
    Some(Ratio::new(numer, denom))
}

/// Number of digits in the coefficient; trailing zeros count
pub fn significant_figures(n: Decimal) -> u32 {
    let mut m = n.mantissa().unsigned_abs();
    let mut digits = 1;
    while m >= 10 {
        m /= 10;
        digits += 1;
    }
    digits
}

/// `floor(log10(|n|))`, or `None` for zero
pub fn magnitude(n: Decimal) -> Option<i32> {
    if n.is_zero() {
        return None;
    }
    let digits = significant_figures(n.normalize()) as i32;
    Some(digits - 1 - n.normalize().scale() as i32)
}

/// Round so that the last kept digit sits at `10^exponent`
pub fn round_to_exponent(n: Decimal, exponent: i32, mode: RoundingMode) -> Result<Decimal> {
    if exponent <= 0 {
        return Ok(n.round_dp_with_strategy(exponent.unsigned_abs(), mode.strategy()));
    }
    let factor = powi(Decimal::TEN, i64::from(exponent))?;
    let quotient = div(n, factor)?.round_dp_with_strategy(0, mode.strategy());
    mul(quotient, factor)
}

/// Round to a number of decimal places, optionally padding with zeros
pub fn round_to_places(n: Decimal, places: i32, pad: bool, mode: RoundingMode) -> Result<Decimal> {
    let current = n.scale() as i32;
    if places >= current {
        if !pad || places == current {
            return Ok(n);
        }
        let mut padded = n;
        padded.rescale(places.min(MAX_SCALE) as u32);
        return Ok(padded);
    }
    round_to_exponent(n, -places, mode)
}

/// Round to a number of significant figures, optionally padding with zeros
pub fn round_to_figures(n: Decimal, figures: u32, pad: bool, mode: RoundingMode) -> Result<Decimal> {
    if figures < 1 {
        return Ok(n);
    }
    let current = significant_figures(n);
    if figures >= current {
        if !pad || figures == current {
            return Ok(n);
        }
        let mut padded = n;
        let scale = n.scale() + (figures - current);
        padded.rescale(scale.min(MAX_SCALE as u32));
        return Ok(padded);
    }
    match magnitude(n) {
        Some(mag) => round_to_exponent(n, mag - (figures as i32 - 1), mode),
        None => Ok(n),
    }
}

const MAX_SCALE: i32 = 28;
