//! Dimension vectors over the seven SI base dimensions

use std::fmt;
use std::ops::Neg;

use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedMul};

use crate::error::{Error, Result};
use crate::format::superscript;

/// Rational exponent used for dimensions and unit factors
pub type Exponent = Ratio<i32>;

const ZERO: Exponent = Ratio::new_raw(0, 1);
const ONE: Exponent = Ratio::new_raw(1, 1);

/// `a + b`, or `InvalidExponent` if the result leaves the `i32` range
pub(crate) fn exponent_sum(a: Exponent, b: Exponent) -> Result<Exponent> {
    in_range(a.checked_add(&b), || format!("{a} + {b}"))
}

/// `a * b`, or `InvalidExponent` if the result leaves the `i32` range
pub(crate) fn exponent_product(a: Exponent, b: Exponent) -> Result<Exponent> {
    in_range(a.checked_mul(&b), || format!("{a} × {b}"))
}

// i32::MIN is refused too so that every stored exponent can be negated
fn in_range(value: Option<Exponent>, describe: impl FnOnce() -> String) -> Result<Exponent> {
    match value {
        Some(e) if *e.numer() != i32::MIN && *e.denom() != i32::MIN => Ok(e),
        _ => Err(Error::InvalidExponent(format!(
            "exponent {} is out of range",
            describe()
        ))),
    }
}

/// Symbols of the base dimensions, in vector order
pub const DIMENSION_SYMBOLS: [&str; 7] = ["L", "M", "T", "I", "Θ", "N", "J"];

/// Exponents of length, mass, time, current, temperature, amount and luminous intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions([Exponent; 7]);

impl Dimensions {
    pub const DIMENSIONLESS: Dimensions = Dimensions([ZERO; 7]);
    pub const LENGTH: Dimensions = Dimensions::unit_vector(0);
    pub const MASS: Dimensions = Dimensions::unit_vector(1);
    pub const TIME: Dimensions = Dimensions::unit_vector(2);
    pub const CURRENT: Dimensions = Dimensions::unit_vector(3);
    pub const TEMPERATURE: Dimensions = Dimensions::unit_vector(4);
    pub const AMOUNT: Dimensions = Dimensions::unit_vector(5);
    pub const LUMINOUS_INTENSITY: Dimensions = Dimensions::unit_vector(6);

    const fn unit_vector(index: usize) -> Dimensions {
        let mut exponents = [ZERO; 7];
        exponents[index] = ONE;
        Dimensions(exponents)
    }

    pub fn new(exponents: [Exponent; 7]) -> Self {
        Dimensions(exponents)
    }

    /// Build from integer exponents
    pub fn from_integers(exponents: [i32; 7]) -> Self {
        Dimensions(exponents.map(Ratio::from_integer))
    }

    /// Build from a raw slice, which must hold exactly seven exponents
    pub fn from_slice(exponents: &[Exponent]) -> Result<Self> {
        let array: [Exponent; 7] = exponents
            .try_into()
            .map_err(|_| Error::IncompleteDimensions(exponents.len()))?;
        Ok(Dimensions(array))
    }

    pub fn exponents(&self) -> &[Exponent; 7] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Exponent {
        self.0.get(index).copied().unwrap_or(ZERO)
    }

    pub fn add(&self, other: &Dimensions) -> Result<Dimensions> {
        let mut result = self.0;
        for (r, o) in result.iter_mut().zip(other.0.iter()) {
            *r = exponent_sum(*r, *o)?;
        }
        Ok(Dimensions(result))
    }

    pub fn sub(&self, other: &Dimensions) -> Result<Dimensions> {
        self.add(&-*other)
    }

    /// Multiply every exponent by `k`
    pub fn scale(&self, k: Exponent) -> Result<Dimensions> {
        let mut result = self.0;
        for e in result.iter_mut() {
            *e = exponent_product(*e, k)?;
        }
        Ok(Dimensions(result))
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.iter().all(|e| *e == ZERO)
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Dimensions::DIMENSIONLESS
    }
}

impl Neg for Dimensions {
    type Output = Dimensions;

    fn neg(self) -> Dimensions {
        Dimensions(self.0.map(|e| -e))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }
        let terms: Vec<String> = DIMENSION_SYMBOLS
            .iter()
            .zip(self.0.iter())
            .filter(|(_, e)| **e != ZERO)
            .map(|(symbol, e)| format!("{symbol}{}", superscript(*e)))
            .collect();
        write!(f, "{}", terms.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn velocity() -> Dimensions {
        Dimensions::from_integers([1, 0, -1, 0, 0, 0, 0])
    }

    #[test]
    fn test_add_and_sub() {
        assert_eq!(Dimensions::LENGTH.sub(&Dimensions::TIME).unwrap(), velocity());
        assert_eq!(velocity().add(&Dimensions::TIME).unwrap(), Dimensions::LENGTH);
        assert!(velocity().sub(&velocity()).unwrap().is_dimensionless());
    }

    #[test]
    fn test_rational_scale() {
        let area = Dimensions::LENGTH.scale(Ratio::from_integer(2)).unwrap();
        assert_eq!(area.scale(Ratio::new(1, 2)).unwrap(), Dimensions::LENGTH);
        assert_eq!(-Dimensions::MASS, Dimensions::from_integers([0, -1, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_exponent_overflow_is_an_error() {
        let big = Dimensions::LENGTH.scale(Ratio::from_integer(100_000)).unwrap();
        assert!(matches!(
            big.scale(Ratio::from_integer(100_000)),
            Err(Error::InvalidExponent(_))
        ));
        let max = Dimensions::from_integers([i32::MAX, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(max.add(&Dimensions::LENGTH), Err(Error::InvalidExponent(_))));
        assert!(matches!(
            exponent_product(Ratio::new(1, 65_536), Ratio::new(1, 65_536)),
            Err(Error::InvalidExponent(_))
        ));
        assert_eq!(
            exponent_sum(Ratio::new(1, 2), Ratio::new(1, 3)).unwrap(),
            Ratio::new(5, 6)
        );
    }

    #[test]
    fn test_from_slice_requires_seven() {
        let short = [Ratio::from_integer(1); 3];
        assert!(matches!(
            Dimensions::from_slice(&short),
            Err(Error::IncompleteDimensions(3))
        ));
        let full = [Ratio::from_integer(0); 7];
        assert!(Dimensions::from_slice(&full).unwrap().is_dimensionless());
    }

    #[test]
    fn test_display() {
        assert_eq!(velocity().to_string(), "L T⁻¹");
        assert_eq!(Dimensions::TEMPERATURE.to_string(), "Θ");
        assert_eq!(Dimensions::DIMENSIONLESS.to_string(), "1");
    }
}
