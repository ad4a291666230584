//! Temperatures on relative scales (°C, °F, °R, °Ré)
//!
//! A [`Quantity`] in °C is a temperature *difference*; a [`Temperature`] is a
//! point on the scale. Adding or subtracting a difference stays on the scale
//! by offsetting the number directly. Anything multiplicative, and any
//! comparison across scales, goes through kelvin first.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

use super::decimal::{add, div, mul, sub};
use super::dimension::{Dimensions, Exponent};
use super::quantity::Quantity;
use super::uncertainty::{propagate, Measured, Operand, Operation};
use super::unit::{Atom, Unit, UnitKind};
use crate::config;
use crate::error::{Error, Result};

/// Size of one degree as the exact ratio `numer / denom` kelvin, and the
/// kelvin temperature of the scale's zero expressed in scale degrees
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureScale {
    degree_numer: Decimal,
    degree_denom: Decimal,
    zero_point: Decimal,
}

impl TemperatureScale {
    pub fn new(degree_numer: Decimal, degree_denom: Decimal, zero_point: Decimal) -> Self {
        Self {
            degree_numer,
            degree_denom,
            zero_point,
        }
    }

    /// One degree in kelvin
    pub fn degree(&self) -> Result<Decimal> {
        div(self.degree_numer, self.degree_denom)
    }

    /// Absolute zero measured on this scale, negated
    pub fn zero_point(&self) -> Decimal {
        self.zero_point
    }

    pub fn to_kelvin(&self, n: Decimal) -> Result<Decimal> {
        div(mul(add(n, self.zero_point)?, self.degree_numer)?, self.degree_denom)
    }

    pub fn from_kelvin(&self, kelvin: Decimal) -> Result<Decimal> {
        sub(self.degrees_from_kelvin(kelvin)?, self.zero_point)
    }

    fn degrees_from_kelvin(&self, kelvin: Decimal) -> Result<Decimal> {
        div(mul(kelvin, self.degree_denom)?, self.degree_numer)
    }
}

/// Express a temperature-dimensioned quantity as a number of degrees of
/// `scale`, dividing once so that e.g. °F to °C differences stay exact
fn degrees_in(q: &Quantity, scale: &TemperatureScale) -> Result<(Decimal, Decimal)> {
    if q.dimensions() != Dimensions::TEMPERATURE {
        return Err(Error::NotATemperature(format!(
            "{} is not a temperature difference",
            q.unit()
        )));
    }
    let (numer, denom) = match q.unit().as_atom().and_then(|a| a.temperature_scale()) {
        Some(source) => (source.degree_numer, source.degree_denom),
        None => (q.unit().to_base()?.scale, Decimal::ONE),
    };
    let divisor = mul(denom, scale.degree_numer)?;
    let convert = |x: Decimal| -> Result<Decimal> {
        div(mul(mul(x, numer)?, scale.degree_denom)?, divisor)
    };
    Ok((convert(q.number())?, convert(q.uncertainty())?))
}

/// A point on a temperature scale
#[derive(Clone)]
pub struct Temperature {
    number: Decimal,
    unit: Atom,
    scale: TemperatureScale,
    kelvin: Atom,
    uncertainty: Decimal,
}

impl Temperature {
    pub fn new(number: Decimal, unit: &Atom) -> Result<Self> {
        match &unit.kind {
            UnitKind::Temperature { scale, kelvin } => Ok(Self {
                number,
                unit: unit.clone(),
                scale: scale.clone(),
                kelvin: kelvin.clone(),
                uncertainty: Decimal::ZERO,
            }),
            _ => Err(Error::NotATemperature(format!(
                "{} is not a temperature scale",
                unit.name
            ))),
        }
    }

    pub fn with_uncertainty(mut self, uncertainty: Decimal) -> Self {
        self.uncertainty = uncertainty.abs();
        self
    }

    fn with_number(&self, number: Decimal, uncertainty: Decimal) -> Self {
        Self {
            number,
            uncertainty: uncertainty.abs(),
            ..self.clone()
        }
    }

    pub fn number(&self) -> Decimal {
        self.number
    }

    pub fn unit(&self) -> &Atom {
        &self.unit
    }

    pub fn uncertainty(&self) -> Decimal {
        self.uncertainty
    }

    pub fn scale(&self) -> &TemperatureScale {
        &self.scale
    }

    /// Absolute temperature as a quantity in kelvin
    pub fn to_kelvin(&self) -> Result<Quantity> {
        let number = self.scale.to_kelvin(self.number)?;
        let uncertainty = div(
            mul(self.uncertainty, self.scale.degree_numer)?,
            self.scale.degree_denom,
        )?;
        Ok(Quantity::new(number, &self.kelvin).with_uncertainty(uncertainty))
    }

    /// Place an absolute temperature on the scale of `unit`
    pub fn from_kelvin(q: &Quantity, unit: &Atom) -> Result<Self> {
        let template = Self::new(Decimal::ZERO, unit)?;
        let (degrees, uncertainty) = degrees_in(q, &template.scale)?;
        let number = sub(degrees, template.scale.zero_point)?;
        Ok(template.with_number(number, uncertainty))
    }

    /// The same temperature on another scale
    pub fn to_scale(&self, unit: &Atom) -> Result<Self> {
        if *unit == self.unit {
            return Ok(self.clone());
        }
        Self::from_kelvin(&self.to_kelvin()?, unit)
    }

    /// Absolute temperature expressed in any unit of temperature
    pub fn to(&self, target: &Unit) -> Result<Quantity> {
        let kelvin = self.to_kelvin()?;
        match target.as_atom().and_then(|a| a.temperature_scale()) {
            Some(scale) => {
                let (number, uncertainty) = degrees_in(&kelvin, scale)?;
                Ok(Quantity::new(number, target.clone()).with_uncertainty(uncertainty))
            }
            None => kelvin.to(target),
        }
    }

    pub fn add(&self, difference: &Quantity) -> Result<Self> {
        self.offset(Operation::Add, difference)
    }

    pub fn sub(&self, difference: &Quantity) -> Result<Self> {
        self.offset(Operation::Sub, difference)
    }

    fn offset(&self, op: Operation, difference: &Quantity) -> Result<Self> {
        let (degrees, sigma) = degrees_in(difference, &self.scale)?;
        let number = match op {
            Operation::Sub => sub(self.number, degrees)?,
            _ => add(self.number, degrees)?,
        };
        let uncertainty = propagate(
            op,
            Measured::new(self.number, self.uncertainty),
            Operand::Measured(Measured::new(degrees, sigma)),
            number,
            Decimal::ZERO,
        )?;
        Ok(self.with_number(number, uncertainty))
    }

    /// Difference of two temperatures, as a quantity in this scale's degrees
    pub fn difference(&self, other: &Temperature) -> Result<Quantity> {
        let other = other.to_scale(&self.unit)?;
        let number = sub(self.number, other.number)?;
        let uncertainty = propagate(
            Operation::Sub,
            Measured::new(self.number, self.uncertainty),
            Operand::Measured(Measured::new(other.number, other.uncertainty)),
            number,
            Decimal::ZERO,
        )?;
        Ok(Quantity::new(number, &self.unit).with_uncertainty(uncertainty))
    }

    /// Sum of two absolute temperatures, in kelvin
    pub fn sum(&self, other: &Temperature) -> Result<Quantity> {
        self.to_kelvin()?.add(&other.to_kelvin()?)
    }

    pub fn mul(&self, other: &Quantity) -> Result<Quantity> {
        self.to_kelvin()?.mul(other)
    }

    pub fn div(&self, other: &Quantity) -> Result<Quantity> {
        self.to_kelvin()?.div(other)
    }

    pub fn pow(&self, exponent: Exponent) -> Result<Quantity> {
        self.to_kelvin()?.pow(exponent)
    }

    pub fn neg(&self) -> Self {
        self.with_number(-self.number, self.uncertainty)
    }

    pub fn compare(&self, other: &Temperature) -> Result<Ordering> {
        Ok(self.to_kelvin()?.number().cmp(&other.to_kelvin()?.number()))
    }
}

impl PartialEq for Temperature {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

impl PartialOrd for Temperature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl Quantity {
    /// Read this absolute temperature on the scale of `unit`
    pub fn on_temperature_scale(&self, unit: &Atom) -> Result<Temperature> {
        Temperature::from_kelvin(self, unit)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = config::current().printing.uncertainty_style;
        let number = Quantity::new(self.number, &self.unit)
            .with_uncertainty(self.uncertainty)
            .format_number(style);
        if self.unit.preceding_space {
            write!(f, "{number} {}", self.unit.symbol)
        } else {
            write!(f, "{number}{}", self.unit.symbol)
        }
    }
}

impl fmt::Debug for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uncertainty.is_zero() {
            write!(f, "Temperature({}, {})", self.number, self.unit.symbol)
        } else {
            write!(
                f,
                "Temperature({}, {}, uncertainty={})",
                self.number, self.unit.symbol, self.uncertainty
            )
        }
    }
}
