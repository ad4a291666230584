//! Logarithmic units: bel, decibel, neper, referenced decibels and magnitudes
//!
//! A value `n` in a logarithmic unit stands for the absolute quantity
//! `reference · base^(n / prefactor)`. Uncertainty is carried as an absolute
//! quantity in the reference's unit, never as a log-scale number.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

use super::decimal::{self, div, mul};
use super::prefix::Prefix;
use super::quantity::Quantity;
use super::unit::Unit;
use crate::error::{Error, Result};

/// Base of the logarithm
#[derive(Debug, Clone, PartialEq)]
pub enum LogBase {
    E,
    Ten,
    Two,
    Other(Decimal),
}

impl LogBase {
    fn log(&self, x: Decimal) -> Result<Decimal> {
        match self {
            LogBase::E => decimal::ln(x),
            LogBase::Ten => decimal::log10(x),
            LogBase::Two => decimal::log(x, Decimal::TWO),
            LogBase::Other(b) => decimal::log(x, *b),
        }
    }

    fn pow(&self, x: Decimal) -> Result<Decimal> {
        match self {
            LogBase::E => decimal::exp(x),
            LogBase::Ten => decimal::powd(Decimal::TEN, x),
            LogBase::Two => decimal::powd(Decimal::TWO, x),
            LogBase::Other(b) => decimal::powd(*b, x),
        }
    }
}

#[derive(Clone)]
pub struct LogarithmicUnit {
    pub symbol: String,
    pub name: String,
    pub alt_names: Vec<String>,
    pub base: LogBase,
    pub prefactor: Decimal,
    pub reference: Option<Quantity>,
    prefix: Option<Prefix>,
}

impl LogarithmicUnit {
    pub fn new(symbol: &str, name: &str, base: LogBase, prefactor: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            alt_names: Vec::new(),
            base,
            prefactor,
            reference: None,
            prefix: None,
        }
    }

    pub fn with_alt_names(mut self, names: &[&str]) -> Self {
        self.alt_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Referenced variant, e.g. decibel + 1 mW = dBm
    pub fn with_reference(&self, reference: Quantity, suffix: &str, name: &str) -> Self {
        Self {
            symbol: format!("{}{}", self.symbol, suffix),
            name: name.to_string(),
            alt_names: Vec::new(),
            reference: Some(reference),
            ..self.clone()
        }
    }

    /// Prefixed variant; deci + bel = decibel with prefactor 10
    pub fn prefixed(&self, prefix: &Prefix) -> Result<Self> {
        if self.prefix.is_some() {
            return Err(Error::AlreadyPrefixed(format!(
                "{} already carries a prefix",
                self.name
            )));
        }
        Ok(Self {
            symbol: format!("{}{}", prefix.symbol, self.symbol),
            name: format!("{}{}", prefix.name, self.name),
            alt_names: self
                .alt_names
                .iter()
                .map(|alt| format!("{}{}", prefix.name, alt))
                .collect(),
            prefactor: div(self.prefactor, prefix.multiplier)?,
            prefix: Some(prefix.clone()),
            ..self.clone()
        })
    }

    pub fn prefix(&self) -> Option<&Prefix> {
        self.prefix.as_ref()
    }

    /// Unit the absolute values are expressed in
    pub fn absolute_unit(&self) -> Unit {
        match &self.reference {
            Some(r) => r.unit().clone(),
            None => Unit::unitless(),
        }
    }

    /// Dimensionless ratio of `q` to the reference
    fn ratio(&self, q: &Quantity) -> Result<Decimal> {
        let ratio = match &self.reference {
            Some(reference) => {
                if q.dimensions() != reference.dimensions() {
                    return Err(Error::mismatched(q.unit(), reference.unit()));
                }
                q.div(reference)?
            }
            None if q.is_dimensionless() => q.clone(),
            None => {
                return Err(Error::NotDimensionless(format!(
                    "{} has no reference, so {q} must be dimensionless",
                    self.symbol
                )))
            }
        };
        Ok(ratio.base()?.number())
    }

    fn number_of(&self, q: &Quantity) -> Result<Decimal> {
        mul(self.prefactor, self.base.log(self.ratio(q)?)?)
    }

    /// Absolute value of `n` in this unit, without uncertainty
    fn absolute_of(&self, n: Decimal) -> Result<Quantity> {
        let factor = self.base.pow(div(n, self.prefactor)?)?;
        match &self.reference {
            Some(reference) => Ok(Quantity::new(mul(reference.number(), factor)?, reference.unit().clone())),
            None => Ok(Quantity::dimensionless(factor)),
        }
    }

    pub fn from_absolute(&self, q: &Quantity) -> Result<LogarithmicQuantity> {
        LogarithmicQuantity::from_absolute(q, self)
    }
}

impl PartialEq for LogarithmicUnit {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.name == other.name
    }
}

impl fmt::Debug for LogarithmicUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(r) => write!(f, "LogarithmicUnit({}, reference={})", self.symbol, r),
            None => write!(f, "LogarithmicUnit({}, reference=1)", self.symbol),
        }
    }
}

/// A number on a logarithmic scale
#[derive(Clone)]
pub struct LogarithmicQuantity {
    number: Decimal,
    unit: LogarithmicUnit,
    uncertainty: Option<Quantity>,
}

impl LogarithmicQuantity {
    pub fn new(number: Decimal, unit: &LogarithmicUnit) -> Self {
        Self {
            number,
            unit: unit.clone(),
            uncertainty: None,
        }
    }

    /// Attach an absolute uncertainty, which must share the reference's dimensions
    pub fn with_uncertainty(mut self, uncertainty: Quantity) -> Result<Self> {
        let absolute = self.unit.absolute_unit();
        if uncertainty.dimensions() != absolute.dimensions() {
            return Err(Error::mismatched(uncertainty.unit(), &absolute));
        }
        self.uncertainty = if uncertainty.number().is_zero() {
            None
        } else {
            Some(uncertainty.abs())
        };
        Ok(self)
    }

    pub fn number(&self) -> Decimal {
        self.number
    }

    pub fn unit(&self) -> &LogarithmicUnit {
        &self.unit
    }

    pub fn uncertainty(&self) -> Option<&Quantity> {
        self.uncertainty.as_ref()
    }

    pub fn from_absolute(q: &Quantity, unit: &LogarithmicUnit) -> Result<Self> {
        let number = unit.number_of(q)?;
        let result = Self::new(number, unit);
        if q.is_exact() {
            return Ok(result);
        }
        result.with_uncertainty(Quantity::new(q.uncertainty(), q.unit().clone()))
    }

    /// The absolute quantity, carrying the uncertainty
    pub fn to_absolute(&self) -> Result<Quantity> {
        let absolute = self.unit.absolute_of(self.number)?;
        match &self.uncertainty {
            Some(sigma) => {
                let sigma = sigma.to(absolute.unit())?.number();
                Ok(absolute.with_uncertainty(sigma))
            }
            None => Ok(absolute),
        }
    }

    /// Absolute value relative to the reference, as a dimensionless quantity
    fn gain(&self) -> Result<Quantity> {
        let absolute = self.to_absolute()?;
        match &self.unit.reference {
            Some(reference) => absolute.div(reference),
            None => Ok(absolute),
        }
    }

    /// Physical sum of the two absolute values, back on this unit's scale
    pub fn add(&self, other: &LogarithmicQuantity) -> Result<Self> {
        Self::from_absolute(&self.to_absolute()?.add(&other.to_absolute()?)?, &self.unit)
    }

    pub fn sub(&self, other: &LogarithmicQuantity) -> Result<Self> {
        Self::from_absolute(&self.to_absolute()?.sub(&other.to_absolute()?)?, &self.unit)
    }

    /// Apply a gain: log numbers add
    pub fn mul(&self, other: &LogarithmicQuantity) -> Result<Self> {
        self.combine(other, false)
    }

    /// Remove a gain: log numbers subtract
    pub fn div(&self, other: &LogarithmicQuantity) -> Result<Self> {
        self.combine(other, true)
    }

    fn combine(&self, other: &LogarithmicQuantity, divide: bool) -> Result<Self> {
        if self.unit.base != other.unit.base {
            return Err(Error::mismatched(&self.unit.symbol, &other.unit.symbol));
        }
        let shift = div(mul(other.number, self.unit.prefactor)?, other.unit.prefactor)?;
        let number = if divide {
            decimal::sub(self.number, shift)?
        } else {
            decimal::add(self.number, shift)?
        };
        let result = Self::new(number, &self.unit);
        if self.uncertainty.is_none() && other.uncertainty.is_none() {
            return Ok(result);
        }
        let (a, b) = (self.to_absolute()?, other.gain()?);
        let combined = if divide { a.div(&b)? } else { a.mul(&b)? };
        result.with_uncertainty(Quantity::new(combined.uncertainty(), combined.unit().clone()))
    }

    pub fn compare(&self, other: &LogarithmicQuantity) -> Result<Ordering> {
        self.to_absolute()?.compare(&other.to_absolute()?)
    }
}

impl PartialEq for LogarithmicQuantity {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_absolute(), other.to_absolute()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for LogarithmicQuantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl Quantity {
    /// Express this absolute quantity on a logarithmic scale
    pub fn on_logarithmic_scale(&self, unit: &LogarithmicUnit) -> Result<LogarithmicQuantity> {
        LogarithmicQuantity::from_absolute(self, unit)
    }
}

impl fmt::Display for LogarithmicQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.unit.symbol)?;
        if let Some(sigma) = &self.uncertainty {
            write!(f, " (± {sigma})")?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogarithmicQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogarithmicQuantity({}, {})", self.number, self.unit.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal as d;
    use crate::registry::registry;
    use pretty_assertions::assert_eq;

    fn log_unit(name: &str) -> LogarithmicUnit {
        registry().logarithmic(name).unwrap()
    }

    fn q(s: &str) -> Quantity {
        Quantity::parse(s).unwrap()
    }

    #[test]
    fn test_decibel_is_prefixed_bel() {
        let db = log_unit("dB");
        assert_eq!(db.prefactor, d("10"));
        assert!(db.prefix().is_some());
        let deci = registry().prefix("deci").unwrap();
        assert!(matches!(db.prefixed(&deci), Err(Error::AlreadyPrefixed(_))));
    }

    #[test]
    fn test_dbm_from_absolute() {
        let dbm = log_unit("dBm");
        let level = q("1 W").on_logarithmic_scale(&dbm).unwrap();
        assert_eq!(level.number().round_dp(10), d("30"));
        let level = q("1 mW").on_logarithmic_scale(&dbm).unwrap();
        assert_eq!(level.number().round_dp(10), d("0"));
    }

    #[test]
    fn test_to_absolute() {
        let dbw = log_unit("dBW");
        let power = LogarithmicQuantity::new(d("20"), &dbw).to_absolute().unwrap();
        assert_eq!(power.number().round_dp(10), d("100"));
        assert_eq!(power.unit().symbol_with(true), "W");
    }

    #[test]
    fn test_field_quantity_prefactor() {
        let dbv = log_unit("dBV");
        let level = q("10 V").on_logarithmic_scale(&dbv).unwrap();
        assert_eq!(level.number().round_dp(10), d("20"));
    }

    #[test]
    fn test_wrong_dimensions() {
        let dbm = log_unit("dBm");
        assert!(matches!(q("1 m").on_logarithmic_scale(&dbm), Err(Error::MismatchedUnits { .. })));
        let db = log_unit("dB");
        assert!(matches!(q("1 m").on_logarithmic_scale(&db), Err(Error::NotDimensionless(_))));
    }

    #[test]
    fn test_gain_adds_numbers() {
        let dbm = log_unit("dBm");
        let db = log_unit("dB");
        let out = LogarithmicQuantity::new(d("10"), &dbm)
            .mul(&LogarithmicQuantity::new(d("20"), &db))
            .unwrap();
        assert_eq!(out.number(), d("30"));
        assert_eq!(out.unit().symbol, "dBm");
    }

    #[test]
    fn test_power_sum() {
        let dbw = log_unit("dBW");
        let a = LogarithmicQuantity::new(d("10"), &dbw);
        let sum = a.add(&a).unwrap();
        assert_eq!(sum.number().round_dp(4), d("13.0103"));
    }

    #[test]
    fn test_comparison_via_absolute() {
        let dbw = log_unit("dBW");
        let dbm = log_unit("dBm");
        let a = LogarithmicQuantity::new(d("0"), &dbw);
        let b = LogarithmicQuantity::new(d("20"), &dbm);
        assert_eq!(a.compare(&b).unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_absolute_uncertainty() {
        let dbm = log_unit("dBm");
        let level = q("2.0 ± 0.1 mW").on_logarithmic_scale(&dbm).unwrap();
        assert_eq!(level.uncertainty().unwrap().number(), d("0.1"));
        assert_eq!(level.to_absolute().unwrap().uncertainty(), d("0.1"));
    }
}
