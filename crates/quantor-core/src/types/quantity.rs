//! Quantities: a decimal number, a unit and a standard uncertainty
//!
//! Quantities are immutable; every operation returns a new one. Products and
//! quotients keep the concatenated, uncancelled unit and are marked
//! pending-cancel when `arithmetic.auto_cancel` is on. The cancelled unit is
//! then computed the first time [`Quantity::unit`] is read and kept in an
//! interior cache, which is the only state that changes after construction.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use num_rational::Ratio;
use once_cell::sync::OnceCell;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::decimal::{self, NumberInput, RoundingMethod, RoundingMode};
use super::dimension::{Dimensions, Exponent};
use super::uncertainty::{propagate, Measured, Operand, Operation};
use super::unit::Unit;
use crate::config::{self, UncertaintyStyle};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct Quantity {
    number: Decimal,
    unit: Unit,
    uncertainty: Decimal,
    pending_cancel: bool,
    cancelled: OnceCell<Unit>,
}

impl Quantity {
    /// An exact quantity
    pub fn new(number: Decimal, unit: impl Into<Unit>) -> Self {
        Self::build(number, unit.into(), Decimal::ZERO, false)
    }

    pub fn dimensionless(number: Decimal) -> Self {
        Self::new(number, Unit::unitless())
    }

    /// Attach a standard uncertainty, stored as its absolute value
    pub fn with_uncertainty(mut self, uncertainty: Decimal) -> Self {
        self.uncertainty = uncertainty.abs();
        self
    }

    /// Build from any number-like input, normalised with the configured float policy
    pub fn from_input(
        number: impl Into<NumberInput>,
        unit: impl Into<Unit>,
        uncertainty: Option<NumberInput>,
    ) -> Result<Self> {
        let policy = config::current().arithmetic.float_policy;
        let number = number.into().to_decimal(policy)?;
        let uncertainty = match uncertainty {
            Some(u) => u.to_decimal(policy)?,
            None => Decimal::ZERO,
        };
        Ok(Self::new(number, unit).with_uncertainty(uncertainty))
    }

    /// Parse `"1.234(56) m s-2"`, `"8.293 ± 0.010 V"` and similar
    pub fn parse(s: &str) -> Result<Self> {
        crate::registry::registry().parse_quantity(s)
    }

    fn build(number: Decimal, unit: Unit, uncertainty: Decimal, pending_cancel: bool) -> Self {
        Self {
            number,
            unit,
            uncertainty: uncertainty.abs(),
            pending_cancel,
            cancelled: OnceCell::new(),
        }
    }

    fn with_number(&self, number: Decimal) -> Self {
        Self::build(number, self.unit.clone(), self.uncertainty, self.pending_cancel)
    }

    pub fn number(&self) -> Decimal {
        self.number
    }

    pub fn uncertainty(&self) -> Decimal {
        self.uncertainty
    }

    pub fn is_exact(&self) -> bool {
        self.uncertainty.is_zero()
    }

    /// The unit, cancelled on first read if cancellation is pending
    pub fn unit(&self) -> &Unit {
        if self.pending_cancel {
            self.cancelled.get_or_init(|| self.unit.cancel())
        } else {
            &self.unit
        }
    }

    /// The unit exactly as built, before any pending cancellation
    pub fn raw_unit(&self) -> &Unit {
        &self.unit
    }

    pub fn is_pending_cancel(&self) -> bool {
        self.pending_cancel
    }

    pub fn dimensions(&self) -> Dimensions {
        self.unit.dimensions()
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimensions().is_dimensionless()
    }

    pub(crate) fn measured(&self) -> Measured {
        Measured::new(self.number, self.uncertainty)
    }

    fn check_dimensions(&self, other: &Quantity) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::mismatched(self.unit(), other.unit()));
        }
        Ok(())
    }

    /// Base-unit form of a dimensionless quantity, or `NotDimensionless`
    fn dimensionless_value(&self, operation: &str) -> Result<Quantity> {
        if !self.is_dimensionless() {
            return Err(Error::NotDimensionless(format!(
                "cannot take {operation} of {self}"
            )));
        }
        self.base()
    }

    pub fn add(&self, other: &Quantity) -> Result<Quantity> {
        self.add_correlated(other, Decimal::ZERO)
    }

    pub fn add_correlated(&self, other: &Quantity, correlation: Decimal) -> Result<Quantity> {
        self.additive(Operation::Add, other, correlation)
    }

    pub fn sub(&self, other: &Quantity) -> Result<Quantity> {
        self.sub_correlated(other, Decimal::ZERO)
    }

    pub fn sub_correlated(&self, other: &Quantity, correlation: Decimal) -> Result<Quantity> {
        self.additive(Operation::Sub, other, correlation)
    }

    /// Add or subtract, converting `other` into this quantity's unit first
    fn additive(&self, op: Operation, other: &Quantity, correlation: Decimal) -> Result<Quantity> {
        self.check_dimensions(other)?;
        let other = if self.unit == other.unit {
            other.clone()
        } else {
            other.to(self.unit())?
        };
        let number = match op {
            Operation::Sub => decimal::sub(self.number, other.number)?,
            _ => decimal::add(self.number, other.number)?,
        };
        let uncertainty = propagate(
            op,
            self.measured(),
            Operand::Measured(other.measured()),
            number,
            correlation,
        )?;
        Ok(Self::build(number, self.unit.clone(), uncertainty, self.pending_cancel))
    }

    pub fn mul(&self, other: &Quantity) -> Result<Quantity> {
        self.mul_correlated(other, Decimal::ZERO)
    }

    pub fn mul_correlated(&self, other: &Quantity, correlation: Decimal) -> Result<Quantity> {
        let number = decimal::mul(self.number, other.number)?;
        let uncertainty = propagate(
            Operation::Mul,
            self.measured(),
            Operand::Measured(other.measured()),
            number,
            correlation,
        )?;
        Ok(Self::build(
            number,
            self.unit.multiply(&other.unit)?,
            uncertainty,
            config::current().arithmetic.auto_cancel,
        ))
    }

    pub fn mul_scalar(&self, x: Decimal) -> Result<Quantity> {
        let number = decimal::mul(self.number, x)?;
        let uncertainty = propagate(Operation::Mul, self.measured(), Operand::Exact(x), number, Decimal::ZERO)?;
        Ok(Self::build(number, self.unit.clone(), uncertainty, self.pending_cancel))
    }

    pub fn div(&self, other: &Quantity) -> Result<Quantity> {
        self.div_correlated(other, Decimal::ZERO)
    }

    pub fn div_correlated(&self, other: &Quantity, correlation: Decimal) -> Result<Quantity> {
        let number = decimal::div(self.number, other.number)?;
        let uncertainty = propagate(
            Operation::Div,
            self.measured(),
            Operand::Measured(other.measured()),
            number,
            correlation,
        )?;
        Ok(Self::build(
            number,
            self.unit.divide(&other.unit)?,
            uncertainty,
            config::current().arithmetic.auto_cancel,
        ))
    }

    pub fn div_scalar(&self, x: Decimal) -> Result<Quantity> {
        let number = decimal::div(self.number, x)?;
        let uncertainty = propagate(Operation::Div, self.measured(), Operand::Exact(x), number, Decimal::ZERO)?;
        Ok(Self::build(number, self.unit.clone(), uncertainty, self.pending_cancel))
    }

    /// `x / self`
    pub fn rdiv_scalar(&self, x: Decimal) -> Result<Quantity> {
        let number = decimal::div(x, self.number)?;
        let uncertainty = propagate(Operation::RDiv, self.measured(), Operand::Exact(x), number, Decimal::ZERO)?;
        Ok(Self::build(number, self.unit.inverse(), uncertainty, self.pending_cancel))
    }

    pub fn inverse(&self) -> Result<Quantity> {
        self.rdiv_scalar(Decimal::ONE)
    }

    pub fn neg(&self) -> Quantity {
        self.with_number(-self.number)
    }

    pub fn abs(&self) -> Quantity {
        self.with_number(self.number.abs())
    }

    /// Raise to an integer or rational power
    pub fn pow(&self, exponent: Exponent) -> Result<Quantity> {
        let number = decimal::pow_ratio(self.number, exponent)?;
        let x = decimal::ratio_to_decimal(exponent)?;
        let uncertainty = propagate(Operation::Pow, self.measured(), Operand::Exact(x), number, Decimal::ZERO)?;
        Ok(Self::build(number, self.unit.pow(exponent)?, uncertainty, self.pending_cancel))
    }

    pub fn powi(&self, exponent: i32) -> Result<Quantity> {
        self.pow(Ratio::from_integer(exponent))
    }

    /// `x ^ self`; the exponent must be dimensionless
    pub fn rpow_scalar(&self, base: Decimal) -> Result<Quantity> {
        let exponent = self.dimensionless_value("a power")?;
        let number = decimal::powd(base, exponent.number)?;
        let uncertainty = propagate(
            Operation::RPow,
            exponent.measured(),
            Operand::Exact(base),
            number,
            Decimal::ZERO,
        )?;
        Ok(Self::build(number, Unit::unitless(), uncertainty, false))
    }

    /// `base ^ self`; the exponent must be dimensionless, and rational if `base` has units
    pub fn rpow(&self, base: &Quantity) -> Result<Quantity> {
        self.rpow_correlated(base, Decimal::ZERO)
    }

    pub fn rpow_correlated(&self, base: &Quantity, correlation: Decimal) -> Result<Quantity> {
        let exponent = self.dimensionless_value("a power")?;
        let (number, unit, base_measured) = if base.is_dimensionless() {
            let b = base.base()?;
            (decimal::powd(b.number, exponent.number)?, Unit::unitless(), b.measured())
        } else {
            let e = decimal::decimal_to_ratio(exponent.number).ok_or_else(|| {
                Error::InvalidExponent(format!(
                    "{} is not a rational exponent for {}",
                    exponent.number,
                    base.unit()
                ))
            })?;
            (decimal::pow_ratio(base.number, e)?, base.unit.pow(e)?, base.measured())
        };
        let uncertainty = propagate(
            Operation::RPow,
            exponent.measured(),
            Operand::Measured(base_measured),
            number,
            correlation,
        )?;
        Ok(Self::build(number, unit, uncertainty, base.pending_cancel))
    }

    /// Square root of a dimensionless quantity
    pub fn sqrt(&self) -> Result<Quantity> {
        self.dimensionless_value("the square root")?.pow(Ratio::new(1, 2))
    }

    pub fn exp(&self) -> Result<Quantity> {
        let x = self.dimensionless_value("exp")?;
        let number = decimal::exp(x.number)?;
        let uncertainty = propagate(Operation::Exp, x.measured(), Operand::None, number, Decimal::ZERO)?;
        Ok(Self::build(number, Unit::unitless(), uncertainty, false))
    }

    pub fn ln(&self) -> Result<Quantity> {
        let x = self.dimensionless_value("ln")?;
        let number = decimal::ln(x.number)?;
        let uncertainty = propagate(Operation::Ln, x.measured(), Operand::None, number, Decimal::ZERO)?;
        Ok(Self::build(number, Unit::unitless(), uncertainty, false))
    }

    pub fn log10(&self) -> Result<Quantity> {
        let x = self.dimensionless_value("log10")?;
        let number = decimal::log10(x.number)?;
        let uncertainty = propagate(Operation::Log10, x.measured(), Operand::None, number, Decimal::ZERO)?;
        Ok(Self::build(number, Unit::unitless(), uncertainty, false))
    }

    pub fn log(&self, base: Decimal) -> Result<Quantity> {
        let x = self.dimensionless_value("log")?;
        let number = decimal::log(x.number, base)?;
        let uncertainty = propagate(Operation::Log, x.measured(), Operand::Exact(base), number, Decimal::ZERO)?;
        Ok(Self::build(number, Unit::unitless(), uncertainty, false))
    }

    /// Express in `target`, which must have the same dimensions
    pub fn to(&self, target: &Unit) -> Result<Quantity> {
        if self.dimensions() != target.dimensions() {
            return Err(Error::mismatched(self.unit(), target));
        }
        if self.number.is_zero() && self.uncertainty.is_zero() {
            return Ok(Self::new(Decimal::ZERO, target.clone()));
        }
        let from = self.unit.to_base()?.scale;
        let to = target.to_base()?.scale;
        let number = decimal::div(decimal::mul(self.number, from)?, to)?;
        let uncertainty = decimal::div(decimal::mul(self.uncertainty, from)?, to)?;
        Ok(Self::build(number, target.clone(), uncertainty, false))
    }

    /// Express in the unit named by a unit string such as `"km h-1"`
    pub fn to_parsed(&self, target: &str) -> Result<Quantity> {
        let unit = crate::registry::registry().parse_unit(target)?;
        self.to(&unit)
    }

    /// Same value in SI base units only
    pub fn base(&self) -> Result<Quantity> {
        let reduction = self.unit.to_base()?;
        Ok(Self::build(
            decimal::mul(self.number, reduction.scale)?,
            reduction.unit,
            decimal::mul(self.uncertainty, reduction.scale)?,
            false,
        ))
    }

    pub fn cancel(&self) -> Quantity {
        Self::build(self.number, self.unit().cancel(), self.uncertainty, false)
    }

    pub fn fully_cancel(&self) -> Result<Quantity> {
        let (scale, unit) = self.unit.fully_cancel()?;
        Ok(Self::build(
            decimal::mul(self.number, scale)?,
            unit,
            decimal::mul(self.uncertainty, scale)?,
            false,
        ))
    }

    pub fn canonical(&self) -> Quantity {
        Self::build(self.number, self.unit.canonical(), self.uncertainty, false)
    }

    /// Order by base-unit value; dimensions must match
    pub fn compare(&self, other: &Quantity) -> Result<Ordering> {
        self.check_dimensions(other)?;
        Ok(self.base()?.number.cmp(&other.base()?.number))
    }

    pub fn gt(&self, other: &Quantity) -> Result<bool> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    pub fn ge(&self, other: &Quantity) -> Result<bool> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    pub fn lt(&self, other: &Quantity) -> Result<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    pub fn le(&self, other: &Quantity) -> Result<bool> {
        Ok(self.compare(other)? != Ordering::Greater)
    }

    pub fn round_to_places(&self, places: i32, pad: bool, mode: RoundingMode) -> Result<Quantity> {
        Ok(self.with_number(decimal::round_to_places(self.number, places, pad, mode)?))
    }

    pub fn round_to_figures(&self, figures: u32, pad: bool, mode: RoundingMode) -> Result<Quantity> {
        Ok(self.with_number(decimal::round_to_figures(self.number, figures, pad, mode)?))
    }

    /// Round the uncertainty to `figures` significant figures (never padded),
    /// then the number to the same decimal place
    pub fn round_to_uncertainty(&self, figures: u32, pad: bool, mode: RoundingMode) -> Result<Quantity> {
        if self.uncertainty.is_zero() || figures < 1 {
            return Ok(self.clone());
        }
        let uncertainty = decimal::round_to_figures(self.uncertainty, figures, false, mode)?;
        let last_digit = match decimal::magnitude(self.uncertainty) {
            Some(mag) if figures < decimal::significant_figures(self.uncertainty) => {
                mag - (figures as i32 - 1)
            }
            _ => -(self.uncertainty.scale() as i32),
        };
        let number = decimal::round_to_places(self.number, -last_digit, pad, mode)?;
        Ok(Self::build(number, self.unit.clone(), uncertainty, self.pending_cancel))
    }

    /// Round the number to the last decimal place of `other`, which must share the unit
    pub fn round_to_resolution_of(
        &self,
        other: &Quantity,
        pad: bool,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        if self.unit() != other.unit() {
            return Err(Error::mismatched(self.unit(), other.unit()));
        }
        self.round_to_places(other.number.scale() as i32, pad, mode)
    }

    /// Round by `method` to `digits` places or significant figures
    pub fn round_by(
        &self,
        method: RoundingMethod,
        digits: i32,
        pad: bool,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let figures = || {
            u32::try_from(digits)
                .map_err(|_| Error::arithmetic(format!("cannot round to {digits} significant figures")))
        };
        match method {
            RoundingMethod::Places => self.round_to_places(digits, pad, mode),
            RoundingMethod::Figures => self.round_to_figures(figures()?, pad, mode),
            RoundingMethod::Uncertainty => self.round_to_uncertainty(figures()?, pad, mode),
        }
    }

    /// Round with the configured method for exact or uncertain quantities
    pub fn round(&self) -> Result<Quantity> {
        let config = config::current();
        let rounding = &config.rounding;
        let method = if self.is_exact() {
            rounding.if_exact
        } else {
            rounding.if_uncertain
        };
        self.round_by(method, rounding.digits(method), rounding.pad, rounding.mode)
    }

    /// Round the uncertainty alone; it is never padded
    pub fn round_uncertainty(
        &self,
        method: RoundingMethod,
        digits: i32,
        mode: RoundingMode,
    ) -> Result<Quantity> {
        let uncertainty = Self::build(self.uncertainty, self.unit.clone(), Decimal::ZERO, false)
            .round_by(method, digits, false, mode)?;
        Ok(Self::build(self.number, self.unit.clone(), uncertainty.number, self.pending_cancel))
    }

    /// The same number with `uncertainty` attached, converted to this quantity's unit
    pub fn plus_minus(&self, uncertainty: &Quantity) -> Result<Quantity> {
        let converted = uncertainty.to(self.unit())?;
        Ok(Self::build(self.number, self.unit.clone(), converted.number, self.pending_cancel))
    }

    pub fn to_float(&self) -> Result<f64> {
        let value = self.dimensionless_value("a float")?;
        value
            .number
            .to_f64()
            .ok_or_else(|| Error::arithmetic(format!("{} does not fit in a float", value.number)))
    }

    /// Truncating conversion to an integer
    pub fn to_integer(&self) -> Result<i64> {
        let value = self.dimensionless_value("an integer")?;
        value
            .number
            .trunc()
            .to_i64()
            .ok_or_else(|| Error::arithmetic(format!("{} does not fit in an integer", value.number)))
    }

    /// Number and uncertainty as printed, without the unit
    pub fn format_number(&self, style: UncertaintyStyle) -> String {
        if self.uncertainty.is_zero() {
            return self.number.to_string();
        }
        if style == UncertaintyStyle::Parentheses && self.uncertainty.scale() == self.number.scale() {
            return format!("{}({})", self.number, self.uncertainty.mantissa());
        }
        format!("{} ± {}", self.number, self.uncertainty)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        match (self.base(), other.base()) {
            (Ok(a), Ok(b)) => a.number == b.number && a.unit.factors() == b.unit.factors(),
            // Not reducible to base units: compare as written
            _ => self.number == other.number && self.unit.factors() == other.unit.factors(),
        }
    }
}

impl Eq for Quantity {}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.base() {
            Ok(base) => {
                base.number.normalize().hash(state);
                base.unit.factors().hash(state);
            }
            Err(_) => {
                self.number.normalize().hash(state);
                self.unit.factors().hash(state);
            }
        }
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl FromStr for Quantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Quantity::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = config::current();
        let unit = self.unit();
        let number = self.format_number(config.printing.uncertainty_style);
        let symbol = unit.symbol_with(config.printing.superscripts);
        if symbol.is_empty() {
            write!(f, "{number}")
        } else if unit.preceding_space() {
            write!(f, "{number} {symbol}")
        } else {
            write!(f, "{number}{symbol}")
        }
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit();
        let symbol = if unit.is_unitless() {
            "unitless".to_string()
        } else {
            unit.symbol_with(true)
        };
        if self.uncertainty.is_zero() {
            write!(f, "Quantity({}, {})", self.number, symbol)
        } else {
            write!(
                f,
                "Quantity({}, {}, uncertainty={})",
                self.number, symbol, self.uncertainty
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal as d;
    use pretty_assertions::assert_eq;

    fn q(s: &str) -> Quantity {
        Quantity::parse(s).unwrap()
    }

    fn unit(s: &str) -> Unit {
        crate::registry::registry().parse_unit(s).unwrap()
    }

    fn hash_of(x: &Quantity) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        x.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_product_renders_cancelled_unit() {
        let speed = q("4 m").mul(&q("1 s-1")).unwrap();
        assert_eq!(speed.number(), d("4"));
        assert_eq!(speed.dimensions(), Dimensions::from_integers([1, 0, -1, 0, 0, 0, 0]));
        assert_eq!(speed.to_string(), "4 m s⁻¹");
    }

    #[test]
    fn test_pending_cancel_is_lazy() {
        let product = q("45 m s").div(&q("1 s")).unwrap();
        assert!(product.is_pending_cancel());
        assert_eq!(product.raw_unit().factors().len(), 3);
        assert_eq!(product.unit().symbol_with(true), "m");
        assert_eq!(q("45 m s s-1").cancel().unit().symbol_with(true), "m");
    }

    #[test]
    fn test_add_converts_to_left_unit() {
        let sum = q("1 km").add(&q("500 m")).unwrap();
        assert_eq!(sum.number(), d("1.5"));
        assert_eq!(sum.unit().symbol_with(true), "km");
    }

    #[test]
    fn test_add_mismatched() {
        let result = q("1 m").add(&q("1 s"));
        assert!(matches!(result, Err(Error::MismatchedUnits { .. })));
    }

    #[test]
    fn test_add_with_uncertainty() {
        let a = q("20 ± 2 m");
        let b = q("30 ± 5 m");
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.number(), d("50"));
        assert_eq!(sum.uncertainty().round_dp(4), d("5.3852"));
    }

    #[test]
    fn test_square_with_uncertainty() {
        let squared = q("20 ± 2 m").powi(2).unwrap();
        assert_eq!(squared.number(), d("400"));
        assert_eq!(squared.uncertainty(), d("80"));
        assert_eq!(squared.unit().symbol_with(true), "m²");
    }

    #[test]
    fn test_scalar_ops() {
        let a = q("20 ± 2 m");
        assert_eq!(a.mul_scalar(d("-2")).unwrap().uncertainty(), d("4"));
        let inv = a.rdiv_scalar(d("10")).unwrap();
        assert_eq!(inv.number(), d("0.5"));
        assert_eq!(inv.uncertainty(), d("0.05"));
        assert_eq!(inv.unit().symbol_with(true), "m⁻¹");
    }

    #[test]
    fn test_conversion_exact() {
        let kj = q("400 J").to(&unit("kJ")).unwrap();
        assert_eq!(kj.number(), d("0.4"));
        assert_eq!(kj.unit().symbol_with(true), "kJ");
    }

    #[test]
    fn test_conversion_round_trip() {
        let original = q("12.5 ft");
        let there = original.to(&unit("m")).unwrap();
        assert_eq!(there.to(&unit("ft")).unwrap().number(), d("12.5"));
        let km = q("3.2 km");
        assert_eq!(km.to(&unit("m")).unwrap().to(&unit("km")).unwrap().number(), d("3.2"));
    }

    #[test]
    fn test_conversion_scales_uncertainty() {
        let converted = q("1.5 ± 0.1 km").to(&unit("m")).unwrap();
        assert_eq!(converted.number(), d("1500"));
        assert_eq!(converted.uncertainty(), d("100"));
    }

    #[test]
    fn test_conversion_mismatch() {
        assert!(matches!(q("1 m").to(&unit("kg")), Err(Error::MismatchedUnits { .. })));
    }

    #[test]
    fn test_fully_cancel() {
        let power = q("30 kW s").div(&q("200 s W-1")).unwrap();
        let cancelled = power.fully_cancel().unwrap();
        assert_eq!(cancelled.number(), d("0.00015"));
        assert_eq!(cancelled.unit().symbol_with(true), "kW²");

        let length = q("3000 m2").div(&q("20 ft")).unwrap().fully_cancel().unwrap();
        assert_eq!(length.unit().symbol_with(true), "m");
        assert_eq!(length.number().round_dp(10), d("492.1259842520"));
    }

    #[test]
    fn test_base() {
        let energy = q("50 J").base().unwrap();
        assert_eq!(energy.number(), d("50"));
        assert_eq!(energy.unit().symbol_with(true), "m² kg s⁻²");
    }

    #[test]
    fn test_equality_via_base() {
        use std::collections::hash_map::DefaultHasher;
        let hash = |x: &Quantity| {
            let mut h = DefaultHasher::new();
            x.hash(&mut h);
            h.finish()
        };
        assert_eq!(q("1000 g"), q("1 kg"));
        assert_eq!(hash(&q("1000 g")), hash(&q("1 kg")));
        assert_eq!(q("3 km"), q("3000 ± 20 m"));
        assert_ne!(q("1 m"), q("1 s"));
        assert_ne!(q("0 m"), q("0 s"));
    }

    #[test]
    fn test_ordering() {
        assert!(q("1 km").gt(&q("999 m")).unwrap());
        assert!(q("1 km").ge(&q("1000 m")).unwrap());
        assert!(q("1 g").lt(&q("1 kg")).unwrap());
        assert!(matches!(q("1 m").gt(&q("1 s")), Err(Error::MismatchedUnits { .. })));
        assert_eq!(q("1 m").partial_cmp(&q("1 s")), None);
    }

    #[test]
    fn test_transcendental_requires_dimensionless() {
        assert!(matches!(q("2 m").ln(), Err(Error::NotDimensionless(_))));
        assert!(matches!(q("2 m").exp(), Err(Error::NotDimensionless(_))));
        assert!(matches!(q("4 m2").sqrt(), Err(Error::NotDimensionless(_))));
        assert!(matches!(q("2 m").to_float(), Err(Error::NotDimensionless(_))));
    }

    #[test]
    fn test_transcendental_uncertainty() {
        let ratio = q("20 ± 2 m").div(&q("30 ± 5 m")).unwrap();
        assert_eq!(ratio.uncertainty().round_dp(7), d("0.1295767"));
        assert_eq!(ratio.ln().unwrap().uncertainty().round_dp(6), d("0.194365"));
        assert_eq!(ratio.log10().unwrap().uncertainty().round_dp(6), d("0.084412"));
        assert_eq!(ratio.exp().unwrap().uncertainty().round_dp(4), d("0.2524"));
        assert_eq!(ratio.rpow_scalar(d("3")).unwrap().uncertainty().round_dp(4), d("0.2961"));
    }

    #[test]
    fn test_rpow_with_units() {
        let exponent = Quantity::dimensionless(d("2"));
        let area = exponent.rpow(&q("3 m")).unwrap();
        assert_eq!(area.number(), d("9"));
        assert_eq!(area.unit().symbol_with(true), "m²");
    }

    #[test]
    fn test_percent_is_dimensionless() {
        assert_eq!(q("50 %").to_float().unwrap(), 0.5);
        assert_eq!(q("250 %").to_integer().unwrap(), 2);
    }

    #[test]
    fn test_rounding() {
        let b = q("543.8826 ± 0.03 m");
        let rounded = b.round_to_uncertainty(1, true, RoundingMode::HalfUp).unwrap();
        assert_eq!(rounded.number().to_string(), "543.88");
        assert_eq!(rounded.uncertainty(), d("0.03"));

        let carry = q("1.23456 ± 0.096 m").round_to_uncertainty(1, true, RoundingMode::HalfUp).unwrap();
        assert_eq!(carry.uncertainty().to_string(), "0.10");
        assert_eq!(carry.number().to_string(), "1.23");

        let figures = q("543.8826 m").round_to_figures(2, true, RoundingMode::HalfUp).unwrap();
        assert_eq!(figures.number(), d("540"));
        let places = q("1.5 m").round_to_places(3, true, RoundingMode::HalfUp).unwrap();
        assert_eq!(places.number().to_string(), "1.500");
    }

    #[test]
    fn test_round_by_method() {
        let q1 = q("2.345 ± 0.1 m");
        let places = q1.round_by(RoundingMethod::Places, 1, true, RoundingMode::HalfUp).unwrap();
        assert_eq!(places.number().to_string(), "2.3");
        assert_eq!(places.uncertainty(), d("0.1"));

        let figures = q("0.012345 m").round_by(RoundingMethod::Figures, 2, true, RoundingMode::HalfUp).unwrap();
        assert_eq!(figures.number().to_string(), "0.012");

        // uncertainty rounding leaves exact quantities alone
        let exact = q("2.345 m").round_by(RoundingMethod::Uncertainty, 1, true, RoundingMode::HalfUp).unwrap();
        assert_eq!(exact.number().to_string(), "2.345");

        assert!(q("1 m").round_by(RoundingMethod::Figures, -1, true, RoundingMode::HalfUp).is_err());
    }

    #[test]
    fn test_round_uses_configured_methods() {
        // defaults: three figures if exact, one uncertainty figure otherwise
        assert_eq!(q("543.8826 m").round().unwrap().number(), d("544"));
        let uncertain = q("543.8826 ± 0.0345 m").round().unwrap();
        assert_eq!(uncertain.number().to_string(), "543.88");
        assert_eq!(uncertain.uncertainty().to_string(), "0.03");
    }

    #[test]
    fn test_round_to_resolution_of() {
        let rounded = q("1.23456 m").round_to_resolution_of(&q("0.01 m"), true, RoundingMode::HalfUp).unwrap();
        assert_eq!(rounded.number().to_string(), "1.23");
        let padded = q("1.5 m").round_to_resolution_of(&q("0.001 m"), true, RoundingMode::HalfUp).unwrap();
        assert_eq!(padded.number().to_string(), "1.500");
        assert!(matches!(
            q("1.5 m").round_to_resolution_of(&q("1 s"), true, RoundingMode::HalfUp),
            Err(Error::MismatchedUnits { .. })
        ));
    }

    #[test]
    fn test_round_uncertainty_keeps_number() {
        let x = q("10.0 ± 0.0456 m");
        let rounded = x.round_uncertainty(RoundingMethod::Figures, 2, RoundingMode::HalfUp).unwrap();
        assert_eq!(rounded.number().to_string(), "10.0");
        assert_eq!(rounded.uncertainty().to_string(), "0.046");

        let places = x.round_uncertainty(RoundingMethod::Places, 1, RoundingMode::Up).unwrap();
        assert_eq!(places.uncertainty().to_string(), "0.1");
    }

    #[test]
    fn test_plus_minus_converts_uncertainty() {
        let x = q("1.5 m").plus_minus(&q("2 cm")).unwrap();
        assert_eq!(x.number(), d("1.5"));
        assert_eq!(x.uncertainty(), d("0.02"));
        assert!(matches!(
            q("1.5 m").plus_minus(&q("2 s")),
            Err(Error::MismatchedUnits { .. })
        ));
    }

    #[test]
    fn test_equality_is_reflexive_when_base_overflows() {
        let huge = q("1e26 km");
        assert!(huge.base().is_err());
        assert_eq!(huge, huge.clone());
        assert_ne!(huge, q("2e26 km"));
        assert_eq!(hash_of(&huge), hash_of(&huge.clone()));
    }

    #[test]
    fn test_exponent_overflow_is_an_error() {
        let big = q("1 m").powi(100_000).unwrap();
        assert!(matches!(big.powi(100_000), Err(Error::InvalidExponent(_))));
        let half = q("1 m").powi(i32::MAX / 2 + 1).unwrap();
        assert!(matches!(half.mul(&half), Err(Error::InvalidExponent(_))));
        assert!(matches!(half.div(&half.inverse().unwrap()), Err(Error::InvalidExponent(_))));
    }

    #[test]
    fn test_display_parses_back() {
        let cases = [
            "4 m s-1",
            "400 kJ",
            "1.234(56) m",
            "50 ± 5.385 m",
            "2",
            "2 ± 0.1",
            "0.50(2)",
            "-3.5 µs",
            "90°",
        ];
        for case in cases {
            let original = q(case);
            let printed = original.to_string();
            let reparsed: Quantity = printed.parse().unwrap();
            assert_eq!(reparsed, original, "{case} printed as {printed}");
            assert_eq!(reparsed.uncertainty(), original.uncertainty(), "{case}");
            assert_eq!(reparsed.to_string(), printed);
        }
    }

    #[test]
    fn test_debug_repr() {
        assert_eq!(format!("{:?}", q("4 m s-1")), "Quantity(4, m s⁻¹)");
        assert_eq!(format!("{:?}", Quantity::dimensionless(d("2"))), "Quantity(2, unitless)");
    }

    #[test]
    fn test_from_input() {
        let x = Quantity::from_input(0.1, unit("m"), Some(NumberInput::from("0.01"))).unwrap();
        assert_eq!(x.number(), d("0.1"));
        assert_eq!(x.uncertainty(), d("0.01"));
        assert!(Quantity::from_input("abc", unit("m"), None).is_err());
    }
}
