//! Unit algebra
//!
//! An [`Atom`] is a single named unit (metre, joule, kilowatt, degree
//! Celsius). A [`Unit`] is an ordered list of atoms raised to rational
//! exponents. Products and quotients simply concatenate factor lists; merging
//! like terms only happens on [`Unit::cancel`], and converting between
//! same-dimension atoms only on [`Unit::fully_cancel`].
//!
//! Equality and hashing go through the reduction to base units, so `kJ` and
//! `1000 J` style units compare equal no matter how they are spelled.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, Div, Mul};
use std::sync::Arc;

use num_rational::Ratio;
use num_traits::{One, Zero};
use once_cell::sync::OnceCell;
use rust_decimal::Decimal;

use super::decimal::{div, mul, pow_ratio};
use super::dimension::{exponent_product, exponent_sum, Dimensions, Exponent};
use super::prefix::Prefix;
use super::quantity::Quantity;
use super::temperature::TemperatureScale;
use crate::config;
use crate::error::{Error, Result};
use crate::format::exponent_suffix;

/// What an atom is defined as
#[derive(Clone)]
pub enum UnitKind {
    /// One of the seven SI base units
    Base { dimension: usize },
    /// A dimensionless unit; `drop` units vanish from products (e.g. `unitless`),
    /// others persist until fully cancelled (radian, steradian)
    Unitless { drop: bool },
    /// A multiple of another unit, e.g. joule = 1 kg m² s⁻²
    Derived { definition: Quantity },
    /// A prefix applied to a root atom, e.g. kilo + metre
    Prefixed { prefix: Prefix, root: Atom },
    /// A temperature scale; its linear value is one degree of the scale in kelvin
    Temperature { scale: TemperatureScale, kelvin: Atom },
}

/// Definition of a single named unit
pub struct UnitDef {
    pub symbol: String,
    pub name: String,
    pub alt_names: Vec<String>,
    pub kind: UnitKind,
    /// Whether a space separates the number from the symbol (`90°` has none)
    pub preceding_space: bool,
    dimensions: Dimensions,
    reduction: OnceCell<Reduction>,
}

impl UnitDef {
    fn new(symbol: &str, name: &str, kind: UnitKind, dimensions: Dimensions) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            alt_names: Vec::new(),
            kind,
            preceding_space: true,
            dimensions,
            reduction: OnceCell::new(),
        }
    }

    pub fn base(symbol: &str, name: &str, dimension: usize) -> Self {
        let mut exponents = [0; 7];
        if let Some(slot) = exponents.get_mut(dimension) {
            *slot = 1;
        }
        Self::new(
            symbol,
            name,
            UnitKind::Base { dimension },
            Dimensions::from_integers(exponents),
        )
    }

    pub fn unitless(symbol: &str, name: &str, drop: bool) -> Self {
        Self::new(symbol, name, UnitKind::Unitless { drop }, Dimensions::DIMENSIONLESS)
    }

    pub fn derived(symbol: &str, name: &str, definition: Quantity) -> Self {
        let dimensions = definition.dimensions();
        Self::new(symbol, name, UnitKind::Derived { definition }, dimensions)
    }

    pub fn temperature(symbol: &str, name: &str, scale: TemperatureScale, kelvin: Atom) -> Self {
        Self::new(
            symbol,
            name,
            UnitKind::Temperature { scale, kelvin },
            Dimensions::TEMPERATURE,
        )
    }

    pub(crate) fn prefixed(prefix: &Prefix, root: &Atom) -> Self {
        let mut def = Self::new(
            &format!("{}{}", prefix.symbol, root.symbol),
            &format!("{}{}", prefix.name, root.name),
            UnitKind::Prefixed {
                prefix: prefix.clone(),
                root: root.clone(),
            },
            root.dimensions,
        );
        def.alt_names = root
            .alt_names
            .iter()
            .map(|alt| format!("{}{}", prefix.name, alt))
            .collect();
        def.preceding_space = root.preceding_space;
        def
    }

    pub fn with_alt_names(mut self, names: &[&str]) -> Self {
        self.alt_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn without_preceding_space(mut self) -> Self {
        self.preceding_space = false;
        self
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}

/// Shared handle to a unit definition
#[derive(Clone)]
pub struct Atom(Arc<UnitDef>);

impl Atom {
    pub fn is_base(&self) -> bool {
        matches!(self.kind, UnitKind::Base { .. })
    }

    pub fn is_unitless(&self) -> bool {
        matches!(self.kind, UnitKind::Unitless { .. })
    }

    /// Unitless atoms that vanish from any product
    pub fn drops(&self) -> bool {
        matches!(self.kind, UnitKind::Unitless { drop: true })
    }

    pub fn is_prefixed(&self) -> bool {
        matches!(self.kind, UnitKind::Prefixed { .. })
    }

    pub fn temperature_scale(&self) -> Option<&TemperatureScale> {
        match &self.kind {
            UnitKind::Temperature { scale, .. } => Some(scale),
            _ => None,
        }
    }

    /// Scale and base-unit factors of this atom, computed once
    pub fn reduction(&self) -> Result<Reduction> {
        if let UnitKind::Base { .. } = self.kind {
            return Ok(Reduction {
                scale: Decimal::ONE,
                unit: Unit::from(self.clone()),
            });
        }
        self.0
            .reduction
            .get_or_try_init(|| self.compute_reduction())
            .cloned()
    }

    fn compute_reduction(&self) -> Result<Reduction> {
        match &self.kind {
            UnitKind::Base { .. } | UnitKind::Unitless { .. } => Ok(Reduction {
                scale: Decimal::ONE,
                unit: Unit::unitless(),
            }),
            UnitKind::Derived { definition } => {
                let base = definition.raw_unit().to_base()?;
                Ok(Reduction {
                    scale: mul(definition.number(), base.scale)?,
                    unit: base.unit,
                })
            }
            UnitKind::Prefixed { prefix, root } => {
                let base = root.reduction()?;
                Ok(Reduction {
                    scale: mul(prefix.multiplier, base.scale)?,
                    unit: base.unit,
                })
            }
            UnitKind::Temperature { scale, kelvin } => Ok(Reduction {
                scale: scale.degree()?,
                unit: Unit::from(kelvin.clone()),
            }),
        }
    }

    /// Sort key for canonical ordering: base units by dimension, then by symbol
    fn canonical_key(&self) -> (u8, usize, &str) {
        match self.kind {
            UnitKind::Base { dimension } => (0, dimension, ""),
            _ => (1, 0, self.symbol.as_str()),
        }
    }
}

impl From<UnitDef> for Atom {
    fn from(def: UnitDef) -> Self {
        Atom(Arc::new(def))
    }
}

impl Deref for Atom {
    type Target = UnitDef;

    fn deref(&self) -> &UnitDef {
        &self.0
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || (self.name == other.name && self.symbol == other.symbol)
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.symbol.hash(state);
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.symbol)
    }
}

/// An atom raised to a rational power
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Factor {
    pub unit: Atom,
    pub exponent: Exponent,
}

impl Factor {
    pub fn new(unit: Atom, exponent: Exponent) -> Self {
        Self { unit, exponent }
    }
}

/// Numeric scale and base-unit form of a unit
#[derive(Debug, Clone)]
pub struct Reduction {
    pub scale: Decimal,
    pub unit: Unit,
}

/// Ordered product of unit factors, possibly with uncancelled duplicates
///
/// Every unit passes through [`Unit::new`] or is derived from one that did,
/// so the exponent sums behind its dimensions and cancellation fit in `i32`.
#[derive(Clone)]
pub struct Unit {
    factors: Vec<Factor>,
    dimensions: Dimensions,
    base: Arc<OnceCell<Reduction>>,
}

impl Unit {
    /// Build from factors, or `InvalidExponent` if their exponents overflow
    pub fn new(factors: Vec<Factor>) -> Result<Self> {
        let dimensions = factors.iter().try_fold(Dimensions::DIMENSIONLESS, |acc, f| {
            acc.add(&f.unit.dimensions().scale(f.exponent)?)
        })?;
        merge(&factors)?;
        Ok(Self::assemble(factors, dimensions))
    }

    fn assemble(factors: Vec<Factor>, dimensions: Dimensions) -> Self {
        Self {
            factors,
            dimensions,
            base: Arc::new(OnceCell::new()),
        }
    }

    /// The empty product
    pub fn unitless() -> Self {
        Self::assemble(Vec::new(), Dimensions::DIMENSIONLESS)
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// True when there are no factors at all
    pub fn is_unitless(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimensions().is_dimensionless()
    }

    /// The single atom this unit consists of, if it is exactly one atom to the first power
    pub fn as_atom(&self) -> Option<&Atom> {
        match self.factors.as_slice() {
            [f] if f.exponent.is_one() => Some(&f.unit),
            _ => None,
        }
    }

    /// Concatenate factor lists; nothing is merged
    pub fn multiply(&self, other: &Unit) -> Result<Unit> {
        let mut factors = self.factors.clone();
        factors.extend(other.factors.iter().cloned());
        Unit::new(factors)
    }

    pub fn divide(&self, other: &Unit) -> Result<Unit> {
        self.multiply(&other.inverse())
    }

    pub fn inverse(&self) -> Unit {
        let factors = self
            .factors
            .iter()
            .map(|f| Factor::new(f.unit.clone(), -f.exponent))
            .collect();
        Self::assemble(factors, -self.dimensions)
    }

    /// Raise every factor to `k`; `k = 0` gives the unitless unit
    pub fn pow(&self, k: Exponent) -> Result<Unit> {
        if k.is_zero() {
            return Ok(Unit::unitless());
        }
        if k.is_one() {
            return Ok(self.clone());
        }
        let factors = self
            .factors
            .iter()
            .map(|f| Ok(Factor::new(f.unit.clone(), exponent_product(f.exponent, k)?)))
            .collect::<Result<Vec<_>>>()?;
        Unit::new(factors)
    }

    /// Merge factors of the same atom in first-seen order, dropping zero
    /// exponents and dropping unitless atoms
    pub fn cancel(&self) -> Unit {
        match merge(&self.factors) {
            Ok(merged) => Self::assemble(merged, self.dimensions),
            // `new` already ran the same merge
            Err(_) => self.clone(),
        }
    }

    /// Cancel, then convert every atom into the first base unit (else the
    /// first atom) of the same dimension. Persistent unitless atoms are removed.
    /// Returns the factor the number must be multiplied by.
    pub fn fully_cancel(&self) -> Result<(Decimal, Unit)> {
        let factors: Vec<Factor> = self
            .cancel()
            .factors
            .into_iter()
            .filter(|f| !f.unit.is_unitless())
            .collect();

        let mut scale = Decimal::ONE;
        let mut merged: Vec<Factor> = Vec::with_capacity(factors.len());
        for factor in &factors {
            let dimensions = factor.unit.dimensions();
            let target = factors
                .iter()
                .find(|g| g.unit.is_base() && g.unit.dimensions() == dimensions)
                .or_else(|| factors.iter().find(|g| g.unit.dimensions() == dimensions))
                .map(|g| g.unit.clone())
                .unwrap_or_else(|| factor.unit.clone());

            if target != factor.unit {
                let conversion =
                    Unit::from(factor.unit.clone()).conversion_factor(&Unit::from(target.clone()))?;
                scale = mul(scale, pow_ratio(conversion, factor.exponent)?)?;
            }
            accumulate(&mut merged, &target, factor.exponent)?;
        }
        merged.retain(|f| !f.exponent.is_zero());
        Ok((scale, Self::assemble(merged, self.dimensions)))
    }

    /// Cancelled factors sorted as m, kg, s, A, K, mol, cd, then by symbol
    pub fn canonical(&self) -> Unit {
        let mut factors = self.cancel().factors;
        factors.sort_by(|a, b| a.unit.canonical_key().cmp(&b.unit.canonical_key()));
        Self::assemble(factors, self.dimensions)
    }

    /// Scale and base-unit form, computed once per unit
    pub fn to_base(&self) -> Result<Reduction> {
        self.base.get_or_try_init(|| self.compute_base()).cloned()
    }

    fn compute_base(&self) -> Result<Reduction> {
        let mut scale = Decimal::ONE;
        let mut base: Vec<Factor> = Vec::new();
        for factor in &self.factors {
            let reduction = factor.unit.reduction()?;
            scale = mul(scale, pow_ratio(reduction.scale, factor.exponent)?)?;
            for inner in reduction.unit.factors() {
                accumulate(&mut base, &inner.unit, exponent_product(inner.exponent, factor.exponent)?)?;
            }
        }
        base.retain(|f| !f.exponent.is_zero());
        base.sort_by(|a, b| a.unit.canonical_key().cmp(&b.unit.canonical_key()));
        Ok(Reduction {
            scale,
            unit: Self::assemble(base, self.dimensions),
        })
    }

    /// Factor converting a number in this unit into a number in `target`
    pub fn conversion_factor(&self, target: &Unit) -> Result<Decimal> {
        if self.dimensions() != target.dimensions() {
            return Err(Error::mismatched(self.symbol(), target.symbol()));
        }
        div(self.to_base()?.scale, target.to_base()?.scale)
    }

    /// Symbol with superscripts (`m s⁻¹`) or ASCII exponents (`m s-1`)
    pub fn symbol_with(&self, superscripts: bool) -> String {
        self.factors
            .iter()
            .map(|f| format!("{}{}", f.unit.symbol, exponent_suffix(f.exponent, superscripts)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Symbol following the current printing configuration
    pub fn symbol(&self) -> String {
        self.symbol_with(config::current().printing.superscripts)
    }

    /// Whether a number printed before this unit is followed by a space
    pub fn preceding_space(&self) -> bool {
        match self.factors.first() {
            Some(f) => f.unit.preceding_space,
            None => true,
        }
    }
}

/// Add `exponent` to the factor for `unit`, appending it if not present
fn accumulate(factors: &mut Vec<Factor>, unit: &Atom, exponent: Exponent) -> Result<()> {
    match factors.iter_mut().find(|f| f.unit == *unit) {
        Some(existing) => existing.exponent = exponent_sum(existing.exponent, exponent)?,
        None => factors.push(Factor::new(unit.clone(), exponent)),
    }
    Ok(())
}

/// Like terms merged in first-seen order, without zero exponents or dropping atoms
fn merge(factors: &[Factor]) -> Result<Vec<Factor>> {
    let mut merged: Vec<Factor> = Vec::with_capacity(factors.len());
    for factor in factors.iter().filter(|f| !f.unit.drops()) {
        accumulate(&mut merged, &factor.unit, factor.exponent)?;
    }
    merged.retain(|f| !f.exponent.is_zero());
    Ok(merged)
}

impl From<Atom> for Unit {
    fn from(atom: Atom) -> Self {
        let dimensions = atom.dimensions();
        Unit::assemble(vec![Factor::new(atom, Ratio::from_integer(1))], dimensions)
    }
}

impl From<&Atom> for Unit {
    fn from(atom: &Atom) -> Self {
        Unit::from(atom.clone())
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::unitless()
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_base(), other.to_base()) {
            (Ok(a), Ok(b)) => a.scale == b.scale && a.unit.factors == b.unit.factors,
            _ => self.factors == other.factors,
        }
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.to_base() {
            Ok(reduction) => {
                reduction.scale.normalize().hash(state);
                reduction.unit.factors.hash(state);
            }
            Err(_) => self.factors.hash(state),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unitless() {
            write!(f, "Unit(unitless)")
        } else {
            write!(f, "Unit({})", self.symbol_with(true))
        }
    }
}

impl Mul for &Unit {
    type Output = Result<Unit>;

    fn mul(self, rhs: &Unit) -> Result<Unit> {
        self.multiply(rhs)
    }
}

impl Mul for Unit {
    type Output = Result<Unit>;

    fn mul(self, rhs: Unit) -> Result<Unit> {
        self.multiply(&rhs)
    }
}

impl Div for &Unit {
    type Output = Result<Unit>;

    fn div(self, rhs: &Unit) -> Result<Unit> {
        self.divide(rhs)
    }
}

impl Div for Unit {
    type Output = Result<Unit>;

    fn div(self, rhs: Unit) -> Result<Unit> {
        self.divide(&rhs)
    }
}
