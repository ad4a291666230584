//! Unit registry: every named unit, prefix, logarithmic unit and constant
//!
//! Units are looked up by symbol, name or alternative name. The standard
//! registry is built once from the tables in [`catalog`] and shared through
//! [`registry()`]; a custom registry can be built with [`Registry::standard`]
//! and extended before use.

mod catalog;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::parser::{parse_quantity_with, parse_unit_with};
use crate::types::decimal::{div, mul, parse_decimal};
use crate::types::{
    Atom, LogBase, LogarithmicUnit, Prefix, Quantity, TemperatureScale, Unit, UnitDef,
};
use catalog::Prefixing;

/// A named physical constant
#[derive(Debug, Clone)]
pub struct Constant {
    pub symbol: String,
    pub name: String,
    pub value: Quantity,
}

/// Symbol and name tables for units, prefixes, logarithmic units and constants
#[derive(Default)]
pub struct Registry {
    units: Vec<Atom>,
    unit_keys: HashMap<String, Atom>,
    prefixes: Vec<Prefix>,
    prefix_keys: HashMap<String, Prefix>,
    logarithmic: Vec<LogarithmicUnit>,
    logarithmic_keys: HashMap<String, LogarithmicUnit>,
    constants: Vec<Constant>,
    constant_keys: HashMap<String, Constant>,
}

static REGISTRY: Lazy<Registry> =
    Lazy::new(|| Registry::standard().expect("standard unit catalog is consistent"));

/// The process-wide standard registry
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Micro sign (U+00B5) and Greek mu are both accepted for the micro prefix
fn normalise(key: &str) -> std::borrow::Cow<'_, str> {
    if key.contains('\u{b5}') {
        key.replace('\u{b5}', "\u{3bc}").into()
    } else {
        key.into()
    }
}

/// Parse a catalog number, which may be a multiple or fraction of π
fn catalog_number(s: &str) -> Result<Decimal> {
    let Some((multiple, divisor)) = s.split_once('π') else {
        return parse_decimal(s);
    };
    let multiple = if multiple.is_empty() {
        Decimal::ONE
    } else {
        parse_decimal(multiple)?
    };
    let value = mul(multiple, Decimal::PI)?;
    match divisor.strip_prefix('/') {
        Some(d) => div(value, parse_decimal(d)?),
        None => Ok(value),
    }
}

fn keys_of(symbol: &str, name: &str, alt_names: &[String]) -> Vec<String> {
    let mut keys = vec![symbol.to_string()];
    for key in std::iter::once(name).chain(alt_names.iter().map(String::as_str)) {
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

impl Registry {
    /// Build the standard catalog: base units, unitless units, prefixes,
    /// temperature scales, derived units, generated prefixed variants,
    /// logarithmic units and constants
    pub fn standard() -> Result<Self> {
        let mut registry = Registry::default();

        for entry in catalog::METRIC_PREFIXES.iter().chain(catalog::BINARY_PREFIXES) {
            registry.add_prefix(Prefix::new(
                entry.symbol,
                entry.name,
                parse_decimal(entry.multiplier)?,
            ))?;
        }

        let mut prefixable: Vec<(Atom, Prefixing)> = Vec::new();

        for entry in catalog::BASE_UNITS {
            let atom = registry.add_unit(
                UnitDef::base(entry.symbol, entry.name, entry.dimension)
                    .with_alt_names(entry.alt_names),
            )?;
            prefixable.push((atom, entry.prefixing));
        }

        for entry in catalog::UNITLESS_UNITS {
            registry.add_unit(UnitDef::unitless(entry.symbol, entry.name, entry.drop))?;
        }

        let kelvin = registry.lookup("K")?;
        for entry in catalog::TEMPERATURE_SCALES {
            let scale = TemperatureScale::new(
                parse_decimal(entry.degree_numer)?,
                parse_decimal(entry.degree_denom)?,
                parse_decimal(entry.zero_point)?,
            );
            registry.add_unit(
                UnitDef::temperature(entry.symbol, entry.name, scale, kelvin.clone())
                    .with_alt_names(entry.alt_names),
            )?;
        }

        for entry in catalog::DERIVED {
            let definition =
                Quantity::new(catalog_number(entry.value)?, registry.parse_unit(entry.unit)?);
            let mut def = UnitDef::derived(entry.symbol, entry.name, definition)
                .with_alt_names(entry.alt_names);
            if !entry.preceding_space {
                def = def.without_preceding_space();
            }
            let atom = registry.add_unit(def)?;
            prefixable.push((atom, entry.prefixing));
        }

        for (root, prefixing) in &prefixable {
            registry.generate_prefixed(root, *prefixing)?;
        }

        registry.add_logarithmic_catalog()?;

        for entry in catalog::CONSTANTS {
            let value = registry.parse_quantity(entry.value)?;
            registry.add_constant(Constant {
                symbol: entry.symbol.to_string(),
                name: entry.name.to_string(),
                value,
            })?;
        }

        tracing::debug!(
            units = registry.units.len(),
            prefixes = registry.prefixes.len(),
            logarithmic = registry.logarithmic.len(),
            constants = registry.constants.len(),
            "built unit registry"
        );
        Ok(registry)
    }

    fn add_logarithmic_catalog(&mut self) -> Result<()> {
        let deci = self
            .prefix("deci")
            .ok_or_else(|| Error::Parsing("unknown prefix 'deci'".to_string()))?;

        let bel = LogarithmicUnit::new("B", "bel", LogBase::Ten, Decimal::ONE);
        let decibel = bel.prefixed(&deci)?;
        let neper = LogarithmicUnit::new("Np", "neper", LogBase::E, Decimal::ONE);

        let dbw = decibel.with_reference(self.parse_quantity("1 W")?, "W", "dBW");
        let dbm = decibel.with_reference(self.parse_quantity("1 mW")?, "m", "dBm");
        // Field quantities: power goes as the square of a voltage
        let mut dbv = decibel.with_reference(self.parse_quantity("1 V")?, "V", "dBV");
        dbv.prefactor = Decimal::from(20);

        let magnitude = LogarithmicUnit::new("mag", "magnitude", LogBase::Ten, Decimal::new(-25, 1))
            .with_reference(self.parse_quantity("3640 Jy")?, "", "magnitude");

        for unit in [bel, decibel, neper, dbw, dbm, dbv, magnitude] {
            self.add_logarithmic(unit)?;
        }
        Ok(())
    }

    /// Generated prefixed variants of `root`. A variant that reproduces an
    /// existing unit exactly (kilo + gram) is skipped silently; any other
    /// symbol collision is skipped with a warning.
    fn generate_prefixed(&mut self, root: &Atom, prefixing: Prefixing) -> Result<()> {
        let prefixes: Vec<Prefix> = match prefixing {
            Prefixing::None => return Ok(()),
            Prefixing::Metric => self.metric_prefixes().cloned().collect(),
            Prefixing::Data => self
                .metric_prefixes()
                .filter(|p| p.multiplier >= Decimal::ONE_THOUSAND)
                .chain(self.binary_prefixes())
                .cloned()
                .collect(),
        };

        for prefix in &prefixes {
            let atom = prefix.apply(root)?;
            let taken = keys_of(&atom.symbol, &atom.name, &atom.alt_names)
                .into_iter()
                .find_map(|key| self.unit_keys.get(&key).cloned());
            match taken {
                Some(existing) if Unit::from(&existing) == Unit::from(&atom) => {
                    tracing::debug!("{} is already defined as {}", atom.name, existing.name);
                }
                Some(existing) => {
                    tracing::warn!(
                        "skipping {} ({}): symbol or name already used by {}",
                        atom.name,
                        atom.symbol,
                        existing.name
                    );
                }
                None => self.insert_unit(atom),
            }
        }
        Ok(())
    }

    fn metric_prefixes(&self) -> impl Iterator<Item = &Prefix> {
        self.prefixes.iter().take(catalog::METRIC_PREFIXES.len())
    }

    fn binary_prefixes(&self) -> impl Iterator<Item = &Prefix> {
        self.prefixes
            .iter()
            .skip(catalog::METRIC_PREFIXES.len())
            .take(catalog::BINARY_PREFIXES.len())
    }

    fn insert_unit(&mut self, atom: Atom) {
        for key in keys_of(&atom.symbol, &atom.name, &atom.alt_names) {
            self.unit_keys.insert(key, atom.clone());
        }
        self.units.push(atom);
    }

    /// Register a unit; a symbol or name that is already in use is `AlreadyDefined`
    pub fn add_unit(&mut self, def: UnitDef) -> Result<Atom> {
        for key in keys_of(&def.symbol, &def.name, &def.alt_names) {
            if let Some(existing) = self.unit_keys.get(&key) {
                return Err(Error::AlreadyDefined(format!(
                    "'{key}' is already used by {}",
                    existing.name
                )));
            }
        }
        let atom = Atom::from(def);
        self.insert_unit(atom.clone());
        Ok(atom)
    }

    /// Register `prefix` applied to `root`, e.g. kilo + watthour
    pub fn add_prefixed(&mut self, prefix: &Prefix, root: &Atom) -> Result<Atom> {
        let atom = prefix.apply(root)?;
        for key in keys_of(&atom.symbol, &atom.name, &atom.alt_names) {
            if self.unit_keys.contains_key(&key) {
                return Err(Error::AlreadyDefined(format!("'{key}' is already defined")));
            }
        }
        self.insert_unit(atom.clone());
        Ok(atom)
    }

    pub fn add_prefix(&mut self, prefix: Prefix) -> Result<()> {
        for key in [&prefix.symbol, &prefix.name] {
            if self.prefix_keys.contains_key(key.as_str()) {
                return Err(Error::AlreadyDefined(format!("prefix '{key}' is already defined")));
            }
        }
        self.prefix_keys.insert(prefix.symbol.clone(), prefix.clone());
        self.prefix_keys.insert(prefix.name.clone(), prefix.clone());
        self.prefixes.push(prefix);
        Ok(())
    }

    pub fn add_logarithmic(&mut self, unit: LogarithmicUnit) -> Result<()> {
        let keys = keys_of(&unit.symbol, &unit.name, &unit.alt_names);
        if let Some(key) = keys.iter().find(|k| self.logarithmic_keys.contains_key(k.as_str())) {
            return Err(Error::AlreadyDefined(format!(
                "logarithmic unit '{key}' is already defined"
            )));
        }
        for key in keys {
            self.logarithmic_keys.insert(key, unit.clone());
        }
        self.logarithmic.push(unit);
        Ok(())
    }

    pub fn add_constant(&mut self, constant: Constant) -> Result<()> {
        for key in [&constant.symbol, &constant.name] {
            if self.constant_keys.contains_key(key.as_str()) {
                return Err(Error::AlreadyDefined(format!("constant '{key}' is already defined")));
            }
        }
        self.constant_keys.insert(constant.symbol.clone(), constant.clone());
        self.constant_keys.insert(constant.name.clone(), constant.clone());
        self.constants.push(constant);
        Ok(())
    }

    /// Unit by symbol, name or alternative name
    pub fn unit(&self, name_or_symbol: &str) -> Option<Atom> {
        self.unit_keys.get(&*normalise(name_or_symbol)).cloned()
    }

    fn lookup(&self, name_or_symbol: &str) -> Result<Atom> {
        self.unit(name_or_symbol)
            .ok_or_else(|| Error::Parsing(format!("unknown unit '{name_or_symbol}'")))
    }

    /// Temperature scale unit (°C, °F, °R, °Ré) by symbol or name
    pub fn temperature(&self, name_or_symbol: &str) -> Option<Atom> {
        self.unit(name_or_symbol)
            .filter(|atom| atom.temperature_scale().is_some())
    }

    pub fn prefix(&self, name_or_symbol: &str) -> Option<Prefix> {
        self.prefix_keys.get(&*normalise(name_or_symbol)).cloned()
    }

    pub fn logarithmic(&self, name_or_symbol: &str) -> Option<LogarithmicUnit> {
        self.logarithmic_keys.get(name_or_symbol).cloned()
    }

    pub fn constant(&self, name_or_symbol: &str) -> Option<&Constant> {
        self.constant_keys.get(name_or_symbol)
    }

    /// Parse a unit string against this registry
    pub fn parse_unit(&self, s: &str) -> Result<Unit> {
        parse_unit_with(s, &|symbol| self.lookup(symbol))
    }

    /// Parse a quantity string against this registry
    pub fn parse_quantity(&self, s: &str) -> Result<Quantity> {
        parse_quantity_with(s, &|symbol| self.lookup(symbol))
    }

    /// Names of every registered unit, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.units.iter().map(|atom| atom.name.as_str()).collect()
    }

    pub fn units(&self) -> &[Atom] {
        &self.units
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    /// Units whose symbol, name or alternative names contain `needle`, ignoring case
    pub fn search(&self, needle: &str) -> Vec<Atom> {
        let needle = needle.to_lowercase();
        self.units
            .iter()
            .filter(|atom| {
                keys_of(&atom.symbol, &atom.name, &atom.alt_names)
                    .iter()
                    .any(|key| key.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal as d;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_catalog_builds() {
        let r = Registry::standard();
        assert!(r.is_ok(), "{:?}", r.err());
        let r = r.unwrap();
        for atom in r.units() {
            assert!(r.unit(&atom.symbol).is_some(), "{} is not reachable", atom.symbol);
        }
        assert_eq!(r.unit("kJ").unwrap().dimensions(), r.unit("J").unwrap().dimensions());
        assert!(!r.constants().is_empty());
    }

    #[test]
    fn test_lookup_by_symbol_name_and_alt_name() {
        let r = registry();
        assert_eq!(r.unit("m").unwrap().name, "metre");
        assert_eq!(r.unit("metre").unwrap().symbol, "m");
        assert_eq!(r.unit("meter").unwrap().symbol, "m");
        assert_eq!(r.unit("celsius").unwrap().symbol, "°C");
        assert!(r.unit("furlong").is_none());
    }

    #[test]
    fn test_generated_prefixes() {
        let r = registry();
        assert_eq!(r.unit("km").unwrap().name, "kilometre");
        assert_eq!(r.unit("kilometer").unwrap().symbol, "km");
        assert_eq!(r.unit("μs").unwrap().name, "microsecond");
        assert_eq!(r.unit("\u{b5}s").unwrap().name, "microsecond");
        assert_eq!(r.unit("kWh").unwrap().name, "kilowatthour");
        assert_eq!(r.unit("MiB").unwrap().name, "mebibyte");
        assert!(r.unit("dB").is_none());
        assert!(r.unit("mft").is_none());
    }

    #[test]
    fn test_kilogram_is_the_base_unit() {
        let kg = registry().unit("kg").unwrap();
        assert!(kg.is_base());
        assert_eq!(registry().unit("kilogram").unwrap(), kg);
        assert_eq!(registry().unit("mg").unwrap().name, "milligram");
    }

    #[test]
    fn test_colliding_variant_skipped() {
        assert_eq!(registry().unit("ft").unwrap().name, "foot");
        assert_eq!(registry().unit("ct").unwrap().name, "carat");
    }

    #[test]
    fn test_already_defined() {
        let mut r = Registry::standard().unwrap();
        let result = r.add_unit(UnitDef::base("m", "other_metre", 0));
        assert!(matches!(result, Err(Error::AlreadyDefined(_))));
        let result = r.add_unit(UnitDef::unitless("xyz", "metre", false));
        assert!(matches!(result, Err(Error::AlreadyDefined(_))));
    }

    #[test]
    fn test_add_custom_unit() {
        let mut r = Registry::standard().unwrap();
        let definition = r.parse_quantity("201.168 m").unwrap();
        let furlong = r.add_unit(UnitDef::derived("fur", "furlong", definition)).unwrap();
        assert_eq!(r.unit("furlong").unwrap(), furlong);
        let q = r.parse_quantity("8 fur").unwrap();
        assert_eq!(q.to(&r.parse_unit("m").unwrap()).unwrap().number(), d("1609.344"));
    }

    #[test]
    fn test_add_prefixed() {
        let mut r = Registry::standard().unwrap();
        let kilo = r.prefix("k").unwrap();
        let km = r.unit("km").unwrap();
        assert!(matches!(r.add_prefixed(&kilo, &km), Err(Error::AlreadyPrefixed(_))));
        let metre = r.unit("m").unwrap();
        assert!(matches!(r.add_prefixed(&kilo, &metre), Err(Error::AlreadyDefined(_))));
    }

    #[test]
    fn test_prefix_lookup() {
        assert_eq!(registry().prefix("kilo").unwrap().multiplier, d("1000"));
        assert_eq!(registry().prefix("Ki").unwrap().multiplier, d("1024"));
        assert_eq!(registry().prefix("\u{b5}").unwrap().name, "micro");
    }

    #[test]
    fn test_temperature_lookup() {
        assert!(registry().temperature("°F").is_some());
        assert!(registry().temperature("K").is_none());
    }

    #[test]
    fn test_constants() {
        let c = registry().constant("c").unwrap();
        assert_eq!(c.name, "speed_of_light");
        assert_eq!(c.value.number(), d("299792458"));
        let g = registry().constant("gravitational_constant").unwrap();
        assert_eq!(g.value.uncertainty(), d("0.00015e-11"));
    }

    #[test]
    fn test_angles_use_pi() {
        let degree = registry().unit("°").unwrap();
        assert!(!degree.preceding_space);
        let scale = Unit::from(degree).to_base().unwrap().scale;
        assert_eq!(scale.round_dp(10), d("0.0174532925"));
    }

    #[test]
    fn test_search() {
        let found = registry().search("watt");
        assert!(found.iter().any(|a| a.symbol == "W"));
        assert!(found.iter().any(|a| a.symbol == "kWh"));
        assert!(registry().names().contains(&"joule"));
    }

    #[test]
    fn test_logarithmic_namespace() {
        assert_eq!(registry().logarithmic("B").unwrap().name, "bel");
        assert_eq!(registry().unit("B").unwrap().name, "byte");
        assert_eq!(registry().logarithmic("decibel").unwrap().symbol, "dB");
    }
}
