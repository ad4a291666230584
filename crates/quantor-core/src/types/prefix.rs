//! Unit prefixes (metric and binary)

use rust_decimal::Decimal;

use super::unit::{Atom, UnitDef, UnitKind};
use crate::error::{Error, Result};

/// A named multiplier such as kilo (1000) or kibi (1024)
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub symbol: String,
    pub name: String,
    pub multiplier: Decimal,
}

impl Prefix {
    pub fn new(symbol: &str, name: &str, multiplier: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            multiplier,
        }
    }

    /// Build the prefixed atom, e.g. kilo + metre = kilometre
    pub fn apply(&self, root: &Atom) -> Result<Atom> {
        match root.kind {
            UnitKind::Prefixed { .. } => Err(Error::AlreadyPrefixed(format!(
                "{} already carries a prefix",
                root.name
            ))),
            UnitKind::Temperature { .. } | UnitKind::Unitless { drop: true } => Err(
                Error::NotPrefixable(format!("{} cannot take a prefix", root.name)),
            ),
            _ => Ok(Atom::from(UnitDef::prefixed(self, root))),
        }
    }
}
