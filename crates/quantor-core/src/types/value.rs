//! Result of evaluating a calculator line

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{LogarithmicQuantity, Quantity, Temperature};

/// A computed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Number with unit and uncertainty; plain numbers are unitless quantities
    Quantity(Quantity),
    /// Point on a temperature scale
    Temperature(Temperature),
    /// Level on a logarithmic scale
    Logarithmic(LogarithmicQuantity),
    /// No value (empty line or comment)
    Empty,
    /// Error during evaluation
    Error(String),
}

impl Value {
    pub fn number(n: Decimal) -> Self {
        Value::Quantity(Quantity::dimensionless(n))
    }

    /// The number shown for this value, ignoring units
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Quantity(q) => Some(q.number()),
            Value::Temperature(t) => Some(t.number()),
            Value::Logarithmic(l) => Some(l.number()),
            Value::Empty | Value::Error(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_decimal().and_then(|d| d.to_f64())
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Value::Quantity(q) => Some(q),
            _ => None,
        }
    }

    /// Standard uncertainty in the value's own unit, if it has one
    pub fn uncertainty(&self) -> Option<Decimal> {
        match self {
            Value::Quantity(q) if !q.is_exact() => Some(q.uncertainty()),
            Value::Temperature(t) if !t.uncertainty().is_zero() => Some(t.uncertainty()),
            _ => None,
        }
    }

    /// Unit symbol as displayed, empty for plain numbers
    pub fn unit_symbol(&self) -> String {
        match self {
            Value::Quantity(q) => q.unit().symbol(),
            Value::Temperature(t) => t.unit().symbol.clone(),
            Value::Logarithmic(l) => l.unit().symbol.clone(),
            Value::Empty | Value::Error(_) => String::new(),
        }
    }

    /// Short name of the variant, used by the JSON-RPC server
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Quantity(q) if q.unit().is_unitless() => "number",
            Value::Quantity(_) => "quantity",
            Value::Temperature(_) => "temperature",
            Value::Logarithmic(_) => "logarithmic",
            Value::Empty => "empty",
            Value::Error(_) => "error",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl From<Quantity> for Value {
    fn from(q: Quantity) -> Self {
        Value::Quantity(q)
    }
}

impl From<Temperature> for Value {
    fn from(t: Temperature) -> Self {
        Value::Temperature(t)
    }
}

impl From<LogarithmicQuantity> for Value {
    fn from(l: LogarithmicQuantity) -> Self {
        Value::Logarithmic(l)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Quantity(q) => write!(f, "{q}"),
            Value::Temperature(t) => write!(f, "{t}"),
            Value::Logarithmic(l) => write!(f, "{l}"),
            Value::Empty => Ok(()),
            Value::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}
