//! Value types for quantor: numbers, dimensions, units and quantities

pub mod decimal;
pub mod dimension;
pub mod logarithmic;
pub mod prefix;
pub mod quantity;
pub mod temperature;
pub mod uncertainty;
pub mod unit;
mod value;

pub use decimal::{FloatPolicy, NumberInput, RoundingMethod, RoundingMode};
pub use dimension::{Dimensions, Exponent, DIMENSION_SYMBOLS};
pub use logarithmic::{LogBase, LogarithmicQuantity, LogarithmicUnit};
pub use prefix::Prefix;
pub use quantity::Quantity;
pub use temperature::{Temperature, TemperatureScale};
pub use uncertainty::{propagate, Measured, Operand, Operation};
pub use unit::{Atom, Factor, Reduction, Unit, UnitDef, UnitKind};
pub use value::Value;
