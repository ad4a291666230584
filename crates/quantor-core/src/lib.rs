//! quantor-core: Core engine for quantor
//!
//! This crate provides physical quantities with exact decimal arithmetic,
//! a unit algebra over the seven SI dimensions, first-order uncertainty
//! propagation, temperature and logarithmic scales, and a small calculator
//! language on top of them. It has no UI dependencies.
//!
//! # Example
//!
//! ```
//! use quantor_core::{registry, Engine};
//!
//! let mut engine = Engine::new();
//!
//! // Units follow the numbers
//! let result = engine.eval("4 m * 1 s-1");
//! assert_eq!(result.to_string(), "4 m s⁻¹");
//!
//! // Conversion
//! let result = engine.eval("400 J to kJ");
//! assert_eq!(result.as_f64(), Some(0.4));
//!
//! // Unit strings
//! let unit = registry().parse_unit("kg m2 / s").unwrap();
//! assert_eq!(unit.symbol_with(false), "kg m2 s-1");
//! ```

pub mod config;
pub mod error;
pub mod eval;
pub mod format;
pub mod parser;
pub mod registry;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use eval::EvalContext;
pub use parser::{parse_line, Ast, BinaryOp, ConversionMode, Expr};
pub use registry::{registry, Constant, Registry};
pub use types::{
    Atom, Dimensions, Exponent, LogarithmicQuantity, LogarithmicUnit, Prefix, Quantity,
    RoundingMethod, RoundingMode, Temperature, TemperatureScale, Unit, UnitDef, UnitKind, Value,
};

/// Main engine for evaluating calculator lines
pub struct Engine {
    context: EvalContext,
    lines: Vec<LineResult>,
}

/// Result of evaluating a single line
#[derive(Debug, Clone)]
pub struct LineResult {
    pub input: String,
    pub value: Value,
}

impl Engine {
    /// Create a new engine instance
    pub fn new() -> Self {
        Self {
            context: EvalContext::new(),
            lines: Vec::new(),
        }
    }

    /// Evaluate a single line and store the result
    pub fn eval(&mut self, input: &str) -> Value {
        let result = match parse_line(input) {
            Ok(ast) => eval::evaluate(&ast, &mut self.context),
            Err(e) => Value::Error(e.to_string()),
        };

        tracing::trace!(input, result = %result, "evaluated line");
        self.lines.push(LineResult {
            input: input.to_string(),
            value: result.clone(),
        });

        result
    }

    /// Evaluate without storing the result (for previews)
    pub fn eval_preview(&self, input: &str) -> Value {
        let mut ctx = self.context.clone();
        match parse_line(input) {
            Ok(ast) => eval::evaluate(&ast, &mut ctx),
            Err(e) => Value::Error(e.to_string()),
        }
    }

    /// Get all line results
    pub fn lines(&self) -> &[LineResult] {
        &self.lines
    }

    /// Variables assigned so far, sorted by name
    pub fn variables(&self) -> Vec<(&str, &Value)> {
        self.context.variables()
    }

    /// Clear all lines and variables
    pub fn clear(&mut self) {
        self.lines.clear();
        self.context.clear_variables();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Decimal literal for tests
#[cfg(test)]
pub(crate) fn decimal(s: &str) -> rust_decimal::Decimal {
    types::decimal::parse_decimal(s).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engine_basic() {
        let mut engine = Engine::new();
        let result = engine.eval("10 + 20");
        assert_eq!(result.as_decimal(), Some(decimal("30")));
        assert_eq!(engine.lines().len(), 1);
    }

    #[test]
    fn test_engine_variables() {
        let mut engine = Engine::new();
        engine.eval("dist = 100 m");
        let result = engine.eval("dist + 50 m");
        assert_eq!(result.to_string(), "150 m");

        let vars = engine.variables();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].0, "dist");
    }

    #[test]
    fn test_engine_preview_keeps_state() {
        let mut engine = Engine::new();
        engine.eval("x = 2 s");
        let preview = engine.eval_preview("y = x * 3");
        assert_eq!(preview.to_string(), "6 s");
        assert!(engine.variables().iter().all(|(name, _)| *name != "y"));
        assert_eq!(engine.lines().len(), 1);
    }

    #[test]
    fn test_engine_errors_are_values() {
        let mut engine = Engine::new();
        assert!(engine.eval("1 m + 1 s").is_error());
        assert!(engine.eval("10 +").is_error());
        assert!(engine.eval("((1 m) ^ 100000) ^ 100000").is_error());
        engine.clear();
        assert!(engine.lines().is_empty());
        assert!(engine.variables().is_empty());
    }
}
