//! Error types for quantor-core

use thiserror::Error;

/// Errors raised by quantity arithmetic, parsing and the unit registry
#[derive(Debug, Error)]
pub enum Error {
    /// Two operands (or a value and a target unit) have different dimensions
    #[error("Mismatched units: {left} and {right} have different dimensions")]
    MismatchedUnits { left: String, right: String },

    /// An operation that only makes sense for dimensionless values got a dimensional one
    #[error("Not dimensionless: {0}")]
    NotDimensionless(String),

    #[error("Parsing error: {0}")]
    Parsing(String),

    /// A name or symbol was registered twice
    #[error("Already defined: {0}")]
    AlreadyDefined(String),

    #[error("Already prefixed: {0}")]
    AlreadyPrefixed(String),

    #[error("Not prefixable: {0}")]
    NotPrefixable(String),

    /// A raw dimension vector did not have exactly seven entries
    #[error("Incomplete dimensions: expected 7 exponents, got {0}")]
    IncompleteDimensions(usize),

    #[error("Not a temperature: {0}")]
    NotATemperature(String),

    #[error("Invalid exponent: {0}")]
    InvalidExponent(String),

    /// Overflow, division by zero or a value outside a function's domain
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn mismatched(left: impl ToString, right: impl ToString) -> Self {
        Error::MismatchedUnits {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub(crate) fn arithmetic(msg: impl Into<String>) -> Self {
        Error::Arithmetic(msg.into())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result type alias for quantor operations
pub type Result<T> = std::result::Result<T, Error>;
