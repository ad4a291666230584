//! Configuration for rounding, arithmetic and printing
//!
//! Configuration is read from `config.toml` in the user's config directory
//! (e.g. `~/.config/quantor/config.toml`). Every section and key is optional.
//!
//! ```toml
//! [rounding]
//! mode = "half_even"
//! figures = 4
//! if_exact = "places"
//!
//! [arithmetic]
//! auto_cancel = false
//!
//! [printing]
//! superscripts = false
//! uncertainty_style = "plus_minus"
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{FloatPolicy, RoundingMethod, RoundingMode};

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rounding: RoundingConfig,

    #[serde(default)]
    pub arithmetic: ArithmeticConfig,

    #[serde(default)]
    pub printing: PrintingConfig,
}

/// Defaults used by the rounding methods when no explicit argument is given
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundingConfig {
    #[serde(default)]
    pub mode: RoundingMode,

    #[serde(default = "default_true")]
    pub pad: bool,

    #[serde(default = "default_places")]
    pub places: i32,

    #[serde(default = "default_figures")]
    pub figures: u32,

    #[serde(default = "default_uncertainty_figures")]
    pub uncertainty_figures: u32,

    /// Method `round()` uses for exact quantities
    #[serde(default = "default_if_exact")]
    pub if_exact: RoundingMethod,

    /// Method `round()` uses for quantities with an uncertainty
    #[serde(default = "default_if_uncertain")]
    pub if_uncertain: RoundingMethod,
}

impl RoundingConfig {
    /// Configured digit count for `method`: places, figures or uncertainty figures
    pub fn digits(&self, method: RoundingMethod) -> i32 {
        match method {
            RoundingMethod::Places => self.places,
            RoundingMethod::Figures => self.figures as i32,
            RoundingMethod::Uncertainty => self.uncertainty_figures as i32,
        }
    }
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            mode: RoundingMode::default(),
            pad: true,
            places: default_places(),
            figures: default_figures(),
            uncertainty_figures: default_uncertainty_figures(),
            if_exact: default_if_exact(),
            if_uncertain: default_if_uncertain(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticConfig {
    /// Mark products and quotients for cancellation when their unit is read
    #[serde(default = "default_true")]
    pub auto_cancel: bool,

    #[serde(default)]
    pub float_policy: FloatPolicy,
}

impl Default for ArithmeticConfig {
    fn default() -> Self {
        Self {
            auto_cancel: true,
            float_policy: FloatPolicy::default(),
        }
    }
}

/// How an uncertainty is printed next to its number
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintyStyle {
    /// `1.234(56) m`, falling back to `±` when the places don't line up
    #[default]
    Parentheses,
    /// `1.234 ± 0.056 m`
    PlusMinus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintingConfig {
    #[serde(default = "default_true")]
    pub superscripts: bool,

    #[serde(default)]
    pub uncertainty_style: UncertaintyStyle,
}

impl Default for PrintingConfig {
    fn default() -> Self {
        Self {
            superscripts: true,
            uncertainty_style: UncertaintyStyle::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_places() -> i32 {
    2
}

fn default_figures() -> u32 {
    3
}

fn default_uncertainty_figures() -> u32 {
    1
}

fn default_if_exact() -> RoundingMethod {
    RoundingMethod::Figures
}

fn default_if_uncertain() -> RoundingMethod {
    RoundingMethod::Uncertainty
}

impl Config {
    /// Load configuration from the standard config path, or defaults if absent
    pub fn find() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                tracing::debug!("No config file found at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// `<config dir>/quantor/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "quantor").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

static CURRENT: Lazy<RwLock<Arc<Config>>> = Lazy::new(|| RwLock::new(Arc::new(Config::default())));

/// Replace the process-wide configuration
pub fn install(config: Config) {
    let mut guard = CURRENT.write().unwrap_or_else(|e| e.into_inner());
    *guard = Arc::new(config);
}

/// Snapshot of the process-wide configuration
pub fn current() -> Arc<Config> {
    CURRENT.read().unwrap_or_else(|e| e.into_inner()).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rounding.mode, RoundingMode::HalfUp);
        assert!(config.rounding.pad);
        assert_eq!(config.rounding.places, 2);
        assert_eq!(config.rounding.figures, 3);
        assert_eq!(config.rounding.uncertainty_figures, 1);
        assert_eq!(config.rounding.if_exact, RoundingMethod::Figures);
        assert_eq!(config.rounding.if_uncertain, RoundingMethod::Uncertainty);
        assert!(config.arithmetic.auto_cancel);
        assert!(config.printing.superscripts);
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [rounding]
            mode = "half_even"

            [printing]
            superscripts = false
            uncertainty_style = "plus_minus"
            "#,
        )
        .unwrap();
        assert_eq!(config.rounding.mode, RoundingMode::HalfEven);
        assert_eq!(config.rounding.figures, 3);
        assert!(!config.printing.superscripts);
        assert_eq!(config.printing.uncertainty_style, UncertaintyStyle::PlusMinus);
        assert!(config.arithmetic.auto_cancel);
    }

    #[test]
    fn test_rounding_methods() {
        let config = Config::from_toml_str(
            r#"
            [rounding]
            places = 4
            if_exact = "places"
            if_uncertain = "figures"
            "#,
        )
        .unwrap();
        assert_eq!(config.rounding.if_exact, RoundingMethod::Places);
        assert_eq!(config.rounding.if_uncertain, RoundingMethod::Figures);
        assert_eq!(config.rounding.digits(RoundingMethod::Places), 4);
        assert_eq!(config.rounding.digits(RoundingMethod::Figures), 3);
        assert_eq!(config.rounding.digits(RoundingMethod::Uncertainty), 1);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[rounding]\nmode = \"sideways\"");
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }
}
