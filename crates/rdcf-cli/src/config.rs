//! Optional TOML configuration for the `rdcf` CLI.
//!
//! Every section has defaults, so the file may be absent or partial.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use rdcf_core::valuation::ModelInputs;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rdcf.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelDefaults,
    pub display: DisplayConfig,
    pub telemetry: TelemetryConfig,
}

/// Model parameters used when a flag is not given. Always fractions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelDefaults {
    pub cost_of_capital: Decimal,
    pub roce: Decimal,
    pub high_growth_rate: Decimal,
    pub high_growth_years: u32,
    pub fade_years: u32,
    pub terminal_growth_rate: Decimal,
    pub tax_rate: Decimal,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        ModelDefaults {
            cost_of_capital: dec!(0.10),
            roce: dec!(0.20),
            high_growth_rate: dec!(0.15),
            high_growth_years: 15,
            fade_years: 15,
            terminal_growth_rate: dec!(0.02),
            tax_rate: dec!(0.25),
        }
    }
}

impl From<&ModelDefaults> for ModelInputs {
    fn from(d: &ModelDefaults) -> Self {
        ModelInputs {
            cost_of_capital: d.cost_of_capital,
            roce: d.roce,
            high_growth_rate: d.high_growth_rate,
            high_growth_years: d.high_growth_years,
            fade_years: d.fade_years,
            terminal_growth_rate: d.terminal_growth_rate,
            tax_rate: d.tax_rate,
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places for displayed multiples and percentages
    pub decimals: u32,
    /// Treat rate flags as percentages (10 = 10%)
    pub percent_inputs: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            decimals: 2,
            percent_inputs: false,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            log_level: "warn".into(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        Self::parse(&contents).map_err(|e| format!("Failed to parse '{}': {}", path.display(), e).into())
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// An explicit path must exist; otherwise `rdcf.toml` is used if present,
    /// falling back to built-in defaults.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        match explicit {
            Some(path) => Self::load(Path::new(path)),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(&fallback)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }
}
