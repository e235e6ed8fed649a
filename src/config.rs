// config.rs

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{CalculatorError, Result};

pub const DEFAULT_MAX_HISTORY_SIZE: usize = 1000;
pub const DEFAULT_PRECISION: u32 = 10;
pub const MAX_PRECISION: u32 = 28;

/// Paths and limits for one calculator instance.
///
/// Built explicitly and handed to [`crate::Calculator::new`]; nothing reads
/// the environment after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    pub base_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_file: PathBuf,
    pub history_dir: PathBuf,
    pub history_file: PathBuf,
    pub max_history_size: usize,
    pub auto_save: bool,
    pub precision: u32,
    pub max_input_value: Decimal,
    pub default_encoding: String,
}

impl CalculatorConfig {
    /// Default layout rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let log_dir = base_dir.join("logs");
        let history_dir = base_dir.join("history");
        Self {
            log_file: log_dir.join("calculator.log"),
            history_file: history_dir.join("calculator_history.csv"),
            base_dir,
            log_dir,
            history_dir,
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            auto_save: true,
            precision: DEFAULT_PRECISION,
            max_input_value: Decimal::MAX,
            default_encoding: "utf-8".to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves every `CALCULATOR_*` setting through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_dir = match lookup("CALCULATOR_BASE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().map_err(|e| {
                CalculatorError::configuration(format!("cannot resolve current directory: {}", e))
            })?,
        };
        let mut config = Self::new(base_dir);

        if let Some(dir) = lookup("CALCULATOR_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
            config.log_file = config.log_dir.join("calculator.log");
        }
        if let Some(file) = lookup("CALCULATOR_LOG_FILE") {
            config.log_file = PathBuf::from(file);
        }
        if let Some(dir) = lookup("CALCULATOR_HISTORY_DIR") {
            config.history_dir = PathBuf::from(dir);
            config.history_file = config.history_dir.join("calculator_history.csv");
        }
        if let Some(file) = lookup("CALCULATOR_HISTORY_FILE") {
            config.history_file = PathBuf::from(file);
        }
        if let Some(raw) = lookup("CALCULATOR_MAX_HISTORY_SIZE") {
            config.max_history_size = parse_setting("CALCULATOR_MAX_HISTORY_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("CALCULATOR_AUTO_SAVE") {
            config.auto_save = parse_flag(&raw).ok_or_else(|| {
                CalculatorError::configuration(format!("CALCULATOR_AUTO_SAVE: invalid boolean '{}'", raw))
            })?;
        }
        if let Some(raw) = lookup("CALCULATOR_PRECISION") {
            config.precision = parse_setting("CALCULATOR_PRECISION", &raw)?;
        }
        if let Some(raw) = lookup("CALCULATOR_MAX_INPUT_VALUE") {
            config.max_input_value = Decimal::from_str(raw.trim())
                .or_else(|_| Decimal::from_scientific(raw.trim()))
                .map_err(|_| {
                    CalculatorError::configuration(format!(
                        "CALCULATOR_MAX_INPUT_VALUE: invalid number '{}'",
                        raw
                    ))
                })?;
        }
        if let Some(encoding) = lookup("CALCULATOR_DEFAULT_ENCODING") {
            config.default_encoding = encoding;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_history_size == 0 {
            return Err(CalculatorError::configuration("max_history_size must be positive"));
        }
        if self.precision > MAX_PRECISION {
            return Err(CalculatorError::configuration(format!(
                "precision must be at most {}",
                MAX_PRECISION
            )));
        }
        if self.max_input_value.is_sign_negative() {
            return Err(CalculatorError::configuration("max_input_value must not be negative"));
        }
        let encoding = self.default_encoding.to_ascii_lowercase();
        if encoding != "utf-8" && encoding != "utf8" {
            return Err(CalculatorError::configuration(format!(
                "unsupported encoding '{}'",
                self.default_encoding
            )));
        }
        Ok(())
    }
}

fn parse_setting<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| CalculatorError::configuration(format!("{}: invalid value '{}'", key, raw)))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_layout_is_rooted_at_base_dir() {
        let config = CalculatorConfig::new("/tmp/calc");
        assert_eq!(config.log_file, PathBuf::from("/tmp/calc/logs/calculator.log"));
        assert_eq!(
            config.history_file,
            PathBuf::from("/tmp/calc/history/calculator_history.csv")
        );
        assert_eq!(config.max_history_size, DEFAULT_MAX_HISTORY_SIZE);
        assert!(config.auto_save);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_values_override_defaults() {
        let config = CalculatorConfig::from_lookup(lookup_from(&[
            ("CALCULATOR_BASE_DIR", "/srv/calc"),
            ("CALCULATOR_MAX_HISTORY_SIZE", "25"),
            ("CALCULATOR_AUTO_SAVE", "off"),
            ("CALCULATOR_PRECISION", "4"),
            ("CALCULATOR_MAX_INPUT_VALUE", "1e6"),
            ("CALCULATOR_HISTORY_FILE", "/srv/other.csv"),
        ]))
        .unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/srv/calc"));
        assert_eq!(config.log_dir, PathBuf::from("/srv/calc/logs"));
        assert_eq!(config.history_file, PathBuf::from("/srv/other.csv"));
        assert_eq!(config.max_history_size, 25);
        assert!(!config.auto_save);
        assert_eq!(config.precision, 4);
        assert_eq!(config.max_input_value, Decimal::from(1_000_000));
    }

    #[test]
    fn rejects_bad_values() {
        let zero = CalculatorConfig::from_lookup(lookup_from(&[
            ("CALCULATOR_BASE_DIR", "/x"),
            ("CALCULATOR_MAX_HISTORY_SIZE", "0"),
        ]));
        assert!(matches!(zero, Err(CalculatorError::Configuration(_))));

        let garbage = CalculatorConfig::from_lookup(lookup_from(&[
            ("CALCULATOR_BASE_DIR", "/x"),
            ("CALCULATOR_PRECISION", "lots"),
        ]));
        assert!(matches!(garbage, Err(CalculatorError::Configuration(_))));

        let encoding = CalculatorConfig::from_lookup(lookup_from(&[
            ("CALCULATOR_BASE_DIR", "/x"),
            ("CALCULATOR_DEFAULT_ENCODING", "latin-1"),
        ]));
        assert!(matches!(encoding, Err(CalculatorError::Configuration(_))));
    }
}
