// input_validator.rs

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::config::CalculatorConfig;
use crate::error::{CalculatorError, Result};

/// Parses operand text as an exact decimal. Accepts plain (`-12.50`) and
/// scientific (`1.5e3`) notation; never goes through `f64`.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

pub fn validate_number(text: &str, config: &CalculatorConfig) -> Result<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CalculatorError::validation("Input cannot be empty"));
    }
    let value = parse_decimal(trimmed)
        .ok_or_else(|| CalculatorError::validation(format!("Invalid number format: {}", trimmed)))?;
    if value.abs() > config.max_input_value {
        return Err(CalculatorError::validation(format!(
            "Value exceeds maximum allowed: {}",
            config.max_input_value
        )));
    }
    Ok(value.normalize())
}
