// error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculatorError {
    /// Input that cannot be interpreted: bad numbers, unknown operations,
    /// operands outside an operation's domain of definition.
    #[error("{0}")]
    Validation(String),
    /// Missing operation, arithmetic failures and persistence failures.
    #[error("{0}")]
    Operation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CalculatorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CalculatorError::Validation(msg.into())
    }

    pub fn operation(msg: impl Into<String>) -> Self {
        CalculatorError::Operation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        CalculatorError::Configuration(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CalculatorError::Validation(_))
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, CalculatorError::Operation(_))
    }
}

pub type Result<T> = std::result::Result<T, CalculatorError>;
