// lib.rs

pub mod calculation;
pub mod calculator;
pub mod completion;
pub mod config;
pub mod error;
pub mod history;
pub mod input_validator;
pub mod logging;
pub mod memento;
pub mod operations;
pub mod parser;
pub mod persistence;
pub mod repl;
pub mod util;

pub use calculation::{Calculation, CalculationRecord};
pub use calculator::Calculator;
pub use config::CalculatorConfig;
pub use error::{CalculatorError, Result};
pub use history::{AutoSaveObserver, HistoryObserver, LoggingObserver};
pub use memento::CalculatorMemento;
pub use operations::Operation;
