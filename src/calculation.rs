// calculation.rs

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CalculatorError, Result};
use crate::input_validator::parse_decimal;
use crate::operations::Operation;

/// Column order of the tabular history representation.
pub const RECORD_COLUMNS: [&str; 5] = ["operation", "operand1", "operand2", "result", "timestamp"];

/// One completed operation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    operation: Operation,
    operand1: Decimal,
    operand2: Decimal,
    result: Decimal,
    timestamp: DateTime<Local>,
}

/// All-text form of a [`Calculation`], used for memento dictionaries and
/// history file rows. Decimals keep their exact string representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub operation: String,
    pub operand1: String,
    pub operand2: String,
    pub result: String,
    pub timestamp: String,
}

impl Calculation {
    pub fn new(operation: Operation, operand1: Decimal, operand2: Decimal) -> Result<Self> {
        let result = operation.execute(operand1, operand2)?;
        Ok(Self {
            operation,
            operand1,
            operand2,
            result,
            timestamp: Local::now(),
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn operand1(&self) -> Decimal {
        self.operand1
    }

    pub fn operand2(&self) -> Decimal {
        self.operand2
    }

    pub fn result(&self) -> Decimal {
        self.result
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn to_record(&self) -> CalculationRecord {
        CalculationRecord {
            operation: self.operation.name().to_string(),
            operand1: self.operand1.to_string(),
            operand2: self.operand2.to_string(),
            result: self.result.to_string(),
            timestamp: format_timestamp(&self.timestamp),
        }
    }

    /// Rebuilds a calculation from its text form. The stored result is kept
    /// as-is rather than recomputed.
    pub fn from_record(record: &CalculationRecord) -> Result<Self> {
        Ok(Self {
            operation: record.operation.parse()?,
            operand1: decimal_field("operand1", &record.operand1)?,
            operand2: decimal_field("operand2", &record.operand2)?,
            result: decimal_field("result", &record.result)?,
            timestamp: parse_timestamp(&record.timestamp)?,
        })
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}) = {}",
            self.operation,
            self.operand1.normalize(),
            self.operand2.normalize(),
            self.result.normalize()
        )
    }
}

fn decimal_field(field: &str, text: &str) -> Result<Decimal> {
    parse_decimal(text)
        .ok_or_else(|| CalculatorError::validation(format!("Invalid {} value: '{}'", field, text)))
}

pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Reads RFC 3339 timestamps, falling back to offset-less ISO-8601 which is
/// taken as local time.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Local>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Local));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .ok_or_else(|| CalculatorError::validation(format!("Invalid timestamp: '{}'", text)))
}
