// memento.rs

use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::calculation::{format_timestamp, parse_timestamp, Calculation, CalculationRecord};
use crate::error::{CalculatorError, Result};

/// Snapshot of the whole history at one point in time.
///
/// Holds its own copy of every record, so later changes to the live history
/// never reach a captured memento.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorMemento {
    history: Vec<Calculation>,
    timestamp: DateTime<Local>,
}

#[derive(Deserialize)]
struct MementoDict {
    history: Vec<CalculationRecord>,
    timestamp: String,
}

impl CalculatorMemento {
    pub fn capture(history: &[Calculation]) -> Self {
        Self {
            history: history.to_vec(),
            timestamp: Local::now(),
        }
    }

    pub fn history(&self) -> &[Calculation] {
        &self.history
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn into_history(self) -> Vec<Calculation> {
        self.history
    }

    /// `{"history": [record, ...], "timestamp": "<ISO-8601>"}`
    pub fn to_dict(&self) -> Value {
        let history: Vec<Value> = self
            .history
            .iter()
            .map(|calculation| {
                let record = calculation.to_record();
                json!({
                    "operation": record.operation,
                    "operand1": record.operand1,
                    "operand2": record.operand2,
                    "result": record.result,
                    "timestamp": record.timestamp,
                })
            })
            .collect();
        json!({
            "history": history,
            "timestamp": format_timestamp(&self.timestamp),
        })
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        let dict = MementoDict::deserialize(data)
            .map_err(|e| CalculatorError::validation(format!("Invalid memento data: {}", e)))?;
        let history = dict
            .history
            .iter()
            .map(Calculation::from_record)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            history,
            timestamp: parse_timestamp(&dict.timestamp)?,
        })
    }
}
