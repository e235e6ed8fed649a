// persistence.rs

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{debug, error};

use crate::calculation::{Calculation, CalculationRecord, RECORD_COLUMNS};
use crate::error::{CalculatorError, Result};

/// Writes `history` as CSV with the fixed column header, even when empty.
///
/// Rows go to a sibling temp file that is renamed over `path` once fully
/// flushed, so a failed save never leaves a truncated history file behind.
pub fn save_history(path: &Path, history: &[Calculation]) -> Result<()> {
    write_csv(path, history).map_err(|e| {
        error!(path = %path.display(), error = %e, "saving history failed");
        CalculatorError::operation(format!("Failed to save history: {:#}", e))
    })
}

/// Reads a history file. A missing or empty file is an empty history.
pub fn load_history(path: &Path) -> Result<Vec<Calculation>> {
    if !path.exists() {
        debug!(path = %path.display(), "no history file");
        return Ok(Vec::new());
    }
    read_csv(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "loading history failed");
        CalculatorError::operation(format!("Failed to load history: {:#}", e))
    })
}

pub fn history_rows(history: &[Calculation]) -> Vec<CalculationRecord> {
    history.iter().map(Calculation::to_record).collect()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_csv(path: &Path, history: &[Calculation]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    let tmp = temp_path(path);
    {
        let file = File::create(&tmp).with_context(|| format!("cannot create {}", tmp.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        writer.write_record(RECORD_COLUMNS)?;
        for row in history_rows(history) {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("cannot replace {}", path.display()));
    }
    Ok(())
}

fn read_csv(path: &Path) -> anyhow::Result<Vec<Calculation>> {
    let metadata = fs::metadata(path).with_context(|| format!("cannot stat {}", path.display()))?;
    if metadata.len() == 0 {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    if !headers.iter().map(str::trim).eq(RECORD_COLUMNS) {
        bail!(
            "unexpected columns [{}], expected [{}]",
            headers.iter().collect::<Vec<_>>().join(", "),
            RECORD_COLUMNS.join(", ")
        );
    }

    let mut history = Vec::new();
    for (line, row) in reader.deserialize::<CalculationRecord>().enumerate() {
        let record = row.with_context(|| format!("row {}", line + 1))?;
        let calculation =
            Calculation::from_record(&record).with_context(|| format!("row {}", line + 1))?;
        history.push(calculation);
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn calc(op: Operation, a: &str, b: &str) -> Calculation {
        Calculation::new(op, Decimal::from_str(a).unwrap(), Decimal::from_str(b).unwrap()).unwrap()
    }

    #[test]
    fn empty_history_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history").join("calc.csv");
        save_history(&path, &[]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "operation,operand1,operand2,result,timestamp");
        assert!(load_history(&path).unwrap().is_empty());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calc.csv");
        let history = vec![
            calc(Operation::Addition, "2", "3"),
            calc(Operation::Subtraction, "10.25", "0.05"),
            calc(Operation::Multiplication, "3", "4"),
            calc(Operation::Division, "1", "3"),
        ];
        save_history(&path, &history).unwrap();

        let loaded = load_history(&path).unwrap();
        assert_eq!(loaded, history);
        assert_eq!(loaded[0].result().to_string(), "5");
        assert_eq!(loaded[1].result().to_string(), "10.20");
        assert_eq!(loaded[2].result().to_string(), "12");
        assert_eq!(loaded[3].result(), history[3].result());
    }

    #[test]
    fn missing_and_zero_byte_files_are_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(load_history(&path).unwrap().is_empty());

        fs::write(&path, "").unwrap();
        assert!(load_history(&path).unwrap().is_empty());
    }

    #[test]
    fn reads_offset_less_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(
            &path,
            "operation,operand1,operand2,result,timestamp\nAddition,2,3,5,2024-05-01T10:00:00.5\n",
        )
        .unwrap();
        let loaded = load_history(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].operation(), Operation::Addition);
        assert_eq!(loaded[0].result(), Decimal::from(5));
    }

    #[test]
    fn malformed_file_is_a_load_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");

        fs::write(&path, "a,b\n1,2\n").unwrap();
        let err = load_history(&path).unwrap_err();
        assert!(err.is_operation());
        assert!(err.to_string().starts_with("Failed to load history"));

        fs::write(
            &path,
            "operation,operand1,operand2,result,timestamp\nAddition,x,3,5,2024-05-01T10:00:00\n",
        )
        .unwrap();
        assert!(load_history(&path).unwrap_err().to_string().starts_with("Failed to load history"));
    }

    #[test]
    fn unwritable_destination_is_a_save_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = save_history(&blocker.join("calc.csv"), &[]).unwrap_err();
        assert!(err.is_operation());
        assert!(err.to_string().starts_with("Failed to save history"));
    }
}
