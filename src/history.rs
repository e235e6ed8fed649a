// history.rs

use std::path::PathBuf;

use tracing::info;

use crate::calculation::Calculation;
use crate::persistence;

/// Receives every calculation the engine commits.
///
/// `history` is the committed history after the new record was appended;
/// observers only ever see it read-only.
pub trait HistoryObserver {
    fn notify(&self, calculation: &Calculation, history: &[Calculation]) -> anyhow::Result<()>;
}

/// Writes one log event per calculation.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl HistoryObserver for LoggingObserver {
    fn notify(&self, calculation: &Calculation, _history: &[Calculation]) -> anyhow::Result<()> {
        info!(
            operation = calculation.operation().name(),
            operand1 = %calculation.operand1(),
            operand2 = %calculation.operand2(),
            result = %calculation.result(),
            "calculation performed"
        );
        Ok(())
    }
}

/// Persists the full history after each calculation when enabled.
#[derive(Debug)]
pub struct AutoSaveObserver {
    history_file: PathBuf,
    enabled: bool,
}

impl AutoSaveObserver {
    pub fn new(history_file: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            history_file: history_file.into(),
            enabled,
        }
    }
}

impl HistoryObserver for AutoSaveObserver {
    fn notify(&self, _calculation: &Calculation, history: &[Calculation]) -> anyhow::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        persistence::save_history(&self.history_file, history)?;
        info!(path = %self.history_file.display(), records = history.len(), "history auto-saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Operation;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    #[test]
    fn auto_save_writes_committed_history() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("auto.csv");
        let calc = Calculation::new(Operation::Addition, Decimal::from(2), Decimal::from(3)).unwrap();
        let history = vec![calc.clone()];

        AutoSaveObserver::new(&path, true).notify(&calc, &history).unwrap();
        assert_eq!(persistence::load_history(&path).unwrap(), history);
    }

    #[test]
    fn disabled_auto_save_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("auto.csv");
        let calc = Calculation::new(Operation::Addition, Decimal::from(2), Decimal::from(3)).unwrap();

        AutoSaveObserver::new(&path, false).notify(&calc, &[calc.clone()]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn logging_observer_never_fails() {
        let calc = Calculation::new(Operation::Power, Decimal::from(2), Decimal::from(8)).unwrap();
        assert!(LoggingObserver::new().notify(&calc, &[]).is_ok());
    }
}
