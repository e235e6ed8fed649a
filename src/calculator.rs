// calculator.rs

use std::fs;
use std::rc::Rc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculation::{Calculation, CalculationRecord};
use crate::config::CalculatorConfig;
use crate::error::{CalculatorError, Result};
use crate::history::HistoryObserver;
use crate::input_validator::validate_number;
use crate::memento::CalculatorMemento;
use crate::operations::Operation;
use crate::persistence;

/// The history engine: live history plus undo and redo stacks of snapshots.
///
/// Every mutating call runs to completion before returning. Nothing here is
/// shared across threads; wrap the whole engine in one lock if that changes,
/// since compute/undo/redo/clear each touch several containers.
pub struct Calculator {
    config: CalculatorConfig,
    history: Vec<Calculation>,
    undo_stack: Vec<CalculatorMemento>,
    redo_stack: Vec<CalculatorMemento>,
    observers: Vec<Rc<dyn HistoryObserver>>,
    operation: Option<Operation>,
}

impl Calculator {
    /// Validates `config`, prepares the history directory and loads any
    /// persisted history. A history file that fails to load is logged and
    /// the engine starts empty.
    pub fn new(config: CalculatorConfig) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.history_dir).map_err(|e| {
            CalculatorError::configuration(format!(
                "cannot create history directory {}: {}",
                config.history_dir.display(),
                e
            ))
        })?;

        let mut calculator = Self {
            config,
            history: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            observers: Vec::new(),
            operation: None,
        };
        if let Err(e) = calculator.load_history() {
            warn!(error = %e, "could not load existing history, starting empty");
        }
        info!(
            history_file = %calculator.config.history_file.display(),
            max_history_size = calculator.config.max_history_size,
            "Calculator initialized with configuration"
        );
        Ok(calculator)
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn history(&self) -> &[Calculation] {
        &self.history
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn operation(&self) -> Option<Operation> {
        self.operation
    }

    pub fn set_operation(&mut self, operation: Operation) {
        info!(operation = operation.name(), "operation set");
        self.operation = Some(operation);
    }

    /// Applies to future calculations only; history already longer than `size`
    /// is trimmed on the next compute.
    pub fn set_max_history_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(CalculatorError::configuration("max_history_size must be positive"));
        }
        self.config.max_history_size = size;
        Ok(())
    }

    /// Registers `observer`. Registering the same observer twice is a no-op.
    pub fn add_observer(&mut self, observer: Rc<dyn HistoryObserver>) {
        if self.observers.iter().any(|o| same_observer(o, &observer)) {
            return;
        }
        self.observers.push(observer);
    }

    pub fn remove_observer(&mut self, observer: &Rc<dyn HistoryObserver>) {
        self.observers.retain(|o| !same_observer(o, observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Computes `a <op> b` with the current operation and records it.
    ///
    /// State is untouched on any error. On success the pre-call history is
    /// pushed on the undo stack, the redo stack is cleared and observers are
    /// notified in registration order.
    pub fn perform_operation(&mut self, a: &str, b: &str) -> Result<Decimal> {
        let operation = self
            .operation
            .ok_or_else(|| CalculatorError::operation("No operation set"))?;
        let operand1 = validate_number(a, &self.config)?;
        let operand2 = validate_number(b, &self.config)?;
        let calculation = Calculation::new(operation, operand1, operand2)?;
        let result = calculation.result();

        self.undo_stack.push(CalculatorMemento::capture(&self.history));
        self.history.push(calculation.clone());
        if self.history.len() > self.config.max_history_size {
            let excess = self.history.len() - self.config.max_history_size;
            self.history.drain(..excess);
        }
        self.redo_stack.clear();

        info!(%calculation, "calculation recorded");
        self.notify_observers(&calculation);
        Ok(result)
    }

    fn notify_observers(&self, calculation: &Calculation) {
        for observer in &self.observers {
            if let Err(e) = observer.notify(calculation, &self.history) {
                warn!(error = %e, "observer failed, continuing");
            }
        }
    }

    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(memento) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(CalculatorMemento::capture(&self.history));
        self.history = memento.into_history();
        info!(history_len = self.history.len(), "undo");
        true
    }

    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(memento) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(CalculatorMemento::capture(&self.history));
        self.history = memento.into_history();
        info!(history_len = self.history.len(), "redo");
        true
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
        info!("history cleared");
    }

    pub fn show_history(&self) -> Vec<String> {
        self.history.iter().map(Calculation::to_string).collect()
    }

    pub fn history_records(&self) -> Vec<CalculationRecord> {
        persistence::history_rows(&self.history)
    }

    pub fn save_history(&self) -> Result<()> {
        persistence::save_history(&self.config.history_file, &self.history)?;
        info!(
            path = %self.config.history_file.display(),
            records = self.history.len(),
            "history saved"
        );
        Ok(())
    }

    /// Replaces history with the persisted one and resets both stacks.
    /// On failure the current state is kept as it was.
    pub fn load_history(&mut self) -> Result<()> {
        let loaded = persistence::load_history(&self.config.history_file)?;
        info!(
            path = %self.config.history_file.display(),
            records = loaded.len(),
            "history loaded"
        );
        self.history = loaded;
        self.undo_stack.clear();
        self.redo_stack.clear();
        Ok(())
    }
}

fn same_observer(a: &Rc<dyn HistoryObserver>, b: &Rc<dyn HistoryObserver>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
