// repl.rs

use std::io::Write;
use std::rc::Rc;

use anyhow::Context;
use itertools::Itertools;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};
use tracing::info;

use crate::calculator::Calculator;
use crate::completion::CommandCompleter;
use crate::config::CalculatorConfig;
use crate::history::{AutoSaveObserver, LoggingObserver};
use crate::operations::Operation;
use crate::parser::{parse_command, Command};
use crate::util::{emit, format_result};

pub const PROMPT: &str = "calc> ";

/// Where the session reads its lines from. `None` means end of input.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}

impl LineSource for Editor<CommandCompleter, DefaultHistory> {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

enum Flow {
    Continue,
    Exit,
    Terminated,
}

pub fn start_repl(config: CalculatorConfig) -> anyhow::Result<()> {
    let mut calculator = Calculator::new(config).context("cannot initialize calculator")?;
    let auto_save = AutoSaveObserver::new(
        calculator.config().history_file.clone(),
        calculator.config().auto_save,
    );
    calculator.add_observer(Rc::new(LoggingObserver::new()));
    calculator.add_observer(Rc::new(auto_save));

    let config = Config::builder().completion_type(CompletionType::List).build();
    let mut rl: Editor<CommandCompleter, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(CommandCompleter::new()));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    emit(&mut out, "Calculator started. Type 'help' for commands.")?;
    run_session(&mut calculator, &mut rl, &mut out)
}

/// Drives the command loop until `exit` or end of input. History is saved
/// on the way out either way.
pub fn run_session<W: Write>(
    calculator: &mut Calculator,
    input: &mut dyn LineSource,
    out: &mut W,
) -> anyhow::Result<()> {
    loop {
        let Some(line) = input.read_line(PROMPT)? else {
            emit(out, "\nInput terminated. Exiting...")?;
            save_on_exit(calculator, out)?;
            return Ok(());
        };
        match execute(calculator, &line, input, out)? {
            Flow::Continue => {}
            Flow::Exit => {
                save_on_exit(calculator, out)?;
                emit(out, "Goodbye!")?;
                return Ok(());
            }
            Flow::Terminated => {
                emit(out, "\nInput terminated. Exiting...")?;
                save_on_exit(calculator, out)?;
                return Ok(());
            }
        }
    }
}

fn save_on_exit<W: Write>(calculator: &Calculator, out: &mut W) -> anyhow::Result<()> {
    match calculator.save_history() {
        Ok(()) => emit(out, "History saved successfully.")?,
        Err(e) => emit(out, format!("Warning: Could not save history: {}", e))?,
    }
    Ok(())
}

fn execute<W: Write>(
    calculator: &mut Calculator,
    line: &str,
    input: &mut dyn LineSource,
    out: &mut W,
) -> anyhow::Result<Flow> {
    match parse_command(line) {
        Command::Empty => {}
        Command::Help => print_help(out)?,
        Command::Exit => return Ok(Flow::Exit),
        Command::History => {
            let lines = calculator.show_history();
            if lines.is_empty() {
                emit(out, "No calculations in history")?;
            } else {
                emit(out, "\nCalculation History:")?;
                let numbered = lines
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| format!("{}. {}", i + 1, entry))
                    .join("\n");
                emit(out, numbered)?;
            }
        }
        Command::Clear => {
            calculator.clear_history();
            emit(out, "History cleared")?;
        }
        Command::Undo => {
            let msg = if calculator.undo() { "Operation undone" } else { "Nothing to undo" };
            emit(out, msg)?;
        }
        Command::Redo => {
            let msg = if calculator.redo() { "Operation redone" } else { "Nothing to redo" };
            emit(out, msg)?;
        }
        Command::Save => match calculator.save_history() {
            Ok(()) => emit(out, "History saved successfully")?,
            Err(e) => emit(out, format!("Error saving history: {}", e))?,
        },
        Command::Load => match calculator.load_history() {
            Ok(()) => emit(out, "History loaded successfully")?,
            Err(e) => emit(out, format!("Error loading history: {}", e))?,
        },
        Command::Calculate(operation, operands) => {
            return calculate(calculator, operation, operands, input, out);
        }
        Command::Unknown(word) => emit(
            out,
            format!("Unknown command: '{}'. Type 'help' for available commands.", word),
        )?,
    }
    Ok(Flow::Continue)
}

fn calculate<W: Write>(
    calculator: &mut Calculator,
    operation: Operation,
    operands: Vec<String>,
    input: &mut dyn LineSource,
    out: &mut W,
) -> anyhow::Result<Flow> {
    let (a, b) = match <[String; 2]>::try_from(operands) {
        Ok([a, b]) => (a, b),
        Err(given) if !given.is_empty() => {
            emit(out, format!("Error: {} expects two numbers", operation.id()))?;
            return Ok(Flow::Continue);
        }
        Err(_) => {
            emit(out, "\nEnter numbers (or 'cancel' to abort):")?;
            let Some(a) = input.read_line("First number: ")? else {
                return Ok(Flow::Terminated);
            };
            if a.trim().eq_ignore_ascii_case("cancel") {
                emit(out, "Operation cancelled")?;
                return Ok(Flow::Continue);
            }
            let Some(b) = input.read_line("Second number: ")? else {
                return Ok(Flow::Terminated);
            };
            if b.trim().eq_ignore_ascii_case("cancel") {
                emit(out, "Operation cancelled")?;
                return Ok(Flow::Continue);
            }
            (a, b)
        }
    };

    calculator.set_operation(operation);
    match calculator.perform_operation(&a, &b) {
        Ok(result) => {
            let shown = format_result(result, calculator.config().precision);
            emit(out, format!("\nResult: {}", shown))?;
        }
        Err(e) => {
            info!(error = %e, "calculation rejected");
            emit(out, format!("Error: {}", e))?;
        }
    }
    Ok(Flow::Continue)
}

fn print_help<W: Write>(out: &mut W) -> anyhow::Result<()> {
    emit(out, "\nAvailable commands:")?;
    for op in Operation::ALL {
        emit(out, format!("  {:<11} - {}", op.id(), op.description()))?;
    }
    for (name, text) in [
        ("history", "Show calculation history"),
        ("clear", "Clear calculation history"),
        ("undo", "Undo the last calculation"),
        ("redo", "Redo the last undone calculation"),
        ("save", "Save calculation history to file"),
        ("load", "Load calculation history from file"),
        ("exit", "Exit the calculator"),
    ] {
        emit(out, format!("  {:<11} - {}", name, text))?;
    }
    emit(out, "Operands may follow the command directly, e.g. 'add 2 3'.")?;
    Ok(())
}
