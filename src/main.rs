// main.rs

use std::path::PathBuf;

use clap::Parser;

use calc_history::config::CalculatorConfig;
use calc_history::logging::init_logging;
use calc_history::repl::start_repl;

#[derive(Parser, Debug)]
#[command(name = "calc-history", about = "Interactive calculator with undo/redo and saved history")]
struct Cli {
    /// Directory holding logs/ and history/ (overrides CALCULATOR_BASE_DIR)
    #[arg(long)]
    base_dir: Option<PathBuf>,
    /// Maximum number of calculations kept in history
    #[arg(long)]
    max_history_size: Option<usize>,
    /// Do not write the history file after every calculation
    #[arg(long)]
    no_auto_save: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.base_dir {
        Some(dir) => {
            let dir = dir.to_string_lossy().into_owned();
            CalculatorConfig::from_lookup(|key| {
                if key == "CALCULATOR_BASE_DIR" {
                    Some(dir.clone())
                } else {
                    std::env::var(key).ok()
                }
            })?
        }
        None => CalculatorConfig::from_env()?,
    };
    if let Some(size) = cli.max_history_size {
        config.max_history_size = size;
    }
    if cli.no_auto_save {
        config.auto_save = false;
    }
    config.validate()?;

    init_logging(&config)?;
    start_repl(config)
}
