// parser.rs

use crate::operations::Operation;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    Empty,
    Help,
    Exit,
    History,
    Clear,
    Undo,
    Redo,
    Save,
    Load,
    /// An operation, optionally with its operands given inline.
    Calculate(Operation, Vec<String>),
    Unknown(String),
}

pub const SESSION_COMMANDS: [&str; 8] = ["history", "clear", "undo", "redo", "save", "load", "help", "exit"];

/// Every word accepted as the first token of a command line.
pub fn command_names() -> impl Iterator<Item = &'static str> {
    Operation::ALL
        .into_iter()
        .map(Operation::id)
        .chain(SESSION_COMMANDS)
}

pub fn parse_command(line: &str) -> Command {
    let mut words = line.split_whitespace().map(str::to_string);
    let Some(head) = words.next() else {
        return Command::Empty;
    };
    match head.to_ascii_lowercase().as_str() {
        "help" => Command::Help,
        "exit" | "quit" => Command::Exit,
        "history" => Command::History,
        "clear" => Command::Clear,
        "undo" => Command::Undo,
        "redo" => Command::Redo,
        "save" => Command::Save,
        "load" => Command::Load,
        other => match Operation::ALL.into_iter().find(|op| op.id() == other) {
            Some(op) => Command::Calculate(op, words.collect()),
            None => Command::Unknown(head),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_commands() {
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(parse_command("undo"), Command::Undo);
        assert_eq!(parse_command("  EXIT "), Command::Exit);
        assert_eq!(parse_command("bogus 1"), Command::Unknown("bogus".into()));
    }

    #[test]
    fn parses_operations_with_inline_operands() {
        assert_eq!(
            parse_command("add 2 3"),
            Command::Calculate(Operation::Addition, vec!["2".into(), "3".into()])
        );
        assert_eq!(parse_command("abs_diff"), Command::Calculate(Operation::AbsoluteDifference, vec![]));
    }

    #[test]
    fn extra_whitespace_between_operands() {
        assert_eq!(
            parse_command("\tdivide   10 \t 4  "),
            Command::Calculate(Operation::Division, vec!["10".into(), "4".into()])
        );
    }

    #[test]
    fn command_names_cover_everything() {
        let names: Vec<_> = command_names().collect();
        assert_eq!(names.len(), 18);
        assert!(names.contains(&"int_divide"));
        assert!(names.contains(&"history"));
    }
}
