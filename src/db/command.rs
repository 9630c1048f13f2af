//! Parsing of shell commands.
//!
//! Grammar, one command per line:
//!
//! ```text
//! create <table> <id> <json>
//! read   <table> <id>
//! update <table> <id> <json>
//! delete <table> <id>
//! exists <table> <id>
//! ```
//!
//! An identifier containing spaces is written as a JSON string, e.g.
//! `read actors "Actor ID"`.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::model::{Identifier, InvalidNameError, TableName};

/// Errors from parsing a command line.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{command}: unexpected argument `{rest}`")]
    UnexpectedArgument { command: &'static str, rest: String },

    #[error("unterminated quoted identifier")]
    UnterminatedQuote,

    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),

    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create {
        table: TableName,
        id: Identifier,
        value: Value,
    },
    Read {
        table: TableName,
        id: Identifier,
    },
    Update {
        table: TableName,
        id: Identifier,
        value: Value,
    },
    Delete {
        table: TableName,
        id: Identifier,
    },
    Exists {
        table: TableName,
        id: Identifier,
    },
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let input = input.trim();
        let (verb, rest) = split_word(input);
        if verb.is_empty() {
            return Err(CommandError::Empty);
        }

        match verb.to_ascii_lowercase().as_str() {
            "create" => {
                let (table, id, value) = parse_with_value("create", rest)?;
                Ok(Command::Create { table, id, value })
            }
            "update" => {
                let (table, id, value) = parse_with_value("update", rest)?;
                Ok(Command::Update { table, id, value })
            }
            "read" | "get" => {
                let (table, id) = parse_target("read", rest)?;
                Ok(Command::Read { table, id })
            }
            "delete" | "del" => {
                let (table, id) = parse_target("delete", rest)?;
                Ok(Command::Delete { table, id })
            }
            "exists" => {
                let (table, id) = parse_target("exists", rest)?;
                Ok(Command::Exists { table, id })
            }
            _ => Err(CommandError::Unknown(verb.to_string())),
        }
    }

    /// the verb, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Read { .. } => "read",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
            Command::Exists { .. } => "exists",
        }
    }
}

/// Result of running a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// a read value
    Value(Value),
    /// answer to `exists`
    Exists(bool),
    /// a mutation succeeded
    Done(String),
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Value(value) => match serde_json::to_string_pretty(value) {
                Ok(text) => write!(f, "{}", text),
                Err(_) => write!(f, "{}", value),
            },
            CommandOutput::Exists(found) => write!(f, "{}", found),
            CommandOutput::Done(message) => write!(f, "{}", message),
        }
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(pos) => (&input[..pos], input[pos..].trim_start()),
        None => (input, ""),
    }
}

/// take an identifier: a bare word or a JSON string literal
fn split_identifier(input: &str) -> Result<(String, &str), CommandError> {
    let input = input.trim_start();
    if !input.starts_with('"') {
        let (word, rest) = split_word(input);
        return Ok((word.to_string(), rest));
    }

    let mut escaped = false;
    for (pos, c) in input.char_indices().skip(1) {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                let literal = &input[..=pos];
                let id: String = serde_json::from_str(literal)?;
                return Ok((id, input[pos + 1..].trim_start()));
            }
            _ => escaped = false,
        }
    }
    Err(CommandError::UnterminatedQuote)
}

fn parse_table_and_id<'a>(
    command: &'static str,
    input: &'a str,
) -> Result<(TableName, Identifier, &'a str), CommandError> {
    let (table, rest) = split_word(input);
    if table.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "table",
        });
    }
    let table = TableName::new(table)?;

    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "id",
        });
    }
    let (id, rest) = split_identifier(rest)?;
    let id = Identifier::new(id)?;

    Ok((table, id, rest))
}

fn parse_target(command: &'static str, input: &str) -> Result<(TableName, Identifier), CommandError> {
    let (table, id, rest) = parse_table_and_id(command, input)?;
    if !rest.is_empty() {
        return Err(CommandError::UnexpectedArgument {
            command,
            rest: rest.to_string(),
        });
    }
    Ok((table, id))
}

fn parse_with_value(
    command: &'static str,
    input: &str,
) -> Result<(TableName, Identifier, Value), CommandError> {
    let (table, id, rest) = parse_table_and_id(command, input)?;
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "value",
        });
    }
    let value = serde_json::from_str(rest)?;
    Ok((table, id, value))
}
