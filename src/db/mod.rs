//! High-level Database API and REPL interface.
//!
//! A [`Database`] opens a Git store and serves typed repositories over it;
//! the shell layer parses one-line commands against JSON payloads.

mod api;
mod command;
mod repl;

pub use api::{Database, DatabaseConfig, DatabaseError, DatabaseResult};
pub use command::{Command, CommandError, CommandOutput};
pub use repl::{print_output, Repl, ReplConfig};
