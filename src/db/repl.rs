//! Interactive REPL (Read-Eval-Print Loop) for gitkv.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use super::api::{Database, DatabaseResult};
use super::command::CommandOutput;

const DEFAULT_HISTORY: usize = 10;

/// REPL configuration.
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Prompt string.
    pub prompt: String,
    /// Show timing information.
    pub timing: bool,
    /// Print the banner on start.
    pub banner: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "gitkv> ".into(),
            timing: true,
            banner: true,
        }
    }
}

/// The interactive REPL.
pub struct Repl {
    db: Database,
    config: ReplConfig,
}

impl Repl {
    /// Create a new REPL with the given database.
    pub fn new(db: Database) -> Self {
        Self::with_config(db, ReplConfig::default())
    }

    /// Create a REPL with custom configuration.
    pub fn with_config(db: Database, config: ReplConfig) -> Self {
        Self { db, config }
    }

    /// Run the REPL on stdin and stdout.
    pub fn run(&mut self) -> DatabaseResult<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the REPL over arbitrary input and output streams.
    pub fn run_with<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> DatabaseResult<()> {
        if self.config.banner {
            print_banner(&mut out)?;
        }

        loop {
            write!(out, "{}", self.config.prompt)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // EOF
                writeln!(out, "\nGoodbye!")?;
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('.') {
                match self.handle_dot_command(line, &mut out) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
                continue;
            }

            let start = Instant::now();
            match self.db.execute(line) {
                Ok(output) => {
                    print_output(&mut out, &output)?;
                    if self.config.timing {
                        writeln!(out, "Time: {:.3}ms", start.elapsed().as_secs_f64() * 1000.0)?;
                    }
                }
                Err(e) => writeln!(out, "Error: {}", e)?,
            }
        }

        Ok(())
    }

    /// Returns `true` when the REPL should exit.
    fn handle_dot_command<W: Write>(&mut self, cmd: &str, out: &mut W) -> DatabaseResult<bool> {
        let cmd = cmd.trim_start_matches('.');
        let parts: Vec<&str> = cmd.split_whitespace().collect();
        let command = parts.first().map(|s| s.to_lowercase());

        match command.as_deref() {
            Some("help") | Some("h") | Some("?") => print_help(out)?,
            Some("quit") | Some("exit") | Some("q") => return Ok(true),
            Some("keys") => {
                let keys = self.db.keys()?;
                if keys.is_empty() {
                    writeln!(out, "No records.")?;
                }
                for key in keys {
                    writeln!(out, "  {}", key)?;
                }
            }
            Some("history") | Some("log") => {
                let limit = match parts.get(1) {
                    Some(n) => match n.parse::<usize>() {
                        Ok(n) => n,
                        Err(_) => {
                            writeln!(out, "Usage: .history [n]")?;
                            return Ok(false);
                        }
                    },
                    None => DEFAULT_HISTORY,
                };
                for commit in self.db.history(Some(limit))? {
                    writeln!(
                        out,
                        "  {} {} {}",
                        commit.id.short(),
                        commit.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        commit.summary()
                    )?;
                }
            }
            Some("stats") => write!(out, "{}", self.db.stats()?)?,
            Some("timing") => {
                self.config.timing = !self.config.timing;
                writeln!(out, "Timing: {}", if self.config.timing { "on" } else { "off" })?;
            }
            Some("clear") => {
                // ANSI clear screen
                write!(out, "\x1B[2J\x1B[H")?;
            }
            Some(other) => {
                writeln!(out, "Unknown command: .{}", other)?;
                writeln!(out, "Type .help for available commands")?;
            }
            None => {}
        }

        Ok(false)
    }
}

/// Print a command result the way the shell shows it.
pub fn print_output<W: Write>(out: &mut W, output: &CommandOutput) -> io::Result<()> {
    writeln!(out, "{}", output)
}

fn print_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "╔═══════════════════════════════════════════════════╗")?;
    writeln!(out, "║                    gitkv v{:<8}                ║", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "║         Git-backed key-value record store         ║")?;
    writeln!(out, "╠═══════════════════════════════════════════════════╣")?;
    writeln!(out, "║  Type .help for commands, or enter a command      ║")?;
    writeln!(out, "╚═══════════════════════════════════════════════════╝")?;
    writeln!(out)
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  .help, .h, .?           Show this help message")?;
    writeln!(out, "  .quit, .exit, .q        Exit the REPL")?;
    writeln!(out, "  .keys                   List stored keys")?;
    writeln!(out, "  .history [n]            Show the last n commits (default {})", DEFAULT_HISTORY)?;
    writeln!(out, "  .stats                  Show store statistics")?;
    writeln!(out, "  .timing                 Toggle timing display")?;
    writeln!(out, "  .clear                  Clear the screen")?;
    writeln!(out)?;
    writeln!(out, "Records:")?;
    writeln!(out, "  create <table> <id> <json>")?;
    writeln!(out, "  read <table> <id>")?;
    writeln!(out, "  update <table> <id> <json>")?;
    writeln!(out, "  delete <table> <id>")?;
    writeln!(out, "  exists <table> <id>")?;
    writeln!(out)?;
    writeln!(out, "Quote identifiers containing spaces: read actors \"Actor ID\"")?;
    writeln!(out)
}
