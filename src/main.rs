//! gitkv - command-line shell over a Git-backed record store.

use std::path::PathBuf;
use std::process::ExitCode;

use gitkv::db::{print_output, Database, DatabaseConfig, Repl};
use gitkv::logging;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let mut path = PathBuf::from(".gitkv");
    let mut branch: Option<String> = None;
    let mut verbose = false;
    let mut execute: Option<String> = None;
    let mut log_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--database" | "-b" | "--branch" | "-e" | "--execute" | "--log-dir" => {
                let flag = args[i].as_str();
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Missing value for {}", flag);
                    return ExitCode::FAILURE;
                };
                match flag {
                    "-d" | "--database" => path = PathBuf::from(value),
                    "-b" | "--branch" => branch = Some(value.clone()),
                    "-e" | "--execute" => execute = Some(value.clone()),
                    _ => log_dir = Some(PathBuf::from(value)),
                }
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("gitkv v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                // bare argument is the database path
                if !arg.starts_with('-') {
                    path = PathBuf::from(arg);
                } else {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    let level = if verbose {
        "debug"
    } else if log_dir.is_some() {
        logging::default_log_level()
    } else {
        "warn"
    };
    if let Err(e) = logging::init_logging(level, log_dir.as_deref()) {
        eprintln!("Error starting logger: {}", e);
        return ExitCode::FAILURE;
    }

    let mut config = DatabaseConfig::new(&path)
        .create_if_missing(true)
        .verbose(verbose);
    if let Some(branch) = branch {
        config = config.branch(branch);
    }

    let db = match Database::open_with_config(config) {
        Ok(db) => db,
        Err(e) => {
            log::error!("failed to open {}: {}", path.display(), e);
            eprintln!("Error opening database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match execute {
        Some(command) => execute_command(&db, &command),
        None => run_repl(db),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("gitkv - Git-backed key-value record store");
    println!();
    println!("Usage: gitkv [OPTIONS] [DATABASE]");
    println!();
    println!("Options:");
    println!("  -d, --database PATH    Path to database directory (default: .gitkv)");
    println!("  -b, --branch NAME      Branch holding the records (default: main)");
    println!("  -e, --execute CMD      Execute one command and exit");
    println!("  -v, --verbose          Enable debug logging");
    println!("  --log-dir PATH         Write logs to rotated files in PATH");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
    println!();
    println!("Examples:");
    println!("  gitkv                                     Start REPL with default database");
    println!("  gitkv mydb                                Start REPL with 'mydb' database");
    println!("  gitkv -e 'read actors \"Actor ID\"'         Read one record and exit");
}

fn execute_command(db: &Database, command: &str) -> Result<(), Box<dyn std::error::Error>> {
    let output = db.execute(command)?;
    print_output(&mut std::io::stdout(), &output)?;
    Ok(())
}

fn run_repl(db: Database) -> Result<(), Box<dyn std::error::Error>> {
    let mut repl = Repl::new(db);
    repl.run()?;
    Ok(())
}
