//! Database API - high-level interface over a Git store.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::command::{Command, CommandError, CommandOutput};
use crate::codec::JsonCodec;
use crate::model::{InvalidNameError, Item, TableName};
use crate::repository::{Repository, RepositoryError};
use crate::store::{BranchName, CommitInfo, GitStore, GitStoreOptions, StoreError, StoreStats};

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),

    #[error("command error: {0}")]
    Command(#[from] CommandError),

    #[error("database not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database configuration options.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database directory.
    pub path: PathBuf,
    /// Branch holding the data.
    pub branch: String,
    /// Create if doesn't exist.
    pub create_if_missing: bool,
    /// Store records as indented JSON.
    pub pretty_records: bool,
    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".gitkv"),
            branch: BranchName::MAIN.to_string(),
            create_if_missing: true,
            pretty_records: true,
            verbose: false,
        }
    }
}

impl DatabaseConfig {
    /// Create a new configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the branch.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set create_if_missing flag.
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Set pretty_records flag.
    pub fn pretty_records(mut self, value: bool) -> Self {
        self.pretty_records = value;
        self
    }

    /// Set verbose flag.
    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    fn store_options(&self) -> DatabaseResult<GitStoreOptions> {
        let branch = BranchName::new(self.branch.as_str())
            .map_err(|e| DatabaseError::InvalidConfig(e.message().to_string()))?;
        Ok(GitStoreOptions::default()
            .branch(branch)
            .create_if_missing(self.create_if_missing))
    }

    fn codec(&self) -> JsonCodec {
        if self.pretty_records {
            JsonCodec::pretty()
        } else {
            JsonCodec::new()
        }
    }
}

/// The main database handle.
///
/// Owns one Git store and hands out repositories bound to tables of it.
pub struct Database {
    config: DatabaseConfig,
    store: GitStore,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> DatabaseResult<Self> {
        Self::open_with_config(DatabaseConfig::new(path.as_ref()))
    }

    /// Open or create a database with custom configuration.
    pub fn open_with_config(config: DatabaseConfig) -> DatabaseResult<Self> {
        if !config.create_if_missing && !config.path.exists() {
            return Err(DatabaseError::NotFound(config.path.clone()));
        }

        let store = GitStore::open_with(&config.path, config.store_options()?)?;
        info!(
            "opened database at {} on branch {}",
            config.path.display(),
            store.branch()
        );

        Ok(Self { config, store })
    }

    /// Get a repository for `table` with payload type `V`.
    pub fn repository<V>(&self, table: &str) -> DatabaseResult<Repository<V, JsonCodec, GitStore>>
    where
        V: Serialize + DeserializeOwned,
    {
        let table = TableName::new(table)?;
        Ok(Repository::new(table, self.config.codec(), self.store.clone()))
    }

    /// Parse and run a single shell command against JSON payloads.
    pub fn execute(&self, input: &str) -> DatabaseResult<CommandOutput> {
        let command = Command::parse(input)?;
        if self.config.verbose {
            debug!("[CMD] {:?}", command);
        }
        self.run(command)
    }

    /// Run an already parsed command.
    pub fn run(&self, command: Command) -> DatabaseResult<CommandOutput> {
        let name = command.name();
        let output = match command {
            Command::Create { table, id, value } => {
                let repo = self.table_repository(table);
                repo.create(&Item::new(id.clone(), value))?;
                CommandOutput::Done(format!("created {} in {}", id, repo.table()))
            }
            Command::Read { table, id } => {
                let repo = self.table_repository(table);
                CommandOutput::Value(repo.read(&id)?)
            }
            Command::Update { table, id, value } => {
                let repo = self.table_repository(table);
                repo.update(&Item::new(id.clone(), value))?;
                CommandOutput::Done(format!("updated {} in {}", id, repo.table()))
            }
            Command::Delete { table, id } => {
                let repo = self.table_repository(table);
                repo.delete(&id)?;
                CommandOutput::Done(format!("deleted {} from {}", id, repo.table()))
            }
            Command::Exists { table, id } => {
                let repo = self.table_repository(table);
                CommandOutput::Exists(repo.exists(&id)?)
            }
        };

        if self.config.verbose {
            debug!("[{}] {:?}", name, output);
        }
        Ok(output)
    }

    fn table_repository(&self, table: TableName) -> Repository<Value, JsonCodec, GitStore> {
        Repository::new(table, self.config.codec(), self.store.clone())
    }

    /// Get the underlying store.
    pub fn store(&self) -> &GitStore {
        &self.store
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// List the raw storage keys.
    pub fn keys(&self) -> DatabaseResult<Vec<String>> {
        Ok(self.store.keys()?)
    }

    /// Get the commit history, newest first.
    pub fn history(&self, limit: Option<usize>) -> DatabaseResult<Vec<CommitInfo>> {
        Ok(self.store.history(limit)?)
    }

    /// Get store statistics.
    pub fn stats(&self) -> DatabaseResult<StoreStats> {
        Ok(self.store.stats()?)
    }
}
