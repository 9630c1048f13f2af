//! core type-safe wrappers for names and keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A validated table name.
///
/// One repository is bound to one table, and the table name partitions the
/// identifier namespace inside the store.
///
/// Valid names:
/// - 1-64 characters
/// - Alphanumeric, underscores, hyphens only
/// - Must not contain the `_item_` key separator or end with `_item`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    const MAX_LEN: usize = 64;

    /// create a new TableName, validating the input
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), InvalidNameError> {
        if name.is_empty() {
            return Err(InvalidNameError::Empty);
        }

        if name.len() > Self::MAX_LEN {
            return Err(InvalidNameError::TooLong(name.len()));
        }

        for (i, c) in name.chars().enumerate() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
                return Err(InvalidNameError::InvalidCharacter { char: c, position: i });
            }
        }

        if name.contains(StorageKey::ITEM_SEPARATOR) {
            return Err(InvalidNameError::Reserved(StorageKey::ITEM_SEPARATOR.to_string()));
        }

        // table `a` with id `item_x` and table `a_item` with id `x` would
        // share a key
        let suffix = StorageKey::ITEM_SEPARATOR.trim_end_matches('_');
        if name.ends_with(suffix) {
            return Err(InvalidNameError::ReservedSuffix(suffix.to_string()));
        }

        Ok(())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableName {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TableName> for String {
    fn from(value: TableName) -> Self {
        value.0
    }
}

/// Caller-supplied identifier of one item within one table.
///
/// Identifiers are opaque: any non-empty string without NUL characters is
/// accepted, spaces included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidNameError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    fn validate(id: &str) -> Result<(), InvalidNameError> {
        if id.is_empty() {
            return Err(InvalidNameError::Empty);
        }

        if let Some(position) = id.chars().position(|c| c == '\0') {
            return Err(InvalidNameError::InvalidCharacter { char: '\0', position });
        }

        Ok(())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }

    /// Generate a new ULID-based identifier.
    ///
    /// Repositories never call this; it exists for callers that have no
    /// natural key of their own.
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string().to_lowercase())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = InvalidNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

/// The namespaced key actually used to address the backing store.
///
/// Format: `database_{table}_item_{identifier}`. Persisted records depend on
/// this format; changing it orphans existing data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub const PREFIX: &'static str = "database_";
    pub const ITEM_SEPARATOR: &'static str = "_item_";

    /// derive the key for an identifier inside a table
    pub fn derive(table: &TableName, id: &Identifier) -> Self {
        Self(format!(
            "{}{}{}{}",
            Self::PREFIX,
            table.as_str(),
            Self::ITEM_SEPARATOR,
            id.as_str()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// error type for invalid names (tables, identifiers)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidNameError {
    Empty,
    TooLong(usize),
    InvalidCharacter { char: char, position: usize },
    Reserved(String),
    ReservedSuffix(String),
}

impl fmt::Display for InvalidNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name cannot be empty"),
            Self::TooLong(len) => write!(f, "name too long: {} characters", len),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character {:?} at position {}", char, position)
            }
            Self::Reserved(part) => write!(f, "name cannot contain '{}'", part),
            Self::ReservedSuffix(part) => write!(f, "name cannot end with '{}'", part),
        }
    }
}

impl std::error::Error for InvalidNameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_valid() {
        assert!(TableName::new("actors").is_ok());
        assert!(TableName::new("Clients2024").is_ok());
        assert!(TableName::new("_private").is_ok());
        assert!(TableName::new("my-table").is_ok());
    }

    #[test]
    fn test_table_name_invalid() {
        assert_eq!(TableName::new(""), Err(InvalidNameError::Empty));
        assert!(TableName::new("users/admin").is_err());
        assert!(TableName::new("with space").is_err());
        assert!(TableName::new("a".repeat(65)).is_err());
        assert!(matches!(
            TableName::new("a_item_b"),
            Err(InvalidNameError::Reserved(_))
        ));
        assert!(matches!(
            TableName::new("clients_item"),
            Err(InvalidNameError::ReservedSuffix(_))
        ));
    }

    #[test]
    fn test_identifier_is_opaque() {
        assert!(Identifier::new("Actor ID").is_ok());
        assert!(Identifier::new("a/b.c").is_ok());
        assert!(Identifier::new("ünïcode").is_ok());
        assert_eq!(Identifier::new(""), Err(InvalidNameError::Empty));
        assert!(Identifier::new("nul\0byte").is_err());
    }

    #[test]
    fn test_identifier_generate() {
        let a = Identifier::generate();
        let b = Identifier::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 26);
    }

    #[test]
    fn test_storage_key_format() {
        let table = TableName::new("actors").unwrap();
        let id = Identifier::new("Actor ID").unwrap();
        let key = StorageKey::derive(&table, &id);
        assert_eq!(key.as_str(), "database_actors_item_Actor ID");
    }

    #[test]
    fn test_same_identifier_in_two_tables() {
        let id = Identifier::new("X").unwrap();
        let a = StorageKey::derive(&TableName::new("A").unwrap(), &id);
        let b = StorageKey::derive(&TableName::new("B").unwrap(), &id);
        assert_ne!(a, b);
    }

    #[test]
    fn test_table_boundaries_cannot_collide() {
        assert_eq!(
            TableName::new("a_item"),
            Err(InvalidNameError::ReservedSuffix("_item".to_string()))
        );
        assert!(TableName::new("_item").is_err());
        assert!(TableName::new("a_items").is_ok());
        assert!(TableName::new("aitem").is_ok());

        // the pair that would otherwise share `database_a_item_item_X`
        let a = StorageKey::derive(&TableName::new("a").unwrap(), &Identifier::new("item_X").unwrap());
        assert_eq!(a.as_str(), "database_a_item_item_X");
    }

    #[test]
    fn test_serde_validates() {
        let parsed: Result<Identifier, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());

        let table: TableName = serde_json::from_str("\"actors\"").unwrap();
        assert_eq!(table.as_str(), "actors");
    }
}
