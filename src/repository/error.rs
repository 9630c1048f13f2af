//! Repository error types.

use thiserror::Error;

use crate::codec::CodecError;
use crate::model::Identifier;
use crate::store::StoreError;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors surfaced by repository operations.
///
/// Codec and store failures pass through unchanged; only a missing record
/// gains the identifier as context.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// read, update or delete found no record for the identifier
    #[error("Record not found with ID: {0}")]
    RecordNotFound(Identifier),

    /// the payload could not be encoded or the stored bytes decoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// the backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RepositoryError {
    /// check if this error indicates the record doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::RecordNotFound(_))
    }

    /// the identifier of the missing record, if this is a not-found error
    pub fn missing_id(&self) -> Option<&Identifier> {
        match self {
            RepositoryError::RecordNotFound(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = RepositoryError::RecordNotFound(Identifier::new("Actor ID").unwrap());
        assert_eq!(err.to_string(), "Record not found with ID: Actor ID");
        assert!(err.is_not_found());
        assert_eq!(err.missing_id().map(|id| id.as_str()), Some("Actor ID"));
    }

    #[test]
    fn test_store_error_is_transparent() {
        let store_err = StoreError::RefNotFound("main".to_string());
        let expected = store_err.to_string();

        let err = RepositoryError::from(store_err);
        assert_eq!(err.to_string(), expected);
        assert!(!err.is_not_found());
        assert!(err.missing_id().is_none());
    }
}
