//! Blob operations for stored values.
//!
//! Each key's value is stored verbatim as one blob. Git addresses blobs by
//! content hash, so identical values share storage.

use git2::Repository;

use crate::store::error::StoreResult;
use crate::store::git::types::BlobId;

/// write raw bytes as a blob, returning its ID
pub fn write_blob(repo: &Repository, bytes: &[u8]) -> StoreResult<BlobId> {
    let oid = repo.blob(bytes)?;
    Ok(BlobId::new(oid))
}

/// read a blob's content from the repository
pub fn read_blob(repo: &Repository, blob_id: BlobId) -> StoreResult<Vec<u8>> {
    let blob = repo.find_blob(blob_id.raw())?;
    Ok(blob.content().to_vec())
}

/// the ID a blob with these bytes would have, without writing it
pub fn hash_bytes(bytes: &[u8]) -> StoreResult<BlobId> {
    let oid = git2::Oid::hash_object(git2::ObjectType::Blob, bytes)?;
    Ok(BlobId::new(oid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_blob_roundtrip() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let id = write_blob(&repo, b"{\"name\":\"Steve Buscemi\"}").unwrap();
        let bytes = read_blob(&repo, id).unwrap();
        assert_eq!(bytes, b"{\"name\":\"Steve Buscemi\"}".to_vec());
    }

    #[test]
    fn test_identical_content_dedupes() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let a = write_blob(&repo, b"same").unwrap();
        let b = write_blob(&repo, b"same").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_bytes(b"same").unwrap(), a);
    }
}
