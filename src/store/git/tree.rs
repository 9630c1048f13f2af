//! tree operations for key layout.
//!
//! the store keeps a flat root tree: one blob entry per key. Git entry names
//! cannot contain `/` or NUL and cannot be `.`, `..` or `.git`, so keys are
//! escaped on the way in:
//! - `%` becomes `%25`
//! - `/` becomes `%2F`
//! - NUL becomes `%00`
//! - a leading `.` becomes `%2E`

use git2::{FileMode, ObjectType, Repository, Tree, TreeBuilder as Git2TreeBuilder};

use crate::store::error::{StoreError, StoreResult};
use crate::store::git::types::{BlobId, TreeId};

/// map a store key to the tree entry name that holds it
pub fn entry_name(key: &str) -> StoreResult<String> {
    if key.is_empty() {
        return Err(StoreError::invalid_key(key, "key cannot be empty"));
    }

    let mut name = String::with_capacity(key.len());
    for (i, c) in key.chars().enumerate() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            '\0' => name.push_str("%00"),
            '.' if i == 0 => name.push_str("%2E"),
            c => name.push(c),
        }
    }
    Ok(name)
}

/// recover the store key from a tree entry name
pub fn key_from_entry_name(name: &str) -> Option<String> {
    let mut key = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(pos) = rest.find('%') {
        key.push_str(&rest[..pos]);
        let code = rest.get(pos + 1..pos + 3)?;
        let decoded = match code {
            "25" => '%',
            "2F" => '/',
            "00" => '\0',
            "2E" => '.',
            _ => return None,
        };
        key.push(decoded);
        rest = &rest[pos + 3..];
    }
    key.push_str(rest);
    Some(key)
}

/// A read only handle to a git tree at a specific commit
///
/// think of it as a snapshot - it won't change even if new commits are made.
pub struct TreeHandle<'repo> {
    tree: Tree<'repo>,
}

impl<'repo> TreeHandle<'repo> {
    pub(crate) fn new(tree: Tree<'repo>) -> Self {
        Self { tree }
    }

    pub(crate) fn inner(&self) -> &Tree<'repo> {
        &self.tree
    }

    /// get the blob ID stored under an entry name
    pub fn get_blob_id(&self, name: &str) -> StoreResult<Option<BlobId>> {
        match self.tree.get_name(name) {
            Some(entry) => {
                if entry.kind() != Some(ObjectType::Blob) {
                    return Err(StoreError::CorruptedData {
                        path: name.to_string(),
                        reason: format!("expected blob, found {:?}", entry.kind()),
                    });
                }
                Ok(Some(BlobId::new(entry.id())))
            }
            None => Ok(None),
        }
    }

    /// check if an entry exists
    pub fn contains(&self, name: &str) -> bool {
        self.tree.get_name(name).is_some()
    }

    /// list all stored keys, decoded, in tree order
    pub fn list_keys(&self) -> Vec<String> {
        self.tree
            .iter()
            .filter(|entry| entry.kind() == Some(ObjectType::Blob))
            .filter_map(|entry| key_from_entry_name(entry.name()?))
            .collect()
    }

    /// number of entries in the tree
    pub fn len(&self) -> usize {
        self.tree.len()
    }
}

/// a mutable tree builder for making changes
///
/// changes accumulate and produce a new tree on `write`; the source tree
/// is not modified.
///
/// # Usage Pattern
///
/// ```ignore
/// let mut mutator = TreeMutator::from_tree(repo, &tree)?;
/// mutator.upsert("database_actors_item_1", blob_id)?;
/// mutator.remove("database_actors_item_2")?;
/// let new_tree_id = mutator.write()?;
/// ```
pub struct TreeMutator<'repo> {
    builder: Git2TreeBuilder<'repo>,
}

impl<'repo> TreeMutator<'repo> {
    pub fn from_tree(repo: &'repo Repository, tree: &TreeHandle<'_>) -> StoreResult<Self> {
        let builder = repo.treebuilder(Some(tree.inner()))?;
        Ok(Self { builder })
    }

    pub fn empty(repo: &'repo Repository) -> StoreResult<Self> {
        let builder = repo.treebuilder(None)?;
        Ok(Self { builder })
    }

    /// insert or replace an entry
    pub fn upsert(&mut self, name: &str, blob_id: BlobId) -> StoreResult<()> {
        self.builder.insert(name, blob_id.raw(), FileMode::Blob.into())?;
        Ok(())
    }

    /// remove an entry, returning whether it was there
    pub fn remove(&mut self, name: &str) -> StoreResult<bool> {
        if self.builder.get(name)?.is_none() {
            return Ok(false);
        }
        self.builder.remove(name)?;
        Ok(true)
    }

    /// write all changes and return the new root tree ID
    pub fn write(self) -> StoreResult<TreeId> {
        let id = self.builder.write()?;
        Ok(TreeId::new(id))
    }
}

/// create the empty tree used by the initial commit
pub fn create_initial_tree(repo: &Repository) -> StoreResult<TreeId> {
    TreeMutator::empty(repo)?.write()
}
