//!   Git-backed key-value store.
//!
//!  This wraps `git2::Repository` with thread-safe access and implements
//!  [`KeyValueStore`] on top of blobs, a flat tree and one commit per
//!  mutation on a configurable branch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::Repository;
use log::debug;
use parking_lot::Mutex;

use crate::store::error::{StoreError, StoreResult};
use crate::store::git::blob;
use crate::store::git::commit::{self, CommitInfo, Mutation};
use crate::store::git::refs::RefManager;
use crate::store::git::tree::{self, TreeHandle, TreeMutator};
use crate::store::git::types::{BranchName, CommitId, GitSignature, TreeId};
use crate::store::KeyValueStore;

/// Options for opening a [`GitStore`].
#[derive(Debug, Clone)]
pub struct GitStoreOptions {
    /// Branch that holds the store's data.
    pub branch: BranchName,
    /// Author/committer of store commits.
    pub signature: GitSignature,
    /// Initialize a repository when the path holds none.
    pub create_if_missing: bool,
}

impl Default for GitStoreOptions {
    fn default() -> Self {
        Self {
            branch: BranchName::main(),
            signature: GitSignature::gitkv(),
            create_if_missing: true,
        }
    }
}

impl GitStoreOptions {
    pub fn branch(mut self, branch: BranchName) -> Self {
        self.branch = branch;
        self
    }

    pub fn signature(mut self, signature: GitSignature) -> Self {
        self.signature = signature;
        self
    }

    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }
}

/// A key-value store persisted in a Git repository.
///
/// Clone this to share across threads and repositories - it uses Arc
/// internally. Every operation holds the repository mutex, so the
/// conditional writes are atomic within the process.
#[derive(Clone)]
pub struct GitStore {
    inner: Arc<GitStoreInner>,
}

struct GitStoreInner {
    repo: Mutex<Repository>,
    path: PathBuf,
    branch: BranchName,
    signature: GitSignature,
}

impl GitStore {
    /// Open an existing repository on the default branch.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path, GitStoreOptions::default().create_if_missing(false))
    }

    /// Initialize a new repository.
    ///
    /// Fails if `path` already holds one.
    pub fn init(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if path.join(".git").exists() {
            return Err(StoreError::AlreadyInitialized(path.to_path_buf()));
        }
        Self::open_with(path, GitStoreOptions::default())
    }

    /// Open or initialize a repository on the default branch.
    pub fn open_or_init(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path, GitStoreOptions::default())
    }

    /// Open a repository with explicit options.
    pub fn open_with(path: impl AsRef<Path>, options: GitStoreOptions) -> StoreResult<Self> {
        let path = path.as_ref();

        let repo = if path.join(".git").exists() {
            Repository::open(path).map_err(|_| StoreError::NotInitialized(path.to_path_buf()))?
        } else if options.create_if_missing {
            Self::init_repository(path, &options.signature)?
        } else {
            return Err(StoreError::NotInitialized(path.to_path_buf()));
        };

        let tip = RefManager::ensure_branch(&repo, &options.branch)?;
        debug!(
            "opened git store at {} on branch {} ({})",
            path.display(),
            options.branch,
            tip.short()
        );

        Ok(Self {
            inner: Arc::new(GitStoreInner {
                repo: Mutex::new(repo),
                path: path.to_path_buf(),
                branch: options.branch,
                signature: options.signature,
            }),
        })
    }

    fn init_repository(path: &Path, signature: &GitSignature) -> StoreResult<Repository> {
        std::fs::create_dir_all(path)?;

        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head(BranchName::MAIN);
        let repo = Repository::init_opts(path, &opts)?;

        let initial = commit::create_initial_commit(&repo, signature)?;
        log::info!("initialized git store at {} ({})", path.display(), initial.short());
        Ok(repo)
    }

    /// Get the repository path.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Get the branch this store commits to.
    pub fn branch(&self) -> &BranchName {
        &self.inner.branch
    }

    /// Execute a function with exclusive access to the repository.
    fn with_repo<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Repository) -> StoreResult<T>,
    {
        let repo = self.inner.repo.lock();
        f(&repo)
    }

    fn tip(&self, repo: &Repository) -> StoreResult<CommitId> {
        RefManager::resolve_branch(repo, &self.inner.branch)
    }

    fn read_value(repo: &Repository, tree: &TreeHandle<'_>, name: &str) -> StoreResult<Option<Vec<u8>>> {
        match tree.get_blob_id(name)? {
            Some(blob_id) => Ok(Some(blob::read_blob(repo, blob_id)?)),
            None => Ok(None),
        }
    }

    fn commit_tree(
        &self,
        repo: &Repository,
        parent: CommitId,
        tree_id: TreeId,
        mutation: Mutation<'_>,
    ) -> StoreResult<CommitId> {
        commit::commit_to_ref(
            repo,
            &self.inner.branch.as_ref_path(),
            Some(parent),
            tree_id,
            &self.inner.signature,
            mutation,
        )
    }

    /// Write `value` under `key`. With `require_present`, nothing is written
    /// unless the key already exists. Returns whether the key now holds
    /// `value`.
    fn write_value(&self, key: &str, value: Vec<u8>, require_present: bool) -> StoreResult<bool> {
        let name = tree::entry_name(key)?;

        self.with_repo(|repo| {
            let tip = self.tip(repo)?;
            let tree = commit::get_tree_at_commit(repo, tip)?;
            let current = tree.get_blob_id(&name)?;

            if require_present && current.is_none() {
                return Ok(false);
            }

            if current == Some(blob::hash_bytes(&value)?) {
                debug!("git store: {} unchanged, skipping commit", key);
                return Ok(true);
            }

            let blob_id = blob::write_blob(repo, &value)?;
            let mut mutator = TreeMutator::from_tree(repo, &tree)?;
            mutator.upsert(&name, blob_id)?;
            let tree_id = mutator.write()?;

            let commit_id = self.commit_tree(repo, tip, tree_id, Mutation::Set(key))?;
            debug!("git store: set {} ({})", key, commit_id.short());
            Ok(true)
        })
    }

    /// Remove `key`. Returns whether it was present; absent keys produce no
    /// commit.
    fn remove_value(&self, key: &str) -> StoreResult<bool> {
        let name = tree::entry_name(key)?;

        self.with_repo(|repo| {
            let tip = self.tip(repo)?;
            let tree = commit::get_tree_at_commit(repo, tip)?;

            let mut mutator = TreeMutator::from_tree(repo, &tree)?;
            if !mutator.remove(&name)? {
                return Ok(false);
            }
            let tree_id = mutator.write()?;

            let commit_id = self.commit_tree(repo, tip, tree_id, Mutation::Delete(key))?;
            debug!("git store: deleted {} ({})", key, commit_id.short());
            Ok(true)
        })
    }

    // ==================== Inspection ====================

    /// Get the current tip of the store's branch.
    pub fn head(&self) -> StoreResult<CommitId> {
        self.with_repo(|repo| self.tip(repo))
    }

    /// List all stored keys.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        self.with_repo(|repo| {
            let tree = commit::get_tree_at_commit(repo, self.tip(repo)?)?;
            Ok(tree.list_keys())
        })
    }

    /// Read the value `key` held at a past commit.
    pub fn get_at(&self, key: &str, at: CommitId) -> StoreResult<Option<Vec<u8>>> {
        let name = tree::entry_name(key)?;
        self.with_repo(|repo| {
            let tree = commit::get_tree_at_commit(repo, at)?;
            Self::read_value(repo, &tree, &name)
        })
    }

    /// Look up a single commit.
    pub fn commit(&self, id: CommitId) -> StoreResult<CommitInfo> {
        self.with_repo(|repo| commit::get_commit(repo, id))
    }

    /// Get commit history of the store's branch, newest first.
    pub fn history(&self, limit: Option<usize>) -> StoreResult<Vec<CommitInfo>> {
        self.with_repo(|repo| commit::log(repo, self.tip(repo)?, limit))
    }

    /// Get statistics about the store.
    pub fn stats(&self) -> StoreResult<StoreStats> {
        self.with_repo(|repo| {
            let tip = self.tip(repo)?;
            let tree = commit::get_tree_at_commit(repo, tip)?;
            let commits = commit::count(repo, tip)?;

            Ok(StoreStats {
                keys: tree.len(),
                commits,
                branch: self.inner.branch.clone(),
                head: tip,
            })
        })
    }
}

impl KeyValueStore for GitStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let name = tree::entry_name(key)?;
        self.with_repo(|repo| {
            let tree = commit::get_tree_at_commit(repo, self.tip(repo)?)?;
            Self::read_value(repo, &tree, &name)
        })
    }

    fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.write_value(key, value, false).map(|_| ())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.remove_value(key).map(|_| ())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let name = tree::entry_name(key)?;
        self.with_repo(|repo| {
            let tree = commit::get_tree_at_commit(repo, self.tip(repo)?)?;
            Ok(tree.contains(&name))
        })
    }

    fn set_if_present(&self, key: &str, value: Vec<u8>) -> StoreResult<bool> {
        self.write_value(key, value, true)
    }

    fn delete_if_present(&self, key: &str) -> StoreResult<bool> {
        self.remove_value(key)
    }
}

/// Statistics about a Git store.
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub keys: usize,
    pub commits: usize,
    pub branch: BranchName,
    pub head: CommitId,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store Statistics:")?;
        writeln!(f, "  Branch: {}", self.branch)?;
        writeln!(f, "  Head: {}", self.head.short())?;
        writeln!(f, "  Keys: {}", self.keys)?;
        writeln!(f, "  Commits: {}", self.commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, GitStore) {
        let dir = TempDir::new().unwrap();
        let store = GitStore::init(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_init_and_open() {
        let dir = TempDir::new().unwrap();

        let store = GitStore::init(dir.path()).unwrap();
        store.set("k", b"v".to_vec()).unwrap();
        let head1 = store.head().unwrap();

        drop(store);
        let store = GitStore::open(dir.path()).unwrap();
        assert_eq!(store.head().unwrap(), head1);
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_init_twice_fails() {
        let (dir, _store) = setup();
        assert!(matches!(
            GitStore::init(dir.path()),
            Err(StoreError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_open_missing_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            GitStore::open(dir.path()),
            Err(StoreError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_open_or_init() {
        let dir = TempDir::new().unwrap();

        let first = GitStore::open_or_init(dir.path()).unwrap();
        let head1 = first.head().unwrap();

        drop(first);
        let second = GitStore::open_or_init(dir.path()).unwrap();
        assert_eq!(second.head().unwrap(), head1);
    }

    #[test]
    fn test_get_set_delete() {
        let (_dir, store) = setup();

        assert_eq!(store.get("k").unwrap(), None);
        assert!(!store.exists("k").unwrap());

        store.set("k", b"1".to_vec()).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"1".to_vec()));
        assert!(store.exists("k").unwrap());

        store.set("k", b"2".to_vec()).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"2".to_vec()));

        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_every_mutation_commits() {
        let (_dir, store) = setup();

        store.set("k", b"1".to_vec()).unwrap();
        store.set("k", b"2".to_vec()).unwrap();
        store.delete("k").unwrap();

        let history = store.history(None).unwrap();
        let summaries: Vec<&str> = history.iter().map(|c| c.summary()).collect();
        assert_eq!(
            summaries,
            vec!["[DELETE] k", "[SET] k", "[SET] k", "[gitkv] Initialize store"]
        );

        let limited = store.history(Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_noop_writes_do_not_commit() {
        let (_dir, store) = setup();

        store.set("k", b"same".to_vec()).unwrap();
        let head = store.head().unwrap();

        store.set("k", b"same".to_vec()).unwrap();
        store.delete("absent").unwrap();
        assert_eq!(store.head().unwrap(), head);
    }

    #[test]
    fn test_conditional_writes() {
        let (_dir, store) = setup();
        let head = store.head().unwrap();

        assert!(!store.set_if_present("k", b"1".to_vec()).unwrap());
        assert!(!store.delete_if_present("k").unwrap());
        assert_eq!(store.head().unwrap(), head);
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", b"1".to_vec()).unwrap();
        assert!(store.set_if_present("k", b"2".to_vec()).unwrap());
        assert_eq!(store.get("k").unwrap(), Some(b"2".to_vec()));
        assert!(store.delete_if_present("k").unwrap());
        assert!(!store.exists("k").unwrap());
    }

    #[test]
    fn test_get_at_past_commit() {
        let (_dir, store) = setup();

        store.set("k", b"old".to_vec()).unwrap();
        let before = store.head().unwrap();
        store.set("k", b"new".to_vec()).unwrap();
        store.delete("k").unwrap();

        assert_eq!(store.get("k").unwrap(), None);
        assert_eq!(store.get_at("k", before).unwrap(), Some(b"old".to_vec()));

        let info = store.commit(before).unwrap();
        assert_eq!(info.summary(), "[SET] k");
        assert!(info.first_parent().is_some());
    }

    #[test]
    fn test_keys_with_awkward_names() {
        let (_dir, store) = setup();

        for key in ["database_t_item_a/b", ".git", "100%", "Actor ID"] {
            store.set(key, key.as_bytes().to_vec()).unwrap();
        }

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec![".git", "100%", "Actor ID", "database_t_item_a/b"]);
        assert_eq!(store.get(".git").unwrap(), Some(b".git".to_vec()));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey { .. })));
    }

    #[test]
    fn test_branch_option() {
        let dir = TempDir::new().unwrap();
        let main = GitStore::open_or_init(dir.path()).unwrap();

        let options = GitStoreOptions::default().branch(BranchName::new("staging").unwrap());
        let staging = GitStore::open_with(dir.path(), options).unwrap();
        staging.set("k", b"v".to_vec()).unwrap();

        assert_eq!(staging.branch().as_str(), "staging");
        assert!(staging.exists("k").unwrap());
        assert!(!main.exists("k").unwrap());
    }

    #[test]
    fn test_signature_option() {
        let dir = TempDir::new().unwrap();
        let options = GitStoreOptions::default().signature(GitSignature::new("Ada", "ada@example.com"));
        let store = GitStore::open_with(dir.path(), options).unwrap();
        store.set("k", b"v".to_vec()).unwrap();

        let latest = &store.history(Some(1)).unwrap()[0];
        assert_eq!(latest.author_name, "Ada");
        assert_eq!(latest.author_email, "ada@example.com");
    }

    #[test]
    fn test_stats() {
        let (_dir, store) = setup();
        store.set("a", b"1".to_vec()).unwrap();
        store.set("b", b"2".to_vec()).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.keys, 2);
        assert_eq!(stats.commits, 3);
        assert_eq!(stats.branch, BranchName::main());
        assert!(stats.to_string().contains("Keys: 2"));
    }

    #[test]
    fn test_shared_across_threads() {
        let (_dir, store) = setup();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.set(&format!("k{}", i), vec![i as u8]).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.keys().unwrap().len(), 4);
    }
}
