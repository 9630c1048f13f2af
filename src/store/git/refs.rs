//!  Branch and reference management.
//!
//!  The store reads from and commits to a single branch. This module
//!  resolves that branch and creates it when a store opens on a branch that
//!  does not exist yet.

use git2::{ErrorCode, Repository};

use crate::store::error::{StoreError, StoreResult};
use crate::store::git::types::{BranchName, CommitId};

/// Manages Git references (branches).
pub struct RefManager;

impl RefManager {
    /// Resolve a branch name to its current commit ID.
    pub fn resolve_branch(repo: &Repository, branch: &BranchName) -> StoreResult<CommitId> {
        let reference = repo
            .find_reference(&branch.as_ref_path())
            .map_err(|_| StoreError::RefNotFound(branch.to_string()))?;

        let commit = reference
            .peel_to_commit()
            .map_err(|_| StoreError::RefNotFound(branch.to_string()))?;

        Ok(CommitId::new(commit.id()))
    }

    /// Get the current HEAD commit.
    pub fn head_commit(repo: &Repository) -> StoreResult<CommitId> {
        let head = repo.head().map_err(|e| {
            if e.code() == ErrorCode::UnbornBranch {
                StoreError::EmptyRepository
            } else {
                StoreError::Git(e)
            }
        })?;

        let commit = head.peel_to_commit()?;
        Ok(CommitId::new(commit.id()))
    }

    /// Check if a branch exists.
    pub fn branch_exists(repo: &Repository, branch: &BranchName) -> bool {
        repo.find_reference(&branch.as_ref_path()).is_ok()
    }

    /// Create a new branch pointing to the given commit.
    pub fn create_branch(repo: &Repository, branch: &BranchName, target: CommitId) -> StoreResult<()> {
        let commit = repo.find_commit(target.raw())?;
        repo.branch(branch.as_str(), &commit, false)?;
        Ok(())
    }

    /// Make sure `branch` exists, forking it from HEAD if needed.
    ///
    /// Returns the branch tip.
    pub fn ensure_branch(repo: &Repository, branch: &BranchName) -> StoreResult<CommitId> {
        if Self::branch_exists(repo, branch) {
            return Self::resolve_branch(repo, branch);
        }

        let head = Self::head_commit(repo)?;
        Self::create_branch(repo, branch, head)?;
        log::info!("created branch {} at {}", branch, head.short());
        Ok(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::git::commit::create_initial_commit;
    use crate::store::git::types::GitSignature;
    use tempfile::TempDir;

    fn setup_repo_with_commit() -> (TempDir, Repository, CommitId) {
        let dir = TempDir::new().unwrap();
        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head(BranchName::MAIN);
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        let commit_id = create_initial_commit(&repo, &GitSignature::gitkv()).unwrap();
        (dir, repo, commit_id)
    }

    #[test]
    fn test_head_commit() {
        let (_dir, repo, expected) = setup_repo_with_commit();
        assert_eq!(RefManager::head_commit(&repo).unwrap(), expected);
        assert_eq!(
            RefManager::resolve_branch(&repo, &BranchName::main()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_empty_repository() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        assert!(matches!(
            RefManager::head_commit(&repo),
            Err(StoreError::EmptyRepository)
        ));
    }

    #[test]
    fn test_missing_branch() {
        let (_dir, repo, _) = setup_repo_with_commit();
        let branch = BranchName::new("missing").unwrap();
        assert!(!RefManager::branch_exists(&repo, &branch));
        assert!(matches!(
            RefManager::resolve_branch(&repo, &branch),
            Err(StoreError::RefNotFound(_))
        ));
    }

    #[test]
    fn test_ensure_branch() {
        let (_dir, repo, base) = setup_repo_with_commit();
        let branch = BranchName::new("records").unwrap();

        assert_eq!(RefManager::ensure_branch(&repo, &branch).unwrap(), base);
        assert!(RefManager::branch_exists(&repo, &branch));

        // second call resolves the existing branch
        assert_eq!(RefManager::ensure_branch(&repo, &branch).unwrap(), base);
    }
}
