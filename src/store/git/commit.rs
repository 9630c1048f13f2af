//! Commit creation and history traversal
//!
//! every mutation of the Git store is one commit on the store's branch, so
//! the branch log doubles as an audit trail of writes.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use git2::{ErrorCode, Repository, Revwalk, Sort};

use crate::store::error::{StoreError, StoreResult};
use crate::store::git::tree::{self, TreeHandle};
use crate::store::git::types::{CommitId, GitSignature, TreeId};

/// A commit on the store's branch, as shown by history and stats.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: CommitId,
    pub parent: Option<CommitId>,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    fn from_git2(commit: &git2::Commit<'_>) -> Self {
        let author = commit.author();
        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self {
            id: CommitId::new(commit.id()),
            parent: commit.parent_ids().next().map(CommitId::new),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            author_name: author.name().unwrap_or("unknown").to_string(),
            author_email: author.email().unwrap_or("unknown").to_string(),
            timestamp,
        }
    }

    /// the commit this one was made on top of; `None` for the root commit
    pub fn first_parent(&self) -> Option<CommitId> {
        self.parent
    }

    /// first line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// What a store commit records; its `Display` is the commit message.
///
/// Keys are escaped so the summary line stays a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation<'k> {
    Init,
    Set(&'k str),
    Delete(&'k str),
}

impl fmt::Display for Mutation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Init => f.write_str("[gitkv] Initialize store"),
            Mutation::Set(key) => write!(f, "[SET] {}", key.escape_debug()),
            Mutation::Delete(key) => write!(f, "[DELETE] {}", key.escape_debug()),
        }
    }
}

/// Commit `tree` on top of `parent` and move `refname` to the new commit.
///
/// libgit2 refuses to move the ref if it no longer points at `parent`;
/// that is reported as `ConcurrentModification`.
pub fn commit_to_ref(
    repo: &Repository,
    refname: &str,
    parent: Option<CommitId>,
    tree: TreeId,
    signature: &GitSignature,
    mutation: Mutation<'_>,
) -> StoreResult<CommitId> {
    let tree = repo.find_tree(tree.raw())?;
    let sig = signature.to_git2_signature()?;
    let parent = parent.map(|id| repo.find_commit(id.raw())).transpose()?;
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    let oid = repo
        .commit(Some(refname), &sig, &sig, &mutation.to_string(), &tree, &parents)
        .map_err(|e| match e.code() {
            ErrorCode::Modified => StoreError::ConcurrentModification {
                branch: refname.trim_start_matches("refs/heads/").to_string(),
            },
            _ => StoreError::Git(e),
        })?;

    Ok(CommitId::new(oid))
}

/// create the root commit of a new store, with an empty tree, on HEAD
pub fn create_initial_commit(repo: &Repository, signature: &GitSignature) -> StoreResult<CommitId> {
    let tree = tree::create_initial_tree(repo)?;
    commit_to_ref(repo, "HEAD", None, tree, signature, Mutation::Init)
}

fn find_commit(repo: &Repository, id: CommitId) -> StoreResult<git2::Commit<'_>> {
    repo.find_commit(id.raw())
        .map_err(|_| StoreError::CommitNotFound(id.to_string()))
}

pub fn get_commit(repo: &Repository, id: CommitId) -> StoreResult<CommitInfo> {
    Ok(CommitInfo::from_git2(&find_commit(repo, id)?))
}

/// snapshot of the keys as of `id`
pub fn get_tree_at_commit(repo: &Repository, id: CommitId) -> StoreResult<TreeHandle<'_>> {
    let tree = find_commit(repo, id)?.tree()?;
    Ok(TreeHandle::new(tree))
}

fn walk_from(repo: &Repository, start: CommitId) -> StoreResult<Revwalk<'_>> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push(start.raw())?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    Ok(revwalk)
}

/// commits reachable from `start`, newest first, at most `limit` of them
pub fn log(repo: &Repository, start: CommitId, limit: Option<usize>) -> StoreResult<Vec<CommitInfo>> {
    let revwalk = walk_from(repo, start)?;
    let limit = limit.unwrap_or(usize::MAX);

    revwalk
        .take(limit)
        .map(|oid| -> StoreResult<CommitInfo> {
            let commit = repo.find_commit(oid?)?;
            Ok(CommitInfo::from_git2(&commit))
        })
        .collect()
}

/// number of commits reachable from `start`
pub fn count(repo: &Repository, start: CommitId) -> StoreResult<usize> {
    let mut n = 0;
    for oid in walk_from(repo, start)? {
        oid?;
        n += 1;
    }
    Ok(n)
}
