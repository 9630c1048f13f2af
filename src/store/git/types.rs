//! type-safe wrappers around git primitives for the Git store.

use std::fmt;

use git2::Oid;

/// Declares a newtype over `git2::Oid` so blob, tree and commit ids cannot
/// be mixed up. The raw Oid stays inside the store module.
macro_rules! oid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Oid);

        impl $name {
            pub(crate) fn new(oid: Oid) -> Self {
                Self(oid)
            }

            pub(crate) fn raw(&self) -> Oid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

oid_newtype!(
    /// id of a commit on the store's branch
    CommitId
);
oid_newtype!(BlobId);
oid_newtype!(TreeId);

impl CommitId {
    /// parse a full 40-char hex commit id
    pub fn from_hex(hex: &str) -> Result<Self, git2::Error> {
        Oid::from_str(hex).map(CommitId)
    }

    /// abbreviated form, as `git log --oneline` prints it
    pub fn short(&self) -> String {
        let mut hex = self.0.to_string();
        hex.truncate(7);
        hex
    }
}

/// the branch a store reads from and commits to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    /// the default branch name
    pub const MAIN: &'static str = "main";

    pub fn new(name: impl Into<String>) -> Result<Self, git2::Error> {
        let name = name.into();
        if !git2::Branch::name_is_valid(&name)? {
            return Err(git2::Error::from_str(&format!(
                "invalid branch name '{}'",
                name
            )));
        }
        Ok(Self(name))
    }

    pub fn main() -> Self {
        Self(Self::MAIN.to_string())
    }

    /// get the full ref path (e.g., "refs/heads/main")
    pub fn as_ref_path(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self::main()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// git signature (author/committer info)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSignature {
    pub name: String,
    pub email: String,
}

impl GitSignature {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// default signature for store commits
    pub fn gitkv() -> Self {
        Self::new("gitkv", "gitkv@localhost")
    }

    pub(crate) fn to_git2_signature(&self) -> Result<git2::Signature<'static>, git2::Error> {
        git2::Signature::now(&self.name, &self.email)
    }
}

impl Default for GitSignature {
    fn default() -> Self {
        Self::gitkv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_name_main() {
        let branch = BranchName::main();
        assert_eq!(branch.as_str(), "main");
        assert_eq!(branch.as_ref_path(), "refs/heads/main");
        assert_eq!(BranchName::default(), branch);
    }

    #[test]
    fn test_branch_name_validation() {
        assert!(BranchName::new("feature/records").is_ok());
        assert!(BranchName::new("").is_err());
        assert!(BranchName::new("bad..name").is_err());
        assert!(BranchName::new("trailing/").is_err());
    }

    #[test]
    fn test_commit_id_short() {
        let id = CommitId::from_hex("0123456789abcdef0123456789abcdef01234567").unwrap();
        assert_eq!(id.short(), "0123456");
    }
}
