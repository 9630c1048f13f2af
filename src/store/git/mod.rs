//! Git-backed store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         GitStore                            │
//! │        (KeyValueStore: get, set, delete, exists)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │    tree     │       │    blob     │       │    refs     │
//!  │   (keys)    │       │  (values)   │       │  (branch)   │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//!         │                     │                     │
//!         └─────────────────────┼─────────────────────┘
//!                               │
//!                               ▼
//!                        ┌─────────────┐
//!                        │   commit    │
//!                        │  (history)  │
//!                        └─────────────┘
//! ```

mod blob;
mod commit;
mod refs;
mod repository;
mod tree;
mod types;

pub use commit::CommitInfo;
pub use repository::{GitStore, GitStoreOptions, StoreStats};
pub use types::{BranchName, CommitId, GitSignature};
