//! Item model: identifiers, table names, derived storage keys and the
//! generic item envelope a repository persists.

mod item;
mod types;

pub use item::Item;
pub use types::{Identifier, InvalidNameError, StorageKey, TableName};
