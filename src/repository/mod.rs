//! Generic CRUD repository.
//!
//! A [`Repository`] binds a table name, a [`Codec`](crate::codec::Codec) and a
//! [`KeyValueStore`](crate::store::KeyValueStore). Items are addressed by
//! identifier; the storage key is `database_<table>_item_<id>`.
//!
//! # Usage
//!
//! ```
//! use gitkv::codec::JsonCodec;
//! use gitkv::model::{Identifier, Item, TableName};
//! use gitkv::repository::Repository;
//! use gitkv::store::MemoryStore;
//!
//! let repo: Repository<String, _, _> =
//!     Repository::new(TableName::new("actors")?, JsonCodec::new(), MemoryStore::new());
//!
//! let id = Identifier::new("Actor ID")?;
//! repo.create(&Item::new(id.clone(), "Steve Buscemi".to_string()))?;
//! assert_eq!(repo.read(&id)?, "Steve Buscemi");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod table;

pub use error::{RepositoryError, RepositoryResult};
pub use table::Repository;
