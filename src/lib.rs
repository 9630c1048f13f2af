//! gitkv - typed CRUD repositories over a key-value store
//!
//! Records of any serde type are grouped into named tables and stored under
//! the key `database_<table>_item_<id>`. The store can be in memory or a Git
//! repository where every mutation is a commit.
//!
//! # Example
//!
//! ```no_run
//! use gitkv::db::Database;
//! use gitkv::model::{Identifier, Item};
//!
//! let db = Database::open("./my_database")?;
//! let actors = db.repository::<String>("actors")?;
//!
//! let id = Identifier::new("Actor ID")?;
//! actors.create(&Item::new(id.clone(), "Steve Buscemi".to_string()))?;
//! actors.update(&Item::new(id.clone(), "Willem Dafoe".to_string()))?;
//! assert_eq!(actors.read(&id)?, "Willem Dafoe");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod repository;
pub mod store;
