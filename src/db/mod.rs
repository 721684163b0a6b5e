//! Identity storage.
//!
//! Buyers (and admins) and developers live in two tables of one libsql
//! database that share a single email namespace:
//! - **Memory**: ephemeral, the default for development and tests
//! - **SQLite**: a local database file
//! - **Turso**: a remote database, behind the `turso` feature
//!
//! ```toml
//! [database]
//! url = "./data/novadom.db"
//! ```

#![allow(missing_docs)]

pub mod traits;
pub mod turso;

pub use traits::{DatabaseProvider, IdentityRepository, StatusUpdate, StatusWrite};
pub use turso::TursoClient;
