//! Storage abstraction for identities
//!
//! This module provides the `IdentityRepository` trait that abstracts over
//! different database backends (in-memory SQLite, file-based SQLite, remote
//! Turso).
//!
//! # Example
//!
//! ```rust,ignore
//! use novadom::db::DatabaseProvider;
//!
//! // Use in-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//!
//! // Use file-based SQLite
//! let db = DatabaseProvider::SQLite { path: "data.db".into() }.create_client().await?;
//! ```

use crate::types::{
    Buyer, Developer, NewBuyer, NewDeveloper, Result, VerificationStatus,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Create a repository from this provider configuration
    pub async fn create_client(&self) -> Result<Arc<dyn IdentityRepository>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Arc::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Arc::new(client))
            }
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Arc::new(client))
            }
        }
    }

    /// Maps a configured database url onto a provider.
    ///
    /// Empty or `:memory:` selects the in-memory database; anything else is a
    /// file path.
    pub fn from_url(url: &str) -> Self {
        let url = url.trim();
        if url.is_empty() || url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: url.to_string(),
            }
        }
    }
}

/// How a verification status write treats the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWrite {
    /// Apply only while the developer is still pending
    FromPending,
    /// Apply whatever the current status is
    Unconditional,
}

/// Outcome of a verification status write.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    /// The write happened; carries the updated record
    Applied(Developer),
    /// The precondition did not hold; carries the unchanged record
    Unchanged(Developer),
    /// No developer with that id
    Missing,
}

/// Abstract trait for identity storage.
///
/// The email namespace is shared between buyers and developers, and the
/// storage layer itself must reject an insert whose email exists in either
/// set with `AppError::EmailAlreadyExists`. Any other storage failure is
/// reported as `AppError::Database`.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    // ============== Lookups ==============

    /// Get a buyer-table record (buyer or admin) by email
    async fn find_buyer_by_email(&self, email: &str) -> Result<Option<Buyer>>;

    /// Get a developer by email
    async fn find_developer_by_email(&self, email: &str) -> Result<Option<Developer>>;

    /// Get a buyer-table record by id
    async fn find_buyer_by_id(&self, id: i64) -> Result<Option<Buyer>>;

    /// Get a developer by id
    async fn find_developer_by_id(&self, id: i64) -> Result<Option<Developer>>;

    /// True if the email belongs to any buyer or developer
    async fn email_exists(&self, email: &str) -> Result<bool>;

    // ============== Creation ==============

    /// Insert a buyer-table record
    async fn create_buyer(&self, buyer: NewBuyer) -> Result<Buyer>;

    /// Insert a developer with pending status
    async fn create_developer(&self, developer: NewDeveloper) -> Result<Developer>;

    // ============== Developer Review ==============

    /// Developers ordered by id, optionally filtered by status
    async fn list_developers(&self, status: Option<VerificationStatus>) -> Result<Vec<Developer>>;

    /// Atomically set a developer's verification status
    async fn update_verification_status(
        &self,
        id: i64,
        status: VerificationStatus,
        reason: Option<&str>,
        mode: StatusWrite,
    ) -> Result<StatusUpdate>;

    // ============== Admin Accounts ==============

    /// Buyer-table records with the admin role, ordered by id
    async fn list_admins(&self) -> Result<Vec<Buyer>>;

    /// Set the active flag of a buyer-table record; `None` if missing
    async fn set_buyer_active(&self, id: i64, active: bool) -> Result<Option<Buyer>>;
}
