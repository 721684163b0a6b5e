//! # NovaDom - identity and access core
//!
//! Authentication and authorization backend for the NovaDom new-construction
//! real estate platform: buyer and developer registration over one email
//! namespace, password login with signed bearer tokens, and an admin review
//! workflow that gates what developers may do.
//!
//! ## Overview
//!
//! NovaDom can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `novadom-server` binary
//! 2. **As a library** - Build an [`AppState`] and mount [`build_app`]
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use novadom::{build_app, AppState, NovadomConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NovadomConfig::load("novadom.toml")?;
//!     let state = AppState::from_config(config).await?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, build_app(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `turso` | Remote Turso database |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`admin`] - Developer verification workflow and admin accounts
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Password hashing, tokens, guards and middleware
//! - [`cli`] - Command-line interface
//! - [`db`] - Identity storage (SQLite, Turso)
//! - [`types`] - Domain types, DTOs and error handling
//! - [`utils`] - Configuration loading

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Developer review and admin account management.
pub mod admin;
/// HTTP API handlers and routes.
pub mod api;
/// Authentication, tokens and access control.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Identity storage.
pub mod db;
/// Core types (principals, requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

use crate::admin::{AdminAccounts, VerificationWorkflow};
use crate::auth::jwt::TokenService;
use crate::auth::password::CredentialStore;
use crate::auth::AuthService;
use crate::db::IdentityRepository;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Largest accepted request body. Registration payloads are small.
const MAX_BODY_BYTES: usize = 64 * 1024;

// Re-export commonly used types
pub use db::{DatabaseProvider, TursoClient};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigError, NovadomConfig};

/// Shared handles for request handlers. Everything here is immutable or
/// internally synchronized; services are built from it per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NovadomConfig>,
    pub repository: Arc<dyn IdentityRepository>,
    pub tokens: Arc<TokenService>,
    pub credentials: Arc<CredentialStore>,
}

impl AppState {
    pub fn new(
        config: NovadomConfig,
        repository: Arc<dyn IdentityRepository>,
        tokens: TokenService,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repository,
            tokens: Arc::new(tokens),
            credentials: Arc::new(credentials),
        }
    }

    /// Opens the configured database and derives the signing and hashing
    /// services from the configuration.
    pub async fn from_config(config: NovadomConfig) -> Result<Self> {
        let settings = config
            .auth_settings()
            .map_err(|e| AppError::Internal(format!("Invalid auth configuration: {}", e)))?;
        let credentials = CredentialStore::new(config.hash_params())?;
        let repository = config.database_provider().create_client().await?;

        Ok(Self::new(
            config,
            repository,
            TokenService::new(&settings),
            credentials,
        ))
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.tokens),
            Arc::clone(&self.credentials),
        )
    }

    pub fn verification(&self) -> VerificationWorkflow {
        VerificationWorkflow::new(Arc::clone(&self.repository))
    }

    pub fn admin_accounts(&self) -> AdminAccounts {
        AdminAccounts::new(self.auth_service(), Arc::clone(&self.repository))
    }
}

/// The complete HTTP application: `/api/v1` routes, `/health`, request
/// tracing, a body size limit and, with the `swagger-ui` feature, the API
/// docs.
pub fn build_app(state: AppState) -> Router {
    let app = Router::new()
        .route("/", get(api::handlers::health::root))
        .route("/health", get(api::handlers::health::health_check))
        .nest("/api/v1", api::routes::create_router(state.clone()));

    #[cfg(feature = "swagger-ui")]
    let app = app.merge(api::swagger_ui_router());

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
    )
    .with_state(state)
}
