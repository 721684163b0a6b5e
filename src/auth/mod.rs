//! Authentication and access control
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id hashing and verification
//! - [`auth::jwt`](crate::auth::jwt) - Signed, expiring bearer tokens
//! - [`auth::service`](crate::auth::service) - Registration, login and token resolution
//! - [`auth::guards`](crate::auth::guards) - Pure access rules over a principal
//! - [`auth::middleware`](crate::auth::middleware) - Axum middleware and the `Guarded` extractor
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id with a random salt per hash; cost read from
//!   the stored hash on verification
//! - **JWT Tokens**: HMAC-signed tokens carrying the principal id and kind,
//!   expiring after `auth.token_ttl_secs`
//! - **Uniform failures**: an unknown email and a wrong password are
//!   indistinguishable, in body and in hashing work
//!
//! # Usage
//!
//! ```ignore
//! use novadom::auth::guards::AdminOnly;
//! use novadom::auth::middleware::{auth_middleware, Guarded};
//!
//! async fn pending(Guarded(admin): Guarded<AdminOnly>) -> impl IntoResponse {
//!     format!("Hello, {}!", admin.first_name)
//! }
//!
//! let app = Router::new()
//!     .route("/pending", get(pending))
//!     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET"  # Secret itself lives in the environment
//! token_ttl_secs = 1800
//! algorithm = "HS256"
//! ```

/// Pure access rules.
pub mod guards;
/// Token signing and verification.
pub mod jwt;
/// Request authentication middleware and extractors.
pub mod middleware;
/// Password hashing.
pub mod password;
/// Registration and login.
pub mod service;

pub use service::{normalize_email, AuthService};
