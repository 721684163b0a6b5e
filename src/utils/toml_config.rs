//! TOML-based configuration for NovaDom
//!
//! Infrastructure settings come from `novadom.toml`; secrets stay in the
//! environment and the file only names the variables that hold them.
//!
//! The configuration is loaded once at startup and never changes afterwards.
//! Everything derived from it ([`AuthSettings`], [`HashParams`],
//! [`DatabaseProvider`]) is built from the loaded value and passed down
//! explicitly.

use crate::admin::InitialAdmin;
use crate::auth::jwt::{AuthSettings, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};
use crate::auth::password::{CredentialStore, HashParams};
use crate::db::DatabaseProvider;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Shortest accepted JWT secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Root configuration structure loaded from novadom.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NovadomConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Initial admin created on startup, when its env vars are set
    #[serde(default)]
    pub admin: AdminBootstrapConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Browser origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://localhost:8080".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            cors_origins: default_cors_origins(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,

    /// HMAC algorithm: HS256, HS384 or HS512
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    #[serde(default)]
    pub password: PasswordConfig,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_token_ttl_secs() -> i64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_ttl_secs: default_token_ttl_secs(),
            algorithm: default_algorithm(),
            password: PasswordConfig::default(),
        }
    }
}

/// Argon2id cost. Existing hashes keep their own cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    HashParams::default().memory_kib
}

fn default_iterations() -> u32 {
    HashParams::default().iterations
}

fn default_parallelism() -> u32 {
    HashParams::default().parallelism
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for Turso URL (optional cloud config)
    pub turso_url_env: Option<String>,

    /// Environment variable for Turso auth token
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/novadom.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

// ============= Admin Bootstrap Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminBootstrapConfig {
    #[serde(default = "default_admin_email_env")]
    pub email_env: String,

    #[serde(default = "default_admin_password_env")]
    pub password_env: String,

    #[serde(default = "default_admin_first_name")]
    pub first_name: String,

    #[serde(default = "default_admin_last_name")]
    pub last_name: String,
}

fn default_admin_email_env() -> String {
    "INITIAL_ADMIN_EMAIL".to_string()
}

fn default_admin_password_env() -> String {
    "INITIAL_ADMIN_PASSWORD".to_string()
}

fn default_admin_first_name() -> String {
    "Admin".to_string()
}

fn default_admin_last_name() -> String {
    "User".to_string()
}

impl Default for AdminBootstrapConfig {
    fn default() -> Self {
        Self {
            email_env: default_admin_email_env(),
            password_env: default_admin_password_env(),
            first_name: default_admin_first_name(),
            last_name: default_admin_last_name(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl NovadomConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: NovadomConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Checks values and the availability of referenced env vars
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.jwt_secret()?;
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::ValidationError(format!(
                "JWT secret in '{}' must be at least {} bytes",
                self.auth.jwt_secret_env, MIN_JWT_SECRET_LEN
            )));
        }

        self.algorithm()?;

        if self.auth.token_ttl_secs < 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_ttl_secs must not be negative".to_string(),
            ));
        }
        if self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_ttl_secs must be at most {}",
                MAX_TOKEN_TTL_SECS
            )));
        }

        CredentialStore::new(self.hash_params())
            .map_err(|e| ConfigError::ValidationError(format!("auth.password: {}", e)))?;

        if let Some(ref env) = self.database.turso_url_env {
            self.validate_env_var(env)?;
        }
        if let Some(ref env) = self.database.turso_token_env {
            self.validate_env_var(env)?;
        }

        for origin in &self.server.cors_origins {
            axum::http::HeaderValue::from_str(origin).map_err(|_| {
                ConfigError::ValidationError(format!("Invalid CORS origin: {}", origin))
            })?;
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.auth.jwt_secret_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// The configured signing algorithm. Only HMAC variants are accepted.
    pub fn algorithm(&self) -> Result<Algorithm, ConfigError> {
        match self.auth.algorithm.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            other => Err(ConfigError::ValidationError(format!(
                "Unsupported JWT algorithm '{}'; expected HS256, HS384 or HS512",
                other
            ))),
        }
    }

    /// Immutable token settings for [`TokenService`](crate::auth::jwt::TokenService)
    pub fn auth_settings(&self) -> Result<AuthSettings, ConfigError> {
        Ok(AuthSettings {
            secret: self.jwt_secret()?,
            algorithm: self.algorithm()?,
            token_ttl: self.auth.token_ttl_secs,
        })
    }

    pub fn hash_params(&self) -> HashParams {
        HashParams {
            memory_kib: self.auth.password.memory_kib,
            iterations: self.auth.password.iterations,
            parallelism: self.auth.password.parallelism,
        }
    }

    /// Storage backend selected by the `[database]` section.
    ///
    /// With the `turso` feature and both Turso env vars set, the remote
    /// database wins over the local url.
    pub fn database_provider(&self) -> DatabaseProvider {
        #[cfg(feature = "turso")]
        {
            let url = self
                .database
                .turso_url_env
                .as_deref()
                .and_then(|env| self.resolve_env(env));
            let token = self
                .database
                .turso_token_env
                .as_deref()
                .and_then(|env| self.resolve_env(env));
            if let (Some(url), Some(auth_token)) = (url, token) {
                return DatabaseProvider::Turso { url, auth_token };
            }
        }

        DatabaseProvider::from_url(&self.database.url)
    }

    /// Initial admin credentials, if both env vars are set.
    pub fn initial_admin(&self) -> Option<InitialAdmin> {
        let email = self.resolve_env(&self.admin.email_env)?;
        let password = self.resolve_env(&self.admin.password_env)?;

        Some(InitialAdmin {
            email,
            password,
            first_name: self.admin.first_name.clone(),
            last_name: self.admin.last_name.clone(),
        })
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
