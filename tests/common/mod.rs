//! Shared fixtures for integration tests.
//!
//! Everything runs against an in-memory database with cheap argon2
//! parameters so the suites stay fast.

#![allow(dead_code)]

use std::sync::Arc;

use novadom::{
    admin::AdminAccounts,
    auth::{
        jwt::{AuthSettings, TokenService},
        password::{CredentialStore, HashParams},
        AuthService,
    },
    db::{IdentityRepository, TursoClient},
    types::{Buyer, Developer, DeveloperRegistrationRequest},
    AppState, NovadomConfig,
};

pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";
pub const PASSWORD: &str = "securepass123";

/// Argon2 costs low enough for tests; still a real argon2id hash.
pub fn fast_hash_params() -> HashParams {
    HashParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn test_settings(token_ttl: i64) -> AuthSettings {
    AuthSettings {
        secret: TEST_SECRET.to_string(),
        algorithm: jsonwebtoken::Algorithm::HS256,
        token_ttl,
    }
}

pub async fn memory_repository() -> Arc<dyn IdentityRepository> {
    Arc::new(
        TursoClient::new_memory()
            .await
            .expect("Failed to create in-memory database"),
    )
}

/// Application state over `repository` with the given token lifetime.
pub fn state_with(repository: Arc<dyn IdentityRepository>, token_ttl: i64) -> AppState {
    AppState::new(
        NovadomConfig::default(),
        repository,
        TokenService::new(&test_settings(token_ttl)),
        CredentialStore::new(fast_hash_params()).expect("valid hash params"),
    )
}

pub async fn test_state() -> AppState {
    state_with(memory_repository().await, 1800)
}

pub fn auth_service(state: &AppState) -> AuthService {
    state.auth_service()
}

pub fn admin_accounts(state: &AppState) -> AdminAccounts {
    state.admin_accounts()
}

pub fn developer_request(email: &str) -> DeveloperRegistrationRequest {
    DeveloperRegistrationRequest {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        company_name: "ABC Construction Ltd.".to_string(),
        contact_person: "Jane Smith".to_string(),
        phone: "+359881234567".to_string(),
        address: "Sofia, Bulgaria".to_string(),
        website: Some("https://abc.example.com".to_string()),
    }
}

pub async fn register_buyer(state: &AppState, email: &str) -> Buyer {
    state
        .auth_service()
        .register_buyer(email, PASSWORD, "John", "Doe")
        .await
        .expect("buyer registration should succeed")
}

pub async fn register_developer(state: &AppState, email: &str) -> Developer {
    state
        .auth_service()
        .register_developer(developer_request(email))
        .await
        .expect("developer registration should succeed")
}

pub async fn create_admin(state: &AppState, email: &str) -> Buyer {
    state
        .admin_accounts()
        .create_admin(email, PASSWORD, "Admin", "User")
        .await
        .expect("admin creation should succeed")
}

/// Logs in and returns the raw bearer token.
pub async fn login(state: &AppState, email: &str) -> String {
    let (_, issued) = state
        .auth_service()
        .authenticate(email, PASSWORD)
        .await
        .expect("login should succeed");
    issued.token
}
