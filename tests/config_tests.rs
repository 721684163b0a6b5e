//! Loading novadom.toml and building the application from it.
//!
//! Every test uses its own env var names so they can run in parallel.

use axum_test::TestServer;
use novadom::{
    admin::BootstrapOutcome, build_app, utils::toml_config::LogFormat, AppState, ConfigError,
    NovadomConfig,
};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

const SECRET: &str = "config-test-secret-with-at-least-32-bytes";

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    std::env::set_var("NOVADOM_CFG_TEST_SECRET_FULL", SECRET);
    let file = write_config(
        r#"
[server]
host = "0.0.0.0"
port = 9000
log_format = "json"
cors_origins = ["https://novadom.bg"]

[auth]
jwt_secret_env = "NOVADOM_CFG_TEST_SECRET_FULL"
token_ttl_secs = 600
algorithm = "HS512"

[auth.password]
memory_kib = 8192
iterations = 2
parallelism = 1

[database]
url = ":memory:"
"#,
    );

    let config = NovadomConfig::load(file.path()).unwrap();

    assert_eq!(config.bind_address(), "0.0.0.0:9000");
    assert_eq!(config.server.log_format, LogFormat::Json);
    assert_eq!(config.server.cors_origins, vec!["https://novadom.bg"]);
    assert_eq!(config.auth.token_ttl_secs, 600);
    assert_eq!(config.hash_params().memory_kib, 8192);
    assert_eq!(config.jwt_secret().unwrap(), SECRET);
}

#[test]
fn test_missing_file() {
    let err = NovadomConfig::load("/definitely/not/here/novadom.toml").unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
}

#[test]
fn test_missing_secret_env_var() {
    let file = write_config(
        r#"
[auth]
jwt_secret_env = "NOVADOM_CFG_TEST_SECRET_NEVER_SET"
"#,
    );

    let err = NovadomConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "NOVADOM_CFG_TEST_SECRET_NEVER_SET"));
}

#[test]
fn test_short_secret_is_rejected() {
    std::env::set_var("NOVADOM_CFG_TEST_SECRET_SHORT", "too-short");
    let file = write_config(
        r#"
[auth]
jwt_secret_env = "NOVADOM_CFG_TEST_SECRET_SHORT"
"#,
    );

    let err = NovadomConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_invalid_toml() {
    let file = write_config("[server\nport = ");
    let err = NovadomConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[tokio::test]
async fn test_app_from_config_bootstraps_admin() {
    std::env::set_var("NOVADOM_CFG_TEST_SECRET_APP", SECRET);
    std::env::set_var("NOVADOM_CFG_TEST_ADMIN_EMAIL", "root@novadom.bg");
    std::env::set_var("NOVADOM_CFG_TEST_ADMIN_PASSWORD", "rootpass123");
    let file = write_config(
        r#"
[auth]
jwt_secret_env = "NOVADOM_CFG_TEST_SECRET_APP"

[auth.password]
memory_kib = 1024
iterations = 1
parallelism = 1

[database]
url = ":memory:"

[admin]
email_env = "NOVADOM_CFG_TEST_ADMIN_EMAIL"
password_env = "NOVADOM_CFG_TEST_ADMIN_PASSWORD"
"#,
    );

    let config = NovadomConfig::load(file.path()).unwrap();
    let state = AppState::from_config(config).await.unwrap();

    let initial = state.config.initial_admin().expect("admin env vars are set");
    let outcome = state
        .admin_accounts()
        .bootstrap_initial_admin(&initial)
        .await
        .unwrap();
    assert!(matches!(outcome, BootstrapOutcome::Created(_)));

    let server = TestServer::new(build_app(state)).unwrap();
    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "root@novadom.bg", "password": "rootpass123" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user_type"], "admin");
}
