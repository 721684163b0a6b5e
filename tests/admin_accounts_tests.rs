//! Admin account creation, bootstrap and deactivation.

mod common;

use common::*;
use novadom::{
    admin::{BootstrapOutcome, InitialAdmin},
    types::{AppError, PrincipalKind, Role},
};

fn initial_admin(email: &str) -> InitialAdmin {
    InitialAdmin {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
    }
}

#[tokio::test]
async fn test_create_admin_logs_in_with_admin_kind() {
    let state = test_state().await;
    let admin = create_admin(&state, "admin@novadom.bg").await;
    assert_eq!(admin.role, Role::Admin);

    let (principal, _) = state
        .auth_service()
        .authenticate("admin@novadom.bg", PASSWORD)
        .await
        .unwrap();
    assert_eq!(principal.kind(), PrincipalKind::Admin);
}

#[tokio::test]
async fn test_admin_email_shares_namespace_with_developers() {
    let state = test_state().await;
    register_developer(&state, "taken@x.com").await;

    let err = state
        .admin_accounts()
        .create_admin("taken@x.com", PASSWORD, "Admin", "User")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::EmailAlreadyExists(_)));
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let state = test_state().await;
    let accounts = state.admin_accounts();
    let initial = initial_admin("Root@Novadom.bg");

    let first = accounts.bootstrap_initial_admin(&initial).await.unwrap();
    let created = match first {
        BootstrapOutcome::Created(admin) => admin,
        other => panic!("expected creation, got {:?}", other),
    };
    assert_eq!(created.email, "root@novadom.bg");

    let second = accounts.bootstrap_initial_admin(&initial).await.unwrap();
    assert_eq!(second, BootstrapOutcome::AlreadyExists(created));
    assert_eq!(accounts.list_admins().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_bootstrap_leaves_existing_buyer_untouched() {
    let state = test_state().await;
    let buyer = register_buyer(&state, "owner@x.com").await;

    let outcome = state
        .admin_accounts()
        .bootstrap_initial_admin(&initial_admin("owner@x.com"))
        .await
        .unwrap();

    assert_eq!(outcome, BootstrapOutcome::AlreadyExists(buyer));
    assert!(state.admin_accounts().list_admins().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bootstrap_skips_email_owned_by_developer() {
    let state = test_state().await;
    let developer = register_developer(&state, "studio@x.com").await;

    let outcome = state
        .admin_accounts()
        .bootstrap_initial_admin(&initial_admin("Studio@x.com"))
        .await
        .unwrap();

    assert_eq!(outcome, BootstrapOutcome::TakenByDeveloper(developer));
    assert!(state.admin_accounts().list_admins().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_admins_excludes_buyers() {
    let state = test_state().await;
    register_buyer(&state, "buyer@x.com").await;
    let a = create_admin(&state, "a@novadom.bg").await;
    let b = create_admin(&state, "b@novadom.bg").await;

    let admins = state.admin_accounts().list_admins().await.unwrap();
    let ids: Vec<i64> = admins.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[tokio::test]
async fn test_deactivate_blocks_login_and_existing_tokens() {
    let state = test_state().await;
    create_admin(&state, "admin@novadom.bg").await;
    let token = login(&state, "admin@novadom.bg").await;

    let deactivated = state
        .admin_accounts()
        .deactivate_admin("ADMIN@novadom.bg")
        .await
        .unwrap();
    assert!(!deactivated.is_active);

    let login_err = state
        .auth_service()
        .authenticate("admin@novadom.bg", PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(login_err, AppError::AccountDisabled));

    let token_err = state
        .auth_service()
        .resolve_principal(&token)
        .await
        .unwrap_err();
    assert!(matches!(token_err, AppError::AccountDisabled));
}

#[tokio::test]
async fn test_deactivate_unknown_or_non_admin() {
    let state = test_state().await;
    register_buyer(&state, "buyer@x.com").await;
    let accounts = state.admin_accounts();

    for email in ["nobody@x.com", "buyer@x.com"] {
        match accounts.deactivate_admin(email).await.unwrap_err() {
            AppError::NotFound(msg) => {
                assert_eq!(msg, format!("Admin user {} not found.", email))
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    let buyer = state
        .repository
        .find_buyer_by_email("buyer@x.com")
        .await
        .unwrap()
        .unwrap();
    assert!(buyer.is_active);
}
