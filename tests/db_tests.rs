//! Database integration tests
//!
//! These exercise `TursoClient` directly, below the auth services, against
//! both in-memory and file-backed SQLite.

use novadom::{
    db::{DatabaseProvider, IdentityRepository, StatusUpdate, StatusWrite, TursoClient},
    types::{AppError, NewBuyer, NewDeveloper, Role, VerificationStatus},
};
use tempfile::TempDir;

/// Test helper to create a TursoClient with in-memory database
async fn create_test_client() -> TursoClient {
    TursoClient::new_memory()
        .await
        .expect("Failed to create in-memory database")
}

fn new_buyer(email: &str) -> NewBuyer {
    NewBuyer {
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        role: Role::Buyer,
    }
}

fn new_developer(email: &str) -> NewDeveloper {
    NewDeveloper {
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        company_name: "ABC Construction Ltd.".to_string(),
        contact_person: "Jane Smith".to_string(),
        phone: "+359881234567".to_string(),
        address: "Sofia".to_string(),
        website: None,
    }
}

#[tokio::test]
async fn test_create_memory_client() {
    let client = create_test_client().await;
    assert!(client.connection().is_ok());
}

#[tokio::test]
async fn test_create_and_find_buyer() {
    let client = create_test_client().await;

    let created = client.create_buyer(new_buyer("buyer@x.com")).await.unwrap();
    assert!(created.id > 0);
    assert!(created.is_active);

    let by_email = client.find_buyer_by_email("buyer@x.com").await.unwrap();
    let by_id = client.find_buyer_by_id(created.id).await.unwrap();
    assert_eq!(by_email.as_ref(), Some(&created));
    assert_eq!(by_id, Some(created));
}

#[tokio::test]
async fn test_email_lookup_ignores_case() {
    let client = create_test_client().await;
    client.create_buyer(new_buyer("buyer@x.com")).await.unwrap();
    client
        .create_developer(new_developer("dev@x.com"))
        .await
        .unwrap();

    assert!(client.email_exists("BUYER@x.com").await.unwrap());
    assert!(client.email_exists("Dev@X.com").await.unwrap());
    assert!(!client.email_exists("other@x.com").await.unwrap());
}

#[tokio::test]
async fn test_storage_rejects_cross_table_duplicates() {
    let client = create_test_client().await;
    client.create_buyer(new_buyer("one@x.com")).await.unwrap();
    client
        .create_developer(new_developer("two@x.com"))
        .await
        .unwrap();

    let dev_err = client
        .create_developer(new_developer("ONE@x.com"))
        .await
        .unwrap_err();
    let buyer_err = client.create_buyer(new_buyer("two@x.com")).await.unwrap_err();
    let same_table_err = client.create_buyer(new_buyer("one@x.com")).await.unwrap_err();

    assert!(matches!(dev_err, AppError::EmailAlreadyExists(_)));
    assert!(matches!(buyer_err, AppError::EmailAlreadyExists(_)));
    assert!(matches!(same_table_err, AppError::EmailAlreadyExists(_)));
}

#[tokio::test]
async fn test_missing_records_are_none() {
    let client = create_test_client().await;

    assert!(client.find_buyer_by_id(1).await.unwrap().is_none());
    assert!(client.find_developer_by_id(1).await.unwrap().is_none());
    assert!(client.set_buyer_active(1, false).await.unwrap().is_none());
    assert_eq!(
        client
            .update_verification_status(
                1,
                VerificationStatus::Verified,
                None,
                StatusWrite::FromPending
            )
            .await
            .unwrap(),
        StatusUpdate::Missing
    );
}

#[tokio::test]
async fn test_conditional_status_write() {
    let client = create_test_client().await;
    let developer = client
        .create_developer(new_developer("dev@x.com"))
        .await
        .unwrap();

    let first = client
        .update_verification_status(
            developer.id,
            VerificationStatus::Rejected,
            Some("Incomplete documents"),
            StatusWrite::FromPending,
        )
        .await
        .unwrap();
    let rejected = match first {
        StatusUpdate::Applied(d) => d,
        other => panic!("expected applied, got {:?}", other),
    };
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("Incomplete documents")
    );

    let second = client
        .update_verification_status(
            developer.id,
            VerificationStatus::Verified,
            None,
            StatusWrite::FromPending,
        )
        .await
        .unwrap();
    assert_eq!(second, StatusUpdate::Unchanged(rejected));

    let reset = client
        .update_verification_status(
            developer.id,
            VerificationStatus::Pending,
            None,
            StatusWrite::Unconditional,
        )
        .await
        .unwrap();
    match reset {
        StatusUpdate::Applied(d) => {
            assert_eq!(d.verification_status, VerificationStatus::Pending);
            assert_eq!(d.rejection_reason, None);
        }
        other => panic!("expected applied, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_developers_by_status() {
    let client = create_test_client().await;
    let a = client.create_developer(new_developer("a@x.com")).await.unwrap();
    let b = client.create_developer(new_developer("b@x.com")).await.unwrap();
    client
        .update_verification_status(
            a.id,
            VerificationStatus::Verified,
            None,
            StatusWrite::FromPending,
        )
        .await
        .unwrap();

    let all = client.list_developers(None).await.unwrap();
    let verified = client
        .list_developers(Some(VerificationStatus::Verified))
        .await
        .unwrap();
    let pending = client
        .list_developers(Some(VerificationStatus::Pending))
        .await
        .unwrap();

    assert_eq!(all.iter().map(|d| d.id).collect::<Vec<_>>(), vec![a.id, b.id]);
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].id, a.id);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, b.id);
}

#[tokio::test]
async fn test_list_admins_only_returns_admin_role() {
    let client = create_test_client().await;
    client.create_buyer(new_buyer("buyer@x.com")).await.unwrap();
    let admin = client
        .create_buyer(NewBuyer {
            role: Role::Admin,
            ..new_buyer("admin@x.com")
        })
        .await
        .unwrap();

    let admins = client.list_admins().await.unwrap();
    assert_eq!(admins, vec![admin]);
}

#[tokio::test]
async fn test_file_database_persists_across_clients() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("novadom.db");
    let path = path.to_str().unwrap();

    let buyer_id = {
        let client = TursoClient::new_local(path).await.unwrap();
        client.create_buyer(new_buyer("buyer@x.com")).await.unwrap().id
    };

    let reopened = TursoClient::new_local(path).await.unwrap();
    let buyer = reopened.find_buyer_by_id(buyer_id).await.unwrap();
    assert_eq!(buyer.map(|b| b.email), Some("buyer@x.com".to_string()));

    // Schema creation is idempotent and the triggers survive reopening.
    let err = reopened
        .create_developer(new_developer("buyer@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmailAlreadyExists(_)));
}

#[tokio::test]
async fn test_provider_from_url() {
    assert_eq!(DatabaseProvider::from_url(""), DatabaseProvider::Memory);
    assert_eq!(DatabaseProvider::from_url(":memory:"), DatabaseProvider::Memory);
    assert_eq!(
        DatabaseProvider::from_url("./data/novadom.db"),
        DatabaseProvider::SQLite {
            path: "./data/novadom.db".to_string()
        }
    );

    let repository = DatabaseProvider::Memory.create_client().await.unwrap();
    assert!(!repository.email_exists("a@x.com").await.unwrap());
}

#[tokio::test]
async fn test_file_provider_needs_no_feature_and_creates_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("data").join("novadom.db");

    let provider = DatabaseProvider::from_url(path.to_str().unwrap());
    assert!(matches!(provider, DatabaseProvider::SQLite { .. }));

    let repository = provider.create_client().await.unwrap();
    repository.create_buyer(new_buyer("buyer@x.com")).await.unwrap();

    assert!(path.exists());
    assert!(repository.email_exists("BUYER@x.com").await.unwrap());
}
