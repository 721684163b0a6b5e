use crate::auth::{normalize_email, AuthService};
use crate::db::IdentityRepository;
use crate::types::{AppError, Buyer, Developer, Result, Role};
use std::sync::Arc;

/// Credentials for the first admin, resolved from the environment.
#[derive(Clone)]
pub struct InitialAdmin {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl std::fmt::Debug for InitialAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitialAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Result of [`AdminAccounts::bootstrap_initial_admin`].
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    Created(Buyer),
    AlreadyExists(Buyer),
    /// The email belongs to a developer; nothing was created
    TakenByDeveloper(Developer),
}

/// Creation and housekeeping of admin accounts. Admins are buyer records
/// with the admin role.
#[derive(Clone)]
pub struct AdminAccounts {
    auth: AuthService,
    repository: Arc<dyn IdentityRepository>,
}

impl AdminAccounts {
    pub fn new(auth: AuthService, repository: Arc<dyn IdentityRepository>) -> Self {
        Self { auth, repository }
    }

    /// Creates an admin. Same email rules as any registration.
    pub async fn create_admin(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Buyer> {
        let admin = self
            .auth
            .create_buyer_record(email, password, first_name, last_name, Role::Admin)
            .await?;

        tracing::info!(admin_id = admin.id, email = %admin.email, "admin account created");
        Ok(admin)
    }

    pub async fn list_admins(&self) -> Result<Vec<Buyer>> {
        self.repository.list_admins().await
    }

    /// Disables an admin's login and any token they hold.
    pub async fn deactivate_admin(&self, email: &str) -> Result<Buyer> {
        let email = normalize_email(email);
        let admin = self
            .repository
            .find_buyer_by_email(&email)
            .await?
            .filter(Buyer::is_admin)
            .ok_or_else(|| AppError::NotFound(format!("Admin user {} not found.", email)))?;

        let updated = self
            .repository
            .set_buyer_active(admin.id, false)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Admin user {} not found.", email)))?;

        tracing::info!(admin_id = updated.id, "admin account deactivated");
        Ok(updated)
    }

    /// Creates the initial admin unless the email is already registered.
    /// Safe to run on every start.
    pub async fn bootstrap_initial_admin(&self, initial: &InitialAdmin) -> Result<BootstrapOutcome> {
        let email = normalize_email(&initial.email);

        if let Some(existing) = self.repository.find_buyer_by_email(&email).await? {
            if !existing.is_admin() {
                tracing::warn!(
                    email = %email,
                    "bootstrap admin email belongs to a buyer account; leaving it unchanged"
                );
            }
            return Ok(BootstrapOutcome::AlreadyExists(existing));
        }

        if let Some(developer) = self.repository.find_developer_by_email(&email).await? {
            tracing::warn!(
                email = %email,
                "bootstrap admin email belongs to a developer account; skipping admin creation"
            );
            return Ok(BootstrapOutcome::TakenByDeveloper(developer));
        }

        let admin = self
            .create_admin(
                &email,
                &initial.password,
                &initial.first_name,
                &initial.last_name,
            )
            .await?;
        Ok(BootstrapOutcome::Created(admin))
    }
}
