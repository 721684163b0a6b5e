use crate::auth::jwt::{IssuedToken, TokenError, TokenService};
use crate::auth::password::CredentialStore;
use crate::db::IdentityRepository;
use crate::types::{
    AppError, Buyer, Developer, DeveloperRegistrationRequest, NewBuyer, NewDeveloper, Principal,
    PrincipalKind, Result, Role,
};
use std::sync::Arc;

/// Registration, login and token resolution.
///
/// Cheap to build per request: it only holds the shared handles from
/// [`AppState`](crate::AppState).
#[derive(Clone)]
pub struct AuthService {
    repository: Arc<dyn IdentityRepository>,
    tokens: Arc<TokenService>,
    credentials: Arc<CredentialStore>,
}

/// Emails are compared case-insensitively and stored lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn IdentityRepository>,
        tokens: Arc<TokenService>,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        Self {
            repository,
            tokens,
            credentials,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    // ============== Registration ==============

    /// Registers a buyer. The email must be unused by buyers and developers.
    pub async fn register_buyer(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Buyer> {
        let buyer = self
            .create_buyer_record(email, password, first_name, last_name, Role::Buyer)
            .await?;

        tracing::info!(buyer_id = buyer.id, email = %buyer.email, "buyer registered");
        Ok(buyer)
    }

    /// Registers a developer in the pending state.
    pub async fn register_developer(&self, request: DeveloperRegistrationRequest) -> Result<Developer> {
        let email = normalize_email(&request.email);
        require_at_sign(&email)?;

        if self.repository.email_exists(&email).await? {
            return Err(AppError::EmailAlreadyExists(email));
        }

        let password_hash = self.hash_password(&request.password).await?;
        let developer = self
            .repository
            .create_developer(NewDeveloper {
                email,
                password_hash,
                company_name: request.company_name,
                contact_person: request.contact_person,
                phone: request.phone,
                address: request.address,
                website: request.website,
            })
            .await?;

        tracing::info!(
            developer_id = developer.id,
            email = %developer.email,
            "developer registered, awaiting verification"
        );
        Ok(developer)
    }

    /// Shared insert path for buyers and admins.
    ///
    /// The pre-check gives a clean error in the common case; the storage
    /// constraint still decides concurrent inserts.
    pub(crate) async fn create_buyer_record(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
    ) -> Result<Buyer> {
        let email = normalize_email(email);
        require_at_sign(&email)?;

        if self.repository.email_exists(&email).await? {
            return Err(AppError::EmailAlreadyExists(email));
        }

        let password_hash = self.hash_password(password).await?;
        self.repository
            .create_buyer(NewBuyer {
                email,
                password_hash,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                role,
            })
            .await
    }

    // ============== Login ==============

    /// Checks credentials and issues a token.
    ///
    /// Buyers are tried before developers. An unknown email and a wrong
    /// password produce the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(Principal, IssuedToken)> {
        let email = normalize_email(email);

        if let Some(buyer) = self.repository.find_buyer_by_email(&email).await? {
            if !self.verify_password(password, &buyer.password_hash).await? {
                tracing::warn!(email = %email, "login failed: wrong password");
                return Err(AppError::InvalidCredentials);
            }
            if !buyer.is_active {
                tracing::warn!(buyer_id = buyer.id, "login refused: account disabled");
                return Err(AppError::AccountDisabled);
            }
            let issued = self.issue(buyer.id, buyer.kind())?;
            tracing::info!(buyer_id = buyer.id, kind = %buyer.kind(), "login succeeded");
            return Ok((Principal::Buyer(buyer), issued));
        }

        if let Some(developer) = self.repository.find_developer_by_email(&email).await? {
            if !self.verify_password(password, &developer.password_hash).await? {
                tracing::warn!(email = %email, "login failed: wrong password");
                return Err(AppError::InvalidCredentials);
            }
            let issued = self.issue(developer.id, developer.kind())?;
            tracing::info!(developer_id = developer.id, kind = %developer.kind(), "login succeeded");
            return Ok((Principal::Developer(developer), issued));
        }

        self.verify_dummy(password).await?;
        tracing::warn!(email = %email, "login failed: unknown email");
        Err(AppError::InvalidCredentials)
    }

    // ============== Token Resolution ==============

    /// Maps a bearer token to the current state of its principal.
    pub async fn resolve_principal(&self, token: &str) -> Result<Principal> {
        let verified = self.tokens.verify(token).map_err(|e| match e {
            TokenError::Expired => {
                tracing::warn!("bearer token expired");
                AppError::TokenExpired
            }
            TokenError::Invalid(reason) => {
                tracing::warn!(reason = %reason, "bearer token rejected");
                AppError::TokenInvalid(reason)
            }
        })?;

        let id = verified.subject_id;
        if verified.kind.is_buyer_backed() {
            let buyer = self
                .repository
                .find_buyer_by_id(id)
                .await?
                .ok_or_else(|| AppError::UserNotFound(format!("buyer {}", id)))?;
            if !buyer.is_active {
                return Err(AppError::AccountDisabled);
            }
            Ok(Principal::Buyer(buyer))
        } else {
            let developer = self
                .repository
                .find_developer_by_id(id)
                .await?
                .ok_or_else(|| AppError::UserNotFound(format!("developer {}", id)))?;
            Ok(Principal::Developer(developer))
        }
    }

    fn issue(&self, id: i64, kind: PrincipalKind) -> Result<IssuedToken> {
        self.tokens
            .issue(id, kind)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
    }

    // ============== Hashing on the blocking pool ==============

    async fn hash_password(&self, password: &str) -> Result<String> {
        let credentials = Arc::clone(&self.credentials);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let credentials = Arc::clone(&self.credentials);
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || credentials.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))
    }

    async fn verify_dummy(&self, password: &str) -> Result<()> {
        let credentials = Arc::clone(&self.credentials);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || credentials.verify_dummy(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))
    }
}

fn require_at_sign(email: &str) -> Result<()> {
    if !email.contains('@') {
        return Err(AppError::Validation(
            "Email must be in a valid format (e.g., user@example.com).".to_string(),
        ));
    }
    Ok(())
}
