use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod identity;

pub use identity::{
    Buyer, Developer, NewBuyer, NewDeveloper, Principal, PrincipalKind, Role, VerificationStatus,
};

// ============= Authentication Request Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BuyerRegistrationRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl BuyerRegistrationRequest {
    /// Checks the request shape and normalizes names in place.
    pub fn validate(&mut self) -> Result<()> {
        validate_email_format(&self.email)?;
        validate_password_strength(&self.password)?;
        self.first_name = validate_person_name("first_name", &self.first_name)?;
        self.last_name = validate_person_name("last_name", &self.last_name)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeveloperRegistrationRequest {
    pub email: String,
    pub password: String,
    pub company_name: String,
    pub contact_person: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl DeveloperRegistrationRequest {
    pub fn validate(&mut self) -> Result<()> {
        validate_email_format(&self.email)?;
        validate_password_strength(&self.password)?;
        self.company_name = validate_min_length("company_name", &self.company_name)?;
        self.contact_person = validate_min_length("contact_person", &self.contact_person)?;
        validate_phone(&self.phone)?;
        self.website = self
            .website
            .take()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());
        Ok(())
    }
}

/// Admin creation shares the buyer shape.
pub type AdminRegistrationRequest = BuyerRegistrationRequest;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2 password-grant form body; `username` carries the email.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenFormRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DeveloperVerificationRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

// ============= Authentication Response Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    pub user_type: PrincipalKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BuyerProfileResponse {
    pub id: i64,
    pub email: String,
    pub user_type: PrincipalKind,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&Buyer> for BuyerProfileResponse {
    fn from(buyer: &Buyer) -> Self {
        Self {
            id: buyer.id,
            email: buyer.email.clone(),
            user_type: buyer.kind(),
            first_name: buyer.first_name.clone(),
            last_name: buyer.last_name.clone(),
            is_active: buyer.is_active,
            created_at: buyer.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeveloperProfileResponse {
    pub id: i64,
    pub email: String,
    pub user_type: PrincipalKind,
    pub company_name: String,
    pub contact_person: String,
    pub phone: String,
    pub address: String,
    pub website: Option<String>,
    pub verification_status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: String,
}

impl From<&Developer> for DeveloperProfileResponse {
    fn from(developer: &Developer) -> Self {
        Self {
            id: developer.id,
            email: developer.email.clone(),
            user_type: developer.kind(),
            company_name: developer.company_name.clone(),
            contact_person: developer.contact_person.clone(),
            phone: developer.phone.clone(),
            address: developer.address.clone(),
            website: developer.website.clone(),
            verification_status: developer.verification_status,
            rejection_reason: developer.rejection_reason.clone(),
            created_at: developer.created_at.to_rfc3339(),
        }
    }
}

/// Profile of whichever principal is calling.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ProfileResponse {
    Buyer(BuyerProfileResponse),
    Developer(DeveloperProfileResponse),
}

impl From<&Principal> for ProfileResponse {
    fn from(principal: &Principal) -> Self {
        match principal {
            Principal::Buyer(b) => ProfileResponse::Buyer(b.into()),
            Principal::Developer(d) => ProfileResponse::Developer(d.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeveloperListResponse {
    pub developers: Vec<DeveloperProfileResponse>,
    pub total_count: usize,
    pub pending_count: usize,
    pub verified_count: usize,
    pub rejected_count: usize,
}

// ============= Request Validation =============

/// Shape check for an email address. Deliverability is not checked.
pub fn validate_email_format(email: &str) -> Result<()> {
    let email = email.trim();
    let invalid = || {
        AppError::Validation(
            "Email must be in a valid format (e.g., user@example.com).".to_string(),
        )
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(())
}

/// At least 8 characters with one digit and one letter.
pub fn validate_password_strength(password: &str) -> Result<()> {
    if password.chars().count() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long.".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must contain at least one digit.".to_string(),
        ));
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err(AppError::Validation(
            "Password must contain at least one letter.".to_string(),
        ));
    }
    Ok(())
}

fn validate_min_length(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() < 2 {
        return Err(AppError::Validation(format!(
            "{} must be at least 2 characters long.",
            field
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims and title-cases a person's name.
fn validate_person_name(field: &str, value: &str) -> Result<String> {
    let trimmed = validate_min_length(field, value)?;
    Ok(title_case(&trimmed))
}

fn validate_phone(phone: &str) -> Result<()> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 10 {
        return Err(AppError::Validation(
            "Phone number must contain at least 10 digits.".to_string(),
        ));
    }
    Ok(())
}

fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut start_of_word = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if start_of_word {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            start_of_word = false;
        } else {
            out.push(c);
            start_of_word = true;
        }
    }
    out
}

// ============= Error Types =============

/// User-facing message shared by every 401 produced after login.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Could not validate credentials";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered: {0}")]
    EmailAlreadyExists(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token subject no longer exists: {0}")]
    UserNotFound(String),

    #[error("Access denied: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::TokenInvalid(_)
            | AppError::TokenExpired
            | AppError::UserNotFound(_) => StatusCode::UNAUTHORIZED,
            AppError::AccountDisabled | AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::EmailAlreadyExists(_) => "EMAIL_ALREADY_EXISTS",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::AccountDisabled => "ACCOUNT_DISABLED",
            AppError::MissingToken
            | AppError::TokenInvalid(_)
            | AppError::TokenExpired
            | AppError::UserNotFound(_) => "NOT_AUTHENTICATED",
            AppError::Authorization(_) => "INSUFFICIENT_PERMISSIONS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the caller. Internal detail never leaks here.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::EmailAlreadyExists(_) => {
                "An account with this email address already exists.".to_string()
            }
            AppError::InvalidCredentials => {
                "Invalid email or password. Please check your credentials and try again."
                    .to_string()
            }
            AppError::AccountDisabled => {
                "Your account has been disabled. Please contact support.".to_string()
            }
            AppError::MissingToken
            | AppError::TokenInvalid(_)
            | AppError::TokenExpired
            | AppError::UserNotFound(_) => NOT_AUTHENTICATED_MESSAGE.to_string(),
            AppError::Database(_) => {
                "Database connection error. Please try again later.".to_string()
            }
            AppError::Internal(_) => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Database(detail) => tracing::error!(detail = %detail, "storage failure"),
            AppError::Internal(detail) => tracing::error!(detail = %detail, "internal failure"),
            _ => {}
        }

        let body = axum::Json(serde_json::json!({
            "error": self.user_message(),
            "code": self.code(),
        }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
