use crate::{
    auth::{
        guards::{AnyDeveloper, BuyerOnly},
        jwt::IssuedToken,
        middleware::{CurrentPrincipal, Guarded},
    },
    types::{
        BuyerProfileResponse, BuyerRegistrationRequest, DeveloperProfileResponse,
        DeveloperRegistrationRequest, LoginRequest, Principal, ProfileResponse, Result,
        TokenFormRequest, TokenResponse,
    },
    AppState,
};
use axum::{extract::State, http::StatusCode, Form, Json};

fn token_response(principal: &Principal, issued: IssuedToken) -> TokenResponse {
    TokenResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
        user_type: principal.kind(),
    }
}

/// Register a new buyer
#[utoipa::path(
    post,
    path = "/api/v1/auth/register/buyer",
    request_body = BuyerRegistrationRequest,
    responses(
        (status = 201, description = "Buyer registered successfully", body = BuyerProfileResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_buyer(
    State(state): State<AppState>,
    Json(mut payload): Json<BuyerRegistrationRequest>,
) -> Result<(StatusCode, Json<BuyerProfileResponse>)> {
    payload.validate()?;

    let buyer = state
        .auth_service()
        .register_buyer(
            &payload.email,
            &payload.password,
            &payload.first_name,
            &payload.last_name,
        )
        .await?;

    Ok((StatusCode::CREATED, Json((&buyer).into())))
}

/// Register a new developer, pending admin verification
#[utoipa::path(
    post,
    path = "/api/v1/auth/register/developer",
    request_body = DeveloperRegistrationRequest,
    responses(
        (status = 201, description = "Developer registered, awaiting verification", body = DeveloperProfileResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_developer(
    State(state): State<AppState>,
    Json(mut payload): Json<DeveloperRegistrationRequest>,
) -> Result<(StatusCode, Json<DeveloperProfileResponse>)> {
    payload.validate()?;

    let developer = state.auth_service().register_developer(payload).await?;

    Ok((StatusCode::CREATED, Json((&developer).into())))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let (principal, issued) = state
        .auth_service()
        .authenticate(&payload.email, &payload.password)
        .await?;

    Ok(Json(token_response(&principal, issued)))
}

/// OAuth2 password grant; `username` carries the email
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body(content = TokenFormRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenFormRequest>,
) -> Result<Json<TokenResponse>> {
    let (principal, issued) = state
        .auth_service()
        .authenticate(&form.username, &form.password)
        .await?;

    Ok(Json(token_response(&principal, issued)))
}

/// Profile of the calling principal
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(Guarded(principal): CurrentPrincipal) -> Json<ProfileResponse> {
    Json((&principal).into())
}

/// Buyer profile; buyers and admins only
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile/buyer",
    responses(
        (status = 200, description = "Buyer profile", body = BuyerProfileResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Buyer account required")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn buyer_profile(Guarded(buyer): Guarded<BuyerOnly>) -> Json<BuyerProfileResponse> {
    Json((&buyer).into())
}

/// Developer profile, including verification status
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile/developer",
    responses(
        (status = 200, description = "Developer profile", body = DeveloperProfileResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Developer account required")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn developer_profile(
    Guarded(developer): Guarded<AnyDeveloper>,
) -> Json<DeveloperProfileResponse> {
    Json((&developer).into())
}
