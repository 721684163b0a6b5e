use crate::{
    auth::{guards::AdminOnly, middleware::Guarded},
    types::{
        AdminRegistrationRequest, BuyerProfileResponse, BuyerRegistrationRequest, DeveloperListResponse,
        DeveloperProfileResponse, DeveloperVerificationRequest, Result,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// All developers with per-status counts
#[utoipa::path(
    get,
    path = "/api/v1/admin/developers",
    responses(
        (status = 200, description = "Developers and counts", body = DeveloperListResponse),
        (status = 403, description = "Admin account required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_developers(
    Guarded(_admin): Guarded<AdminOnly>,
    State(state): State<AppState>,
) -> Result<Json<DeveloperListResponse>> {
    Ok(Json(state.verification().all_developers().await?))
}

/// Developers awaiting review
#[utoipa::path(
    get,
    path = "/api/v1/admin/developers/pending",
    responses(
        (status = 200, description = "Pending developers", body = Vec<DeveloperProfileResponse>),
        (status = 403, description = "Admin account required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn pending_developers(
    Guarded(_admin): Guarded<AdminOnly>,
    State(state): State<AppState>,
) -> Result<Json<Vec<DeveloperProfileResponse>>> {
    let developers = state.verification().pending_developers().await?;
    Ok(Json(developers.iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/developers/{id}",
    params(("id" = i64, Path, description = "Developer id")),
    responses(
        (status = 200, description = "Developer", body = DeveloperProfileResponse),
        (status = 404, description = "Developer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn get_developer(
    Guarded(_admin): Guarded<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeveloperProfileResponse>> {
    let developer = state.verification().developer_by_id(id).await?;
    Ok(Json((&developer).into()))
}

/// Approve a pending developer
#[utoipa::path(
    post,
    path = "/api/v1/admin/developers/{id}/verify",
    params(("id" = i64, Path, description = "Developer id")),
    responses(
        (status = 200, description = "Developer verified", body = DeveloperProfileResponse),
        (status = 404, description = "Developer not found"),
        (status = 409, description = "Developer is not pending")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn verify_developer(
    Guarded(admin): Guarded<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeveloperProfileResponse>> {
    let developer = state.verification().verify(id, &admin).await?;
    Ok(Json((&developer).into()))
}

/// Reject a pending developer, with an optional reason
#[utoipa::path(
    post,
    path = "/api/v1/admin/developers/{id}/reject",
    params(("id" = i64, Path, description = "Developer id")),
    request_body = DeveloperVerificationRequest,
    responses(
        (status = 200, description = "Developer rejected", body = DeveloperProfileResponse),
        (status = 404, description = "Developer not found"),
        (status = 409, description = "Developer is not pending")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn reject_developer(
    Guarded(admin): Guarded<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Option<Json<DeveloperVerificationRequest>>,
) -> Result<Json<DeveloperProfileResponse>> {
    let reason = payload.and_then(|Json(body)| body.reason);
    let developer = state
        .verification()
        .reject(id, &admin, reason.as_deref())
        .await?;
    Ok(Json((&developer).into()))
}

/// Return a developer to pending from any state
#[utoipa::path(
    post,
    path = "/api/v1/admin/developers/{id}/reset",
    params(("id" = i64, Path, description = "Developer id")),
    responses(
        (status = 200, description = "Developer reset to pending", body = DeveloperProfileResponse),
        (status = 404, description = "Developer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn reset_developer(
    Guarded(admin): Guarded<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeveloperProfileResponse>> {
    let developer = state.verification().reset(id, &admin).await?;
    Ok(Json((&developer).into()))
}

/// Create another admin account
#[utoipa::path(
    post,
    path = "/api/v1/admin/admins",
    request_body = BuyerRegistrationRequest,
    responses(
        (status = 201, description = "Admin created", body = BuyerProfileResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn create_admin(
    Guarded(admin): Guarded<AdminOnly>,
    State(state): State<AppState>,
    Json(mut payload): Json<AdminRegistrationRequest>,
) -> Result<(StatusCode, Json<BuyerProfileResponse>)> {
    payload.validate()?;

    let created = state
        .admin_accounts()
        .create_admin(
            &payload.email,
            &payload.password,
            &payload.first_name,
            &payload.last_name,
        )
        .await?;

    tracing::info!(admin_id = admin.id, created_id = created.id, "admin created via api");
    Ok((StatusCode::CREATED, Json((&created).into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/admins",
    responses(
        (status = 200, description = "Admin accounts", body = Vec<BuyerProfileResponse>),
        (status = 403, description = "Admin account required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_admins(
    Guarded(_admin): Guarded<AdminOnly>,
    State(state): State<AppState>,
) -> Result<Json<Vec<BuyerProfileResponse>>> {
    let admins = state.admin_accounts().list_admins().await?;
    Ok(Json(admins.iter().map(Into::into).collect()))
}
