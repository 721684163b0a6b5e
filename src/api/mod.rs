//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for NovaDom, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Authentication (`/api/v1/auth`)
//! - `POST /api/v1/auth/register/buyer` - Register a buyer
//! - `POST /api/v1/auth/register/developer` - Register a developer (pending review)
//! - `POST /api/v1/auth/login` - Login with a JSON body and receive a JWT
//! - `POST /api/v1/auth/token` - OAuth2 password grant (form body)
//! - `GET /api/v1/auth/me` - Profile of the caller
//! - `GET /api/v1/auth/profile/buyer` - Buyer profile
//! - `GET /api/v1/auth/profile/developer` - Developer profile
//!
//! ## Admin (`/api/v1/admin`)
//! - `GET /api/v1/admin/developers` - All developers with status counts
//! - `GET /api/v1/admin/developers/pending` - Developers awaiting review
//! - `GET /api/v1/admin/developers/{id}` - One developer
//! - `POST /api/v1/admin/developers/{id}/verify` - Approve
//! - `POST /api/v1/admin/developers/{id}/reject` - Reject, optional `{"reason": ...}`
//! - `POST /api/v1/admin/developers/{id}/reset` - Back to pending
//! - `GET|POST /api/v1/admin/admins` - List or create admins
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # Authentication
//!
//! Protected endpoints require a valid JWT token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::types::{
    BuyerProfileResponse, BuyerRegistrationRequest, DeveloperListResponse,
    DeveloperProfileResponse, DeveloperRegistrationRequest, DeveloperVerificationRequest,
    LoginRequest, PrincipalKind, ProfileResponse, TokenFormRequest, TokenResponse,
    VerificationStatus,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI description of every endpoint.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "NovaDom API",
        description = "Identity, authentication and developer verification for the NovaDom platform"
    ),
    paths(
        handlers::health::health_check,
        handlers::auth::register_buyer,
        handlers::auth::register_developer,
        handlers::auth::login,
        handlers::auth::token,
        handlers::auth::me,
        handlers::auth::buyer_profile,
        handlers::auth::developer_profile,
        handlers::admin::list_developers,
        handlers::admin::pending_developers,
        handlers::admin::get_developer,
        handlers::admin::verify_developer,
        handlers::admin::reject_developer,
        handlers::admin::reset_developer,
        handlers::admin::create_admin,
        handlers::admin::list_admins,
    ),
    components(schemas(
        BuyerRegistrationRequest,
        DeveloperRegistrationRequest,
        LoginRequest,
        TokenFormRequest,
        DeveloperVerificationRequest,
        TokenResponse,
        BuyerProfileResponse,
        DeveloperProfileResponse,
        ProfileResponse,
        DeveloperListResponse,
        PrincipalKind,
        VerificationStatus,
        handlers::health::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login and profiles"),
        (name = "admin", description = "Developer verification and admin accounts"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI at `/swagger-ui`, OpenAPI document at `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
pub fn swagger_ui_router<S>() -> axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_lists_endpoints() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(json.contains("NovaDom API"));
        assert!(json.contains("/api/v1/auth/register/buyer"));
        assert!(json.contains("/api/v1/admin/developers/{id}/verify"));
        assert!(json.contains("bearer_auth"));
    }
}
