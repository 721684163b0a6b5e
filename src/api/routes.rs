use crate::api::handlers::{admin, auth};
use crate::auth::middleware::auth_middleware;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

/// Routes mounted under `/api/v1`.
pub fn create_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        // Public routes (no auth required)
        .route("/auth/register/buyer", post(auth::register_buyer))
        .route("/auth/register/developer", post(auth::register_developer))
        .route("/auth/login", post(auth::login))
        .route("/auth/token", post(auth::token));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/profile/buyer", get(auth::buyer_profile))
        .route("/auth/profile/developer", get(auth::developer_profile))
        // Developer review
        .route("/admin/developers", get(admin::list_developers))
        .route("/admin/developers/pending", get(admin::pending_developers))
        .route("/admin/developers/{id}", get(admin::get_developer))
        .route("/admin/developers/{id}/verify", post(admin::verify_developer))
        .route("/admin/developers/{id}/reject", post(admin::reject_developer))
        .route("/admin/developers/{id}/reset", post(admin::reset_developer))
        // Admin accounts
        .route(
            "/admin/admins",
            get(admin::list_admins).post(admin::create_admin),
        )
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    public_routes.merge(protected_routes)
}
