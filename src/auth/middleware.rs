use crate::auth::guards::{Authenticated, Guard};
use crate::types::{AppError, Principal};
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

/// Resolves the bearer token once per request and stores the [`Principal`]
/// in the request extensions.
///
/// Mount it on protected routes only; a request without a token is refused.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers().get(header::AUTHORIZATION))?;

    let principal = state.auth_service().resolve_principal(token).await?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn bearer_token(value: Option<&header::HeaderValue>) -> Result<&str, AppError> {
    let value = value
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::TokenInvalid("authorization header is not ascii".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AppError::TokenInvalid("malformed authorization header".to_string()))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::TokenInvalid(format!(
            "unsupported authorization scheme: {}",
            scheme
        )));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::MissingToken);
    }
    Ok(token)
}

/// Extractor that applies guard `G` to the request's principal.
///
/// ```ignore
/// async fn verify(Guarded(admin): Guarded<AdminOnly>) -> Result<Json<...>> {
///     // admin is a Buyer with the admin role
/// }
/// ```
pub struct Guarded<G: Guard>(pub G::Output);

/// The caller, whoever they are.
pub type CurrentPrincipal = Guarded<Authenticated>;

impl<S, G> FromRequestParts<S> for Guarded<G>
where
    S: Send + Sync,
    G: Guard,
    G::Output: Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::MissingToken)?;

        G::check(principal).map(Guarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let value = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(bearer_token(Some(&value)).unwrap(), "abc.def.ghi");

        let value = HeaderValue::from_static("bearer abc.def.ghi");
        assert_eq!(bearer_token(Some(&value)).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_failures() {
        assert!(matches!(bearer_token(None), Err(AppError::MissingToken)));

        let basic = HeaderValue::from_static("Basic dXNlcjpwYXNz");
        assert!(matches!(
            bearer_token(Some(&basic)),
            Err(AppError::TokenInvalid(_))
        ));

        let bare = HeaderValue::from_static("abc.def.ghi");
        assert!(matches!(
            bearer_token(Some(&bare)),
            Err(AppError::TokenInvalid(_))
        ));
    }
}
