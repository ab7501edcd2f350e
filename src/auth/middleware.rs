use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::constants::ERR_ACCESS_DENIED;
use crate::error::AppError;
use crate::AppState;

/// Authenticated user extracted from a validated bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

/// Middleware validating the `Authorization: Bearer <token>` header
///
/// On success an [`AuthUser`] is inserted into request extensions for
/// handlers to extract. All failures map to 401 without detail.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            return AppError::Authentication(ERR_ACCESS_DENIED.to_string()).into_response();
        }
    };

    let claims = match crate::auth::decode_token(token, &state.config.jwt_secret) {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        username: claims.username,
    });

    next.run(request).await
}

// Extracted from request parts rather than Extension so handlers can combine
// it with Multipart.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Authentication(ERR_ACCESS_DENIED.to_string()))
    }
}
