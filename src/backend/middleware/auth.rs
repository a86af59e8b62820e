/**
 * Authentication Middleware
 *
 * Verifies bearer tokens and hands the principal to handlers.
 *
 * # Authentication Flow
 *
 * 1. Read the `Authorization: Bearer <token>` header
 * 2. Verify the JWT signature and expiry
 * 3. Confirm the user still exists
 * 4. Insert `AuthenticatedUser` into the request extensions
 *
 * Every failure answers 401. Route groups that are entirely protected use
 * [`auth_middleware`]; handlers on paths that mix public and protected
 * methods take the [`AuthUser`] extractor, which authenticates on its own
 * when the middleware did not run.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Principal attached to authenticated requests
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Resolve the principal from request headers
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser, BackendError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            BackendError::unauthorized("Access denied")
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        BackendError::unauthorized("Access denied")
    })?;

    let claims = verify_token(token, &state.config.jwt_secret).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        BackendError::unauthorized("Invalid token")
    })?;

    let user_id = claims.user_id().map_err(|e| {
        tracing::warn!("Invalid user ID in token: {:?}", e);
        BackendError::unauthorized("Invalid token")
    })?;

    if state.store.find_user(user_id).await?.is_none() {
        tracing::warn!("Token for unknown user {}", user_id);
        return Err(BackendError::unauthorized("Invalid token"));
    }

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
    })
}

/// Reject unauthenticated requests and attach the principal
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let user = authenticate(&app_state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extractor for the authenticated principal
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(AuthUser(user.clone()));
        }
        let user = authenticate(state, &parts.headers).await?;
        parts.extensions.insert(user.clone());
        Ok(AuthUser(user))
    }
}
