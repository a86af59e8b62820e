/**
 * Get Current User Handler
 *
 * GET /api/auth/me
 *
 * Requires a valid bearer token; the principal comes from the `AuthUser`
 * extractor.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::store::SharedStore;

pub async fn get_me(
    State(store): State<SharedStore>,
    AuthUser(principal): AuthUser,
) -> BackendResult<Json<UserResponse>> {
    let user = store
        .find_user(principal.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User", principal.user_id))?;
    Ok(Json(UserResponse::from(&user)))
}
