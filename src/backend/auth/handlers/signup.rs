/**
 * Signup Handler
 *
 * POST /api/auth/signup
 *
 * # Registration Process
 *
 * 1. Validate name length, email format and password length
 * 2. Reject a taken name or email (409)
 * 3. Hash password using bcrypt at the configured cost
 * 4. Create user in the store
 * 5. Return a JWT token and the user info (201)
 */

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::hash;

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest, UserResponse};
use crate::backend::auth::sessions::create_token;
use crate::backend::error::{BackendError, BackendResult, ConflictKind};
use crate::backend::server::state::AppState;
use crate::shared::error::SharedError;
use crate::shared::model::User;

fn validate(request: &SignupRequest) -> Result<(), SharedError> {
    let name_len = request.name.trim().chars().count();
    if !(3..=30).contains(&name_len) {
        return Err(SharedError::validation("name", "Name must be 3-30 characters"));
    }
    if !request.email.contains('@') {
        return Err(SharedError::validation("email", "Invalid email format"));
    }
    if request.password.len() < 8 {
        return Err(SharedError::validation("password", "Password must be at least 8 characters"));
    }
    Ok(())
}

/// Register a new user and return a token for immediate use
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> BackendResult<(StatusCode, Json<AuthResponse>)> {
    tracing::info!("Signup request for name: {}, email: {}", request.name, request.email);
    validate(&request)?;

    let name = request.name.trim().to_string();
    if state.store.find_user_by_name(&name).await?.is_some() {
        return Err(BackendError::Conflict(ConflictKind::NameTaken));
    }
    if state.store.find_user_by_email(&request.email).await?.is_some() {
        return Err(BackendError::Conflict(ConflictKind::EmailRegistered));
    }

    let password_hash = hash(&request.password, state.config.bcrypt_cost).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;

    let user = state
        .store
        .insert_user(User::new(name, request.email.clone(), password_hash))
        .await?;

    let token = create_token(user.id, user.email.clone(), &state.config.jwt_secret).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;

    tracing::info!("User created successfully: {} ({})", user.name, user.email);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_validation() {
        assert!(validate(&request("ada", "ada@example.com", "password123")).is_ok());
        assert!(validate(&request("ab", "ada@example.com", "password123")).is_err());
        assert!(validate(&request("ada", "invalid-email", "password123")).is_err());
        assert!(validate(&request("ada", "ada@example.com", "short")).is_err());
    }
}
