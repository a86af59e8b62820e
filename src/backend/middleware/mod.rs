//! Middleware Module
//!
//! Request processing middleware.
//!
//! - **`auth`** - Bearer token verification and the `AuthUser` extractor

/// Authentication middleware
pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
