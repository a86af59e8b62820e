//! Backend Module
//!
//! Server-side code for the course platform: the entity store, the course
//! engine that keeps content trees and back-references consistent, and the
//! Axum HTTP layer around them.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`store`** - `EntityStore` trait with PostgreSQL and in-memory implementations
//! - **`courses`** - tree reconciliation, cascade delete, enrollment, quizzes
//! - **`catalog`** - course listing, search, user profiles
//! - **`auth`** - signup, login, JWT tokens
//! - **`middleware`** - bearer token verification
//! - **`server`** - application state and initialization
//! - **`routes`** - route table and router assembly
//! - **`error`** - backend error types and HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── store/          - Entity store
//! ├── courses/        - Course engine and handlers
//! ├── catalog/        - Read-only browsing
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! ├── server/         - State and initialization
//! ├── routes/         - Route configuration
//! └── error/          - Error types
//! ```
//!
//! # Consistency Without Transactions
//!
//! Every entity lives in its own collection and parents keep arrays of child
//! ids. No operation spans a transaction. Multi-step operations in `courses`
//! are ordered sequences of idempotent store calls, so after a failure the
//! client repeats the request and the state converges; readers skip
//! references that do not resolve.

/// Entity store
pub mod store;

/// Course engine
pub mod courses;

/// Course listing, search, user profiles
pub mod catalog;

/// Authentication and user registration
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

pub use error::{BackendError, BackendResult};
pub use server::{create_app, create_app_with_store};
pub use store::{EntityStore, MemoryStore, PgStore, SharedStore};
