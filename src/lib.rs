//! Coursetree - Course Platform Backend
//!
//! Users, courses, chapters, units, quizzes and enrollments stored as
//! separate collections that refer to each other by id. The core of the
//! crate keeps those references consistent when a course's nested content
//! tree is created, replaced, or deleted, without multi-document
//! transactions.
//!
//! # Module Structure
//!
//! - **`shared`** - serializable entities, submitted trees, shared errors,
//!   configuration
//! - **`backend`** - entity store, course engine, Axum server (only compiled
//!   with the `ssr` feature)
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend: Axum, sqlx, auth
//!
//! # Usage
//!
//! ```rust,no_run
//! use coursetree::backend::server::create_app;
//! use coursetree::shared::config::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::from_env()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
