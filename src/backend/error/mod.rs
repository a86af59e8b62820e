//! Backend Error Module
//!
//! Error types for the course engine and HTTP handlers. Every variant maps to
//! an HTTP status and a JSON body, so handlers return `Result<_, BackendError>`.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::{BackendError, ConflictKind};

/// Result alias used throughout the backend
pub type BackendResult<T> = Result<T, BackendError>;
