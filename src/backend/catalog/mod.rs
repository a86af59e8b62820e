//! Catalog Module
//!
//! Read-only browsing: course listing, search, and user profiles.
//!
//! # Module Structure
//!
//! ```text
//! catalog/
//! ├── mod.rs       - Module exports
//! ├── queries.rs   - Store-level read operations
//! └── handlers.rs  - HTTP handlers
//! ```

/// Store-level read operations
pub mod queries;

/// HTTP handlers
pub mod handlers;

pub use queries::{list_courses, load_user_profile, search, CoursePage, PageQuery, SearchResults, UserProfile};
