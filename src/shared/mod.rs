//! Shared Module
//!
//! Types that cross the HTTP boundary: the persisted entities, the nested
//! course tree a client submits, shared errors, and configuration. Nothing
//! in here touches storage or the network.

/// Persisted entities
pub mod model;

/// Submitted course trees and quizzes
pub mod tree;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use model::{
    AccessType, Chapter, ContentItem, ContentKind, Course, CourseFields, Enrollment, Quiz, Unit,
    User,
};
pub use tree::{ChapterNode, CourseTreeRequest, NewQuiz, UnitNode};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
