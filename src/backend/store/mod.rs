//! Entity Store
//!
//! Typed persistence for the course platform's collections. Each entity kind
//! gets its own method group: find, insert, update, delete, and set-membership
//! updates on its reference arrays. Every component of the course engine
//! depends on this trait only, never on a concrete connection.
//!
//! # Guarantees
//!
//! - `push_*` has set semantics: pushing an id that is already present is a
//!   no-op.
//! - `pull_*` of an absent id and deletes of absent rows are no-ops, never
//!   errors. Delete methods report how many rows they removed.
//! - Single calls are atomic; sequences of calls are not. There is no
//!   multi-document transaction, so callers order their writes so that a
//!   retry from the top converges.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - in-process collections, used without a database and in tests
//! - [`PgStore`] - PostgreSQL via sqlx

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::model::{Chapter, ContentItem, Course, CourseFields, Enrollment, Quiz, Unit, User};

/// Store handle shared across request handlers
pub type SharedStore = Arc<dyn EntityStore>;

/// Result alias for store calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse store operation names, used for failure injection and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    InsertUser,
    InsertCourse,
    InsertChapter,
    InsertUnit,
    InsertQuiz,
    InsertEnrollment,
    /// Any `push_*` on a reference array
    PushReference,
    /// Any `pull_*` on a reference array
    PullReference,
    /// Any `set_*` that rewrites a reference array wholesale
    SetReference,
    UpdateCourse,
    UpdateChapter,
    UpdateUnit,
    UpdateEnrollment,
    DeleteCourse,
    DeleteChapters,
    DeleteUnits,
    DeleteQuizzes,
    DeleteEnrollments,
}

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or failed a query
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failure planted by [`MemoryStore::fail_next`]
    #[error("injected failure at {0:?}")]
    Injected(StoreOp),

    /// A stored row could not be decoded
    #[error("corrupt row: {message}")]
    Corrupt { message: String },
}

impl StoreError {
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

/// Persistence interface driven by the course engine
#[async_trait]
pub trait EntityStore: Send + Sync {
    // Users

    async fn insert_user(&self, user: User) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>>;
    /// Case-insensitive substring match on the user name
    async fn search_users(&self, term: &str) -> StoreResult<Vec<User>>;
    async fn push_created_course(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<()>;
    async fn pull_created_course(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<()>;
    async fn push_enrolled_course(&self, user_id: Uuid, enrollment_id: Uuid) -> StoreResult<()>;
    async fn pull_enrolled_course(&self, user_id: Uuid, enrollment_id: Uuid) -> StoreResult<()>;

    // Courses

    async fn insert_course(&self, course: Course) -> StoreResult<Course>;
    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>>;
    /// Courses in creation order
    async fn list_courses(&self, skip: u64, limit: u64) -> StoreResult<Vec<Course>>;
    async fn count_courses(&self) -> StoreResult<u64>;
    /// Case-insensitive substring match on the course title
    async fn search_courses(&self, term: &str) -> StoreResult<Vec<Course>>;
    async fn update_course_fields(&self, id: Uuid, fields: &CourseFields) -> StoreResult<()>;
    async fn push_course_chapter(&self, course_id: Uuid, chapter_id: Uuid) -> StoreResult<()>;
    async fn pull_course_chapter(&self, course_id: Uuid, chapter_id: Uuid) -> StoreResult<()>;
    /// Replace the course's chapter array with `chapter_ids`, keeping their order
    async fn set_course_chapters(&self, course_id: Uuid, chapter_ids: &[Uuid]) -> StoreResult<()>;
    async fn push_enrolled_user(&self, course_id: Uuid, user_id: Uuid) -> StoreResult<()>;
    async fn pull_enrolled_user(&self, course_id: Uuid, user_id: Uuid) -> StoreResult<()>;
    async fn delete_course(&self, id: Uuid) -> StoreResult<u64>;

    // Chapters

    async fn insert_chapter(&self, chapter: Chapter) -> StoreResult<Chapter>;
    async fn find_chapter(&self, id: Uuid) -> StoreResult<Option<Chapter>>;
    /// Every chapter whose `course_id` matches, referenced or not
    async fn find_chapters_by_course(&self, course_id: Uuid) -> StoreResult<Vec<Chapter>>;
    async fn update_chapter_title(&self, id: Uuid, title: &str) -> StoreResult<()>;
    async fn push_chapter_unit(&self, chapter_id: Uuid, unit_id: Uuid) -> StoreResult<()>;
    async fn pull_chapter_unit(&self, chapter_id: Uuid, unit_id: Uuid) -> StoreResult<()>;
    async fn set_chapter_units(&self, chapter_id: Uuid, unit_ids: &[Uuid]) -> StoreResult<()>;
    async fn delete_chapter(&self, id: Uuid) -> StoreResult<u64>;
    async fn delete_chapters_by_course(&self, course_id: Uuid) -> StoreResult<u64>;

    // Units

    async fn insert_unit(&self, unit: Unit) -> StoreResult<Unit>;
    async fn find_unit(&self, id: Uuid) -> StoreResult<Option<Unit>>;
    /// Every unit whose `chapter_id` matches, referenced or not
    async fn find_units_by_chapter(&self, chapter_id: Uuid) -> StoreResult<Vec<Unit>>;
    async fn update_unit(
        &self,
        id: Uuid,
        title: &str,
        order: i32,
        contents: &[ContentItem],
    ) -> StoreResult<()>;
    async fn delete_unit(&self, id: Uuid) -> StoreResult<u64>;
    async fn delete_units_by_chapters(&self, chapter_ids: &[Uuid]) -> StoreResult<u64>;

    // Quizzes

    async fn insert_quiz(&self, quiz: Quiz) -> StoreResult<Quiz>;
    async fn find_quizzes_by_unit(&self, unit_id: Uuid) -> StoreResult<Vec<Quiz>>;
    async fn delete_quizzes_by_units(&self, unit_ids: &[Uuid]) -> StoreResult<u64>;

    // Enrollments

    async fn insert_enrollment(&self, enrollment: Enrollment) -> StoreResult<Enrollment>;
    async fn find_enrollment(&self, id: Uuid) -> StoreResult<Option<Enrollment>>;
    /// All rows for the pair; more than one means an earlier duplicate
    async fn find_enrollments_for(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Vec<Enrollment>>;
    async fn find_enrollments_by_course(&self, course_id: Uuid) -> StoreResult<Vec<Enrollment>>;
    async fn push_completed_unit(&self, enrollment_id: Uuid, unit_id: Uuid) -> StoreResult<()>;
    async fn update_progress(&self, enrollment_id: Uuid, progress: i32) -> StoreResult<()>;
    async fn delete_enrollments_for(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<u64>;
    async fn delete_enrollments_by_course(&self, course_id: Uuid) -> StoreResult<u64>;
}
