//! Course Engine
//!
//! Keeps the course content tree and its denormalized back-references
//! consistent without multi-document transactions.
//!
//! # Architecture
//!
//! - **`backrefs`** - attach/detach child ids on parent reference arrays
//! - **`ownership`** - author checks
//! - **`reconcile`** - create and update a course from a submitted tree
//! - **`cascade`** - delete a course and everything that references it
//! - **`enrollment`** - enroll, cancel, and unit completion
//! - **`quiz`** - quizzes attached to units
//! - **`read`** - course tree assembly that skips dangling references
//! - **`handlers`** - HTTP handlers for the operations above
//!
//! # Failure Model
//!
//! Every operation is a sequence of single-row store calls. A failure midway
//! leaves earlier writes in place. Steps are ordered and individually
//! idempotent so that repeating the request from the top converges on the
//! intended state, and readers in `read` tolerate the intermediate states.

pub mod backrefs;
pub mod cascade;
pub mod enrollment;
pub mod handlers;
pub mod ownership;
pub mod quiz;
pub mod read;
pub mod reconcile;

pub use backrefs::{attach, detach, BackRef};
pub use cascade::{delete_course, DeleteOutcome};
pub use enrollment::{cancel, complete_unit, enroll};
pub use ownership::ensure_owner;
pub use quiz::{add_quiz, list_quizzes};
pub use read::{load_course_tree, ChapterTree, CourseTree, UnitTree};
pub use reconcile::{create_course, update_course, ReconcileReport, ResolvedChapter};
