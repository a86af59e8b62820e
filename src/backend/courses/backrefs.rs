//! Back-Reference Maintainer
//!
//! Parents list their children's ids in arrays that are written separately
//! from the child row. The protocol is always: insert the child, then
//! [`attach`] it. If the attach fails the child exists but is unreferenced;
//! nothing is rolled back, and re-running the operation re-attaches it
//! (pushes have set semantics).

use uuid::Uuid;

use crate::backend::store::{EntityStore, StoreResult};

/// A parent reference array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackRef {
    /// `Course::chapters`
    CourseChapters,
    /// `Chapter::units`
    ChapterUnits,
    /// `User::created_courses`
    UserCreatedCourses,
    /// `User::enrolled_courses`, holding enrollment ids
    UserEnrolledCourses,
    /// `Course::enrolled_users`
    CourseEnrolledUsers,
}

impl BackRef {
    pub fn name(&self) -> &'static str {
        match self {
            BackRef::CourseChapters => "course.chapters",
            BackRef::ChapterUnits => "chapter.units",
            BackRef::UserCreatedCourses => "user.created_courses",
            BackRef::UserEnrolledCourses => "user.enrolled_courses",
            BackRef::CourseEnrolledUsers => "course.enrolled_users",
        }
    }
}

/// Add `child` to the parent's array; a no-op if already present
pub async fn attach(store: &dyn EntityStore, backref: BackRef, parent: Uuid, child: Uuid) -> StoreResult<()> {
    let result = match backref {
        BackRef::CourseChapters => store.push_course_chapter(parent, child).await,
        BackRef::ChapterUnits => store.push_chapter_unit(parent, child).await,
        BackRef::UserCreatedCourses => store.push_created_course(parent, child).await,
        BackRef::UserEnrolledCourses => store.push_enrolled_course(parent, child).await,
        BackRef::CourseEnrolledUsers => store.push_enrolled_user(parent, child).await,
    };
    if let Err(e) = &result {
        tracing::error!(
            backref = backref.name(),
            parent = %parent,
            child = %child,
            error = %e,
            "Attach failed; child stays unreferenced until the operation is retried"
        );
    }
    result
}

/// Remove `child` from the parent's array; a no-op if absent
pub async fn detach(store: &dyn EntityStore, backref: BackRef, parent: Uuid, child: Uuid) -> StoreResult<()> {
    let result = match backref {
        BackRef::CourseChapters => store.pull_course_chapter(parent, child).await,
        BackRef::ChapterUnits => store.pull_chapter_unit(parent, child).await,
        BackRef::UserCreatedCourses => store.pull_created_course(parent, child).await,
        BackRef::UserEnrolledCourses => store.pull_enrolled_course(parent, child).await,
        BackRef::CourseEnrolledUsers => store.pull_enrolled_user(parent, child).await,
    };
    if let Err(e) = &result {
        tracing::error!(
            backref = backref.name(),
            parent = %parent,
            child = %child,
            error = %e,
            "Detach failed"
        );
    }
    result
}
