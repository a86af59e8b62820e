//! Ownership checks
//!
//! A course may only be changed by its author. Missing courses are reported
//! as `NotFound` before authorship is considered.

use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::EntityStore;
use crate::shared::model::Course;

/// Load the course and confirm `principal` authored it
pub async fn ensure_owner(store: &dyn EntityStore, course_id: Uuid, principal: Uuid) -> BackendResult<Course> {
    let course = store
        .find_course(course_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Course", course_id))?;
    check_author(&course, principal)?;
    Ok(course)
}

pub fn check_author(course: &Course, principal: Uuid) -> BackendResult<()> {
    if course.author != principal {
        tracing::warn!(course_id = %course.id, principal = %principal, "Rejected non-author");
        return Err(BackendError::forbidden("Only the course author can modify this course"));
    }
    Ok(())
}
