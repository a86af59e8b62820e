//! Enrollment Lifecycle
//!
//! An enrollment is visible in three places: `Course::enrolled_users`, the
//! enrollment row, and `User::enrolled_courses`. Enroll writes them in that
//! order and cancel removes them in reverse, so the course list is the
//! guard both operations check and the last thing cancel removes.
//!
//! A course that lists a user without a matching row is the trace of an
//! interrupted enroll. Enrolling again completes the missing writes instead
//! of reporting a conflict.

use uuid::Uuid;

use crate::backend::courses::backrefs::{attach, detach, BackRef};
use crate::backend::error::{BackendError, BackendResult, ConflictKind};
use crate::backend::store::EntityStore;
use crate::shared::model::{Course, Enrollment};

/// Enroll `user_id` in `course_id`
pub async fn enroll(store: &dyn EntityStore, course_id: Uuid, user_id: Uuid) -> BackendResult<Enrollment> {
    let course = find_course(store, course_id).await?;
    if store.find_user(user_id).await?.is_none() {
        return Err(BackendError::not_found("User", user_id));
    }
    let existing = store.find_enrollments_for(user_id, course_id).await?.into_iter().next();

    if course.enrolled_users.contains(&user_id) {
        if let Some(row) = existing {
            attach(store, BackRef::UserEnrolledCourses, user_id, row.id).await?;
            return Err(BackendError::Conflict(ConflictKind::AlreadyEnrolled));
        }
        tracing::warn!(course_id = %course_id, user_id = %user_id, "Completing interrupted enrollment");
    } else {
        attach(store, BackRef::CourseEnrolledUsers, course_id, user_id).await?;
    }

    let row = match existing {
        Some(row) => row,
        None => store.insert_enrollment(Enrollment::new(user_id, course_id)).await?,
    };
    attach(store, BackRef::UserEnrolledCourses, user_id, row.id).await?;

    tracing::info!(course_id = %course_id, user_id = %user_id, enrollment_id = %row.id, "Enrolled");
    Ok(row)
}

/// Undo an enrollment; returns how many rows were removed
///
/// Only rows for this (user, course) pair are touched.
pub async fn cancel(store: &dyn EntityStore, course_id: Uuid, user_id: Uuid) -> BackendResult<u64> {
    let course = find_course(store, course_id).await?;
    if !course.enrolled_users.contains(&user_id) {
        return Err(BackendError::Conflict(ConflictKind::NotEnrolled));
    }

    let rows = store.find_enrollments_for(user_id, course_id).await?;
    for row in &rows {
        detach(store, BackRef::UserEnrolledCourses, user_id, row.id).await?;
    }
    let removed = store.delete_enrollments_for(user_id, course_id).await?;
    detach(store, BackRef::CourseEnrolledUsers, course_id, user_id).await?;

    tracing::info!(course_id = %course_id, user_id = %user_id, removed, "Cancelled enrollment");
    Ok(removed)
}

/// Mark a unit complete and recompute progress
pub async fn complete_unit(
    store: &dyn EntityStore,
    course_id: Uuid,
    user_id: Uuid,
    unit_id: Uuid,
) -> BackendResult<Enrollment> {
    let course = find_course(store, course_id).await?;
    let enrollment = store
        .find_enrollments_for(user_id, course.id)
        .await?
        .into_iter()
        .next()
        .ok_or(BackendError::Conflict(ConflictKind::NotEnrolled))?;

    let course_units = unit_ids_of(store, course.id).await?;
    if !course_units.contains(&unit_id) {
        return Err(BackendError::not_found("Unit", unit_id));
    }

    store.push_completed_unit(enrollment.id, unit_id).await?;

    let mut completed = enrollment.completed_units.clone();
    if !completed.contains(&unit_id) {
        completed.push(unit_id);
    }
    let done = completed.iter().filter(|id| course_units.contains(id)).count();
    let progress = progress_percent(done, course_units.len());
    store.update_progress(enrollment.id, progress).await?;

    tracing::debug!(enrollment_id = %enrollment.id, unit_id = %unit_id, progress, "Completed unit");
    Ok(store.find_enrollment(enrollment.id).await?.unwrap_or(Enrollment {
        progress,
        completed_units: completed,
        ..enrollment
    }))
}

async fn find_course(store: &dyn EntityStore, course_id: Uuid) -> BackendResult<Course> {
    store
        .find_course(course_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Course", course_id))
}

/// Every unit stored under the course's chapters
async fn unit_ids_of(store: &dyn EntityStore, course_id: Uuid) -> BackendResult<Vec<Uuid>> {
    let mut ids = Vec::new();
    for chapter in store.find_chapters_by_course(course_id).await? {
        ids.extend(store.find_units_by_chapter(chapter.id).await?.iter().map(|unit| unit.id));
    }
    Ok(ids)
}

fn progress_percent(done: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let percent = (done as f64 * 100.0 / total as f64).round();
    percent.clamp(0.0, 100.0) as i32
}
