/**
 * Cascade Deleter
 *
 * Removes a course with everything that references it:
 *
 * 1. collect the course's chapter ids
 * 2. delete the quizzes and units under those chapters
 * 3. delete the chapters
 * 4. delete the course's enrollment rows
 * 5. drop the course from the author's `created_courses`
 * 6. drop the course's enrollments from every enrolled user's view
 * 7. delete the course row
 *
 * The course row goes last. Until then the course still exists, its author
 * still passes the ownership check, and repeating the delete resumes the
 * work. Once it is gone, another delete reports `AlreadyDeleted`.
 */

use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::backend::courses::backrefs::{detach, BackRef};
use crate::backend::courses::ownership::check_author;
use crate::backend::error::BackendResult;
use crate::backend::store::{EntityStore, StoreResult};

/// Rows removed by a delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub chapters: u64,
    pub units: u64,
    pub quizzes: u64,
    pub enrollments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(DeleteSummary),
    /// Nothing to do; the course row no longer exists
    AlreadyDeleted,
}

/// Delete `course_id` on behalf of `principal`
pub async fn delete_course(
    store: &dyn EntityStore,
    course_id: Uuid,
    principal: Uuid,
) -> BackendResult<DeleteOutcome> {
    let Some(course) = store.find_course(course_id).await? else {
        tracing::info!(course_id = %course_id, "Course already deleted");
        return Ok(DeleteOutcome::AlreadyDeleted);
    };
    check_author(&course, principal)?;

    let mut summary = DeleteSummary::default();

    // 1. collect chapter ids
    let chapter_ids: Vec<Uuid> = store
        .find_chapters_by_course(course_id)
        .await?
        .iter()
        .map(|chapter| chapter.id)
        .collect();
    tracing::debug!(course_id = %course_id, chapters = chapter_ids.len(), "Collected chapters");

    // 2. quizzes and units
    if !chapter_ids.is_empty() {
        let mut unit_ids = Vec::new();
        for chapter_id in &chapter_ids {
            unit_ids.extend(store.find_units_by_chapter(*chapter_id).await?.iter().map(|unit| unit.id));
        }
        if !unit_ids.is_empty() {
            summary.quizzes = store.delete_quizzes_by_units(&unit_ids).await?;
        }
        summary.units = store.delete_units_by_chapters(&chapter_ids).await?;
        tracing::debug!(course_id = %course_id, units = summary.units, "Deleted units");
    }

    // 3. chapters
    summary.chapters = store.delete_chapters_by_course(course_id).await?;
    tracing::debug!(course_id = %course_id, chapters = summary.chapters, "Deleted chapters");

    // Users with a row but missing from the course's list still need step 6
    let mut enrolled: BTreeSet<Uuid> = course.enrolled_users.iter().copied().collect();
    enrolled.extend(
        store
            .find_enrollments_by_course(course_id)
            .await?
            .iter()
            .map(|enrollment| enrollment.user_id),
    );

    // 4. enrollment rows
    summary.enrollments = store.delete_enrollments_by_course(course_id).await?;
    tracing::debug!(course_id = %course_id, enrollments = summary.enrollments, "Deleted enrollments");

    // 5. author's created_courses
    detach(store, BackRef::UserCreatedCourses, course.author, course_id).await?;

    // 6. enrolled users' views
    for user_id in &enrolled {
        prune_enrolled_view(store, *user_id, course_id).await?;
    }

    // 7. course row
    store.delete_course(course_id).await?;
    tracing::info!(course_id = %course_id, summary = ?summary, "Deleted course");
    Ok(DeleteOutcome::Deleted(summary))
}

/// Drop enrollment ids from the user's view whose row is gone or belongs to `course_id`
///
/// Step 4 has already removed the rows, so "gone" covers this course's
/// enrollments on every attempt, including a retry.
async fn prune_enrolled_view(store: &dyn EntityStore, user_id: Uuid, course_id: Uuid) -> StoreResult<()> {
    let Some(user) = store.find_user(user_id).await? else {
        tracing::warn!(user_id = %user_id, "Enrolled user no longer exists");
        return Ok(());
    };
    for enrollment_id in &user.enrolled_courses {
        let stale = match store.find_enrollment(*enrollment_id).await? {
            Some(enrollment) => enrollment.course_id == course_id,
            None => true,
        };
        if stale {
            detach(store, BackRef::UserEnrolledCourses, user_id, *enrollment_id).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::error::BackendError;
    use crate::backend::store::MemoryStore;
    use crate::shared::model::{AccessType, Course, CourseFields, User};
    use assert_matches::assert_matches;

    async fn course(store: &MemoryStore, author: Uuid) -> Course {
        let fields = CourseFields {
            title: "Rust".into(),
            description: String::new(),
            access_type: AccessType::Public,
            access_key: None,
        };
        store.insert_course(Course::new(author, fields)).await.unwrap()
    }

    #[tokio::test]
    async fn test_missing_course_is_already_deleted() {
        let store = MemoryStore::new();
        assert_eq!(
            delete_course(&store, Uuid::new_v4(), Uuid::new_v4()).await.unwrap(),
            DeleteOutcome::AlreadyDeleted
        );
    }

    #[tokio::test]
    async fn test_non_author_cannot_delete() {
        let store = MemoryStore::new();
        let course = course(&store, Uuid::new_v4()).await;
        assert_matches!(
            delete_course(&store, course.id, Uuid::new_v4()).await,
            Err(BackendError::Forbidden { .. })
        );
        assert!(store.find_course(course.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_prune_keeps_other_courses_enrollments() {
        let store = MemoryStore::new();
        let user = store.insert_user(User::new("u".into(), "u@example.com".into(), String::new())).await.unwrap();
        let other = crate::shared::model::Enrollment::new(user.id, Uuid::new_v4());
        let other = store.insert_enrollment(other).await.unwrap();
        let dangling = Uuid::new_v4();
        store.push_enrolled_course(user.id, other.id).await.unwrap();
        store.push_enrolled_course(user.id, dangling).await.unwrap();

        prune_enrolled_view(&store, user.id, Uuid::new_v4()).await.unwrap();

        let user = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(user.enrolled_courses, vec![other.id]);
    }
}
