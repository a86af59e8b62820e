/**
 * Course Handlers
 *
 * HTTP handlers over the course engine. Each handler extracts the principal
 * and path ids, calls one engine operation, and shapes the JSON response.
 *
 * # Endpoints
 *
 * - `GET /api/courses/{id}` - course tree
 * - `POST /api/courses/create` - create from a tree (201)
 * - `PUT /api/courses/{id}` - reconcile a tree (author only)
 * - `DELETE /api/courses/{id}` - cascade delete (author only)
 * - `POST /api/courses/{id}/enroll` - enroll (201)
 * - `DELETE /api/courses/{id}/enroll` - cancel enrollment
 * - `POST /api/courses/{id}/units/{unit_id}/complete` - record progress
 * - `POST /api/units/{unit_id}/quizzes` - add quiz (author only, 201)
 * - `GET /api/units/{unit_id}/quizzes` - list quizzes
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::backend::courses::{cascade, enrollment, quiz, read, reconcile};
use crate::backend::courses::cascade::{DeleteOutcome, DeleteSummary};
use crate::backend::courses::read::CourseTree;
use crate::backend::courses::reconcile::ReconcileReport;
use crate::backend::error::BackendResult;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::store::SharedStore;
use crate::shared::model::{Enrollment, Quiz};
use crate::shared::tree::{CourseTreeRequest, NewQuiz};

#[derive(Debug, Serialize)]
pub struct CreatedCourse {
    pub message: &'static str,
    pub course: CourseTree,
    pub report: ReconcileReport,
}

#[derive(Debug, Serialize)]
pub struct UpdatedCourse {
    pub message: &'static str,
    pub course_id: Uuid,
    pub report: ReconcileReport,
}

#[derive(Debug, Serialize)]
pub struct DeletedCourse {
    pub message: &'static str,
    pub course_id: Uuid,
    /// Absent when the course was already gone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DeleteSummary>,
}

#[derive(Debug, Serialize)]
pub struct CancelledEnrollment {
    pub message: &'static str,
    pub course_id: Uuid,
    pub removed: u64,
}

pub async fn get_course(State(store): State<SharedStore>, Path(id): Path<Uuid>) -> BackendResult<Json<CourseTree>> {
    Ok(Json(read::load_course_tree(store.as_ref(), id).await?))
}

pub async fn create_course(
    State(store): State<SharedStore>,
    AuthUser(principal): AuthUser,
    Json(tree): Json<CourseTreeRequest>,
) -> BackendResult<(StatusCode, Json<CreatedCourse>)> {
    let (course, report) = reconcile::create_course(store.as_ref(), principal.user_id, &tree).await?;
    let course = read::load_course_tree(store.as_ref(), course.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedCourse {
            message: "Course created successfully",
            course,
            report,
        }),
    ))
}

pub async fn update_course(
    State(store): State<SharedStore>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(tree): Json<CourseTreeRequest>,
) -> BackendResult<Json<UpdatedCourse>> {
    let report = reconcile::update_course(store.as_ref(), id, principal.user_id, &tree).await?;
    Ok(Json(UpdatedCourse {
        message: "Course updated successfully",
        course_id: id,
        report,
    }))
}

pub async fn delete_course(
    State(store): State<SharedStore>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> BackendResult<Json<DeletedCourse>> {
    let response = match cascade::delete_course(store.as_ref(), id, principal.user_id).await? {
        DeleteOutcome::Deleted(summary) => DeletedCourse {
            message: "Course deleted successfully",
            course_id: id,
            deleted: Some(summary),
        },
        DeleteOutcome::AlreadyDeleted => DeletedCourse {
            message: "Course already deleted",
            course_id: id,
            deleted: None,
        },
    };
    Ok(Json(response))
}

pub async fn enroll(
    State(store): State<SharedStore>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> BackendResult<(StatusCode, Json<Enrollment>)> {
    let enrollment = enrollment::enroll(store.as_ref(), id, principal.user_id).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

pub async fn cancel_enrollment(
    State(store): State<SharedStore>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> BackendResult<Json<CancelledEnrollment>> {
    let removed = enrollment::cancel(store.as_ref(), id, principal.user_id).await?;
    Ok(Json(CancelledEnrollment {
        message: "Enrollment cancelled",
        course_id: id,
        removed,
    }))
}

pub async fn complete_unit(
    State(store): State<SharedStore>,
    AuthUser(principal): AuthUser,
    Path((course_id, unit_id)): Path<(Uuid, Uuid)>,
) -> BackendResult<Json<Enrollment>> {
    let enrollment = enrollment::complete_unit(store.as_ref(), course_id, principal.user_id, unit_id).await?;
    Ok(Json(enrollment))
}

pub async fn add_quiz(
    State(store): State<SharedStore>,
    AuthUser(principal): AuthUser,
    Path(unit_id): Path<Uuid>,
    Json(request): Json<NewQuiz>,
) -> BackendResult<(StatusCode, Json<Quiz>)> {
    let quiz = quiz::add_quiz(store.as_ref(), unit_id, principal.user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

pub async fn list_quizzes(
    State(store): State<SharedStore>,
    Path(unit_id): Path<Uuid>,
) -> BackendResult<Json<Vec<Quiz>>> {
    Ok(Json(quiz::list_quizzes(store.as_ref(), unit_id).await?))
}
