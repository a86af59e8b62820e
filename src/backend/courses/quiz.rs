//! Quizzes
//!
//! Quiz rows live in their own collection keyed by `unit_id`. A `quiz`
//! content item on the unit only signals that such rows exist.

use uuid::Uuid;

use crate::backend::courses::ownership::ensure_owner;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::EntityStore;
use crate::shared::model::Quiz;
use crate::shared::tree::NewQuiz;

/// Attach a quiz to `unit_id`; only the course author may do so
pub async fn add_quiz(
    store: &dyn EntityStore,
    unit_id: Uuid,
    principal: Uuid,
    quiz: &NewQuiz,
) -> BackendResult<Quiz> {
    quiz.validate()?;

    let unit = store
        .find_unit(unit_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Unit", unit_id))?;
    let chapter = store
        .find_chapter(unit.chapter_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Chapter", unit.chapter_id))?;
    ensure_owner(store, chapter.course_id, principal).await?;

    let quiz = store
        .insert_quiz(Quiz::new(
            unit.id,
            quiz.question.trim().to_string(),
            quiz.options.clone(),
            quiz.correct_answer_index,
        ))
        .await?;
    tracing::info!(unit_id = %unit_id, quiz_id = %quiz.id, "Added quiz");
    Ok(quiz)
}

pub async fn list_quizzes(store: &dyn EntityStore, unit_id: Uuid) -> BackendResult<Vec<Quiz>> {
    if store.find_unit(unit_id).await?.is_none() {
        return Err(BackendError::not_found("Unit", unit_id));
    }
    Ok(store.find_quizzes_by_unit(unit_id).await?)
}
