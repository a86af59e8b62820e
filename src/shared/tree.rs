//! Submitted Course Trees
//!
//! Request shapes for creating and updating a course together with its
//! nested chapters and units, plus quiz submissions. Every submission is
//! validated as a whole before the first write happens.
//!
//! A node that carries an `id` is matched against the persisted sibling with
//! the same identifier; a node without one (or with an unknown one) is always
//! created fresh.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::model::{AccessType, ContentItem, CourseFields};

/// Full course submission, used by both create and update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CourseTreeRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub access_type: Option<AccessType>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub chapters: Vec<ChapterNode>,
}

/// Submitted chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChapterNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub units: Vec<UnitNode>,
}

/// Submitted unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UnitNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub contents: Vec<ContentItem>,
    #[serde(default)]
    pub order: i32,
}

impl CourseTreeRequest {
    /// Reject blank titles anywhere in the tree
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.title.trim().is_empty() {
            return Err(SharedError::validation("title", "Title is required"));
        }
        for (c, chapter) in self.chapters.iter().enumerate() {
            if chapter.title.trim().is_empty() {
                return Err(SharedError::validation(
                    format!("chapters[{}].title", c),
                    "Chapter title is required",
                ));
            }
            for (u, unit) in chapter.units.iter().enumerate() {
                if unit.title.trim().is_empty() {
                    return Err(SharedError::validation(
                        format!("chapters[{}].units[{}].title", c, u),
                        "Unit title is required",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Scalar course fields with defaults applied
    pub fn fields(&self) -> CourseFields {
        CourseFields {
            title: self.title.trim().to_string(),
            description: self.description.clone().unwrap_or_default(),
            access_type: self.access_type.unwrap_or_default(),
            access_key: self.access_key.clone(),
        }
    }
}

/// Quiz submission for a unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewQuiz {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: i32,
}

impl NewQuiz {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.question.trim().is_empty() {
            return Err(SharedError::validation("question", "Question is required"));
        }
        if self.options.is_empty() {
            return Err(SharedError::validation("options", "At least one option is required"));
        }
        if let Some(i) = self.options.iter().position(|o| o.trim().is_empty()) {
            return Err(SharedError::validation(
                format!("options[{}]", i),
                "Options cannot be blank",
            ));
        }
        let in_range = usize::try_from(self.correct_answer_index)
            .map(|i| i < self.options.len())
            .unwrap_or(false);
        if !in_range {
            return Err(SharedError::validation(
                "correct_answer_index",
                format!("Must be between 0 and {}", self.options.len() - 1),
            ));
        }
        Ok(())
    }
}
