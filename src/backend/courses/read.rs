//! Course tree reads
//!
//! Assembles a course with its chapters, units and quizzes by following the
//! reference arrays. The arrays can lag behind the rows after an interrupted
//! write, so an id that resolves to nothing, or to a row whose parent id
//! points elsewhere, is skipped and logged rather than treated as an error.
//! Rows that exist but are not referenced stay invisible here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::EntityStore;
use crate::shared::model::{AccessType, ContentItem, Course, Quiz};

/// A course with its content tree resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseTree {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub author: Uuid,
    pub access_type: AccessType,
    pub enrolled_users: Vec<Uuid>,
    pub chapters: Vec<ChapterTree>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterTree {
    pub id: Uuid,
    pub title: String,
    pub units: Vec<UnitTree>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTree {
    pub id: Uuid,
    pub title: String,
    pub order: i32,
    /// Sorted by `order`; equal orders keep their stored sequence
    pub contents: Vec<ContentItem>,
    pub quizzes: Vec<Quiz>,
}

impl CourseTree {
    pub fn chapter_ids(&self) -> Vec<Uuid> {
        self.chapters.iter().map(|chapter| chapter.id).collect()
    }
}

/// Load `course_id` and everything its arrays reference
pub async fn load_course_tree(store: &dyn EntityStore, course_id: Uuid) -> BackendResult<CourseTree> {
    let course = store
        .find_course(course_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Course", course_id))?;
    resolve(store, course).await
}

async fn resolve(store: &dyn EntityStore, course: Course) -> BackendResult<CourseTree> {
    let mut chapters = Vec::with_capacity(course.chapters.len());

    for chapter_id in &course.chapters {
        let chapter = match store.find_chapter(*chapter_id).await? {
            Some(chapter) if chapter.course_id == course.id => chapter,
            Some(_) => {
                tracing::warn!(course_id = %course.id, chapter_id = %chapter_id, "Chapter belongs to another course");
                continue;
            }
            None => {
                tracing::warn!(course_id = %course.id, chapter_id = %chapter_id, "Skipping dangling chapter reference");
                continue;
            }
        };

        let mut units = Vec::with_capacity(chapter.units.len());
        for unit_id in &chapter.units {
            let unit = match store.find_unit(*unit_id).await? {
                Some(unit) if unit.chapter_id == chapter.id => unit,
                _ => {
                    tracing::warn!(chapter_id = %chapter.id, unit_id = %unit_id, "Skipping dangling unit reference");
                    continue;
                }
            };
            let mut contents = unit.contents;
            contents.sort_by_key(|item| item.order);
            units.push(UnitTree {
                id: unit.id,
                title: unit.title,
                order: unit.order,
                contents,
                quizzes: store.find_quizzes_by_unit(unit.id).await?,
            });
        }
        units.sort_by_key(|unit| unit.order);

        chapters.push(ChapterTree {
            id: chapter.id,
            title: chapter.title,
            units,
        });
    }

    Ok(CourseTree {
        id: course.id,
        title: course.title,
        description: course.description,
        author: course.author,
        access_type: course.access_type,
        enrolled_users: course.enrolled_users,
        chapters,
        created_at: course.created_at,
        updated_at: course.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::MemoryStore;
    use crate::shared::model::{Chapter, CourseFields, Unit};

    #[tokio::test]
    async fn test_contents_sorted_stably_by_order() {
        let store = MemoryStore::new();
        let fields = CourseFields {
            title: "Rust".into(),
            description: String::new(),
            access_type: AccessType::Public,
            access_key: None,
        };
        let course = store.insert_course(Course::new(Uuid::new_v4(), fields)).await.unwrap();
        let chapter = store.insert_chapter(Chapter::new("A".into(), course.id)).await.unwrap();
        let contents = vec![
            ContentItem::text("second", 2),
            ContentItem::text("first-a", 1),
            ContentItem::text("first-b", 1),
        ];
        let unit = store.insert_unit(Unit::new(chapter.id, "U".into(), 1, contents)).await.unwrap();
        store.push_course_chapter(course.id, chapter.id).await.unwrap();
        store.push_chapter_unit(chapter.id, unit.id).await.unwrap();

        let tree = load_course_tree(&store, course.id).await.unwrap();
        let orders: Vec<ContentItem> = tree.chapters[0].units[0].contents.clone();
        assert_eq!(
            orders,
            vec![
                ContentItem::text("first-a", 1),
                ContentItem::text("first-b", 1),
                ContentItem::text("second", 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_foreign_chapter_reference_is_skipped() {
        let store = MemoryStore::new();
        let fields = CourseFields {
            title: "Rust".into(),
            description: String::new(),
            access_type: AccessType::Public,
            access_key: None,
        };
        let course = store.insert_course(Course::new(Uuid::new_v4(), fields)).await.unwrap();
        let foreign = store.insert_chapter(Chapter::new("X".into(), Uuid::new_v4())).await.unwrap();
        store.push_course_chapter(course.id, foreign.id).await.unwrap();

        let tree = load_course_tree(&store, course.id).await.unwrap();
        assert!(tree.chapters.is_empty());
    }
}
