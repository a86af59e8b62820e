//! In-memory entity store.
//!
//! Keeps each collection as an insertion-ordered `Vec` behind one
//! `tokio::sync::RwLock`. Used when no database is configured and by the
//! test-suite, which can also plant one-shot failures with
//! [`MemoryStore::fail_next`] to simulate a crash between two writes of a
//! multi-step operation.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EntityStore, StoreError, StoreOp, StoreResult};
use crate::shared::model::{Chapter, ContentItem, Course, CourseFields, Enrollment, Quiz, Unit, User};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    courses: Vec<Course>,
    chapters: Vec<Chapter>,
    units: Vec<Unit>,
    quizzes: Vec<Quiz>,
    enrollments: Vec<Enrollment>,
}

/// Entity store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
    planted: Mutex<Vec<StoreOp>>,
}

fn push_unique(ids: &mut Vec<Uuid>, id: Uuid) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

fn pull(ids: &mut Vec<Uuid>, id: Uuid) {
    ids.retain(|existing| *existing != id);
}

fn matches_term(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(&term.to_lowercase())
}

/// Apply `f` to the row with `id`, if any
fn with_row<T, F>(rows: &mut [T], id: Uuid, key: impl Fn(&T) -> Uuid, f: F)
where
    F: FnOnce(&mut T),
{
    if let Some(row) = rows.iter_mut().find(|row| key(row) == id) {
        f(row);
    }
}

fn remove_where<T>(rows: &mut Vec<T>, predicate: impl Fn(&T) -> bool) -> u64 {
    let before = rows.len();
    rows.retain(|row| !predicate(row));
    (before - rows.len()) as u64
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of kind `op` fail with [`StoreError::Injected`]
    ///
    /// Planting the same op twice fails the next two calls.
    pub fn fail_next(&self, op: StoreOp) {
        self.planted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }

    fn trip(&self, op: StoreOp) -> StoreResult<()> {
        let mut planted = self.planted.lock().unwrap_or_else(PoisonError::into_inner);
        match planted.iter().position(|p| *p == op) {
            Some(index) => {
                planted.remove(index);
                tracing::debug!(?op, "tripping planted store failure");
                Err(StoreError::Injected(op))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        self.trip(StoreOp::InsertUser)?;
        self.data.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.data.read().await.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.data.read().await.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        Ok(self.data.read().await.users.iter().find(|u| u.name == name).cloned())
    }

    async fn search_users(&self, term: &str) -> StoreResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().filter(|u| matches_term(&u.name, term)).cloned().collect())
    }

    async fn push_created_course(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PushReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.users, user_id, |u| u.id, |u| push_unique(&mut u.created_courses, course_id));
        Ok(())
    }

    async fn pull_created_course(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PullReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.users, user_id, |u| u.id, |u| pull(&mut u.created_courses, course_id));
        Ok(())
    }

    async fn push_enrolled_course(&self, user_id: Uuid, enrollment_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PushReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.users, user_id, |u| u.id, |u| push_unique(&mut u.enrolled_courses, enrollment_id));
        Ok(())
    }

    async fn pull_enrolled_course(&self, user_id: Uuid, enrollment_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PullReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.users, user_id, |u| u.id, |u| pull(&mut u.enrolled_courses, enrollment_id));
        Ok(())
    }

    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        self.trip(StoreOp::InsertCourse)?;
        self.data.write().await.courses.push(course.clone());
        Ok(course)
    }

    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        Ok(self.data.read().await.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn list_courses(&self, skip: u64, limit: u64) -> StoreResult<Vec<Course>> {
        let data = self.data.read().await;
        Ok(data
            .courses
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_courses(&self) -> StoreResult<u64> {
        Ok(self.data.read().await.courses.len() as u64)
    }

    async fn search_courses(&self, term: &str) -> StoreResult<Vec<Course>> {
        let data = self.data.read().await;
        Ok(data.courses.iter().filter(|c| matches_term(&c.title, term)).cloned().collect())
    }

    async fn update_course_fields(&self, id: Uuid, fields: &CourseFields) -> StoreResult<()> {
        self.trip(StoreOp::UpdateCourse)?;
        let mut data = self.data.write().await;
        with_row(&mut data.courses, id, |c| c.id, |c| {
            c.title = fields.title.clone();
            c.description = fields.description.clone();
            c.access_type = fields.access_type;
            c.access_key = fields.access_key.clone();
            c.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn push_course_chapter(&self, course_id: Uuid, chapter_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PushReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.courses, course_id, |c| c.id, |c| push_unique(&mut c.chapters, chapter_id));
        Ok(())
    }

    async fn pull_course_chapter(&self, course_id: Uuid, chapter_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PullReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.courses, course_id, |c| c.id, |c| pull(&mut c.chapters, chapter_id));
        Ok(())
    }

    async fn set_course_chapters(&self, course_id: Uuid, chapter_ids: &[Uuid]) -> StoreResult<()> {
        self.trip(StoreOp::SetReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.courses, course_id, |c| c.id, |c| {
            c.chapters = chapter_ids.to_vec();
            c.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn push_enrolled_user(&self, course_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PushReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.courses, course_id, |c| c.id, |c| push_unique(&mut c.enrolled_users, user_id));
        Ok(())
    }

    async fn pull_enrolled_user(&self, course_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PullReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.courses, course_id, |c| c.id, |c| pull(&mut c.enrolled_users, user_id));
        Ok(())
    }

    async fn delete_course(&self, id: Uuid) -> StoreResult<u64> {
        self.trip(StoreOp::DeleteCourse)?;
        Ok(remove_where(&mut self.data.write().await.courses, |c| c.id == id))
    }

    async fn insert_chapter(&self, chapter: Chapter) -> StoreResult<Chapter> {
        self.trip(StoreOp::InsertChapter)?;
        self.data.write().await.chapters.push(chapter.clone());
        Ok(chapter)
    }

    async fn find_chapter(&self, id: Uuid) -> StoreResult<Option<Chapter>> {
        Ok(self.data.read().await.chapters.iter().find(|c| c.id == id).cloned())
    }

    async fn find_chapters_by_course(&self, course_id: Uuid) -> StoreResult<Vec<Chapter>> {
        let data = self.data.read().await;
        Ok(data.chapters.iter().filter(|c| c.course_id == course_id).cloned().collect())
    }

    async fn update_chapter_title(&self, id: Uuid, title: &str) -> StoreResult<()> {
        self.trip(StoreOp::UpdateChapter)?;
        let mut data = self.data.write().await;
        with_row(&mut data.chapters, id, |c| c.id, |c| {
            c.title = title.to_string();
            c.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn push_chapter_unit(&self, chapter_id: Uuid, unit_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PushReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.chapters, chapter_id, |c| c.id, |c| push_unique(&mut c.units, unit_id));
        Ok(())
    }

    async fn pull_chapter_unit(&self, chapter_id: Uuid, unit_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PullReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.chapters, chapter_id, |c| c.id, |c| pull(&mut c.units, unit_id));
        Ok(())
    }

    async fn set_chapter_units(&self, chapter_id: Uuid, unit_ids: &[Uuid]) -> StoreResult<()> {
        self.trip(StoreOp::SetReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.chapters, chapter_id, |c| c.id, |c| {
            c.units = unit_ids.to_vec();
            c.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn delete_chapter(&self, id: Uuid) -> StoreResult<u64> {
        self.trip(StoreOp::DeleteChapters)?;
        Ok(remove_where(&mut self.data.write().await.chapters, |c| c.id == id))
    }

    async fn delete_chapters_by_course(&self, course_id: Uuid) -> StoreResult<u64> {
        self.trip(StoreOp::DeleteChapters)?;
        Ok(remove_where(&mut self.data.write().await.chapters, |c| c.course_id == course_id))
    }

    async fn insert_unit(&self, unit: Unit) -> StoreResult<Unit> {
        self.trip(StoreOp::InsertUnit)?;
        self.data.write().await.units.push(unit.clone());
        Ok(unit)
    }

    async fn find_unit(&self, id: Uuid) -> StoreResult<Option<Unit>> {
        Ok(self.data.read().await.units.iter().find(|u| u.id == id).cloned())
    }

    async fn find_units_by_chapter(&self, chapter_id: Uuid) -> StoreResult<Vec<Unit>> {
        let data = self.data.read().await;
        Ok(data.units.iter().filter(|u| u.chapter_id == chapter_id).cloned().collect())
    }

    async fn update_unit(
        &self,
        id: Uuid,
        title: &str,
        order: i32,
        contents: &[ContentItem],
    ) -> StoreResult<()> {
        self.trip(StoreOp::UpdateUnit)?;
        let mut data = self.data.write().await;
        with_row(&mut data.units, id, |u| u.id, |u| {
            u.title = title.to_string();
            u.order = order;
            u.contents = contents.to_vec();
            u.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn delete_unit(&self, id: Uuid) -> StoreResult<u64> {
        self.trip(StoreOp::DeleteUnits)?;
        Ok(remove_where(&mut self.data.write().await.units, |u| u.id == id))
    }

    async fn delete_units_by_chapters(&self, chapter_ids: &[Uuid]) -> StoreResult<u64> {
        self.trip(StoreOp::DeleteUnits)?;
        Ok(remove_where(&mut self.data.write().await.units, |u| chapter_ids.contains(&u.chapter_id)))
    }

    async fn insert_quiz(&self, quiz: Quiz) -> StoreResult<Quiz> {
        self.trip(StoreOp::InsertQuiz)?;
        self.data.write().await.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn find_quizzes_by_unit(&self, unit_id: Uuid) -> StoreResult<Vec<Quiz>> {
        let data = self.data.read().await;
        Ok(data.quizzes.iter().filter(|q| q.unit_id == unit_id).cloned().collect())
    }

    async fn delete_quizzes_by_units(&self, unit_ids: &[Uuid]) -> StoreResult<u64> {
        self.trip(StoreOp::DeleteQuizzes)?;
        Ok(remove_where(&mut self.data.write().await.quizzes, |q| unit_ids.contains(&q.unit_id)))
    }

    async fn insert_enrollment(&self, enrollment: Enrollment) -> StoreResult<Enrollment> {
        self.trip(StoreOp::InsertEnrollment)?;
        self.data.write().await.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn find_enrollment(&self, id: Uuid) -> StoreResult<Option<Enrollment>> {
        Ok(self.data.read().await.enrollments.iter().find(|e| e.id == id).cloned())
    }

    async fn find_enrollments_for(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Vec<Enrollment>> {
        let data = self.data.read().await;
        Ok(data
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn find_enrollments_by_course(&self, course_id: Uuid) -> StoreResult<Vec<Enrollment>> {
        let data = self.data.read().await;
        Ok(data.enrollments.iter().filter(|e| e.course_id == course_id).cloned().collect())
    }

    async fn push_completed_unit(&self, enrollment_id: Uuid, unit_id: Uuid) -> StoreResult<()> {
        self.trip(StoreOp::PushReference)?;
        let mut data = self.data.write().await;
        with_row(&mut data.enrollments, enrollment_id, |e| e.id, |e| push_unique(&mut e.completed_units, unit_id));
        Ok(())
    }

    async fn update_progress(&self, enrollment_id: Uuid, progress: i32) -> StoreResult<()> {
        self.trip(StoreOp::UpdateEnrollment)?;
        let mut data = self.data.write().await;
        with_row(&mut data.enrollments, enrollment_id, |e| e.id, |e| {
            e.progress = progress;
            e.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn delete_enrollments_for(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<u64> {
        self.trip(StoreOp::DeleteEnrollments)?;
        Ok(remove_where(&mut self.data.write().await.enrollments, |e| {
            e.user_id == user_id && e.course_id == course_id
        }))
    }

    async fn delete_enrollments_by_course(&self, course_id: Uuid) -> StoreResult<u64> {
        self.trip(StoreOp::DeleteEnrollments)?;
        Ok(remove_where(&mut self.data.write().await.enrollments, |e| e.course_id == course_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::model::CourseFields;
    use crate::shared::AccessType;

    fn course_for(author: Uuid) -> Course {
        Course::new(
            author,
            CourseFields {
                title: "Rust".into(),
                description: String::new(),
                access_type: AccessType::Public,
                access_key: None,
            },
        )
    }

    #[tokio::test]
    async fn test_push_is_idempotent() {
        let store = MemoryStore::new();
        let course = store.insert_course(course_for(Uuid::new_v4())).await.unwrap();
        let chapter_id = Uuid::new_v4();

        store.push_course_chapter(course.id, chapter_id).await.unwrap();
        store.push_course_chapter(course.id, chapter_id).await.unwrap();

        let course = store.find_course(course.id).await.unwrap().unwrap();
        assert_eq!(course.chapters, vec![chapter_id]);
    }

    #[tokio::test]
    async fn test_set_replaces_array_in_given_order() {
        let store = MemoryStore::new();
        let course = store.insert_course(course_for(Uuid::new_v4())).await.unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.push_course_chapter(course.id, a).await.unwrap();
        store.push_course_chapter(course.id, b).await.unwrap();

        store.set_course_chapters(course.id, &[b, a]).await.unwrap();
        store.set_course_chapters(course.id, &[b, a]).await.unwrap();

        let course = store.find_course(course.id).await.unwrap().unwrap();
        assert_eq!(course.chapters, vec![b, a]);
    }

    #[tokio::test]
    async fn test_pull_and_delete_of_absent_ids_are_noops() {
        let store = MemoryStore::new();
        let course = store.insert_course(course_for(Uuid::new_v4())).await.unwrap();

        store.pull_course_chapter(course.id, Uuid::new_v4()).await.unwrap();
        store.pull_course_chapter(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        assert_eq!(store.delete_chapter(Uuid::new_v4()).await.unwrap(), 0);
        assert_eq!(store.delete_enrollments_by_course(course.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_planted_failure_trips_once() {
        let store = MemoryStore::new();
        store.fail_next(StoreOp::InsertCourse);

        let first = store.insert_course(course_for(Uuid::new_v4())).await;
        assert!(matches!(first, Err(StoreError::Injected(StoreOp::InsertCourse))));

        let second = store.insert_course(course_for(Uuid::new_v4())).await;
        assert!(second.is_ok());
        assert_eq!(store.count_courses().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = MemoryStore::new();
        store.insert_user(User::new("GraceHopper".into(), "g@example.com".into(), String::new())).await.unwrap();
        store.insert_user(User::new("linus".into(), "l@example.com".into(), String::new())).await.unwrap();

        let hits = store.search_users("hOPP").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "GraceHopper");
    }

    #[tokio::test]
    async fn test_list_courses_pages_in_insertion_order() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(store.insert_course(course_for(author)).await.unwrap().id);
        }

        let page: Vec<Uuid> = store.list_courses(2, 2).await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(page, ids[2..4].to_vec());
    }
}
