/**
 * PostgreSQL Entity Store
 *
 * Implements [`EntityStore`] on a sqlx connection pool. Reference arrays are
 * `UUID[]` columns; pushes use `array_append` guarded by `= ANY(..)` so a
 * repeated push is a no-op, and pulls use `array_remove`. Unit contents are
 * stored as `JSONB`.
 *
 * # Schema
 *
 * Tables are created by the migrations in `migrations/`, applied by
 * [`PgStore::connect`].
 */

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{EntityStore, StoreError, StoreResult};
use crate::shared::model::{
    AccessType, Chapter, ContentItem, Course, CourseFields, Enrollment, Quiz, Unit, User,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, profile_picture, created_courses, enrolled_courses, created_at, updated_at";
const COURSE_COLUMNS: &str = "id, title, description, author, chapters, enrolled_users, access_type, access_key, created_at, updated_at";
const CHAPTER_COLUMNS: &str = "id, title, course_id, units, created_at, updated_at";
const UNIT_COLUMNS: &str = "id, chapter_id, title, unit_order, contents, created_at, updated_at";
const QUIZ_COLUMNS: &str = "id, unit_id, question, options, correct_answer_index, created_at, updated_at";
const ENROLLMENT_COLUMNS: &str = "id, user_id, course_id, progress, completed_units, created_at, updated_at";

/// Entity store on a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    profile_picture: String,
    created_courses: Vec<Uuid>,
    enrolled_courses: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            profile_picture: row.profile_picture,
            created_courses: row.created_courses,
            enrolled_courses: row.enrolled_courses,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    title: String,
    description: String,
    author: Uuid,
    chapters: Vec<Uuid>,
    enrolled_users: Vec<Uuid>,
    access_type: String,
    access_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = StoreError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let access_type = row.access_type.parse::<AccessType>().map_err(|_| {
            StoreError::corrupt(format!(
                "course {} has unknown access type '{}'",
                row.id, row.access_type
            ))
        })?;
        Ok(Course {
            id: row.id,
            title: row.title,
            description: row.description,
            author: row.author,
            chapters: row.chapters,
            enrolled_users: row.enrolled_users,
            access_type,
            access_key: row.access_key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChapterRow {
    id: Uuid,
    title: String,
    course_id: Uuid,
    units: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ChapterRow> for Chapter {
    fn from(row: ChapterRow) -> Self {
        Chapter {
            id: row.id,
            title: row.title,
            course_id: row.course_id,
            units: row.units,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UnitRow {
    id: Uuid,
    chapter_id: Uuid,
    title: String,
    unit_order: i32,
    contents: Json<Vec<ContentItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UnitRow> for Unit {
    fn from(row: UnitRow) -> Self {
        Unit {
            id: row.id,
            chapter_id: row.chapter_id,
            title: row.title,
            order: row.unit_order,
            contents: row.contents.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QuizRow {
    id: Uuid,
    unit_id: Uuid,
    question: String,
    options: Vec<String>,
    correct_answer_index: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        Quiz {
            id: row.id,
            unit_id: row.unit_id,
            question: row.question,
            options: row.options,
            correct_answer_index: row.correct_answer_index,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    progress: i32,
    completed_units: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
            progress: row.progress,
            completed_units: row.completed_units,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escape `LIKE` wildcards so the term matches literally
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn courses_from(rows: Vec<CourseRow>) -> StoreResult<Vec<Course>> {
    rows.into_iter().map(Course::try_from).collect()
}

impl PgStore {
    /// Wrap an existing pool without running migrations
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and bring the schema up to date
    ///
    /// Gives up with [`sqlx::Error::PoolTimedOut`] if no connection is made
    /// within `acquire_timeout`.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        tracing::info!("Running database migrations...");
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))?;
        tracing::info!("Database ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a `UUID[]` push or pull statement of the form `SET col = .. WHERE id = $1`
    async fn execute_pair(&self, sql: &str, id: Uuid, member: Uuid) -> StoreResult<()> {
        sqlx::query(sql)
            .bind(id)
            .bind(member)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn execute_delete(&self, sql: &str, id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_picture)
        .bind(&user.created_courses)
        .bind(&user.enrolled_courses)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn search_users(&self, term: &str) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name ILIKE $1 ORDER BY created_at, id"
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn push_created_course(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE users SET created_courses = array_append(created_courses, $2), updated_at = $3 \
             WHERE id = $1 AND NOT ($2 = ANY(created_courses))",
            user_id,
            course_id,
        )
        .await
    }

    async fn pull_created_course(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE users SET created_courses = array_remove(created_courses, $2), updated_at = $3 WHERE id = $1",
            user_id,
            course_id,
        )
        .await
    }

    async fn push_enrolled_course(&self, user_id: Uuid, enrollment_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE users SET enrolled_courses = array_append(enrolled_courses, $2), updated_at = $3 \
             WHERE id = $1 AND NOT ($2 = ANY(enrolled_courses))",
            user_id,
            enrollment_id,
        )
        .await
    }

    async fn pull_enrolled_course(&self, user_id: Uuid, enrollment_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE users SET enrolled_courses = array_remove(enrolled_courses, $2), updated_at = $3 WHERE id = $1",
            user_id,
            enrollment_id,
        )
        .await
    }

    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "INSERT INTO courses ({COURSE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {COURSE_COLUMNS}"
        ))
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.author)
        .bind(&course.chapters)
        .bind(&course.enrolled_users)
        .bind(course.access_type.as_str())
        .bind(&course.access_key)
        .bind(course.created_at)
        .bind(course.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Course::try_from).transpose()
    }

    async fn list_courses(&self, skip: u64, limit: u64) -> StoreResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at, id OFFSET $1 LIMIT $2"
        ))
        .bind(i64::try_from(skip).unwrap_or(i64::MAX))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        courses_from(rows)
    }

    async fn count_courses(&self) -> StoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn search_courses(&self, term: &str) -> StoreResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE title ILIKE $1 ORDER BY created_at, id"
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        courses_from(rows)
    }

    async fn update_course_fields(&self, id: Uuid, fields: &CourseFields) -> StoreResult<()> {
        sqlx::query(
            "UPDATE courses SET title = $2, description = $3, access_type = $4, access_key = $5, updated_at = $6 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.access_type.as_str())
        .bind(&fields.access_key)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn push_course_chapter(&self, course_id: Uuid, chapter_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE courses SET chapters = array_append(chapters, $2), updated_at = $3 \
             WHERE id = $1 AND NOT ($2 = ANY(chapters))",
            course_id,
            chapter_id,
        )
        .await
    }

    async fn pull_course_chapter(&self, course_id: Uuid, chapter_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE courses SET chapters = array_remove(chapters, $2), updated_at = $3 WHERE id = $1",
            course_id,
            chapter_id,
        )
        .await
    }

    async fn set_course_chapters(&self, course_id: Uuid, chapter_ids: &[Uuid]) -> StoreResult<()> {
        sqlx::query("UPDATE courses SET chapters = $2, updated_at = $3 WHERE id = $1")
            .bind(course_id)
            .bind(chapter_ids)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn push_enrolled_user(&self, course_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE courses SET enrolled_users = array_append(enrolled_users, $2), updated_at = $3 \
             WHERE id = $1 AND NOT ($2 = ANY(enrolled_users))",
            course_id,
            user_id,
        )
        .await
    }

    async fn pull_enrolled_user(&self, course_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE courses SET enrolled_users = array_remove(enrolled_users, $2), updated_at = $3 WHERE id = $1",
            course_id,
            user_id,
        )
        .await
    }

    async fn delete_course(&self, id: Uuid) -> StoreResult<u64> {
        self.execute_delete("DELETE FROM courses WHERE id = $1", id).await
    }

    async fn insert_chapter(&self, chapter: Chapter) -> StoreResult<Chapter> {
        let row = sqlx::query_as::<_, ChapterRow>(&format!(
            "INSERT INTO chapters ({CHAPTER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CHAPTER_COLUMNS}"
        ))
        .bind(chapter.id)
        .bind(&chapter.title)
        .bind(chapter.course_id)
        .bind(&chapter.units)
        .bind(chapter.created_at)
        .bind(chapter.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_chapter(&self, id: Uuid) -> StoreResult<Option<Chapter>> {
        let row = sqlx::query_as::<_, ChapterRow>(&format!("SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Chapter::from))
    }

    async fn find_chapters_by_course(&self, course_id: Uuid) -> StoreResult<Vec<Chapter>> {
        let rows = sqlx::query_as::<_, ChapterRow>(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE course_id = $1 ORDER BY created_at, id"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Chapter::from).collect())
    }

    async fn update_chapter_title(&self, id: Uuid, title: &str) -> StoreResult<()> {
        sqlx::query("UPDATE chapters SET title = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(title)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn push_chapter_unit(&self, chapter_id: Uuid, unit_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE chapters SET units = array_append(units, $2), updated_at = $3 \
             WHERE id = $1 AND NOT ($2 = ANY(units))",
            chapter_id,
            unit_id,
        )
        .await
    }

    async fn pull_chapter_unit(&self, chapter_id: Uuid, unit_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE chapters SET units = array_remove(units, $2), updated_at = $3 WHERE id = $1",
            chapter_id,
            unit_id,
        )
        .await
    }

    async fn set_chapter_units(&self, chapter_id: Uuid, unit_ids: &[Uuid]) -> StoreResult<()> {
        sqlx::query("UPDATE chapters SET units = $2, updated_at = $3 WHERE id = $1")
            .bind(chapter_id)
            .bind(unit_ids)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_chapter(&self, id: Uuid) -> StoreResult<u64> {
        self.execute_delete("DELETE FROM chapters WHERE id = $1", id).await
    }

    async fn delete_chapters_by_course(&self, course_id: Uuid) -> StoreResult<u64> {
        self.execute_delete("DELETE FROM chapters WHERE course_id = $1", course_id).await
    }

    async fn insert_unit(&self, unit: Unit) -> StoreResult<Unit> {
        let row = sqlx::query_as::<_, UnitRow>(&format!(
            "INSERT INTO units ({UNIT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {UNIT_COLUMNS}"
        ))
        .bind(unit.id)
        .bind(unit.chapter_id)
        .bind(&unit.title)
        .bind(unit.order)
        .bind(Json(&unit.contents))
        .bind(unit.created_at)
        .bind(unit.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_unit(&self, id: Uuid) -> StoreResult<Option<Unit>> {
        let row = sqlx::query_as::<_, UnitRow>(&format!("SELECT {UNIT_COLUMNS} FROM units WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Unit::from))
    }

    async fn find_units_by_chapter(&self, chapter_id: Uuid) -> StoreResult<Vec<Unit>> {
        let rows = sqlx::query_as::<_, UnitRow>(&format!(
            "SELECT {UNIT_COLUMNS} FROM units WHERE chapter_id = $1 ORDER BY created_at, id"
        ))
        .bind(chapter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Unit::from).collect())
    }

    async fn update_unit(
        &self,
        id: Uuid,
        title: &str,
        order: i32,
        contents: &[ContentItem],
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE units SET title = $2, unit_order = $3, contents = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(title)
        .bind(order)
        .bind(Json(contents))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_unit(&self, id: Uuid) -> StoreResult<u64> {
        self.execute_delete("DELETE FROM units WHERE id = $1", id).await
    }

    async fn delete_units_by_chapters(&self, chapter_ids: &[Uuid]) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM units WHERE chapter_id = ANY($1)")
            .bind(chapter_ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_quiz(&self, quiz: Quiz) -> StoreResult<Quiz> {
        let row = sqlx::query_as::<_, QuizRow>(&format!(
            "INSERT INTO quizzes ({QUIZ_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(quiz.id)
        .bind(quiz.unit_id)
        .bind(&quiz.question)
        .bind(&quiz.options)
        .bind(quiz.correct_answer_index)
        .bind(quiz.created_at)
        .bind(quiz.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_quizzes_by_unit(&self, unit_id: Uuid) -> StoreResult<Vec<Quiz>> {
        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE unit_id = $1 ORDER BY created_at, id"
        ))
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Quiz::from).collect())
    }

    async fn delete_quizzes_by_units(&self, unit_ids: &[Uuid]) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM quizzes WHERE unit_id = ANY($1)")
            .bind(unit_ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_enrollment(&self, enrollment: Enrollment) -> StoreResult<Enrollment> {
        let row = sqlx::query_as::<_, EnrollmentRow>(&format!(
            "INSERT INTO enrollments ({ENROLLMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {ENROLLMENT_COLUMNS}"
        ))
        .bind(enrollment.id)
        .bind(enrollment.user_id)
        .bind(enrollment.course_id)
        .bind(enrollment.progress)
        .bind(&enrollment.completed_units)
        .bind(enrollment.created_at)
        .bind(enrollment.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_enrollment(&self, id: Uuid) -> StoreResult<Option<Enrollment>> {
        let row = sqlx::query_as::<_, EnrollmentRow>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Enrollment::from))
    }

    async fn find_enrollments_for(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Vec<Enrollment>> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Enrollment::from).collect())
    }

    async fn find_enrollments_by_course(&self, course_id: Uuid) -> StoreResult<Vec<Enrollment>> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE course_id = $1 ORDER BY created_at, id"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Enrollment::from).collect())
    }

    async fn push_completed_unit(&self, enrollment_id: Uuid, unit_id: Uuid) -> StoreResult<()> {
        self.execute_pair(
            "UPDATE enrollments SET completed_units = array_append(completed_units, $2), updated_at = $3 \
             WHERE id = $1 AND NOT ($2 = ANY(completed_units))",
            enrollment_id,
            unit_id,
        )
        .await
    }

    async fn update_progress(&self, enrollment_id: Uuid, progress: i32) -> StoreResult<()> {
        sqlx::query("UPDATE enrollments SET progress = $2, updated_at = $3 WHERE id = $1")
            .bind(enrollment_id)
            .bind(progress)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_enrollments_for(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_enrollments_by_course(&self, course_id: Uuid) -> StoreResult<u64> {
        self.execute_delete("DELETE FROM enrollments WHERE course_id = $1", course_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_unknown_access_type_is_corrupt() {
        let now = Utc::now();
        let row = CourseRow {
            id: Uuid::new_v4(),
            title: "Rust".into(),
            description: String::new(),
            author: Uuid::new_v4(),
            chapters: vec![],
            enrolled_users: vec![],
            access_type: "members".into(),
            access_key: None,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(Course::try_from(row), Err(StoreError::Corrupt { .. })));
    }

    // Requires a running PostgreSQL at DATABASE_URL
    #[tokio::test]
    #[ignore]
    async fn test_push_is_idempotent_against_postgres() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PgStore::connect(&url, Duration::from_secs(5)).await.unwrap();

        let user = store
            .insert_user(User::new(
                format!("pg-{}", Uuid::new_v4()),
                format!("{}@example.com", Uuid::new_v4()),
                "hash".into(),
            ))
            .await
            .unwrap();
        let course_id = Uuid::new_v4();
        store.push_created_course(user.id, course_id).await.unwrap();
        store.push_created_course(user.id, course_id).await.unwrap();

        let user = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(user.created_courses, vec![course_id]);

        store.pull_created_course(user.id, course_id).await.unwrap();
        store.pull_created_course(user.id, course_id).await.unwrap();
        let user = store.find_user(user.id).await.unwrap().unwrap();
        assert!(user.created_courses.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_unit_contents_survive_jsonb() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PgStore::connect(&url, Duration::from_secs(5)).await.unwrap();

        let contents = vec![ContentItem::text("hello", 2), ContentItem::quiz(1)];
        let unit = store
            .insert_unit(Unit::new(Uuid::new_v4(), "U".into(), 1, contents.clone()))
            .await
            .unwrap();
        let loaded = store.find_unit(unit.id).await.unwrap().unwrap();
        assert_eq!(loaded.contents, contents);
        assert_eq!(store.delete_unit(unit.id).await.unwrap(), 1);
    }
}
