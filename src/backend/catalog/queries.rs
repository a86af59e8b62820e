/**
 * Catalog Queries
 *
 * Read-only views over the store: the paginated course list, name/title
 * search, and user profiles with their created and enrolled courses.
 *
 * Profiles follow the user's reference arrays. An id that resolves to
 * nothing, or to a row that points at a different user, is skipped and
 * logged; partial writes elsewhere can leave such ids behind.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::EntityStore;
use crate::shared::error::SharedError;
use crate::shared::model::{Course, User};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// `?page=&limit=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// One page of courses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoursePage {
    pub total_courses: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub courses: Vec<Course>,
}

/// Course fields shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserHit {
    pub id: Uuid,
    pub name: String,
    pub profile_picture: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub users: Vec<UserHit>,
    pub courses: Vec<CourseSummary>,
}

/// A user's enrollment joined with its course
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrolledCourse {
    pub enrollment_id: Uuid,
    pub progress: i32,
    pub completed_units: Vec<Uuid>,
    pub course: CourseSummary,
    /// `None` if the author's row is gone
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture: String,
    pub created_courses: Vec<CourseSummary>,
    pub enrolled_courses: Vec<EnrolledCourse>,
}

/// Page through courses in creation order
pub async fn list_courses(store: &dyn EntityStore, query: PageQuery, max_limit: u64) -> BackendResult<CoursePage> {
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if page == 0 {
        return Err(SharedError::validation("page", "Page must be at least 1").into());
    }
    if limit == 0 || limit > max_limit {
        return Err(SharedError::validation("limit", format!("Limit must be between 1 and {}", max_limit)).into());
    }

    let skip = (page - 1).saturating_mul(limit);
    let courses = store.list_courses(skip, limit).await?;
    let total_courses = store.count_courses().await?;

    Ok(CoursePage {
        total_courses,
        total_pages: total_courses.div_ceil(limit),
        current_page: page,
        courses,
    })
}

/// Case-insensitive substring search over user names and course titles
///
/// A blank term matches nothing.
pub async fn search(store: &dyn EntityStore, term: &str) -> BackendResult<SearchResults> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(SearchResults::default());
    }

    let users = store
        .search_users(term)
        .await?
        .into_iter()
        .map(|user| UserHit {
            id: user.id,
            name: user.name,
            profile_picture: user.profile_picture,
        })
        .collect();
    let courses = store.search_courses(term).await?.iter().map(CourseSummary::from).collect();

    Ok(SearchResults { users, courses })
}

/// Load a user with created and enrolled courses resolved
pub async fn load_user_profile(store: &dyn EntityStore, user_id: Uuid) -> BackendResult<UserProfile> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User", user_id))?;

    let created_courses = created_courses(store, &user).await?;
    let enrolled_courses = enrolled_courses(store, &user).await?;

    Ok(UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
        profile_picture: user.profile_picture,
        created_courses,
        enrolled_courses,
    })
}

async fn created_courses(store: &dyn EntityStore, user: &User) -> BackendResult<Vec<CourseSummary>> {
    let mut courses = Vec::with_capacity(user.created_courses.len());
    for course_id in &user.created_courses {
        match store.find_course(*course_id).await? {
            Some(course) if course.author == user.id => courses.push(CourseSummary::from(&course)),
            _ => tracing::warn!(user_id = %user.id, course_id = %course_id, "Skipping dangling created course"),
        }
    }
    Ok(courses)
}

async fn enrolled_courses(store: &dyn EntityStore, user: &User) -> BackendResult<Vec<EnrolledCourse>> {
    let mut enrolled = Vec::with_capacity(user.enrolled_courses.len());
    for enrollment_id in &user.enrolled_courses {
        let enrollment = match store.find_enrollment(*enrollment_id).await? {
            Some(enrollment) if enrollment.user_id == user.id => enrollment,
            _ => {
                tracing::warn!(user_id = %user.id, enrollment_id = %enrollment_id, "Skipping dangling enrollment");
                continue;
            }
        };
        let Some(course) = store.find_course(enrollment.course_id).await? else {
            tracing::warn!(enrollment_id = %enrollment.id, course_id = %enrollment.course_id, "Enrollment course is gone");
            continue;
        };
        let author_name = store.find_user(course.author).await?.map(|author| author.name);

        enrolled.push(EnrolledCourse {
            enrollment_id: enrollment.id,
            progress: enrollment.progress,
            completed_units: enrollment.completed_units,
            course: CourseSummary::from(&course),
            author_name,
        });
    }
    Ok(enrolled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::MemoryStore;
    use crate::shared::model::{AccessType, CourseFields};
    use assert_matches::assert_matches;

    async fn seed_courses(store: &MemoryStore, titles: &[&str]) {
        let author = Uuid::new_v4();
        for title in titles {
            let fields = CourseFields {
                title: title.to_string(),
                description: String::new(),
                access_type: AccessType::Public,
                access_key: None,
            };
            store.insert_course(Course::new(author, fields)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_pagination_math() {
        let store = MemoryStore::new();
        seed_courses(&store, &["a", "b", "c", "d", "e"]).await;

        let page = list_courses(&store, PageQuery { page: Some(2), limit: Some(2) }, 100).await.unwrap();
        assert_eq!(page.total_courses, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        let titles: Vec<&str> = page.courses.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "d"]);
    }

    #[tokio::test]
    async fn test_pagination_defaults_and_bounds() {
        let store = MemoryStore::new();
        let page = list_courses(&store, PageQuery::default(), 100).await.unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 0);

        assert_matches!(
            list_courses(&store, PageQuery { page: Some(0), limit: None }, 100).await,
            Err(BackendError::SharedError(SharedError::ValidationError { .. }))
        );
        assert_matches!(
            list_courses(&store, PageQuery { page: None, limit: Some(101) }, 100).await,
            Err(BackendError::SharedError(SharedError::ValidationError { .. }))
        );
    }

    #[tokio::test]
    async fn test_blank_search_term_matches_nothing() {
        let store = MemoryStore::new();
        seed_courses(&store, &["Rust"]).await;
        assert_eq!(search(&store, "   ").await.unwrap(), SearchResults::default());
        assert_eq!(search(&store, "rUs").await.unwrap().courses.len(), 1);
    }
}
