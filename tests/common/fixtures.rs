//! Store fixtures
//!
//! Every test gets its own `MemoryStore`. Helpers seed users and courses and
//! read back the persisted shape of a course so tests can compare it with
//! what they submitted.

use std::sync::Arc;

use uuid::Uuid;

use coursetree::backend::auth::sessions::create_token;
use coursetree::backend::courses::reconcile::{self, ReconcileReport};
use coursetree::backend::store::{EntityStore, MemoryStore, SharedStore};
use coursetree::shared::config::AppConfig;
use coursetree::shared::model::{ContentItem, Course, User};
use coursetree::shared::tree::{ChapterNode, CourseTreeRequest, UnitNode};

/// Configuration with the cheapest bcrypt cost
pub fn test_config() -> AppConfig {
    AppConfig::builder()
        .jwt_secret("integration-test-secret".to_string())
        .bcrypt_cost(4)
        .build()
        .expect("test config is valid")
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// The same store behind the trait object the server takes
pub fn shared(store: &Arc<MemoryStore>) -> SharedStore {
    store.clone()
}

pub async fn seed_user(store: &MemoryStore, name: &str) -> User {
    let user = User::new(name.to_string(), format!("{}@example.com", name), String::new());
    store.insert_user(user).await.expect("insert user")
}

pub fn token_for(user: &User, config: &AppConfig) -> String {
    create_token(user.id, user.email.clone(), &config.jwt_secret).expect("sign token")
}

pub fn unit(title: &str, order: i32) -> UnitNode {
    UnitNode {
        title: title.to_string(),
        order,
        contents: vec![ContentItem::text(format!("{} body", title), 1)],
        ..Default::default()
    }
}

pub fn chapter(title: &str, units: Vec<UnitNode>) -> ChapterNode {
    ChapterNode {
        title: title.to_string(),
        units,
        ..Default::default()
    }
}

pub fn tree(chapters: Vec<ChapterNode>) -> CourseTreeRequest {
    CourseTreeRequest {
        title: "Rust in Practice".to_string(),
        description: Some("Ownership to async".to_string()),
        chapters,
        ..Default::default()
    }
}

/// Chapter A holding U1 and U2
pub fn scenario_tree() -> CourseTreeRequest {
    tree(vec![chapter("A", vec![unit("U1", 1), unit("U2", 2)])])
}

pub async fn seed_course(store: &MemoryStore, author: &User, submitted: &CourseTreeRequest) -> (Course, ReconcileReport) {
    reconcile::create_course(store, author.id, submitted)
        .await
        .expect("create course")
}

/// Copy the ids a reconciliation resolved back onto the submitted tree
pub fn with_resolved_ids(submitted: &CourseTreeRequest, report: &ReconcileReport) -> CourseTreeRequest {
    let mut resubmit = submitted.clone();
    for (node, resolved) in resubmit.chapters.iter_mut().zip(&report.chapters) {
        node.id = Some(resolved.id);
        for (unit, id) in node.units.iter_mut().zip(&resolved.units) {
            unit.id = Some(*id);
        }
    }
    resubmit
}

/// Chapter ids stored for the course, with each chapter's stored unit ids
///
/// Read through the foreign keys, so rows the course no longer references
/// show up too.
pub async fn persisted_shape(store: &MemoryStore, course_id: Uuid) -> Vec<(Uuid, Vec<Uuid>)> {
    let mut shape = Vec::new();
    for chapter in store.find_chapters_by_course(course_id).await.expect("chapters") {
        let units = store
            .find_units_by_chapter(chapter.id)
            .await
            .expect("units")
            .iter()
            .map(|u| u.id)
            .collect();
        shape.push((chapter.id, units));
    }
    shape
}

pub async fn reload_course(store: &MemoryStore, course_id: Uuid) -> Course {
    store
        .find_course(course_id)
        .await
        .expect("find course")
        .expect("course exists")
}

pub async fn reload_user(store: &MemoryStore, user_id: Uuid) -> User {
    store
        .find_user(user_id)
        .await
        .expect("find user")
        .expect("user exists")
}
