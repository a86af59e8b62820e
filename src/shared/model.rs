/**
 * Course Platform Entities
 *
 * This module defines the persisted entities of the course platform. Every
 * entity lives in its own collection and refers to other entities only by
 * identifier; nothing embeds another entity by value.
 *
 * # Reference Arrays
 *
 * Parents keep denormalized arrays of their children's identifiers
 * (`Course::chapters`, `Chapter::units`, `User::created_courses`,
 * `User::enrolled_courses`, `Course::enrolled_users`). These arrays are
 * maintained separately from the children's own foreign-key fields and may
 * briefly disagree with them after a partial write; readers must tolerate
 * that.
 */
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Avatar assigned to users who never uploaded one
pub const DEFAULT_PROFILE_PICTURE: &str =
    "https://upload.wikimedia.org/wikipedia/commons/a/ac/Default_pfp.jpg";

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,
    /// Display name (unique)
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// bcrypt hash, never sent to clients
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Profile picture URL
    pub profile_picture: String,
    /// Courses authored by this user (set semantics)
    pub created_courses: Vec<Uuid>,
    /// Enrollment rows belonging to this user
    pub enrolled_courses: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with empty reference arrays
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            profile_picture: DEFAULT_PROFILE_PICTURE.to_string(),
            created_courses: Vec::new(),
            enrolled_courses: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Who may see a course
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    #[default]
    Public,
    Private,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Public => "public",
            AccessType::Private => "private",
        }
    }

}

impl FromStr for AccessType {
    type Err = SharedError;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(AccessType::Public),
            "private" => Ok(AccessType::Private),
            _ => Err(SharedError::validation("access_type", format!("unknown access type '{}'", s))),
        }
    }
}

/// A course and its reference arrays
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Author's user ID, fixed at creation
    pub author: Uuid,
    /// Chapter IDs in display order
    pub chapters: Vec<Uuid>,
    /// User IDs of everyone enrolled
    pub enrolled_users: Vec<Uuid>,
    pub access_type: AccessType,
    /// Join key for private courses, never sent to clients
    #[serde(skip_serializing, default)]
    pub access_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn new(author: Uuid, fields: CourseFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            author,
            chapters: Vec::new(),
            enrolled_users: Vec::new(),
            access_type: fields.access_type,
            access_key: fields.access_key,
            created_at: now,
            updated_at: now,
        }
    }

    /// Scalar fields that a tree submission may overwrite
    pub fn fields(&self) -> CourseFields {
        CourseFields {
            title: self.title.clone(),
            description: self.description.clone(),
            access_type: self.access_type,
            access_key: self.access_key.clone(),
        }
    }
}

/// Mutable scalar fields of a course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
    pub access_type: AccessType,
    pub access_key: Option<String>,
}

/// A chapter inside one course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    /// Owning course, fixed at creation
    pub course_id: Uuid,
    /// Unit IDs in display order
    pub units: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    pub fn new(title: String, course_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            course_id,
            units: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload of a content item
///
/// Every kind except `quiz` carries a `data` payload; the quiz tag only
/// signals that quiz rows exist for the unit (they live in their own
/// collection, keyed by unit ID).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentKind {
    Text { data: String },
    Image { data: String },
    Video { data: String },
    Quiz,
}

/// One entry of a unit's content sequence
///
/// `order` drives display ordering. It is not unique; duplicates keep their
/// submitted relative order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentItem {
    #[serde(flatten)]
    pub kind: ContentKind,
    pub order: i32,
}

impl ContentItem {
    pub fn text(data: impl Into<String>, order: i32) -> Self {
        Self { kind: ContentKind::Text { data: data.into() }, order }
    }

    pub fn quiz(order: i32) -> Self {
        Self { kind: ContentKind::Quiz, order }
    }
}

/// A unit inside one chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Unit {
    pub id: Uuid,
    /// Owning chapter, fixed at creation
    pub chapter_id: Uuid,
    pub title: String,
    /// Display order among the chapter's units
    pub order: i32,
    pub contents: Vec<ContentItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    pub fn new(chapter_id: Uuid, title: String, order: i32, contents: Vec<ContentItem>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            chapter_id,
            title,
            order,
            contents,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a resubmission would change anything
    pub fn differs_from(&self, title: &str, order: i32, contents: &[ContentItem]) -> bool {
        self.title != title || self.order != order || self.contents != contents
    }
}

/// A multiple-choice question attached to a unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quiz {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`
    pub correct_answer_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(unit_id: Uuid, question: String, options: Vec<String>, correct_answer_index: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            unit_id,
            question,
            options,
            correct_answer_index,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user's enrollment in a course
///
/// The store does not enforce one row per (user, course); callers must look
/// for an existing row before inserting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    /// Completion percentage, 0 to 100
    pub progress: i32,
    pub completed_units: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(user_id: Uuid, course_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            progress: 0,
            completed_units: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_item_needs_no_data() {
        let item: ContentItem = serde_json::from_str(r#"{"type":"quiz","order":3}"#).unwrap();
        assert_eq!(item, ContentItem::quiz(3));
    }

    #[test]
    fn test_text_item_requires_data() {
        let result: Result<ContentItem, _> = serde_json::from_str(r#"{"type":"text","order":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_item_type_rejected() {
        let result: Result<ContentItem, _> =
            serde_json::from_str(r#"{"type":"audio","data":"x","order":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_content_item_wire_shape() {
        let item = ContentItem {
            kind: ContentKind::Video { data: "https://cdn/v.mp4".to_string() },
            order: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["data"], "https://cdn/v.mp4");
        assert_eq!(json["order"], 2);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("ada".into(), "ada@example.com".into(), "$2b$hash".into());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["profile_picture"], DEFAULT_PROFILE_PICTURE);
    }

    #[test]
    fn test_access_type_parsing() {
        assert_eq!("PRIVATE".parse::<AccessType>().unwrap(), AccessType::Private);
        assert_eq!("public".parse::<AccessType>().unwrap(), AccessType::Public);
        assert!(matches!(
            "secret".parse::<AccessType>(),
            Err(SharedError::ValidationError { ref field, .. }) if field == "access_type"
        ));
        assert_eq!(AccessType::default().as_str(), "public");
    }

    #[test]
    fn test_unit_differs_from() {
        let unit = Unit::new(Uuid::new_v4(), "U1".into(), 1, vec![ContentItem::text("hi", 1)]);
        assert!(!unit.differs_from("U1", 1, &[ContentItem::text("hi", 1)]));
        assert!(unit.differs_from("U1", 2, &[ContentItem::text("hi", 1)]));
        assert!(unit.differs_from("U1", 1, &[]));
    }
}
