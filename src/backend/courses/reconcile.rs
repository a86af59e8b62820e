/**
 * Tree Reconciler
 *
 * Makes the persisted chapters and units of a course match a submitted
 * nested tree.
 *
 * # Matching
 *
 * A submitted node matches a persisted sibling only by id. A node without an
 * id, with an unknown id, or repeating an id already claimed earlier in the
 * same submission is inserted as a new row. Content is never used to match.
 *
 * # Pass Order
 *
 * 1. Load the course's persisted chapters (by `course_id`, not by the
 *    course's array, so unreferenced leftovers are found too).
 * 2. Per submitted chapter, in submission order: update or insert, then
 *    attach to the course. Kept chapters are re-attached, which heals an
 *    attach that failed on an earlier attempt.
 * 3. Per chapter, the same for its units, then purge the chapter's units that
 *    were not kept (quizzes, then the reference, then the row).
 * 4. Purge chapters that were not kept (their units first, then the
 *    reference, then the row) and drop stale ids from the course's array.
 * 5. If attach left kept ids in their old slots, rewrite the array in
 *    submission order. Units get the same treatment at the end of step 3.
 *
 * Every step is idempotent, so a pass interrupted by a store failure is
 * finished by submitting the same tree again. There is no lock around the
 * pass; two concurrent submissions for the same course may interleave.
 */

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::backend::courses::backrefs::{attach, detach, BackRef};
use crate::backend::courses::ownership::ensure_owner;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{EntityStore, StoreResult};
use crate::shared::model::{Chapter, Course, Unit};
use crate::shared::tree::{ChapterNode, CourseTreeRequest, UnitNode};

/// What a reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub chapters_created: usize,
    pub chapters_updated: usize,
    pub chapters_deleted: usize,
    pub units_created: usize,
    pub units_updated: usize,
    pub units_deleted: usize,
    /// Resolved ids in submission order, for the client to resubmit with
    pub chapters: Vec<ResolvedChapter>,
}

impl ReconcileReport {
    /// Whether the pass inserted or deleted anything
    pub fn changed_structure(&self) -> bool {
        self.chapters_created + self.chapters_deleted + self.units_created + self.units_deleted > 0
    }
}

/// Chapter id and its unit ids after reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedChapter {
    pub id: Uuid,
    pub units: Vec<Uuid>,
}

/// Create a course for `author` from a full tree
///
/// The course is inserted and attached to the author before any chapter is
/// written, so a failure later in the pass leaves a reachable course that the
/// author can fix with an update.
pub async fn create_course(
    store: &dyn EntityStore,
    author: Uuid,
    tree: &CourseTreeRequest,
) -> BackendResult<(Course, ReconcileReport)> {
    tree.validate()?;
    if store.find_user(author).await?.is_none() {
        return Err(BackendError::not_found("User", author));
    }

    let course = store.insert_course(Course::new(author, tree.fields())).await?;
    tracing::debug!(course_id = %course.id, author = %author, "Inserted course");
    attach(store, BackRef::UserCreatedCourses, author, course.id).await?;

    let report = reconcile_tree(store, &course, &tree.chapters).await?;
    tracing::info!(
        course_id = %course.id,
        chapters = report.chapters_created,
        units = report.units_created,
        "Created course"
    );
    Ok((course, report))
}

/// Replace a course's scalar fields and content tree
pub async fn update_course(
    store: &dyn EntityStore,
    course_id: Uuid,
    principal: Uuid,
    tree: &CourseTreeRequest,
) -> BackendResult<ReconcileReport> {
    tree.validate()?;
    let course = ensure_owner(store, course_id, principal).await?;

    let fields = tree.fields();
    if course.fields() != fields {
        store.update_course_fields(course_id, &fields).await?;
        tracing::debug!(course_id = %course_id, "Updated course fields");
    }

    let report = reconcile_tree(store, &course, &tree.chapters).await?;
    tracing::info!(course_id = %course_id, report = ?report, "Reconciled course");
    Ok(report)
}

/// Run steps 1 to 4 against an existing course
pub async fn reconcile_tree(
    store: &dyn EntityStore,
    course: &Course,
    submitted: &[ChapterNode],
) -> StoreResult<ReconcileReport> {
    let mut report = ReconcileReport::default();

    let mut persisted: HashMap<Uuid, Chapter> = store
        .find_chapters_by_course(course.id)
        .await?
        .into_iter()
        .map(|chapter| (chapter.id, chapter))
        .collect();
    let mut kept: HashSet<Uuid> = HashSet::new();
    let mut ordered: Vec<Uuid> = Vec::with_capacity(submitted.len());

    for node in submitted {
        let title = node.title.trim();
        let claimed = node
            .id
            .filter(|id| !kept.contains(id))
            .and_then(|id| persisted.get(&id));

        let (chapter_id, stale_units) = match claimed {
            Some(existing) => {
                if existing.title != title {
                    store.update_chapter_title(existing.id, title).await?;
                    report.chapters_updated += 1;
                }
                (existing.id, existing.units.clone())
            }
            None => {
                let chapter = store.insert_chapter(Chapter::new(title.to_string(), course.id)).await?;
                tracing::debug!(course_id = %course.id, chapter_id = %chapter.id, "Inserted chapter");
                report.chapters_created += 1;
                (chapter.id, Vec::new())
            }
        };
        attach(store, BackRef::CourseChapters, course.id, chapter_id).await?;
        kept.insert(chapter_id);
        ordered.push(chapter_id);

        let units = reconcile_units(store, chapter_id, &stale_units, &node.units, &mut report).await?;
        report.chapters.push(ResolvedChapter { id: chapter_id, units });
    }

    persisted.retain(|id, _| !kept.contains(id));
    for chapter in persisted.values() {
        purge_chapter(store, course.id, chapter.id, &mut report).await?;
    }

    for id in &course.chapters {
        if !kept.contains(id) && !persisted.contains_key(id) {
            tracing::warn!(course_id = %course.id, chapter_id = %id, "Dropping stale chapter reference");
            detach(store, BackRef::CourseChapters, course.id, *id).await?;
        }
    }

    if after_attach(&course.chapters, &ordered) != ordered {
        store.set_course_chapters(course.id, &ordered).await?;
        tracing::debug!(course_id = %course.id, "Reordered chapters");
    }

    Ok(report)
}

/// The array attach and detach leave behind: surviving ids in their old
/// slots, then ids that were not referenced before
fn after_attach(referenced: &[Uuid], kept: &[Uuid]) -> Vec<Uuid> {
    let surviving = referenced.iter().filter(|id| kept.contains(id));
    let appended = kept.iter().filter(|id| !referenced.contains(id));
    let mut ids: Vec<Uuid> = Vec::with_capacity(kept.len());
    for id in surviving.chain(appended) {
        if !ids.contains(id) {
            ids.push(*id);
        }
    }
    ids
}

/// Reconcile one chapter's units; returns the kept unit ids in submission order
async fn reconcile_units(
    store: &dyn EntityStore,
    chapter_id: Uuid,
    referenced: &[Uuid],
    submitted: &[UnitNode],
    report: &mut ReconcileReport,
) -> StoreResult<Vec<Uuid>> {
    let mut persisted: HashMap<Uuid, Unit> = store
        .find_units_by_chapter(chapter_id)
        .await?
        .into_iter()
        .map(|unit| (unit.id, unit))
        .collect();
    let mut kept: Vec<Uuid> = Vec::with_capacity(submitted.len());

    for node in submitted {
        let title = node.title.trim();
        let claimed = node
            .id
            .filter(|id| !kept.contains(id))
            .and_then(|id| persisted.get(&id));

        let unit_id = match claimed {
            Some(existing) => {
                if existing.differs_from(title, node.order, &node.contents) {
                    store.update_unit(existing.id, title, node.order, &node.contents).await?;
                    report.units_updated += 1;
                }
                existing.id
            }
            None => {
                let unit = Unit::new(chapter_id, title.to_string(), node.order, node.contents.clone());
                let unit = store.insert_unit(unit).await?;
                tracing::debug!(chapter_id = %chapter_id, unit_id = %unit.id, "Inserted unit");
                report.units_created += 1;
                unit.id
            }
        };
        attach(store, BackRef::ChapterUnits, chapter_id, unit_id).await?;
        kept.push(unit_id);
    }

    persisted.retain(|id, _| !kept.contains(id));
    for unit_id in persisted.keys() {
        delete_quizzes_and_unit(store, chapter_id, *unit_id).await?;
        report.units_deleted += 1;
    }

    for id in referenced {
        if !kept.contains(id) && !persisted.contains_key(id) {
            tracing::warn!(chapter_id = %chapter_id, unit_id = %id, "Dropping stale unit reference");
            detach(store, BackRef::ChapterUnits, chapter_id, *id).await?;
        }
    }

    if after_attach(referenced, &kept) != kept {
        store.set_chapter_units(chapter_id, &kept).await?;
        tracing::debug!(chapter_id = %chapter_id, "Reordered units");
    }

    Ok(kept)
}

async fn delete_quizzes_and_unit(store: &dyn EntityStore, chapter_id: Uuid, unit_id: Uuid) -> StoreResult<()> {
    store.delete_quizzes_by_units(&[unit_id]).await?;
    detach(store, BackRef::ChapterUnits, chapter_id, unit_id).await?;
    store.delete_unit(unit_id).await?;
    tracing::debug!(chapter_id = %chapter_id, unit_id = %unit_id, "Deleted unit");
    Ok(())
}

/// Delete a chapter after its units, so no unit outlives its chapter
async fn purge_chapter(
    store: &dyn EntityStore,
    course_id: Uuid,
    chapter_id: Uuid,
    report: &mut ReconcileReport,
) -> StoreResult<()> {
    let unit_ids: Vec<Uuid> = store
        .find_units_by_chapter(chapter_id)
        .await?
        .iter()
        .map(|unit| unit.id)
        .collect();
    if !unit_ids.is_empty() {
        store.delete_quizzes_by_units(&unit_ids).await?;
        report.units_deleted += store.delete_units_by_chapters(&[chapter_id]).await? as usize;
    }
    detach(store, BackRef::CourseChapters, course_id, chapter_id).await?;
    store.delete_chapter(chapter_id).await?;
    report.chapters_deleted += 1;
    tracing::debug!(course_id = %course_id, chapter_id = %chapter_id, "Deleted chapter");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::MemoryStore;
    use crate::shared::model::{ContentItem, User};
    use assert_matches::assert_matches;

    async fn author(store: &MemoryStore) -> Uuid {
        store
            .insert_user(User::new("author".into(), "author@example.com".into(), String::new()))
            .await
            .unwrap()
            .id
    }

    fn unit(title: &str, order: i32) -> UnitNode {
        UnitNode { title: title.into(), order, ..Default::default() }
    }

    fn tree(chapters: Vec<ChapterNode>) -> CourseTreeRequest {
        CourseTreeRequest { title: "Rust".into(), chapters, ..Default::default() }
    }

    #[tokio::test]
    async fn test_create_attaches_course_to_author() {
        let store = MemoryStore::new();
        let author = author(&store).await;

        let (course, report) = create_course(&store, author, &tree(vec![])).await.unwrap();

        assert_eq!(report, ReconcileReport::default());
        let user = store.find_user(author).await.unwrap().unwrap();
        assert_eq!(user.created_courses, vec![course.id]);
    }

    #[tokio::test]
    async fn test_create_for_unknown_author_writes_nothing() {
        let store = MemoryStore::new();
        assert_matches!(
            create_course(&store, Uuid::new_v4(), &tree(vec![])).await,
            Err(BackendError::NotFound { entity: "User", .. })
        );
        assert_eq!(store.count_courses().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_tree_writes_nothing() {
        let store = MemoryStore::new();
        let author = author(&store).await;
        let bad = tree(vec![ChapterNode { title: "A".into(), units: vec![unit(" ", 1)], ..Default::default() }]);

        assert_matches!(create_course(&store, author, &bad).await, Err(BackendError::SharedError(_)));
        assert_eq!(store.count_courses().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unchanged_unit_is_not_rewritten() {
        let store = MemoryStore::new();
        let author = author(&store).await;
        let mut submitted = tree(vec![ChapterNode {
            title: "A".into(),
            units: vec![UnitNode {
                title: "U1".into(),
                order: 1,
                contents: vec![ContentItem::text("hello", 1)],
                ..Default::default()
            }],
            ..Default::default()
        }]);
        let (course, first) = create_course(&store, author, &submitted).await.unwrap();

        submitted.chapters[0].id = Some(first.chapters[0].id);
        submitted.chapters[0].units[0].id = Some(first.chapters[0].units[0]);
        let second = update_course(&store, course.id, author, &submitted).await.unwrap();

        assert_eq!(second.units_updated, 0);
        assert_eq!(second.chapters_updated, 0);
        assert!(!second.changed_structure());
    }

    #[tokio::test]
    async fn test_repeated_id_in_one_submission_is_inserted_fresh() {
        let store = MemoryStore::new();
        let author = author(&store).await;
        let (course, first) = create_course(
            &store,
            author,
            &tree(vec![ChapterNode { title: "A".into(), ..Default::default() }]),
        )
        .await
        .unwrap();
        let a = first.chapters[0].id;

        let report = update_course(
            &store,
            course.id,
            author,
            &tree(vec![
                ChapterNode { id: Some(a), title: "A".into(), ..Default::default() },
                ChapterNode { id: Some(a), title: "A again".into(), ..Default::default() },
            ]),
        )
        .await
        .unwrap();

        assert_eq!(report.chapters_created, 1);
        assert_eq!(report.chapters[0].id, a);
        assert_ne!(report.chapters[1].id, a);
        assert_eq!(store.find_chapters_by_course(course.id).await.unwrap().len(), 2);
    }

    #[test]
    fn test_after_attach_keeps_old_slots() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(after_attach(&[a, b], &[b, a]), vec![a, b]);
        assert_eq!(after_attach(&[a, b], &[a, c]), vec![a, c]);
        assert_eq!(after_attach(&[], &[c, a]), vec![c, a]);
    }

    #[tokio::test]
    async fn test_stale_chapter_reference_is_dropped() {
        let store = MemoryStore::new();
        let author = author(&store).await;
        let (course, _) = create_course(&store, author, &tree(vec![])).await.unwrap();
        let ghost = Uuid::new_v4();
        store.push_course_chapter(course.id, ghost).await.unwrap();

        update_course(&store, course.id, author, &tree(vec![])).await.unwrap();

        let course = store.find_course(course.id).await.unwrap().unwrap();
        assert!(course.chapters.is_empty());
    }
}
