//! Cascade delete of a populated course

#[macro_use]
mod common;

use pretty_assertions::assert_eq;
use uuid::Uuid;

use common::*;
use coursetree::backend::courses::cascade::{delete_course, DeleteOutcome, DeleteSummary};
use coursetree::backend::courses::{enrollment, quiz};
use coursetree::backend::error::BackendError;
use coursetree::backend::store::{EntityStore, MemoryStore, StoreOp};
use coursetree::shared::model::{Course, Enrollment, User};
use coursetree::shared::tree::NewQuiz;

struct Populated {
    author: User,
    course: Course,
    students: Vec<User>,
    unit_ids: Vec<Uuid>,
    /// An enrollment of the first student in an unrelated course
    other_enrollment: Enrollment,
}

/// Course with one chapter, two units, a quiz and two enrolled students
async fn populate(store: &MemoryStore) -> Populated {
    let author = seed_user(store, "author").await;
    let (course, report) = seed_course(store, &author, &scenario_tree()).await;
    let unit_ids = report.chapters[0].units.clone();
    let question = NewQuiz {
        question: "Which trait enables `?` on Option?".to_string(),
        options: vec!["Try".to_string(), "From".to_string()],
        correct_answer_index: 0,
    };
    assert_ok!(quiz::add_quiz(store, unit_ids[0], author.id, &question).await);

    let mut students = Vec::new();
    for name in ["ana", "bo"] {
        let student = seed_user(store, name).await;
        assert_ok!(enrollment::enroll(store, course.id, student.id).await);
        students.push(student);
    }

    let (other, _) = seed_course(store, &author, &tree(vec![])).await;
    let other_enrollment = assert_ok!(enrollment::enroll(store, other.id, students[0].id).await);

    Populated {
        author,
        course,
        students,
        unit_ids,
        other_enrollment,
    }
}

/// Nothing left anywhere that points at the deleted course
async fn assert_fully_removed(store: &MemoryStore, fixture: &Populated) {
    let course_id = fixture.course.id;
    assert!(assert_ok!(store.find_course(course_id).await).is_none());
    assert!(assert_ok!(store.find_chapters_by_course(course_id).await).is_empty());
    for unit_id in &fixture.unit_ids {
        assert!(assert_ok!(store.find_unit(*unit_id).await).is_none());
        assert!(assert_ok!(store.find_quizzes_by_unit(*unit_id).await).is_empty());
    }
    assert!(assert_ok!(store.find_enrollments_by_course(course_id).await).is_empty());

    let author = reload_user(store, fixture.author.id).await;
    assert!(!author.created_courses.contains(&course_id));
    assert_eq!(author.created_courses.len(), 1);

    let first = reload_user(store, fixture.students[0].id).await;
    assert_eq!(first.enrolled_courses, vec![fixture.other_enrollment.id]);
    let second = reload_user(store, fixture.students[1].id).await;
    assert!(second.enrolled_courses.is_empty());
}

#[tokio::test]
async fn delete_removes_everything_that_references_the_course() {
    let store = MemoryStore::new();
    let fixture = populate(&store).await;

    let outcome = assert_ok!(delete_course(&store, fixture.course.id, fixture.author.id).await);

    assert_eq!(
        outcome,
        DeleteOutcome::Deleted(DeleteSummary {
            chapters: 1,
            units: 2,
            quizzes: 1,
            enrollments: 2,
        })
    );
    assert_fully_removed(&store, &fixture).await;
}

#[tokio::test]
async fn deleting_twice_is_a_no_op() {
    let store = MemoryStore::new();
    let fixture = populate(&store).await;

    assert_ok!(delete_course(&store, fixture.course.id, fixture.author.id).await);
    let again = assert_ok!(delete_course(&store, fixture.course.id, fixture.author.id).await);

    assert_eq!(again, DeleteOutcome::AlreadyDeleted);
    assert_fully_removed(&store, &fixture).await;
}

#[tokio::test]
async fn only_the_author_may_delete() {
    let store = MemoryStore::new();
    let fixture = populate(&store).await;

    assert_err!(
        delete_course(&store, fixture.course.id, fixture.students[0].id).await,
        BackendError::Forbidden { .. }
    );
    assert!(assert_ok!(store.find_course(fixture.course.id).await).is_some());
    assert_eq!(assert_ok!(store.find_enrollments_by_course(fixture.course.id).await).len(), 2);
}

#[tokio::test]
async fn interrupted_delete_resumes_from_the_top() {
    let steps = [
        StoreOp::DeleteQuizzes,
        StoreOp::DeleteUnits,
        StoreOp::DeleteChapters,
        StoreOp::DeleteEnrollments,
        StoreOp::PullReference,
        StoreOp::DeleteCourse,
    ];

    for op in steps {
        let store = MemoryStore::new();
        let fixture = populate(&store).await;

        store.fail_next(op);
        assert_err!(delete_course(&store, fixture.course.id, fixture.author.id).await);
        assert!(
            assert_ok!(store.find_course(fixture.course.id).await).is_some(),
            "course row must survive a failure at {:?}",
            op
        );

        let retried = assert_ok!(delete_course(&store, fixture.course.id, fixture.author.id).await);
        assert!(matches!(retried, DeleteOutcome::Deleted(_)), "retry after {:?}", op);
        assert_fully_removed(&store, &fixture).await;
    }
}

#[tokio::test]
async fn enrollment_rows_missing_from_the_course_list_are_still_cleaned() {
    let store = MemoryStore::new();
    let author = seed_user(&store, "author").await;
    let (course, _) = seed_course(&store, &author, &tree(vec![])).await;
    let student = seed_user(&store, "student").await;

    // Row and user view written, course list never updated
    let row = assert_ok!(store.insert_enrollment(Enrollment::new(student.id, course.id)).await);
    assert_ok!(store.push_enrolled_course(student.id, row.id).await);

    let outcome = assert_ok!(delete_course(&store, course.id, author.id).await);

    assert_eq!(
        outcome,
        DeleteOutcome::Deleted(DeleteSummary {
            enrollments: 1,
            ..Default::default()
        })
    );
    assert!(reload_user(&store, student.id).await.enrolled_courses.is_empty());
}

#[tokio::test]
async fn missing_course_reports_already_deleted() {
    let store = MemoryStore::new();
    let author = seed_user(&store, "author").await;
    assert_eq!(
        assert_ok!(delete_course(&store, Uuid::new_v4(), author.id).await),
        DeleteOutcome::AlreadyDeleted
    );
}
