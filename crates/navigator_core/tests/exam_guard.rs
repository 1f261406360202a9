use navigator_core::db::open_db_in_memory;
use navigator_core::{
    ensure_subject_available, CrudService, EntityKind, Exam, ExamId, ExamPatch, ExamRepository,
    ExamService, NewExam, RepoError, RepoResult, ServiceError, SqliteExamRepository,
    SqliteSubjectRepository, Subject, SubjectId, SubjectRepository,
};
use rusqlite::Connection;
use std::cell::Cell;
use uuid::Uuid;

fn exam_service(
    conn: &Connection,
) -> ExamService<SqliteExamRepository<'_>, SqliteSubjectRepository<'_>> {
    ExamService::new(
        SqliteExamRepository::try_new(conn).unwrap(),
        SqliteSubjectRepository::try_new(conn).unwrap(),
    )
}

fn seed_subject(conn: &Connection, name: &str) -> Subject {
    let subject = Subject::new(name).unwrap();
    SqliteSubjectRepository::try_new(conn)
        .unwrap()
        .create_subject(&subject)
        .unwrap();
    subject
}

#[test]
fn second_exam_for_subject_conflicts_and_is_not_persisted() {
    let conn = open_db_in_memory().unwrap();
    let service = exam_service(&conn);
    let math = seed_subject(&conn, "Math");

    let first = service
        .create(NewExam {
            subject_id: math.id,
            name: "Math Final".to_string(),
        })
        .unwrap();

    let err = service
        .create(NewExam {
            subject_id: math.id,
            name: "Math Retake".to_string(),
        })
        .unwrap_err();
    match err {
        ServiceError::Conflict {
            subject_id,
            existing_exam_id,
        } => {
            assert_eq!(subject_id, math.id);
            assert_eq!(existing_exam_id, first.id);
        }
        other => panic!("unexpected error: {other}"),
    }

    let exams = service.list().unwrap();
    assert_eq!(exams, vec![first]);
}

#[test]
fn exam_creation_requires_existing_subject() {
    let conn = open_db_in_memory().unwrap();
    let service = exam_service(&conn);
    let missing = Uuid::new_v4();

    let err = service
        .create(NewExam {
            subject_id: missing,
            name: "Ghost Final".to_string(),
        })
        .unwrap_err();
    match err {
        ServiceError::NotFound { kind, id } => {
            assert_eq!(kind, EntityKind::Subject);
            assert_eq!(id, missing);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn resaving_exam_with_its_own_subject_does_not_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = exam_service(&conn);
    let math = seed_subject(&conn, "Math");
    let exam = service
        .create(NewExam {
            subject_id: math.id,
            name: "Math Final".to_string(),
        })
        .unwrap();

    let updated = service
        .update(
            exam.id,
            ExamPatch {
                subject_id: Some(math.id),
                name: Some("Math Final (Spring)".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Math Final (Spring)");
    assert_eq!(updated.subject, math);
}

#[test]
fn moving_exam_onto_taken_subject_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let service = exam_service(&conn);
    let math = seed_subject(&conn, "Math");
    let art = seed_subject(&conn, "Art");
    let math_final = service
        .create(NewExam {
            subject_id: math.id,
            name: "Math Final".to_string(),
        })
        .unwrap();
    let art_final = service
        .create(NewExam {
            subject_id: art.id,
            name: "Art Final".to_string(),
        })
        .unwrap();

    let err = service
        .update(
            art_final.id,
            ExamPatch {
                subject_id: Some(math.id),
                name: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Conflict { existing_exam_id, .. } if existing_exam_id == math_final.id
    ));
    assert_eq!(service.get(art_final.id).unwrap().subject, art);
}

#[test]
fn exam_update_blank_name_keeps_current_name() {
    let conn = open_db_in_memory().unwrap();
    let service = exam_service(&conn);
    let math = seed_subject(&conn, "Math");
    let history = seed_subject(&conn, "History");
    let exam = service
        .create(NewExam {
            subject_id: math.id,
            name: "Final".to_string(),
        })
        .unwrap();

    let moved = service
        .update(
            exam.id,
            ExamPatch {
                subject_id: Some(history.id),
                name: Some("   ".to_string()),
            },
        )
        .unwrap();
    assert_eq!(moved.name, "Final");
    assert_eq!(service.get(exam.id).unwrap().subject, history);
}

#[test]
fn exam_update_and_delete_of_unknown_id_fail_with_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = exam_service(&conn);
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.update(missing, ExamPatch::default()).unwrap_err(),
        ServiceError::NotFound {
            kind: EntityKind::Exam,
            ..
        }
    ));
    assert!(matches!(
        service.delete(missing).unwrap_err(),
        ServiceError::NotFound {
            kind: EntityKind::Exam,
            ..
        }
    ));
}

#[test]
fn guard_ignores_the_exam_being_updated() {
    let conn = open_db_in_memory().unwrap();
    let service = exam_service(&conn);
    let math = seed_subject(&conn, "Math");
    let exam = service
        .create(NewExam {
            subject_id: math.id,
            name: "Math Final".to_string(),
        })
        .unwrap();

    let repo = SqliteExamRepository::try_new(&conn).unwrap();
    assert!(ensure_subject_available(&repo, math.id, Some(exam.id)).is_ok());
    assert!(ensure_subject_available(&repo, math.id, None).is_err());
    assert!(ensure_subject_available(&repo, Uuid::new_v4(), None).is_ok());
    assert_eq!(repo.find_exam_by_subject(math.id).unwrap(), Some(exam));
}

/// Exam repository whose first `stale_lookups` subject lookups miss, as if
/// another writer committed right after the guard ran.
struct StaleGuardRepo<'conn> {
    inner: SqliteExamRepository<'conn>,
    stale_lookups: Cell<u32>,
}

impl ExamRepository for StaleGuardRepo<'_> {
    fn create_exam(&self, exam: &Exam) -> RepoResult<ExamId> {
        self.inner.create_exam(exam)
    }

    fn update_exam(&self, exam: &Exam) -> RepoResult<()> {
        self.inner.update_exam(exam)
    }

    fn get_exam(&self, id: ExamId) -> RepoResult<Option<Exam>> {
        self.inner.get_exam(id)
    }

    fn list_exams(&self) -> RepoResult<Vec<Exam>> {
        self.inner.list_exams()
    }

    fn delete_exam(&self, id: ExamId) -> RepoResult<()> {
        self.inner.delete_exam(id)
    }

    fn find_exams_by_ids(&self, ids: &[ExamId]) -> RepoResult<Vec<Exam>> {
        self.inner.find_exams_by_ids(ids)
    }

    fn find_exam_by_subject(&self, subject_id: SubjectId) -> RepoResult<Option<Exam>> {
        if self.stale_lookups.get() > 0 {
            self.stale_lookups.set(self.stale_lookups.get() - 1);
            return Ok(None);
        }
        self.inner.find_exam_by_subject(subject_id)
    }
}

fn racing_exam_service(
    conn: &Connection,
) -> ExamService<StaleGuardRepo<'_>, SqliteSubjectRepository<'_>> {
    ExamService::new(
        StaleGuardRepo {
            inner: SqliteExamRepository::try_new(conn).unwrap(),
            stale_lookups: Cell::new(1),
        },
        SqliteSubjectRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn duplicate_insert_surfaces_subject_taken_from_repository() {
    let conn = open_db_in_memory().unwrap();
    let math = seed_subject(&conn, "Math");
    let repo = SqliteExamRepository::try_new(&conn).unwrap();
    repo.create_exam(&Exam::new("Math Final", math.clone()).unwrap())
        .unwrap();

    match repo
        .create_exam(&Exam::new("Math Retake", math.clone()).unwrap())
        .unwrap_err()
    {
        RepoError::SubjectTaken(subject_id) => assert_eq!(subject_id, math.id),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn create_that_loses_the_subject_race_reports_conflict() {
    let conn = open_db_in_memory().unwrap();
    let math = seed_subject(&conn, "Math");
    let winner = exam_service(&conn)
        .create(NewExam {
            subject_id: math.id,
            name: "Math Final".to_string(),
        })
        .unwrap();

    let err = racing_exam_service(&conn)
        .create(NewExam {
            subject_id: math.id,
            name: "Math Retake".to_string(),
        })
        .unwrap_err();

    assert_eq!(err.code(), "conflict");
    assert!(matches!(
        err,
        ServiceError::Conflict { subject_id, existing_exam_id }
            if subject_id == math.id && existing_exam_id == winner.id
    ));
    assert_eq!(exam_service(&conn).list().unwrap(), vec![winner]);
}

#[test]
fn move_that_loses_the_subject_race_reports_conflict() {
    let conn = open_db_in_memory().unwrap();
    let math = seed_subject(&conn, "Math");
    let art = seed_subject(&conn, "Art");
    let service = exam_service(&conn);
    let math_final = service
        .create(NewExam {
            subject_id: math.id,
            name: "Math Final".to_string(),
        })
        .unwrap();
    let art_final = service
        .create(NewExam {
            subject_id: art.id,
            name: "Art Final".to_string(),
        })
        .unwrap();

    let err = racing_exam_service(&conn)
        .update(
            art_final.id,
            ExamPatch {
                subject_id: Some(math.id),
                name: None,
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Conflict { existing_exam_id, .. } if existing_exam_id == math_final.id
    ));
    assert_eq!(service.get(art_final.id).unwrap().subject, art);
}
