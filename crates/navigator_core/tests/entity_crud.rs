use navigator_core::db::open_db_in_memory;
use navigator_core::{
    CrudService, EntityKind, Exam, ExamRepository, ModelValidationError, RepoError, ServiceError,
    SqliteExamRepository, SqliteStudentRepository, SqliteSubjectRepository, Student,
    StudentRepository, StudentService, Subject, SubjectRepository, SubjectService,
};
use uuid::Uuid;

#[test]
fn subject_create_get_update_delete() {
    let conn = open_db_in_memory().unwrap();
    let service = SubjectService::new(SqliteSubjectRepository::try_new(&conn).unwrap());

    let created = service.create("  Linear   Algebra ".to_string()).unwrap();
    assert_eq!(created.name, "Linear Algebra");
    assert_eq!(service.get(created.id).unwrap(), created);

    let renamed = service.update(created.id, "Calculus".to_string()).unwrap();
    assert_eq!(renamed.name, "Calculus");
    assert_eq!(service.get(created.id).unwrap().name, "Calculus");

    service.delete(created.id).unwrap();
    assert!(matches!(
        service.get(created.id).unwrap_err(),
        ServiceError::NotFound {
            kind: EntityKind::Subject,
            ..
        }
    ));
}

#[test]
fn subject_blank_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = SubjectService::new(SqliteSubjectRepository::try_new(&conn).unwrap());

    let err = service.create("   ".to_string()).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ModelValidationError::BlankName(EntityKind::Subject))
    ));
    assert_eq!(err.code(), "invalid_input");
}

#[test]
fn subject_missing_ids_fail_with_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = SubjectService::new(SqliteSubjectRepository::try_new(&conn).unwrap());
    let missing = Uuid::new_v4();

    for err in [
        service.update(missing, "Physics".to_string()).unwrap_err(),
        service.delete(missing).unwrap_err(),
    ] {
        match err {
            ServiceError::NotFound { kind, id } => {
                assert_eq!(kind, EntityKind::Subject);
                assert_eq!(id, missing);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn create_many_is_atomic() {
    let conn = open_db_in_memory().unwrap();
    let service = SubjectService::new(SqliteSubjectRepository::try_new(&conn).unwrap());

    let created = service
        .create_many(&["Math".to_string(), "art".to_string(), "Biology".to_string()])
        .unwrap();
    assert_eq!(created.len(), 3);

    let listed: Vec<String> = service
        .list()
        .unwrap()
        .into_iter()
        .map(|subject| subject.name)
        .collect();
    assert_eq!(listed, vec!["art", "Biology", "Math"]);

    let err = service
        .create_many(&["Chemistry".to_string(), " ".to_string()])
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(service.list().unwrap().len(), 3);
}

#[test]
fn find_subjects_by_ids_omits_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubjectRepository::try_new(&conn).unwrap();
    let math = Subject::new("Math").unwrap();
    repo.create_subject(&math).unwrap();

    let found = repo
        .find_subjects_by_ids(&[Uuid::new_v4(), math.id])
        .unwrap();
    assert_eq!(found, vec![math]);
    assert!(repo.find_subjects_by_ids(&[]).unwrap().is_empty());
}

#[test]
fn exam_reads_carry_owning_subject() {
    let conn = open_db_in_memory().unwrap();
    let subjects = SqliteSubjectRepository::try_new(&conn).unwrap();
    let exams = SqliteExamRepository::try_new(&conn).unwrap();

    let math = Subject::new("Math").unwrap();
    subjects.create_subject(&math).unwrap();
    let final_exam = Exam::new("Math Final", math.clone()).unwrap();
    exams.create_exam(&final_exam).unwrap();

    let loaded = exams.get_exam(final_exam.id).unwrap().unwrap();
    assert_eq!(loaded.subject, math);
    assert_eq!(
        exams.find_exam_by_subject(math.id).unwrap(),
        Some(final_exam.clone())
    );
    assert_eq!(
        exams
            .find_exams_by_ids(&[final_exam.id, Uuid::new_v4()])
            .unwrap(),
        vec![final_exam]
    );
}

#[test]
fn persisted_invalid_uuid_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO subjects (uuid, name) VALUES ('not-a-uuid', 'Broken');",
        [],
    )
    .unwrap();
    let repo = SqliteSubjectRepository::try_new(&conn).unwrap();

    match repo.list_subjects().unwrap_err() {
        RepoError::InvalidData(message) => assert!(message.contains("subjects.uuid")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn student_create_with_and_without_name() {
    let conn = open_db_in_memory().unwrap();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());

    let named = service.create(Some("Ada".to_string())).unwrap();
    let anonymous = service.create(Some("  ".to_string())).unwrap();

    assert_eq!(service.get(named.id).unwrap().name.as_deref(), Some("Ada"));
    assert_eq!(service.get(anonymous.id).unwrap().name, None);
    assert_eq!(service.list().unwrap().len(), 2);
}

#[test]
fn student_update_ignores_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn).unwrap());
    let student = service.create(Some("Ada".to_string())).unwrap();

    let unchanged = service.update(student.id, Some(" ".to_string())).unwrap();
    assert_eq!(unchanged.name.as_deref(), Some("Ada"));

    let renamed = service
        .update(student.id, Some("Grace Hopper".to_string()))
        .unwrap();
    assert_eq!(renamed.name.as_deref(), Some("Grace Hopper"));

    assert!(matches!(
        service.update(Uuid::new_v4(), None).unwrap_err(),
        ServiceError::NotFound {
            kind: EntityKind::Student,
            ..
        }
    ));
}

#[test]
fn deleting_subject_cascades_to_exam_and_enrollments() {
    let conn = open_db_in_memory().unwrap();
    let subjects = SqliteSubjectRepository::try_new(&conn).unwrap();
    let exams = SqliteExamRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let math = Subject::new("Math").unwrap();
    let art = Subject::new("Art").unwrap();
    subjects.create_subjects(&[math.clone(), art.clone()]).unwrap();
    let math_final = Exam::new("Math Final", math.clone()).unwrap();
    exams.create_exam(&math_final).unwrap();

    let mut student = Student::new(Some("Ada"));
    student.subject_ids.extend([math.id, art.id]);
    student.exam_ids.insert(math_final.id);
    students.create_student(&student).unwrap();

    subjects.delete_subject(math.id).unwrap();

    assert_eq!(exams.get_exam(math_final.id).unwrap(), None);
    let reloaded = students.get_student(student.id).unwrap().unwrap();
    assert_eq!(reloaded.subject_ids.into_iter().collect::<Vec<_>>(), vec![art.id]);
    assert!(reloaded.exam_ids.is_empty());
}

#[test]
fn reverse_lookups_query_enrollment_rows() {
    let conn = open_db_in_memory().unwrap();
    let subjects = SqliteSubjectRepository::try_new(&conn).unwrap();
    let exams = SqliteExamRepository::try_new(&conn).unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let math = Subject::new("Math").unwrap();
    let art = Subject::new("Art").unwrap();
    subjects.create_subjects(&[math.clone(), art.clone()]).unwrap();
    let math_final = Exam::new("Math Final", math.clone()).unwrap();
    exams.create_exam(&math_final).unwrap();

    let mut ada = Student::new(Some("Ada"));
    ada.subject_ids.insert(math.id);
    ada.exam_ids.insert(math_final.id);
    let mut grace = Student::new(Some("Grace"));
    grace.subject_ids.extend([math.id, art.id]);
    repo.create_student(&ada).unwrap();
    repo.create_student(&grace).unwrap();

    let service = StudentService::new(repo);
    let mut in_math: Vec<_> = service
        .list_students_in_subject(math.id)
        .unwrap()
        .into_iter()
        .map(|student| student.id)
        .collect();
    in_math.sort();
    let mut expected = vec![ada.id, grace.id];
    expected.sort();
    assert_eq!(in_math, expected);

    let in_art = service.list_students_in_subject(art.id).unwrap();
    assert_eq!(in_art.len(), 1);
    assert_eq!(in_art[0].id, grace.id);

    let in_exam = service.list_students_in_exam(math_final.id).unwrap();
    assert_eq!(in_exam.len(), 1);
    assert_eq!(in_exam[0], ada);
}

#[test]
fn save_student_replaces_enrollment_rows() {
    let conn = open_db_in_memory().unwrap();
    let subjects = SqliteSubjectRepository::try_new(&conn).unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let math = Subject::new("Math").unwrap();
    subjects.create_subject(&math).unwrap();

    let mut student = Student::new(None);
    let saved = repo.save_student(&student).unwrap();
    assert_eq!(saved, student);

    student.subject_ids.insert(math.id);
    student.name = Some("Ada".to_string());
    let saved = repo.save_student(&student).unwrap();
    assert_eq!(saved, student);
    assert_eq!(repo.list_students().unwrap(), vec![student]);
}

#[test]
fn batch_lookups_span_multiple_statements() {
    let conn = open_db_in_memory().unwrap();
    let subjects = SqliteSubjectRepository::try_new(&conn).unwrap();
    let exams = SqliteExamRepository::try_new(&conn).unwrap();

    let math = Subject::new("Math").unwrap();
    let art = Subject::new("Art").unwrap();
    subjects.create_subjects(&[math.clone(), art.clone()]).unwrap();
    let art_final = Exam::new("Art Final", art.clone()).unwrap();
    exams.create_exam(&art_final).unwrap();

    let mut subject_ids: Vec<Uuid> = vec![math.id];
    subject_ids.extend((0..1_200).map(|_| Uuid::new_v4()));
    subject_ids.push(art.id);
    let mut found = subjects.find_subjects_by_ids(&subject_ids).unwrap();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(found, vec![art, math]);

    let mut exam_ids: Vec<Uuid> = (0..1_200).map(|_| Uuid::new_v4()).collect();
    exam_ids.push(art_final.id);
    assert_eq!(exams.find_exams_by_ids(&exam_ids).unwrap(), vec![art_final]);
}

#[test]
fn failed_batch_create_rolls_back_earlier_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSubjectRepository::try_new(&conn).unwrap();

    let math = Subject::new("Math").unwrap();
    let duplicate = Subject::with_id(math.id, "Math again").unwrap();
    let art = Subject::new("Art").unwrap();

    let err = repo
        .create_subjects(&[art.clone(), math, duplicate])
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.list_subjects().unwrap().is_empty());
    assert_eq!(repo.get_subject(art.id).unwrap(), None);
}
