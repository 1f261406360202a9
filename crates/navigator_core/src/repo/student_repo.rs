//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist student rows together with their enrollment join rows.
//! - Answer reverse lookups (students of a subject or exam) by query.
//!
//! # Invariants
//! - `save_student` writes the row and both enrollment sets in a single
//!   transaction; readers never observe a half-written student.
//! - Enrollment sets are returned in ascending id order.

use crate::model::exam::ExamId;
use crate::model::student::{Student, StudentId};
use crate::model::subject::SubjectId;
use crate::model::EntityKind;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Repository interface for student persistence.
pub trait StudentRepository {
    /// Inserts a new student with its current enrollment sets.
    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// Upserts the student row and replaces its enrollment rows with the
    /// given sets. Returns the representation read back from storage.
    fn save_student(&self, student: &Student) -> RepoResult<Student>;
    /// Overwrites the name only; enrollment rows are untouched.
    fn rename_student(&self, id: StudentId, name: Option<&str>) -> RepoResult<()>;
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
    fn list_students_by_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<Student>>;
    fn list_students_by_exam(&self, exam_id: ExamId) -> RepoResult<Vec<Student>>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["students", "student_subjects", "student_exams"])?;
        Ok(Self { conn })
    }

    fn load_students(&self, sql: &str, bind: &[String]) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(bind))?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let id = parse_uuid(&uuid_text, "students.uuid")?;
            students.push(Student {
                id,
                name: row.get("name")?,
                subject_ids: load_enrollment_ids(
                    self.conn,
                    "SELECT subject_uuid FROM student_subjects WHERE student_uuid = ?1;",
                    &uuid_text,
                    "student_subjects.subject_uuid",
                )?,
                exam_ids: load_enrollment_ids(
                    self.conn,
                    "SELECT exam_uuid FROM student_exams WHERE student_uuid = ?1;",
                    &uuid_text,
                    "student_exams.exam_uuid",
                )?,
            });
        }
        Ok(students)
    }

    fn write_enrollments(conn: &Connection, student: &Student) -> RepoResult<()> {
        let student_uuid = student.id.to_string();
        conn.execute(
            "DELETE FROM student_subjects WHERE student_uuid = ?1;",
            [student_uuid.as_str()],
        )?;
        conn.execute(
            "DELETE FROM student_exams WHERE student_uuid = ?1;",
            [student_uuid.as_str()],
        )?;

        let mut insert_subject = conn.prepare(
            "INSERT INTO student_subjects (student_uuid, subject_uuid) VALUES (?1, ?2);",
        )?;
        for subject_id in &student.subject_ids {
            insert_subject.execute(params![student_uuid.as_str(), subject_id.to_string()])?;
        }

        let mut insert_exam =
            conn.prepare("INSERT INTO student_exams (student_uuid, exam_uuid) VALUES (?1, ?2);")?;
        for exam_id in &student.exam_ids {
            insert_exam.execute(params![student_uuid.as_str(), exam_id.to_string()])?;
        }
        Ok(())
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO students (uuid, name) VALUES (?1, ?2);",
            params![student.id.to_string(), student.name.as_deref()],
        )?;
        Self::write_enrollments(&tx, student)?;
        tx.commit()?;
        Ok(student.id)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut students = self.load_students(
            "SELECT uuid, name FROM students WHERE uuid = ?1;",
            &[id.to_string()],
        )?;
        Ok(students.pop())
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        self.load_students(
            "SELECT uuid, name FROM students ORDER BY created_at ASC, uuid ASC;",
            &[],
        )
    }

    fn save_student(&self, student: &Student) -> RepoResult<Student> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO students (uuid, name) VALUES (?1, ?2)
             ON CONFLICT (uuid) DO UPDATE SET
                name = excluded.name,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![student.id.to_string(), student.name.as_deref()],
        )?;
        Self::write_enrollments(&tx, student)?;
        tx.commit()?;

        self.get_student(student.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("student {} missing after save", student.id))
        })
    }

    fn rename_student(&self, id: StudentId, name: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                name = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![name, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKind::Student, id));
        }
        Ok(())
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKind::Student, id));
        }
        Ok(())
    }

    fn list_students_by_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<Student>> {
        self.load_students(
            "SELECT st.uuid AS uuid, st.name AS name
             FROM students st
             INNER JOIN student_subjects ss ON ss.student_uuid = st.uuid
             WHERE ss.subject_uuid = ?1
             ORDER BY st.created_at ASC, st.uuid ASC;",
            &[subject_id.to_string()],
        )
    }

    fn list_students_by_exam(&self, exam_id: ExamId) -> RepoResult<Vec<Student>> {
        self.load_students(
            "SELECT st.uuid AS uuid, st.name AS name
             FROM students st
             INNER JOIN student_exams se ON se.student_uuid = st.uuid
             WHERE se.exam_uuid = ?1
             ORDER BY st.created_at ASC, st.uuid ASC;",
            &[exam_id.to_string()],
        )
    }
}

fn load_enrollment_ids(
    conn: &Connection,
    sql: &str,
    student_uuid: &str,
    column: &str,
) -> RepoResult<BTreeSet<Uuid>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query([student_uuid])?;
    let mut ids = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.insert(parse_uuid(&value, column)?);
    }
    Ok(ids)
}
