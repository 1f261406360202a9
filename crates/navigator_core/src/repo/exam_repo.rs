//! Exam repository contract and SQLite implementation.
//!
//! Exam reads join the owning subject, so every returned [`Exam`] carries
//! the subject's id and name.

use crate::model::exam::{Exam, ExamId};
use crate::model::subject::{Subject, SubjectId};
use crate::model::EntityKind;
use crate::repo::{
    ensure_connection_ready, id_params, in_placeholders, parse_uuid, RepoError, RepoResult,
    MAX_IDS_PER_QUERY,
};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};

const EXAM_SELECT_SQL: &str = "SELECT
    e.uuid AS uuid,
    e.name AS name,
    s.uuid AS subject_uuid,
    s.name AS subject_name
FROM exams e
INNER JOIN subjects s ON s.uuid = e.subject_uuid";

/// Repository interface for exam CRUD and lookups.
pub trait ExamRepository {
    fn create_exam(&self, exam: &Exam) -> RepoResult<ExamId>;
    /// Rewrites name and subject link.
    fn update_exam(&self, exam: &Exam) -> RepoResult<()>;
    fn get_exam(&self, id: ExamId) -> RepoResult<Option<Exam>>;
    fn list_exams(&self) -> RepoResult<Vec<Exam>>;
    /// Hard delete. Cascades to enrollment rows.
    fn delete_exam(&self, id: ExamId) -> RepoResult<()>;
    /// Returns the existing exams among `ids`; unknown ids are omitted.
    fn find_exams_by_ids(&self, ids: &[ExamId]) -> RepoResult<Vec<Exam>>;
    /// Returns the exam owned by `subject_id`, if any.
    fn find_exam_by_subject(&self, subject_id: SubjectId) -> RepoResult<Option<Exam>>;
}

/// SQLite-backed exam repository.
pub struct SqliteExamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExamRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["subjects", "exams"])?;
        Ok(Self { conn })
    }

    fn query_exams(&self, sql: &str, bind: Vec<String>) -> RepoResult<Vec<Exam>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind))?;
        let mut exams = Vec::new();
        while let Some(row) = rows.next()? {
            exams.push(parse_exam_row(row)?);
        }
        Ok(exams)
    }
}

impl ExamRepository for SqliteExamRepository<'_> {
    fn create_exam(&self, exam: &Exam) -> RepoResult<ExamId> {
        exam.validate()?;
        self.conn
            .execute(
                "INSERT INTO exams (uuid, name, subject_uuid) VALUES (?1, ?2, ?3);",
                params![
                    exam.id.to_string(),
                    exam.name.as_str(),
                    exam.subject_id().to_string(),
                ],
            )
            .map_err(|err| map_subject_taken(err, exam.subject_id()))?;
        Ok(exam.id)
    }

    fn update_exam(&self, exam: &Exam) -> RepoResult<()> {
        exam.validate()?;
        let changed = self
            .conn
            .execute(
                "UPDATE exams
                 SET
                    name = ?1,
                    subject_uuid = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?3;",
                params![
                    exam.name.as_str(),
                    exam.subject_id().to_string(),
                    exam.id.to_string(),
                ],
            )
            .map_err(|err| map_subject_taken(err, exam.subject_id()))?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKind::Exam, exam.id));
        }
        Ok(())
    }

    fn get_exam(&self, id: ExamId) -> RepoResult<Option<Exam>> {
        let exam = self
            .conn
            .query_row(
                &format!("{EXAM_SELECT_SQL} WHERE e.uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_exam_row(row)),
            )
            .optional()?;
        exam.transpose()
    }

    fn list_exams(&self) -> RepoResult<Vec<Exam>> {
        self.query_exams(
            &format!("{EXAM_SELECT_SQL} ORDER BY e.name COLLATE NOCASE ASC, e.uuid ASC;"),
            Vec::new(),
        )
    }

    fn delete_exam(&self, id: ExamId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM exams WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKind::Exam, id));
        }
        Ok(())
    }

    fn find_exams_by_ids(&self, ids: &[ExamId]) -> RepoResult<Vec<Exam>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut exams = Vec::new();
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            exams.extend(self.query_exams(
                &format!(
                    "{EXAM_SELECT_SQL} WHERE e.uuid IN ({}) ORDER BY e.uuid ASC;",
                    in_placeholders(chunk.len())
                ),
                id_params(chunk).collect(),
            )?);
        }
        Ok(exams)
    }

    fn find_exam_by_subject(&self, subject_id: SubjectId) -> RepoResult<Option<Exam>> {
        let mut exams = self.query_exams(
            &format!("{EXAM_SELECT_SQL} WHERE e.subject_uuid = ?1 ORDER BY e.uuid ASC;"),
            vec![subject_id.to_string()],
        )?;
        Ok(if exams.is_empty() {
            None
        } else {
            Some(exams.swap_remove(0))
        })
    }
}

/// Turns a unique-index violation on `exams.subject_uuid` into
/// [`RepoError::SubjectTaken`]; other errors pass through.
fn map_subject_taken(err: rusqlite::Error, subject_id: SubjectId) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == ErrorCode::ConstraintViolation
            && message.contains("exams.subject_uuid")
        {
            return RepoError::SubjectTaken(subject_id);
        }
    }
    err.into()
}

fn parse_exam_row(row: &Row<'_>) -> RepoResult<Exam> {
    let uuid_text: String = row.get("uuid")?;
    let subject_uuid_text: String = row.get("subject_uuid")?;
    let exam = Exam {
        id: parse_uuid(&uuid_text, "exams.uuid")?,
        name: row.get("name")?,
        subject: Subject {
            id: parse_uuid(&subject_uuid_text, "exams.subject_uuid")?,
            name: row.get("subject_name")?,
        },
    };
    exam.validate()?;
    Ok(exam)
}
