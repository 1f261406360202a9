//! Subject repository contract and SQLite implementation.

use crate::model::subject::{Subject, SubjectId};
use crate::model::EntityKind;
use crate::repo::{
    ensure_connection_ready, id_params, in_placeholders, parse_uuid, RepoError, RepoResult,
    MAX_IDS_PER_QUERY,
};
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const SUBJECT_SELECT_SQL: &str = "SELECT uuid, name FROM subjects";

/// Repository interface for subject CRUD and batch lookup.
pub trait SubjectRepository {
    fn create_subject(&self, subject: &Subject) -> RepoResult<SubjectId>;
    /// Inserts all subjects in one transaction; nothing is written on error.
    fn create_subjects(&self, subjects: &[Subject]) -> RepoResult<Vec<SubjectId>>;
    fn update_subject(&self, subject: &Subject) -> RepoResult<()>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn list_subjects(&self) -> RepoResult<Vec<Subject>>;
    /// Hard delete. Cascades to the subject's exam and enrollment rows.
    fn delete_subject(&self, id: SubjectId) -> RepoResult<()>;
    /// Returns the existing subjects among `ids`; unknown ids are omitted.
    fn find_subjects_by_ids(&self, ids: &[SubjectId]) -> RepoResult<Vec<Subject>>;
}

/// SQLite-backed subject repository.
pub struct SqliteSubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["subjects"])?;
        Ok(Self { conn })
    }

    fn insert(conn: &Connection, subject: &Subject) -> RepoResult<()> {
        subject.validate()?;
        conn.execute(
            "INSERT INTO subjects (uuid, name) VALUES (?1, ?2);",
            params![subject.id.to_string(), subject.name.as_str()],
        )?;
        Ok(())
    }
}

impl SubjectRepository for SqliteSubjectRepository<'_> {
    fn create_subject(&self, subject: &Subject) -> RepoResult<SubjectId> {
        Self::insert(self.conn, subject)?;
        Ok(subject.id)
    }

    fn create_subjects(&self, subjects: &[Subject]) -> RepoResult<Vec<SubjectId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for subject in subjects {
            Self::insert(&tx, subject)?;
        }
        tx.commit()?;
        Ok(subjects.iter().map(|subject| subject.id).collect())
    }

    fn update_subject(&self, subject: &Subject) -> RepoResult<()> {
        subject.validate()?;
        let changed = self.conn.execute(
            "UPDATE subjects
             SET
                name = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![subject.name.as_str(), subject.id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKind::Subject, subject.id));
        }
        Ok(())
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subject_row(row)?));
        }
        Ok(None)
    }

    fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBJECT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(parse_subject_row(row)?);
        }
        Ok(subjects)
    }

    fn delete_subject(&self, id: SubjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subjects WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKind::Subject, id));
        }
        Ok(())
    }

    fn find_subjects_by_ids(&self, ids: &[SubjectId]) -> RepoResult<Vec<Subject>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut subjects = Vec::new();
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let mut stmt = self.conn.prepare_cached(&format!(
                "{SUBJECT_SELECT_SQL} WHERE uuid IN ({}) ORDER BY uuid ASC;",
                in_placeholders(chunk.len())
            ))?;
            let mut rows = stmt.query(params_from_iter(id_params(chunk)))?;
            while let Some(row) = rows.next()? {
                subjects.push(parse_subject_row(row)?);
            }
        }
        Ok(subjects)
    }
}

fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let uuid_text: String = row.get("uuid")?;
    let subject = Subject {
        id: parse_uuid(&uuid_text, "subjects.uuid")?,
        name: row.get("name")?,
    };
    subject.validate()?;
    Ok(subject)
}
