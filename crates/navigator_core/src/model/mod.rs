//! Domain model for subjects, exams and students.
//!
//! # Responsibility
//! - Define the records shared by repositories, services and the
//!   enrollment engine.
//! - Normalize and validate user-supplied names.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Ownership points one way: a student holds subject/exam ids, while
//!   subjects and exams never reference their students.

pub mod exam;
pub mod student;
pub mod subject;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Entity family, used to label lookups and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Subject,
    Exam,
    Student,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Exam => "exam",
            Self::Student => "student",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for model records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Name is empty after trim and whitespace collapse.
    BlankName(EntityKind),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName(kind) => write!(f, "{kind} name must not be blank"),
        }
    }
}

impl Error for ModelValidationError {}

/// Normalizes a display name: trims it and collapses inner whitespace runs.
///
/// Returns `None` when nothing is left.
pub fn normalize_name(value: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Like [`normalize_name`], but a blank name is an error for `kind`.
pub fn require_name(kind: EntityKind, value: &str) -> Result<String, ModelValidationError> {
    normalize_name(value).ok_or(ModelValidationError::BlankName(kind))
}
