//! Subject enrollment merge.

use crate::enrollment::{dedupe_preserving_order, EnrollmentStore};
use crate::model::subject::{Subject, SubjectId};
use crate::repo::RepoResult;
use std::collections::{BTreeSet, HashSet};

/// Result of merging requested subjects into an existing set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectMerge {
    /// Existing set unioned with every resolved requested subject.
    pub merged: BTreeSet<SubjectId>,
    /// Requested ids with no stored subject, in request order, each once.
    pub not_found: Vec<SubjectId>,
}

impl SubjectMerge {
    fn unchanged(existing: &BTreeSet<SubjectId>) -> Self {
        Self {
            merged: existing.clone(),
            not_found: Vec::new(),
        }
    }

    /// Ids that were not already in the existing set.
    pub fn added<'a>(
        &'a self,
        existing: &'a BTreeSet<SubjectId>,
    ) -> impl Iterator<Item = SubjectId> + 'a {
        self.merged.difference(existing).copied()
    }
}

/// Resolves `requested` against the store and unions the hits into
/// `existing`.
///
/// An empty request is a no-op and does not touch the store.
pub fn merge_subjects<S: EnrollmentStore + ?Sized>(
    store: &S,
    existing: &BTreeSet<SubjectId>,
    requested: &[SubjectId],
) -> RepoResult<SubjectMerge> {
    if requested.is_empty() {
        return Ok(SubjectMerge::unchanged(existing));
    }

    let ids = dedupe_preserving_order(requested);
    let found = store.find_subjects_by_ids(&ids)?;
    Ok(union_resolved(existing, &ids, found))
}

fn union_resolved(
    existing: &BTreeSet<SubjectId>,
    requested: &[SubjectId],
    found: Vec<Subject>,
) -> SubjectMerge {
    let found_ids: HashSet<SubjectId> = found.iter().map(|subject| subject.id).collect();
    let not_found = requested
        .iter()
        .copied()
        .filter(|id| !found_ids.contains(id))
        .collect();

    let mut merged = existing.clone();
    merged.extend(found_ids);

    SubjectMerge { merged, not_found }
}
