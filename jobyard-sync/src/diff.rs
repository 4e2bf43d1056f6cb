//! Disposition classification — the pure diff over old and new job sets.

use jobyard_core::{Job, JobName, JobSet};

use crate::archive::ArchiveIndex;

/// Every job from `old` and `new` sorted into exactly one disposition.
///
/// `to_archive` holds jobs leaving the active set; the other three action
/// buckets hold jobs from `new`. `unchanged` jobs produce no action and no
/// result entry. Buckets inherit [`JobSet`]'s name ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub to_archive: Vec<Job>,
    pub to_revive: Vec<Job>,
    pub to_rewrite: Vec<Job>,
    pub to_create: Vec<Job>,
    pub unchanged: Vec<JobName>,
}

impl Classification {
    /// True when no action bucket has work. `unchanged` entries do not
    /// count — a fully converged tree classifies as empty.
    pub fn is_empty(&self) -> bool {
        self.total_actions() == 0
    }

    pub fn total_actions(&self) -> usize {
        self.to_archive.len() + self.to_revive.len() + self.to_rewrite.len() + self.to_create.len()
    }
}

/// Classify `old` → `new` against the archive snapshot. Pure, total, no I/O.
///
/// Pass 1 marks every old job whose name has no match in `new` for
/// archival — name-based, so a renamed job becomes archive + create, never
/// rewrite. Pass 2 walks `new`: a name present in `archived` always
/// revives, even when `old` holds an identical job — an archive entry
/// means the active copy was removed at some point and the only legal path
/// back is through revival, which also regenerates the body. Otherwise a
/// name match against `old` compares full content: equal is unchanged,
/// different is a rewrite. No match at all is a creation.
pub fn classify(old: &JobSet, new: &JobSet, archived: &ArchiveIndex) -> Classification {
    let mut classification = Classification::default();

    for job in old {
        let name = job.canonical_name();
        if !new.contains(&name) {
            classification.to_archive.push(job.clone());
        }
    }

    for job in new {
        let name = job.canonical_name();
        if archived.contains(&name) {
            classification.to_revive.push(job.clone());
        } else if let Some(previous) = old.get(&name) {
            if previous == job {
                classification.unchanged.push(name);
            } else {
                classification.to_rewrite.push(job.clone());
            }
        } else {
            classification.to_create.push(job.clone());
        }
    }

    classification
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
