//! Per-job outcomes and the per-call aggregate.

use serde::Serialize;

use jobyard_core::JobName;

use crate::actions::ActionFailure;

/// Outcome of one job action. `message` carries the reported cause on
/// failure and is absent on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobUpdateResult {
    pub name: JobName,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JobUpdateResult {
    pub fn success(name: JobName) -> Self {
        Self { name, success: true, message: None }
    }

    pub fn failure(name: JobName, failure: &ActionFailure) -> Self {
        Self {
            name,
            success: false,
            message: Some(failure.to_string()),
        }
    }
}

/// Everything one reconciliation did, grouped by disposition. Unchanged
/// jobs have no entry anywhere.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobUpdateResults {
    pub created: Vec<JobUpdateResult>,
    pub archived: Vec<JobUpdateResult>,
    pub rewritten: Vec<JobUpdateResult>,
    pub revived: Vec<JobUpdateResult>,
}

impl JobUpdateResults {
    /// Aggregate for the selective rewrite drivers, which only ever rewrite.
    pub fn rewritten_only(rewritten: Vec<JobUpdateResult>) -> Self {
        Self { rewritten, ..Self::default() }
    }

    pub fn total(&self) -> usize {
        self.created.len() + self.archived.len() + self.rewritten.len() + self.revived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn has_failures(&self) -> bool {
        self.iter().any(|result| !result.success)
    }

    /// Every result across the four groups, created → archived →
    /// rewritten → revived.
    pub fn iter(&self) -> impl Iterator<Item = &JobUpdateResult> {
        self.created
            .iter()
            .chain(self.archived.iter())
            .chain(self.rewritten.iter())
            .chain(self.revived.iter())
    }
}
