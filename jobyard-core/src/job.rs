//! Job identity and job sets.
//!
//! A [`Job`] is immutable once constructed. Its canonical name is a pure
//! function of its attributes: `{task}-{product}-{project}-{platform}` with
//! the variant values appended `.`-joined when any are selected, e.g.
//! `tck-jdk8-wheat-el7.x86_64-hotspot.release`. Segment validation at
//! construction keeps the derivation injective, so two different jobs can
//! never share a name; [`JobSet::from_jobs`] rejects the residual case of
//! equal names with unequal content.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::error::JobError;
use crate::types::{JobName, Platform, Product, Task};

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One desired CI job: every attribute its config file is generated from.
///
/// Equality is full value equality — two jobs with the same name but a
/// changed task script, poll schedule, product version or variant selection
/// compare unequal, which is what drives rewrite detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    project: String,
    product: Product,
    task: Task,
    platform: Platform,
    variants: BTreeMap<String, String>,
}

impl Job {
    /// Build a job, validating every identity segment.
    ///
    /// Segments must be non-empty and free of `-` and whitespace; variant
    /// values must additionally be free of `.`.
    pub fn new(
        project: &str,
        product: Product,
        task: Task,
        platform: Platform,
        variants: BTreeMap<String, String>,
    ) -> Result<Self, JobError> {
        check_segment("project id", project)?;
        check_segment("product id", &product.id)?;
        check_segment("task id", &task.id)?;
        check_segment("platform os", &platform.os)?;
        check_segment("platform version", &platform.version)?;
        check_segment("platform architecture", &platform.architecture)?;
        for (axis, value) in &variants {
            check_segment("variant axis", axis)?;
            check_segment("variant value", value)?;
            if value.contains('.') {
                return Err(JobError::InvalidVariantValue {
                    axis: axis.clone(),
                    value: value.clone(),
                });
            }
        }
        Ok(Self { project: project.to_owned(), product, task, platform, variants })
    }

    /// The job's external identity: directory name, archive entry name and
    /// remote registration name. Pure and total.
    pub fn canonical_name(&self) -> JobName {
        let mut name = format!(
            "{}-{}-{}-{}",
            self.task.id,
            self.product.id,
            self.project,
            self.platform.id()
        );
        if !self.variants.is_empty() {
            name.push('-');
            let values: Vec<&str> = self.variants.values().map(String::as_str).collect();
            name.push_str(&values.join("."));
        }
        JobName(name)
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn variants(&self) -> &BTreeMap<String, String> {
        &self.variants
    }
}

fn check_segment(field: &'static str, value: &str) -> Result<(), JobError> {
    if value.is_empty() || value.contains('-') || value.chars().any(char::is_whitespace) {
        return Err(JobError::InvalidSegment { field, value: value.to_owned() });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JobSet
// ---------------------------------------------------------------------------

/// A snapshot of desired jobs, keyed by canonical name.
///
/// Construction rejects two *different* jobs deriving the same name; equal
/// duplicates collapse silently. Iteration is name-ordered, so everything
/// downstream (classification, actions, reports) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSet {
    jobs: BTreeMap<JobName, Job>,
}

impl JobSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_jobs(jobs: impl IntoIterator<Item = Job>) -> Result<Self, JobError> {
        let mut map = BTreeMap::new();
        for job in jobs {
            let name = job.canonical_name();
            match map.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(job);
                }
                Entry::Occupied(slot) => {
                    if slot.get() != &job {
                        return Err(JobError::NameCollision { name: slot.key().clone() });
                    }
                }
            }
        }
        Ok(Self { jobs: map })
    }

    pub fn get(&self, name: &JobName) -> Option<&Job> {
        self.jobs.get(name)
    }

    pub fn contains(&self, name: &JobName) -> bool {
        self.jobs.contains_key(name)
    }

    /// Jobs in canonical-name order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &JobName> {
        self.jobs.keys()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl<'a> IntoIterator for &'a JobSet {
    type Item = &'a Job;
    type IntoIter = std::collections::btree_map::Values<'a, JobName, Job>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.values()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
