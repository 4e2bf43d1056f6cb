//! Project → job-set expansion.
//!
//! A stored [`Project`] references products, platforms and tasks by id; the
//! job universe it defines is the cartesian product of its tasks and
//! platforms, every combination carrying the project's variant selection.
//! This is the parsing step that turns declarative configuration into the
//! concrete [`JobSet`] the reconciliation engine diffs against.

use crate::error::{ExpandError, StoreError};
use crate::job::{Job, JobSet};
use crate::store::ConfigStore;
use crate::types::{Platform, Project, Task};

/// Expand one project into its full job set.
///
/// Fails on the first unresolvable reference — a partial expansion would
/// silently archive every job of the missing platform or task.
pub fn expand_project(store: &ConfigStore, project: &Project) -> Result<JobSet, ExpandError> {
    let product = store
        .load_product(&project.product)
        .map_err(|e| unknown_ref(e, project, "product", &project.product))?;

    let mut platforms: Vec<Platform> = Vec::with_capacity(project.platforms.len());
    for id in &project.platforms {
        let platform =
            store.load_platform(id).map_err(|e| unknown_ref(e, project, "platform", id))?;
        platforms.push(platform);
    }

    let mut tasks: Vec<Task> = Vec::with_capacity(project.tasks.len());
    for id in &project.tasks {
        let task = store.load_task(id).map_err(|e| unknown_ref(e, project, "task", id))?;
        tasks.push(task);
    }

    let mut jobs = Vec::with_capacity(tasks.len() * platforms.len());
    for task in &tasks {
        for platform in &platforms {
            jobs.push(Job::new(
                &project.id,
                product.clone(),
                task.clone(),
                platform.clone(),
                project.variants.clone(),
            )?);
        }
    }
    Ok(JobSet::from_jobs(jobs)?)
}

fn unknown_ref(err: StoreError, project: &Project, kind: &'static str, id: &str) -> ExpandError {
    match err {
        StoreError::NotFound { .. } => ExpandError::UnknownReference {
            project: project.id.clone(),
            kind,
            id: id.to_owned(),
        },
        other => ExpandError::Store(other),
    }
}
