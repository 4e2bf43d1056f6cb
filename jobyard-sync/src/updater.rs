//! Reconciliation engine: snapshot the archive, classify, run actions,
//! aggregate results.

use std::io::ErrorKind;
use std::path::Path;

use similar::TextDiff;

use jobyard_core::{expand_project, Job, JobName, JobSet, Project, Settings};
use jobyard_renderer::JobRenderer;

use crate::actions::{self, ActionFailure};
use crate::archive::ArchiveIndex;
use crate::diff::{classify, Classification};
use crate::error::{io_err, UpdateError};
use crate::executor::Executor;
use crate::results::{JobUpdateResult, JobUpdateResults};

// ---------------------------------------------------------------------------
// Plan report
// ---------------------------------------------------------------------------

/// Unified diff for one job whose config would be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub name: JobName,
    pub unified_diff: String,
}

/// What [`JobUpdater::update`] would do, without doing any of it.
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub classification: Classification,
    pub rewrite_diffs: Vec<FileDiff>,
    /// Unchanged jobs whose on-disk config no longer matches a fresh
    /// render, e.g. after a platform or task document edit.
    pub drifted: Vec<FileDiff>,
}

// ---------------------------------------------------------------------------
// JobUpdater
// ---------------------------------------------------------------------------

/// Drives job trees toward a desired [`JobSet`].
pub struct JobUpdater {
    settings: Settings,
    renderer: JobRenderer,
    executor: Box<dyn Executor>,
}

impl JobUpdater {
    pub fn new(settings: Settings, renderer: JobRenderer, executor: Box<dyn Executor>) -> Self {
        Self { settings, renderer, executor }
    }

    /// Reconcile `old` → `new`.
    ///
    /// The archive index is snapshotted once, before anything runs; an
    /// unreadable archive root aborts the whole call. After that every job
    /// action is independent: a failed one lands in its result entry and
    /// the remaining jobs still run. Archivals go first so a renamed job's
    /// directory is out of the way before its successor is created.
    pub fn update(&self, old: &JobSet, new: &JobSet) -> Result<JobUpdateResults, UpdateError> {
        let archived = ArchiveIndex::read(&self.settings.archive_root)?;
        let classification = classify(old, new, &archived);
        tracing::info!(
            "reconciling: {} to archive, {} to revive, {} to rewrite, {} to create, {} unchanged",
            classification.to_archive.len(),
            classification.to_revive.len(),
            classification.to_rewrite.len(),
            classification.to_create.len(),
            classification.unchanged.len(),
        );

        let mut results = JobUpdateResults::default();
        for job in &classification.to_archive {
            let outcome = actions::archive(&self.settings, self.executor.as_ref(), job);
            results.archived.push(capture(job.canonical_name(), outcome));
        }
        for job in &classification.to_revive {
            let outcome =
                actions::revive(&self.settings, &self.renderer, self.executor.as_ref(), job);
            results.revived.push(capture(job.canonical_name(), outcome));
        }
        for job in &classification.to_rewrite {
            let outcome =
                actions::rewrite(&self.settings, &self.renderer, self.executor.as_ref(), job);
            results.rewritten.push(capture(job.canonical_name(), outcome));
        }
        for job in &classification.to_create {
            let outcome =
                actions::create(&self.settings, &self.renderer, self.executor.as_ref(), job);
            results.created.push(capture(job.canonical_name(), outcome));
        }
        Ok(results)
    }

    /// Reconcile two project definitions, either side absent.
    ///
    /// `None` expands to the empty set, so `(None, Some)` creates a
    /// project's whole universe and `(Some, None)` retires it. Expansion
    /// failure aborts the call before anything is touched.
    pub fn update_projects(
        &self,
        old: Option<&Project>,
        new: Option<&Project>,
    ) -> Result<JobUpdateResults, UpdateError> {
        let store = self.settings.store();
        let old_jobs = match old {
            Some(project) => expand_project(&store, project)?,
            None => JobSet::empty(),
        };
        let new_jobs = match new {
            Some(project) => expand_project(&store, project)?,
            None => JobSet::empty(),
        };
        self.update(&old_jobs, &new_jobs)
    }

    /// Rewrite every stored job matching `predicate`, across all projects.
    ///
    /// Used after a shared definition (platform, task) changes: the job
    /// universe is unchanged, only config bodies go stale. A project that
    /// fails to expand is logged and skipped; the rest of the batch runs.
    pub fn rewrite_matching(
        &self,
        predicate: impl Fn(&Job) -> bool,
    ) -> Result<JobUpdateResults, UpdateError> {
        let store = self.settings.store();
        let mut rewritten = Vec::new();
        for project in store.list_projects()? {
            let jobs = match expand_project(&store, &project) {
                Ok(jobs) => jobs,
                Err(e) => {
                    tracing::error!("cannot expand project {}: {e}", project.id);
                    continue;
                }
            };
            for job in &jobs {
                if !predicate(job) {
                    continue;
                }
                let outcome =
                    actions::rewrite(&self.settings, &self.renderer, self.executor.as_ref(), job);
                rewritten.push(capture(job.canonical_name(), outcome));
            }
        }
        Ok(JobUpdateResults::rewritten_only(rewritten))
    }

    /// Rewrite every job targeting the platform.
    pub fn rewrite_platform(&self, platform_id: &str) -> Result<JobUpdateResults, UpdateError> {
        self.rewrite_matching(|job| job.platform().id() == platform_id)
    }

    /// Rewrite every job generated from the task.
    pub fn rewrite_task(&self, task_id: &str) -> Result<JobUpdateResults, UpdateError> {
        self.rewrite_matching(|job| job.task().id == task_id)
    }

    /// Rewrite every job of one project.
    pub fn rewrite_project(&self, project_id: &str) -> Result<JobUpdateResults, UpdateError> {
        self.rewrite_matching(|job| job.project() == project_id)
    }

    /// Classify against the live archive snapshot, render what each
    /// rewrite would change, and flag unchanged jobs whose on-disk config
    /// drifted from a fresh render. Reads only; never calls the executor.
    pub fn plan(&self, old: &JobSet, new: &JobSet) -> Result<PlanReport, UpdateError> {
        let archived = ArchiveIndex::read(&self.settings.archive_root)?;
        let classification = classify(old, new, &archived);

        let mut rewrite_diffs = Vec::new();
        for job in &classification.to_rewrite {
            let name = job.canonical_name();
            if let Some(diff) = self.diff_against_disk(job, &name)? {
                rewrite_diffs.push(diff);
            }
        }

        let mut drifted = Vec::new();
        for name in &classification.unchanged {
            let Some(job) = new.get(name) else { continue };
            if let Some(diff) = self.diff_against_disk(job, name)? {
                drifted.push(diff);
            }
        }

        Ok(PlanReport { classification, rewrite_diffs, drifted })
    }

    /// `None` when the on-disk config already equals a fresh render.
    fn diff_against_disk(&self, job: &Job, name: &JobName) -> Result<Option<FileDiff>, UpdateError> {
        let rendered = normalize_line_endings(&self.renderer.render(job)?);
        let existing = read_existing_or_empty(&self.settings.job_config_path(name))?;
        if existing == rendered {
            return Ok(None);
        }
        let old_header = format!("a/{name}/config.xml");
        let new_header = format!("b/{name}/config.xml");
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();
        Ok(Some(FileDiff { name: name.clone(), unified_diff: unified }))
    }
}

fn capture(name: JobName, outcome: Result<(), ActionFailure>) -> JobUpdateResult {
    match outcome {
        Ok(()) => JobUpdateResult::success(name),
        Err(failure) => {
            tracing::error!("job {name} failed: {failure}");
            JobUpdateResult::failure(name, &failure)
        }
    }
}

fn read_existing_or_empty(path: &Path) -> Result<String, UpdateError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(normalize_line_endings(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
