//! `jobyard regen` — rewrite live configs after a platform or task edit.

use anyhow::{Context, Result};
use clap::Args;

use super::super::AppContext;
use super::report_outcome;

/// Arguments for `jobyard regen`.
#[derive(Args, Debug)]
pub struct RegenArgs {
    /// Rewrite every job pinned to this platform id (e.g. "el7.x86_64").
    #[arg(
        long,
        value_name = "PLATFORM_ID",
        conflicts_with_all = ["task", "project"],
        required_unless_present_any = ["task", "project"]
    )]
    pub platform: Option<String>,

    /// Rewrite every job generated from this task id.
    #[arg(long, value_name = "TASK_ID", conflicts_with = "project")]
    pub task: Option<String>,

    /// Rewrite every job of this project id.
    #[arg(long, value_name = "PROJECT_ID")]
    pub project: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl RegenArgs {
    pub fn run(self, ctx: &AppContext) -> Result<()> {
        let (subject, results) = if let Some(platform) = &self.platform {
            let results = ctx
                .updater
                .rewrite_platform(platform)
                .with_context(|| format!("regen failed for platform '{platform}'"))?;
            (platform.clone(), results)
        } else if let Some(task) = &self.task {
            let results = ctx
                .updater
                .rewrite_task(task)
                .with_context(|| format!("regen failed for task '{task}'"))?;
            (task.clone(), results)
        } else if let Some(project) = &self.project {
            let results = ctx
                .updater
                .rewrite_project(project)
                .with_context(|| format!("regen failed for project '{project}'"))?;
            (project.clone(), results)
        } else {
            anyhow::bail!("provide --platform, --task or --project");
        };

        report_outcome(&subject, &results, self.json)
    }
}
