//! `jobyard remove` — archive a project's jobs and drop its definition.

use anyhow::{Context, Result};
use clap::Args;

use super::super::AppContext;
use super::report_outcome;

/// Arguments for `jobyard remove`.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Id of the stored project to remove.
    pub id: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl RemoveArgs {
    pub fn run(self, ctx: &AppContext) -> Result<()> {
        let config_store = ctx.settings.store();
        let stored = config_store
            .load_project(&self.id)
            .with_context(|| format!("no stored project '{}'", self.id))?;

        let results = ctx
            .updater
            .update_projects(Some(&stored), None)
            .with_context(|| format!("removal failed for '{}'", self.id))?;

        // The definition stays while any job sits unarchived, so a rerun
        // can retry the leftovers.
        if !results.has_failures() {
            config_store
                .remove_project(&self.id)
                .with_context(|| format!("cannot drop stored project '{}'", self.id))?;
        }

        report_outcome(&self.id, &results, self.json)
    }
}
