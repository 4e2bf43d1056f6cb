//! `jobyard apply` — reconcile the job tree against a definition file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use jobyard_core::store;

use super::super::AppContext;
use super::{load_stored_project, report_outcome};

/// Arguments for `jobyard apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Project definition to apply (YAML).
    pub file: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ApplyArgs {
    pub fn run(self, ctx: &AppContext) -> Result<()> {
        let mut incoming = store::load_project_file(&self.file)
            .with_context(|| format!("cannot load {}", self.file.display()))?;

        let config_store = ctx.settings.store();
        let stored = load_stored_project(&config_store, &incoming.id)?;
        if let Some(previous) = &stored {
            incoming.created_at = previous.created_at;
        }
        incoming.updated_at = Utc::now();

        let results = ctx
            .updater
            .update_projects(stored.as_ref(), Some(&incoming))
            .with_context(|| format!("reconciliation failed for '{}'", incoming.id))?;

        // Per-job failures still persist the definition; a rerun picks the
        // failed jobs up again from the same declared state.
        config_store
            .save_project(&incoming)
            .with_context(|| format!("cannot persist project '{}'", incoming.id))?;

        report_outcome(&incoming.id, &results, self.json)
    }
}
