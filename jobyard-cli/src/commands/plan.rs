//! `jobyard plan` — show what `apply` would do, without acting.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use jobyard_core::{expand_project, store, JobSet};
use jobyard_sync::PlanReport;

use super::super::AppContext;
use super::load_stored_project;

/// Arguments for `jobyard plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Project definition to compare against the stored state (YAML).
    pub file: PathBuf,
}

impl PlanArgs {
    pub fn run(self, ctx: &AppContext) -> Result<()> {
        let incoming = store::load_project_file(&self.file)
            .with_context(|| format!("cannot load {}", self.file.display()))?;

        let config_store = ctx.settings.store();
        let stored = load_stored_project(&config_store, &incoming.id)?;

        let old = match &stored {
            Some(previous) => expand_project(&config_store, previous)
                .with_context(|| format!("cannot expand stored project '{}'", previous.id))?,
            None => JobSet::empty(),
        };
        let new = expand_project(&config_store, &incoming)
            .with_context(|| format!("cannot expand '{}'", incoming.id))?;

        let report = ctx
            .updater
            .plan(&old, &new)
            .with_context(|| format!("plan failed for '{}'", incoming.id))?;

        print_plan(&incoming.id, &report);
        Ok(())
    }
}

fn print_plan(project: &str, report: &PlanReport) {
    let classification = &report.classification;
    if classification.is_empty() && report.drifted.is_empty() {
        println!(
            "✓ '{project}' — nothing to do ({} unchanged)",
            classification.unchanged.len(),
        );
        return;
    }

    if !classification.is_empty() {
        println!("plan for '{project}':");
        for job in &classification.to_create {
            println!("  {} create   {}", "+".green(), job.canonical_name());
        }
        for job in &classification.to_rewrite {
            println!("  {} rewrite  {}", "~".yellow(), job.canonical_name());
        }
        for job in &classification.to_revive {
            println!("  {} revive   {}", "^".blue(), job.canonical_name());
        }
        for job in &classification.to_archive {
            println!("  {} archive  {}", "-".red(), job.canonical_name());
        }
        if !classification.unchanged.is_empty() {
            println!("  · unchanged ({})", classification.unchanged.len());
        }
    }

    if !report.drifted.is_empty() {
        println!("drifted configs (repair with `jobyard regen --project {project}`):");
        for diff in &report.drifted {
            println!("  {} {}", "!".yellow(), diff.name);
        }
    }

    for diff in report.rewrite_diffs.iter().chain(&report.drifted) {
        println!();
        print!("{}", diff.unified_diff);
    }
}
