//! Subcommand implementations.

pub mod apply;
pub mod plan;
pub mod project;
pub mod regen;
pub mod remove;

use anyhow::{Context, Result};
use colored::Colorize;

use jobyard_core::{ConfigStore, Project, StoreError};
use jobyard_sync::{JobUpdateResult, JobUpdateResults};

/// Stored definition for `id`, or `None` when the project was never applied.
pub(crate) fn load_stored_project(store: &ConfigStore, id: &str) -> Result<Option<Project>> {
    match store.load_project(id) {
        Ok(project) => Ok(Some(project)),
        Err(StoreError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("cannot load stored project '{id}'")),
    }
}

/// Print a reconciliation outcome and turn per-job failures into a
/// non-zero exit.
pub(crate) fn report_outcome(subject: &str, results: &JobUpdateResults, json: bool) -> Result<()> {
    if json {
        let payload =
            serde_json::to_string_pretty(results).context("failed to serialize results JSON")?;
        println!("{payload}");
    } else {
        print_results(subject, results);
    }

    let failed = results.iter().filter(|r| !r.success).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} job updates failed", results.total());
    }
    Ok(())
}

fn print_results(subject: &str, results: &JobUpdateResults) {
    if results.is_empty() {
        println!("✓ '{subject}' — nothing to do");
        return;
    }

    let failed = results.iter().filter(|r| !r.success).count();
    let glyph = if failed == 0 {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    };
    println!(
        "{glyph} '{subject}': {} created, {} archived, {} rewritten, {} revived",
        results.created.len(),
        results.archived.len(),
        results.rewritten.len(),
        results.revived.len(),
    );

    print_group("created", &results.created);
    print_group("archived", &results.archived);
    print_group("rewritten", &results.rewritten);
    print_group("revived", &results.revived);
}

fn print_group(label: &str, rows: &[JobUpdateResult]) {
    if rows.is_empty() {
        return;
    }
    println!("{label}:");
    for row in rows {
        if row.success {
            println!("  {} {}", "✓".green(), row.name);
        } else {
            println!(
                "  {} {}: {}",
                "✗".red(),
                row.name,
                row.message.as_deref().unwrap_or("unknown failure"),
            );
        }
    }
}
