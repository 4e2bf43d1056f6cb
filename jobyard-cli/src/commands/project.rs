//! `jobyard project list`

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::super::AppContext;
use jobyard_core::Project;

/// Inspect stored project definitions.
#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List stored projects with their platform and task fan-out.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
}

pub fn run(cmd: ProjectCommand, ctx: &AppContext) -> Result<()> {
    match cmd {
        ProjectCommand::List { json } => list(ctx, json),
    }
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "project")]
    id: String,
    #[tabled(rename = "product")]
    product: String,
    #[tabled(rename = "platforms")]
    platforms: String,
    #[tabled(rename = "tasks")]
    tasks: String,
    #[tabled(rename = "variants")]
    variants: String,
    #[tabled(rename = "updated")]
    updated: String,
}

#[derive(Serialize)]
struct ProjectJson {
    id: String,
    product: String,
    platforms: Vec<String>,
    tasks: Vec<String>,
    variants: BTreeMap<String, String>,
    created_at: String,
    updated_at: String,
}

fn list(ctx: &AppContext, json: bool) -> Result<()> {
    let projects = ctx
        .settings
        .store()
        .list_projects()
        .context("failed to read the project store")?;

    if json {
        return print_json(projects);
    }

    if projects.is_empty() {
        println!("No projects stored.");
        println!("Run: jobyard apply <project.yaml>");
        return Ok(());
    }

    let rows: Vec<ProjectRow> = projects
        .into_iter()
        .map(|project| ProjectRow {
            platforms: project.platforms.join(", "),
            tasks: project.tasks.join(", "),
            variants: project
                .variants
                .iter()
                .map(|(axis, value)| format!("{axis}={value}"))
                .collect::<Vec<_>>()
                .join(", "),
            updated: format!("{} ago", format_age(project.updated_at)),
            id: project.id,
            product: project.product,
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn print_json(projects: Vec<Project>) -> Result<()> {
    let payload: Vec<ProjectJson> = projects
        .into_iter()
        .map(|project| ProjectJson {
            id: project.id,
            product: project.product,
            platforms: project.platforms,
            tasks: project.tasks,
            variants: project.variants,
            created_at: project.created_at.to_rfc3339(),
            updated_at: project.updated_at.to_rfc3339(),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize project JSON")?
    );
    Ok(())
}

fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
