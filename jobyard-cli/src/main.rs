//! jobyard — CI job tree reconciliation CLI.
//!
//! # Usage
//!
//! ```text
//! jobyard apply <project.yaml> [--json]
//! jobyard plan <project.yaml>
//! jobyard remove <project-id> [--json]
//! jobyard regen --platform <id> | --task <id> | --project <id> [--json]
//! jobyard project list [--json]
//! ```
//!
//! Every command takes `--root <dir>` (default `~/.jobyard`) plus the
//! `--jenkins-*` connection flags; `--offline` skips the controller
//! entirely and only manipulates the local tree.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{
    apply::ApplyArgs, plan::PlanArgs, project::ProjectCommand, regen::RegenArgs,
    remove::RemoveArgs,
};
use jobyard_core::Settings;
use jobyard_renderer::JobRenderer;
use jobyard_sync::{Executor, JobUpdater, NoopExecutor, SshExecutor};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "jobyard",
    version,
    about = "Reconcile CI job trees against project definitions",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Root directory holding config/, jobs/ and jobs-archive/.
    /// Defaults to ~/.jobyard.
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Directory with replacement job config templates.
    #[arg(long, global = true, value_name = "DIR")]
    templates: Option<PathBuf>,

    /// Host running the job controller's ssh CLI.
    #[arg(long, global = true, default_value = "localhost", value_name = "HOST")]
    jenkins_host: String,

    /// Port of the controller's ssh CLI.
    #[arg(long, global = true, default_value_t = 22, value_name = "PORT")]
    jenkins_port: u16,

    /// User for the controller's ssh CLI.
    #[arg(long, global = true, value_name = "USER")]
    jenkins_user: Option<String>,

    /// Apply tree changes without contacting the controller.
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile the job tree against a project definition file.
    Apply(ApplyArgs),

    /// Show what `apply` would do, without touching anything.
    Plan(PlanArgs),

    /// Archive every job of a stored project and drop its definition.
    Remove(RemoveArgs),

    /// Rewrite configs of existing jobs after a platform or task change.
    Regen(RegenArgs),

    /// Inspect stored project definitions.
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared command context — settings plus a wired-up updater
// ---------------------------------------------------------------------------

pub struct AppContext {
    pub settings: Settings,
    pub updater: JobUpdater,
}

fn build_context(connection: &ConnectionArgs) -> Result<AppContext> {
    let settings = match &connection.root {
        Some(root) => Settings::under_root(root),
        None => Settings::from_home().context("could not determine home directory")?,
    };
    settings
        .ensure_layout()
        .context("cannot prepare the jobyard directory layout")?;

    let renderer = match &connection.templates {
        Some(dir) => JobRenderer::with_template_dir(dir),
        None => JobRenderer::new(),
    }
    .context("cannot load job config templates")?;

    let executor: Box<dyn Executor> = if connection.offline {
        Box::new(NoopExecutor)
    } else {
        let mut ssh = SshExecutor::new(
            connection.jenkins_host.as_str(),
            connection.jenkins_port,
            &settings.jobs_root,
        );
        if let Some(user) = &connection.jenkins_user {
            ssh = ssh.with_user(user.as_str());
        }
        Box::new(ssh)
    };

    Ok(AppContext {
        updater: JobUpdater::new(settings.clone(), renderer, executor),
        settings,
    })
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let ctx = build_context(&cli.connection)?;
    match cli.command {
        Commands::Apply(args) => args.run(&ctx),
        Commands::Plan(args) => args.run(&ctx),
        Commands::Remove(args) => args.run(&ctx),
        Commands::Regen(args) => args.run(&ctx),
        Commands::Project { command } => commands::project::run(command, &ctx),
    }
}
