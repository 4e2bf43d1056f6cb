//! The four job actions, each split into a local phase and a remote phase.
//!
//! Every action runs both phases through [`run_compensated`]: the remote
//! phase runs even when the local phase failed, so the runner's registry
//! tracks whatever state the tree reached. When both phases fail the local
//! cause is reported and the remote one is retained on the failure value
//! and logged at warn.

use jobyard_core::{Job, Settings};
use jobyard_renderer::JobRenderer;
use thiserror::Error;

use crate::error::ActionError;
use crate::executor::Executor;
use crate::fsops;

/// Failed action, keeping which phase broke and every cause.
///
/// `Display` shows the reported cause only; a retained secondary never
/// reaches the caller-visible message.
#[derive(Debug, Error)]
pub enum ActionFailure {
    /// Local phase failed. `secondary` holds the remote failure when that
    /// phase broke too.
    #[error("{cause}")]
    Primary {
        cause: ActionError,
        secondary: Option<ActionError>,
    },

    /// Local phase succeeded, remote phase failed.
    #[error("{cause}")]
    Secondary { cause: ActionError },
}

/// Run the two phases of an action, never skipping the second.
pub fn run_compensated(
    primary: impl FnOnce() -> Result<(), ActionError>,
    secondary: impl FnOnce() -> Result<(), ActionError>,
) -> Result<(), ActionFailure> {
    let primary_outcome = primary();
    let secondary_outcome = secondary();
    match (primary_outcome, secondary_outcome) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(cause)) => Err(ActionFailure::Secondary { cause }),
        (Err(cause), Ok(())) => Err(ActionFailure::Primary { cause, secondary: None }),
        (Err(cause), Err(secondary)) => {
            tracing::warn!("remote failure retained behind local one: {secondary}");
            Err(ActionFailure::Primary { cause, secondary: Some(secondary) })
        }
    }
}

/// New job: fresh directory + rendered config, then remote registration.
pub(crate) fn create(
    settings: &Settings,
    renderer: &JobRenderer,
    executor: &dyn Executor,
    job: &Job,
) -> Result<(), ActionFailure> {
    let name = job.canonical_name();
    tracing::info!("creating job {name}");
    run_compensated(
        || {
            let dir = settings.job_dir(&name);
            tracing::info!("creating directory {}", dir.display());
            fsops::create_job_dir(&dir)?;
            let body = renderer.render(job)?;
            let config = settings.job_config_path(&name);
            tracing::info!("writing {}", config.display());
            fsops::write_config(&config, &body)
        },
        || Ok(executor.register_or_reload(&name)?),
    )
}

/// Returning job: move the archived directory back and regenerate the
/// config, then remote registration. The body is re-rendered because the
/// archived copy may predate the current definition.
pub(crate) fn revive(
    settings: &Settings,
    renderer: &JobRenderer,
    executor: &dyn Executor,
    job: &Job,
) -> Result<(), ActionFailure> {
    let name = job.canonical_name();
    tracing::info!("reviving job {name}");
    run_compensated(
        || {
            let src = settings.archived_job_dir(&name);
            let dst = settings.job_dir(&name);
            tracing::info!("moving {} to {}", src.display(), dst.display());
            fsops::move_dir(&src, &dst)?;
            let body = renderer.render(job)?;
            let config = settings.job_config_path(&name);
            tracing::info!("recreating {}", config.display());
            fsops::write_config(&config, &body)
        },
        || Ok(executor.register_or_reload(&name)?),
    )
}

/// Changed job: overwrite the config in place, then remote registration.
pub(crate) fn rewrite(
    settings: &Settings,
    renderer: &JobRenderer,
    executor: &dyn Executor,
    job: &Job,
) -> Result<(), ActionFailure> {
    let name = job.canonical_name();
    tracing::info!("rewriting job {name}");
    run_compensated(
        || {
            let body = renderer.render(job)?;
            let config = settings.job_config_path(&name);
            tracing::info!("writing {}", config.display());
            fsops::write_config(&config, &body)
        },
        || Ok(executor.register_or_reload(&name)?),
    )
}

/// Leaving job: move the directory into the archive, then remote delete.
/// The delete runs even when the move failed, same protocol as the other
/// three actions.
pub(crate) fn archive(
    settings: &Settings,
    executor: &dyn Executor,
    job: &Job,
) -> Result<(), ActionFailure> {
    let name = job.canonical_name();
    tracing::info!("archiving job {name}");
    run_compensated(
        || {
            let src = settings.job_dir(&name);
            let dst = settings.archived_job_dir(&name);
            tracing::info!("moving {} to {}", src.display(), dst.display());
            fsops::move_dir(&src, &dst)
        },
        || Ok(executor.delete(&name)?),
    )
}
