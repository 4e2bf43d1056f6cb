//! Error types for jobyard-sync.

use std::path::PathBuf;

use thiserror::Error;

use jobyard_core::error::{ExpandError, StoreError};
use jobyard_renderer::RenderError;

use crate::executor::ExecutorError;

/// Errors that abort a whole reconciliation call.
///
/// Per-job action failures never appear here — they are captured into that
/// job's [`crate::results::JobUpdateResult`] and siblings keep running.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A project could not be expanded into jobs.
    #[error("project expansion error: {0}")]
    Expand(#[from] ExpandError),

    /// An error from the configuration store.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The renderer itself could not be used.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The archive index could not be snapshotted; classification is
    /// impossible without it.
    #[error("cannot read archive index at {path}: {source}")]
    ArchiveIndex {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`UpdateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> UpdateError {
    UpdateError::Io { path: path.into(), source }
}

/// A single failed step inside an action. Feeds
/// [`crate::actions::ActionFailure`], never [`UpdateError`].
#[derive(Debug, Error)]
pub enum ActionError {
    /// Local filesystem step failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config body generation failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The remote executor call failed.
    #[error("{0}")]
    Remote(#[from] ExecutorError),
}

/// Convenience constructor for [`ActionError::Io`].
pub(crate) fn action_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ActionError {
    ActionError::Io { path: path.into(), source }
}
