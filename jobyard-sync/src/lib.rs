//! # jobyard-sync
//!
//! Reconciles on-disk CI job trees (active + archive) against the job set a
//! project's definition expands to, mirroring every change to the remote
//! job runner.
//!
//! Build a [`JobUpdater`] from [`jobyard_core::Settings`], a renderer and an
//! [`Executor`], then call [`JobUpdater::update`] (or
//! [`JobUpdater::update_projects`] straight from stored definitions).
//! [`JobUpdater::plan`] classifies without acting.

pub mod actions;
pub mod archive;
pub mod diff;
pub mod error;
pub mod executor;
mod fsops;
pub mod results;
pub mod updater;

pub use actions::ActionFailure;
pub use archive::ArchiveIndex;
pub use diff::{classify, Classification};
pub use error::{ActionError, UpdateError};
pub use executor::{Executor, ExecutorError, NoopExecutor, SshExecutor};
pub use results::{JobUpdateResult, JobUpdateResults};
pub use updater::{FileDiff, JobUpdater, PlanReport};
