//! jobyard core library — domain types, job identity, configuration storage.
//!
//! Public API surface:
//! - [`types`] — newtypes and stored domain structs
//! - [`job`] — [`Job`], [`JobSet`], canonical naming
//! - [`expand`] — project → job-set expansion
//! - [`store`] — [`ConfigStore`] YAML persistence
//! - [`settings`] — on-disk layout ([`Settings`])
//! - [`error`] — [`JobError`], [`StoreError`], [`ExpandError`]

pub mod error;
pub mod expand;
pub mod job;
pub mod settings;
pub mod store;
pub mod types;

pub use error::{ExpandError, JobError, StoreError};
pub use expand::expand_project;
pub use job::{Job, JobSet};
pub use settings::Settings;
pub use store::{load_project_file, ConfigStore};
pub use types::{JobName, MachinePreference, Platform, Product, Project, Task};
