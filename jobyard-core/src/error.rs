//! Error types for jobyard-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::JobName;

/// Errors raised at the job-construction boundary.
///
/// Jobs are validated when built, never afterwards: a [`crate::job::Job`]
/// that exists is guaranteed to have a well-formed, collision-free name.
#[derive(Debug, Error)]
pub enum JobError {
    /// An identity segment would make the canonical name ambiguous.
    #[error("invalid {field} {value:?}: identity segments must be non-empty, without '-' or whitespace")]
    InvalidSegment { field: &'static str, value: String },

    /// A variant value may not contain `.` — values are `.`-joined in the name.
    #[error("invalid variant value {value:?} for axis {axis:?}: must not contain '.'")]
    InvalidVariantValue { axis: String, value: String },

    /// Two different job definitions derived the same canonical name.
    #[error("job name collision on {name}: two different definitions derive the same name")]
    NameCollision { name: JobName },
}

/// All errors that can arise from configuration-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The YAML document did not exist at the expected path.
    #[error("no such document: {path}")]
    NotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.jobyard/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Errors raised while expanding a project definition into jobs.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// The project names a product, platform or task with no stored document.
    #[error("project {project:?} references unknown {kind} {id:?}")]
    UnknownReference {
        project: String,
        kind: &'static str,
        id: String,
    },

    /// Storage failure while resolving references.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A resolved combination produced an invalid job.
    #[error("invalid job definition: {0}")]
    Job(#[from] JobError),
}
