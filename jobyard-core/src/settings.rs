//! On-disk layout for a jobyard root.
//!
//! ```text
//! <root>/                    (default: ~/.jobyard)
//!   config/                  configuration store, see [`crate::store`]
//!   jobs/<name>/config.xml   active job directories
//!   jobs-archive/<name>/     retired job directories
//! ```

use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::store::ConfigStore;
use crate::types::JobName;

pub const CONFIG_DIR_NAME: &str = "config";
pub const JOBS_DIR_NAME: &str = "jobs";
pub const ARCHIVE_DIR_NAME: &str = "jobs-archive";

/// File written inside every job directory.
pub const JOB_CONFIG_FILE: &str = "config.xml";

/// Resolved roots for one jobyard installation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_root: PathBuf,
    pub jobs_root: PathBuf,
    pub archive_root: PathBuf,
}

impl Settings {
    /// Standard layout under a single root directory.
    pub fn under_root(root: &Path) -> Self {
        Self {
            config_root: root.join(CONFIG_DIR_NAME),
            jobs_root: root.join(JOBS_DIR_NAME),
            archive_root: root.join(ARCHIVE_DIR_NAME),
        }
    }

    /// `~/.jobyard` layout via `dirs::home_dir()`.
    pub fn from_home() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::HomeNotFound)?;
        Ok(Self::under_root(&home.join(".jobyard")))
    }

    /// Create the three roots if absent. Must run before the first
    /// reconciliation: an unreadable archive root aborts the whole call.
    pub fn ensure_layout(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.config_root)?;
        std::fs::create_dir_all(&self.jobs_root)?;
        std::fs::create_dir_all(&self.archive_root)?;
        Ok(())
    }

    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(&self.config_root)
    }

    /// `<jobs_root>/<name>/`
    pub fn job_dir(&self, name: &JobName) -> PathBuf {
        self.jobs_root.join(&name.0)
    }

    /// `<archive_root>/<name>/`
    pub fn archived_job_dir(&self, name: &JobName) -> PathBuf {
        self.archive_root.join(&name.0)
    }

    /// `<jobs_root>/<name>/config.xml`
    pub fn job_config_path(&self, name: &JobName) -> PathBuf {
        self.job_dir(name).join(JOB_CONFIG_FILE)
    }
}
