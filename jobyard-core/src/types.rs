//! Domain types for the jobyard configuration store.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All stored types are serializable/deserializable via serde + serde_yaml.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed canonical job name.
///
/// The name is simultaneously the job's directory name under the jobs root,
/// its directory name under the archive root, and its registration name on
/// the remote executor. Matching across old/new job sets is by this name;
/// content change detection is by full [`crate::job::Job`] equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobName(pub String);

impl JobName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for JobName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which kind of worker a task wants its jobs pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MachinePreference {
    #[default]
    Vm,
    VmOnly,
    Hw,
    HwOnly,
}

impl fmt::Display for MachinePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachinePreference::Vm => write!(f, "vm"),
            MachinePreference::VmOnly => write!(f, "vm-only"),
            MachinePreference::Hw => write!(f, "hw"),
            MachinePreference::HwOnly => write!(f, "hw-only"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A buildable product line (one JDK stream in the original deployment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub jdk_version: String,
    pub package_name: String,
}

/// An operating-system/architecture combination jobs can target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub os: String,
    pub version: String,
    pub architecture: String,
    pub provider: String,
}

impl Platform {
    /// Stable identifier, e.g. `el7.x86_64`. Used in job names and as the
    /// platform's document name in the store.
    pub fn id(&self) -> String {
        format!("{}{}.{}", self.os, self.version, self.architecture)
    }
}

/// A unit of work jobs are generated from (build, tck, jtreg run, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Script executed by the generated job.
    pub script: PathBuf,
    #[serde(default)]
    pub machine_preference: MachinePreference,
    /// Cron-style SCM poll schedule; omitted means no polling trigger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scm_poll_schedule: Option<String>,
}

/// A stored project definition: the desired state jobs are expanded from.
///
/// `product`, `platforms` and `tasks` reference store documents by id.
/// `variants` is a fixed axis → value selection applied to every expanded job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub product: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub variants: BTreeMap<String, String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
