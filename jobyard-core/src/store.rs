//! YAML-backed configuration store.
//!
//! # Storage layout
//!
//! ```text
//! <config_root>/
//!   products/<id>.yaml    (mode 0600)
//!   platforms/<id>.yaml
//!   tasks/<id>.yaml
//!   projects/<id>.yaml
//! ```
//!
//! One document per entity. Saves are atomic: serialize → `.yaml.tmp`
//! sibling → `chmod 0600` → `rename`. The `.tmp` lives in the same
//! directory as the target so the rename never crosses filesystems.
//!
//! Tests construct the store over a `TempDir` root; only the CLI reaches
//! for the real `~/.jobyard` (via [`crate::settings::Settings::from_home`]).

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::types::{Platform, Product, Project, Task};

const PRODUCTS_DIR: &str = "products";
const PLATFORMS_DIR: &str = "platforms";
const TASKS_DIR: &str = "tasks";
const PROJECTS_DIR: &str = "projects";

/// Handle on a configuration root directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // -----------------------------------------------------------------------
    // 1. Products
    // -----------------------------------------------------------------------

    pub fn load_product(&self, id: &str) -> Result<Product, StoreError> {
        self.load_doc(PRODUCTS_DIR, id)
    }

    pub fn save_product(&self, product: &Product) -> Result<(), StoreError> {
        self.save_doc(PRODUCTS_DIR, &product.id, product)
    }

    // -----------------------------------------------------------------------
    // 2. Platforms (document name is the derived platform id)
    // -----------------------------------------------------------------------

    pub fn load_platform(&self, id: &str) -> Result<Platform, StoreError> {
        self.load_doc(PLATFORMS_DIR, id)
    }

    pub fn save_platform(&self, platform: &Platform) -> Result<(), StoreError> {
        self.save_doc(PLATFORMS_DIR, &platform.id(), platform)
    }

    // -----------------------------------------------------------------------
    // 3. Tasks
    // -----------------------------------------------------------------------

    pub fn load_task(&self, id: &str) -> Result<Task, StoreError> {
        self.load_doc(TASKS_DIR, id)
    }

    pub fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        self.save_doc(TASKS_DIR, &task.id, task)
    }

    // -----------------------------------------------------------------------
    // 4. Projects
    // -----------------------------------------------------------------------

    pub fn load_project(&self, id: &str) -> Result<Project, StoreError> {
        self.load_doc(PROJECTS_DIR, id)
    }

    pub fn save_project(&self, project: &Project) -> Result<(), StoreError> {
        self.save_doc(PROJECTS_DIR, &project.id, project)
    }

    /// Remove a stored project document.
    ///
    /// Returns [`StoreError::NotFound`] if the document does not exist.
    pub fn remove_project(&self, id: &str) -> Result<(), StoreError> {
        let path = self.doc_path(PROJECTS_DIR, id);
        if !path.exists() {
            return Err(StoreError::NotFound { path });
        }
        std::fs::remove_file(&path)?;
        Ok(())
    }

    /// All stored projects, sorted by id. An absent `projects/` directory is
    /// an empty store, not an error.
    pub fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let dir = self.root.join(PROJECTS_DIR);
        if !dir.exists() {
            return Ok(vec![]);
        }
        let mut entries: Vec<_> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".yaml"))
            .collect();
        entries.sort_by_key(|e| e.file_name());

        let mut projects = Vec::with_capacity(entries.len());
        for entry in entries {
            let contents = std::fs::read_to_string(entry.path())?;
            let project: Project = serde_yaml::from_str(&contents)
                .map_err(|e| StoreError::Parse { path: entry.path(), source: e })?;
            projects.push(project);
        }
        Ok(projects)
    }

    /// `<config_root>/<kind>/<id>.yaml` — pure, no I/O.
    pub fn doc_path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join(kind).join(format!("{id}.yaml"))
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn load_doc<T: DeserializeOwned>(&self, kind: &str, id: &str) -> Result<T, StoreError> {
        let path = self.doc_path(kind, id);
        if !path.exists() {
            return Err(StoreError::NotFound { path });
        }
        let contents = std::fs::read_to_string(&path)?;
        serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse { path, source: e })
    }

    fn save_doc<T: Serialize>(&self, kind: &str, id: &str, value: &T) -> Result<(), StoreError> {
        let dir = self.root.join(kind);
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            set_dir_permissions(&dir)?;
        }
        let path = self.doc_path(kind, id);
        let tmp_path = path.with_file_name(format!("{id}.yaml.tmp"));

        let yaml = serde_yaml::to_string(value)?;
        std::fs::write(&tmp_path, yaml)?;
        set_file_permissions(&tmp_path)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

/// Parse a project definition from an arbitrary path outside the store.
///
/// `apply` and `plan` take their incoming definition this way; the stored
/// copy under `projects/` is only written once reconciliation succeeds.
pub fn load_project_file(path: &Path) -> Result<Project, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound { path: path.to_path_buf() });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
