//! Archive-index snapshot.

use std::collections::BTreeSet;
use std::path::Path;

use jobyard_core::JobName;

use crate::error::UpdateError;

/// The set of job names currently present under the archive root.
///
/// Read exactly once per reconciliation, before classification, and never
/// refreshed mid-call: archiving a job during the same call must not make
/// it eligible for revival. An unreadable archive root (including a missing
/// one) is a precondition failure that aborts the whole call —
/// [`jobyard_core::Settings::ensure_layout`] is the provisioning step that
/// makes a fresh root valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveIndex {
    names: BTreeSet<JobName>,
}

impl ArchiveIndex {
    /// Snapshot the directory names under `archive_root`.
    pub fn read(archive_root: &Path) -> Result<Self, UpdateError> {
        let err = |source| UpdateError::ArchiveIndex {
            path: archive_root.to_path_buf(),
            source,
        };
        let mut names = BTreeSet::new();
        for entry in std::fs::read_dir(archive_root).map_err(err)? {
            let entry = entry.map_err(err)?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                names.insert(JobName::from(entry.file_name().to_string_lossy().into_owned()));
            }
        }
        Ok(Self { names })
    }

    pub fn contains(&self, name: &JobName) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &JobName> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<JobName> for ArchiveIndex {
    fn from_iter<I: IntoIterator<Item = JobName>>(iter: I) -> Self {
        Self { names: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn snapshots_directory_names_only() {
        let root = TempDir::new().expect("tempdir");
        fs::create_dir(root.path().join("tck-jdk8-wheat-el7.x86_64")).expect("mkdir");
        fs::create_dir(root.path().join("build-jdk8-wheat-el7.x86_64")).expect("mkdir");
        fs::write(root.path().join("stray-file"), b"ignored").expect("write");

        let index = ArchiveIndex::read(root.path()).expect("read");
        assert_eq!(index.len(), 2);
        assert!(index.contains(&JobName::from("tck-jdk8-wheat-el7.x86_64")));
        assert!(!index.contains(&JobName::from("stray-file")));
    }

    #[test]
    fn missing_root_aborts_with_archive_index_error() {
        let root = TempDir::new().expect("tempdir");
        let gone = root.path().join("no-archive-here");
        let err = ArchiveIndex::read(&gone).unwrap_err();
        assert!(
            matches!(err, UpdateError::ArchiveIndex { .. }),
            "expected ArchiveIndex error, got: {err}"
        );
        assert!(err.to_string().contains("no-archive-here"));
    }

    #[test]
    fn empty_root_is_an_empty_index() {
        let root = TempDir::new().expect("tempdir");
        let index = ArchiveIndex::read(root.path()).expect("read");
        assert!(index.is_empty());
    }

    #[test]
    fn from_iterator_for_fixtures() {
        let index: ArchiveIndex =
            vec![JobName::from("a"), JobName::from("b")].into_iter().collect();
        assert!(index.contains(&JobName::from("a")));
        assert_eq!(index.names().count(), 2);
    }
}
