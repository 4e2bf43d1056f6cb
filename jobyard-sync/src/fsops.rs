//! Filesystem primitives shared by the job actions.
//!
//! Everything here reports [`ActionError::Io`] with the offending path so a
//! per-job failure names the file that broke, not just the errno.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{action_io_err, ActionError};

/// Create a job directory. Strict: an already existing directory is an
/// error, because creation is only classified for names absent from the
/// active tree and a leftover directory means the trees are out of step.
pub(crate) fn create_job_dir(dir: &Path) -> Result<(), ActionError> {
    fs::create_dir(dir).map_err(|e| action_io_err(dir, e))
}

/// Write `content` to `path` through a `.tmp` sibling and an atomic rename.
///
/// Line endings are normalised to LF first. A failed rename removes the
/// sibling so no `.tmp` litter survives.
pub(crate) fn write_config(path: &Path, content: &str) -> Result<(), ActionError> {
    let normalized = content.replace("\r\n", "\n");

    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    fs::write(&tmp, normalized).map_err(|e| action_io_err(&tmp, e))?;

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(action_io_err(path, e));
    }
    Ok(())
}

/// Move a directory, falling back to copy-and-remove when the rename
/// crosses a filesystem boundary.
pub(crate) fn move_dir(from: &Path, to: &Path) -> Result<(), ActionError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            copy_dir_recursive(from, to)?;
            fs::remove_dir_all(from).map_err(|e| action_io_err(from, e))
        }
        Err(e) => Err(action_io_err(from, e)),
    }
}

fn copy_dir_recursive(from: &Path, to: &Path) -> Result<(), ActionError> {
    fs::create_dir_all(to).map_err(|e| action_io_err(to, e))?;
    for entry in fs::read_dir(from).map_err(|e| action_io_err(from, e))? {
        let entry = entry.map_err(|e| action_io_err(from, e))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| action_io_err(&source, e))?;
        if file_type.is_dir() {
            copy_dir_recursive(&source, &target)?;
        } else {
            fs::copy(&source, &target).map_err(|e| action_io_err(&source, e))?;
        }
    }
    Ok(())
}
