#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Workspace lifecycle management for the launchpad build pipeline
//!
//! Every build owns one isolated directory under a shared base:
//! `<base>/<slug>-<unix-millis>`. The millisecond suffix makes creation
//! order recoverable from the name alone, which the retention sweep relies
//! on. Workspaces are retained after a build resolves (for diagnosis and
//! artifact re-reads) and reclaimed either by the sweep or by an explicit
//! post-deploy removal.

mod manager;
mod paths;

pub use manager::{Workspace, WorkspaceManager, ACTIVE_MARKER, DEFAULT_RETAIN};
pub use paths::validate_manifest_path;

use launchpad_errors::Error;
use std::path::Path;

/// Recursive force-delete of a workspace directory.
///
/// Idempotent: a path that is already gone is not an error. Callers on
/// cleanup paths are expected to run this through a non-propagating wrapper
/// so a removal failure never masks a build's real outcome; the explicit
/// `launchpad clean` command surfaces the error instead.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be deleted.
pub async fn remove_workspace(path: &Path) -> Result<(), Error> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::io_with_path(&err, path)),
    }
}
