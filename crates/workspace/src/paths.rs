//! Manifest path validation

use launchpad_errors::WorkspaceError;
use std::path::{Component, Path};

/// Reject manifest paths that could land outside the workspace root.
///
/// Accepted paths are relative, forward-slash separated, and contain only
/// normal components: no `..`, no absolute paths, no drive prefixes.
///
/// # Errors
///
/// Returns [`WorkspaceError::PathEscapeAttempt`] for any offending path.
pub fn validate_manifest_path(path: &str) -> Result<(), WorkspaceError> {
    if path.is_empty() {
        return Err(escape(path, "empty path"));
    }
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(escape(path, "absolute paths are not allowed"));
    }
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) => {}
            Component::ParentDir => {
                return Err(escape(path, "parent-directory segments are not allowed"))
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {
                return Err(escape(path, "rooted paths are not allowed"))
            }
        }
    }
    Ok(())
}

fn escape(path: &str, reason: &str) -> WorkspaceError {
    WorkspaceError::PathEscapeAttempt {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
