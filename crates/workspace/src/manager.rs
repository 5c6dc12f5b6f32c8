//! Workspace creation, materialization, and retention

use launchpad_errors::{Error, WorkspaceError};
use launchpad_types::FileManifest;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::paths::validate_manifest_path;

/// Marker file dropped in every live workspace.
///
/// The retention sweep refuses to delete directories that still carry it, so
/// a build in flight cannot have its workspace pruned out from under it by a
/// concurrent build's sweep.
pub const ACTIVE_MARKER: &str = ".active";

/// Default number of workspaces the retention sweep keeps system-wide
pub const DEFAULT_RETAIN: usize = 10;

/// One build's isolated directory
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    slug: String,
    created_ms: u64,
}

impl Workspace {
    /// Directory holding this build's materialized files
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project slug this workspace was created for
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Creation timestamp embedded in the directory name (unix millis)
    #[must_use]
    pub fn created_ms(&self) -> u64 {
        self.created_ms
    }
}

/// Creates, materializes, and reclaims workspaces under one base directory
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    base_dir: PathBuf,
}

impl WorkspaceManager {
    /// Manager rooted at `base_dir` (created lazily on first use)
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Manager rooted at the process-wide default: `<tmp>/launchpad-builds`
    #[must_use]
    pub fn default_base() -> Self {
        Self::new(std::env::temp_dir().join("launchpad-builds"))
    }

    /// Base directory all workspaces live under
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create a fresh workspace directory named `<slug>-<unix-millis>`.
    ///
    /// The new workspace starts with an [`ACTIVE_MARKER`] file; call
    /// [`WorkspaceManager::release`] once the build resolves so the
    /// retention sweep may reclaim it later.
    ///
    /// # Errors
    ///
    /// Returns an error if the slug is unusable as a directory-name prefix
    /// or any directory/file creation fails.
    pub async fn create(&self, slug: &str) -> Result<Workspace, Error> {
        validate_slug(slug)?;

        tokio::fs::create_dir_all(&self.base_dir).await.map_err(|err| {
            Error::Workspace(WorkspaceError::BaseDirUnavailable {
                message: format!("{}: {err}", self.base_dir.display()),
            })
        })?;

        // Two builds for the same slug inside one millisecond would collide;
        // bump the embedded timestamp until the name is free.
        let mut created_ms = now_millis();
        loop {
            let root = self.base_dir.join(format!("{slug}-{created_ms}"));
            match tokio::fs::create_dir(&root).await {
                Ok(()) => {
                    let marker = root.join(ACTIVE_MARKER);
                    tokio::fs::write(&marker, b"").await.map_err(|err| {
                        Error::Workspace(WorkspaceError::CreateFailed {
                            path: marker.display().to_string(),
                            message: err.to_string(),
                        })
                    })?;
                    return Ok(Workspace {
                        root,
                        slug: slug.to_string(),
                        created_ms,
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    created_ms += 1;
                }
                Err(err) => {
                    return Err(Error::Workspace(WorkspaceError::CreateFailed {
                        path: root.display().to_string(),
                        message: err.to_string(),
                    }))
                }
            }
        }
    }

    /// Materialize a file manifest into a workspace.
    ///
    /// Parent directories are created recursively; nested paths of arbitrary
    /// depth are supported. Paths are validated first, so a manifest that
    /// attempts to escape the workspace writes nothing at all.
    ///
    /// # Errors
    ///
    /// Returns an error on the first invalid path or failed write.
    pub async fn write_manifest(
        &self,
        workspace: &Workspace,
        manifest: &FileManifest,
    ) -> Result<(), Error> {
        for (path, _) in manifest.iter() {
            validate_manifest_path(path).map_err(Error::Workspace)?;
        }

        for (path, content) in manifest.iter() {
            let target = workspace.root().join(path);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|err| {
                    Error::Workspace(WorkspaceError::WriteFailed {
                        path: parent.display().to_string(),
                        message: err.to_string(),
                    })
                })?;
            }
            tokio::fs::write(&target, content).await.map_err(|err| {
                Error::Workspace(WorkspaceError::WriteFailed {
                    path: target.display().to_string(),
                    message: err.to_string(),
                })
            })?;
        }
        Ok(())
    }

    /// Drop a workspace's in-use marker, making it eligible for pruning.
    ///
    /// Idempotent: an already-released workspace is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker exists but cannot be removed.
    pub async fn release(&self, workspace: &Workspace) -> Result<(), Error> {
        let marker = workspace.root().join(ACTIVE_MARKER);
        match tokio::fs::remove_file(&marker).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::io_with_path(&err, marker)),
        }
    }

    /// Retention sweep: keep the `keep` most-recently-created workspaces,
    /// delete the rest.
    ///
    /// Ordering comes from the parsed millisecond suffix, not the raw
    /// directory name - a slug that happens to prefix another slug must not
    /// shuffle retention order. Directories without a parseable suffix are
    /// left alone, as are live workspaces still carrying their
    /// [`ACTIVE_MARKER`]. Per-directory deletions are best-effort: one
    /// locked directory never aborts pruning the others.
    ///
    /// # Errors
    ///
    /// Returns an error only if the base directory cannot be listed; a
    /// missing base directory means there is nothing to prune.
    pub async fn prune(&self, keep: usize) -> Result<(), Error> {
        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            // Nothing to prune before the first build.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(Error::io_with_path(&err, &self.base_dir)),
        };

        let mut workspaces: Vec<(u64, String, PathBuf)> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| Error::io_with_path(&err, &self.base_dir))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|ft| ft.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(ts) = parse_timestamp_suffix(&name) {
                workspaces.push((ts, name, entry.path()));
            }
        }

        // Newest first; name breaks the (unlikely) same-millisecond tie.
        workspaces.sort_by(|a, b| (b.0, &b.1).cmp(&(a.0, &a.1)));

        for (_, name, path) in workspaces.into_iter().skip(keep) {
            if tokio::fs::try_exists(path.join(ACTIVE_MARKER))
                .await
                .unwrap_or(false)
            {
                tracing::debug!(workspace = %name, "skipping live workspace during prune");
                continue;
            }
            if let Err(err) = crate::remove_workspace(&path).await {
                tracing::debug!(workspace = %name, error = %err, "prune skipped undeletable workspace");
            }
        }

        Ok(())
    }
}

fn validate_slug(slug: &str) -> Result<(), Error> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::Workspace(WorkspaceError::InvalidSlug {
            slug: slug.to_string(),
            reason: "only letters, digits, dashes, and underscores are allowed".to_string(),
        }))
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Parse the `-<unix-millis>` suffix out of a workspace directory name
fn parse_timestamp_suffix(name: &str) -> Option<u64> {
    let (_, suffix) = name.rsplit_once('-')?;
    suffix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_suffix_parsing() {
        assert_eq!(parse_timestamp_suffix("my-site-1722470400123"), Some(1_722_470_400_123));
        assert_eq!(parse_timestamp_suffix("no-suffix-here"), None);
        assert_eq!(parse_timestamp_suffix("plain"), None);
    }

    #[test]
    fn slug_validation() {
        assert!(validate_slug("my-site_2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("../up").is_err());
        assert!(validate_slug("a/b").is_err());
    }
}
