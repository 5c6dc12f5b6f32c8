#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Build-output collection for the launchpad pipeline
//!
//! Walks a finished build's output directory into an in-memory manifest for
//! handoff to the deployment layer. Contents are opaque bytes; nothing here
//! interprets the files.

use launchpad_errors::{Error, Result};
use launchpad_types::ArtifactManifest;
use std::path::{Path, PathBuf};

/// Collect every regular file under `out_dir` into an artifact manifest.
///
/// Keys are paths relative to `out_dir`, normalized to forward slashes and
/// prefixed with a single leading slash. Traversal order is unspecified; the
/// returned map is ordered by key. An existing but empty output tree yields
/// an empty manifest, not an error.
///
/// # Errors
///
/// Returns an error if `out_dir` cannot be read or any file read fails.
pub async fn collect(out_dir: &Path) -> Result<ArtifactManifest> {
    let mut manifest = ArtifactManifest::new();
    let mut pending: Vec<PathBuf> = vec![out_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|err| Error::io_with_path(&err, &dir))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| Error::io_with_path(&err, &dir))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|err| Error::io_with_path(&err, &path))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|err| Error::io_with_path(&err, &path))?;
                manifest.insert(manifest_key(out_dir, &path), bytes);
            }
            // Symlinks and other special entries are not deployable files.
        }
    }

    Ok(manifest)
}

/// `/`-prefixed forward-slash key for a file under `out_dir`
fn manifest_key(out_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(out_dir).unwrap_or(path);
    let mut key = String::from("/");
    let mut first = true;
    for component in relative.components() {
        if !first {
            key.push('/');
        }
        key.push_str(&component.as_os_str().to_string_lossy());
        first = false;
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_slash_prefixed_and_forward_slashed() {
        let out = Path::new("/tmp/ws/out");
        let file = out.join("assets").join("app.js");
        assert_eq!(manifest_key(out, &file), "/assets/app.js");
        assert_eq!(manifest_key(out, &out.join("index.html")), "/index.html");
    }
}
