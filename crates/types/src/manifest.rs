//! Source and artifact manifests

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deployable file set produced by a successful build.
///
/// Keys are forward-slash paths with a single leading slash, relative to the
/// build output directory; values are raw file bytes.
pub type ArtifactManifest = BTreeMap<String, Vec<u8>>;

/// Input file set for one build: relative forward-slash path to text content.
///
/// Immutable once handed to the pipeline; paths of arbitrary depth are
/// allowed but must not escape the workspace root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileManifest(BTreeMap<String, String>);

impl FileManifest {
    /// Create an empty manifest
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a file, replacing any previous content at the same path
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.0.insert(path.into(), content.into());
    }

    /// Look up the content stored for a path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Iterate entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// Number of files in the manifest
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the manifest holds no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for FileManifest {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FileManifest {
    fn from(entries: [(&str, &str); N]) -> Self {
        entries
            .into_iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_path_order() {
        let manifest = FileManifest::from([("b.txt", "2"), ("a.txt", "1")]);
        let paths: Vec<&str> = manifest.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn serializes_as_plain_map() {
        let manifest = FileManifest::from([("index.html", "<html>")]);
        let json = serde_json::to_string(&manifest).unwrap();
        assert_eq!(json, r#"{"index.html":"<html>"}"#);
    }
}
