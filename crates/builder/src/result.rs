//! Terminal record of one build invocation

use launchpad_classifier::ErrorClassification;
use launchpad_types::ArtifactManifest;
use serde::Serialize;
use std::path::PathBuf;

/// What one call to [`crate::Builder::build_project`] produced.
///
/// Created once per invocation and immutable after return. On failure the
/// `error`/`classification`/`logs`/`retry_count` fields together form the
/// diagnosable report surfaced to operators.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    /// Whether the pipeline reached `ready`
    pub success: bool,
    /// Workspace directory, when one was created
    pub workspace: Option<PathBuf>,
    /// Static export directory, on success
    pub out_dir: Option<PathBuf>,
    /// Human-readable failure description
    pub error: Option<String>,
    /// Matched failure taxonomy entry, when the failure was classified
    pub classification: Option<ErrorClassification>,
    /// Accumulated attempt and retry log lines
    pub logs: Vec<String>,
    /// Cumulative retries across the install and build phases
    pub retry_count: u32,
    /// Collected deployable file set, on success. Held in memory for the
    /// deployment collaborator; not part of the serialized report.
    #[serde(skip)]
    pub artifacts: Option<ArtifactManifest>,
}

impl BuildResult {
    /// Remediation hint from the matched classification, if any
    #[must_use]
    pub fn suggested_fix(&self) -> Option<&'static str> {
        self.classification.map(|c| c.suggested_fix)
    }
}
