//! Build pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error("install failed: {message}")]
    InstallFailed { message: String },

    #[error("build failed: {message}")]
    BuildFailed { message: String },

    #[error("build output directory not found: {path}")]
    OutputDirMissing { path: String },

    #[error("retry budget exhausted for {phase} after {retries} retries")]
    RetriesExhausted { phase: String, retries: u32 },

    #[error("artifact collection failed: {message}")]
    ArtifactCollectionFailed { message: String },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallFailed { .. } => {
                Some("Check the dependency list and registry availability.")
            }
            Self::BuildFailed { .. } => Some("Inspect the build logs for compile errors."),
            Self::OutputDirMissing { .. } => {
                Some("Verify the build script produces a static export directory.")
            }
            Self::RetriesExhausted { .. } => Some("Wait for the transient condition to clear, then retry."),
            Self::ArtifactCollectionFailed { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InstallFailed { .. } => "build.install_failed",
            Self::BuildFailed { .. } => "build.build_failed",
            Self::OutputDirMissing { .. } => "build.output_dir_missing",
            Self::RetriesExhausted { .. } => "build.retries_exhausted",
            Self::ArtifactCollectionFailed { .. } => "build.artifact_collection_failed",
        };
        Some(code)
    }
}
