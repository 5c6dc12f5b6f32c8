//! Workspace lifecycle error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum WorkspaceError {
    #[error("invalid project slug: {slug} - {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("failed to create workspace at {path}: {message}")]
    CreateFailed { path: String, message: String },

    #[error("failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("path escape attempt: {path} - {reason}")]
    PathEscapeAttempt { path: String, reason: String },

    #[error("workspace base directory unavailable: {message}")]
    BaseDirUnavailable { message: String },
}

impl UserFacingError for WorkspaceError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidSlug { .. } => {
                Some("Project slugs may only contain letters, digits, and dashes.")
            }
            Self::PathEscapeAttempt { .. } => {
                Some("Manifest paths must be relative and stay inside the workspace.")
            }
            Self::CreateFailed { .. } | Self::WriteFailed { .. } | Self::BaseDirUnavailable { .. } => {
                Some("Check free disk space and permissions on the build directory.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidSlug { .. } => "workspace.invalid_slug",
            Self::CreateFailed { .. } => "workspace.create_failed",
            Self::WriteFailed { .. } => "workspace.write_failed",
            Self::PathEscapeAttempt { .. } => "workspace.path_escape_attempt",
            Self::BaseDirUnavailable { .. } => "workspace.base_dir_unavailable",
        };
        Some(code)
    }
}
