//! Subprocess supervision error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ProcessError {
    #[error("failed to spawn {command}: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("{command} timed out after {seconds} seconds")]
    Timeout { command: String, seconds: u64 },

    #[error("{command} exited with code {code:?}")]
    NonZeroExit { command: String, code: Option<i32> },

    #[error("failed to wait for {command}: {message}")]
    WaitFailed { command: String, message: String },
}

impl UserFacingError for ProcessError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SpawnFailed { .. } => {
                Some("Ensure the package manager is installed and on PATH.")
            }
            Self::Timeout { .. } => Some("Increase the phase timeout, then retry."),
            Self::NonZeroExit { .. } | Self::WaitFailed { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::SpawnFailed { .. } => "process.spawn_failed",
            Self::Timeout { .. } => "process.timeout",
            Self::NonZeroExit { .. } => "process.non_zero_exit",
            Self::WaitFailed { .. } => "process.wait_failed",
        };
        Some(code)
    }
}
