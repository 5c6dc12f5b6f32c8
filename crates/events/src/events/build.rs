use launchpad_types::BuildStatus;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Subprocess-backed phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    Install,
    Build,
}

impl BuildPhase {
    /// Stable identifier used in logs and event payloads
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Build => "build",
        }
    }
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    /// Build session started with comprehensive context
    SessionStarted {
        session_id: String,
        slug: String,
        file_count: usize,
    },

    /// Point-in-time status with an advisory percent (0-100)
    StatusChanged {
        session_id: String,
        status: BuildStatus,
        message: String,
        percent: u8,
    },

    /// Supervised command started
    CommandStarted {
        session_id: String,
        phase: BuildPhase,
        command: String,
        working_dir: PathBuf,
        timeout: Duration,
    },

    /// Supervised command completed
    CommandCompleted {
        session_id: String,
        phase: BuildPhase,
        command: String,
        exit_code: Option<i32>,
        duration: Duration,
    },

    /// A failed attempt was classified as retryable and a re-run is scheduled
    RetryScheduled {
        session_id: String,
        phase: BuildPhase,
        attempt: u32,
        max_retries: u32,
        delay: Duration,
        code: String,
    },

    /// Build completed successfully
    Completed {
        session_id: String,
        slug: String,
        out_dir: PathBuf,
        artifact_count: usize,
        total_retries: u32,
        duration: Duration,
    },

    /// Build failed terminally
    Failed {
        session_id: String,
        slug: String,
        status: BuildStatus,
        error: String,
        code: Option<String>,
        suggested_fix: Option<String>,
        total_retries: u32,
    },
}
