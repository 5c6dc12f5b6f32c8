//! Pipeline state machine statuses

use serde::{Deserialize, Serialize};

/// Observable status of one build as it moves through the pipeline.
///
/// `Ready` and `Failed` are terminal; `Failed` is reachable from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    Preparing,
    Installing,
    Building,
    Collecting,
    Ready,
    Failed,
}

impl BuildStatus {
    /// Whether the pipeline has resolved (successfully or not)
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// Stable identifier used in progress events and JSON output
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Installing => "installing",
            Self::Building => "building",
            Self::Collecting => "collecting",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
