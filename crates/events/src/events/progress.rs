use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Progress tracking events
///
/// Progress is advisory. Within a successful run percent values are
/// non-decreasing; a failed run may end with a final zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    /// Progress tracking started
    Started {
        id: String,
        operation: String,
        total: Option<u64>,
    },

    /// Progress updated
    Updated {
        id: String,
        current: u64,
        total: Option<u64>,
    },

    /// Progress completed successfully
    Completed { id: String, duration: Duration },

    /// Progress failed
    Failed { id: String, failure: FailureContext },
}

impl ProgressEvent {
    /// Create a progress started event
    pub fn started(id: impl Into<String>, operation: impl Into<String>, total: Option<u64>) -> Self {
        Self::Started {
            id: id.into(),
            operation: operation.into(),
            total,
        }
    }

    /// Create a progress update event
    pub fn updated(id: impl Into<String>, current: u64, total: Option<u64>) -> Self {
        Self::Updated {
            id: id.into(),
            current,
            total,
        }
    }

    /// Create a progress completed event
    pub fn completed(id: impl Into<String>, duration: Duration) -> Self {
        Self::Completed {
            id: id.into(),
            duration,
        }
    }

    /// Create a progress failed event
    pub fn failed(id: impl Into<String>, failure: FailureContext) -> Self {
        Self::Failed {
            id: id.into(),
            failure,
        }
    }
}
