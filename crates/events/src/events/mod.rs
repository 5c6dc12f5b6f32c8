//! Domain-driven event types

use serde::{Deserialize, Serialize};

mod build;
mod general;
mod progress;

pub use build::{BuildEvent, BuildPhase};
pub use general::GeneralEvent;
pub use progress::ProgressEvent;

/// Top-level event wrapper routed through the pipeline channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum AppEvent {
    Build(BuildEvent),
    Progress(ProgressEvent),
    General(GeneralEvent),
}

impl AppEvent {
    /// Severity for routing this event into logging/telemetry
    #[must_use]
    pub fn level(&self) -> crate::EventLevel {
        match self {
            Self::Build(event) => match event {
                BuildEvent::Failed { .. } => crate::EventLevel::Error,
                BuildEvent::RetryScheduled { .. } => crate::EventLevel::Warn,
                _ => crate::EventLevel::Info,
            },
            Self::Progress(event) => match event {
                ProgressEvent::Failed { .. } => crate::EventLevel::Error,
                _ => crate::EventLevel::Debug,
            },
            Self::General(event) => match event {
                GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. } => {
                    crate::EventLevel::Error
                }
                GeneralEvent::Warning { .. } => crate::EventLevel::Warn,
                GeneralEvent::DebugLog { .. } => crate::EventLevel::Debug,
                GeneralEvent::OperationStarted { .. } | GeneralEvent::OperationCompleted { .. } => {
                    crate::EventLevel::Info
                }
            },
        }
    }

    /// Subsystem that originated this event
    #[must_use]
    pub fn source(&self) -> crate::EventSource {
        match self {
            Self::Build(_) => crate::EventSource::BUILD,
            Self::Progress(_) => crate::EventSource::PROGRESS,
            Self::General(_) => crate::EventSource::GENERAL,
        }
    }

    /// Build session or operation identifier carried by the event, if any
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Self::Build(event) => match event {
                BuildEvent::SessionStarted { session_id, .. }
                | BuildEvent::StatusChanged { session_id, .. }
                | BuildEvent::CommandStarted { session_id, .. }
                | BuildEvent::CommandCompleted { session_id, .. }
                | BuildEvent::RetryScheduled { session_id, .. }
                | BuildEvent::Completed { session_id, .. }
                | BuildEvent::Failed { session_id, .. } => Some(session_id),
            },
            Self::Progress(event) => match event {
                ProgressEvent::Started { id, .. }
                | ProgressEvent::Updated { id, .. }
                | ProgressEvent::Completed { id, .. }
                | ProgressEvent::Failed { id, .. } => Some(id),
            },
            Self::General(_) => None,
        }
    }
}

/// Failure details attached to terminal progress events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Human-readable description of what went wrong
    pub message: String,
    /// Stable taxonomy code, when the failure was classified
    pub code: Option<String>,
    /// Remediation hint, when the taxonomy carries one
    pub hint: Option<String>,
}

impl FailureContext {
    /// Failure context with no taxonomy attached
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            hint: None,
        }
    }
}
