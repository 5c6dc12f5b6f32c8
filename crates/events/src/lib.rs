#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in launchpad
//!
//! This crate provides a domain-driven event system for the build pipeline.
//! All pipeline output goes through events - no direct logging or printing
//! is allowed outside the CLI.
//!
//! ## Architecture
//!
//! - **Domain-driven events**: Events grouped by functional domain (Build, Progress, General)
//! - **Unified `EventEmitter` trait**: Single, consistent API for all event emissions
//! - **Advisory progress**: Percent values are observational; consumers may only
//!   rely on them being non-decreasing within a successful run

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, BuildEvent, BuildPhase, FailureContext, GeneralEvent, ProgressEvent};

use launchpad_types::BuildStatus;
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender using the `AppEvent` system
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver using the `AppEvent` system
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel with the `AppEvent` system
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout the launchpad system
///
/// This trait provides a single, consistent API for emitting events regardless
/// of whether you have a raw `EventSender` or a struct that contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    /// Emit an operation failed event
    fn emit_operation_failed(&self, operation: impl Into<String>, error: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            error: error.into(),
        }));
    }

    /// Emit a point-in-time build status event with an advisory percent
    fn emit_build_status(
        &self,
        session_id: impl Into<String>,
        status: BuildStatus,
        message: impl Into<String>,
        percent: u8,
    ) {
        self.emit(AppEvent::Build(BuildEvent::StatusChanged {
            session_id: session_id.into(),
            status,
            message: message.into(),
            percent,
        }));
    }

    /// Emit a progress started event
    fn emit_progress_started(
        &self,
        id: impl Into<String>,
        operation: impl Into<String>,
        total: Option<u64>,
    ) {
        self.emit(AppEvent::Progress(ProgressEvent::started(
            id, operation, total,
        )));
    }

    /// Emit a progress completed event
    fn emit_progress_completed(&self, id: impl Into<String>, duration: std::time::Duration) {
        self.emit(AppEvent::Progress(ProgressEvent::completed(id, duration)));
    }

    /// Emit a progress failed event
    fn emit_progress_failed(&self, id: impl Into<String>, failure: FailureContext) {
        self.emit(AppEvent::Progress(ProgressEvent::failed(id, failure)));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
/// This allows `EventSender` to be used directly where `EventEmitter` is expected
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
