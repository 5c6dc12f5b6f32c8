//! Normalized result of one supervised subprocess

use launchpad_errors::ProcessError;

/// What one subprocess execution produced.
///
/// This is the runner's only failure signal: spawn errors, non-zero exits,
/// and timeouts all land here with `success = false` rather than escaping as
/// errors.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    /// Whether the process exited zero within its timeout
    pub success: bool,
    /// Exit code when the process ran to completion
    pub exit_code: Option<i32>,
    /// Captured stdout, truncated at the invocation's byte cap
    pub stdout: String,
    /// Captured stderr, truncated at the invocation's byte cap
    pub stderr: String,
    /// Forced-termination marker: the timeout fired and the child was killed
    pub timed_out: bool,
    /// Best-effort description when `success` is false
    pub error: Option<String>,
}

impl ProcessOutcome {
    /// Outcome for a process that never started
    #[must_use]
    pub fn spawn_failure(command: &str, err: &std::io::Error) -> Self {
        let error = ProcessError::SpawnFailed {
            command: command.to_string(),
            message: err.to_string(),
        };
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Combined output text used for failure classification: the error
    /// description plus both captured streams.
    #[must_use]
    pub fn failure_text(&self) -> String {
        let mut text = String::new();
        if let Some(error) = &self.error {
            text.push_str(error);
        }
        for stream in [&self.stdout, &self.stderr] {
            if !stream.is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(stream);
            }
        }
        text
    }
}
