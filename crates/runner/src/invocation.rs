//! Invocation description for one supervised subprocess

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default output retention cap (10 MiB per stream)
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// One supervised subprocess execution: command line, working directory,
/// environment overrides, timeout, and output-buffer bound.
#[derive(Debug, Clone)]
pub struct ProcessInvocation {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
    env_overrides: HashMap<String, String>,
    timeout: Duration,
    max_output_bytes: usize,
}

impl ProcessInvocation {
    /// Describe a command to run in `cwd`.
    ///
    /// `command` is the argv vector; the first element is the program.
    /// An empty vector yields an invocation that fails at spawn time with a
    /// clear message instead of panicking.
    #[must_use]
    pub fn new(command: &[String], cwd: impl Into<PathBuf>) -> Self {
        let (program, args) = match command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self {
            program,
            args,
            cwd: cwd.into(),
            env_overrides: HashMap::new(),
            timeout: Duration::from_secs(120),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }

    /// Add or replace one environment override
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_overrides.insert(key.into(), value.into());
        self
    }

    /// Replace the whole override map
    #[must_use]
    pub fn with_env_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.env_overrides = overrides;
        self
    }

    /// Set the self-enforced timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-stream output retention cap
    #[must_use]
    pub fn with_max_output_bytes(mut self, cap: usize) -> Self {
        self.max_output_bytes = cap;
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[must_use]
    pub fn env_overrides(&self) -> &HashMap<String, String> {
        &self.env_overrides
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn max_output_bytes(&self) -> usize {
        self.max_output_bytes
    }

    /// Single-line rendering for logs and events
    #[must_use]
    pub fn display_command(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}
