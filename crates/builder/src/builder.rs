//! The pipeline orchestrator state machine

use std::time::Instant;

use launchpad_classifier::{classify, ErrorClassification};
use launchpad_errors::{Error, UserFacingError};
use launchpad_events::{
    AppEvent, BuildEvent, BuildPhase, EventEmitter, EventSender, FailureContext,
};
use launchpad_retry::RetryState;
use launchpad_runner::{ProcessInvocation, ProcessOutcome};
use launchpad_types::{BuildStatus, FileManifest};
use launchpad_workspace::{Workspace, WorkspaceManager};
use uuid::Uuid;

use crate::cleanup::best_effort;
use crate::{BuildConfig, BuildResult};

// Advisory percent markers for the success path.
const PROGRESS_PREPARING: u8 = 10;
const PROGRESS_INSTALLING: u8 = 30;
const PROGRESS_BUILDING: u8 = 60;
const PROGRESS_COLLECTING: u8 = 90;
const PROGRESS_READY: u8 = 100;

/// Log lines kept from each attempt's combined output
const OUTPUT_TAIL_LINES: usize = 20;

/// Drives builds end to end: workspace materialization, supervised install
/// and build subprocesses with classified retries, and artifact collection.
#[derive(Debug, Clone)]
pub struct Builder {
    config: BuildConfig,
    event_sender: Option<EventSender>,
}

impl EventEmitter for Builder {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// How one retry-supervised phase resolved
struct PhaseResolution {
    outcome: ProcessOutcome,
    state: RetryState,
}

impl Builder {
    /// Builder with the given configuration and no event sink
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            event_sender: None,
        }
    }

    /// Attach an event sink; pipeline progress flows through it
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run one build to a terminal result.
    ///
    /// Never returns an error: every failure mode folds into the returned
    /// [`BuildResult`]. Dropping the future aborts any in-flight subprocess.
    pub async fn build_project(&self, manifest: &FileManifest, slug: &str) -> BuildResult {
        let session_id = format!("build-{}", Uuid::new_v4());
        let started = Instant::now();
        let manager = self.config.workspace_manager();

        self.emit(AppEvent::Build(BuildEvent::SessionStarted {
            session_id: session_id.clone(),
            slug: slug.to_string(),
            file_count: manifest.len(),
        }));
        self.emit_progress_started(&session_id, "build", Some(100));

        // preparing: retention sweep first, then materialize. The sweep is
        // best-effort and never blocks the build; setup failures are
        // terminal without consulting the retry engine.
        self.emit_build_status(
            &session_id,
            BuildStatus::Preparing,
            "Preparing isolated workspace",
            PROGRESS_PREPARING,
        );
        best_effort(
            "workspace retention sweep",
            manager.prune(self.config.retain_workspaces),
        )
        .await;

        let workspace = match self.prepare(&manager, manifest, slug).await {
            Ok(workspace) => workspace,
            Err(err) => {
                return self
                    .fail(
                        &session_id,
                        slug,
                        BuildStatus::Preparing,
                        None,
                        err.user_message().into_owned(),
                        None,
                        Vec::new(),
                        0,
                    );
            }
        };

        // installing
        self.emit_build_status(
            &session_id,
            BuildStatus::Installing,
            "Installing dependencies",
            PROGRESS_INSTALLING,
        );
        let install = self.run_phase(&session_id, BuildPhase::Install, &workspace).await;
        let install_retries = install.state.retries();
        let mut logs = install.state.logs().to_vec();
        if !install.outcome.success {
            let classification = install.state.last_classification().copied();
            best_effort("workspace release", manager.release(&workspace)).await;
            return self
                .fail(
                    &session_id,
                    slug,
                    BuildStatus::Installing,
                    Some(&workspace),
                    describe_failure(classification.as_ref(), &install.outcome),
                    classification,
                    logs,
                    install_retries,
                );
        }

        // building
        self.emit_build_status(
            &session_id,
            BuildStatus::Building,
            "Building production bundle",
            PROGRESS_BUILDING,
        );
        let build = self.run_phase(&session_id, BuildPhase::Build, &workspace).await;
        let total_retries = install_retries + build.state.retries();
        logs.extend(build.state.logs().iter().cloned());
        if !build.outcome.success {
            let classification = build.state.last_classification().copied();
            best_effort("workspace release", manager.release(&workspace)).await;
            return self
                .fail(
                    &session_id,
                    slug,
                    BuildStatus::Building,
                    Some(&workspace),
                    describe_failure(classification.as_ref(), &build.outcome),
                    classification,
                    logs,
                    total_retries,
                );
        }

        // The build tool reported success; the export directory must exist
        // on disk. Its absence surfaces directly, without reclassification
        // or retries.
        let out_dir = workspace.root().join(&self.config.out_dir_name);
        let out_dir_present = tokio::fs::metadata(&out_dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !out_dir_present {
            best_effort("workspace release", manager.release(&workspace)).await;
            return self
                .fail(
                    &session_id,
                    slug,
                    BuildStatus::Building,
                    Some(&workspace),
                    "build output directory not found".to_string(),
                    None,
                    logs,
                    total_retries,
                );
        }

        // collecting
        self.emit_build_status(
            &session_id,
            BuildStatus::Collecting,
            "Collecting build artifacts",
            PROGRESS_COLLECTING,
        );
        let artifacts = match launchpad_artifacts::collect(&out_dir).await {
            Ok(artifacts) => artifacts,
            Err(err) => {
                best_effort("workspace release", manager.release(&workspace)).await;
                return self
                    .fail(
                        &session_id,
                        slug,
                        BuildStatus::Collecting,
                        Some(&workspace),
                        err.user_message().into_owned(),
                        None,
                        logs,
                        total_retries,
                    );
            }
        };

        // ready
        best_effort("workspace release", manager.release(&workspace)).await;
        self.emit_build_status(&session_id, BuildStatus::Ready, "Build ready", PROGRESS_READY);
        self.emit(AppEvent::Build(BuildEvent::Completed {
            session_id: session_id.clone(),
            slug: slug.to_string(),
            out_dir: out_dir.clone(),
            artifact_count: artifacts.len(),
            total_retries,
            duration: started.elapsed(),
        }));
        self.emit_progress_completed(&session_id, started.elapsed());

        BuildResult {
            success: true,
            workspace: Some(workspace.root().to_path_buf()),
            out_dir: Some(out_dir),
            error: None,
            classification: None,
            logs,
            retry_count: total_retries,
            artifacts: Some(artifacts),
        }
    }

    /// Materialize the manifest into a fresh workspace
    async fn prepare(
        &self,
        manager: &WorkspaceManager,
        manifest: &FileManifest,
        slug: &str,
    ) -> Result<Workspace, Error> {
        let workspace = manager.create(slug).await?;
        manager.write_manifest(&workspace, manifest).await?;
        self.emit_debug(format!(
            "materialized {} files into {}",
            manifest.len(),
            workspace.root().display()
        ));
        Ok(workspace)
    }

    /// Run one phase's subprocess under the retry discipline.
    ///
    /// Each attempt threads an immutable [`RetryState`] accumulator forward:
    /// logs, retries spent, and the last classification seen. Resolution is
    /// either a successful outcome or budget exhaustion.
    async fn run_phase(
        &self,
        session_id: &str,
        phase: BuildPhase,
        workspace: &Workspace,
    ) -> PhaseResolution {
        let invocation = self.phase_invocation(phase, workspace);
        let command = invocation.display_command();
        let mut state = RetryState::new();

        loop {
            self.emit(AppEvent::Build(BuildEvent::CommandStarted {
                session_id: session_id.to_string(),
                phase,
                command: command.clone(),
                working_dir: workspace.root().to_path_buf(),
                timeout: invocation.timeout(),
            }));

            let attempt_started = Instant::now();
            let outcome = launchpad_runner::run(&invocation).await;

            self.emit(AppEvent::Build(BuildEvent::CommandCompleted {
                session_id: session_id.to_string(),
                phase,
                command: command.clone(),
                exit_code: outcome.exit_code,
                duration: attempt_started.elapsed(),
            }));

            state = state.with_log(format!("[{phase}] $ {command}"));
            if let Some(tail) = output_tail(&outcome) {
                state = state.with_log(tail);
            }

            if outcome.success {
                return PhaseResolution { outcome, state };
            }

            let classification = classify(&outcome.failure_text(), state.logs());
            state = state.observe_failure(classification);

            if !launchpad_retry::should_retry(&classification, state.retries()) {
                return PhaseResolution { outcome, state };
            }

            state = state.schedule_retry();
            let attempt = state.retries();
            let delay = launchpad_retry::compute_delay(classification.retry_delay_ms, attempt)
                .min(self.config.backoff_cap());

            state = state.with_log(format!(
                "Retry attempt {attempt}/{} for {phase} in {}ms ({})",
                classification.max_retries,
                delay.as_millis(),
                classification.code,
            ));
            self.emit(AppEvent::Build(BuildEvent::RetryScheduled {
                session_id: session_id.to_string(),
                phase,
                attempt,
                max_retries: classification.max_retries,
                delay,
                code: classification.code.to_string(),
            }));

            tokio::time::sleep(delay).await;
        }
    }

    /// Invocation for one phase, rooted at the workspace with a sanitized,
    /// workspace-local environment.
    ///
    /// `HOME` and the package manager's cache/user-config point inside the
    /// workspace; sandboxed execution environments have no writable real
    /// home directory.
    fn phase_invocation(&self, phase: BuildPhase, workspace: &Workspace) -> ProcessInvocation {
        let (command, timeout) = match phase {
            BuildPhase::Install => (&self.config.install_command, self.config.install_timeout()),
            BuildPhase::Build => (&self.config.build_command, self.config.build_timeout()),
        };
        let root = workspace.root();
        ProcessInvocation::new(command, root)
            .with_timeout(timeout)
            .with_max_output_bytes(self.config.max_output_bytes)
            .with_env("HOME", root.display().to_string())
            .with_env("npm_config_cache", root.join(".npm-cache").display().to_string())
            .with_env(
                "npm_config_userconfig",
                root.join(".npmrc").display().to_string(),
            )
    }

    /// Fold a failure into the terminal result and emit the closing events.
    ///
    /// Failures end with an advisory `percent = 0`.
    #[allow(clippy::too_many_arguments)]
    fn fail(
        &self,
        session_id: &str,
        slug: &str,
        status: BuildStatus,
        workspace: Option<&Workspace>,
        error: String,
        classification: Option<ErrorClassification>,
        logs: Vec<String>,
        retry_count: u32,
    ) -> BuildResult {
        self.emit(AppEvent::Build(BuildEvent::Failed {
            session_id: session_id.to_string(),
            slug: slug.to_string(),
            status,
            error: error.clone(),
            code: classification.map(|c| c.code.to_string()),
            suggested_fix: classification.map(|c| c.suggested_fix.to_string()),
            total_retries: retry_count,
        }));
        self.emit_build_status(session_id, BuildStatus::Failed, error.clone(), 0);
        self.emit_progress_failed(
            session_id,
            FailureContext {
                message: error.clone(),
                code: classification.map(|c| c.code.to_string()),
                hint: classification.map(|c| c.suggested_fix.to_string()),
            },
        );

        BuildResult {
            success: false,
            workspace: workspace.map(|w| w.root().to_path_buf()),
            out_dir: None,
            error: Some(error),
            classification,
            logs,
            retry_count,
            artifacts: None,
        }
    }
}

/// Human-readable description for a failed phase: the taxonomy description
/// when the failure was classified, the raw outcome error otherwise.
fn describe_failure(
    classification: Option<&ErrorClassification>,
    outcome: &ProcessOutcome,
) -> String {
    match classification {
        Some(class) => class.description.to_string(),
        None => outcome
            .error
            .clone()
            .unwrap_or_else(|| "build step failed".to_string()),
    }
}

/// Last lines of an outcome's combined output, for the accumulated log trail
fn output_tail(outcome: &ProcessOutcome) -> Option<String> {
    let text = outcome.failure_text();
    if text.trim().is_empty() {
        return None;
    }
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    Some(lines[start..].join("\n"))
}
