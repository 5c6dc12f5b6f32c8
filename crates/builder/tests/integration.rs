//! End-to-end pipeline tests with scripted subprocesses
//!
//! The install and build commands are `sh` scripts standing in for the real
//! package manager, so every failure mode is reproducible. Unix-only, like
//! the runner tests.

#![cfg(unix)]

use launchpad_builder::{BuildConfig, Builder};
use launchpad_classifier::ErrorCode;
use launchpad_events::{channel, AppEvent, BuildEvent};
use launchpad_types::{BuildStatus, FileManifest};
use launchpad_workspace::ACTIVE_MARKER;
use std::path::Path;

fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

/// Config rooted in a temp dir with a backoff clamp small enough for tests
fn test_config(base: &Path) -> BuildConfig {
    BuildConfig {
        base_dir: Some(base.to_path_buf()),
        backoff_cap_ms: 10,
        ..BuildConfig::default()
    }
}

fn site_manifest() -> FileManifest {
    FileManifest::from([
        ("package.json", r#"{"name":"site","scripts":{"build":"next build"}}"#),
        ("pages/index.tsx", "export default function Home() {}\n"),
    ])
}

const GOOD_BUILD: &str = "mkdir -p out && echo '<html>home</html>' > out/index.html";

#[tokio::test]
async fn successful_build_collects_artifacts() {
    let temp = tempfile::tempdir().unwrap();
    let config = BuildConfig {
        install_command: sh("true"),
        build_command: sh(GOOD_BUILD),
        ..test_config(temp.path())
    };

    let result = Builder::new(config)
        .build_project(&site_manifest(), "happy-path")
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(result.retry_count, 0);
    assert!(result.error.is_none());
    assert!(result.classification.is_none());

    let out_dir = result.out_dir.as_ref().unwrap();
    assert!(out_dir.ends_with("out"));

    let artifacts = result.artifacts.as_ref().unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(
        String::from_utf8_lossy(artifacts.get("/index.html").unwrap()).trim(),
        "<html>home</html>"
    );

    // Resolved builds release their in-use marker but keep the workspace.
    let workspace = result.workspace.as_ref().unwrap();
    assert!(workspace.exists());
    assert!(!workspace.join(ACTIVE_MARKER).exists());
}

#[tokio::test]
async fn transient_install_failures_are_retried_to_success() {
    let temp = tempfile::tempdir().unwrap();
    // Fails twice with a network signature, then succeeds.
    let flaky_install = "\
count=$(cat .attempts 2>/dev/null || echo 0); count=$((count+1)); echo $count > .attempts; \
if [ $count -le 2 ]; then echo 'getaddrinfo ENOTFOUND host' >&2; exit 1; fi; exit 0";
    let config = BuildConfig {
        install_command: sh(flaky_install),
        build_command: sh(GOOD_BUILD),
        ..test_config(temp.path())
    };

    let result = Builder::new(config)
        .build_project(&site_manifest(), "flaky-install")
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(result.retry_count, 2);
    let retry_markers = result
        .logs
        .iter()
        .filter(|line| line.starts_with("Retry attempt"))
        .count();
    assert_eq!(retry_markers, 2);
}

#[tokio::test]
async fn auth_failures_are_terminal_without_retries() {
    let temp = tempfile::tempdir().unwrap();
    let config = BuildConfig {
        install_command: sh("echo 'Error: 401 Unauthorized' >&2; exit 1"),
        build_command: sh(GOOD_BUILD),
        ..test_config(temp.path())
    };

    let result = Builder::new(config)
        .build_project(&site_manifest(), "auth-fail")
        .await;

    assert!(!result.success);
    assert_eq!(result.retry_count, 0);
    let classification = result.classification.unwrap();
    assert_eq!(classification.code, ErrorCode::AuthFailed);
    assert!(!classification.retryable);
    assert!(result.suggested_fix().is_some());
    assert!(!result.logs.iter().any(|line| line.starts_with("Retry attempt")));
}

#[tokio::test]
async fn exhausted_retry_budget_surfaces_the_classification() {
    let temp = tempfile::tempdir().unwrap();
    // Always fails with a network signature; budget is 3 retries.
    let config = BuildConfig {
        install_command: sh("echo 'connect ECONNREFUSED 127.0.0.1:443' >&2; exit 1"),
        build_command: sh(GOOD_BUILD),
        ..test_config(temp.path())
    };

    let result = Builder::new(config)
        .build_project(&site_manifest(), "exhausted")
        .await;

    assert!(!result.success);
    assert_eq!(result.retry_count, 3);
    assert_eq!(result.classification.unwrap().code, ErrorCode::NetworkUnreachable);
}

#[tokio::test]
async fn type_errors_fail_the_build_phase_fatally() {
    let temp = tempfile::tempdir().unwrap();
    let config = BuildConfig {
        install_command: sh("true"),
        build_command: sh("echo 'Type error: x is not assignable' >&2; exit 1"),
        ..test_config(temp.path())
    };

    let result = Builder::new(config)
        .build_project(&site_manifest(), "type-error")
        .await;

    assert!(!result.success);
    assert_eq!(result.retry_count, 0);
    assert_eq!(result.classification.unwrap().code, ErrorCode::TypeCheckFailed);
}

#[tokio::test]
async fn missing_output_directory_is_not_reclassified() {
    let temp = tempfile::tempdir().unwrap();
    // Build reports success without producing out/.
    let config = BuildConfig {
        install_command: sh("true"),
        build_command: sh("true"),
        ..test_config(temp.path())
    };

    let result = Builder::new(config)
        .build_project(&site_manifest(), "no-out")
        .await;

    assert!(!result.success);
    assert_eq!(result.retry_count, 0);
    assert!(result.classification.is_none());
    assert_eq!(result.error.as_deref(), Some("build output directory not found"));
}

#[tokio::test]
async fn setup_failures_are_terminal_without_retry() {
    let temp = tempfile::tempdir().unwrap();
    // The base dir path is occupied by a regular file.
    let blocked = temp.path().join("blocked");
    tokio::fs::write(&blocked, b"not a directory").await.unwrap();
    let config = BuildConfig {
        install_command: sh("true"),
        build_command: sh(GOOD_BUILD),
        ..test_config(&blocked)
    };

    let result = Builder::new(config)
        .build_project(&site_manifest(), "setup-fail")
        .await;

    assert!(!result.success);
    assert!(result.workspace.is_none());
    assert_eq!(result.retry_count, 0);
    assert!(result.classification.is_none());
    assert!(result.error.is_some());
}

#[tokio::test]
async fn install_timeout_consumes_its_small_budget() {
    let temp = tempfile::tempdir().unwrap();
    // The command line carries the install marker; the process outlives its
    // timeout and is killed each attempt.
    let config = BuildConfig {
        install_command: sh(": npm install stand-in; exec sleep 30"),
        build_command: sh(GOOD_BUILD),
        install_timeout_ms: 300,
        ..test_config(temp.path())
    };

    let result = Builder::new(config)
        .build_project(&site_manifest(), "install-timeout")
        .await;

    assert!(!result.success);
    assert_eq!(result.classification.unwrap().code, ErrorCode::InstallTimeout);
    assert_eq!(result.retry_count, 2);
}

#[tokio::test]
async fn retries_accumulate_across_phases() {
    let temp = tempfile::tempdir().unwrap();
    let fail_once_then = |success: &str| {
        format!(
            "if [ ! -f .seen ]; then touch .seen; echo 'socket hang up' >&2; exit 1; fi; {success}"
        )
    };
    let config = BuildConfig {
        install_command: sh(&fail_once_then("rm -f .seen; exit 0")),
        build_command: sh(&fail_once_then(GOOD_BUILD)),
        ..test_config(temp.path())
    };

    let result = Builder::new(config)
        .build_project(&site_manifest(), "both-phases")
        .await;

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(result.retry_count, 2);
}

#[tokio::test]
async fn events_trace_the_state_machine() {
    let temp = tempfile::tempdir().unwrap();
    let config = BuildConfig {
        install_command: sh("true"),
        build_command: sh(GOOD_BUILD),
        ..test_config(temp.path())
    };
    let (tx, mut rx) = channel();

    let result = Builder::new(config)
        .with_event_sender(tx)
        .build_project(&site_manifest(), "events")
        .await;
    assert!(result.success);

    let mut statuses = Vec::new();
    let mut percents = Vec::new();
    let mut completed = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            AppEvent::Build(BuildEvent::StatusChanged { status, percent, .. }) => {
                statuses.push(status);
                percents.push(percent);
            }
            AppEvent::Build(BuildEvent::Completed { artifact_count, .. }) => {
                completed = true;
                assert_eq!(artifact_count, 1);
            }
            _ => {}
        }
    }

    assert!(completed);
    assert_eq!(
        statuses,
        vec![
            BuildStatus::Preparing,
            BuildStatus::Installing,
            BuildStatus::Building,
            BuildStatus::Collecting,
            BuildStatus::Ready,
        ]
    );
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn failed_builds_emit_a_final_zero_percent() {
    let temp = tempfile::tempdir().unwrap();
    let config = BuildConfig {
        install_command: sh("echo 'Error: 401 Unauthorized' >&2; exit 1"),
        build_command: sh(GOOD_BUILD),
        ..test_config(temp.path())
    };
    let (tx, mut rx) = channel();

    let result = Builder::new(config)
        .with_event_sender(tx)
        .build_project(&site_manifest(), "fail-events")
        .await;
    assert!(!result.success);

    let mut last_status = None;
    while let Ok(event) = rx.try_recv() {
        if let AppEvent::Build(BuildEvent::StatusChanged { status, percent, .. }) = event {
            last_status = Some((status, percent));
        }
    }
    assert_eq!(last_status, Some((BuildStatus::Failed, 0)));
}
