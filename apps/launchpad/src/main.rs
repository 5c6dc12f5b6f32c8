//! launchpad - build-and-deploy resilience pipeline CLI
//!
//! Materializes a generated project into an isolated workspace, drives the
//! package-manager install and static-site build as supervised subprocesses,
//! and reports either a deployable artifact set or a classified failure.

mod cli;
mod events;

use crate::cli::{Cli, Commands};
use crate::events::EventHandler;
use clap::Parser;
use console::style;
use launchpad_builder::{BuildConfig, BuildResult, Builder};
use launchpad_errors::{ConfigError, Error, UserFacingError};
use launchpad_events::EventReceiver;
use launchpad_types::FileManifest;
use launchpad_workspace::remove_workspace;
use std::path::{Path, PathBuf};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            error!("application error: {e}");
            if json_mode {
                let line = serde_json::json!({
                    "error": e.user_message(),
                    "code": e.user_code(),
                    "hint": e.user_hint(),
                });
                println!("{line}");
            } else {
                eprintln!("{} {}", style("error:").red().bold(), e.user_message());
                if let Some(hint) = e.user_hint() {
                    eprintln!("  hint: {hint}");
                }
            }
            process::exit(1);
        }
    }
}

fn init_tracing(json_mode: bool, debug: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if debug { "launchpad=debug" } else { "launchpad=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json_mode {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<i32, Error> {
    let config = load_config(&cli).await?;

    match cli.command {
        Commands::Build { project_dir, slug } => {
            build(config, &project_dir, &slug, cli.global.json, cli.global.debug).await
        }
        Commands::Prune { keep } => {
            let manager = config.workspace_manager();
            manager.prune(keep).await?;
            if !cli.global.json {
                println!("pruned workspaces under {}", manager.base_dir().display());
            }
            Ok(0)
        }
        Commands::Clean { workspace } => {
            remove_workspace(&workspace).await?;
            if !cli.global.json {
                println!("removed {}", workspace.display());
            }
            Ok(0)
        }
        Commands::Classify { message } => {
            let classification = launchpad_classifier::classify(&message, &[]);
            if cli.global.json {
                println!("{}", serde_json::to_string(&classification)?);
            } else {
                println!("code: {}", classification.code);
                println!(
                    "retryable: {} (budget {}, base delay {}ms)",
                    classification.retryable,
                    classification.max_retries,
                    classification.retry_delay_ms
                );
                println!("description: {}", classification.description);
                println!("hint: {}", classification.suggested_fix);
            }
            Ok(0)
        }
    }
}

async fn load_config(cli: &Cli) -> Result<BuildConfig, Error> {
    let mut config = match &cli.global.config {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await.map_err(|err| {
                Error::Config(ConfigError::ReadFailed {
                    path: path.display().to_string(),
                    message: err.to_string(),
                })
            })?;
            toml::from_str(&text).map_err(|err| {
                Error::Config(ConfigError::ParseFailed {
                    path: path.display().to_string(),
                    message: err.to_string(),
                })
            })?
        }
        None => BuildConfig::default(),
    };

    // CLI flags take precedence over the config file.
    if let Some(base_dir) = &cli.global.base_dir {
        config.base_dir = Some(base_dir.clone());
    }

    Ok(config)
}

async fn build(
    config: BuildConfig,
    project_dir: &Path,
    slug: &str,
    json_mode: bool,
    debug: bool,
) -> Result<i32, Error> {
    info!("starting build for {slug}");
    let manifest = read_project_dir(project_dir).await?;
    if manifest.is_empty() {
        return Err(Error::internal(format!(
            "no source files found under {}",
            project_dir.display()
        )));
    }

    let (event_sender, event_receiver) = launchpad_events::channel();
    let builder = Builder::new(config).with_event_sender(event_sender);
    let mut handler = EventHandler::new(json_mode, debug);

    let result = drive_build(&builder, &manifest, slug, event_receiver, &mut handler).await;

    if json_mode {
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(i32::from(!result.success))
}

/// Run the build while draining pipeline events concurrently
async fn drive_build(
    builder: &Builder,
    manifest: &FileManifest,
    slug: &str,
    mut event_receiver: EventReceiver,
    handler: &mut EventHandler,
) -> BuildResult {
    let mut build_future = Box::pin(builder.build_project(manifest, slug));

    loop {
        select! {
            result = &mut build_future => {
                // Drain any remaining events before reporting.
                while let Ok(event) = event_receiver.try_recv() {
                    handler.handle_event(&event);
                }
                return result;
            }
            event = event_receiver.recv() => {
                if let Some(event) = event {
                    handler.handle_event(&event);
                }
            }
        }
    }
}

/// Read a project directory into a file manifest.
///
/// Keys are forward-slash relative paths. Dependency and VCS directories are
/// skipped; so are files that are not valid UTF-8, since the manifest is a
/// text-content mapping.
async fn read_project_dir(project_dir: &Path) -> Result<FileManifest, Error> {
    const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", ".next"];

    let mut manifest = FileManifest::new();
    let mut pending: Vec<PathBuf> = vec![project_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|err| Error::io_with_path(&err, &dir))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| Error::io_with_path(&err, &dir))?
        {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry
                .file_type()
                .await
                .map_err(|err| Error::io_with_path(&err, &path))?;

            if file_type.is_dir() {
                if !SKIPPED_DIRS.contains(&name.as_str()) {
                    pending.push(path);
                }
            } else if file_type.is_file() {
                match tokio::fs::read_to_string(&path).await {
                    Ok(content) => {
                        manifest.insert(relative_key(project_dir, &path), content);
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                        tracing::warn!(path = %path.display(), "skipping non-UTF-8 file");
                    }
                    Err(err) => return Err(Error::io_with_path(&err, &path)),
                }
            }
        }
    }

    Ok(manifest)
}

/// Forward-slash relative path for a file under the project root
fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
