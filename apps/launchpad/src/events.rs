//! Terminal rendering of pipeline events

use console::style;
use launchpad_events::{AppEvent, BuildEvent, EventMeta, GeneralEvent, ProgressEvent};
use serde_json::json;

/// Renders the event stream: styled lines for humans, one JSON object per
/// line for machines.
pub struct EventHandler {
    json: bool,
    debug: bool,
}

impl EventHandler {
    pub fn new(json: bool, debug: bool) -> Self {
        Self { json, debug }
    }

    pub fn handle_event(&mut self, event: &AppEvent) {
        if self.json {
            self.render_json(event);
        } else {
            self.render_human(event);
        }
    }

    fn render_json(&self, event: &AppEvent) {
        let mut meta = EventMeta::new(event.level(), event.source());
        if let Some(correlation) = event.correlation_id() {
            meta = meta.with_correlation_id(correlation);
        }
        let line = json!({ "meta": meta, "event": event });
        println!("{line}");
    }

    fn render_human(&self, event: &AppEvent) {
        match event {
            AppEvent::Build(build) => self.render_build(build),
            AppEvent::General(general) => self.render_general(general),
            AppEvent::Progress(progress) => {
                if self.debug {
                    if let ProgressEvent::Updated { current, total, .. } = progress {
                        eprintln!("{}", style(format!("progress {current}/{total:?}")).dim());
                    }
                }
            }
        }
    }

    fn render_build(&self, event: &BuildEvent) {
        match event {
            BuildEvent::SessionStarted { slug, file_count, .. } => {
                println!("{} {slug} ({file_count} files)", style("building").bold());
            }
            BuildEvent::StatusChanged { message, percent, .. } => {
                println!("{} {message}", style(format!("[{percent:>3}%]")).dim());
            }
            BuildEvent::CommandStarted { command, .. } => {
                if self.debug {
                    eprintln!("{}", style(format!("$ {command}")).dim());
                }
            }
            BuildEvent::CommandCompleted { exit_code, duration, .. } => {
                if self.debug {
                    eprintln!(
                        "{}",
                        style(format!("exit {exit_code:?} after {duration:?}")).dim()
                    );
                }
            }
            BuildEvent::RetryScheduled {
                phase,
                attempt,
                max_retries,
                delay,
                code,
                ..
            } => {
                println!(
                    "{} {phase} attempt {attempt}/{max_retries} in {}ms ({code})",
                    style("retry").yellow().bold(),
                    delay.as_millis()
                );
            }
            BuildEvent::Completed {
                artifact_count,
                total_retries,
                duration,
                ..
            } => {
                println!(
                    "{} {artifact_count} artifacts in {:.1}s ({total_retries} retries)",
                    style("✓ build ready:").green().bold(),
                    duration.as_secs_f64()
                );
            }
            BuildEvent::Failed {
                error,
                code,
                suggested_fix,
                total_retries,
                ..
            } => {
                println!("{} {error}", style("✗ build failed:").red().bold());
                if let Some(code) = code {
                    println!("  code: {code} (after {total_retries} retries)");
                }
                if let Some(fix) = suggested_fix {
                    println!("  hint: {fix}");
                }
            }
        }
    }

    fn render_general(&self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => {
                println!("{} {message}", style("warning:").yellow().bold());
                if let Some(context) = context {
                    println!("  {context}");
                }
            }
            GeneralEvent::Error { message, details } => {
                println!("{} {message}", style("error:").red().bold());
                if let Some(details) = details {
                    println!("  {details}");
                }
            }
            GeneralEvent::DebugLog { message } => {
                if self.debug {
                    eprintln!("{}", style(message).dim());
                }
            }
            GeneralEvent::OperationStarted { .. }
            | GeneralEvent::OperationCompleted { .. }
            | GeneralEvent::OperationFailed { .. } => {}
        }
    }
}
