//! CLI entrypoint for persona-panel
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use panel_application::{CompositeEventSink, EventSink, PanelSessionManager};
use panel_domain::SessionStatus;
use panel_infrastructure::{ConfigLoader, FileConfig, GeneratorKind, JsonlEventSink};
use panel_presentation::{Cli, ConsoleFormatter, GeneratorChoice, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    info!("Starting persona-panel");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);

    for issue in config.check()? {
        warn!(code = ?issue.code, "{}", issue.message);
        if !cli.quiet {
            eprintln!("warning: {}", issue.message);
        }
    }

    if !config.output.color {
        colored::control::set_override(false);
    }

    let registry = Arc::new(config.to_registry()?);

    if cli.list_personas {
        print!("{}", ConsoleFormatter::format_personas(&registry));
        return Ok(());
    }

    let topic = match cli.topic.as_deref() {
        Some(t) => t,
        None => bail!("Topic is required. Use --list-personas or --show-config for other modes."),
    };

    // === Dependency Injection ===
    let orchestrator = Arc::new(config.to_orchestrator_config());
    let generator = config.generator.build()?;

    let mut sink = CompositeEventSink::new(Vec::new());
    if config.output.progress && !cli.quiet {
        if std::io::stderr().is_terminal() {
            sink.push(Arc::new(ProgressReporter::new(orchestrator.phases)));
        } else {
            sink.push(Arc::new(SimpleProgress));
        }
    }
    if let Some(path) = &config.output.events {
        let jsonl = JsonlEventSink::create(path)
            .with_context(|| format!("Failed to open event log {}", path.display()))?;
        sink.push(Arc::new(jsonl));
    }
    let sink: Arc<dyn EventSink> = Arc::new(sink);

    let mut manager =
        PanelSessionManager::new(registry, orchestrator, generator).with_event_sink(sink);
    if let Some(filter) = config.pipeline.content_filter() {
        manager = manager.with_content_filter(Arc::new(filter));
    }
    let manager = Arc::new(manager);

    let panel = config.panel.member_ids();
    let id = manager.start_session(topic, &panel).await?;

    // Ctrl-C ends the session; the partial transcript is still printed
    let interrupt = {
        let manager = manager.clone();
        let id = id.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!(session = %id, "Interrupted, ending session");
                if let Err(e) = manager.end_session(&id).await {
                    warn!(session = %id, error = %e, "Failed to end session");
                }
            }
        })
    };

    let outcome = manager.wait(&id).await?;
    interrupt.abort();

    let session = manager.get_session(&id).await?;
    let format = config.output.format.unwrap_or_default();
    println!("{}", ConsoleFormatter::render(&session, format));

    info!(
        session = %id,
        status = %outcome.status,
        utterances = outcome.utterance_count,
        degraded = outcome.degraded_count,
        "Session finished"
    );

    match outcome.status {
        SessionStatus::Failed { reason } => bail!("Session failed: {}", reason),
        _ => Ok(()),
    }
}

/// Command-line flags take priority over every config file
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if !cli.personas.is_empty() {
        config.panel.members = cli.personas.clone();
    }
    if let Some(seed) = cli.seed {
        config.pipeline.seed = Some(seed);
    }
    if let Some(pacing) = cli.pacing {
        config.pipeline.pacing = pacing;
    }
    if let Some(choice) = cli.generator {
        config.generator.kind = match choice {
            GeneratorChoice::Scripted => GeneratorKind::Scripted,
            GeneratorChoice::Echo => GeneratorKind::Echo,
            GeneratorChoice::Command => GeneratorKind::Command,
        };
    }
    if !cli.command.is_empty() {
        config.generator.command = cli.command.clone();
        if cli.generator.is_none() {
            config.generator.kind = GeneratorKind::Command;
        }
    }
    if let Some(format) = cli.output {
        config.output.format = Some(format.into());
    }
    if let Some(path) = &cli.events {
        config.output.events = Some(path.clone());
    }
    if cli.quiet {
        config.output.progress = false;
    }
}

/// Console logging to stderr, plus a daily rotated file when `--log-dir` is set.
/// `RUST_LOG` overrides the verbosity flags.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()))
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter());

    match &cli.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "persona-panel.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            tracing_subscriber::registry().with(console).with(file).init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(console).init();
            Ok(None)
        }
    }
}
