/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Running basis dashboard (TUI or headless) with graceful shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod headless;
mod tui;

#[cfg(test)]
mod test_support;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use basis_monitor::{DashboardController, FeedMode, MonitorConfig};

use crate::tui::{LOG_BUFFER_CAPACITY, LogBuffer, LogBufferHandle, LogWriterFactory};

#[derive(Parser, Debug)]
#[command(name = "basis-monitor", version, about = "Spot/futures basis dashboard")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    /// Overrides `base_url` from the config file
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    #[arg(long = "mode", value_enum)]
    mode: Option<FeedMode>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Also append logs to this file
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Log dashboard updates instead of drawing the terminal UI.
    /// Send SIGHUP to retry after the connection gave up.
    #[arg(long)]
    headless: bool,
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let use_tui = !args.headless && !args.dry_run;
    let log_buffer: LogBufferHandle = Arc::new(StdMutex::new(LogBuffer::new(LOG_BUFFER_CAPACITY)));
    let _log_guard = init_tracing(
        &args.log_level,
        args.log_file.as_deref(),
        use_tui.then(|| log_buffer.clone()),
    )?;

    info!(
        config_path = ?args.config_path,
        headless = args.headless,
        dry_run = args.dry_run,
        "starting basis-monitor"
    );

    let config = load_config(&args)?;
    info!(
        base_url = %config.base_url,
        mode = config.mode.label(),
        display_limit = config.display_limit,
        "configuration loaded"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let mut controller =
        DashboardController::from_config(&config, &shutdown).context("start dashboard")?;

    let result = if use_tui {
        tui::run_tui(&mut controller, &config, log_buffer, shutdown.clone()).await
    } else {
        headless::run(&mut controller, shutdown.clone()).await
    };

    shutdown.cancel();
    controller.shutdown().await;
    info!("basis-monitor stopped");
    result
}

/// Stdout logging for headless runs; the TUI renders into `log_buffer` instead.
fn init_tracing(
    log_level: &str,
    log_file: Option<&Path>,
    log_buffer: Option<LogBufferHandle>,
) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let initialized = match log_buffer {
        Some(buffer) => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(LogWriterFactory::new(buffer)),
            )
            .try_init(),
        None => registry.with(fmt::layer()).try_init(),
    };
    initialized
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;

    Ok(guard)
}

fn load_config(args: &Cli) -> Result<MonitorConfig> {
    let mut config = match &args.config_path {
        Some(path) => MonitorConfig::from_file(path).context("load config")?,
        None => MonitorConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    config.validate().context("validate config")?;
    Ok(config)
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
