//! Gesture pipeline binary entry point.
//!
//! Parses CLI flags, loads configuration, wires the vision loop to the
//! broadcaster's `axum` server, and shuts down gracefully on SIGINT/SIGTERM.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;

use gesture_pipeline::broadcaster::{server, Broadcaster};
use gesture_pipeline::config::Config;
use gesture_pipeline::landmark_source::NullLandmarkSource;
use gesture_pipeline::pipeline::{run_vision_loop, Pipeline};
use gesture_pipeline::stats::SharedStats;

/// Target camera frame rate the vision loop paces itself to (§5).
const TARGET_FPS: f32 = 30.0;

#[derive(Debug, Parser)]
#[command(name = "gesture-pipeline", about = "Hand gesture recognition pipeline and subscriber broadcaster")]
struct Cli {
    /// Path to a JSON config file. Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level, overridden by the RUST_LOG environment variable if set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Overrides `broadcaster.bind_host` from the config file.
    #[arg(long)]
    bind_host: Option<String>,

    /// Overrides `broadcaster.bind_port` from the config file.
    #[arg(long)]
    bind_port: Option<u16>,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] gesture_pipeline::config::ConfigError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.clone())).init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start tokio runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("startup failed: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(host) = cli.bind_host {
        config.broadcaster.bind_host = host;
    }
    if let Some(port) = cli.bind_port {
        config.broadcaster.bind_port = port;
    }

    log::info!(
        "gesture pipeline starting, broadcaster will bind {}:{}",
        config.broadcaster.bind_host, config.broadcaster.bind_port
    );

    let (broadcaster, control_rx) = Broadcaster::new(config.broadcaster.clone());
    let broadcaster = Arc::new(broadcaster);
    let stats = Arc::new(SharedStats::new());
    let running = Arc::new(AtomicBool::new(true));

    let pipeline = Pipeline::new(&config, broadcaster.clone(), control_rx);
    let source = Box::new(NullLandmarkSource);

    let vision_handle = tokio::spawn(run_vision_loop(pipeline, source, running.clone(), stats.clone(), TARGET_FPS));
    let status_handle = tokio::spawn(run_status_ticker(
        broadcaster.clone(),
        stats.clone(),
        config.broadcaster.status_interval_secs,
        running.clone(),
    ));

    let server_handle = {
        let broadcaster = broadcaster.clone();
        let host = config.broadcaster.bind_host.clone();
        let port = config.broadcaster.bind_port;
        tokio::spawn(async move { server::serve(&host, port, broadcaster).await })
    };

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to install SIGTERM handler");
    #[cfg(unix)]
    let sigterm_recv = sigterm.recv();
    #[cfg(not(unix))]
    let sigterm_recv = std::future::pending::<Option<()>>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("received SIGINT, shutting down");
        }
        _ = sigterm_recv => {
            log::info!("received SIGTERM, shutting down");
        }
        result = server_handle => {
            if let Ok(Err(err)) = result {
                log::error!("broadcaster server exited: {err}");
            }
        }
    }

    running.store(false, std::sync::atomic::Ordering::Relaxed);
    let _ = vision_handle.await;
    status_handle.abort();

    log::info!("shutdown complete");
    Ok(())
}

async fn run_status_ticker(
    broadcaster: Arc<Broadcaster>,
    stats: Arc<SharedStats>,
    interval_secs: u64,
    running: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
    while running.load(std::sync::atomic::Ordering::Relaxed) {
        ticker.tick().await;
        let (fps, latency_ms, hands_detected) = stats.snapshot();
        broadcaster.publish_status(fps, latency_ms, hands_detected).await;
    }
}

fn load_config(explicit_path: Option<&std::path::Path>) -> Result<Config, gesture_pipeline::config::ConfigError> {
    if let Some(path) = explicit_path {
        return Config::load(path);
    }

    let default_path = dirs::config_dir().map(|dir| dir.join("gesture-pipeline").join("config.json"));
    match default_path {
        Some(path) if path.exists() => Config::load(&path),
        _ => {
            log::info!("no config file found, using compiled-in defaults");
            Ok(Config::default())
        }
    }
}
