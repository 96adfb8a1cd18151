//! Daemon module for the interval timer.
//!
//! This module contains the core daemon functionality:
//! - `clock`: One-second tick emission derived from the timer state
//! - `timer`: Timer engine with the transition function and phase cascade
//! - `ipc`: Unix socket server and request handler

pub mod clock;
pub mod ipc;
pub mod timer;

pub use clock::{ClockDriver, ClockTick, TickScheduler, TokioTickScheduler};
pub use ipc::{IpcServer, RequestHandler};
pub use timer::{TimerEngine, TimerEvent};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::media::{LoggingMediaSink, MediaSink};
use crate::settings;
use crate::types::{IpcResponse, SessionConfig};

/// Daemon startup options.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Socket to listen on
    pub socket_path: PathBuf,
    /// Initial session configuration (clamped on startup)
    pub session: SessionConfig,
}

/// Runs the daemon until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound or the tick loop fails.
pub async fn run(config: DaemonConfig) -> Result<()> {
    run_with_sink(config, Arc::new(LoggingMediaSink)).await
}

/// Runs the daemon with a custom media sink until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound or the tick loop fails.
pub async fn run_with_sink(config: DaemonConfig, media_sink: Arc<dyn MediaSink>) -> Result<()> {
    let session = settings::clamp_config(config.session);
    if session != config.session {
        warn!(?session, "initial settings adjusted to their domains");
    }

    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let clock = ClockDriver::new(TokioTickScheduler::new(tick_tx));
    let engine = Arc::new(Mutex::new(TimerEngine::new(session, clock, event_tx)));
    let handler = Arc::new(RequestHandler::new(engine.clone(), media_sink));
    handler.load_initial_track().await;

    let server = IpcServer::new(&config.socket_path)?;
    info!(socket = ?server.socket_path(), ?session, "daemon listening");

    let event_task = tokio::spawn(log_events(event_rx));
    let mut tick_task = tokio::spawn(TimerEngine::run(engine, tick_rx));

    let result = loop {
        tokio::select! {
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    tokio::spawn(serve_connection(stream, handler.clone()));
                }
                Err(e) => warn!("{:#}", e),
            },
            finished = &mut tick_task => {
                break finished
                    .context("Tick loop panicked")
                    .and_then(|result| result);
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl+C")?;
                info!("Ctrl+C received, shutting down...");
                break Ok(());
            }
        }
    };

    tick_task.abort();
    event_task.abort();
    drop(server);
    result
}

/// Serves one request on one connection.
async fn serve_connection(mut stream: UnixStream, handler: Arc<RequestHandler>) {
    let response = match IpcServer::receive_request(&mut stream).await {
        Ok(request) => handler.handle(request).await,
        Err(e) => {
            debug!("rejecting request: {:#}", e);
            IpcResponse::error(format!("{:#}", e))
        }
    };

    if let Err(e) = IpcServer::send_response(&mut stream, &response).await {
        error!("Failed to send response: {:#}", e);
    }
}

/// Logs timer events until the engine goes away.
async fn log_events(mut event_rx: mpsc::UnboundedReceiver<TimerEvent>) {
    while let Some(event) = event_rx.recv().await {
        match event {
            TimerEvent::Tick { remaining_seconds } => {
                debug!(remaining_seconds, "tick");
            }
            TimerEvent::WorkStarted { set } => info!(set, "work started"),
            TimerEvent::RestStarted { set } => info!(set, "rest started"),
            TimerEvent::SessionCompleted { sets } => info!(sets, "workout complete"),
            TimerEvent::ConfigChanged { setting, value } => {
                info!(%setting, value, "setting changed");
            }
            other => info!(event = ?other, "timer event"),
        }
    }
}
