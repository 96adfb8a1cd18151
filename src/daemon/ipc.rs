//! IPC Server for the interval timer daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer commands
//! - Setting edits clamped at the edit boundary
//! - Background track selection

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::media::{MediaSink, TrackSelector};
use crate::settings;
use crate::types::{
    IpcRequest, IpcResponse, ResponseData, Setting, TimerCommand, TimerPhase,
};

use super::timer::TimerEngine;

// ============================================================================
// Constants
// ============================================================================

/// Socket path relative to the home directory
pub const DEFAULT_SOCKET_PATH: &str = ".bit-timer/bit-timer.sock";

/// Maximum request size in bytes (4KB)
pub const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns the default socket path under the home directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(DEFAULT_SOCKET_PATH))
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// Peer closed the connection without sending anything
    #[error("Connection closed by client")]
    ConnectionClosed,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Reads until the client shuts down its write side, bounded by
    /// [`MAX_REQUEST_SIZE`] and a read timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::with_capacity(MAX_REQUEST_SIZE);
        let mut limited = (&mut *stream).take(MAX_REQUEST_SIZE as u64 + 1);

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            Self::read_message(&mut limited, &mut buffer),
        )
        .await;

        match read_result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        }

        if buffer.is_empty() {
            return Err(IpcError::ConnectionClosed.into());
        }
        if buffer.len() > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer)
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Reads one JSON message: until EOF, or until the buffer parses.
    async fn read_message<R>(reader: &mut R, buffer: &mut Vec<u8>) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut chunk = [0u8; 1024];
        loop {
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buffer.extend_from_slice(&chunk[..n]);
            if serde_json::from_slice::<serde_json::Value>(buffer).is_ok() {
                return Ok(());
            }
        }
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the TimerEngine.
pub struct RequestHandler {
    /// Shared reference to the timer engine
    engine: Arc<Mutex<TimerEngine>>,
    /// Background track selection
    tracks: Mutex<TrackSelector>,
    /// Receives the track selection whenever it changes
    media_sink: Arc<dyn MediaSink>,
}

impl RequestHandler {
    /// Creates a new request handler with the given timer engine.
    pub fn new(engine: Arc<Mutex<TimerEngine>>, media_sink: Arc<dyn MediaSink>) -> Self {
        Self {
            engine,
            tracks: Mutex::new(TrackSelector::new()),
            media_sink,
        }
    }

    /// Hands the initial selection to the media sink.
    pub async fn load_initial_track(&self) {
        let selection = self.tracks.lock().await.selection();
        if let Err(e) = self.media_sink.load(&selection) {
            warn!("Failed to load background track: {}", e);
        }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        debug!(?request, "handling request");
        match request {
            IpcRequest::Toggle => self.handle_toggle().await,
            IpcRequest::Start => self.handle_start().await,
            IpcRequest::Pause => self.handle_pause().await,
            IpcRequest::Reset => self.handle_reset().await,
            IpcRequest::Skip => self.handle_skip().await,
            IpcRequest::Set { setting, value } => self.handle_set(setting, value).await,
            IpcRequest::Ack => self.handle_ack().await,
            IpcRequest::Status => self.handle_status().await,
            IpcRequest::Settings => self.handle_settings().await,
            IpcRequest::Tracks => self.handle_tracks().await,
            IpcRequest::Select { track } => self.handle_select(&track).await,
        }
    }

    /// Builds the status payload from the engine and the track selection.
    async fn status_data(&self, engine: &TimerEngine) -> ResponseData {
        let track = self.tracks.lock().await.selection();
        ResponseData::from_timer_state(engine.state()).with_track(track)
    }

    /// Dispatches a command and answers with the resulting status.
    async fn dispatch(
        &self,
        engine: &mut TimerEngine,
        command: TimerCommand,
        message: &str,
    ) -> IpcResponse {
        match engine.dispatch(command) {
            Ok(()) => IpcResponse::success(message, Some(self.status_data(engine).await)),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the toggle command.
    async fn handle_toggle(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        let message = match engine.phase() {
            TimerPhase::Working | TimerPhase::Resting => "Timer paused",
            TimerPhase::Paused => "Timer resumed",
            TimerPhase::Idle | TimerPhase::Finished => "Timer started",
        };
        self.dispatch(&mut engine, TimerCommand::StartPause, message)
            .await
    }

    /// Handles the start command.
    async fn handle_start(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        let message = match engine.phase() {
            TimerPhase::Working | TimerPhase::Resting => {
                return IpcResponse::error("Timer is already running")
            }
            TimerPhase::Paused => "Timer resumed",
            TimerPhase::Idle | TimerPhase::Finished => "Timer started",
        };
        self.dispatch(&mut engine, TimerCommand::StartPause, message)
            .await
    }

    /// Handles the pause command.
    async fn handle_pause(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        if !engine.state().is_active {
            return IpcResponse::error("Timer is not running");
        }
        self.dispatch(&mut engine, TimerCommand::StartPause, "Timer paused")
            .await
    }

    /// Handles the reset command.
    async fn handle_reset(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;
        self.dispatch(&mut engine, TimerCommand::Reset, "Timer reset")
            .await
    }

    /// Handles the skip command.
    async fn handle_skip(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        match engine.skip_to_rest() {
            Ok(true) => IpcResponse::success(
                "Skipped to rest",
                Some(self.status_data(&engine).await),
            ),
            Ok(false) => IpcResponse::error("Skip is only available during a running work phase"),
            Err(e) => IpcResponse::error(e.to_string()),
        }
    }

    /// Handles the set command.
    async fn handle_set(&self, setting: Setting, value: u32) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        // Only the work duration may change while counting down.
        if engine.state().is_active && setting != Setting::Work {
            return IpcResponse::error(format!(
                "{} can only be changed while the timer is stopped",
                setting.label()
            ));
        }

        let clamped = settings::clamp_for_state(setting, value, engine.state());
        let shown = |value: u32| {
            if setting.is_duration() {
                settings::format_time(value)
            } else {
                value.to_string()
            }
        };
        let mut message = format!("{} set to {}", setting.label(), shown(clamped.value));
        if clamped.adjusted {
            message.push_str(&format!(" (adjusted from {})", shown(value)));
        }

        let command = TimerCommand::SetConfig {
            setting,
            value: clamped.value,
        };
        let mut response = self.dispatch(&mut engine, command, &message).await;
        if let Some(data) = response.data.as_mut() {
            data.settings = Some(settings::setting_views(&engine.state().config));
        }
        response
    }

    /// Handles the ack command.
    async fn handle_ack(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        let message = if engine.state().is_finished {
            "Completion acknowledged"
        } else {
            "Nothing to acknowledge"
        };
        self.dispatch(&mut engine, TimerCommand::AcknowledgeFinish, message)
            .await
    }

    /// Handles the status command.
    async fn handle_status(&self) -> IpcResponse {
        let engine = self.engine.lock().await;
        IpcResponse::success("", Some(self.status_data(&engine).await))
    }

    /// Handles the settings command.
    async fn handle_settings(&self) -> IpcResponse {
        let engine = self.engine.lock().await;

        let mut data = self.status_data(&engine).await;
        data.settings = Some(settings::setting_views(&engine.state().config));
        IpcResponse::success("", Some(data))
    }

    /// Handles the tracks command.
    async fn handle_tracks(&self) -> IpcResponse {
        let tracks = self.tracks.lock().await;

        let data = ResponseData {
            track: Some(tracks.selection()),
            tracks: Some(tracks.views()),
            ..Default::default()
        };
        IpcResponse::success("", Some(data))
    }

    /// Handles the select command.
    async fn handle_select(&self, query: &str) -> IpcResponse {
        let mut tracks = self.tracks.lock().await;

        let selection = match tracks.select(query) {
            Ok(selection) => selection,
            Err(e) => return IpcResponse::error(e.to_string()),
        };
        if let Err(e) = self.media_sink.load(&selection) {
            warn!("Failed to load background track: {}", e);
        }

        let data = ResponseData {
            track: Some(selection.clone()),
            tracks: Some(tracks.views()),
            ..Default::default()
        };
        IpcResponse::success(format!("Selected: {}", selection.title), Some(data))
    }
}

// ============================================================================
// Tests
// ============================================================================
