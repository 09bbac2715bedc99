//! Local message channel between CLI invocations and the running daemon.
//!
//! One JSON request per line on a Unix domain socket, one JSON response line back.

use crate::dispatch::{Command, Response};
use crate::error::ControlError;
use std::path::Path;

#[cfg(unix)]
pub use unix::{bind, send, serve};

#[cfg(unix)]
mod unix {
    use super::*;
    use crate::dispatch::Dispatcher;
    use std::sync::Arc;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{UnixListener, UnixStream};
    use tracing::{debug, info, warn};

    /// Bind the control socket, replacing a stale one left by a previous daemon.
    pub fn bind(path: &Path) -> Result<UnixListener, ControlError> {
        if path.exists() {
            debug!(operation = "control_bind", path = %path.display(), "Removing stale control socket");
            std::fs::remove_file(path)?;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let listener = UnixListener::bind(path)?;
        info!(operation = "control_bind", path = %path.display(), "Listening for commands");
        Ok(listener)
    }

    /// Accept connections until the task is dropped.
    pub async fn serve(listener: UnixListener, dispatcher: Arc<Dispatcher>) {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let dispatcher = dispatcher.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, dispatcher).await {
                            warn!(operation = "control_connection", error = %e, "Control connection failed");
                        }
                    });
                }
                Err(e) => {
                    warn!(operation = "control_accept", error = %e, "Failed to accept control connection");
                }
            }
        }
    }

    async fn handle_connection(stream: UnixStream, dispatcher: Arc<Dispatcher>) -> Result<(), ControlError> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<Command>(&line) {
                Ok(command) => dispatcher.dispatch(command).await,
                Err(e) => {
                    warn!(operation = "control_request", error = %e, "Malformed request");
                    Response::failed(format!("malformed request: {}", e))
                }
            };
            let mut payload = serde_json::to_vec(&response)?;
            payload.push(b'\n');
            writer.write_all(&payload).await?;
        }
        Ok(())
    }

    /// Send one request to the daemon and wait for its reply.
    pub async fn send(path: &Path, command: &Command) -> Result<Response, ControlError> {
        let stream = UnixStream::connect(path).await?;
        let (reader, mut writer) = stream.into_split();

        let mut payload = serde_json::to_vec(command)?;
        payload.push(b'\n');
        writer.write_all(&payload).await?;

        let mut lines = BufReader::new(reader).lines();
        let line = lines.next_line().await?.ok_or(ControlError::Closed)?;
        Ok(serde_json::from_str(&line)?)
    }
}

#[cfg(not(unix))]
pub async fn send(_path: &Path, _command: &Command) -> Result<Response, ControlError> {
    Err(ControlError::Unsupported)
}

/// True when a daemon answers on `path`.
pub async fn daemon_running(path: &Path) -> bool {
    send(path, &Command::GetAlertStatus).await.is_ok()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::alert::AlertDriver;
    use crate::check::MovieChecker;
    use crate::dispatch::Dispatcher;
    use crate::notify::Notifier;
    use crate::scheduler::{MonitoringScheduler, CHECK_SLOT};
    use crate::store::StateStore;
    use crate::test_support::{ManualTimer, RecordingBadge, RecordingOpener, RecordingSpeaker, StaticFetcher};
    use std::sync::Arc;
    use ticketwatch_sources::BookingUrls;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn dispatcher(timer: Arc<ManualTimer>) -> Arc<Dispatcher> {
        let state = StateStore::in_memory();
        let alerts = AlertDriver::new(
            Arc::new(RecordingSpeaker::default()),
            Arc::new(RecordingBadge::default()),
        );
        let notifier = Notifier::new(Arc::new(RecordingOpener::default()), alerts.clone(), state.clone());
        let checker = Arc::new(MovieChecker::new(
            Arc::new(StaticFetcher::default()),
            state.clone(),
            BookingUrls::default(),
            notifier,
        ));
        Arc::new(Dispatcher::new(
            Arc::new(MonitoringScheduler::new(timer)),
            checker,
            alerts,
            state,
        ))
    }

    #[tokio::test]
    async fn test_request_reply_over_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticketwatch.sock");
        let timer = Arc::new(ManualTimer::default());

        assert!(!daemon_running(&path).await);

        let listener = bind(&path).unwrap();
        let server = tokio::spawn(serve(listener, dispatcher(timer.clone())));

        assert!(daemon_running(&path).await);
        let response = send(&path, &Command::StartMonitoring { interval: Some(3) }).await.unwrap();
        assert!(response.is_success());
        assert!(timer.schedules().contains_key(CHECK_SLOT));

        let response = send(&path, &Command::GetAlertStatus).await.unwrap();
        assert_eq!(response, Response::AlertStatus { is_playing: false });

        server.abort();
    }

    #[tokio::test]
    async fn test_malformed_line_gets_error_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticketwatch.sock");
        let listener = bind(&path).unwrap();
        let server = tokio::spawn(serve(listener, dispatcher(Arc::new(ManualTimer::default()))));

        let stream = tokio::net::UnixStream::connect(&path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        writer.write_all(b"{\"action\":\"selfDestruct\"}\n").await.unwrap();
        let line = BufReader::new(reader).lines().next_line().await.unwrap().unwrap();

        let response: Response = serde_json::from_str(&line).unwrap();
        assert!(!response.is_success());
        server.abort();
    }

    #[tokio::test]
    async fn test_bind_replaces_stale_socket_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticketwatch.sock");
        std::fs::write(&path, "").unwrap();
        assert!(bind(&path).is_ok());
    }
}
