//! Unix domain socket server for kernel requests.
//!
//! Listens at `/tmp/gp-bridge-{name}.sock` or
//! `/tmp/gp-bridge/{WORKSPACE_ID}/{name}.sock` and accepts one JSON request
//! per line:
//! - `execute`: queued to the kernel worker; the connection receives the
//!   stream events and the final reply as they happen
//! - `complete`, `kernel_info`: answered directly, never wait on the worker
//! - `interrupt`: flags the running execution
//! - `shutdown`: stops the bridge

use crate::completion::Completer;
use crate::interrupt::InterruptHandle;
use crate::protocol::{KernelInfo, KernelRequest, KernelResponse};
use crate::session::KernelJob;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Responses buffered per connection while it is busy writing
const RESPONSE_BUFFER: usize = 256;

/// Everything a connection needs to reach the kernel
#[derive(Clone)]
pub struct KernelHandles {
    /// Queue to the kernel worker
    pub jobs_tx: mpsc::Sender<KernelJob>,
    /// Interrupt flag of the running execution
    pub interrupt: Arc<InterruptHandle>,
    /// Latest kernel info
    pub info_rx: watch::Receiver<KernelInfo>,
    /// Shutdown signal
    pub shutdown_tx: mpsc::Sender<()>,
}

/// Socket server for kernel requests
pub struct SocketServer {
    /// Path to the Unix socket
    socket_path: String,
    handles: KernelHandles,
}

impl SocketServer {
    pub fn new(socket_path: String, handles: KernelHandles) -> Self {
        Self {
            socket_path,
            handles,
        }
    }

    /// Bind the socket, replacing a stale one
    pub fn bind(&self) -> Result<UnixListener> {
        let path = Path::new(&self.socket_path);
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove existing socket")?;
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create socket directory {:?}", parent))?;
        }

        let listener = UnixListener::bind(&self.socket_path)
            .context(format!("Failed to bind socket at {}", self.socket_path))?;

        // Owner only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(&self.socket_path, perms) {
                warn!("Failed to set socket permissions: {}", e);
            }
        }

        info!("Socket server listening at {}", self.socket_path);
        Ok(listener)
    }

    /// Accept connections until the task is aborted
    pub async fn serve(self, listener: UnixListener) {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let handles = self.handles.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, handles).await {
                            error!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection
///
/// Several executions may be in flight for one connection; their events
/// arrive on the connection's response channel in worker order.
async fn handle_connection(stream: UnixStream, handles: KernelHandles) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let (respond_tx, mut respond_rx) = mpsc::channel::<KernelResponse>(RESPONSE_BUFFER);

    debug!("New client connection");

    loop {
        tokio::select! {
            result = lines.next_line() => {
                let Some(line) = result? else {
                    debug!("Client disconnected");
                    break;
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let response = match serde_json::from_str::<KernelRequest>(trimmed) {
                    Ok(request) => handle_request(request, &handles, &respond_tx).await,
                    Err(e) => Some(KernelResponse::Error {
                        id: None,
                        message: format!("Invalid JSON: {}", e),
                    }),
                };

                if let Some(response) = response {
                    write_response(&mut writer, &response).await?;
                    if matches!(response, KernelResponse::ShutdownAck) {
                        return Ok(());
                    }
                }
            }

            Some(response) = respond_rx.recv() => {
                write_response(&mut writer, &response).await?;
            }
        }
    }

    Ok(())
}

/// Handle a single request
///
/// Returns the immediate response, or None for an execute whose responses
/// will arrive from the worker.
async fn handle_request(
    request: KernelRequest,
    handles: &KernelHandles,
    respond_tx: &mpsc::Sender<KernelResponse>,
) -> Option<KernelResponse> {
    match request {
        KernelRequest::Execute { id, code, silent } => {
            debug!("Execute request {} ({} bytes)", id, code.len());
            let job = KernelJob::Execute {
                id: id.clone(),
                code,
                silent,
                respond: respond_tx.clone(),
            };
            match handles.jobs_tx.send(job).await {
                Ok(()) => None,
                Err(_) => Some(KernelResponse::Error {
                    id: Some(id),
                    message: "Kernel worker is not running".to_string(),
                }),
            }
        }

        KernelRequest::Complete {
            id,
            code,
            cursor_pos,
        } => {
            let reply = Completer::builtins().complete(&code, cursor_pos);
            Some(KernelResponse::CompleteReply {
                id,
                matches: reply.matches,
                cursor_start: reply.cursor_start,
                cursor_end: reply.cursor_end,
            })
        }

        KernelRequest::Interrupt => {
            info!("Interrupt requested via socket");
            handles.interrupt.request();
            Some(KernelResponse::InterruptAck)
        }

        KernelRequest::KernelInfo => {
            let info = handles.info_rx.borrow().clone();
            Some(KernelResponse::KernelInfo(info))
        }

        KernelRequest::Shutdown => {
            info!("Shutdown requested via socket");
            let _ = handles.shutdown_tx.send(()).await;
            Some(KernelResponse::ShutdownAck)
        }
    }
}

async fn write_response(writer: &mut OwnedWriteHalf, response: &KernelResponse) -> Result<()> {
    let response_json = serde_json::to_string(response)?;
    writer.write_all(response_json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
