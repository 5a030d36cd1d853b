//! gp-bridge: notebook kernel bridge for the PARI/GP calculator
//!
//! Runs gp on a PTY with a sentinel prompt and serves execute, completion
//! and interrupt requests over a Unix socket.
//!
//! Usage:
//!   gp-bridge --name gp
//!   gp-bridge --name test -- sh fake_gp.sh

// Allow dead code - accessors kept for tests and future callers
#![allow(dead_code)]

mod builtins;
mod completion;
mod error;
mod expect;
mod interrupt;
mod protocol;
mod pty;
mod pump;
mod session;
mod socket;
mod staging;
mod supervisor;

use anyhow::{Context, Result};
use clap::Parser;
use interrupt::InterruptHandle;
use protocol::{Config, DEFAULT_MAX_INPUT_LINE, DEFAULT_SENTINEL};
use session::{run_worker, KernelJob, Session};
use socket::{KernelHandles, SocketServer};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Longest allowed output poll timeout, in milliseconds
const MAX_POLL_CEILING_MS: u64 = 30_000;

/// Notebook kernel bridge for PARI/GP
#[derive(Parser, Debug)]
#[command(name = "gp-bridge")]
#[command(about = "Notebook kernel bridge for the PARI/GP calculator")]
#[command(version)]
struct Args {
    /// Kernel name/identifier
    #[arg(short, long, default_value = "gp")]
    name: String,

    /// Unix socket path (default: /tmp/gp-bridge-{name}.sock or /tmp/gp-bridge/{WORKSPACE_ID}/{name}.sock)
    #[arg(short, long)]
    socket: Option<String>,

    /// Prompt installed in gp and waited for after every command
    #[arg(long, default_value = DEFAULT_SENTINEL)]
    prompt: String,

    /// gp binary to launch
    #[arg(long, default_value = "gp")]
    gp_binary: String,

    /// Longest input in characters sent inline; longer input goes through a file
    #[arg(long, default_value_t = DEFAULT_MAX_INPUT_LINE)]
    max_input_line: usize,

    /// Output poll timeout in milliseconds
    #[arg(long, default_value = "100")]
    poll_interval: u64,

    /// Ceiling for the output poll backoff in milliseconds (default: no backoff)
    #[arg(long)]
    max_poll_interval: Option<u64>,

    /// Seconds to wait for gp's first prompt
    #[arg(long, default_value = "30")]
    startup_timeout: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// PTY rows
    #[arg(long, default_value = "24")]
    rows: u16,

    /// PTY columns
    #[arg(long, default_value = "80")]
    cols: u16,

    /// Command to run instead of gp (after --)
    #[arg(last = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    info!("gp-bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("Kernel: {}", args.name);

    // Build configuration
    let workspace_id = std::env::var("WORKSPACE_ID")
        .ok()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let socket_path = args.socket.unwrap_or_else(|| {
        if let Some(ref workspace_id) = workspace_id {
            format!("/tmp/gp-bridge/{}/{}.sock", workspace_id, args.name)
        } else {
            format!("/tmp/gp-bridge-{}.sock", args.name)
        }
    });

    let mut max_poll_interval = args.max_poll_interval.unwrap_or(args.poll_interval);
    if max_poll_interval > MAX_POLL_CEILING_MS {
        warn!(
            "Poll ceiling {} ms is too high, using {} ms",
            max_poll_interval, MAX_POLL_CEILING_MS
        );
        max_poll_interval = MAX_POLL_CEILING_MS;
    }

    let config = Config {
        name: args.name.clone(),
        socket_path: socket_path.clone(),
        sentinel: args.prompt,
        gp_binary: args.gp_binary,
        command: args.command,
        max_input_line: args.max_input_line,
        poll_interval: Duration::from_millis(args.poll_interval),
        max_poll_interval: Duration::from_millis(max_poll_interval),
        startup_timeout: Duration::from_secs(args.startup_timeout),
        rows: args.rows,
        cols: args.cols,
    };

    info!("Socket: {}", socket_path);
    info!("Command: {:?}", config.child_command());

    // Set up signal handlers
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    // Start gp and wait for its first prompt
    let interrupt = Arc::new(InterruptHandle::new());
    let session = Session::start(config, Arc::clone(&interrupt))
        .await
        .context("Failed to start gp")?;
    let info_rx = session.kernel_info();
    info!("{}", info_rx.borrow().banner);

    // Create channels
    let (jobs_tx, jobs_rx) = mpsc::channel::<KernelJob>(32);
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    // Start socket server
    let socket_server = SocketServer::new(
        socket_path.clone(),
        KernelHandles {
            jobs_tx,
            interrupt: Arc::clone(&interrupt),
            info_rx,
            shutdown_tx,
        },
    );
    let listener = socket_server.bind()?;
    let socket_handle = tokio::spawn(socket_server.serve(listener));

    // Start kernel worker
    let worker_handle = tokio::spawn(run_worker(session, jobs_rx));

    loop {
        select! {
            _ = shutdown_rx.recv() => {
                info!("Shutdown requested");
                break;
            }

            // Hosts interrupt kernels by signalling the kernel process
            _ = sigint.recv() => {
                info!("SIGINT received");
                interrupt.request();
            }

            _ = sigterm.recv() => {
                info!("SIGTERM received");
                break;
            }
        }
    }

    // Cleanup
    info!("Shutting down...");

    socket_handle.abort();

    // Dropping the session terminates and reaps gp
    worker_handle.abort();
    let _ = worker_handle.await;

    let _ = std::fs::remove_file(&socket_path);

    info!("Goodbye!");
    Ok(())
}
