//! Protocol types for gp-bridge communication.
//!
//! Defines the JSON message format exchanged with the host over the
//! kernel socket, plus the bridge configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prompt the child is configured to print when idle.
pub const DEFAULT_SENTINEL: &str = ">PEXPECT_PROMPT<";

/// Longest input, in characters, sent inline; anything longer goes through a file.
pub const DEFAULT_MAX_INPUT_LINE: usize = 255;

/// Request sent to the kernel socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelRequest {
    /// Evaluate a chunk of code
    Execute {
        /// Request ID echoed on every response for this execution
        id: String,
        /// Source text
        code: String,
        /// Suppress output forwarding
        #[serde(default)]
        silent: bool,
    },
    /// Complete the identifier before the cursor
    Complete {
        id: String,
        code: String,
        /// Cursor position in characters
        cursor_pos: usize,
    },
    /// Interrupt the running execution
    Interrupt,
    /// Query banner and language info
    KernelInfo,
    /// Graceful shutdown request
    Shutdown,
}

/// Response sent back through the kernel socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KernelResponse {
    /// Output chunk produced by an execution
    Stream {
        id: String,
        name: StreamName,
        text: String,
    },
    /// Final status of an execution
    ExecuteReply {
        id: String,
        status: ExecuteStatus,
        execution_count: u64,
    },
    /// Completion matches
    CompleteReply {
        id: String,
        matches: Vec<String>,
        cursor_start: usize,
        cursor_end: usize,
    },
    /// Interrupt request acknowledged
    InterruptAck,
    /// Kernel information
    KernelInfo(KernelInfo),
    /// Shutdown acknowledged
    ShutdownAck,
    /// Error response
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        message: String,
    },
}

/// Output stream an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamName {
    Stdout,
}

/// Outcome of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteStatus {
    /// Sentinel reached, or the child died and was restarted
    Ok,
    /// Interrupted on request
    Abort,
}

/// Static description of the guest language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    pub version: String,
    pub mimetype: String,
    pub file_extension: String,
    pub codemirror_mode: String,
}

impl LanguageInfo {
    pub fn gp(version: &str) -> Self {
        Self {
            name: "gp".to_string(),
            version: version.to_string(),
            mimetype: "text/x-gp".to_string(),
            file_extension: ".g".to_string(),
            codemirror_mode: "c".to_string(),
        }
    }
}

/// Banner and version info, refreshed on every child (re)start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelInfo {
    pub implementation: String,
    pub implementation_version: String,
    pub banner: String,
    pub language_info: LanguageInfo,
}

impl KernelInfo {
    pub fn new(version: &str) -> Self {
        Self {
            implementation: "gp_kernel".to_string(),
            implementation_version: env!("CARGO_PKG_VERSION").to_string(),
            banner: format!("GP kernel connected to GP {}", version),
            language_info: LanguageInfo::gp(version),
        }
    }
}

/// Configuration for the bridge
#[derive(Debug, Clone)]
pub struct Config {
    /// Kernel name/identifier
    pub name: String,
    /// Unix socket path
    pub socket_path: String,
    /// Prompt string installed in the child
    pub sentinel: String,
    /// Path or name of the gp binary
    pub gp_binary: String,
    /// Full child command line, replacing the gp defaults when non-empty
    pub command: Vec<String>,
    /// Longest input sent inline
    pub max_input_line: usize,
    /// Initial output poll timeout
    pub poll_interval: Duration,
    /// Ceiling for the poll timeout backoff
    pub max_poll_interval: Duration,
    /// How long to wait for the first prompt
    pub startup_timeout: Duration,
    /// PTY rows
    pub rows: u16,
    /// PTY columns
    pub cols: u16,
}

impl Config {
    /// Command line used to launch the child
    pub fn child_command(&self) -> Vec<String> {
        if !self.command.is_empty() {
            return self.command.clone();
        }
        vec![
            self.gp_binary.clone(),
            "-D".to_string(),
            format!("prompt={}", self.sentinel),
            "-D".to_string(),
            "breakloop=0".to_string(),
            "-D".to_string(),
            "colors=no,no,no,no,no,no,no".to_string(),
            "-D".to_string(),
            "readline=0".to_string(),
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "gp".to_string(),
            socket_path: "/tmp/gp-bridge-gp.sock".to_string(),
            sentinel: DEFAULT_SENTINEL.to_string(),
            gp_binary: "gp".to_string(),
            command: vec![],
            max_input_line: DEFAULT_MAX_INPUT_LINE,
            poll_interval: Duration::from_millis(100),
            max_poll_interval: Duration::from_millis(100),
            startup_timeout: Duration::from_secs(30),
            rows: 24,
            cols: 80,
        }
    }
}
