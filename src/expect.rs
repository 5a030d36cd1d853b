//! Exact-match waiting on the child's output.
//!
//! [`ReplStream`] accumulates decoded output from the PTY reader and
//! implements the single primitive the rest of the bridge builds on:
//! wait for an exact string or a timeout, whichever comes first.

use tokio::sync::mpsc;
use tokio::time::{timeout_at, Duration, Instant};
use tracing::{debug, warn};

/// Outcome of [`ReplStream::expect_exact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Pattern found; `before()` holds the text preceding it
    Matched,
    /// Deadline passed; `before()` holds everything buffered so far
    Timeout,
    /// Output channel closed; `before()` holds everything buffered so far
    Eof,
}

/// Buffered, decoded output of a child process
pub struct ReplStream {
    /// Raw chunks from the reader thread
    output_rx: mpsc::Receiver<Vec<u8>>,
    /// Text received since the last match
    buffer: String,
    /// Text preceding the last match, until the next wait starts
    before: Option<String>,
    /// Trailing bytes of an incomplete UTF-8 sequence
    partial: Vec<u8>,
    /// Pattern the scan offset refers to
    scan_pattern: String,
    /// Buffer prefix already known not to contain `scan_pattern`
    scanned: usize,
    /// Reader side has hung up
    eof: bool,
}

impl ReplStream {
    pub fn new(output_rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            output_rx,
            buffer: String::new(),
            before: None,
            partial: Vec::new(),
            scan_pattern: String::new(),
            scanned: 0,
            eof: false,
        }
    }

    /// Wait until `pattern` appears in the output or `timeout` elapses.
    ///
    /// On a match the pattern is consumed and anything after it stays
    /// buffered for the next wait. Cancel safe: data already received is
    /// never lost if the returned future is dropped.
    pub async fn expect_exact(&mut self, pattern: &str, timeout: Duration) -> Expect {
        self.before = None;
        if self.scan_pattern != pattern {
            self.scan_pattern = pattern.to_string();
            self.scanned = 0;
        }

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(pos) = self.find_pattern() {
                let rest = self.buffer.split_off(pos + pattern.len());
                self.buffer.truncate(pos);
                self.before = Some(std::mem::replace(&mut self.buffer, rest));
                self.scanned = 0;
                return Expect::Matched;
            }

            if self.eof {
                return Expect::Eof;
            }

            match timeout_at(deadline, self.output_rx.recv()).await {
                Ok(Some(chunk)) => self.push_bytes(&chunk),
                Ok(None) => {
                    debug!("Child output closed");
                    self.eof = true;
                    if !self.partial.is_empty() {
                        self.buffer.push_str(&String::from_utf8_lossy(&self.partial));
                        self.partial.clear();
                    }
                }
                Err(_) => return Expect::Timeout,
            }
        }
    }

    /// Text before the last match, or everything buffered after a timeout
    pub fn before(&self) -> &str {
        self.before.as_deref().unwrap_or(&self.buffer)
    }

    /// Whether the reader side has hung up
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Drop the first `n` bytes of pending output once they have been
    /// handled, so a command that never prompts does not grow the buffer.
    ///
    /// Only meaningful after a timeout, while `before()` is the buffer.
    pub fn consume(&mut self, n: usize) {
        if self.before.is_some() || n == 0 {
            return;
        }
        if n > self.buffer.len() || !self.buffer.is_char_boundary(n) {
            warn!(
                "Cannot consume {} of {} buffered bytes",
                n,
                self.buffer.len()
            );
            return;
        }
        self.buffer.drain(..n);
        self.scanned = self.scanned.saturating_sub(n);
    }

    /// Bytes of output waiting for the next match
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    fn find_pattern(&mut self) -> Option<usize> {
        if self.scan_pattern.is_empty() {
            return Some(0);
        }

        // A match may straddle the old end of the buffer
        let mut start = self
            .scanned
            .saturating_sub(self.scan_pattern.len() - 1)
            .min(self.buffer.len());
        while !self.buffer.is_char_boundary(start) {
            start -= 1;
        }

        match self.buffer[start..].find(self.scan_pattern.as_str()) {
            Some(offset) => Some(start + offset),
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Decode a chunk, carrying an incomplete trailing sequence over to the
    /// next chunk and dropping invalid bytes
    fn push_bytes(&mut self, chunk: &[u8]) {
        let mut pending = std::mem::take(&mut self.partial);
        pending.extend_from_slice(chunk);

        let mut input = pending.as_slice();
        loop {
            match std::str::from_utf8(input) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    input = &[];
                    break;
                }
                Err(e) => {
                    let (valid, rest) = input.split_at(e.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        self.buffer.push_str(text);
                    }
                    match e.error_len() {
                        Some(invalid) => input = &rest[invalid..],
                        None => {
                            input = rest;
                            break;
                        }
                    }
                }
            }
        }

        self.partial = input.to_vec();
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of
/// `pattern`, i.e. how much of `text` may turn out to be the start of
/// `pattern` once more output arrives.
pub fn partial_suffix_len(text: &str, pattern: &str) -> usize {
    let earliest = text.len().saturating_sub(pattern.len().saturating_sub(1));
    (earliest..text.len())
        .filter(|&i| text.is_char_boundary(i))
        .find(|&i| pattern.starts_with(&text[i..]))
        .map(|i| text.len() - i)
        .unwrap_or(0)
}
