//! Output pump: drain the child until it is idle again.
//!
//! After a command is sent, the pump repeatedly waits for the prompt
//! sentinel with a short timeout and forwards whatever new output arrived
//! in the meantime, so long computations stream their output as it is
//! produced.

use crate::expect::{partial_suffix_len, Expect, ReplStream};
use crate::interrupt::InterruptHandle;
use crate::protocol::StreamName;
use crate::staging::scrub_disclosure;
use std::borrow::Cow;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Quiet waits before the poll timeout is raised
const QUIET_WAITS_PER_STEP: u32 = 10;

/// Output chunk on its way to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub name: StreamName,
    pub text: String,
}

impl StreamEvent {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            name: StreamName::Stdout,
            text: text.into(),
        }
    }
}

/// Why the pump stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEnd {
    /// Sentinel seen: the child is ready for input
    Idle,
    /// An interrupt was requested while waiting
    Interrupted,
    /// The child's output ended
    ChildExited,
}

/// Poll timeout schedule.
///
/// Starts at `initial`; every [`QUIET_WAITS_PER_STEP`] consecutive waits
/// without new output double it up to `max`. New output resets it.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    initial: Duration,
    max: Duration,
    current: Duration,
    quiet_waits: u32,
}

impl PollSchedule {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            current: initial,
            quiet_waits: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.current
    }

    pub fn record(&mut self, got_output: bool) {
        if got_output {
            self.current = self.initial;
            self.quiet_waits = 0;
            return;
        }

        self.quiet_waits += 1;
        if self.quiet_waits >= QUIET_WAITS_PER_STEP {
            self.quiet_waits = 0;
            self.current = (self.current * 2).min(self.max);
        }
    }
}

/// Per-command output forwarding state
pub struct OutputPump<'a> {
    sentinel: &'a str,
    sink: &'a mpsc::Sender<StreamEvent>,
    silent: bool,
    staged: bool,
    /// Bytes of the current `before()` text already accounted for
    cursor: usize,
    /// Length of `before()` after the previous wait
    seen: usize,
    /// Bytes of child output accounted for over the whole command
    forwarded: usize,
    schedule: PollSchedule,
}

impl<'a> OutputPump<'a> {
    pub fn new(
        sentinel: &'a str,
        sink: &'a mpsc::Sender<StreamEvent>,
        schedule: PollSchedule,
    ) -> Self {
        Self {
            sentinel,
            sink,
            silent: false,
            staged: false,
            cursor: 0,
            seen: 0,
            forwarded: 0,
            schedule,
        }
    }

    /// Do not forward anything
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Rewrite traces that would reveal a staging file
    pub fn staged(mut self, staged: bool) -> Self {
        self.staged = staged;
        self
    }

    /// Bytes of child output forwarded (or scrubbed) so far
    pub fn forwarded(&self) -> usize {
        self.forwarded
    }

    /// Forward output until the sentinel reappears.
    ///
    /// With `interrupt` set, a pending interrupt request ends the wait early
    /// with [`PumpEnd::Interrupted`]; output already received stays buffered
    /// for a later call on the same pump.
    pub async fn run(
        &mut self,
        stream: &mut ReplStream,
        interrupt: Option<&InterruptHandle>,
    ) -> PumpEnd {
        loop {
            let timeout = self.schedule.timeout();
            let outcome = match interrupt {
                Some(handle) => {
                    tokio::select! {
                        outcome = stream.expect_exact(self.sentinel, timeout) => outcome,
                        _ = handle.requested() => return PumpEnd::Interrupted,
                    }
                }
                None => stream.expect_exact(self.sentinel, timeout).await,
            };

            let finished = outcome != Expect::Timeout;
            let arrived = stream.before().len() > self.seen;
            self.forward(stream.before(), finished).await;
            self.schedule.record(arrived);

            match outcome {
                Expect::Matched => return PumpEnd::Idle,
                Expect::Eof => return PumpEnd::ChildExited,
                Expect::Timeout => {
                    // Forwarded output is never looked at again
                    stream.consume(self.cursor);
                    self.cursor = 0;
                    self.seen = stream.before().len();
                    trace!("No prompt yet, next wait {:?}", self.schedule.timeout());
                }
            }
        }
    }

    /// Send a trailing notice such as `Interrupted`
    pub async fn notice(&self, text: &str) {
        self.emit(text).await;
    }

    /// Forward the unseen part of `before`
    async fn forward(&mut self, before: &str, complete: bool) {
        let Some(unseen) = before.get(self.cursor..) else {
            warn!(
                "Output shrank below cursor ({} < {})",
                before.len(),
                self.cursor
            );
            return;
        };

        // Never forward what may turn out to be the start of the sentinel
        let end = if complete {
            unseen.len()
        } else {
            unseen.len() - partial_suffix_len(unseen, self.sentinel)
        };
        let window = &unseen[..end];

        let (text, consumed) = if self.staged {
            scrub_disclosure(window, complete)
        } else {
            (Cow::Borrowed(window), window.len())
        };

        self.cursor += consumed;
        self.forwarded += consumed;
        self.emit(&text).await;
    }

    async fn emit(&self, text: &str) {
        if self.silent || text.is_empty() {
            return;
        }
        if self.sink.send(StreamEvent::stdout(text)).await.is_err() {
            debug!("Output sink closed, dropping {} bytes", text.len());
        }
    }
}
