//! Kernel session: runs one command at a time against the child.
//!
//! The session ties the pieces together. It stages the command, sends it,
//! pumps output until the child is idle again, and turns interrupts and
//! child deaths into execution outcomes.

use crate::error::Result;
use crate::interrupt::InterruptHandle;
use crate::protocol::{Config, ExecuteStatus, KernelInfo, KernelResponse};
use crate::pty::ChildProcess;
use crate::pump::{OutputPump, PollSchedule, PumpEnd, StreamEvent};
use crate::staging::PendingCommand;
use crate::supervisor::{Startup, Supervisor};
use nix::sys::signal::Signal;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Appended to the output of an interrupted command
pub const INTERRUPTED_NOTICE: &str = "Interrupted";

/// Appended to the output of a command the child died during
pub const RESTART_NOTICE: &str = "Restarting GP";

/// Final status of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOutcome {
    pub status: ExecuteStatus,
    pub execution_count: u64,
}

/// Work queued to the kernel worker
#[derive(Debug)]
pub enum KernelJob {
    Execute {
        id: String,
        code: String,
        silent: bool,
        /// Stream events and the final reply go here
        respond: mpsc::Sender<KernelResponse>,
    },
}

pub struct Session {
    supervisor: Supervisor,
    interrupt: Arc<InterruptHandle>,
    execution_count: u64,
    info_tx: watch::Sender<KernelInfo>,
}

impl Session {
    /// Start the child and wait until it is ready
    pub async fn start(config: Config, interrupt: Arc<InterruptHandle>) -> Result<Self> {
        let mut supervisor = Supervisor::new(config);
        let startup = supervisor.start().await?;
        debug!("Banner: {:?}", startup.banner);

        let (info_tx, _) = watch::channel(KernelInfo::new(&startup.version));
        Ok(Self {
            supervisor,
            interrupt,
            execution_count: 0,
            info_tx,
        })
    }

    /// Kernel info, updated whenever the child is restarted
    pub fn kernel_info(&self) -> watch::Receiver<KernelInfo> {
        self.info_tx.subscribe()
    }

    pub fn interrupt_handle(&self) -> Arc<InterruptHandle> {
        Arc::clone(&self.interrupt)
    }

    pub fn execution_count(&self) -> u64 {
        self.execution_count
    }

    /// Run `code` to completion, forwarding its output to `sink`.
    ///
    /// Only a failure to stage the input or to start a missing child is an
    /// error; interrupts and child deaths are reported through the status.
    pub async fn execute(
        &mut self,
        code: &str,
        silent: bool,
        sink: &mpsc::Sender<StreamEvent>,
    ) -> Result<ExecuteOutcome> {
        let code = code.trim_end();
        if code.trim_start().is_empty() {
            return Ok(self.outcome(ExecuteStatus::Ok));
        }

        // Requests made while idle do not carry over
        self.interrupt.reset();

        if let Some(startup) = self.supervisor.ensure_running().await? {
            self.publish(&startup);
        }

        let command = PendingCommand::prepare(code, self.supervisor.config().max_input_line)?;
        if !silent {
            self.execution_count += 1;
        }

        let status = self.run(&command, silent, sink).await;
        drop(command);
        Ok(self.outcome(status))
    }

    async fn run(
        &mut self,
        command: &PendingCommand,
        silent: bool,
        sink: &mpsc::Sender<StreamEvent>,
    ) -> ExecuteStatus {
        let config = self.supervisor.config();
        let sentinel = config.sentinel.clone();
        let schedule = PollSchedule::new(config.poll_interval, config.max_poll_interval);
        let mut pump = OutputPump::new(&sentinel, sink, schedule)
            .silent(silent)
            .staged(command.is_staged());

        let end = match self.supervisor.child_mut() {
            Some(child) => drive(child, command.line(), &mut pump, &self.interrupt).await,
            None => PumpEnd::ChildExited,
        };

        match end {
            PumpEnd::Idle => ExecuteStatus::Ok,
            PumpEnd::Interrupted => {
                pump.notice(INTERRUPTED_NOTICE).await;
                ExecuteStatus::Abort
            }
            PumpEnd::ChildExited => {
                warn!("Child exited while running a command");
                self.restart().await;
                pump.notice(RESTART_NOTICE).await;
                ExecuteStatus::Ok
            }
        }
    }

    /// Restart the child; a failure leaves it to the next execute
    async fn restart(&mut self) {
        match self.supervisor.restart().await {
            Ok(startup) => self.publish(&startup),
            Err(e) => error!("Failed to restart child: {}", e),
        }
    }

    fn publish(&self, startup: &Startup) {
        self.info_tx.send_replace(KernelInfo::new(&startup.version));
    }

    fn outcome(&self, status: ExecuteStatus) -> ExecuteOutcome {
        ExecuteOutcome {
            status,
            execution_count: self.execution_count,
        }
    }
}

/// Send one command line and pump until the child is idle.
///
/// An interrupt request sends SIGINT to the child and keeps draining until
/// the prompt returns; further requests during the drain resend it.
async fn drive(
    child: &mut ChildProcess,
    line: &str,
    pump: &mut OutputPump<'_>,
    interrupt: &InterruptHandle,
) -> PumpEnd {
    if child.send_line(line).await.is_err() {
        warn!("Child input closed before the command was sent");
        return PumpEnd::ChildExited;
    }

    let end = pump.run(child.stream(), Some(interrupt)).await;
    if end != PumpEnd::Interrupted {
        return end;
    }

    loop {
        info!("Interrupting child PID {}", child.pid());
        if let Err(e) = child.signal(Signal::SIGINT) {
            warn!("Failed to interrupt PID {}: {}", child.pid(), e);
        }

        match pump.run(child.stream(), Some(interrupt)).await {
            PumpEnd::Interrupted => continue,
            PumpEnd::Idle => return PumpEnd::Interrupted,
            PumpEnd::ChildExited => return PumpEnd::ChildExited,
        }
    }
}

/// Serve queued jobs until every sender is gone
pub async fn run_worker(mut session: Session, mut jobs: mpsc::Receiver<KernelJob>) {
    while let Some(job) = jobs.recv().await {
        match job {
            KernelJob::Execute {
                id,
                code,
                silent,
                respond,
            } => handle_execute(&mut session, id, code, silent, respond).await,
        }
    }
    info!("Kernel worker exiting");
}

async fn handle_execute(
    session: &mut Session,
    id: String,
    code: String,
    silent: bool,
    respond: mpsc::Sender<KernelResponse>,
) {
    debug!("Execute {}: {} bytes", id, code.len());
    let (sink, mut events) = mpsc::channel::<StreamEvent>(64);

    let execute = async move {
        let result = session.execute(&code, silent, &sink).await;
        drop(sink);
        result
    };

    // Keep draining after the caller disconnects so the child never stalls
    let forward = async {
        while let Some(event) = events.recv().await {
            let response = KernelResponse::Stream {
                id: id.clone(),
                name: event.name,
                text: event.text,
            };
            if respond.send(response).await.is_err() {
                debug!("Caller for {} went away", id);
            }
        }
    };

    let (result, ()) = tokio::join!(execute, forward);

    let response = match result {
        Ok(outcome) => KernelResponse::ExecuteReply {
            id,
            status: outcome.status,
            execution_count: outcome.execution_count,
        },
        Err(e) => {
            error!("Execute {} failed: {}", id, e);
            KernelResponse::Error {
                id: Some(id),
                message: e.to_string(),
            }
        }
    };
    let _ = respond.send(response).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::tests::fake_gp_config;
    use std::time::Duration;

    async fn session() -> Session {
        Session::start(fake_gp_config(), Arc::new(InterruptHandle::new()))
            .await
            .unwrap()
    }

    fn collect(rx: &mut mpsc::Receiver<StreamEvent>) -> String {
        let mut out = String::new();
        while let Ok(event) = rx.try_recv() {
            out.push_str(&event.text);
        }
        out
    }

    #[tokio::test]
    async fn test_execute_inline() {
        let mut session = session().await;
        let (sink, mut rx) = mpsc::channel(64);

        let outcome = session.execute("hello  \n", false, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);
        assert_eq!(outcome.execution_count, 1);
        assert_eq!(collect(&mut rx), "hello\r\n");

        let outcome = session.execute("world", false, &sink).await.unwrap();
        assert_eq!(outcome.execution_count, 2);
        assert_eq!(collect(&mut rx), "world\r\n");
    }

    #[tokio::test]
    async fn test_blank_code_skips_child() {
        let mut session = session().await;
        let (sink, mut rx) = mpsc::channel(64);

        let outcome = session.execute(" \n\t", false, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);
        assert_eq!(outcome.execution_count, 0);
        assert!(collect(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_silent_execute() {
        let mut session = session().await;
        let (sink, mut rx) = mpsc::channel(64);

        let outcome = session.execute("quiet", true, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);
        assert_eq!(outcome.execution_count, 0);
        assert!(collect(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_staged_execute_hides_file() {
        let mut session = session().await;
        let (sink, mut rx) = mpsc::channel(256);
        let code = format!("v = [{}];", vec!["7"; 150].join(","));

        let outcome = session.execute(&code, false, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);

        let output = collect(&mut rx);
        assert!(output.contains(&code));
        assert!(!output.contains("read(\""), "leaked: {:?}", output);
        assert!(output.contains("  ***   at top-level:     1/0"));

        assert!(!staged_path(&output).exists());
    }

    fn staged_path(output: &str) -> std::path::PathBuf {
        output
            .lines()
            .find_map(|line| line.strip_prefix("staged:"))
            .map(|path| std::path::PathBuf::from(path.trim_end()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_staged_interrupt_removes_file() {
        let mut session = session().await;
        let handle = session.interrupt_handle();
        let (sink, mut rx) = mpsc::channel(256);

        let requester = async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            handle.request();
        };
        let code = "hold_staged\nx = 1";
        let (outcome, ()) = tokio::join!(session.execute(code, false, &sink), requester);
        assert_eq!(outcome.unwrap().status, ExecuteStatus::Abort);

        let output = collect(&mut rx);
        assert!(output.ends_with(INTERRUPTED_NOTICE), "output: {:?}", output);
        assert!(!staged_path(&output).exists());

        let outcome = session.execute("after", false, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);
        assert_eq!(collect(&mut rx), "after\r\n");
    }

    #[tokio::test]
    async fn test_staged_child_death_removes_file() {
        let mut session = session().await;
        let (sink, mut rx) = mpsc::channel(256);

        let outcome = session
            .execute("exit_staged\nx = 1", false, &sink)
            .await
            .unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);

        let output = collect(&mut rx);
        assert!(output.ends_with(RESTART_NOTICE), "output: {:?}", output);
        assert!(!staged_path(&output).exists());
    }

    #[tokio::test]
    async fn test_interrupt_aborts_and_recovers() {
        let mut session = session().await;
        let handle = session.interrupt_handle();
        let (sink, mut rx) = mpsc::channel(64);

        let requester = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            handle.request();
        };
        let (outcome, ()) = tokio::join!(session.execute("sleep", false, &sink), requester);
        let outcome = outcome.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Abort);

        let output = collect(&mut rx);
        assert!(output.contains("user interrupt"), "output: {:?}", output);
        assert!(output.ends_with(INTERRUPTED_NOTICE));

        let outcome = session.execute("after", false, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);
        assert_eq!(collect(&mut rx), "after\r\n");
    }

    #[tokio::test]
    async fn test_idle_interrupt_is_discarded() {
        let mut session = session().await;
        let (sink, mut rx) = mpsc::channel(64);

        session.interrupt_handle().request();
        let outcome = session.execute("fine", false, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);
        assert_eq!(collect(&mut rx), "fine\r\n");
    }

    #[tokio::test]
    async fn test_child_exit_restarts() {
        let mut session = session().await;
        let info = session.kernel_info();
        let first = session.supervisor.child_mut().unwrap().pid();
        let (sink, mut rx) = mpsc::channel(64);

        let outcome = session.execute("quit", false, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);
        assert!(collect(&mut rx).ends_with(RESTART_NOTICE));

        let second = session.supervisor.child_mut().unwrap().pid();
        assert_ne!(first, second);
        assert_eq!(info.borrow().banner, "GP kernel connected to GP 2.15.4");

        let outcome = session.execute("again", false, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);
        assert_eq!(collect(&mut rx), "again\r\n");
    }

    #[tokio::test]
    async fn test_missing_child_is_started_on_demand() {
        let mut session = session().await;
        session.supervisor.stop();
        let (sink, mut rx) = mpsc::channel(64);

        let outcome = session.execute("back", false, &sink).await.unwrap();
        assert_eq!(outcome.status, ExecuteStatus::Ok);
        assert_eq!(collect(&mut rx), "back\r\n");
    }

    #[tokio::test]
    async fn test_worker_replies_with_request_id() {
        let session = session().await;
        let (jobs_tx, jobs_rx) = mpsc::channel(8);
        let worker = tokio::spawn(run_worker(session, jobs_rx));

        let (respond, mut responses) = mpsc::channel(64);
        jobs_tx
            .send(KernelJob::Execute {
                id: "req-1".to_string(),
                code: "ping".to_string(),
                silent: false,
                respond,
            })
            .await
            .unwrap();

        let mut text = String::new();
        loop {
            match responses.recv().await.unwrap() {
                KernelResponse::Stream { id, text: chunk, .. } => {
                    assert_eq!(id, "req-1");
                    text.push_str(&chunk);
                }
                KernelResponse::ExecuteReply {
                    id,
                    status,
                    execution_count,
                } => {
                    assert_eq!(id, "req-1");
                    assert_eq!(status, ExecuteStatus::Ok);
                    assert_eq!(execution_count, 1);
                    break;
                }
                other => panic!("unexpected response: {:?}", other),
            }
        }
        assert_eq!(text, "ping\r\n");

        drop(jobs_tx);
        worker.await.unwrap();
    }
}
