//! PTY (pseudo-terminal) management for the REPL child.
//!
//! Provides:
//! - Spawning the child on a PTY with echo disabled
//! - Reporting exec failures back to the parent
//! - Background reader/writer threads bridged to channels
//! - Signalling and reaping the child

use crate::error::{KernelError, Result};
use crate::expect::ReplStream;
use nix::fcntl::{fcntl, FcntlArg, FdFlag, OFlag};
use nix::libc;
use nix::pty::{openpty, OpenptyResult, Winsize};
use nix::sys::signal::{self, sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::termios::{tcgetattr, tcsetattr, LocalFlags, SetArg};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{dup2, execvp, fork, pipe2, setsid, write, ForkResult, Pid};
use std::ffi::CString;
use std::fs::File;
use std::io::Read;
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Restores the previous SIGINT disposition when dropped.
///
/// While alive, SIGINT has its default disposition, so a forked child does
/// not inherit an ignored interrupt signal.
struct DefaultSigintGuard {
    previous: Option<SigAction>,
}

impl DefaultSigintGuard {
    fn install() -> Self {
        let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
        let previous = match unsafe { sigaction(Signal::SIGINT, &default) } {
            Ok(previous) => Some(previous),
            Err(e) => {
                warn!("Failed to reset SIGINT handler before spawn: {}", e);
                None
            }
        };
        Self { previous }
    }
}

impl Drop for DefaultSigintGuard {
    fn drop(&mut self) {
        if let Some(ref previous) = self.previous {
            if let Err(e) = unsafe { sigaction(Signal::SIGINT, previous) } {
                warn!("Failed to restore SIGINT handler: {}", e);
            }
        }
    }
}

/// PTY handle for the spawned child
pub struct Pty {
    /// Master file descriptor
    master_fd: OwnedFd,
    /// Child process ID
    child_pid: Pid,
    /// Whether the child is still running
    running: Arc<AtomicBool>,
}

impl Pty {
    /// Create a new PTY and spawn the given command on it
    pub fn spawn(command: &[String], rows: u16, cols: u16) -> Result<Self> {
        if command.is_empty() {
            return Err(KernelError::EmptyCommand);
        }

        // Build argv before forking so the child only has to exec
        let argv = command
            .iter()
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|source| KernelError::InvalidArgument {
                    arg: arg.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<CString>>>()?;

        let winsize = Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };

        let OpenptyResult { master, slave } = openpty(&winsize, None)?;

        // Keep these out of children spawned concurrently; dup2 clears the
        // flag on the child's stdio copies
        fcntl(master.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
        fcntl(slave.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;

        // Input must not be echoed back into the output stream
        let mut termios = tcgetattr(&slave)?;
        termios.local_flags.remove(LocalFlags::ECHO);
        tcsetattr(&slave, SetArg::TCSANOW, &termios)?;

        // Closed by a successful exec; carries errno otherwise
        let (status_read, status_write) = pipe2(OFlag::O_CLOEXEC)?;

        let fork_result = {
            let _sigint = DefaultSigintGuard::install();
            unsafe { fork() }?
        };

        match fork_result {
            ForkResult::Parent { child } => {
                drop(slave);
                drop(status_write);

                let mut status = File::from(status_read);
                let mut errno = [0u8; 4];
                let exec_failed = match status.read(&mut errno) {
                    Ok(n) => n == errno.len(),
                    Err(e) => {
                        warn!("Failed to read exec status for PID {}: {}", child, e);
                        false
                    }
                };
                if exec_failed {
                    let _ = waitpid(child, None);
                    return Err(KernelError::Exec {
                        program: command[0].clone(),
                        source: std::io::Error::from_raw_os_error(i32::from_ne_bytes(errno)),
                    });
                }

                // Set master to non-blocking
                let flags = fcntl(master.as_raw_fd(), FcntlArg::F_GETFL)?;
                let flags = OFlag::from_bits_truncate(flags);
                fcntl(
                    master.as_raw_fd(),
                    FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK),
                )?;

                info!("Spawned {} with PID {}", command[0], child);

                Ok(Self {
                    master_fd: master,
                    child_pid: child,
                    running: Arc::new(AtomicBool::new(true)),
                })
            }
            ForkResult::Child => {
                drop(master);
                drop(status_read);

                setsid().ok();

                unsafe {
                    libc::ioctl(slave.as_raw_fd(), libc::TIOCSCTTY as libc::c_ulong, 0);
                }

                let slave_raw = slave.as_raw_fd();
                dup2(slave_raw, libc::STDIN_FILENO).ok();
                dup2(slave_raw, libc::STDOUT_FILENO).ok();
                dup2(slave_raw, libc::STDERR_FILENO).ok();

                if slave_raw > 2 {
                    drop(slave);
                }

                if let Err(e) = execvp(&argv[0], &argv) {
                    let _ = write(&status_write, &(e as i32).to_ne_bytes());
                }
                unsafe { libc::_exit(127) }
            }
        }
    }

    /// Get the master file descriptor
    pub fn master_fd(&self) -> RawFd {
        self.master_fd.as_raw_fd()
    }

    /// Get the child process ID
    pub fn child_pid(&self) -> Pid {
        self.child_pid
    }

    /// Check if child is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get a clone of the running flag
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Send a signal to the child process
    pub fn signal(&self, sig: Signal) -> nix::Result<()> {
        signal::kill(self.child_pid, sig)
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.signal(Signal::SIGTERM);
        }
    }
}

/// Running REPL child
///
/// Reading and writing happen on background threads since PTY operations
/// are blocking even in non-blocking mode (need to poll). Output is
/// buffered in a [`ReplStream`] for sentinel matching.
pub struct ChildProcess {
    /// Output buffer fed by the reader thread
    stream: ReplStream,
    /// Channel for outgoing data to PTY
    input_tx: mpsc::Sender<Vec<u8>>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Child PID
    child_pid: Pid,
    /// Owned PTY for lifecycle management
    pty: Option<Pty>,
}

impl ChildProcess {
    /// Spawn the command and start the I/O threads
    pub fn spawn(command: &[String], rows: u16, cols: u16) -> Result<Self> {
        let pty = Pty::spawn(command, rows, cols)?;
        Ok(Self::new(pty))
    }

    fn new(pty: Pty) -> Self {
        let running = pty.running_flag();
        let child_pid = pty.child_pid();
        let master_fd = pty.master_fd();

        let (output_tx, output_rx) = mpsc::channel(64);
        let (input_tx, input_rx) = mpsc::channel(64);

        let reader_running = Arc::clone(&running);
        std::thread::spawn(move || {
            Self::reader_thread(master_fd, reader_running, output_tx);
        });

        let writer_running = Arc::clone(&running);
        std::thread::spawn(move || {
            Self::writer_thread(master_fd, writer_running, input_rx);
        });

        Self {
            stream: ReplStream::new(output_rx),
            input_tx,
            running,
            child_pid,
            pty: Some(pty),
        }
    }

    fn reader_thread(fd: RawFd, running: Arc<AtomicBool>, tx: mpsc::Sender<Vec<u8>>) {
        let mut buf = [0u8; 4096];
        loop {
            if !running.load(Ordering::SeqCst) {
                break;
            }

            match nix::unistd::read(fd, &mut buf) {
                Ok(0) => {
                    running.store(false, Ordering::SeqCst);
                    break;
                }
                Ok(n) => {
                    if tx.blocking_send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(nix::errno::Errno::EAGAIN) => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(nix::errno::Errno::EIO) => {
                    // Slave side closed: the child is gone
                    running.store(false, Ordering::SeqCst);
                    break;
                }
                Err(_) if !running.load(Ordering::SeqCst) => break,
                Err(e) => {
                    error!("PTY read error: {}", e);
                    running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
        debug!("Reader thread exiting");
    }

    fn writer_thread(fd: RawFd, running: Arc<AtomicBool>, mut rx: mpsc::Receiver<Vec<u8>>) {
        while let Some(data) = rx.blocking_recv() {
            if !running.load(Ordering::SeqCst) {
                break;
            }

            let mut written = 0;
            while written < data.len() {
                let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
                match write(borrowed, &data[written..]) {
                    Ok(n) => {
                        written += n;
                    }
                    Err(nix::errno::Errno::EAGAIN) => {
                        std::thread::sleep(Duration::from_millis(1));
                    }
                    Err(e) => {
                        error!("PTY write error: {}", e);
                        break;
                    }
                }
            }
        }
        debug!("Writer thread exiting");
    }

    /// Output buffer of the child
    pub fn stream(&mut self) -> &mut ReplStream {
        &mut self.stream
    }

    /// Send one line of input to the child
    pub async fn send_line(&self, line: &str) -> std::result::Result<(), ChildGone> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.input_tx.send(data).await.map_err(|_| ChildGone)
    }

    /// Check if the child is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the child process ID
    pub fn pid(&self) -> Pid {
        self.child_pid
    }

    /// Send a signal to the child process
    pub fn signal(&self, sig: Signal) -> nix::Result<()> {
        signal::kill(self.child_pid, sig)
    }

    /// Terminate the child process and reap it.
    pub fn shutdown(&mut self) -> nix::Result<()> {
        if self.pty.is_none() {
            return Ok(());
        }

        self.running.store(false, Ordering::SeqCst);
        let _ = self.signal(Signal::SIGTERM);

        let start = Instant::now();
        let mut reaped = false;

        while start.elapsed() < Duration::from_secs(2) {
            match waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => {
                    std::thread::sleep(Duration::from_millis(50));
                }
                Ok(_) | Err(nix::errno::Errno::ECHILD) => {
                    reaped = true;
                    break;
                }
                Err(e) => {
                    self.pty.take();
                    return Err(e);
                }
            }
        }

        if !reaped {
            warn!("PID {} ignored SIGTERM, killing", self.child_pid);
            let _ = self.signal(Signal::SIGKILL);
            let _ = waitpid(self.child_pid, None);
        }

        self.pty.take();
        Ok(())
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// The child's input channel is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildGone;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_rejects_empty_command() {
        assert!(matches!(
            Pty::spawn(&[], 24, 80),
            Err(KernelError::EmptyCommand)
        ));
    }

    #[test]
    fn test_spawn_reports_missing_binary() {
        let command = vec!["/nonexistent/gp-bridge-test-binary".to_string()];
        match Pty::spawn(&command, 24, 80) {
            Err(KernelError::Exec { program, source }) => {
                assert_eq!(program, command[0]);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("spawn of a missing binary succeeded"),
        }
    }

    #[test]
    fn test_spawn_rejects_nul_argument() {
        let command = vec!["sh".to_string(), "a\0b".to_string()];
        assert!(matches!(
            Pty::spawn(&command, 24, 80),
            Err(KernelError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_child_output_reaches_stream() {
        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "printf 'ready>'; IFS= read -r line; printf '%s|' \"$line\"".to_string(),
        ];
        let mut child = ChildProcess::spawn(&command, 24, 80).unwrap();
        let timeout = Duration::from_secs(5);

        let outcome = child.stream().expect_exact("ready>", timeout).await;
        assert_eq!(outcome, crate::expect::Expect::Matched);

        child.send_line("hello").await.unwrap();
        let outcome = child.stream().expect_exact("|", timeout).await;
        assert_eq!(outcome, crate::expect::Expect::Matched);
        assert_eq!(child.stream().before(), "hello");
    }
}
