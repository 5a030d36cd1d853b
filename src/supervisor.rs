//! Child lifecycle: start, version discovery and restart.

use crate::error::{KernelError, Result};
use crate::expect::Expect;
use crate::protocol::Config;
use crate::pty::ChildProcess;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

static VERSION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn version_pattern() -> &'static Regex {
    VERSION_PATTERN.get_or_init(|| Regex::new(r"(?i)version\s+(\d+(?:\.\d+)+)").unwrap())
}

/// Extract the dotted version number from a startup banner
pub fn parse_version(banner: &str) -> Result<String> {
    version_pattern()
        .captures(banner)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| KernelError::VersionNotFound {
            banner: banner.to_string(),
        })
}

/// What a successful start reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Startup {
    /// Everything printed before the first prompt
    pub banner: String,
    pub version: String,
}

/// Owns the child process, restarting it when it goes away
pub struct Supervisor {
    config: Config,
    child: Option<ChildProcess>,
}

impl Supervisor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            child: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Launch a fresh child and wait for its first prompt.
    ///
    /// Any previous child is terminated first. On failure no child is kept.
    pub async fn start(&mut self) -> Result<Startup> {
        self.stop();

        let command = self.config.child_command();
        info!("Starting child: {:?}", command);
        let mut child = ChildProcess::spawn(&command, self.config.rows, self.config.cols)?;

        let outcome = child
            .stream()
            .expect_exact(&self.config.sentinel, self.config.startup_timeout)
            .await;
        match outcome {
            Expect::Matched => {}
            Expect::Timeout => {
                warn!(
                    "No prompt from PID {} after {:?}",
                    child.pid(),
                    self.config.startup_timeout
                );
                return Err(KernelError::StartupTimeout(self.config.startup_timeout));
            }
            Expect::Eof => return Err(KernelError::ExitedDuringStartup),
        }

        let banner = child.stream().before().to_string();
        let version = parse_version(&banner)?;
        info!("Child PID {} ready, version {}", child.pid(), version);

        self.child = Some(child);
        Ok(Startup { banner, version })
    }

    /// Replace the current child with a fresh one
    pub async fn restart(&mut self) -> Result<Startup> {
        info!("Restarting child");
        self.start().await
    }

    /// Start a child if there is none, e.g. after a failed restart.
    ///
    /// Returns the startup report when a child was launched.
    pub async fn ensure_running(&mut self) -> Result<Option<Startup>> {
        if self.child.is_some() {
            return Ok(None);
        }
        debug!("No child running, starting one");
        self.start().await.map(Some)
    }

    pub fn child_mut(&mut self) -> Option<&mut ChildProcess> {
        self.child.as_mut()
    }

    /// Terminate the child, if any
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!("Stopping child PID {}", child.pid());
            if let Err(e) = child.shutdown() {
                warn!("Failed to reap child PID {}: {}", child.pid(), e);
            }
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;

    /// Config running the scripted stand-in for gp
    pub(crate) fn fake_gp_config() -> Config {
        let script = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/fake_gp.sh");
        Config {
            command: vec!["sh".to_string(), script.to_string()],
            poll_interval: Duration::from_millis(20),
            max_poll_interval: Duration::from_millis(20),
            startup_timeout: Duration::from_secs(5),
            ..Config::default()
        }
    }

    fn sh_config(script: &str) -> Config {
        Config {
            command: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            startup_timeout: Duration::from_millis(500),
            ..Config::default()
        }
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("GP/PARI CALCULATOR Version 2.15.4 (released)").unwrap(),
            "2.15.4"
        );
        assert_eq!(parse_version("gp VERSION  2.17").unwrap(), "2.17");
        assert!(matches!(
            parse_version("version 2 only"),
            Err(KernelError::VersionNotFound { .. })
        ));
        assert!(parse_version("no digits here").is_err());
    }

    #[tokio::test]
    async fn test_start_reads_banner_and_version() {
        let mut supervisor = Supervisor::new(fake_gp_config());
        let startup = supervisor.start().await.unwrap();

        assert_eq!(startup.version, "2.15.4");
        assert!(startup.banner.contains("GP/PARI CALCULATOR"));
        assert!(supervisor.child_mut().is_some());
    }

    #[tokio::test]
    async fn test_restart_replaces_child() {
        let mut supervisor = Supervisor::new(fake_gp_config());
        supervisor.start().await.unwrap();
        let first = supervisor.child_mut().unwrap().pid();

        supervisor.restart().await.unwrap();
        let second = supervisor.child_mut().unwrap().pid();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_ensure_running_only_starts_once() {
        let mut supervisor = Supervisor::new(fake_gp_config());
        assert!(supervisor.ensure_running().await.unwrap().is_some());
        assert!(supervisor.ensure_running().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_binary_is_fatal() {
        let config = Config {
            gp_binary: "/nonexistent/gp".to_string(),
            ..Config::default()
        };
        let mut supervisor = Supervisor::new(config);

        let err = supervisor.start().await.unwrap_err();
        assert!(matches!(err, KernelError::Exec { .. }));
        assert!(err.is_fatal_init());
        assert!(supervisor.child_mut().is_none());
    }

    #[tokio::test]
    async fn test_exit_before_prompt() {
        let mut supervisor = Supervisor::new(sh_config("printf 'no prompt here\\n'"));
        assert!(matches!(
            supervisor.start().await,
            Err(KernelError::ExitedDuringStartup)
        ));
    }

    #[tokio::test]
    async fn test_banner_without_version() {
        let mut supervisor =
            Supervisor::new(sh_config("printf 'hello\\n>PEXPECT_PROMPT<'; sleep 5"));
        assert!(matches!(
            supervisor.start().await,
            Err(KernelError::VersionNotFound { .. })
        ));
        assert!(supervisor.child_mut().is_none());
    }

    #[tokio::test]
    async fn test_startup_timeout() {
        let mut supervisor = Supervisor::new(sh_config("sleep 5"));
        assert!(matches!(
            supervisor.start().await,
            Err(KernelError::StartupTimeout(_))
        ));
    }
}
