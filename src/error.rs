//! Error types for the kernel core.
//!
//! Only failures to bring a child up at all are errors. Interrupts and
//! unexpected child exits are reported as execution outcomes instead.

use std::time::Duration;

/// Errors raised by the kernel core.
#[derive(thiserror::Error, Debug)]
pub enum KernelError {
    /// The child command line was empty.
    #[error("child command cannot be empty")]
    EmptyCommand,

    /// A command line argument contained an interior NUL byte.
    #[error("invalid child argument {arg:?}")]
    InvalidArgument {
        arg: String,
        #[source]
        source: std::ffi::NulError,
    },

    /// Opening the PTY or forking failed.
    #[error("failed to set up child PTY: {0}")]
    Pty(#[from] nix::Error),

    /// The child binary could not be executed.
    #[error("failed to execute {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child never printed its prompt.
    #[error("child did not print its prompt within {0:?}")]
    StartupTimeout(Duration),

    /// The child closed its output before printing its prompt.
    #[error("child exited before printing its prompt")]
    ExitedDuringStartup,

    /// The startup banner carried no recognisable version.
    #[error("no version found in banner: {banner:?}")]
    VersionNotFound { banner: String },

    /// Writing the staging file for a large input failed.
    #[error("failed to stage input: {0}")]
    Staging(#[source] std::io::Error),
}

impl KernelError {
    /// Whether this error means no child could be started.
    pub fn is_fatal_init(&self) -> bool {
        !matches!(self, KernelError::Staging(_))
    }
}

pub type Result<T, E = KernelError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_is_recoverable() {
        let err = KernelError::Staging(std::io::Error::other("disk full"));
        assert!(!err.is_fatal_init());
        assert!(KernelError::ExitedDuringStartup.is_fatal_init());
    }

    #[test]
    fn test_exec_message_names_program() {
        let err = KernelError::Exec {
            program: "gp".to_string(),
            source: std::io::Error::from_raw_os_error(2),
        };
        assert!(err.to_string().starts_with("failed to execute gp"));
    }
}
