//! Error types for the runner.

use std::io;

use hdsctl_link::ExecError;
use hdsctl_scpi::ScpiError;
use thiserror::Error;

/// Errors surfaced by the instrument facade, the streamer and the binary.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The command text was rejected by the catalog.
    #[error(transparent)]
    Scpi(#[from] ScpiError),

    /// The command failed on the link.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// A script command failed.
    #[error("command `{command}` failed: {source}")]
    Command {
        /// The offending command text.
        command: String,
        /// What went wrong.
        #[source]
        source: Box<RunnerError>,
    },

    /// Waveforms exist only for channels 1 and 2.
    #[error("invalid channel number: {0}")]
    InvalidChannel(u8),

    /// A subscriber message was not of the form `id:value`.
    #[error("invalid subscriber message: {0:?}")]
    InvalidMessage(String),

    /// The configuration file could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// Socket or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RunnerError {
    /// Attach the command text that produced this error.
    pub fn in_command(self, command: impl Into<String>) -> Self {
        RunnerError::Command {
            command: command.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
