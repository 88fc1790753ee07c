//! Error types for link transfers and command execution.

use thiserror::Error;

/// Failures of a physical transfer on the device link.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    /// The transfer did not complete within the link's I/O timeout.
    #[error("transfer timed out")]
    Timeout,

    /// The device is no longer reachable.
    #[error("device disconnected")]
    Disconnected,

    /// Any other transport failure.
    #[error("link I/O error: {0}")]
    Io(String),
}

/// Result type alias for link transfers.
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors that can occur while executing a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecError {
    /// The link accepted fewer bytes than the command length.
    #[error("only {written} of {expected} bytes written")]
    ShortWrite {
        /// Bytes reported as transferred.
        written: usize,
        /// Length of the command.
        expected: usize,
    },

    /// The transfer itself failed.
    #[error("link transfer failed: {0}")]
    Link(#[from] LinkError),

    /// A bulk-data query returned an implausibly short buffer.
    #[error("unexpected length {length} for {command}")]
    UnexpectedResponseLength {
        /// Bytes received.
        length: usize,
        /// The query that was sent.
        command: String,
    },

    /// The identity query did not name a supported instrument.
    #[error("unsupported device: {0}")]
    UnsupportedDevice(String),
}

/// Result type alias for execution.
pub type ExecResult<T> = Result<T, ExecError>;

/// Reasons a status block is discarded.
///
/// These never reach the caller of `execute`; they are logged and the cache
/// keeps its previous entries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusBlockError {
    /// The block has no section with the given name.
    #[error("status block missing section {0}")]
    MissingSection(&'static str),

    /// The block is not valid JSON or a section has the wrong shape.
    #[error("malformed status block: {0}")]
    Malformed(String),
}
