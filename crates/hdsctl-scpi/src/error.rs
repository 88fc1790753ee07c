//! Error types for the SCPI catalog and parser.

use thiserror::Error;

/// Errors that can occur when building the catalog or parsing commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScpiError {
    /// The command head does not name any catalog entry.
    #[error("unknown scpi command: {0}")]
    UnknownCommand(String),

    /// A query was given arguments, or a set is missing its value.
    #[error("scpi command unexpected arguments: {0}")]
    UnexpectedArguments(String),

    /// A set was issued against a read-only parameter.
    #[error("scpi command is read-only: {0}")]
    ReadOnly(String),

    /// No catalog entry carries the given field identifier.
    #[error("invalid field: {0}")]
    UnknownField(String),

    /// Two definitions share an identifier, short form or mnemonic path.
    #[error("duplicate catalog key {key}: {first} and {second}")]
    DuplicateDefinition {
        /// The colliding lookup key.
        key: String,
        /// Mnemonic path of the definition registered first.
        first: String,
        /// Mnemonic path of the definition that collided.
        second: String,
    },
}

/// Result type alias for catalog operations.
pub type ScpiResult<T> = Result<T, ScpiError>;
