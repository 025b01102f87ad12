//! Error types (scrac)

use thiserror::Error;

/// User input errors
///
/// All four are fatal to the single-shot process: the diagnostic is printed,
/// followed by the full usage text, then exit 1. Errors from the REST client
/// itself are not remapped and propagate out of `main`.
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("No Number and/or URL were found. Please check settings and/or settings path.")]
    ConfigurationMissing,

    #[error("Command not found!")]
    UnknownCommand,

    #[error("Wrong number of arguments for command\nExpected: {expected}")]
    ArityMismatch { expected: String },

    #[error("No command, please enter a command.")]
    NoCommandSupplied,
}
