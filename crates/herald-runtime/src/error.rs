//! Runtime error types.

use herald_core::DispatchError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The bot could not be assembled.
    #[error("Failed to build bot: {0}")]
    Dispatch(#[from] DispatchError),

    /// The event receiver was already taken by `run`.
    #[error("Runtime is already running or has already run")]
    AlreadyRunning,

    /// The runtime stopped receiving events.
    #[error("Event channel is closed")]
    ChannelClosed,

    /// `try_send` found the event queue full.
    #[error("Event channel is full")]
    ChannelFull,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
