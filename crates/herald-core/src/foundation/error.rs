//! Unified error types for the Herald core.
//!
//! Handler bodies report failures through [`HandlerResult`] (an
//! `anyhow::Result`). Those failures never escape the dispatch loop; they are
//! converted into [`HandlerFailure`] diagnostics instead.

use std::fmt;

use thiserror::Error;

/// The return type of listener handlers and command handlers.
pub type HandlerResult = anyhow::Result<()>;

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors raised while wiring listeners into a dispatcher.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// A handler was declared without an event parameter.
    #[error("invalid handler signature: `{listener}::{handler}` declares no event parameter")]
    InvalidHandlerSignature {
        /// Type name of the declaring listener.
        listener: &'static str,
        /// Name of the offending handler.
        handler: &'static str,
    },
}

// =============================================================================
// Handler Failures
// =============================================================================

/// Where a failed invocation came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureOrigin {
    /// A listener handler.
    Listener {
        /// Type name of the listener.
        listener: &'static str,
        /// Name of the handler.
        handler: &'static str,
    },
    /// A command handler.
    Command {
        /// The command's name.
        name: String,
    },
}

impl fmt::Display for FailureOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listener { listener, handler } => write!(f, "handler `{listener}::{handler}`"),
            Self::Command { name } => write!(f, "command `{name}`"),
        }
    }
}

/// How an invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    /// The handler returned an error.
    #[error("returned error: {0}")]
    Error(String),
    /// The handler panicked.
    #[error("panicked: {0}")]
    Panic(String),
}

/// A handler or command invocation that failed and was isolated.
///
/// Failures are recorded in dispatch and route reports and broadcast on the
/// dispatcher's failure channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin} {kind}")]
pub struct HandlerFailure {
    /// What failed.
    pub origin: FailureOrigin,
    /// How it failed.
    pub kind: FailureKind,
}

impl HandlerFailure {
    /// Returns `true` if the failure was a panic.
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, FailureKind::Panic(_))
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors reported by transport collaborators.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The session with the remote backend is not established.
    #[error("transport is not connected")]
    NotConnected,

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dispatcher wiring.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
