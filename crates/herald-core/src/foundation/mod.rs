//! Foundation layer - Core abstractions and type system.
//!
//! This module contains the fundamental building blocks of the Herald framework:
//! - Event system for type-erased event passing
//! - Error taxonomy for dispatch and handler failures
//! - Permission tokens carried as command metadata

pub mod error;
pub mod event;
pub mod permission;

pub use error::{
    DispatchError, DispatchResult, FailureKind, FailureOrigin, HandlerFailure, HandlerResult,
    TransportError, TransportResult,
};
pub use event::{BoxedEvent, Event};
pub use permission::Permission;
