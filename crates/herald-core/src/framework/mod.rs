//! Framework layer - Core processing and routing.
//!
//! This module contains the event processing pipeline:
//! - Handler tables and guarded handler invocation
//! - Listeners and their bound handler tables
//! - Type-based handler resolution
//! - Copy-on-write registries shared with the command layer
//! - The central event dispatcher

pub mod dispatcher;
pub mod handler;
pub mod listener;
pub mod registry;
pub mod resolver;

pub use dispatcher::{DispatchReport, EventDispatcher};
pub use handler::{
    BoundHandler, BoxFuture, EventParam, HandlerDescriptor, Handlers, IntoHandlerResult,
    invoke_guarded,
};
pub use listener::{Listener, ListenerEntry, ListenerRegistry, RegisteredListener};
pub use registry::{EntryKey, Identity, Registry};
