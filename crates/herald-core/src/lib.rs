//! # Herald Core
//!
//! The core engine of the Herald bot framework.
//!
//! This crate provides the event dispatch machinery: typed events, listeners
//! with declared handler tables, type-based handler resolution, ordered
//! registries and the central [`EventDispatcher`].
//!
//! ## Architecture Layers
//!
//! Herald Core is organized into three architectural layers:
//!
//! ### Foundation Layer
//!
//! Core abstractions and type system:
//! - **Event System**: Type-erased events with runtime downcasting ([`Event`], [`BoxedEvent`])
//! - **Errors**: Dispatch errors and isolated handler failures ([`DispatchError`], [`HandlerFailure`])
//! - **Permissions**: Capability tokens carried as command metadata ([`Permission`])
//!
//! ### Framework Layer
//!
//! Event processing and routing:
//! - **Handler System**: Declared handler tables ([`Handlers`], [`Listener`])
//! - **Resolution**: Matching handlers by exact event type or wildcard
//! - **Registries**: Ordered copy-on-write collections ([`Registry`])
//! - **Dispatcher**: Central event routing ([`EventDispatcher`])
//!
//! ### Integration Layer
//!
//! Transport collaborator interfaces:
//! - **Handles**: [`Guild`], [`User`] and [`MessageChannel`]
//! - **Inbound Messages**: The [`MessageReceived`] event
//!
//! ## Hub-and-Spoke Architecture
//!
//! All events flow through the central [`EventDispatcher`]:
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌───────────┐
//! │  Transport  │────▶│ Dispatcher │────▶│ Listener  │
//! │             │     │   (Core)   │────▶│ Listener  │
//! └─────────────┘     └────────────┘────▶│ Listener  │
//!                                        └───────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use herald_core::{Event, EventDispatcher, listener};
//! use std::sync::Arc;
//!
//! #[derive(Event)]
//! struct MemberJoined {
//!     name: String,
//! }
//!
//! struct Greeter;
//!
//! #[listener]
//! impl Greeter {
//!     #[handler]
//!     async fn on_join(&self, event: &MemberJoined) {
//!         println!("Welcome, {}!", event.name);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dispatcher = EventDispatcher::new();
//!     dispatcher.register_listener(Arc::new(Greeter))?;
//!
//!     dispatcher
//!         .dispatch(MemberJoined { name: "Ferris".into() })
//!         .await;
//!     Ok(())
//! }
//! ```

// Lets the derive and attribute macros refer to `::herald_core` from inside
// this crate.
extern crate self as herald_core;

// Architectural layers
pub mod foundation;
pub mod framework;
pub mod integration;

// Re-export foundation types
pub use foundation::{
    BoxedEvent, DispatchError, DispatchResult, Event, FailureKind, FailureOrigin,
    HandlerFailure, HandlerResult, Permission, TransportError, TransportResult,
};

// Re-export framework types
pub use framework::{
    BoundHandler, BoxFuture, DispatchReport, EntryKey, EventDispatcher, EventParam,
    HandlerDescriptor, Handlers, Identity, IntoHandlerResult, Listener, ListenerEntry,
    ListenerRegistry, RegisteredListener, Registry, invoke_guarded,
};

// Re-export integration types
pub use integration::{Guild, MessageChannel, MessageReceived, User};

// Re-export macros
pub use herald_macros::{Event, listener};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::framework::{
        BoxFuture, DispatchReport, EventDispatcher, Handlers, Listener, Registry,
    };
    pub use super::integration::*;
    pub use herald_macros::{Event, listener};
}
