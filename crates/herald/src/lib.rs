//! # Herald
//!
//! A typed event-dispatch and command-routing framework for chat bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐  EventSender  ┌──────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │ Transport │──────────────▶│ Runtime  │────▶│ EventDispatcher │────▶│ Listener handlers │
//! └───────────┘               └──────────┘     └─────────────────┘     └──────────────────┘
//!                                                       │
//!                                                       ▼
//!                                              ┌─────────────────┐     ┌──────────────────┐
//!                                              │  CommandBridge  │────▶│  CommandRouter   │
//!                                              └─────────────────┘     └──────────────────┘
//! ```
//!
//! - **Listeners**: objects whose handlers are selected by the event's type
//! - **CommandBridge**: a built-in listener that turns prefixed messages into command calls
//! - **Commands**: named, aliased operations with a permission
//! - **Runtime**: owns the bot, loads configuration and sets up logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = HeraldRuntime::new()?;
//!
//!     runtime.bot().register_command(Arc::new(
//!         Command::builder("ping")
//!             .alias("p")
//!             .build(|ctx: CommandContext| async move { ctx.reply("pong").await }),
//!     ));
//!
//!     let sender = runtime.event_sender()?;
//!     tokio::spawn(my_transport(sender));
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! The `#[derive(Event)]` and `#[listener]` macros expand to paths under
//! `herald_core`, so crates using them depend on `herald-core` as well.
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use herald_core as core;
pub use herald_framework as framework;
pub use herald_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime - main entry point
    pub use herald_runtime::{EventSender, HeraldConfig, HeraldRuntime};

    // Events and listeners
    pub use herald_core::{
        BoxedEvent, DispatchReport, Event, HandlerFailure, HandlerResult, Handlers, Listener,
        listener,
    };

    // Platform collaborators
    pub use herald_core::{
        Guild, MessageChannel, MessageReceived, Permission, TransportError, TransportResult, User,
    };

    // Commands
    pub use herald_framework::{Bot, Command, CommandContext, MatchMode};
}
