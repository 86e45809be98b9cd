//! Herald Runtime - configuration, logging and the event loop.
//!
//! This crate provides:
//! - Layered configuration loading ([`ConfigLoader`], [`HeraldConfig`])
//! - Logging initialization ([`LoggingBuilder`], [`logging::init_from_config`])
//! - [`HeraldRuntime`], which owns a [`Bot`](herald_framework::Bot) and
//!   dispatches events submitted through an [`EventSender`]
//!
//! ```ignore
//! use herald_runtime::HeraldRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = HeraldRuntime::new()?;
//!     let sender = runtime.event_sender()?;
//!     tokio::spawn(console_transport(sender));
//!
//!     // Run until Ctrl+C
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    BotSettings, ConfigError, ConfigLoader, ConfigResult, HeraldConfig, LoggingConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{EventSender, HeraldRuntime, RuntimeBuilder, RuntimeStats};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
