//! # Herald Framework
//!
//! Command handling on top of the Herald core.
//!
//! This layer provides:
//! - Command descriptors with aliases, permissions and help metadata
//! - The command router with fan-out and first-match modes
//! - The bridge listener that turns prefixed messages into commands
//! - The [`Bot`] that owns a prefix, a dispatcher and a router
//! - Tower `Service` integration for feeding events through middleware

pub mod bot;
pub mod bridge;
pub mod command;
pub mod router;
pub mod service;
pub mod split;

#[cfg(test)]
mod test_support;

pub use bot::{Bot, BotOptions, Prefix};
pub use bridge::{BridgeOptions, CommandBridge};
pub use command::{Command, CommandBuilder, CommandContext, CommandHandler};
pub use router::{CommandRegistry, CommandRouter, MatchMode, RouteReport};
pub use split::{CommandLine, split_tokens};
