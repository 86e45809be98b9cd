//! Integration layer - Interfaces to the transport.
//!
//! This module contains the collaborator traits a transport implements and
//! the message event it produces:
//! - Guild, user and channel handles
//! - The [`MessageReceived`] event consumed by the command bridge

pub mod message;
pub mod transport;

pub use message::MessageReceived;
pub use transport::{Guild, MessageChannel, User};
