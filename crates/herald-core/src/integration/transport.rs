//! Transport collaborator traits.
//!
//! The transport layer lives outside the core. It owns the session with the
//! remote platform and hands the core three kinds of handles, all shared
//! through `Arc<dyn _>`:
//!
//! - [`Guild`] - the server a message was posted in
//! - [`User`] - the author of a message
//! - [`MessageChannel`] - where a message was posted, and where replies go

use async_trait::async_trait;

use crate::foundation::error::TransportResult;
use crate::foundation::permission::Permission;

/// A guild (server) on the remote platform.
pub trait Guild: Send + Sync {
    /// Platform identifier of the guild.
    fn id(&self) -> &str;

    /// Display name of the guild.
    fn name(&self) -> &str;
}

/// A user on the remote platform.
pub trait User: Send + Sync {
    /// Platform identifier of the user.
    fn id(&self) -> &str;

    /// Display name of the user.
    fn name(&self) -> &str;

    /// Returns `true` if the account is automated.
    fn is_bot(&self) -> bool {
        false
    }

    /// Returns `true` if the user holds `permission` where the message was posted.
    ///
    /// The default grants [`Permission::SendMessages`] only.
    fn has_permission(&self, permission: Permission) -> bool {
        permission == Permission::SendMessages
    }
}

/// A text channel that accepts outbound messages.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Platform identifier of the channel.
    fn id(&self) -> &str;

    /// Display name of the channel.
    fn name(&self) -> &str;

    /// Sends a text message to this channel.
    async fn send(&self, text: &str) -> TransportResult<()>;
}
