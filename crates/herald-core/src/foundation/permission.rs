//! Permission tokens attached to commands.

use std::fmt;
use std::str::FromStr;

/// A capability a user may hold on the remote platform.
///
/// Herald itself never enforces permissions; they are metadata that a
/// bridge or transport may check before invoking a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Permission {
    /// Send messages in a channel. The baseline every command requires.
    #[default]
    SendMessages,
    /// Read message history.
    ReadHistory,
    /// Delete or pin other users' messages.
    ManageMessages,
    /// Create, edit and delete channels.
    ManageChannels,
    /// Assign and edit roles.
    ManageRoles,
    /// Remove members from a guild.
    KickMembers,
    /// Ban members from a guild.
    BanMembers,
    /// Edit guild settings.
    ManageGuild,
    /// Every permission.
    Administrator,
}

impl Permission {
    /// Returns the canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendMessages => "send_messages",
            Self::ReadHistory => "read_history",
            Self::ManageMessages => "manage_messages",
            Self::ManageChannels => "manage_channels",
            Self::ManageRoles => "manage_roles",
            Self::KickMembers => "kick_members",
            Self::BanMembers => "ban_members",
            Self::ManageGuild => "manage_guild",
            Self::Administrator => "administrator",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "send_messages" | "message_write" => Self::SendMessages,
            "read_history" | "message_history" => Self::ReadHistory,
            "manage_messages" | "message_manage" => Self::ManageMessages,
            "manage_channels" => Self::ManageChannels,
            "manage_roles" => Self::ManageRoles,
            "kick_members" => Self::KickMembers,
            "ban_members" => Self::BanMembers,
            "manage_guild" | "manage_server" => Self::ManageGuild,
            "administrator" | "admin" => Self::Administrator,
            _ => return Err(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_send_messages() {
        assert_eq!(Permission::default(), Permission::SendMessages);
    }

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!("MESSAGE_WRITE".parse(), Ok(Permission::SendMessages));
        assert_eq!("admin".parse(), Ok(Permission::Administrator));
        assert_eq!("fly".parse::<Permission>(), Err(()));
    }
}
