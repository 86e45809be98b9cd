//! Command descriptors.
//!
//! A [`Command`] is an immutable description of a prefixed text command:
//! its name, aliases, required permission, help metadata and the async
//! handler that runs when a message invokes it.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_framework::{Command, CommandContext};
//!
//! let ping = Command::builder("ping")
//!     .alias("p")
//!     .description("Replies with pong")
//!     .build(|ctx: CommandContext| async move {
//!         ctx.reply("pong").await?;
//!         anyhow::Ok(())
//!     });
//! ```
//!
//! Handlers may also be plain types implementing [`CommandHandler`].

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use herald_core::{
    BoxFuture, Guild, HandlerResult, IntoHandlerResult, MessageChannel, Permission,
    TransportResult, User,
};

// ============================================================================
// Command Context
// ============================================================================

/// Everything a command handler receives about one invocation.
#[derive(Clone)]
pub struct CommandContext {
    /// The guild the command was sent in; `None` for direct messages.
    pub guild: Option<Arc<dyn Guild>>,
    /// The user who sent the command.
    pub executor: Arc<dyn User>,
    /// The channel the command was sent in.
    pub channel: Arc<dyn MessageChannel>,
    /// The tokens following the command token.
    pub args: Vec<String>,
}

impl CommandContext {
    /// Sends `text` to the channel the command came from.
    pub async fn reply(&self, text: &str) -> TransportResult<()> {
        self.channel.send(text).await
    }

    /// Returns the argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("guild", &self.guild.as_ref().map(|guild| guild.id()))
            .field("executor", &self.executor.id())
            .field("channel", &self.channel.id())
            .field("args", &self.args)
            .finish()
    }
}

// ============================================================================
// Command Handler
// ============================================================================

/// The code that runs when a command is invoked.
///
/// Implemented for every `Fn(CommandContext) -> impl Future` closure whose
/// output is `()` or a `Result<(), E>`.
pub trait CommandHandler: Send + Sync + 'static {
    /// Runs the command.
    fn call(&self, ctx: CommandContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut, R> CommandHandler for F
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoHandlerResult + 'static,
{
    fn call(&self, ctx: CommandContext) -> BoxFuture<'static, HandlerResult> {
        self(ctx).map(IntoHandlerResult::into_handler_result).boxed()
    }
}

// ============================================================================
// Command
// ============================================================================

/// A registered text command.
///
/// Every command carries a permission and an alias list; absent values are
/// replaced by [`Permission::SendMessages`] and an empty list.
pub struct Command {
    name: String,
    permission: Permission,
    aliases: Vec<String>,
    description: Option<String>,
    usage: Option<String>,
    handler: Box<dyn CommandHandler>,
}

impl Command {
    /// Creates a command.
    pub fn new(
        name: impl Into<String>,
        permission: Option<Permission>,
        aliases: Option<Vec<String>>,
        handler: impl CommandHandler,
    ) -> Self {
        Self {
            name: name.into(),
            permission: permission.unwrap_or_default(),
            aliases: aliases.unwrap_or_default(),
            description: None,
            usage: None,
            handler: Box::new(handler),
        }
    }

    /// Starts building a command named `name`.
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            permission: Permission::default(),
            aliases: Vec::new(),
            description: None,
            usage: None,
        }
    }

    /// Returns the command's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the permission the command requires.
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Returns the command's aliases.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Returns the one-line help text, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the argument synopsis shown by help, such as `"<text...>"`.
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Returns `true` if `token` is `prefix` followed by the name or an alias.
    pub fn matches(&self, prefix: &str, token: &str) -> bool {
        token.strip_prefix(prefix).is_some_and(|rest| {
            rest == self.name || self.aliases.iter().any(|alias| alias == rest)
        })
    }

    /// Runs the command's handler.
    pub fn invoke(&self, ctx: CommandContext) -> BoxFuture<'static, HandlerResult> {
        self.handler.call(ctx)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("permission", &self.permission)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .finish()
    }
}

/// Builder for [`Command`].
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    name: String,
    permission: Permission,
    aliases: Vec<String>,
    description: Option<String>,
    usage: Option<String>,
}

impl CommandBuilder {
    /// Sets the required permission.
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds several aliases.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Sets a one-line description for help output.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a usage string, such as `"<text...>"`.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Finishes the command with its handler.
    pub fn build(self, handler: impl CommandHandler) -> Command {
        Command {
            name: self.name,
            permission: self.permission,
            aliases: self.aliases,
            description: self.description,
            usage: self.usage,
            handler: Box::new(handler),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, noop};

    #[test]
    fn test_defaults_fill_absent_values() {
        let command = Command::new("ping", None, None, noop);
        assert_eq!(command.permission(), Permission::SendMessages);
        assert!(command.aliases().is_empty());
        assert_eq!(command.description(), None);
    }

    #[test]
    fn test_matches_name_and_aliases() {
        let command = Command::new("ping", None, Some(vec!["p".into()]), noop);

        assert!(command.matches("!", "!ping"));
        assert!(command.matches("!", "!p"));
        assert!(!command.matches("!", "ping"));
        assert!(!command.matches("!", "!pi"));
        assert!(!command.matches("!", "!pingg"));
        assert!(!command.matches("?", "!ping"));
    }

    #[test]
    fn test_multi_character_prefix() {
        let command = Command::builder("help").alias("h").build(noop);
        assert!(command.matches("bot.", "bot.h"));
        assert!(!command.matches("bot.", "bot help"));
    }

    #[test]
    fn test_builder_metadata() {
        let command = Command::builder("kick")
            .permission(Permission::KickMembers)
            .aliases(["k", "boot"])
            .description("Removes a member")
            .usage("<user>")
            .build(noop);

        assert_eq!(command.permission(), Permission::KickMembers);
        assert_eq!(command.aliases(), ["k", "boot"]);
        assert_eq!(command.description(), Some("Removes a member"));
        assert_eq!(command.usage(), Some("<user>"));
    }

    #[tokio::test]
    async fn test_invoke_passes_args() {
        let command = Command::builder("echo").build(|ctx: CommandContext| async move {
            ctx.reply(&ctx.args.join(" ")).await?;
            anyhow::Ok(())
        });

        let (ctx, channel) = context(&["hello", "world"]);
        command.invoke(ctx).await.unwrap();
        assert_eq!(channel.sent(), ["hello world"]);
    }
}
