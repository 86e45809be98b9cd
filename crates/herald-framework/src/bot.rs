//! The bot: one prefix, one dispatcher, one router and the bridge between them.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_framework::{Bot, Command, CommandContext};
//! use std::sync::Arc;
//!
//! let bot = Bot::new("!")?;
//! bot.register_command(Arc::new(Command::builder("ping").build(
//!     |ctx: CommandContext| async move {
//!         ctx.reply("pong").await?;
//!         anyhow::Ok(())
//!     },
//! )));
//!
//! // Called by the transport for every inbound event.
//! bot.on_inbound_event(message).await;
//! ```

use std::sync::Arc;

use herald_core::{
    BoxedEvent, DispatchReport, DispatchResult, EventDispatcher, HandlerFailure, Listener,
};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::bridge::{BridgeOptions, CommandBridge};
use crate::command::Command;
use crate::router::{CommandRouter, MatchMode};

// ============================================================================
// Prefix
// ============================================================================

/// The shared, mutable command prefix of one bot.
///
/// Clones share the same value.
#[derive(Clone)]
pub struct Prefix(Arc<RwLock<String>>);

impl Prefix {
    /// Creates a prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(prefix.into())))
    }

    /// Returns the current prefix.
    pub fn get(&self) -> String {
        self.0.read().clone()
    }

    /// Replaces the prefix.
    pub fn set(&self, prefix: impl Into<String>) {
        *self.0.write() = prefix.into();
    }
}

impl std::fmt::Debug for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Prefix").field(&*self.0.read()).finish()
    }
}

// ============================================================================
// Options
// ============================================================================

/// Construction options for a [`Bot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotOptions {
    /// Initial command prefix.
    pub prefix: String,
    /// How many commands one token may run.
    pub match_mode: MatchMode,
    /// Skip commands whose permission the author lacks.
    pub enforce_permissions: bool,
    /// Ignore messages written by bot accounts.
    pub ignore_bots: bool,
}

impl Default for BotOptions {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            match_mode: MatchMode::default(),
            enforce_permissions: false,
            ignore_bots: false,
        }
    }
}

// ============================================================================
// Bot
// ============================================================================

struct BotInner {
    prefix: Prefix,
    dispatcher: EventDispatcher,
    router: Arc<CommandRouter>,
    bridge: Arc<CommandBridge>,
}

/// A bot instance.
///
/// `Bot` is a cheap handle; clones refer to the same bot. Several bots with
/// different prefixes can live in one process, each with its own listeners
/// and commands.
#[derive(Clone)]
pub struct Bot {
    inner: Arc<BotInner>,
}

impl Bot {
    /// Creates a bot with `prefix` and default options.
    pub fn new(prefix: impl Into<String>) -> DispatchResult<Self> {
        Self::with_options(BotOptions {
            prefix: prefix.into(),
            ..Default::default()
        })
    }

    /// Creates a bot and registers its command bridge.
    pub fn with_options(options: BotOptions) -> DispatchResult<Self> {
        let prefix = Prefix::new(options.prefix);
        let dispatcher = EventDispatcher::new();
        let router = Arc::new(CommandRouter::with_mode(options.match_mode));
        let bridge = Arc::new(CommandBridge::new(
            prefix.clone(),
            Arc::clone(&router),
            BridgeOptions {
                enforce_permissions: options.enforce_permissions,
                ignore_bots: options.ignore_bots,
            },
            dispatcher.failure_sender(),
        ));
        dispatcher.register_listener(Arc::clone(&bridge))?;

        info!(
            prefix = %prefix.get(),
            match_mode = %options.match_mode,
            enforce_permissions = options.enforce_permissions,
            ignore_bots = options.ignore_bots,
            "Bot created"
        );

        Ok(Self {
            inner: Arc::new(BotInner {
                prefix,
                dispatcher,
                router,
                bridge,
            }),
        })
    }

    /// Returns the current command prefix.
    pub fn prefix(&self) -> String {
        self.inner.prefix.get()
    }

    /// Changes the command prefix. The next message already uses it.
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        debug!(%prefix, "Changing command prefix");
        self.inner.prefix.set(prefix);
    }

    /// Returns the bot's event dispatcher.
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.inner.dispatcher
    }

    /// Returns the bot's command router.
    pub fn router(&self) -> &Arc<CommandRouter> {
        &self.inner.router
    }

    /// Returns the bot's command bridge listener.
    pub fn bridge(&self) -> &Arc<CommandBridge> {
        &self.inner.bridge
    }

    /// Registers an event listener.
    pub fn register_listener<L: Listener>(&self, listener: Arc<L>) -> DispatchResult<()> {
        self.inner.dispatcher.register_listener(listener)
    }

    /// Unregisters the first registration of `listener`.
    pub fn unregister_listener<L: Listener>(&self, listener: &Arc<L>) -> bool {
        self.inner.dispatcher.unregister_listener(listener)
    }

    /// Registers a command.
    pub fn register_command(&self, command: Arc<Command>) {
        self.inner.router.register_command(command);
    }

    /// Unregisters the first registration of `command`.
    pub fn unregister_command(&self, command: &Arc<Command>) -> bool {
        self.inner.router.unregister_command(command)
    }

    /// Subscribes to isolated handler and command failures.
    pub fn subscribe_failures(&self) -> broadcast::Receiver<HandlerFailure> {
        self.inner.dispatcher.subscribe_failures()
    }

    /// Entry point for the transport: dispatches one inbound event.
    pub async fn on_inbound_event(&self, event: impl Into<BoxedEvent>) -> DispatchReport {
        self.inner.dispatcher.dispatch(event).await
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("prefix", &self.inner.prefix)
            .field("listener_count", &self.inner.dispatcher.listener_count())
            .field("command_count", &self.inner.router.command_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandContext;
    use crate::test_support::{counting, message, message_with_channel};
    use herald_core::{BoxedEvent, Event, listener};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Event)]
    struct Heartbeat;

    #[derive(Default)]
    struct Monitor {
        beats: AtomicUsize,
        events: AtomicUsize,
    }

    #[listener]
    impl Monitor {
        #[handler]
        fn on_heartbeat(&self, _event: &Heartbeat) {
            self.beats.fetch_add(1, Ordering::SeqCst);
        }

        #[handler]
        async fn on_anything(&self, _event: &BoxedEvent) {
            self.events.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_bridge_is_registered() {
        let bot = Bot::new("!").unwrap();
        assert_eq!(bot.dispatcher().listener_count(), 1);
        assert!(bot.dispatcher().contains_listener(bot.bridge()));
    }

    #[tokio::test]
    async fn test_commands_and_listeners_share_events() {
        let bot = Bot::new("!").unwrap();
        let monitor = Arc::new(Monitor::default());
        let hits = Arc::new(AtomicUsize::new(0));
        bot.register_listener(Arc::clone(&monitor)).unwrap();
        bot.register_command(Arc::new(Command::builder("ping").build(counting(&hits))));

        bot.on_inbound_event(message("!ping")).await;
        bot.on_inbound_event(Heartbeat).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(monitor.beats.load(Ordering::SeqCst), 1);
        assert_eq!(monitor.events.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_bots_keep_separate_prefixes() {
        let bang = Bot::new("!").unwrap();
        let query = Bot::new("?").unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        for bot in [&bang, &query] {
            bot.register_command(Arc::new(Command::builder("ping").build(counting(&hits))));
        }

        bang.on_inbound_event(message("?ping")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        query.on_inbound_event(message("?ping")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        bang.set_prefix("?");
        assert_eq!(bang.prefix(), "?");
        bang.on_inbound_event(message("?ping")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_first_match_from_options() {
        let bot = Bot::with_options(BotOptions {
            match_mode: MatchMode::FirstMatch,
            ..Default::default()
        })
        .unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        bot.register_command(Arc::new(Command::builder("ping").build(counting(&hits))));
        bot.register_command(Arc::new(Command::builder("ping").build(counting(&hits))));

        bot.on_inbound_event(message("!ping")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unregistered_command_stops_matching() {
        let bot = Bot::new("!").unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let ping = Arc::new(Command::builder("ping").build(counting(&hits)));
        bot.register_command(Arc::clone(&ping));
        assert!(bot.unregister_command(&ping));

        bot.on_inbound_event(message("!ping")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reply_reaches_channel() {
        let bot = Bot::new("!").unwrap();
        bot.register_command(Arc::new(Command::builder("echo").build(
            |ctx: CommandContext| async move { ctx.reply(&ctx.args.join(" ")).await },
        )));

        let (event, channel) = message_with_channel("!echo hi there");
        bot.on_inbound_event(event).await;

        assert_eq!(channel.sent(), ["hi there"]);
    }
}
