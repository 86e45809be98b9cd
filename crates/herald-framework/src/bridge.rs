//! The bridge between message events and the command router.

use std::sync::Arc;

use herald_core::{HandlerFailure, MessageReceived, listener};
use tokio::sync::broadcast;
use tracing::trace;

use crate::bot::Prefix;
use crate::command::CommandContext;
use crate::router::CommandRouter;
use crate::split::CommandLine;

/// Options controlling which messages the bridge forwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Skip commands whose permission the author lacks.
    pub enforce_permissions: bool,
    /// Ignore messages written by bot accounts.
    pub ignore_bots: bool,
}

/// Listener that turns prefixed messages into command invocations.
///
/// Each bot registers exactly one bridge into its own dispatcher. The bridge
/// keeps no state between messages; the prefix is read on every message, so
/// a prefix change applies to the very next one.
pub struct CommandBridge {
    prefix: Prefix,
    router: Arc<CommandRouter>,
    options: BridgeOptions,
    failures: broadcast::Sender<HandlerFailure>,
}

impl CommandBridge {
    /// Creates a bridge forwarding to `router`.
    ///
    /// Command failures are published on `failures`.
    pub fn new(
        prefix: Prefix,
        router: Arc<CommandRouter>,
        options: BridgeOptions,
        failures: broadcast::Sender<HandlerFailure>,
    ) -> Self {
        Self {
            prefix,
            router,
            options,
            failures,
        }
    }

    /// Returns the bridge's options.
    pub fn options(&self) -> BridgeOptions {
        self.options
    }
}

#[listener(name = "CommandBridge")]
impl CommandBridge {
    #[handler]
    async fn on_message(&self, event: &MessageReceived) {
        if self.options.ignore_bots && event.author.is_bot() {
            trace!(author = event.author.id(), "Ignoring message from bot account");
            return;
        }

        let line = CommandLine::parse(&event.content);
        let prefix = self.prefix.get();
        if !line.token.starts_with(prefix.as_str()) {
            return;
        }

        let ctx = CommandContext {
            guild: event.guild.clone(),
            executor: Arc::clone(&event.author),
            channel: Arc::clone(&event.channel),
            args: line.owned_args(),
        };

        let report = if self.options.enforce_permissions {
            let author = Arc::clone(&event.author);
            self.router
                .route_with(&prefix, line.token, ctx, |command| {
                    author.has_permission(command.permission())
                })
                .await
        } else {
            self.router.route(&prefix, line.token, ctx).await
        };

        for failure in report.failures {
            let _ = self.failures.send(failure);
        }
    }
}

impl std::fmt::Debug for CommandBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBridge")
            .field("prefix", &self.prefix.get())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::test_support::{TestUser, counting, message, message_from};
    use herald_core::{EventDispatcher, Permission};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        dispatcher: EventDispatcher,
        prefix: Prefix,
        router: Arc<CommandRouter>,
    }

    fn fixture(options: BridgeOptions) -> Fixture {
        let dispatcher = EventDispatcher::new();
        let prefix = Prefix::new("!");
        let router = Arc::new(CommandRouter::new());
        let bridge = CommandBridge::new(
            prefix.clone(),
            Arc::clone(&router),
            options,
            dispatcher.failure_sender(),
        );
        dispatcher.register_listener(Arc::new(bridge)).unwrap();
        Fixture {
            dispatcher,
            prefix,
            router,
        }
    }

    #[tokio::test]
    async fn test_forwards_prefixed_messages() {
        let fx = fixture(BridgeOptions::default());
        let hits = Arc::new(AtomicUsize::new(0));
        fx.router.register_command(Arc::new(Command::builder("ping").build(counting(&hits))));

        fx.dispatcher.dispatch(message("!ping")).await;
        fx.dispatcher.dispatch(message("ping")).await;
        fx.dispatcher.dispatch(message("hello !ping")).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prefix_change_applies_immediately() {
        let fx = fixture(BridgeOptions::default());
        let hits = Arc::new(AtomicUsize::new(0));
        fx.router.register_command(Arc::new(Command::builder("ping").build(counting(&hits))));

        fx.prefix.set("?");
        fx.dispatcher.dispatch(message("!ping")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        fx.dispatcher.dispatch(message("?ping")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_args_follow_the_token() {
        let fx = fixture(BridgeOptions::default());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        fx.router.register_command(Arc::new(Command::builder("ping").build(
            move |ctx: CommandContext| {
                *sink.lock() = ctx.args.clone();
                async {}
            },
        )));

        fx.dispatcher.dispatch(message("!ping  a b")).await;

        assert_eq!(*seen.lock(), ["", "a", "b"]);
    }

    #[tokio::test]
    async fn test_command_failures_are_broadcast() {
        let fx = fixture(BridgeOptions::default());
        let mut failures = fx.dispatcher.subscribe_failures();
        fx.router.register_command(Arc::new(
            Command::builder("boom").build(|_: CommandContext| async {
                Err::<(), _>(anyhow::anyhow!("exploded"))
            }),
        ));

        let report = fx.dispatcher.dispatch(message("!boom")).await;

        // The bridge handler itself succeeded.
        assert!(report.is_clean());
        let failure = failures.recv().await.unwrap();
        assert_eq!(failure.to_string(), "command `boom` returned error: exploded");
    }

    #[tokio::test]
    async fn test_permissions_ignored_by_default() {
        let fx = fixture(BridgeOptions::default());
        let hits = Arc::new(AtomicUsize::new(0));
        fx.router.register_command(Arc::new(
            Command::builder("ban")
                .permission(Permission::BanMembers)
                .build(counting(&hits)),
        ));

        fx.dispatcher.dispatch(message("!ban someone")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permission_gate_when_enabled() {
        let fx = fixture(BridgeOptions {
            enforce_permissions: true,
            ..Default::default()
        });
        let hits = Arc::new(AtomicUsize::new(0));
        fx.router.register_command(Arc::new(
            Command::builder("ban")
                .permission(Permission::BanMembers)
                .build(counting(&hits)),
        ));

        fx.dispatcher.dispatch(message("!ban someone")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        let moderator = TestUser::new("mod").grant(Permission::BanMembers);
        fx.dispatcher
            .dispatch(message_from("!ban someone", moderator))
            .await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bot_authors() {
        let hits = Arc::new(AtomicUsize::new(0));

        let permissive = fixture(BridgeOptions::default());
        permissive
            .router
            .register_command(Arc::new(Command::builder("ping").build(counting(&hits))));
        permissive
            .dispatcher
            .dispatch(message_from("!ping", TestUser::bot("other-bot")))
            .await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let strict = fixture(BridgeOptions {
            ignore_bots: true,
            ..Default::default()
        });
        strict
            .router
            .register_command(Arc::new(Command::builder("ping").build(counting(&hits))));
        strict
            .dispatcher
            .dispatch(message_from("!ping", TestUser::bot("other-bot")))
            .await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
