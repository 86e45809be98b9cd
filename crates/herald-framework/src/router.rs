//! Command routing.
//!
//! The [`CommandRouter`] owns the command registry and routes a raw token to
//! every command whose prefixed name or alias equals it.
//!
//! # Match Modes
//!
//! | Mode | Behaviour |
//! |------|-----------|
//! | [`MatchMode::FanOut`] | Every matching command runs (default) |
//! | [`MatchMode::FirstMatch`] | Only the first allowed matching command runs |
//!
//! Command names are not unique, so with fan-out two commands named `ping`
//! both run for `!ping`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use herald_core::{FailureOrigin, HandlerFailure, Registry, invoke_guarded};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, debug_span, error, trace};

use crate::command::{Command, CommandContext};

/// The ordered registry of commands, compared by `Arc` identity.
pub type CommandRegistry = Registry<Arc<Command>>;

/// How many matching commands a single token runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Run every matching command, in registration order.
    #[default]
    FanOut,
    /// Stop after the first matching command that is allowed to run.
    FirstMatch,
}

impl MatchMode {
    /// Returns the configuration name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FanOut => "fan-out",
            Self::FirstMatch => "first-match",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fan-out" | "fan_out" | "fanout" => Ok(Self::FanOut),
            "first-match" | "first_match" | "first" => Ok(Self::FirstMatch),
            other => Err(format!(
                "unknown match mode `{other}`, expected `fan-out` or `first-match`"
            )),
        }
    }
}

/// Outcome of one [`CommandRouter::route`] call.
#[derive(Debug, Clone, Default)]
pub struct RouteReport {
    /// Commands whose name or alias matched, denied ones included.
    pub matched: usize,
    /// Matching commands that were skipped by the permission filter.
    pub denied: usize,
    /// Commands that returned an error or panicked.
    pub failures: Vec<HandlerFailure>,
}

impl RouteReport {
    /// Number of commands whose handler actually ran.
    pub fn invoked(&self) -> usize {
        self.matched - self.denied
    }
}

/// Routes command tokens to registered commands.
pub struct CommandRouter {
    commands: CommandRegistry,
    mode: RwLock<MatchMode>,
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRouter {
    /// Creates a fan-out router with no commands.
    pub fn new() -> Self {
        Self::with_mode(MatchMode::default())
    }

    /// Creates a router with the given match mode.
    pub fn with_mode(mode: MatchMode) -> Self {
        Self {
            commands: CommandRegistry::new(),
            mode: RwLock::new(mode),
        }
    }

    /// Returns the current match mode.
    pub fn mode(&self) -> MatchMode {
        *self.mode.read()
    }

    /// Changes the match mode. Takes effect on the next route.
    pub fn set_mode(&self, mode: MatchMode) {
        *self.mode.write() = mode;
    }

    /// Registers a command. Registering the same command twice is allowed.
    pub fn register_command(&self, command: Arc<Command>) {
        debug!(
            command = command.name(),
            aliases = ?command.aliases(),
            "Registering command"
        );
        self.commands.register(command);
    }

    /// Unregisters the first registration of `command`.
    pub fn unregister_command(&self, command: &Arc<Command>) -> bool {
        self.commands.unregister(command)
    }

    /// Returns `true` if `command` is registered.
    pub fn contains_command(&self, command: &Arc<Command>) -> bool {
        self.commands.contains(command)
    }

    /// Returns a copy of the current command list.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.commands.snapshot()
    }

    /// Returns the number of registered commands.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Runs every command matching `token` under `prefix`.
    ///
    /// No match is not an error; the report then has `matched == 0`.
    pub async fn route(&self, prefix: &str, token: &str, ctx: CommandContext) -> RouteReport {
        self.route_with(prefix, token, ctx, |_| true).await
    }

    /// Like [`route`](Self::route), but skips matching commands for which
    /// `allow` returns `false`.
    ///
    /// Denied commands do not end a [`MatchMode::FirstMatch`] route; the next
    /// matching command gets its turn.
    pub async fn route_with<F>(
        &self,
        prefix: &str,
        token: &str,
        ctx: CommandContext,
        allow: F,
    ) -> RouteReport
    where
        F: Fn(&Command) -> bool,
    {
        let span = debug_span!("route", token = %token);
        async move {
            let commands = self.commands.shared();
            let mode = self.mode();
            let mut report = RouteReport::default();

            for command in commands.iter() {
                if !command.matches(prefix, token) {
                    continue;
                }
                report.matched += 1;

                if !allow(command) {
                    debug!(
                        command = command.name(),
                        permission = %command.permission(),
                        "Command denied"
                    );
                    report.denied += 1;
                    continue;
                }

                trace!(command = command.name(), "Invoking command");
                if let Err(kind) = invoke_guarded(|| command.invoke(ctx.clone())).await {
                    let failure = HandlerFailure {
                        origin: FailureOrigin::Command {
                            name: command.name().to_owned(),
                        },
                        kind,
                    };
                    error!(%failure, "Command failed");
                    report.failures.push(failure);
                }

                if mode == MatchMode::FirstMatch {
                    break;
                }
            }

            debug!(
                matched = report.matched,
                denied = report.denied,
                failed = report.failures.len(),
                "Route finished"
            );
            report
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRouter")
            .field("command_count", &self.commands.len())
            .field("mode", &self.mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, counting};
    use herald_core::Permission;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_name_and_alias_match() {
        let router = CommandRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        router.register_command(Arc::new(Command::new(
            "ping",
            None,
            Some(vec!["p".into()]),
            counting(&hits),
        )));

        for token in ["!ping", "!p"] {
            let report = router.route("!", token, context(&[]).0).await;
            assert_eq!(report.matched, 1);
        }
        let report = router.route("!", "ping", context(&[]).0).await;
        assert_eq!(report.matched, 0);

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_alias_equal_to_name_runs_once() {
        let router = CommandRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        router.register_command(Arc::new(Command::new(
            "ping",
            None,
            Some(vec!["ping".into(), "ping".into()]),
            counting(&hits),
        )));

        router.route("!", "!ping", context(&[]).0).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_name_fans_out() {
        let router = CommandRouter::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        router.register_command(Arc::new(Command::builder("ping").build(counting(&first))));
        router.register_command(Arc::new(Command::builder("ping").build(counting(&second))));

        let report = router.route("!", "!ping", context(&[]).0).await;

        assert_eq!(report.matched, 2);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_match_stops_early() {
        let router = CommandRouter::with_mode(MatchMode::FirstMatch);
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        router.register_command(Arc::new(Command::builder("ping").build(counting(&first))));
        router.register_command(Arc::new(Command::builder("ping").build(counting(&second))));

        let report = router.route("!", "!ping", context(&[]).0).await;

        assert_eq!(report.matched, 1);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_command_isolated() {
        let router = CommandRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        router.register_command(Arc::new(Command::builder("ping").build(
            |_: CommandContext| async { Err::<(), _>(anyhow::anyhow!("rate limited")) },
        )));
        router.register_command(Arc::new(Command::builder("ping").build(counting(&hits))));

        let report = router.route("!", "!ping", context(&[]).0).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].to_string(),
            "command `ping` returned error: rate limited"
        );
    }

    #[tokio::test]
    async fn test_filter_denies() {
        let router = CommandRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        router.register_command(Arc::new(
            Command::builder("ban")
                .permission(Permission::BanMembers)
                .build(counting(&hits)),
        ));
        router.register_command(Arc::new(Command::builder("ban").build(counting(&hits))));

        let report = router
            .route_with("!", "!ban", context(&[]).0, |command| {
                command.permission() == Permission::SendMessages
            })
            .await;

        assert_eq!(report.matched, 2);
        assert_eq!(report.denied, 1);
        assert_eq!(report.invoked(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_match_skips_denied_command() {
        let router = CommandRouter::with_mode(MatchMode::FirstMatch);
        let gated = Arc::new(AtomicUsize::new(0));
        let open = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        router.register_command(Arc::new(
            Command::builder("kick")
                .permission(Permission::KickMembers)
                .build(counting(&gated)),
        ));
        router.register_command(Arc::new(Command::builder("kick").build(counting(&open))));
        router.register_command(Arc::new(Command::builder("kick").build(counting(&last))));

        let report = router
            .route_with("!", "!kick", context(&[]).0, |command| {
                command.permission() == Permission::SendMessages
            })
            .await;

        assert_eq!(report.matched, 2);
        assert_eq!(report.denied, 1);
        assert_eq!(report.invoked(), 1);
        assert_eq!(gated.load(Ordering::SeqCst), 0);
        assert_eq!(open.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregister_one_of_duplicates() {
        let router = CommandRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let command = Arc::new(Command::builder("ping").build(counting(&hits)));
        router.register_command(Arc::clone(&command));
        router.register_command(Arc::clone(&command));

        assert!(router.unregister_command(&command));
        assert!(router.contains_command(&command));
        assert_eq!(router.command_count(), 1);
    }

    #[test]
    fn test_match_mode_parsing() {
        assert_eq!("fan-out".parse::<MatchMode>(), Ok(MatchMode::FanOut));
        assert_eq!("first-match".parse::<MatchMode>(), Ok(MatchMode::FirstMatch));
        assert!("sometimes".parse::<MatchMode>().is_err());
        assert_eq!(MatchMode::FirstMatch.to_string(), "first-match");
    }

    #[test]
    fn test_route_via_block_on() {
        let router = CommandRouter::new();
        let report = tokio_test::block_on(router.route("!", "!missing", context(&[]).0));
        assert_eq!(report.matched, 0);
        assert!(report.failures.is_empty());
    }
}
