//! Echo Bot Example
//!
//! A console transport for Herald: every line typed on stdin becomes a
//! `MessageReceived` event, and replies are printed to stdout.
//!
//! # Commands
//!
//! ```text
//! !ping, !p         - Pong!
//! !echo <text>      - Echo text
//! !prefix <prefix>  - Change the command prefix
//! !help             - This help
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot -- --prefix '?'
//! ```
//!
//! End input with Ctrl+D or stop with Ctrl+C.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use herald::prelude::*;
use herald::runtime::config::{BotSettings, validate_prefix};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "echo-bot", about = "A console echo bot for Herald")]
struct Args {
    /// Configuration file (defaults to herald.toml in the current directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured command prefix.
    #[arg(short, long)]
    prefix: Option<String>,

    /// Name shown as the author of console messages.
    #[arg(long, default_value = "operator")]
    user: String,
}

// ============================================================================
// Console transport
// ============================================================================

/// The person at the keyboard. Holds every permission.
struct ConsoleUser {
    name: String,
}

impl User for ConsoleUser {
    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, _permission: Permission) -> bool {
        true
    }
}

struct ConsoleChannel;

#[async_trait]
impl MessageChannel for ConsoleChannel {
    fn id(&self) -> &str {
        "console"
    }

    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, text: &str) -> TransportResult<()> {
        println!("< {text}");
        Ok(())
    }
}

/// Reads stdin until EOF, submitting each non-empty line as a message.
///
/// Runs on its own thread: a blocked stdin read must not hold up shutdown.
fn read_console(sender: EventSender, user: Arc<dyn User>) {
    let channel: Arc<dyn MessageChannel> = Arc::new(ConsoleChannel);

    for line in std::io::stdin().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read console input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let event = MessageReceived::new(line, None, Arc::clone(&user), Arc::clone(&channel));
        if sender.blocking_send(event).is_err() {
            break;
        }
    }

    info!("Console input closed");
}

// ============================================================================
// Listeners
// ============================================================================

/// Logs every message that reaches the bot.
struct MessageLog;

#[listener]
impl MessageLog {
    #[handler]
    fn on_message(&self, event: &MessageReceived) {
        info!(author = event.author.name(), content = %event.content, "Message");
    }
}

// ============================================================================
// Commands
// ============================================================================

fn ping() -> Command {
    Command::builder("ping")
        .alias("p")
        .description("Pong!")
        .build(|ctx: CommandContext| async move { ctx.reply("Pong! 🏓").await })
}

fn echo() -> Command {
    Command::builder("echo")
        .description("Echo text")
        .usage("<text>")
        .build(|ctx: CommandContext| async move {
            let text = ctx.args.join(" ");
            if text.trim().is_empty() {
                ctx.reply("Nothing to echo").await
            } else {
                ctx.reply(&text).await
            }
        })
}

fn prefix(bot: Bot) -> Command {
    Command::builder("prefix")
        .permission(Permission::ManageGuild)
        .description("Change the command prefix")
        .usage("<prefix>")
        .build(move |ctx: CommandContext| {
            let bot = bot.clone();
            async move {
                let Some(prefix) = ctx.arg(0).filter(|p| !p.is_empty()) else {
                    return ctx.reply(&format!("Current prefix: {}", bot.prefix())).await;
                };
                if let Err(e) = validate_prefix(prefix) {
                    return ctx.reply(&e.to_string()).await;
                }
                bot.set_prefix(prefix);
                ctx.reply(&format!("Prefix is now {prefix}")).await
            }
        })
}

fn help(bot: Bot) -> Command {
    Command::builder("help")
        .description("This help")
        .build(move |ctx: CommandContext| {
            let bot = bot.clone();
            async move {
                let prefix = bot.prefix();
                let lines: Vec<String> = bot
                    .router()
                    .commands()
                    .iter()
                    .map(|command| {
                        let usage = command.usage().map(|u| format!(" {u}")).unwrap_or_default();
                        let description = command.description().unwrap_or("");
                        format!("{prefix}{}{usage} - {description}", command.name())
                    })
                    .collect();
                ctx.reply(&lines.join("\n")).await
            }
        })
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = HeraldRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(prefix) = args.prefix {
        builder = builder.merge(HeraldConfig {
            bot: BotSettings {
                prefix,
                ..Default::default()
            },
            ..Default::default()
        });
    }
    let runtime = builder.build()?;

    let bot = runtime.bot();
    bot.register_listener(Arc::new(MessageLog))?;
    bot.register_command(Arc::new(ping()));
    bot.register_command(Arc::new(echo()));
    bot.register_command(Arc::new(prefix(bot.clone())));
    bot.register_command(Arc::new(help(bot.clone())));

    let user: Arc<dyn User> = Arc::new(ConsoleUser { name: args.user });
    let sender = runtime.event_sender()?;
    std::thread::spawn(move || read_console(sender, user));

    println!("Type {}help for commands.", bot.prefix());
    runtime.run().await?;
    Ok(())
}
