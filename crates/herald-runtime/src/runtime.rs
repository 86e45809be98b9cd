//! The runtime that owns a [`Bot`] and feeds it inbound events.
//!
//! Transports hold an [`EventSender`] and push events into a bounded queue.
//! [`HeraldRuntime::run`] drains the queue, dispatching every event on its
//! own task, until Ctrl+C, [`HeraldRuntime::shutdown`], or the last sender
//! being dropped.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use herald_runtime::HeraldRuntime;
//!
//! let runtime = HeraldRuntime::builder()
//!     .config_file("config/herald.toml")
//!     .build()?;
//!
//! let sender = runtime.event_sender()?;
//! tokio::spawn(my_transport(sender));
//!
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use herald_core::BoxedEvent;
use herald_framework::Bot;
use parking_lot::Mutex;
use tokio::signal;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::config::{ConfigLoader, HeraldConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Capacity of the inbound event queue.
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Handle used by transports to submit inbound events.
///
/// Cloning is cheap. The runtime stops once every sender is dropped.
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::Sender<BoxedEvent>,
}

impl EventSender {
    /// Queues an event, waiting for room if the queue is full.
    pub async fn send(&self, event: impl Into<BoxedEvent>) -> RuntimeResult<()> {
        self.inner
            .send(event.into())
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Queues an event without waiting.
    pub fn try_send(&self, event: impl Into<BoxedEvent>) -> RuntimeResult<()> {
        self.inner.try_send(event.into()).map_err(|e| match e {
            TrySendError::Full(_) => RuntimeError::ChannelFull,
            TrySendError::Closed(_) => RuntimeError::ChannelClosed,
        })
    }

    /// Queues an event from outside the async runtime, blocking the thread.
    ///
    /// Panics if called from within an async context.
    pub fn blocking_send(&self, event: impl Into<BoxedEvent>) -> RuntimeResult<()> {
        self.inner
            .blocking_send(event.into())
            .map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Returns `true` once the runtime has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

#[derive(Debug, Default)]
struct Counters {
    events_received: AtomicU64,
    events_dispatched: AtomicU64,
    handler_failures: AtomicU64,
}

/// Snapshot of runtime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Events taken off the queue.
    pub events_received: u64,
    /// Events whose dispatch has completed.
    pub events_dispatched: u64,
    /// Listener handlers that failed across all dispatches.
    pub handler_failures: u64,
}

/// The Herald runtime.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = HeraldRuntime::from_config(load_config()?)?;
/// runtime.bot().register_command(Arc::new(ping));
/// runtime.run().await?;
/// ```
pub struct HeraldRuntime {
    config: HeraldConfig,
    bot: Bot,
    sender: Mutex<Option<mpsc::Sender<BoxedEvent>>>,
    receiver: Mutex<Option<mpsc::Receiver<BoxedEvent>>>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    counters: Arc<Counters>,
}

impl HeraldRuntime {
    /// Creates a runtime from the default configuration locations.
    pub fn new() -> RuntimeResult<Self> {
        Self::builder().build()
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// The configuration is validated, logging is initialized from it and the
    /// bot is built from its `bot` section.
    pub fn from_config(config: HeraldConfig) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let bot = Bot::with_options(config.bot.to_options())?;
        let (sender, receiver) = mpsc::channel(EVENT_QUEUE_CAPACITY);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config,
            bot,
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
            counters: Arc::default(),
        })
    }

    /// Returns the configuration the runtime was built from.
    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    /// Returns the bot owned by this runtime.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Returns a sender for inbound events.
    ///
    /// Senders must be taken before [`run`](Self::run) starts.
    pub fn event_sender(&self) -> RuntimeResult<EventSender> {
        self.sender
            .lock()
            .as_ref()
            .map(|inner| EventSender {
                inner: inner.clone(),
            })
            .ok_or(RuntimeError::AlreadyRunning)
    }

    /// Requests the run loop to stop.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Returns a token cancelled when the runtime shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Returns a snapshot of the event counters.
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            events_received: self.counters.events_received.load(Ordering::Relaxed),
            events_dispatched: self.counters.events_dispatched.load(Ordering::Relaxed),
            handler_failures: self.counters.handler_failures.load(Ordering::Relaxed),
        }
    }

    /// Runs until Ctrl+C, [`shutdown`](Self::shutdown), or every sender is dropped.
    pub async fn run(&self) -> RuntimeResult<()> {
        let ctrl_c = async {
            match signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C, shutting down"),
                Err(e) => {
                    error!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            }
        };
        self.run_until(ctrl_c).await
    }

    /// Runs until `signal` completes, [`shutdown`](Self::shutdown) is called,
    /// or every sender is dropped.
    ///
    /// In-flight dispatches are awaited before returning. Events still queued
    /// when the loop stops are dropped.
    pub async fn run_until<F>(&self, signal: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let mut receiver = self
            .receiver
            .lock()
            .take()
            .ok_or(RuntimeError::AlreadyRunning)?;
        // Only transport-held senders keep the loop alive from here on.
        drop(self.sender.lock().take());

        tokio::pin!(signal);
        info!(prefix = %self.bot.prefix(), "Herald runtime is running");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                _ = &mut signal => break,
                event = receiver.recv() => match event {
                    Some(event) => self.spawn_dispatch(event),
                    None => {
                        info!("All event senders dropped, shutting down");
                        break;
                    }
                },
            }
        }

        receiver.close();
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;

        let stats = self.stats();
        info!(
            events_received = stats.events_received,
            events_dispatched = stats.events_dispatched,
            handler_failures = stats.handler_failures,
            "Herald runtime stopped"
        );
        Ok(())
    }

    fn spawn_dispatch(&self, event: BoxedEvent) {
        self.counters.events_received.fetch_add(1, Ordering::Relaxed);
        debug!(event = event.event_name(), "Event received");

        let bot = self.bot.clone();
        let counters = Arc::clone(&self.counters);
        self.tasks.spawn(async move {
            let report = bot.on_inbound_event(event).await;
            counters.events_dispatched.fetch_add(1, Ordering::Relaxed);
            counters
                .handler_failures
                .fetch_add(report.failures.len() as u64, Ordering::Relaxed);
        });
    }
}

impl std::fmt::Debug for HeraldRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeraldRuntime")
            .field("bot", &self.bot)
            .field("stats", &self.stats())
            .field("shutdown", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a `HeraldRuntime` with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = HeraldRuntime::builder()
///     .config_file("config/herald.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration programmatically.
    pub fn merge(mut self, config: HeraldConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<HeraldRuntime> {
        let config = self.config_loader.load()?;
        HeraldRuntime::from_config(config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
