//! Event dispatcher for the Herald framework.
//!
//! This module provides the [`EventDispatcher`], which receives events and
//! distributes them to registered listeners.
//!
//! When an event is dispatched:
//!
//! 1. Listeners are visited in registration order
//! 2. For each listener, every handler whose parameter matches the event runs
//! 3. A failing handler is recorded and dispatch moves on
//!
//! ```rust,ignore
//! use herald_core::{BoxedEvent, EventDispatcher};
//!
//! let dispatcher = EventDispatcher::new();
//! dispatcher.register_listener(Arc::new(AuditLog::default()))?;
//!
//! let report = dispatcher.dispatch(BoxedEvent::new(event)).await;
//! for failure in &report.failures {
//!     eprintln!("{failure}");
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{Instrument, debug, debug_span, error, trace};

use crate::foundation::error::{DispatchResult, FailureOrigin, HandlerFailure};
use crate::foundation::event::BoxedEvent;
use crate::framework::handler::invoke_guarded;
use crate::framework::listener::{Listener, ListenerEntry, ListenerRegistry, RegisteredListener};
use crate::framework::resolver;

/// Capacity of the failure diagnostic channel.
const FAILURE_CHANNEL_CAPACITY: usize = 64;

/// Outcome of one [`EventDispatcher::dispatch`] call.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Number of handler invocations, failed ones included.
    pub invoked: usize,
    /// Invocations that returned an error or panicked.
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// Returns `true` if no handler failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The central event dispatcher.
///
/// The `EventDispatcher` owns the listener registry and is responsible for:
/// - Resolving which handlers of each listener accept an event
/// - Invoking them in registration and declaration order
/// - Isolating handler failures from one another
///
/// # Thread Safety
///
/// `EventDispatcher` is `Send + Sync`. Listeners may be registered while
/// other tasks are dispatching; an in-flight dispatch keeps iterating over
/// the listener list it started with.
pub struct EventDispatcher {
    listeners: ListenerRegistry,
    failures: broadcast::Sender<HandlerFailure>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// Creates a new dispatcher with no listeners.
    pub fn new() -> Self {
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        Self {
            listeners: ListenerRegistry::new(),
            failures,
        }
    }

    /// Registers a listener.
    ///
    /// The handler table is built and validated here, so a handler without an
    /// event parameter is reported immediately and the listener is not
    /// registered. Registering the same instance twice is allowed; its
    /// handlers then run twice per event.
    pub fn register_listener<L: Listener>(&self, listener: Arc<L>) -> DispatchResult<()> {
        let registered = RegisteredListener::bind(&listener)?;
        debug!(
            listener = registered.name(),
            handler_count = registered.handlers().len(),
            "Registering listener"
        );
        self.listeners.register(registered.into());
        Ok(())
    }

    /// Unregisters the first registration of `listener`.
    ///
    /// Returns `false` if it was not registered.
    pub fn unregister_listener<L: Listener>(&self, listener: &Arc<L>) -> bool {
        self.listeners.unregister(listener)
    }

    /// Returns `true` if `listener` is registered.
    pub fn contains_listener<L: Listener>(&self, listener: &Arc<L>) -> bool {
        self.listeners.contains(listener)
    }

    /// Returns a copy of the current listener list.
    pub fn listeners(&self) -> Vec<ListenerEntry> {
        self.listeners.snapshot()
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Removes every listener.
    pub fn clear(&self) {
        self.listeners.clear();
    }

    /// Subscribes to handler failures.
    ///
    /// Every failure isolated by [`dispatch`](Self::dispatch) is also sent
    /// here. Slow subscribers lose the oldest failures.
    pub fn subscribe_failures(&self) -> broadcast::Receiver<HandlerFailure> {
        self.failures.subscribe()
    }

    /// Publishes a failure isolated elsewhere, such as in a command router.
    pub fn report_failure(&self, failure: HandlerFailure) {
        let _ = self.failures.send(failure);
    }

    /// Returns a sender onto the failure channel.
    ///
    /// Lets a listener registered in this dispatcher publish failures
    /// without holding a reference back to the dispatcher.
    pub fn failure_sender(&self) -> broadcast::Sender<HandlerFailure> {
        self.failures.clone()
    }

    /// Dispatches an event to every matching handler of every listener.
    ///
    /// Handlers run one after another. Failures are logged, collected in
    /// the returned report and published to failure subscribers; they never
    /// stop the remaining handlers.
    pub async fn dispatch(&self, event: impl Into<BoxedEvent>) -> DispatchReport {
        let event = event.into();
        let span = debug_span!("dispatch", event_name = %event.event_name());
        self.dispatch_inner(event).instrument(span).await
    }

    async fn dispatch_inner(&self, event: BoxedEvent) -> DispatchReport {
        let listeners = self.listeners.shared();
        let mut report = DispatchReport::default();

        for listener in listeners.iter() {
            for handler in resolver::resolve_event(listener.handlers(), &event) {
                trace!(
                    listener = listener.name(),
                    handler = handler.name(),
                    "Invoking handler"
                );
                report.invoked += 1;

                if let Err(kind) = invoke_guarded(|| handler.call(event.clone())).await {
                    let failure = HandlerFailure {
                        origin: FailureOrigin::Listener {
                            listener: listener.name(),
                            handler: handler.name(),
                        },
                        kind,
                    };
                    error!(%failure, "Handler failed");
                    self.report_failure(failure.clone());
                    report.failures.push(failure);
                }
            }
        }

        debug!(
            listener_count = listeners.len(),
            invoked = report.invoked,
            failed = report.failures.len(),
            "Dispatch finished"
        );
        report
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}
