//! Listeners and the listener registry.
//!
//! A [`Listener`] is any shared value that declares handlers. Registering it
//! builds its handler table once and binds every handler to the instance,
//! producing a [`RegisteredListener`]. The registry keeps the instance alive
//! through that binding but never owns it exclusively; unregistering simply
//! drops the registry's reference.

use std::any::{Any, type_name};
use std::sync::Arc;

use crate::foundation::error::{DispatchError, DispatchResult};
use crate::framework::handler::{BoundHandler, EventParam, Handlers};
use crate::framework::registry::{EntryKey, Identity, Registry};

/// A value that exposes event handlers.
///
/// Usually implemented by the `#[listener]` attribute macro:
///
/// ```rust,ignore
/// use herald_core::{listener, MessageReceived};
///
/// struct Logger;
///
/// #[listener]
/// impl Logger {
///     #[handler]
///     fn on_message(&self, event: &MessageReceived) {
///         tracing::info!(content = %event.content, "message");
///     }
/// }
/// ```
pub trait Listener: Send + Sync + 'static {
    /// Declares this listener's handlers.
    fn handlers(handlers: &mut Handlers<Self>)
    where
        Self: Sized;

    /// Name used in logs and failure reports.
    fn listener_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// A listener instance together with its bound handler table.
pub struct RegisteredListener {
    key: EntryKey,
    // Holds the instance so its address, and thus `key`, stays unique while registered.
    instance: Arc<dyn Any + Send + Sync>,
    name: &'static str,
    handlers: Vec<BoundHandler>,
}

impl RegisteredListener {
    /// Builds and binds the handler table of `listener`.
    ///
    /// Fails if any handler declares no event parameter.
    pub fn bind<L: Listener>(listener: &Arc<L>) -> DispatchResult<Self> {
        let mut table = Handlers::new();
        L::handlers(&mut table);

        let name = listener.listener_name();
        if let Some(invalid) = table
            .descriptors()
            .iter()
            .find(|handler| handler.param() == EventParam::Missing)
        {
            return Err(DispatchError::InvalidHandlerSignature {
                listener: name,
                handler: invalid.name(),
            });
        }

        Ok(Self {
            key: EntryKey::of(listener),
            instance: Arc::clone(listener) as Arc<dyn Any + Send + Sync>,
            name,
            handlers: table
                .descriptors()
                .iter()
                .map(|handler| handler.bind(listener))
                .collect(),
        })
    }

    /// Returns the listener's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the bound handlers in declaration order.
    pub fn handlers(&self) -> &[BoundHandler] {
        &self.handlers
    }

    /// Returns the listener instance if it is an `L`.
    pub fn downcast<L: Listener>(&self) -> Option<Arc<L>> {
        Arc::clone(&self.instance).downcast::<L>().ok()
    }
}

impl Identity for RegisteredListener {
    fn identity(&self) -> EntryKey {
        self.key
    }
}

impl std::fmt::Debug for RegisteredListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredListener")
            .field("name", &self.name)
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}

/// Registry entry for a listener, compared by the identity of the listener
/// instance rather than of the entry itself.
#[derive(Clone, Debug)]
pub struct ListenerEntry(Arc<RegisteredListener>);

impl ListenerEntry {
    /// Returns the registered listener.
    pub fn listener(&self) -> &RegisteredListener {
        &self.0
    }
}

impl Identity for ListenerEntry {
    fn identity(&self) -> EntryKey {
        self.0.key
    }
}

impl From<RegisteredListener> for ListenerEntry {
    fn from(listener: RegisteredListener) -> Self {
        Self(Arc::new(listener))
    }
}

impl std::ops::Deref for ListenerEntry {
    type Target = RegisteredListener;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The ordered registry of listeners.
pub type ListenerRegistry = Registry<ListenerEntry>;
