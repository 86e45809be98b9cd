//! Handler system for the Herald framework.
//!
//! A listener declares its handlers once, through a [`Handlers`] table. Each
//! entry pairs a name with the event parameter it accepts and an async
//! callable. The `#[listener]` attribute macro writes this table from
//! `#[handler]` methods; it can also be written by hand:
//!
//! ```rust,ignore
//! use herald_core::{Handlers, Listener, MessageReceived};
//!
//! struct Greeter;
//!
//! impl Listener for Greeter {
//!     fn handlers(handlers: &mut Handlers<Self>) {
//!         handlers.on("greet", |_this, event: Arc<MessageReceived>| async move {
//!             event.channel.send("hello").await?;
//!             anyhow::Ok(())
//!         });
//!     }
//! }
//! ```

use std::any::{TypeId, type_name};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::foundation::error::{FailureKind, HandlerResult};
use crate::foundation::event::{BoxedEvent, Event};

pub use futures::future::BoxFuture;

// ============================================================================
// Handler results
// ============================================================================

/// Conversion of handler return values into a [`HandlerResult`].
///
/// Implemented for `()` and for any `Result<(), E>` whose error converts into
/// `anyhow::Error`.
pub trait IntoHandlerResult {
    /// Converts the value.
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

// ============================================================================
// Handler descriptors
// ============================================================================

/// The event parameter a handler declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventParam {
    /// Accepts events whose concrete type is exactly this one.
    Exact {
        /// The accepted event type.
        type_id: TypeId,
        /// Its name, for diagnostics.
        type_name: &'static str,
    },
    /// Accepts every event.
    Any,
    /// Declares no event parameter at all.
    Missing,
}

impl EventParam {
    /// The parameter kind for event type `E`.
    pub fn of<E: Event>() -> Self {
        Self::Exact {
            type_id: TypeId::of::<E>(),
            type_name: type_name::<E>(),
        }
    }

    /// Returns `true` if an event of type `event_type` satisfies this parameter.
    pub fn accepts(&self, event_type: TypeId) -> bool {
        match self {
            Self::Exact { type_id, .. } => *type_id == event_type,
            Self::Any => true,
            Self::Missing => false,
        }
    }
}

type ErasedCall<L> =
    Arc<dyn Fn(Arc<L>, BoxedEvent) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// One handler declared by listener type `L`.
pub struct HandlerDescriptor<L> {
    name: &'static str,
    param: EventParam,
    call: ErasedCall<L>,
}

impl<L> HandlerDescriptor<L> {
    /// Returns the handler's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared event parameter.
    pub fn param(&self) -> EventParam {
        self.param
    }

    /// Binds this handler to a listener instance.
    pub(crate) fn bind(&self, instance: &Arc<L>) -> BoundHandler
    where
        L: Send + Sync + 'static,
    {
        let instance = Arc::clone(instance);
        let call = Arc::clone(&self.call);
        BoundHandler {
            name: self.name,
            param: self.param,
            call: Box::new(move |event| call(Arc::clone(&instance), event)),
        }
    }
}

impl<L> std::fmt::Debug for HandlerDescriptor<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("param", &self.param)
            .finish()
    }
}

/// A handler bound to the listener instance that declared it.
pub struct BoundHandler {
    name: &'static str,
    param: EventParam,
    call: Box<dyn Fn(BoxedEvent) -> BoxFuture<'static, HandlerResult> + Send + Sync>,
}

impl BoundHandler {
    /// Returns the handler's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared event parameter.
    pub fn param(&self) -> EventParam {
        self.param
    }

    /// Invokes the handler with `event`.
    pub fn call(&self, event: BoxedEvent) -> BoxFuture<'static, HandlerResult> {
        (self.call)(event)
    }
}

impl std::fmt::Debug for BoundHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundHandler")
            .field("name", &self.name)
            .field("param", &self.param)
            .finish()
    }
}

// ============================================================================
// Handlers table
// ============================================================================

/// The handler table of listener type `L`, in declaration order.
pub struct Handlers<L> {
    entries: Vec<HandlerDescriptor<L>>,
}

impl<L> Default for Handlers<L> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<L: Send + Sync + 'static> Handlers<L> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a handler for events of exact type `E`.
    pub fn on<E, F, Fut, R>(&mut self, name: &'static str, f: F) -> &mut Self
    where
        E: Event,
        F: Fn(Arc<L>, Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult + 'static,
    {
        let call: ErasedCall<L> = Arc::new(move |this, event: BoxedEvent| {
            match event.downcast::<E>() {
                Some(event) => f(this, event).map(IntoHandlerResult::into_handler_result).boxed(),
                None => futures::future::ready(Err(anyhow::anyhow!(
                    "handler `{name}` expected `{}`, got `{}`",
                    type_name::<E>(),
                    event.event_name()
                )))
                .boxed(),
            }
        });
        self.push(name, EventParam::of::<E>(), call)
    }

    /// Declares a handler that receives every event.
    pub fn on_any<F, Fut, R>(&mut self, name: &'static str, f: F) -> &mut Self
    where
        F: Fn(Arc<L>, BoxedEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoHandlerResult + 'static,
    {
        let call: ErasedCall<L> = Arc::new(move |this, event| {
            f(this, event).map(IntoHandlerResult::into_handler_result).boxed()
        });
        self.push(name, EventParam::Any, call)
    }

    /// Records a handler that declares no event parameter.
    ///
    /// Such a handler can never be invoked. Registering a listener whose
    /// table contains one fails with
    /// [`DispatchError::InvalidHandlerSignature`](crate::DispatchError).
    pub fn missing_parameter(&mut self, name: &'static str) -> &mut Self {
        let call: ErasedCall<L> =
            Arc::new(|_: Arc<L>, _: BoxedEvent| futures::future::ready(Ok(())).boxed());
        self.push(name, EventParam::Missing, call)
    }

    fn push(&mut self, name: &'static str, param: EventParam, call: ErasedCall<L>) -> &mut Self {
        self.entries.push(HandlerDescriptor { name, param, call });
        self
    }
}

impl<L> Handlers<L> {
    /// Returns the declared handlers in declaration order.
    pub fn descriptors(&self) -> &[HandlerDescriptor<L>] {
        &self.entries
    }

    /// Returns the number of declared handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no handler is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Guarded invocation
// ============================================================================

/// Runs a handler, converting returned errors and panics into a [`FailureKind`].
///
/// `make` is called inside the guard as well, so a closure that panics before
/// producing its future is caught too.
pub async fn invoke_guarded<F>(make: F) -> Result<(), FailureKind>
where
    F: FnOnce() -> BoxFuture<'static, HandlerResult>,
{
    let future = match std::panic::catch_unwind(AssertUnwindSafe(make)) {
        Ok(future) => future,
        Err(payload) => return Err(FailureKind::Panic(panic_message(payload.as_ref()))),
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(FailureKind::Error(format!("{err:#}"))),
        Err(payload) => Err(FailureKind::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
