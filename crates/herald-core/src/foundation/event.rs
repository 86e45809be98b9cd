//! Event system for the Herald framework.
//!
//! This module provides the core event infrastructure:
//!
//! - [`Event`] - Base trait for all events
//! - [`BoxedEvent`] - Type-erased, cheaply cloneable event container
//!
//! Events are matched against handlers by their concrete runtime type, so an
//! event type needs nothing beyond an [`Event`] implementation. The derive
//! macro writes it for you:
//!
//! ```rust,ignore
//! use herald_core::Event;
//!
//! #[derive(Debug, Event)]
//! #[event(name = "member.joined")]
//! pub struct MemberJoined {
//!     pub user_id: String,
//! }
//! ```

use std::any::{Any, TypeId};
use std::sync::Arc;

// ============================================================================
// Core Event Trait
// ============================================================================

/// The base trait for all events in the Herald framework.
///
/// Events are type-erased using `dyn Event` and recovered with the two
/// `as_any` accessors. Both must return `self`; the dispatcher relies on
/// them to read the concrete [`TypeId`] and to hand typed `Arc<E>` values to
/// handlers.
pub trait Event: Any + Send + Sync {
    /// Returns the human-readable name of this event type.
    fn event_name(&self) -> &'static str;

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns self as an `Arc<dyn Any>` for owned downcasting.
    ///
    /// # Example Implementation
    ///
    /// ```rust,ignore
    /// fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
    ///     self
    /// }
    /// ```
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

// ============================================================================
// Boxed Event
// ============================================================================

/// A type-erased container for events that supports runtime downcasting.
///
/// `BoxedEvent` wraps any type implementing [`Event`] in an `Arc`, allowing
/// it to be handed to every listener without copying the payload.
///
/// # Deref to Event Trait
///
/// `BoxedEvent` implements `Deref<Target = dyn Event>`:
///
/// ```rust,ignore
/// let event: BoxedEvent = /* ... */;
/// let name = event.event_name();
/// ```
#[derive(Clone)]
pub struct BoxedEvent {
    inner: Arc<dyn Event>,
}

impl BoxedEvent {
    /// Creates a new `BoxedEvent` from any type implementing `Event`.
    pub fn new<E: Event>(event: E) -> Self {
        Self {
            inner: Arc::new(event),
        }
    }

    /// Wraps an event that is already shared.
    pub fn from_arc(inner: Arc<dyn Event>) -> Self {
        Self { inner }
    }

    /// Returns the inner `Arc<dyn Event>`.
    pub fn inner(&self) -> &Arc<dyn Event> {
        &self.inner
    }

    /// Returns the [`TypeId`] of the concrete event type.
    pub fn event_type(&self) -> TypeId {
        Any::type_id(self.inner.as_any())
    }

    /// Returns `true` if the concrete event type is `E`.
    pub fn is<E: Event>(&self) -> bool {
        self.event_type() == TypeId::of::<E>()
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.inner.as_any().downcast_ref()
    }

    /// Attempts to recover a shared handle to the concrete event.
    pub fn downcast<E: Event>(&self) -> Option<Arc<E>> {
        Arc::clone(&self.inner).into_any().downcast::<E>().ok()
    }
}

impl<E: Event> From<E> for BoxedEvent {
    fn from(event: E) -> Self {
        Self::new(event)
    }
}

impl std::ops::Deref for BoxedEvent {
    type Target = dyn Event;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for BoxedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedEvent")
            .field("event_name", &self.event_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    impl Event for Ping {
        fn event_name(&self) -> &'static str {
            "ping"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    struct Pong;

    impl Event for Pong {
        fn event_name(&self) -> &'static str {
            "pong"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[test]
    fn test_event_type_is_concrete_type() {
        let event = BoxedEvent::new(Ping(1));
        assert_eq!(event.event_type(), TypeId::of::<Ping>());
        assert!(event.is::<Ping>());
        assert!(!event.is::<Pong>());
    }

    #[test]
    fn test_downcast_shares_payload() {
        let event = BoxedEvent::new(Ping(7));
        let typed = event.downcast::<Ping>().unwrap();
        assert_eq!(*typed, Ping(7));
        assert!(event.downcast::<Pong>().is_none());
        assert_eq!(event.downcast_ref::<Ping>(), Some(&Ping(7)));
    }
}
