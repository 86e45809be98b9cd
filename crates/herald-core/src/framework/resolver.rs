//! Handler resolution.
//!
//! Decides which of a listener's handlers receive an event. Resolution is a
//! pure function of the handler table and the event's concrete type: a
//! handler matches when it declared exactly that type, or when it is a
//! wildcard handler. Every matching handler is returned, so one listener may
//! receive the same event several times.

use std::any::TypeId;

use crate::foundation::event::BoxedEvent;
use crate::framework::handler::BoundHandler;

/// Returns the handlers eligible for an event of type `event_type`, in
/// declaration order.
pub fn resolve(
    handlers: &[BoundHandler],
    event_type: TypeId,
) -> impl Iterator<Item = &BoundHandler> {
    handlers
        .iter()
        .filter(move |handler| handler.param().accepts(event_type))
}

/// Returns the handlers eligible for `event`, in declaration order.
pub fn resolve_event<'a>(
    handlers: &'a [BoundHandler],
    event: &BoxedEvent,
) -> impl Iterator<Item = &'a BoundHandler> + use<'a> {
    resolve(handlers, event.event_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::event::Event;
    use crate::framework::handler::Handlers;
    use crate::framework::listener::{Listener, RegisteredListener};
    use std::any::Any;
    use std::sync::Arc;

    macro_rules! test_event {
        ($name:ident) => {
            struct $name;

            impl Event for $name {
                fn event_name(&self) -> &'static str {
                    stringify!($name)
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
                    self
                }
            }
        };
    }

    test_event!(Joined);
    test_event!(Left);
    test_event!(Typing);

    struct Audit;

    impl Listener for Audit {
        fn handlers(handlers: &mut Handlers<Self>) {
            handlers
                .on("joined", |_, _: Arc<Joined>| async {})
                .on_any("everything", |_, _| async {})
                .on("joined_again", |_, _: Arc<Joined>| async {})
                .on("left", |_, _: Arc<Left>| async {});
        }
    }

    fn names(event: BoxedEvent) -> Vec<&'static str> {
        let audit = RegisteredListener::bind(&Arc::new(Audit)).unwrap();
        resolve_event(audit.handlers(), &event)
            .map(BoundHandler::name)
            .collect()
    }

    #[test]
    fn test_exact_and_wildcard_match() {
        assert_eq!(
            names(BoxedEvent::new(Joined)),
            ["joined", "everything", "joined_again"]
        );
        assert_eq!(names(BoxedEvent::new(Left)), ["everything", "left"]);
    }

    #[test]
    fn test_unrelated_type_only_hits_wildcard() {
        assert_eq!(names(BoxedEvent::new(Typing)), ["everything"]);
    }
}
