//! Tower service integration.
//!
//! [`Bot`] implements `tower::Service<BoxedEvent>`, so inbound events can be
//! fed through ordinary tower middleware before they reach the dispatcher:
//!
//! ```rust,ignore
//! use tower::{ServiceBuilder, ServiceExt};
//!
//! let service = ServiceBuilder::new()
//!     .concurrency_limit(16)
//!     .service(bot.clone());
//!
//! let report = service.oneshot(BoxedEvent::new(message)).await?;
//! ```

use std::convert::Infallible;
use std::task::{Context, Poll};

use herald_core::{BoxFuture, BoxedEvent, DispatchReport};
use tower::Service;

use crate::bot::Bot;

/// Dispatches each request through [`Bot::on_inbound_event`].
///
/// The service is always ready and never fails; handler failures are part
/// of the returned [`DispatchReport`].
impl Service<BoxedEvent> for Bot {
    type Response = DispatchReport;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: BoxedEvent) -> Self::Future {
        let bot = self.clone();
        Box::pin(async move { Ok(bot.on_inbound_event(event).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::test_support::{counting, message};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_oneshot_dispatches() {
        let bot = Bot::new("!").unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        bot.register_command(Arc::new(Command::builder("ping").build(counting(&hits))));

        let report = bot
            .clone()
            .oneshot(BoxedEvent::new(message("!ping")))
            .await
            .unwrap();

        assert_eq!(report.invoked, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_always_ready() {
        let mut bot = Bot::new("!").unwrap();
        let mut ready = tokio_test::task::spawn(futures::future::poll_fn(|cx| bot.poll_ready(cx)));
        tokio_test::assert_ready_ok!(ready.poll());
    }
}
