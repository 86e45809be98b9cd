//! Transport doubles shared by the unit tests of this crate.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use herald_core::{MessageChannel, MessageReceived, Permission, TransportResult, User};
use parking_lot::Mutex;

use crate::command::{CommandContext, CommandHandler};

pub struct TestUser {
    id: String,
    is_bot: bool,
    permissions: HashSet<Permission>,
}

impl TestUser {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            is_bot: false,
            permissions: HashSet::from([Permission::SendMessages]),
        }
    }

    pub fn bot(id: &str) -> Self {
        Self {
            is_bot: true,
            ..Self::new(id)
        }
    }

    pub fn grant(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }
}

impl User for TestUser {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn is_bot(&self) -> bool {
        self.is_bot
    }

    fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<String>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    fn id(&self) -> &str {
        "test-channel"
    }

    fn name(&self) -> &str {
        "test"
    }

    async fn send(&self, text: &str) -> TransportResult<()> {
        self.sent.lock().push(text.to_string());
        Ok(())
    }
}

pub fn message(content: &str) -> MessageReceived {
    message_from(content, TestUser::new("alice"))
}

pub fn message_from(content: &str, author: TestUser) -> MessageReceived {
    MessageReceived::new(
        content,
        None,
        Arc::new(author),
        Arc::new(RecordingChannel::default()),
    )
}

pub fn message_with_channel(content: &str) -> (MessageReceived, Arc<RecordingChannel>) {
    let channel = Arc::new(RecordingChannel::default());
    let event = MessageReceived::new(
        content,
        None,
        Arc::new(TestUser::new("alice")),
        Arc::clone(&channel) as Arc<dyn MessageChannel>,
    );
    (event, channel)
}

pub fn context(args: &[&str]) -> (CommandContext, Arc<RecordingChannel>) {
    let channel = Arc::new(RecordingChannel::default());
    let ctx = CommandContext {
        guild: None,
        executor: Arc::new(TestUser::new("alice")),
        channel: Arc::clone(&channel) as Arc<dyn MessageChannel>,
        args: args.iter().map(|arg| (*arg).to_string()).collect(),
    };
    (ctx, channel)
}

/// A command handler that counts its invocations in `hits`.
pub fn counting(hits: &Arc<AtomicUsize>) -> impl CommandHandler {
    let hits = Arc::clone(hits);
    move |_: CommandContext| {
        hits.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(())
    }
}

pub async fn noop(_ctx: CommandContext) {}
