#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use herald::prelude::*;

pub struct Member {
    pub id: &'static str,
    pub admin: bool,
}

impl User for Member {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.id
    }

    fn has_permission(&self, permission: Permission) -> bool {
        self.admin || permission == Permission::SendMessages
    }
}

#[derive(Default)]
pub struct Inbox {
    sent: Mutex<Vec<String>>,
}

impl Inbox {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageChannel for Inbox {
    fn id(&self) -> &str {
        "inbox"
    }

    fn name(&self) -> &str {
        "inbox"
    }

    async fn send(&self, text: &str) -> TransportResult<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub fn message(content: &str, inbox: &Arc<Inbox>) -> MessageReceived {
    message_from(content, inbox, false)
}

pub fn message_from(content: &str, inbox: &Arc<Inbox>, admin: bool) -> MessageReceived {
    MessageReceived::new(
        content,
        None,
        Arc::new(Member { id: "alice", admin }),
        Arc::clone(inbox) as Arc<dyn MessageChannel>,
    )
}
