use tokio::sync::RwLock;

use crate::models::{Message, NewMessage};

/// Process-lifetime, append-only message list.
///
/// Ids are assigned under the write lock, so `id == position + 1` always
/// holds and concurrent appends never collide. Reads clone a snapshot under
/// the read lock and never observe a half-appended record.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: RwLock<Vec<Message>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, draft: NewMessage) -> Message {
        let mut messages = self.messages.write().await;
        let id = messages.len() as u64 + 1;
        let message = draft.into_message(id);
        messages.push(message.clone());
        message
    }

    /// Point-in-time copy in insertion (= id) order.
    pub async fn list(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }
}
