//! In-memory store for embedding hosts that already hold raw messages.

use std::io::Write;

use indexmap::IndexMap;

use crate::error::{Result, SmimeError};
use crate::model::message::MessageUid;

use super::MailStore;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    messages: IndexMap<MessageUid, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a message.
    pub fn insert(&mut self, uid: impl Into<MessageUid>, raw: impl Into<Vec<u8>>) {
        self.messages.insert(uid.into(), raw.into());
    }
}

impl MailStore for MemoryStore {
    fn write_raw_body(&self, uid: &MessageUid, sink: &mut dyn Write) -> Result<u64> {
        let raw = self
            .messages
            .get(uid)
            .ok_or_else(|| SmimeError::MessageNotFound(uid.clone()))?;
        sink.write_all(raw)?;
        Ok(raw.len() as u64)
    }

    fn uids(&self) -> Result<Vec<MessageUid>> {
        Ok(self.messages.keys().cloned().collect())
    }
}
