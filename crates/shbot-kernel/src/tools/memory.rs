//! In-memory chat context.
//!
//! Holds attachments in a map and records every reply instead of sending
//! it anywhere. Used by tests and by embedders that want the reply as a
//! value.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::context::{AttachmentHandle, Context, DEFAULT_MAX_MESSAGE_LEN, File};

/// A reply captured by [`MemoryContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub content: Option<String>,
    pub files: Vec<File>,
}

/// Context backed by in-memory attachments.
#[derive(Debug)]
pub struct MemoryContext {
    attachments: HashMap<String, Vec<u8>>,
    max_message_len: usize,
    sent: Mutex<Vec<SentMessage>>,
    fetches: Mutex<Vec<String>>,
}

impl Default for MemoryContext {
    fn default() -> Self {
        Self {
            attachments: HashMap::new(),
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            sent: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attachment the message carries.
    pub fn with_attachment(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.attachments.insert(name.into(), content.into());
        self
    }

    pub fn with_max_message_len(mut self, len: usize) -> Self {
        self.max_message_len = len;
        self
    }

    /// Every reply sent so far, oldest first.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// The most recent reply, if any.
    pub async fn last_sent(&self) -> Option<SentMessage> {
        self.sent.lock().await.last().cloned()
    }

    /// How many times the named attachment has been fetched.
    pub async fn fetch_count(&self, name: &str) -> usize {
        self.fetches.lock().await.iter().filter(|n| *n == name).count()
    }
}

#[async_trait]
impl Context for MemoryContext {
    fn client_name(&self) -> &str {
        "memory"
    }

    async fn send(&self, content: Option<String>, files: Vec<File>) -> anyhow::Result<()> {
        self.sent.lock().await.push(SentMessage { content, files });
        Ok(())
    }

    fn attachments(&self) -> HashMap<String, AttachmentHandle> {
        self.attachments
            .keys()
            .map(|name| (name.clone(), AttachmentHandle::new(name.clone())))
            .collect()
    }

    async fn fetch_attachment(&self, handle: &AttachmentHandle) -> anyhow::Result<Vec<u8>> {
        let content = self
            .attachments
            .get(handle.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("no attachment behind handle {}", handle.as_str()))?;
        self.fetches.lock().await.push(handle.as_str().to_string());
        Ok(content)
    }

    fn max_message_len(&self) -> usize {
        self.max_message_len
    }
}
