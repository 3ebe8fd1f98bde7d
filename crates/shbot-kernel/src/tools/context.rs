//! The chat context a message is executed against.
//!
//! The kernel never talks to a chat service directly. Client glue (Discord,
//! Revolt, the debug REPL) implements [`Context`] and the interpreter only
//! uses these few calls: list and fetch attachments, then send one reply.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

/// Discord's message length limit, used when a client does not say otherwise.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 2000;

/// A named binary payload: an inbound attachment or a generated output file.
#[derive(Clone, PartialEq, Eq)]
pub struct File {
    pub filename: String,
    pub content: Vec<u8>,
}

impl File {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.content.len() > 1000 {
            write!(f, "<filename={:?}, {}B>", self.filename, self.content.len())
        } else {
            write!(
                f,
                "<filename={:?}, content={:?}>",
                self.filename,
                String::from_utf8_lossy(&self.content)
            )
        }
    }
}

/// Opaque reference to an attachment, meaningful only to the context that
/// handed it out (a URL, a message-scoped id, a local path).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentHandle(String);

impl AttachmentHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A chat message being answered.
#[async_trait]
pub trait Context: Send + Sync {
    /// Short client name, e.g. `"discord"` or `"debug"`.
    fn client_name(&self) -> &str;

    /// Deliver the reply.
    async fn send(&self, content: Option<String>, files: Vec<File>) -> anyhow::Result<()>;

    /// Attachments on the message, keyed by file name.
    fn attachments(&self) -> HashMap<String, AttachmentHandle>;

    /// Download an attachment's bytes.
    async fn fetch_attachment(&self, handle: &AttachmentHandle) -> anyhow::Result<Vec<u8>>;

    /// Longest reply (in characters) the transport accepts.
    fn max_message_len(&self) -> usize {
        DEFAULT_MAX_MESSAGE_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_file_debug_shows_content() {
        let file = File::new("out.txt", "hi");
        assert_eq!(format!("{file:?}"), r#"<filename="out.txt", content="hi">"#);
    }

    #[test]
    fn large_file_debug_shows_size() {
        let file = File::new("big.bin", vec![0u8; 4096]);
        assert_eq!(format!("{file:?}"), r#"<filename="big.bin", 4096B>"#);
    }

    #[test]
    fn handle_round_trips_id() {
        let handle = AttachmentHandle::new("cdn://1234");
        assert_eq!(handle.as_str(), "cdn://1234");
    }
}
