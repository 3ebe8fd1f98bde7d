//! A terminal stand-in for a chat client.
//!
//! Attachments are local files named on the command line; replies are
//! rendered as `[send]` lines and queued until the caller prints them.

use std::collections::HashMap;
use std::path::PathBuf;
use anyhow::Context as _;
use async_trait::async_trait;
use owo_colors::OwoColorize;
use tokio::sync::Mutex;

use shbot_kernel::tools::{AttachmentHandle, Context, DEFAULT_MAX_MESSAGE_LEN, File};

#[derive(Debug)]
pub struct DebugContext {
    attachments: HashMap<String, PathBuf>,
    max_message_len: usize,
    color: bool,
    outbox: Mutex<Vec<String>>,
}

impl Default for DebugContext {
    fn default() -> Self {
        Self {
            attachments: HashMap::new(),
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            color: false,
            outbox: Mutex::new(Vec::new()),
        }
    }
}

impl DebugContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose the file at `path` as attachment `name`.
    pub fn with_attachment(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.attachments.insert(name.into(), path.into());
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_max_message_len(mut self, len: usize) -> Self {
        self.max_message_len = len;
        self
    }

    /// Attachment names, sorted.
    pub fn attachment_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.attachments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Take every rendered send queued so far.
    pub async fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.outbox.lock().await)
    }

    fn render(&self, content: Option<&str>, files: &[File]) -> String {
        let tag = if self.color {
            "[send]".green().bold().to_string()
        } else {
            "[send]".to_string()
        };

        let mut lines = Vec::with_capacity(files.len() + 1);
        if let Some(content) = content {
            lines.push(format!("{tag} {content}"));
        }
        for file in files {
            let summary = format!("{file:?}");
            if self.color {
                lines.push(format!("{tag} {}", summary.cyan()));
            } else {
                lines.push(format!("{tag} {summary}"));
            }
        }
        lines.join("\n")
    }
}

#[async_trait]
impl Context for DebugContext {
    fn client_name(&self) -> &str {
        "debug"
    }

    async fn send(&self, content: Option<String>, files: Vec<File>) -> anyhow::Result<()> {
        let rendered = self.render(content.as_deref(), &files);
        self.outbox.lock().await.push(rendered);
        Ok(())
    }

    fn attachments(&self) -> HashMap<String, AttachmentHandle> {
        self.attachments
            .iter()
            .map(|(name, path)| {
                (
                    name.clone(),
                    AttachmentHandle::new(path.to_string_lossy().into_owned()),
                )
            })
            .collect()
    }

    async fn fetch_attachment(&self, handle: &AttachmentHandle) -> anyhow::Result<Vec<u8>> {
        tokio::fs::read(handle.as_str())
            .await
            .with_context(|| format!("reading attachment {}", handle.as_str()))
    }

    fn max_message_len(&self) -> usize {
        self.max_message_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_renders_content_and_files() {
        let ctx = DebugContext::new();
        ctx.send(Some("hi".into()), vec![File::new("a.txt", "x")])
            .await
            .expect("send");
        insta::assert_snapshot!(ctx.drain().await.join("\n"), @r#"
        [send] hi
        [send] <filename="a.txt", content="x">
        "#);
        assert!(ctx.drain().await.is_empty());
    }

    #[tokio::test]
    async fn large_files_show_their_size() {
        let ctx = DebugContext::new();
        ctx.send(None, vec![File::new("big.bin", vec![0u8; 4096])])
            .await
            .expect("send");
        assert_eq!(ctx.drain().await, ["[send] <filename=\"big.bin\", 4096B>"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_sends_are_all_queued() {
        let ctx = std::sync::Arc::new(DebugContext::new());
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let ctx = std::sync::Arc::clone(&ctx);
                tokio::spawn(async move { ctx.send(Some(i.to_string()), Vec::new()).await })
            })
            .collect();
        for task in tasks {
            task.await.expect("joins").expect("send");
        }
        let mut sent = ctx.drain().await;
        sent.sort();
        assert_eq!(sent.len(), 8);
        assert_eq!(sent[0], "[send] 0");
    }

    #[tokio::test]
    async fn missing_attachment_file_is_an_error() {
        let ctx = DebugContext::new().with_attachment("a", "/nonexistent/shbot/a.txt");
        let handle = ctx.attachments().remove("a").expect("listed");
        assert!(ctx.fetch_attachment(&handle).await.is_err());
    }
}
