//! Pipeline execution.
//!
//! The interpreter folds over the instruction list in order. Each command
//! stage writes into the running buffer `out`; a `PIPE` stage moves `out`
//! into the next command's input and starts a fresh one; redirections
//! drain `out` into generated files; `IN` binds an attachment as the next
//! command's input. When the list is exhausted, whatever is left in `out`
//! becomes the reply.
//!
//! Any error here is fatal to the message: nothing is sent.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{Instr, InstrKind};
use crate::parser::SyntaxError;
use crate::tools::{Command, CommandError, CommandRegistry, Context, File};

use super::output::OutputBuffer;

/// Sent instead of an empty reply, which chat services reject.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "** **";

/// Errors that abort a whole message.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("attachment {0:?} not found")]
    AttachmentNotFound(String),
    #[error("{0} instruction has no command or file name")]
    MissingTarget(InstrKind),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Mutable state for one run through an instruction list.
#[derive(Default)]
struct PipelineState {
    /// Running output buffer.
    out: OutputBuffer,
    /// Attachment bound by the last `IN`, consumed by the next command.
    in_file: Option<OutputBuffer>,
    /// Attachments fetched during this run, by file name.
    in_files_cache: HashMap<String, Vec<u8>>,
    /// Files produced by `>`, `1>` and `2>`, in order.
    out_files: Vec<File>,
}

/// Executes instruction lists against a command registry.
#[derive(Debug, Clone)]
pub struct Interpreter<'r> {
    registry: &'r CommandRegistry,
    placeholder: String,
    max_message_len: Option<usize>,
}

impl<'r> Interpreter<'r> {
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self {
            registry,
            placeholder: EMPTY_REPLY_PLACEHOLDER.to_string(),
            max_message_len: None,
        }
    }

    /// Text to send when the final buffer is empty.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Override the context's message length limit.
    pub fn with_max_message_len(mut self, max: Option<usize>) -> Self {
        self.max_message_len = max;
        self
    }

    /// Run `instrs` and send the reply through `ctx`.
    #[tracing::instrument(level = "debug", skip_all, fields(client = ctx.client_name(), stages = instrs.len()))]
    pub async fn interpret(&self, ctx: &dyn Context, instrs: &[Instr]) -> Result<(), ShellError> {
        let mut state = PipelineState::default();

        for instr in instrs {
            tracing::debug!(kind = %instr.kind, args = ?instr.args, "stage");
            self.step(ctx, &mut state, instr).await?;
        }

        let content = self.render(ctx, &state.out);
        tracing::info!(
            bytes = content.len(),
            files = state.out_files.len(),
            "sending reply"
        );
        ctx.send(Some(content), state.out_files).await?;
        Ok(())
    }

    async fn step(
        &self,
        ctx: &dyn Context,
        state: &mut PipelineState,
        instr: &Instr,
    ) -> Result<(), ShellError> {
        let target = instr
            .target()
            .ok_or(ShellError::MissingTarget(instr.kind))?;

        match instr.kind {
            InstrKind::In => {
                let attachments = ctx.attachments();
                let handle = attachments
                    .get(target)
                    .ok_or_else(|| ShellError::AttachmentNotFound(target.to_string()))?;

                let content = match state.in_files_cache.get(target) {
                    Some(content) => content.clone(),
                    None => {
                        let content = ctx.fetch_attachment(handle).await?;
                        tracing::debug!(attachment = target, bytes = content.len(), "fetched");
                        state
                            .in_files_cache
                            .insert(target.to_string(), content.clone());
                        content
                    }
                };
                state.in_file = Some(OutputBuffer::from_stdout(content));
            }
            InstrKind::Out | InstrKind::Out1 | InstrKind::Out2 => {
                let content = match instr.kind {
                    InstrKind::Out1 => state.out.take_stdout(),
                    InstrKind::Out2 => state.out.take_stderr(),
                    _ => state.out.take_all(),
                };
                state.out_files.push(File::new(target, content));
            }
            InstrKind::Pipe => {
                let pipe = std::mem::take(&mut state.out);
                let command = self.lookup(target)?;
                let input = state.in_file.take().unwrap_or(pipe);
                command
                    .invoke(ctx, &mut state.out, instr.rest().to_vec(), Some(input))
                    .await?;
            }
            InstrKind::Eval => {
                state.out.clear_stdout();
                let command = self.lookup(target)?;
                let input = state.in_file.take();
                command
                    .invoke(ctx, &mut state.out, instr.rest().to_vec(), input)
                    .await?;
            }
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<Arc<Command>, CommandError> {
        self.registry.get(name).ok_or_else(|| {
            tracing::warn!(command = name, "command not found");
            CommandError::NotFound(name.to_string())
        })
    }

    /// The reply text for the final buffer.
    fn render(&self, ctx: &dyn Context, out: &OutputBuffer) -> String {
        let mut content = out.to_string_lossy();
        if content.is_empty() {
            content = self.placeholder.clone();
        }
        let limit = self.max_message_len.unwrap_or_else(|| ctx.max_message_len());
        truncate_chars(content, limit)
    }
}

/// Run `instrs` against `registry` with default settings.
pub async fn interpret(
    ctx: &dyn Context,
    registry: &CommandRegistry,
    instrs: &[Instr],
) -> Result<(), ShellError> {
    Interpreter::new(registry).interpret(ctx, instrs).await
}

/// Keep at most `max` characters.
fn truncate_chars(mut s: String, max: usize) -> String {
    let cut = s.char_indices().nth(max).map(|(idx, _)| idx);
    if let Some(idx) = cut {
        s.truncate(idx);
    }
    s
}
