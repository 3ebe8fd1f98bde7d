//! Command handlers and the commands that wrap them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::args::{ArgParse, ArgSpec, CommandArgs};
use super::context::Context;
use crate::interpreter::OutputBuffer;

/// Errors a command can end an invocation with.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command {0:?} not found")]
    NotFound(String),
    #[error("command {0:?} is not implemented")]
    NotImplemented(String),
    #[error("command {name:?} failed: {message}")]
    Failed { name: String, message: String },
}

/// The body of a command.
///
/// Handlers write into `out` and may read `pipe`, the previous stage's
/// output or an attachment bound with `<`. Ordinary failures belong in the
/// buffer (stderr plus a non-zero exit code); returning `Err` aborts the
/// whole message.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name used when the command is registered without an explicit one.
    fn name(&self) -> &str;

    /// One-line description, used as help when there is no [`ArgSpec`].
    fn description(&self) -> Option<&str> {
        None
    }

    async fn run(
        &self,
        ctx: &dyn Context,
        out: &mut OutputBuffer,
        args: CommandArgs,
        pipe: Option<OutputBuffer>,
    ) -> Result<(), CommandError>;
}

/// A registered command: a handler, optionally behind an argument spec.
pub struct Command {
    name: String,
    spec: Option<ArgSpec>,
    help: Option<String>,
    handler: Arc<dyn Handler>,
}

impl Command {
    /// A command that receives its arguments as written.
    pub fn plain(name: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        let help = handler.description().map(str::to_string);
        Self {
            name: name.into(),
            spec: None,
            help,
            handler,
        }
    }

    /// A command whose arguments are parsed by `spec` before the handler runs.
    pub fn with_args(name: impl Into<String>, spec: ArgSpec, handler: Arc<dyn Handler>) -> Self {
        let name = name.into();
        let spec = spec.named(name.clone());
        let help = Some(spec.help());
        Self {
            name,
            spec: Some(spec),
            help,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn spec(&self) -> Option<&ArgSpec> {
        self.spec.as_ref()
    }

    /// Run the command.
    ///
    /// With a spec, a parse failure writes the message to stderr with exit
    /// code 1 and a help request writes the help text to stdout; in both
    /// cases the handler does not run.
    pub async fn invoke(
        &self,
        ctx: &dyn Context,
        out: &mut OutputBuffer,
        args: Vec<String>,
        pipe: Option<OutputBuffer>,
    ) -> Result<(), CommandError> {
        let Some(spec) = &self.spec else {
            return self.handler.run(ctx, out, CommandArgs::raw(args), pipe).await;
        };

        match spec.parse(&args) {
            ArgParse::Parsed(matches) => {
                self.handler
                    .run(ctx, out, CommandArgs::parsed(args, matches), pipe)
                    .await
            }
            ArgParse::ParseFailed(message) => {
                tracing::debug!(command = %self.name, "argument parse failed");
                out.set_exit_code(1).write_stderr(message);
                Ok(())
            }
            ArgParse::HelpRequested(text) => {
                out.write_stdout(text);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command<{}>", self.name)
    }
}
