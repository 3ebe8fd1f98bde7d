//! The Shell: runs one chat message end to end.
//!
//! The Shell owns the command registry and the configuration, and wires
//! the three stages together:
//!
//! ```text
//! message ──► lexer ──► parser ──► interpreter ──► ctx.send(reply, files)
//!               ▲                      │
//!          variables             CommandRegistry
//! ```
//!
//! One Shell serves any number of concurrent messages: the registry is
//! read-only and every run keeps its own state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ast::{Instr, Token};
use crate::interpreter::{EMPTY_REPLY_PLACEHOLDER, Interpreter, ShellError};
use crate::lexer::{self, LexError};
use crate::parser::{self, SyntaxError};
use crate::tools::{CommandRegistry, Context};

/// Configuration for a Shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Values for `$NAME` expansion.
    pub variables: BTreeMap<String, String>,
    /// Reply sent when the output is empty.
    pub placeholder: String,
    /// Reply length limit; `None` defers to the context.
    pub max_message_len: Option<usize>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            variables: BTreeMap::new(),
            placeholder: EMPTY_REPLY_PLACEHOLDER.to_string(),
            max_message_len: None,
        }
    }
}

impl ShellConfig {
    /// Default config with the given variables.
    pub fn with_variables<I, K, V>(variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            variables: variables
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }
}

/// Runs messages against a command registry.
#[derive(Debug, Clone)]
pub struct Shell {
    registry: Arc<CommandRegistry>,
    config: ShellConfig,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

impl Shell {
    /// A shell with the built-in commands.
    pub fn new(config: ShellConfig) -> Self {
        Self::with_registry(Arc::new(CommandRegistry::with_builtins()), config)
    }

    /// A shell over an existing registry.
    pub fn with_registry(registry: Arc<CommandRegistry>, config: ShellConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Tokenize a message with the configured variables.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        lexer::tokenize(input, &self.config.variables)
    }

    /// Tokenize and parse a message with the configured variables.
    pub fn compile(&self, input: &str) -> Result<Vec<Instr>, SyntaxError> {
        parser::parse_source(input, &self.config.variables)
    }

    /// Run a message and send the reply through `ctx`.
    ///
    /// On error nothing has been sent; reporting the failure to the user
    /// is up to the caller.
    #[tracing::instrument(level = "debug", skip_all, fields(client = ctx.client_name()))]
    pub async fn execute(&self, ctx: &dyn Context, input: &str) -> Result<(), ShellError> {
        let instrs = self.compile(input).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected message");
        })?;

        Interpreter::new(&self.registry)
            .with_placeholder(self.config.placeholder.clone())
            .with_max_message_len(self.config.max_message_len)
            .interpret(ctx, &instrs)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "message aborted"))
    }
}
