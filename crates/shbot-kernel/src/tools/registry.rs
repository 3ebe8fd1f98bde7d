//! Command registry for looking up commands by name.

use std::collections::HashMap;
use std::sync::Arc;

use super::args::ArgSpec;
use super::traits::{Command, Handler};

/// Registry of available commands.
///
/// Built once at startup, then shared read-only (behind an `Arc`) by every
/// message being handled.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<Command>>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in commands.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::register_builtins(&mut registry);
        registry
    }

    /// Register a handler.
    ///
    /// `name` defaults to the handler's own name. With a `spec`, raw
    /// arguments are parsed before the handler sees them.
    pub fn register(
        &mut self,
        name: Option<&str>,
        spec: Option<ArgSpec>,
        handler: impl Handler + 'static,
    ) {
        self.register_arc(name, spec, Arc::new(handler));
    }

    /// Register a handler that's already in an Arc.
    pub fn register_arc(&mut self, name: Option<&str>, spec: Option<ArgSpec>, handler: Arc<dyn Handler>) {
        let name = match name {
            Some(name) => name.to_string(),
            None => handler.name().to_string(),
        };
        let command = match spec {
            Some(spec) => Command::with_args(name.clone(), spec, handler),
            None => Command::plain(name.clone(), handler),
        };
        if self.commands.insert(name.clone(), Arc::new(command)).is_some() {
            tracing::warn!(command = %name, "command registered twice, keeping the newer one");
        }
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        self.commands.get(name).cloned()
    }

    /// Check if a command exists.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// List all command names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}
