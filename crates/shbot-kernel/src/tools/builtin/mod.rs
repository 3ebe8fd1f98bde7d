//! Built-in commands for shbot.
//!
//! These commands are always available.

mod cb;
mod echo;

pub use cb::Codeblock;
pub use echo::Echo;

use super::CommandRegistry;

/// Register all built-in commands with the registry.
pub fn register_builtins(registry: &mut CommandRegistry) {
    registry.register(None, None, Echo);
    registry.register(None, Some(Codeblock::spec()), Codeblock);
}
