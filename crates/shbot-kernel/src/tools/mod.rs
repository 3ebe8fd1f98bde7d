//! Commands, the registry that holds them, and the context they run in.

mod args;
pub mod builtin;
mod context;
mod memory;
mod registry;
mod traits;

pub use args::{ArgParse, ArgSpec, CommandArgs};
pub use builtin::register_builtins;
pub use context::{AttachmentHandle, Context, DEFAULT_MAX_MESSAGE_LEN, File};
pub use memory::{MemoryContext, SentMessage};
pub use registry::CommandRegistry;
pub use traits::{Command, CommandError, Handler};
