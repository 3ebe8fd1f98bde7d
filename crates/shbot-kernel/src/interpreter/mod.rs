//! Interpreter for shbot instruction lists.
//!
//! - [`OutputBuffer`]: what commands write into and pipes carry.
//! - [`Interpreter`]: runs instructions against a registry and a context.

mod eval;
mod output;

pub use eval::{EMPTY_REPLY_PLACEHOLDER, Interpreter, ShellError, interpret};
pub use output::{Chunk, IntoChunk, OutputBuffer, Stream};
