//! shbot-kernel: the core of shbot.
//!
//! This crate provides:
//!
//! - **Lexer**: Tokenizes chat messages, with quoting and `$NAME` expansion
//! - **Parser**: Turns tokens into a flat list of pipeline instructions
//! - **Interpreter**: Runs instructions, threading output buffers through pipes
//!   and redirecting them into attachments
//! - **Tools**: The command registry, argument specs, builtins, and the
//!   [`tools::Context`] trait chat clients implement
//! - **Shell**: Ties it all together for one message at a time

pub mod ast;
pub mod interpreter;
pub mod kernel;
pub mod lexer;
pub mod parser;
pub mod tools;

pub use interpreter::{OutputBuffer, ShellError};
pub use kernel::{Shell, ShellConfig};
