//! echo — Print arguments, or pass piped input through.

use async_trait::async_trait;

use crate::interpreter::OutputBuffer;
use crate::tools::{CommandArgs, CommandError, Context, Handler};

/// Echo command: prints its arguments joined by spaces.
///
/// With piped input, the input is copied through unchanged and the
/// arguments are ignored.
pub struct Echo;

#[async_trait]
impl Handler for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> Option<&str> {
        Some("Print arguments to standard output")
    }

    async fn run(
        &self,
        _ctx: &dyn Context,
        out: &mut OutputBuffer,
        args: CommandArgs,
        pipe: Option<OutputBuffer>,
    ) -> Result<(), CommandError> {
        match pipe {
            Some(input) => out.write_stdout(input.to_bytes()),
            None => out.write_stdout(args.raw.join(" ")),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::MemoryContext;

    async fn run(args: &[&str], pipe: Option<OutputBuffer>) -> OutputBuffer {
        let ctx = MemoryContext::new();
        let mut out = OutputBuffer::new();
        let args = CommandArgs::raw(args.iter().map(|s| s.to_string()).collect());
        Echo.run(&ctx, &mut out, args, pipe).await.expect("echo runs");
        out
    }

    #[tokio::test]
    async fn test_echo_simple() {
        let out = run(&["hello"], None).await;
        assert!(out.ok());
        assert_eq!(out.to_string_lossy(), "hello");
    }

    #[tokio::test]
    async fn test_echo_multiple() {
        let out = run(&["hello", "world"], None).await;
        assert_eq!(out.to_string_lossy(), "hello world");
    }

    #[tokio::test]
    async fn test_echo_empty() {
        let out = run(&[], None).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_echo_passes_pipe_through() {
        let mut input = OutputBuffer::new();
        input.write_stdout("out ").write_stderr("err");
        let out = run(&["ignored"], Some(input)).await;
        assert_eq!(out.stdout_bytes(), b"out err");
    }
}
