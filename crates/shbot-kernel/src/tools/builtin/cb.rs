//! cb — Wrap text in a Markdown code block.

use async_trait::async_trait;
use clap::Arg;

use crate::interpreter::OutputBuffer;
use crate::tools::{ArgSpec, CommandArgs, CommandError, Context, Handler};

const FENCE: &str = "```";

/// Codeblock command: `cb [-l LANG] [TEXT]`, or `... | cb [-l LANG]`.
pub struct Codeblock;

impl Codeblock {
    pub fn spec() -> ArgSpec {
        ArgSpec::new("puts text within a codeblock")
            .arg(
                Arg::new("text")
                    .value_name("TEXT")
                    .help("text"),
            )
            .arg(
                Arg::new("language")
                    .short('l')
                    .long("language")
                    .value_name("LANG")
                    .help("highlight language"),
            )
    }
}

#[async_trait]
impl Handler for Codeblock {
    fn name(&self) -> &str {
        "cb"
    }

    async fn run(
        &self,
        _ctx: &dyn Context,
        out: &mut OutputBuffer,
        args: CommandArgs,
        pipe: Option<OutputBuffer>,
    ) -> Result<(), CommandError> {
        let lang = args.get_str("language").unwrap_or_default();
        let text = match pipe {
            Some(input) => input.to_string_lossy(),
            None => args.get_str("text").unwrap_or_default().to_string(),
        };

        out.write_stdout(format!("{FENCE}{lang}\n{text}{FENCE}"));
        Ok(())
    }
}
