//! shbot entry point.
//!
//! ```bash
//! shbot                                # interactive REPL
//! shbot -c 'echo hi | cb'              # run one message
//! shbot -t 'echo $USER' -v USER=ann    # show tokens and instructions
//! shbot --attach main.rs=src/main.rs   # expose a local file as an attachment
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use shbot_kernel::Shell;
use shbot_repl::DebugContext;
use shbot_repl::config::{load_config, parse_key_value};

#[derive(Parser, Debug)]
#[command(name = "shbot", version, about = "Debug shell for shbot chat messages")]
struct Cli {
    /// Print tokens and instructions for MESSAGE instead of running it.
    #[arg(short = 't', long = "tokens", value_name = "MESSAGE", conflicts_with = "command")]
    tokens: Option<String>,

    /// Run MESSAGE once and exit.
    #[arg(short = 'c', long = "command", value_name = "MESSAGE")]
    command: Option<String>,

    /// Set a variable for `$NAME` expansion.
    #[arg(short = 'v', long = "var", value_name = "NAME=VALUE", value_parser = key_value)]
    vars: Vec<(String, String)>,

    /// Expose a local file as attachment NAME.
    #[arg(long = "attach", value_name = "NAME=PATH", value_parser = key_value)]
    attach: Vec<(String, String)>,

    /// Config file (default: <config dir>/shbot/config.toml).
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Reply length limit.
    #[arg(long = "max-len", value_name = "CHARS")]
    max_len: Option<usize>,

    /// Disable colored output (also off when stdout is not a terminal).
    #[arg(long = "no-color")]
    no_color: bool,
}

fn key_value(arg: &str) -> Result<(String, String), String> {
    parse_key_value(arg).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    for (name, value) in cli.vars {
        config.set_variable(name, value);
    }
    if cli.max_len.is_some() {
        config.max_message_len = cli.max_len;
    }
    let shell = Shell::new(config);

    if let Some(message) = cli.tokens {
        println!("{}", shbot_repl::inspect(&shell, &message)?);
        return Ok(());
    }

    let color = shbot_repl::use_color(cli.no_color, std::io::stdout().is_terminal());
    let ctx = cli
        .attach
        .into_iter()
        .fold(DebugContext::new().with_color(color), |ctx, (name, path)| {
            ctx.with_attachment(name, path)
        });

    match cli.command {
        Some(message) => {
            println!("{}", shbot_repl::run_once(&shell, &ctx, &message)?);
            Ok(())
        }
        None => shbot_repl::run(shell, ctx),
    }
}
