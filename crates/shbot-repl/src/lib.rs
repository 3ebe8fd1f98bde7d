//! shbot REPL — try bot messages from a terminal.
//!
//! Runs messages through a [`Shell`] against a [`DebugContext`], which
//! prints replies instead of posting them:
//!
//! - Run a message and show the `[send]` lines
//! - Show tokens and instructions (`/tokens` toggle, or `shbot -t`)
//! - Meta-commands: `/help`, `/quit`, `/tokens`, `/commands`

pub mod config;
pub mod context;
pub mod paths;

use anyhow::{Context as _, Result};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::runtime::Runtime;

use shbot_kernel::Shell;
use shbot_kernel::ast::{format_instrs, format_tokens};

pub use context::DebugContext;

/// REPL state.
pub struct Repl {
    shell: Shell,
    ctx: DebugContext,
    runtime: Runtime,
    show_tokens: bool,
    quit: bool,
}

impl Repl {
    /// Create a REPL over `shell`, replying through `ctx`.
    pub fn new(shell: Shell, ctx: DebugContext) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;
        Ok(Self {
            shell,
            ctx,
            runtime,
            show_tokens: false,
            quit: false,
        })
    }

    /// Whether `/quit` has been entered.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();

        if trimmed.starts_with('/') {
            return Ok(self.handle_meta_command(trimmed));
        }

        if trimmed.is_empty() {
            return Ok(None);
        }

        let mut output = Vec::new();
        if self.show_tokens {
            output.push(inspect(&self.shell, trimmed)?);
        }

        self.runtime
            .block_on(self.shell.execute(&self.ctx, trimmed))?;
        output.extend(self.runtime.block_on(self.ctx.drain()));

        Ok(Some(output.join("\n")))
    }

    fn handle_meta_command(&mut self, cmd: &str) -> Option<String> {
        let command = cmd.split_whitespace().next().unwrap_or("");

        match command {
            "/quit" | "/q" | "/exit" => {
                self.quit = true;
                None
            }
            "/help" | "/h" | "/?" => Some(HELP_TEXT.to_string()),
            "/tokens" => {
                self.show_tokens = !self.show_tokens;
                Some(format!(
                    "Token display: {}",
                    if self.show_tokens { "ON" } else { "OFF" }
                ))
            }
            "/commands" => Some(self.list_commands()),
            _ => Some(format!(
                "Unknown command: {command}\nType /help for available commands."
            )),
        }
    }

    fn list_commands(&self) -> String {
        let registry = self.shell.registry();
        let mut output = String::from("Commands:");
        for name in registry.names() {
            let summary = registry
                .get(name)
                .and_then(|cmd| cmd.help().and_then(|h| h.lines().next()).map(str::to_string))
                .unwrap_or_default();
            output.push_str(&format!("\n  {name:<10} {summary}"));
        }
        let attachments = self.ctx.attachment_names();
        if !attachments.is_empty() {
            output.push_str("\nAttachments:");
            for name in attachments {
                output.push_str(&format!("\n  {name}"));
            }
        }
        output
    }
}

/// Tokens and instructions for `input`, one line each.
pub fn inspect(shell: &Shell, input: &str) -> Result<String> {
    let tokens = shell.tokenize(input)?;
    let instrs = shell.compile(input)?;
    Ok(format!(
        "tokens: {}\ninstrs: {}",
        format_tokens(&tokens),
        format_instrs(&instrs)
    ))
}

/// Run one message and return what was sent.
pub fn run_once(shell: &Shell, ctx: &DebugContext, message: &str) -> Result<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;
    let sent = runtime.block_on(async {
        shell.execute(ctx, message).await?;
        anyhow::Ok(ctx.drain().await)
    })?;
    Ok(sent.join("\n"))
}

/// Color only when asked for and stdout is a terminal.
pub fn use_color(no_color: bool, stdout_is_terminal: bool) -> bool {
    !no_color && stdout_is_terminal
}

const HELP_TEXT: &str = r#"shbot — debug REPL

Commands:
  /help, /h, /?     Show this help
  /quit, /q, /exit  Exit the REPL
  /tokens           Toggle token and instruction display
  /commands         List commands and attachments

Language:
  cmd args          Run a command
  a | b             Pipe a's output into b
  a > file          Send a's output as a file
  a 1> f 2> g       Split stdout and stderr into files
  cmd < file        Feed an attachment to cmd
  a; b              Run a, then b
  $NAME             Variable (from config or --var)

Examples:
  echo hello
  echo "print(1)" | cb -l py
  cb -l rs < main.rs > main.md
"#;

/// Run the REPL.
pub fn run(shell: Shell, ctx: DebugContext) -> Result<()> {
    println!("shbot v{}", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit.\n");

    let mut rl: Editor<(), DefaultHistory> =
        Editor::new().context("Failed to create editor")?;

    let history_path = paths::history_file();
    if let Err(e) = rl.load_history(&history_path) {
        tracing::debug!(error = %e, "no history loaded");
    }

    let mut repl = Repl::new(shell, ctx)?;

    loop {
        match rl.readline("shbot> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match repl.process_line(&line) {
                    Ok(Some(output)) => println!("{output}"),
                    Ok(None) => {}
                    Err(e) => eprintln!("Error: {e}"),
                }
                if repl.should_quit() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = rl.save_history(&history_path) {
        tracing::warn!(error = %e, "failed to save history");
    }

    Ok(())
}
