//! Structured argument specs for commands.
//!
//! An [`ArgSpec`] wraps a `clap` command definition. Parsing never exits
//! the process and never raises: the outcome is an [`ArgParse`] value that
//! the registry's wrapping logic turns into buffer output.

use clap::error::ErrorKind;
use clap::{Arg, ArgMatches, ColorChoice};

/// Outcome of parsing a command's raw arguments.
#[derive(Debug, Clone)]
pub enum ArgParse {
    /// Arguments were valid.
    Parsed(ArgMatches),
    /// Arguments were invalid; the message is meant for stderr.
    ParseFailed(String),
    /// `--help` (or `--version`) was asked for; the text is meant for stdout.
    HelpRequested(String),
}

/// Declarative description of a command's options and positionals.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    command: clap::Command,
}

impl ArgSpec {
    /// Start a spec with a one-line description.
    pub fn new(about: impl Into<String>) -> Self {
        let command = clap::Command::new("command")
            .about(about.into())
            .color(ColorChoice::Never)
            .disable_version_flag(true);
        Self { command }
    }

    /// Add an option or positional.
    pub fn arg(mut self, arg: Arg) -> Self {
        self.command = self.command.arg(arg);
        self
    }

    /// Set the program name shown in usage and help.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.command = self.command.name(name.clone()).bin_name(name);
        self
    }

    pub fn name(&self) -> &str {
        self.command.get_name()
    }

    /// Parse raw arguments (without the command name).
    pub fn parse(&self, args: &[String]) -> ArgParse {
        let argv = std::iter::once(self.name().to_string()).chain(args.iter().cloned());
        match self.command.clone().try_get_matches_from(argv) {
            Ok(matches) => ArgParse::Parsed(matches),
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    ArgParse::HelpRequested(err.to_string())
                }
                _ => ArgParse::ParseFailed(err.to_string()),
            },
        }
    }

    /// Formatted help text.
    pub fn help(&self) -> String {
        self.command.clone().render_help().to_string()
    }
}

/// Arguments handed to a command handler.
///
/// `raw` is always the stage's positional arguments as written; `matches`
/// is present when the command was registered with an [`ArgSpec`].
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    pub raw: Vec<String>,
    pub matches: Option<ArgMatches>,
}

impl CommandArgs {
    pub fn raw(raw: Vec<String>) -> Self {
        Self { raw, matches: None }
    }

    pub fn parsed(raw: Vec<String>, matches: ArgMatches) -> Self {
        Self {
            raw,
            matches: Some(matches),
        }
    }

    /// A string-valued option or positional from the parsed matches.
    pub fn get_str(&self, id: &str) -> Option<&str> {
        self.matches
            .as_ref()?
            .try_get_one::<String>(id)
            .ok()
            .flatten()
            .map(String::as_str)
    }

    /// Whether a boolean flag was set.
    pub fn flag(&self, id: &str) -> bool {
        self.matches
            .as_ref()
            .and_then(|m| m.try_get_one::<bool>(id).ok().flatten().copied())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ArgAction;

    fn spec() -> ArgSpec {
        ArgSpec::new("puts text within a codeblock")
            .named("cb")
            .arg(Arg::new("text").value_name("TEXT").help("text"))
            .arg(
                Arg::new("language")
                    .short('l')
                    .long("language")
                    .value_name("LANG")
                    .help("highlight language"),
            )
            .arg(Arg::new("verbose").long("verbose").action(ArgAction::SetTrue))
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_options_and_positionals() {
        let raw = args(&["-l", "py", "hello"]);
        let matches = match spec().parse(&raw) {
            ArgParse::Parsed(m) => m,
            other => panic!("expected Parsed, got {other:?}"),
        };
        let parsed = CommandArgs::parsed(raw, matches);
        assert_eq!(parsed.get_str("language"), Some("py"));
        assert_eq!(parsed.get_str("text"), Some("hello"));
        assert!(!parsed.flag("verbose"));
    }

    #[test]
    fn unknown_option_fails() {
        match spec().parse(&args(&["--bogus"])) {
            ArgParse::ParseFailed(msg) => assert!(msg.contains("--bogus"), "message: {msg}"),
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn help_is_requested_not_failed() {
        match spec().parse(&args(&["--help"])) {
            ArgParse::HelpRequested(text) => {
                assert!(text.contains("puts text within a codeblock"));
                assert!(text.contains("--language"));
            }
            other => panic!("expected HelpRequested, got {other:?}"),
        }
    }

    #[test]
    fn help_uses_program_name() {
        assert_eq!(spec().name(), "cb");
        assert!(spec().help().contains("Usage: cb"));
    }

    #[test]
    fn raw_args_have_no_matches() {
        let args = CommandArgs::raw(args(&["a"]));
        assert_eq!(args.get_str("text"), None);
        assert!(!args.flag("verbose"));
    }
}
