//! Token and instruction types for shbot.
//!
//! The lexer produces a flat list of [`Token`]s, and the parser turns them
//! into a flat list of [`Instr`]s. There is no tree: the language is a
//! sequence of pipeline stages and redirections, executed in order.

use std::fmt;

/// An operator recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `|`: pipe the previous stage into the next command.
    Pipe,
    /// `>`: redirect stdout and stderr into a file.
    Out,
    /// `1>`: redirect stdout only.
    OutStdout,
    /// `2>`: redirect stderr only.
    OutStderr,
    /// `<`: bind an attachment as the next stage's input.
    In,
    /// `<<`: reserved, no parser semantics.
    HereDoc,
    /// `&`: reserved, no parser semantics.
    Amp,
    /// `;`: statement separator.
    Semi,
}

impl Operator {
    /// The operator as it appears in source text.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Pipe => "|",
            Operator::Out => ">",
            Operator::OutStdout => "1>",
            Operator::OutStderr => "2>",
            Operator::In => "<",
            Operator::HereDoc => "<<",
            Operator::Amp => "&",
            Operator::Semi => ";",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexed token: either a string (word) or an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    String(String),
    Op(Operator),
}

impl Token {
    /// Convenience constructor for string tokens.
    pub fn string(s: impl Into<String>) -> Self {
        Token::String(s.into())
    }

    /// The token's text.
    pub fn text(&self) -> &str {
        match self {
            Token::String(s) => s,
            Token::Op(op) => op.as_str(),
        }
    }

    pub fn is_op(&self, op: Operator) -> bool {
        matches!(self, Token::Op(o) if *o == op)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::String(s) => write!(f, "STRING({s:?})"),
            Token::Op(op) => write!(f, "OP({op})"),
        }
    }
}

/// What an instruction does when the interpreter reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrKind {
    /// Run a command standalone: the start of a statement.
    Eval,
    /// Run a command with the previous stage's output as input.
    Pipe,
    /// Drain stdout and stderr into a file.
    Out,
    /// Drain stdout into a file.
    Out1,
    /// Drain stderr into a file.
    Out2,
    /// Bind an attachment as the next stage's input.
    In,
}

impl InstrKind {
    /// Whether this instruction invokes a command (as opposed to a redirect).
    pub fn is_command(self) -> bool {
        matches!(self, InstrKind::Eval | InstrKind::Pipe)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstrKind::Eval => "EVAL",
            InstrKind::Pipe => "PIPE",
            InstrKind::Out => "OUT",
            InstrKind::Out1 => "OUT1",
            InstrKind::Out2 => "OUT2",
            InstrKind::In => "IN",
        }
    }
}

impl fmt::Display for InstrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single pipeline stage or redirection.
///
/// `args[0]` is the command name for `Eval`/`Pipe`, or the file name for
/// the redirections; the rest are positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instr {
    pub kind: InstrKind,
    pub args: Vec<String>,
}

impl Instr {
    pub fn new(kind: InstrKind) -> Self {
        Self {
            kind,
            args: Vec::new(),
        }
    }

    /// Build an instruction from a kind and its arguments.
    pub fn with_args<I, S>(kind: InstrKind, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push_arg(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// The command name or file name, if any.
    pub fn target(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Positional arguments after the target.
    pub fn rest(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.kind, self.args)
    }
}

/// Render a token stream on one line, for the debug CLI and snapshots.
pub fn format_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render an instruction list on one line, for the debug CLI and snapshots.
pub fn format_instrs(instrs: &[Instr]) -> String {
    instrs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
