//! Parser for shbot token streams.
//!
//! Turns the lexer's flat token list into a flat list of instructions in
//! one left-to-right pass. Operators close the instruction being built and
//! open a new one of the matching kind; `<` is the exception and emits an
//! `IN` instruction on the side without closing anything.

use crate::ast::{Instr, InstrKind, Operator, Token};
use crate::lexer::{self, LexError, Variables};

/// Parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// `<` with no file name after it.
    #[error("malformed redirection: `<` at token {index} must be followed by a file name")]
    MalformedRedirection { index: usize },
    /// A stage closed without a command or file name, or a `|`, `>`,
    /// `1>` or `2>` with no command before it in the statement.
    #[error("{stage} stage is missing its command or file name")]
    EmptyStage { stage: InstrKind },
}

/// Either half of turning source text into instructions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Tokenize and parse a message in one step.
pub fn parse_source<V: Variables + ?Sized>(
    source: &str,
    variables: &V,
) -> Result<Vec<Instr>, SyntaxError> {
    let tokens = lexer::tokenize(source, variables)?;
    Ok(parse(&tokens)?)
}

/// Parse a token stream into instructions.
pub fn parse(tokens: &[Token]) -> Result<Vec<Instr>, ParseError> {
    let mut instrs = Vec::new();
    let mut current = Instr::new(InstrKind::Eval);
    let mut iter = tokens.iter().enumerate();

    while let Some((index, token)) = iter.next() {
        let op = match token {
            Token::String(s) => {
                current.push_arg(s.clone());
                continue;
            }
            Token::Op(op) => *op,
        };

        let next_kind = match op {
            Operator::In => {
                let name = match iter.next() {
                    Some((_, Token::String(name))) => name.clone(),
                    _ => return Err(ParseError::MalformedRedirection { index }),
                };
                instrs.push(Instr::with_args(InstrKind::In, [name]));
                continue;
            }
            Operator::HereDoc | Operator::Amp => {
                tracing::debug!(operator = %op, "reserved operator has no effect");
                continue;
            }
            Operator::Pipe => InstrKind::Pipe,
            Operator::Out => InstrKind::Out,
            Operator::OutStdout => InstrKind::Out1,
            Operator::OutStderr => InstrKind::Out2,
            Operator::Semi => InstrKind::Eval,
        };

        let closed = std::mem::replace(&mut current, Instr::new(next_kind));
        close(&mut instrs, closed, op)?;
    }

    // Whatever is still open here was never terminated; the lexer's
    // trailing `;` means it is always an empty EVAL in practice.
    Ok(instrs)
}

/// Push a finished instruction. An empty statement is only dropped when
/// `;` ends it; any other operator would attach to the previous statement.
fn close(instrs: &mut Vec<Instr>, instr: Instr, closed_by: Operator) -> Result<(), ParseError> {
    if instr.args.is_empty() {
        return match (instr.kind, closed_by) {
            (InstrKind::Eval, Operator::Semi) => Ok(()),
            (stage, _) => Err(ParseError::EmptyStage { stage }),
        };
    }
    instrs.push(instr);
    Ok(())
}
