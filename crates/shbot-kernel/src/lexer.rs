//! Tokenizer for shbot messages.
//!
//! A hand-written scanner driven by character classes. Words are runs of
//! ASCII letters, digits and `./,:+=-_`; quotes and `$NAME` expansions are
//! glued onto the word being built, so `a'b c'$X` is a single token.
//!
//! ```text
//! echo "hi $USER" | cb -l py > out.txt
//! STRING(echo) STRING(hi ann) OP(|) STRING(cb) STRING(-l) STRING(py) OP(>) STRING(out.txt) OP(;)
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::ast::{Operator, Token};

/// Errors raised while scanning. Either one aborts the whole message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated string: {quote} at byte {offset} is never closed")]
    UnterminatedString { quote: char, offset: usize },
    #[error("illegal character {ch:?} at byte {offset}")]
    IllegalCharacter { ch: char, offset: usize },
}

impl LexError {
    /// Byte offset of the offending character in the input.
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnterminatedString { offset, .. } => *offset,
            LexError::IllegalCharacter { offset, .. } => *offset,
        }
    }
}

/// Source of values for `$NAME` expansion.
pub trait Variables {
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> Variables for HashMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl Variables for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// No variables at all: every `$NAME` expands to nothing.
impl Variables for () {
    fn lookup(&self, _name: &str) -> Option<&str> {
        None
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_word_symbol(c)
}

fn is_word_symbol(c: char) -> bool {
    matches!(c, '.' | '/' | ',' | ':' | '+' | '=' | '-' | '_')
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

/// Tokenize a message.
///
/// The returned stream always ends with `;` when it is non-empty, so every
/// statement the parser sees is terminated.
pub fn tokenize<V: Variables + ?Sized>(input: &str, variables: &V) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input, variables);
    lexer.run()?;
    let mut tokens = lexer.tokens;

    let needs_terminator = match tokens.last() {
        Some(Token::String(_)) => true,
        Some(Token::Op(op)) => *op != Operator::Semi,
        None => false,
    };
    if needs_terminator {
        tokens.push(Token::Op(Operator::Semi));
    }

    Ok(tokens)
}

struct Lexer<'a, V: ?Sized> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    variables: &'a V,
    /// The word being built. `Some("")` is a real (empty) word, from `''`.
    pending: Option<String>,
    tokens: Vec<Token>,
}

impl<'a, V: Variables + ?Sized> Lexer<'a, V> {
    fn new(src: &'a str, variables: &'a V) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
            variables,
            pending: None,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, c)| c)
    }

    fn byte_offset(&self, pos: usize) -> usize {
        self.chars.get(pos).map_or(self.src.len(), |&(offset, _)| offset)
    }

    fn append(&mut self, text: &str) {
        self.pending.get_or_insert_with(String::new).push_str(text);
    }

    fn flush(&mut self) {
        if let Some(word) = self.pending.take() {
            self.tokens.push(Token::String(word));
        }
    }

    fn emit(&mut self, op: Operator, width: usize) {
        self.flush();
        self.tokens.push(Token::Op(op));
        self.pos += width;
    }

    fn run(&mut self) -> Result<(), LexError> {
        while let Some(&(offset, c)) = self.chars.get(self.pos) {
            match c {
                ';' => self.emit(Operator::Semi, 1),
                '$' => {
                    self.pos += 1;
                    let name = self.take_while(is_var_char);
                    if let Some(value) = self.expand(&name) {
                        if !value.is_empty() {
                            self.append(&value);
                        }
                    }
                }
                '1' | '2' if self.peek(1) == Some('>') => {
                    let op = if c == '1' {
                        Operator::OutStdout
                    } else {
                        Operator::OutStderr
                    };
                    self.emit(op, 2);
                }
                '1' | '2' => {
                    self.pending.get_or_insert_with(String::new).push(c);
                    self.pos += 1;
                }
                '>' => self.emit(Operator::Out, 1),
                '|' => self.emit(Operator::Pipe, 1),
                '&' => self.emit(Operator::Amp, 1),
                '<' if self.peek(1) == Some('<') => self.emit(Operator::HereDoc, 2),
                '<' => self.emit(Operator::In, 1),
                '\'' => {
                    let body = self.quoted(offset, '\'')?;
                    self.append(&body);
                }
                '"' => {
                    let body = self.quoted(offset, '"')?;
                    let body = self.interpolate(&body);
                    self.append(&body);
                }
                c if is_word_char(c) => {
                    let word = self.take_while(is_word_char);
                    self.append(&word);
                }
                c if is_whitespace(c) => {
                    self.flush();
                    self.pos += 1;
                }
                ch => return Err(LexError::IllegalCharacter { ch, offset }),
            }
        }
        self.flush();
        Ok(())
    }

    fn take_while(&mut self, pred: fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek(0) {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }

    /// Read a quoted span starting at the opening quote, leaving `pos` just
    /// past the closing quote. Returns the text between the quotes.
    fn quoted(&mut self, offset: usize, quote: char) -> Result<String, LexError> {
        let close = self.chars[self.pos + 1..]
            .iter()
            .position(|&(_, c)| c == quote)
            .map(|i| self.pos + 1 + i)
            .ok_or(LexError::UnterminatedString { quote, offset })?;

        let start = offset + quote.len_utf8();
        let end = self.byte_offset(close);
        self.pos = close + 1;
        Ok(self.src[start..end].to_string())
    }

    /// Expand `$NAME` references inside a double-quoted body.
    fn interpolate(&self, body: &str) -> String {
        let mut out = String::with_capacity(body.len());
        let mut chars = body.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }
            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if !is_var_char(next) {
                    break;
                }
                name.push(next);
                chars.next();
            }
            if let Some(value) = self.expand(&name) {
                out.push_str(&value);
            }
        }
        out
    }

    fn expand(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        let value = self.variables.lookup(name);
        if value.is_none() {
            tracing::trace!(name, "unknown variable expands to nothing");
        }
        value.map(str::to_string)
    }
}
