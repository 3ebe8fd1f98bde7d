//! Tokenizer and parser tests against the public API.

use std::collections::HashMap;

use proptest::prelude::*;
use rstest::rstest;

use shbot_kernel::ast::{Instr, InstrKind, format_instrs, format_tokens};
use shbot_kernel::lexer::{LexError, tokenize};
use shbot_kernel::parser::{ParseError, SyntaxError, parse, parse_source};

fn vars() -> HashMap<String, String> {
    HashMap::from([
        ("USER".to_string(), "ann".to_string()),
        ("EMPTY".to_string(), String::new()),
    ])
}

fn lex(input: &str) -> String {
    format_tokens(&tokenize(input, &vars()).expect("lexes"))
}

fn compile(input: &str) -> Result<String, SyntaxError> {
    parse_source(input, &vars()).map(|instrs| format_instrs(&instrs))
}

// ============================================================================
// Tokens
// ============================================================================

#[rstest]
#[case::bare_words("echo hi", r#"STRING("echo") STRING("hi") OP(;)"#)]
#[case::pipe("a|b", r#"STRING("a") OP(|) STRING("b") OP(;)"#)]
#[case::redirects("x > o 1> a 2> b", r#"STRING("x") OP(>) STRING("o") OP(1>) STRING("a") OP(2>) STRING("b") OP(;)"#)]
#[case::input("cb < in.txt", r#"STRING("cb") OP(<) STRING("in.txt") OP(;)"#)]
#[case::heredoc("a << b", r#"STRING("a") OP(<<) STRING("b") OP(;)"#)]
#[case::amp("a &", r#"STRING("a") OP(&) OP(;)"#)]
#[case::path_symbols("ls ./a/b,c:d+e=f-g_h", r#"STRING("ls") STRING("./a/b,c:d+e=f-g_h") OP(;)"#)]
#[case::single_quotes("'a b'", r#"STRING("a b") OP(;)"#)]
#[case::quotes_glue("x'y'\"z\"", r#"STRING("xyz") OP(;)"#)]
#[case::variable("hi $USER", r#"STRING("hi") STRING("ann") OP(;)"#)]
#[case::variable_in_word("$USER.txt", r#"STRING("ann.txt") OP(;)"#)]
#[case::variable_in_double_quotes("\"to $USER!\"", r#"STRING("to ann!") OP(;)"#)]
#[case::no_expansion_in_single_quotes("'$USER'", r#"STRING("$USER") OP(;)"#)]
#[case::empty_variable_bare("echo $EMPTY", r#"STRING("echo") OP(;)"#)]
#[case::empty_variable_quoted("echo \"$EMPTY\"", r#"STRING("echo") STRING("") OP(;)"#)]
#[case::unknown_variable("echo $WHO", r#"STRING("echo") OP(;)"#)]
#[case::lone_dollar("echo $", r#"STRING("echo") OP(;)"#)]
#[case::digit_words("echo 1 2", r#"STRING("echo") STRING("1") STRING("2") OP(;)"#)]
#[case::explicit_terminator("a;", r#"STRING("a") OP(;)"#)]
#[case::newline_is_whitespace("a\nb", r#"STRING("a") STRING("b") OP(;)"#)]
fn tokens(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(lex(input), expected);
}

#[rstest]
#[case::bang("echo hi!", LexError::IllegalCharacter { ch: '!', offset: 7 })]
#[case::paren("(a)", LexError::IllegalCharacter { ch: '(', offset: 0 })]
#[case::unicode_bare("é", LexError::IllegalCharacter { ch: 'é', offset: 0 })]
#[case::open_single("echo 'hi", LexError::UnterminatedString { quote: '\'', offset: 5 })]
#[case::open_double("\"", LexError::UnterminatedString { quote: '"', offset: 0 })]
fn lex_errors(#[case] input: &str, #[case] expected: LexError) {
    assert_eq!(tokenize(input, &vars()), Err(expected));
}

// ============================================================================
// Instructions
// ============================================================================

#[rstest]
#[case::single("echo hi", r#"EVAL["echo", "hi"]"#)]
#[case::statements("a; b c", r#"EVAL["a"] EVAL["b", "c"]"#)]
#[case::pipeline("echo a | cb -l py", r#"EVAL["echo", "a"] PIPE["cb", "-l", "py"]"#)]
#[case::redirect("echo hi > out.txt", r#"EVAL["echo", "hi"] OUT["out.txt"]"#)]
#[case::split_redirects("x 1> a 2> b", r#"EVAL["x"] OUT1["a"] OUT2["b"]"#)]
#[case::input_first("< in.txt cb", r#"IN["in.txt"] EVAL["cb"]"#)]
#[case::input_after_command("cb < in.txt -l py", r#"IN["in.txt"] EVAL["cb", "-l", "py"]"#)]
#[case::input_mid_pipeline("echo x | cb < in.txt", r#"EVAL["echo", "x"] IN["in.txt"] PIPE["cb"]"#)]
#[case::empty_statements(";; a ;;", r#"EVAL["a"]"#)]
#[case::reserved_operators_ignored("a & b", r#"EVAL["a", "b"]"#)]
#[case::heredoc_ignored("a << b", r#"EVAL["a", "b"]"#)]
#[case::empty_input("", "")]
fn instructions(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(compile(input).expect("parses"), expected);
}

#[rstest]
#[case::trailing_pipe("echo |", ParseError::EmptyStage { stage: InstrKind::Pipe })]
#[case::double_pipe("a | | b", ParseError::EmptyStage { stage: InstrKind::Pipe })]
#[case::redirect_without_file("echo >", ParseError::EmptyStage { stage: InstrKind::Out })]
#[case::stderr_without_file("echo 2> ; b", ParseError::EmptyStage { stage: InstrKind::Out2 })]
#[case::input_at_end("cb <", ParseError::MalformedRedirection { index: 1 })]
#[case::pipe_after_separator("echo a; | cb", ParseError::EmptyStage { stage: InstrKind::Eval })]
#[case::leading_pipe("| cb", ParseError::EmptyStage { stage: InstrKind::Eval })]
#[case::leading_redirect("> f", ParseError::EmptyStage { stage: InstrKind::Eval })]
#[case::input_then_pipe("< f | cb", ParseError::EmptyStage { stage: InstrKind::Eval })]
#[case::input_then_operator("< | cb", ParseError::MalformedRedirection { index: 0 })]
fn parse_errors(#[case] input: &str, #[case] expected: ParseError) {
    assert_eq!(compile(input), Err(SyntaxError::Parse(expected)));
}

#[test]
fn parse_accepts_hand_built_tokens() {
    let tokens = tokenize("cb -l rs", &()).expect("lexes");
    let instrs = parse(&tokens).expect("parses");
    assert_eq!(
        instrs,
        vec![Instr::with_args(InstrKind::Eval, ["cb", "-l", "rs"])]
    );
    assert_eq!(instrs[0].target(), Some("cb"));
    assert_eq!(instrs[0].rest(), ["-l", "rs"]);
}

#[test]
fn lex_errors_surface_through_parse_source() {
    let result = parse_source("echo 'oops", &());
    assert!(matches!(result, Err(SyntaxError::Lex(LexError::UnterminatedString { .. }))));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn tokenize_never_panics(input in any::<String>()) {
        let _ = tokenize(&input, &vars());
    }

    #[test]
    fn nonempty_streams_end_with_terminator(input in "[a-z|>;<' ]{0,24}") {
        if let Ok(tokens) = tokenize(&input, &()) {
            if let Some(last) = tokens.last() {
                prop_assert_eq!(last.to_string(), "OP(;)");
            }
        }
    }

    #[test]
    fn spacing_around_separators_is_insignificant(
        words in prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..6),
        sep in prop::sample::select(vec![";", "|", ">"]),
    ) {
        let tight = words.join(sep);
        let loose = words.join(&format!(" {sep} "));
        prop_assert_eq!(tokenize(&tight, &()), tokenize(&loose, &()));
    }

    #[test]
    fn statements_parse_one_instruction_each(
        words in prop::collection::vec("[a-z]{1,8}", 1..8),
    ) {
        let source = words.join("; ");
        let instrs = parse_source(&source, &()).expect("parses");
        prop_assert_eq!(instrs.len(), words.len());
        prop_assert!(instrs.iter().all(|i| i.kind == InstrKind::Eval));
    }
}
