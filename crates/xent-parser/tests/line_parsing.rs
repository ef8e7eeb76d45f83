//! Line-level parsing: blank lines, comments, instruction calls and the
//! errors a malformed line produces.

use xent_ast::{ExprKind, InstructionKind, ParsedLine};
use xent_parser::{parse_line, parse_program, ParseErrorKind};

fn call(source: &str) -> xent_ast::InstructionCall {
    match parse_line(source, 0).expect("Parse should succeed") {
        ParsedLine::Call(call) => call,
        ParsedLine::Blank => panic!("expected a call for {:?}", source),
    }
}

fn error_kind(source: &str) -> ParseErrorKind {
    parse_line(source, 0).expect_err("Expected parse error").kind
}

#[test]
fn test_blank_and_comment_lines() {
    assert_eq!(parse_line("", 0).unwrap(), ParsedLine::Blank);
    assert_eq!(parse_line("    ", 1).unwrap(), ParsedLine::Blank);
    assert_eq!(parse_line("# a comment", 2).unwrap(), ParsedLine::Blank);
}

#[test]
fn test_trailing_comment_is_stripped() {
    let call = call("reveal(s) # show the story");
    assert_eq!(call.kind, InstructionKind::Reveal);
    assert_eq!(call.args.len(), 1);
}

#[test]
fn test_keyword_arguments() {
    let call = call("assign(s='hello', t=s + ' world')");
    assert_eq!(call.kind, InstructionKind::Assign);
    let names: Vec<_> = call.keywords().filter_map(|a| a.name.clone()).collect();
    assert_eq!(names, vec!["s", "t"]);
    assert_eq!(call.positional().count(), 0);
}

#[test]
fn test_positional_arguments() {
    let call = call("elicit(x, y, 10)");
    assert_eq!(call.kind, InstructionKind::Elicit);
    let args: Vec<_> = call.positional().collect();
    assert_eq!(args.len(), 3);
    assert_eq!(args[0].value.as_ident(), Some("x"));
    assert_eq!(args[2].value.as_integer(), Some(10));
}

#[test]
fn test_every_instruction_name_parses() {
    for kind in InstructionKind::ALL {
        let parsed = call(&format!("{}()", kind.name()));
        assert_eq!(parsed.kind, kind);
    }
}

#[test]
fn test_spans_record_line_number() {
    match parse_line("reward(xent(x))", 7).unwrap() {
        ParsedLine::Call(call) => {
            assert_eq!(call.span.line, 7);
            assert_eq!(call.span.start, 0);
            assert_eq!(call.span.end, 15);
            assert!(matches!(call.args[0].value.kind, ExprKind::Call { .. }));
        }
        ParsedLine::Blank => panic!("expected call"),
    }
}

#[test]
fn test_unknown_instruction() {
    assert_eq!(error_kind("print(x)"), ParseErrorKind::UnknownInstruction);
}

#[test]
fn test_not_a_call() {
    assert_eq!(error_kind("x + 1"), ParseErrorKind::InvalidSyntax);
    assert_eq!(error_kind("assign"), ParseErrorKind::InvalidSyntax);
}

#[test]
fn test_two_calls_on_one_line() {
    assert_eq!(
        error_kind("reveal(s) reveal(t)"),
        ParseErrorKind::UnexpectedToken
    );
}

#[test]
fn test_unclosed_call() {
    assert_eq!(error_kind("elicit(x, 10"), ParseErrorKind::UnexpectedEof);
}

#[test]
fn test_missing_comma() {
    assert_eq!(error_kind("elicit(x 10)"), ParseErrorKind::UnexpectedToken);
}

#[test]
fn test_lexer_error() {
    let err = parse_line("assign(s=$)", 4).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Lex);
    assert_eq!(err.span.line, 4);
}

#[test]
fn test_calling_computed_value() {
    assert_eq!(error_kind("reveal(len(s)(1))"), ParseErrorKind::InvalidSyntax);
}

#[test]
fn test_program_reports_failing_line() {
    let source = "assign(s='a')\n\n# comment\nreveal(s,,)\n";
    let err = parse_program(source).unwrap_err();
    assert_eq!(err.span.line, 3);
}

#[test]
fn test_program_keeps_line_numbering() {
    let lines = parse_program("assign(s='a')\n\nreveal(s)").unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], ParsedLine::Blank);
}
