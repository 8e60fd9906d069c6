use crate::syntax::token::{Keyword, LexerError, Paired};
use crate::syntax::{parse, Expression, Identifier, ParseError, Parser, Ranged, SourceRange};
use crate::ErrorKind;

#[track_caller]
fn tree(source: &str) -> String {
    match parse(source) {
        Ok(tree) => tree.0.to_string(),
        Err(err) => panic!("{source:?} failed to parse:\n{}", err.diagnostic(source)),
    }
}

#[track_caller]
fn error(source: &str) -> Ranged<ParseError> {
    match parse(source) {
        Ok(tree) => panic!("{source:?} parsed as {}", tree.0),
        Err(err) => err,
    }
}

#[track_caller]
fn cause(err: &Ranged<ParseError>) -> &Ranged<ParseError> {
    err.cause()
        .unwrap_or_else(|| panic!("{err:?} should wrap another error"))
}

#[test]
fn precedence() {
    assert_eq!(tree("1 + 2 * 3"), "(+ 1 (* 2 3))");
    assert_eq!(tree("1 * 2 + 3"), "(+ (* 1 2) 3)");
    assert_eq!(tree("2 ^ 3 ^ 2"), "(^ 2 (^ 3 2))");
    assert_eq!(tree("1 - 2 - 3"), "(- (- 1 2) 3)");
    assert_eq!(tree("a = b || c && d"), "(= a (|| b (&& c d)))");
    assert_eq!(tree("a == b < c"), "(== a (< b c))");
    assert_eq!(tree("a, b |> c"), "(, a (|> b c))");
    assert_eq!(tree("a.b + c?.d"), "(+ (. a b) (?. c d))");
}

#[test]
fn unknown_operators_bind_above_multiplication() {
    assert_eq!(tree("a <> b * c"), "(* (<> a b) c)");
    assert_eq!(tree("a * b <> c"), "(* a (<> b c))");
    assert_eq!(tree("f a <> b"), "(<> (apply f a) b)");
}

#[test]
fn juxtaposition() {
    assert_eq!(tree("f x"), "(apply f x)");
    assert_eq!(tree("f x + 1"), "(+ (apply f x) 1)");
    assert_eq!(tree("1 + f x"), "(+ 1 (apply f x))");
    assert_eq!(tree("f x y"), "(apply (apply f x) y)");
    assert_eq!(tree("f a.b"), "(apply f (. a b))");
    assert_eq!(tree("f (g x) y"), "(apply (apply f (apply g x)) y)");
    assert_eq!(tree("not true"), "(apply not true)");
    assert_eq!(tree(r#"greet "hi\n""#), r#"(apply greet "hi\n")"#);
}

#[test]
fn application_records_its_anchor() {
    let parsed = parse("sqrt  2").unwrap();
    assert_eq!(parsed.range(), SourceRange::from(0..7));
    let Expression::Apply(application) = &parsed.0 else {
        unreachable!("expected an application, got {}", parsed.0)
    };
    assert_eq!(application.anchor, SourceRange::empty_at(4));
    assert!(!application.curried);
}

#[test]
fn declarations() {
    assert_eq!(tree("let x =\n    1\nx"), "(block (let x 1) x)");
    assert_eq!(tree("let x = 1\nx"), "(block (let x 1) x)");
    assert_eq!(tree("const x = 1"), "(const x 1)");
    assert_eq!(
        tree("let total =\n    1 +\n    2\ntotal"),
        "(block (let total (+ 1 2)) total)"
    );
}

#[test]
fn declaration_node() {
    let parsed = parse("let answer = 42").unwrap();
    assert_eq!(parsed.range(), SourceRange::from(0..15));
    let Expression::Declaration(declaration) = &parsed.0 else {
        unreachable!("expected a declaration, got {}", parsed.0)
    };
    assert!(declaration.mutable);
    assert_eq!(declaration.name, Ranged::new(4..10, Identifier::new("answer")));
    assert_eq!(
        declaration.value,
        Ranged::new(13..15, Expression::Number(String::from("42")))
    );
}

#[test]
fn nested_scopes() {
    assert_eq!(
        tree("let x =\n    let y = 2\n    y * 2\nx"),
        "(block (let x (block (let y 2) (* y 2))) x)"
    );
    assert_eq!(
        tree("a\nlet b = a\nconst c = b\nc"),
        "(block a (let b a) (const c b) c)"
    );
}

#[test]
fn body_must_be_indented() {
    let err = error("let x =\n1\nx");
    assert_eq!(err.0, ParseError::ExpectedIndentedExpression);
    assert_eq!(err.range(), SourceRange::from(8..9));
}

#[test]
fn continuation_lines() {
    assert_eq!(tree("1\n+ 2"), "(+ 1 2)");
    assert_eq!(tree("f\n  x\n  y"), "(apply (apply f x) y)");
    assert_eq!(tree("total =\n    price * count"), "(= total (* price count))");
    // Operands stop at line breaks; the continuation applies to the whole
    // statement.
    assert_eq!(tree("total =\n    price\n    * count"), "(* (= total price) count)");
    assert_eq!(tree("1 +\n2"), "(+ 1 2)");
}

#[test]
fn statements() {
    assert_eq!(tree("a // first\n\n// aside\nb\nc"), "(block a b c)");
    assert_eq!(tree("  a\n  b"), "(block a b)");
    assert_eq!(tree("f x\ng y"), "(block (apply f x) (apply g y))");
}

#[test]
fn block_range_spans_statements() {
    let parsed = parse("\na\n\nb  \n").unwrap();
    assert_eq!(parsed.range(), SourceRange::from(1..5));
}

#[test]
fn empty_input() {
    for source in ["", "   ", "\n\n", "// only a comment\n"] {
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.0, Expression::Block(Vec::new()), "{source:?}");
    }
}

#[test]
fn parens() {
    let unit = parse("()").unwrap();
    assert_eq!(unit, Ranged::new(0..2, Expression::Identifier(Identifier::unit())));
    assert!(matches!(&unit.0, Expression::Identifier(identifier) if identifier.is_unit()));

    let one = parse("(1)").unwrap();
    assert_eq!(one, Ranged::new(1..2, Expression::Number(String::from("1"))));

    assert_eq!(tree("(1 + 2) * 3"), "(* (+ 1 2) 3)");
    assert_eq!(tree("((a))"), "a");
    assert_eq!(tree("f ()"), "(apply f ())");
    assert_eq!(tree("(a\nb)"), "(block a b)");
    assert_eq!(tree("(f\n  x)"), "(apply f x)");
    assert_eq!(tree("(let x = 1)"), "(let x 1)");
}

#[test]
fn unclosed_paren_diagnostic() {
    let err = crate::parse("(1 + 2").unwrap_err();
    assert_eq!(err.kind(), "unclosed paren");
    assert_eq!(
        err.to_string(),
        "the paren opened at 1,0 contains an expression, but is never closed\n\n 1 | (1 + 2\n     ~\n"
    );

    let err = error("(");
    assert_eq!(
        err.0,
        ParseError::UnclosedParen {
            line: 1,
            column: 0,
            contains_expression: false,
            cause: None,
        }
    );
}

#[test]
fn unclosed_paren_in_argument() {
    let err = error("x\n  (a");
    assert!(matches!(err.0, ParseError::ExpectedArgument { .. }));
    assert_eq!(
        cause(&err).0,
        ParseError::UnclosedParen {
            line: 2,
            column: 2,
            contains_expression: true,
            cause: None,
        }
    );
}

#[test]
fn unclosed_paren_with_lexical_error() {
    let source = "(#";
    let err = error(source);
    assert_eq!(
        err.0,
        ParseError::UnclosedParen {
            line: 1,
            column: 0,
            contains_expression: false,
            cause: Some(LexerError::UnexpectedChar('#')),
        }
    );
    assert_eq!(
        err.diagnostic(source).to_string(),
        "the paren opened at 1,0 is never closed\n\n 1 | (#\n     ~\n\nbecause of a lexical error: unexpected character '#'"
    );

    // Inside the group, lexical errors are reported as they are.
    assert_eq!(
        error("(a #").0,
        ParseError::Token(LexerError::UnexpectedChar('#'))
    );
}

#[test]
fn operand_errors_are_wrapped() {
    let source = "1 + )";
    let err = error(source);
    assert_eq!(
        err.0,
        ParseError::ExpectedOperand {
            operator: String::from("+"),
            cause: Some(Box::new(Ranged::new(4..5, ParseError::UnexpectedCloseParen))),
        }
    );
    assert_eq!(
        err.diagnostic(source).to_string(),
        format!(
            "expected an expression to the right of the operator `+`: \
             unexpected closing paren: there is no open paren to close\n\n 1 | 1 + )\n{}~\n",
            " ".repeat(9)
        )
    );

    let err = error("(1 + )");
    assert_eq!(
        err.0,
        ParseError::ExpectedOperand {
            operator: String::from("+"),
            cause: None,
        }
    );
    assert_eq!(err.range(), SourceRange::from(3..4));
}

#[test]
fn initializer_errors_are_wrapped() {
    let err = error("let x = )");
    assert_eq!(err.kind(), "expected initializer");
    assert_eq!(cause(&err).0, ParseError::UnexpectedCloseParen);
    assert_eq!(err.range(), SourceRange::from(6..7));

    assert_eq!(
        error("let x =").0,
        ParseError::ExpectedInitializer { cause: None }
    );
}

#[test]
fn lexical_errors_propagate_unchanged() {
    let err = error("let x = 1 + #");
    assert_eq!(
        err,
        Ranged::new(12..13, ParseError::Token(LexerError::UnexpectedChar('#')))
    );

    let source = "f \"unterminated\ng";
    let err = crate::parse(source).unwrap_err();
    assert_eq!(err.kind(), "missing end quote");
    assert!(err
        .to_string()
        .starts_with("the text literal is never closed\n\n 1 | f \"unterminated\n"));
}

#[test]
fn declaration_errors() {
    assert_eq!(error("let = 1").0, ParseError::ExpectedIdentifier);
    assert_eq!(error("let").0, ParseError::ExpectedIdentifier);
    assert_eq!(error("let x 1").0, ParseError::ExpectedAssignment);
    assert_eq!(error("const x += 1").0, ParseError::ExpectedAssignment);
}

#[test]
fn unsupported_syntax() {
    assert_eq!(
        error("[1]").0,
        ParseError::UnsupportedGrouping(Paired::Bracket)
    );
    assert_eq!(
        error("a {").0,
        ParseError::UnsupportedGrouping(Paired::Brace)
    );
    assert_eq!(error("'T").0, ParseError::UnsupportedGeneric);
    assert_eq!(error("a 'T").0, ParseError::GenericAfterExpression);
    assert_eq!(
        error("+").0,
        ParseError::OperatorAsExpression(String::from("+"))
    );
    assert_eq!(
        error("a let").0,
        ParseError::KeywordAfterExpression(Keyword::Let)
    );
    assert_eq!(
        cause(&error("1 + const x = 2")).0,
        ParseError::KeywordAsOperand(Keyword::Const)
    );
}

#[test]
fn paren_balance_errors() {
    let err = error(")");
    assert_eq!(err, Ranged::new(0..1, ParseError::UnexpectedCloseParen));
    assert_eq!(error("1 )").range(), SourceRange::from(2..3));
    assert_eq!(error("(\n)").0, ParseError::UnbalancedIndentation);
}

#[test]
fn dedented_leftovers_are_reported() {
    let err = error("  a\nb");
    assert_eq!(err, Ranged::new(4..5, ParseError::InconsistentIndentation));
}

#[test]
fn nesting_is_limited() {
    let depth = 300;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(
        error(&source).0,
        ParseError::NestingTooDeep(crate::syntax::parser::DEFAULT_MAX_DEPTH)
    );

    let source = vec!["2"; depth].join(" ^ ");
    assert!(matches!(error(&source).0, ParseError::NestingTooDeep(_)));

    let source = vec!["2"; depth].join(" + ");
    assert!(parse(&source).is_ok());
}

fn statements_of(source: &str) -> Vec<String> {
    match parse(source).unwrap().0 {
        Expression::Block(statements) => statements
            .into_iter()
            .map(|statement| statement.0.to_string())
            .collect(),
        other => vec![other.to_string()],
    }
}

#[test]
fn joining_statements_concatenates_blocks() {
    let texts = [
        "let x = 1",
        "f x + 1",
        "1\n+ 2",
        "a\nb",
        "let y =\n    g\n      2",
        "(c)",
        "const z = ()",
    ];
    for first in texts {
        for second in texts.iter().chain(&["(a\nb)"]) {
            let joined = format!("{first}\n{second}");
            let mut expected = statements_of(first);
            expected.extend(statements_of(second));
            assert_eq!(statements_of(&joined), expected, "{joined:?}");
        }
    }
}

#[test]
fn grouped_blocks_join_the_enclosing_sequence() {
    assert_eq!(tree("x\n(a\nb)"), "(block x a b)");
    assert_eq!(tree("let x = 1\n(a\nb)"), "(block (let x 1) a b)");
    assert_eq!(tree("x\n(a\nb)\ny"), "(block x a b y)");

    // A leading group is the first statement of the sequence.
    assert_eq!(tree("(a\nb)\nx"), "(block (block a b) x)");
    // Groups that are operands stay whole.
    assert_eq!(tree("x\n(a\nb) + 1"), "(block x (+ (block a b) 1))");

    let spliced = parse("x\n(a\nb)").unwrap();
    assert_eq!(spliced.range(), SourceRange::from(0..6));
}

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, limit: usize) -> usize {
        usize::try_from(self.next() % limit as u64).unwrap()
    }
}

#[test]
fn random_input_keeps_the_stream_consistent() {
    const FRAGMENTS: &[&str] = &[
        "a", "f", "1", "2.5", "\"t\"", "true", "+", "*", "^", "-", "<>", ",", "(", ")", "()",
        "let", "const", "x", "=", "\n", "\n  ", "\n    ", " ", "// c", "[", "'T", "#", "\"open",
    ];

    let mut rng = XorShift(0x5EED_CAFE_F00D_D00D);
    for _ in 0..5_000 {
        let mut source = String::new();
        for _ in 0..=rng.below(16) {
            source.push_str(FRAGMENTS[rng.below(FRAGMENTS.len())]);
            source.push(' ');
        }

        let mut parser = Parser::new(&source);
        let result = parser.parse_source();
        let tokens = parser.tokens();

        // A pending push back can only ever return the token just read.
        if let Some(index) = tokens.pending_push_back() {
            assert_eq!(index + 1, tokens.position(), "{source:?}");
        }
        assert!(tokens.position() <= tokens.buffered_len(), "{source:?}");

        match result {
            Ok(tree) => {
                assert!(tree.range().end() <= source.len(), "{source:?}");
                assert!(
                    tokens.peek_significant().token.is_none(),
                    "{source:?} left input unread"
                );
                let _ = tree.0.to_string();
            }
            Err(err) => {
                let mut current = Some(&err);
                while let Some(error) = current {
                    let range = error.range();
                    assert!(range.end() <= source.len(), "{source:?}: {err:?}");
                    assert!(
                        range.start <= tokens.scanned_end() || range == tokens.end_of_input(),
                        "{source:?}: {err:?} points past the tokens read"
                    );
                    current = error.cause();
                }
                let rendered = err.diagnostic(&source).to_string();
                assert!(!rendered.is_empty(), "{source:?}");
            }
        }
    }
}
