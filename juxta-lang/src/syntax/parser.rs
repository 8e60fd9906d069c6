//! A layout-aware precedence climbing parser.
//!
//! Line breaks are significant. Where one appears, the column of the next
//! significant token decides what happens:
//!
//! - less than the current block's column: the block ends.
//! - equal: a new statement begins, unless the line starts with an operator,
//!   which continues the previous expression.
//! - greater: the previous expression continues.
//!
//! Only parses in statement position make these decisions. Operands stop at
//! every line break and leave the decision to the statement containing them.
//!
//! Function application is written by juxtaposition (`f x`) and binds like a
//! left-associative operator of precedence 14.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::operator::Binding;
use super::reader::TokenReader;
use super::token::{Keyword, LexerError, Paired, Token};
use super::{
    Application, BinaryExpression, Declaration, Expression, Identifier, Operator, Ranged,
    SourceRange,
};
use crate::ErrorKind;

/// The default limit on how deeply expressions may nest.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings that control a [`Parser`].
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ParseOptions {
    /// The deepest expression nesting accepted before parsing fails with
    /// [`ParseError::NestingTooDeep`].
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parses `source` with the default [`ParseOptions`].
pub fn parse(source: &str) -> Result<Ranged<Expression>, Ranged<ParseError>> {
    Parser::new(source).parse()
}

/// Parses a single source string.
pub struct Parser<'a> {
    tokens: TokenReader<'a>,
    options: ParseOptions,
    open_parens: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Returns a parser for `source`.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    /// Returns a parser for `source` using `options`.
    #[must_use]
    pub fn with_options(source: &'a str, options: ParseOptions) -> Self {
        Self {
            tokens: TokenReader::new(source),
            options,
            open_parens: 0,
            depth: 0,
        }
    }

    /// Parses the entire source.
    ///
    /// Empty input, or input containing only comments, parses as an empty
    /// block.
    pub fn parse(mut self) -> Result<Ranged<Expression>, Ranged<ParseError>> {
        self.parse_source()
    }

    pub(crate) fn parse_source(&mut self) -> Result<Ranged<Expression>, Ranged<ParseError>> {
        let level = self.tokens.peek_significant().column.unwrap_or(0);
        let expression = match self.parse_block(level)? {
            Parsed::Expression(expression) => expression,
            Parsed::EndOfInput | Parsed::LayoutReturn => {
                Ranged::new(SourceRange::empty_at(0), Expression::Block(Vec::new()))
            }
        };
        self.expect_end()?;
        debug!(expression = %expression.0, "parsed");
        Ok(expression)
    }

    fn expect_end(&mut self) -> Result<(), Ranged<ParseError>> {
        match self.tokens.peek_significant().token {
            None => Ok(()),
            Some(Err(err)) => Err(err.into()),
            Some(Ok(Ranged(Token::Close(Paired::Paren), range))) => {
                Err(Ranged::new(range, ParseError::UnexpectedCloseParen))
            }
            Some(Ok(token)) => Err(Ranged::new(
                token.range(),
                ParseError::InconsistentIndentation,
            )),
        }
    }

    /// Parses statements at `level` until the block ends.
    fn parse_block(&mut self, level: usize) -> ParseResult {
        let first = match self.parse_expression(Context::statement(level))? {
            Parsed::Expression(first) => first,
            other => return Ok(other),
        };

        let mut statements = vec![first];
        while self.next_statement(level) {
            match self.parse_expression(Context::statement(level))? {
                // A grouped block that follows another statement continues
                // this block's sequence.
                Parsed::Expression(Ranged(Expression::Block(inner), _)) => {
                    statements.extend(inner);
                }
                Parsed::Expression(statement) => statements.push(statement),
                Parsed::EndOfInput | Parsed::LayoutReturn => break,
            }
        }

        if statements.len() == 1 {
            return Ok(Parsed::Expression(statements.swap_remove(0)));
        }
        let range = statements[0]
            .range()
            .through(statements[statements.len() - 1].range());
        Ok(Parsed::Expression(Ranged::new(
            range,
            Expression::Block(statements),
        )))
    }

    fn next_statement(&mut self, level: usize) -> bool {
        let lookahead = self.tokens.peek_significant();
        match lookahead.column {
            Some(column) if column >= level => {
                self.tokens.commit(&lookahead);
                true
            }
            _ => false,
        }
    }

    fn parse_expression(&mut self, context: Context) -> ParseResult {
        if self.depth >= self.options.max_depth {
            let range = self
                .tokens
                .peek_significant()
                .range()
                .unwrap_or_else(|| self.tokens.end_of_input());
            return Err(Ranged::new(
                range,
                ParseError::NestingTooDeep(self.options.max_depth),
            ));
        }

        self.depth += 1;
        let result = self.parse_term(context);
        self.depth -= 1;
        result
    }

    fn parse_term(&mut self, context: Context) -> ParseResult {
        loop {
            let Some(token) = self.tokens.next() else {
                return Ok(Parsed::EndOfInput);
            };
            let Ranged(token, range) = token?;
            let primary = match token {
                Token::Comment => continue,
                Token::NewLine => {
                    self.tokens.push_back();
                    let lookahead = self.tokens.peek_significant();
                    if lookahead
                        .column
                        .map_or(false, |column| column < context.level)
                    {
                        trace!(level = context.level, "block closed by indentation");
                        return Ok(Parsed::LayoutReturn);
                    }
                    self.tokens.commit(&lookahead);
                    continue;
                }
                Token::Keyword(keyword) if context.statement => {
                    return self
                        .parse_declaration(Ranged::new(range, keyword))
                        .map(Parsed::Expression);
                }
                Token::Keyword(keyword) => {
                    return Err(Ranged::new(range, ParseError::KeywordAsOperand(keyword)))
                }
                Token::Identifier(name) => {
                    Ranged::new(range, Expression::Identifier(Identifier::new(name)))
                }
                Token::Number(number) => Ranged::new(range, Expression::Number(number)),
                Token::Text(text) => Ranged::new(range, Expression::Text(text)),
                Token::Bool(value) => Ranged::new(range, Expression::Bool(value)),
                Token::Open(Paired::Paren) => self.parse_group(range)?,
                Token::Close(Paired::Paren) => {
                    if self.open_parens > 0 {
                        self.tokens.push_back();
                        return Ok(Parsed::LayoutReturn);
                    }
                    return Err(Ranged::new(range, ParseError::UnexpectedCloseParen));
                }
                Token::Open(paired) | Token::Close(paired) => {
                    return Err(Ranged::new(range, ParseError::UnsupportedGrouping(paired)))
                }
                Token::Generic(_) => {
                    return Err(Ranged::new(range, ParseError::UnsupportedGeneric))
                }
                Token::Operator(symbol) => {
                    return Err(Ranged::new(
                        range,
                        ParseError::OperatorAsExpression(symbol),
                    ))
                }
            };

            return self
                .continue_expression(primary, context)
                .map(Parsed::Expression);
        }
    }

    /// Extends `lhs` with operators, applications, and continuation lines
    /// until something that belongs to an enclosing expression is found.
    fn continue_expression(
        &mut self,
        mut lhs: Ranged<Expression>,
        context: Context,
    ) -> Result<Ranged<Expression>, Ranged<ParseError>> {
        loop {
            let Some(token) = self.tokens.next() else {
                return Ok(lhs);
            };
            let Ranged(token, range) = token?;
            lhs = match token {
                Token::Comment => continue,
                Token::Operator(symbol) => {
                    let operator = Ranged::new(range, Operator::new(symbol));
                    if !context.accepts(operator.binding) {
                        self.tokens.push_back();
                        return Ok(lhs);
                    }
                    self.parse_infix(lhs, operator, context)?
                }
                Token::Identifier(_)
                | Token::Number(_)
                | Token::Text(_)
                | Token::Bool(_)
                | Token::Open(Paired::Paren) => {
                    self.tokens.push_back();
                    if !context.accepts(Binding::APPLICATION) {
                        return Ok(lhs);
                    }
                    self.parse_application(lhs, context)?
                }
                Token::NewLine => {
                    self.tokens.push_back();
                    match self.line_break(context) {
                        LineBreak::Continue => continue,
                        LineBreak::End => return Ok(lhs),
                    }
                }
                Token::Close(Paired::Paren) => {
                    self.tokens.push_back();
                    return Ok(lhs);
                }
                Token::Keyword(keyword) => {
                    return Err(Ranged::new(
                        range,
                        ParseError::KeywordAfterExpression(keyword),
                    ))
                }
                Token::Generic(_) => {
                    return Err(Ranged::new(range, ParseError::GenericAfterExpression))
                }
                Token::Open(paired) | Token::Close(paired) => {
                    return Err(Ranged::new(range, ParseError::UnsupportedGrouping(paired)))
                }
            };
        }
    }

    /// Decides what the line break at the front of the stream means for the
    /// expression being parsed in `context`.
    fn line_break(&mut self, context: Context) -> LineBreak {
        if !context.statement {
            return LineBreak::End;
        }

        let lookahead = self.tokens.peek_significant();
        let Some(column) = lookahead.column else {
            return LineBreak::End;
        };

        let decision = if column > context.level
            || (column == context.level && lookahead.is_operator())
        {
            self.tokens.commit(&lookahead);
            LineBreak::Continue
        } else {
            LineBreak::End
        };
        trace!(column, level = context.level, ?decision, "line break");
        decision
    }

    fn parse_infix(
        &mut self,
        left: Ranged<Expression>,
        operator: Ranged<Operator>,
        context: Context,
    ) -> Result<Ranged<Expression>, Ranged<ParseError>> {
        let right = match self.parse_expression(context.operand(operator.binding)) {
            Ok(Parsed::Expression(right)) => right,
            Ok(Parsed::EndOfInput | Parsed::LayoutReturn) => {
                return Err(Ranged::new(
                    operator.range(),
                    ParseError::ExpectedOperand {
                        operator: operator.symbol.clone(),
                        cause: None,
                    },
                ))
            }
            Err(err) if err.propagates_unchanged() => return Err(err),
            Err(err) => {
                return Err(Ranged::new(
                    operator.range(),
                    ParseError::ExpectedOperand {
                        operator: operator.symbol.clone(),
                        cause: Some(Box::new(err)),
                    },
                ))
            }
        };

        Ok(Ranged::new(
            left.range().through(right.range()),
            Expression::Binary(Box::new(BinaryExpression {
                operator,
                left,
                right,
            })),
        ))
    }

    fn parse_application(
        &mut self,
        function: Ranged<Expression>,
        context: Context,
    ) -> Result<Ranged<Expression>, Ranged<ParseError>> {
        let anchor = SourceRange::empty_at(function.range().end());
        let argument = match self.parse_expression(context.operand(Binding::APPLICATION)) {
            Ok(Parsed::Expression(argument)) => argument,
            Ok(Parsed::EndOfInput | Parsed::LayoutReturn) => {
                return Err(Ranged::new(
                    anchor,
                    ParseError::ExpectedArgument { cause: None },
                ))
            }
            Err(err) if err.propagates_unchanged() => return Err(err),
            Err(err) => {
                return Err(Ranged::new(
                    anchor,
                    ParseError::ExpectedArgument {
                        cause: Some(Box::new(err)),
                    },
                ))
            }
        };

        Ok(Ranged::new(
            function.range().through(argument.range()),
            Expression::Apply(Box::new(Application {
                function,
                argument,
                curried: false,
                anchor,
            })),
        ))
    }

    fn parse_declaration(
        &mut self,
        keyword: Ranged<Keyword>,
    ) -> Result<Ranged<Expression>, Ranged<ParseError>> {
        let level = self.tokens.column(keyword.range().start);

        let name = match self.tokens.next() {
            Some(Ok(Ranged(Token::Identifier(name), range))) => {
                Ranged::new(range, Identifier::new(name))
            }
            Some(Ok(other)) => {
                return Err(Ranged::new(other.range(), ParseError::ExpectedIdentifier))
            }
            Some(Err(err)) => return Err(err.into()),
            None => {
                return Err(Ranged::new(
                    self.tokens.end_of_input(),
                    ParseError::ExpectedIdentifier,
                ))
            }
        };

        let assignment = match self.tokens.next() {
            Some(Ok(Ranged(Token::Operator(symbol), range))) if symbol == "=" => range,
            Some(Ok(other)) => {
                return Err(Ranged::new(other.range(), ParseError::ExpectedAssignment))
            }
            Some(Err(err)) => return Err(err.into()),
            None => {
                return Err(Ranged::new(
                    self.tokens.end_of_input(),
                    ParseError::ExpectedAssignment,
                ))
            }
        };

        let lookahead = self.tokens.peek_significant();
        let body_level = match (lookahead.column, lookahead.range()) {
            (Some(column), Some(range)) if lookahead.crossed_newline && column <= level => {
                return Err(Ranged::new(range, ParseError::ExpectedIndentedExpression));
            }
            (Some(column), _) => {
                self.tokens.commit(&lookahead);
                column
            }
            (None, _) => level + 1,
        };

        let value = match self.parse_block(body_level) {
            Ok(Parsed::Expression(value)) => value,
            Ok(Parsed::EndOfInput | Parsed::LayoutReturn) => {
                return Err(Ranged::new(
                    assignment,
                    ParseError::ExpectedInitializer { cause: None },
                ))
            }
            Err(err) if err.propagates_unchanged() => return Err(err),
            Err(err) => {
                return Err(Ranged::new(
                    assignment,
                    ParseError::ExpectedInitializer {
                        cause: Some(Box::new(err)),
                    },
                ))
            }
        };

        Ok(Ranged::new(
            keyword.range().through(value.range()),
            Expression::Declaration(Box::new(Declaration {
                mutable: keyword.0 == Keyword::Let,
                name,
                value,
            })),
        ))
    }

    /// Parses the remainder of a group whose `(` is at `open`.
    fn parse_group(&mut self, open: SourceRange) -> Result<Ranged<Expression>, Ranged<ParseError>> {
        self.open_parens += 1;
        let result = self.parse_group_contents(open);
        self.open_parens -= 1;
        result
    }

    fn parse_group_contents(
        &mut self,
        open: SourceRange,
    ) -> Result<Ranged<Expression>, Ranged<ParseError>> {
        match self.tokens.next() {
            Some(Ok(Ranged(Token::Close(Paired::Paren), close))) => {
                return Ok(Ranged::new(
                    open.through(close),
                    Expression::Identifier(Identifier::unit()),
                ));
            }
            Some(Ok(_)) => self.tokens.push_back(),
            Some(Err(err)) => return Err(self.unclosed_paren(open, false, Some(err.0))),
            None => return Err(self.unclosed_paren(open, false, None)),
        }

        let inner = match self.parse_block(0)? {
            Parsed::Expression(inner) => inner,
            Parsed::LayoutReturn => {
                return Err(Ranged::new(open, ParseError::UnbalancedIndentation))
            }
            Parsed::EndOfInput => return Err(self.unclosed_paren(open, false, None)),
        };

        let lookahead = self.tokens.peek_significant();
        self.tokens.commit(&lookahead);
        match self.tokens.next() {
            Some(Ok(Ranged(Token::Close(Paired::Paren), _))) => Ok(inner),
            Some(Ok(other)) => Err(Ranged::new(other.range(), ParseError::ExpectedCloseParen)),
            Some(Err(err)) => Err(self.unclosed_paren(open, true, Some(err.0))),
            None => Err(self.unclosed_paren(open, true, None)),
        }
    }

    fn unclosed_paren(
        &self,
        open: SourceRange,
        contains_expression: bool,
        cause: Option<LexerError>,
    ) -> Ranged<ParseError> {
        Ranged::new(
            open,
            ParseError::UnclosedParen {
                line: self.tokens.lines().locate(open.start).line,
                column: self.tokens.column(open.start),
                contains_expression,
                cause,
            },
        )
    }
}

type ParseResult = Result<Parsed, Ranged<ParseError>>;

/// The outcome of a parse that did not fail.
#[derive(Debug)]
enum Parsed {
    /// An expression was parsed.
    Expression(Ranged<Expression>),
    /// The input ended before an expression began.
    EndOfInput,
    /// The enclosing construct ended before an expression began.
    LayoutReturn,
}

/// What a parse inherits from its caller.
#[derive(Clone, Copy, Debug)]
struct Context {
    /// The column of the enclosing block.
    level: usize,
    /// Operators must bind tighter than this to extend the expression.
    floor: u8,
    /// True at the start of a block or a declaration's value, where line breaks
    /// are interpreted.
    statement: bool,
}

impl Context {
    const fn statement(level: usize) -> Self {
        Self {
            level,
            floor: 0,
            statement: true,
        }
    }

    const fn operand(self, binding: Binding) -> Self {
        Self {
            level: self.level,
            floor: binding.precedence,
            statement: false,
        }
    }

    fn accepts(self, binding: Binding) -> bool {
        binding.binds_above(self.floor)
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
enum LineBreak {
    Continue,
    End,
}

/// An error that prevents source from being parsed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ParseError {
    /// The source could not be tokenized.
    Token(LexerError),
    /// A `let` or `const` was not followed by a name.
    ExpectedIdentifier,
    /// A declared name was not followed by `=`.
    ExpectedAssignment,
    /// A declaration's value starts on a later line without being indented
    /// past the declaration.
    ExpectedIndentedExpression,
    /// A declaration has no value.
    ExpectedInitializer {
        /// The error raised parsing the value.
        cause: Option<Box<Ranged<ParseError>>>,
    },
    /// An operator has no right operand.
    ExpectedOperand {
        /// The operator missing its operand.
        operator: String,
        /// The error raised parsing the operand.
        cause: Option<Box<Ranged<ParseError>>>,
    },
    /// A function application's argument could not be parsed.
    ExpectedArgument {
        /// The error raised parsing the argument.
        cause: Option<Box<Ranged<ParseError>>>,
    },
    /// A keyword directly follows an expression.
    KeywordAfterExpression(Keyword),
    /// A declaration appears where an operand is expected.
    KeywordAsOperand(Keyword),
    /// A generic marker directly follows an expression.
    GenericAfterExpression,
    /// Generic markers are not supported.
    UnsupportedGeneric,
    /// Only parentheses are supported for grouping.
    UnsupportedGrouping(Paired),
    /// An operator appears where an expression is expected.
    OperatorAsExpression(String),
    /// A `)` has no matching `(`.
    UnexpectedCloseParen,
    /// A `(` has no matching `)`.
    UnclosedParen {
        /// The 1-based line of the `(`.
        line: usize,
        /// The 0-based column of the `(`.
        column: usize,
        /// True if an expression was parsed inside the group.
        contains_expression: bool,
        /// The lexical error found where the `)` was expected.
        cause: Option<LexerError>,
    },
    /// A group ended without its `)`.
    UnbalancedIndentation,
    /// A group's expression is followed by something other than `)`.
    ExpectedCloseParen,
    /// Input remains that is indented less than the first statement.
    InconsistentIndentation,
    /// Expressions are nested more deeply than the contained limit.
    NestingTooDeep(usize),
}

impl ParseError {
    /// Returns the error this error wraps, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Ranged<ParseError>> {
        match self {
            ParseError::ExpectedInitializer { cause }
            | ParseError::ExpectedOperand { cause, .. }
            | ParseError::ExpectedArgument { cause } => cause.as_deref(),
            _ => None,
        }
    }

    /// Returns true for errors that are never wrapped with additional
    /// context as they propagate.
    #[must_use]
    pub const fn propagates_unchanged(&self) -> bool {
        matches!(self, ParseError::Token(_) | ParseError::NestingTooDeep(_))
    }
}

impl ErrorKind for ParseError {
    fn kind(&self) -> &'static str {
        match self {
            ParseError::Token(err) => err.kind(),
            ParseError::ExpectedIdentifier => "expected identifier",
            ParseError::ExpectedAssignment => "expected assignment",
            ParseError::ExpectedIndentedExpression => "expected indented expression",
            ParseError::ExpectedInitializer { .. } => "expected initializer",
            ParseError::ExpectedOperand { .. } => "expected operand",
            ParseError::ExpectedArgument { .. } => "expected argument",
            ParseError::KeywordAfterExpression(_) => "keyword after expression",
            ParseError::KeywordAsOperand(_) => "keyword as operand",
            ParseError::GenericAfterExpression => "generic after expression",
            ParseError::UnsupportedGeneric => "unsupported generic",
            ParseError::UnsupportedGrouping(_) => "unsupported grouping",
            ParseError::OperatorAsExpression(_) => "operator as expression",
            ParseError::UnexpectedCloseParen => "unexpected close paren",
            ParseError::UnclosedParen { .. } => "unclosed paren",
            ParseError::UnbalancedIndentation => "unbalanced indentation",
            ParseError::ExpectedCloseParen => "expected close paren",
            ParseError::InconsistentIndentation => "inconsistent indentation",
            ParseError::NestingTooDeep(_) => "nesting too deep",
        }
    }
}

impl std::error::Error for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Token(err) => Display::fmt(err, f),
            ParseError::ExpectedIdentifier => f.write_str("expected an identifier"),
            ParseError::ExpectedAssignment => {
                f.write_str("expected the assignment operator `=` after the identifier")
            }
            ParseError::ExpectedIndentedExpression => f.write_str(
                "the current expression is incomplete: expected an indented expression",
            ),
            ParseError::ExpectedInitializer { .. } => {
                f.write_str("expected an expression after the assignment")
            }
            ParseError::ExpectedOperand { operator, .. } => write!(
                f,
                "expected an expression to the right of the operator `{operator}`"
            ),
            ParseError::ExpectedArgument { .. } => {
                f.write_str("expected an argument for the function application")
            }
            ParseError::KeywordAfterExpression(keyword) => {
                write!(f, "`{keyword}` cannot follow an expression on the same line")
            }
            ParseError::KeywordAsOperand(keyword) => {
                write!(f, "a `{keyword}` declaration cannot be used as an operand")
            }
            ParseError::GenericAfterExpression => {
                f.write_str("a generic was not expected after the expression")
            }
            ParseError::UnsupportedGeneric => f.write_str("generics are not supported yet"),
            ParseError::UnsupportedGrouping(paired) => write!(
                f,
                "grouping with `{}{}` is not supported yet",
                paired.as_open(),
                paired.as_close()
            ),
            ParseError::OperatorAsExpression(operator) => write!(
                f,
                "an operator cannot be used as an expression. To refer to the operator itself, \
                 wrap it in parentheses, for example: ({operator})"
            ),
            ParseError::UnexpectedCloseParen => {
                f.write_str("unexpected closing paren: there is no open paren to close")
            }
            ParseError::UnclosedParen {
                line,
                column,
                contains_expression: true,
                ..
            } => write!(
                f,
                "the paren opened at {line},{column} contains an expression, but is never closed"
            ),
            ParseError::UnclosedParen { line, column, .. } => {
                write!(f, "the paren opened at {line},{column} is never closed")
            }
            ParseError::UnbalancedIndentation => {
                f.write_str("indentation error: the paren was never closed")
            }
            ParseError::ExpectedCloseParen => f.write_str("expected a closing paren"),
            ParseError::InconsistentIndentation => f.write_str(
                "this line is indented less than the first statement, so it belongs to no block",
            ),
            ParseError::NestingTooDeep(limit) => {
                write!(f, "expressions are nested more than {limit} levels deep")
            }
        }
    }
}

impl From<Ranged<LexerError>> for Ranged<ParseError> {
    fn from(err: Ranged<LexerError>) -> Self {
        err.map(ParseError::Token)
    }
}

#[cfg(test)]
impl<'a> Parser<'a> {
    pub(crate) fn tokens(&mut self) -> &mut TokenReader<'a> {
        &mut self.tokens
    }
}

#[cfg(test)]
fn parse_block_of(source: &str) -> (Parser<'_>, Parsed) {
    let mut parser = Parser::new(source);
    let parsed = parser.parse_block(0).unwrap();
    (parser, parsed)
}

#[test]
fn groups_close_their_parens() {
    for source in ["(1)", "()", "((a) (b))"] {
        let (parser, parsed) = parse_block_of(source);
        assert!(matches!(parsed, Parsed::Expression(_)), "{source}");
        assert_eq!(parser.open_parens, 0, "{source}");
        assert_eq!(parser.depth, 0, "{source}");
    }
}

#[test]
fn close_paren_returns_to_group() {
    let mut parser = Parser::new(")");
    parser.open_parens = 1;
    assert!(matches!(
        parser.parse_block(0).unwrap(),
        Parsed::LayoutReturn
    ));
    // The paren is left for the group to consume.
    assert!(matches!(
        parser.tokens.next(),
        Some(Ok(Ranged(Token::Close(Paired::Paren), _)))
    ));
}

#[test]
fn dedent_returns_from_block() {
    let mut parser = Parser::new("a\nb");
    parser.tokens.next();
    assert!(matches!(
        parser.parse_expression(Context::statement(2)).unwrap(),
        Parsed::LayoutReturn
    ));
}

#[test]
fn empty_input_is_end_of_input() {
    let (_, parsed) = parse_block_of("// nothing\n\n");
    assert!(matches!(parsed, Parsed::EndOfInput));
}

#[test]
fn depth_limit() {
    let options = ParseOptions { max_depth: 3 };
    assert!(Parser::with_options("((a))", options).parse().is_ok());
    let err = Parser::with_options("(((a)))", options)
        .parse()
        .unwrap_err();
    assert_eq!(err.0, ParseError::NestingTooDeep(3));
    assert_eq!(err.range(), SourceRange::from(3..4));
}
