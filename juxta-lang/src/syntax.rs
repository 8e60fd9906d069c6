//! Source positions and the abstract syntax tree.

use std::fmt::{self, Display};
use std::ops::{Bound, Deref, DerefMut, Range, RangeBounds};

use serde::{Deserialize, Serialize};

pub use self::diagnostic::{caret_diagram, Diagnostic};
pub use self::operator::{Associativity, Binding};
pub use self::parser::{parse, ParseError, ParseOptions, Parser};
use self::token::Keyword;

pub mod diagnostic;
pub mod operator;
pub mod parser;
pub mod reader;
pub mod token;

/// A value tagged with the range of source it was parsed from.
#[derive(Default, Clone, Copy, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Ranged<T>(pub T, pub SourceRange);

impl<T> Ranged<T> {
    pub fn new(range: impl Into<SourceRange>, value: T) -> Self {
        Self(value, range.into())
    }

    /// Returns `value` tagged with `range`, using `end` for an unbounded end.
    pub fn bounded(range: impl RangeBounds<usize>, end: usize, value: T) -> Ranged<T> {
        let start = match range.start_bound() {
            Bound::Included(start) => *start,
            Bound::Excluded(start) => start + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(end) => end + 1,
            Bound::Excluded(end) => *end,
            Bound::Unbounded => end,
        };
        Ranged(
            value,
            SourceRange {
                start,
                length: end.saturating_sub(start),
            },
        )
    }

    pub fn map<U>(self, map: impl FnOnce(T) -> U) -> Ranged<U> {
        Ranged(map(self.0), self.1)
    }

    pub const fn range(&self) -> SourceRange {
        self.1
    }
}

impl<T> Deref for Ranged<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Ranged<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// A byte range within a source string.
#[derive(Default, Clone, Copy, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct SourceRange {
    /// The byte offset of the first byte in this range.
    pub start: usize,
    /// The number of bytes in this range.
    pub length: usize,
}

impl SourceRange {
    /// Returns the exclusive end offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.length
    }

    /// Returns an empty range positioned at `offset`.
    #[must_use]
    pub const fn empty_at(offset: usize) -> Self {
        Self {
            start: offset,
            length: 0,
        }
    }

    /// Returns a range covering from the start of `self` to the end of
    /// `other`.
    #[must_use]
    pub fn through(self, other: SourceRange) -> Self {
        Self::from(self.start..other.end().max(self.start))
    }
}

impl From<Range<usize>> for SourceRange {
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            length: range.end - range.start,
        }
    }
}

/// The line a source offset falls on.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct LinePosition {
    /// The 1-based line number.
    pub line: usize,
    /// The byte offset the line starts at.
    pub line_start: usize,
}

/// An index of where each line of a source string begins.
#[derive(Clone, Debug)]
pub struct SourceLines {
    line_starts: Vec<usize>,
}

impl SourceLines {
    /// Indexes the lines of `source`.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(index, _)| index + 1));
        Self { line_starts }
    }

    /// Returns the line containing `offset`.
    #[must_use]
    pub fn locate(&self, offset: usize) -> LinePosition {
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .max(1);
        LinePosition {
            line,
            line_start: self.line_starts[line - 1],
        }
    }

    /// Returns the 0-based column, in characters, of `offset` within `source`.
    #[must_use]
    pub fn column(&self, source: &str, offset: usize) -> usize {
        let line_start = self.locate(offset).line_start;
        source
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count())
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A name, or the unit literal `()`.
    Identifier(Identifier),
    /// A numeric literal, kept as written.
    Number(String),
    /// A text literal.
    Text(String),
    /// A boolean literal.
    Bool(bool),
    /// Statements sharing an indentation level, evaluated in order.
    Block(Vec<Ranged<Expression>>),
    /// A `let` or `const` binding.
    Declaration(Box<Declaration>),
    /// An infix operator applied to two operands.
    Binary(Box<BinaryExpression>),
    /// A function applied to an argument by juxtaposition.
    Apply(Box<Application>),
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(identifier) => f.write_str(&identifier.name),
            Expression::Number(number) => f.write_str(number),
            Expression::Text(text) => write!(f, "{text:?}"),
            Expression::Bool(value) => write!(f, "{value}"),
            Expression::Block(statements) => {
                f.write_str("(block")?;
                for statement in statements {
                    write!(f, " {}", statement.0)?;
                }
                f.write_str(")")
            }
            Expression::Declaration(declaration) => write!(
                f,
                "({} {} {})",
                declaration.keyword(),
                declaration.name.name,
                declaration.value.0
            ),
            Expression::Binary(binary) => write!(
                f,
                "({} {} {})",
                binary.operator.symbol, binary.left.0, binary.right.0
            ),
            Expression::Apply(application) => write!(
                f,
                "({} {} {})",
                if application.curried { "curry" } else { "apply" },
                application.function.0,
                application.argument.0
            ),
        }
    }
}

/// A reference to a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// The name as written.
    pub name: String,
    /// The type of the value this name refers to.
    pub signature: Signature,
}

impl Identifier {
    /// The name given to the unit literal.
    pub const UNIT: &'static str = "()";

    /// Returns an identifier whose signature is not yet known.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: Signature::default(),
        }
    }

    /// Returns the unit literal `()`.
    #[must_use]
    pub fn unit() -> Self {
        Self::new(Self::UNIT)
    }

    /// Returns true if this is the unit literal.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.name == Self::UNIT
    }
}

/// Type information attached to an identifier.
///
/// Signatures are only ever [`Signature::Undetermined`] after parsing. Type
/// inference replaces them.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signature {
    /// No type has been assigned yet.
    #[default]
    Undetermined,
}

/// An infix operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    /// The operator as written.
    pub symbol: String,
    /// How tightly this operator binds its operands.
    pub binding: Binding,
}

impl Operator {
    /// Looks up the binding of `symbol` and returns the operator.
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let binding = Binding::of(&symbol);
        Self { symbol, binding }
    }
}

/// A `let` or `const` binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// True for `let`, false for `const`.
    pub mutable: bool,
    /// The name being bound.
    pub name: Ranged<Identifier>,
    /// The initial value.
    pub value: Ranged<Expression>,
}

impl Declaration {
    /// Returns the keyword this declaration was written with.
    #[must_use]
    pub const fn keyword(&self) -> Keyword {
        if self.mutable {
            Keyword::Let
        } else {
            Keyword::Const
        }
    }
}

/// An infix operator expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    /// The operator and where it was written.
    pub operator: Ranged<Operator>,
    /// The left operand.
    pub left: Ranged<Expression>,
    /// The right operand.
    pub right: Ranged<Expression>,
}

/// A function applied to a single argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// The function being applied.
    pub function: Ranged<Expression>,
    /// The argument.
    pub argument: Ranged<Expression>,
    /// Marks a curried application. The parser never sets this; it is
    /// reserved for later stages.
    pub curried: bool,
    /// An empty range at the end of `function`, where the implicit
    /// application operator sits.
    pub anchor: SourceRange,
}

#[test]
fn source_lines() {
    let source = "a\nbc\r\n\nλx";
    let lines = SourceLines::new(source);
    assert_eq!(
        lines.locate(0),
        LinePosition {
            line: 1,
            line_start: 0
        }
    );
    assert_eq!(
        lines.locate(3),
        LinePosition {
            line: 2,
            line_start: 2
        }
    );
    assert_eq!(lines.locate(6).line, 3);
    assert_eq!(lines.locate(7).line, 4);
    assert_eq!(lines.column(source, 3), 1);
    // λ is two bytes wide but one column.
    assert_eq!(lines.column(source, 9), 1);
}
