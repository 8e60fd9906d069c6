//! Splits source text into [`Token`]s.

use std::fmt::{self, Display};
use std::iter::Peekable;
use std::ops::RangeBounds;
use std::str::CharIndices;

use serde::{Deserialize, Serialize};

use super::Ranged;
use crate::ErrorKind;

/// A lexical unit of source code.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// A `//` comment, running to the end of the line.
    Comment,
    /// A line break.
    NewLine,
    /// A name.
    Identifier(String),
    /// A numeric literal, as written.
    Number(String),
    /// A text literal with its escapes decoded.
    Text(String),
    /// `true` or `false`.
    Bool(bool),
    /// A run of operator characters.
    Operator(String),
    /// A generic marker such as `'a`.
    Generic(String),
    /// A reserved word.
    Keyword(Keyword),
    /// An opening grouping symbol.
    Open(Paired),
    /// A closing grouping symbol.
    Close(Paired),
}

/// A keyword.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub enum Keyword {
    /// `let`, introducing a mutable binding.
    Let,
    /// `const`, introducing an immutable binding.
    Const,
}

impl Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Keyword::Let => "let",
            Keyword::Const => "const",
        })
    }
}

/// A kind of grouping symbol.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub enum Paired {
    /// `(` and `)`.
    Paren,
    /// `[` and `]`.
    Bracket,
    /// `{` and `}`.
    Brace,
}

impl Paired {
    /// Returns the opening character.
    #[must_use]
    pub const fn as_open(self) -> char {
        match self {
            Paired::Paren => '(',
            Paired::Bracket => '[',
            Paired::Brace => '{',
        }
    }

    /// Returns the closing character.
    #[must_use]
    pub const fn as_close(self) -> char {
        match self {
            Paired::Paren => ')',
            Paired::Bracket => ']',
            Paired::Brace => '}',
        }
    }
}

struct Chars<'a> {
    source: Peekable<CharIndices<'a>>,
    last_index: usize,
}

impl<'a> Chars<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source: source.char_indices().peekable(),
            last_index: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.source.peek().map(|(_, ch)| *ch)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.source.clone();
        ahead.next();
        ahead.next().map(|(_, ch)| ch)
    }

    fn next_if(&mut self, predicate: impl FnOnce(char) -> bool) -> Option<char> {
        self.source
            .next_if(|(_, ch)| predicate(*ch))
            .map(|(offset, ch)| {
                self.last_index = offset + ch.len_utf8();
                ch
            })
    }

    fn ranged<T>(&self, range: impl RangeBounds<usize>, value: T) -> Ranged<T> {
        Ranged::bounded(range, self.last_index, value)
    }
}

impl Iterator for Chars<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, char) = self.source.next()?;
        self.last_index = offset + char.len_utf8();
        Some((offset, char))
    }
}

/// Returns true if `ch` can appear in an operator.
#[must_use]
pub fn is_operator_char(ch: char) -> bool {
    matches!(
        ch,
        '+' | '-'
            | '*'
            | '/'
            | '%'
            | '^'
            | '='
            | '<'
            | '>'
            | '!'
            | '|'
            | '&'
            | '?'
            | '.'
            | ':'
            | '~'
            | '@'
            | '$'
            | '\\'
    )
}

/// An iterator over the tokens of a source string.
pub struct Tokens<'a> {
    chars: Chars<'a>,
    scratch: String,
}

impl Iterator for Tokens<'_> {
    type Item = Result<Ranged<Token>, Ranged<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            break Some(match self.chars.next()? {
                (start, '\n') => Ok(self.chars.ranged(start.., Token::NewLine)),
                (start, '\r') if self.chars.peek() == Some('\n') => {
                    self.chars.next();
                    Ok(self.chars.ranged(start.., Token::NewLine))
                }
                (_, ch) if ch.is_whitespace() => continue,
                (start, '/') if self.chars.peek() == Some('/') => {
                    Ok(self.tokenize_comment(start))
                }
                (start, '"') => self.tokenize_text(start),
                (start, '\'') => {
                    if let Some(ch) = self.chars.next_if(unicode_ident::is_xid_start) {
                        Ok(self.tokenize_name(start, ch).map(Token::Generic))
                    } else {
                        Err(self.chars.ranged(start.., LexerError::UnexpectedChar('\'')))
                    }
                }
                (start, '(') => Ok(self.chars.ranged(start.., Token::Open(Paired::Paren))),
                (start, ')') => Ok(self.chars.ranged(start.., Token::Close(Paired::Paren))),
                (start, '[') => Ok(self.chars.ranged(start.., Token::Open(Paired::Bracket))),
                (start, ']') => Ok(self.chars.ranged(start.., Token::Close(Paired::Bracket))),
                (start, '{') => Ok(self.chars.ranged(start.., Token::Open(Paired::Brace))),
                (start, '}') => Ok(self.chars.ranged(start.., Token::Close(Paired::Brace))),
                (start, ',') => Ok(self.chars.ranged(start.., Token::Operator(String::from(",")))),
                (start, ch) if ch.is_ascii_digit() => Ok(self.tokenize_number(start, ch)),
                (start, ch) if is_operator_char(ch) => Ok(self.tokenize_operator(start, ch)),
                (start, ch) if ch == '_' || unicode_ident::is_xid_start(ch) => {
                    Ok(self.tokenize_identifier(start, ch))
                }
                (start, ch) => Err(self.chars.ranged(start.., LexerError::UnexpectedChar(ch))),
            });
        }
    }
}

impl<'a> Tokens<'a> {
    /// Returns an iterator over the tokens in `source`.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: Chars::new(source),
            scratch: String::new(),
        }
    }

    fn tokenize_number(&mut self, start: usize, start_char: char) -> Ranged<Token> {
        self.scratch.clear();
        self.scratch.push(start_char);
        while let Some(ch) = self.chars.next_if(|ch| ch.is_ascii_digit()) {
            self.scratch.push(ch);
        }

        if self.chars.peek() == Some('.')
            && self.chars.peek_second().map_or(false, |ch| ch.is_ascii_digit())
        {
            self.chars.next();
            self.scratch.push('.');
            while let Some(ch) = self.chars.next_if(|ch| ch.is_ascii_digit()) {
                self.scratch.push(ch);
            }
        }

        self.chars
            .ranged(start.., Token::Number(self.scratch.clone()))
    }

    fn tokenize_operator(&mut self, start: usize, start_char: char) -> Ranged<Token> {
        self.scratch.clear();
        self.scratch.push(start_char);
        while self.chars.peek().map_or(false, is_operator_char)
            && !(self.chars.peek() == Some('/') && self.chars.peek_second() == Some('/'))
        {
            let Some((_, ch)) = self.chars.next() else {
                break;
            };
            self.scratch.push(ch);
        }

        self.chars
            .ranged(start.., Token::Operator(self.scratch.clone()))
    }

    fn tokenize_name(&mut self, start: usize, start_char: char) -> Ranged<String> {
        self.scratch.clear();
        self.scratch.push(start_char);
        while let Some(ch) = self.chars.next_if(unicode_ident::is_xid_continue) {
            self.scratch.push(ch);
        }

        self.chars.ranged(start.., self.scratch.clone())
    }

    fn tokenize_identifier(&mut self, start: usize, start_char: char) -> Ranged<Token> {
        self.tokenize_name(start, start_char)
            .map(|name| match name.as_str() {
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                "let" => Token::Keyword(Keyword::Let),
                "const" => Token::Keyword(Keyword::Const),
                _ => Token::Identifier(name),
            })
    }

    fn tokenize_comment(&mut self, start: usize) -> Ranged<Token> {
        while self
            .chars
            .next_if(|ch| !matches!(ch, '\r' | '\n'))
            .is_some()
        {}
        self.chars.ranged(start.., Token::Comment)
    }

    fn tokenize_text(&mut self, start: usize) -> Result<Ranged<Token>, Ranged<LexerError>> {
        self.scratch.clear();
        loop {
            if self.chars.peek() == Some('\n') {
                return Err(self
                    .chars
                    .ranged(start..self.chars.last_index, LexerError::MissingEndQuote));
            }
            match self.chars.next() {
                Some((_, '"')) => break,
                Some((index, '\\')) => match self.chars.next() {
                    Some((_, '"')) => self.scratch.push('"'),
                    Some((_, 'n')) => self.scratch.push('\n'),
                    Some((_, 'r')) => self.scratch.push('\r'),
                    Some((_, 't')) => self.scratch.push('\t'),
                    Some((_, '\\')) => self.scratch.push('\\'),
                    Some((_, '0')) => self.scratch.push('\0'),
                    _ => {
                        return Err(self
                            .chars
                            .ranged(index.., LexerError::InvalidEscapeSequence))
                    }
                },
                Some((_, ch)) => self.scratch.push(ch),
                None => {
                    return Err(self
                        .chars
                        .ranged(start.., LexerError::MissingEndQuote))
                }
            }
        }

        Ok(self
            .chars
            .ranged(start.., Token::Text(self.scratch.clone())))
    }
}

/// An error turning source text into tokens.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum LexerError {
    /// A character that cannot start any token.
    UnexpectedChar(char),
    /// A text literal was not closed before the end of its line.
    MissingEndQuote,
    /// An unknown escape sequence in a text literal.
    InvalidEscapeSequence,
}

impl ErrorKind for LexerError {
    fn kind(&self) -> &'static str {
        match self {
            LexerError::UnexpectedChar(_) => "unexpected char",
            LexerError::MissingEndQuote => "missing end quote",
            LexerError::InvalidEscapeSequence => "invalid escape sequence",
        }
    }
}

impl std::error::Error for LexerError {}

impl Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedChar(ch) => write!(f, "unexpected character {ch:?}"),
            LexerError::MissingEndQuote => f.write_str("the text literal is never closed"),
            LexerError::InvalidEscapeSequence => f.write_str("invalid escape sequence"),
        }
    }
}

#[cfg(test)]
fn tokens(source: &str) -> Vec<Ranged<Token>> {
    Tokens::new(source)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn basics() {
    assert_eq!(
        tokens("a_09_ + 1 - 2.5"),
        &[
            Ranged::new(0..5, Token::Identifier(String::from("a_09_"))),
            Ranged::new(6..7, Token::Operator(String::from("+"))),
            Ranged::new(8..9, Token::Number(String::from("1"))),
            Ranged::new(10..11, Token::Operator(String::from("-"))),
            Ranged::new(12..15, Token::Number(String::from("2.5"))),
        ]
    );
}

#[test]
fn layout_tokens() {
    assert_eq!(
        tokens("let x = // note\r\n  true"),
        &[
            Ranged::new(0..3, Token::Keyword(Keyword::Let)),
            Ranged::new(4..5, Token::Identifier(String::from("x"))),
            Ranged::new(6..7, Token::Operator(String::from("="))),
            Ranged::new(8..15, Token::Comment),
            Ranged::new(15..17, Token::NewLine),
            Ranged::new(19..23, Token::Bool(true)),
        ]
    );
}

#[test]
fn operators() {
    assert_eq!(
        tokens("a|>b,,c?.d+//x"),
        &[
            Ranged::new(0..1, Token::Identifier(String::from("a"))),
            Ranged::new(1..3, Token::Operator(String::from("|>"))),
            Ranged::new(3..4, Token::Identifier(String::from("b"))),
            Ranged::new(4..5, Token::Operator(String::from(","))),
            Ranged::new(5..6, Token::Operator(String::from(","))),
            Ranged::new(6..7, Token::Identifier(String::from("c"))),
            Ranged::new(7..9, Token::Operator(String::from("?."))),
            Ranged::new(9..10, Token::Identifier(String::from("d"))),
            Ranged::new(10..11, Token::Operator(String::from("+"))),
            Ranged::new(11..14, Token::Comment),
        ]
    );
    assert_eq!(
        tokens("1.x"),
        &[
            Ranged::new(0..1, Token::Number(String::from("1"))),
            Ranged::new(1..2, Token::Operator(String::from("."))),
            Ranged::new(2..3, Token::Identifier(String::from("x"))),
        ]
    );
}

#[test]
fn literals_and_markers() {
    assert_eq!(
        tokens(r#""a\"b\n" 'T [ } false"#),
        &[
            Ranged::new(0..8, Token::Text(String::from("a\"b\n"))),
            Ranged::new(9..11, Token::Generic(String::from("T"))),
            Ranged::new(12..13, Token::Open(Paired::Bracket)),
            Ranged::new(14..15, Token::Close(Paired::Brace)),
            Ranged::new(16..21, Token::Bool(false)),
        ]
    );
}

#[test]
fn errors() {
    let mut tokens = Tokens::new("#a \"open\nb \"\\q\"");
    assert_eq!(
        tokens.next(),
        Some(Err(Ranged::new(0..1, LexerError::UnexpectedChar('#'))))
    );
    assert_eq!(
        tokens.next(),
        Some(Ok(Ranged::new(1..2, Token::Identifier(String::from("a")))))
    );
    assert_eq!(
        tokens.next(),
        Some(Err(Ranged::new(3..8, LexerError::MissingEndQuote)))
    );
    assert_eq!(tokens.next(), Some(Ok(Ranged::new(8..9, Token::NewLine))));
    assert_eq!(
        tokens.next(),
        Some(Ok(Ranged::new(9..10, Token::Identifier(String::from("b")))))
    );
    assert_eq!(
        tokens.next().map(|result| result.map_err(|err| err.0)),
        Some(Err(LexerError::InvalidEscapeSequence))
    );
}
