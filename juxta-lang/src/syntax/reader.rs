//! A buffered token stream with single-token pushback and checkpointed
//! lookahead.

use super::token::{LexerError, Token, Tokens};
use super::{Ranged, SourceLines, SourceRange};

/// The result of reading one token.
pub type TokenResult = Result<Ranged<Token>, Ranged<LexerError>>;

/// Reads tokens from source text on demand.
pub struct TokenReader<'a> {
    source: &'a str,
    lines: SourceLines,
    tokens: Tokens<'a>,
    buffered: Vec<TokenResult>,
    position: usize,
    last_consumed: Option<usize>,
}

impl<'a> TokenReader<'a> {
    /// Returns a reader over the tokens in `source`.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lines: SourceLines::new(source),
            tokens: Tokens::new(source),
            buffered: Vec::new(),
            position: 0,
            last_consumed: None,
        }
    }

    /// Returns the line index of the source being read.
    #[must_use]
    pub const fn lines(&self) -> &SourceLines {
        &self.lines
    }

    /// Returns the 0-based column of a byte offset.
    #[must_use]
    pub fn column(&self, offset: usize) -> usize {
        self.lines.column(self.source, offset)
    }

    fn fill(&mut self, index: usize) -> bool {
        while self.buffered.len() <= index {
            let Some(token) = self.tokens.next() else {
                return false;
            };
            self.buffered.push(token);
        }
        true
    }

    /// Returns the next token, or `None` at the end of input.
    pub fn next(&mut self) -> Option<TokenResult> {
        if !self.fill(self.position) {
            self.last_consumed = None;
            return None;
        }

        let token = self.buffered[self.position].clone();
        self.last_consumed = Some(self.position);
        self.position += 1;
        Some(token)
    }

    /// Returns the token most recently read by [`Self::next`] to the stream.
    ///
    /// Only one token can be pushed back before another is read.
    pub fn push_back(&mut self) {
        let Some(index) = self.last_consumed.take() else {
            unreachable!("push_back without a token to return")
        };
        self.position = index;
    }

    /// Looks past comments and line breaks for the next significant token
    /// without consuming anything.
    pub fn peek_significant(&mut self) -> Lookahead {
        let origin = self.position;
        let mut index = origin;
        let mut crossed_newline = false;
        loop {
            if !self.fill(index) {
                return Lookahead {
                    token: None,
                    column: None,
                    crossed_newline,
                    checkpoint: Checkpoint {
                        origin,
                        target: index,
                    },
                };
            }

            match &self.buffered[index] {
                Ok(Ranged(Token::NewLine, _)) => crossed_newline = true,
                Ok(Ranged(Token::Comment, _)) => {}
                other => {
                    let token = other.clone();
                    let start = match &token {
                        Ok(token) => token.range().start,
                        Err(err) => err.range().start,
                    };
                    return Lookahead {
                        column: Some(self.column(start)),
                        token: Some(token),
                        crossed_newline,
                        checkpoint: Checkpoint {
                            origin,
                            target: index,
                        },
                    };
                }
            }
            index += 1;
        }
    }

    /// Skips the comments and line breaks that `lookahead` looked past.
    pub fn commit(&mut self, lookahead: &Lookahead) {
        assert_eq!(
            self.position, lookahead.checkpoint.origin,
            "lookahead committed after the stream moved"
        );
        self.position = lookahead.checkpoint.target;
        self.last_consumed = None;
    }

    /// Returns an empty range at the end of the source.
    #[must_use]
    pub fn end_of_input(&self) -> SourceRange {
        SourceRange::empty_at(self.source.len())
    }
}

#[cfg(test)]
impl TokenReader<'_> {
    pub(crate) const fn position(&self) -> usize {
        self.position
    }

    pub(crate) const fn pending_push_back(&self) -> Option<usize> {
        self.last_consumed
    }

    pub(crate) fn buffered_len(&self) -> usize {
        self.buffered.len()
    }

    /// Returns the end of the furthest token read or peeked so far.
    pub(crate) fn scanned_end(&self) -> usize {
        self.buffered.last().map_or(0, |token| match token {
            Ok(token) => token.range().end(),
            Err(err) => err.range().end(),
        })
    }
}

/// A saved pair of stream positions: where a lookahead began and where the
/// significant token it found sits.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Checkpoint {
    origin: usize,
    target: usize,
}

/// The next significant token, found without consuming anything.
#[derive(Clone, Debug)]
pub struct Lookahead {
    /// The token found, or `None` at the end of input.
    pub token: Option<TokenResult>,
    /// The column of the token found.
    pub column: Option<usize>,
    /// True if a line break was skipped to reach the token.
    pub crossed_newline: bool,
    checkpoint: Checkpoint,
}

impl Lookahead {
    /// Returns the range of the token found.
    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        match self.token.as_ref()? {
            Ok(token) => Some(token.range()),
            Err(err) => Some(err.range()),
        }
    }

    /// Returns true if the token found is an operator.
    #[must_use]
    pub fn is_operator(&self) -> bool {
        matches!(&self.token, Some(Ok(Ranged(Token::Operator(_), _))))
    }
}

#[test]
fn pushback_and_lookahead() {
    let mut reader = TokenReader::new("a // c\n\n  + b");
    assert_eq!(
        reader.next(),
        Some(Ok(Ranged::new(0..1, Token::Identifier(String::from("a")))))
    );
    let lookahead = reader.peek_significant();
    assert!(lookahead.crossed_newline);
    assert!(lookahead.is_operator());
    assert_eq!(lookahead.column, Some(2));
    assert_eq!(lookahead.range(), Some(SourceRange::from(10..11)));

    // Peeking does not move the stream.
    assert_eq!(reader.next(), Some(Ok(Ranged::new(2..6, Token::Comment))));
    reader.push_back();
    reader.commit(&lookahead);
    assert_eq!(
        reader.next(),
        Some(Ok(Ranged::new(10..11, Token::Operator(String::from("+")))))
    );
}

#[test]
fn lookahead_at_end() {
    let mut reader = TokenReader::new("a\n// done\n");
    reader.next();
    let lookahead = reader.peek_significant();
    assert!(lookahead.token.is_none());
    assert_eq!(lookahead.column, None);
    reader.commit(&lookahead);
    assert_eq!(reader.next(), None);
}

#[test]
#[should_panic(expected = "push_back without a token to return")]
fn double_push_back() {
    let mut reader = TokenReader::new("a b");
    reader.next();
    reader.push_back();
    reader.push_back();
}
