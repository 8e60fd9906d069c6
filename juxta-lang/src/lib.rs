//! The syntax of Juxta: an expression-oriented language where indentation
//! delimits blocks and functions are applied by juxtaposition.
//!
//! ```rust
//! let tree = juxta_lang::parse("let total =\n    price * count\ntotal").unwrap();
//! assert_eq!(
//!     tree.0.to_string(),
//!     "(block (let total (* price count)) total)"
//! );
//! ```

use std::fmt::{self, Display};

#[cfg(feature = "tracing")]
#[macro_use]
extern crate tracing;
#[cfg(not(feature = "tracing"))]
#[macro_use]
mod mock_tracing;

pub mod syntax;

#[cfg(test)]
mod tests;

use syntax::{Expression, ParseError, Ranged};

/// Summarizes an error's kind.
pub trait ErrorKind {
    /// Returns the summary of the error being raised.
    fn kind(&self) -> &'static str;
}

/// An error parsing source code, along with the message describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The error that was raised.
    pub error: Ranged<ParseError>,
    /// The rendered diagnostic, including the offending source line.
    pub message: String,
}

impl Error {
    /// Renders `error` against `source`.
    #[must_use]
    pub fn new(source: &str, error: Ranged<ParseError>) -> Self {
        let message = error.diagnostic(source).to_string();
        Self { error, message }
    }
}

impl ErrorKind for Error {
    fn kind(&self) -> &'static str {
        self.error.kind()
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Parses `source` into a syntax tree.
pub fn parse(source: &str) -> Result<Ranged<Expression>, Error> {
    syntax::parse(source).map_err(|error| Error::new(source, error))
}
