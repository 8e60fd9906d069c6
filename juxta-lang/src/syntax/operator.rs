//! Precedence and associativity of infix operators.

use serde::{Deserialize, Serialize};

/// Which side an operator groups toward when chained with itself.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub enum Associativity {
    /// `a - b - c` is `(a - b) - c`.
    Left,
    /// `a ^ b ^ c` is `a ^ (b ^ c)`.
    Right,
}

/// How tightly an operator binds. Higher precedences bind tighter.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct Binding {
    /// The precedence level.
    pub precedence: u8,
    /// The grouping direction for operators of equal precedence.
    pub associativity: Associativity,
}

impl Binding {
    /// The binding of operator symbols missing from the table.
    pub const DEFAULT: Self = Self::left(13);
    /// The binding of function application by juxtaposition.
    pub const APPLICATION: Self = Self::left(14);

    const fn left(precedence: u8) -> Self {
        Self {
            precedence,
            associativity: Associativity::Left,
        }
    }

    /// Returns the binding of `symbol`, if it is a known operator.
    #[must_use]
    pub fn lookup(symbol: &str) -> Option<Self> {
        let precedence = match symbol {
            "," => 1,
            "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "^=" => 2,
            "<|" | "|>" => 3,
            "<<" | ">>" => 4,
            "||" => 5,
            "&&" => 6,
            "??" => 7,
            "==" | "!=" | "===" | "!==" => 8,
            "<" | "<=" | ">=" | ">" => 9,
            "+" | "-" => 10,
            "*" | "/" | "%" => 11,
            "^" => {
                return Some(Self {
                    precedence: 12,
                    associativity: Associativity::Right,
                })
            }
            "." | "?." => 15,
            _ => return None,
        };
        Some(Self::left(precedence))
    }

    /// Returns the binding of `symbol`, falling back to [`Binding::DEFAULT`]
    /// for unknown operators.
    #[must_use]
    pub fn of(symbol: &str) -> Self {
        Self::lookup(symbol).unwrap_or_else(|| {
            trace!(symbol, "operator not in table, using default precedence");
            Self::DEFAULT
        })
    }

    /// Returns true if an operator with this binding may continue an
    /// expression whose operands are being parsed at `floor`.
    #[must_use]
    pub fn binds_above(self, floor: u8) -> bool {
        self.precedence > floor
            || (self.precedence == floor && self.associativity == Associativity::Right)
    }
}

#[test]
fn table() {
    assert_eq!(Binding::of("+").precedence, 10);
    assert_eq!(Binding::of("*").precedence, 11);
    assert_eq!(Binding::of("^").associativity, Associativity::Right);
    assert_eq!(Binding::of("?.").precedence, 15);
    assert_eq!(Binding::lookup("<>"), None);
    assert_eq!(Binding::of("<>"), Binding::DEFAULT);
    assert!(Binding::APPLICATION.binds_above(Binding::of("+").precedence));
    assert!(!Binding::APPLICATION.binds_above(Binding::APPLICATION.precedence));
    assert!(Binding::of("^").binds_above(12));
    assert!(!Binding::of("-").binds_above(10));
}
