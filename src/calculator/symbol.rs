//! Input symbols understood by the calculator engine.
//!
//! A host reads raw text (a key label, a line typed at a prompt) and
//! classifies it into [`Symbol`]s before handing them to the engine.

use crate::error::SymbolError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    /// Matches one calculator key. Alternatives are tried left to right, so
    /// multi-character keys ("AC", "+/-") must come before their prefixes.
    static ref KEY: Regex = Regex::new(
        r"(?i)(?P<clear>AC|CE|C)|(?P<sign>±|\+/-|neg)|(?P<percent>%)|(?P<equals>=)|(?P<decimal>\.)|(?P<digit>[0-9])|(?P<op>[+\-−*×x/÷])"
    ).unwrap();
}

/// A single decimal digit, 0 through 9.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Digit(u8);

impl Digit {
    pub fn new(value: u8) -> Option<Self> {
        (value <= 9).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl TryFrom<char> for Digit {
    type Error = SymbolError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        c.to_digit(10)
            .map(|d| Self(d as u8))
            .ok_or(SymbolError::NotADigit(c))
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// The glyph shown in the operation trace.
    pub fn glyph(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '−',
            Self::Multiply => '×',
            Self::Divide => '÷',
        }
    }

    /// Apply the operator with `left` as the left-hand operand.
    ///
    /// Plain IEEE arithmetic; division by zero is the caller's concern.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Subtract => left - right,
            Self::Multiply => left * right,
            Self::Divide => left / right,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

impl FromStr for Operator {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Add),
            "-" | "−" => Ok(Self::Subtract),
            "*" | "×" | "x" | "X" => Ok(Self::Multiply),
            "/" | "÷" => Ok(Self::Divide),
            other => Err(SymbolError::NotAnOperator(other.to_string())),
        }
    }
}

/// One input event, classified by the key that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Digit(Digit),
    Operator(Operator),
    Equals,
    Clear,
    SignToggle,
    Percent,
    DecimalPoint,
}

impl From<Digit> for Symbol {
    fn from(digit: Digit) -> Self {
        Self::Digit(digit)
    }
}

impl From<Operator> for Symbol {
    fn from(op: Operator) -> Self {
        Self::Operator(op)
    }
}

/// Split a line of key labels into symbols.
///
/// Whitespace between keys is ignored, so `"12+3="` and `"1 2 + 3 ="` are
/// the same input. Anything that is not a key rejects the whole line.
///
/// Key names match case-insensitively:
/// - `AC`, `CE` and a bare `C` all clear
/// - `±`, `+/-` and `neg` toggle the sign
/// - `x` and `X` multiply, like `*` and `×`
///
/// Keys need no separator, so `"negc"` is a sign toggle followed by a clear
/// and `"3x4"` is a multiplication.
pub fn tokenize(line: &str) -> Result<Vec<Symbol>, SymbolError> {
    let mut symbols = Vec::new();
    let mut last_end = 0;

    for caps in KEY.captures_iter(line) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        reject_gap(&line[last_end..whole.start()])?;
        last_end = whole.end();

        let symbol = if caps.name("clear").is_some() {
            Symbol::Clear
        } else if caps.name("sign").is_some() {
            Symbol::SignToggle
        } else if caps.name("percent").is_some() {
            Symbol::Percent
        } else if caps.name("equals").is_some() {
            Symbol::Equals
        } else if caps.name("decimal").is_some() {
            Symbol::DecimalPoint
        } else if let Some(m) = caps.name("digit") {
            let c = m.as_str().chars().next().unwrap_or('0');
            Symbol::Digit(Digit::try_from(c)?)
        } else {
            Symbol::Operator(whole.as_str().parse()?)
        };
        symbols.push(symbol);
    }

    reject_gap(&line[last_end..])?;
    Ok(symbols)
}

fn reject_gap(gap: &str) -> Result<(), SymbolError> {
    let gap = gap.trim();
    if gap.is_empty() {
        Ok(())
    } else {
        Err(SymbolError::Unrecognized(gap.to_string()))
    }
}
