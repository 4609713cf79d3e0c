//! Tokens shared by the compiler, the evaluator and the job protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::CalcError;

/// Binary operator.
///
/// Serialized as its symbol so it can travel in a job body as
/// `"operation": "+"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// `+ -` bind at 1, `* /` at 2. All operators are left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
        }
    }

    /// Apply `a <op> b`.
    ///
    /// This is the only place arithmetic happens: the evaluator, the local
    /// coordinator path and remote workers all go through it, so they agree on
    /// `DivisionByZero`.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, CalcError> {
        match self {
            Operator::Add => Ok(a + b),
            Operator::Sub => Ok(a - b),
            Operator::Mul => Ok(a * b),
            Operator::Div if b == 0.0 => Err(CalcError::DivisionByZero),
            Operator::Div => Ok(a / b),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Lexical token. Numerals stay textual until the evaluator parses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(String),
    Operator(Operator),
    LeftParen,
    RightParen,
}

impl Token {
    pub fn number(text: impl Into<String>) -> Self {
        Token::Number(text.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(text) => f.write_str(text),
            Token::Operator(op) => op.fmt(f),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
        }
    }
}
