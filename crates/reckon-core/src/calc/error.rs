use thiserror::Error;

/// Failure of a single `calc` invocation.
///
/// Every variant is terminal for the expression that produced it; nothing in
/// the pipeline retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("invalid character in expression: {0:?}")]
    InvalidCharacter(char),

    #[error("mismatched parentheses")]
    MismatchedParentheses,

    #[error("insufficient operands")]
    InsufficientOperands,

    #[error("cannot parse number: {0:?}")]
    NumberFormatError(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("malformed expression: stack does not reduce to a single value")]
    MalformedExpression,
}
