//! Stack machine for RPN sequences.

use super::{CalcError, Token};

/// Evaluate an RPN sequence.
///
/// Parens never appear in compiler output; a hand-built sequence that contains
/// one is reported as `MalformedExpression`.
pub fn evaluate(rpn: &[Token]) -> Result<f64, CalcError> {
    let mut stack: Vec<f64> = Vec::with_capacity(rpn.len());

    for token in rpn {
        match token {
            Token::Number(text) => stack.push(parse_number(text)?),
            Token::Operator(op) => {
                if stack.len() < 2 {
                    return Err(CalcError::InsufficientOperands);
                }
                let b = stack[stack.len() - 1];
                let a = stack[stack.len() - 2];
                let value = op.apply(a, b)?;
                stack.truncate(stack.len() - 2);
                stack.push(value);
            }
            Token::LeftParen | Token::RightParen => return Err(CalcError::MalformedExpression),
        }
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        _ => Err(CalcError::MalformedExpression),
    }
}

/// Parse a numeral. A literal too large for `f64` is rejected rather than
/// read as infinity.
pub(crate) fn parse_number(text: &str) -> Result<f64, CalcError> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CalcError::NumberFormatError(text.to_string())),
    }
}
