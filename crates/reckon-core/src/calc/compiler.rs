//! Infix → RPN.
//!
//! Two passes:
//! 1. `tokenize`: character scan, numerals accumulate until an operator or paren.
//! 2. `to_rpn`: shunting-yard with left-associative binary operators.

use super::{CalcError, Operator, Token};

/// Strip whitespace, tokenize and convert to RPN.
pub fn compile(expression: &str) -> Result<Vec<Token>, CalcError> {
    let stripped: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    let tokens = tokenize(&stripped)?;
    to_rpn(tokens)
}

/// Split an expression into tokens.
///
/// Digits and `.` accumulate into a numeral; the numeral is not validated
/// here (`1.2.3` is a token, the evaluator rejects it).
pub fn tokenize(expression: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut numeral = String::new();

    for c in expression.chars() {
        if c.is_ascii_digit() || c == '.' {
            numeral.push(c);
            continue;
        }

        let token = match c {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            _ => match Operator::from_char(c) {
                Some(op) => Token::Operator(op),
                None => return Err(CalcError::InvalidCharacter(c)),
            },
        };

        if !numeral.is_empty() {
            tokens.push(Token::Number(std::mem::take(&mut numeral)));
        }
        tokens.push(token);
    }

    if !numeral.is_empty() {
        tokens.push(Token::Number(numeral));
    }
    Ok(tokens)
}

/// Shunting-yard conversion.
pub fn to_rpn(tokens: Vec<Token>) -> Result<Vec<Token>, CalcError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Operator(incoming) => {
                while let Some(Token::Operator(top)) = stack.last() {
                    if top.precedence() < incoming.precedence() {
                        break;
                    }
                    output.push(Token::Operator(*top));
                    stack.pop();
                }
                stack.push(Token::Operator(incoming));
            }
            Token::LeftParen => stack.push(Token::LeftParen),
            Token::RightParen => loop {
                match stack.pop() {
                    Some(Token::LeftParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(CalcError::MismatchedParentheses),
                }
            },
            number => output.push(number),
        }
    }

    while let Some(top) = stack.pop() {
        if top == Token::LeftParen {
            return Err(CalcError::MismatchedParentheses);
        }
        output.push(top);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(rpn: &[Token]) -> String {
        rpn.iter().map(Token::to_string).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn tokenize_splits_numerals_and_symbols() {
        let tokens = tokenize("12.5*(3-4)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::number("12.5"),
                Token::Operator(Operator::Mul),
                Token::LeftParen,
                Token::number("3"),
                Token::Operator(Operator::Sub),
                Token::number("4"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn tokenize_accepts_the_whole_alphabet() {
        let alphabet = "0123456789.+-*/()";
        for c in alphabet.chars() {
            assert!(tokenize(&c.to_string()).is_ok(), "rejected {c:?}");
        }
        assert!(tokenize("((1.5+2)*3-4/5)").is_ok());
    }

    #[test]
    fn tokenize_rejects_anything_else() {
        for c in ['a', 'x', '^', '%', '=', ',', 'é', ' '] {
            assert_eq!(tokenize(&format!("1{c}2")), Err(CalcError::InvalidCharacter(c)));
        }
    }

    #[test]
    fn tokenize_keeps_bad_numerals_for_the_evaluator() {
        assert_eq!(tokenize("1.2.3").unwrap(), vec![Token::number("1.2.3")]);
    }

    #[test]
    fn rpn_respects_precedence_and_left_associativity() {
        assert_eq!(render(&compile("3+5*(2-4)/2").unwrap()), "3 5 2 4 - * 2 / +");
        assert_eq!(render(&compile("8-3-2").unwrap()), "8 3 - 2 -");
        assert_eq!(render(&compile("8/4/2").unwrap()), "8 4 / 2 /");
        assert_eq!(render(&compile("1+2*3").unwrap()), "1 2 3 * +");
    }

    #[test]
    fn compile_strips_whitespace() {
        assert_eq!(render(&compile(" 3 +\t5 \n").unwrap()), "3 5 +");
    }

    #[test]
    fn unmatched_close_paren_is_rejected() {
        assert_eq!(compile("(1+2))"), Err(CalcError::MismatchedParentheses));
        assert_eq!(compile(")"), Err(CalcError::MismatchedParentheses));
    }

    #[test]
    fn unclosed_open_paren_is_rejected() {
        assert_eq!(compile("3+5*(2-4"), Err(CalcError::MismatchedParentheses));
        assert_eq!(compile("(("), Err(CalcError::MismatchedParentheses));
    }
}
