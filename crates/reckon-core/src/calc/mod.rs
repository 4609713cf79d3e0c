//! Arithmetic expressions: compiler, evaluator and job plan.
//!
//! Supported input: non-negative decimal literals, `+ - * /`, parentheses,
//! whitespace. No unary minus, variables or functions.

mod compiler;
mod error;
mod evaluator;
mod plan;
mod token;

pub use compiler::{compile, to_rpn, tokenize};
pub use error::CalcError;
pub use evaluator::evaluate;
pub use plan::{Operand, Plan, PlanNode};
pub use token::{Operator, Token};

/// Strip whitespace, compile and evaluate.
pub fn calc(expression: &str) -> Result<f64, CalcError> {
    let rpn = compile(expression)?;
    evaluate(&rpn)
}

/// Render a result the way it is stored in a task: shortest decimal form, no
/// exponent, no trailing zeros (`8`, `2.5`).
pub fn format_result(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3 + 5", 8.0)]
    #[case("10 + 2 * 6", 22.0)]
    #[case("100 * 2 + 12", 212.0)]
    #[case("100 * (2 + 12)", 1400.0)]
    #[case("100 * (2 + 12) / 14", 100.0)]
    #[case("3 + 5 * (2 - 4) / 2", -2.0)]
    #[case("3+5*(2-4)/2", -2.0)]
    #[case("7", 7.0)]
    #[case("((7))", 7.0)]
    #[case("1.5 * 4", 6.0)]
    #[case("20 - 4 - 6", 10.0)]
    fn calc_evaluates(#[case] expression: &str, #[case] expected: f64) {
        assert_eq!(calc(expression), Ok(expected));
    }

    #[rstest]
    #[case::division_by_zero("3 + 5 * (2 - 4) / 0", CalcError::DivisionByZero)]
    #[case::unclosed("3 + 5 * (2 - 4", CalcError::MismatchedParentheses)]
    #[case::extra_close("3 + 5 * (2 - 4))", CalcError::MismatchedParentheses)]
    #[case::letter("3 + 5 * a", CalcError::InvalidCharacter('a'))]
    #[case::letter_after_paren("3 + 5 * (2 - 4) / a", CalcError::InvalidCharacter('a'))]
    #[case::trailing_operator("3 + 5 * (2 - 4) / 2 +", CalcError::InsufficientOperands)]
    #[case::unary_minus("-3", CalcError::InsufficientOperands)]
    #[case::empty("   ", CalcError::MalformedExpression)]
    #[case::adjacent_numbers("(1)(2)", CalcError::MalformedExpression)]
    #[case::bad_numeral("1.2.3 + 1", CalcError::NumberFormatError("1.2.3".into()))]
    fn calc_fails(#[case] expression: &str, #[case] expected: CalcError) {
        assert_eq!(calc(expression), Err(expected));
    }

    #[test]
    fn overflowing_literal_fails_in_calc() {
        let expression = format!("1{}+1", "0".repeat(400));
        assert!(matches!(calc(&expression), Err(CalcError::NumberFormatError(_))));
    }

    #[test]
    fn compiled_expressions_reduce_to_one_value() {
        for expression in ["1", "1+2", "(1+2)*3", "1*(2+(3-4)/5)", "8/4/2"] {
            let rpn = compile(expression).unwrap();
            assert!(evaluate(&rpn).is_ok(), "{expression}");
        }
    }

    #[rstest]
    #[case(8.0, "8")]
    #[case(2.5, "2.5")]
    #[case(-0.125, "-0.125")]
    #[case(100.0, "100")]
    #[case(1e21, "1000000000000000000000")]
    fn results_have_no_trailing_zeros(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_result(value), expected);
    }
}
