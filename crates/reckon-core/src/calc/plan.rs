//! Decomposition of an expression into binary-operation jobs.
//!
//! The plan is produced by running the RPN sequence through the same stack
//! discipline as the evaluator, but pushing *references* to pending results
//! instead of numbers. Each operator becomes one node; a node is runnable once
//! both of its operands are values.
//!
//! Invariants:
//! - Nodes are in RPN order, so every `Operand::Node(i)` points to an earlier node.
//! - Every node except the last feeds exactly one operand of a later node.
//! - The last node is the root; its value is the expression's value.

use super::evaluator::parse_number;
use super::{compile, CalcError, Operator, Token};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Value(f64),
    /// Index into `Plan::nodes`.
    Node(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    pub operator: Operator,
    pub lhs: Operand,
    pub rhs: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    nodes: Vec<PlanNode>,
    immediate: Option<f64>,
}

impl Plan {
    /// Compile an infix expression straight into a plan.
    pub fn compile(expression: &str) -> Result<Self, CalcError> {
        let rpn = compile(expression)?;
        Self::from_rpn(&rpn)
    }

    /// Build a plan from RPN.
    ///
    /// Reports the same structural errors as `evaluate`. `DivisionByZero` is
    /// left to whoever executes the nodes.
    pub fn from_rpn(rpn: &[Token]) -> Result<Self, CalcError> {
        let mut nodes = Vec::new();
        let mut stack: Vec<Operand> = Vec::new();

        for token in rpn {
            match token {
                Token::Number(text) => stack.push(Operand::Value(parse_number(text)?)),
                Token::Operator(operator) => {
                    let (Some(rhs), Some(lhs)) = (stack.pop(), stack.pop()) else {
                        return Err(CalcError::InsufficientOperands);
                    };
                    nodes.push(PlanNode {
                        operator: *operator,
                        lhs,
                        rhs,
                    });
                    stack.push(Operand::Node(nodes.len() - 1));
                }
                Token::LeftParen | Token::RightParen => {
                    return Err(CalcError::MalformedExpression);
                }
            }
        }

        match stack.as_slice() {
            [Operand::Value(value)] => Ok(Self {
                nodes,
                immediate: Some(*value),
            }),
            [Operand::Node(_)] => Ok(Self {
                nodes,
                immediate: None,
            }),
            _ => Err(CalcError::MalformedExpression),
        }
    }

    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    /// Value of an expression with no operators (`"42"`).
    pub fn immediate(&self) -> Option<f64> {
        self.immediate
    }

    pub fn root(&self) -> Option<usize> {
        self.nodes.len().checked_sub(1)
    }

    /// `(parent index, feeds lhs?)` for every node, `None` for the root.
    pub fn parents(&self) -> Vec<Option<(usize, bool)>> {
        let mut parents = vec![None; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            if let Operand::Node(child) = node.lhs {
                parents[child] = Some((index, true));
            }
            if let Operand::Node(child) = node.rhs {
                parents[child] = Some((index, false));
            }
        }
        parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_number_is_immediate() {
        let plan = Plan::compile("42").unwrap();
        assert!(plan.nodes().is_empty());
        assert_eq!(plan.immediate(), Some(42.0));
        assert_eq!(plan.root(), None);
    }

    #[test]
    fn nodes_follow_rpn_order() {
        // 3 5 2 4 - * 2 / +
        let plan = Plan::compile("3+5*(2-4)/2").unwrap();
        let ops: Vec<Operator> = plan.nodes().iter().map(|n| n.operator).collect();
        assert_eq!(
            ops,
            vec![Operator::Sub, Operator::Mul, Operator::Div, Operator::Add]
        );
        assert_eq!(plan.nodes()[0].lhs, Operand::Value(2.0));
        assert_eq!(plan.nodes()[0].rhs, Operand::Value(4.0));
        assert_eq!(plan.nodes()[1].lhs, Operand::Value(5.0));
        assert_eq!(plan.nodes()[1].rhs, Operand::Node(0));
        assert_eq!(plan.nodes()[3].lhs, Operand::Value(3.0));
        assert_eq!(plan.nodes()[3].rhs, Operand::Node(2));
        assert_eq!(plan.root(), Some(3));
        assert_eq!(plan.immediate(), None);
    }

    #[test]
    fn every_non_root_node_has_one_parent() {
        let plan = Plan::compile("(1+2)*(3+4)-5").unwrap();
        let parents = plan.parents();
        let root = plan.root().unwrap();
        for (index, parent) in parents.iter().enumerate() {
            if index == root {
                assert!(parent.is_none());
            } else {
                let (p, _) = parent.expect("non-root node must feed a parent");
                assert!(p > index);
            }
        }
        // (1+2) feeds lhs of '*', (3+4) feeds rhs of '*'.
        assert_eq!(parents[0], Some((2, true)));
        assert_eq!(parents[1], Some((2, false)));
    }

    #[test]
    fn structural_errors_match_the_evaluator() {
        assert_eq!(Plan::compile("1+"), Err(CalcError::InsufficientOperands));
        assert_eq!(Plan::compile(""), Err(CalcError::MalformedExpression));
        assert_eq!(
            Plan::compile("1..2+1"),
            Err(CalcError::NumberFormatError("1..2".into()))
        );
        assert_eq!(Plan::compile("1+(2"), Err(CalcError::MismatchedParentheses));
    }

    #[test]
    fn plan_operands_are_always_finite() {
        let huge = format!("1{}", "0".repeat(400));
        assert_eq!(
            Plan::compile(&format!("{huge}+1")),
            Err(CalcError::NumberFormatError(huge))
        );
    }

    #[test]
    fn zero_divisor_is_not_a_plan_error() {
        let plan = Plan::compile("1/0").unwrap();
        assert_eq!(plan.nodes().len(), 1);
    }
}
