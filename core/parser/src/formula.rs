//! FILENAME: core/parser/src/formula.rs
//! PURPOSE: The parsed-formula object handed to the engine.
//! CONTEXT: Wraps an `Expression` with the three things a cell needs from it:
//! evaluation against a reference resolver, the set of referenced positions,
//! and a canonical re-rendering of the source.

use crate::ast::{BinaryOperator, Expression, UnaryOperator};
use crate::parser::{parse, ParseResult};
use crate::position::Position;

/// Error values a formula can evaluate to. These are results, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaError {
    Ref,   // Reference outside the sheet
    Value, // Operand is not a number
    Div0,  // Division by zero / non-finite result
}

impl std::fmt::Display for FormulaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormulaError::Ref => write!(f, "#REF!"),
            FormulaError::Value => write!(f, "#VALUE!"),
            FormulaError::Div0 => write!(f, "#DIV/0!"),
        }
    }
}

impl std::error::Error for FormulaError {}

/// Supplies the numeric operand for a referenced cell.
///
/// Implementations apply their own coercion rules and return an error value
/// to abort the evaluation.
pub trait CellResolver {
    fn resolve(&self, pos: Position) -> Result<f64, FormulaError>;
}

impl<F> CellResolver for F
where
    F: Fn(Position) -> Result<f64, FormulaError>,
{
    fn resolve(&self, pos: Position) -> Result<f64, FormulaError> {
        self(pos)
    }
}

/// A parsed arithmetic formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expression: Expression,
    referenced: Vec<Position>,
}

impl Formula {
    /// Parses formula source with the leading '=' already removed.
    pub fn parse(source: &str) -> ParseResult<Formula> {
        parse(source).map(Formula::from_expression)
    }

    pub fn from_expression(expression: Expression) -> Formula {
        let mut referenced = Vec::new();
        expression.collect_positions(&mut referenced);
        referenced.sort_unstable();
        referenced.dedup();
        Formula {
            expression,
            referenced,
        }
    }

    pub fn ast(&self) -> &Expression {
        &self.expression
    }

    /// Evaluates the tree. The first error encountered wins.
    pub fn evaluate(&self, resolver: &dyn CellResolver) -> Result<f64, FormulaError> {
        eval(&self.expression, resolver)
    }

    /// In-bounds referenced positions, sorted and de-duplicated.
    pub fn referenced_cells(&self) -> &[Position] {
        &self.referenced
    }

    /// Canonical text of the formula, without the leading '='.
    pub fn expression(&self) -> String {
        self.expression.to_string()
    }
}

fn eval(expr: &Expression, resolver: &dyn CellResolver) -> Result<f64, FormulaError> {
    match expr {
        Expression::Literal(n) => Ok(*n),
        Expression::CellRef(cell) => match cell.position {
            Some(pos) => resolver.resolve(pos),
            None => Err(FormulaError::Ref),
        },
        Expression::UnaryOp { op, operand } => {
            let value = eval(operand, resolver)?;
            Ok(match op {
                UnaryOperator::Plus => value,
                UnaryOperator::Negate => -value,
            })
        }
        Expression::BinaryOp { left, op, right } => {
            let lhs = eval(left, resolver)?;
            let rhs = eval(right, resolver)?;
            let result = match op {
                BinaryOperator::Add => lhs + rhs,
                BinaryOperator::Subtract => lhs - rhs,
                BinaryOperator::Multiply => lhs * rhs,
                BinaryOperator::Divide => lhs / rhs,
            };
            if result.is_finite() {
                Ok(result)
            } else {
                Err(FormulaError::Div0)
            }
        }
    }
}
