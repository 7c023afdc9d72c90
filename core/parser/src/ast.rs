//! FILENAME: core/parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for formula expressions.
//! CONTEXT: After the Lexer tokenizes a formula string, the Parser converts
//! those tokens into this tree structure. `Formula` then evaluates and
//! re-renders it.
//!
//! SUPPORTED EXPRESSIONS:
//! - Number literals: 1, 2.5, .5, 1e3
//! - Cell references: A1, AA100 (out-of-bounds references are kept, see `CellRef`)
//! - Binary operations: +, -, *, /
//! - Unary operations: +, - (sign)

use crate::position::Position;

/// Represents a parsed formula expression.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// A finite number literal.
    Literal(f64),

    /// A single cell reference like A1 or AA100.
    CellRef(CellRef),

    /// A binary operation: left op right (e.g., 5 + 3).
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    /// A unary operation: op operand (e.g., -5).
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
}

/// A reference as written in the formula.
///
/// `position` is `None` when the text is shaped like a reference but lies
/// outside the sheet (e.g. "A0" or "ZZZZ1"). Such references still render
/// back verbatim and evaluate to `#REF!`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CellRef {
    pub name: String,
    pub position: Option<Position>,
}

/// Binary operators for expressions.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
}

/// Unary operators.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Plus,   // +
    Negate, // -
}

/// Binding strength used by the canonical renderer. Higher binds tighter.
pub(crate) const ADDITIVE: u8 = 1;
pub(crate) const MULTIPLICATIVE: u8 = 2;
pub(crate) const UNARY: u8 = 3;
pub(crate) const ATOM: u8 = 4;

impl BinaryOperator {
    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => ADDITIVE,
            BinaryOperator::Multiply | BinaryOperator::Divide => MULTIPLICATIVE,
        }
    }
}

impl Expression {
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Expression::Literal(_) | Expression::CellRef(_) => ATOM,
            Expression::BinaryOp { op, .. } => op.precedence(),
            Expression::UnaryOp { .. } => UNARY,
        }
    }

    /// Collects every in-bounds referenced position, in source order,
    /// duplicates included.
    pub fn collect_positions(&self, out: &mut Vec<Position>) {
        match self {
            Expression::Literal(_) => {}
            Expression::CellRef(cell) => out.extend(cell.position),
            Expression::BinaryOp { left, right, .. } => {
                left.collect_positions(out);
                right.collect_positions(out);
            }
            Expression::UnaryOp { operand, .. } => operand.collect_positions(out),
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/"),
        }
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Plus => write!(f, "+"),
            UnaryOperator::Negate => write!(f, "-"),
        }
    }
}

/// Renders the canonical form: minimal parentheses that still re-parse to
/// an identical tree.
impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(n) => write!(f, "{}", n),
            Expression::CellRef(cell) => write!(f, "{}", cell.name),
            Expression::BinaryOp { left, op, right } => {
                let prec = op.precedence();
                write_operand(f, left, left.precedence() < prec)?;
                write!(f, "{}", op)?;
                // Operators are left-associative, so an equal-precedence right
                // operand only keeps its grouping inside parentheses.
                write_operand(f, right, right.precedence() <= prec)
            }
            Expression::UnaryOp { op, operand } => {
                write!(f, "{}", op)?;
                write_operand(f, operand, operand.precedence() < UNARY)
            }
        }
    }
}

fn write_operand(
    f: &mut std::fmt::Formatter<'_>,
    expr: &Expression,
    parenthesize: bool,
) -> std::fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}
