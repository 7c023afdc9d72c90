//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the formula parser.
//! CONTEXT: This module exposes the lexer, parser, and AST components
//! needed to convert formula strings into evaluatable expression trees,
//! plus the cell addressing types those trees refer to.
//!
//! PIPELINE: Formula String --> Lexer --> Tokens --> Parser --> AST --> Formula
//!
//! SUPPORTED FEATURES:
//! - Arithmetic: +, -, *, /
//! - Unary sign: -5, +A1
//! - Cell references: A1, AA100
//! - Parentheses for grouping
//! - Canonical re-rendering with minimal parentheses

pub mod ast;
pub mod formula;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod token;


// Re-export commonly used types for convenience
pub use ast::{BinaryOperator, CellRef, Expression, UnaryOperator};
pub use formula::{CellResolver, Formula, FormulaError};
pub use lexer::Lexer;
pub use parser::{parse, ParseError, ParseResult, Parser, MAX_DEPTH};
pub use position::{col_to_index, index_to_col, Position, PositionParseError, Size};
pub use token::Token;
