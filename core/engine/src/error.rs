//! FILENAME: core/engine/src/error.rs

use parser::{FormulaError, ParseError, Position};
use thiserror::Error;

/// Structural failures of a sheet operation. A failed call leaves the sheet
/// as it was (apart from Empty placeholders created while checking cycles).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error("Invalid position: row {}, column {}", .0.row, .0.col)]
    InvalidPosition(Position),

    #[error("Formula syntax error ({category}): {source}")]
    FormulaSyntax {
        category: FormulaError,
        source: ParseError,
    },

    #[error("Circular dependency at {0}")]
    CircularDependency(Position),
}

pub type SheetResult<T> = Result<T, SheetError>;
