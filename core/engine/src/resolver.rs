//! FILENAME: core/engine/src/resolver.rs
//! PURPOSE: Glue between formula trees and the sheet they read from.
//! CONTEXT: Formula trees ask a `CellResolver` for the numeric value of each
//! referenced position. This module implements that resolver over a `Sheet`
//! and applies the coercion rules:
//! - absent cell   -> 0
//! - number        -> itself
//! - text          -> parsed as a decimal number, else #VALUE!
//! - error         -> propagated unchanged

use log::trace;
use parser::{CellResolver, Formula, FormulaError, Position};

use crate::cell::{CellKind, CellValue};
use crate::sheet::Sheet;

/// Resolves references against the current contents of a sheet.
pub struct SheetResolver<'a> {
    sheet: &'a Sheet,
}

impl<'a> SheetResolver<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        SheetResolver { sheet }
    }
}

impl CellResolver for SheetResolver<'_> {
    fn resolve(&self, pos: Position) -> Result<f64, FormulaError> {
        match self.sheet.cell_at(pos) {
            Some(cell) => coerce(cell.value(self.sheet)),
            None => Ok(0.0),
        }
    }
}

/// Converts a referenced cell's value into an arithmetic operand.
pub fn coerce(value: CellValue) -> Result<f64, FormulaError> {
    match value {
        CellValue::Number(n) => Ok(n),
        CellValue::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or(FormulaError::Value),
        CellValue::Error(e) => Err(e),
    }
}

/// Computes a formula's result against the sheet.
///
/// Any referenced cell holding text makes the result #VALUE!, even when the
/// text looks numeric. This check looks at the cell kind and runs before
/// the per-operand coercion above.
pub(crate) fn evaluate(formula: &Formula, sheet: &Sheet) -> CellValue {
    sheet.record_evaluation();

    let refs = formula.referenced_cells();
    if refs
        .iter()
        .any(|&pos| sheet.cell_at(pos).map(|c| c.kind()) == Some(CellKind::Text))
    {
        trace!("formula {} reads a text cell, yielding #VALUE!", formula.expression());
        return CellValue::Error(FormulaError::Value);
    }

    match formula.evaluate(&SheetResolver::new(sheet)) {
        Ok(n) if n.is_infinite() => CellValue::Error(FormulaError::Div0),
        Ok(n) => CellValue::Number(n),
        Err(e) => CellValue::Error(e),
    }
}
