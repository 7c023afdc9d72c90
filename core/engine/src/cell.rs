//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the fundamental data structures for a single spreadsheet cell.
//! CONTEXT: This file contains the `Cell` struct and `CellValue` enum.
//! A cell is one of three variants chosen from the text written to it:
//! Empty, Text, or Formula. Formula cells own a lazily-populated result
//! cache that the sheet clears when an upstream cell changes.

use std::cell::OnceCell;
use std::fmt;

use parser::{Formula, FormulaError, Position};

use crate::error::SheetError;
use crate::resolver;
use crate::sheet::Sheet;

/// Leading character that turns the rest of the text into a formula.
pub const FORMULA_SIGN: char = '=';
/// Leading character that forces the rest of the text to be literal text.
pub const ESCAPE_SIGN: char = '\'';

/// Represents the calculated result of a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<FormulaError> for CellValue {
    fn from(e: FormulaError) -> Self {
        CellValue::Error(e)
    }
}

/// The tag of a cell's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Empty,
    Text,
    Formula,
}

/// Identity of a cell object, stable across in-place edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(pub(crate) u64);

/// What a cell holds. Replaced wholesale on every write.
#[derive(Debug, Clone)]
pub(crate) enum CellContent {
    Empty,
    Text(String),
    Formula {
        formula: Formula,
        cache: OnceCell<CellValue>,
    },
}

impl CellContent {
    /// Classifies user input. Parse failures never fall back to text.
    pub(crate) fn from_text(text: &str) -> Result<CellContent, SheetError> {
        if text.is_empty() {
            return Ok(CellContent::Empty);
        }

        match text.strip_prefix(FORMULA_SIGN) {
            Some(source) if !source.is_empty() => {
                let formula = Formula::parse(source).map_err(|source| SheetError::FormulaSyntax {
                    category: FormulaError::Ref,
                    source,
                })?;
                Ok(CellContent::Formula {
                    formula,
                    cache: OnceCell::new(),
                })
            }
            // Plain text, or a lone "=".
            _ => Ok(CellContent::Text(text.to_string())),
        }
    }

    pub(crate) fn referenced_cells(&self) -> &[Position] {
        match self {
            CellContent::Empty | CellContent::Text(_) => &[],
            CellContent::Formula { formula, .. } => formula.referenced_cells(),
        }
    }
}

/// The atomic unit of the spreadsheet.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    content: CellContent,
}

impl Cell {
    pub(crate) fn empty(id: CellId) -> Self {
        Cell {
            id,
            content: CellContent::Empty,
        }
    }

    pub(crate) fn new(id: CellId, text: &str) -> Result<Self, SheetError> {
        Ok(Cell {
            id,
            content: CellContent::from_text(text)?,
        })
    }

    /// Replaces the content, returning the previous one for rollback.
    /// On a parse failure the cell is left untouched.
    pub(crate) fn set(&mut self, text: &str) -> Result<CellContent, SheetError> {
        let content = CellContent::from_text(text)?;
        Ok(std::mem::replace(&mut self.content, content))
    }

    pub(crate) fn restore(&mut self, previous: CellContent) {
        self.content = previous;
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn kind(&self) -> CellKind {
        match self.content {
            CellContent::Empty => CellKind::Empty,
            CellContent::Text(_) => CellKind::Text,
            CellContent::Formula { .. } => CellKind::Formula,
        }
    }

    /// The computed value. Formula results are cached until invalidated.
    pub fn value(&self, sheet: &Sheet) -> CellValue {
        match &self.content {
            CellContent::Empty => CellValue::Number(0.0),
            CellContent::Text(text) => {
                let shown = text.strip_prefix(ESCAPE_SIGN).unwrap_or(text);
                CellValue::Text(shown.to_string())
            }
            CellContent::Formula { formula, cache } => {
                if let Some(value) = cache.get() {
                    return value.clone();
                }
                sheet.evaluate_precedents(formula.referenced_cells());
                self.evaluate_cached(sheet)
            }
        }
    }

    /// The source text: raw for text cells, canonical for formulas.
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula { formula, .. } => {
                format!("{}{}", FORMULA_SIGN, formula.expression())
            }
        }
    }

    /// Positions named by the formula, sorted and de-duplicated.
    pub fn referenced_cells(&self) -> &[Position] {
        self.content.referenced_cells()
    }

    /// True for a formula whose result is currently cached.
    pub fn is_cached(&self) -> bool {
        matches!(&self.content, CellContent::Formula { cache, .. } if cache.get().is_some())
    }

    pub(crate) fn needs_evaluation(&self) -> bool {
        matches!(&self.content, CellContent::Formula { cache, .. } if cache.get().is_none())
    }

    pub(crate) fn invalidate_cache(&mut self) {
        if let CellContent::Formula { cache, .. } = &mut self.content {
            cache.take();
        }
    }

    /// Computes and caches the result, assuming precedents are already warm.
    pub(crate) fn evaluate_cached(&self, sheet: &Sheet) -> CellValue {
        match &self.content {
            CellContent::Formula { formula, cache } => cache
                .get_or_init(|| resolver::evaluate(formula, sheet))
                .clone(),
            _ => self.value(sheet),
        }
    }
}
