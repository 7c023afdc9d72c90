//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the spreadsheet engine.
//! CONTEXT: Re-exports public types and modules for use by other crates.
//! The engine owns cells, their cached results and the dependency index;
//! formula parsing and cell addressing come from the `parser` crate.

pub mod cell;
pub mod config;
pub mod dependency_index;
pub mod error;
pub mod resolver;
pub mod sheet;

// Re-export commonly used types at the crate root
pub use cell::{Cell, CellId, CellKind, CellValue, ESCAPE_SIGN, FORMULA_SIGN};
pub use config::{EdgePolicy, SheetConfig};
pub use dependency_index::DependencyIndex;
pub use error::{SheetError, SheetResult};
pub use parser::{FormulaError, ParseError, Position, Size};
pub use resolver::SheetResolver;
pub use sheet::{Sheet, SheetStats};
