//! FILENAME: core/engine/src/sheet.rs
//! PURPOSE: The spreadsheet: sparse cell storage plus dependency tracking.
//! CONTEXT: `Sheet` is the only mutating entry point. Every write runs as a
//! small transaction: parse, check for circular references, then commit the
//! new edges and clear the caches of everything downstream. Reads evaluate
//! formulas lazily and cache the results in the cells themselves.
//!
//! All graph walks (cycle checks, invalidation, warm-up before a read) use
//! explicit stacks or queues, so chain length never turns into call depth.

use std::io::{self, Write};

use log::{debug, trace};
use parser::{Position, Size};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::cell::{Cell, CellId, CellKind, CellValue};
use crate::config::{EdgePolicy, SheetConfig};
use crate::dependency_index::DependencyIndex;
use crate::error::{SheetError, SheetResult};

/// Counters exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SheetStats {
    /// Stored cells, Empty placeholders included.
    pub cells: usize,
    pub formula_cells: usize,
    pub dependency_edges: usize,
    /// Formula caches cleared by invalidation cascades since creation.
    pub invalidations: u64,
    /// Formula evaluations since creation.
    pub evaluations: u64,
}

#[derive(Debug, Default)]
pub struct Sheet {
    cells: FxHashMap<Position, Cell>,
    dependencies: DependencyIndex,
    config: SheetConfig,
    next_id: u64,
    invalidations: u64,
    evaluations: std::cell::Cell<u64>,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SheetConfig) -> Self {
        Sheet {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Writes `text` to `pos`.
    ///
    /// Either the whole edit lands or the sheet is left as it was. Writing
    /// the text a cell already shows is a no-op.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> SheetResult<()> {
        ensure_valid(pos)?;

        match self.cells.get_mut(&pos) {
            Some(cell) => {
                if cell.text() == text {
                    trace!("set_cell {}: text unchanged", pos);
                    return Ok(());
                }

                let edited = cell.id();
                let previous = cell.set(text)?;
                let refs = cell.referenced_cells().to_vec();

                if let Err(err) = self.check_circular(pos, edited, &refs) {
                    if let Some(cell) = self.cells.get_mut(&pos) {
                        cell.restore(previous);
                    }
                    debug!("set_cell {} rejected: {}", pos, err);
                    return Err(err);
                }

                self.commit_edges(pos, &refs);
            }
            None => {
                let id = self.allocate_id();
                let cell = Cell::new(id, text)?;
                let refs = cell.referenced_cells().to_vec();

                if let Err(err) = self.check_circular(pos, id, &refs) {
                    debug!("set_cell {} rejected: {}", pos, err);
                    return Err(err);
                }

                self.commit_edges(pos, &refs);
                self.cells.insert(pos, cell);
            }
        }

        debug!("set_cell {} = {:?}", pos, text);
        Ok(())
    }

    /// Looks up the cell stored at `pos`, if any.
    pub fn get_cell(&self, pos: Position) -> SheetResult<Option<&Cell>> {
        ensure_valid(pos)?;
        Ok(self.cells.get(&pos))
    }

    /// Removes the cell at `pos`. Dependents see it as an absent cell (0).
    pub fn clear_cell(&mut self, pos: Position) -> SheetResult<()> {
        ensure_valid(pos)?;

        if self.cells.remove(&pos).is_some() {
            self.dependencies.clear_dependencies(pos);
            self.invalidate_dependents(pos);
            debug!("clear_cell {}", pos);
        }
        Ok(())
    }

    /// The value shown at `pos`; absent cells read as 0.
    pub fn value(&self, pos: Position) -> SheetResult<CellValue> {
        Ok(match self.get_cell(pos)? {
            Some(cell) => cell.value(self),
            None => CellValue::Number(0.0),
        })
    }

    /// The text stored at `pos`; absent cells read as "".
    pub fn text(&self, pos: Position) -> SheetResult<String> {
        Ok(self.get_cell(pos)?.map(Cell::text).unwrap_or_default())
    }

    /// Direct dependents of `pos`, sorted.
    pub fn dependents(&self, pos: Position) -> Vec<Position> {
        let mut deps: Vec<Position> = self
            .dependencies
            .get_dependents(pos)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        deps.sort_unstable();
        deps
    }

    /// The smallest A1-anchored rectangle holding every non-empty cell.
    pub fn printable_size(&self) -> Size {
        self.cells
            .iter()
            .filter(|(_, cell)| cell.kind() != CellKind::Empty)
            .fold(Size::default(), |size, (pos, _)| Size {
                rows: size.rows.max(pos.row + 1),
                cols: size.cols.max(pos.col + 1),
            })
    }

    /// Writes computed values, tab-separated, one line per row.
    pub fn print_values<W: Write>(&self, output: &mut W) -> io::Result<()> {
        self.print_with(output, |cell| cell.value(self).to_string())
    }

    /// Writes source texts, tab-separated, one line per row.
    pub fn print_texts<W: Write>(&self, output: &mut W) -> io::Result<()> {
        self.print_with(output, Cell::text)
    }

    pub fn stats(&self) -> SheetStats {
        SheetStats {
            cells: self.cells.len(),
            formula_cells: self
                .cells
                .values()
                .filter(|cell| cell.kind() == CellKind::Formula)
                .count(),
            dependency_edges: self.dependencies.dependency_count(),
            invalidations: self.invalidations,
            evaluations: self.evaluations.get(),
        }
    }

    pub(crate) fn cell_at(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    pub(crate) fn record_evaluation(&self) {
        self.evaluations.set(self.evaluations.get() + 1);
    }

    /// Evaluates every uncached formula reachable from `roots`, deepest
    /// first, so that no evaluation has to recurse into another.
    pub(crate) fn evaluate_precedents(&self, roots: &[Position]) {
        let mut expanded = FxHashSet::default();
        let mut stack: Vec<(Position, bool)> = roots.iter().map(|&pos| (pos, false)).collect();

        while let Some((pos, children_done)) = stack.pop() {
            let Some(cell) = self.cells.get(&pos) else {
                continue;
            };
            if !cell.needs_evaluation() {
                continue;
            }
            if children_done {
                cell.evaluate_cached(self);
                continue;
            }
            if !expanded.insert(pos) {
                continue;
            }
            stack.push((pos, true));
            stack.extend(cell.referenced_cells().iter().map(|&p| (p, false)));
        }
    }

    /// Walks everything reachable from `refs` looking for a way back to the
    /// cell under edit.
    ///
    /// Two conditions end the walk with an error: reaching the edited
    /// position, and reaching the edited cell object itself (`edited`).
    /// Referenced positions with no cell get an Empty placeholder, which
    /// stays even if the edit is rejected.
    fn check_circular(&mut self, pos: Position, edited: CellId, refs: &[Position]) -> SheetResult<()> {
        let mut visited = FxHashSet::default();
        let mut stack: Vec<Position> = refs.iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            if current == pos {
                return Err(SheetError::CircularDependency(pos));
            }
            if !visited.insert(current) {
                continue;
            }

            if !self.cells.contains_key(&current) {
                let id = self.allocate_id();
                self.cells.insert(current, Cell::empty(id));
                trace!("materialized empty cell at {}", current);
            }

            let Some(cell) = self.cells.get(&current) else {
                continue;
            };
            if cell.id() == edited {
                return Err(SheetError::CircularDependency(pos));
            }
            stack.extend(cell.referenced_cells().iter().rev().copied());
        }

        Ok(())
    }

    fn commit_edges(&mut self, pos: Position, refs: &[Position]) {
        match self.config.edge_policy {
            EdgePolicy::Precise => {
                self.dependencies.set_dependencies(pos, refs);
                self.invalidate_dependents(pos);
            }
            EdgePolicy::Legacy => {
                self.invalidate_dependents(pos);
                self.dependencies.clear_dependents(pos);
                self.dependencies.add_dependencies(pos, refs);
            }
        }
    }

    /// Clears the cache of every cell that transitively depends on `pos`.
    fn invalidate_dependents(&mut self, pos: Position) {
        for dep in self.dependencies.get_all_dependents(pos) {
            if let Some(cell) = self.cells.get_mut(&dep) {
                cell.invalidate_cache();
                self.invalidations += 1;
                trace!("invalidated {} (upstream {})", dep, pos);
            }
        }
    }

    fn allocate_id(&mut self) -> CellId {
        let id = CellId(self.next_id);
        self.next_id += 1;
        id
    }

    fn print_with<W, F>(&self, output: &mut W, render: F) -> io::Result<()>
    where
        W: Write,
        F: Fn(&Cell) -> String,
    {
        let size = self.printable_size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    output.write_all(b"\t")?;
                }
                match self.cells.get(&Position::new(row, col)) {
                    Some(cell) if cell.kind() != CellKind::Empty => {
                        output.write_all(render(cell).as_bytes())?;
                    }
                    _ => {}
                }
            }
            output.write_all(b"\n")?;
        }
        Ok(())
    }
}

fn ensure_valid(pos: Position) -> SheetResult<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(SheetError::InvalidPosition(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::FormulaError;

    fn p(name: &str) -> Position {
        Position::parse(name).unwrap()
    }

    #[test]
    fn it_stores_and_reads_cells() {
        let mut sheet = Sheet::new();
        sheet.set_cell(p("A1"), "Hello").unwrap();

        let cell = sheet.get_cell(p("A1")).unwrap().unwrap();
        assert_eq!(cell.text(), "Hello");
        assert_eq!(sheet.value(p("A1")).unwrap(), CellValue::Text("Hello".to_string()));
        assert!(sheet.get_cell(p("B1")).unwrap().is_none());
    }

    #[test]
    fn invalid_positions_are_rejected_everywhere() {
        let mut sheet = Sheet::new();
        let bad = Position::new(Position::MAX_ROWS, 0);

        assert_eq!(sheet.set_cell(bad, "1"), Err(SheetError::InvalidPosition(bad)));
        assert_eq!(sheet.get_cell(bad).unwrap_err(), SheetError::InvalidPosition(bad));
        assert_eq!(sheet.clear_cell(bad), Err(SheetError::InvalidPosition(bad)));
        assert!(sheet.value(bad).is_err());
    }

    #[test]
    fn rewrite_keeps_cell_identity() {
        let mut sheet = Sheet::new();
        sheet.set_cell(p("A1"), "1").unwrap();
        let id = sheet.get_cell(p("A1")).unwrap().unwrap().id();

        sheet.set_cell(p("A1"), "=2+2").unwrap();
        assert_eq!(sheet.get_cell(p("A1")).unwrap().unwrap().id(), id);
    }

    #[test]
    fn syntax_error_leaves_sheet_unchanged() {
        let mut sheet = Sheet::new();
        sheet.set_cell(p("A1"), "=B1*2").unwrap();

        let err = sheet.set_cell(p("A1"), "=B1*").unwrap_err();
        assert!(matches!(err, SheetError::FormulaSyntax { category: FormulaError::Ref, .. }));
        assert_eq!(sheet.text(p("A1")).unwrap(), "=B1*2");

        assert!(sheet.set_cell(p("C1"), "=)").is_err());
        assert!(sheet.get_cell(p("C1")).unwrap().is_none());
    }

    #[test]
    fn precise_edges_follow_rewrites() {
        let mut sheet = Sheet::new();
        sheet.set_cell(p("C1"), "=A1+B1").unwrap();
        assert_eq!(sheet.dependents(p("A1")), vec![p("C1")]);

        sheet.set_cell(p("C1"), "=B1").unwrap();
        assert!(sheet.dependents(p("A1")).is_empty());
        assert_eq!(sheet.dependents(p("B1")), vec![p("C1")]);
        assert_eq!(sheet.stats().dependency_edges, 1);
    }

    #[test]
    fn clear_drops_outgoing_edges_and_cascades() {
        let mut sheet = Sheet::new();
        sheet.set_cell(p("A1"), "=3").unwrap();
        sheet.set_cell(p("B1"), "=A1*2").unwrap();
        assert_eq!(sheet.value(p("B1")).unwrap(), CellValue::Number(6.0));

        sheet.set_cell(p("A1"), "=C1").unwrap();
        sheet.clear_cell(p("A1")).unwrap();

        assert!(sheet.get_cell(p("A1")).unwrap().is_none());
        assert!(sheet.dependents(p("C1")).is_empty());
        assert_eq!(sheet.dependents(p("A1")), vec![p("B1")]);
        assert_eq!(sheet.value(p("B1")).unwrap(), CellValue::Number(0.0));
    }

    #[test]
    fn clearing_an_absent_cell_is_a_no_op() {
        let mut sheet = Sheet::new();
        sheet.clear_cell(p("Z9")).unwrap();
        assert_eq!(sheet.stats(), SheetStats::default());
    }

    #[test]
    fn printable_size_ignores_placeholders() {
        let mut sheet = Sheet::new();
        assert_eq!(sheet.printable_size(), Size::new(0, 0));

        sheet.set_cell(p("B2"), "=D10").unwrap();
        assert!(sheet.get_cell(p("D10")).unwrap().is_some());
        assert_eq!(sheet.printable_size(), Size::new(2, 2));

        sheet.set_cell(p("C3"), "x").unwrap();
        assert_eq!(sheet.printable_size(), Size::new(3, 3));

        sheet.clear_cell(p("C3")).unwrap();
        assert_eq!(sheet.printable_size(), Size::new(2, 2));
    }

    #[test]
    fn prints_values_and_texts() {
        let mut sheet = Sheet::new();
        sheet.set_cell(p("A1"), "=1/2").unwrap();
        sheet.set_cell(p("B1"), "'=x").unwrap();
        sheet.set_cell(p("A2"), "=1/0").unwrap();

        let mut values = Vec::new();
        sheet.print_values(&mut values).unwrap();
        assert_eq!(String::from_utf8(values).unwrap(), "0.5\t=x\n#DIV/0!\t\n");

        let mut texts = Vec::new();
        sheet.print_texts(&mut texts).unwrap();
        assert_eq!(String::from_utf8(texts).unwrap(), "=1/2\t'=x\n=1/0\t\n");
    }

    #[test]
    fn empty_cells_print_as_blank_fields() {
        let mut sheet = Sheet::new();
        sheet.set_cell(p("A1"), "=B1").unwrap();
        sheet.set_cell(p("C1"), "x").unwrap();
        sheet.set_cell(p("A2"), "y").unwrap();
        sheet.set_cell(p("A2"), "").unwrap();
        sheet.set_cell(p("B2"), "z").unwrap();

        let mut values = Vec::new();
        sheet.print_values(&mut values).unwrap();
        assert_eq!(String::from_utf8(values).unwrap(), "0\t\tx\n\tz\t\n");

        let mut texts = Vec::new();
        sheet.print_texts(&mut texts).unwrap();
        assert_eq!(String::from_utf8(texts).unwrap(), "=B1\t\tx\n\tz\t\n");
    }

    #[test]
    fn reads_deep_chains_without_recursing() {
        let mut sheet = Sheet::new();
        sheet.set_cell(Position::new(0, 0), "=1").unwrap();
        for row in 1..2000 {
            let above = Position::new(row - 1, 0);
            sheet.set_cell(Position::new(row, 0), &format!("={}+1", above)).unwrap();
        }

        assert_eq!(sheet.value(Position::new(1999, 0)).unwrap(), CellValue::Number(2000.0));
        assert_eq!(sheet.stats().evaluations, 2000);
    }
}
