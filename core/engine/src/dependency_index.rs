//! FILENAME: core/engine/src/dependency_index.rs
//! PURPOSE: Tracks which cells reference which, keyed by position.
//! CONTEXT: The sheet consults the reverse edges (dependents) to find every
//! cached formula that must be cleared when a cell changes. The forward
//! edges (precedents) mirror them so a rewrite can drop exactly the edges
//! the old formula contributed.
//!
//! TERMINOLOGY:
//! - Precedents: Cells that a formula cell references (its inputs).
//!   If A3 = A1 + A2, then A1 and A2 are precedents of A3.
//! - Dependents: Cells that reference a given cell (reverse lookup).
//!   If A3 = A1 + A2, then A3 is a dependent of A1 and A2.
//!
//! Both maps always hold the same set of edges. Cycle detection is not done
//! here: the sheet validates edits before they reach the index.

use std::collections::VecDeque;

use parser::Position;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Default)]
pub struct DependencyIndex {
    /// For each cell, the set of cells it directly depends on.
    precedents: FxHashMap<Position, FxHashSet<Position>>,

    /// For each cell, the set of cells that directly depend on it.
    dependents: FxHashMap<Position, FxHashSet<Position>>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dependencies for a cell, replacing any previous dependencies.
    pub fn set_dependencies(&mut self, cell: Position, new_precedents: &[Position]) {
        self.clear_dependencies(cell);
        self.add_dependencies(cell, new_precedents);
    }

    /// Adds edges from `cell` to each precedent without removing existing ones.
    pub fn add_dependencies(&mut self, cell: Position, precedents: &[Position]) {
        if precedents.is_empty() {
            return;
        }

        for &prec in precedents {
            self.dependents.entry(prec).or_default().insert(cell);
        }
        self.precedents
            .entry(cell)
            .or_default()
            .extend(precedents.iter().copied());
    }

    /// Removes every edge from `cell` to its precedents.
    /// Call this when a cell becomes a literal value or is cleared.
    pub fn clear_dependencies(&mut self, cell: Position) {
        if let Some(old_precs) = self.precedents.remove(&cell) {
            for prec in old_precs {
                remove_edge(&mut self.dependents, prec, cell);
            }
        }
    }

    /// Removes every edge pointing at `cell`, i.e. forgets who depends on it.
    pub fn clear_dependents(&mut self, cell: Position) {
        if let Some(old_deps) = self.dependents.remove(&cell) {
            for dep in old_deps {
                remove_edge(&mut self.precedents, dep, cell);
            }
        }
    }

    /// Returns the direct precedents of a cell.
    pub fn get_precedents(&self, cell: Position) -> Option<&FxHashSet<Position>> {
        self.precedents.get(&cell)
    }

    /// Returns the direct dependents of a cell.
    pub fn get_dependents(&self, cell: Position) -> Option<&FxHashSet<Position>> {
        self.dependents.get(&cell)
    }

    /// Gets all transitive dependents of a cell.
    /// Uses BFS to traverse the dependent chains. The visited set also keeps
    /// the walk finite if the edges ever form a loop.
    pub fn get_all_dependents(&self, cell: Position) -> Vec<Position> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();

        if let Some(deps) = self.dependents.get(&cell) {
            queue.extend(deps.iter().copied());
        }

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);

            if let Some(deps) = self.dependents.get(&current) {
                queue.extend(deps.iter().copied().filter(|dep| !seen.contains(dep)));
            }
        }

        order
    }

    /// Returns the total number of cells that have dependencies.
    pub fn formula_cell_count(&self) -> usize {
        self.precedents.len()
    }

    /// Returns the total number of dependency relationships.
    pub fn dependency_count(&self) -> usize {
        self.precedents.values().map(|v| v.len()).sum()
    }

    pub fn clear(&mut self) {
        self.precedents.clear();
        self.dependents.clear();
    }
}

fn remove_edge(map: &mut FxHashMap<Position, FxHashSet<Position>>, key: Position, value: Position) {
    if let Some(set) = map.get_mut(&key) {
        set.remove(&value);
        if set.is_empty() {
            map.remove(&key);
        }
    }
}
