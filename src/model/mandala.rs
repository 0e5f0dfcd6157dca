use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellId, CellKind};

/// Number of main cells around the center, and of sub cells around each main cell
pub const BRANCHES: usize = 8;

/// Rank symbols for the main cells, in canonical order
pub const MAIN_RANKS: [&str; BRANCHES] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛"];

/// Rank symbols for the sub cells, in canonical order
pub const SUB_RANKS: [&str; BRANCHES] = ["A", "B", "C", "D", "E", "F", "G", "H"];

/// Grid (row, col) for each slot of a nine-cell view. Slot 0 is the center;
/// slots 1..=8 go bottom-middle, middle-left, top-middle, middle-right,
/// bottom-left, top-left, top-right, bottom-right.
pub const GRID_SLOTS: [(usize, usize); BRANCHES + 1] = [
    (1, 1),
    (2, 1),
    (1, 0),
    (0, 1),
    (1, 2),
    (2, 0),
    (0, 0),
    (0, 2),
    (2, 2),
];

/// Slot index shown at grid position (row, col)
pub fn slot_at(row: usize, col: usize) -> Option<usize> {
    GRID_SLOTS.iter().position(|&pos| pos == (row, col))
}

/// The whole two-level tree: root, 8 main cells, 8 sub cells under each
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mandala {
    pub root: Cell,
}

impl Mandala {
    /// A tree with the canonical shape and every field empty
    pub fn blank() -> Self {
        let children = (0..BRANCHES)
            .map(|i| {
                let mut main = Cell::empty(CellId::main(i), MAIN_RANKS[i]);
                main.children = (0..BRANCHES)
                    .map(|j| Cell::empty(CellId::sub(i, j), SUB_RANKS[j]))
                    .collect();
                main
            })
            .collect();
        let mut root = Cell::empty(CellId::center(), "");
        root.children = children;
        Mandala { root }
    }

    /// The built-in starter content shown on first launch
    pub fn placeholder() -> Self {
        let mut mandala = Mandala::blank();
        mandala.root.title = "Central theme".to_string();
        mandala.root.content = "What this mandala is about".to_string();
        for (i, main) in mandala.root.children.iter_mut().enumerate() {
            main.title = format!("Theme {}", i + 1);
            main.content = format!("Notes on theme {}", i + 1);
            for (j, sub) in main.children.iter_mut().enumerate() {
                sub.title = format!("{} idea {}", MAIN_RANKS[i], j + 1);
                sub.content = format!("Detail for {} idea {}", MAIN_RANKS[i], j + 1);
            }
        }
        mandala
    }

    pub fn main_cells(&self) -> &[Cell] {
        &self.root.children
    }

    /// Which level of the tree holds `id`, if any
    pub fn kind_of(&self, id: &CellId) -> Option<CellKind> {
        if self.root.id == *id {
            return Some(CellKind::Center);
        }
        for main in &self.root.children {
            if main.id == *id {
                return Some(CellKind::Main);
            }
            if main.children.iter().any(|sub| sub.id == *id) {
                return Some(CellKind::Sub);
            }
        }
        None
    }

    /// Position of a main cell among the root's children
    pub fn main_index(&self, id: &CellId) -> Option<usize> {
        self.root.children.iter().position(|c| c.id == *id)
    }

    /// Total number of cells in the tree
    pub fn cell_count(&self) -> usize {
        self.root.count()
    }

    /// Check the fixed-shape invariants: 8 mains, 8 subs each, canonical
    /// labels in canonical order, unique ids, no grandchildren below subs.
    pub fn is_well_formed(&self) -> bool {
        if !self.root.label.is_empty() || self.root.children.len() != BRANCHES {
            return false;
        }
        let mut seen = HashSet::new();
        seen.insert(&self.root.id);
        for (i, main) in self.root.children.iter().enumerate() {
            if main.label != MAIN_RANKS[i] || main.children.len() != BRANCHES {
                return false;
            }
            if !seen.insert(&main.id) {
                return false;
            }
            for (j, sub) in main.children.iter().enumerate() {
                if sub.label != SUB_RANKS[j] || sub.has_children() || !seen.insert(&sub.id) {
                    return false;
                }
            }
        }
        true
    }
}

impl Default for Mandala {
    fn default() -> Self {
        Mandala::placeholder()
    }
}
