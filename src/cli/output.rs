use serde::Serialize;

use crate::model::cell::{Cell, CellKind};
use crate::model::mandala::{GRID_SLOTS, Mandala};
use crate::model::settings::Settings;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CellJson {
    pub id: String,
    pub kind: CellKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CellJson>,
}

#[derive(Serialize)]
pub struct GridCellJson {
    pub slot: usize,
    pub row: usize,
    pub col: usize,
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub title: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct GridJson {
    pub center: String,
    pub cells: Vec<GridCellJson>,
}

#[derive(Serialize)]
pub struct ImportJson {
    pub cells: usize,
    pub rewritten: bool,
    pub dropped: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub fn cell_to_json(mandala: &Mandala, cell: &Cell) -> CellJson {
    CellJson {
        id: cell.id.to_string(),
        kind: mandala.kind_of(&cell.id).unwrap_or(CellKind::Sub),
        label: cell.label.clone(),
        title: cell.title.clone(),
        content: cell.content.clone(),
        children: cell
            .children
            .iter()
            .map(|child| cell_to_json(mandala, child))
            .collect(),
    }
}

/// The nine cells of a grid in slot order, with their screen positions
pub fn grid_to_json(cells: &[&Cell]) -> GridJson {
    GridJson {
        center: cells.first().map(|c| c.id.to_string()).unwrap_or_default(),
        cells: cells
            .iter()
            .zip(GRID_SLOTS.iter())
            .enumerate()
            .map(|(slot, (cell, &(row, col)))| GridCellJson {
                slot,
                row,
                col,
                id: cell.id.to_string(),
                label: cell.label.clone(),
                title: cell.title.clone(),
                content: cell.content.clone(),
            })
            .collect(),
    }
}

/// A copy of the settings safe to print: API keys show only their tail
pub fn redact_settings(settings: &Settings) -> Settings {
    let mut shown = settings.clone();
    shown.api_key = redact_key(&settings.api_key);
    shown.deepseek_api_key = redact_key(&settings.deepseek_api_key);
    shown
}

fn redact_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One cell as `[id] label title`, followed by its content indented
pub fn format_cell_detail(cell: &Cell) -> Vec<String> {
    let mut lines = vec![format_cell_line(cell)];
    for line in cell.content.lines() {
        lines.push(format!("    {}", line));
    }
    lines
}

pub fn format_cell_line(cell: &Cell) -> String {
    let title = if cell.title.is_empty() {
        "(empty)"
    } else {
        cell.title.as_str()
    };
    if cell.label.is_empty() {
        format!("[{}] {}", cell.id, title)
    } else {
        format!("[{}] {} {}", cell.id, cell.label, title)
    }
}

/// The grid as three rows of three cells, slot order noted per cell
pub fn format_grid(cells: &[&Cell]) -> Vec<String> {
    let mut lines = Vec::new();
    for row in 0..3 {
        for col in 0..3 {
            let Some(slot) = GRID_SLOTS.iter().position(|&pos| pos == (row, col)) else {
                continue;
            };
            let Some(cell) = cells.get(slot) else {
                continue;
            };
            let marker = if slot == 0 { "*" } else { " " };
            lines.push(format!("{}{},{} {}", marker, row, col, format_cell_line(cell)));
        }
    }
    lines
}
