use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a cell, unique across the whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(String);

impl CellId {
    pub fn new(id: impl Into<String>) -> Self {
        CellId(id.into())
    }

    /// Id minted for the root cell
    pub fn center() -> Self {
        CellId("center".to_string())
    }

    /// Id minted for the main cell in slot `i`
    pub fn main(i: usize) -> Self {
        CellId(format!("main-{}", i))
    }

    /// Id minted for sub cell `j` of main cell `i`
    pub fn sub(i: usize, j: usize) -> Self {
        CellId(format!("sub-{}-{}", i, j))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CellId {
    fn from(s: &str) -> Self {
        CellId(s.to_string())
    }
}

/// The two user-editable text fields of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Content,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Content => "content",
        }
    }

    pub fn parse_field(s: &str) -> Option<Field> {
        match s {
            "title" => Some(Field::Title),
            "content" => Some(Field::Content),
            _ => None,
        }
    }

    /// Titles are single-line; content may span lines
    pub fn is_multiline(self) -> bool {
        matches!(self, Field::Content)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Depth of a cell in the fixed-shape tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Center,
    Main,
    Sub,
}

/// One node of the mandala tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    /// Positional rank symbol (empty for the root)
    pub label: String,
    pub title: String,
    pub content: String,
    /// Present on the root and the main cells only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Cell>,
}

impl Cell {
    /// A leaf cell with empty text
    pub fn empty(id: CellId, label: &str) -> Self {
        Cell {
            id,
            label: label.to_string(),
            title: String::new(),
            content: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_text(mut self, title: &str, content: &str) -> Self {
        self.title = normalize_title(title);
        self.content = normalize_content(content);
        self
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Content => &self.content,
        }
    }

    /// Set a field, applying the field's normalization rules
    pub fn set_field(&mut self, field: Field, value: &str) {
        match field {
            Field::Title => self.title = normalize_title(value),
            Field::Content => self.content = normalize_content(value),
        }
    }

    pub fn clear_text(&mut self) {
        self.title.clear();
        self.content.clear();
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Count this cell and every descendant
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Cell::count).sum::<usize>()
    }
}

/// Titles are single-line: newlines fold to spaces, surrounding whitespace is trimmed.
pub fn normalize_title(s: &str) -> String {
    s.split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Content keeps inner lines verbatim but drops surrounding blank lines
/// and trailing `\r`.
pub fn normalize_content(s: &str) -> String {
    let lines: Vec<&str> = s.lines().map(|l| l.trim_end_matches('\r')).collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}
