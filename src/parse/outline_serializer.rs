use crate::model::cell::Cell;
use crate::model::mandala::Mandala;
use crate::parse::{heading_depth, is_escaped_heading};

/// Serialize the tree to its outline text: `#` for the center, `##` + rank
/// symbol for each main cell, `###` + rank symbol for each sub cell. Blocks
/// are separated by a blank line; empty content emits no content lines.
pub fn serialize_outline(mandala: &Mandala) -> String {
    let mut blocks = Vec::new();

    blocks.push(serialize_block(&mandala.root, 1));
    for main in &mandala.root.children {
        blocks.push(serialize_block(main, 2));
        for sub in &main.children {
            blocks.push(serialize_block(sub, 3));
        }
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

/// One heading line plus its content lines
fn serialize_block(cell: &Cell, depth: usize) -> String {
    let mut lines = vec![heading_line(cell, depth)];
    if !cell.content.is_empty() {
        lines.extend(cell.content.lines().map(escape_content_line));
    }
    lines.join("\n")
}

fn heading_line(cell: &Cell, depth: usize) -> String {
    let marker = "#".repeat(depth);
    let text = match (cell.label.is_empty(), cell.title.is_empty()) {
        (true, true) => String::new(),
        (true, false) => cell.title.clone(),
        (false, true) => cell.label.clone(),
        (false, false) => format!("{} {}", cell.label, cell.title),
    };
    if text.is_empty() {
        marker
    } else {
        format!("{} {}", marker, text)
    }
}

/// Content lines that would read as a heading, or as a heading behind any
/// number of backslashes, get one more leading backslash.
pub(crate) fn escape_content_line(line: &str) -> String {
    if heading_depth(line).is_some() || is_escaped_heading(line) {
        format!("\\{}", line)
    } else {
        line.to_string()
    }
}
