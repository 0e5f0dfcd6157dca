pub mod outline_parser;
pub mod outline_serializer;

pub use outline_parser::{ParseError, ParseReport, parse_outline, parse_outline_with_report};
pub use outline_serializer::serialize_outline;

/// Deepest heading level the outline uses
pub const MAX_DEPTH: usize = 3;

/// Heading depth of a line: 1–3 `#` followed by a space or end of line.
/// Longer runs (`####`) and `#word` are not headings.
pub fn heading_depth(line: &str) -> Option<usize> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > MAX_DEPTH {
        return None;
    }
    match line.as_bytes().get(hashes) {
        None | Some(b' ') | Some(b'\t') => Some(hashes),
        _ => None,
    }
}

/// A heading line behind one or more backslashes, e.g. `\\# text`
pub fn is_escaped_heading(line: &str) -> bool {
    let rest = line.trim_start_matches('\\');
    rest.len() < line.len() && heading_depth(rest).is_some()
}
