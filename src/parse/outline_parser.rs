use crate::model::cell::{Cell, CellId, normalize_content, normalize_title};
use crate::model::mandala::{BRANCHES, MAIN_RANKS, Mandala, SUB_RANKS};
use crate::parse::{heading_depth, is_escaped_heading};

/// Grammar example shown to the user when an outline can't be imported
pub const EXPECTED_FORMAT: &str = "\
Expected format:

# Center theme
Center theme content

## 甲 Theme 1
Theme 1 content

### A Sub-theme 1
Sub-theme 1 content";

/// Error type for outline parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no center theme found: the outline needs a `# ` heading\n\n{}", EXPECTED_FORMAT)]
    NoCenterTheme,
    #[error("invalid outline structure: the outline contains no themes\n\n{}", EXPECTED_FORMAT)]
    InvalidStructure,
}

/// A parsed tree plus the heading lines that were dropped on the way
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub mandala: Mandala,
    /// Headings that had nowhere to go: a second center, a ninth main or
    /// sub cell, or a sub heading with no main cell above it
    pub dropped: Vec<String>,
}

/// A node under construction
#[derive(Debug, Default)]
struct Draft {
    title: String,
    content: Vec<String>,
    children: Vec<Draft>,
}

impl Draft {
    fn new(title: String) -> Self {
        Draft {
            title,
            ..Default::default()
        }
    }
}

/// Where the next content line goes
#[derive(Debug, Clone, Copy)]
enum Target {
    Root,
    Main(usize),
    Sub(usize, usize),
    Discard,
}

/// Parse outline text into a complete tree, logging any dropped headings.
pub fn parse_outline(source: &str) -> Result<Mandala, ParseError> {
    let report = parse_outline_with_report(source)?;
    for line in &report.dropped {
        tracing::warn!(heading = %line, "dropped outline heading with no slot");
    }
    Ok(report.mandala)
}

/// Parse outline text into a complete tree.
///
/// Rank symbols are assigned by order of appearance; a symbol written at the
/// start of a heading is stripped when it matches the one being assigned.
/// Missing main and sub cells are padded with empty cells, extra ones are
/// dropped and listed in the report.
pub fn parse_outline_with_report(source: &str) -> Result<ParseReport, ParseError> {
    let mut root: Option<Draft> = None;
    let mut current_main: Option<usize> = None;
    let mut target = Target::Discard;
    let mut dropped = Vec::new();

    for line in source.lines() {
        let line = line.trim_end_matches('\r');

        let Some(depth) = heading_depth(line) else {
            if let Some(root) = root.as_mut() {
                push_content(root, target, unescape_content_line(line));
            }
            continue;
        };
        let text = line[depth..].trim();

        let Some(root) = root.as_mut() else {
            if depth == 1 {
                root = Some(Draft::new(text.to_string()));
                target = Target::Root;
            } else {
                // Headings before the center have no tree to join
                dropped.push(line.to_string());
            }
            continue;
        };

        target = match depth {
            1 => {
                dropped.push(line.to_string());
                Target::Discard
            }
            2 => {
                let i = root.children.len();
                if i < BRANCHES {
                    root.children
                        .push(Draft::new(strip_rank(text, MAIN_RANKS[i]).to_string()));
                    current_main = Some(i);
                    Target::Main(i)
                } else {
                    dropped.push(line.to_string());
                    current_main = None;
                    Target::Discard
                }
            }
            _ => match current_main {
                Some(i) => {
                    let main = &mut root.children[i];
                    let j = main.children.len();
                    if j < BRANCHES {
                        main.children
                            .push(Draft::new(strip_rank(text, SUB_RANKS[j]).to_string()));
                        Target::Sub(i, j)
                    } else {
                        dropped.push(line.to_string());
                        Target::Discard
                    }
                }
                None => {
                    dropped.push(line.to_string());
                    Target::Discard
                }
            },
        };
    }

    let root = root.ok_or(ParseError::NoCenterTheme)?;
    let is_empty = root.title.is_empty()
        && root.content.iter().all(|l| l.trim().is_empty())
        && root.children.is_empty();
    if is_empty {
        return Err(ParseError::InvalidStructure);
    }

    Ok(ParseReport {
        mandala: build_mandala(root),
        dropped,
    })
}

fn push_content(root: &mut Draft, target: Target, line: String) {
    let node = match target {
        Target::Root => root,
        Target::Main(i) => &mut root.children[i],
        Target::Sub(i, j) => &mut root.children[i].children[j],
        Target::Discard => return,
    };
    node.content.push(line);
}

/// Strip a leading rank symbol that matches the one being assigned
fn strip_rank<'a>(text: &'a str, rank: &str) -> &'a str {
    match text.strip_prefix(rank) {
        Some("") => "",
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => text,
    }
}

/// Undo the serializer's backslash escape on heading-like content lines:
/// exactly one leading backslash comes off
fn unescape_content_line(line: &str) -> String {
    if let Some(rest) = line.strip_prefix('\\')
        && (heading_depth(rest).is_some() || is_escaped_heading(rest))
    {
        return rest.to_string();
    }
    line.to_string()
}

/// Turn the drafts into a full-shape tree, padding to 8 mains x 8 subs
fn build_mandala(root: Draft) -> Mandala {
    let mut mains = root.children.into_iter();
    let children = (0..BRANCHES)
        .map(|i| {
            let draft = mains.next().unwrap_or_default();
            let mut main = finish_cell(CellId::main(i), MAIN_RANKS[i], draft.title, &draft.content);
            let mut subs = draft.children.into_iter();
            main.children = (0..BRANCHES)
                .map(|j| {
                    let sub = subs.next().unwrap_or_default();
                    finish_cell(CellId::sub(i, j), SUB_RANKS[j], sub.title, &sub.content)
                })
                .collect();
            main
        })
        .collect();

    let mut cell = finish_cell(CellId::center(), "", root.title, &root.content);
    cell.children = children;
    Mandala { root: cell }
}

fn finish_cell(id: CellId, label: &str, title: String, content: &[String]) -> Cell {
    Cell {
        id,
        label: label.to_string(),
        title: normalize_title(&title),
        content: normalize_content(&content.join("\n")),
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn end_to_end_minimal_outline() {
        let m = parse_outline("# Center\nC\n\n## M1\nM1c\n\n### S1\nS1c").unwrap();
        assert!(m.is_well_formed());
        assert_eq!(m.root.title, "Center");
        assert_eq!(m.root.content, "C");

        let first = &m.root.children[0];
        assert_eq!(first.label, "甲");
        assert_eq!(first.title, "M1");
        assert_eq!(first.content, "M1c");
        assert_eq!(first.children[0].label, "A");
        assert_eq!(first.children[0].title, "S1");
        assert_eq!(first.children[0].content, "S1c");
        for sub in &first.children[1..] {
            assert_eq!(sub.title, "");
            assert_eq!(sub.content, "");
        }
        for main in &m.root.children[1..] {
            assert_eq!(main.title, "");
            assert_eq!(main.content, "");
            assert_eq!(main.children.len(), 8);
            assert!(main.children.iter().all(|s| s.title.is_empty() && s.content.is_empty()));
        }
    }

    #[test]
    fn title_only_pads_to_full_shape() {
        let m = parse_outline("# Only Title").unwrap();
        assert!(m.is_well_formed());
        assert_eq!(m.cell_count(), 73);
        assert_eq!(m.root.title, "Only Title");
    }

    #[test]
    fn no_center_heading_fails() {
        assert_eq!(parse_outline(""), Err(ParseError::NoCenterTheme));
        assert_eq!(
            parse_outline("## 甲 Main\n### A Sub\nsome text"),
            Err(ParseError::NoCenterTheme)
        );
        assert_eq!(parse_outline("#### deep\n#tag"), Err(ParseError::NoCenterTheme));
    }

    #[test]
    fn bare_center_fails_as_invalid_structure() {
        assert_eq!(parse_outline("#\n\n"), Err(ParseError::InvalidStructure));
        assert_eq!(parse_outline("#\n### A orphan"), Err(ParseError::InvalidStructure));
    }

    #[test]
    fn bare_center_with_content_is_accepted() {
        let m = parse_outline("#\nonly content").unwrap();
        assert_eq!(m.root.title, "");
        assert_eq!(m.root.content, "only content");
    }

    #[test]
    fn error_message_includes_grammar() {
        let msg = ParseError::NoCenterTheme.to_string();
        assert!(msg.contains("## 甲 Theme 1"));
        assert!(msg.contains("### A Sub-theme 1"));
    }

    #[test]
    fn ranks_are_positional() {
        let m = parse_outline("# C\n## 丙 first\n## second\n## 甲 third").unwrap();
        assert_eq!(m.root.children[0].label, "甲");
        // 丙 isn't the symbol assigned to slot 0, so it stays in the title
        assert_eq!(m.root.children[0].title, "丙 first");
        assert_eq!(m.root.children[1].title, "second");
        assert_eq!(m.root.children[2].label, "丙");
        assert_eq!(m.root.children[2].title, "甲 third");
    }

    #[test]
    fn matching_rank_is_stripped() {
        let m = parse_outline("# C\n## 甲 Goals\n### A Run\n### B\n## 乙").unwrap();
        assert_eq!(m.root.children[0].title, "Goals");
        assert_eq!(m.root.children[0].children[0].title, "Run");
        assert_eq!(m.root.children[0].children[1].title, "");
        assert_eq!(m.root.children[1].title, "");
    }

    #[test]
    fn rank_prefix_without_separator_is_kept() {
        let m = parse_outline("# C\n## 甲乙 together\n### Apple").unwrap();
        assert_eq!(m.root.children[0].title, "甲乙 together");
        assert_eq!(m.root.children[0].children[0].title, "Apple");
    }

    #[test]
    fn sub_before_any_main_is_discarded() {
        let report = parse_outline_with_report("# C\n### A orphan\norphan body\n## 甲 M\nbody").unwrap();
        assert_eq!(report.dropped, vec!["### A orphan".to_string()]);
        let m = report.mandala;
        assert_eq!(m.root.content, "");
        assert_eq!(m.root.children[0].title, "M");
        assert_eq!(m.root.children[0].content, "body");
        assert!(m.root.children[0].children.iter().all(|s| s.title.is_empty()));
    }

    #[test]
    fn sub_counter_resets_per_main() {
        let m = parse_outline("# C\n## one\n### x\n### y\n## two\n### z").unwrap();
        assert_eq!(m.root.children[0].children[1].title, "y");
        assert_eq!(m.root.children[1].children[0].label, "A");
        assert_eq!(m.root.children[1].children[0].title, "z");
    }

    #[test]
    fn extra_mains_are_truncated() {
        let mut text = String::from("# C\n");
        for i in 0..10 {
            text.push_str(&format!("## main {}\nbody {}\n### sub of {}\n", i, i, i));
        }
        let report = parse_outline_with_report(&text).unwrap();
        assert!(report.mandala.is_well_formed());
        assert_eq!(report.mandala.root.children[7].title, "main 7");
        assert_eq!(report.mandala.root.children[7].children[0].title, "sub of 7");
        assert_eq!(
            report.dropped,
            vec!["## main 8", "### sub of 8", "## main 9", "### sub of 9"]
        );
    }

    #[test]
    fn extra_subs_are_truncated() {
        let mut text = String::from("# C\n## M\n");
        for j in 0..9 {
            text.push_str(&format!("### s{}\n", j));
        }
        text.push_str("tail content\n");
        let report = parse_outline_with_report(&text).unwrap();
        let main = &report.mandala.root.children[0];
        assert_eq!(main.children.len(), 8);
        assert_eq!(main.children[7].title, "s7");
        assert_eq!(main.children[7].content, "");
        assert_eq!(report.dropped, vec!["### s8"]);
    }

    #[test]
    fn second_center_is_dropped() {
        let report = parse_outline_with_report("# First\n# Second\nsecond body\n## M").unwrap();
        assert_eq!(report.mandala.root.title, "First");
        assert_eq!(report.mandala.root.content, "");
        assert_eq!(report.mandala.root.children[0].title, "M");
        assert_eq!(report.dropped, vec!["# Second"]);
    }

    #[test]
    fn preamble_before_center_is_ignored() {
        let m = parse_outline("Exported notes\n\n# C\nbody").unwrap();
        assert_eq!(m.root.title, "C");
        assert_eq!(m.root.content, "body");
    }

    #[test]
    fn multiline_content_keeps_inner_blank_lines() {
        let m = parse_outline("# C\n\nfirst\n\nsecond\n\n\n## M").unwrap();
        assert_eq!(m.root.content, "first\n\nsecond");
    }

    #[test]
    fn deep_headings_are_content() {
        let m = parse_outline("# C\n#### not a heading\n#tag").unwrap();
        assert_eq!(m.root.content, "#### not a heading\n#tag");
    }

    #[test]
    fn escaped_heading_content_is_unescaped() {
        let m = parse_outline("# C\n\\# literal\n\\\\# double\n\\\\\\# triple").unwrap();
        assert_eq!(m.root.content, "# literal\n\\# double\n\\\\# triple");
    }

    #[test]
    fn crlf_input() {
        let m = parse_outline("# C\r\nbody\r\n\r\n## 甲 M\r\n").unwrap();
        assert_eq!(m.root.title, "C");
        assert_eq!(m.root.content, "body");
        assert_eq!(m.root.children[0].title, "M");
    }

    #[test]
    fn strip_rank_cases() {
        assert_eq!(strip_rank("甲", "甲"), "");
        assert_eq!(strip_rank("甲 Title", "甲"), "Title");
        assert_eq!(strip_rank("甲Title", "甲"), "甲Title");
        assert_eq!(strip_rank("乙 Title", "甲"), "乙 Title");
        assert_eq!(strip_rank("A  spaced", "A"), "spaced");
    }
}
