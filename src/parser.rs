use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::block::Block;
use crate::title::strip_leading_title;

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s+").expect("numbered item pattern"));
static ALIGNMENT_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-+:?$").expect("alignment cell pattern"));

const BULLET_MARKERS: [&str; 3] = ["- ", "* ", "\u{2022} "];

/// What a single line looks like on its own, before any lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Rule,
    Heading,
    Table,
    Bullet,
    Numbered,
    Paragraph,
}

/// One row of the classification table.
struct Classifier {
    kind: LineKind,
    /// Receives the trimmed line.
    matches: fn(&str) -> bool,
    /// Consumes the line under the cursor (and any lines belonging with it).
    build: fn(&mut Cursor<'_>) -> Option<Block>,
}

/// Classification rules in priority order. The first classifier whose matcher
/// accepts the current line decides what gets built. The paragraph classifier
/// accepts everything, so every line is classified.
const CLASSIFIERS: &[Classifier] = &[
    Classifier { kind: LineKind::Blank, matches: is_blank, build: skip_line },
    Classifier { kind: LineKind::Rule, matches: is_rule, build: build_rule },
    Classifier { kind: LineKind::Heading, matches: is_heading, build: build_heading },
    Classifier { kind: LineKind::Table, matches: is_table_start, build: build_table },
    Classifier { kind: LineKind::Bullet, matches: is_bullet, build: build_bullet_list },
    Classifier { kind: LineKind::Numbered, matches: is_numbered, build: build_numbered_list },
    Classifier { kind: LineKind::Paragraph, matches: any_line, build: build_paragraph },
];

/// Parse report markdown into blocks, dropping a duplicated leading title first.
pub fn parse(markdown: &str) -> Vec<Block> {
    parse_blocks(strip_leading_title(markdown))
}

/// Parse markdown into blocks without the title pass.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut cursor = Cursor::new(markdown);
    let mut blocks = Vec::new();

    while let Some(line) = cursor.peek() {
        let classifier = classifier_for(line.trim());
        if let Some(block) = (classifier.build)(&mut cursor) {
            blocks.push(block);
        }
    }

    debug!(blocks = blocks.len(), "parsed markdown");
    blocks
}

/// Classify a single line using the priority table.
pub fn classify(line: &str) -> LineKind {
    classifier_for(line.trim()).kind
}

fn classifier_for(trimmed: &str) -> &'static Classifier {
    CLASSIFIERS
        .iter()
        .find(|classifier| (classifier.matches)(trimmed))
        .unwrap_or(&CLASSIFIERS[CLASSIFIERS.len() - 1])
}

struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }
}

// Matchers

fn any_line(_line: &str) -> bool {
    true
}

fn is_blank(line: &str) -> bool {
    line.is_empty()
}

fn is_rule(line: &str) -> bool {
    matches!(line, "---" | "***" | "___")
}

fn is_heading(line: &str) -> bool {
    heading_parts(line).is_some()
}

fn is_table_start(line: &str) -> bool {
    line.starts_with('|') && line[1..].contains('|')
}

fn is_bullet(line: &str) -> bool {
    bullet_item(line).is_some()
}

fn is_numbered(line: &str) -> bool {
    numbered_item(line).is_some()
}

/// Hash count and heading text, when the line is `#`s, whitespace, then text.
fn heading_parts(line: &str) -> Option<(usize, &str)> {
    let hashes = line.len() - line.trim_start_matches('#').len();
    if hashes == 0 {
        return None;
    }
    let rest = &line[hashes..];
    let text = rest.trim();
    if !rest.starts_with(char::is_whitespace) || text.is_empty() {
        return None;
    }
    Some((hashes, text))
}

fn bullet_item(line: &str) -> Option<&str> {
    BULLET_MARKERS
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

fn numbered_item(line: &str) -> Option<&str> {
    NUMBERED_ITEM.find(line).map(|m| line[m.end()..].trim())
}

// Builders

fn skip_line(cursor: &mut Cursor<'_>) -> Option<Block> {
    cursor.next_line();
    None
}

fn build_rule(cursor: &mut Cursor<'_>) -> Option<Block> {
    cursor.next_line()?;
    Some(Block::Rule)
}

fn build_heading(cursor: &mut Cursor<'_>) -> Option<Block> {
    let line = cursor.next_line()?;
    let (hashes, text) = heading_parts(line.trim())?;
    let level = match hashes {
        1 => 0,
        2 => 1,
        _ => 2,
    };
    Some(Block::Heading {
        level,
        text: text.to_string(),
    })
}

fn build_paragraph(cursor: &mut Cursor<'_>) -> Option<Block> {
    let line = cursor.next_line()?;
    Some(Block::Paragraph {
        text: line.trim().to_string(),
    })
}

fn build_table(cursor: &mut Cursor<'_>) -> Option<Block> {
    let mut rows: Vec<Vec<String>> = Vec::new();

    while let Some(line) = cursor.peek() {
        let trimmed = line.trim();
        if !trimmed.starts_with('|') {
            break;
        }
        cursor.next_line();

        let cells = table_cells(trimmed);
        if cells.iter().all(|cell| ALIGNMENT_CELL.is_match(cell)) {
            continue;
        }
        rows.push(cells);
    }

    let width = rows.iter().map(Vec::len).max()?;
    for row in &mut rows {
        row.resize(width, String::new());
    }
    Some(Block::Table { rows })
}

fn table_cells(line: &str) -> Vec<String> {
    line.trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn build_bullet_list(cursor: &mut Cursor<'_>) -> Option<Block> {
    let items = consume_list(cursor, bullet_item);
    Some(Block::BulletList { items })
}

fn build_numbered_list(cursor: &mut Cursor<'_>) -> Option<Block> {
    let items = consume_list(cursor, numbered_item);
    Some(Block::NumberedList { items })
}

/// Collect list items until a line is neither a new item nor an indented
/// continuation of the previous one.
fn consume_list(cursor: &mut Cursor<'_>, item: fn(&str) -> Option<&str>) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();

    while let Some(line) = cursor.peek() {
        let trimmed = line.trim();
        if let Some(text) = item(trimmed) {
            items.push(text.to_string());
        } else if let Some(last) = items.last_mut().filter(|_| is_continuation(line)) {
            if !last.is_empty() {
                last.push(' ');
            }
            last.push_str(trimmed);
        } else {
            break;
        }
        cursor.next_line();
    }

    items
}

fn is_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t']) && !line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn para(text: &str) -> Block {
        Block::Paragraph {
            text: text.to_string(),
        }
    }

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    fn bullets(items: &[&str]) -> Block {
        Block::BulletList {
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("", LineKind::Blank)]
    #[case("   \t", LineKind::Blank)]
    #[case("---", LineKind::Rule)]
    #[case("  ***  ", LineKind::Rule)]
    #[case("___", LineKind::Rule)]
    #[case("----", LineKind::Paragraph)]
    #[case("# Title", LineKind::Heading)]
    #[case("## Section", LineKind::Heading)]
    #[case("#### Deep", LineKind::Heading)]
    #[case("#hashtag", LineKind::Paragraph)]
    #[case("| a | b |", LineKind::Table)]
    #[case("|a", LineKind::Paragraph)]
    #[case("- item", LineKind::Bullet)]
    #[case("* item", LineKind::Bullet)]
    #[case("\u{2022} item", LineKind::Bullet)]
    #[case("-item", LineKind::Paragraph)]
    #[case("**bold** start", LineKind::Paragraph)]
    #[case("1. first", LineKind::Numbered)]
    #[case("12) twelfth", LineKind::Numbered)]
    #[case("1.5x growth", LineKind::Paragraph)]
    #[case("Plain text", LineKind::Paragraph)]
    fn classification(#[case] line: &str, #[case] expected: LineKind) {
        assert_eq!(classify(line), expected);
    }

    #[test]
    fn heading_levels() {
        assert_eq!(
            parse_blocks("# One\n## Two\n### Three\n#### Four"),
            vec![
                heading(0, "One"),
                heading(1, "Two"),
                heading(2, "Three"),
                heading(2, "Four"),
            ]
        );
    }

    #[test]
    fn parse_strips_leading_title() {
        assert_eq!(
            parse("# Report\nSubtitle\n\n## Overview\nText"),
            vec![heading(1, "Overview"), para("Text")]
        );
    }

    #[test]
    fn list_continuation() {
        assert_eq!(
            parse_blocks("- item one\n  more text\n- item two"),
            vec![bullets(&["item one more text", "item two"])]
        );
    }

    #[test]
    fn numbered_list_with_continuation() {
        assert_eq!(
            parse_blocks("1. first\n\tcontinued\n2) second\nAfter"),
            vec![
                Block::NumberedList {
                    items: row(&["first continued", "second"]),
                },
                para("After"),
            ]
        );
    }

    #[test]
    fn unindented_line_ends_list() {
        assert_eq!(
            parse_blocks("- a\nnot indented\n- b"),
            vec![bullets(&["a"]), para("not indented"), bullets(&["b"])]
        );
    }

    #[test]
    fn indented_marker_starts_new_item() {
        assert_eq!(
            parse_blocks("- a\n  - nested\n- b"),
            vec![bullets(&["a", "nested", "b"])]
        );
    }

    #[test]
    fn paragraphs_are_not_merged() {
        assert_eq!(
            parse_blocks("line one\nline two"),
            vec![para("line one"), para("line two")]
        );
    }

    #[test]
    fn rule_between_paragraphs() {
        assert_eq!(
            parse_blocks("Above\n---\nBelow"),
            vec![para("Above"), Block::Rule, para("Below")]
        );
    }

    #[test]
    fn table_separator_dropped_and_rows_padded() {
        let md = "| Brand | Share | YoY |\n|:---|---:|:-:|\n| Acme | 12% |\n| Beta | 3% | +1% | extra |";
        assert_eq!(
            parse_blocks(md),
            vec![Block::Table {
                rows: vec![
                    row(&["Brand", "Share", "YoY", ""]),
                    row(&["Acme", "12%", "", ""]),
                    row(&["Beta", "3%", "+1%", "extra"]),
                ],
            }]
        );
    }

    #[test]
    fn separator_only_table_is_dropped() {
        assert_eq!(
            parse_blocks("|---|---|\n| :-: | -- |\nAfter"),
            vec![para("After")]
        );
    }

    #[test]
    fn blank_lines_between_blocks_do_not_change_blocks() {
        let tight = "## A\nText\n| x | y |\n|---|---|\n| 1 | 2 |\n---\n1. one";
        let loose = "\n\n## A\n\n\nText\n\n| x | y |\n|---|---|\n| 1 | 2 |\n\n---\n\n\n1. one\n\n";
        assert_eq!(parse_blocks(tight), parse_blocks(loose));
    }

    #[test]
    fn windows_line_endings() {
        assert_eq!(
            parse_blocks("## A\r\n- x\r\n  y\r\n"),
            vec![heading(1, "A"), bullets(&["x y"])]
        );
    }
}
