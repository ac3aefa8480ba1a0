use std::fmt::Write as _;

use crate::block::{Block, Span};
use crate::config::{Color, Config};
use crate::inline::{CodeSpans, parse_spans};
use crate::report::ReportMetadata;

/// Lists and tables up to this size are kept on one page.
const KEEP_TOGETHER_MAX: usize = 5;

/// Convert a report to Typst markup: preamble, cover page, then the blocks.
pub fn blocks_to_typst(blocks: &[Block], meta: &ReportMetadata, config: &Config) -> String {
    let mut out = String::new();
    emit_preamble(config, &mut out);
    emit_cover(meta, config, &mut out);

    let mut i = 0;
    while i < blocks.len() {
        let block = &blocks[i];

        match (block, blocks.get(i + 1)) {
            // Keep a heading on the same page as the paragraph it introduces
            (Block::Heading { .. }, Some(next @ Block::Paragraph { .. })) => {
                out.push_str("#block(breakable: false)[\n");
                emit_block(block, config, &mut out);
                emit_block(next, config, &mut out);
                out.push_str("]\n\n");
                i += 1;
            }
            _ => emit_block(block, config, &mut out),
        }

        i += 1;
    }

    out
}

fn rgb(color: &Color) -> String {
    format!("rgb(\"{}\")", color.hex())
}

fn emit_preamble(config: &Config, out: &mut String) {
    let colors = &config.colors;
    let font = &config.font;
    let page = &config.page;

    let families: Vec<String> = font.document.iter().map(|f| typst_string(f)).collect();

    out.push_str("#set page(\n");
    let _ = writeln!(out, "  width: {},", page.width);
    let _ = writeln!(out, "  height: {},", page.height);
    let _ = writeln!(out, "  margin: {},", page.margin);
    let _ = write!(
        out,
        "  header: align(right, text(size: 9pt, weight: \"bold\", fill: {})[",
        rgb(&colors.primary)
    );
    escape_markup(&config.brand.organization, out);
    out.push_str("]),\n");
    if page.numbers {
        let _ = writeln!(
            out,
            "  footer: context align(center, text(size: 9pt, fill: {})[#counter(page).display()]),",
            rgb(&colors.text)
        );
    }
    out.push_str(")\n");

    let _ = writeln!(
        out,
        "#set text(font: ({},), size: {}pt, fill: {})",
        families.join(", "),
        font.body_size,
        rgb(&colors.text)
    );
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    out.push_str("#show heading: set block(above: 12pt, below: 4pt)\n");
    let _ = writeln!(
        out,
        "#show heading.where(level: 1): set text(size: {}pt, weight: \"bold\", fill: {})",
        font.heading_size,
        rgb(&colors.primary)
    );
    let _ = writeln!(
        out,
        "#show heading.where(level: 2): set text(size: {}pt, weight: \"bold\", fill: {})",
        font.subheading_size,
        rgb(&colors.primary)
    );
    out.push('\n');
}

fn emit_cover(meta: &ReportMetadata, config: &Config, out: &mut String) {
    let colors = &config.colors;

    out.push_str("#v(2in)\n#align(center)[\n");
    let _ = write!(
        out,
        "#text(size: {}pt, weight: \"bold\", fill: {})[",
        config.font.title_size,
        rgb(&colors.primary)
    );
    escape_markup(meta.document_title(), out);
    out.push_str("]\n\n");

    cover_line(18.0, meta.report_type().cover_label(), out);
    if let Some(brand) = meta.target_brand() {
        cover_line(14.0, &format!("Target Brand: {brand}"), out);
    }
    if let Some(retailer) = meta.retailer() {
        cover_line(14.0, &format!("Prepared for: {retailer}"), out);
    }
    cover_line(12.0, &meta.formatted_date(), out);

    out.push_str("#v(1em)\n");
    out.push_str("#text(size: 11pt, style: \"italic\")[");
    escape_markup(&config.brand.prepared_by, out);
    out.push_str("]\n]\n#pagebreak()\n\n");
}

fn cover_line(size: f32, text: &str, out: &mut String) {
    let _ = write!(out, "#text(size: {size}pt)[");
    escape_markup(text, out);
    out.push_str("]\n\n");
}

fn emit_block(block: &Block, config: &Config, out: &mut String) {
    match block {
        Block::Heading { level: 0, text } => {
            // A title that survived de-duplication: section tier, tighter above
            out.push_str("#[\n#show heading: set block(above: 6pt)\n= ");
            inline_to_typst(text, out);
            out.push_str("\n]\n\n");
        }
        Block::Heading { level, text } => {
            out.push_str(if *level == 1 { "= " } else { "== " });
            inline_to_typst(text, out);
            out.push_str("\n\n");
        }
        Block::Paragraph { text } => {
            inline_to_typst(text, out);
            out.push_str("\n\n");
        }
        Block::BulletList { items } => emit_list("-", items, out),
        Block::NumberedList { items } => emit_list("+", items, out),
        Block::Table { rows } => emit_table(rows, config, out),
        Block::Rule => {
            let _ = writeln!(
                out,
                "#line(length: 100%, stroke: 0.5pt + {})\n",
                rgb(&config.colors.rule)
            );
        }
        // The document has no callout style; the extraction pass is web-only.
        Block::KillScreenCallout { items } => {
            let texts: Vec<String> = items
                .iter()
                .map(|item| format!("**{}**: {}", item.kind.label(), item.text))
                .collect();
            emit_list("-", &texts, out);
        }
    }
}

fn emit_list(marker: &str, items: &[String], out: &mut String) {
    let keep_together = items.len() <= KEEP_TOGETHER_MAX;
    if keep_together {
        out.push_str("#block(breakable: false)[\n");
    }
    for item in items {
        out.push_str(marker);
        out.push(' ');
        inline_to_typst(item, out);
        out.push('\n');
    }
    if keep_together {
        out.push_str("]\n");
    }
    out.push('\n');
}

fn emit_table(rows: &[Vec<String>], config: &Config, out: &mut String) {
    let Some((header, body)) = rows.split_first() else {
        return;
    };
    let colors = &config.colors;

    let keep_together = body.len() <= KEEP_TOGETHER_MAX;
    if keep_together {
        out.push_str("#block(breakable: false)[\n");
    }
    out.push_str("#[\n");
    let _ = writeln!(out, "#set text(size: {}pt)", config.font.table_size);
    let _ = writeln!(
        out,
        "#show table.cell.where(y: 0): set text(weight: \"bold\", fill: {})",
        rgb(&colors.on_primary)
    );
    out.push_str("#table(\n");
    let _ = writeln!(out, "  columns: {},", header.len());
    let _ = writeln!(
        out,
        "  fill: (x, y) => if y == 0 {{ {} }} else if calc.even(y) {{ {} }},",
        rgb(&colors.primary),
        rgb(&colors.band)
    );
    let _ = writeln!(out, "  stroke: 0.5pt + {},", rgb(&colors.rule));
    out.push_str("  inset: 5pt,\n");

    out.push_str("  table.header(");
    for (i, cell) in header.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('[');
        inline_to_typst(cell, out);
        out.push(']');
    }
    out.push_str("),\n");

    for row in body {
        out.push_str(" ");
        for cell in row {
            out.push_str(" [");
            inline_to_typst(cell, out);
            out.push_str("],");
        }
        out.push('\n');
    }
    out.push_str(")\n]\n");
    if keep_together {
        out.push_str("]\n");
    }
    out.push('\n');
}

/// Render one line of inline markdown. Backticks are not code here: they
/// come out as literal characters.
///
/// Emphasis uses `#strong[..]` and `#emph[..]` rather than `*` and `_`, which
/// Typst ignores when they sit inside a word.
fn inline_to_typst(text: &str, out: &mut String) {
    let spans = parse_spans(text, CodeSpans::Literal);
    let start = out.len();
    let mut spans = spans.iter().peekable();
    while let Some(span) = spans.next() {
        let styled = span_to_typst(span, out);
        // `.` or `(` right after `]` would continue the embedded expression
        if styled
            && spans
                .peek()
                .is_some_and(|next| next.text().starts_with(['.', '(']))
        {
            out.push(';');
        }
    }
    guard_enum_marker(out, start);
}

/// Returns whether the span was emitted as a function call.
fn span_to_typst(span: &Span, out: &mut String) -> bool {
    let function = match span {
        Span::Text(text) | Span::Code(text) => {
            escape_markup(text, out);
            return false;
        }
        Span::Bold(_) => "strong",
        Span::Italic(_) => "emph",
    };
    let _ = write!(out, "#{function}[");
    escape_markup(span.text(), out);
    out.push(']');
    true
}

/// Escape every character Typst markup would interpret.
fn escape_markup(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '/' | '~' | '='
            | '-' | '+' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

/// `2024.` at the start of a line would become an enumeration item.
fn guard_enum_marker(out: &mut String, start: usize) {
    let digits = out[start..].bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && out[start + digits..].starts_with('.') {
        out.insert(start + digits, '\\');
    }
}

fn typst_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{CalloutItem, CalloutKind};
    use crate::report::tests::sample_metadata;
    use pretty_assertions::assert_eq;

    fn body(blocks: &[Block]) -> String {
        let mut out = String::new();
        for block in blocks {
            emit_block(block, &Config::default(), &mut out);
        }
        out
    }

    fn para(text: &str) -> Block {
        Block::Paragraph {
            text: text.to_string(),
        }
    }

    #[test]
    fn headings_use_two_tiers() {
        let blocks = vec![
            Block::Heading {
                level: 1,
                text: "Overview".into(),
            },
            Block::Heading {
                level: 2,
                text: "Detail".into(),
            },
        ];
        assert_eq!(body(&blocks), "= Overview\n\n== Detail\n\n");
    }

    #[test]
    fn level_zero_heading_has_tighter_spacing() {
        let blocks = vec![Block::Heading {
            level: 0,
            text: "Title".into(),
        }];
        assert_eq!(
            body(&blocks),
            "#[\n#show heading: set block(above: 6pt)\n= Title\n]\n\n"
        );
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            body(&[para("This is **bold** and *italic*.")]),
            "This is #strong[bold] and #emph[italic];.\n\n"
        );
    }

    #[test]
    fn emphasis_inside_words() {
        assert_eq!(
            body(&[para("The **SpaceAid**s brand, x*foo* bar")]),
            "The #strong[SpaceAid]s brand, x#emph[foo] bar\n\n"
        );
    }

    #[test]
    fn emphasis_before_dot_or_paren_is_terminated() {
        assert_eq!(
            body(&[para("**Acme**.com and *net*(s)")]),
            "#strong[Acme];.com and #emph[net];(s)\n\n"
        );
    }

    #[test]
    fn markup_inside_emphasis_is_escaped() {
        assert_eq!(body(&[para("**[a] #1**")]), "#strong[\\[a\\] \\#1]\n\n");
    }

    #[test]
    fn inline_code_stays_literal() {
        assert_eq!(body(&[para("run `cargo`")]), "run \\`cargo\\`\n\n");
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(
            body(&[para("a # b @c $5 <x> [1] // +20% ~ = -3")]),
            "a \\# b \\@c \\$5 \\<x\\> \\[1\\] \\/\\/ \\+20% \\~ \\= \\-3\n\n"
        );
        assert_eq!(body(&[para("snake_case")]), "snake\\_case\n\n");
    }

    #[test]
    fn leading_number_with_dot_is_not_an_enum() {
        assert_eq!(body(&[para("2024. A good year")]), "2024\\. A good year\n\n");
        assert_eq!(body(&[para("1.5x growth")]), "1\\.5x growth\n\n");
    }

    #[test]
    fn bullet_list() {
        let blocks = vec![Block::BulletList {
            items: vec!["one".into(), "**two**".into()],
        }];
        assert_eq!(
            body(&blocks),
            "#block(breakable: false)[\n- one\n- #strong[two]\n]\n\n"
        );
    }

    #[test]
    fn long_numbered_list_may_break() {
        let items: Vec<String> = (1..=6).map(|n| format!("item {n}")).collect();
        let out = body(&[Block::NumberedList { items }]);
        assert!(!out.contains("breakable"));
        assert!(out.starts_with("+ item 1\n+ item 2\n"));
    }

    #[test]
    fn table_has_header_fill_and_banding() {
        let blocks = vec![Block::Table {
            rows: vec![
                vec!["Brand".into(), "Share".into()],
                vec!["Acme".into(), "12%".into()],
                vec!["Beta".into(), "".into()],
            ],
        }];
        let expected = concat!(
            "#block(breakable: false)[\n",
            "#[\n",
            "#set text(size: 9pt)\n",
            "#show table.cell.where(y: 0): set text(weight: \"bold\", fill: rgb(\"#FFFFFF\"))\n",
            "#table(\n",
            "  columns: 2,\n",
            "  fill: (x, y) => if y == 0 { rgb(\"#1F3864\") } else if calc.even(y) { rgb(\"#F2F2F2\") },\n",
            "  stroke: 0.5pt + rgb(\"#CCCCCC\"),\n",
            "  inset: 5pt,\n",
            "  table.header([Brand], [Share]),\n",
            "  [Acme], [12%],\n",
            "  [Beta], [],\n",
            ")\n",
            "]\n",
            "]\n\n",
        );
        assert_eq!(body(&blocks), expected);
    }

    #[test]
    fn rule_is_a_thin_line() {
        assert_eq!(
            body(&[Block::Rule]),
            "#line(length: 100%, stroke: 0.5pt + rgb(\"#CCCCCC\"))\n\n"
        );
    }

    #[test]
    fn callout_falls_back_to_bullets() {
        let blocks = vec![Block::KillScreenCallout {
            items: vec![CalloutItem {
                kind: CalloutKind::Leak,
                text: "Reviews".into(),
            }],
        }];
        assert_eq!(
            body(&blocks),
            "#block(breakable: false)[\n- #strong[The Leak]: Reviews\n]\n\n"
        );
    }

    #[test]
    fn heading_is_kept_with_following_paragraph() {
        let blocks = vec![
            Block::Heading {
                level: 1,
                text: "Overview".into(),
            },
            para("Text"),
        ];
        let out = blocks_to_typst(&blocks, &sample_metadata(), &Config::default());
        assert!(out.ends_with("#block(breakable: false)[\n= Overview\n\nText\n\n]\n\n"));
    }

    #[test]
    fn cover_page() {
        let meta = sample_metadata()
            .with_target_brand("SpaceAid")
            .with_retailer("Target");
        let out = blocks_to_typst(&[], &meta, &Config::default());

        assert!(out.contains("fill: rgb(\"#1F3864\"))[Teeth Whitening Strips]"));
        assert!(out.contains("#text(size: 18pt)[Subcategory Intelligence Report]"));
        assert!(out.contains("#text(size: 14pt)[Target Brand: SpaceAid]"));
        assert!(out.contains("#text(size: 14pt)[Prepared for: Target]"));
        assert!(out.contains("#text(size: 12pt)[February 2026]"));
        assert!(out.contains("[Prepared by Voyageur Group]"));
        assert!(out.ends_with("#pagebreak()\n\n"));
    }

    #[test]
    fn cover_omits_missing_brand_and_retailer() {
        let out = blocks_to_typst(&[], &sample_metadata(), &Config::default());
        assert!(!out.contains("Target Brand"));
        assert!(!out.contains("Prepared for"));
    }

    #[test]
    fn preamble_follows_config() {
        let mut config = Config::default();
        config.page.numbers = false;
        config.font.document = vec!["Open \"Sans\"".to_string()];
        let out = blocks_to_typst(&[], &sample_metadata(), &config);

        assert!(out.contains("#set text(font: (\"Open \\\"Sans\\\"\",), size: 11pt"));
        assert!(out.contains("[Voyageur Group]),\n"));
        assert!(!out.contains("counter(page)"));
    }

    #[test]
    fn page_numbers_in_footer() {
        let out = blocks_to_typst(&[], &sample_metadata(), &Config::default());
        assert!(out.contains("footer: context align(center, text(size: 9pt, fill: rgb(\"#333333\"))[#counter(page).display()]),"));
    }
}
