//! Single-file mobile web report: a kill-screen callout card plus one
//! collapsible `<details>` section per `##` heading.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::block::{Block, CalloutItem, Span};
use crate::config::Config;
use crate::inline::{CodeSpans, parse_spans};
use crate::kill_screen::extract_kill_screen;
use crate::report::{ReportMetadata, format_currency};

static SECTION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").expect("section number pattern"));

/// Layout rules shared by every theme. Colours come from `:root` variables.
const BASE_CSS: &str = r#"
*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
html { font-size: 16px; -webkit-text-size-adjust: 100%; }
body { font-family: var(--font); background: var(--page-bg); color: var(--text); line-height: 1.55; }
.container { max-width: 720px; margin: 0 auto; padding: 12px 16px 40px; }
.back-link { display: inline-block; color: var(--primary); font-size: 14px; text-decoration: none; padding: 8px 0; margin-bottom: 8px; }
.back-link:hover { text-decoration: underline; }
.report-header { background: var(--primary); color: var(--on-primary); padding: 20px 16px; border-radius: 12px; margin-bottom: 16px; }
.report-header h1 { font-size: 22px; font-weight: 700; line-height: 1.2; margin-bottom: 4px; }
.report-header .subtitle { font-size: 14px; opacity: 0.85; }
.report-header .meta { font-size: 12px; opacity: 0.65; margin-top: 8px; }
.kill-screen { background: #FFF7ED; border: 2px solid var(--leak); border-radius: 12px; padding: 16px; margin-bottom: 16px; }
.kill-screen h2 { font-size: 16px; font-weight: 800; text-transform: uppercase; letter-spacing: 0.5px; color: var(--leak); margin-bottom: 12px; }
.kill-item { margin-bottom: 12px; }
.kill-item:last-child { margin-bottom: 0; }
.kill-label { display: inline-block; font-size: 11px; font-weight: 700; text-transform: uppercase; letter-spacing: 0.5px; padding: 2px 8px; border-radius: 4px; margin-bottom: 4px; background: var(--card-bg); }
.kill-label.threat { color: var(--threat); }
.kill-label.whitespace { color: var(--whitespace); }
.kill-label.leak { color: var(--leak); }
.kill-text { font-size: 14px; line-height: 1.45; }
details { background: var(--card-bg); border: 1px solid var(--border); border-radius: 10px; margin-bottom: 10px; overflow: hidden; }
details[open] { box-shadow: 0 1px 3px rgba(0,0,0,0.06); }
summary { padding: 14px 16px; font-size: 15px; font-weight: 700; color: var(--primary); cursor: pointer; list-style: none; display: flex; align-items: center; justify-content: space-between; user-select: none; }
summary::-webkit-details-marker { display: none; }
summary::after { content: '\25B6'; font-size: 11px; transition: transform 0.2s; color: var(--muted); }
details[open] > summary::after { transform: rotate(90deg); }
.section-body { padding: 0 16px 16px; font-size: 14px; }
.section-body h3 { font-size: 14px; font-weight: 700; color: var(--primary); margin: 14px 0 6px; }
.section-body p { margin: 8px 0; }
.table-wrap { overflow-x: auto; -webkit-overflow-scrolling: touch; margin: 10px 0; border-radius: 8px; border: 1px solid var(--border); }
table { width: 100%; min-width: 400px; border-collapse: collapse; font-size: 13px; }
thead th { background: var(--primary); color: var(--on-primary); font-weight: 600; text-align: left; padding: 8px 10px; white-space: nowrap; }
tbody td { padding: 7px 10px; border-bottom: 1px solid var(--border); white-space: nowrap; }
tbody tr:nth-child(even) { background: var(--band); }
ul, ol { padding-left: 20px; margin: 8px 0; }
li { margin-bottom: 4px; font-size: 14px; }
code { font-family: ui-monospace, Menlo, Consolas, monospace; font-size: 0.92em; background: var(--band); padding: 1px 4px; border-radius: 4px; }
hr { border: none; border-top: 1px solid var(--border); margin: 16px 0; }
.report-footer { text-align: center; font-size: 12px; color: var(--muted); padding: 24px 0 16px; border-top: 1px solid var(--border); margin-top: 24px; }
@media print {
  body { background: #fff; }
  .back-link { display: none; }
  details { break-inside: avoid; }
}
"#;

/// Render parsed blocks as a complete HTML page.
pub fn blocks_to_html(blocks: Vec<Block>, meta: &ReportMetadata, config: &Config) -> String {
    let blocks = extract_kill_screen(blocks);
    let body = render_parts(&blocks);

    let name = escape(meta.display_name());
    let organization = escape(&config.brand.organization);
    let revenue = meta
        .financials()
        .category_revenue_ttm
        .filter(|r| *r != 0.0)
        .map(format_currency)
        .unwrap_or_else(|| "N/A".to_string());

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    page.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0, viewport-fit=cover\">\n");
    let _ = writeln!(
        page,
        "<meta name=\"theme-color\" content=\"{}\">",
        config.colors.primary
    );
    let _ = writeln!(page, "<title>{name} \u{2014} Intel Report | {organization}</title>");
    let _ = writeln!(page, "<style>{}{}</style>", theme_css(config), BASE_CSS);
    page.push_str("</head>\n<body>\n<div class=\"container\">\n");

    if let Some(link) = &config.web.back_link {
        let _ = writeln!(
            page,
            "<a href=\"{}\" class=\"back-link\">&larr; {}</a>",
            escape(&link.href),
            escape(&link.label)
        );
    }

    page.push_str("\n<div class=\"report-header\">\n");
    let _ = writeln!(page, "<h1>{name}</h1>");
    let _ = writeln!(
        page,
        "<div class=\"subtitle\">{} \u{2014} {}</div>",
        escape(meta.report_type().cover_label()),
        escape(meta.document_title())
    );
    let _ = writeln!(
        page,
        "<div class=\"meta\">Category TTM: {} &bull; {} &bull; {}</div>",
        revenue,
        escape(&meta.formatted_date()),
        organization
    );
    page.push_str("</div>\n\n");

    page.push_str(&body);

    let brand = &config.brand;
    page.push_str("\n<div class=\"report-footer\">\n");
    let _ = write!(
        page,
        "{} &bull; Data: {} &bull; Analysis: {}",
        escape(&brand.prepared_by),
        escape(&brand.data_source),
        escape(&brand.analysis_credit)
    );
    if let Some(note) = &brand.footer_note {
        let _ = write!(page, "<br>\n{}", escape(note));
    }
    page.push_str("\n</div>\n</div>\n</body>\n</html>\n");
    page
}

fn theme_css(config: &Config) -> String {
    let c = &config.colors;
    format!(
        "\n:root {{ --primary: {}; --on-primary: {}; --text: {}; --muted: {}; --band: {}; \
--border: {}; --page-bg: {}; --card-bg: {}; --threat: {}; --whitespace: {}; --leak: {}; \
--font: {}; }}",
        c.primary,
        c.on_primary,
        c.text,
        c.muted,
        c.band,
        c.border,
        c.page_background,
        c.card_background,
        c.threat,
        c.whitespace,
        c.leak,
        config.font.web.replace(['<', '>', '{', '}', ';'], ""),
    )
}

struct Section {
    title: String,
    body: String,
}

enum Part {
    Callout(Vec<CalloutItem>),
    Section(Section),
}

/// Group blocks into callouts and sections, keeping source order.
fn render_parts(blocks: &[Block]) -> String {
    let mut parts: Vec<Part> = Vec::new();
    let mut current: Option<Section> = None;
    let mut orphaned = 0;

    for block in blocks {
        match block {
            // The page header already carries the title.
            Block::Heading { level: 0, .. } => {}
            Block::Heading { level: 1, text } => {
                parts.extend(current.take().map(Part::Section));
                current = Some(Section {
                    title: strip_section_number(text).to_string(),
                    body: String::new(),
                });
            }
            Block::KillScreenCallout { items } => {
                parts.extend(current.take().map(Part::Section));
                parts.push(Part::Callout(items.clone()));
            }
            other => match current.as_mut() {
                Some(section) => render_block(other, &mut section.body),
                None => orphaned += 1,
            },
        }
    }
    parts.extend(current.take().map(Part::Section));

    if orphaned > 0 {
        debug!(blocks = orphaned, "dropped content outside any section");
    }

    let mut out = String::new();
    let mut first_section = true;
    for part in &parts {
        match part {
            Part::Callout(items) => render_callout(items, &mut out),
            Part::Section(section) => {
                render_section(section, first_section, &mut out);
                first_section = false;
            }
        }
    }
    out
}

fn render_callout(items: &[CalloutItem], out: &mut String) {
    out.push_str("<div class=\"kill-screen\"><h2>Kill Screen</h2>\n");
    for item in items {
        let _ = writeln!(
            out,
            "<div class=\"kill-item\"><div class=\"kill-label {}\">{}</div><div class=\"kill-text\">{}</div></div>",
            item.kind.css_class(),
            item.kind.label(),
            inline_html(&item.text)
        );
    }
    out.push_str("</div>\n");
}

fn render_section(section: &Section, open: bool, out: &mut String) {
    out.push_str(if open { "<details open>\n" } else { "<details>\n" });
    let _ = writeln!(out, "<summary>{}</summary>", inline_html(&section.title));
    let _ = writeln!(out, "<div class=\"section-body\">{}</div>", section.body);
    out.push_str("</details>\n");
}

fn render_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { text, .. } => {
            let _ = writeln!(out, "<h3>{}</h3>", inline_html(strip_section_number(text)));
        }
        Block::Paragraph { text } => {
            let _ = writeln!(out, "<p>{}</p>", inline_html(text));
        }
        Block::BulletList { items } => render_list("ul", items, out),
        Block::NumberedList { items } => render_list("ol", items, out),
        Block::Table { rows } => render_table(rows, out),
        Block::Rule => out.push_str("<hr>\n"),
        Block::KillScreenCallout { items } => render_callout(items, out),
    }
}

fn render_list(tag: &str, items: &[String], out: &mut String) {
    let _ = writeln!(out, "<{tag}>");
    for item in items {
        let _ = writeln!(out, "<li>{}</li>", inline_html(item));
    }
    let _ = writeln!(out, "</{tag}>");
}

fn render_table(rows: &[Vec<String>], out: &mut String) {
    let Some((header, body)) = rows.split_first() else {
        return;
    };

    out.push_str("<div class=\"table-wrap\"><table>\n<thead><tr>");
    for cell in header {
        let _ = write!(out, "<th>{}</th>", inline_html(cell));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in body {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", inline_html(cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody></table></div>\n");
}

/// "3. Market Share" and "3) Market Share" both become "Market Share".
fn strip_section_number(text: &str) -> &str {
    match SECTION_NUMBER.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Escape first, then turn markup into tags. Tags inserted here are never
/// escaped, and escaped entities are never touched again.
fn inline_html(text: &str) -> String {
    let escaped = escape(text);
    let mut out = String::with_capacity(escaped.len());
    for span in parse_spans(&escaped, CodeSpans::Styled) {
        match span {
            Span::Text(text) => out.push_str(&text),
            Span::Bold(text) => {
                let _ = write!(out, "<strong>{text}</strong>");
            }
            Span::Italic(text) => {
                let _ = write!(out, "<em>{text}</em>");
            }
            Span::Code(text) => {
                let _ = write!(out, "<code>{text}</code>");
            }
        }
    }
    out
}
