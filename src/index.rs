//! The landing page and lookup manifest for a directory of web reports.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::config::Config;
use crate::report::{ReportMetadata, format_currency, slugify};

/// One row of the report index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub revenue: Option<f64>,
}

impl IndexEntry {
    pub fn from_metadata(meta: &ReportMetadata) -> Self {
        Self {
            name: meta.display_name().to_string(),
            slug: slugify(meta.display_name()),
            category: meta.category_name().to_string(),
            revenue: meta.financials().category_revenue_ttm,
        }
    }
}

const INDEX_CSS: &str = r#"
body { font-family: var(--font); background: var(--page-bg); color: var(--text); margin: 0; padding: 0; }
.container { max-width: 720px; margin: 0 auto; padding: 16px; }
.header { background: var(--primary); color: var(--on-primary); padding: 20px 16px; border-radius: 12px; margin-bottom: 16px; }
.header h1 { font-size: 22px; margin: 0 0 4px; }
.header p { font-size: 14px; opacity: 0.8; margin: 0; }
.back-link { display: inline-block; color: var(--primary); font-size: 14px; text-decoration: none; padding: 8px 0; margin-bottom: 8px; }
#search { width: 100%; box-sizing: border-box; padding: 10px 14px; border: 1px solid var(--border); border-radius: 8px; font-size: 15px; margin-bottom: 12px; background: var(--card-bg); }
.table-wrap { overflow-x: auto; border: 1px solid var(--border); border-radius: 8px; }
table { width: 100%; border-collapse: collapse; font-size: 14px; }
thead th { background: var(--primary); color: var(--on-primary); padding: 10px 12px; text-align: left; font-weight: 600; }
tbody td { padding: 10px 12px; border-bottom: 1px solid var(--border); }
tbody tr:nth-child(even) { background: var(--band); }
tbody td a { color: var(--primary); font-weight: 600; text-decoration: none; }
tbody td a:hover { text-decoration: underline; }
.count { font-size: 13px; color: var(--muted); margin-bottom: 8px; }
"#;

const FILTER_SCRIPT: &str = r#"<script>
function filterTable(q) {
  q = q.toLowerCase();
  var rows = document.querySelectorAll('#tbody tr');
  var shown = 0;
  rows.forEach(function(r) {
    var match = !q || r.textContent.toLowerCase().indexOf(q) !== -1;
    r.style.display = match ? '' : 'none';
    if (match) shown++;
  });
  document.getElementById('count').textContent = shown + ' reports';
}
</script>
"#;

/// Entries by revenue, highest first. Entries without revenue keep their
/// relative order at the end.
pub fn sort_entries(entries: &[IndexEntry]) -> Vec<&IndexEntry> {
    let mut sorted: Vec<&IndexEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        let a = a.revenue.unwrap_or(f64::NEG_INFINITY);
        let b = b.revenue.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
    sorted
}

/// Render the searchable `index.html` page.
pub fn render_index(entries: &[IndexEntry], config: &Config) -> String {
    let c = &config.colors;
    let organization = html_escape::encode_text(&config.brand.organization);
    let count = entries.len();

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    page.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(page, "<meta name=\"theme-color\" content=\"{}\">", c.primary);
    let _ = writeln!(page, "<title>Intel Reports | {organization}</title>");
    let _ = writeln!(
        page,
        "<style>\n:root {{ --primary: {}; --on-primary: {}; --text: {}; --muted: {}; --band: {}; \
--border: {}; --page-bg: {}; --card-bg: {}; --font: {}; }}{INDEX_CSS}</style>",
        c.primary,
        c.on_primary,
        c.text,
        c.muted,
        c.band,
        c.border,
        c.page_background,
        c.card_background,
        config.font.web.replace(['<', '>', '{', '}', ';'], ""),
    );
    page.push_str("</head>\n<body>\n<div class=\"container\">\n");

    if let Some(link) = &config.web.back_link {
        let _ = writeln!(
            page,
            "<a href=\"{}\" class=\"back-link\">&larr; {}</a>",
            html_escape::encode_double_quoted_attribute(&link.href),
            html_escape::encode_text(&link.label)
        );
    }

    let _ = writeln!(
        page,
        "<div class=\"header\">\n<h1>Intel Reports</h1>\n<p>{count} competitive intelligence reports from {organization}</p>\n</div>"
    );
    page.push_str(
        "<input type=\"text\" id=\"search\" placeholder=\"Search brands...\" oninput=\"filterTable(this.value)\">\n",
    );
    let _ = writeln!(page, "<div class=\"count\" id=\"count\">{count} reports</div>");
    page.push_str("<div class=\"table-wrap\">\n<table>\n");
    page.push_str("<thead><tr><th>Brand</th><th>TTM Revenue</th><th>Category</th></tr></thead>\n");
    page.push_str("<tbody id=\"tbody\">\n");

    for entry in sort_entries(entries) {
        let revenue = entry
            .revenue
            .filter(|r| *r != 0.0)
            .map(format_currency)
            .unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(
            page,
            "<tr><td><a href=\"{}.html\">{}</a></td><td>{}</td><td>{}</td></tr>",
            html_escape::encode_double_quoted_attribute(&entry.slug),
            html_escape::encode_text(&entry.name),
            revenue,
            html_escape::encode_text(&entry.category)
        );
    }

    page.push_str("</tbody>\n</table>\n</div>\n</div>\n");
    page.push_str(FILTER_SCRIPT);
    page.push_str("</body>\n</html>\n");
    page
}

/// Map each display name, and its lower-cased form, to the report slug.
pub fn build_manifest(entries: &[IndexEntry]) -> BTreeMap<String, String> {
    let mut manifest = BTreeMap::new();
    for entry in entries {
        manifest.insert(entry.name.clone(), entry.slug.clone());
        manifest.insert(entry.name.to_lowercase(), entry.slug.clone());
    }
    manifest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_metadata;
    use crate::report::Financials;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, revenue: Option<f64>) -> IndexEntry {
        IndexEntry {
            name: name.to_string(),
            slug: slugify(name),
            category: "Snacks".to_string(),
            revenue,
        }
    }

    #[test]
    fn entry_from_metadata() {
        let meta = sample_metadata()
            .with_target_brand("Crest & Co")
            .with_financials(Financials {
                category_revenue_ttm: Some(2_500_000.0),
                ..Financials::default()
            });
        assert_eq!(
            IndexEntry::from_metadata(&meta),
            IndexEntry {
                name: "Crest & Co".to_string(),
                slug: "crest-co".to_string(),
                category: "Oral Care".to_string(),
                revenue: Some(2_500_000.0),
            }
        );
    }

    #[test]
    fn sorted_by_revenue_with_unknown_last() {
        let entries = vec![
            entry("A", None),
            entry("B", Some(10.0)),
            entry("C", Some(300.0)),
            entry("D", None),
        ];
        let names: Vec<&str> = sort_entries(&entries)
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["C", "B", "A", "D"]);
    }

    #[test]
    fn index_rows() {
        let entries = vec![entry("Kind <Bars>", Some(1_234_567.8)), entry("Zing", None)];
        let page = render_index(&entries, &Config::default());

        assert!(page.contains(
            "<tr><td><a href=\"kind-bars.html\">Kind &lt;Bars&gt;</a></td><td>$1,234,568</td><td>Snacks</td></tr>\n\
<tr><td><a href=\"zing.html\">Zing</a></td><td>N/A</td><td>Snacks</td></tr>\n"
        ));
        assert!(page.contains("<div class=\"count\" id=\"count\">2 reports</div>"));
        assert!(page.contains("function filterTable(q)"));
    }

    #[test]
    fn manifest_has_both_cases() {
        let manifest = build_manifest(&[entry("Olipop", None)]);
        assert_eq!(manifest.get("Olipop").map(String::as_str), Some("olipop"));
        assert_eq!(manifest.get("olipop").map(String::as_str), Some("olipop"));
        assert_eq!(manifest.len(), 2);
    }
}
