mod block;
pub mod config;
pub mod error;
mod html;
pub mod index;
mod inline;
mod kill_screen;
pub mod output;
mod parser;
pub mod report;
mod title;
mod typst;

pub use block::{Block, CalloutItem, CalloutKind, Span};
pub use config::{Config, ThemePreset};
pub use error::{ConfigError, MetadataError, RenderError};
pub use inline::{CodeSpans, parse_spans};
pub use kill_screen::extract_kill_screen;
pub use parser::{LineKind, classify, parse_blocks};
pub use report::{Financials, ReportMetadata, ReportType, slugify};
pub use title::strip_leading_title;

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_pdf::PdfOptions;

/// Parse markdown into blocks, dropping a leading title and subtitle.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to Typst markup for the paginated report.
pub fn markdown_to_typst(markdown: &str, meta: &ReportMetadata, config: &Config) -> String {
    let blocks = parse(markdown);
    typst::blocks_to_typst(&blocks, meta, config)
}

/// Convert markdown to PDF bytes.
pub fn markdown_to_pdf(
    markdown: &str,
    meta: &ReportMetadata,
    config: &Config,
) -> Result<Vec<u8>, RenderError> {
    use typst_library::layout::PagedDocument;

    let typst_content = markdown_to_typst(markdown, meta, config);

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| RenderError::Typeset(format!("{e:?}")))?;

    typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| RenderError::Pdf(format!("{e:?}")))
}

/// Convert markdown to a self-contained mobile web page.
pub fn markdown_to_html(markdown: &str, meta: &ReportMetadata, config: &Config) -> String {
    html::blocks_to_html(parse(markdown), meta, config)
}
