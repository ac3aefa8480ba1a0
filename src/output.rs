//! Writing rendered reports to disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::RenderError;
use crate::index::{IndexEntry, build_manifest, render_index};
use crate::report::ReportMetadata;

/// Compile the paginated report and write it as `<document file name>`.
pub fn write_pdf(
    markdown: &str,
    meta: &ReportMetadata,
    config: &Config,
    output_dir: &Path,
) -> Result<PathBuf, RenderError> {
    let bytes = crate::markdown_to_pdf(markdown, meta, config)?;
    write_artifact(output_dir, &meta.document_file_name(), &bytes, meta.display_name())
}

/// Write the Typst source next to where the PDF would go.
pub fn write_typst(
    markdown: &str,
    meta: &ReportMetadata,
    config: &Config,
    output_dir: &Path,
) -> Result<PathBuf, RenderError> {
    let source = crate::markdown_to_typst(markdown, meta, config);
    let file_name = Path::new(&meta.document_file_name())
        .with_extension("typ")
        .to_string_lossy()
        .into_owned();
    write_artifact(output_dir, &file_name, source.as_bytes(), meta.display_name())
}

pub fn write_html(
    markdown: &str,
    meta: &ReportMetadata,
    config: &Config,
    output_dir: &Path,
) -> Result<PathBuf, RenderError> {
    let html = crate::markdown_to_html(markdown, meta, config);
    write_artifact(output_dir, &meta.web_file_name(), html.as_bytes(), meta.display_name())
}

/// Write `index.html` and `manifest.json`, returning both paths.
pub fn write_index(
    entries: &[IndexEntry],
    config: &Config,
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf), RenderError> {
    let page = render_index(entries, config);
    let manifest = serde_json::to_string_pretty(&build_manifest(entries))?;

    let index = write_artifact(output_dir, "index.html", page.as_bytes(), "index")?;
    let manifest = write_artifact(output_dir, "manifest.json", manifest.as_bytes(), "index")?;
    info!(reports = entries.len(), "wrote index and manifest");
    Ok((index, manifest))
}

fn write_artifact(
    output_dir: &Path,
    file_name: &str,
    contents: &[u8],
    name: &str,
) -> Result<PathBuf, RenderError> {
    fs::create_dir_all(output_dir).map_err(|source| RenderError::CreateDir {
        name: name.to_string(),
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(file_name);
    fs::write(&path, contents).map_err(|source| RenderError::Write {
        name: name.to_string(),
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), bytes = contents.len(), "wrote report");
    Ok(path)
}
