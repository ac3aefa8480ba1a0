//! Error types for configuration, report metadata and output sinks.
//!
//! Markdown parsing has no error type: malformed markup is always recovered
//! locally and rendered as literal text.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid colour `{value}`: expected #RRGGBB")]
    InvalidColor { value: String },
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Report metadata is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("Failed to read metadata file at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse metadata file at {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Failures while producing or persisting a report artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not write report for {name}: cannot create {path}")]
    CreateDir {
        name: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write report for {name}: cannot write {path}")]
    Write {
        name: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Typst compilation failed: {0}")]
    Typeset(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
