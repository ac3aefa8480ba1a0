use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

static CLEAN_THEME: &str = include_str!("../themes/clean.toml");

/// Visual theme passed into every render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub brand: BrandConfig,
    pub colors: ColorConfig,
    pub font: FontConfig,
    pub page: PageConfig,
    pub web: WebConfig,
}

/// Built-in themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ThemePreset {
    /// Navy branded consulting look
    #[default]
    Consulting,
    /// Neutral greyscale
    Clean,
}

/// A `#RRGGBB` colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn hex(&self) -> &str {
        &self.0
    }

    fn known(hex: &str) -> Self {
        Color(hex.to_string())
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix('#').unwrap_or("");
        if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Color(value.to_ascii_uppercase()))
        } else {
            Err(ConfigError::InvalidColor { value })
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who the report is from, as printed on covers, headers and footers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    pub organization: String,
    pub prepared_by: String,
    pub data_source: String,
    pub analysis_credit: String,
    pub footer_note: Option<String>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            organization: "Voyageur Group".to_string(),
            prepared_by: "Prepared by Voyageur Group".to_string(),
            data_source: "SmartScout".to_string(),
            analysis_credit: "Claude AI".to_string(),
            footer_note: Some("For internal use only".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Headings, table header fill, web header
    pub primary: Color,
    /// Text drawn on the primary colour
    pub on_primary: Color,
    pub text: Color,
    pub muted: Color,
    /// Alternate table rows
    pub band: Color,
    pub rule: Color,
    pub border: Color,
    pub page_background: Color,
    pub card_background: Color,
    pub threat: Color,
    pub whitespace: Color,
    pub leak: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: Color::known("#1F3864"),
            on_primary: Color::known("#FFFFFF"),
            text: Color::known("#333333"),
            muted: Color::known("#94A3B8"),
            band: Color::known("#F2F2F2"),
            rule: Color::known("#CCCCCC"),
            border: Color::known("#E2E8F0"),
            page_background: Color::known("#F8FAFC"),
            card_background: Color::known("#FFFFFF"),
            threat: Color::known("#DC2626"),
            whitespace: Color::known("#059669"),
            leak: Color::known("#D97706"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font families for the paginated document, in fallback order.
    pub document: Vec<String>,
    /// CSS `font-family` value for the web page.
    pub web: String,
    /// Sizes in points.
    pub body_size: f32,
    pub title_size: f32,
    pub heading_size: f32,
    pub subheading_size: f32,
    pub table_size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            document: vec!["Calibri".to_string(), "Libertinus Serif".to_string()],
            web: "-apple-system, BlinkMacSystemFont, Calibri, Roboto, sans-serif".to_string(),
            body_size: 11.0,
            title_size: 28.0,
            heading_size: 16.0,
            subheading_size: 13.0,
            table_size: 9.0,
        }
    }
}

/// Page geometry, as Typst lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: String,
    pub height: String,
    pub margin: String,
    pub numbers: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: "8.5in".to_string(),
            height: "11in".to_string(),
            margin: "1in".to_string(),
            numbers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebConfig {
    pub back_link: Option<BackLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackLink {
    pub href: String,
    pub label: String,
}

impl Config {
    /// The configuration for a built-in theme.
    pub fn preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::Consulting => Self::default(),
            // Validated by build.rs
            ThemePreset::Clean => toml::from_str(CLEAN_THEME).unwrap_or_default(),
        }
    }

    /// Load config from a TOML file. Missing keys take the default theme's values.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(config_path).map_err(|source| ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })
    }
}
