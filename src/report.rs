//! Report metadata: what the cover page and web header say about a report,
//! and how output files are named.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Prospect,
    Brand,
    Buyer,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Prospect => "prospect",
            ReportType::Brand => "brand",
            ReportType::Buyer => "buyer",
        }
    }

    /// Label printed under the title on the cover page.
    pub fn cover_label(self) -> &'static str {
        match self {
            ReportType::Prospect => "Subcategory Intelligence Report",
            ReportType::Brand => "Brand Health Report",
            ReportType::Buyer => "Buyer Intelligence Report",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category-level figures shown in the web header and the report index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Financials {
    pub category_revenue_ttm: Option<f64>,
    pub category_revenue_prior: Option<f64>,
    pub yoy_growth_pct: Option<f64>,
}

/// Everything the renderers know about a report besides its markdown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "MetadataFields")]
pub struct ReportMetadata {
    report_type: ReportType,
    target_brand: Option<String>,
    category_name: String,
    subcategory_name: Option<String>,
    retailer: Option<String>,
    marketplace: String,
    data_pulled_at: NaiveDateTime,
    financials: Financials,
}

/// Shape of a metadata file before validation.
#[derive(Deserialize)]
struct MetadataFields {
    report_type: ReportType,
    target_brand: Option<String>,
    category_name: Option<String>,
    subcategory_name: Option<String>,
    retailer: Option<String>,
    marketplace: Option<String>,
    data_pulled_at: NaiveDateTime,
    #[serde(default)]
    financials: Financials,
}

impl TryFrom<MetadataFields> for ReportMetadata {
    type Error = MetadataError;

    fn try_from(fields: MetadataFields) -> Result<Self, Self::Error> {
        let metadata = ReportMetadata::new(
            fields.report_type,
            fields.category_name.unwrap_or_default(),
            fields.marketplace.unwrap_or_default(),
            fields.data_pulled_at,
        )?;

        let mut metadata = metadata.with_financials(fields.financials);
        if let Some(brand) = fields.target_brand {
            metadata = metadata.with_target_brand(brand);
        }
        if let Some(subcategory) = fields.subcategory_name {
            metadata = metadata.with_subcategory(subcategory);
        }
        if let Some(retailer) = fields.retailer {
            metadata = metadata.with_retailer(retailer);
        }
        Ok(metadata)
    }
}

impl ReportMetadata {
    /// Create metadata with the required fields. Blank names are rejected.
    pub fn new(
        report_type: ReportType,
        category_name: impl Into<String>,
        marketplace: impl Into<String>,
        data_pulled_at: NaiveDateTime,
    ) -> Result<Self, MetadataError> {
        let category_name = required(category_name.into(), "category_name")?;
        let marketplace = required(marketplace.into(), "marketplace")?;

        Ok(Self {
            report_type,
            target_brand: None,
            category_name,
            subcategory_name: None,
            retailer: None,
            marketplace,
            data_pulled_at,
            financials: Financials::default(),
        })
    }

    pub fn with_target_brand(mut self, brand: impl Into<String>) -> Self {
        self.target_brand = optional(brand.into());
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory_name = optional(subcategory.into());
        self
    }

    pub fn with_retailer(mut self, retailer: impl Into<String>) -> Self {
        self.retailer = optional(retailer.into());
        self
    }

    pub fn with_financials(mut self, financials: Financials) -> Self {
        self.financials = financials;
        self
    }

    /// Parse metadata from TOML. `data_pulled_at` must be a quoted
    /// `YYYY-MM-DDTHH:MM:SS` string.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, MetadataError> {
        toml::from_str(content).map_err(|source| MetadataError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(path).map_err(|source| MetadataError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn target_brand(&self) -> Option<&str> {
        self.target_brand.as_deref()
    }

    pub fn category_name(&self) -> &str {
        &self.category_name
    }

    pub fn subcategory_name(&self) -> Option<&str> {
        self.subcategory_name.as_deref()
    }

    pub fn retailer(&self) -> Option<&str> {
        self.retailer.as_deref()
    }

    pub fn marketplace(&self) -> &str {
        &self.marketplace
    }

    pub fn data_pulled_at(&self) -> NaiveDateTime {
        self.data_pulled_at
    }

    pub fn financials(&self) -> &Financials {
        &self.financials
    }

    /// Cover-page title: the subcategory, or the category when there is none.
    pub fn document_title(&self) -> &str {
        self.subcategory_name.as_deref().unwrap_or(&self.category_name)
    }

    /// Web-page title: the target brand, else the document title.
    pub fn display_name(&self) -> &str {
        self.target_brand
            .as_deref()
            .unwrap_or_else(|| self.document_title())
    }

    /// Date line shown on the cover and in the web header, e.g. "February 2026".
    pub fn formatted_date(&self) -> String {
        self.data_pulled_at.format("%B %Y").to_string()
    }

    /// `<title>_<type>_<YYYYmmdd_HHMM>.pdf`, lower-cased with spaces replaced.
    pub fn document_file_name(&self) -> String {
        let safe_name: String = self
            .document_title()
            .chars()
            .map(|c| match c {
                ' ' | '/' | '\\' => '_',
                c => c,
            })
            .collect::<String>()
            .to_lowercase();
        let timestamp = self.data_pulled_at.format("%Y%m%d_%H%M");
        format!("{safe_name}_{}_{timestamp}.pdf", self.report_type)
    }

    pub fn web_file_name(&self) -> String {
        format!("{}.html", slugify(self.display_name()))
    }
}

fn required(value: String, field: &'static str) -> Result<String, MetadataError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MetadataError::MissingField { field });
    }
    Ok(value.to_string())
}

fn optional(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Lower-case, collapse every run of non-alphanumerics to `-`, trim the ends.
///
/// Falls back to `report` for names with no usable characters.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let slug = NON_SLUG.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug.to_string()
    }
}

/// Whole dollars with thousands separators, e.g. `$1,234,568`.
pub fn format_currency(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, digit) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount.round() < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}")
}
