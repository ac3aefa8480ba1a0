use serde::Serialize;

/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
}

impl Span {
    /// The visible text of the span, with markup removed.
    pub fn text(&self) -> &str {
        match self {
            Span::Text(text) | Span::Bold(text) | Span::Italic(text) | Span::Code(text) => text,
        }
    }
}

/// The three insight classes a kill-screen callout can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalloutKind {
    Threat,
    Whitespace,
    Leak,
}

impl CalloutKind {
    pub const ALL: [CalloutKind; 3] = [CalloutKind::Threat, CalloutKind::Whitespace, CalloutKind::Leak];

    /// Display label, which is also the bolded prefix the generator writes.
    pub fn label(self) -> &'static str {
        match self {
            CalloutKind::Threat => "The Threat",
            CalloutKind::Whitespace => "The White Space",
            CalloutKind::Leak => "The Leak",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            CalloutKind::Threat => "threat",
            CalloutKind::Whitespace => "whitespace",
            CalloutKind::Leak => "leak",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalloutItem {
    pub kind: CalloutKind,
    pub text: String,
}

/// Block-level elements parsed from the report markdown.
///
/// Text fields hold raw inline markdown; renderers split them into spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Level 0 is a `#` title, 1 a `##` section, 2 a `###` (or deeper) subsection.
    Heading { level: u8, text: String },
    Paragraph { text: String },
    BulletList { items: Vec<String> },
    NumberedList { items: Vec<String> },
    /// Row 0 is the header. All rows have the same number of cells.
    Table { rows: Vec<Vec<String>> },
    Rule,
    /// Only produced by the kill-screen pass of the web renderer.
    KillScreenCallout { items: Vec<CalloutItem> },
}
