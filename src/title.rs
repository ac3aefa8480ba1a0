/// Remove a generated top-level title that repeats the cover/header metadata.
///
/// If the first non-blank line is a `# ` heading (not `##`), it is dropped,
/// together with one following non-heading subtitle line and the blank lines
/// after them. Any other input is returned unchanged.
pub fn strip_leading_title(markdown: &str) -> &str {
    let mut lines = LineOffsets::new(markdown);

    let Some(first) = lines.skip_blank() else {
        return markdown;
    };
    let first = first.trim();
    if !(first.starts_with("# ") && !first.starts_with("## ")) {
        return markdown;
    }
    lines.advance();

    if let Some(next) = lines.skip_blank() {
        if !next.trim().starts_with('#') {
            // Subtitle such as "Acme Prospect Analysis"
            lines.advance();
        }
    }
    lines.skip_blank();

    &markdown[lines.offset..]
}

/// Walks `\n`-separated lines while tracking the byte offset of the current one.
struct LineOffsets<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> LineOffsets<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    fn current(&self) -> Option<&'a str> {
        if self.offset >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.offset..];
        Some(rest.split('\n').next().unwrap_or(rest))
    }

    fn advance(&mut self) {
        if let Some(line) = self.current() {
            self.offset = (self.offset + line.len() + 1).min(self.text.len());
        }
    }

    /// Move past blank lines and return the first non-blank one.
    fn skip_blank(&mut self) -> Option<&'a str> {
        while let Some(line) = self.current() {
            if !line.trim().is_empty() {
                return Some(line);
            }
            self.advance();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_title_and_subtitle() {
        let md = "# Category Intelligence Report: Oral Care\nSpaceAid Prospect Analysis\n\n## Overview\nBody";
        assert_eq!(strip_leading_title(md), "## Overview\nBody");
    }

    #[test]
    fn strips_title_followed_directly_by_section() {
        let md = "\n\n# Title\n\n## Overview\nBody";
        assert_eq!(strip_leading_title(md), "## Overview\nBody");
    }

    #[test]
    fn only_one_subtitle_line_is_removed() {
        let md = "# Title\nSubtitle\nFirst paragraph\n";
        assert_eq!(strip_leading_title(md), "First paragraph\n");
    }

    #[test]
    fn second_level_heading_is_kept() {
        let md = "## Overview\nBody";
        assert_eq!(strip_leading_title(md), md);
    }

    #[test]
    fn paragraph_first_is_kept() {
        let md = "Intro\n# Title";
        assert_eq!(strip_leading_title(md), md);
    }

    #[test]
    fn title_only_document_becomes_empty() {
        assert_eq!(strip_leading_title("# Title\n"), "");
        assert_eq!(strip_leading_title("# Title"), "");
    }

    #[test]
    fn blank_input_is_unchanged() {
        assert_eq!(strip_leading_title(""), "");
        assert_eq!(strip_leading_title("\n\n  \n"), "\n\n  \n");
    }

    #[test]
    fn idempotent() {
        for md in [
            "# Title\nSubtitle\n\n## Overview\nText\n",
            "# Title\n\n## Overview\n",
            "## Overview\nText\n",
            "Just a paragraph",
        ] {
            let once = strip_leading_title(md);
            assert_eq!(strip_leading_title(once), once, "input: {md:?}");
        }
    }
}
