//! Inline markup: `**bold**`, `*italic*` and, for the web page, `` `code` ``.
//!
//! Delimiters are matched left to right, non-greedy and non-overlapping.
//! A delimiter without a partner stays in the text as a literal character.

use crate::block::Span;

/// Whether backtick-delimited code spans are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSpans {
    /// Backticks are ordinary characters (paginated document).
    Literal,
    /// Backticks delimit [`Span::Code`] (web page).
    Styled,
}

/// Split one line of text into spans.
///
/// Concatenating the span texts gives back the input minus the markup
/// characters that were consumed as delimiters.
pub fn parse_spans(text: &str, code: CodeSpans) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        if let Some((span, consumed)) = delimited(rest, code) {
            if !plain.is_empty() {
                spans.push(Span::Text(std::mem::take(&mut plain)));
            }
            spans.push(span);
            rest = &rest[consumed..];
            continue;
        }

        // An unmatched `**` is kept as a pair so the second star cannot open an italic.
        let literal = if rest.starts_with("**") { 2 } else { ch.len_utf8() };
        plain.push_str(&rest[..literal]);
        rest = &rest[literal..];
    }

    if !plain.is_empty() {
        spans.push(Span::Text(plain));
    }
    spans
}

/// Try to read a delimited span at the start of `text`.
///
/// Returns the span and the number of bytes it covers, delimiters included.
fn delimited(text: &str, code: CodeSpans) -> Option<(Span, usize)> {
    if text.starts_with("**") {
        let (inner, consumed) = enclosed(text, "**")?;
        return Some((Span::Bold(inner.to_string()), consumed));
    }
    if text.starts_with('*') {
        let (inner, consumed) = enclosed(text, "*")?;
        return Some((Span::Italic(inner.to_string()), consumed));
    }
    if code == CodeSpans::Styled && text.starts_with('`') {
        let (inner, consumed) = enclosed(text, "`")?;
        return Some((Span::Code(inner.to_string()), consumed));
    }
    None
}

/// Find the shortest non-empty run closed by `delim`, given `text` opens with it.
fn enclosed<'a>(text: &'a str, delim: &str) -> Option<(&'a str, usize)> {
    let body = &text[delim.len()..];
    let first = body.chars().next()?;
    // Search past the first character so the content is never empty.
    let close = body[first.len_utf8()..].find(delim)? + first.len_utf8();
    Some((&body[..close], delim.len() + close + delim.len()))
}

/// The visible text of a line, with inline markup removed.
pub fn plain_text(text: &str) -> String {
    parse_spans(text, CodeSpans::Literal)
        .iter()
        .map(Span::text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn text(s: &str) -> Span {
        Span::Text(s.to_string())
    }
    fn bold(s: &str) -> Span {
        Span::Bold(s.to_string())
    }
    fn italic(s: &str) -> Span {
        Span::Italic(s.to_string())
    }
    fn code(s: &str) -> Span {
        Span::Code(s.to_string())
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            parse_spans("This is **bold** and *italic*.", CodeSpans::Literal),
            vec![
                text("This is "),
                bold("bold"),
                text(" and "),
                italic("italic"),
                text("."),
            ]
        );
    }

    #[test]
    fn non_greedy_matching() {
        assert_eq!(
            parse_spans("**a** b **c**", CodeSpans::Literal),
            vec![bold("a"), text(" b "), bold("c")]
        );
    }

    #[rstest]
    #[case("a ** b", vec![text("a ** b")])]
    #[case("price * 2", vec![text("price * 2")])]
    #[case("**unclosed *x*", vec![text("**unclosed "), italic("x")])]
    #[case("****", vec![text("****")])]
    #[case("**", vec![text("**")])]
    #[case("*", vec![text("*")])]
    fn unmatched_delimiters_stay_literal(#[case] input: &str, #[case] expected: Vec<Span>) {
        assert_eq!(parse_spans(input, CodeSpans::Literal), expected);
    }

    #[test]
    fn code_spans_only_when_styled() {
        assert_eq!(
            parse_spans("run `cargo` now", CodeSpans::Styled),
            vec![text("run "), code("cargo"), text(" now")]
        );
        assert_eq!(
            parse_spans("run `cargo` now", CodeSpans::Literal),
            vec![text("run `cargo` now")]
        );
    }

    #[test]
    fn multibyte_text_is_preserved() {
        assert_eq!(
            parse_spans("café **naïve** • ok", CodeSpans::Literal),
            vec![text("café "), bold("naïve"), text(" • ok")]
        );
    }

    #[test]
    fn plain_text_strips_markup() {
        assert_eq!(plain_text("**The Threat**: *big* deal"), "The Threat: big deal");
    }
}
