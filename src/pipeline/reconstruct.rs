//! Rebuild semantic HTML from classified lines.
//!
//! A single left-to-right pass over the lines with at most one open block,
//! either a paragraph or a bullet list. A heading or blank line closes
//! whatever is open; switching between prose and list items closes the
//! other kind first. Every open tag is closed before the function returns.
//!
//! All text is HTML-escaped before it is emitted.

use std::borrow::Cow;

use super::classify::{classify, split_lines, strip_list_marker, Classification, Line};

/// Returned when the input has no non-whitespace text at all.
pub const NO_TEXT_FALLBACK: &str = "<p>No text content found in the PDF.</p>";

/// Returned when the lines produced no markup.
pub const NO_CONTENT_FALLBACK: &str = "<p>No content could be extracted from the PDF.</p>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Nothing,
    Paragraph,
    List,
}

struct Builder {
    html: String,
    open: Open,
}

impl Builder {
    fn new(capacity: usize) -> Self {
        Self {
            html: String::with_capacity(capacity),
            open: Open::Nothing,
        }
    }

    fn close(&mut self) {
        match self.open {
            Open::Paragraph => self.html.push_str("</p>"),
            Open::List => self.html.push_str("</ul>"),
            Open::Nothing => {}
        }
        self.open = Open::Nothing;
    }

    fn ensure(&mut self, want: Open) {
        if self.open == want {
            return;
        }
        self.close();
        match want {
            Open::Paragraph => self.html.push_str("<p>"),
            Open::List => self.html.push_str("<ul>"),
            Open::Nothing => {}
        }
        self.open = want;
    }

    fn heading(&mut self, level: u8, text: &str) {
        self.close();
        self.html.push_str(&format!("<h{level}>{}</h{level}>", escape(text)));
    }

    fn list_item(&mut self, text: &str) {
        self.ensure(Open::List);
        self.html.push_str("<li>");
        self.html.push_str(&escape(text));
        self.html.push_str("</li>");
    }

    fn prose(&mut self, text: &str) {
        self.ensure(Open::Paragraph);
        self.html.push_str(&escape(text));
        self.html.push(' ');
    }

    fn finish(mut self) -> String {
        self.close();
        self.html
    }
}

/// Escapes `& < > " '`, with `'` as `&#039;`.
fn escape(text: &str) -> Cow<'_, str> {
    match html_escape::encode_quoted_attribute(text) {
        Cow::Owned(s) if s.contains("&#x27;") => Cow::Owned(s.replace("&#x27;", "&#039;")),
        other => other,
    }
}

/// Convert raw extracted text into an HTML fragment.
///
/// Never fails: empty input yields [`NO_TEXT_FALLBACK`].
///
/// ```rust
/// use docconv::pipeline::reconstruct::reconstruct;
///
/// let html = reconstruct("CHAPTER ONE\nThis is the first paragraph.\n\n- item one\n- item two");
/// assert_eq!(
///     html,
///     "<h1>CHAPTER ONE</h1><p>This is the first paragraph. </p>\
///      <ul><li>item one</li><li>item two</li></ul>"
/// );
/// ```
pub fn reconstruct(text: &str) -> String {
    if text.trim().is_empty() {
        return NO_TEXT_FALLBACK.to_string();
    }
    reconstruct_lines(&split_lines(text))
}

/// Convert already-split lines into an HTML fragment.
pub fn reconstruct_lines(lines: &[Line<'_>]) -> String {
    let capacity = lines.iter().map(|l| l.trimmed.len() + 8).sum();
    let mut out = Builder::new(capacity);

    for (i, line) in lines.iter().enumerate() {
        match classify(line.trimmed, lines, i) {
            Classification::Blank => out.close(),
            Classification::Heading(level) => out.heading(level.get(), line.trimmed),
            Classification::ListItem => out.list_item(strip_list_marker(line.trimmed)),
            Classification::Prose => out.prose(line.trimmed),
        }
    }

    let html = out.finish();
    if html.is_empty() {
        NO_CONTENT_FALLBACK.to_string()
    } else {
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use regex::Regex;

    static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(/?)([a-z0-9]+)>").unwrap());

    /// Tags open and close in stack order and nothing is left open.
    fn assert_balanced(html: &str) {
        let mut stack: Vec<String> = Vec::new();
        for cap in RE_TAG.captures_iter(html) {
            let name = cap[2].to_string();
            if cap[1].is_empty() {
                stack.push(name);
            } else {
                assert_eq!(stack.pop().as_deref(), Some(name.as_str()), "in {html}");
            }
        }
        assert!(stack.is_empty(), "unclosed {stack:?} in {html}");
    }

    #[test]
    fn chapter_paragraph_and_list() {
        let text = "CHAPTER ONE\nThis is the first paragraph.\n\n- item one\n- item two";
        let html = reconstruct(text);
        assert_eq!(
            html,
            "<h1>CHAPTER ONE</h1><p>This is the first paragraph. </p>\
             <ul><li>item one</li><li>item two</li></ul>"
        );
        assert_balanced(&html);
    }

    #[test]
    fn numbered_heading_before_long_line() {
        let text = "1. Introduction\nThis paragraph is considerably longer than the heading line above it.";
        let html = reconstruct(text);
        assert!(html.starts_with("<h2>1. Introduction</h2>"), "got {html}");
        assert!(html.ends_with("above it. </p>"), "got {html}");
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert_eq!(reconstruct(""), NO_TEXT_FALLBACK);
        assert_eq!(reconstruct("  \n\t\n  "), NO_TEXT_FALLBACK);
    }

    #[test]
    fn no_lines_gives_no_content_fallback() {
        assert_eq!(reconstruct_lines(&[]), NO_CONTENT_FALLBACK);
    }

    #[test]
    fn consecutive_prose_joins_into_one_paragraph() {
        let text = "the first line of a paragraph, wrapped by the PDF\n\
                    and its continuation on the next visual line\n\
                    ending here on the third.";
        let html = reconstruct(text);
        assert_eq!(html.matches("<p>").count(), 1, "got {html}");
        assert!(html.contains("PDF and its"), "got {html}");
    }

    #[test]
    fn blank_line_separates_paragraphs() {
        let text = "one paragraph of ordinary text here.\n\nanother paragraph of ordinary text.";
        let html = reconstruct(text);
        assert_eq!(html.matches("<p>").count(), 2, "got {html}");
        assert_balanced(&html);
    }

    #[test]
    fn list_then_prose_closes_list() {
        let text = "- alpha item\n- beta item\nand then prose.";
        let html = reconstruct(text);
        assert!(
            html.starts_with("<ul><li>alpha item</li><li>beta item</li></ul><p>"),
            "got {html}"
        );
        assert_balanced(&html);
    }

    #[test]
    fn prose_then_list_closes_paragraph() {
        let text = "some introductory prose that is not a heading.\n- first\n- second";
        let html = reconstruct(text);
        assert!(html.contains("</p><ul>"), "got {html}");
        assert_balanced(&html);
    }

    #[test]
    fn heading_closes_open_list() {
        let text = "- one\n- two\nRESULTS\nbody text following the results heading.";
        let html = reconstruct(text);
        assert!(html.contains("</ul><h1>RESULTS</h1>"), "got {html}");
        assert_balanced(&html);
    }

    #[test]
    fn all_block_kinds_stay_balanced() {
        let text = "INTRO\n\
                    opening words of a paragraph in the introduction section.\n\
                    • bullet one\n\
                    • bullet two\n\
                    \n\
                    II. Method\n\
                    a. first letter item\n\
                    b. second letter item\n\
                    closing prose of the method section that wraps.\n\
                    \n\
                    \n\
                    Section 9 notes";
        assert_balanced(&reconstruct(text));
    }

    #[test]
    fn markup_in_text_is_escaped() {
        let text = "use <script>alert(1)</script> & \"quotes\" in code samples, it's fine.";
        let html = reconstruct(text);
        assert!(!html.contains("<script>"), "got {html}");
        assert!(html.contains("&lt;script&gt;"), "got {html}");
        assert!(html.contains("&amp;"), "got {html}");
        assert!(html.contains("&quot;quotes&quot;"), "got {html}");
        assert!(html.contains("it&#039;s"), "apostrophe not escaped: {html}");
    }

    #[test]
    fn escaped_heading_and_list_item() {
        let html = reconstruct("R&D <NOTES>\n\n- a < b");
        assert!(html.contains("<li>a &lt; b</li>"), "got {html}");
        assert!(!html.contains("<NOTES>"), "got {html}");
    }

    #[test]
    fn long_all_caps_line_is_prose() {
        let line = "WORD ".repeat(30);
        let html = reconstruct(line.trim());
        assert!(html.starts_with("<p>"), "got {html}");
    }

    #[test]
    fn output_never_empty() {
        for text in ["x", "-", "- ", "1.", "\n\nabc\n\n"] {
            assert!(!reconstruct(text).is_empty(), "{text:?}");
        }
    }
}
