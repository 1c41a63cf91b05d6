//! Markdown ↔ HTML.
//!
//! Markdown is parsed with `pulldown-cmark` (CommonMark plus the GitHub
//! extensions when enabled) and the result is wrapped in a styled
//! container. HTML goes the other way through `html2md`, followed by
//! [`postprocess::clean_markdown`](super::postprocess::clean_markdown).

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Options, Parser};
use scraper::{Html, Selector};

use super::postprocess;

/// Inline style of the container around rendered Markdown.
pub const CONTAINER_STYLE: &str = "font-family: 'Inter', -apple-system, BlinkMacSystemFont, \
'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333;";

/// Markdown rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Single newlines become `<br />`.
    pub breaks: bool,
    /// Tables, strikethrough and task lists.
    pub gfm: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            breaks: true,
            gfm: true,
        }
    }
}

/// Render Markdown to an HTML fragment without the container.
pub fn render_markdown(markdown: &str, opts: MarkdownOptions) -> String {
    let mut options = Options::empty();
    if opts.gfm {
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
    }

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak if opts.breaks => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Markdown to the styled HTML fragment used by every Markdown conversion.
pub fn markdown_to_html(markdown: &str, opts: MarkdownOptions) -> String {
    format!(
        "<div style=\"{CONTAINER_STYLE}\">\n{}</div>\n",
        render_markdown(markdown, opts)
    )
}

/// Elements whose text is not document content.
static SEL_NON_CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("head, title, style, script, noscript, template").unwrap());
static SEL_BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// The `<body>` markup of `html` with non-content elements removed.
///
/// html2md prints the text of every element it meets, so stylesheets and
/// the document title would otherwise land in the Markdown.
pub fn body_content(html: &str) -> String {
    let mut document = Html::parse_document(html);
    let doomed: Vec<_> = document.select(&SEL_NON_CONTENT).map(|e| e.id()).collect();
    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    document
        .select(&SEL_BODY)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_default()
}

/// HTML to cleaned-up Markdown.
pub fn html_to_markdown(html: &str) -> String {
    postprocess::clean_markdown(&html2md::parse_html(&body_content(html)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_emphasis() {
        let html = render_markdown("# Title\n\nSome *italic* and **bold**.", MarkdownOptions::default());
        assert!(html.contains("<h1>Title</h1>"), "got {html}");
        assert!(html.contains("<em>italic</em>"), "got {html}");
        assert!(html.contains("<strong>bold</strong>"), "got {html}");
    }

    #[test]
    fn breaks_mode_turns_newlines_into_br() {
        let md = "line one\nline two";
        let on = render_markdown(md, MarkdownOptions::default());
        assert!(on.contains("<br />"), "got {on}");

        let off = render_markdown(
            md,
            MarkdownOptions {
                breaks: false,
                gfm: true,
            },
        );
        assert!(!off.contains("<br"), "got {off}");
    }

    #[test]
    fn gfm_tables_and_strikethrough() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~";
        let html = render_markdown(md, MarkdownOptions::default());
        assert!(html.contains("<table>"), "got {html}");
        assert!(html.contains("<del>gone</del>"), "got {html}");

        let plain = render_markdown(
            md,
            MarkdownOptions {
                breaks: false,
                gfm: false,
            },
        );
        assert!(!plain.contains("<table>"), "got {plain}");
    }

    #[test]
    fn task_lists() {
        let html = render_markdown("- [x] done\n- [ ] todo", MarkdownOptions::default());
        assert!(html.contains("checkbox"), "got {html}");
    }

    #[test]
    fn container_wraps_output() {
        let html = markdown_to_html("hello", MarkdownOptions::default());
        assert!(html.starts_with("<div style=\"font-family: 'Inter'"), "got {html}");
        assert!(html.contains("<p>hello</p>"));
        assert!(html.trim_end().ends_with("</div>"));
    }

    #[test]
    fn raw_html_passes_through() {
        let html = render_markdown("<span class=\"x\">kept</span>", MarkdownOptions::default());
        assert!(html.contains("<span class=\"x\">kept</span>"), "got {html}");
    }

    #[test]
    fn html_to_markdown_basic() {
        let md = html_to_markdown(
            "<h1>Title</h1><p>This is <b>bold</b> and <i>italic</i>.</p><ul><li>one</li><li>two</li></ul>",
        );
        assert!(md.contains("# Title"), "got {md}");
        assert!(md.contains("**bold**"), "got {md}");
        assert!(md.contains("one"), "got {md}");
        assert!(md.ends_with('\n') && !md.ends_with("\n\n"), "got {md:?}");
    }

    #[test]
    fn full_document_keeps_only_body_text() {
        let html = "<!DOCTYPE html><html><head><title>Doc - Converted</title>\
                    <style>body { font-family: serif; }</style></head>\
                    <body><h1>Heading</h1><script>var x = {a: 1};</script><p>Text</p></body></html>";
        let md = html_to_markdown(html);
        assert!(md.contains("# Heading"), "got {md}");
        assert!(md.contains("Text"), "got {md}");
        assert!(!md.contains('{'), "got {md}");
        assert!(!md.contains("font-family"), "got {md}");
        assert!(!md.contains("Converted"), "got {md}");
    }

    #[test]
    fn pdf_page_to_markdown_has_no_stylesheet() {
        use crate::pipeline::reconstruct::reconstruct;
        use crate::pipeline::template::{pdf_page, Banner};
        use chrono::Local;

        let banner = Banner {
            filename: "a.pdf",
            method: "PDFium text extraction",
            converted_at: Local::now(),
            page_count: Some(1),
        };
        let fragment =
            reconstruct("CHAPTER ONE\nThis is the first paragraph.\n\n- item one\n- item two");
        let md = html_to_markdown(&pdf_page(&fragment, &banner));

        assert!(!md.contains('{'), "got {md}");
        assert!(!md.contains("font-family"), "got {md}");
        assert!(!md.contains("Converted from PDF"), "got {md}");
        assert!(md.contains("a.pdf"), "got {md}");
        assert!(md.contains("# CHAPTER ONE"), "got {md}");
        assert!(md.contains("item two"), "got {md}");
    }

    #[test]
    fn fragment_without_body_is_kept() {
        let body = body_content("<p>just <em>this</em></p>");
        assert_eq!(body, "<p>just <em>this</em></p>");
    }

    #[test]
    fn html_to_markdown_empty() {
        assert_eq!(html_to_markdown(""), "\n");
    }
}
