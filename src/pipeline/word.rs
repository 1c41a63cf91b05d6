//! HTML → DOCX.
//!
//! The native engine walks the parsed HTML once to build a flat list of
//! [`Block`]s and then writes them with `docx-rs`. Headings, paragraphs,
//! bullet and numbered lists (nested), block quotes, preformatted text,
//! tables and horizontal rules are kept, as are bold, italic and code runs
//! and `<br>` line breaks. Scripts, styles and the document head are
//! dropped. Images are not embedded.
//!
//! With [`WordEngine::Pandoc`] the HTML is handed to `pandoc -f html -t
//! docx` instead.

use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;

use docx_rs::{
    AbstractNumbering, BreakType, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat,
    Numbering, NumberingId, PageMargin, Paragraph, Run, RunFonts, SpecialIndentType, Start,
    Style, StyleType, Table, TableCell, TableRow,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tokio::process::Command;
use tracing::debug;

use crate::config::{ConversionConfig, WordEngine};
use crate::error::DocConvError;
use crate::invoker::run_command;

// ── Settings ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WordSettings {
    pub font: String,
    pub font_size_pt: u32,
    pub margin_twips: u32,
}

impl Default for WordSettings {
    fn default() -> Self {
        Self::from(&ConversionConfig::default())
    }
}

impl From<&ConversionConfig> for WordSettings {
    fn from(c: &ConversionConfig) -> Self {
        Self {
            font: c.word_font.clone(),
            font_size_pt: c.word_font_size_pt,
            margin_twips: c.word_margin_twips,
        }
    }
}

// ── Intermediate blocks ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Format {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text { text: String, format: Format },
    Break,
}

/// A list a [`Block::ListItem`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRef {
    /// Document-wide list number, in order of appearance.
    pub id: usize,
    pub ordered: bool,
    /// Nesting depth, 0 for a top-level list.
    pub level: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, inlines: Vec<Inline> },
    Paragraph { inlines: Vec<Inline>, quote: bool },
    ListItem { inlines: Vec<Inline>, list: ListRef },
    Code(String),
    Table(Vec<Vec<Vec<Inline>>>),
    Rule,
}

// ── HTML walk ────────────────────────────────────────────────────────────

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SEL_TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());

const SKIPPED: &[&str] = &["head", "script", "style", "title", "template", "noscript", "img"];

const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "center", "dd", "details", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary",
    "table", "ul",
];

/// A node in the parsed tree, as yielded by `ElementRef::children`.
type DomNode<'a> = <ElementRef<'a> as std::ops::Deref>::Target;

#[derive(Debug, Clone, Copy, Default)]
struct Context {
    quote: bool,
    list: Option<ListRef>,
}

#[derive(Default)]
struct Walker {
    blocks: Vec<Block>,
    next_list: usize,
}

/// Parse HTML into document blocks.
pub fn html_to_blocks(html: &str) -> Vec<Block> {
    let document = Html::parse_document(html);
    let mut walker = Walker::default();
    walker.container(document.root_element(), Context::default());
    walker.blocks
}

fn is_block(name: &str) -> bool {
    BLOCKS.contains(&name)
}

impl Walker {
    /// Children of a block container: runs of inline content become
    /// paragraphs, block children are handled in place.
    fn container(&mut self, el: ElementRef<'_>, ctx: Context) {
        let mut pending = Vec::new();
        for child in el.children() {
            match ElementRef::wrap(child) {
                Some(child_el) if is_block(child_el.value().name()) => {
                    self.flush_paragraph(&mut pending, ctx);
                    self.block(child_el, ctx);
                }
                _ => collect_inline(child, Format::default(), &mut pending),
            }
        }
        self.flush_paragraph(&mut pending, ctx);
    }

    fn flush_paragraph(&mut self, pending: &mut Vec<Inline>, ctx: Context) {
        let inlines = normalize(std::mem::take(pending));
        if has_text(&inlines) {
            self.blocks.push(Block::Paragraph {
                inlines,
                quote: ctx.quote,
            });
        }
    }

    fn block(&mut self, el: ElementRef<'_>, ctx: Context) {
        let name = el.value().name();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse().unwrap_or(1);
                let inlines = inline_content(el, Format::default());
                if has_text(&inlines) {
                    self.blocks.push(Block::Heading { level, inlines });
                }
            }
            "p" | "dt" | "summary" | "figcaption" => {
                let inlines = inline_content(el, Format::default());
                if has_text(&inlines) {
                    self.blocks.push(Block::Paragraph {
                        inlines,
                        quote: ctx.quote,
                    });
                }
            }
            "ul" | "ol" => self.list(el, name == "ol", ctx),
            "pre" => {
                let text: String = el.text().collect();
                let text = text.trim_matches('\n').to_string();
                if !text.is_empty() {
                    self.blocks.push(Block::Code(text));
                }
            }
            "blockquote" => self.container(el, Context { quote: true, ..ctx }),
            "table" => self.table(el),
            "hr" => self.blocks.push(Block::Rule),
            "li" => match ctx.list {
                Some(list) => self.list_item(el, list, ctx),
                None => self.container(el, ctx),
            },
            _ => self.container(el, ctx),
        }
    }

    fn list(&mut self, el: ElementRef<'_>, ordered: bool, ctx: Context) {
        let list = ListRef {
            id: self.next_list,
            ordered,
            level: ctx.list.map_or(0, |parent| parent.level + 1),
        };
        self.next_list += 1;

        let ctx = Context {
            list: Some(list),
            ..ctx
        };
        for child in el.children().filter_map(ElementRef::wrap) {
            if child.value().name() == "li" {
                self.list_item(child, list, ctx);
            } else if is_block(child.value().name()) {
                self.block(child, ctx);
            }
        }
    }

    fn list_item(&mut self, el: ElementRef<'_>, list: ListRef, ctx: Context) {
        let mut pending = Vec::new();
        for child in el.children() {
            let Some(child_el) = ElementRef::wrap(child) else {
                collect_inline(child, Format::default(), &mut pending);
                continue;
            };
            match child_el.value().name() {
                "ul" | "ol" => {
                    self.flush_list_item(&mut pending, list);
                    self.list(child_el, child_el.value().name() == "ol", ctx);
                }
                "p" | "div" => {
                    if has_text(&pending) {
                        pending.push(Inline::Break);
                    }
                    collect_inline(child, Format::default(), &mut pending);
                }
                name if is_block(name) => {
                    self.flush_list_item(&mut pending, list);
                    self.block(child_el, Context { list: None, ..ctx });
                }
                _ => collect_inline(child, Format::default(), &mut pending),
            }
        }
        self.flush_list_item(&mut pending, list);
    }

    fn flush_list_item(&mut self, pending: &mut Vec<Inline>, list: ListRef) {
        let inlines = normalize(std::mem::take(pending));
        if has_text(&inlines) {
            self.blocks.push(Block::ListItem { inlines, list });
        }
    }

    fn table(&mut self, el: ElementRef<'_>) {
        let rows: Vec<Vec<Vec<Inline>>> = el
            .select(&SEL_TR)
            .map(|tr| {
                tr.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|c| matches!(c.value().name(), "td" | "th"))
                    .map(|cell| {
                        let format = Format {
                            bold: cell.value().name() == "th",
                            ..Format::default()
                        };
                        inline_content(cell, format)
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|row| !row.is_empty())
            .collect();
        if !rows.is_empty() {
            self.blocks.push(Block::Table(rows));
        }
    }
}

fn inline_content(el: ElementRef<'_>, format: Format) -> Vec<Inline> {
    let mut out = Vec::new();
    for child in el.children() {
        collect_inline(child, format, &mut out);
    }
    normalize(out)
}

fn collect_inline(node: DomNode<'_>, format: Format, out: &mut Vec<Inline>) {
    match node.value() {
        Node::Text(text) => {
            let text = RE_WS.replace_all(text, " ");
            if !text.is_empty() {
                out.push(Inline::Text {
                    text: text.into_owned(),
                    format,
                });
            }
        }
        Node::Element(el) => {
            let name = el.name();
            if SKIPPED.contains(&name) {
                return;
            }
            if name == "br" {
                out.push(Inline::Break);
                return;
            }
            let format = match name {
                "b" | "strong" | "th" => Format { bold: true, ..format },
                "i" | "em" | "cite" | "var" | "dfn" => Format { italic: true, ..format },
                "code" | "kbd" | "samp" | "tt" => Format { code: true, ..format },
                _ => format,
            };
            // Block children inside inline context still separate words.
            let spaced = is_block(name);
            if spaced {
                out.push(Inline::Text {
                    text: " ".into(),
                    format,
                });
            }
            for child in node.children() {
                collect_inline(child, format, out);
            }
            if spaced {
                out.push(Inline::Text {
                    text: " ".into(),
                    format,
                });
            }
        }
        _ => {}
    }
}

/// Collapse whitespace across runs the way a browser would: no leading or
/// trailing spaces on a line, no doubled spaces between runs.
fn normalize(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    let mut line_start = true;

    for inline in inlines {
        match inline {
            Inline::Break => {
                trim_last_end(&mut out);
                out.push(Inline::Break);
                line_start = true;
            }
            Inline::Text { text, format } => {
                let after_space = matches!(out.last(), Some(Inline::Text { text, .. }) if text.ends_with(' '));
                let text = if line_start || after_space {
                    text.trim_start().to_string()
                } else {
                    text
                };
                if text.is_empty() {
                    continue;
                }
                line_start = false;
                out.push(Inline::Text { text, format });
            }
        }
    }
    trim_last_end(&mut out);
    while matches!(out.last(), Some(Inline::Break)) {
        out.pop();
    }
    out
}

fn trim_last_end(out: &mut Vec<Inline>) {
    if let Some(Inline::Text { text, .. }) = out.last_mut() {
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        if text.is_empty() {
            out.pop();
        }
    }
}

fn has_text(inlines: &[Inline]) -> bool {
    inlines
        .iter()
        .any(|i| matches!(i, Inline::Text { text, .. } if !text.trim().is_empty()))
}

// ── DOCX writer ──────────────────────────────────────────────────────────

const CODE_FONT: &str = "Courier New";
const BULLET_NUMBERING: usize = 1;

fn fonts(family: &str) -> RunFonts {
    RunFonts::new()
        .ascii(family)
        .hi_ansi(family)
        .east_asia(family)
        .cs(family)
}

fn heading_style(level: u8, size: usize) -> Style {
    Style::new(&format!("Heading{level}"), StyleType::Paragraph)
        .name(&format!("Heading {level}"))
        .size(size)
        .bold()
}

fn list_level(level: usize, format: &str, text: &str, hanging: i32) -> Level {
    Level::new(
        level,
        Start::new(1),
        NumberFormat::new(format),
        LevelText::new(text),
        LevelJc::new("left"),
    )
    .indent(
        Some(720 * (level as i32 + 1)),
        Some(SpecialIndentType::Hanging(hanging)),
        None,
        None,
    )
}

fn bullet_numbering(id: usize) -> AbstractNumbering {
    (0..9).fold(AbstractNumbering::new(id), |n, level| {
        let glyph = ["•", "○", "▪"][level % 3];
        n.add_level(list_level(level, "bullet", glyph, 360))
    })
}

fn decimal_numbering(id: usize) -> AbstractNumbering {
    (0..9).fold(AbstractNumbering::new(id), |n, level| {
        let (format, text) = match level % 3 {
            0 => ("decimal", format!("%{}.", level + 1)),
            1 => ("lowerLetter", format!("%{}.", level + 1)),
            _ => ("lowerRoman", format!("%{}.", level + 1)),
        };
        n.add_level(list_level(level, format, &text, 420))
    })
}

fn runs(mut para: Paragraph, inlines: &[Inline]) -> Paragraph {
    for inline in inlines {
        let run = match inline {
            Inline::Break => Run::new().add_break(BreakType::TextWrapping),
            Inline::Text { text, format } => {
                let mut run = Run::new().add_text(text);
                if format.bold {
                    run = run.bold();
                }
                if format.italic {
                    run = run.italic();
                }
                if format.code {
                    run = run.fonts(fonts(CODE_FONT));
                }
                run
            }
        };
        para = para.add_run(run);
    }
    para
}

/// Assemble a `docx-rs` document from blocks.
pub fn blocks_to_docx(blocks: &[Block], settings: &WordSettings) -> Docx {
    let margin = settings.margin_twips as i32;
    let mut docx = Docx::new()
        .default_fonts(fonts(&settings.font))
        .default_size(settings.font_size_pt as usize * 2)
        .page_margin(
            PageMargin::new()
                .top(margin)
                .bottom(margin)
                .left(margin)
                .right(margin),
        )
        .add_style(heading_style(1, 32))
        .add_style(heading_style(2, 28))
        .add_style(heading_style(3, 26))
        .add_style(heading_style(4, 24))
        .add_style(heading_style(5, 22))
        .add_style(heading_style(6, 20))
        .add_style(
            Style::new("Quote", StyleType::Paragraph)
                .name("Quote")
                .indent(Some(720), None, None, None)
                .italic(),
        )
        .add_style(
            Style::new("Code", StyleType::Paragraph)
                .name("Code")
                .fonts(fonts(CODE_FONT))
                .size(18),
        )
        .add_abstract_numbering(bullet_numbering(BULLET_NUMBERING))
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING));

    // Each ordered list restarts at 1, so each gets its own numbering.
    let mut ordered: HashMap<usize, usize> = HashMap::new();

    for block in blocks {
        docx = match block {
            Block::Heading { level, inlines } => docx.add_paragraph(runs(
                Paragraph::new().style(&format!("Heading{}", level.clamp(&1, &6))),
                inlines,
            )),
            Block::Paragraph { inlines, quote } => {
                let para = if *quote {
                    Paragraph::new().style("Quote")
                } else {
                    Paragraph::new()
                };
                docx.add_paragraph(runs(para, inlines))
            }
            Block::ListItem { inlines, list } => {
                let numbering = if list.ordered {
                    match ordered.get(&list.id) {
                        Some(id) => *id,
                        None => {
                            let id = BULLET_NUMBERING + 1 + ordered.len();
                            ordered.insert(list.id, id);
                            docx = docx
                                .add_abstract_numbering(decimal_numbering(id))
                                .add_numbering(Numbering::new(id, id));
                            id
                        }
                    }
                } else {
                    BULLET_NUMBERING
                };
                let para = Paragraph::new()
                    .numbering(NumberingId::new(numbering), IndentLevel::new(list.level.min(8)));
                docx.add_paragraph(runs(para, inlines))
            }
            Block::Code(text) => text.lines().fold(docx, |d, line| {
                d.add_paragraph(Paragraph::new().style("Code").add_run(Run::new().add_text(line)))
            }),
            Block::Table(rows) => {
                let columns = rows.iter().map(Vec::len).max().unwrap_or(1);
                let table_rows = rows
                    .iter()
                    .map(|row| {
                        let mut cells: Vec<TableCell> = row
                            .iter()
                            .map(|cell| TableCell::new().add_paragraph(runs(Paragraph::new(), cell)))
                            .collect();
                        while cells.len() < columns {
                            cells.push(TableCell::new().add_paragraph(Paragraph::new()));
                        }
                        TableRow::new(cells)
                    })
                    .collect();
                let width = 9000 / columns;
                docx.add_table(Table::new(table_rows).set_grid(vec![width; columns]))
            }
            Block::Rule => docx.add_paragraph(Paragraph::new()),
        };
    }

    if blocks.is_empty() {
        docx = docx.add_paragraph(Paragraph::new());
    }
    docx
}

/// Build and pack a DOCX from HTML in-process.
///
/// # Errors
/// [`DocConvError::DelegateFailed`] if the document cannot be packed.
pub fn html_to_docx(html: &str, settings: &WordSettings) -> Result<Vec<u8>, DocConvError> {
    let blocks = html_to_blocks(html);
    debug!("HTML walk produced {} blocks", blocks.len());

    let mut buffer = Vec::new();
    blocks_to_docx(&blocks, settings)
        .build()
        .pack(&mut Cursor::new(&mut buffer))
        .map_err(|e| DocConvError::DelegateFailed {
            delegate: "DOCX writer".into(),
            detail: e.to_string(),
        })?;
    Ok(buffer)
}

/// Convert HTML to DOCX with `pandoc`.
///
/// # Errors
/// [`DocConvError::ToolNotFound`] if pandoc is not installed, otherwise the
/// errors of [`run_command`].
pub async fn html_to_docx_pandoc(html: &str, limit: Duration) -> Result<Vec<u8>, DocConvError> {
    let pandoc = docconv_locate::find_pandoc().ok_or_else(|| DocConvError::ToolNotFound {
        program: "pandoc".into(),
        hint: "Install it from https://pandoc.org/installing.html or set PANDOC_PATH.".into(),
    })?;

    let dir = tempfile::tempdir().map_err(|e| DocConvError::Internal(format!("tempdir: {e}")))?;
    let input = dir.path().join("input.html");
    let output = dir.path().join("output.docx");
    tokio::fs::write(&input, html)
        .await
        .map_err(|e| DocConvError::Internal(format!("Failed to write temp file: {e}")))?;

    let mut cmd = Command::new(&pandoc);
    cmd.arg("-f")
        .arg("html")
        .arg("-t")
        .arg("docx")
        .arg("-o")
        .arg(&output)
        .arg(&input);
    run_command(cmd, limit, "pandoc").await?;

    tokio::fs::read(&output)
        .await
        .map_err(|e| DocConvError::DelegateFailed {
            delegate: "pandoc".into(),
            detail: format!("no output produced: {e}"),
        })
}

/// HTML to DOCX with the engine selected in `config`.
pub async fn html_to_word(html: &str, config: &ConversionConfig) -> Result<Vec<u8>, DocConvError> {
    match config.word_engine {
        WordEngine::Native => {
            let html = html.to_string();
            let settings = WordSettings::from(config);
            tokio::task::spawn_blocking(move || html_to_docx(&html, &settings))
                .await
                .map_err(|e| DocConvError::Internal(format!("DOCX task panicked: {e}")))?
        }
        WordEngine::Pandoc => {
            html_to_docx_pandoc(html, Duration::from_secs(config.render_timeout_secs)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text {
            text: s.into(),
            format: Format::default(),
        }
    }

    fn plain(inlines: &[Inline]) -> String {
        inlines
            .iter()
            .map(|i| match i {
                Inline::Text { text, .. } => text.as_str(),
                Inline::Break => "\n",
            })
            .collect()
    }

    #[test]
    fn headings_and_paragraphs() {
        let blocks = html_to_blocks("<h1>Title</h1><p>First   paragraph\n text.</p><h3>Sub</h3>");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    inlines: vec![text("Title")]
                },
                Block::Paragraph {
                    inlines: vec![text("First paragraph text.")],
                    quote: false
                },
                Block::Heading {
                    level: 3,
                    inlines: vec![text("Sub")]
                },
            ]
        );
    }

    #[test]
    fn inline_formatting_and_spacing() {
        let blocks = html_to_blocks("<p>Plain <b>bold</b> and <em>it</em> with <code>x()</code>.</p>");
        let Block::Paragraph { inlines, .. } = &blocks[0] else {
            panic!("expected paragraph, got {blocks:?}");
        };
        assert_eq!(plain(inlines), "Plain bold and it with x().");
        assert!(inlines.contains(&Inline::Text {
            text: "bold".into(),
            format: Format {
                bold: true,
                ..Format::default()
            }
        }));
        assert!(inlines.iter().any(|i| matches!(i, Inline::Text { format, .. } if format.code)));
    }

    #[test]
    fn line_breaks_are_kept() {
        let blocks = html_to_blocks("<p>one<br>two<br/>three</p>");
        let Block::Paragraph { inlines, .. } = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(plain(inlines), "one\ntwo\nthree");
    }

    #[test]
    fn lists_nest_and_number_separately() {
        let html = "<ol><li>one<ul><li>inner</li></ul></li><li>two</li></ol><ol><li>again</li></ol>";
        let items: Vec<ListRef> = html_to_blocks(html)
            .into_iter()
            .filter_map(|b| match b {
                Block::ListItem { list, .. } => Some(list),
                _ => None,
            })
            .collect();
        assert_eq!(items.len(), 4);
        assert!(items[0].ordered && items[0].level == 0);
        assert!(!items[1].ordered && items[1].level == 1);
        assert_eq!(items[2].id, items[0].id);
        assert_ne!(items[3].id, items[0].id);
    }

    #[test]
    fn loose_text_and_blocks_in_div() {
        let blocks = html_to_blocks("<div>intro text<p>para</p>tail</div>");
        let texts: Vec<String> = blocks
            .iter()
            .map(|b| match b {
                Block::Paragraph { inlines, .. } => plain(inlines),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(texts, vec!["intro text", "para", "tail"]);
    }

    #[test]
    fn head_script_and_style_are_dropped() {
        let html = "<html><head><title>T</title><style>p{}</style></head>\
                    <body><script>alert(1)</script><p>visible</p></body></html>";
        let blocks = html_to_blocks(html);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn quotes_code_tables_rules() {
        let html = "<blockquote><p>quoted</p></blockquote>\
                    <pre>fn main() {\n    go();\n}</pre>\
                    <table><tr><th>A</th><th>B</th></tr><tr><td>1</td></tr></table><hr>";
        let blocks = html_to_blocks(html);
        assert!(matches!(&blocks[0], Block::Paragraph { quote: true, .. }));
        assert_eq!(blocks[1], Block::Code("fn main() {\n    go();\n}".into()));
        match &blocks[2] {
            Block::Table(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].len(), 2);
                assert!(matches!(&rows[0][0][0], Inline::Text { format, .. } if format.bold));
            }
            other => panic!("expected table, got {other:?}"),
        }
        assert_eq!(blocks[3], Block::Rule);
    }

    #[test]
    fn empty_html_has_no_blocks_but_packs() {
        assert!(html_to_blocks("").is_empty());
        let bytes = html_to_docx("", &WordSettings::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn packs_a_zip_container() {
        let html = "<h1>Report</h1><p>Body with <strong>bold</strong>.</p>\
                    <ul><li>a</li><li>b</li></ul><ol><li>x</li></ol>\
                    <table><tr><td>1</td><td>2</td></tr></table>";
        let bytes = html_to_docx(html, &WordSettings::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn settings_follow_config() {
        let config = ConversionConfig::builder()
            .word_font("Georgia")
            .word_font_size_pt(12)
            .build()
            .unwrap();
        let s = WordSettings::from(&config);
        assert_eq!(s.font, "Georgia");
        assert_eq!(s.font_size_pt, 12);
        assert_eq!(s.margin_twips, 1440);
    }
}
