//! Post-processing: deterministic cleanup of Markdown generated from HTML.
//!
//! The HTML-to-Markdown delegate is faithful but untidy: it keeps CRLF line
//! endings from the source, emits setext underlines for the top two heading
//! levels, expresses `<br>` as trailing spaces, leaves zero-width characters
//! copied from web pages, and stacks blank lines where nested block
//! elements closed.
//!
//! ## Rule Order
//!
//! Line endings are normalised before anything looks at lines. Hard breaks
//! are rewritten before trailing whitespace is trimmed, otherwise they would
//! be lost. Setext headings become ATX headings before heading spacing runs
//! so that pass sees every heading.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules in order.
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Turn trailing-double-space hard breaks into backslash breaks
/// 3. Trim trailing whitespace per line
/// 4. Rewrite setext headings (`===` / `---` underlines) as `#` / `##`
/// 5. Collapse runs of blank lines to a single blank line
/// 6. Ensure heading lines have a blank line before them
/// 7. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 8. Ensure the text ends with exactly one newline
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = preserve_hard_breaks(&s);
    let s = trim_line_ends(&s);
    let s = setext_to_atx(&s);
    let s = collapse_blank_lines(&s);
    let s = space_before_headings(&s);
    let s = strip_invisible(&s);
    single_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Hard breaks ──────────────────────────────────────────────────────

fn preserve_hard_breaks(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let mut out = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let next_has_text = lines.get(i + 1).is_some_and(|n| is_plain_text_line(n));
        let content = line.trim_end();
        if line.ends_with("  ") && !content.is_empty() && next_has_text {
            out.push(format!("{content}\\"));
        } else {
            out.push(line.to_string());
        }
    }
    out.join("\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_line_ends(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Setext → ATX headings ────────────────────────────────────────────

static RE_SETEXT_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^=+$").unwrap());
static RE_SETEXT_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{2,}$").unwrap());

/// Only single-line headings are rewritten: the underlined line must follow
/// a blank line (or the start of the text) and must look like plain text.
fn setext_to_atx(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let underline = lines.get(i + 1).map(|l| l.trim());
        let level = match underline {
            Some(u) if RE_SETEXT_H1.is_match(u) => Some("#"),
            Some(u) if RE_SETEXT_H2.is_match(u) => Some("##"),
            _ => None,
        };
        let starts_block = i == 0 || lines[i - 1].trim().is_empty();

        match level {
            Some(marks) if starts_block && is_plain_text_line(line) => {
                out.push(format!("{marks} {}", line.trim()));
                i += 2;
            }
            _ => {
                out.push(line.to_string());
                i += 1;
            }
        }
    }
    out.join("\n")
}

fn is_plain_text_line(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty()
        && !t.starts_with('#')
        && !t.starts_with('|')
        && !t.starts_with('>')
        && !t.starts_with("- ")
        && !t.starts_with("* ")
        && !t.starts_with("```")
        && !line.starts_with("    ")
}

// ── Rule 5: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 6: Heading spacing ──────────────────────────────────────────────────

static RE_ATX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").unwrap());

fn space_before_headings(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 64);
    let mut in_fence = false;
    for (i, line) in input.lines().enumerate() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        if !in_fence && i > 0 && RE_ATX_HEADING.is_match(line) {
            let trimmed = result.trim_end_matches('\n');
            result.truncate(trimmed.len());
            result.push_str("\n\n");
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}

// ── Rule 7: Remove invisible Unicode characters ─────────────────────────────

fn strip_invisible(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 8: Single final newline ─────────────────────────────────────────────

fn single_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{trimmed}\n")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
