//! Line classification for text extracted from PDFs.
//!
//! Extracted PDF text has no markup, only line breaks. Each line is tagged
//! as a heading (with a level), a list item, a blank, or prose, using
//! pattern rules plus one cross-line signal: how long the next non-blank
//! line is compared to the current one.
//!
//! ## Heading rules
//!
//! Evaluated top to bottom, first match wins. No rule applies to lines
//! longer than [`MAX_HEADING_LEN`] characters.
//!
//! | # | Rule | Level |
//! |---|------|-------|
//! | 1 | `Chapter <n>` (any case) | 1 |
//! | 2 | `Section <n>` (any case) | 2 |
//! | 3 | uppercase letters and spaces only | 1 |
//! | 4 | every word Title Case | 3 |
//! | 5 | `<n>. <Capital>…` | 2 |
//! | 6 | `<IVX>. <Capital>…` | 2 |
//! | 7 | next non-blank line is more than twice as long | 3 |
//!
//! Headings are checked before list markers, so `1. Introduction` is a
//! level-2 heading while `1. first step` is a list item.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lines longer than this (in characters) are never headings.
pub const MAX_HEADING_LEN: usize = 100;

/// One line of extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub raw: &'a str,
    pub trimmed: &'a str,
    /// 0-based position in the source text.
    pub index: usize,
    /// Length of `trimmed` in characters.
    pub len: usize,
}

impl<'a> Line<'a> {
    pub fn new(raw: &'a str, index: usize) -> Self {
        let trimmed = raw.trim();
        Self {
            raw,
            trimmed,
            index,
            len: trimmed.chars().count(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed.is_empty()
    }
}

/// Split text on newlines. Blank lines are kept: they terminate blocks.
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.split('\n')
        .enumerate()
        .map(|(i, raw)| Line::new(raw, i))
        .collect()
}

/// Heading level, 1 to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const H1: HeadingLevel = HeadingLevel(1);
    pub const H2: HeadingLevel = HeadingLevel(2);
    pub const H3: HeadingLevel = HeadingLevel(3);

    pub fn get(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Heading(HeadingLevel),
    ListItem,
    Blank,
    Prose,
}

// ── Patterns ─────────────────────────────────────────────────────────────

static RE_CHAPTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^chapter\s+\d+").unwrap());
static RE_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^section\s+\d+").unwrap());
static RE_ALL_CAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z\s]+$").unwrap());
static RE_TITLE_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+(\s+[A-Z][a-z]+)*$").unwrap());
static RE_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+[A-Z]").unwrap());
static RE_ROMAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[IVX]+\.\s+[A-Z]").unwrap());

static RE_LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[•\-*]|\d+\.|[a-z]\.)\s+").unwrap());

// ── Heading rules ────────────────────────────────────────────────────────

struct HeadingRule {
    level: HeadingLevel,
    matches: fn(&str, &[Line<'_>], usize) -> bool,
}

const HEADING_RULES: [HeadingRule; 7] = [
    HeadingRule {
        level: HeadingLevel::H1,
        matches: is_chapter,
    },
    HeadingRule {
        level: HeadingLevel::H2,
        matches: is_section,
    },
    HeadingRule {
        level: HeadingLevel::H1,
        matches: is_all_caps,
    },
    // Title Case has no level of its own; it takes the default level.
    HeadingRule {
        level: HeadingLevel::H3,
        matches: is_title_case,
    },
    HeadingRule {
        level: HeadingLevel::H2,
        matches: is_numbered_section,
    },
    HeadingRule {
        level: HeadingLevel::H2,
        matches: is_roman_section,
    },
    HeadingRule {
        level: HeadingLevel::H3,
        matches: followed_by_longer_line,
    },
];

fn is_chapter(line: &str, _: &[Line<'_>], _: usize) -> bool {
    RE_CHAPTER.is_match(line)
}

fn is_section(line: &str, _: &[Line<'_>], _: usize) -> bool {
    RE_SECTION.is_match(line)
}

fn is_all_caps(line: &str, _: &[Line<'_>], _: usize) -> bool {
    RE_ALL_CAPS.is_match(line)
}

fn is_title_case(line: &str, _: &[Line<'_>], _: usize) -> bool {
    RE_TITLE_CASE.is_match(line)
}

fn is_numbered_section(line: &str, _: &[Line<'_>], _: usize) -> bool {
    RE_NUMBERED.is_match(line)
}

fn is_roman_section(line: &str, _: &[Line<'_>], _: usize) -> bool {
    RE_ROMAN.is_match(line)
}

/// Next non-blank line is more than twice as long as `line`.
fn followed_by_longer_line(line: &str, lines: &[Line<'_>], index: usize) -> bool {
    let len = line.chars().count();
    lines
        .iter()
        .skip(index + 1)
        .find(|l| !l.is_blank())
        .is_some_and(|next| next.len > len * 2)
}

// ── Public API ───────────────────────────────────────────────────────────

/// Heading level for `line`, or `None` if no heading rule matches.
pub fn heading_level(line: &str, lines: &[Line<'_>], index: usize) -> Option<HeadingLevel> {
    if line.chars().count() > MAX_HEADING_LEN {
        return None;
    }
    HEADING_RULES
        .iter()
        .find(|rule| (rule.matches)(line, lines, index))
        .map(|rule| rule.level)
}

pub fn is_list_item(line: &str) -> bool {
    RE_LIST_MARKER.is_match(line)
}

/// `line` without its leading bullet, number or letter marker.
pub fn strip_list_marker(line: &str) -> &str {
    match RE_LIST_MARKER.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// Classify `line`, the trimmed text of `lines[index]`.
///
/// Total: every input gets a classification, unmatched text is
/// [`Classification::Prose`].
pub fn classify(line: &str, lines: &[Line<'_>], index: usize) -> Classification {
    let line = line.trim();
    if line.is_empty() {
        return Classification::Blank;
    }
    if let Some(level) = heading_level(line, lines, index) {
        return Classification::Heading(level);
    }
    if is_list_item(line) {
        return Classification::ListItem;
    }
    Classification::Prose
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_at(text: &str, index: usize) -> Classification {
        let lines = split_lines(text);
        classify(lines[index].trimmed, &lines, index)
    }

    fn classify_alone(line: &str) -> Classification {
        classify_at(line, 0)
    }

    const LONG: &str =
        "This following line of body text is deliberately long enough to trigger look-ahead.";

    #[test]
    fn chapter_and_section() {
        assert_eq!(classify_alone("Chapter 3"), Classification::Heading(HeadingLevel::H1));
        assert_eq!(classify_alone("chapter 12: Results"), Classification::Heading(HeadingLevel::H1));
        assert_eq!(classify_alone("Section 2"), Classification::Heading(HeadingLevel::H2));
        assert_eq!(classify_alone("SECTION 4 overview"), Classification::Heading(HeadingLevel::H2));
    }

    #[test]
    fn all_caps_is_level_one() {
        assert_eq!(classify_alone("CHAPTER ONE"), Classification::Heading(HeadingLevel::H1));
        assert_eq!(classify_alone("EXECUTIVE SUMMARY"), Classification::Heading(HeadingLevel::H1));
    }

    #[test]
    fn all_caps_over_limit_is_prose() {
        let line = "A".repeat(MAX_HEADING_LEN + 1);
        assert_eq!(classify_alone(&line), Classification::Prose);
        let line = "B".repeat(MAX_HEADING_LEN);
        assert_eq!(classify_alone(&line), Classification::Heading(HeadingLevel::H1));
    }

    #[test]
    fn numbered_and_roman_are_level_two() {
        assert_eq!(classify_alone("2. Methods"), Classification::Heading(HeadingLevel::H2));
        assert_eq!(classify_alone("IV. Discussion"), Classification::Heading(HeadingLevel::H2));
    }

    #[test]
    fn numbered_section_beats_look_ahead() {
        let text = format!("1. Introduction\n{LONG}");
        assert_eq!(classify_at(&text, 0), Classification::Heading(HeadingLevel::H2));
    }

    #[test]
    fn look_ahead_gives_level_three() {
        let text = format!("a short lead-in\n{LONG}");
        assert_eq!(classify_at(&text, 0), Classification::Heading(HeadingLevel::H3));
    }

    #[test]
    fn look_ahead_skips_blank_lines() {
        let text = format!("a short lead-in\n\n   \n{LONG}");
        assert_eq!(classify_at(&text, 0), Classification::Heading(HeadingLevel::H3));
    }

    #[test]
    fn look_ahead_requires_more_than_double() {
        // 10 chars followed by exactly 20 chars: not a heading.
        let text = "short line\nexactly twenty chars";
        assert_eq!(classify_at(text, 0), Classification::Prose);
    }

    #[test]
    fn last_line_has_no_look_ahead() {
        let text = format!("{LONG}\nthe end");
        assert_eq!(classify_at(&text, 1), Classification::Prose);
    }

    #[test]
    fn title_case_is_level_three() {
        assert_eq!(classify_alone("Related Work"), Classification::Heading(HeadingLevel::H3));
        assert_eq!(classify_alone("Conclusion"), Classification::Heading(HeadingLevel::H3));
    }

    #[test]
    fn list_markers() {
        assert_eq!(classify_alone("- item one"), Classification::ListItem);
        assert_eq!(classify_alone("• bullet"), Classification::ListItem);
        assert_eq!(classify_alone("* star item"), Classification::ListItem);
        assert_eq!(classify_alone("3. lowercase step"), Classification::ListItem);
        assert_eq!(classify_alone("b. second option"), Classification::ListItem);
    }

    #[test]
    fn marker_without_space_is_prose() {
        assert_eq!(classify_alone("-dash joined to text"), Classification::Prose);
        assert_eq!(classify_alone("3.14 is roughly pi"), Classification::Prose);
    }

    #[test]
    fn blank_and_prose() {
        assert_eq!(classify_alone("   "), Classification::Blank);
        assert_eq!(classify_alone(""), Classification::Blank);
        assert_eq!(
            classify_alone("This is an ordinary sentence, with punctuation."),
            Classification::Prose
        );
    }

    #[test]
    fn strip_markers() {
        assert_eq!(strip_list_marker("- item one"), "item one");
        assert_eq!(strip_list_marker("  •   spaced"), "spaced");
        assert_eq!(strip_list_marker("12. twelfth"), "twelfth");
        assert_eq!(strip_list_marker("c. third"), "third");
        assert_eq!(strip_list_marker("no marker"), "no marker");
    }

    #[test]
    fn split_keeps_blank_lines_and_positions() {
        let lines = split_lines("a\n\n  b  \r");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_blank());
        assert_eq!(lines[2].trimmed, "b");
        assert_eq!(lines[2].index, 2);
        assert_eq!(lines[2].len, 1);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let line = Line::new("héllo wörld", 0);
        assert_eq!(line.len, 11);
    }
}
