//! Full HTML documents around generated fragments.
//!
//! Two shapes are produced here:
//!
//! * [`pdf_page`]: reconstructed PDF text inside a styled page with a
//!   banner naming the source file, extraction method, date and page count.
//! * [`print_page`]: any HTML prepared for headless printing, with an
//!   `@page` rule for paper size and margins.

use chrono::{DateTime, Local};

use crate::config::{ConversionConfig, PageFormat};

/// Metadata shown in the banner above PDF-derived content.
#[derive(Debug, Clone)]
pub struct Banner<'a> {
    pub filename: &'a str,
    pub method: &'a str,
    pub converted_at: DateTime<Local>,
    pub page_count: Option<usize>,
}

const PDF_PAGE_STYLE: &str = r#"
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 800px;
            margin: 0 auto;
            padding: 40px 20px;
            background: white;
        }
        h1, h2, h3 { color: #2c3e50; margin-top: 30px; margin-bottom: 15px; font-weight: 600; }
        h1 { font-size: 2.2em; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
        h2 { font-size: 1.8em; border-bottom: 2px solid #ecf0f1; padding-bottom: 8px; }
        h3 { font-size: 1.4em; }
        p { margin-bottom: 15px; text-align: justify; }
        ul { margin-bottom: 15px; padding-left: 30px; }
        li { margin-bottom: 5px; }
        .conversion-info {
            background: #f8f9fa;
            border-left: 4px solid #3498db;
            padding: 10px 20px;
            margin-bottom: 30px;
            font-size: 0.9em;
            color: #666;
        }
        .conversion-info p { margin: 4px 0; text-align: left; }
"#;

const PRINT_BODY_STYLE: &str = r#"
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 800px;
            margin: 0 auto;
            background: white;
        }
        h1, h2, h3, h4, h5, h6 { color: #2c3e50; margin-top: 30px; margin-bottom: 15px; font-weight: 600; }
        h1 { font-size: 2.2em; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
        h2 { font-size: 1.8em; border-bottom: 2px solid #ecf0f1; padding-bottom: 8px; }
        blockquote { border-left: 4px solid #3498db; margin: 20px 0; padding: 10px 20px; background: #f8f9fa; font-style: italic; }
        code { background: #f4f4f4; padding: 2px 6px; border-radius: 3px; font-family: 'Courier New', monospace; font-size: 0.9em; }
        pre { background: #2c3e50; color: #ecf0f1; padding: 15px; border-radius: 5px; overflow-x: auto; margin: 20px 0; }
        pre code { background: none; padding: 0; color: inherit; }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; font-size: 0.9em; }
        th, td { border: 1px solid #ddd; padding: 12px; text-align: left; }
        th { background: #3498db; color: white; font-weight: bold; }
        tr:nth-child(even) { background: #f8f9fa; }
        img { max-width: 100%; height: auto; display: block; margin: 20px auto; }
        hr { border: none; border-top: 2px solid #ecf0f1; margin: 30px 0; }
"#;

/// Wrap reconstructed PDF text in a complete HTML document.
pub fn pdf_page(fragment: &str, banner: &Banner<'_>) -> String {
    let stem = std::path::Path::new(banner.filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(banner.filename);
    let title = html_escape::encode_text(stem);
    let filename = html_escape::encode_text(banner.filename);
    let method = html_escape::encode_text(banner.method);
    let date = banner.converted_at.format("%Y-%m-%d %H:%M:%S");
    let pages = banner
        .page_count
        .map(|n| format!("\n        <p><strong>Pages extracted:</strong> {n}</p>"))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Converted from PDF</title>
    <style>{PDF_PAGE_STYLE}    </style>
</head>
<body>
    <div class="conversion-info">
        <p><strong>Source:</strong> {filename}</p>
        <p><strong>Method:</strong> {method}</p>
        <p><strong>Converted:</strong> {date}</p>{pages}
    </div>
    <div class="content">
{fragment}
    </div>
</body>
</html>
"#
    )
}

/// Print settings taken from the conversion config.
#[derive(Debug, Clone)]
pub struct PrintSettings {
    pub page_format: PageFormat,
    pub landscape: bool,
    pub margin: String,
    pub print_background: bool,
}

impl From<&ConversionConfig> for PrintSettings {
    fn from(c: &ConversionConfig) -> Self {
        Self {
            page_format: c.page_format,
            landscape: c.landscape,
            margin: c.margin.clone(),
            print_background: c.print_background,
        }
    }
}

impl PrintSettings {
    /// The `<style>` contents controlling paper size and margins.
    pub fn page_css(&self) -> String {
        let mut css = format!(
            "@page {{ size: {}; margin: {}; }}",
            self.page_format.css_size(self.landscape),
            self.margin.trim()
        );
        if self.print_background {
            css.push_str(
                " html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }",
            );
        }
        css
    }
}

/// `true` when `html` is a whole document rather than a fragment.
pub fn is_full_document(html: &str) -> bool {
    let head = html.trim_start();
    let prefix: String = head.chars().take(256).collect::<String>().to_ascii_lowercase();
    prefix.starts_with("<!doctype") || prefix.contains("<html")
}

/// Prepare `html` for printing.
///
/// Fragments are wrapped in a styled document. Full documents keep their
/// own styling and only gain the `@page` rule, inserted before `</head>`
/// when there is one.
pub fn print_page(html: &str, settings: &PrintSettings) -> String {
    let page_style = format!("<style>{}</style>", settings.page_css());

    if !is_full_document(html) {
        return format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Document</title>
    <style>{PRINT_BODY_STYLE}    </style>
    {page_style}
</head>
<body>
{html}
</body>
</html>
"#
        );
    }

    let lower = html.to_ascii_lowercase();
    match lower.find("</head>") {
        Some(pos) => format!("{}{}\n{}", &html[..pos], page_style, &html[pos..]),
        None => format!("{page_style}\n{html}"),
    }
}
