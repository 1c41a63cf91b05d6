//! CLI binary for docconv.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use docconv::convert::write_atomic;
use docconv::{
    convert_dir, convert_input, AttemptError, ConversionConfig, ConversionProgressCallback,
    DocumentFormat, PageFormat, ProgressCallback, WordEngine,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner with the current stage as its message. Failed launch attempts
/// and finished batch files are printed above it.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgress {
    fn on_conversion_start(&self, from: DocumentFormat, to: DocumentFormat) {
        self.bar.set_message(format!("{from} → {to}"));
    }

    fn on_stage(&self, stage: &str) {
        self.bar.set_message(stage.to_string());
    }

    fn on_attempt_start(&self, index: usize, total: usize, strategy: &str) {
        self.bar
            .set_message(format!("starting browser ({index}/{total}, {strategy})"));
    }

    fn on_attempt_failed(&self, error: &AttemptError) {
        self.bar
            .println(format!("  {} {}", yellow("⚠"), dim(&error.to_string())));
    }

    fn on_file_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_file_complete(&self, index: usize, total: usize, name: &str, error: Option<&str>) {
        let line = match error {
            None => format!("  {} {:>3}/{:<3} {}", green("✓"), index, total, name),
            Some(e) => {
                let first = e.lines().next().unwrap_or(e);
                format!("  {} {:>3}/{:<3} {}  {}", red("✗"), index, total, name, red(first))
            }
        };
        self.bar.println(line);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Markdown to PDF (target taken from the output extension)
  docconv convert notes.md -o notes.pdf

  # PDF to HTML on stdout
  docconv convert report.pdf -t html

  # Web page to Word
  docconv convert https://example.com/page.html -t word -d out/

  # Convert every Markdown/HTML/PDF file in a folder
  docconv batch docs/ -t pdf -d build/ -c 8

  # HTTP API
  docconv serve --addr 127.0.0.1:3000

  # Check which delegates are installed
  docconv doctor

ENVIRONMENT VARIABLES:
  CHROME_BIN          Browser executable for HTML→PDF
  PANDOC_PATH         pandoc executable (--word-engine pandoc)
  PDFIUM_LIB_PATH     Path to an existing libpdfium, skips auto-download
  DOCCONV_CACHE_DIR   Override the PDFium cache directory
  DOCCONV_ADDR        Server bind address (default 0.0.0.0:3000)
  DOCCONV_UPLOAD_DIR  Server upload directory (default uploads)
  RUST_LOG            Log filter, overrides -v / -q
"#;

/// Convert documents between HTML, Markdown, PDF and Word.
#[derive(Parser, Debug)]
#[command(
    name = "docconv",
    version,
    about = "Convert documents between HTML, Markdown, PDF and Word",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCCONV_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one file or URL.
    Convert(ConvertArgs),
    /// Convert every supported file in a directory.
    Batch(BatchArgs),
    /// Run the HTTP API.
    #[cfg(feature = "server")]
    Serve(ServeArgs),
    /// Report which external delegates were found.
    Doctor {
        /// Browser executable to check instead of probing.
        #[arg(long, env = "CHROME_BIN")]
        browser: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Local file path or HTTP/HTTPS URL.
    input: String,

    /// Write the result to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the result into this directory, named after the input.
    #[arg(short = 'd', long, conflicts_with = "output")]
    out_dir: Option<PathBuf>,

    /// Target format: html, markdown, pdf, word. Defaults to the output extension.
    #[arg(short = 't', long = "to")]
    to: Option<DocumentFormat>,

    /// Source format, when the file name and content don't tell.
    #[arg(short = 'f', long = "from")]
    from: Option<DocumentFormat>,

    /// Print conversion stats as JSON on stdout.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    options: ConfigArgs,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Directory to scan (not recursive).
    dir: PathBuf,

    /// Target format.
    #[arg(short = 't', long = "to")]
    to: DocumentFormat,

    /// Output directory. Defaults to the input directory.
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Files converted at the same time.
    #[arg(short, long, env = "DOCCONV_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    options: ConfigArgs,
}

#[cfg(feature = "server")]
#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "DOCCONV_ADDR", default_value = docconv::server::DEFAULT_ADDR)]
    addr: String,

    /// Where uploads are kept while they are converted.
    #[arg(long, env = "DOCCONV_UPLOAD_DIR", default_value = docconv::server::DEFAULT_UPLOAD_DIR)]
    upload_dir: PathBuf,

    #[command(flatten)]
    options: ConfigArgs,
}

/// Flags shared by every command that converts.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Paper size for PDF output.
    #[arg(long, env = "DOCCONV_PAGE_FORMAT", value_enum, default_value = "a4")]
    page_format: PageFormatArg,

    /// Landscape orientation for PDF output.
    #[arg(long, env = "DOCCONV_LANDSCAPE")]
    landscape: bool,

    /// Page margin for PDF output (CSS length).
    #[arg(long, env = "DOCCONV_MARGIN", default_value = "20px")]
    margin: String,

    /// HTML→Word engine.
    #[arg(long, env = "DOCCONV_WORD_ENGINE", value_enum, default_value = "native")]
    word_engine: WordEngineArg,

    /// Browser executable for PDF output.
    #[arg(long, env = "CHROME_BIN")]
    browser: Option<PathBuf>,

    /// Seconds allowed for each browser launch attempt.
    #[arg(long, env = "DOCCONV_LAUNCH_TIMEOUT", default_value_t = 30)]
    launch_timeout: u64,

    /// Seconds allowed for printing one document.
    #[arg(long, env = "DOCCONV_RENDER_TIMEOUT", default_value_t = 30)]
    render_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCCONV_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Keep single newlines in Markdown as soft breaks.
    #[arg(long, env = "DOCCONV_NO_BREAKS")]
    no_breaks: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageFormatArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<PageFormatArg> for PageFormat {
    fn from(v: PageFormatArg) -> Self {
        match v {
            PageFormatArg::A3 => PageFormat::A3,
            PageFormatArg::A4 => PageFormat::A4,
            PageFormatArg::A5 => PageFormat::A5,
            PageFormatArg::Letter => PageFormat::Letter,
            PageFormatArg::Legal => PageFormat::Legal,
            PageFormatArg::Tabloid => PageFormat::Tabloid,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum WordEngineArg {
    Native,
    Pandoc,
}

impl From<WordEngineArg> for WordEngine {
    fn from(v: WordEngineArg) -> Self {
        match v {
            WordEngineArg::Native => WordEngine::Native,
            WordEngineArg::Pandoc => WordEngine::Pandoc,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already shows progress, so library INFO logs stay hidden
    // unless asked for. The server has no spinner and logs requests.
    #[cfg(feature = "server")]
    let serving = matches!(cli.command, Command::Serve(_));
    #[cfg(not(feature = "server"))]
    let serving = false;

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if serving {
        "docconv=info,tower_http=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Convert(args) => run_convert(args, cli.quiet).await,
        Command::Batch(args) => run_batch(args, cli.quiet).await,
        #[cfg(feature = "server")]
        Command::Serve(args) => {
            let config = build_config(&args.options, 4, None)?;
            let state = docconv::server::AppState::new(config, args.upload_dir);
            docconv::server::start_server(&args.addr, state)
                .await
                .with_context(|| format!("Server on {} stopped", args.addr))
        }
        Command::Doctor { browser } => {
            doctor(browser.as_deref());
            Ok(())
        }
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(
    args: &ConfigArgs,
    concurrency: usize,
    progress: Option<ProgressCallback>,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .page_format(args.page_format.into())
        .landscape(args.landscape)
        .margin(args.margin.clone())
        .word_engine(args.word_engine.into())
        .launch_timeout_secs(args.launch_timeout)
        .render_timeout_secs(args.render_timeout)
        .download_timeout_secs(args.download_timeout)
        .markdown_breaks(!args.no_breaks)
        .concurrency(concurrency);
    if let Some(ref path) = args.browser {
        builder = builder.browser_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

fn target_format(args: &ConvertArgs) -> Result<DocumentFormat> {
    if let Some(to) = args.to {
        return Ok(to);
    }
    args.output
        .as_deref()
        .and_then(DocumentFormat::from_path)
        .ok_or_else(|| anyhow!("No target format: pass --to, or an --output file with a known extension"))
}

async fn run_convert(args: ConvertArgs, quiet: bool) -> Result<()> {
    let to = target_format(&args)?;

    let reads_pdf = args.from == Some(DocumentFormat::Pdf)
        || (args.from.is_none() && args.input.to_ascii_lowercase().ends_with(".pdf"));
    if reads_pdf && !docconv_locate::is_pdfium_cached() {
        prefetch_pdfium(quiet || args.json);
    }

    let progress = (!quiet && !args.json).then(CliProgress::new);
    let config = build_config(
        &args.options,
        1,
        progress.clone().map(|p| p as ProgressCallback),
    )?;

    let result = convert_input(&args.input, args.from, to, &config).await;
    if let Some(ref p) = progress {
        p.finish();
    }
    let output = result.with_context(|| format!("Conversion of {} failed", args.input))?;

    let destination = match (&args.output, &args.out_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(dir.join(&output.filename)),
        (None, None) if !output.format.is_text() || args.json => {
            Some(PathBuf::from(&output.filename))
        }
        (None, None) => None,
    };

    match destination {
        Some(ref path) => {
            write_atomic(path, &output.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&output.bytes)
                .context("Failed to write to stdout")?;
            if !output.bytes.ends_with(b"\n") {
                handle.write_all(b"\n").ok();
            }
        }
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !quiet {
        let mut line = format!(
            "{}  {}  {}  {}ms",
            green("✔"),
            output.stats.steps.join(" → "),
            dim(&format!("{} bytes", output.stats.output_bytes)),
            output.stats.duration_ms,
        );
        if let Some(ref path) = destination {
            line.push_str(&format!("  →  {}", bold(&path.display().to_string())));
        }
        if let Some(attempt) = output.stats.launch_attempt.filter(|&a| a > 1) {
            line.push_str(&format!("  {}", yellow(&format!("(browser fallback #{attempt})"))));
        }
        eprintln!("{line}");
    }
    Ok(())
}

async fn run_batch(args: BatchArgs, quiet: bool) -> Result<()> {
    if !args.dir.is_dir() {
        bail!("{} is not a directory", args.dir.display());
    }

    let progress = (!quiet && !args.json).then(CliProgress::new);
    let config = build_config(
        &args.options,
        args.concurrency,
        progress.clone().map(|p| p as ProgressCallback),
    )?;

    let result = convert_dir(&args.dir, args.to, args.out_dir.as_deref(), &config).await;
    if let Some(ref p) = progress {
        p.finish();
    }
    let report = result.context("Batch conversion failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !quiet {
        let failed = report.failed();
        eprintln!(
            "{} {} converted, {} failed  {}",
            if failed == 0 { green("✔") } else { yellow("⚠") },
            bold(&report.succeeded().to_string()),
            if failed == 0 {
                failed.to_string()
            } else {
                red(&failed.to_string())
            },
            dim(&format!("{}ms", report.duration_ms)),
        );
    }

    if report.failed() > 0 && report.succeeded() == 0 {
        bail!("No file in {} could be converted", args.dir.display());
    }
    Ok(())
}

/// Download PDFium before the spinner starts so its progress bar has the
/// terminal to itself. Failure is only a warning: text extraction falls
/// back to pdf-extract.
fn prefetch_pdfium(quiet: bool) {
    let result = if quiet {
        tokio::task::block_in_place(|| docconv_locate::ensure_pdfium_library(None))
    } else {
        eprintln!(
            "{} PDFium not cached, downloading to {}",
            dim("ℹ"),
            docconv_locate::pdfium_cache_dir().display()
        );
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{prefix:.bold}  [{bar:30.cyan/blue}] {bytes}/{total_bytes}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        bar.set_prefix("PDFium");
        bar.set_message("connecting…");
        let handle = bar.clone();
        let result = tokio::task::block_in_place(|| {
            docconv_locate::ensure_pdfium_library(Some(&|downloaded, total| {
                if let Some(t) = total {
                    if handle.length().unwrap_or(0) != t {
                        handle.set_length(t);
                        handle.set_message("");
                    }
                }
                handle.set_position(downloaded);
            }))
        });
        bar.finish_and_clear();
        result
    };
    if let Err(e) = result {
        tracing::warn!("PDFium download failed: {e}");
        if !quiet {
            eprintln!("{} {}", yellow("⚠"), dim("PDFium unavailable, using pdf-extract"));
        }
    }
}

fn doctor(browser: Option<&Path>) {
    let found = |label: &str, value: String| println!("  {} {:<10} {}", green("✓"), label, value);
    let missing = |label: &str, hint: &str| println!("  {} {:<10} {}", red("✗"), label, dim(hint));

    println!("{}", bold("Delegates"));
    match docconv_locate::locate_browser(browser) {
        Some(loc) => found("browser", format!("{} ({:?})", loc.path.display(), loc.source)),
        None => missing("browser", "not found; PDF output unavailable (set CHROME_BIN)"),
    }
    match docconv_locate::find_pandoc() {
        Some(path) => found("pandoc", path.display().to_string()),
        None => missing("pandoc", "not found; only the native Word engine is available"),
    }
    match docconv_locate::cached_pdfium_path() {
        Some(path) => found("pdfium", path.display().to_string()),
        None => missing(
            "pdfium",
            "not cached yet; downloaded on first PDF read, pdf-extract is used meanwhile",
        ),
    }
}
