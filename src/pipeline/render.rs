//! HTML → PDF through a headless Chromium-family browser.
//!
//! Each render acquires its own [`BrowserSession`]: a verified launch
//! configuration plus a private working directory holding the browser
//! profile, the page and the printed PDF. The directory is removed when
//! the session is dropped and every child process is spawned with
//! `kill_on_drop`, so nothing outlives the call on any exit path.
//!
//! The launch configuration is chosen with
//! [`launch_with_fallback`](crate::invoker::launch_with_fallback) from
//! [`browser_strategies`], most hardened first.

use std::path::{Path, PathBuf};
use std::time::Duration;

use docconv_locate::BrowserLocation;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ConversionConfig;
use crate::error::DocConvError;
use crate::invoker::{launch_with_fallback, run_command, FallbackChain, LaunchStrategy, Launched};
use crate::pipeline::template::{print_page, PrintSettings};

const HARDENED_FLAGS: &[&str] = &[
    "--headless=new",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-background-networking",
    "--disable-sync",
    "--no-first-run",
    "--no-default-browser-check",
    "--mute-audio",
    "--hide-scrollbars",
];

const MINIMAL_FLAGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
];

const LEGACY_FLAGS: &[&str] = &[
    "--headless",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
];

/// One way of starting the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserStrategy {
    pub label: &'static str,
    pub executable: PathBuf,
    pub flags: &'static [&'static str],
}

impl LaunchStrategy for BrowserStrategy {
    fn name(&self) -> &str {
        self.label
    }
}

impl BrowserStrategy {
    fn command(&self, profile: &Path) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(self.flags)
            .arg(format!("--user-data-dir={}", profile.display()));
        cmd
    }
}

/// Launch strategies for the browser found from `explicit`, `CHROME_BIN`,
/// the platform install paths and `PATH`.
///
/// # Errors
/// [`DocConvError::ToolNotFound`] when no browser can be found at all.
pub fn browser_strategies(explicit: Option<&Path>) -> Result<Vec<BrowserStrategy>, DocConvError> {
    let strategies = strategies_for(
        docconv_locate::locate_browser(explicit),
        docconv_locate::path_browser(),
    );
    if strategies.is_empty() {
        return Err(DocConvError::ToolNotFound {
            program: "Chrome/Chromium".into(),
            hint: "Install Google Chrome or Chromium, or point CHROME_BIN (or --browser) at one."
                .into(),
        });
    }
    Ok(strategies)
}

fn strategies_for(
    located: Option<BrowserLocation>,
    on_path: Option<BrowserLocation>,
) -> Vec<BrowserStrategy> {
    let mut out = Vec::with_capacity(4);
    if let Some(found) = located {
        debug!("Browser candidate {} ({:?})", found.path.display(), found.source);
        for (label, flags) in [
            ("hardened", HARDENED_FLAGS),
            ("minimal", MINIMAL_FLAGS),
            ("minimal, legacy headless", LEGACY_FLAGS),
        ] {
            out.push(BrowserStrategy {
                label,
                executable: found.path.clone(),
                flags,
            });
        }
    }
    if let Some(found) = on_path {
        out.push(BrowserStrategy {
            label: "minimal, browser on PATH",
            executable: found.path,
            flags: MINIMAL_FLAGS,
        });
    }
    out
}

/// A browser configuration that has started successfully, with its own
/// scratch directory.
#[derive(Debug)]
pub struct BrowserSession {
    strategy: BrowserStrategy,
    workdir: TempDir,
}

impl BrowserSession {
    /// Start the browser once on a blank page to prove the configuration
    /// works here.
    pub async fn start(strategy: BrowserStrategy, limit: Duration) -> Result<Self, DocConvError> {
        let workdir = tempfile::Builder::new()
            .prefix("docconv-browser-")
            .tempdir()
            .map_err(|e| DocConvError::Internal(format!("browser profile dir: {e}")))?;

        let mut cmd = strategy.command(&workdir.path().join("profile"));
        cmd.arg("--dump-dom").arg("about:blank");
        run_command(cmd, limit, "browser launch").await?;

        Ok(Self { strategy, workdir })
    }

    pub fn strategy(&self) -> &BrowserStrategy {
        &self.strategy
    }

    /// Print a complete HTML document to PDF bytes.
    ///
    /// # Errors
    /// [`DocConvError::Timeout`] if printing overruns `limit`, otherwise
    /// [`DocConvError::DelegateFailed`].
    pub async fn print_to_pdf(&self, html: &str, limit: Duration) -> Result<Vec<u8>, DocConvError> {
        let page = self.workdir.path().join("page.html");
        let pdf = self.workdir.path().join("page.pdf");
        tokio::fs::write(&page, html)
            .await
            .map_err(|e| DocConvError::Internal(format!("Failed to write page: {e}")))?;

        let mut cmd = self.strategy.command(&self.workdir.path().join("profile"));
        cmd.arg(format!("--print-to-pdf={}", pdf.display()))
            .arg("--no-pdf-header-footer")
            .arg(file_url(&page));
        run_command(cmd, limit, "browser print").await?;

        let bytes = tokio::fs::read(&pdf)
            .await
            .map_err(|e| DocConvError::DelegateFailed {
                delegate: "browser print".into(),
                detail: format!("no PDF written: {e}"),
            })?;
        if !bytes.starts_with(b"%PDF") {
            return Err(DocConvError::DelegateFailed {
                delegate: "browser print".into(),
                detail: "output is not a PDF".into(),
            });
        }
        Ok(bytes)
    }
}

/// `file://` URL for an absolute path.
fn file_url(path: &Path) -> String {
    let s = path.display().to_string().replace('\\', "/");
    if s.starts_with('/') {
        format!("file://{s}")
    } else {
        format!("file:///{s}")
    }
}

/// Acquire a session from the first strategy that launches.
pub async fn launch_session(
    strategies: &[BrowserStrategy],
    config: &ConversionConfig,
) -> Result<Launched<BrowserSession>, DocConvError> {
    let limit = Duration::from_secs(config.launch_timeout_secs);
    let chain = FallbackChain::new("headless browser", limit)
        .with_progress(config.progress_callback.as_ref());

    launch_with_fallback(&chain, strategies, |strategy| {
        BrowserSession::start(strategy.clone(), limit)
    })
    .await
}

/// A rendered PDF and the launch attempt that produced it.
#[derive(Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub attempt: usize,
    pub strategy: String,
}

/// Render HTML (fragment or full document) to PDF.
pub async fn html_to_pdf(html: &str, config: &ConversionConfig) -> Result<RenderedPdf, DocConvError> {
    let strategies = browser_strategies(config.browser_path.as_deref())?;
    render_with(html, &strategies, config).await
}

async fn render_with(
    html: &str,
    strategies: &[BrowserStrategy],
    config: &ConversionConfig,
) -> Result<RenderedPdf, DocConvError> {
    let page = print_page(html, &PrintSettings::from(config));
    let launched = launch_session(strategies, config).await?;
    info!(
        "Browser ready (attempt {}, {})",
        launched.attempt, launched.strategy
    );

    let bytes = launched
        .value
        .print_to_pdf(&page, Duration::from_secs(config.render_timeout_secs))
        .await?;
    debug!("Printed {} bytes of PDF", bytes.len());

    Ok(RenderedPdf {
        bytes,
        attempt: launched.attempt,
        strategy: launched.strategy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docconv_locate::LocationSource;

    fn location(path: &str) -> BrowserLocation {
        BrowserLocation {
            path: PathBuf::from(path),
            source: LocationSource::Explicit,
        }
    }

    #[test]
    fn strategy_order() {
        let s = strategies_for(Some(location("/opt/chrome")), Some(location("/usr/bin/chromium")));
        let labels: Vec<&str> = s.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![
                "hardened",
                "minimal",
                "minimal, legacy headless",
                "minimal, browser on PATH"
            ]
        );
        assert_eq!(s[0].executable, PathBuf::from("/opt/chrome"));
        assert_eq!(s[3].executable, PathBuf::from("/usr/bin/chromium"));
        assert!(s[1].flags.contains(&"--no-sandbox"));
        assert!(s[2].flags.contains(&"--headless"));
        assert!(!s[0].flags.contains(&"--no-sandbox"));
    }

    #[test]
    fn no_browser_no_strategies() {
        assert!(strategies_for(None, None).is_empty());
        assert_eq!(strategies_for(None, Some(location("/usr/bin/chromium"))).len(), 1);
    }

    #[test]
    fn file_urls() {
        assert_eq!(file_url(Path::new("/tmp/x/page.html")), "file:///tmp/x/page.html");
    }

    #[cfg(unix)]
    mod fake_browser {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// A shell script standing in for Chrome. It fails whenever its
        /// arguments contain `refuse`, and writes a tiny PDF when asked to
        /// print.
        fn script(dir: &Path, refuse: &str) -> PathBuf {
            let path = dir.join("fake-chrome");
            let body = format!(
                "#!/bin/sh\n\
                 case \"$*\" in *{refuse}*) echo 'cannot start' >&2; exit 1;; esac\n\
                 for arg in \"$@\"; do\n\
                   case \"$arg\" in --print-to-pdf=*) printf '%%PDF-1.4 fake' > \"${{arg#--print-to-pdf=}}\";; esac\n\
                 done\n\
                 exit 0\n"
            );
            std::fs::write(&path, body).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn strategies(exe: &Path) -> Vec<BrowserStrategy> {
            strategies_for(
                Some(BrowserLocation {
                    path: exe.to_path_buf(),
                    source: LocationSource::Explicit,
                }),
                None,
            )
        }

        #[tokio::test]
        async fn falls_back_past_hardened_flags() {
            let dir = tempfile::tempdir().unwrap();
            let exe = script(dir.path(), "--disable-gpu");
            let rendered = render_with("<p>hi</p>", &strategies(&exe), &ConversionConfig::default())
                .await
                .unwrap();
            assert!(rendered.bytes.starts_with(b"%PDF"));
            assert_eq!(rendered.attempt, 2);
            assert_eq!(rendered.strategy, "minimal");
        }

        #[tokio::test]
        async fn exhausts_when_nothing_starts() {
            let dir = tempfile::tempdir().unwrap();
            let exe = script(dir.path(), "--headless");
            let err = render_with("<p>hi</p>", &strategies(&exe), &ConversionConfig::default())
                .await
                .unwrap_err();
            match err {
                DocConvError::LaunchExhausted { attempts, last_error, .. } => {
                    assert_eq!(attempts, 3);
                    assert!(last_error.contains("cannot start"), "got {last_error}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn session_directory_is_removed_on_drop() {
            let dir = tempfile::tempdir().unwrap();
            let exe = script(dir.path(), "never-matches");
            let session = BrowserSession::start(strategies(&exe).remove(0), Duration::from_secs(10))
                .await
                .unwrap();
            let workdir = session.workdir.path().to_path_buf();
            assert!(workdir.exists());
            drop(session);
            assert!(!workdir.exists());
        }
    }
}
