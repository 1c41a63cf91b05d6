//! Headless browser and pandoc discovery.

use std::path::{Path, PathBuf};

/// Environment variable naming a browser executable to use before probing.
pub const BROWSER_ENV: &str = "CHROME_BIN";

/// Environment variable naming a pandoc executable.
pub const PANDOC_ENV: &str = "PANDOC_PATH";

const LINUX_PATHS: &[&str] = &[
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/chromium-browser",
    "/usr/bin/chromium",
    "/snap/bin/chromium",
    "/opt/google/chrome/chrome",
    "/usr/bin/google-chrome-beta",
    "/usr/bin/google-chrome-unstable",
];

const MACOS_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

const WINDOWS_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Chromium\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

/// Executable names tried on `PATH` when nothing else was found.
const PATH_NAMES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome-stable",
    "google-chrome",
    "chrome",
    "msedge",
];

/// Where a browser executable was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// Passed in by the caller (config or CLI flag).
    Explicit,
    /// Taken from `CHROME_BIN`.
    Environment,
    /// One of the platform's well-known install paths.
    WellKnown,
    /// Found by name on `PATH`.
    SearchPath,
}

/// A browser executable and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserLocation {
    pub path: PathBuf,
    pub source: LocationSource,
}

/// Well-known install paths for the current platform. Empty on platforms
/// without a list.
pub fn platform_browser_paths() -> &'static [&'static str] {
    match std::env::consts::OS {
        "linux" => LINUX_PATHS,
        "macos" => MACOS_PATHS,
        "windows" => WINDOWS_PATHS,
        _ => &[],
    }
}

/// Return the first candidate that exists on disk.
pub fn probe_paths<P: AsRef<Path>>(candidates: &[P]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|c| c.as_ref())
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
}

/// Pick an explicit browser binary without running it.
///
/// The explicit path and `CHROME_BIN` are trusted as given (a missing file
/// surfaces later as a launch failure). Platform paths are existence-checked.
/// Returns `None` when nothing is pinned, leaving the caller to fall back to
/// [`path_browser`].
pub fn locate_browser(explicit: Option<&Path>) -> Option<BrowserLocation> {
    if let Some(p) = explicit {
        return Some(BrowserLocation {
            path: p.to_path_buf(),
            source: LocationSource::Explicit,
        });
    }

    if let Some(p) = std::env::var_os(BROWSER_ENV).filter(|v| !v.is_empty()) {
        return Some(BrowserLocation {
            path: PathBuf::from(p),
            source: LocationSource::Environment,
        });
    }

    probe_paths(platform_browser_paths()).map(|path| BrowserLocation {
        path,
        source: LocationSource::WellKnown,
    })
}

/// Search `PATH` for a Chromium-family browser.
pub fn path_browser() -> Option<BrowserLocation> {
    PATH_NAMES
        .iter()
        .find_map(|name| which::which(name).ok())
        .map(|path| BrowserLocation {
            path,
            source: LocationSource::SearchPath,
        })
}

/// Locate `pandoc`: `PANDOC_PATH` if it exists, else `PATH`.
pub fn find_pandoc() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(PANDOC_ENV).map(PathBuf::from) {
        if p.is_file() {
            return Some(p);
        }
    }
    which::which("pandoc").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_returns_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("chromium");
        let third = dir.path().join("chrome");
        std::fs::write(&second, b"").unwrap();
        std::fs::write(&third, b"").unwrap();

        let candidates = vec![dir.path().join("missing"), second.clone(), third];
        assert_eq!(probe_paths(&candidates), Some(second));
    }

    #[test]
    fn probe_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(probe_paths(&[dir.path()]), None);
    }

    #[test]
    fn probe_empty_list() {
        let none: [&str; 0] = [];
        assert_eq!(probe_paths(&none), None);
    }

    #[test]
    fn explicit_path_wins_without_existence_check() {
        let loc = locate_browser(Some(Path::new("/nonexistent/chrome"))).unwrap();
        assert_eq!(loc.source, LocationSource::Explicit);
        assert_eq!(loc.path, PathBuf::from("/nonexistent/chrome"));
    }

    #[test]
    fn platform_list_matches_os() {
        let paths = platform_browser_paths();
        if cfg!(target_os = "linux") {
            assert!(paths.contains(&"/usr/bin/chromium"));
        } else if cfg!(target_os = "macos") {
            assert!(paths.iter().any(|p| p.contains("Google Chrome.app")));
        }
    }
}
