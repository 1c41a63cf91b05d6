//! PDFium library resolution for text extraction.
//!
//! The first call to [`ensure_pdfium_library`] looks for
//! `PDFIUM_LIB_PATH`, then the per-version cache directory, and only then
//! downloads the platform archive from
//! [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries)
//! and unpacks the single library file it needs.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;

use crate::LocateError;

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

const RELEASES: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";
const CACHE_DIR_ENV: &str = "DOCCONV_CACHE_DIR";

static RESOLVED: OnceLock<PathBuf> = OnceLock::new();

/// One downloadable PDFium build.
struct Asset {
    archive: &'static str,
    member: &'static str,
    file_name: &'static str,
}

const UNIX_SO: (&str, &str) = ("lib/libpdfium.so", "libpdfium.so");
const MAC_DYLIB: (&str, &str) = ("lib/libpdfium.dylib", "libpdfium.dylib");
const WIN_DLL: (&str, &str) = ("bin/pdfium.dll", "pdfium.dll");

fn platform_asset() -> Result<Asset, LocateError> {
    let (os, arch) = (std::env::consts::OS, std::env::consts::ARCH);
    let (archive, (member, file_name)) = match (os, arch) {
        ("macos", "aarch64") => ("pdfium-mac-arm64.tgz", MAC_DYLIB),
        ("macos", "x86_64") => ("pdfium-mac-x64.tgz", MAC_DYLIB),
        ("linux", "x86_64") => ("pdfium-linux-x64.tgz", UNIX_SO),
        ("linux", "aarch64") => ("pdfium-linux-arm64.tgz", UNIX_SO),
        ("windows", "x86_64") => ("pdfium-win-x64.tgz", WIN_DLL),
        ("windows", "aarch64") => ("pdfium-win-arm64.tgz", WIN_DLL),
        ("windows", "x86") => ("pdfium-win-x86.tgz", WIN_DLL),
        _ => {
            return Err(LocateError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })
        }
    };
    Ok(Asset {
        archive,
        member,
        file_name,
    })
}

/// Per-version cache directory for the PDFium library.
///
/// `DOCCONV_CACHE_DIR` replaces the platform cache root
/// (`~/.cache`, `~/Library/Caches`, `%LOCALAPPDATA%`).
pub fn pdfium_cache_dir() -> PathBuf {
    let version_dir = format!("pdfium-{PDFIUM_VERSION}");
    match std::env::var_os(CACHE_DIR_ENV) {
        Some(root) => PathBuf::from(root).join(version_dir),
        None => dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(std::env::temp_dir)
            .join("docconv")
            .join(version_dir),
    }
}

fn env_library() -> Option<PathBuf> {
    std::env::var_os(LIB_PATH_ENV)
        .map(PathBuf::from)
        .filter(|p| p.exists())
}

/// Path of an already available library, if any. Never touches the network.
pub fn cached_pdfium_path() -> Option<PathBuf> {
    env_library().or_else(|| {
        platform_asset()
            .ok()
            .map(|a| pdfium_cache_dir().join(a.file_name))
            .filter(|p| p.exists())
    })
}

/// `true` when [`ensure_pdfium_library`] would not need to download.
pub fn is_pdfium_cached() -> bool {
    cached_pdfium_path().is_some()
}

/// Make sure a PDFium library is on disk and return its path.
///
/// `on_progress` receives `(bytes_downloaded, total_bytes)` while the
/// archive downloads. The result is memoised for the process lifetime.
pub fn ensure_pdfium_library(
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<PathBuf, LocateError> {
    if let Some(p) = RESOLVED.get() {
        return Ok(p.clone());
    }
    let path = match cached_pdfium_path() {
        Some(p) => p,
        None => download_into_cache(on_progress)?,
    };
    let _ = RESOLVED.set(path.clone());
    Ok(path)
}

/// Resolve (downloading if needed) and bind PDFium.
pub fn bind_pdfium(
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<Pdfium, LocateError> {
    let path = ensure_pdfium_library(on_progress)?;
    bind_pdfium_from_path(&path)
}

/// [`bind_pdfium`] without progress reporting.
pub fn bind_pdfium_silent() -> Result<Pdfium, LocateError> {
    bind_pdfium(None)
}

/// Bind a PDFium library at an explicit path.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, LocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| LocateError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn download_into_cache(
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<PathBuf, LocateError> {
    let asset = platform_asset()?;
    let dir = pdfium_cache_dir();
    std::fs::create_dir_all(&dir).map_err(LocateError::CacheDir)?;

    let url = format!("{RELEASES}/chromium%2F{PDFIUM_VERSION}/{}", asset.archive);
    let archive = fetch(&url, on_progress)?;

    let dest = dir.join(asset.file_name);
    unpack_member(&archive, asset.member, &dest)?;
    Ok(dest)
}

fn fetch(url: &str, on_progress: Option<&dyn Fn(u64, Option<u64>)>) -> Result<Vec<u8>, LocateError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("docconv-locate/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| LocateError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| LocateError::Download(format!("GET {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(LocateError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut body = Vec::with_capacity(total.unwrap_or(32 << 20) as usize);
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match response.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(LocateError::Download(format!("Read error: {e}"))),
        };
        body.extend_from_slice(&buf[..n]);
        if let Some(cb) = on_progress {
            cb(body.len() as u64, total);
        }
    }
    Ok(body)
}

fn unpack_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), LocateError> {
    let extract_err = |e: std::io::Error| LocateError::Extract(e.to_string());
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(archive));

    for entry in tar.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;
        let matches = entry.path().map_err(extract_err)?.to_string_lossy() == member;
        if matches {
            entry
                .unpack(dest)
                .map_err(|e| LocateError::Extract(format!("Unpack failed: {e}")))?;
            return Ok(());
        }
    }
    Err(LocateError::Extract(format!(
        "'{member}' not found in archive"
    )))
}
