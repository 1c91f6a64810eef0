//! # Font Capability Table
//!
//! One declarative table of `(platform, family) → path`, plus the ordered
//! per-platform safe fallbacks. Adding a family is a one-line change here;
//! the resolver never hard-codes a path.
//!
//! Windows entries are written relative to `%WINDIR%` and expanded at lookup
//! time (default `C:\Windows`).

use std::path::PathBuf;

/// Operating system family whose default font installation is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// The platform this binary was compiled for. Anything that is neither
    /// Windows nor macOS is treated as a Linux-style font layout.
    pub fn current() -> Platform {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

/// A known font installation path for one family on one platform.
#[derive(Debug, Clone, Copy)]
pub struct FontEntry {
    pub platform: Platform,
    /// Normalized (lowercase) family key.
    pub family: &'static str,
    pub path: &'static str,
}

const fn entry(platform: Platform, family: &'static str, path: &'static str) -> FontEntry {
    FontEntry {
        platform,
        family,
        path,
    }
}

use Platform::{Linux, MacOs, Windows};

/// Family lookup table. First match for `(platform, family)` wins.
pub const FAMILY_TABLE: &[FontEntry] = &[
    // Windows
    entry(Windows, "arial", r"%WINDIR%\Fonts\arial.ttf"),
    entry(Windows, "arial bold", r"%WINDIR%\Fonts\arialbd.ttf"),
    entry(Windows, "arial narrow", r"%WINDIR%\Fonts\ARIALN.TTF"),
    entry(Windows, "times", r"%WINDIR%\Fonts\times.ttf"),
    entry(Windows, "times new roman", r"%WINDIR%\Fonts\times.ttf"),
    entry(Windows, "timesnewroman", r"%WINDIR%\Fonts\times.ttf"),
    entry(Windows, "courier", r"%WINDIR%\Fonts\cour.ttf"),
    entry(Windows, "courier new", r"%WINDIR%\Fonts\cour.ttf"),
    entry(Windows, "couriernew", r"%WINDIR%\Fonts\cour.ttf"),
    entry(Windows, "calibri", r"%WINDIR%\Fonts\calibri.ttf"),
    entry(Windows, "tahoma", r"%WINDIR%\Fonts\tahoma.ttf"),
    entry(Windows, "verdana", r"%WINDIR%\Fonts\verdana.ttf"),
    entry(Windows, "georgia", r"%WINDIR%\Fonts\georgia.ttf"),
    entry(Windows, "trebuchet", r"%WINDIR%\Fonts\trebuc.ttf"),
    entry(Windows, "trebuchet ms", r"%WINDIR%\Fonts\trebuc.ttf"),
    entry(Windows, "trebuchetms", r"%WINDIR%\Fonts\trebuc.ttf"),
    entry(Windows, "sans", r"%WINDIR%\Fonts\arial.ttf"),
    // macOS
    entry(MacOs, "arial", "/System/Library/Fonts/Supplemental/Arial.ttf"),
    entry(MacOs, "times", "/System/Library/Fonts/Times.ttc"),
    entry(MacOs, "times new roman", "/System/Library/Fonts/Supplemental/Times New Roman.ttf"),
    entry(MacOs, "courier", "/System/Library/Fonts/Courier.ttc"),
    entry(MacOs, "courier new", "/System/Library/Fonts/Supplemental/Courier New.ttf"),
    entry(MacOs, "tahoma", "/System/Library/Fonts/Supplemental/Tahoma.ttf"),
    entry(MacOs, "verdana", "/System/Library/Fonts/Supplemental/Verdana.ttf"),
    entry(MacOs, "georgia", "/System/Library/Fonts/Supplemental/Georgia.ttf"),
    entry(MacOs, "trebuchet ms", "/System/Library/Fonts/Supplemental/Trebuchet MS.ttf"),
    entry(MacOs, "helvetica", "/System/Library/Fonts/Helvetica.ttc"),
    entry(MacOs, "sans", "/System/Library/Fonts/Helvetica.ttc"),
    // Linux: metric-compatible substitutes
    entry(Linux, "arial", "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"),
    entry(Linux, "helvetica", "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"),
    entry(Linux, "times", "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf"),
    entry(Linux, "times new roman", "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf"),
    entry(Linux, "courier", "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf"),
    entry(Linux, "courier new", "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf"),
    entry(Linux, "calibri", "/usr/share/fonts/truetype/crosextra/Carlito-Regular.ttf"),
    entry(Linux, "verdana", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
    entry(Linux, "tahoma", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
    entry(Linux, "dejavu sans", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
    entry(Linux, "dejavusans", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
    entry(Linux, "sans", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
];

/// Safe fallbacks, tried in listed order once the family lookup failed.
pub const SAFE_FALLBACKS: &[FontEntry] = &[
    entry(Windows, "", r"%WINDIR%\Fonts\arial.ttf"),
    entry(Windows, "", r"%WINDIR%\Fonts\calibri.ttf"),
    entry(Windows, "", r"%WINDIR%\Fonts\tahoma.ttf"),
    entry(MacOs, "", "/System/Library/Fonts/Supplemental/Arial.ttf"),
    entry(MacOs, "", "/System/Library/Fonts/Helvetica.ttc"),
    entry(Linux, "", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
    entry(Linux, "", "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf"),
];

/// Expand `%WINDIR%` in a table path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("%WINDIR%") {
        let windir = std::env::var("WINDIR").unwrap_or_else(|_| r"C:\Windows".to_string());
        PathBuf::from(format!("{}{}", windir, rest))
    } else {
        PathBuf::from(path)
    }
}

/// Table paths for a normalized family key on `platform`.
pub fn family_paths(platform: Platform, family: &str) -> impl Iterator<Item = PathBuf> + '_ {
    FAMILY_TABLE
        .iter()
        .filter(move |e| e.platform == platform && e.family == family)
        .map(|e| expand_path(e.path))
}

/// Safe fallback paths for `platform`, in order.
pub fn fallback_paths(platform: Platform) -> impl Iterator<Item = PathBuf> {
    SAFE_FALLBACKS
        .iter()
        .filter(move |e| e.platform == platform)
        .map(|e| expand_path(e.path))
}
