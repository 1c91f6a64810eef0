//! # Font Resolution
//!
//! Maps a requested font family to something that can draw text. The chain,
//! each step tried only when the previous one produced nothing usable:
//!
//! ```text
//! 1. the request is itself a font file         "/opt/fonts/Label.ttf"
//! 2. family table for this platform            "Times New Roman" → times.ttf
//!      tries: name, name without spaces, both + ".ttf"
//! 3. platform safe fallbacks (2-3 files)       DejaVuSans.ttf, ...
//! 4. built-in Spleen 12×24 bitmap font         always available
//! ```
//!
//! A candidate that is missing, unreadable, or fails to parse is logged and
//! skipped. Resolution itself cannot fail.
//!
//! File access goes through [`FontSource`], so the chain can be exercised
//! against a fake filesystem.

pub mod builtin;
pub mod outline;
pub mod table;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use ab_glyph::FontArc;
use tracing::{debug, warn};

use crate::raster::Bitmap;
pub use table::Platform;

/// Filesystem access used by the resolver.
pub trait FontSource {
    /// Whether `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Read the whole file.
    fn load(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFonts;

impl FontSource for SystemFonts {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// A font ready to rasterize text.
#[derive(Clone)]
pub enum ResolvedFont {
    /// Outline font loaded from `path`, drawn at `size_px`.
    Outline {
        font: FontArc,
        path: PathBuf,
        size_px: f32,
    },
    /// Built-in bitmap font at its fixed size.
    Builtin,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedFont::Outline { path, size_px, .. } => f
                .debug_struct("Outline")
                .field("path", path)
                .field("size_px", size_px)
                .finish(),
            ResolvedFont::Builtin => f.write_str("Builtin"),
        }
    }
}

impl ResolvedFont {
    pub fn is_builtin(&self) -> bool {
        matches!(self, ResolvedFont::Builtin)
    }

    /// Render `text` to a bi-level bitmap sized to the text.
    pub fn rasterize(&self, text: &str) -> Bitmap {
        match self {
            ResolvedFont::Outline { font, size_px, .. } => outline::rasterize(font, *size_px, text),
            ResolvedFont::Builtin => builtin::rasterize(text),
        }
    }
}

/// Resolves font families through the fallback chain.
///
/// Parsed fonts are cached by path for the resolver's lifetime.
pub struct FontResolver<S = SystemFonts> {
    source: S,
    platform: Platform,
    cache: Mutex<HashMap<PathBuf, FontArc>>,
}

impl FontResolver<SystemFonts> {
    /// Resolver over the real filesystem for the current platform.
    pub fn new() -> Self {
        Self::with_source(SystemFonts)
    }
}

impl Default for FontResolver<SystemFonts> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FontSource> FontResolver<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            platform: Platform::current(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Use another platform's table (tests, cross-platform previews).
    pub fn for_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Candidate files for `family`, in the order they are tried.
    pub fn candidates(&self, family: &str) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = Vec::new();
        let mut push = |path: PathBuf| {
            if !out.contains(&path) {
                out.push(path);
            }
        };

        if !family.trim().is_empty() {
            push(PathBuf::from(family));
        }

        let normalized = family.trim().to_lowercase();
        let compact = normalized.replace(' ', "");
        let variations = [
            normalized.clone(),
            compact.clone(),
            format!("{}.ttf", normalized),
            format!("{}.ttf", compact),
        ];
        for variation in &variations {
            for path in table::family_paths(self.platform, variation) {
                push(path);
            }
        }

        for path in table::fallback_paths(self.platform) {
            push(path);
        }

        out
    }

    /// Resolve `family` at `size_px`. Never fails: the last resort is the
    /// built-in bitmap font.
    pub fn resolve(&self, family: &str, size_px: f32) -> ResolvedFont {
        for path in self.candidates(family) {
            if let Some(font) = self.try_load(&path) {
                debug!(family, path = %path.display(), "font resolved");
                return ResolvedFont::Outline {
                    font,
                    path,
                    size_px,
                };
            }
        }

        warn!(family, "no usable font file, using built-in bitmap font");
        ResolvedFont::Builtin
    }

    fn try_load(&self, path: &Path) -> Option<FontArc> {
        if !self.source.is_file(path) {
            return None;
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(font) = cache.get(path) {
            return Some(font.clone());
        }

        let bytes = match self.source.load(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read font");
                return None;
            }
        };
        match FontArc::try_from_vec(bytes) {
            Ok(font) => {
                cache.insert(path.to_path_buf(), font.clone());
                Some(font)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse font");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// Fake filesystem: a set of "existing" paths whose contents are not a
    /// valid font, and a log of every existence probe.
    #[derive(Default)]
    struct FakeFonts {
        existing: HashSet<PathBuf>,
        unreadable: HashSet<PathBuf>,
        probed: RefCell<Vec<PathBuf>>,
    }

    impl FontSource for FakeFonts {
        fn is_file(&self, path: &Path) -> bool {
            self.probed.borrow_mut().push(path.to_path_buf());
            self.existing.contains(path)
        }

        fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
            if self.unreadable.contains(path) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            Ok(b"definitely not a font".to_vec())
        }
    }

    fn linux(source: FakeFonts) -> FontResolver<FakeFonts> {
        FontResolver::with_source(source).for_platform(Platform::Linux)
    }

    #[test]
    fn test_unknown_family_falls_back_to_builtin() {
        let resolver = linux(FakeFonts::default());
        let font = resolver.resolve("Comic Papyrus Deluxe", 30.0);
        assert!(font.is_builtin());
        assert!(font.rasterize("OK").count_black() > 0);
    }

    #[test]
    fn test_never_fails_on_odd_input() {
        let resolver = linux(FakeFonts::default());
        for family in ["", "   ", "\0", "../../etc/passwd", "ARIAL", "💥", "a\nb"] {
            let _ = resolver.resolve(family, 12.0);
        }
    }

    #[test]
    fn test_candidate_order() {
        let resolver = linux(FakeFonts::default());
        let candidates = resolver.candidates("  Times New Roman ");
        assert_eq!(candidates[0], PathBuf::from("  Times New Roman "));
        assert_eq!(
            candidates[1],
            PathBuf::from("/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf")
        );
        // Safe fallbacks come last, in table order
        let n = candidates.len();
        assert_eq!(
            candidates[n - 2],
            PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf")
        );
        assert_eq!(
            candidates[n - 1],
            PathBuf::from("/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf")
        );
    }

    #[test]
    fn test_space_removed_variation() {
        let resolver = linux(FakeFonts::default());
        let candidates = resolver.candidates("DejaVu Sans");
        assert!(candidates.contains(&PathBuf::from(
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
        )));
    }

    #[test]
    fn test_candidates_are_deduplicated() {
        let resolver = linux(FakeFonts::default());
        let candidates = resolver.candidates("sans");
        let unique: HashSet<_> = candidates.iter().collect();
        assert_eq!(unique.len(), candidates.len());
    }

    #[test]
    fn test_every_candidate_is_probed_before_builtin() {
        let resolver = linux(FakeFonts::default());
        let _ = resolver.resolve("arial", 20.0);
        let probed = resolver.source.probed.borrow().clone();
        assert_eq!(probed, resolver.candidates("arial"));
    }

    #[test]
    fn test_corrupt_and_unreadable_files_are_skipped() {
        let arial = PathBuf::from("/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf");
        let dejavu = PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
        let source = FakeFonts {
            existing: [arial.clone(), dejavu.clone()].into_iter().collect(),
            unreadable: [dejavu].into_iter().collect(),
            ..Default::default()
        };
        let resolver = linux(source);
        // arial exists but does not parse, dejavu exists but cannot be read
        assert!(resolver.resolve("arial", 20.0).is_builtin());
    }

    #[test]
    fn test_windows_table_lookup() {
        let resolver = FontResolver::with_source(FakeFonts::default()).for_platform(Platform::Windows);
        let candidates = resolver.candidates("Trebuchet MS");
        assert!(
            candidates[1].to_string_lossy().ends_with(r"\Fonts\trebuc.ttf"),
            "{:?}",
            candidates
        );
    }
}
