//! Font resolution.
//!
//! `StyleResolver` turns a `FontSource` into a concrete font file. Lookup
//! order for a family request:
//!
//! 1. the exact variant file under the family's native names,
//! 2. the closest partial variant (bold-italic falls back to bold, then
//!    italic, then regular) with the missing parts emulated at render time,
//! 3. a metric-compatible substitute family, same rules,
//! 4. the configured default family, same rules.
//!
//! Only when all of that fails is a `FontResolutionError` returned.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use vtext_models::{FontFamily, FontSource, FontVariant};

/// Family used when a requested family is missing and nothing else is configured.
pub const DEFAULT_FALLBACK_FAMILY: &str = FontFamily::DEJAVU_SANS;

/// Maximum directory depth searched below each font directory.
const MAX_SCAN_DEPTH: usize = 4;

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FontResolutionError {
    #[error("Custom font file not found: {0}")]
    MissingFile(PathBuf),

    #[error("No font found for family '{family}'{}", describe_default(.default))]
    NotFound {
        family: String,
        default: Option<String>,
        searched_dirs: usize,
    },
}

fn describe_default(default: &Option<String>) -> String {
    match default {
        Some(default) => format!(" or default family '{}'", default),
        None => " and no default family is configured".to_string(),
    }
}

/// Platform whose font directories are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

/// Supplies the ordered list of directories to search for a platform.
pub trait FontDirectoryProvider: Send + Sync {
    fn font_dirs(&self, platform: Platform) -> Vec<PathBuf>;
}

/// Well-known system font directories, plus an optional bundled `fonts/` dir.
///
/// The bundled directory is searched first except on Windows, where the
/// system fonts are the native source for the catalog families.
#[derive(Debug, Clone, Default)]
pub struct SystemFontDirs {
    bundled: Option<PathBuf>,
}

impl SystemFontDirs {
    pub fn new(bundled: Option<PathBuf>) -> Self {
        Self { bundled }
    }
}

impl FontDirectoryProvider for SystemFontDirs {
    fn font_dirs(&self, platform: Platform) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = Vec::new();
        match platform {
            Platform::Windows => {
                let windir = std::env::var_os("WINDIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
                out.push(windir.join("Fonts"));
                if let Some(local) = dirs::data_local_dir() {
                    out.push(local.join("Microsoft").join("Windows").join("Fonts"));
                }
                out.extend(self.bundled.clone());
            }
            Platform::Linux => {
                out.extend(self.bundled.clone());
                if let Some(home) = dirs::home_dir() {
                    out.push(home.join(".fonts"));
                }
                out.extend(dirs::font_dir());
                out.push(PathBuf::from("/usr/share/fonts/truetype/dejavu"));
                out.push(PathBuf::from("/usr/share/fonts/truetype/liberation"));
                out.push(PathBuf::from("/usr/share/fonts"));
                out.push(PathBuf::from("/usr/local/share/fonts"));
            }
            Platform::MacOs => {
                out.extend(self.bundled.clone());
                out.extend(dirs::font_dir());
                out.push(PathBuf::from("/Library/Fonts"));
                out.push(PathBuf::from("/System/Library/Fonts"));
            }
        }
        let mut seen = Vec::with_capacity(out.len());
        out.retain(|dir| {
            if seen.contains(dir) {
                false
            } else {
                seen.push(dir.clone());
                true
            }
        });
        out
    }
}

/// A fixed directory list, independent of platform.
#[derive(Debug, Clone, Default)]
pub struct StaticFontDirs(pub Vec<PathBuf>);

impl FontDirectoryProvider for StaticFontDirs {
    fn font_dirs(&self, _platform: Platform) -> Vec<PathBuf> {
        self.0.clone()
    }
}

/// Curated file names for a family, indexed by `variant_slot`.
struct CatalogEntry {
    family: &'static str,
    files: [&'static [&'static str]; 4],
    substitutes: &'static [&'static str],
}

const ARIAL_FILES: [&[&str]; 4] = [
    &["arial.ttf"],
    &["arialbd.ttf"],
    &["ariali.ttf"],
    &["arialbi.ttf"],
];

const SANS_SUBSTITUTES: &[&str] = &["Liberation Sans", FontFamily::DEJAVU_SANS];
const SERIF_SUBSTITUTES: &[&str] = &["Liberation Serif", FontFamily::DEJAVU_SERIF];
const MONO_SUBSTITUTES: &[&str] = &["Liberation Mono", FontFamily::DEJAVU_SANS_MONO];

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        family: FontFamily::ARIAL,
        files: ARIAL_FILES,
        substitutes: SANS_SUBSTITUTES,
    },
    CatalogEntry {
        family: FontFamily::HELVETICA,
        files: ARIAL_FILES,
        substitutes: SANS_SUBSTITUTES,
    },
    CatalogEntry {
        family: FontFamily::COURIER,
        files: [
            &["cour.ttf", "Courier New.ttf"],
            &["courbd.ttf", "Courier New Bold.ttf"],
            &["couri.ttf", "Courier New Italic.ttf"],
            &["courbi.ttf", "Courier New Bold Italic.ttf"],
        ],
        substitutes: MONO_SUBSTITUTES,
    },
    CatalogEntry {
        family: FontFamily::TIMES_NEW_ROMAN,
        files: [
            &["times.ttf"],
            &["timesbd.ttf"],
            &["timesi.ttf"],
            &["timesbi.ttf"],
        ],
        substitutes: SERIF_SUBSTITUTES,
    },
    CatalogEntry {
        family: FontFamily::GEORGIA,
        files: [
            &["georgia.ttf"],
            &["georgiab.ttf"],
            &["georgiai.ttf"],
            &["georgiaz.ttf"],
        ],
        substitutes: SERIF_SUBSTITUTES,
    },
    CatalogEntry {
        family: FontFamily::VERDANA,
        files: [
            &["verdana.ttf"],
            &["verdanab.ttf"],
            &["verdanai.ttf"],
            &["verdanaz.ttf"],
        ],
        substitutes: &[FontFamily::DEJAVU_SANS, "Liberation Sans"],
    },
    CatalogEntry {
        family: FontFamily::IMPACT,
        files: [&["impact.ttf"], &[], &[], &[]],
        substitutes: &[FontFamily::DEJAVU_SANS, "Liberation Sans"],
    },
    CatalogEntry {
        family: FontFamily::DEJAVU_SANS,
        files: [
            &["DejaVuSans.ttf"],
            &["DejaVuSans-Bold.ttf"],
            &["DejaVuSans-Oblique.ttf"],
            &["DejaVuSans-BoldOblique.ttf"],
        ],
        substitutes: &["Liberation Sans"],
    },
    CatalogEntry {
        family: FontFamily::DEJAVU_SANS_MONO,
        files: [
            &["DejaVuSansMono.ttf"],
            &["DejaVuSansMono-Bold.ttf"],
            &["DejaVuSansMono-Oblique.ttf"],
            &["DejaVuSansMono-BoldOblique.ttf"],
        ],
        substitutes: &["Liberation Mono"],
    },
    CatalogEntry {
        family: FontFamily::DEJAVU_SERIF,
        files: [
            &["DejaVuSerif.ttf"],
            &["DejaVuSerif-Bold.ttf"],
            &["DejaVuSerif-Italic.ttf"],
            &["DejaVuSerif-BoldItalic.ttf"],
        ],
        substitutes: &["Liberation Serif"],
    },
    CatalogEntry {
        family: FontFamily::LIBERATION_SANS,
        files: [
            &["LiberationSans-Regular.ttf"],
            &["LiberationSans-Bold.ttf"],
            &["LiberationSans-Italic.ttf"],
            &["LiberationSans-BoldItalic.ttf"],
        ],
        substitutes: &[FontFamily::DEJAVU_SANS],
    },
];

fn catalog_entry(family: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.family.eq_ignore_ascii_case(family))
}

/// Families with curated file names, in catalog order.
pub fn catalog_families() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|e| e.family)
}

fn variant_slot(variant: FontVariant) -> usize {
    match variant {
        FontVariant::Regular => 0,
        FontVariant::Bold => 1,
        FontVariant::Italic => 2,
        FontVariant::BoldItalic => 3,
    }
}

/// Faces to try for a requested variant, best first.
fn face_order(variant: FontVariant) -> &'static [FontVariant] {
    match variant {
        FontVariant::Regular => &[FontVariant::Regular],
        FontVariant::Bold => &[FontVariant::Bold, FontVariant::Regular],
        FontVariant::Italic => &[FontVariant::Italic, FontVariant::Regular],
        FontVariant::BoldItalic => &[
            FontVariant::BoldItalic,
            FontVariant::Bold,
            FontVariant::Italic,
            FontVariant::Regular,
        ],
    }
}

/// Candidate file names for one face of a family, most specific first.
fn candidate_names(family: &str, face: FontVariant) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    if let Some(entry) = catalog_entry(family) {
        names.extend(entry.files[variant_slot(face)].iter().map(|n| n.to_string()));
    }

    let compact: String = family.split_whitespace().collect();
    let short = match face {
        FontVariant::Regular => "",
        FontVariant::Bold => "bd",
        FontVariant::Italic => "i",
        FontVariant::BoldItalic => "bi",
    };
    let suffixes: &[&str] = match face {
        FontVariant::Regular => &["", "Regular"],
        FontVariant::Bold => &["Bold"],
        FontVariant::Italic => &["Italic", "Oblique"],
        FontVariant::BoldItalic => &["Bold Italic", "BoldItalic", "Bold Oblique", "BoldOblique"],
    };

    for ext in ["ttf", "otf"] {
        for suffix in suffixes {
            if suffix.is_empty() {
                names.push(format!("{}.{}", family, ext));
                names.push(format!("{}.{}", compact, ext));
            } else {
                names.push(format!("{} {}.{}", family, suffix, ext));
                names.push(format!("{}-{}.{}", family, suffix, ext));
                names.push(format!("{}-{}.{}", compact, suffix.replace(' ', ""), ext));
            }
        }
        names.push(format!("{}{}.{}", compact.to_lowercase(), short, ext));
    }
    if face == FontVariant::Regular {
        names.push(format!("{}.ttc", family));
    }

    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    names.retain(|name| {
        let key = name.to_lowercase();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    names
}

/// Index of font files found under a list of directories.
///
/// Keys are lowercased file names; earlier directories win.
#[derive(Debug, Clone, Default)]
pub struct FontIndex {
    files: HashMap<String, PathBuf>,
    dirs: Vec<PathBuf>,
}

impl FontIndex {
    pub fn scan(dirs: &[PathBuf]) -> Self {
        let mut files = HashMap::new();
        for dir in dirs {
            scan_dir(dir, 0, &mut files);
        }
        Self {
            files,
            dirs: dirs.to_vec(),
        }
    }

    fn find(&self, file_name: &str) -> Option<&PathBuf> {
        self.files.get(&file_name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

fn scan_dir(dir: &Path, depth: usize, files: &mut HashMap<String, PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            if depth < MAX_SCAN_DEPTH {
                scan_dir(&path, depth + 1, files);
            }
            continue;
        }
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| FONT_EXTENSIONS.iter().any(|f| f.eq_ignore_ascii_case(e)))
            .unwrap_or(false);
        if !is_font {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.entry(name.to_lowercase()).or_insert_with(|| path.clone());
        }
    }
}

/// How a resolution deviated from the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FontFallback {
    /// A metric-compatible family stood in for the requested one.
    Substitute { requested: String, substitute: String },
    /// The requested family was unavailable; the default family was used.
    DefaultFamily { requested: String, default: String },
}

/// A concrete font file plus the emulation needed to honor the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFont {
    pub path: PathBuf,
    /// Family the file belongs to
    pub family: String,
    pub requested: FontVariant,
    /// Face of the file that was found
    pub face: FontVariant,
    pub synthetic_bold: bool,
    pub synthetic_italic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FontFallback>,
    /// Variant requested alongside a custom font file, which cannot honor it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_variant: Option<FontVariant>,
}

impl ResolvedFont {
    /// A user-supplied font file, used as-is.
    pub fn custom(path: impl Into<PathBuf>, ignored_variant: Option<FontVariant>) -> Self {
        let path = path.into();
        let family = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom")
            .to_string();
        Self {
            path,
            family,
            requested: FontVariant::Regular,
            face: FontVariant::Regular,
            synthetic_bold: false,
            synthetic_italic: false,
            fallback: None,
            ignored_variant,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic_bold || self.synthetic_italic
    }

    /// Human-readable notes about recovered problems, for job reports.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(variant) = self.ignored_variant {
            warnings.push(format!(
                "custom font file {} is used as-is; requested {} variant ignored",
                self.path.display(),
                variant
            ));
        }
        if let Some(FontFallback::DefaultFamily { requested, default }) = &self.fallback {
            warnings.push(format!(
                "font family '{}' not found; using default family '{}'",
                requested, default
            ));
        }
        warnings
    }
}

/// Resolution result for one catalog family, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct FontReport {
    pub family: String,
    pub variant: FontVariant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedFont>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Maps font requests to files on disk.
#[derive(Debug, Clone)]
pub struct StyleResolver {
    index: FontIndex,
    default_family: Option<FontFamily>,
}

impl StyleResolver {
    /// Index the provider's directories for `platform`.
    pub fn new(
        provider: &dyn FontDirectoryProvider,
        platform: Platform,
        default_family: Option<FontFamily>,
    ) -> Self {
        Self::from_dirs(&provider.font_dirs(platform), default_family)
    }

    pub fn from_dirs(dirs: &[PathBuf], default_family: Option<FontFamily>) -> Self {
        let index = FontIndex::scan(dirs);
        debug!(dirs = dirs.len(), fonts = index.len(), "Indexed font directories");
        Self {
            index,
            default_family,
        }
    }

    pub fn default_family(&self) -> Option<&FontFamily> {
        self.default_family.as_ref()
    }

    pub fn index(&self) -> &FontIndex {
        &self.index
    }

    pub fn resolve(&self, source: &FontSource) -> Result<ResolvedFont, FontResolutionError> {
        match source {
            FontSource::File {
                path,
                ignored_variant,
            } => {
                if !path.is_file() {
                    return Err(FontResolutionError::MissingFile(path.clone()));
                }
                if let Some(variant) = ignored_variant {
                    warn!(
                        font = %path.display(),
                        variant = %variant,
                        "Custom font file ignores bold/italic request"
                    );
                }
                Ok(ResolvedFont::custom(path.clone(), *ignored_variant))
            }
            FontSource::Family {
                family,
                weight,
                slant,
            } => self.resolve_family(family, FontVariant::from_parts(*weight, *slant)),
        }
    }

    pub fn resolve_family(
        &self,
        family: &FontFamily,
        variant: FontVariant,
    ) -> Result<ResolvedFont, FontResolutionError> {
        if let Some(found) = self.lookup_with_substitutes(family.as_str(), variant) {
            return Ok(found);
        }

        if let Some(default) = self.default_family.as_ref().filter(|d| *d != family) {
            if let Some(mut found) = self.lookup_with_substitutes(default.as_str(), variant) {
                warn!(
                    requested = %family,
                    default = %default,
                    font = %found.path.display(),
                    "Font family not found, using default family"
                );
                found.fallback = Some(FontFallback::DefaultFamily {
                    requested: family.to_string(),
                    default: default.to_string(),
                });
                return Ok(found);
            }
        }

        Err(FontResolutionError::NotFound {
            family: family.to_string(),
            default: self.default_family.as_ref().map(|d| d.to_string()),
            searched_dirs: self.index.dirs().len(),
        })
    }

    /// Resolve every catalog family at `variant`.
    pub fn catalog_report(&self, variant: FontVariant) -> Vec<FontReport> {
        catalog_families()
            .map(|name| {
                let family = FontFamily::named(name);
                match self.resolve_family(&family, variant) {
                    Ok(resolved) => FontReport {
                        family: name.to_string(),
                        variant,
                        resolved: Some(resolved),
                        error: None,
                    },
                    Err(e) => FontReport {
                        family: name.to_string(),
                        variant,
                        resolved: None,
                        error: Some(e.to_string()),
                    },
                }
            })
            .collect()
    }

    fn lookup_with_substitutes(&self, family: &str, variant: FontVariant) -> Option<ResolvedFont> {
        if let Some(found) = self.lookup(family, variant) {
            return Some(found);
        }
        let entry = catalog_entry(family)?;
        entry.substitutes.iter().find_map(|substitute| {
            let mut found = self.lookup(substitute, variant)?;
            info!(
                requested = family,
                substitute = substitute,
                font = %found.path.display(),
                "Using substitute font family"
            );
            found.fallback = Some(FontFallback::Substitute {
                requested: entry.family.to_string(),
                substitute: substitute.to_string(),
            });
            Some(found)
        })
    }

    fn lookup(&self, family: &str, variant: FontVariant) -> Option<ResolvedFont> {
        let display = catalog_entry(family).map(|e| e.family).unwrap_or(family);
        face_order(variant).iter().find_map(|&face| {
            candidate_names(family, face).iter().find_map(|name| {
                self.index.find(name).map(|path| ResolvedFont {
                    path: path.clone(),
                    family: display.to_string(),
                    requested: variant,
                    face,
                    synthetic_bold: variant.is_bold() && !face.is_bold(),
                    synthetic_italic: variant.is_italic() && !face.is_italic(),
                    fallback: None,
                    ignored_variant: None,
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vtext_models::{FontSlant, FontWeight};

    fn font_dir(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, b"").unwrap();
        }
        dir
    }

    fn resolver(dir: &TempDir, default: Option<&'static str>) -> StyleResolver {
        StyleResolver::from_dirs(&[dir.path().to_path_buf()], default.map(FontFamily::named))
    }

    fn arial() -> FontFamily {
        FontFamily::named(FontFamily::ARIAL)
    }

    #[test]
    fn test_exact_variant() {
        let dir = font_dir(&["arial.ttf", "arialbd.ttf"]);
        let found = resolver(&dir, None)
            .resolve_family(&arial(), FontVariant::Bold)
            .unwrap();
        assert_eq!(found.path, dir.path().join("arialbd.ttf"));
        assert!(!found.is_synthetic());
    }

    #[test]
    fn test_synthetic_bold_over_base_file() {
        let dir = font_dir(&["arial.ttf"]);
        let found = resolver(&dir, None)
            .resolve(&FontSource::family(
                FontFamily::ARIAL,
                FontWeight::Bold,
                FontSlant::Normal,
            ))
            .unwrap();
        assert_eq!(found.path, dir.path().join("arial.ttf"));
        assert_eq!(found.face, FontVariant::Regular);
        assert!(found.synthetic_bold);
        assert!(!found.synthetic_italic);
        assert!(found.fallback.is_none());
    }

    #[test]
    fn test_bold_italic_uses_closest_partial() {
        let dir = font_dir(&["arial.ttf", "arialbd.ttf"]);
        let found = resolver(&dir, None)
            .resolve_family(&arial(), FontVariant::BoldItalic)
            .unwrap();
        assert_eq!(found.face, FontVariant::Bold);
        assert!(!found.synthetic_bold);
        assert!(found.synthetic_italic);
    }

    #[test]
    fn test_display_and_hyphenated_names() {
        let dir = font_dir(&["Arial Bold.ttf", "sub/Arial-Italic.ttf"]);
        let resolver = resolver(&dir, None);
        let bold = resolver
            .resolve_family(&arial(), FontVariant::Bold)
            .unwrap();
        assert_eq!(bold.path, dir.path().join("Arial Bold.ttf"));
        let italic = resolver
            .resolve_family(&arial(), FontVariant::Italic)
            .unwrap();
        assert_eq!(italic.path, dir.path().join("sub").join("Arial-Italic.ttf"));
    }

    #[test]
    fn test_unknown_family_without_default_fails() {
        let dir = font_dir(&["arial.ttf"]);
        let family = FontFamily::new("Totally Unknown Sans").unwrap();
        let err = resolver(&dir, None)
            .resolve_family(&family, FontVariant::Regular)
            .unwrap_err();
        assert!(matches!(err, FontResolutionError::NotFound { default: None, .. }));
    }

    #[test]
    fn test_unknown_family_uses_default() {
        let dir = font_dir(&["truetype/dejavu/DejaVuSans.ttf"]);
        let family = FontFamily::new("Totally Unknown Sans").unwrap();
        let found = resolver(&dir, Some(FontFamily::DEJAVU_SANS))
            .resolve_family(&family, FontVariant::Regular)
            .unwrap();
        assert_eq!(found.family, FontFamily::DEJAVU_SANS);
        assert!(matches!(found.fallback, Some(FontFallback::DefaultFamily { .. })));
        assert_eq!(found.warnings().len(), 1);
    }

    #[test]
    fn test_substitute_family() {
        let dir = font_dir(&["LiberationSans-Regular.ttf", "LiberationSans-Bold.ttf"]);
        let found = resolver(&dir, None)
            .resolve_family(&arial(), FontVariant::Bold)
            .unwrap();
        assert_eq!(found.path, dir.path().join("LiberationSans-Bold.ttf"));
        assert_eq!(
            found.fallback,
            Some(FontFallback::Substitute {
                requested: "Arial".to_string(),
                substitute: "Liberation Sans".to_string(),
            })
        );
        assert!(found.warnings().is_empty());
    }

    #[test]
    fn test_native_partial_beats_substitute_exact() {
        let dir = font_dir(&["arial.ttf", "LiberationSans-Bold.ttf"]);
        let found = resolver(&dir, None)
            .resolve_family(&arial(), FontVariant::Bold)
            .unwrap();
        assert_eq!(found.path, dir.path().join("arial.ttf"));
        assert!(found.synthetic_bold);
    }

    #[test]
    fn test_earlier_directory_wins() {
        let first = font_dir(&["arial.ttf"]);
        let second = font_dir(&["arial.ttf"]);
        let dirs = StaticFontDirs(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let resolver = StyleResolver::new(&dirs, Platform::current(), None);
        let found = resolver
            .resolve_family(&arial(), FontVariant::Regular)
            .unwrap();
        assert_eq!(found.path, first.path().join("arial.ttf"));
    }

    #[test]
    fn test_custom_font_file() {
        let dir = font_dir(&["MyBrand.otf"]);
        let resolver = resolver(&dir, None);
        let source = FontSource::File {
            path: dir.path().join("MyBrand.otf"),
            ignored_variant: Some(FontVariant::Italic),
        };
        let found = resolver.resolve(&source).unwrap();
        assert_eq!(found.family, "MyBrand");
        assert!(!found.is_synthetic());
        assert_eq!(found.warnings().len(), 1);

        let missing = FontSource::File {
            path: dir.path().join("Missing.ttf"),
            ignored_variant: None,
        };
        assert!(matches!(
            resolver.resolve(&missing),
            Err(FontResolutionError::MissingFile(_))
        ));
    }

    #[test]
    fn test_catalog_report() {
        let dir = font_dir(&["DejaVuSans.ttf"]);
        let report =
            resolver(&dir, Some(FontFamily::DEJAVU_SANS)).catalog_report(FontVariant::Regular);
        assert_eq!(report.len(), catalog_families().count());
        assert!(report.iter().all(|r| r.resolved.is_some()));

        let report = resolver(&font_dir(&[]), None).catalog_report(FontVariant::Regular);
        assert!(report.iter().all(|r| r.error.is_some()));
    }

    #[test]
    fn test_linux_dirs_put_bundled_first() {
        let provider = SystemFontDirs::new(Some(PathBuf::from("/app/fonts")));
        let dirs = provider.font_dirs(Platform::Linux);
        assert_eq!(dirs.first(), Some(&PathBuf::from("/app/fonts")));
        assert!(dirs.contains(&PathBuf::from("/usr/share/fonts")));

        let dirs = provider.font_dirs(Platform::Windows);
        assert!(dirs[0].ends_with("Fonts"));
        assert_eq!(dirs.last(), Some(&PathBuf::from("/app/fonts")));
    }

    #[test]
    fn test_candidate_names() {
        let names = candidate_names("Arial", FontVariant::BoldItalic);
        assert_eq!(names[0], "arialbi.ttf");
        assert!(names.contains(&"Arial Bold Italic.ttf".to_string()));
        assert!(names.contains(&"Arial-BoldItalic.ttf".to_string()));

        let names = candidate_names("Liberation Mono", FontVariant::Regular);
        assert!(names.contains(&"LiberationMono-Regular.ttf".to_string()));
    }
}
