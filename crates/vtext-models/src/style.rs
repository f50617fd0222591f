//! Text style definitions.
//!
//! `TextStyleRequest` mirrors the loose option set a UI or CLI collects;
//! `TextStyleRequest::validate` turns it into a `TextStyle` once, at job
//! creation, so rendering never sees an invalid combination.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::color::Color;
use crate::error::{check_range, ValidationError, ValidationResult};

pub const MIN_FONT_SIZE: u32 = 10;
pub const MAX_FONT_SIZE: u32 = 200;
pub const DEFAULT_FONT_SIZE: u32 = 50;
pub const MAX_OUTLINE_WIDTH: u32 = 12;
pub const MAX_SHADOW_OFFSET: i32 = 20;
pub const MAX_BOX_PADDING: u32 = 80;

/// A font family name such as "Arial" or "DejaVu Sans".
///
/// Names of well-known families are normalized to their canonical casing so
/// "times new roman" and "Times New Roman" resolve identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
#[schemars(with = "String")]
pub struct FontFamily(String);

impl FontFamily {
    pub const ARIAL: &'static str = "Arial";
    pub const HELVETICA: &'static str = "Helvetica";
    pub const COURIER: &'static str = "Courier";
    pub const TIMES_NEW_ROMAN: &'static str = "Times New Roman";
    pub const GEORGIA: &'static str = "Georgia";
    pub const VERDANA: &'static str = "Verdana";
    pub const IMPACT: &'static str = "Impact";
    pub const DEJAVU_SANS: &'static str = "DejaVu Sans";
    pub const DEJAVU_SANS_MONO: &'static str = "DejaVu Sans Mono";
    pub const DEJAVU_SERIF: &'static str = "DejaVu Serif";
    pub const LIBERATION_SANS: &'static str = "Liberation Sans";

    /// Families offered in the style picker, in display order.
    pub const PICKER: &'static [&'static str] = &[
        Self::ARIAL,
        Self::HELVETICA,
        Self::COURIER,
        Self::TIMES_NEW_ROMAN,
        Self::IMPACT,
        Self::GEORGIA,
        Self::VERDANA,
    ];

    const KNOWN: &'static [&'static str] = &[
        Self::ARIAL,
        Self::HELVETICA,
        Self::COURIER,
        Self::TIMES_NEW_ROMAN,
        Self::GEORGIA,
        Self::VERDANA,
        Self::IMPACT,
        Self::DEJAVU_SANS,
        Self::DEJAVU_SANS_MONO,
        Self::DEJAVU_SERIF,
        Self::LIBERATION_SANS,
    ];

    /// Create a family from a user-supplied name.
    pub fn new(name: impl AsRef<str>) -> ValidationResult<Self> {
        let name = name.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            return Err(ValidationError::EmptyFamily);
        }
        let canonical = Self::KNOWN
            .iter()
            .find(|known| known.eq_ignore_ascii_case(&name))
            .map(|known| known.to_string())
            .unwrap_or(name);
        Ok(Self(canonical))
    }

    /// Family for one of the associated name constants.
    pub fn named(name: &'static str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the curated families.
    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.0.as_str())
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FontFamily {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FontFamily {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FontFamily> for String {
    fn from(family: FontFamily) -> Self {
        family.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
}

/// Concrete face within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum FontVariant {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontVariant {
    pub const ALL: &'static [FontVariant] = &[
        FontVariant::Regular,
        FontVariant::Bold,
        FontVariant::Italic,
        FontVariant::BoldItalic,
    ];

    pub fn from_parts(weight: FontWeight, slant: FontSlant) -> Self {
        match (weight, slant) {
            (FontWeight::Normal, FontSlant::Normal) => FontVariant::Regular,
            (FontWeight::Bold, FontSlant::Normal) => FontVariant::Bold,
            (FontWeight::Normal, FontSlant::Italic) => FontVariant::Italic,
            (FontWeight::Bold, FontSlant::Italic) => FontVariant::BoldItalic,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, FontVariant::Bold | FontVariant::BoldItalic)
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, FontVariant::Italic | FontVariant::BoldItalic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontVariant::Regular => "regular",
            FontVariant::Bold => "bold",
            FontVariant::Italic => "italic",
            FontVariant::BoldItalic => "bold_italic",
        }
    }
}

impl fmt::Display for FontVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the glyphs come from. Exactly one source is active per style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FontSource {
    /// A family looked up in the font directories.
    Family {
        family: FontFamily,
        #[serde(default)]
        weight: FontWeight,
        #[serde(default)]
        slant: FontSlant,
    },
    /// A user-supplied font file used as-is.
    File {
        path: PathBuf,
        /// Variant the user also asked for; a custom file cannot honor it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ignored_variant: Option<FontVariant>,
    },
}

impl FontSource {
    pub fn family(name: &'static str, weight: FontWeight, slant: FontSlant) -> Self {
        FontSource::Family {
            family: FontFamily::named(name),
            weight,
            slant,
        }
    }

    /// Requested variant, if this source is a family lookup.
    pub fn variant(&self) -> Option<FontVariant> {
        match self {
            FontSource::Family { weight, slant, .. } => {
                Some(FontVariant::from_parts(*weight, *slant))
            }
            FontSource::File { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Outline {
    pub color: Color,
    /// Stroke width in pixels (1..=12)
    pub width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Shadow {
    pub color: Color,
    pub opacity: f32,
    pub dx: i32,
    pub dy: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BackgroundBox {
    pub color: Color,
    pub opacity: f32,
    /// Padding around the text in pixels
    pub padding: u32,
}

/// A validated, renderable text style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextStyle {
    pub font: FontSource,
    pub size: u32,
    pub fill: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<Outline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundBox>,
}

impl Default for TextStyle {
    fn default() -> Self {
        // Infallible: the default request satisfies every rule.
        TextStyleRequest::default()
            .validate()
            .unwrap_or_else(|_| TextStyle {
                font: FontSource::family(FontFamily::ARIAL, FontWeight::Normal, FontSlant::Normal),
                size: DEFAULT_FONT_SIZE,
                fill: Color::WHITE,
                outline: None,
                shadow: None,
                background: None,
            })
    }
}

/// Loosely typed style options as collected from a UI or command line.
///
/// Defaults match the interactive tool's initial control values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TextStyleRequest {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
    pub custom_font: Option<PathBuf>,
    pub size: u32,
    pub color: String,
    pub outline_width: u32,
    pub outline_color: String,
    pub shadow_enabled: bool,
    pub shadow_color: String,
    pub shadow_opacity: f32,
    pub shadow_dx: i32,
    pub shadow_dy: i32,
    pub box_enabled: bool,
    pub box_color: String,
    pub box_opacity: f32,
    pub box_padding: u32,
}

impl Default for TextStyleRequest {
    fn default() -> Self {
        Self {
            family: FontFamily::ARIAL.to_string(),
            bold: false,
            italic: false,
            custom_font: None,
            size: DEFAULT_FONT_SIZE,
            color: "#FFFFFF".to_string(),
            outline_width: 2,
            outline_color: "#000000".to_string(),
            shadow_enabled: true,
            shadow_color: "#000000".to_string(),
            shadow_opacity: 0.5,
            shadow_dx: 2,
            shadow_dy: 2,
            box_enabled: false,
            box_color: "#000000".to_string(),
            box_opacity: 0.25,
            box_padding: 16,
        }
    }
}

impl TextStyleRequest {
    /// Validate every option and build the typed style.
    pub fn validate(&self) -> ValidationResult<TextStyle> {
        check_range(
            "font size",
            f64::from(self.size),
            f64::from(MIN_FONT_SIZE),
            f64::from(MAX_FONT_SIZE),
        )?;
        let fill = Color::parse_hex(&self.color)?;
        let weight = if self.bold { FontWeight::Bold } else { FontWeight::Normal };
        let slant = if self.italic { FontSlant::Italic } else { FontSlant::Normal };

        let font = match &self.custom_font {
            Some(path) => {
                validate_font_file(path)?;
                let variant = FontVariant::from_parts(weight, slant);
                FontSource::File {
                    path: path.clone(),
                    ignored_variant: (variant != FontVariant::Regular).then_some(variant),
                }
            }
            None => FontSource::Family {
                family: FontFamily::new(&self.family)?,
                weight,
                slant,
            },
        };

        check_range(
            "outline width",
            f64::from(self.outline_width),
            0.0,
            f64::from(MAX_OUTLINE_WIDTH),
        )?;
        let outline_color = Color::parse_hex(&self.outline_color)?;
        let outline = (self.outline_width > 0).then_some(Outline {
            color: outline_color,
            width: self.outline_width,
        });

        let shadow = if self.shadow_enabled {
            let max = f64::from(MAX_SHADOW_OFFSET);
            check_range("shadow offset x", f64::from(self.shadow_dx), -max, max)?;
            check_range("shadow offset y", f64::from(self.shadow_dy), -max, max)?;
            check_range("shadow opacity", f64::from(self.shadow_opacity), 0.0, 1.0)?;
            let color = Color::parse_hex(&self.shadow_color)?;
            (self.shadow_opacity > 0.0).then_some(Shadow {
                color,
                opacity: self.shadow_opacity,
                dx: self.shadow_dx,
                dy: self.shadow_dy,
            })
        } else {
            None
        };

        let background = if self.box_enabled {
            check_range("box opacity", f64::from(self.box_opacity), 0.0, 1.0)?;
            check_range(
                "box padding",
                f64::from(self.box_padding),
                0.0,
                f64::from(MAX_BOX_PADDING),
            )?;
            let color = Color::parse_hex(&self.box_color)?;
            (self.box_opacity > 0.0).then_some(BackgroundBox {
                color,
                opacity: self.box_opacity,
                padding: self.box_padding,
            })
        } else {
            None
        };

        Ok(TextStyle {
            font,
            size: self.size,
            fill,
            outline,
            shadow,
            background,
        })
    }
}

fn validate_font_file(path: &Path) -> ValidationResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("ttf") | Some("otf") => Ok(()),
        _ => Err(ValidationError::UnsupportedFontFile(
            path.display().to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_validates() {
        let style = TextStyleRequest::default().validate().unwrap();
        assert_eq!(style.size, 50);
        assert_eq!(style.fill, Color::WHITE);
        assert_eq!(style.outline.unwrap().width, 2);
        assert!(style.shadow.is_some());
        assert!(style.background.is_none());
        assert_eq!(style.font.variant(), Some(FontVariant::Regular));
    }

    #[test]
    fn test_family_canonicalization() {
        let family = FontFamily::new("  times   new roman ").unwrap();
        assert_eq!(family.as_str(), "Times New Roman");
        assert!(family.is_known());

        let custom = FontFamily::new("Roboto Slab").unwrap();
        assert_eq!(custom.as_str(), "Roboto Slab");
        assert!(!custom.is_known());

        assert_eq!(FontFamily::new("   "), Err(ValidationError::EmptyFamily));
    }

    #[test]
    fn test_rejects_out_of_range_size() {
        let request = TextStyleRequest {
            size: 5,
            ..Default::default()
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::OutOfRange { field: "font size", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_colors_early() {
        let request = TextStyleRequest {
            color: "white".to_string(),
            ..Default::default()
        };
        assert!(matches!(request.validate(), Err(ValidationError::InvalidColor(_))));

        // Disabled layers do not validate their color.
        let request = TextStyleRequest {
            box_enabled: false,
            box_color: "nope".to_string(),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_zero_opacity_layers_dropped() {
        let request = TextStyleRequest {
            shadow_opacity: 0.0,
            box_enabled: true,
            box_opacity: 0.0,
            outline_width: 0,
            ..Default::default()
        };
        let style = request.validate().unwrap();
        assert!(style.shadow.is_none());
        assert!(style.background.is_none());
        assert!(style.outline.is_none());
    }

    #[test]
    fn test_custom_font_ignores_variant() {
        let request = TextStyleRequest {
            custom_font: Some(PathBuf::from("/tmp/MyFont.OTF")),
            bold: true,
            ..Default::default()
        };
        let style = request.validate().unwrap();
        match style.font {
            FontSource::File {
                path,
                ignored_variant,
            } => {
                assert_eq!(path, PathBuf::from("/tmp/MyFont.OTF"));
                assert_eq!(ignored_variant, Some(FontVariant::Bold));
            }
            other => panic!("expected file source, got {:?}", other),
        }

        let request = TextStyleRequest {
            custom_font: Some(PathBuf::from("/tmp/font.woff2")),
            ..Default::default()
        };
        assert!(matches!(
            request.validate(),
            Err(ValidationError::UnsupportedFontFile(_))
        ));
    }

    #[test]
    fn test_variant_from_parts() {
        assert_eq!(
            FontVariant::from_parts(FontWeight::Bold, FontSlant::Italic),
            FontVariant::BoldItalic
        );
        assert!(FontVariant::BoldItalic.is_bold());
        assert!(FontVariant::BoldItalic.is_italic());
        assert!(!FontVariant::Italic.is_bold());
    }
}
