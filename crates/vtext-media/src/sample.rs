//! Font sample images.
//!
//! Renders a short line of text with the full style stack (box, shadow,
//! outline, fill, synthetic bold/italic) onto a transparent PNG so a user
//! can judge a font before committing to an encode.

use std::collections::VecDeque;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};
use vtext_models::{Color, TextStyle};

use crate::compose::bold_emphasis;
use crate::drawtext::ITALIC_SHEAR;
use crate::error::{MediaError, MediaResult};
use crate::fonts::ResolvedFont;

pub const SAMPLE_WIDTH: u32 = 900;
pub const SAMPLE_HEIGHT: u32 = 220;
pub const DEFAULT_SAMPLE_TEXT: &str = "The quick brown fox 123";

const MAX_SAMPLE_CHARS: usize = 60;
const TRUNCATED_CHARS: usize = 57;
/// Minimum distance from the text block to the image edge.
const MIN_OFFSET: i64 = 10;

/// Text shown in a sample: newlines flattened, long text truncated.
pub fn sample_text(text: Option<&str>) -> String {
    let trimmed = text.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return DEFAULT_SAMPLE_TEXT.to_string();
    }
    let flat = trimmed.replace("\r\n", " ").replace('\n', " ");
    if flat.chars().count() > MAX_SAMPLE_CHARS {
        let mut cut: String = flat.chars().take(TRUNCATED_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        flat
    }
}

/// Coverage values for a block of text.
struct Mask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Mask {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    fn get(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }

    fn raise(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let cell = &mut self.data[y as usize * self.width + x as usize];
        *cell = (*cell).max(value);
    }

    /// Grow coverage by `radius` pixels in every direction (disc-shaped).
    ///
    /// Each disc row is a horizontal window of half-width `k`, so the disc is
    /// the max over rows of sliding-window maxima: O(w * h * r).
    fn dilate(&self, radius: u32) -> Mask {
        if radius == 0 {
            return Mask {
                width: self.width,
                height: self.height,
                data: self.data.clone(),
            };
        }
        let r = radius as usize;
        let half_widths: Vec<usize> = (0..=r).map(|dy| disc_half_width(r, dy)).collect();

        let mut out = Mask::new(self.width, self.height);
        let mut distinct = half_widths.clone();
        distinct.dedup();
        for k in distinct {
            let widened = self.widen(k);
            for (dy, _) in half_widths.iter().enumerate().filter(|&(_, &w)| w == k) {
                for y in 0..self.height {
                    for src in [y.checked_sub(dy), Some(y + dy)].into_iter().flatten() {
                        if src >= self.height {
                            continue;
                        }
                        let from = &widened.data[src * self.width..(src + 1) * self.width];
                        let to = &mut out.data[y * self.width..(y + 1) * self.width];
                        for (o, v) in to.iter_mut().zip(from) {
                            *o = (*o).max(*v);
                        }
                    }
                }
            }
        }
        out
    }

    /// Horizontal sliding maximum over `[x - k, x + k]` for every row.
    fn widen(&self, k: usize) -> Mask {
        let mut out = Mask::new(self.width, self.height);
        let mut window: VecDeque<usize> = VecDeque::new();
        for y in 0..self.height {
            let row = &self.data[y * self.width..(y + 1) * self.width];
            let dst = &mut out.data[y * self.width..(y + 1) * self.width];
            window.clear();
            let mut next = 0;
            for x in 0..self.width {
                let hi = (x + k).min(self.width - 1);
                while next <= hi {
                    while window.back().is_some_and(|&b| row[b] <= row[next]) {
                        window.pop_back();
                    }
                    window.push_back(next);
                    next += 1;
                }
                let lo = x.saturating_sub(k);
                while window.front().is_some_and(|&f| f < lo) {
                    window.pop_front();
                }
                dst[x] = window.front().map(|&i| row[i]).unwrap_or(0);
            }
        }
        out
    }

    /// Slant rows to the right in proportion to their height above the bottom.
    fn shear(&self, factor: f64) -> Mask {
        let mut out = Mask::new(self.width, self.height);
        let bottom = self.height as f64;
        for y in 0..self.height as i64 {
            let shift = ((bottom - y as f64) * -factor).round() as i64;
            for x in 0..self.width as i64 {
                let v = self.get(x, y);
                if v > 0 {
                    out.raise(x + shift, y, v);
                }
            }
        }
        out
    }
}

/// Largest `k` with `k^2 + dy^2 <= r^2`.
fn disc_half_width(r: usize, dy: usize) -> usize {
    let limit = r * r - dy * dy;
    let mut k = 0;
    while (k + 1) * (k + 1) <= limit {
        k += 1;
    }
    k
}

fn blend(canvas: &mut RgbaImage, x: i64, y: i64, color: Color, alpha: f32) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let da = f32::from(dst[3]) / 255.0;
    let out_a = a + da * (1.0 - a);
    let mix = |src: u8, dst: u8| -> u8 {
        let v = (f32::from(src) * a + f32::from(dst) * da * (1.0 - a)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    *dst = Rgba([
        mix(color.r, dst[0]),
        mix(color.g, dst[1]),
        mix(color.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

fn paint(canvas: &mut RgbaImage, mask: &Mask, x0: i64, y0: i64, color: Color, opacity: f32) {
    for y in 0..mask.height {
        for x in 0..mask.width {
            let coverage = mask.data[y * mask.width + x];
            if coverage > 0 {
                let alpha = f32::from(coverage) / 255.0 * opacity;
                blend(canvas, x0 + x as i64, y0 + y as i64, color, alpha);
            }
        }
    }
}

/// Render `text` in `style` with `font` to PNG bytes.
pub fn render_sample(font: &ResolvedFont, style: &TextStyle, text: &str) -> MediaResult<Vec<u8>> {
    let bytes = std::fs::read(&font.path)?;
    let face = fontdue::Font::from_bytes(bytes.as_slice(), fontdue::FontSettings::default())
        .map_err(|e| MediaError::Image(format!("{}: {}", font.path.display(), e)))?;
    render_with_face(&face, font, style, text)
}

/// Padding around the glyphs that strokes grow into.
fn stroke_pad(font: &ResolvedFont, style: &TextStyle) -> (u32, usize) {
    let emphasis = if font.synthetic_bold {
        bold_emphasis(style.size)
    } else {
        0
    };
    let outline = style.outline.map(|o| o.width).unwrap_or(0);
    (emphasis, (emphasis + outline) as usize)
}

fn render_with_face(
    face: &fontdue::Font,
    font: &ResolvedFont,
    style: &TextStyle,
    text: &str,
) -> MediaResult<Vec<u8>> {
    let mask = text_mask(face, font, style, text);
    let canvas = compose_sample(&mask, font, style);

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(canvas.as_raw(), SAMPLE_WIDTH, SAMPLE_HEIGHT, ColorType::Rgba8)
        .map_err(|e| MediaError::Image(e.to_string()))?;
    Ok(png)
}

/// Glyph coverage with room for strokes and slant.
///
/// Never wider than the canvas plus that room; glyphs past it would be cropped anyway.
fn text_mask(face: &fontdue::Font, font: &ResolvedFont, style: &TextStyle, text: &str) -> Mask {
    let px = style.size as f32;
    let (ascent, line_height) = face
        .horizontal_line_metrics(px)
        .map(|m| (m.ascent, m.new_line_size))
        .unwrap_or((px, px * 1.25));
    let (_, pad) = stroke_pad(font, style);

    let advance: f32 = text.chars().map(|c| face.metrics(c, px).advance_width).sum();
    let glyph_height = line_height.ceil().max(1.0) as usize;
    let slant = if font.synthetic_italic {
        (glyph_height as f64 * -ITALIC_SHEAR).ceil() as usize
    } else {
        0
    };
    let text_width = (advance.ceil().max(1.0) as usize).min(SAMPLE_WIDTH as usize);
    let mut mask = Mask::new(text_width + 2 * pad + slant, glyph_height + 2 * pad);

    let mut pen = 0.0_f32;
    for c in text.chars() {
        if pen > text_width as f32 {
            break;
        }
        let (metrics, bitmap) = face.rasterize(c, px);
        let left = pad as i64 + (pen + metrics.xmin as f32).round() as i64;
        let top =
            pad as i64 + (ascent - (metrics.height as i32 + metrics.ymin) as f32).round() as i64;
        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                mask.raise(left + gx as i64, top + gy as i64, bitmap[gy * metrics.width + gx]);
            }
        }
        pen += metrics.advance_width;
    }
    mask
}

/// Paint box, shadow, outline and fill for `mask` centered on a sample canvas.
fn compose_sample(mask: &Mask, font: &ResolvedFont, style: &TextStyle) -> RgbaImage {
    let (emphasis, _) = stroke_pad(font, style);
    let mut fill = mask.dilate(emphasis);
    if font.synthetic_italic {
        fill = fill.shear(ITALIC_SHEAR);
    }

    let width = SAMPLE_WIDTH as i64;
    let height = SAMPLE_HEIGHT as i64;
    let x = ((width - fill.width as i64) / 2).max(MIN_OFFSET);
    let y = ((height - fill.height as i64) / 2).max(MIN_OFFSET);

    let mut canvas = RgbaImage::new(SAMPLE_WIDTH, SAMPLE_HEIGHT);

    if let Some(background) = style.background {
        let p = i64::from(background.padding);
        let x0 = (x - p).max(0);
        let y0 = (y - p).max(0);
        let x1 = (x + fill.width as i64 + p).min(width);
        let y1 = (y + fill.height as i64 + p).min(height);
        for by in y0..y1 {
            for bx in x0..x1 {
                blend(&mut canvas, bx, by, background.color, background.opacity);
            }
        }
    }
    if let Some(shadow) = style.shadow {
        paint(
            &mut canvas,
            &fill,
            x + i64::from(shadow.dx),
            y + i64::from(shadow.dy),
            shadow.color,
            shadow.opacity,
        );
    }
    if let Some(o) = style.outline {
        paint(&mut canvas, &fill.dilate(o.width), x, y, o.color, 1.0);
    }
    paint(&mut canvas, &fill, x, y, style.fill, 1.0);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{Platform, StyleResolver, SystemFontDirs};
    use vtext_models::{BackgroundBox, FontFamily, FontVariant, Outline, Shadow};

    #[test]
    fn test_sample_text_defaults() {
        assert_eq!(sample_text(None), DEFAULT_SAMPLE_TEXT);
        assert_eq!(sample_text(Some("   \n ")), DEFAULT_SAMPLE_TEXT);
    }

    #[test]
    fn test_sample_text_flattens_lines() {
        assert_eq!(sample_text(Some(" Hello\nWorld ")), "Hello World");
        assert_eq!(sample_text(Some("a\r\nb")), "a b");
    }

    #[test]
    fn test_sample_text_truncates() {
        let exact = "x".repeat(60);
        assert_eq!(sample_text(Some(&exact)), exact);

        let long = "y".repeat(61);
        let sample = sample_text(Some(&long));
        assert_eq!(sample.chars().count(), 60);
        assert!(sample.ends_with("..."));
        assert!(sample.starts_with(&"y".repeat(57)));
    }

    #[test]
    fn test_mask_dilate_and_shear() {
        let mut mask = Mask::new(9, 9);
        mask.raise(4, 4, 255);
        let grown = mask.dilate(2);
        assert_eq!(grown.get(4, 2), 255);
        assert_eq!(grown.get(6, 4), 255);
        assert_eq!(grown.get(6, 6), 0);

        let sheared = mask.shear(-0.5);
        // Row 4 is 5 rows above the bottom: shifted right by 3 (2.5 rounded away from zero).
        assert_eq!(sheared.get(7, 4), 255);
        assert_eq!(sheared.get(4, 4), 0);
    }

    #[test]
    fn test_blend_over_transparent() {
        let mut canvas = RgbaImage::new(2, 2);
        blend(&mut canvas, 0, 0, Color::rgb(255, 0, 0), 0.5);
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 0, 0, 128]));
        // Out of bounds is ignored.
        blend(&mut canvas, 5, 5, Color::rgb(255, 0, 0), 1.0);
    }

    #[test]
    fn test_unreadable_font_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        let font = ResolvedFont::custom(&path, None);
        let err = render_sample(&font, &TextStyle::default(), "hi").unwrap_err();
        assert!(matches!(err, MediaError::Image(_)));
    }

    fn dilate_by_disc(mask: &Mask, radius: u32) -> Mask {
        let r = i64::from(radius);
        let mut out = Mask::new(mask.width, mask.height);
        for y in 0..mask.height as i64 {
            for x in 0..mask.width as i64 {
                let mut v = 0;
                for dy in -r..=r {
                    for dx in -r..=r {
                        if dx * dx + dy * dy <= r * r {
                            v = v.max(mask.get(x + dx, y + dy));
                        }
                    }
                }
                out.data[y as usize * mask.width + x as usize] = v;
            }
        }
        out
    }

    #[test]
    fn test_dilate_matches_disc() {
        let mut mask = Mask::new(23, 17);
        for (i, (x, y)) in [(0, 0), (11, 8), (22, 3), (5, 16), (12, 9)].iter().enumerate() {
            mask.raise(*x, *y, 60 + 40 * i as u8);
        }
        for radius in 0..=5 {
            assert_eq!(
                mask.dilate(radius).data,
                dilate_by_disc(&mask, radius).data,
                "radius {}",
                radius
            );
        }
    }

    fn block_mask() -> Mask {
        let mut mask = Mask::new(40, 20);
        for y in 5..15 {
            for x in 15..25 {
                mask.raise(x, y, 255);
            }
        }
        mask
    }

    #[test]
    fn test_compose_paints_every_layer() {
        let style = TextStyle {
            size: 48,
            fill: Color::WHITE,
            outline: Some(Outline {
                color: Color::rgb(255, 0, 0),
                width: 2,
            }),
            shadow: Some(Shadow {
                color: Color::BLACK,
                opacity: 1.0,
                dx: 6,
                dy: 6,
            }),
            background: Some(BackgroundBox {
                color: Color::rgb(0, 0, 255),
                opacity: 1.0,
                padding: 8,
            }),
            ..TextStyle::default()
        };
        let font = ResolvedFont::custom("plain.ttf", None);
        let canvas = compose_sample(&block_mask(), &font, &style);

        // Mask is centered at (430, 100); the block covers (445..455, 105..115).
        assert_eq!(canvas.get_pixel(450, 110), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(444, 110), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(459, 119), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(431, 101), &Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(421, 101)[3], 0);
        assert_eq!(canvas.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_compose_synthetic_styles() {
        let mut bar = Mask::new(20, 20);
        for y in 0..20 {
            bar.raise(2, y, 255);
        }
        let style = TextStyle {
            fill: Color::WHITE,
            outline: None,
            shadow: None,
            background: None,
            ..TextStyle::default()
        };

        let mut italic = ResolvedFont::custom("plain.ttf", None);
        italic.synthetic_italic = true;
        let canvas = compose_sample(&bar, &italic, &style);
        // Top row leans right by 4 px, bottom row stays put.
        assert_eq!(canvas.get_pixel(446, 100)[3], 255);
        assert_eq!(canvas.get_pixel(442, 100)[3], 0);
        assert_eq!(canvas.get_pixel(442, 119)[3], 255);

        let mut bold = ResolvedFont::custom("plain.ttf", None);
        bold.synthetic_bold = true;
        let canvas = compose_sample(&bar, &bold, &TextStyle { size: 48, ..style });
        // Emphasis of 2 px widens the one-pixel bar to five.
        assert_eq!(canvas.get_pixel(440, 110)[3], 255);
        assert_eq!(canvas.get_pixel(444, 110)[3], 255);
        assert_eq!(canvas.get_pixel(445, 110)[3], 0);
    }

    #[test]
    fn test_renders_installed_face() {
        let resolver = StyleResolver::new(&SystemFontDirs::new(None), Platform::current(), None);
        let Ok(font) = resolver.resolve_family(
            &FontFamily::named(FontFamily::DEJAVU_SANS),
            FontVariant::Regular,
        ) else {
            eprintln!("DejaVu Sans not installed; skipping");
            return;
        };

        let style = TextStyle {
            size: 200,
            outline: Some(Outline {
                color: Color::BLACK,
                width: 12,
            }),
            ..TextStyle::default()
        };
        let text = sample_text(Some(&"W".repeat(80)));
        let bytes = std::fs::read(&font.path).unwrap();
        let face = fontdue::Font::from_bytes(bytes.as_slice(), fontdue::FontSettings::default())
            .unwrap();
        let mask = text_mask(&face, &font, &style, &text);
        assert!(mask.width <= SAMPLE_WIDTH as usize + 2 * 12);

        let png = render_sample(&font, &style, &text).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (SAMPLE_WIDTH, SAMPLE_HEIGHT));
        assert!(image.pixels().any(|p| p[3] == 255));
    }
}
