//! Text watermark rasterization.
//!
//! This module turns a line of text into RGBA layers (an optional outline
//! and the fill) that the compositor stamps onto the output surface.
//!
//! # Features
//!
//! - Hex color parsing (#RGB and #RRGGBB formats)
//! - Embedded DejaVu faces: sans, serif and mono, each regular and bold
//! - User-supplied TrueType/OpenType faces for scripts DejaVu lacks (CJK)
//! - Outline (stroke) layer centered on the glyph contours
//! - Visual-center anchor so instances can be placed by their midpoint
//!
//! Layers carry coverage in their alpha channel only. Global opacity is
//! applied at composite time so stroke and fill blend as separate draws.
//!
//! # Example
//!
//! ```
//! use sukashi::watermark::text_renderer::{render_text, parse_hex_color, TextRenderOptions};
//!
//! let options = TextRenderOptions {
//!     text: "Copyright 2025".to_string(),
//!     font_size: 24.0,
//!     color: parse_hex_color("#FFFFFF").unwrap(),
//!     ..Default::default()
//! };
//!
//! let rendered = render_text(&options).unwrap();
//! assert!(rendered.stroke.is_none());
//! ```

use super::config::FontFamily;
use super::renderer::checked_stamp_size;
use super::WatermarkError;
use ab_glyph::{Font, FontRef, FontVec, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

const SANS_REGULAR: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");
const SANS_BOLD: &[u8] = include_bytes!("fonts/DejaVuSans-Bold.ttf");
const SERIF_REGULAR: &[u8] = include_bytes!("fonts/DejaVuSerif.ttf");
const SERIF_BOLD: &[u8] = include_bytes!("fonts/DejaVuSerif-Bold.ttf");
const MONO_REGULAR: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");
const MONO_BOLD: &[u8] = include_bytes!("fonts/DejaVuSansMono-Bold.ttf");

/// Parsed faces, indexed by [`face_index`].
static FACES: [OnceLock<Option<FontRef<'static>>>; 6] = [
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
];

fn face_index(family: FontFamily, bold: bool) -> usize {
    let base = match family {
        FontFamily::Sans => 0,
        FontFamily::Serif => 2,
        FontFamily::Mono => 4,
    };
    base + usize::from(bold)
}

fn face_data(index: usize) -> &'static [u8] {
    match index {
        0 => SANS_REGULAR,
        1 => SANS_BOLD,
        2 => SERIF_REGULAR,
        3 => SERIF_BOLD,
        4 => MONO_REGULAR,
        _ => MONO_BOLD,
    }
}

/// Get the embedded face for a family and weight, parsing it lazily.
fn get_font(family: FontFamily, bold: bool) -> Result<&'static FontRef<'static>, WatermarkError> {
    let index = face_index(family, bold);
    FACES[index]
        .get_or_init(|| FontRef::try_from_slice(face_data(index)).ok())
        .as_ref()
        .ok_or_else(|| {
            WatermarkError::RenderError(format!(
                "failed to load embedded {} font (bold: {})",
                family.as_str(),
                bold
            ))
        })
}

/// A font loaded at runtime, replacing the embedded faces.
///
/// Family and weight settings are ignored while a custom font is set.
#[derive(Clone)]
pub struct CustomFont(Arc<FontVec>);

impl CustomFont {
    /// Parse TrueType/OpenType bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, WatermarkError> {
        FontVec::try_from_vec(data)
            .map(|font| Self(Arc::new(font)))
            .map_err(|e| WatermarkError::DecodeError(format!("invalid font data: {}", e)))
    }

    /// Read and parse a font file.
    pub fn load(path: &Path) -> Result<Self, WatermarkError> {
        let data = std::fs::read(path).map_err(|e| {
            WatermarkError::DecodeError(format!("failed to read font {}: {}", path.display(), e))
        })?;
        Self::from_bytes(data)
    }

    pub fn font(&self) -> &FontVec {
        &self.0
    }
}

impl fmt::Debug for CustomFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFont")
            .field("glyphs", &self.0.glyph_count())
            .finish()
    }
}

impl PartialEq for CustomFont {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Parsed RGB color from hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    fn with_alpha(self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }
}

/// Options for text rendering.
#[derive(Debug, Clone)]
pub struct TextRenderOptions {
    /// The text to render.
    pub text: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Fill and stroke color.
    pub color: Color,
    /// Glyph style family.
    pub family: FontFamily,
    /// Use the bold face.
    pub bold: bool,
    /// Outline width in pixels. None means no outline.
    pub stroke_width: Option<f32>,
    /// Overrides `family` and `bold` when set.
    pub font: Option<CustomFont>,
}

impl Default for TextRenderOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 24.0,
            color: Color::white(),
            family: FontFamily::Sans,
            bold: false,
            stroke_width: None,
            font: None,
        }
    }
}

/// Rasterized text ready for compositing.
#[derive(Debug, Clone)]
pub struct RenderedText {
    /// Glyph fill layer.
    pub fill: RgbaImage,
    /// Outline layer, same size as `fill`, drawn before it.
    pub stroke: Option<RgbaImage>,
    /// Visual center of the text inside the layers, in pixels.
    pub anchor: (f32, f32),
}

/// Outline width for a given font size: `max(2, size / 12)`.
pub fn stroke_width_for(font_size: f32) -> f32 {
    (font_size / 12.0).max(2.0)
}

/// Parse a hex color string into RGB components.
///
/// Supports both #RGB and #RRGGBB formats.
///
/// # Examples
///
/// ```
/// use sukashi::watermark::text_renderer::{parse_hex_color, Color};
///
/// assert_eq!(parse_hex_color("#FFF").unwrap(), Color::new(255, 255, 255));
/// assert_eq!(parse_hex_color("#FF0000").unwrap(), Color::new(255, 0, 0));
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let digits = hex.strip_prefix('#').ok_or_else(|| {
        WatermarkError::invalid_config(format!("color must start with '#', got '{}'", hex))
    })?;

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WatermarkError::invalid_config(format!(
            "color contains invalid hex digits: '{}'",
            hex
        )));
    }

    let component = |range: std::ops::Range<usize>| -> Result<u8, WatermarkError> {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| WatermarkError::invalid_config(format!("invalid hex digit in '{}'", hex)))
    };

    match digits.len() {
        // #RGB: each digit doubled, 0xF -> 0xFF
        3 => Ok(Color::new(
            component(0..1)? * 17,
            component(1..2)? * 17,
            component(2..3)? * 17,
        )),
        6 => Ok(Color::new(
            component(0..2)?,
            component(2..4)?,
            component(4..6)?,
        )),
        len => Err(WatermarkError::invalid_config(format!(
            "color must be #RGB or #RRGGBB format, got {} characters",
            len
        ))),
    }
}

/// Horizontal advance of a line of text including kerning.
fn line_advance<F: Font>(font: &F, scale: PxScale, text: &str) -> f32 {
    let scaled_font = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }
        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width
}

/// Calculate the dimensions of a line of text set in the given face.
///
/// Returns (width, height) in pixels.
pub fn measure_text(
    text: &str,
    font_size: f32,
    family: FontFamily,
    bold: bool,
) -> Result<(u32, u32), WatermarkError> {
    let font = get_font(family, bold)?;
    let scale = PxScale::from(font_size);
    let width = line_advance(font, scale, text);
    let height = font.as_scaled(scale).height();

    Ok((width.ceil() as u32, height.ceil() as u32))
}

/// Distinct characters of `text` the font has no glyph for.
fn missing_glyphs<F: Font>(font: &F, text: &str) -> Vec<char> {
    let mut missing = Vec::new();
    for c in text.chars() {
        if !c.is_control() && font.glyph_id(c).0 == 0 && !missing.contains(&c) {
            missing.push(c);
        }
    }
    missing
}

/// Characters of `text` that would render as the font's missing-glyph box.
pub fn unsupported_chars(
    text: &str,
    family: FontFamily,
    bold: bool,
    font: Option<&CustomFont>,
) -> Result<Vec<char>, WatermarkError> {
    match font {
        Some(custom) => Ok(missing_glyphs(custom.font(), text)),
        None => Ok(missing_glyphs(get_font(family, bold)?, text)),
    }
}

/// Coverage mask in [0, 1], row-major.
struct Coverage {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl Coverage {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width as usize * height as usize],
        }
    }

    fn get(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        self.values[self.index(x as u32, y as u32)]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn accumulate(&mut self, x: i32, y: i32, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let index = self.index(x as u32, y as u32);
        let slot = &mut self.values[index];
        *slot = (*slot + coverage).min(1.0);
    }

    /// Band of width `2 * radius` centered on the mask's contours.
    fn outline(&self, radius: f32) -> Coverage {
        let reach = radius.ceil() as i64;
        let offsets: Vec<(i64, i64)> = (-reach..=reach)
            .flat_map(|dy| (-reach..=reach).map(move |dx| (dx, dy)))
            .filter(|(dx, dy)| ((dx * dx + dy * dy) as f32) <= radius * radius)
            .collect();

        let mut band = Coverage::new(self.width, self.height);
        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                let mut grown = 0.0f32;
                let mut shrunk = 1.0f32;
                for (dx, dy) in &offsets {
                    let v = self.get(x + dx, y + dy);
                    grown = grown.max(v);
                    shrunk = shrunk.min(v);
                }
                let index = band.index(x as u32, y as u32);
                band.values[index] = (grown - shrunk).clamp(0.0, 1.0);
            }
        }
        band
    }

    fn to_layer(&self, color: Color) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let coverage = self.values[self.index(x, y)];
            color.with_alpha((coverage * 255.0).round() as u8)
        })
    }
}

/// Render text to RGBA layers.
///
/// The layers are padded so the outline never clips, and the anchor points
/// at the visual center of the line (horizontal middle of the advance box,
/// vertical middle of the em box). Layers larger than
/// [`MAX_STAMP_PIXELS`](super::renderer::MAX_STAMP_PIXELS) are rejected
/// with `InvalidConfiguration` before anything is allocated.
pub fn render_text(options: &TextRenderOptions) -> Result<RenderedText, WatermarkError> {
    if options.text.is_empty() {
        return Err(WatermarkError::RenderError(
            "Cannot render empty text".to_string(),
        ));
    }

    if !options.font_size.is_finite() || options.font_size <= 0.0 {
        return Err(WatermarkError::RenderError(format!(
            "font size must be positive, got {}",
            options.font_size
        )));
    }

    match &options.font {
        Some(custom) => rasterize(custom.font(), options),
        None => rasterize(get_font(options.family, options.bold)?, options),
    }
}

fn rasterize<F: Font>(font: &F, options: &TextRenderOptions) -> Result<RenderedText, WatermarkError> {
    let missing = missing_glyphs(font, &options.text);
    if !missing.is_empty() {
        tracing::warn!(
            missing = %missing.iter().collect::<String>(),
            text = %options.text,
            "font has no glyphs for some characters; set font_path to a font that covers them"
        );
    }

    let scale = PxScale::from(options.font_size);
    let scaled_font = font.as_scaled(scale);

    let ascent = scaled_font.ascent();
    let descent = scaled_font.descent();
    let advance = line_advance(font, scale, &options.text);

    let stroke_radius = options.stroke_width.map(|w| w / 2.0).unwrap_or(0.0);
    let pad = stroke_radius.ceil() + 2.0;

    let (width, height) = checked_stamp_size(
        f64::from(advance.ceil() + 2.0 * pad),
        f64::from((ascent - descent).ceil() + 2.0 * pad),
    )?;

    let mut coverage = Coverage::new(width, height);

    // Baseline position
    let baseline_y = pad + ascent;

    let mut cursor_x = pad;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in options.text.chars() {
        let glyph_id = scaled_font.glyph_id(c);

        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, value| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                coverage.accumulate(x, y, value);
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    let stroke = if stroke_radius > 0.0 {
        Some(coverage.outline(stroke_radius).to_layer(options.color))
    } else {
        None
    };

    Ok(RenderedText {
        fill: coverage.to_layer(options.color),
        stroke,
        anchor: (pad + advance / 2.0, pad + (ascent - descent) / 2.0),
    })
}
