//! Watermark configuration types.
//!
//! This module defines the immutable value object handed to the renderer on
//! every call:
//! - Text or image (logo) content
//! - Tiled or single placement
//! - Opacity, rotation, density, color and base size
//! - Crop ratio for the output surface
//!
//! Defaults mirror the values a fresh session starts with.

use super::crop::CropRatio;
use super::text_renderer::{parse_hex_color, CustomFont};
use super::WatermarkError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// Default values
fn default_text() -> String {
    "For internal use only".to_string()
}

fn default_color() -> String {
    "#FFFFFF".to_string()
}

fn default_opacity() -> f32 {
    0.3
}

fn default_rotation() -> f32 {
    -45.0
}

fn default_density() -> i32 {
    200
}

fn default_font_size() -> i32 {
    24
}

/// Which watermark content is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkKind {
    #[default]
    Text,
    Image,
}

/// How instances are laid out on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Repeating grid over the whole (rotated) canvas
    #[default]
    Tiled,
    /// One instance at the canvas center
    Single,
}

impl FromStr for Placement {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiled" | "tile" => Ok(Self::Tiled),
            "single" => Ok(Self::Single),
            other => Err(WatermarkError::invalid_config(format!(
                "unknown placement '{}', expected 'tiled' or 'single'",
                other
            ))),
        }
    }
}

/// Glyph style family. Each family ships a regular and a bold face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
}

impl FontFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sans => "sans-serif",
            Self::Serif => "serif",
            Self::Mono => "monospace",
        }
    }
}

impl FromStr for FontFamily {
    type Err = WatermarkError;

    /// Accepts CSS-like family lists such as `"'Inter', sans-serif"`.
    /// The generic family decides the face; named families are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        if lowered.trim().is_empty() {
            return Err(WatermarkError::invalid_config("font family cannot be empty"));
        }

        if lowered.contains("mono") {
            Ok(Self::Mono)
        } else if lowered.contains("sans") {
            Ok(Self::Sans)
        } else if lowered.contains("serif") {
            Ok(Self::Serif)
        } else {
            Ok(Self::Sans)
        }
    }
}

impl TryFrom<String> for FontFamily {
    type Error = WatermarkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FontFamily> for String {
    fn from(family: FontFamily) -> Self {
        family.as_str().to_string()
    }
}

/// A decoded logo image, shared between config snapshots.
#[derive(Clone)]
pub struct Logo(Arc<DynamicImage>);

impl Logo {
    pub fn new(image: DynamicImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.0
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }
}

impl fmt::Debug for Logo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logo")
            .field("dimensions", &(self.width(), self.height()))
            .finish()
    }
}

impl PartialEq for Logo {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Watermark configuration passed by value into every render call.
///
/// ```yaml
/// kind: text
/// placement: tiled
/// text: "CONFIDENTIAL"
/// font_family: serif
/// bold: true
/// stroke: false
/// opacity: 0.3
/// rotation: -45
/// density: 200
/// color: "#FFFFFF"
/// font_size: 24
/// crop_ratio: "16:9"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkConfig {
    #[serde(default)]
    pub kind: WatermarkKind,

    #[serde(default)]
    pub placement: Placement,

    /// Text content (used when `kind` is text)
    #[serde(default = "default_text")]
    pub text: String,

    /// Decoded logo (used when `kind` is image). Loaded by the caller.
    #[serde(skip)]
    pub logo: Option<Logo>,

    #[serde(default)]
    pub font_family: FontFamily,

    /// Font loaded from a file by the caller. Replaces the embedded face
    /// chosen by `font_family` and `bold`, e.g. for CJK text.
    #[serde(skip)]
    pub font: Option<CustomFont>,

    /// Use the heavier face of the family
    #[serde(default)]
    pub bold: bool,

    /// Draw an outline behind the text fill
    #[serde(default)]
    pub stroke: bool,

    /// Global alpha for every watermark draw; clamped into [0, 1] before use
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Rotation about the canvas center in degrees (clockwise on screen)
    #[serde(default = "default_rotation")]
    pub rotation: f32,

    /// Tile spacing per 1000px of output width; smaller is denser
    #[serde(default = "default_density")]
    pub density: i32,

    /// Fill/stroke color as `#RGB` or `#RRGGBB`
    #[serde(default = "default_color")]
    pub color: String,

    /// Base font size per 1000px of output width
    #[serde(default = "default_font_size")]
    pub font_size: i32,

    #[serde(default)]
    pub crop_ratio: CropRatio,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            kind: WatermarkKind::default(),
            placement: Placement::default(),
            text: default_text(),
            logo: None,
            font_family: FontFamily::default(),
            font: None,
            bold: false,
            stroke: false,
            opacity: default_opacity(),
            rotation: default_rotation(),
            density: default_density(),
            color: default_color(),
            font_size: default_font_size(),
            crop_ratio: CropRatio::default(),
        }
    }
}

impl WatermarkConfig {
    /// Validate the configuration.
    ///
    /// Opacity is not range-checked here; it is clamped by
    /// [`normalized_opacity`](Self::normalized_opacity). Non-finite opacity
    /// is still an error.
    pub fn validate(&self) -> Result<(), WatermarkError> {
        if self.density <= 0 {
            return Err(WatermarkError::invalid_config(format!(
                "density must be positive, got {}",
                self.density
            )));
        }

        if self.font_size <= 0 {
            return Err(WatermarkError::invalid_config(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }

        if !self.opacity.is_finite() {
            return Err(WatermarkError::invalid_config(format!(
                "opacity must be a finite value, got {}",
                self.opacity
            )));
        }

        if !self.rotation.is_finite() {
            return Err(WatermarkError::invalid_config(format!(
                "rotation must be a finite value, got {}",
                self.rotation
            )));
        }

        parse_hex_color(&self.color)?;

        Ok(())
    }

    /// Opacity clamped into [0, 1].
    pub fn normalized_opacity(&self) -> f32 {
        if self.opacity.is_nan() {
            return 0.0;
        }
        self.opacity.clamp(0.0, 1.0)
    }

    /// Whether the watermark pass can draw anything at all.
    pub fn has_content(&self) -> bool {
        match self.kind {
            WatermarkKind::Text => !self.text.is_empty(),
            WatermarkKind::Image => self.logo.is_some(),
        }
    }

    /// Fails with `MissingAsset` when an image watermark has no logo.
    ///
    /// The renderer treats a missing logo as "draw nothing"; batch callers
    /// use this to refuse exporting unwatermarked output.
    pub fn require_assets(&self) -> Result<(), WatermarkError> {
        if self.kind == WatermarkKind::Image && self.logo.is_none() {
            return Err(WatermarkError::MissingAsset(
                "image watermark selected but no logo loaded".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_logo(mut self, logo: Option<Logo>) -> Self {
        self.logo = logo;
        self
    }

    pub fn with_font(mut self, font: Option<CustomFont>) -> Self {
        self.font = font;
        self
    }
}

/// Translate the inverted density slider (0..=600) into a density value.
///
/// The slider reads "more is denser" while the renderer reads density as a
/// spacing, so a slider value of 400 becomes a density of 200.
pub fn density_from_slider(level: i32) -> i32 {
    600 - level.clamp(0, 600)
}
