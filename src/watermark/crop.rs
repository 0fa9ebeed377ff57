//! Crop box computation.
//!
//! Selects the centered sub-rectangle of a source image that matches a
//! target aspect ratio. The box always spans the full source along the
//! unconstrained axis and is centered along the constrained one.
//!
//! # Example
//!
//! ```
//! use sukashi::watermark::crop::compute_crop;
//!
//! let crop = compute_crop(1000, 500, "1:1").unwrap();
//! assert_eq!((crop.origin_x, crop.origin_y), (250.0, 0.0));
//! assert_eq!((crop.width, crop.height), (500.0, 500.0));
//! ```

use super::WatermarkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel ratio that keeps the full image.
pub const ORIGINAL_RATIO: &str = "original";

/// A rectangle in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Integer pixel window used when sampling the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// The whole image.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }

    /// Whether the rectangle lies inside a `width` x `height` image.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        const EPS: f64 = 1e-6;
        self.origin_x >= -EPS
            && self.origin_y >= -EPS
            && self.width > 0.0
            && self.height > 0.0
            && self.origin_x + self.width <= width as f64 + EPS
            && self.origin_y + self.height <= height as f64 + EPS
    }

    /// Snap to whole pixels inside a `width` x `height` image.
    ///
    /// Size is rounded first and origin second, then both are clamped so the
    /// window never leaves the image and is at least 1x1.
    pub fn pixel_bounds(&self, width: u32, height: u32) -> PixelBounds {
        let w = (self.width.round() as u32).clamp(1, width.max(1));
        let h = (self.height.round() as u32).clamp(1, height.max(1));
        let x = (self.origin_x.round().max(0.0) as u32).min(width.saturating_sub(w));
        let y = (self.origin_y.round().max(0.0) as u32).min(height.saturating_sub(h));

        PixelBounds {
            x,
            y,
            width: w,
            height: h,
        }
    }
}

/// Aspect-ratio policy for the crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CropRatio {
    /// Keep the native image bounds
    #[default]
    Original,
    /// Crop to `width:height`
    Aspect { width: u32, height: u32 },
}

impl CropRatio {
    /// Compute the crop box for an image of the given native size.
    pub fn crop(&self, image_width: u32, image_height: u32) -> Result<CropRect, WatermarkError> {
        if image_width == 0 || image_height == 0 {
            return Err(WatermarkError::invalid_config(format!(
                "image dimensions must be positive, got {}x{}",
                image_width, image_height
            )));
        }

        let (ratio_w, ratio_h) = match *self {
            Self::Original => return Ok(CropRect::full(image_width, image_height)),
            Self::Aspect { width, height } => (width, height),
        };

        if ratio_w == 0 || ratio_h == 0 {
            return Err(WatermarkError::invalid_config(format!(
                "crop ratio parts must be positive, got {}:{}",
                ratio_w, ratio_h
            )));
        }

        let img_w = image_width as f64;
        let img_h = image_height as f64;
        let target_ratio = ratio_w as f64 / ratio_h as f64;
        let image_ratio = img_w / img_h;

        let rect = if image_ratio > target_ratio {
            // Wider than the target: keep full height, center horizontally
            let width = img_h * target_ratio;
            CropRect {
                origin_x: (img_w - width) / 2.0,
                origin_y: 0.0,
                width,
                height: img_h,
            }
        } else {
            let height = img_w / target_ratio;
            CropRect {
                origin_x: 0.0,
                origin_y: (img_h - height) / 2.0,
                width: img_w,
                height,
            }
        };

        Ok(rect)
    }

    pub fn is_original(&self) -> bool {
        matches!(self, Self::Original)
    }
}

impl FromStr for CropRatio {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ORIGINAL_RATIO) {
            return Ok(Self::Original);
        }

        let (w, h) = s.split_once(':').ok_or_else(|| {
            WatermarkError::invalid_config(format!(
                "crop ratio must be 'original' or 'W:H', got '{}'",
                s
            ))
        })?;

        let parse_part = |part: &str| -> Result<u32, WatermarkError> {
            match part.trim().parse::<i64>() {
                Ok(v) if v > 0 && v <= u32::MAX as i64 => Ok(v as u32),
                Ok(v) => Err(WatermarkError::invalid_config(format!(
                    "crop ratio parts must be positive, got {} in '{}'",
                    v, s
                ))),
                Err(_) => Err(WatermarkError::invalid_config(format!(
                    "crop ratio part '{}' is not an integer in '{}'",
                    part, s
                ))),
            }
        };

        Ok(Self::Aspect {
            width: parse_part(w)?,
            height: parse_part(h)?,
        })
    }
}

impl fmt::Display for CropRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => f.write_str(ORIGINAL_RATIO),
            Self::Aspect { width, height } => write!(f, "{}:{}", width, height),
        }
    }
}

impl TryFrom<String> for CropRatio {
    type Error = WatermarkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CropRatio> for String {
    fn from(ratio: CropRatio) -> Self {
        ratio.to_string()
    }
}

/// Compute the crop box for `ratio_spec` ("original" or "W:H").
pub fn compute_crop(
    image_width: u32,
    image_height: u32,
    ratio_spec: &str,
) -> Result<CropRect, WatermarkError> {
    ratio_spec.parse::<CropRatio>()?.crop(image_width, image_height)
}
