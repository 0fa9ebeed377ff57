//! Image decoding and encoding
//!
//! Encoders sit behind a small object-safe trait so the export path can
//! pick one by MIME type or file extension:
//! - JPEG is lossy and honours the quality setting
//! - PNG and WebP are lossless and keep transparency

use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::WatermarkError;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// Resolve a MIME type such as `image/png`.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Resolve a file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.trim_start_matches('.').parse().ok()
    }

    /// Format implied by a file name's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(WatermarkError::invalid_config(format!(
                "unknown output format: {}",
                s
            ))),
        }
    }
}

/// Encoding quality
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

impl EncoderQuality {
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Map a unit-interval quality (`0.0..=1.0`) onto 1-100.
    pub fn from_unit(quality: f32) -> Self {
        let unit = if quality.is_finite() {
            quality.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self::with_quality((unit * 100.0).round() as u8)
    }
}

/// Encoded bytes with their format
#[derive(Debug)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: OutputFormat,
    pub content_type: &'static str,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: OutputFormat) -> Self {
        Self {
            data,
            format,
            content_type: format.content_type(),
        }
    }
}

/// Trait for image encoders
///
/// The trait is object-safe so [`EncoderFactory`] can hand out boxed encoders.
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode an RGBA surface
    fn encode(
        &self,
        surface: &RgbaImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, WatermarkError>;

    fn supports_transparency(&self) -> bool;
}

/// Lossy JPEG encoder; alpha is dropped
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(
        &self,
        surface: &RgbaImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, WatermarkError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        let rgb_data = rgba_to_rgb(surface.as_raw());

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, quality.quality);

        encoder
            .write_image(
                &rgb_data,
                surface.width(),
                surface.height(),
                image::ColorType::Rgb8,
            )
            .map_err(|e| WatermarkError::encode_failed("jpeg", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Jpeg))
    }

    fn supports_transparency(&self) -> bool {
        false
    }
}

/// Lossless PNG encoder
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(
        &self,
        surface: &RgbaImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, WatermarkError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new(&mut output);

        encoder
            .write_image(
                surface.as_raw(),
                surface.width(),
                surface.height(),
                image::ColorType::Rgba8,
            )
            .map_err(|e| WatermarkError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Png))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// WebP encoder
///
/// The `image` crate only writes lossless WebP, so quality is ignored.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(
        &self,
        surface: &RgbaImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, WatermarkError> {
        use image::codecs::webp::WebPEncoder as ImageWebPEncoder;
        use image::ImageEncoder as _;
        use std::io::Cursor;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageWebPEncoder::new_lossless(&mut output);

        encoder
            .write_image(
                surface.as_raw(),
                surface.width(),
                surface.height(),
                image::ColorType::Rgba8,
            )
            .map_err(|e| WatermarkError::encode_failed("webp", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::WebP))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: OutputFormat) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Jpeg => Box::new(JpegEncoder),
            OutputFormat::Png => Box::new(PngEncoder),
            OutputFormat::WebP => Box::new(WebPEncoder),
        }
    }
}

/// Encode `surface` as `mime_type` with a unit-interval `quality`.
///
/// Unknown MIME types fail with [`WatermarkError::EncodeError`].
pub fn encode(surface: &RgbaImage, mime_type: &str, quality: f32) -> Result<Vec<u8>, WatermarkError> {
    let format = OutputFormat::from_mime_type(mime_type)
        .ok_or_else(|| WatermarkError::encode_failed(mime_type, "unsupported MIME type"))?;

    encode_as(surface, format, EncoderQuality::from_unit(quality)).map(|encoded| encoded.data)
}

/// Encode `surface` with the encoder for `format`.
pub fn encode_as(
    surface: &RgbaImage,
    format: OutputFormat,
    quality: EncoderQuality,
) -> Result<EncodedImage, WatermarkError> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(WatermarkError::encode_failed(
            format.as_str(),
            "surface has zero area",
        ));
    }
    EncoderFactory::create(format).encode(surface, quality)
}

/// Sniff the container format from magic bytes.
pub fn detect_format(data: &[u8]) -> Option<OutputFormat> {
    if data.len() >= 3 && data[0..3] == [0xFF, 0xD8, 0xFF] {
        return Some(OutputFormat::Jpeg);
    }
    if data.len() >= 8 && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Some(OutputFormat::Png);
    }
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some(OutputFormat::WebP);
    }
    None
}

/// Decode an encoded image from memory.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, WatermarkError> {
    if data.is_empty() {
        return Err(WatermarkError::DecodeError("empty input".to_string()));
    }
    image::load_from_memory(data).map_err(|e| WatermarkError::DecodeError(e.to_string()))
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> Result<DynamicImage, WatermarkError> {
    let bytes = std::fs::read(path)
        .map_err(|e| WatermarkError::DecodeError(format!("{}: {}", path.display(), e)))?;

    // Content wins over a misleading extension
    let decoded = match ImageFormat::from_path(path) {
        Ok(format) if detect_format(&bytes).is_none() => {
            image::load_from_memory_with_format(&bytes, format)
        }
        _ => image::load_from_memory(&bytes),
    };

    decoded.map_err(|e| WatermarkError::DecodeError(format!("{}: {}", path.display(), e)))
}

fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for chunk in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[0..3]);
    }
    rgb
}
