//! Preview thumbnails for the image list.

use image::DynamicImage;

use crate::watermark::encoder::{encode_as, EncoderQuality, OutputFormat};
use crate::watermark::resize::{fit_within, resize_rgba};
use crate::watermark::WatermarkError;

/// Longest thumbnail edge in pixels
pub const THUMBNAIL_MAX_DIM: u32 = 200;

/// JPEG quality used for thumbnails
pub const THUMBNAIL_QUALITY: f32 = 0.7;

/// Encoded thumbnail with its pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    /// JPEG bytes
    pub data: Vec<u8>,
}

/// Scale `image` to fit a 200px box (never upscaling) and encode it as JPEG.
pub fn generate_thumbnail(image: &DynamicImage) -> Result<Thumbnail, WatermarkError> {
    let (width, height) = fit_within(image.width(), image.height(), THUMBNAIL_MAX_DIM);
    let scaled = resize_rgba(image, width, height)?;
    let encoded = encode_as(
        &scaled,
        OutputFormat::Jpeg,
        EncoderQuality::from_unit(THUMBNAIL_QUALITY),
    )?;

    Ok(Thumbnail {
        width,
        height,
        data: encoded.data,
    })
}
