//! RGBA resizing backed by fast-image-resize.
//!
//! Used to scale logos to their output size and to build thumbnails.

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::{DynamicImage, RgbaImage};
use std::num::NonZeroU32;

use super::WatermarkError;

/// Resize an image to exactly `target_w` x `target_h` with a Lanczos3 filter.
pub fn resize_rgba(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<RgbaImage, WatermarkError> {
    let src_w = img.width();
    let src_h = img.height();

    if src_w == target_w && src_h == target_h {
        return Ok(img.to_rgba8());
    }

    let src_width = NonZeroU32::new(src_w)
        .ok_or_else(|| WatermarkError::RenderError("Source width is 0".to_string()))?;
    let src_height = NonZeroU32::new(src_h)
        .ok_or_else(|| WatermarkError::RenderError("Source height is 0".to_string()))?;
    let dst_width = NonZeroU32::new(target_w)
        .ok_or_else(|| WatermarkError::RenderError("Target width is 0".to_string()))?;
    let dst_height = NonZeroU32::new(target_h)
        .ok_or_else(|| WatermarkError::RenderError("Target height is 0".to_string()))?;

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        img.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| {
        WatermarkError::RenderError(format!("Failed to create source image: {:?}", e))
    })?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| WatermarkError::RenderError(format!("Resize operation failed: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| WatermarkError::RenderError("Failed to create output image buffer".to_string()))
}

/// Dimensions that fit `width` x `height` inside a `max_dim` square,
/// keeping the aspect ratio. Images already inside the box keep their size.
pub fn fit_within(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    if width <= max_dim && height <= max_dim {
        return (width, height);
    }

    let (w, h) = (width as f64, height as f64);
    if width > height {
        let scaled = (h * max_dim as f64 / w).round() as u32;
        (max_dim, scaled.max(1))
    } else {
        let scaled = (w * max_dim as f64 / h).round() as u32;
        (scaled.max(1), max_dim)
    }
}
