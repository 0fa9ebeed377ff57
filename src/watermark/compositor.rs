//! Watermark compositor for blending stamp layers onto the output surface.
//!
//! Each draw places one layer (stroke, fill or logo) with its anchor on an
//! instance position of the rotated frame. Destination pixels inside the
//! rotated footprint are mapped back into the layer and sampled
//! bilinearly, then blended with the Porter-Duff "over" operator under a
//! uniform opacity.
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use sukashi::watermark::compositor::Compositor;
//! use sukashi::watermark::layout::{Point, TileGeometry};
//!
//! let geometry = TileGeometry::new(100, 100, 200, 0.0).unwrap();
//! let mut target = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
//! let stamp = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
//!
//! let compositor = Compositor::new(&geometry, 1.0);
//! compositor.draw(&mut target, &stamp, (5.0, 5.0), Point::new(0.0, 0.0));
//! assert_eq!(target.get_pixel(50, 50), &Rgba([255, 255, 255, 255]));
//! ```

use super::layout::{Point, TileGeometry};
use image::{Rgba, RgbaImage};

/// Draws layers through a shared frame with a uniform opacity.
#[derive(Debug, Clone, Copy)]
pub struct Compositor<'a> {
    geometry: &'a TileGeometry,
    opacity: f32,
}

impl<'a> Compositor<'a> {
    /// Create a compositor; `opacity` is clamped into [0, 1].
    pub fn new(geometry: &'a TileGeometry, opacity: f32) -> Self {
        Self {
            geometry,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Draw `layer` so that its `anchor` lands on frame point `position`.
    ///
    /// Returns the number of destination pixels touched. Footprints fully
    /// outside the target cost nothing beyond the bounds check.
    pub fn draw(
        &self,
        target: &mut RgbaImage,
        layer: &RgbaImage,
        anchor: (f32, f32),
        position: Point,
    ) -> usize {
        if self.opacity <= 0.0 || layer.width() == 0 || layer.height() == 0 {
            return 0;
        }

        let center = self.geometry.to_canvas(position);
        let (ax, ay) = anchor;
        let (lw, lh) = (layer.width() as f32, layer.height() as f32);

        // Rotated footprint of the layer on the canvas
        let corners = [(-ax, -ay), (lw - ax, -ay), (-ax, lh - ay), (lw - ax, lh - ay)];
        let (cos, sin) = (self.geometry.angle.cos(), self.geometry.angle.sin());
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for (x, y) in corners {
            let cx = center.x + x * cos - y * sin;
            let cy = center.y + x * sin + y * cos;
            min_x = min_x.min(cx);
            max_x = max_x.max(cx);
            min_y = min_y.min(cy);
            max_y = max_y.max(cy);
        }

        let x_start = min_x.floor().max(0.0) as i64;
        let y_start = min_y.floor().max(0.0) as i64;
        let x_end = (max_x.ceil() as i64).min(target.width() as i64);
        let y_end = (max_y.ceil() as i64).min(target.height() as i64);

        let mut touched = 0;
        for ty in y_start..y_end {
            for tx in x_start..x_end {
                // Pixel center back into layer space
                let dx = tx as f32 + 0.5 - center.x;
                let dy = ty as f32 + 0.5 - center.y;
                let lx = dx * cos + dy * sin + ax;
                let ly = -dx * sin + dy * cos + ay;

                let source = sample_bilinear(layer, lx - 0.5, ly - 0.5);
                if source[3] <= 0.0 {
                    continue;
                }

                let pixel = target.get_pixel_mut(tx as u32, ty as u32);
                *pixel = blend_pixels(*pixel, source, self.opacity);
                touched += 1;
            }
        }

        touched
    }
}

/// Premultiplied RGBA in [0, 1] at a fractional layer coordinate.
///
/// Texels outside the layer are transparent, which keeps edges anti-aliased.
fn sample_bilinear(layer: &RgbaImage, x: f32, y: f32) -> [f32; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let texel = |px: i64, py: i64| -> [f32; 4] {
        if px < 0 || py < 0 || px >= layer.width() as i64 || py >= layer.height() as i64 {
            return [0.0; 4];
        }
        let p = layer.get_pixel(px as u32, py as u32);
        let a = p[3] as f32 / 255.0;
        [
            p[0] as f32 / 255.0 * a,
            p[1] as f32 / 255.0 * a,
            p[2] as f32 / 255.0 * a,
            a,
        ]
    };

    let weights = [
        ((1.0 - fx) * (1.0 - fy), texel(x0, y0)),
        (fx * (1.0 - fy), texel(x0 + 1, y0)),
        ((1.0 - fx) * fy, texel(x0, y0 + 1)),
        (fx * fy, texel(x0 + 1, y0 + 1)),
    ];

    let mut out = [0.0f32; 4];
    for (weight, value) in weights {
        if weight <= 0.0 {
            continue;
        }
        for c in 0..4 {
            out[c] += value[c] * weight;
        }
    }
    out
}

/// Blend a premultiplied source over a straight-alpha background pixel.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: [f32; 4], opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] * opacity).clamp(0.0, 1.0);
    if fg_alpha <= 0.0 {
        return background;
    }

    let bg_alpha = background[3] as f32 / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: f32, bg: u8| -> u8 {
        let bg_f = bg as f32 / 255.0;
        let result = (fg * opacity + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
