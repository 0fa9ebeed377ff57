//! Tile geometry for watermark placement.
//!
//! All instance positions live in a frame whose origin is the canvas center
//! and whose axes are rotated by the configured angle. A tiled grid sweeps
//! `[-diagonal, diagonal]` on both axes so that, whatever the angle, every
//! canvas corner stays covered.
//!
//! # Example
//!
//! ```
//! use sukashi::watermark::layout::TileGeometry;
//! use sukashi::watermark::Placement;
//!
//! let geometry = TileGeometry::new(1000, 1000, 200, -45.0).unwrap();
//! assert_eq!(geometry.step, 200.0);
//! assert_eq!(geometry.instance_positions(Placement::Tiled).count(), 16 * 16);
//! ```

use super::{Placement, WatermarkError};

/// A point in either canvas or frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Shared geometry of one render: canvas size, sweep radius, grid step and
/// the rotated, center-origin frame.
#[derive(Debug, Clone, Copy)]
pub struct TileGeometry {
    pub width: u32,
    pub height: u32,
    /// `sqrt(width² + height²)`
    pub diagonal: f32,
    /// `density * width / 1000`
    pub step: f32,
    /// Rotation of the frame in radians
    pub angle: f32,
    cos: f32,
    sin: f32,
}

impl TileGeometry {
    /// Build the geometry for a `width` x `height` canvas.
    pub fn new(
        width: u32,
        height: u32,
        density: i32,
        rotation_degrees: f32,
    ) -> Result<Self, WatermarkError> {
        if width == 0 || height == 0 {
            return Err(WatermarkError::invalid_config(format!(
                "canvas dimensions must be positive, got {}x{}",
                width, height
            )));
        }

        if density <= 0 {
            return Err(WatermarkError::invalid_config(format!(
                "density must be positive, got {}",
                density
            )));
        }

        let w = width as f32;
        let h = height as f32;
        let angle = rotation_degrees.to_radians();

        Ok(Self {
            width,
            height,
            diagonal: (w * w + h * h).sqrt(),
            step: density as f32 * (w / 1000.0),
            angle,
            cos: angle.cos(),
            sin: angle.sin(),
        })
    }

    /// Canvas midpoint, the frame origin.
    pub fn center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Grid coordinates along one axis: `-diagonal + k * step` while below
    /// `diagonal + step`.
    pub fn grid_axis(&self) -> GridAxis {
        GridAxis {
            start: -self.diagonal,
            step: self.step,
            bound: self.diagonal + self.step,
            k: 0,
        }
    }

    /// Instance centers in frame coordinates, in drawing order.
    ///
    /// Tiled grids iterate x in the outer loop and y in the inner loop.
    /// Positions are produced lazily; a dense grid is never held in memory.
    pub fn instance_positions(&self, placement: Placement) -> Box<dyn Iterator<Item = Point>> {
        match placement {
            Placement::Single => Box::new(std::iter::once(Point::new(0.0, 0.0))),
            Placement::Tiled => {
                let geometry = *self;
                Box::new(
                    self.grid_axis()
                        .flat_map(move |x| geometry.grid_axis().map(move |y| Point::new(x, y))),
                )
            }
        }
    }

    /// Whether a stamp of footprint `radius` centered on frame point `p`
    /// can touch the canvas at any rotation.
    pub fn reaches_canvas(&self, p: Point, radius: f32) -> bool {
        let c = self.to_canvas(p);
        c.x >= -radius
            && c.y >= -radius
            && c.x <= self.width as f32 + radius
            && c.y <= self.height as f32 + radius
    }

    /// Map a frame point onto the canvas.
    pub fn to_canvas(&self, p: Point) -> Point {
        let center = self.center();
        Point::new(
            center.x + p.x * self.cos - p.y * self.sin,
            center.y + p.x * self.sin + p.y * self.cos,
        )
    }

    /// Map a canvas point into the frame.
    pub fn to_frame(&self, p: Point) -> Point {
        let center = self.center();
        let dx = p.x - center.x;
        let dy = p.y - center.y;
        Point::new(dx * self.cos + dy * self.sin, -dx * self.sin + dy * self.cos)
    }
}

/// Lazy grid coordinates along one axis of the frame.
#[derive(Debug, Clone)]
pub struct GridAxis {
    start: f32,
    step: f32,
    bound: f32,
    k: u64,
}

impl Iterator for GridAxis {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let value = self.start + self.k as f32 * self.step;
        if value >= self.bound {
            return None;
        }
        self.k += 1;
        Some(value)
    }
}
