//! Watermark renderer.
//!
//! Maps a decoded source image, an optional crop box and a
//! [`WatermarkConfig`] to a fully composited output surface:
//!
//! 1. Copy the crop window 1:1 into a fresh surface (base drawn opaque)
//! 2. Build the shared geometry (diagonal, step, rotated center frame)
//! 3. Plan instance positions for tiled or single placement
//! 4. Rasterize the stamp once (text stroke + fill, or scaled logo)
//! 5. Composite every planned draw whose stamp can reach the surface
//!
//! The function is pure: the returned surface is the only effect.
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, Rgba, RgbaImage};
//! use sukashi::watermark::{render, WatermarkConfig};
//!
//! let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 200, Rgba([20, 40, 60, 255])));
//! let config = WatermarkConfig { text: "SAMPLE".to_string(), opacity: 0.5, ..Default::default() };
//!
//! let surface = render(&source, None, &config).unwrap();
//! assert_eq!(surface.dimensions(), (300, 200));
//! ```

use super::compositor::Compositor;
use super::config::{Placement, WatermarkConfig, WatermarkKind};
use super::crop::CropRect;
use super::layout::{Point, TileGeometry};
use super::resize::resize_rgba;
use super::text_renderer::{parse_hex_color, render_text, stroke_width_for, TextRenderOptions};
use super::WatermarkError;
use image::{DynamicImage, RgbaImage};

/// Which stamp layer a draw uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Text outline, drawn before the fill of the same instance
    Stroke,
    /// Text glyphs
    Fill,
    /// Scaled logo image
    Logo,
}

/// One planned draw: a layer centered on a frame position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOp {
    pub layer: LayerKind,
    pub position: Point,
}

/// Largest stamp layer a render will rasterize, in pixels (8192 x 8192).
///
/// Text and logos scale with the output width, so an extreme `font_size`
/// would otherwise ask for layers far larger than any canvas.
pub const MAX_STAMP_PIXELS: u64 = 1 << 26;

/// Round a stamp size up to whole pixels, rejecting layers over
/// [`MAX_STAMP_PIXELS`].
pub(crate) fn checked_stamp_size(width: f64, height: f64) -> Result<(u32, u32), WatermarkError> {
    let w = width.ceil().max(1.0);
    let h = height.ceil().max(1.0);
    if !w.is_finite() || !h.is_finite() || w * h > MAX_STAMP_PIXELS as f64 {
        return Err(WatermarkError::invalid_config(format!(
            "watermark of {:.0}x{:.0} px exceeds the {} pixel limit, lower font_size",
            w, h, MAX_STAMP_PIXELS
        )));
    }
    Ok((w as u32, h as u32))
}

/// Ordered draws for one output surface.
///
/// Draws are produced lazily from the geometry, so even a very dense grid
/// costs no memory up front.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub geometry: TileGeometry,
    pub placement: Placement,
    layers: &'static [LayerKind],
}

impl RenderPlan {
    fn nothing(geometry: TileGeometry, placement: Placement) -> Self {
        Self {
            geometry,
            placement,
            layers: &[],
        }
    }

    /// Layers drawn per instance, in order.
    pub fn layers(&self) -> &[LayerKind] {
        self.layers
    }

    /// Every draw in order: instances in grid order, layers in order within
    /// an instance.
    pub fn ops(&self) -> impl Iterator<Item = DrawOp> {
        let layers = self.layers;
        self.geometry
            .instance_positions(self.placement)
            .flat_map(move |position| layers.iter().map(move |&layer| DrawOp { layer, position }))
    }

    /// Number of watermark instances (an outlined text instance is two draws).
    pub fn instance_count(&self) -> usize {
        if self.layers.is_empty() {
            return 0;
        }
        self.geometry.instance_positions(self.placement).count()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Pre-rasterized layers shared by every instance of one render.
struct Stamp {
    stroke: Option<RgbaImage>,
    fill: Option<RgbaImage>,
    logo: Option<RgbaImage>,
    anchor: (f32, f32),
}

impl Stamp {
    fn layer(&self, kind: LayerKind) -> Option<&RgbaImage> {
        match kind {
            LayerKind::Stroke => self.stroke.as_ref(),
            LayerKind::Fill => self.fill.as_ref(),
            LayerKind::Logo => self.logo.as_ref(),
        }
    }

    /// Distance from the anchor to the farthest layer corner, plus a pixel
    /// for the bilinear fringe.
    fn reach(&self) -> f32 {
        let (ax, ay) = self.anchor;
        [&self.stroke, &self.fill, &self.logo]
            .into_iter()
            .flatten()
            .map(|layer| {
                let dx = ax.max(layer.width() as f32 - ax);
                let dy = ay.max(layer.height() as f32 - ay);
                (dx * dx + dy * dy).sqrt()
            })
            .fold(0.0, f32::max)
            + 1.0
    }
}

/// Font size in pixels for an output `width`.
pub fn scaled_font_size(config: &WatermarkConfig, width: u32) -> f32 {
    config.font_size as f32 * (width as f32 / 1000.0)
}

/// Logo size in pixels for an output `width`, keeping the logo's aspect.
pub fn scaled_logo_size(config: &WatermarkConfig, width: u32, logo: (u32, u32)) -> (f32, f32) {
    let logo_w = config.font_size as f32 * 5.0 * (width as f32 / 1000.0);
    let (native_w, native_h) = logo;
    let logo_h = if native_w == 0 {
        0.0
    } else {
        logo_w * native_h as f32 / native_w as f32
    };
    (logo_w, logo_h)
}

/// Plan the watermark draws for a `width` x `height` surface.
///
/// The plan is empty when nothing would be visible: zero opacity, empty
/// text, or an image watermark without a logo.
pub fn plan(width: u32, height: u32, config: &WatermarkConfig) -> Result<RenderPlan, WatermarkError> {
    config.validate()?;
    let geometry = TileGeometry::new(width, height, config.density, config.rotation)?;

    if config.normalized_opacity() <= 0.0 {
        return Ok(RenderPlan::nothing(geometry, config.placement));
    }

    if !config.has_content() {
        if config.kind == WatermarkKind::Image {
            tracing::debug!("no logo loaded, skipping watermark pass");
        }
        return Ok(RenderPlan::nothing(geometry, config.placement));
    }

    let layers: &'static [LayerKind] = match config.kind {
        WatermarkKind::Text if config.stroke => &[LayerKind::Stroke, LayerKind::Fill],
        WatermarkKind::Text => &[LayerKind::Fill],
        WatermarkKind::Image => &[LayerKind::Logo],
    };

    Ok(RenderPlan {
        geometry,
        placement: config.placement,
        layers,
    })
}

fn build_stamp(config: &WatermarkConfig, width: u32) -> Result<Stamp, WatermarkError> {
    match config.kind {
        WatermarkKind::Text => {
            let font_size = scaled_font_size(config, width);
            let rendered = render_text(&TextRenderOptions {
                text: config.text.clone(),
                font_size,
                color: parse_hex_color(&config.color)?,
                family: config.font_family,
                bold: config.bold,
                stroke_width: config.stroke.then(|| stroke_width_for(font_size)),
                font: config.font.clone(),
            })?;

            Ok(Stamp {
                stroke: rendered.stroke,
                fill: Some(rendered.fill),
                logo: None,
                anchor: rendered.anchor,
            })
        }
        WatermarkKind::Image => {
            let logo = config
                .logo
                .as_ref()
                .ok_or_else(|| WatermarkError::MissingAsset("logo".to_string()))?;

            let (logo_w, logo_h) = scaled_logo_size(config, width, (logo.width(), logo.height()));
            let (target_w, target_h) =
                checked_stamp_size(f64::from(logo_w.round()), f64::from(logo_h.round()))?;
            let scaled = resize_rgba(logo.image(), target_w, target_h)?;

            Ok(Stamp {
                stroke: None,
                fill: None,
                logo: Some(scaled),
                anchor: (target_w as f32 / 2.0, target_h as f32 / 2.0),
            })
        }
    }
}

/// Render the watermark onto `source`.
///
/// With a crop the surface is exactly the crop window, copied 1:1; without
/// one it matches the source's native size. A crop reaching outside the
/// source is an `InvalidConfiguration` error.
pub fn render(
    source: &DynamicImage,
    crop: Option<&CropRect>,
    config: &WatermarkConfig,
) -> Result<RgbaImage, WatermarkError> {
    config.validate()?;

    let (src_w, src_h) = (source.width(), source.height());
    let mut surface = match crop {
        Some(rect) => {
            if !rect.is_within(src_w, src_h) {
                return Err(WatermarkError::invalid_config(format!(
                    "crop {:?} exceeds source bounds {}x{}",
                    rect, src_w, src_h
                )));
            }
            let bounds = rect.pixel_bounds(src_w, src_h);
            source
                .crop_imm(bounds.x, bounds.y, bounds.width, bounds.height)
                .to_rgba8()
        }
        None => source.to_rgba8(),
    };

    let (width, height) = surface.dimensions();
    let plan = plan(width, height, config)?;
    if plan.is_empty() {
        return Ok(surface);
    }

    let stamp = build_stamp(config, width)?;
    let compositor = Compositor::new(&plan.geometry, config.normalized_opacity());

    let reach = stamp.reach();

    let mut instances = 0usize;
    let mut touched = 0usize;
    for op in plan.ops() {
        if !plan.geometry.reaches_canvas(op.position, reach) {
            continue;
        }
        if op.layer != LayerKind::Stroke {
            instances += 1;
        }
        if let Some(layer) = stamp.layer(op.layer) {
            touched += compositor.draw(&mut surface, layer, stamp.anchor, op.position);
        }
    }

    tracing::debug!(
        width,
        height,
        kind = ?config.kind,
        placement = ?config.placement,
        instances,
        pixels_blended = touched,
        "watermark rendered"
    );

    Ok(surface)
}

/// Render with the crop box selected by `config.crop_ratio`.
pub fn render_with_config_crop(
    source: &DynamicImage,
    config: &WatermarkConfig,
) -> Result<RgbaImage, WatermarkError> {
    if config.crop_ratio.is_original() {
        return render(source, None, config);
    }
    let crop = config.crop_ratio.crop(source.width(), source.height())?;
    render(source, Some(&crop), config)
}
