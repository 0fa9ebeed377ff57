//! Watermark rendering for still images.
//!
//! The pipeline is a pure function of a decoded source image, an optional
//! crop box and a [`WatermarkConfig`]:
//!
//! - [`crop`] computes centered crop boxes for aspect ratios
//! - [`layout`] builds the rotated tile grid that covers the canvas
//! - [`text_renderer`] rasterizes text with embedded fonts and outlines
//! - [`compositor`] blends stamp layers onto the surface
//! - [`renderer`] ties these together and returns the output surface
//! - [`encoder`] decodes inputs and encodes results as JPEG, PNG or WebP
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   kind: text
//!   placement: tiled
//!   text: "CONFIDENTIAL"
//!   font_family: serif
//!   bold: true
//!   stroke: true
//!   opacity: 0.3
//!   rotation: -45
//!   density: 200
//!   color: "#FFFFFF"
//!   font_size: 24
//!   crop_ratio: "16:9"
//! ```

pub mod compositor;
pub mod config;
pub mod crop;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod renderer;
pub mod resize;
pub mod text_renderer;

pub use compositor::Compositor;
pub use config::{
    density_from_slider, FontFamily, Logo, Placement, WatermarkConfig, WatermarkKind,
};
pub use crop::{compute_crop, CropRatio, CropRect, ORIGINAL_RATIO};
pub use encoder::{decode_image, encode, load_image, EncoderFactory, ImageEncoder, OutputFormat};
pub use error::WatermarkError;
pub use layout::{GridAxis, Point, TileGeometry};
pub use renderer::{
    plan, render, render_with_config_crop, DrawOp, LayerKind, RenderPlan, MAX_STAMP_PIXELS,
};
pub use text_renderer::{parse_hex_color, unsupported_chars, Color, CustomFont};
