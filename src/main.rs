use clap::Parser;
use std::path::PathBuf;
use sukashi::config::Config;
use sukashi::error::SukashiError;
use sukashi::session::{export_all, ExportOptions, ExportSummary, Session};
use sukashi::watermark::{
    density_from_slider, CropRatio, OutputFormat, Placement, WatermarkKind,
};

/// Sukashi - burn tiled text or logo watermarks into a batch of images
#[derive(Parser, Debug)]
#[command(name = "sukashi")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to write watermarked images into
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Watermark text (selects a text watermark)
    #[arg(short, long, conflicts_with = "logo")]
    text: Option<String>,

    /// Logo image file (selects an image watermark)
    #[arg(short, long)]
    logo: Option<PathBuf>,

    /// Font file for the text, e.g. a CJK face
    #[arg(long)]
    font: Option<PathBuf>,

    /// tiled or single
    #[arg(long)]
    placement: Option<Placement>,

    /// Watermark opacity, 0 to 1
    #[arg(long)]
    opacity: Option<f32>,

    /// Rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f32>,

    /// Tile spacing per 1000px of width; smaller is denser
    #[arg(long, conflicts_with = "density_level")]
    density: Option<i32>,

    /// Density slider position 0..=600; larger is denser
    #[arg(long)]
    density_level: Option<i32>,

    /// Font size per 1000px of width
    #[arg(long)]
    font_size: Option<i32>,

    /// Text color as #RGB or #RRGGBB
    #[arg(long)]
    color: Option<String>,

    /// original or W:H, e.g. 16:9
    #[arg(long)]
    crop: Option<CropRatio>,

    /// Force the output format: jpeg, png or webp
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Lossy output quality, 0 to 1
    #[arg(long)]
    quality: Option<f32>,

    /// Images to watermark
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        let wm = &mut config.watermark;
        if let Some(text) = &self.text {
            wm.config.kind = WatermarkKind::Text;
            wm.config.text = text.clone();
        }
        if let Some(logo) = &self.logo {
            wm.config.kind = WatermarkKind::Image;
            wm.logo = Some(logo.clone());
        }
        if let Some(font) = &self.font {
            wm.font_path = Some(font.clone());
        }
        if let Some(placement) = self.placement {
            wm.config.placement = placement;
        }
        if let Some(opacity) = self.opacity {
            wm.config.opacity = opacity;
        }
        if let Some(rotation) = self.rotation {
            wm.config.rotation = rotation;
        }
        if let Some(density) = self.density {
            wm.config.density = density;
        }
        if let Some(level) = self.density_level {
            wm.config.density = density_from_slider(level);
        }
        if let Some(font_size) = self.font_size {
            wm.config.font_size = font_size;
        }
        if let Some(color) = &self.color {
            wm.config.color = color.clone();
        }
        if let Some(crop) = self.crop {
            wm.config.crop_ratio = crop;
        }

        if let Some(output) = &self.output {
            config.export.output_dir = output.clone();
        }
        if let Some(format) = self.format {
            config.export.format = Some(format);
        }
        if let Some(quality) = self.quality {
            config.export.quality = quality;
        }
    }
}

fn run(args: &Args, config: &Config) -> Result<ExportSummary, SukashiError> {
    let watermark = config.watermark_config()?;
    let mut session = Session::new(watermark);

    let added = session.add_images(&args.images);
    if added == 0 {
        return Err(SukashiError::Config(
            "none of the given images could be read".to_string(),
        ));
    }

    let options = ExportOptions {
        output_dir: config.export.output_dir.clone(),
        format: config.export.format,
        quality: config.export.quality,
    };

    Ok(export_all(&mut session, &options)?)
}

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }),
        None => Config::default(),
    };
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Initialize logging subsystem
    if let Err(e) = sukashi::logging::init_subscriber(&config.logging.level, config.logging.json) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        config_file = ?args.config,
        kind = ?config.watermark.config.kind,
        placement = ?config.watermark.config.placement,
        images = args.images.len(),
        output_dir = %config.export.output_dir.display(),
        "Configuration loaded successfully"
    );

    match run(&args, &config) {
        Ok(summary) => {
            for path in &summary.written {
                println!("{}", path.display());
            }
            for (file, e) in &summary.failed {
                eprintln!("Failed to export {}: {}", file, e);
            }
            if !summary.is_success() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
