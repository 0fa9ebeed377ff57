//! Batch export of watermarked images.
//!
//! Images are rendered one at a time in list order and written to the
//! output directory as `watermarked_<file name>`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

use super::{ImageItem, Session};
use crate::watermark::encoder::{encode_as, EncoderQuality, OutputFormat};
use crate::watermark::renderer::render_with_config_crop;
use crate::watermark::{WatermarkConfig, WatermarkError};

/// Prefix added to every exported file name
pub const OUTPUT_PREFIX: &str = "watermarked_";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Watermark(#[from] WatermarkError),

    #[error("No images to export")]
    NothingToExport,

    #[error("{} is already written by an earlier image in this batch", .0.display())]
    DuplicateOutput(PathBuf),
}

/// Where and how to write exported images
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    /// Force every output into this format; `None` keeps each source's format
    pub format: Option<OutputFormat>,
    /// Lossy quality in `[0, 1]`
    pub quality: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: None,
            quality: 0.9,
        }
    }
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(String, ExportError)>,
}

impl ExportSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Output format for `file_name`: the override, else the source's own
/// format, else PNG.
pub fn output_format(file_name: &str, format: Option<OutputFormat>) -> OutputFormat {
    format
        .or_else(|| OutputFormat::from_path(Path::new(file_name)))
        .unwrap_or(OutputFormat::Png)
}

/// `watermarked_<file_name>`, with the extension swapped when the written
/// format differs from what the name says.
pub fn output_file_name(file_name: &str, format: Option<OutputFormat>) -> String {
    let target = output_format(file_name, format);
    let path = Path::new(file_name);

    if OutputFormat::from_path(path) == Some(target) {
        return format!("{}{}", OUTPUT_PREFIX, file_name);
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    format!("{}{}.{}", OUTPUT_PREFIX, stem, target.extension())
}

/// Where `item` is written under `options`.
pub fn output_path(item: &ImageItem, options: &ExportOptions) -> PathBuf {
    options
        .output_dir
        .join(output_file_name(&item.file_name, options.format))
}

/// Render and write one image.
pub fn export_one(
    item: &ImageItem,
    config: &WatermarkConfig,
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let started = Instant::now();
    let source = item.source()?;
    let surface = render_with_config_crop(&source, config)?;

    let format = output_format(&item.file_name, options.format);
    let encoded = encode_as(&surface, format, EncoderQuality::from_unit(options.quality))?;

    let target = output_path(item, options);
    fs::write(&target, &encoded.data)?;

    tracing::info!(
        id = %item.id,
        source = %item.path.display(),
        output = %target.display(),
        format = %format,
        width = surface.width(),
        height = surface.height(),
        bytes = encoded.data.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "image exported"
    );

    Ok(target)
}

/// Export every image in the session, in order.
///
/// Refuses to start when the configuration needs a logo that is not loaded.
/// Per-image failures are collected in the summary and do not stop the run.
/// An image whose output name was already written in this batch (same file
/// name from another directory) fails with `DuplicateOutput` instead of
/// overwriting the earlier file.
pub fn export_all(session: &mut Session, options: &ExportOptions) -> Result<ExportSummary, ExportError> {
    if session.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let config = session.config().clone();
    config.validate()?;
    config.require_assets()?;

    fs::create_dir_all(&options.output_dir)?;

    let mut summary = ExportSummary::default();
    let mut claimed = HashSet::new();
    for item in session.images_mut() {
        let target = output_path(item, options);
        if !claimed.insert(target.clone()) {
            let e = ExportError::DuplicateOutput(target);
            tracing::warn!(
                file = %item.file_name,
                source = %item.path.display(),
                error = %e,
                "export skipped"
            );
            summary.failed.push((item.file_name.clone(), e));
            continue;
        }

        match export_one(item, &config, options) {
            Ok(path) => {
                item.processed = true;
                summary.written.push(path);
            }
            Err(e) => {
                tracing::warn!(file = %item.file_name, error = %e, "export failed");
                summary.failed.push((item.file_name.clone(), e));
            }
        }
    }

    tracing::info!(
        written = summary.written.len(),
        failed = summary.failed.len(),
        output_dir = %options.output_dir.display(),
        "batch export finished"
    );

    Ok(summary)
}
