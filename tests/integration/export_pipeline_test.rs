// End-to-end: YAML config + source files -> watermarked files on disk

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use sukashi::config::Config;
use sukashi::session::{export_all, ExportError, ExportOptions, Session};
use sukashi::watermark::encoder::detect_format;
use sukashi::watermark::{decode_image, OutputFormat, WatermarkError};
use tempfile::TempDir;

fn write_rgb(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 200) as u8, (y % 200) as u8, 40]))
        .save(&path)
        .unwrap();
    path
}

fn options_from(config: &Config) -> ExportOptions {
    ExportOptions {
        output_dir: config.export.output_dir.clone(),
        format: config.export.format,
        quality: config.export.quality,
    }
}

#[test]
fn test_text_watermark_batch_from_yaml() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let a = write_rgb(input.path(), "beach.jpg", 320, 240);
    let b = write_rgb(input.path(), "city.png", 200, 300);

    let yaml = format!(
        r##"
watermark:
  text: "INTERNAL"
  opacity: 0.5
  density: 150
  stroke: true
  crop_ratio: "1:1"
export:
  output_dir: {}
  quality: 0.8
"##,
        output.path().join("batch").display()
    );
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    config.validate().unwrap();

    let mut session = Session::new(config.watermark_config().unwrap());
    assert_eq!(session.add_images([&a, &b]), 2);

    let summary = export_all(&mut session, &options_from(&config)).unwrap();
    assert!(summary.is_success());

    let names: Vec<String> = summary
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["watermarked_beach.jpg", "watermarked_city.png"]);

    let beach = fs::read(&summary.written[0]).unwrap();
    assert_eq!(detect_format(&beach), Some(OutputFormat::Jpeg));
    let beach = decode_image(&beach).unwrap();
    assert_eq!((beach.width(), beach.height()), (240, 240));

    let city = decode_image(&fs::read(&summary.written[1]).unwrap()).unwrap();
    assert_eq!((city.width(), city.height()), (200, 200));

    // The watermark actually landed in the exported pixels
    let original = image::open(&b).unwrap().crop_imm(0, 50, 200, 200).to_rgba8();
    assert_ne!(city.to_rgba8(), original);
}

#[test]
fn test_logo_watermark_with_format_override() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let photo = write_rgb(input.path(), "photo.jpg", 400, 300);

    let logo_path = input.path().join("logo.png");
    RgbaImage::from_fn(30, 10, |x, _| Rgba([255, 0, 0, if x < 15 { 255 } else { 0 }]))
        .save(&logo_path)
        .unwrap();

    let yaml = format!(
        "watermark:\n  kind: image\n  logo: {}\n  opacity: 1.0\nexport:\n  output_dir: {}\n  format: png\n",
        logo_path.display(),
        output.path().display()
    );
    let config = Config::from_yaml_with_env(&yaml).unwrap();

    let mut session = Session::new(config.watermark_config().unwrap());
    session.add_images([&photo]);
    let summary = export_all(&mut session, &options_from(&config)).unwrap();

    let written = &summary.written[0];
    assert_eq!(
        written.file_name().unwrap().to_string_lossy(),
        "watermarked_photo.png"
    );
    let out = decode_image(&fs::read(written).unwrap()).unwrap().to_rgba8();
    assert_eq!(out.dimensions(), (400, 300));
    assert!(out.pixels().all(|p| p[3] == 255));
    assert!(out.pixels().any(|p| p[0] == 255 && p[1] == 0 && p[2] == 0));
}

#[test]
fn test_zero_opacity_export_is_lossless_copy() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let src = write_rgb(input.path(), "plain.png", 64, 48);

    let mut session = Session::default();
    session.add_images([&src]);
    session.update_config(|config| config.opacity = 0.0);

    let options = ExportOptions {
        output_dir: output.path().to_path_buf(),
        ..Default::default()
    };
    let summary = export_all(&mut session, &options).unwrap();
    let out = decode_image(&fs::read(&summary.written[0]).unwrap()).unwrap();
    assert_eq!(out.to_rgba8(), image::open(&src).unwrap().to_rgba8());
}

#[test]
fn test_missing_logo_blocks_export() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let src = write_rgb(input.path(), "x.png", 16, 16);

    let config = Config::from_yaml_with_env("watermark:\n  kind: image\n").unwrap();
    let mut session = Session::new(config.watermark_config().unwrap());
    session.add_images([&src]);

    let options = ExportOptions {
        output_dir: output.path().to_path_buf(),
        ..Default::default()
    };
    let err = export_all(&mut session, &options).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Watermark(WatermarkError::MissingAsset(_))
    ));
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}
