// Encoding and decoding through the public API

use image::{Rgba, RgbaImage};
use rstest::rstest;
use sukashi::watermark::encoder::detect_format;
use sukashi::watermark::{decode_image, encode, load_image, OutputFormat, WatermarkError};

fn surface() -> RgbaImage {
    RgbaImage::from_fn(32, 24, |x, y| Rgba([(x * 8) as u8, (y * 10) as u8, 128, 255]))
}

#[rstest]
#[case("image/jpeg", OutputFormat::Jpeg)]
#[case("image/png", OutputFormat::Png)]
#[case("image/webp", OutputFormat::WebP)]
fn test_encode_by_mime(#[case] mime: &str, #[case] format: OutputFormat) {
    let data = encode(&surface(), mime, 0.8).unwrap();
    assert_eq!(detect_format(&data), Some(format));

    let decoded = decode_image(&data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 24));
}

#[test]
fn test_webp_keeps_pixels() {
    let original = surface();
    let data = encode(&original, "image/webp", 0.1).unwrap();
    assert_eq!(decode_image(&data).unwrap().to_rgba8(), original);
}

#[test]
fn test_unsupported_mime() {
    let err = encode(&surface(), "application/pdf", 0.9).unwrap_err();
    assert_eq!(
        err,
        WatermarkError::EncodeError {
            format: "application/pdf".to_string(),
            message: "unsupported MIME type".to_string(),
        }
    );
}

#[test]
fn test_load_image_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.png");
    surface().save(&path).unwrap();

    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded.to_rgba8(), surface());
}

#[test]
fn test_load_image_ignores_misleading_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actually_png.jpg");
    std::fs::write(&path, encode(&surface(), "image/png", 1.0).unwrap()).unwrap();

    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded.to_rgba8(), surface());
}
