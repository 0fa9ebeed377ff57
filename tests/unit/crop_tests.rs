// Crop computation tests

use rstest::rstest;
use sukashi::watermark::{compute_crop, CropRatio, CropRect, WatermarkError};

#[rstest]
#[case(1000, 500, "1:1", 250.0, 0.0, 500.0, 500.0)]
#[case(500, 1000, "1:1", 0.0, 250.0, 500.0, 500.0)]
#[case(1920, 1080, "16:9", 0.0, 0.0, 1920.0, 1080.0)]
#[case(1000, 1000, "16:9", 0.0, 218.75, 1000.0, 562.5)]
#[case(1200, 600, "4:3", 200.0, 0.0, 800.0, 600.0)]
#[case(640, 480, "original", 0.0, 0.0, 640.0, 480.0)]
fn test_compute_crop(
    #[case] width: u32,
    #[case] height: u32,
    #[case] ratio: &str,
    #[case] origin_x: f64,
    #[case] origin_y: f64,
    #[case] crop_w: f64,
    #[case] crop_h: f64,
) {
    let crop = compute_crop(width, height, ratio).unwrap();
    assert!((crop.origin_x - origin_x).abs() < 1e-9);
    assert!((crop.origin_y - origin_y).abs() < 1e-9);
    assert!((crop.width - crop_w).abs() < 1e-9);
    assert!((crop.height - crop_h).abs() < 1e-9);
    assert!(crop.is_within(width, height));
}

#[rstest]
#[case("abc")]
#[case("16x9")]
#[case("0:1")]
#[case("4:-3")]
#[case("4:")]
#[case("")]
fn test_malformed_ratio_rejected(#[case] ratio: &str) {
    let err = compute_crop(800, 600, ratio).unwrap_err();
    assert!(matches!(err, WatermarkError::InvalidConfiguration(_)));
}

#[test]
fn test_crop_is_centered() {
    for (w, h) in [(1000, 500), (333, 777), (1, 1000), (4096, 17)] {
        for ratio in ["1:1", "4:3", "16:9", "9:16", "3:2"] {
            let crop = compute_crop(w, h, ratio).unwrap();
            let right = w as f64 - (crop.origin_x + crop.width);
            let bottom = h as f64 - (crop.origin_y + crop.height);
            assert!((crop.origin_x - right).abs() < 1e-6, "{} {}x{}", ratio, w, h);
            assert!((crop.origin_y - bottom).abs() < 1e-6, "{} {}x{}", ratio, w, h);
        }
    }
}

#[test]
fn test_ratio_display_and_parse() {
    let ratio: CropRatio = " 16:9 ".parse().unwrap();
    assert_eq!(ratio.to_string(), "16:9");
    assert!("ORIGINAL".parse::<CropRatio>().unwrap().is_original());
}

#[test]
fn test_pixel_bounds_snap_inside_source() {
    let crop = CropRect {
        origin_x: 0.0,
        origin_y: 218.75,
        width: 1000.0,
        height: 562.5,
    };
    let bounds = crop.pixel_bounds(1000, 1000);
    assert!(bounds.y + bounds.height <= 1000);
    assert!(bounds.height == 562 || bounds.height == 563);
    assert_eq!(bounds.width, 1000);
}
