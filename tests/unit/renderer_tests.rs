// Renderer behaviour through the public API

use image::{DynamicImage, Rgba, RgbaImage};
use rstest::rstest;
use sukashi::watermark::{
    plan, render, render_with_config_crop, unsupported_chars, CustomFont, FontFamily, LayerKind,
    Logo, Placement, WatermarkConfig, WatermarkError, WatermarkKind,
};

fn checkerboard(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgba([30, 30, 30, 255])
        } else {
            Rgba([220, 220, 220, 255])
        }
    }))
}

fn changed_pixels(a: &RgbaImage, b: &RgbaImage) -> usize {
    a.pixels().zip(b.pixels()).filter(|(p, q)| p != q).count()
}

#[rstest]
#[case(FontFamily::Sans, false)]
#[case(FontFamily::Serif, true)]
#[case(FontFamily::Mono, false)]
fn test_text_families_render(#[case] font_family: FontFamily, #[case] bold: bool) {
    let source = checkerboard(300, 200);
    let config = WatermarkConfig {
        text: "Sample".to_string(),
        font_family,
        bold,
        opacity: 0.6,
        ..Default::default()
    };
    let surface = render(&source, None, &config).unwrap();
    assert_eq!(surface.dimensions(), (300, 200));
    assert!(changed_pixels(&surface, &source.to_rgba8()) > 0);
}

#[test]
fn test_empty_text_leaves_base_untouched() {
    let source = checkerboard(120, 90);
    let config = WatermarkConfig {
        text: String::new(),
        opacity: 1.0,
        ..Default::default()
    };
    assert!(plan(120, 90, &config).unwrap().is_empty());
    assert_eq!(render(&source, None, &config).unwrap(), source.to_rgba8());
}

#[test]
fn test_single_touches_fewer_pixels_than_tiled() {
    let source = checkerboard(400, 400);
    let base = source.to_rgba8();
    let tiled = WatermarkConfig {
        text: "TILE".to_string(),
        opacity: 0.8,
        ..Default::default()
    };
    let single = WatermarkConfig {
        placement: Placement::Single,
        ..tiled.clone()
    };

    let tiled_changes = changed_pixels(&render(&source, None, &tiled).unwrap(), &base);
    let single_changes = changed_pixels(&render(&source, None, &single).unwrap(), &base);
    assert!(single_changes > 0);
    assert!(tiled_changes > single_changes);
}

#[test]
fn test_stroke_widens_the_footprint() {
    let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 200, Rgba([0, 0, 0, 255])));
    let base = source.to_rgba8();
    let plain = WatermarkConfig {
        text: "Outline".to_string(),
        placement: Placement::Single,
        rotation: 0.0,
        opacity: 1.0,
        font_size: 100,
        ..Default::default()
    };
    let stroked = WatermarkConfig {
        stroke: true,
        ..plain.clone()
    };

    let ops = plan(400, 200, &stroked).unwrap();
    assert_eq!(
        ops.ops().map(|op| op.layer).collect::<Vec<_>>(),
        vec![LayerKind::Stroke, LayerKind::Fill]
    );

    let plain_changes = changed_pixels(&render(&source, None, &plain).unwrap(), &base);
    let stroked_changes = changed_pixels(&render(&source, None, &stroked).unwrap(), &base);
    assert!(stroked_changes > plain_changes);
}

#[test]
fn test_logo_scales_with_output_width() {
    let logo = Logo::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        40,
        20,
        Rgba([255, 255, 255, 255]),
    )));
    let config = WatermarkConfig {
        kind: WatermarkKind::Image,
        placement: Placement::Single,
        logo: Some(logo),
        rotation: 0.0,
        opacity: 1.0,
        font_size: 20,
        ..Default::default()
    };

    for (width, expected_w) in [(1000u32, 100usize), (2000, 200)] {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            400,
            Rgba([0, 0, 0, 255]),
        ));
        let surface = render(&source, None, &config).unwrap();
        let lit_in_row = (0..width)
            .filter(|&x| surface.get_pixel(x, 200)[0] > 127)
            .count();
        assert!(
            (lit_in_row as i64 - expected_w as i64).abs() <= 2,
            "width {} lit {}",
            width,
            lit_in_row
        );
    }
}

#[test]
fn test_config_crop_is_applied() {
    let source = checkerboard(900, 300);
    let config = WatermarkConfig {
        crop_ratio: "16:9".parse().unwrap(),
        ..Default::default()
    };
    let surface = render_with_config_crop(&source, &config).unwrap();
    assert_eq!(surface.dimensions(), (533, 300));
}

#[test]
fn test_transparent_source_keeps_alpha_outside_watermark() {
    let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 200, Rgba([0, 0, 0, 0])));
    let config = WatermarkConfig {
        placement: Placement::Single,
        text: ".".to_string(),
        ..Default::default()
    };
    let surface = render(&source, None, &config).unwrap();
    assert_eq!(surface.get_pixel(0, 0)[3], 0);
}

#[rstest]
#[case(WatermarkKind::Text, 40_000)]
#[case(WatermarkKind::Text, i32::MAX)]
#[case(WatermarkKind::Image, 10_000)]
#[case(WatermarkKind::Image, i32::MAX)]
fn test_oversized_watermark_is_rejected(#[case] kind: WatermarkKind, #[case] font_size: i32) {
    let source = checkerboard(1000, 300);
    let logo = Logo::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        64,
        64,
        Rgba([255, 255, 255, 255]),
    )));
    let config = WatermarkConfig {
        kind,
        logo: Some(logo),
        font_size,
        opacity: 1.0,
        ..Default::default()
    };
    let err = render(&source, None, &config).unwrap_err();
    assert!(matches!(err, WatermarkError::InvalidConfiguration(_)), "{}", err);
}

#[test]
fn test_supplied_font_renders_non_latin_text() {
    let font_file = concat!(env!("CARGO_MANIFEST_DIR"), "/src/watermark/fonts/DejaVuSerif.ttf");
    let font = CustomFont::load(std::path::Path::new(font_file)).unwrap();

    let text = "Εμπιστευτικό έγγραφο";
    assert!(unsupported_chars(text, FontFamily::Sans, false, Some(&font))
        .unwrap()
        .is_empty());

    let source = checkerboard(500, 300);
    let base = source.to_rgba8();
    let embedded = WatermarkConfig {
        text: text.to_string(),
        placement: Placement::Single,
        opacity: 1.0,
        font_size: 60,
        ..Default::default()
    };
    let supplied = WatermarkConfig {
        font: Some(font),
        ..embedded.clone()
    };

    let with_font = render(&source, None, &supplied).unwrap();
    assert!(changed_pixels(&with_font, &base) > 0);
    // Serif glyphs differ from the embedded sans face
    assert_ne!(with_font, render(&source, None, &embedded).unwrap());
}
