// Watermark configuration tests

use rstest::rstest;
use sukashi::config::Config;
use sukashi::watermark::{
    density_from_slider, CropRatio, FontFamily, Placement, WatermarkConfig, WatermarkError,
    WatermarkKind,
};

#[test]
fn test_defaults_match_editor_defaults() {
    let config = WatermarkConfig::default();
    assert_eq!(config.kind, WatermarkKind::Text);
    assert_eq!(config.placement, Placement::Tiled);
    assert_eq!(config.font_family, FontFamily::Sans);
    assert!(!config.bold);
    assert!(!config.stroke);
    assert_eq!(config.opacity, 0.3);
    assert_eq!(config.rotation, -45.0);
    assert_eq!(config.density, 200);
    assert_eq!(config.color, "#FFFFFF");
    assert_eq!(config.font_size, 24);
    assert_eq!(config.crop_ratio, CropRatio::Original);
    assert!(config.logo.is_none());
    assert!(config.validate().is_ok());
}

#[rstest]
#[case(-0.5, 0.0)]
#[case(0.0, 0.0)]
#[case(0.42, 0.42)]
#[case(1.0, 1.0)]
#[case(7.0, 1.0)]
fn test_opacity_is_clamped(#[case] opacity: f32, #[case] expected: f32) {
    let config = WatermarkConfig {
        opacity,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
    assert_eq!(config.normalized_opacity(), expected);
}

#[rstest]
#[case(f32::NAN)]
#[case(f32::INFINITY)]
fn test_non_finite_opacity_rejected(#[case] opacity: f32) {
    let config = WatermarkConfig {
        opacity,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(WatermarkError::InvalidConfiguration(_))
    ));
}

#[rstest]
#[case(0, 24)]
#[case(-10, 24)]
#[case(200, 0)]
#[case(200, -1)]
fn test_non_positive_sizes_rejected(#[case] density: i32, #[case] font_size: i32) {
    let config = WatermarkConfig {
        density,
        font_size,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[rstest]
#[case(0, 600)]
#[case(400, 200)]
#[case(600, 0)]
#[case(900, 0)]
#[case(-5, 600)]
fn test_density_slider(#[case] level: i32, #[case] density: i32) {
    assert_eq!(density_from_slider(level), density);
}

#[rstest]
#[case("'Inter', sans-serif", FontFamily::Sans)]
#[case("Georgia, serif", FontFamily::Serif)]
#[case("'Courier New', monospace", FontFamily::Mono)]
#[case("fantasy", FontFamily::Sans)]
fn test_font_family_from_css(#[case] css: &str, #[case] family: FontFamily) {
    assert_eq!(css.parse::<FontFamily>().unwrap(), family);
}

#[test]
fn test_image_kind_requires_logo() {
    let config = WatermarkConfig {
        kind: WatermarkKind::Image,
        ..Default::default()
    };
    assert!(!config.has_content());
    assert!(config.require_assets().unwrap_err().is_missing_asset());
}

#[test]
fn test_yaml_round_trip() {
    let mut config = Config::default();
    config.watermark.config.text = "Round trip".to_string();
    config.watermark.config.crop_ratio = "3:2".parse().unwrap();

    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed = Config::from_yaml_with_env(&yaml).unwrap();
    assert_eq!(parsed, config);
}
