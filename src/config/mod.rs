// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::watermark::encoder::{load_image, OutputFormat};
use crate::watermark::{CustomFont, Logo, WatermarkConfig, WatermarkError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: WatermarkSection,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Watermark settings plus the asset files to load for them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSection {
    #[serde(flatten)]
    pub config: WatermarkConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
    /// TrueType/OpenType file for text, needed for scripts such as CJK
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Output format override (jpeg, png, webp); omitted keeps source formats
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "format_name"
    )]
    pub format: Option<OutputFormat>,
    /// Lossy quality in [0, 1]
    #[serde(default = "default_quality")]
    pub quality: f32,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("watermarked")
}

fn default_quality() -> f32 {
    0.9
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: None,
            quality: default_quality(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

mod format_name {
    use super::OutputFormat;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        format: &Option<OutputFormat>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match format {
            Some(f) => serializer.serialize_str(f.as_str()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OutputFormat>, D::Error> {
        let name: Option<String> = Option::deserialize(deserializer)?;
        name.map(|n| n.parse().map_err(serde::de::Error::custom))
            .transpose()
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            })
        });

        if let Some(var_name) = missing {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.watermark
            .config
            .validate()
            .map_err(|e| e.to_string())?;

        let quality = self.export.quality;
        if !quality.is_finite() || !(0.0..=1.0).contains(&quality) {
            return Err(format!(
                "export.quality must be between 0 and 1, got {}",
                quality
            ));
        }

        if self.export.output_dir.as_os_str().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }

        if self.logging.level.trim().is_empty() {
            return Err("logging.level cannot be empty".to_string());
        }

        Ok(())
    }

    /// Decode the configured logo file, if any.
    pub fn load_logo(&self) -> Result<Option<Logo>, WatermarkError> {
        match &self.watermark.logo {
            Some(path) => load_image(path).map(|image| Some(Logo::new(image))),
            None => Ok(None),
        }
    }

    /// Parse the configured font file, if any.
    pub fn load_font(&self) -> Result<Option<CustomFont>, WatermarkError> {
        match &self.watermark.font_path {
            Some(path) => CustomFont::load(path).map(Some),
            None => Ok(None),
        }
    }

    /// Watermark configuration with the logo and font files loaded.
    pub fn watermark_config(&self) -> Result<WatermarkConfig, WatermarkError> {
        let logo = self.load_logo()?;
        let font = self.load_font()?;
        Ok(self
            .watermark
            .config
            .clone()
            .with_logo(logo)
            .with_font(font))
    }
}
