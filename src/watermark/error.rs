//! Watermark error types.
//!
//! Defines errors that can occur while configuring, rendering and encoding
//! watermarked images.

use std::fmt;

/// Errors that can occur during watermark processing.
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkError {
    /// Configuration value is malformed or out of range
    InvalidConfiguration(String),

    /// A required asset (e.g. the logo) is not available
    MissingAsset(String),

    /// Failed to decode a source or logo image
    DecodeError(String),

    /// Failed to encode the rendered surface
    EncodeError { format: String, message: String },

    /// Failed to rasterize a watermark instance
    RenderError(String),
}

impl WatermarkError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EncodeError {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Whether the error is the soft "asset not yet available" condition.
    pub fn is_missing_asset(&self) -> bool {
        matches!(self, Self::MissingAsset(_))
    }
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(msg) => {
                write!(f, "Invalid watermark configuration: {}", msg)
            }
            Self::MissingAsset(msg) => write!(f, "Missing watermark asset: {}", msg),
            Self::DecodeError(msg) => write!(f, "Failed to decode image: {}", msg),
            Self::EncodeError { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            Self::RenderError(msg) => write!(f, "Failed to render watermark: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}
