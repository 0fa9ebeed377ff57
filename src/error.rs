// Error types module

use std::fmt;

use crate::session::ExportError;
use crate::watermark::WatermarkError;

/// Top-level error for the command-line front end
///
/// Groups failures by where they surfaced so the CLI can report them
/// uniformly before exiting.
#[derive(Debug)]
pub enum SukashiError {
    /// Configuration errors (invalid YAML, missing env vars, bad flag values)
    Config(String),

    /// Rendering, decoding or encoding failures
    Watermark(WatermarkError),

    /// Batch export failures
    Export(ExportError),

    /// Filesystem errors outside of export
    Io(std::io::Error),
}

impl fmt::Display for SukashiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SukashiError::Config(msg) => write!(f, "Configuration error: {}", msg),
            SukashiError::Watermark(e) => write!(f, "Watermark error: {}", e),
            SukashiError::Export(e) => write!(f, "Export error: {}", e),
            SukashiError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SukashiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SukashiError::Config(_) => None,
            SukashiError::Watermark(e) => Some(e),
            SukashiError::Export(e) => Some(e),
            SukashiError::Io(e) => Some(e),
        }
    }
}

impl From<WatermarkError> for SukashiError {
    fn from(err: WatermarkError) -> Self {
        SukashiError::Watermark(err)
    }
}

impl From<ExportError> for SukashiError {
    fn from(err: ExportError) -> Self {
        SukashiError::Export(err)
    }
}

impl From<std::io::Error> for SukashiError {
    fn from(err: std::io::Error) -> Self {
        SukashiError::Io(err)
    }
}
