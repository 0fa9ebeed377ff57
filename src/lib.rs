// Sukashi image watermarking library

pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod watermark;
