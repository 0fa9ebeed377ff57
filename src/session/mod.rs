//! Editing session: the loaded images, the active selection and the shared
//! watermark configuration.
//!
//! Observers subscribe through [`Session::subscribe`] and receive a
//! [`SessionEvent`] whenever the image list, the selection or the
//! configuration changes.
//!
//! # Example
//!
//! ```no_run
//! use sukashi::session::Session;
//!
//! let mut session = Session::default();
//! let events = session.subscribe();
//! session.add_images(["photos/a.jpg", "photos/b.png"]);
//! session.update_config(|config| config.opacity = 0.5);
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod export;
pub mod thumbnail;

use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use uuid::Uuid;

use crate::watermark::encoder::load_image;
use crate::watermark::renderer::render_with_config_crop;
use crate::watermark::{CustomFont, Logo, WatermarkConfig, WatermarkError};
use thumbnail::{generate_thumbnail, Thumbnail};

pub use export::{
    export_all, export_one, output_file_name, output_path, ExportError, ExportOptions, ExportSummary,
};

/// One imported image
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub id: Uuid,
    pub path: PathBuf,
    pub file_name: String,
    pub thumbnail: Thumbnail,
    /// Native (width, height)
    pub dimensions: (u32, u32),
    /// Set once the image has been exported
    pub processed: bool,
}

impl ImageItem {
    /// Decode `path` and build its thumbnail.
    pub fn load(path: &Path) -> Result<Self, WatermarkError> {
        let image = load_image(path)?;
        Self::from_image(path, &image)
    }

    fn from_image(path: &Path, image: &DynamicImage) -> Result<Self, WatermarkError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                WatermarkError::DecodeError(format!("{} has no file name", path.display()))
            })?;

        Ok(Self {
            id: Uuid::new_v4(),
            path: path.to_path_buf(),
            file_name,
            thumbnail: generate_thumbnail(image)?,
            dimensions: (image.width(), image.height()),
            processed: false,
        })
    }

    /// Decode the full-size source again.
    pub fn source(&self) -> Result<DynamicImage, WatermarkError> {
        load_image(&self.path)
    }
}

/// Change notifications
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Images were added or cleared, or the selection moved
    ImagesChanged { count: usize, active: Option<usize> },
    /// The watermark configuration (including the logo) changed
    ConfigChanged,
}

/// Image list, active index and shared configuration
#[derive(Debug, Default)]
pub struct Session {
    images: Vec<ImageItem>,
    active: Option<usize>,
    config: WatermarkConfig,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl Session {
    pub fn new(config: WatermarkConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Register an observer. Dropped receivers are pruned on the next event.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn emit_images_changed(&mut self) {
        let event = SessionEvent::ImagesChanged {
            count: self.images.len(),
            active: self.active,
        };
        self.emit(event);
    }

    /// Import images in order. Files that fail to decode are skipped with a
    /// warning. Returns how many were added.
    ///
    /// The first import into an empty session selects image 0.
    pub fn add_images<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = 0;
        for path in paths {
            let path = path.as_ref();
            match ImageItem::load(path) {
                Ok(item) => {
                    tracing::debug!(
                        id = %item.id,
                        file = %item.file_name,
                        width = item.dimensions.0,
                        height = item.dimensions.1,
                        "image added"
                    );
                    self.images.push(item);
                    added += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable image");
                }
            }
        }

        if self.active.is_none() && !self.images.is_empty() {
            self.active = Some(0);
        }

        if added > 0 {
            self.emit_images_changed();
        }
        added
    }

    /// Add an already decoded image under `path`.
    pub fn add_decoded(&mut self, path: &Path, image: &DynamicImage) -> Result<Uuid, WatermarkError> {
        let item = ImageItem::from_image(path, image)?;
        let id = item.id;
        self.images.push(item);
        if self.active.is_none() {
            self.active = Some(0);
        }
        self.emit_images_changed();
        Ok(id)
    }

    pub fn images(&self) -> &[ImageItem] {
        &self.images
    }

    pub(crate) fn images_mut(&mut self) -> &mut [ImageItem] {
        &mut self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Select image `index`. Out-of-range indices are ignored.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.images.len() {
            return false;
        }
        self.active = Some(index);
        self.emit_images_changed();
        true
    }

    pub fn active_image(&self) -> Option<&ImageItem> {
        self.active.and_then(|i| self.images.get(i))
    }

    /// Drop every image and the selection.
    pub fn clear(&mut self) {
        self.images.clear();
        self.active = None;
        self.emit_images_changed();
    }

    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    /// Apply a partial update to the configuration.
    pub fn update_config<F>(&mut self, update: F)
    where
        F: FnOnce(&mut WatermarkConfig),
    {
        update(&mut self.config);
        self.emit(SessionEvent::ConfigChanged);
    }

    /// Replace the whole configuration.
    pub fn set_config(&mut self, config: WatermarkConfig) {
        self.config = config;
        self.emit(SessionEvent::ConfigChanged);
    }

    /// Decode `path` and use it as the watermark logo.
    pub fn set_logo(&mut self, path: &Path) -> Result<(), WatermarkError> {
        let logo = Logo::new(load_image(path)?);
        tracing::debug!(path = %path.display(), width = logo.width(), height = logo.height(), "logo loaded");
        self.update_config(|config| config.logo = Some(logo));
        Ok(())
    }

    pub fn remove_logo(&mut self) {
        self.update_config(|config| config.logo = None);
    }

    /// Load a font file for text watermarks, replacing the embedded faces.
    pub fn set_font(&mut self, path: &Path) -> Result<(), WatermarkError> {
        let font = CustomFont::load(path)?;
        tracing::debug!(path = %path.display(), "font loaded");
        self.update_config(|config| config.font = Some(font));
        Ok(())
    }

    pub fn remove_font(&mut self) {
        self.update_config(|config| config.font = None);
    }

    /// Render the active image with the current configuration.
    ///
    /// `Ok(None)` when no image is selected.
    pub fn render_preview(&self) -> Result<Option<RgbaImage>, WatermarkError> {
        let Some(item) = self.active_image() else {
            return Ok(None);
        };
        let source = item.source()?;
        render_with_config_crop(&source, &self.config).map(Some)
    }
}
