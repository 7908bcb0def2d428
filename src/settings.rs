use crate::document::{ImageElement, NodeId};
use crate::errors::{GalleryError, Result};
use crate::registry::ImageItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_MIN_ZOOM: f32 = 0.25;
pub const DEFAULT_MAX_ZOOM: f32 = 8.0;

/// Serializable gallery options. Missing fields take their defaults, so a
/// settings file may list only what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    pub show_thumbnails: bool,
    pub close_on_backdrop_click: bool,
    pub keyboard_enabled: bool,
    pub wheel_zoom_enabled: bool,
    /// Appended to the backdrop's class list.
    pub extra_class_name: String,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Upper bound on how long the leave transition may hold the overlay.
    pub close_fallback_ms: u64,
    pub thumbnail_size: f32,
    pub stage_padding: f32,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            show_thumbnails: true,
            close_on_backdrop_click: true,
            keyboard_enabled: true,
            wheel_zoom_enabled: true,
            extra_class_name: String::new(),
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            close_fallback_ms: 350,
            thumbnail_size: 64.0,
            stage_padding: 24.0,
        }
    }
}

impl GallerySettings {
    /// Repair zoom bounds and sizes so the rest of the gallery can rely on
    /// `0 < min_zoom <= max_zoom`.
    pub fn normalized(mut self) -> Self {
        let sane = |v: f32| v.is_finite() && v > 0.0;
        if !sane(self.min_zoom) {
            self.min_zoom = DEFAULT_MIN_ZOOM;
        }
        if !sane(self.max_zoom) {
            self.max_zoom = DEFAULT_MAX_ZOOM;
        }
        if self.min_zoom > self.max_zoom {
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        if !sane(self.thumbnail_size) {
            self.thumbnail_size = 64.0;
        }
        if !self.stage_padding.is_finite() || self.stage_padding < 0.0 {
            self.stage_padding = 0.0;
        }
        self
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "rgallery", "rGallery")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load from the platform config directory, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring settings at {}: {} [{}]", path.display(), e, e.error_code());
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GalleryError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        Ok(settings.normalized())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Subtree of the host document the gallery scans and watches.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Scope {
    #[default]
    Body,
    Element(NodeId),
    /// `#name` lookup; an unmatched selector falls back to the body.
    Selector(String),
}

pub type Callback = Box<dyn FnMut()>;
pub type ImageFilter = Box<dyn Fn(&ImageElement) -> bool>;

/// Everything a gallery instance is built from. Taken by value at
/// construction; later changes to the caller's copy have no effect.
#[derive(Default)]
pub struct ViewerConfig {
    pub scope: Scope,
    pub settings: GallerySettings,
    /// Explicit items. When set, the document is never scanned or watched.
    pub images: Option<Vec<ImageItem>>,
    pub filter: Option<ImageFilter>,
    pub on_open: Option<Callback>,
    pub on_close: Option<Callback>,
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_settings(mut self, settings: GallerySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_images(mut self, images: Vec<ImageItem>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&ImageElement) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn on_open(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_open = Some(Box::new(callback));
        self
    }

    pub fn on_close(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for ViewerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerConfig")
            .field("scope", &self.scope)
            .field("settings", &self.settings)
            .field("images", &self.images.as_ref().map(Vec::len))
            .field("filter", &self.filter.is_some())
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
