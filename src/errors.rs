use std::path::PathBuf;
use thiserror::Error;

/// Failures of the ambient surfaces around the gallery: settings files, the
/// demo image loader and the folder watcher. Gallery operations themselves
/// never fail; misuse is a no-op.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Failed to load image '{path}': {message}")]
    ImageLoadError { path: PathBuf, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Settings error: {message}")]
    SettingsError { message: String },

    #[error("Folder watch error: {source}")]
    WatchError {
        #[from]
        source: notify::Error,
    },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, GalleryError>;

impl GalleryError {
    /// Returns an error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GalleryError::ImageLoadError { .. } => "IMAGE_LOAD_ERROR",
            GalleryError::FileNotFound { .. } => "FILE_NOT_FOUND",
            GalleryError::SettingsError { .. } => "SETTINGS_ERROR",
            GalleryError::WatchError { .. } => "WATCH_ERROR",
            GalleryError::IoError { .. } => "IO_ERROR",
            GalleryError::JsonError { .. } => "JSON_ERROR",
        }
    }

    /// Returns true if retrying the operation may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GalleryError::FileNotFound { .. } | GalleryError::IoError { .. } | GalleryError::WatchError { .. }
        )
    }
}
