//! rGallery: a modal image gallery over a retained host document.
//!
//! Images are discovered under a scope of a [`Document`] (or passed
//! explicitly), kept in sync as the document changes, and shown in an
//! overlay with zoom, pan, rotation, keyboard navigation and a thumbnail
//! strip. [`ui::GalleryView`] draws the overlay with egui.

pub mod document;
pub mod errors;
pub mod geometry;
pub mod gesture;
pub mod image_loader;
pub mod listeners;
pub mod logging;
pub mod overlay;
pub mod registry;
pub mod settings;
pub mod transform;
pub mod ui;
pub mod viewer;

#[cfg(test)]
mod tests;

pub use document::{ChangeSource, Document, ImageAttrs, ImageElement, Mutation, MutationWatch, NodeId};
pub use errors::{GalleryError, Result};
pub use overlay::{Action, Overlay, Phase};
pub use registry::{ImageItem, Registry};
pub use settings::{GallerySettings, Scope, ViewerConfig};
pub use transform::Transform;
pub use viewer::Viewer;

/// Build a gallery over `document` and start tracking its images.
pub fn create(config: ViewerConfig, document: &Document) -> Viewer {
    Viewer::new(config, document)
}
