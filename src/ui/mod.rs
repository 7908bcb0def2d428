//! egui rendering of the open gallery.

mod gallery_view;
mod layout;

pub use gallery_view::{GalleryView, TextureProvider};
pub use layout::{fit_within, rotated_bounds, OverlayLayout};
