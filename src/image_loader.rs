use crate::errors::{GalleryError, Result};
use image::DynamicImage;
use std::path::Path;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp"];

/// Largest edge uploaded as a full-size texture.
pub const MAX_TEXTURE_EDGE: u32 = 4096;

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(GalleryError::FileNotFound { path: path.to_path_buf() });
    }
    image::open(path).map_err(|e| GalleryError::ImageLoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Decode for display, downscaled so neither edge exceeds [`MAX_TEXTURE_EDGE`].
pub fn load_display_image(path: &Path) -> Result<DynamicImage> {
    let image = load_image(path)?;
    if image.width() > MAX_TEXTURE_EDGE || image.height() > MAX_TEXTURE_EDGE {
        Ok(image.resize(MAX_TEXTURE_EDGE, MAX_TEXTURE_EDGE, image::imageops::FilterType::Triangle))
    } else {
        Ok(image)
    }
}

pub fn load_thumbnail(path: &Path, max_size: u32) -> Result<DynamicImage> {
    let image = load_image(path)?;
    Ok(image.thumbnail(max_size, max_size))
}

pub fn to_color_image(image: &DynamicImage) -> egui::ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    let rgba = image.to_rgba8();
    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use tempfile::tempdir;

    fn write_png(path: &Path, w: u32, h: u32) {
        let buf: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_pixel(w, h, Rgba([200, 10, 10, 255]));
        buf.save(path).unwrap();
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_image(Path::new("a/b/photo.JPG")));
        assert!(is_supported_image(Path::new("x.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_corrupt_file_is_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        let err = load_image(&path).unwrap_err();
        assert_eq!(err.error_code(), "IMAGE_LOAD_ERROR");
    }

    #[test]
    fn test_thumbnail_and_texture_conversion() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wide.png");
        write_png(&path, 40, 20);

        let thumb = load_thumbnail(&path, 10).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (10, 5));

        let color = to_color_image(&load_display_image(&path).unwrap());
        assert_eq!(color.size, [40, 20]);
    }
}
