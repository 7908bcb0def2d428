use super::{GalleryApp, LoaderMessage};
use eframe::egui::{self, load::SizedTexture, TextureHandle};
use rgallery::image_loader;
use rgallery::ui::TextureProvider;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

/// Full-size textures kept resident at once.
const FULL_TEXTURE_BUDGET: usize = 8;
const MAX_THUMBNAIL_REQUESTS: usize = 10;

#[derive(Default)]
pub struct TextureStore {
    full: HashMap<String, TextureHandle>,
    full_order: VecDeque<String>,
    thumbs: HashMap<String, TextureHandle>,
    full_requests: HashSet<String>,
    thumb_requests: HashSet<String>,
    errors: HashMap<String, String>,
}

impl TextureStore {
    pub fn forget(&mut self, source: &str) {
        self.full.remove(source);
        self.full_order.retain(|s| s != source);
        self.thumbs.remove(source);
        self.errors.remove(source);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn insert_full(&mut self, source: String, texture: TextureHandle) {
        self.full_requests.remove(&source);
        self.full_order.retain(|s| *s != source);
        self.full_order.push_back(source.clone());
        self.full.insert(source, texture);
        while self.full_order.len() > FULL_TEXTURE_BUDGET {
            if let Some(oldest) = self.full_order.pop_front() {
                tracing::debug!(source = %oldest, "evicted full texture");
                self.full.remove(&oldest);
            }
        }
    }
}

impl TextureProvider for TextureStore {
    fn texture(&self, source: &str) -> Option<SizedTexture> {
        self.full.get(source).map(SizedTexture::from_handle)
    }

    fn thumbnail(&self, source: &str) -> Option<SizedTexture> {
        self.thumbs.get(source).map(SizedTexture::from_handle)
    }

    fn error(&self, source: &str) -> Option<String> {
        self.errors.get(source).cloned()
    }
}

impl GalleryApp {
    pub fn spawn_loader<F>(&self, f: F)
    where
        F: FnOnce() -> LoaderMessage + Send + 'static,
    {
        let tx = self.loader_tx.clone();
        let ctx = self.ctx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(f());
            ctx.request_repaint();
        });
    }

    pub fn request_full(&mut self, source: &str) {
        let store = &mut self.textures;
        if store.full.contains_key(source) || store.errors.contains_key(source) || !store.full_requests.insert(source.to_string()) {
            return;
        }
        tracing::trace!(source, "full texture miss");
        let source = source.to_string();
        self.spawn_loader(move || match image_loader::load_display_image(Path::new(&source)) {
            Ok(image) => LoaderMessage::ImageLoaded(source, image),
            Err(e) => LoaderMessage::LoadError(source, e.to_string()),
        });
    }

    pub fn request_thumbnail(&mut self, source: &str) {
        let store = &mut self.textures;
        if store.thumbs.contains_key(source)
            || store.errors.contains_key(source)
            || store.thumb_requests.len() >= MAX_THUMBNAIL_REQUESTS
            || !store.thumb_requests.insert(source.to_string())
        {
            return;
        }
        let source = source.to_string();
        let size = (self.settings.thumbnail_size * 2.0) as u32;
        self.spawn_loader(move || match image_loader::load_thumbnail(Path::new(&source), size) {
            Ok(image) => LoaderMessage::ThumbnailLoaded(source, image),
            Err(e) => LoaderMessage::LoadError(source, e.to_string()),
        });
    }

    /// Current image plus its neighbours, and thumbnails for the whole page.
    pub fn request_visible_textures(&mut self) {
        let wanted: Vec<String> = match self.viewer.index() {
            Some(index) => (index.saturating_sub(1)..=index + 1)
                .filter_map(|i| self.viewer.registry().get(i))
                .map(|item| item.source.clone())
                .collect(),
            None => Vec::new(),
        };
        for source in wanted {
            self.request_full(&source);
        }

        let pending: Vec<String> = self
            .entries
            .iter()
            .map(|(path, _)| path.to_string_lossy().to_string())
            .filter(|s| !self.textures.thumbs.contains_key(s))
            .collect();
        for source in pending {
            self.request_thumbnail(&source);
        }
    }

    pub fn process_loader_messages(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.loader_rx.try_recv() {
            match msg {
                LoaderMessage::ImageLoaded(source, image) => {
                    let texture = ctx.load_texture(
                        format!("full_{source}"),
                        image_loader::to_color_image(&image),
                        egui::TextureOptions::LINEAR,
                    );
                    self.textures.insert_full(source, texture);
                }
                LoaderMessage::ThumbnailLoaded(source, thumb) => {
                    let texture = ctx.load_texture(
                        format!("thumb_{source}"),
                        image_loader::to_color_image(&thumb),
                        egui::TextureOptions::LINEAR,
                    );
                    self.textures.thumb_requests.remove(&source);
                    self.textures.thumbs.insert(source, texture);
                }
                LoaderMessage::LoadError(source, error) => {
                    tracing::warn!(source = %source, error = %error, "failed to load image");
                    self.textures.full_requests.remove(&source);
                    self.textures.thumb_requests.remove(&source);
                    self.textures.errors.insert(source, error);
                }
            }
        }
    }
}
