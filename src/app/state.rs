use super::image_loading::TextureStore;
use eframe::egui;
use image::DynamicImage;
use rgallery::settings::Scope;
use rgallery::ui::GalleryView;
use rgallery::{Document, GallerySettings, NodeId, Viewer, ViewerConfig};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Instant;

pub const GALLERY_ID: &str = "gallery";

pub enum LoaderMessage {
    ImageLoaded(String, DynamicImage),
    ThumbnailLoaded(String, DynamicImage),
    LoadError(String, String),
}

pub struct GalleryApp {
    pub settings: GallerySettings,

    // Host page the gallery scans
    pub document: Document,
    pub gallery_root: NodeId,
    pub entries: Vec<(PathBuf, NodeId)>,
    pub current_folder: Option<PathBuf>,

    pub viewer: Viewer,
    pub view: GalleryView,
    pub textures: TextureStore,

    // Async loading
    pub loader_tx: Sender<LoaderMessage>,
    pub loader_rx: Receiver<LoaderMessage>,

    // Folder watch
    pub fs_watcher: Option<notify::RecommendedWatcher>,
    pub fs_rx: Option<Receiver<notify::Result<notify::Event>>>,

    pub status_message: Option<(String, Instant)>,
    pub ctx: egui::Context,
}

impl GalleryApp {
    pub fn new(cc: &eframe::CreationContext<'_>, folder: Option<PathBuf>) -> Self {
        configure_style(&cc.egui_ctx);

        let (tx, rx) = channel();
        let settings = GallerySettings::load();

        let document = Document::new();
        let gallery_root = document.create_container(Some(GALLERY_ID));
        document.append(document.body(), gallery_root);

        let config = ViewerConfig::new()
            .with_scope(Scope::Selector(format!("#{GALLERY_ID}")))
            .with_settings(settings.clone())
            .on_open(|| log::debug!("gallery overlay shown"))
            .on_close(|| log::debug!("gallery overlay hidden"));
        let viewer = rgallery::create(config, &document);

        let mut app = Self {
            settings,
            document,
            gallery_root,
            entries: Vec::new(),
            current_folder: None,
            viewer,
            view: GalleryView::new(),
            textures: TextureStore::default(),
            loader_tx: tx,
            loader_rx: rx,
            fs_watcher: None,
            fs_rx: None,
            status_message: None,
            ctx: cc.egui_ctx.clone(),
        };

        if let Some(folder) = folder {
            if folder.is_dir() {
                app.load_folder(folder);
            } else {
                app.set_status_message(format!("Not a folder: {}", folder.display()));
            }
        }
        app
    }

    pub fn set_status_message(&mut self, msg: String) {
        log::info!("{msg}");
        self.status_message = Some((msg, Instant::now()));
    }
}

fn configure_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    style.visuals.window_shadow = egui::epaint::Shadow::NONE;
    style.visuals.popup_shadow = egui::epaint::Shadow::NONE;
    ctx.set_style(style);
}
