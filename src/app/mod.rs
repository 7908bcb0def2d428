pub mod file_ops;
pub mod image_loading;
pub mod page;
pub mod state;

pub use state::*;

use eframe::egui;
use std::time::Instant;

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_loader_messages(ctx);
        self.process_fs_events();
        self.viewer.sync();
        self.viewer.tick(Instant::now());
        self.request_visible_textures();

        self.render_top_bar(ctx);
        self.render_page(ctx);
        self.view.show(ctx, &mut self.viewer, &self.textures);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.viewer.destroy();
        let Some(path) = rgallery::GallerySettings::config_path() else {
            return;
        };
        if !path.exists() {
            if let Err(e) = self.settings.save_to(&path) {
                log::warn!("Could not write default settings: {e}");
            }
        }
    }
}
