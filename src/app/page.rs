use super::GalleryApp;
use eframe::egui::{self, Color32, CornerRadius, Margin, Sense, Vec2};
use rgallery::ui::{fit_within, TextureProvider};
use rgallery::{NodeId, Viewer};
use std::time::Duration;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const TILE_LABEL_HEIGHT: f32 = 18.0;

/// Tiles the gallery can open show a zoom-in cursor.
fn tile_cursor(viewer: &Viewer, node: NodeId) -> Option<egui::CursorIcon> {
    viewer.registry().is_bound(node).then_some(egui::CursorIcon::ZoomIn)
}

impl GalleryApp {
    pub fn render_top_bar(&mut self, ctx: &egui::Context) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() > STATUS_TIMEOUT)
        {
            self.status_message = None;
        }

        egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::NONE
                    .fill(Color32::from_rgb(28, 28, 32))
                    .inner_margin(Margin::symmetric(8, 6)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match &self.current_folder {
                        Some(folder) => ui.label(folder.display().to_string()),
                        None => ui.label("No folder. Run: rgallery <folder>"),
                    };
                    ui.separator();
                    ui.label(format!("{} images", self.viewer.len()));
                    if let Some((msg, _)) = &self.status_message {
                        ui.separator();
                        ui.label(egui::RichText::new(msg).color(Color32::from_rgb(160, 160, 170)));
                    }
                });
            });
    }

    /// The host page: a wrapped grid of image tiles. Clicking a tile hands the
    /// element to the gallery.
    pub fn render_page(&mut self, ctx: &egui::Context) {
        let tile = self.settings.thumbnail_size * 2.0;
        let mut clicked: Option<NodeId> = None;

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(Color32::from_rgb(18, 18, 20)).inner_margin(Margin::same(12)))
            .show(ctx, |ui| {
                if self.entries.is_empty() {
                    ui.centered_and_justified(|ui| {
                        ui.label("No images to show");
                    });
                    return;
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.spacing_mut().item_spacing = Vec2::splat(10.0);
                        for (path, node) in &self.entries {
                            let source = path.to_string_lossy();
                            let (rect, response) =
                                ui.allocate_exact_size(Vec2::new(tile, tile + TILE_LABEL_HEIGHT), Sense::click());
                            let image_rect = egui::Rect::from_min_size(rect.min, Vec2::splat(tile));

                            ui.painter().rect_filled(image_rect, CornerRadius::same(6), Color32::from_gray(32));
                            if let Some(texture) = self.textures.thumbnail(&source) {
                                let fitted = egui::Rect::from_center_size(
                                    image_rect.center(),
                                    fit_within(texture.size, image_rect.size()),
                                );
                                egui::Image::from_texture(texture).paint_at(ui, fitted);
                            }
                            if response.hovered() {
                                if let Some(icon) = tile_cursor(&self.viewer, *node) {
                                    ctx.set_cursor_icon(icon);
                                }
                                ui.painter().rect_stroke(
                                    image_rect,
                                    CornerRadius::same(6),
                                    egui::Stroke::new(1.0, Color32::from_gray(140)),
                                    egui::StrokeKind::Inside,
                                );
                            }

                            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                            ui.painter().text(
                                egui::pos2(rect.center().x, rect.max.y),
                                egui::Align2::CENTER_BOTTOM,
                                name,
                                egui::FontId::proportional(12.0),
                                Color32::from_gray(170),
                            );

                            if response.clicked() {
                                clicked = Some(*node);
                            }
                        }
                    });
                });
            });

        if let Some(node) = clicked {
            if !self.viewer.handle_element_click(node) {
                self.set_status_message("That image is not part of the gallery yet".to_string());
            }
        }
    }
}
