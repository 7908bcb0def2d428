use super::layout::{fit_within, rotated_bounds, OverlayLayout};
use crate::geometry::StageGeometry;
use crate::gesture::{self, HitTarget, InputEvent, MouseButton, DRAG_THRESHOLD};
use crate::overlay::{Action, Overlay, Phase};
use crate::viewer::Viewer;
use egui::load::SizedTexture;
use egui::{Color32, CornerRadius, Pos2, Rect, Sense, Stroke, UiBuilder, Vec2};
use std::collections::BTreeMap;
use std::time::Instant;

const FADE_SECONDS: f32 = 0.25;
const LINE_HEIGHT_PX: f32 = 40.0;
const BUTTON_SIZE: f32 = 30.0;

/// Textures the renderer can draw for a given image source.
pub trait TextureProvider {
    fn texture(&self, source: &str) -> Option<SizedTexture>;
    fn thumbnail(&self, source: &str) -> Option<SizedTexture>;
    fn error(&self, _source: &str) -> Option<String> {
        None
    }
}

enum UiAction {
    Perform(Action),
    SelectThumb(usize),
    ThumbScroll(f32),
}

/// Draws the open gallery with egui and feeds it input.
#[derive(Debug, Default)]
pub struct GalleryView {
    touches: BTreeMap<u64, Pos2>,
    press: Option<(HitTarget, Pos2)>,
    tap: Option<(u64, HitTarget, Pos2)>,
    image_rect: Option<Rect>,
    thumb_scroll: f32,
}

impl GalleryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ctx: &egui::Context, viewer: &mut Viewer, textures: &dyn TextureProvider) {
        if !viewer.is_visible() {
            self.reset();
            return;
        }

        let settings = viewer.settings();
        let thumb_size = settings.show_thumbnails.then_some(settings.thumbnail_size);
        let padding = settings.stage_padding;
        let layout = OverlayLayout::compute(ctx.screen_rect(), thumb_size);
        viewer.set_stage(StageGeometry::new(layout.stage, padding));
        if let Some(thumbs) = layout.thumbs {
            viewer.set_thumb_viewport(thumbs.width());
        }

        let (events, hover) = ctx.input(|i| (i.events.clone(), i.pointer.hover_pos()));
        for event in &events {
            for input in self.translate(event, &layout, hover, viewer.wants_keyboard()) {
                viewer.handle_input(input);
            }
        }
        viewer.tick(Instant::now());

        let Some(overlay) = viewer.overlay() else {
            self.reset();
            return;
        };

        let shown = ctx.animate_bool_with_time(egui::Id::new("rgallery_backdrop"), overlay.phase == Phase::Active, FADE_SECONDS);
        let mut actions = Vec::new();

        egui::Area::new(egui::Id::new("rgallery_overlay"))
            .order(egui::Order::Foreground)
            .fixed_pos(layout.screen.min)
            .show(ctx, |ui| {
                // Swallow clicks so the page underneath stays inert
                ui.allocate_rect(layout.screen, Sense::click_and_drag());
                ui.painter()
                    .rect_filled(layout.screen, CornerRadius::ZERO, Color32::from_black_alpha((shown * 230.0) as u8));
                ui.multiply_opacity(shown);

                self.image_rect = draw_stage(ui, &layout, overlay, padding, textures);
                draw_tools(ui, layout.tools, overlay, &mut actions);
                if let (Some(rect), Some(strip)) = (layout.thumbs, overlay.thumbs.as_ref()) {
                    let offset = strip.scroll_offset();
                    let scroll_to = ((offset - self.thumb_scroll).abs() > 0.5).then_some(offset);
                    self.thumb_scroll = draw_thumbs(ui, rect, strip, scroll_to, textures, &mut actions);
                    actions.push(UiAction::ThumbScroll(self.thumb_scroll));
                }
            });

        if overlay.grabbing {
            ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if hover.is_some_and(|p| self.image_rect.is_some_and(|r| r.contains(p)) && layout.stage.contains(p)) {
            ctx.set_cursor_icon(egui::CursorIcon::Grab);
        }

        let leaving = overlay.phase == Phase::Leaving;
        let settled = overlay.phase == Phase::Active && shown >= 1.0;

        for action in actions {
            match action {
                UiAction::Perform(action) => viewer.perform(action),
                UiAction::SelectThumb(position) => viewer.select_thumbnail(position),
                UiAction::ThumbScroll(offset) => viewer.set_thumb_scroll(offset),
            }
        }

        if leaving && shown <= 0.0 {
            viewer.transition_end();
        }
        if !settled {
            ctx.request_repaint();
        }
    }

    fn reset(&mut self) {
        self.touches.clear();
        self.press = None;
        self.tap = None;
        self.image_rect = None;
        self.thumb_scroll = 0.0;
    }

    /// Turn one raw egui event into gallery input.
    fn translate(
        &mut self,
        event: &egui::Event,
        layout: &OverlayLayout,
        hover: Option<Pos2>,
        keyboard: bool,
    ) -> Vec<InputEvent> {
        match event {
            // Touch input also arrives as emulated pointer events
            egui::Event::PointerButton { .. } | egui::Event::PointerMoved(_) if !self.touches.is_empty() => Vec::new(),
            egui::Event::PointerButton {
                pos,
                button,
                pressed: true,
                ..
            } => {
                let target = layout.hit(*pos, self.image_rect);
                let button = match button {
                    egui::PointerButton::Primary => MouseButton::Primary,
                    egui::PointerButton::Middle => MouseButton::Middle,
                    _ => MouseButton::Secondary,
                };
                if button == MouseButton::Primary {
                    self.press = Some((target, *pos));
                }
                vec![InputEvent::MouseDown {
                    pos: *pos,
                    button,
                    target,
                }]
            }
            egui::Event::PointerButton {
                pos, pressed: false, ..
            } => {
                let mut out = vec![InputEvent::MouseUp { pos: *pos }];
                if let Some((target, _)) = self.press.take() {
                    if layout.hit(*pos, self.image_rect) == target {
                        out.push(InputEvent::Click { target });
                    }
                }
                out
            }
            egui::Event::PointerMoved(pos) => vec![InputEvent::MouseMove { pos: *pos }],
            egui::Event::MouseWheel { unit, delta, .. } => {
                let Some(pos) = hover.filter(|p| layout.stage.contains(*p)) else {
                    return Vec::new();
                };
                let scale = match unit {
                    egui::MouseWheelUnit::Point => 1.0,
                    egui::MouseWheelUnit::Line => LINE_HEIGHT_PX,
                    egui::MouseWheelUnit::Page => layout.stage.height(),
                };
                // egui reports content motion; wheel deltas are positive downwards
                vec![InputEvent::Wheel {
                    delta_y: -delta.y * scale,
                    pos,
                }]
            }
            egui::Event::Touch { id, phase, pos, .. } => {
                let target = layout.hit(*pos, self.image_rect);
                let started_here = matches!(target, HitTarget::Image | HitTarget::Stage);
                match phase {
                    egui::TouchPhase::Start if started_here || !self.touches.is_empty() => {
                        // A second finger turns the gesture into a pinch
                        self.tap = self.touches.is_empty().then_some((id.0, target, *pos));
                        self.touches.insert(id.0, *pos);
                        vec![InputEvent::TouchStart { touches: self.points() }]
                    }
                    egui::TouchPhase::Move if self.touches.contains_key(&id.0) => {
                        if self
                            .tap
                            .is_some_and(|(tap_id, _, start)| tap_id == id.0 && (*pos - start).length() > DRAG_THRESHOLD)
                        {
                            self.tap = None;
                        }
                        self.touches.insert(id.0, *pos);
                        vec![InputEvent::TouchMove { touches: self.points() }]
                    }
                    egui::TouchPhase::End | egui::TouchPhase::Cancel if self.touches.remove(&id.0).is_some() => {
                        let mut out = vec![InputEvent::TouchEnd { touches: self.points() }];
                        let tap = self.tap.take();
                        if let Some((tap_id, tap_target, start)) = tap {
                            let still = (*pos - start).length() <= DRAG_THRESHOLD;
                            if *phase == egui::TouchPhase::End && tap_id == id.0 && still && target == tap_target {
                                out.push(InputEvent::Click { target: tap_target });
                            }
                        }
                        out
                    }
                    _ => Vec::new(),
                }
            }
            egui::Event::Key { key, pressed: true, .. } if keyboard => {
                vec![InputEvent::Key(map_key(*key))]
            }
            _ => Vec::new(),
        }
    }

    fn points(&self) -> Vec<Pos2> {
        self.touches.values().copied().collect()
    }
}

fn map_key(key: egui::Key) -> gesture::Key {
    match key {
        egui::Key::Escape => gesture::Key::Escape,
        egui::Key::ArrowLeft => gesture::Key::ArrowLeft,
        egui::Key::ArrowRight => gesture::Key::ArrowRight,
        egui::Key::Plus => gesture::Key::Plus,
        egui::Key::Equals => gesture::Key::Equals,
        egui::Key::Minus => gesture::Key::Minus,
        egui::Key::Num0 => gesture::Key::Zero,
        _ => gesture::Key::Other,
    }
}

/// Paint the displayed image and return its on-screen bounds.
fn draw_stage(
    ui: &mut egui::Ui,
    layout: &OverlayLayout,
    overlay: &Overlay,
    padding: f32,
    textures: &dyn TextureProvider,
) -> Option<Rect> {
    let stage = layout.stage;
    let content = stage.shrink(padding);
    let painter = ui.painter_at(stage);
    let image = overlay.image.as_ref()?;

    let Some(texture) = textures.texture(&image.source) else {
        let message = match textures.error(&image.source) {
            Some(error) => format!("Could not load {}: {}", image.alt, error),
            None => format!("Loading {}…", image.alt),
        };
        painter.text(
            content.center(),
            egui::Align2::CENTER_CENTER,
            message,
            egui::FontId::proportional(16.0),
            Color32::from_rgb(180, 180, 180),
        );
        return None;
    };

    let transform = overlay.transform;
    let size = fit_within(texture.size, content.size()) * transform.zoom;
    let center = content.center() + transform.pan;
    let rect = Rect::from_center_size(center, size);

    let mut child = ui.new_child(UiBuilder::new().max_rect(stage));
    child.set_clip_rect(stage);
    egui::Image::from_texture(texture)
        .rotate(transform.rotation_radians(), Vec2::splat(0.5))
        .paint_at(&child, rect);

    if !image.title.is_empty() {
        painter.text(
            egui::pos2(stage.center().x, stage.max.y - 6.0),
            egui::Align2::CENTER_BOTTOM,
            &image.title,
            egui::FontId::proportional(14.0),
            Color32::from_rgb(220, 220, 220),
        );
    }
    Some(rotated_bounds(center, size, transform.rotation_radians()))
}

fn draw_tools(ui: &mut egui::Ui, rect: Rect, overlay: &Overlay, actions: &mut Vec<UiAction>) {
    let mut button = |ui: &mut egui::Ui, action: Action| {
        let response = ui
            .add(egui::Button::new(action.glyph()).min_size(Vec2::splat(BUTTON_SIZE)))
            .on_hover_text(action.label());
        if response.clicked() {
            actions.push(UiAction::Perform(action));
        }
    };

    ui.scope_builder(UiBuilder::new().max_rect(rect), |ui| {
        ui.horizontal_centered(|ui| {
            ui.label(egui::RichText::new(&overlay.zoom_label).monospace());
            ui.separator();
            ui.label(&overlay.counter);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                button(ui, Action::Close);
                ui.separator();
                for action in Action::CONTROLS.iter().rev() {
                    button(ui, *action);
                }
                ui.separator();
                button(ui, Action::Next);
                button(ui, Action::Prev);
            });
        });
    });
}

/// Draw the strip and return the scroll offset egui ended up with.
fn draw_thumbs(
    ui: &mut egui::Ui,
    rect: Rect,
    strip: &crate::overlay::ThumbStrip,
    scroll_to: Option<f32>,
    textures: &dyn TextureProvider,
    actions: &mut Vec<UiAction>,
) -> f32 {
    let size = strip.thumb_size();
    let mut scroll = egui::ScrollArea::horizontal().id_salt("rgallery_thumbs");
    if let Some(offset) = scroll_to {
        scroll = scroll.horizontal_scroll_offset(offset);
    }

    let output = ui.scope_builder(UiBuilder::new().max_rect(rect.shrink2(Vec2::new(0.0, 8.0))), |ui| {
        scroll.show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = strip.pitch() - size;
                for (position, thumb) in strip.iter().enumerate() {
                    let (cell, response) = ui.allocate_exact_size(Vec2::splat(size), Sense::click());
                    match textures.thumbnail(&thumb.source) {
                        Some(texture) => {
                            let fitted = Rect::from_center_size(cell.center(), fit_within(texture.size, cell.size()));
                            egui::Image::from_texture(texture).paint_at(ui, fitted);
                        }
                        None => {
                            ui.painter().rect_filled(cell, CornerRadius::same(4), Color32::from_gray(40));
                        }
                    }
                    let stroke = if strip.is_active(position) {
                        Stroke::new(2.0, Color32::WHITE)
                    } else {
                        Stroke::new(1.0, Color32::from_gray(70))
                    };
                    ui.painter().rect_stroke(cell, CornerRadius::same(4), stroke, egui::StrokeKind::Inside);

                    let response = if thumb.alt.is_empty() {
                        response
                    } else {
                        response.on_hover_text(&thumb.alt)
                    };
                    if response.clicked() {
                        actions.push(UiAction::SelectThumb(position));
                    }
                }
            });
        })
    });
    output.inner.state.offset.x
}
