use crate::gesture::HitTarget;
use egui::{Rect, Vec2};

pub const SHELL_MARGIN: f32 = 16.0;
pub const TOOLS_HEIGHT: f32 = 44.0;
const THUMBS_PADDING: f32 = 8.0;

/// Screen regions of the open gallery, recomputed every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub screen: Rect,
    pub shell: Rect,
    pub tools: Rect,
    pub stage: Rect,
    pub thumbs: Option<Rect>,
}

impl OverlayLayout {
    pub fn compute(screen: Rect, thumb_size: Option<f32>) -> Self {
        let shell = screen.shrink(SHELL_MARGIN);
        let tools = Rect::from_min_size(shell.min, Vec2::new(shell.width(), TOOLS_HEIGHT));

        let thumbs = thumb_size.map(|size| {
            let height = size + THUMBS_PADDING * 2.0;
            Rect::from_min_max(egui::pos2(shell.min.x, shell.max.y - height), shell.max)
        });
        let stage_bottom = thumbs.map_or(shell.max.y, |t| t.min.y);
        let stage = Rect::from_min_max(
            egui::pos2(shell.min.x, tools.max.y),
            egui::pos2(shell.max.x, stage_bottom.max(tools.max.y)),
        );

        Self {
            screen,
            shell,
            tools,
            stage,
            thumbs,
        }
    }

    /// What a press at `pos` lands on. `image` is the on-screen bounding box
    /// of the displayed image, if one is drawn.
    pub fn hit(&self, pos: egui::Pos2, image: Option<Rect>) -> HitTarget {
        if !self.shell.contains(pos) {
            return HitTarget::Backdrop;
        }
        if self.tools.contains(pos) || self.thumbs.is_some_and(|t| t.contains(pos)) {
            return HitTarget::Control;
        }
        if self.stage.contains(pos) {
            if image.is_some_and(|r| r.contains(pos)) {
                return HitTarget::Image;
            }
            return HitTarget::Stage;
        }
        HitTarget::Control
    }
}

/// Size of an image of `natural` size shown inside `bounds` without
/// upscaling, before any zoom.
pub fn fit_within(natural: Vec2, bounds: Vec2) -> Vec2 {
    if natural.x <= 0.0 || natural.y <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = (bounds.x / natural.x).min(bounds.y / natural.y).min(1.0).max(0.0);
    natural * scale
}

/// Axis-aligned box around a `size` rectangle centred at `center`, rotated
/// by `radians`.
pub fn rotated_bounds(center: egui::Pos2, size: Vec2, radians: f32) -> Rect {
    let (sin, cos) = radians.sin_cos();
    let w = (size.x * cos).abs() + (size.y * sin).abs();
    let h = (size.x * sin).abs() + (size.y * cos).abs();
    Rect::from_center_size(center, Vec2::new(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn screen() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), Vec2::new(1000.0, 800.0))
    }

    #[test]
    fn test_regions_stack_vertically() {
        let layout = OverlayLayout::compute(screen(), Some(64.0));
        assert_eq!(layout.tools.min.y, SHELL_MARGIN);
        assert_eq!(layout.stage.min.y, layout.tools.max.y);
        assert_eq!(layout.stage.max.y, layout.thumbs.unwrap().min.y);
        assert_eq!(layout.thumbs.unwrap().height(), 80.0);

        let bare = OverlayLayout::compute(screen(), None);
        assert_eq!(bare.stage.max.y, bare.shell.max.y);
    }

    #[test]
    fn test_hit_targets() {
        let layout = OverlayLayout::compute(screen(), Some(64.0));
        let image = Rect::from_center_size(layout.stage.center(), Vec2::splat(100.0));

        assert_eq!(layout.hit(pos2(4.0, 4.0), Some(image)), HitTarget::Backdrop);
        assert_eq!(layout.hit(pos2(500.0, 30.0), Some(image)), HitTarget::Control);
        assert_eq!(layout.hit(pos2(500.0, 760.0), Some(image)), HitTarget::Control);
        assert_eq!(layout.hit(layout.stage.center(), Some(image)), HitTarget::Image);
        assert_eq!(layout.hit(layout.stage.center(), None), HitTarget::Stage);
        assert_eq!(layout.hit(layout.stage.left_top() + Vec2::splat(5.0), Some(image)), HitTarget::Stage);
    }

    #[test]
    fn test_fit_never_upscales() {
        assert_eq!(fit_within(Vec2::new(200.0, 100.0), Vec2::new(800.0, 600.0)), Vec2::new(200.0, 100.0));
        assert_eq!(fit_within(Vec2::new(1600.0, 400.0), Vec2::new(800.0, 600.0)), Vec2::new(800.0, 200.0));
        assert_eq!(fit_within(Vec2::ZERO, Vec2::new(800.0, 600.0)), Vec2::ZERO);
    }

    #[test]
    fn test_quarter_turn_swaps_extent() {
        let r = rotated_bounds(pos2(0.0, 0.0), Vec2::new(200.0, 100.0), std::f32::consts::FRAC_PI_2);
        assert!((r.width() - 100.0).abs() < 1e-3);
        assert!((r.height() - 200.0).abs() < 1e-3);
    }
}
