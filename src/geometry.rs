use egui::{Pos2, Rect, Vec2};

/// Euclidean distance between two contact points.
pub fn distance(a: Pos2, b: Pos2) -> f32 {
    (a - b).length()
}

pub fn midpoint(a: Pos2, b: Pos2) -> Pos2 {
    Pos2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Screen-space placement of the stage.
///
/// `rect` is the stage's border box on screen; `padding` is the inset of its
/// content box on every side. Stage-local coordinates are measured from the
/// top-left corner of the content box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageGeometry {
    pub rect: Rect,
    pub padding: f32,
}

impl Default for StageGeometry {
    fn default() -> Self {
        Self {
            rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(1280.0, 720.0)),
            padding: 0.0,
        }
    }
}

impl StageGeometry {
    pub fn new(rect: Rect, padding: f32) -> Self {
        Self { rect, padding }
    }

    pub fn content_size(&self) -> Vec2 {
        (self.rect.size() - Vec2::splat(self.padding * 2.0)).max(Vec2::ZERO)
    }

    pub fn to_local(&self, screen: Pos2) -> Pos2 {
        (screen - self.rect.min - Vec2::splat(self.padding)).to_pos2()
    }

    pub fn contains(&self, screen: Pos2) -> bool {
        self.rect.contains(screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_midpoint() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(3.0, 4.0);
        assert_eq!(distance(a, b), 5.0);
        assert_eq!(distance(b, a), 5.0);
        assert_eq!(midpoint(a, b), Pos2::new(1.5, 2.0));
    }

    #[test]
    fn test_stage_local_accounts_for_padding() {
        let stage = StageGeometry::new(Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(400.0, 300.0)), 10.0);
        assert_eq!(stage.to_local(Pos2::new(110.0, 60.0)), Pos2::ZERO);
        assert_eq!(stage.content_size(), Vec2::new(380.0, 280.0));
    }
}
