use egui::{Pos2, Vec2};

pub const ZOOM_IN_FACTOR: f32 = 1.25;
pub const ZOOM_OUT_FACTOR: f32 = 0.8;
pub const ROTATE_STEP_DEGREES: f32 = 90.0;

/// Visual transform of the displayed image.
///
/// Applied as translate, then scale, then rotate: the pan is in untransformed
/// pixels and scale/rotation happen around the image's own centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub pan: Vec2,
    pub zoom: f32,
    /// Degrees, accumulated without wrapping.
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// CSS `transform` value for hosts that render through a style layer.
    pub fn css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({}) rotate({}deg)",
            self.pan.x, self.pan.y, self.zoom, self.rotation
        )
    }

    pub fn rotation_radians(&self) -> f32 {
        self.rotation.to_radians()
    }

    /// `round(zoom * 100)`, as shown by the zoom indicator.
    pub fn zoom_percent(&self) -> i32 {
        (self.zoom * 100.0).round() as i32
    }
}

/// Owns zoom, pan and rotation for the open session.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    state: Transform,
    min_zoom: f32,
    max_zoom: f32,
    stage_size: Vec2,
}

impl TransformEngine {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            state: Transform::default(),
            min_zoom,
            max_zoom,
            stage_size: Vec2::ZERO,
        }
    }

    /// Content size of the stage; its centre is where an unpanned image sits.
    pub fn set_stage_size(&mut self, size: Vec2) {
        self.stage_size = size;
    }

    pub fn stage_center(&self) -> Pos2 {
        (self.stage_size / 2.0).to_pos2()
    }

    pub fn transform(&self) -> Transform {
        self.state
    }

    pub fn zoom(&self) -> f32 {
        self.state.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.state.pan
    }

    pub fn rotation(&self) -> f32 {
        self.state.rotation
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    /// Clamp `target` into bounds and apply it. With an `origin` (stage-local),
    /// the image point under the origin stays under it after rescaling;
    /// without one, the pan is left alone.
    pub fn set_zoom(&mut self, target: f32, origin: Option<Pos2>) {
        if !target.is_finite() {
            return;
        }
        let next = target.clamp(self.min_zoom, self.max_zoom);
        let prev = self.state.zoom;
        self.state.zoom = next;

        if let Some(origin) = origin {
            let anchor = origin - self.stage_center() - self.state.pan;
            self.state.pan += anchor * (1.0 - next / prev);
        }
    }

    pub fn adjust_zoom(&mut self, multiplier: f32, origin: Option<Pos2>) {
        self.set_zoom(self.state.zoom * multiplier, origin);
    }

    pub fn rotate(&mut self, delta_degrees: f32) {
        self.state.rotation += delta_degrees;
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.state.pan = pan;
    }

    pub fn reset(&mut self, include_rotation: bool) {
        self.state.zoom = 1.0;
        self.state.pan = Vec2::ZERO;
        if include_rotation {
            self.state.rotation = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> TransformEngine {
        let mut e = TransformEngine::new(0.25, 8.0);
        e.set_stage_size(Vec2::new(800.0, 600.0));
        e
    }

    #[test]
    fn test_zoom_is_clamped_each_step() {
        let mut e = engine();
        e.adjust_zoom(100.0, None);
        assert_eq!(e.zoom(), 8.0);
        // Clamped at 8 first, so halving lands at 4 rather than 50
        e.adjust_zoom(0.5, None);
        assert_eq!(e.zoom(), 4.0);
        e.adjust_zoom(0.0001, None);
        assert_eq!(e.zoom(), 0.25);
    }

    #[test]
    fn test_centered_zoom_keeps_pan() {
        let mut e = engine();
        e.set_pan(Vec2::new(12.0, -7.0));
        e.adjust_zoom(ZOOM_IN_FACTOR, None);
        assert_eq!(e.pan(), Vec2::new(12.0, -7.0));
        assert_eq!(e.transform().zoom_percent(), 125);
    }

    #[test]
    fn test_zoom_at_center_keeps_pan() {
        let mut e = engine();
        e.adjust_zoom(2.0, Some(e.stage_center()));
        assert_eq!(e.pan(), Vec2::ZERO);
    }

    #[test]
    fn test_zoom_origin_formula() {
        let mut e = engine();
        // origin 100px right of centre, doubling zoom shifts the image left by 100px
        e.set_zoom(2.0, Some(Pos2::new(500.0, 300.0)));
        assert_eq!(e.pan(), Vec2::new(-100.0, 0.0));
    }

    #[test]
    fn test_reset() {
        let mut e = engine();
        e.adjust_zoom(3.0, Some(Pos2::new(10.0, 10.0)));
        e.rotate(90.0);
        e.reset(false);
        assert_eq!((e.zoom(), e.pan(), e.rotation()), (1.0, Vec2::ZERO, 90.0));
        e.rotate(45.0);
        e.reset(true);
        assert_eq!(e.transform(), Transform::default());
    }

    #[test]
    fn test_rotation_accumulates() {
        let mut e = engine();
        for _ in 0..4 {
            e.rotate(ROTATE_STEP_DEGREES);
        }
        assert_eq!(e.rotation(), 360.0);
        e.rotate(-450.0);
        assert_eq!(e.rotation(), -90.0);
    }

    #[test]
    fn test_css_order() {
        let mut e = engine();
        e.set_pan(Vec2::new(10.0, -5.5));
        e.set_zoom(1.5, None);
        e.rotate(90.0);
        assert_eq!(e.transform().css(), "translate(10px, -5.5px) scale(1.5) rotate(90deg)");
    }

    #[test]
    fn test_non_finite_target_is_ignored() {
        let mut e = engine();
        e.set_zoom(f32::NAN, None);
        assert_eq!(e.zoom(), 1.0);
    }

    proptest! {
        #[test]
        fn zoom_stays_in_bounds(steps in prop::collection::vec(0.01f32..50.0, 1..20)) {
            let mut e = engine();
            let mut expected = 1.0f32;
            for m in steps {
                e.adjust_zoom(m, None);
                expected = (expected * m).clamp(0.25, 8.0);
                prop_assert!((e.zoom() - expected).abs() <= expected * 1e-5);
                prop_assert!(e.zoom() >= 0.25 && e.zoom() <= 8.0);
            }
        }

        #[test]
        fn zoom_around_origin_is_reversible(
            f in 0.5f32..2.0,
            px in 0.0f32..800.0,
            py in 0.0f32..600.0,
            start_x in -200.0f32..200.0,
            start_y in -200.0f32..200.0,
        ) {
            let mut e = engine();
            e.set_pan(Vec2::new(start_x, start_y));
            let origin = Pos2::new(px, py);
            e.adjust_zoom(f, Some(origin));
            e.adjust_zoom(1.0 / f, Some(origin));
            prop_assert!((e.pan().x - start_x).abs() < 1e-2);
            prop_assert!((e.pan().y - start_y).abs() < 1e-2);
        }
    }
}
