//! Pointer, touch, wheel and keyboard input reconciled into one transform.

use crate::geometry::{distance, midpoint, StageGeometry};
use crate::transform::{TransformEngine, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use egui::{Pos2, Vec2};

/// Movement past this many pixels on either axis turns a press into a drag.
pub const DRAG_THRESHOLD: f32 = 3.0;
/// Wheel deltas are clamped to this magnitude before mapping to a step.
pub const WHEEL_DELTA_LIMIT: f32 = 100.0;
const WHEEL_STEP_SCALE: f32 = 0.25;

/// What the pointer is over when a press or click happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The displayed image.
    Image,
    /// Empty stage area around the image.
    Stage,
    /// A button or other control.
    Control,
    /// The dimmed area outside the shell.
    Backdrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Plus,
    Equals,
    Minus,
    Zero,
    Other,
}

impl Key {
    /// Map a DOM-style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "+" => Key::Plus,
            "=" => Key::Equals,
            "-" => Key::Minus,
            "0" => Key::Zero,
            _ => Key::Other,
        }
    }
}

/// Raw input delivered to an open gallery. Positions are screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseDown {
        pos: Pos2,
        button: MouseButton,
        target: HitTarget,
    },
    /// Window-level; drags keep tracking outside the stage.
    MouseMove { pos: Pos2 },
    /// Window-level; ends a drag wherever the button is released.
    MouseUp { pos: Pos2 },
    Click { target: HitTarget },
    Wheel { delta_y: f32, pos: Pos2 },
    /// Touch lists hold every contact still on the surface after the change.
    TouchStart { touches: Vec<Pos2> },
    TouchMove { touches: Vec<Pos2> },
    TouchEnd { touches: Vec<Pos2> },
    Key(Key),
}

/// Follow-up the gallery performs after a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    /// Transform or grab state changed.
    Render,
    Close,
    Next,
    Prev,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchState {
    /// Finger distance at the previous sample.
    last_distance: f32,
    /// Stage-local midpoint taken when the pinch began.
    origin: Pos2,
}

#[derive(Debug, Clone, Default)]
pub struct GestureController {
    stage: StageGeometry,
    panning: bool,
    pointer_start: Pos2,
    pan_start: Vec2,
    dragged: bool,
    pinch: Option<PinchState>,
}

impl GestureController {
    pub fn new(stage: StageGeometry) -> Self {
        Self {
            stage,
            ..Default::default()
        }
    }

    pub fn set_stage(&mut self, stage: StageGeometry) {
        self.stage = stage;
    }

    pub fn stage(&self) -> StageGeometry {
        self.stage
    }

    pub fn is_panning(&self) -> bool {
        self.panning
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// True once the current press moved past the drag threshold.
    pub fn was_dragged(&self) -> bool {
        self.dragged
    }

    /// Drop any in-flight pan or pinch.
    pub fn cancel(&mut self) {
        self.panning = false;
        self.pinch = None;
        self.dragged = false;
    }

    fn begin_pan(&mut self, pos: Pos2, engine: &TransformEngine) {
        self.panning = true;
        self.pan_start = engine.pan();
        self.pointer_start = pos;
        self.dragged = false;
    }

    fn track_pan(&mut self, pos: Pos2, engine: &mut TransformEngine) {
        let delta = pos - self.pointer_start;
        engine.set_pan(self.pan_start + delta);
        if delta.x.abs() > DRAG_THRESHOLD || delta.y.abs() > DRAG_THRESHOLD {
            self.dragged = true;
        }
    }

    pub fn mouse_down(&mut self, pos: Pos2, button: MouseButton, target: HitTarget, engine: &TransformEngine) -> Command {
        if button != MouseButton::Primary || !matches!(target, HitTarget::Image | HitTarget::Stage) {
            return Command::None;
        }
        self.begin_pan(pos, engine);
        Command::Render
    }

    pub fn mouse_move(&mut self, pos: Pos2, engine: &mut TransformEngine) -> Command {
        if !self.panning {
            return Command::None;
        }
        self.track_pan(pos, engine);
        Command::Render
    }

    pub fn mouse_up(&mut self) -> Command {
        if !self.panning {
            return Command::None;
        }
        self.panning = false;
        Command::Render
    }

    /// A click on the image closes unless the press turned into a drag; a
    /// click on bare stage always closes.
    pub fn click(&self, target: HitTarget) -> Command {
        match target {
            HitTarget::Image if !self.dragged => Command::Close,
            HitTarget::Stage => Command::Close,
            _ => Command::None,
        }
    }

    /// Every wheel event zooms, anchored at the cursor.
    pub fn wheel(&mut self, delta_y: f32, pos: Pos2, engine: &mut TransformEngine) -> Command {
        if !delta_y.is_finite() {
            return Command::None;
        }
        engine.adjust_zoom(wheel_zoom_factor(delta_y), Some(self.stage.to_local(pos)));
        Command::Render
    }

    pub fn touch_start(&mut self, touches: &[Pos2], engine: &TransformEngine) -> Command {
        match touches {
            [one] => {
                self.pinch = None;
                self.begin_pan(*one, engine);
                Command::Render
            }
            [a, b] => {
                self.panning = false;
                self.pinch = Some(PinchState {
                    last_distance: distance(*a, *b),
                    origin: self.stage.to_local(midpoint(*a, *b)),
                });
                Command::Render
            }
            _ => Command::None,
        }
    }

    pub fn touch_move(&mut self, touches: &[Pos2], engine: &mut TransformEngine) -> Command {
        match touches {
            [one] if self.panning => {
                self.track_pan(*one, engine);
                Command::Render
            }
            [a, b] => {
                let dist = distance(*a, *b);
                let Some(pinch) = self.pinch.as_mut() else {
                    self.panning = false;
                    self.pinch = Some(PinchState {
                        last_distance: dist,
                        origin: self.stage.to_local(midpoint(*a, *b)),
                    });
                    return Command::None;
                };
                if pinch.last_distance > f32::EPSILON {
                    let factor = dist / pinch.last_distance;
                    engine.set_zoom(engine.zoom() * factor, Some(pinch.origin));
                }
                // Re-sampled every move so zoom integrates step by step
                pinch.last_distance = dist;
                Command::Render
            }
            _ => Command::None,
        }
    }

    pub fn touch_end(&mut self, touches: &[Pos2]) -> Command {
        let was_active = self.panning || self.pinch.is_some();
        self.panning = false;
        if touches.len() < 2 {
            self.pinch = None;
        }
        if was_active {
            Command::Render
        } else {
            Command::None
        }
    }

    pub fn key(&mut self, key: Key, engine: &mut TransformEngine) -> Command {
        match key {
            Key::Escape => Command::Close,
            Key::ArrowRight => Command::Next,
            Key::ArrowLeft => Command::Prev,
            Key::Plus | Key::Equals => {
                engine.adjust_zoom(ZOOM_IN_FACTOR, None);
                Command::Render
            }
            Key::Minus => {
                engine.adjust_zoom(ZOOM_OUT_FACTOR, None);
                Command::Render
            }
            Key::Zero => {
                engine.reset(false);
                Command::Render
            }
            Key::Other => Command::None,
        }
    }
}

/// Zoom multiplier for a wheel delta. Negative deltas zoom in. The mapping is
/// symmetric and never reaches zero.
pub fn wheel_zoom_factor(delta_y: f32) -> f32 {
    let step = (delta_y / WHEEL_DELTA_LIMIT).clamp(-1.0, 1.0);
    if step < 0.0 {
        1.0 - step * WHEEL_STEP_SCALE
    } else {
        1.0 / (1.0 + step * WHEEL_STEP_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Rect;

    fn setup() -> (GestureController, TransformEngine) {
        let stage = StageGeometry::new(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)), 0.0);
        let mut engine = TransformEngine::new(0.25, 8.0);
        engine.set_stage_size(stage.content_size());
        (GestureController::new(stage), engine)
    }

    fn drag(g: &mut GestureController, e: &mut TransformEngine, by: Vec2) {
        let start = Pos2::new(400.0, 300.0);
        g.mouse_down(start, MouseButton::Primary, HitTarget::Image, e);
        g.mouse_move(start + by, e);
        g.mouse_up();
    }

    #[test]
    fn test_small_move_still_clicks() {
        let (mut g, mut e) = setup();
        drag(&mut g, &mut e, Vec2::new(2.0, 0.0));
        assert_eq!(g.click(HitTarget::Image), Command::Close);
    }

    #[test]
    fn test_drag_suppresses_image_click_only() {
        let (mut g, mut e) = setup();
        drag(&mut g, &mut e, Vec2::new(5.0, 0.0));
        assert_eq!(e.pan(), Vec2::new(5.0, 0.0));
        assert_eq!(g.click(HitTarget::Image), Command::None);
        // Bare stage closes regardless
        assert_eq!(g.click(HitTarget::Stage), Command::Close);
        assert_eq!(g.click(HitTarget::Control), Command::None);
    }

    #[test]
    fn test_pan_continues_from_snapshot() {
        let (mut g, mut e) = setup();
        drag(&mut g, &mut e, Vec2::new(10.0, 20.0));
        drag(&mut g, &mut e, Vec2::new(-4.0, 5.0));
        assert_eq!(e.pan(), Vec2::new(6.0, 25.0));
        assert!(!g.is_panning());
    }

    #[test]
    fn test_secondary_button_does_not_pan() {
        let (mut g, mut e) = setup();
        assert_eq!(g.mouse_down(Pos2::ZERO, MouseButton::Secondary, HitTarget::Stage, &e), Command::None);
        assert_eq!(g.mouse_move(Pos2::new(50.0, 50.0), &mut e), Command::None);
        assert_eq!(e.pan(), Vec2::ZERO);
    }

    #[test]
    fn test_wheel_factor_is_symmetric() {
        assert_eq!(wheel_zoom_factor(-100.0), 1.25);
        assert_eq!(wheel_zoom_factor(100.0), 0.8);
        assert_eq!(wheel_zoom_factor(-5000.0), 1.25);
        assert_eq!(wheel_zoom_factor(0.0), 1.0);
        assert!((wheel_zoom_factor(-50.0) * wheel_zoom_factor(50.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_zooms_around_cursor() {
        let (mut g, mut e) = setup();
        g.wheel(-100.0, Pos2::new(400.0, 300.0), &mut e);
        assert_eq!(e.zoom(), 1.25);
        assert_eq!(e.pan(), Vec2::ZERO);

        g.wheel(100.0, Pos2::new(600.0, 300.0), &mut e);
        assert!((e.zoom() - 1.0).abs() < 1e-6);
        assert!(e.pan().x > 0.0);
    }

    #[test]
    fn test_pinch_integrates_multiplicatively() {
        let (mut g, mut e) = setup();
        let centre = Pos2::new(400.0, 300.0);
        let finger = |half: f32| vec![centre - Vec2::new(half, 0.0), centre + Vec2::new(half, 0.0)];

        g.touch_start(&finger(50.0), &e);
        assert!(g.is_pinching());
        g.touch_move(&finger(55.0), &mut e);
        g.touch_move(&finger(60.5), &mut e);
        g.touch_move(&finger(66.55), &mut e);
        assert!((e.zoom() - 1.331).abs() < 1e-3);
        // Midpoint is the stage centre, so the image does not shift
        assert!(e.pan().length() < 1e-3);

        g.touch_end(&finger(66.55)[..1]);
        assert!(!g.is_pinching());
    }

    #[test]
    fn test_single_touch_pans() {
        let (mut g, mut e) = setup();
        g.touch_start(&[Pos2::new(100.0, 100.0)], &e);
        g.touch_move(&[Pos2::new(130.0, 90.0)], &mut e);
        assert_eq!(e.pan(), Vec2::new(30.0, -10.0));
        g.touch_end(&[]);
        g.touch_move(&[Pos2::new(200.0, 200.0)], &mut e);
        assert_eq!(e.pan(), Vec2::new(30.0, -10.0));
    }

    #[test]
    fn test_keyboard_bindings() {
        let (mut g, mut e) = setup();
        assert_eq!(g.key(Key::from_name("Escape"), &mut e), Command::Close);
        assert_eq!(g.key(Key::from_name("ArrowRight"), &mut e), Command::Next);
        assert_eq!(g.key(Key::from_name("ArrowLeft"), &mut e), Command::Prev);
        g.key(Key::from_name("+"), &mut e);
        g.key(Key::from_name("="), &mut e);
        assert!((e.zoom() - 1.5625).abs() < 1e-6);
        g.key(Key::from_name("-"), &mut e);
        assert!((e.zoom() - 1.25).abs() < 1e-6);

        e.rotate(90.0);
        g.key(Key::from_name("0"), &mut e);
        assert_eq!((e.zoom(), e.rotation()), (1.0, 90.0));
        assert_eq!(g.key(Key::from_name("q"), &mut e), Command::None);
    }

    #[test]
    fn test_cancel_clears_pan() {
        let (mut g, e) = setup();
        g.mouse_down(Pos2::ZERO, MouseButton::Primary, HitTarget::Stage, &e);
        assert!(g.is_panning());
        g.cancel();
        assert!(!g.is_panning());
    }
}
