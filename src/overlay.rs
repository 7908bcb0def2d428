//! Retained model of the overlay the gallery presents while open.
//!
//! Renderers read this to draw; the class names are the structural hooks a
//! styling layer keys off.

use crate::registry::ImageItem;
use crate::transform::Transform;

pub mod class {
    pub const CONTAINER: &str = "iv-container";
    pub const BACKDROP: &str = "iv-backdrop";
    pub const SHELL: &str = "iv-shell";
    pub const STAGE: &str = "iv-stage";
    pub const TOOLS: &str = "iv-tools";
    pub const CONTROLS: &str = "iv-controls";
    pub const THUMBS: &str = "iv-thumbs";
    pub const ZOOM_INDICATOR: &str = "iv-zoom-indicator";
    pub const COUNTER: &str = "iv-counter";
    pub const NAV_BUTTON: &str = "iv-nav-btn";
    pub const CLOSE: &str = "iv-close";
    /// Body-level scroll lock while the overlay is up.
    pub const LOCK: &str = "iv-lock";
    pub const ACTIVE: &str = "iv-active";
    pub const LEAVE: &str = "iv-leave";
    pub const GRABBING: &str = "iv-grabbing";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Prev,
    Next,
    ZoomIn,
    ZoomOut,
    RotateLeft,
    RotateRight,
    Reset,
    Close,
}

impl Action {
    /// Buttons of the control cluster, in display order.
    pub const CONTROLS: [Action; 5] = [
        Action::ZoomIn,
        Action::ZoomOut,
        Action::RotateLeft,
        Action::RotateRight,
        Action::Reset,
    ];

    pub fn data_action(self) -> &'static str {
        match self {
            Action::Prev => "prev",
            Action::Next => "next",
            Action::ZoomIn => "zoom-in",
            Action::ZoomOut => "zoom-out",
            Action::RotateLeft => "rotate-left",
            Action::RotateRight => "rotate-right",
            Action::Reset => "reset",
            Action::Close => "close",
        }
    }

    pub fn from_data_action(name: &str) -> Option<Self> {
        [
            Action::Prev,
            Action::Next,
            Action::ZoomIn,
            Action::ZoomOut,
            Action::RotateLeft,
            Action::RotateRight,
            Action::Reset,
            Action::Close,
        ]
        .into_iter()
        .find(|a| a.data_action() == name)
    }

    /// Accessible label, also used as the tooltip.
    pub fn label(self) -> &'static str {
        match self {
            Action::Prev => "Previous image",
            Action::Next => "Next image",
            Action::ZoomIn => "Zoom In",
            Action::ZoomOut => "Zoom Out",
            Action::RotateLeft => "Rotate Left",
            Action::RotateRight => "Rotate Right",
            Action::Reset => "Reset",
            Action::Close => "Close",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Action::Prev => "‹",
            Action::Next => "›",
            Action::ZoomIn => "+",
            Action::ZoomOut => "−",
            Action::RotateLeft => "⟲",
            Action::RotateRight => "⟳",
            Action::Reset => "⤾",
            Action::Close => "✕",
        }
    }
}

/// Enter/leave transition state of the backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Mounted, waiting one frame before turning active.
    Entering,
    Active,
    Leaving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedImage {
    pub source: String,
    pub alt: String,
    pub title: String,
}

impl From<&ImageItem> for DisplayedImage {
    fn from(item: &ImageItem) -> Self {
        Self {
            source: item.source.clone(),
            alt: item.alt().to_string(),
            title: item.title().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub source: String,
    pub alt: String,
}

const THUMB_GAP: f32 = 6.0;

/// Horizontal strip of thumbnails, one per registry item.
#[derive(Debug, Clone)]
pub struct ThumbStrip {
    thumbs: Vec<Thumbnail>,
    active: Option<usize>,
    scroll_offset: f32,
    viewport_width: f32,
    thumb_size: f32,
}

impl ThumbStrip {
    pub fn new<'a>(items: impl IntoIterator<Item = &'a ImageItem>, thumb_size: f32) -> Self {
        let mut strip = Self {
            thumbs: Vec::new(),
            active: None,
            scroll_offset: 0.0,
            viewport_width: 0.0,
            thumb_size,
        };
        for item in items {
            strip.push(item);
        }
        strip
    }

    pub fn push(&mut self, item: &ImageItem) {
        self.thumbs.push(Thumbnail {
            source: item.source.clone(),
            alt: item.alt().to_string(),
        });
    }

    pub fn remove(&mut self, position: usize) {
        if position < self.thumbs.len() {
            self.thumbs.remove(position);
        }
    }

    pub fn len(&self) -> usize {
        self.thumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thumbs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Thumbnail> {
        self.thumbs.iter()
    }

    pub fn get(&self, position: usize) -> Option<&Thumbnail> {
        self.thumbs.get(position)
    }

    pub fn is_active(&self, position: usize) -> bool {
        self.active == Some(position)
    }

    pub fn thumb_size(&self) -> f32 {
        self.thumb_size
    }

    /// Distance between the left edges of neighbouring thumbnails.
    pub fn pitch(&self) -> f32 {
        self.thumb_size + THUMB_GAP
    }

    pub fn content_width(&self) -> f32 {
        (self.thumbs.len() as f32 * self.pitch() - THUMB_GAP).max(0.0)
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Record a scroll the user made directly.
    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset.clamp(0.0, self.max_scroll());
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width.max(0.0);
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_scroll());
    }

    fn max_scroll(&self) -> f32 {
        (self.content_width() - self.viewport_width).max(0.0)
    }

    /// Mark `position` active and centre it if it sits outside the visible
    /// part of the strip.
    pub fn set_active(&mut self, position: usize) {
        self.active = Some(position);
        if position >= self.thumbs.len() || self.viewport_width <= 0.0 {
            return;
        }
        let left = position as f32 * self.pitch() - self.scroll_offset;
        let right = left + self.thumb_size;
        if left < 0.0 || right > self.viewport_width {
            let centre = position as f32 * self.pitch() + self.thumb_size / 2.0;
            self.scroll_offset = (centre - self.viewport_width / 2.0).clamp(0.0, self.max_scroll());
        }
    }
}

/// Everything a renderer needs to draw the open gallery.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub phase: Phase,
    extra_class: String,
    pub image: Option<DisplayedImage>,
    pub counter: String,
    pub zoom_label: String,
    pub transform: Transform,
    /// A pan is in progress.
    pub grabbing: bool,
    pub thumbs: Option<ThumbStrip>,
}

impl Overlay {
    pub fn new(extra_class: &str, thumbs: Option<ThumbStrip>) -> Self {
        let transform = Transform::default();
        Self {
            phase: Phase::Entering,
            extra_class: extra_class.trim().to_string(),
            image: None,
            counter: String::new(),
            zoom_label: format!("{}%", transform.zoom_percent()),
            transform,
            grabbing: false,
            thumbs,
        }
    }

    pub fn backdrop_classes(&self) -> Vec<&str> {
        let mut classes = vec![class::BACKDROP];
        classes.extend(self.extra_class.split_whitespace());
        match self.phase {
            Phase::Entering => {}
            Phase::Active => classes.push(class::ACTIVE),
            Phase::Leaving => classes.push(class::LEAVE),
        }
        classes
    }

    pub fn stage_classes(&self) -> Vec<&str> {
        let mut classes = vec![class::STAGE];
        if self.grabbing {
            classes.push(class::GRABBING);
        }
        classes
    }

    pub fn set_counter(&mut self, index: usize, len: usize) {
        self.counter = format!("{} / {}", index + 1, len);
    }

    pub fn apply_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.zoom_label = format!("{}%", transform.zoom_percent());
    }

    pub fn transform_css(&self) -> String {
        self.transform.css()
    }
}
