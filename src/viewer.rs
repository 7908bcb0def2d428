use crate::document::{ChangeSource, Document, Mutation, MutationWatch, NodeId};
use crate::geometry::StageGeometry;
use crate::gesture::{Command, GestureController, HitTarget, InputEvent, MouseButton};
use crate::listeners::{Disposer, ListenerKind, ListenerSet};
use crate::overlay::{class, Action, DisplayedImage, Overlay, Phase, ThumbStrip};
use crate::registry::{ImageItem, Registry};
use crate::settings::{Callback, GallerySettings, ImageFilter, Scope, ViewerConfig};
use crate::transform::{Transform, TransformEngine, ROTATE_STEP_DEGREES, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use std::time::{Duration, Instant};

/// State that exists only while the overlay is up.
struct Session {
    index: usize,
    engine: TransformEngine,
    gestures: GestureController,
    overlay: Overlay,
    /// Released on drop, whichever way the session ends.
    listeners: Vec<Disposer>,
}

impl Session {
    fn release(&mut self, kinds: &[ListenerKind]) {
        self.listeners.retain(|d| !kinds.contains(&d.kind()));
    }

    fn sync_overlay(&mut self) {
        self.overlay.apply_transform(self.engine.transform());
        self.overlay.grabbing = self.gestures.is_panning();
    }
}

enum State {
    Closed,
    Open(Session),
    /// Leave transition running; torn down on completion or at the deadline.
    Closing { session: Session, deadline: Instant },
}

/// A modal gallery over a set of images.
///
/// Lifecycle: closed → `open` → open → `close` → closing → closed. `destroy`
/// ends the instance for good. Everything runs on the caller's thread; hosts
/// forward input with [`Viewer::handle_input`] and call [`Viewer::sync`] and
/// [`Viewer::tick`] once per frame.
pub struct Viewer {
    document: Document,
    settings: GallerySettings,
    registry: Registry,
    filter: Option<ImageFilter>,
    on_open: Option<Callback>,
    on_close: Option<Callback>,
    watch: Option<MutationWatch>,
    watch_listener: Option<Disposer>,
    listeners: ListenerSet,
    stage: StageGeometry,
    state: State,
    destroyed: bool,
}

impl Viewer {
    pub fn new(config: ViewerConfig, document: &Document) -> Self {
        let ViewerConfig {
            scope,
            settings,
            images,
            filter,
            on_open,
            on_close,
        } = config;
        let settings = settings.normalized();
        let listeners = ListenerSet::new();

        let mut viewer = Self {
            document: document.clone(),
            settings,
            registry: Registry::live(),
            filter,
            on_open,
            on_close,
            watch: None,
            watch_listener: None,
            listeners,
            stage: StageGeometry::default(),
            state: State::Closed,
            destroyed: false,
        };

        match images {
            Some(items) => {
                viewer.registry = Registry::from_items(items);
                log::debug!("viewer: {} explicit image(s), live tracking off", viewer.registry.len());
            }
            None => {
                let root = viewer.resolve_scope(&scope);
                let elements = document.images_under(root);
                viewer.registry.scan(&elements, viewer.filter.as_ref());
                viewer.watch = Some(document.watch(root));
                viewer.watch_listener = Some(viewer.listeners.install(ListenerKind::MutationWatch));
                log::debug!("viewer: scanned {} image(s) under {:?}", viewer.registry.len(), root);
            }
        }
        viewer
    }

    fn resolve_scope(&self, scope: &Scope) -> NodeId {
        match scope {
            Scope::Body => self.document.body(),
            Scope::Element(node) => *node,
            Scope::Selector(selector) => self.document.find_by_selector(selector).unwrap_or_else(|| {
                log::warn!("viewer: scope '{selector}' matched nothing, scanning the whole body");
                self.document.body()
            }),
        }
    }

    pub fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// Open or still playing its leave transition.
    pub fn is_visible(&self) -> bool {
        !matches!(self.state, State::Closed)
    }

    fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Open(session) | State::Closing { session, .. } => Some(session),
            State::Closed => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.state {
            State::Open(session) | State::Closing { session, .. } => Some(session),
            State::Closed => None,
        }
    }

    fn open_session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.state {
            State::Open(session) => Some(session),
            _ => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.session().map(|s| s.index)
    }

    pub fn current_item(&self) -> Option<&ImageItem> {
        self.index().and_then(|i| self.registry.get(i))
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.session().map(|s| &s.overlay)
    }

    pub fn transform(&self) -> Option<Transform> {
        self.session().map(|s| s.engine.transform())
    }

    pub fn wants_keyboard(&self) -> bool {
        self.is_open() && self.listeners.is_active(ListenerKind::Keyboard)
    }

    pub fn wants_pointer(&self) -> bool {
        self.is_visible()
    }

    /// Report where the renderer placed the stage.
    pub fn set_stage(&mut self, stage: StageGeometry) {
        self.stage = stage;
        if let Some(session) = self.session_mut() {
            session.gestures.set_stage(stage);
            session.engine.set_stage_size(stage.content_size());
        }
    }

    pub fn set_thumb_viewport(&mut self, width: f32) {
        if let Some(strip) = self.session_mut().and_then(|s| s.overlay.thumbs.as_mut()) {
            strip.set_viewport_width(width);
        }
    }

    pub fn set_thumb_scroll(&mut self, offset: f32) {
        if let Some(strip) = self.session_mut().and_then(|s| s.overlay.thumbs.as_mut()) {
            strip.set_scroll_offset(offset);
        }
    }

    pub fn open(&mut self, start_index: usize) {
        if self.destroyed || self.registry.is_empty() {
            return;
        }
        match self.state {
            State::Open(_) => return,
            State::Closing { .. } => self.finish_close(),
            State::Closed => {}
        }

        let index = start_index.min(self.registry.len() - 1);
        self.document.add_body_class(class::LOCK);

        let thumbs = self
            .settings
            .show_thumbnails
            .then(|| ThumbStrip::new(self.registry.iter(), self.settings.thumbnail_size));
        let overlay = Overlay::new(&self.settings.extra_class_name, thumbs);

        let mut engine = TransformEngine::new(self.settings.min_zoom, self.settings.max_zoom);
        engine.set_stage_size(self.stage.content_size());

        let mut listeners = vec![
            self.listeners.install(ListenerKind::StagePointer),
            self.listeners.install(ListenerKind::WindowPointer),
            self.listeners.install(ListenerKind::StageTouch),
        ];
        if self.settings.close_on_backdrop_click {
            listeners.push(self.listeners.install(ListenerKind::Backdrop));
        }
        if self.settings.keyboard_enabled {
            listeners.push(self.listeners.install(ListenerKind::Keyboard));
        }
        if self.settings.wheel_zoom_enabled {
            listeners.push(self.listeners.install(ListenerKind::StageWheel));
        }

        self.state = State::Open(Session {
            index,
            engine,
            gestures: GestureController::new(self.stage),
            overlay,
            listeners,
        });
        self.render();
        log::info!("gallery opened at {} of {}", index + 1, self.registry.len());

        if let Some(on_open) = self.on_open.as_mut() {
            on_open();
        }
    }

    /// Show the item at `index`. Out-of-range indices and a closed gallery
    /// leave everything untouched.
    pub fn go(&mut self, index: usize) {
        if index >= self.registry.len() {
            return;
        }
        let Some(session) = self.open_session_mut() else {
            return;
        };
        session.index = index;
        self.render();
    }

    pub fn next(&mut self) {
        if let Some(index) = self.open_session_mut().map(|s| s.index) {
            self.go(index + 1);
        }
    }

    pub fn prev(&mut self) {
        if let Some(index) = self.open_session_mut().map(|s| s.index) {
            if index > 0 {
                self.go(index - 1);
            }
        }
    }

    /// Load the current item into the overlay and reset the transform.
    fn render(&mut self) {
        let len = self.registry.len();
        let State::Open(session) = &mut self.state else {
            return;
        };
        if let Some(item) = self.registry.get(session.index) {
            session.overlay.image = Some(DisplayedImage::from(item));
        }
        session.overlay.set_counter(session.index, len);
        if let Some(strip) = session.overlay.thumbs.as_mut() {
            strip.set_active(session.index);
        }
        session.engine.reset(true);
        session.sync_overlay();
    }

    /// Start the leave transition. The overlay stays up until
    /// [`Viewer::transition_end`] or the fallback deadline.
    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        let State::Open(mut session) = std::mem::replace(&mut self.state, State::Closed) else {
            return;
        };
        session.gestures.cancel();
        session.engine.reset(false);
        session.sync_overlay();
        session.overlay.phase = Phase::Leaving;
        session.release(&[ListenerKind::Keyboard, ListenerKind::WindowPointer]);

        let fallback = Duration::from_millis(self.settings.close_fallback_ms);
        self.state = State::Closing {
            session,
            deadline: Instant::now() + fallback,
        };
        log::debug!("gallery closing, teardown within {fallback:?}");
        if fallback.is_zero() {
            self.finish_close();
        }
    }

    /// The leave transition finished.
    pub fn transition_end(&mut self) {
        self.finish_close();
    }

    fn finish_close(&mut self) {
        if !matches!(self.state, State::Closing { .. }) {
            return;
        }
        // Dropping the session releases its listeners
        self.state = State::Closed;
        self.document.remove_body_class(class::LOCK);
        log::info!("gallery closed");

        if let Some(on_close) = self.on_close.as_mut() {
            on_close();
        }
    }

    /// Advance time-driven state: the enter transition on the first frame
    /// after opening, and the close fallback once its deadline passes.
    pub fn tick(&mut self, now: Instant) {
        match &mut self.state {
            State::Open(session) if session.overlay.phase == Phase::Entering => {
                session.overlay.phase = Phase::Active;
            }
            State::Closing { deadline, .. } if now >= *deadline => {
                log::debug!("gallery close fell back to the deadline");
                self.finish_close();
            }
            _ => {}
        }
    }

    /// Close if needed, stop live tracking and release everything. The
    /// instance stays inert afterwards.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.close();
        self.finish_close();
        self.watch = None;
        self.watch_listener = None;
        self.destroyed = true;
        log::debug!("gallery destroyed");
    }

    /// Apply queued document changes to the registry (and the open strip).
    pub fn sync(&mut self) {
        if self.destroyed || self.registry.is_static() {
            return;
        }
        let Some(mutations) = self.watch.as_ref().map(MutationWatch::drain) else {
            return;
        };
        if mutations.is_empty() {
            return;
        }
        let _span = tracing::debug_span!("gallery_sync", pending = mutations.len()).entered();
        for mutation in mutations {
            match mutation {
                Mutation::Added(elements) => {
                    let added = self.registry.scan(&elements, self.filter.as_ref());
                    if added.is_empty() {
                        continue;
                    }
                    let len = self.registry.len();
                    tracing::trace!(added = added.len(), total = len, "registry grew");
                    if let Some(session) = self.session_mut() {
                        if let Some(strip) = session.overlay.thumbs.as_mut() {
                            for item in &added {
                                strip.push(item);
                            }
                        }
                        session.overlay.set_counter(session.index, len);
                    }
                }
                Mutation::Removed(nodes) => {
                    let removed = self.registry.unbind(&nodes);
                    if removed.is_empty() {
                        continue;
                    }
                    let len = self.registry.len();
                    tracing::trace!(removed = removed.len(), total = len, "registry shrank");
                    if let Some(session) = self.session_mut() {
                        if let Some(strip) = session.overlay.thumbs.as_mut() {
                            for pos in &removed {
                                strip.remove(*pos);
                            }
                        }
                        session.overlay.set_counter(session.index, len);
                    }
                }
            }
        }
    }

    /// A host element was clicked. Returns true when the gallery handled it.
    pub fn handle_element_click(&mut self, node: NodeId) -> bool {
        if self.destroyed {
            return false;
        }
        // Looked up by source now, since positions shift as the registry changes
        let Some(index) = self
            .registry
            .source_for(node)
            .and_then(|source| self.registry.position_of(source))
        else {
            return false;
        };
        self.open(index);
        true
    }

    /// A thumbnail in the strip was clicked.
    pub fn select_thumbnail(&mut self, position: usize) {
        let source = self
            .session()
            .and_then(|s| s.overlay.thumbs.as_ref())
            .and_then(|strip| strip.get(position))
            .map(|thumb| thumb.source.clone());
        if let Some(index) = source.and_then(|s| self.registry.position_of(&s)) {
            self.go(index);
        }
    }

    pub fn perform(&mut self, action: Action) {
        match action {
            Action::Prev => self.prev(),
            Action::Next => self.next(),
            Action::Close => self.close(),
            Action::ZoomIn | Action::ZoomOut | Action::RotateLeft | Action::RotateRight | Action::Reset => {
                let Some(session) = self.open_session_mut() else {
                    return;
                };
                match action {
                    Action::ZoomIn => session.engine.adjust_zoom(ZOOM_IN_FACTOR, None),
                    Action::ZoomOut => session.engine.adjust_zoom(ZOOM_OUT_FACTOR, None),
                    Action::RotateLeft => session.engine.rotate(-ROTATE_STEP_DEGREES),
                    Action::RotateRight => session.engine.rotate(ROTATE_STEP_DEGREES),
                    _ => session.engine.reset(true),
                }
                session.sync_overlay();
            }
        }
    }

    /// Route one input event. Returns true if an installed listener took it.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let listeners = &self.listeners;
        let State::Open(session) = &mut self.state else {
            return false;
        };
        let engine = &mut session.engine;
        let gestures = &mut session.gestures;
        let routed = |kind| listeners.is_active(kind);

        let (taken, command) = match event {
            InputEvent::MouseDown { target, button, .. } if target == HitTarget::Backdrop => {
                let taken = routed(ListenerKind::Backdrop) && button == MouseButton::Primary;
                (taken, if taken { Command::Close } else { Command::None })
            }
            InputEvent::MouseDown { pos, button, target } if routed(ListenerKind::StagePointer) => {
                (true, gestures.mouse_down(pos, button, target, engine))
            }
            InputEvent::MouseMove { pos } if routed(ListenerKind::WindowPointer) => (true, gestures.mouse_move(pos, engine)),
            InputEvent::MouseUp { .. } if routed(ListenerKind::WindowPointer) => (true, gestures.mouse_up()),
            InputEvent::Click { target } if routed(ListenerKind::StagePointer) => (true, gestures.click(target)),
            InputEvent::Wheel { delta_y, pos } if routed(ListenerKind::StageWheel) => {
                (true, gestures.wheel(delta_y, pos, engine))
            }
            InputEvent::TouchStart { touches } if routed(ListenerKind::StageTouch) => {
                (true, gestures.touch_start(&touches, engine))
            }
            InputEvent::TouchMove { touches } if routed(ListenerKind::StageTouch) => {
                (true, gestures.touch_move(&touches, engine))
            }
            InputEvent::TouchEnd { touches } if routed(ListenerKind::StageTouch) => (true, gestures.touch_end(&touches)),
            InputEvent::Key(key) if routed(ListenerKind::Keyboard) => (true, gestures.key(key, engine)),
            _ => (false, Command::None),
        };
        if command != Command::None {
            tracing::trace!(?command, "gesture command");
        }

        match command {
            Command::None => {}
            Command::Render => session.sync_overlay(),
            Command::Close => self.close(),
            Command::Next => self.next(),
            Command::Prev => self.prev(),
        }
        taken
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        if self.is_visible() {
            self.document.remove_body_class(class::LOCK);
        }
    }
}
