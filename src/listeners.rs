//! Installed input listeners as owned handles.
//!
//! Every stream the gallery consumes while open is represented by a
//! [`Disposer`]. Input is only routed to a concern whose listener is currently
//! installed, and dropping the handle uninstalls it, so every exit path
//! releases what it acquired.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    /// Global key presses.
    Keyboard,
    /// Window-level pointer move/up so drags continue outside the stage.
    WindowPointer,
    /// Pointer down and clicks on the stage.
    StagePointer,
    StageTouch,
    StageWheel,
    /// Pointer down on the backdrop.
    Backdrop,
    /// Live subtree watch feeding the registry.
    MutationWatch,
}

#[derive(Clone, Default)]
pub struct ListenerSet {
    active: Rc<RefCell<BTreeSet<ListenerKind>>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, kind: ListenerKind) -> Disposer {
        if !self.active.borrow_mut().insert(kind) {
            log::debug!("listener {kind:?} installed twice");
        }
        Disposer {
            kind,
            set: Rc::downgrade(&self.active),
        }
    }

    pub fn is_active(&self, kind: ListenerKind) -> bool {
        self.active.borrow().contains(&kind)
    }

    pub fn active(&self) -> Vec<ListenerKind> {
        self.active.borrow().iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active.borrow().is_empty()
    }
}

/// Uninstalls its listener when released or dropped.
pub struct Disposer {
    kind: ListenerKind,
    set: Weak<RefCell<BTreeSet<ListenerKind>>>,
}

impl Disposer {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        if let Some(set) = self.set.upgrade() {
            set.borrow_mut().remove(&self.kind);
        }
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer").field("kind", &self.kind).finish()
    }
}
