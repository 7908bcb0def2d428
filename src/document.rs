//! In-process host node tree.
//!
//! The gallery never owns the nodes it discovers. Hosts describe their page as a
//! tree of containers and image elements, mutate it as content streams in, and
//! the gallery follows along through a [`MutationWatch`].

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::{Rc, Weak};
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Attributes of an image-capable element as the host sets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAttrs {
    pub src: String,
    pub current_src: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub no_viewer: bool,
}

impl ImageAttrs {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Default::default()
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_current_src(mut self, current_src: impl Into<String>) -> Self {
        self.current_src = Some(current_src.into());
        self
    }

    /// Mark the element as opted out of the gallery.
    pub fn no_viewer(mut self) -> Self {
        self.no_viewer = true;
        self
    }
}

/// Snapshot of an image element handed to the gallery (and to filters).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    pub id: NodeId,
    pub attrs: ImageAttrs,
}

impl ImageElement {
    /// The source the element currently displays, if any.
    pub fn resolved_source(&self) -> Option<&str> {
        self.attrs
            .current_src
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| Some(self.attrs.src.as_str()).filter(|s| !s.trim().is_empty()))
    }

    pub fn alt(&self) -> Option<&str> {
        self.attrs.alt.as_deref().filter(|s| !s.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.attrs.title.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_opted_out(&self) -> bool {
        self.attrs.no_viewer
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Image elements of a subtree that was attached under the watched root,
    /// in document order.
    Added(Vec<ImageElement>),
    /// Image elements of a subtree that was detached from the watched root.
    Removed(Vec<NodeId>),
}

/// Receiving end of a live subtree watch. Dropping it disconnects the watch.
pub struct MutationWatch {
    rx: Receiver<Mutation>,
    alive: Rc<()>,
}

impl MutationWatch {
    /// Create a watch fed by the returned sender. Hosts that manage their own
    /// node trees use this to implement [`ChangeSource`].
    pub fn channel() -> (Sender<Mutation>, MutationWatch) {
        let (tx, rx) = channel();
        (
            tx,
            MutationWatch {
                rx,
                alive: Rc::new(()),
            },
        )
    }

    fn liveness(&self) -> Weak<()> {
        Rc::downgrade(&self.alive)
    }

    /// Take every mutation queued since the last call, oldest first.
    pub fn drain(&self) -> Vec<Mutation> {
        self.rx.try_iter().collect()
    }
}

/// Anything that can report images entering and leaving a subtree.
pub trait ChangeSource {
    fn watch(&self, root: NodeId) -> MutationWatch;
}

#[derive(Debug)]
enum NodeKind {
    Container,
    Image(ImageAttrs),
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    name: Option<String>,
    kind: NodeKind,
}

struct Watcher {
    root: NodeId,
    tx: Sender<Mutation>,
    alive: Weak<()>,
}

impl Watcher {
    fn is_connected(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

struct DocumentInner {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
    body: NodeId,
    body_classes: BTreeSet<String>,
    watchers: Vec<Watcher>,
}

impl DocumentInner {
    fn insert(&mut self, name: Option<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                parent: None,
                children: Vec::new(),
                name,
                kind,
            },
        );
        id
    }

    /// True if `node` is `ancestor` or lies below it.
    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.is_within(node, self.body)
    }

    fn collect_images(&self, root: NodeId, out: &mut Vec<ImageElement>) {
        let Some(node) = self.nodes.get(&root) else {
            return;
        };
        if let NodeKind::Image(attrs) = &node.kind {
            out.push(ImageElement {
                id: root,
                attrs: attrs.clone(),
            });
        }
        for child in &node.children {
            self.collect_images(*child, out);
        }
    }

    /// Queue `mutation` for every live watcher whose root contains `parent`.
    fn notify(&mut self, parent: NodeId, mutation: Mutation) {
        let mut watchers = std::mem::take(&mut self.watchers);
        watchers.retain(|w| {
            if !w.is_connected() {
                return false;
            }
            if !self.is_within(parent, w.root) {
                return true;
            }
            w.tx.send(mutation.clone()).is_ok()
        });
        self.watchers = watchers;
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(&node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != node);
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = None;
        }
        let mut images = Vec::new();
        self.collect_images(node, &mut images);
        if !images.is_empty() {
            let ids = images.into_iter().map(|el| el.id).collect();
            self.notify(parent, Mutation::Removed(ids));
        }
    }
}

/// Shared handle to a host node tree. Clones refer to the same tree.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut inner = DocumentInner {
            nodes: HashMap::new(),
            next_id: 1,
            body: NodeId(0),
            body_classes: BTreeSet::new(),
            watchers: Vec::new(),
        };
        inner.body = inner.insert(Some("body".to_string()), NodeKind::Container);
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    pub fn create_container(&self, name: Option<&str>) -> NodeId {
        self.inner
            .borrow_mut()
            .insert(name.map(str::to_string), NodeKind::Container)
    }

    pub fn create_image(&self, attrs: ImageAttrs) -> NodeId {
        self.inner.borrow_mut().insert(None, NodeKind::Image(attrs))
    }

    /// Attach `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere. Ignored for unknown nodes, image parents and
    /// moves that would create a cycle.
    pub fn append(&self, parent: NodeId, child: NodeId) {
        let mut inner = self.inner.borrow_mut();
        let parent_ok = matches!(
            inner.nodes.get(&parent).map(|n| &n.kind),
            Some(NodeKind::Container)
        );
        if !parent_ok || !inner.nodes.contains_key(&child) || inner.is_within(parent, child) {
            return;
        }

        inner.detach(child);
        if let Some(p) = inner.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = inner.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }

        let mut images = Vec::new();
        inner.collect_images(child, &mut images);
        if !images.is_empty() {
            inner.notify(parent, Mutation::Added(images));
        }
    }

    /// Detach `node` (and its subtree) from its parent. The node can be
    /// appended again later.
    pub fn remove(&self, node: NodeId) {
        self.inner.borrow_mut().detach(node);
    }

    pub fn image(&self, node: NodeId) -> Option<ImageElement> {
        let inner = self.inner.borrow();
        match &inner.nodes.get(&node)?.kind {
            NodeKind::Image(attrs) => Some(ImageElement {
                id: node,
                attrs: attrs.clone(),
            }),
            NodeKind::Container => None,
        }
    }

    /// Image elements at or below `root`, in document order.
    pub fn images_under(&self, root: NodeId) -> Vec<ImageElement> {
        let mut out = Vec::new();
        self.inner.borrow().collect_images(root, &mut out);
        out
    }

    /// Resolve `#name` or `name` against named nodes attached to the document.
    pub fn find_by_selector(&self, selector: &str) -> Option<NodeId> {
        let name = selector.trim().trim_start_matches('#');
        if name.is_empty() {
            return None;
        }
        let inner = self.inner.borrow();
        let mut hits: Vec<NodeId> = inner
            .nodes
            .iter()
            .filter(|(id, n)| n.name.as_deref() == Some(name) && inner.is_attached(**id))
            .map(|(id, _)| *id)
            .collect();
        hits.sort();
        hits.first().copied()
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.inner.borrow().is_attached(node)
    }

    pub fn add_body_class(&self, class: &str) {
        self.inner.borrow_mut().body_classes.insert(class.to_string());
    }

    pub fn remove_body_class(&self, class: &str) {
        self.inner.borrow_mut().body_classes.remove(class);
    }

    pub fn body_has_class(&self, class: &str) -> bool {
        self.inner.borrow().body_classes.contains(class)
    }

    pub fn watcher_count(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.watchers.retain(Watcher::is_connected);
        inner.watchers.len()
    }
}

impl ChangeSource for Document {
    fn watch(&self, root: NodeId) -> MutationWatch {
        let (tx, watch) = MutationWatch::channel();
        let alive = watch.liveness();
        self.inner
            .borrow_mut()
            .watchers
            .push(Watcher { root, tx, alive });
        watch
    }
}
