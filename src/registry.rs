use crate::document::{ImageElement, NodeId};
use crate::settings::ImageFilter;
use std::collections::HashMap;

/// One viewable image. Identity is the `source` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub source: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
}

impl ImageItem {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alt_text: None,
            caption: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt_text = Some(alt.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Build an item from a discovered element. The caption falls back to the
    /// alt text when the element has no title.
    pub fn from_element(el: &ImageElement) -> Option<Self> {
        let source = el.resolved_source()?;
        Some(Self {
            source: source.to_string(),
            alt_text: el.alt().map(str::to_string),
            caption: el.title().or(el.alt()).map(str::to_string),
        })
    }

    pub fn alt(&self) -> &str {
        self.alt_text.as_deref().unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.caption.as_deref().or(self.alt_text.as_deref()).unwrap_or("")
    }
}

#[derive(Debug, Clone)]
struct Entry {
    item: ImageItem,
    /// Backing element for scanned items; `None` for explicit ones.
    node: Option<NodeId>,
}

/// Ordered list of viewable items plus the per-element binding table.
///
/// Elements are bound at most once; the same URL may still appear several
/// times when distinct elements carry it.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Entry>,
    bindings: HashMap<NodeId, String>,
    static_list: bool,
}

impl Registry {
    /// Empty registry fed by document scans.
    pub fn live() -> Self {
        Self::default()
    }

    /// Registry over a fixed list. Scans and removals are ignored.
    pub fn from_items(items: Vec<ImageItem>) -> Self {
        let entries = items
            .into_iter()
            .filter(|item| !item.source.trim().is_empty())
            .map(|item| Entry { item, node: None })
            .collect();
        Self {
            entries,
            bindings: HashMap::new(),
            static_list: true,
        }
    }

    pub fn is_static(&self) -> bool {
        self.static_list
    }

    /// Bind every qualifying element, in the order given. Returns the items
    /// that were appended.
    pub fn scan<'a>(
        &mut self,
        elements: impl IntoIterator<Item = &'a ImageElement>,
        filter: Option<&ImageFilter>,
    ) -> Vec<ImageItem> {
        if self.static_list {
            return Vec::new();
        }
        let mut added = Vec::new();
        for el in elements {
            if let Some(item) = self.try_bind(el, filter) {
                added.push(item);
            }
        }
        if !added.is_empty() {
            log::debug!("registry: bound {} element(s), {} total", added.len(), self.entries.len());
        }
        added
    }

    fn try_bind(&mut self, el: &ImageElement, filter: Option<&ImageFilter>) -> Option<ImageItem> {
        if el.is_opted_out() || self.bindings.contains_key(&el.id) {
            return None;
        }
        if let Some(filter) = filter {
            if !filter(el) {
                return None;
            }
        }
        let Some(item) = ImageItem::from_element(el) else {
            log::debug!("registry: skipping {:?} without a source", el.id);
            return None;
        };
        self.bindings.insert(el.id, item.source.clone());
        self.entries.push(Entry {
            item: item.clone(),
            node: Some(el.id),
        });
        Some(item)
    }

    /// Drop the entries backed by `nodes`. Returns the positions they held,
    /// in descending order so callers can remove parallel rows safely.
    pub fn unbind(&mut self, nodes: &[NodeId]) -> Vec<usize> {
        if self.static_list {
            return Vec::new();
        }
        let mut removed: Vec<usize> = nodes
            .iter()
            .filter(|node| self.bindings.remove(*node).is_some())
            .filter_map(|node| self.entries.iter().position(|e| e.node == Some(*node)))
            .collect();
        removed.sort_unstable_by(|a, b| b.cmp(a));
        removed.dedup();
        for pos in &removed {
            self.entries.remove(*pos);
        }
        if !removed.is_empty() {
            log::debug!("registry: pruned {} item(s), {} left", removed.len(), self.entries.len());
        }
        removed
    }

    pub fn is_bound(&self, node: NodeId) -> bool {
        self.bindings.contains_key(&node)
    }

    pub fn source_for(&self, node: NodeId) -> Option<&str> {
        self.bindings.get(&node).map(String::as_str)
    }

    /// First position holding `source`.
    pub fn position_of(&self, source: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.item.source == source)
    }

    pub fn get(&self, index: usize) -> Option<&ImageItem> {
        self.entries.get(index).map(|e| &e.item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageItem> {
        self.entries.iter().map(|e| &e.item)
    }
}
