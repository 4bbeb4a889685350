//! Document tree model
//!
//!     A note is held in memory as a rooted, ordered tree of typed nodes. Nodes live in an arena
//!     owned by [`Document`] and are addressed by [`NodeKey`]s. Keys are never reused inside a
//!     document, so a stale key resolves to [`TreeError::MissingNode`] instead of aliasing a
//!     different node.
//!
//!     Every structural edit (append, insert, replace, remove, detach) goes through the arena and
//!     is validated there: a node has at most one parent, leaves cannot own children and a node
//!     can never be attached beneath one of its own descendants. This is what keeps the tree a
//!     tree while the importer and the shortcut handlers rewrite it.
//!
//!     For comparisons and serialization the tree can be copied out into an owned
//!     [`NodeSnapshot`]. Normalized snapshots merge adjacent text runs with identical formats and
//!     drop empty runs, which is the structural-equality relation used by the round-trip tests.

pub mod node;
pub mod text_format;

pub use node::{
    CodeBlock, Drawing, Embed, EmbedKind, EmbedWidth, HeadingLevel, Link, ListItem, ListKind,
    NodeKind, NodeType, TextRun, IMAGE_FILE_EXTENSIONS, VIDEO_FILE_EXTENSIONS,
};
pub use text_format::TextFormat;

use crate::error::TreeError;
use serde::Serialize;
use std::fmt;

/// Opaque handle of a node inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeKey(usize);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the edit cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Selection {
    /// A collapsed caret inside a text node (byte offset) or at the start of an element.
    Caret { key: NodeKey, offset: usize },
    /// A whole node selected, as after inserting a code block.
    Node { key: NodeKey },
}

impl Selection {
    pub fn key(&self) -> NodeKey {
        match self {
            Selection::Caret { key, .. } | Selection::Node { key } => *key,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Option<Slot>>,
    root: NodeKey,
    selection: Option<Selection>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the root.
    pub fn new() -> Self {
        Document {
            slots: vec![Some(Slot {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            })],
            root: NodeKey(0),
            selection: None,
        }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.children(self.root).map_or(true, |c| c.is_empty())
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.slot(key).is_ok()
    }

    fn slot(&self, key: NodeKey) -> Result<&Slot, TreeError> {
        self.slots
            .get(key.0)
            .and_then(Option::as_ref)
            .ok_or(TreeError::MissingNode(key))
    }

    fn slot_mut(&mut self, key: NodeKey) -> Result<&mut Slot, TreeError> {
        self.slots
            .get_mut(key.0)
            .and_then(Option::as_mut)
            .ok_or(TreeError::MissingNode(key))
    }

    /// Allocate a detached node.
    ///
    /// Freed slots are not recycled, so the arena grows by one slot per call for the lifetime of
    /// the document. Loading a note always starts from a fresh [`Document`].
    pub fn create(&mut self, kind: NodeKind) -> NodeKey {
        let key = NodeKey(self.slots.len());
        self.slots.push(Some(Slot {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        key
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>, format: TextFormat) -> NodeKey {
        self.create(NodeKind::text(text, format))
    }

    pub fn kind(&self, key: NodeKey) -> Result<&NodeKind, TreeError> {
        Ok(&self.slot(key)?.kind)
    }

    pub fn kind_mut(&mut self, key: NodeKey) -> Result<&mut NodeKind, TreeError> {
        Ok(&mut self.slot_mut(key)?.kind)
    }

    pub fn node_type(&self, key: NodeKey) -> Result<NodeType, TreeError> {
        Ok(self.kind(key)?.node_type())
    }

    pub fn parent(&self, key: NodeKey) -> Result<Option<NodeKey>, TreeError> {
        Ok(self.slot(key)?.parent)
    }

    pub fn children(&self, key: NodeKey) -> Result<&[NodeKey], TreeError> {
        Ok(&self.slot(key)?.children)
    }

    pub fn first_child(&self, key: NodeKey) -> Result<Option<NodeKey>, TreeError> {
        Ok(self.children(key)?.first().copied())
    }

    pub fn last_child(&self, key: NodeKey) -> Result<Option<NodeKey>, TreeError> {
        Ok(self.children(key)?.last().copied())
    }

    /// Position of `key` among its parent's children.
    pub fn index_in_parent(&self, key: NodeKey) -> Result<Option<usize>, TreeError> {
        let Some(parent) = self.parent(key)? else {
            return Ok(None);
        };
        Ok(self.children(parent)?.iter().position(|c| *c == key))
    }

    pub fn previous_sibling(&self, key: NodeKey) -> Result<Option<NodeKey>, TreeError> {
        let (Some(parent), Some(index)) = (self.parent(key)?, self.index_in_parent(key)?) else {
            return Ok(None);
        };
        if index == 0 {
            return Ok(None);
        }
        Ok(self.children(parent)?.get(index - 1).copied())
    }

    pub fn next_sibling(&self, key: NodeKey) -> Result<Option<NodeKey>, TreeError> {
        let (Some(parent), Some(index)) = (self.parent(key)?, self.index_in_parent(key)?) else {
            return Ok(None);
        };
        Ok(self.children(parent)?.get(index + 1).copied())
    }

    fn ensure_attachable(&self, parent: NodeKey, child: NodeKey) -> Result<(), TreeError> {
        if !self.kind(parent)?.is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        if child == self.root {
            return Err(TreeError::RootIsFixed);
        }
        if self.slot(child)?.parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(TreeError::Cycle { parent, child });
            }
            cursor = self.slot(current)?.parent;
        }
        Ok(())
    }

    /// Insert a detached node at `index` among `parent`'s children (clamped to the end).
    pub fn insert_at(
        &mut self,
        parent: NodeKey,
        index: usize,
        child: NodeKey,
    ) -> Result<(), TreeError> {
        self.ensure_attachable(parent, child)?;
        let children = &mut self.slot_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), TreeError> {
        let len = self.children(parent)?.len();
        self.insert_at(parent, len, child)
    }

    pub fn insert_before(&mut self, sibling: NodeKey, node: NodeKey) -> Result<(), TreeError> {
        let (parent, index) = self.position(sibling)?;
        self.insert_at(parent, index, node)
    }

    pub fn insert_after(&mut self, sibling: NodeKey, node: NodeKey) -> Result<(), TreeError> {
        let (parent, index) = self.position(sibling)?;
        self.insert_at(parent, index + 1, node)
    }

    fn position(&self, key: NodeKey) -> Result<(NodeKey, usize), TreeError> {
        if key == self.root {
            return Err(TreeError::RootIsFixed);
        }
        match (self.parent(key)?, self.index_in_parent(key)?) {
            (Some(parent), Some(index)) => Ok((parent, index)),
            _ => Err(TreeError::MissingNode(key)),
        }
    }

    /// Unlink a node (and its subtree) from its parent without freeing it.
    pub fn detach(&mut self, key: NodeKey) -> Result<(), TreeError> {
        if key == self.root {
            return Err(TreeError::RootIsFixed);
        }
        let Some(parent) = self.parent(key)? else {
            return Ok(());
        };
        self.slot_mut(parent)?.children.retain(|c| *c != key);
        self.slot_mut(key)?.parent = None;
        Ok(())
    }

    /// Put the detached node `new` in place of `old`, then free `old` and its subtree.
    pub fn replace(&mut self, old: NodeKey, new: NodeKey) -> Result<(), TreeError> {
        if old == new {
            return Ok(());
        }
        let (parent, index) = self.position(old)?;
        self.detach(old)?;
        if let Err(err) = self.insert_at(parent, index, new) {
            self.insert_at(parent, index, old)?;
            return Err(err);
        }
        self.free(old)
    }

    /// Detach and free a node with its whole subtree.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), TreeError> {
        self.detach(key)?;
        self.free(key)
    }

    /// Free every child of `key`.
    pub fn clear(&mut self, key: NodeKey) -> Result<(), TreeError> {
        let children = self.children(key)?.to_vec();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    pub fn move_children(&mut self, from: NodeKey, to: NodeKey) -> Result<(), TreeError> {
        let children = self.children(from)?.to_vec();
        for child in children {
            self.detach(child)?;
            self.append(to, child)?;
        }
        Ok(())
    }

    fn free(&mut self, key: NodeKey) -> Result<(), TreeError> {
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let slot = self
                .slots
                .get_mut(current.0)
                .and_then(Option::take)
                .ok_or(TreeError::MissingNode(current))?;
            stack.extend(slot.children);
            if self.selection.map(|s| s.key()) == Some(current) {
                self.selection = None;
            }
        }
        Ok(())
    }

    fn text_run(&self, key: NodeKey) -> Result<&TextRun, TreeError> {
        self.kind(key)?.as_text().ok_or(TreeError::NotText(key))
    }

    fn text_run_mut(&mut self, key: NodeKey) -> Result<&mut TextRun, TreeError> {
        match self.kind_mut(key)? {
            NodeKind::Text(run) => Ok(run),
            _ => Err(TreeError::NotText(key)),
        }
    }

    pub fn text(&self, key: NodeKey) -> Result<&str, TreeError> {
        Ok(&self.text_run(key)?.text)
    }

    pub fn format(&self, key: NodeKey) -> Result<TextFormat, TreeError> {
        Ok(self.text_run(key)?.format)
    }

    pub fn set_text(&mut self, key: NodeKey, text: impl Into<String>) -> Result<(), TreeError> {
        self.text_run_mut(key)?.text = text.into();
        Ok(())
    }

    pub fn set_format(&mut self, key: NodeKey, format: TextFormat) -> Result<(), TreeError> {
        self.text_run_mut(key)?.format = format;
        Ok(())
    }

    /// Set every flag of `format` that is not already set.
    pub fn add_format(&mut self, key: NodeKey, format: TextFormat) -> Result<(), TreeError> {
        self.text_run_mut(key)?.format.insert(format);
        Ok(())
    }

    pub fn toggle_format(&mut self, key: NodeKey, format: TextFormat) -> Result<(), TreeError> {
        self.text_run_mut(key)?.format.toggle(format);
        Ok(())
    }

    /// Split a text node at byte offsets.
    ///
    /// Offsets at the ends of the text (or repeated) are ignored. The first part keeps `key`;
    /// the other parts are new siblings inserted right after it with the same format. If the
    /// node is detached, the new parts are left detached. Returns all parts in order.
    pub fn split_text(
        &mut self,
        key: NodeKey,
        offsets: &[usize],
    ) -> Result<Vec<NodeKey>, TreeError> {
        let run = self.text_run(key)?.clone();
        let mut cuts: Vec<usize> = offsets
            .iter()
            .copied()
            .filter(|offset| *offset > 0 && *offset < run.text.len())
            .collect();
        cuts.sort_unstable();
        cuts.dedup();
        if let Some(bad) = cuts.iter().find(|offset| !run.text.is_char_boundary(**offset)) {
            return Err(TreeError::InvalidOffset { key, offset: *bad });
        }
        if cuts.is_empty() {
            return Ok(vec![key]);
        }

        let mut bounds = Vec::with_capacity(cuts.len() + 2);
        bounds.push(0);
        bounds.extend(cuts);
        bounds.push(run.text.len());

        let mut parts = vec![key];
        self.set_text(key, &run.text[bounds[0]..bounds[1]])?;
        let mut previous = key;
        for window in bounds.windows(2).skip(1) {
            let part = self.create_text(&run.text[window[0]..window[1]], run.format);
            if self.parent(previous)?.is_some() {
                self.insert_after(previous, part)?;
            }
            parts.push(part);
            previous = part;
        }
        Ok(parts)
    }

    /// Concatenated text of every text run below (or at) `key`.
    pub fn text_content(&self, key: NodeKey) -> Result<String, TreeError> {
        let mut out = String::new();
        self.collect_text(key, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, key: NodeKey, out: &mut String) -> Result<(), TreeError> {
        match self.kind(key)? {
            NodeKind::Text(run) => out.push_str(&run.text),
            NodeKind::CodeBlock(code) => out.push_str(&code.code),
            _ => {
                for child in self.children(key)? {
                    self.collect_text(*child, out)?;
                }
            }
        }
        Ok(())
    }

    /// Every node below `key` in document (pre-)order, excluding `key` itself.
    pub fn descendants(&self, key: NodeKey) -> Result<Vec<NodeKey>, TreeError> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self.children(key)?.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current)?.iter().rev().copied());
        }
        Ok(out)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Put a collapsed caret at the very start of the document.
    pub fn select_start(&mut self) -> Result<(), TreeError> {
        let mut key = self.root;
        while let Some(first) = self.first_child(key)? {
            key = first;
        }
        self.selection = Some(Selection::Caret { key, offset: 0 });
        Ok(())
    }

    /// Copy the subtree at `key` out of the arena.
    pub fn snapshot(&self, key: NodeKey) -> Result<NodeSnapshot, TreeError> {
        let children = self
            .children(key)?
            .iter()
            .map(|child| self.snapshot(*child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NodeSnapshot {
            kind: self.kind(key)?.clone(),
            children,
        })
    }
}

/// An owned copy of a subtree, used for equality checks and serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Merge adjacent text runs with equal formats and drop empty runs, recursively.
    pub fn normalized(self) -> NodeSnapshot {
        let mut children: Vec<NodeSnapshot> = Vec::with_capacity(self.children.len());
        for child in self.children.into_iter().map(NodeSnapshot::normalized) {
            if let NodeKind::Text(run) = &child.kind {
                if run.text.is_empty() {
                    continue;
                }
                if let Some(NodeSnapshot {
                    kind: NodeKind::Text(previous),
                    ..
                }) = children.last_mut()
                {
                    if previous.format == run.format {
                        previous.text.push_str(&run.text);
                        continue;
                    }
                }
            }
            children.push(child);
        }
        NodeSnapshot {
            kind: self.kind,
            children,
        }
    }

    /// The child kinds, handy in assertions.
    pub fn child_types(&self) -> Vec<NodeType> {
        self.children.iter().map(|c| c.kind.node_type()).collect()
    }
}
