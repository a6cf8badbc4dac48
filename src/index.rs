use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::error::{TreeError, TreeResult};
use crate::model::{NodeFlags, TreeNode};

/// Arena handle for a node inside a [`TreeIndex`].
///
/// Handles are invalidated when the tree is rebuilt or when the node's
/// subtree is replaced through [`TreeIndex::attach_children`]. Vacated
/// slots are reused by later attachments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena slot of this node.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A flattened node stored in the arena.
#[derive(Clone, Debug)]
pub struct NodeEntry {
    key: String,
    label: String,
    // Lowercased once at build time for search.
    label_lower: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    level: u16,
    flags: NodeFlags,
    is_leaf: bool,
}

impl NodeEntry {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn label_lower(&self) -> &str {
        &self.label_lower
    }

    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub const fn level(&self) -> u16 {
        self.level
    }

    pub const fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub const fn is_leaf(&self) -> bool {
        self.is_leaf
    }
}

/// A row of the pre-order flat list used by virtual-scroll consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatNode {
    pub(crate) id: NodeId,
    pub(crate) level: u16,
    pub(crate) parent: Option<NodeId>,
    pub(crate) is_last_sibling: bool,
    // One entry per ancestor level: whether that ancestor was the last sibling.
    pub(crate) is_tail_stack: SmallVec<[bool; 8]>,
}

impl FlatNode {
    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub const fn level(&self) -> u16 {
        self.level
    }

    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub const fn is_last_sibling(&self) -> bool {
        self.is_last_sibling
    }

    /// Last-sibling flags of every ancestor, root first (for guide lines).
    pub fn is_tail_stack(&self) -> &[bool] {
        &self.is_tail_stack
    }
}

/// Key-indexed arena built from a nested tree.
#[derive(Clone, Debug, Default)]
pub struct TreeIndex {
    nodes: Vec<Option<NodeEntry>>,
    keys: FxHashMap<String, NodeId>,
    roots: Vec<NodeId>,
    flat: Vec<FlatNode>,
    async_data: bool,
    live: usize,
    // Slots vacated by earlier `attach_children` calls.
    free: Vec<NodeId>,
}

impl TreeIndex {
    /// Builds the index; on duplicate keys the later node wins the key.
    pub fn build(roots: &[TreeNode], async_data: bool) -> Self {
        match Self::build_inner(roots, async_data, false) {
            Ok(index) => index,
            // Lenient ingestion never reports duplicates.
            Err(_) => Self::empty(async_data),
        }
    }

    /// Builds the index, failing on the first duplicate key.
    pub fn try_build(roots: &[TreeNode], async_data: bool) -> TreeResult<Self> {
        Self::build_inner(roots, async_data, true)
    }

    fn empty(async_data: bool) -> Self {
        Self {
            async_data,
            ..Self::default()
        }
    }

    fn build_inner(roots: &[TreeNode], async_data: bool, validate: bool) -> TreeResult<Self> {
        let capacity: usize = roots.iter().map(TreeNode::subtree_len).sum();
        let mut index = Self {
            nodes: Vec::with_capacity(capacity),
            keys: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            roots: Vec::with_capacity(roots.len()),
            flat: Vec::with_capacity(capacity),
            async_data,
            live: 0,
            free: Vec::new(),
        };
        for root in roots {
            let id = index.ingest(root, None, 0, validate)?;
            index.roots.push(id);
        }
        index.rebuild_flat();
        log::debug!(
            "tree index built: {} nodes, {} roots",
            index.live,
            index.roots.len()
        );
        Ok(index)
    }

    fn ingest(
        &mut self,
        node: &TreeNode,
        parent: Option<NodeId>,
        level: u16,
        validate: bool,
    ) -> TreeResult<NodeId> {
        if validate && self.keys.contains_key(&node.key) {
            return Err(TreeError::duplicate(node.key.as_str()));
        }

        let is_leaf = node
            .is_leaf
            .unwrap_or_else(|| node.children.is_empty() && !self.async_data);
        let entry = NodeEntry {
            key: node.key.clone(),
            label: node.title.clone(),
            label_lower: node.title.to_lowercase(),
            parent,
            children: Vec::with_capacity(node.children.len()),
            level,
            flags: node.flags(),
            is_leaf,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = Some(entry);
                id
            }
            None => {
                self.nodes.push(Some(entry));
                NodeId(self.nodes.len() - 1)
            }
        };
        self.live += 1;
        if self.keys.insert(node.key.clone(), id).is_some() {
            log::warn!("duplicate node key '{}': later node replaces earlier", node.key);
        }

        for child in &node.children {
            let child_id = self.ingest(child, Some(id), level.saturating_add(1), validate)?;
            if let Some(entry) = self.entry_mut(id) {
                entry.children.push(child_id);
            }
        }
        Ok(id)
    }

    /// Replaces the children of `key` with a freshly flattened subtree.
    ///
    /// Only the affected subtree is re-indexed. Returns `Ok(false)` when the
    /// key is unknown. With `validate`, duplicate keys are rejected before
    /// anything is changed.
    ///
    /// Slots of the replaced nodes become reusable only after this call, so
    /// the new children never share an id with a node removed by it.
    pub fn attach_children(
        &mut self,
        key: &str,
        children: &[TreeNode],
        validate: bool,
    ) -> TreeResult<bool> {
        let Some(id) = self.id(key) else {
            return Ok(false);
        };
        let previous = self.descendants(id);
        if validate {
            self.check_attach_keys(children, &previous)?;
        }

        for old in &previous {
            self.remove_slot(*old);
        }

        let level = self.entry(id).map_or(0, NodeEntry::level);
        let mut new_children = Vec::with_capacity(children.len());
        for child in children {
            new_children.push(self.ingest(child, Some(id), level.saturating_add(1), validate)?);
        }
        self.free.extend(previous.iter().rev());
        if let Some(entry) = self.entry_mut(id) {
            entry.is_leaf = new_children.is_empty();
            entry.children = new_children;
        }
        self.rebuild_flat();
        log::debug!(
            "attached {} nodes under '{key}' (replaced {})",
            children.iter().map(TreeNode::subtree_len).sum::<usize>(),
            previous.len()
        );
        Ok(true)
    }

    fn check_attach_keys(&self, children: &[TreeNode], replaced: &[NodeId]) -> TreeResult<()> {
        let replaced: FxHashSet<NodeId> = replaced.iter().copied().collect();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut stack: Vec<&TreeNode> = children.iter().collect();
        while let Some(node) = stack.pop() {
            let taken = self.id(&node.key).is_some_and(|id| !replaced.contains(&id));
            if taken || !seen.insert(node.key.as_str()) {
                return Err(TreeError::duplicate(node.key.as_str()));
            }
            stack.extend(node.children.iter());
        }
        Ok(())
    }

    fn remove_slot(&mut self, id: NodeId) {
        let Some(entry) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        if self.keys.get(&entry.key) == Some(&id) {
            self.keys.remove(&entry.key);
        }
        self.live -= 1;
    }

    fn rebuild_flat(&mut self) {
        self.flat.clear();
        let mut is_tail_stack: SmallVec<[bool; 8]> = SmallVec::new();
        let roots = self.roots.clone();
        let last = roots.len().saturating_sub(1);
        for (i, root) in roots.into_iter().enumerate() {
            self.push_flat(root, 0, None, i == last, &mut is_tail_stack);
        }
    }

    fn push_flat(
        &mut self,
        id: NodeId,
        level: u16,
        parent: Option<NodeId>,
        is_last_sibling: bool,
        is_tail_stack: &mut SmallVec<[bool; 8]>,
    ) {
        self.flat.push(FlatNode {
            id,
            level,
            parent,
            is_last_sibling,
            is_tail_stack: is_tail_stack.clone(),
        });
        let children = self
            .entry(id)
            .map(|entry| entry.children.clone())
            .unwrap_or_default();
        let last = children.len().saturating_sub(1);
        is_tail_stack.push(is_last_sibling);
        for (i, child) in children.into_iter().enumerate() {
            self.push_flat(child, level + 1, Some(id), i == last, is_tail_stack);
        }
        is_tail_stack.pop();
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut NodeEntry> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Returns whether children may still arrive asynchronously.
    pub const fn async_data(&self) -> bool {
        self.async_data
    }

    /// Returns the number of live nodes.
    pub const fn len(&self) -> usize {
        self.live
    }

    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Looks up a node by key.
    #[inline]
    pub fn id(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).copied()
    }

    #[inline]
    pub fn entry(&self, id: NodeId) -> Option<&NodeEntry> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Looks up a node entry by key.
    pub fn get(&self, key: &str) -> Option<&NodeEntry> {
        self.id(key).and_then(|id| self.entry(id))
    }

    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.entry(id).map(NodeEntry::key)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).and_then(NodeEntry::parent)
    }

    /// Returns the parent key of `key` (`None` for roots and unknown keys).
    pub fn parent_key(&self, key: &str) -> Option<&str> {
        self.id(key)
            .and_then(|id| self.parent(id))
            .and_then(|parent| self.key(parent))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.entry(id) {
            Some(entry) => &entry.children,
            None => &[],
        }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Returns the pre-order flat list of every node.
    pub fn flat(&self) -> &[FlatNode] {
        &self.flat
    }

    /// Iterates over node ids in pre-order.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.flat.iter().map(|row| row.id)
    }

    /// Iterates over the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&parent| self.parent(parent))
    }

    /// Returns every descendant of `id` in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }
}
