use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

use crate::index::{FlatNode, NodeId, TreeIndex};

/// Visible subsequence of the flattened tree, cached between expansion changes.
#[derive(Clone, Debug)]
pub struct VirtualWindow {
    rows: Vec<FlatNode>,
    // Fast lookup from node id to visible row index.
    row_index: FxHashMap<NodeId, usize>,
    // Marks whether rows must be rebuilt.
    dirty: bool,
}

impl Default for VirtualWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualWindow {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a window with preallocated capacity for the given number of rows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            row_index: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            dirty: true,
        }
    }

    /// Returns `true` if every ancestor of `id` is expanded.
    ///
    /// Roots are always visible; unknown nodes never are.
    pub fn is_visible(index: &TreeIndex, expanded: &FxHashSet<NodeId>, id: NodeId) -> bool {
        if index.entry(id).is_none() {
            return false;
        }
        index
            .ancestors(id)
            .all(|ancestor| expanded.contains(&ancestor))
    }

    /// Marks the cached rows as stale.
    pub const fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuilds the rows if they are stale.
    ///
    /// With `filter`, a row must also belong to the given set (search context).
    pub fn ensure_rows(
        &mut self,
        index: &TreeIndex,
        expanded: &FxHashSet<NodeId>,
        filter: Option<&FxHashSet<NodeId>>,
    ) {
        if !self.dirty {
            return;
        }
        self.rows.clear();
        self.row_index.clear();
        for row in index.flat() {
            if filter.is_some_and(|keep| !keep.contains(&row.id)) {
                continue;
            }
            if !Self::is_visible(index, expanded, row.id) {
                continue;
            }
            self.row_index.insert(row.id, self.rows.len());
            self.rows.push(row.clone());
        }
        self.dirty = false;
    }

    /// Returns the cached visible rows.
    pub fn rows(&self) -> &[FlatNode] {
        &self.rows
    }

    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the visible row index of a node.
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.row_index.get(&id).copied()
    }

    /// Returns the rows that fit a viewport starting at `offset`.
    pub fn range(&self, offset: usize, height: usize) -> &[FlatNode] {
        let start = offset.min(self.rows.len());
        let end = start.saturating_add(height).min(self.rows.len());
        &self.rows[start..end]
    }
}
