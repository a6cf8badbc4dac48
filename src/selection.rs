use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

use crate::index::{NodeId, TreeIndex};

/// Result of a successful [`SelectionState::select`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectChange {
    pub id: NodeId,
    pub selected: bool,
    /// Nodes deselected to keep single-selection semantics.
    pub cleared: Vec<NodeId>,
}

/// Expansion, selection and checkbox state for the nodes of a [`TreeIndex`].
///
/// Checkbox propagation keeps every non-excluded parent consistent with its
/// children: a parent is checked iff all of its enabled children are
/// checked, and indeterminate iff some but not all of them are checked or
/// indeterminate. Disabled and checkbox-disabled nodes are never modified by
/// propagation and never count towards their parent.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    expanded: FxHashSet<NodeId>,
    selected: FxHashSet<NodeId>,
    checked: FxHashSet<NodeId>,
    indeterminate: FxHashSet<NodeId>,
    loading: FxHashSet<NodeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state with preallocated capacity for the given number of nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            expanded: FxHashSet::with_capacity_and_hasher(capacity, FxBuildHasher),
            selected: FxHashSet::default(),
            checked: FxHashSet::with_capacity_and_hasher(capacity, FxBuildHasher),
            indeterminate: FxHashSet::default(),
            loading: FxHashSet::default(),
        }
    }

    /// Drops every tracked key.
    pub fn clear(&mut self) {
        self.expanded.clear();
        self.selected.clear();
        self.checked.clear();
        self.indeterminate.clear();
        self.loading.clear();
    }

    #[inline]
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    #[inline]
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    #[inline]
    pub fn is_checked(&self, id: NodeId) -> bool {
        self.checked.contains(&id)
    }

    #[inline]
    pub fn is_indeterminate(&self, id: NodeId) -> bool {
        self.indeterminate.contains(&id)
    }

    #[inline]
    pub fn is_loading(&self, id: NodeId) -> bool {
        self.loading.contains(&id)
    }

    pub(crate) const fn expanded_set(&self) -> &FxHashSet<NodeId> {
        &self.expanded
    }

    /// Flips the expansion of `key` and returns the new state.
    pub fn toggle_expand(&mut self, index: &TreeIndex, key: &str) -> Option<bool> {
        let Some(id) = index.id(key) else {
            log::trace!("toggle_expand: unknown key '{key}'");
            return None;
        };
        let expanded = !self.expanded.contains(&id);
        self.set_expanded(id, expanded);
        Some(expanded)
    }

    /// Sets expansion of a node; returns `true` if it changed.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        if expanded {
            self.expanded.insert(id)
        } else {
            self.loading.remove(&id);
            self.expanded.remove(&id)
        }
    }

    /// Expands every node that has children.
    ///
    /// Async nodes whose children have not arrived yet stay collapsed.
    pub fn expand_all(&mut self, index: &TreeIndex) {
        self.expanded.clear();
        for id in index.preorder() {
            if !index.children(id).is_empty() {
                self.expanded.insert(id);
            }
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.loading.clear();
    }

    /// Expands the ancestor chain of every key in `keys`.
    ///
    /// With `reset_first`, all nodes are collapsed before expanding. With
    /// `include_self_if_branch`, a non-leaf target is expanded too.
    pub fn expand_to_keys<I, S>(
        &mut self,
        index: &TreeIndex,
        keys: I,
        reset_first: bool,
        include_self_if_branch: bool,
    ) where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if reset_first {
            self.expanded.clear();
        }
        for key in keys {
            let Some(id) = index.id(key.as_ref()) else {
                continue;
            };
            self.expand_ancestors(index, id);
            if include_self_if_branch && index.entry(id).is_some_and(|entry| !entry.is_leaf()) {
                self.expanded.insert(id);
            }
        }
    }

    pub(crate) fn expand_ancestors(&mut self, index: &TreeIndex, id: NodeId) {
        for ancestor in index.ancestors(id) {
            if index.entry(ancestor).is_some_and(|entry| !entry.is_leaf()) {
                self.expanded.insert(ancestor);
            }
        }
    }

    /// Replaces the expanded set wholesale.
    pub(crate) fn set_expanded_set(&mut self, expanded: FxHashSet<NodeId>) {
        self.loading.retain(|id| expanded.contains(id));
        self.expanded = expanded;
    }

    /// Toggles selection of `key`.
    ///
    /// Disabled, non-selectable and unknown nodes are rejected with `None`.
    /// Without `multiple`, every other selected node is deselected first.
    pub fn select(&mut self, index: &TreeIndex, key: &str, multiple: bool) -> Option<SelectChange> {
        let Some(id) = index.id(key) else {
            log::trace!("select: unknown key '{key}'");
            return None;
        };
        let selected = !self.selected.contains(&id);
        self.set_selected(index, id, selected, multiple)
    }

    /// Sets selection of a node, honoring the same rejection rules as [`Self::select`].
    pub fn set_selected(
        &mut self,
        index: &TreeIndex,
        id: NodeId,
        selected: bool,
        multiple: bool,
    ) -> Option<SelectChange> {
        let entry = index.entry(id)?;
        if !entry.flags().can_select() {
            log::trace!("select: node '{}' is not selectable", entry.key());
            return None;
        }

        let mut cleared = Vec::new();
        if !multiple {
            cleared.extend(self.selected.iter().copied().filter(|&other| other != id));
            cleared.sort_unstable();
            for other in &cleared {
                self.selected.remove(other);
            }
        }
        if selected {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
        Some(SelectChange {
            id,
            selected,
            cleared,
        })
    }

    /// Sets the check state of `key` and propagates it.
    ///
    /// The value cascades to every enabled descendant, then each ancestor is
    /// recomputed from its children. Excluded ancestors are left untouched but
    /// the walk continues above them. With `strictly`, only the node changes.
    /// Returns the node on success; unknown or excluded nodes yield `None`.
    pub fn check(
        &mut self,
        index: &TreeIndex,
        key: &str,
        checked: bool,
        strictly: bool,
    ) -> Option<NodeId> {
        let Some(id) = index.id(key) else {
            log::trace!("check: unknown key '{key}'");
            return None;
        };
        let entry = index.entry(id)?;
        if entry.flags().check_excluded() {
            log::trace!("check: node '{key}' has its checkbox disabled");
            return None;
        }

        Self::set_flag(&mut self.checked, id, checked);
        self.indeterminate.remove(&id);
        if !strictly {
            self.conduct_down(index, id, checked);
            self.conduct_up(index, id);
        }
        Some(id)
    }

    /// Cascades `checked` to every enabled descendant of `id`.
    ///
    /// An excluded descendant stops the cascade for its own subtree.
    pub(crate) fn conduct_down(&mut self, index: &TreeIndex, id: NodeId, checked: bool) {
        let mut stack: Vec<NodeId> = index.children(id).to_vec();
        while let Some(node) = stack.pop() {
            let Some(entry) = index.entry(node) else {
                continue;
            };
            if entry.flags().check_excluded() {
                continue;
            }
            Self::set_flag(&mut self.checked, node, checked);
            self.indeterminate.remove(&node);
            stack.extend_from_slice(entry.children());
        }
    }

    /// Recomputes checked/indeterminate for every ancestor of `id`.
    pub(crate) fn conduct_up(&mut self, index: &TreeIndex, id: NodeId) {
        for ancestor in index.ancestors(id) {
            if index.entry(ancestor).is_none() {
                break;
            }
            self.recompute(index, ancestor);
        }
    }

    /// Derives the check state of `id` from its eligible children.
    ///
    /// Excluded nodes are left alone. A node without eligible children keeps
    /// its checked value but is never indeterminate.
    pub(crate) fn recompute(&mut self, index: &TreeIndex, id: NodeId) {
        let Some(entry) = index.entry(id) else {
            return;
        };
        if entry.flags().check_excluded() {
            return;
        }

        let mut eligible = 0usize;
        let mut checked = 0usize;
        let mut partial = false;
        for &child in entry.children() {
            if index
                .entry(child)
                .is_none_or(|child| child.flags().check_excluded())
            {
                continue;
            }
            eligible += 1;
            if self.checked.contains(&child) {
                checked += 1;
            } else if self.indeterminate.contains(&child) {
                partial = true;
            }
        }
        if eligible == 0 {
            self.indeterminate.remove(&id);
            return;
        }

        let all = checked == eligible;
        Self::set_flag(&mut self.checked, id, all);
        Self::set_flag(&mut self.indeterminate, id, !all && (checked > 0 || partial));
    }

    /// Returns checked keys with fully checked subtrees collapsed to their
    /// topmost checked ancestor, in pre-order.
    pub fn merged_checked_keys<'a>(&self, index: &'a TreeIndex) -> Vec<&'a str> {
        let mut full: FxHashMap<NodeId, bool> = FxHashMap::default();
        let mut out = Vec::new();
        for id in index.preorder() {
            if !self.checked.contains(&id) {
                continue;
            }
            let covered = index.parent(id).is_some_and(|parent| {
                self.checked.contains(&parent)
                    && *full
                        .entry(parent)
                        .or_insert_with(|| self.all_enabled_children_checked(index, parent))
            });
            if !covered && let Some(key) = index.key(id) {
                out.push(key);
            }
        }
        out
    }

    fn all_enabled_children_checked(&self, index: &TreeIndex, id: NodeId) -> bool {
        index.children(id).iter().all(|child| {
            index
                .entry(*child)
                .is_none_or(|entry| entry.flags().check_excluded())
                || self.checked.contains(child)
        })
    }

    pub fn expanded_keys<'a>(&self, index: &'a TreeIndex) -> Vec<&'a str> {
        Self::keys_in(index, &self.expanded)
    }

    pub fn selected_keys<'a>(&self, index: &'a TreeIndex) -> Vec<&'a str> {
        Self::keys_in(index, &self.selected)
    }

    pub fn checked_keys<'a>(&self, index: &'a TreeIndex) -> Vec<&'a str> {
        Self::keys_in(index, &self.checked)
    }

    /// Keys of indeterminate (half-checked) nodes.
    pub fn half_checked_keys<'a>(&self, index: &'a TreeIndex) -> Vec<&'a str> {
        Self::keys_in(index, &self.indeterminate)
    }

    pub(crate) fn keys_in<'a>(index: &'a TreeIndex, set: &FxHashSet<NodeId>) -> Vec<&'a str> {
        if set.is_empty() {
            return Vec::new();
        }
        index
            .preorder()
            .filter(|id| set.contains(id))
            .filter_map(|id| index.key(id))
            .collect()
    }

    pub(crate) fn set_loading(&mut self, id: NodeId, loading: bool) {
        Self::set_flag(&mut self.loading, id, loading);
    }

    /// Removes nodes that no longer exist in the index.
    pub fn prune_removed<I: IntoIterator<Item = NodeId>>(&mut self, removed: I) {
        for id in removed {
            self.expanded.remove(&id);
            self.selected.remove(&id);
            self.checked.remove(&id);
            self.indeterminate.remove(&id);
            self.loading.remove(&id);
        }
    }

    fn set_flag(set: &mut FxHashSet<NodeId>, id: NodeId, value: bool) {
        if value {
            set.insert(id);
        } else {
            set.remove(&id);
        }
    }
}
