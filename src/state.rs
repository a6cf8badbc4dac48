use rustc_hash::FxHashSet;

use crate::action::{ActionOutcome, TreeAction};
use crate::config::TreeConfig;
use crate::error::TreeResult;
use crate::event::{NoListener, TreeEvent, TreeListener};
use crate::index::{FlatNode, NodeId, TreeIndex};
use crate::model::TreeNode;
use crate::search::{SearchIndex, SearchMatch};
use crate::selection::SelectionState;
use crate::window::VirtualWindow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::model::FieldNames;

/// Read-only view of a node together with its derived state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct NodeView<'a> {
    pub id: NodeId,
    pub key: &'a str,
    pub label: &'a str,
    pub level: u16,
    pub is_leaf: bool,
    pub disabled: bool,
    pub disable_checkbox: bool,
    pub selectable: bool,
    pub expanded: bool,
    pub selected: bool,
    pub checked: bool,
    pub indeterminate: bool,
    pub loading: bool,
    pub matched: bool,
}

/// Snapshot of state (expansion, selection, checks, search).
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStateSnapshot {
    pub expanded_keys: Vec<String>,
    pub selected_keys: Vec<String>,
    pub checked_keys: Vec<String>,
    /// Active search query, if any.
    pub query: Option<String>,
}

/// Tree state engine: index, selection, search and visible rows.
///
/// Every mutation is reported to the listener `L` as a [`TreeEvent`].
pub struct TreeState<L = NoListener> {
    config: TreeConfig,
    index: TreeIndex,
    selection: SelectionState,
    search: SearchIndex,
    window: VirtualWindow,
    listener: L,
}

impl TreeState<NoListener> {
    /// Builds state for `nodes` without an event listener.
    pub fn new(nodes: &[TreeNode], config: TreeConfig) -> TreeResult<Self> {
        Self::with_listener(nodes, config, NoListener)
    }
}

#[cfg(feature = "serde")]
impl<L: TreeListener> TreeState<L> {
    /// Builds state from JSON records whose attribute names are given by `fields`.
    pub fn from_json(
        value: &serde_json::Value,
        fields: &FieldNames,
        config: TreeConfig,
        listener: L,
    ) -> TreeResult<Self> {
        let nodes = TreeNode::from_json(value, fields)?;
        Self::with_listener(&nodes, config, listener)
    }
}

impl<L: TreeListener> TreeState<L> {
    /// Builds state for `nodes`, reporting changes to `listener`.
    ///
    /// Configured defaults and per-node initial flags are applied without
    /// emitting events.
    pub fn with_listener(nodes: &[TreeNode], config: TreeConfig, listener: L) -> TreeResult<Self> {
        let mut state = Self {
            index: TreeIndex::default(),
            selection: SelectionState::new(),
            search: SearchIndex::new(),
            window: VirtualWindow::new(),
            config,
            listener,
        };
        state.set_nodes(nodes)?;
        Ok(state)
    }

    /// Replaces the tree; the index and all derived state are rebuilt.
    ///
    /// On error the previous tree and state are kept.
    pub fn set_nodes(&mut self, nodes: &[TreeNode]) -> TreeResult<()> {
        let index = if self.config.validate_keys {
            TreeIndex::try_build(nodes, self.config.async_data)?
        } else {
            TreeIndex::build(nodes, self.config.async_data)
        };
        self.selection = SelectionState::with_capacity(index.len());
        self.window = VirtualWindow::with_capacity(index.len());
        self.search.clear();
        self.index = index;

        if self.config.default_expand_all {
            self.selection.expand_all(&self.index);
        }
        self.selection.expand_to_keys(
            &self.index,
            &self.config.default_expanded_keys,
            false,
            true,
        );
        for key in &self.config.default_selected_keys {
            if let Some(id) = self.index.id(key) {
                self.selection
                    .set_selected(&self.index, id, true, self.config.multiple);
            }
        }
        if self.config.checkable {
            for key in &self.config.default_checked_keys {
                self.selection
                    .check(&self.index, key, true, self.config.check_strictly);
            }
        }
        self.apply_node_flags(nodes);
        Ok(())
    }

    // Applies the `expanded`/`selected`/`checked` flags carried by the data.
    fn apply_node_flags(&mut self, nodes: &[TreeNode]) {
        let mut stack: Vec<&TreeNode> = nodes.iter().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children.iter());
            let Some(id) = self.index.id(&node.key) else {
                continue;
            };
            if node.expanded {
                self.selection
                    .expand_to_keys(&self.index, [node.key.as_str()], false, true);
            }
            if node.selected {
                self.selection
                    .set_selected(&self.index, id, true, self.config.multiple);
            }
            if node.checked && self.config.checkable {
                self.selection
                    .check(&self.index, &node.key, true, self.config.check_strictly);
            }
        }
        self.window.invalidate();
    }

    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub const fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub const fn search_index(&self) -> &SearchIndex {
        &self.search
    }

    pub const fn listener(&self) -> &L {
        &self.listener
    }

    pub const fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Returns the node and its derived state.
    pub fn node(&self, key: &str) -> Option<NodeView<'_>> {
        let id = self.index.id(key)?;
        let entry = self.index.entry(id)?;
        let flags = entry.flags();
        Some(NodeView {
            id,
            key: entry.key(),
            label: entry.label(),
            level: entry.level(),
            is_leaf: entry.is_leaf(),
            disabled: flags.disabled,
            disable_checkbox: flags.disable_checkbox,
            selectable: flags.selectable,
            expanded: self.selection.is_expanded(id),
            selected: self.selection.is_selected(id),
            checked: self.selection.is_checked(id),
            indeterminate: self.selection.is_indeterminate(id),
            loading: self.selection.is_loading(id),
            matched: self.search.is_matched(id),
        })
    }

    /// Flips the expansion of `key` and returns the new state.
    ///
    /// Expanding an async node that has no children yet marks it loading and
    /// emits [`TreeEvent::LoadDataRequested`].
    pub fn toggle_expand(&mut self, key: &str) -> Option<bool> {
        let expanded = self.selection.toggle_expand(&self.index, key)?;
        self.after_expand(key, expanded);
        Some(expanded)
    }

    /// Sets expansion of `key`; returns whether it changed (`None` if unknown).
    pub fn set_expanded(&mut self, key: &str, expanded: bool) -> Option<bool> {
        let id = self.index.id(key)?;
        let changed = self.selection.set_expanded(id, expanded);
        if changed {
            self.after_expand(key, expanded);
        }
        Some(changed)
    }

    fn after_expand(&mut self, key: &str, expanded: bool) {
        self.window.invalidate();
        self.listener.on_event(TreeEvent::ExpandChanged {
            key: key.to_owned(),
            expanded,
        });
        if expanded {
            self.request_children(key);
        }
    }

    fn request_children(&mut self, key: &str) {
        if !self.index.async_data() {
            return;
        }
        let Some(id) = self.index.id(key) else {
            return;
        };
        let needs_load = self
            .index
            .entry(id)
            .is_some_and(|entry| !entry.is_leaf() && entry.children().is_empty());
        if !needs_load || self.selection.is_loading(id) {
            return;
        }
        self.selection.set_loading(id, true);
        log::debug!("requesting children for '{key}'");
        self.listener.on_event(TreeEvent::LoadDataRequested {
            key: key.to_owned(),
        });
    }

    /// Expands every node that has children.
    pub fn expand_all(&mut self) {
        let before = self.selection.expanded_set().clone();
        self.selection.expand_all(&self.index);
        self.after_bulk_expand(&before);
    }

    pub fn collapse_all(&mut self) {
        let before = self.selection.expanded_set().clone();
        self.selection.collapse_all();
        self.after_bulk_expand(&before);
    }

    /// Expands the ancestors of each key (see [`SelectionState::expand_to_keys`]).
    pub fn expand_to_keys<I, S>(&mut self, keys: I, reset_first: bool, include_self_if_branch: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.selection.expanded_set().clone();
        self.selection
            .expand_to_keys(&self.index, keys, reset_first, include_self_if_branch);
        self.after_bulk_expand(&before);
    }

    fn after_bulk_expand(&mut self, before: &FxHashSet<NodeId>) {
        let after = self.selection.expanded_set();
        let mut changes: Vec<(NodeId, bool)> = before
            .difference(after)
            .map(|&id| (id, false))
            .chain(after.difference(before).map(|&id| (id, true)))
            .collect();
        if changes.is_empty() {
            return;
        }
        changes.sort_unstable();
        self.window.invalidate();
        for (id, expanded) in changes {
            if let Some(key) = self.index.key(id) {
                self.listener.on_event(TreeEvent::ExpandChanged {
                    key: key.to_owned(),
                    expanded,
                });
            }
        }
    }

    /// Toggles selection of `key`; returns the new state.
    ///
    /// Disabled, non-selectable and unknown nodes are rejected with `None`.
    pub fn select(&mut self, key: &str, multiple: bool) -> Option<bool> {
        let change = self.selection.select(&self.index, key, multiple)?;
        for id in change.cleared {
            if let Some(cleared) = self.index.key(id) {
                self.listener.on_event(TreeEvent::SelectedChanged {
                    key: cleared.to_owned(),
                    selected: false,
                });
            }
        }
        self.listener.on_event(TreeEvent::SelectedChanged {
            key: key.to_owned(),
            selected: change.selected,
        });
        Some(change.selected)
    }

    /// Sets the checkbox of `key` with propagation; returns `true` if applied.
    ///
    /// Rejected when checkboxes are not enabled, the key is unknown, or the
    /// node (or its checkbox) is disabled.
    pub fn check(&mut self, key: &str, checked: bool) -> bool {
        if !self.config.checkable {
            log::trace!("check: checkboxes are disabled");
            return false;
        }
        if self
            .selection
            .check(&self.index, key, checked, self.config.check_strictly)
            .is_none()
        {
            return false;
        }
        self.listener.on_event(TreeEvent::CheckChanged {
            key: key.to_owned(),
            checked,
        });
        true
    }

    /// Checked keys with fully checked subtrees collapsed to their top node.
    pub fn merged_checked_keys(&self) -> Vec<&str> {
        self.selection.merged_checked_keys(&self.index)
    }

    pub fn checked_keys(&self) -> Vec<&str> {
        self.selection.checked_keys(&self.index)
    }

    pub fn half_checked_keys(&self) -> Vec<&str> {
        self.selection.half_checked_keys(&self.index)
    }

    pub fn selected_keys(&self) -> Vec<&str> {
        self.selection.selected_keys(&self.index)
    }

    pub fn expanded_keys(&self) -> Vec<&str> {
        self.selection.expanded_keys(&self.index)
    }

    pub fn matched_keys(&self) -> Vec<&str> {
        self.search.matched_keys(&self.index)
    }

    /// Searches labels case-insensitively and returns the matching keys.
    ///
    /// The expanded set is replaced: ancestors of matches are expanded,
    /// matches keep their own expansion and every other node collapses.
    /// An empty query clears the search and collapses the tree.
    pub fn search(&mut self, query: &str) -> Vec<&str> {
        let before = self.selection.expanded_set().clone();
        let count = self.search.search(&self.index, &mut self.selection, query);
        self.after_search(&before, count);
        self.search.matched_keys(&self.index)
    }

    /// Same as [`Self::search`] with a custom matcher.
    pub fn search_with<M: SearchMatch>(&mut self, query: &str, matcher: &M) -> Vec<&str> {
        let before = self.selection.expanded_set().clone();
        let count = self
            .search
            .search_with(&self.index, &mut self.selection, query, matcher);
        self.after_search(&before, count);
        self.search.matched_keys(&self.index)
    }

    fn after_search(&mut self, before: &FxHashSet<NodeId>, match_count: usize) {
        self.after_bulk_expand(before);
        self.window.invalidate();
        self.listener
            .on_event(TreeEvent::SearchCompleted { match_count });
    }

    /// Returns `true` if every ancestor of `key` is expanded.
    pub fn is_visible(&self, key: &str) -> bool {
        self.index.id(key).is_some_and(|id| {
            VirtualWindow::is_visible(&self.index, self.selection.expanded_set(), id)
        })
    }

    /// Returns the rows to render, recomputing them only after changes.
    pub fn visible_nodes(&mut self) -> &[FlatNode] {
        self.ensure_visible_nodes();
        self.window.rows()
    }

    /// Returns the keys of the visible rows.
    pub fn visible_keys(&mut self) -> Vec<&str> {
        self.ensure_visible_nodes();
        self.window
            .rows()
            .iter()
            .filter_map(|row| self.index.key(row.id()))
            .collect()
    }

    /// Returns the visible rows that fit a viewport.
    pub fn visible_range(&mut self, offset: usize, height: usize) -> &[FlatNode] {
        self.ensure_visible_nodes();
        self.window.range(offset, height)
    }

    /// Returns the visible row index of `key`.
    pub fn visible_position(&mut self, key: &str) -> Option<usize> {
        let id = self.index.id(key)?;
        self.ensure_visible_nodes();
        self.window.position_of(id)
    }

    fn ensure_visible_nodes(&mut self) {
        let filter = (self.config.hide_unmatched && self.search.is_active())
            .then(|| self.search.context());
        self.window
            .ensure_rows(&self.index, self.selection.expanded_set(), filter);
    }

    /// Supplies children for an async node and clears its loading marker.
    ///
    /// Only the node's subtree is re-indexed. Children of a checked parent
    /// inherit the check; otherwise the node and its ancestors are
    /// recomputed from the new children. Returns `Ok(false)` for unknown keys.
    pub fn attach_children(&mut self, key: &str, children: &[TreeNode]) -> TreeResult<bool> {
        let Some(id) = self.index.id(key) else {
            log::trace!("attach_children: unknown key '{key}'");
            return Ok(false);
        };
        let removed = self.index.descendants(id);
        if !self
            .index
            .attach_children(key, children, self.config.validate_keys)?
        {
            return Ok(false);
        }
        self.selection.prune_removed(removed.iter().copied());
        self.search.prune_removed(removed);
        self.selection.set_loading(id, false);

        if self.config.checkable && !self.config.check_strictly {
            if self.selection.is_checked(id) {
                self.selection.conduct_down(&self.index, id, true);
            } else {
                self.selection.recompute(&self.index, id);
            }
            self.selection.conduct_up(&self.index, id);
        }
        self.apply_node_flags(children);
        Ok(true)
    }

    /// Captures expansion, selection, checks and the search query.
    pub fn snapshot(&self) -> TreeStateSnapshot {
        let owned = |keys: Vec<&str>| -> Vec<String> { keys.into_iter().map(str::to_owned).collect() };
        TreeStateSnapshot {
            expanded_keys: owned(self.expanded_keys()),
            selected_keys: owned(self.selected_keys()),
            checked_keys: owned(self.checked_keys()),
            query: self.search.query().map(str::to_owned),
        }
    }

    /// Restores a snapshot without emitting events; unknown keys are skipped.
    ///
    /// Checked keys are re-applied with propagation, so the restored check
    /// state is always consistent.
    pub fn restore(&mut self, snapshot: &TreeStateSnapshot) {
        self.selection.clear();
        self.search.clear();
        if let Some(query) = snapshot.query.as_deref() {
            self.search.search(&self.index, &mut self.selection, query);
        }

        let expanded = snapshot
            .expanded_keys
            .iter()
            .filter_map(|key| self.index.id(key))
            .collect();
        self.selection.set_expanded_set(expanded);
        for key in &snapshot.selected_keys {
            if let Some(id) = self.index.id(key) {
                self.selection.set_selected(&self.index, id, true, true);
            }
        }
        if self.config.checkable {
            for key in &snapshot.checked_keys {
                self.selection
                    .check(&self.index, key, true, self.config.check_strictly);
            }
        }
        self.window.invalidate();
    }

    /// Handles an action and reports whether it changed anything.
    pub fn handle_action(&mut self, action: TreeAction<'_>) -> ActionOutcome {
        let handled = match action {
            TreeAction::ToggleExpand(key) => self.toggle_expand(key).is_some(),
            TreeAction::Expand(key) => self.set_expanded(key, true).unwrap_or(false),
            TreeAction::Collapse(key) => self.set_expanded(key, false).unwrap_or(false),
            TreeAction::Select(key) => self.select(key, self.config.multiple).is_some(),
            TreeAction::Check(key, checked) => self.check(key, checked),
            TreeAction::ToggleCheck(key) => {
                let checked = self.node(key).is_some_and(|node| node.checked);
                self.check(key, !checked)
            }
            TreeAction::Search(query) => {
                self.search(query);
                true
            }
            TreeAction::ExpandTo(key) => {
                if self.index.id(key).is_none() {
                    return ActionOutcome::Unhandled;
                }
                self.expand_to_keys([key], false, false);
                true
            }
            TreeAction::ExpandAll => {
                self.expand_all();
                true
            }
            TreeAction::CollapseAll => {
                self.collapse_all();
                true
            }
        };
        ActionOutcome::from_handled(handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;

    fn nodes() -> Vec<TreeNode> {
        vec![
            TreeNode::new("1", "A").with_children(vec![
                TreeNode::new("1-1", "B"),
                TreeNode::new("1-2", "C"),
            ]),
            TreeNode::new("2", "D"),
        ]
    }

    fn checkable() -> TreeConfig {
        TreeConfig::new().checkable(true)
    }

    #[test]
    fn check_emits_single_event_for_target() {
        let mut state = TreeState::with_listener(&nodes(), checkable(), EventLog::new()).unwrap();

        assert!(state.check("1", true));

        assert_eq!(
            state.listener_mut().drain(),
            vec![TreeEvent::CheckChanged {
                key: "1".into(),
                checked: true
            }]
        );
    }

    #[test]
    fn check_requires_checkable() {
        let mut state = TreeState::new(&nodes(), TreeConfig::new()).unwrap();
        assert!(!state.check("1", true));
        assert!(state.checked_keys().is_empty());
    }

    #[test]
    fn single_select_reports_cleared_node() {
        let mut state =
            TreeState::with_listener(&nodes(), TreeConfig::new(), EventLog::new()).unwrap();
        state.select("1-1", false);
        state.listener_mut().drain();

        state.select("2", false);

        assert_eq!(
            state.listener_mut().drain(),
            vec![
                TreeEvent::SelectedChanged {
                    key: "1-1".into(),
                    selected: false
                },
                TreeEvent::SelectedChanged {
                    key: "2".into(),
                    selected: true
                },
            ]
        );
    }

    #[test]
    fn defaults_are_applied_silently() {
        let config = checkable()
            .multiple(true)
            .default_expanded_keys(["1-2"])
            .default_selected_keys(["1-1", "2"])
            .default_checked_keys(["1-1"]);
        let state = TreeState::with_listener(&nodes(), config, EventLog::new()).unwrap();

        assert_eq!(state.expanded_keys(), vec!["1"]);
        assert_eq!(state.selected_keys(), vec!["1-1", "2"]);
        assert_eq!(state.checked_keys(), vec!["1-1"]);
        assert_eq!(state.half_checked_keys(), vec!["1"]);
        assert!(state.listener().events().is_empty());
    }

    #[test]
    fn node_flags_from_data_are_applied() {
        let mut data = nodes();
        data[0].children[1].checked = true;
        data[0].expanded = true;
        let state = TreeState::new(&data, checkable()).unwrap();

        assert_eq!(state.expanded_keys(), vec!["1"]);
        assert_eq!(state.checked_keys(), vec!["1-2"]);
        assert!(state.node("1").unwrap().indeterminate);
    }

    #[test]
    fn default_expand_all_opens_every_branch() {
        let state = TreeState::new(&nodes(), TreeConfig::new().default_expand_all(true)).unwrap();
        assert_eq!(state.expanded_keys(), vec!["1"]);
    }

    #[test]
    fn duplicate_keys_fail_when_validating() {
        let data = vec![TreeNode::new("x", "a"), TreeNode::new("x", "b")];
        assert!(TreeState::new(&data, TreeConfig::new().validate_keys(true)).is_err());

        let state = TreeState::new(&data, TreeConfig::new().validate_keys(false)).unwrap();
        assert_eq!(state.node("x").unwrap().label, "b");
    }

    #[test]
    fn async_expand_requests_children_while_unloaded() {
        let data = vec![TreeNode::new("r", "remote")];
        let config = TreeConfig::new().async_data(true);
        let mut state = TreeState::with_listener(&data, config, EventLog::new()).unwrap();

        state.toggle_expand("r");
        state.toggle_expand("r");
        state.toggle_expand("r");

        let loads = state
            .listener()
            .events()
            .iter()
            .filter(|event| matches!(event, TreeEvent::LoadDataRequested { .. }))
            .count();
        assert_eq!(loads, 2);
        assert!(state.node("r").unwrap().loading);

        state
            .attach_children("r", &[TreeNode::new("r-1", "child").leaf(true)])
            .unwrap();
        let node = state.node("r").unwrap();
        assert!(!node.loading);
        assert!(!node.is_leaf);
        assert_eq!(state.visible_keys(), vec!["r", "r-1"]);
    }

    #[test]
    fn attached_children_inherit_parent_check() {
        let data = vec![TreeNode::new("r", "remote")];
        let config = checkable().async_data(true);
        let mut state = TreeState::new(&data, config).unwrap();
        state.check("r", true);

        state
            .attach_children("r", &[TreeNode::new("r-1", "a"), TreeNode::new("r-2", "b")])
            .unwrap();

        assert_eq!(state.checked_keys(), vec!["r", "r-1", "r-2"]);
        assert_eq!(state.merged_checked_keys(), vec!["r"]);
    }

    #[test]
    fn reloading_children_recomputes_stale_check_state() {
        let data = vec![TreeNode::new("root", "root").with_children(vec![
            TreeNode::new("r", "branch")
                .with_children(vec![TreeNode::new("a", "a"), TreeNode::new("b", "b")]),
        ])];
        let mut state = TreeState::new(&data, checkable()).unwrap();
        state.check("a", true);
        assert_eq!(state.half_checked_keys(), vec!["root", "r"]);

        state
            .attach_children("r", &[TreeNode::new("c", "c")])
            .unwrap();

        assert!(state.checked_keys().is_empty());
        assert!(state.half_checked_keys().is_empty());

        state
            .attach_children(
                "r",
                &[TreeNode {
                    checked: true,
                    ..TreeNode::new("d", "d")
                }],
            )
            .unwrap();
        assert_eq!(state.checked_keys(), vec!["root", "r", "d"]);
        assert!(state.half_checked_keys().is_empty());
    }

    #[test]
    fn search_reports_expansion_and_completion() {
        let mut state =
            TreeState::with_listener(&nodes(), TreeConfig::new(), EventLog::new()).unwrap();

        assert_eq!(state.search("c"), vec!["1-2"]);

        assert_eq!(
            state.listener_mut().drain(),
            vec![
                TreeEvent::ExpandChanged {
                    key: "1".into(),
                    expanded: true
                },
                TreeEvent::SearchCompleted { match_count: 1 },
            ]
        );
    }

    #[test]
    fn hide_unmatched_filters_visible_rows() {
        let config = TreeConfig::new().hide_unmatched(true);
        let mut state = TreeState::new(&nodes(), config).unwrap();

        state.search("b");
        assert_eq!(state.visible_keys(), vec!["1", "1-1"]);

        state.search("");
        assert_eq!(state.visible_keys(), vec!["1", "2"]);
    }

    #[test]
    fn handle_action_dispatches() {
        let mut state = TreeState::new(&nodes(), checkable()).unwrap();

        assert_eq!(
            state.handle_action(TreeAction::ToggleCheck("1-1")),
            ActionOutcome::Handled
        );
        assert_eq!(
            state.handle_action(TreeAction::ToggleCheck("1")),
            ActionOutcome::Handled
        );
        assert_eq!(state.checked_keys(), vec!["1", "1-1", "1-2"]);

        assert_eq!(
            state.handle_action(TreeAction::Expand("missing")),
            ActionOutcome::Unhandled
        );
        assert_eq!(
            state.handle_action(TreeAction::ExpandTo("1-2")),
            ActionOutcome::Handled
        );
        assert!(state.is_visible("1-2"));
    }

    #[test]
    fn snapshot_round_trip() {
        let config = checkable().multiple(true);
        let mut state = TreeState::new(&nodes(), config.clone()).unwrap();
        state.toggle_expand("1");
        state.select("2", true);
        state.check("1-1", true);
        let snapshot = state.snapshot();

        let mut restored = TreeState::new(&nodes(), config).unwrap();
        restored.restore(&snapshot);

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.half_checked_keys(), vec!["1"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_state_with_custom_fields_persists_snapshot() {
        let data = serde_json::json!([
            { "value": "1", "label": "A", "items": [
                { "value": "1-1", "label": "B" },
                { "value": "1-2", "label": "C", "checked": true }
            ]}
        ]);
        let fields = FieldNames::new("label", "value", "items");
        let mut state = TreeState::from_json(&data, &fields, checkable(), NoListener).unwrap();
        assert_eq!(state.half_checked_keys(), vec!["1"]);

        state.search("b");
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        let snapshot: TreeStateSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot.query.as_deref(), Some("b"));
        assert_eq!(snapshot.checked_keys, vec!["1-2".to_owned()]);
    }
}
