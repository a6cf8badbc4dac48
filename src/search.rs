use rustc_hash::FxHashSet;

use crate::index::{NodeEntry, NodeId, TreeIndex};
use crate::selection::SelectionState;

/// Custom label matcher for [`SearchIndex::search_with`].
pub trait SearchMatch {
    /// Returns `true` if `label` matches `query`.
    fn is_match(&self, label: &str, query: &str) -> bool;
}

impl<F> SearchMatch for F
where
    F: Fn(&str, &str) -> bool,
{
    #[inline]
    fn is_match(&self, label: &str, query: &str) -> bool {
        self(label, query)
    }
}

/// Label search with ancestor auto-expansion.
#[derive(Clone, Debug, Default)]
pub struct SearchIndex {
    query: Option<String>,
    // Matches in pre-order.
    matches: Vec<NodeId>,
    matched: FxHashSet<NodeId>,
    // Matches plus all of their ancestors.
    context: FxHashSet<NodeId>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring search over node labels.
    ///
    /// An empty query clears the results and collapses the whole tree.
    /// Otherwise every ancestor of every match is expanded, matched nodes
    /// keep their current expansion and all other nodes are collapsed.
    /// Returns the number of matches.
    pub fn search(
        &mut self,
        index: &TreeIndex,
        selection: &mut SelectionState,
        query: &str,
    ) -> usize {
        let needle = query.to_lowercase();
        self.run(index, selection, query, |entry| {
            entry.label_lower().contains(needle.as_str())
        })
    }

    /// Same as [`Self::search`] with a caller-supplied matcher.
    pub fn search_with<M: SearchMatch>(
        &mut self,
        index: &TreeIndex,
        selection: &mut SelectionState,
        query: &str,
        matcher: &M,
    ) -> usize {
        self.run(index, selection, query, |entry| {
            matcher.is_match(entry.label(), query)
        })
    }

    fn run<F>(
        &mut self,
        index: &TreeIndex,
        selection: &mut SelectionState,
        query: &str,
        mut is_match: F,
    ) -> usize
    where
        F: FnMut(&NodeEntry) -> bool,
    {
        self.clear();
        if query.is_empty() {
            selection.collapse_all();
            return 0;
        }
        self.query = Some(query.to_owned());

        let mut expanded = FxHashSet::default();
        for id in index.preorder() {
            let Some(entry) = index.entry(id) else {
                continue;
            };
            if !is_match(entry) {
                continue;
            }
            self.matches.push(id);
            self.matched.insert(id);
            self.context.insert(id);
            if selection.is_expanded(id) {
                expanded.insert(id);
            }
            for ancestor in index.ancestors(id) {
                if index.entry(ancestor).is_some_and(|entry| !entry.is_leaf()) {
                    expanded.insert(ancestor);
                }
                // Ancestors above an earlier match are already recorded.
                if !self.context.insert(ancestor) {
                    break;
                }
            }
        }
        selection.set_expanded_set(expanded);

        log::debug!("search '{query}': {} matches", self.matches.len());
        self.matches.len()
    }

    /// Drops the query and all results without touching expansion.
    pub fn clear(&mut self) {
        self.query = None;
        self.matches.clear();
        self.matched.clear();
        self.context.clear();
    }

    /// Returns the active query, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub const fn is_active(&self) -> bool {
        self.query.is_some()
    }

    /// Returns the matches in pre-order.
    pub fn matches(&self) -> &[NodeId] {
        &self.matches
    }

    pub fn matched_keys<'a>(&self, index: &'a TreeIndex) -> Vec<&'a str> {
        self.matches.iter().filter_map(|&id| index.key(id)).collect()
    }

    #[inline]
    pub fn is_matched(&self, id: NodeId) -> bool {
        self.matched.contains(&id)
    }

    pub(crate) const fn context(&self) -> &FxHashSet<NodeId> {
        &self.context
    }

    /// Forgets nodes removed from the index.
    pub fn prune_removed<I: IntoIterator<Item = NodeId>>(&mut self, removed: I) {
        for id in removed {
            if self.matched.remove(&id) {
                self.matches.retain(|m| *m != id);
            }
            self.context.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNode;

    fn index() -> TreeIndex {
        let nodes = vec![
            TreeNode::new("0", "Fruits").with_children(vec![
                TreeNode::new("0-0", "Citrus").with_children(vec![
                    TreeNode::new("0-0-0", "Lemon"),
                    TreeNode::new("0-0-1", "Orange"),
                ]),
                TreeNode::new("0-1", "Apple"),
            ]),
            TreeNode::new("1", "Vegetables").with_children(vec![TreeNode::new("1-0", "Leek")]),
        ];
        TreeIndex::build(&nodes, false)
    }

    #[test]
    fn matches_case_insensitively_in_preorder() {
        let index = index();
        let mut selection = SelectionState::new();
        let mut search = SearchIndex::new();

        let count = search.search(&index, &mut selection, "LE");

        assert_eq!(count, 4);
        assert_eq!(
            search.matched_keys(&index),
            vec!["0-0-0", "0-1", "1", "1-0"]
        );
    }

    #[test]
    fn expands_ancestors_but_not_matched_leaf() {
        let index = index();
        let mut selection = SelectionState::new();
        let mut search = SearchIndex::new();

        search.search(&index, &mut selection, "orange");

        assert_eq!(search.matched_keys(&index), vec!["0-0-1"]);
        assert_eq!(selection.expanded_keys(&index), vec!["0", "0-0"]);
    }

    #[test]
    fn collapses_unrelated_nodes_and_keeps_matched_expansion() {
        let index = index();
        let mut selection = SelectionState::new();
        let mut search = SearchIndex::new();
        selection.expand_all(&index);

        search.search(&index, &mut selection, "citrus");

        assert_eq!(selection.expanded_keys(&index), vec!["0", "0-0"]);
    }

    #[test]
    fn empty_query_resets_results_and_collapses() {
        let index = index();
        let mut selection = SelectionState::new();
        let mut search = SearchIndex::new();

        search.search(&index, &mut selection, "lemon");
        assert!(search.is_active());

        assert_eq!(search.search(&index, &mut selection, ""), 0);
        assert!(!search.is_active());
        assert!(search.matches().is_empty());
        assert!(selection.expanded_keys(&index).is_empty());
    }

    #[test]
    fn custom_matcher_is_used() {
        let index = index();
        let mut selection = SelectionState::new();
        let mut search = SearchIndex::new();
        let prefix = |label: &str, query: &str| label.starts_with(query);

        search.search_with(&index, &mut selection, "Le", &prefix);

        assert_eq!(search.matched_keys(&index), vec!["0-0-0", "1-0"]);
    }
}
