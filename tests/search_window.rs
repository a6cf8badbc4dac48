use tree_select_core::{TreeConfig, TreeNode, TreeState};

fn n(key: &str, title: &str) -> TreeNode {
    TreeNode::new(key, title)
}

fn deep_tree() -> Vec<TreeNode> {
    vec![
        n("a", "Animals").with_children(vec![
            n("a-0", "Mammals").with_children(vec![
                n("a-0-0", "Felines").with_children(vec![n("a-0-0-0", "Snow leopard")]),
            ]),
            n("a-1", "Birds"),
        ]),
        n("p", "Plants").with_children(vec![n("p-0", "Ferns")]),
    ]
}

#[test]
fn search_expands_ancestors_of_deep_leaf_only() {
    let mut state = TreeState::new(&deep_tree(), TreeConfig::new()).unwrap();

    let matches = state.search("LEOPARD");
    assert_eq!(matches, vec!["a-0-0-0"]);

    assert_eq!(state.expanded_keys(), vec!["a", "a-0", "a-0-0"]);
    assert!(!state.node("a-0-0-0").unwrap().expanded);
    assert!(state.node("a-0-0-0").unwrap().matched);
    assert!(state.is_visible("a-0-0-0"));
}

#[test]
fn empty_search_collapses_everything() {
    let mut state =
        TreeState::new(&deep_tree(), TreeConfig::new().default_expand_all(true)).unwrap();
    assert!(!state.expanded_keys().is_empty());

    assert!(state.search("").is_empty());

    assert!(state.expanded_keys().is_empty());
    assert_eq!(state.visible_keys(), vec!["a", "p"]);
}

#[test]
fn collapsed_deep_tree_shows_only_roots() {
    let mut state = TreeState::new(&deep_tree(), TreeConfig::new()).unwrap();

    assert_eq!(state.visible_keys(), vec!["a", "p"]);
    assert!(state.is_visible("a"));
    assert!(!state.is_visible("a-0"));
    assert!(!state.is_visible("unknown"));
}

#[test]
fn visibility_requires_every_ancestor_expanded() {
    let mut state = TreeState::new(&deep_tree(), TreeConfig::new()).unwrap();

    state.toggle_expand("a-0");
    assert!(!state.is_visible("a-0-0"));

    state.toggle_expand("a");
    assert!(state.is_visible("a-0-0"));
    assert_eq!(state.visible_keys(), vec!["a", "a-0", "a-0-0", "a-1", "p"]);
    assert_eq!(state.visible_position("a-1"), Some(3));
    assert_eq!(state.visible_range(1, 2).len(), 2);
}

#[test]
fn expand_to_keys_with_reset() {
    let mut state = TreeState::new(&deep_tree(), TreeConfig::new()).unwrap();
    state.toggle_expand("p");

    state.expand_to_keys(["a-0-0"], true, true);

    assert_eq!(state.expanded_keys(), vec!["a", "a-0", "a-0-0"]);
}

#[test]
fn attach_children_updates_visibility() {
    let nodes = vec![n("root", "root").with_children(vec![n("lazy", "lazy")])];
    let config = TreeConfig::new()
        .async_data(true)
        .default_expand_all(true);
    let mut state = TreeState::new(&nodes, config).unwrap();
    assert!(!state.node("lazy").unwrap().is_leaf);

    state.toggle_expand("lazy");
    assert!(state.node("lazy").unwrap().loading);

    let loaded = state
        .attach_children("lazy", &[n("lazy-0", "x").leaf(true), n("lazy-1", "y").leaf(true)])
        .unwrap();

    assert!(loaded);
    assert_eq!(state.index().len(), 4);
    assert_eq!(state.index().parent_key("lazy-1"), Some("lazy"));
    assert!(!state.node("lazy").unwrap().loading);
    assert_eq!(
        state.visible_keys(),
        vec!["root", "lazy", "lazy-0", "lazy-1"]
    );
}

#[test]
fn attaching_no_children_turns_node_into_leaf() {
    let nodes = vec![n("lazy", "lazy")];
    let mut state = TreeState::new(&nodes, TreeConfig::new().async_data(true)).unwrap();

    state.toggle_expand("lazy");
    state.attach_children("lazy", &[]).unwrap();

    let node = state.node("lazy").unwrap();
    assert!(node.is_leaf);
    assert!(!node.loading);
}

#[test]
fn reattaching_over_partially_checked_children_resets_ancestors() {
    let nodes = vec![n("root", "root").with_children(vec![
        n("r", "branch").with_children(vec![n("a", "a"), n("b", "b")]),
        n("s", "sibling"),
    ])];
    let mut state = TreeState::new(&nodes, TreeConfig::new().checkable(true)).unwrap();
    state.check("a", true);
    state.check("s", true);
    assert_eq!(state.half_checked_keys(), vec!["root", "r"]);

    state.attach_children("r", &[n("c", "c"), n("d", "d")]).unwrap();

    assert_eq!(state.checked_keys(), vec!["s"]);
    assert_eq!(state.half_checked_keys(), vec!["root"]);
    assert_eq!(state.merged_checked_keys(), vec!["s"]);

    state.check("c", true);
    state.check("d", true);
    assert_eq!(state.merged_checked_keys(), vec!["root"]);
}
