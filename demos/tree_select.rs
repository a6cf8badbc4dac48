// Tree-select flow: async loading, search, checkboxes and merged tags.
//
// Run with `RUST_LOG=debug cargo run --example tree_select` to see engine logs.
use tree_select_core::prelude::*;

fn n(key: &str, title: &str) -> TreeNode {
    TreeNode::new(key, title)
}

fn print_rows(state: &mut TreeState<EventLog>) {
    let rows: Vec<FlatNode> = state.visible_nodes().to_vec();
    for row in rows {
        let Some(key) = state.index().key(row.id()) else {
            continue;
        };
        let Some(node) = state.node(key) else {
            continue;
        };
        let mark = if node.checked {
            "[x]"
        } else if node.indeterminate {
            "[-]"
        } else {
            "[ ]"
        };
        let branch = if row.is_last_sibling() { "└─" } else { "├─" };
        let indent = "  ".repeat(usize::from(row.level()));
        println!("{indent}{branch} {mark} {}", node.label);
    }
}

fn main() -> Result<(), TreeError> {
    env_logger::init();

    let nodes = vec![
        n("fruit", "Fruit").with_children(vec![
            n("fruit-apple", "Apple").leaf(true),
            n("fruit-pear", "Pear").leaf(true),
            n("fruit-citrus", "Citrus"),
        ]),
        n("veg", "Vegetables").with_children(vec![
            n("veg-leek", "Leek").leaf(true),
            n("veg-kale", "Kale").leaf(true),
        ]),
    ];
    let config = TreeConfig::new()
        .checkable(true)
        .multiple(true)
        .async_data(true)
        .default_expanded_keys(["fruit"]);
    let mut state = TreeState::with_listener(&nodes, config, EventLog::new())?;

    println!("initial:");
    print_rows(&mut state);

    // Expanding an unloaded branch asks the host for data.
    state.handle_action(TreeAction::ToggleExpand("fruit-citrus"));
    for event in state.listener_mut().drain() {
        if let TreeEvent::LoadDataRequested { key } = event {
            state.attach_children(
                &key,
                &[
                    n("citrus-lemon", "Lemon").leaf(true),
                    n("citrus-lime", "Lime").leaf(true),
                ],
            )?;
        }
    }

    state.handle_action(TreeAction::Check("fruit-citrus", true));
    state.handle_action(TreeAction::Check("fruit-apple", true));
    state.handle_action(TreeAction::Check("veg", true));
    println!("\nafter checks:");
    print_rows(&mut state);
    println!("tags: {:?}", state.merged_checked_keys());

    let matches: Vec<String> = state.search("le").into_iter().map(str::to_owned).collect();
    println!("\nsearch 'le' -> {matches:?}");
    print_rows(&mut state);

    for event in state.listener_mut().drain() {
        println!("event: {event:?}");
    }
    Ok(())
}
