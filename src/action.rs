/// Commands a host can forward to [`TreeState::handle_action`](crate::TreeState::handle_action).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeAction<'a> {
    /// Flip expansion of the node.
    ToggleExpand(&'a str),
    /// Expand the node.
    Expand(&'a str),
    /// Collapse the node.
    Collapse(&'a str),
    /// Toggle selection using the configured selection mode.
    Select(&'a str),
    /// Set the node's checkbox.
    Check(&'a str, bool),
    /// Check an unchecked or indeterminate node; uncheck a checked one.
    ToggleCheck(&'a str),
    /// Run a label search (empty query resets).
    Search(&'a str),
    /// Expand the ancestor chain so the node becomes visible.
    ExpandTo(&'a str),
    /// Expand all nodes in the tree.
    ExpandAll,
    /// Collapse all nodes in the tree.
    CollapseAll,
}

/// Result of handling an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action was applied and state was updated.
    Handled,
    /// The action was ignored (unknown key, disabled node, capability off).
    Unhandled,
}

impl ActionOutcome {
    pub const fn from_handled(handled: bool) -> Self {
        if handled {
            Self::Handled
        } else {
            Self::Unhandled
        }
    }
}
