#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::error::{TreeError, TreeResult};

/// Caller-supplied tree node.
///
/// A node owns its children, so the input is always a proper tree:
/// cycles cannot be expressed. Keys must be unique across the whole tree.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode {
    /// Stable unique identifier.
    pub key: String,
    /// Display text; used by search.
    pub title: String,
    /// Ordered children; empty means no children (yet).
    pub children: Vec<TreeNode>,
    /// Excludes the node from selection and check propagation.
    pub disabled: bool,
    /// Excludes the node from check propagation only.
    pub disable_checkbox: bool,
    /// Whether the node can be selected.
    pub selectable: bool,
    /// Explicit leaf flag. Derived at build time when absent.
    pub is_leaf: Option<bool>,
    /// Initial expansion.
    pub expanded: bool,
    /// Initial selection.
    pub selected: bool,
    /// Initial check state.
    pub checked: bool,
}

impl Default for TreeNode {
    fn default() -> Self {
        Self {
            key: String::new(),
            title: String::new(),
            children: Vec::new(),
            disabled: false,
            disable_checkbox: false,
            selectable: true,
            is_leaf: None,
            expanded: false,
            selected: false,
            checked: false,
        }
    }
}

impl TreeNode {
    /// Creates a node without children.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Replaces the node's children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Marks the node as disabled.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Disables only the node's checkbox.
    #[must_use]
    pub const fn disable_checkbox(mut self) -> Self {
        self.disable_checkbox = true;
        self
    }

    /// Sets whether the node can be selected.
    #[must_use]
    pub const fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Sets an explicit leaf flag.
    #[must_use]
    pub const fn leaf(mut self, is_leaf: bool) -> Self {
        self.is_leaf = Some(is_leaf);
        self
    }

    /// Returns the number of nodes in this subtree, including itself.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    /// Returns the capability flags of this node.
    pub const fn flags(&self) -> NodeFlags {
        NodeFlags {
            disabled: self.disabled,
            disable_checkbox: self.disable_checkbox,
            selectable: self.selectable,
        }
    }
}

/// Capability flags copied into the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeFlags {
    pub disabled: bool,
    pub disable_checkbox: bool,
    pub selectable: bool,
}

impl NodeFlags {
    /// Returns `true` if the node takes no part in check propagation.
    #[inline]
    pub const fn check_excluded(self) -> bool {
        self.disabled || self.disable_checkbox
    }

    /// Returns `true` if the node may be selected.
    #[inline]
    pub const fn can_select(self) -> bool {
        !self.disabled && self.selectable
    }
}

/// Names of the attributes that carry label, key and children in source data.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldNames {
    pub label: String,
    pub value: String,
    pub children: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            label: "title".to_owned(),
            value: "key".to_owned(),
            children: "children".to_owned(),
        }
    }
}

impl FieldNames {
    pub fn new(
        label: impl Into<String>,
        value: impl Into<String>,
        children: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            children: children.into(),
        }
    }
}

#[cfg(feature = "serde")]
impl TreeNode {
    /// Converts loosely shaped JSON records into typed nodes.
    ///
    /// `value` must be an array of objects. Field names are resolved here,
    /// once; the index never looks at the JSON again. Numeric keys are
    /// accepted and stringified.
    pub fn from_json(value: &serde_json::Value, fields: &FieldNames) -> TreeResult<Vec<Self>> {
        let items = value
            .as_array()
            .ok_or_else(|| TreeError::invalid(fields.children.as_str(), "array"))?;
        items.iter().map(|item| Self::from_json_object(item, fields)).collect()
    }

    fn from_json_object(value: &serde_json::Value, fields: &FieldNames) -> TreeResult<Self> {
        use serde_json::Value;

        let object = value
            .as_object()
            .ok_or_else(|| TreeError::invalid(fields.value.as_str(), "object"))?;

        let key = match object.get(&fields.value) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => return Err(TreeError::invalid(fields.value.as_str(), "string or number")),
            None => return Err(TreeError::missing(fields.value.as_str())),
        };
        let title = match object.get(&fields.label) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(_) => return Err(TreeError::invalid(fields.label.as_str(), "string")),
        };
        let children = match object.get(&fields.children) {
            Some(Value::Null) | None => Vec::new(),
            Some(children @ Value::Array(_)) => Self::from_json(children, fields)?,
            Some(_) => return Err(TreeError::invalid(fields.children.as_str(), "array")),
        };

        let flag = |name: &str| object.get(name).and_then(Value::as_bool);
        Ok(Self {
            key,
            title,
            children,
            disabled: flag("disabled").unwrap_or(false),
            disable_checkbox: flag("disableCheckbox").unwrap_or(false),
            selectable: flag("selectable").unwrap_or(true),
            is_leaf: flag("isLeaf"),
            expanded: flag("expanded").unwrap_or(false),
            selected: flag("selected").unwrap_or(false),
            checked: flag("checked").unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_len_counts_all_descendants() {
        let node = TreeNode::new("0", "root").with_children(vec![
            TreeNode::new("0-0", "a").with_children(vec![TreeNode::new("0-0-0", "b")]),
            TreeNode::new("0-1", "c"),
        ]);
        assert_eq!(node.subtree_len(), 4);
    }

    #[test]
    fn disabled_nodes_cannot_be_selected() {
        let node = TreeNode::new("0", "root").disabled();
        assert!(!node.flags().can_select());
        assert!(node.flags().check_excluded());

        let node = TreeNode::new("1", "other").disable_checkbox();
        assert!(node.flags().can_select());
        assert!(node.flags().check_excluded());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_ingestion_uses_custom_field_names() {
        let data = serde_json::json!([
            { "id": 1, "name": "Root", "items": [
                { "id": "1-1", "name": "Child", "disabled": true }
            ]}
        ]);
        let fields = FieldNames::new("name", "id", "items");
        let nodes = TreeNode::from_json(&data, &fields).unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].key, "1");
        assert_eq!(nodes[0].title, "Root");
        assert_eq!(nodes[0].children[0].key, "1-1");
        assert!(nodes[0].children[0].disabled);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_ingestion_reports_missing_key() {
        let data = serde_json::json!([{ "title": "no key" }]);
        let err = TreeNode::from_json(&data, &FieldNames::default()).unwrap_err();
        assert_eq!(err, TreeError::missing("key"));
    }
}
