#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Behavior flags and initial state, applied whenever nodes are (re)loaded.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TreeConfig {
    /// Allows more than one selected node.
    pub multiple: bool,
    /// Enables checkbox semantics.
    pub checkable: bool,
    /// Disables parent/child check propagation.
    pub check_strictly: bool,
    /// Children may arrive later; leaf status is left to the data.
    pub async_data: bool,
    /// While searching, only show matches and their ancestors.
    pub hide_unmatched: bool,
    /// Rejects duplicate keys instead of letting the later node win.
    pub validate_keys: bool,
    pub default_expand_all: bool,
    pub default_expanded_keys: Vec<String>,
    pub default_selected_keys: Vec<String>,
    pub default_checked_keys: Vec<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            multiple: false,
            checkable: false,
            check_strictly: false,
            async_data: false,
            hide_unmatched: false,
            validate_keys: cfg!(debug_assertions),
            default_expand_all: false,
            default_expanded_keys: Vec::new(),
            default_selected_keys: Vec::new(),
            default_checked_keys: Vec::new(),
        }
    }
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    #[must_use]
    pub const fn checkable(mut self, checkable: bool) -> Self {
        self.checkable = checkable;
        self
    }

    #[must_use]
    pub const fn check_strictly(mut self, strictly: bool) -> Self {
        self.check_strictly = strictly;
        self
    }

    #[must_use]
    pub const fn async_data(mut self, async_data: bool) -> Self {
        self.async_data = async_data;
        self
    }

    #[must_use]
    pub const fn hide_unmatched(mut self, hide: bool) -> Self {
        self.hide_unmatched = hide;
        self
    }

    #[must_use]
    pub const fn validate_keys(mut self, validate: bool) -> Self {
        self.validate_keys = validate;
        self
    }

    #[must_use]
    pub const fn default_expand_all(mut self, expand_all: bool) -> Self {
        self.default_expand_all = expand_all;
        self
    }

    #[must_use]
    pub fn default_expanded_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_expanded_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn default_selected_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_selected_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn default_checked_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_checked_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}
