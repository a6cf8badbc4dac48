//! Errors raised while ingesting tree data.

/// Result alias used by fallible tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Error type for tree construction and data ingestion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The same key appears more than once in the supplied tree.
    #[error("duplicate node key '{key}'")]
    DuplicateKey { key: String },

    /// A required field is absent from a source record.
    #[error("field '{field}' not found in node data")]
    MissingField { field: String },

    /// A field exists but holds a value of the wrong shape.
    #[error("field '{field}' has an unexpected type: expected {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
}

impl TreeError {
    /// Creates a duplicate key error.
    pub fn duplicate(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }

    /// Creates a missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid field error.
    pub fn invalid(field: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidField {
            field: field.into(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_item() {
        assert_eq!(
            TreeError::duplicate("0-1").to_string(),
            "duplicate node key '0-1'"
        );
        assert_eq!(
            TreeError::invalid("children", "array").to_string(),
            "field 'children' has an unexpected type: expected array"
        );
    }
}
