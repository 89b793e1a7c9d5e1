//! Error types for schema loading
//!
//! Every variant is a load-time configuration defect. Lookups against a built
//! schema never fail.

use lineage_meta::MetadataError;

/// Errors while loading a [`LineageSchema`](crate::LineageSchema)
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Document could not be parsed
    #[error("schema syntax error: {0}")]
    Syntax(String),

    /// Class not present in the metadata system
    #[error("unknown class: '{0}'")]
    UnknownClass(String),

    /// Class declared more than once in the ownership tree
    #[error("class declared twice in ownership tree: '{0}'")]
    DuplicateClass(String),

    /// Two tree classes claim the same source field
    #[error("source field '{field}' claimed by both {first} and {second}")]
    DuplicateSourceField {
        field: String,
        first: String,
        second: String,
    },

    /// Alternate source field table not of the form `Target:Alt;Target:Alt`
    #[error("invalid alt_source_field on {class}: '{value}'")]
    InvalidAltSourceField { class: String, value: String },

    /// Path id not of the form `Owner-Relation-Field`
    #[error("invalid path id: '{0}' (expected Owner-Relation-Field)")]
    InvalidPathId(String),

    /// Path id uses a relation keyword other than the configured one
    #[error("path '{id}' uses relation '{found}', expected '{expected}'")]
    UnexpectedRelation {
        id: String,
        found: String,
        expected: String,
    },

    /// Traversal step is ill-formed or names an unknown field
    #[error("invalid step in path '{path}': {reason}")]
    InvalidStep { path: String, reason: String },

    /// Metadata lookup failed
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),
}

impl SchemaError {
    /// Create invalid step error
    pub fn invalid_step(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidStep {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
