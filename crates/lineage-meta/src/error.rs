//! Error types for metadata and snapshot loading
//!
//! Both are load-time errors: once a registry or snapshot has been built,
//! lookups return `Option` instead of failing.

use crate::id::{FieldId, ObjectId};

/// Errors while building a [`MetadataRegistry`](crate::MetadataRegistry)
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Class declared twice
    #[error("duplicate class: '{0}'")]
    DuplicateClass(String),

    /// Class name not declared (yet)
    #[error("unknown class: '{0}'")]
    UnknownClass(String),

    /// Field declared twice on the same class
    #[error("duplicate field: {class}.{field}")]
    DuplicateField { class: String, field: String },

    /// Field not found on class or its bases
    #[error("unknown field: {class}.{field}")]
    UnknownField { class: String, field: String },

    /// Field path not of the form `Class.Field`
    #[error("invalid field path: '{0}' (expected Class.Field)")]
    InvalidFieldPath(String),

    /// Document could not be parsed
    #[error("metadata syntax error: {0}")]
    Syntax(String),
}

impl MetadataError {
    /// Create unknown field error
    pub fn unknown_field(class: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            class: class.into(),
            field: field.into(),
        }
    }
}

/// Errors while building a [`SnapshotRepository`](crate::SnapshotRepository)
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Class or field reference could not be resolved
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Null object id used
    #[error("object id 0 is reserved")]
    NullObject,

    /// Object id inserted twice
    #[error("duplicate object: {0}")]
    DuplicateObject(ObjectId),

    /// Object id not present in the snapshot
    #[error("unknown object: {0}")]
    UnknownObject(ObjectId),

    /// Field does not belong to the object's class
    #[error("field {field} does not apply to object {object}")]
    FieldNotApplicable { object: ObjectId, field: FieldId },

    /// Atomic field given more than one value
    #[error("atomic field {field} on object {object} already holds a value")]
    AtomicOverflow { object: ObjectId, field: FieldId },

    /// Document could not be parsed
    #[error("snapshot syntax error: {0}")]
    Syntax(String),
}
