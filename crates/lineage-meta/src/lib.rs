//! Lineage Metadata
//!
//! Identifiers, class/field metadata and the read-only interfaces through
//! which the resolver sees live objects.
//!
//! # Overview
//!
//! - **ObjectId / ClassId / FieldId**: `u32` newtypes with a null value
//! - **MetadataRegistry**: classes with single inheritance and their fields
//! - **ObjectRepository**: validity, class, owner and field-value lookups
//! - **GhostFields**: destination classes and ghost-row detection for list fields
//! - **SnapshotRepository**: in-memory object graph implementing both traits
//!
//! # Example
//!
//! ```rust
//! use lineage_meta::{FieldKind, MetadataRegistry};
//!
//! let mut builder = MetadataRegistry::builder();
//! builder.class("LexEntry", None).unwrap();
//! builder.class("LexSense", None).unwrap();
//! builder
//!     .field("LexEntry", "Senses", FieldKind::Sequence, Some("LexSense"))
//!     .unwrap();
//! let metadata = builder.build();
//!
//! let senses = metadata.field_by_path("LexEntry.Senses").unwrap();
//! assert_eq!(metadata.field_name(senses), Some("Senses"));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod id;
pub mod metadata;
pub mod repository;
pub mod snapshot;

// Re-exports
pub use error::{MetadataError, SnapshotError};
pub use id::{ClassId, FieldId, ObjectId};
pub use metadata::{
    ClassDef, ClassDocument, FieldDef, FieldDocument, FieldKind, MetadataBuilder, MetadataDocument,
    MetadataRegistry,
};
pub use repository::{GhostFields, NoGhosts, ObjectRepository, MAX_OWNER_DEPTH};
pub use snapshot::{GhostDocument, GhostRule, ObjectDocument, SnapshotDocument, SnapshotRepository};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for metadata and repository access
    pub use crate::{
        ClassId, FieldId, FieldKind, GhostFields, MetadataRegistry, ObjectId, ObjectRepository,
        SnapshotRepository,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
