//! Lineage Tree
//!
//! Declarative ownership tree over object classes, and the catalog of paths
//! that enumerate an owner's descendants as a list field shows them.
//!
//! # Overview
//!
//! - **OwnershipTree**: class nodes, their source fields and alternates
//! - **PathSpec**: compiled traversal from one owner class to one list field
//! - **PathCatalog**: all paths for one [`TraversalMode`]
//! - **LineageSchema**: tree plus first-only and exhaustive catalogs
//!
//! # Schema format
//!
//! ```yaml
//! ownership:
//!   class: LexEntry
//!   source_field: Entries
//!   owns:
//!     - class: LexSense
//!       source_field: AllSenses
//! paths:
//!   LexEntry-owns-AllSenses:
//!     - seq: Senses
//!       then: [this, { field: Senses }]
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod document;
pub mod error;
pub mod path;
pub mod schema;
pub mod tree;

// Re-exports
pub use catalog::PathCatalog;
pub use document::{ArmDocument, ClassDeclaration, SchemaDocument, StepDocument};
pub use error::SchemaError;
pub use path::{ChoiceArm, PathSpec, PathStep, TraversalMode};
pub use schema::{LineageSchema, SchemaConfig, DEFAULT_RELATION_KEYWORD};
pub use tree::{ClassNode, OwnershipTree};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for schema access
    pub use crate::{
        ClassNode, LineageSchema, OwnershipTree, PathCatalog, PathSpec, SchemaConfig,
        SchemaError, TraversalMode,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
