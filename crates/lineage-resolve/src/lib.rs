//! Lineage Resolve
//!
//! Classifies how two classes of an ownership tree relate and maps objects
//! shown under one list field onto the corresponding objects of another.
//!
//! # Example
//!
//! ```rust,ignore
//! use lineage_resolve::{CorrespondenceResolver, RelationshipKind};
//! use lineage_tree::TraversalMode;
//!
//! let resolver = CorrespondenceResolver::new(&schema, TraversalMode::Exhaustive, &repo, &repo);
//! let result = resolver.resolve_ids(entries, [entry], all_senses);
//! assert_eq!(result.relationship, Some(RelationshipKind::Descendant));
//! ```
//!
//! # Features
//!
//! - `strict-debug`: panic when a required path entry is missing

#![warn(missing_docs)]

pub mod classify;
pub mod resolver;

// Re-exports
pub use classify::{RelationshipClassifier, RelationshipKind};
pub use resolver::{Correspondence, CorrespondenceRequest, CorrespondenceResolver};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for resolution
    pub use crate::{
        Correspondence, CorrespondenceRequest, CorrespondenceResolver, RelationshipClassifier,
        RelationshipKind,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
