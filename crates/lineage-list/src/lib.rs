//! Lineage List
//!
//! Keeps a bulk-edit list coherent when it is retargeted from one field to a
//! structurally related one: the current row is carried over and remembered
//! items are converted to the new field.
//!
//! # Example
//!
//! ```rust,ignore
//! use lineage_list::ListSwitchCoordinator;
//!
//! let mut list = ListSwitchCoordinator::new(schema, entries);
//! list.switch_field(all_senses);
//! let index = list.recompute_current_index(&repo, &repo, &rows, current_entry);
//! ```

#![warn(missing_docs)]

pub mod coordinator;
pub mod items;

// Re-exports
pub use coordinator::{ConversionSummary, ListSwitchCoordinator};
pub use items::{ItemSet, TaggedItem};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for list coordination
    pub use crate::{ConversionSummary, ItemSet, ListSwitchCoordinator, TaggedItem};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
