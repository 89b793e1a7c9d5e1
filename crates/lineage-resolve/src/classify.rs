//! Relationship classification between two classes of the ownership tree

use lineage_meta::ClassId;
use lineage_tree::OwnershipTree;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a previous class relates to a new class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    /// Previous class is the new class or a subclass of it
    Sibling,
    /// New class owns the previous class, directly or transitively
    Ancestor,
    /// Previous class owns the new class, directly or transitively
    Descendant,
    /// Neither owns the other
    Cousin,
}

impl RelationshipKind {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sibling => "sibling",
            Self::Ancestor => "ancestor",
            Self::Descendant => "descendant",
            Self::Cousin => "cousin",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies class pairs against an [`OwnershipTree`]
#[derive(Debug, Clone, Copy)]
pub struct RelationshipClassifier<'a> {
    tree: &'a OwnershipTree,
}

impl<'a> RelationshipClassifier<'a> {
    /// Create classifier over `tree`
    #[inline]
    #[must_use]
    pub fn new(tree: &'a OwnershipTree) -> Self {
        Self { tree }
    }

    /// Relationship of `prev` to `new`; first matching rule wins
    ///
    /// Classes missing from the tree classify as [`RelationshipKind::Cousin`]
    /// unless related by inheritance.
    #[must_use]
    pub fn classify(&self, prev: ClassId, new: ClassId) -> RelationshipKind {
        let kind = if self.tree.is_same_or_subclass(prev, new) {
            RelationshipKind::Sibling
        } else if self.tree.is_ancestor(new, prev) {
            RelationshipKind::Ancestor
        } else if self.tree.is_ancestor(prev, new) {
            RelationshipKind::Descendant
        } else {
            RelationshipKind::Cousin
        };
        tracing::debug!("classified {} -> {} as {}", prev, new, kind);
        kind
    }

    /// Nearest strict ancestor of `prev`'s node that also owns `new`'s node
    #[must_use]
    pub fn lowest_common_ancestor(&self, prev: ClassId, new: ClassId) -> Option<ClassId> {
        self.tree
            .ancestors(prev)
            .map(lineage_tree::ClassNode::class)
            .find(|&candidate| self.tree.is_ancestor(candidate, new))
    }
}
