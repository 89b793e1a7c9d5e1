//! Class ownership tree
//!
//! Provides [`OwnershipTree`], the rooted hierarchy of which class owns which.
//! It is built once from a [`ClassDeclaration`] and never mutated.
//!
//! Nested declarations plus rejection of duplicate classes mean every class
//! has exactly one path to the root, so ancestor walks always terminate.

use crate::document::ClassDeclaration;
use crate::error::SchemaError;
use indexmap::IndexMap;
use lineage_meta::{ClassId, MetadataRegistry};
use std::collections::HashMap;
use std::sync::Arc;

/// One class in the ownership tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    class: ClassId,
    name: String,
    parent: Option<ClassId>,
    children: Vec<ClassId>,
    depth: usize,
    source_field: String,
    alt_source_fields: IndexMap<String, String>,
}

impl ClassNode {
    /// Class id
    #[inline]
    #[must_use]
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Class name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning class, `None` for the root
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Directly owned classes in declaration order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ClassId] {
        &self.children
    }

    /// Distance from the root (root is 0)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Root-aggregate field yielding instances of this class
    #[inline]
    #[must_use]
    pub fn source_field(&self) -> &str {
        &self.source_field
    }

    /// Alternate source fields keyed by edited target field
    #[inline]
    #[must_use]
    pub fn alt_source_fields(&self) -> &IndexMap<String, String> {
        &self.alt_source_fields
    }

    /// True for the root class
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Rooted class ownership tree
#[derive(Debug, Clone)]
pub struct OwnershipTree {
    metadata: Arc<MetadataRegistry>,
    root: ClassId,
    nodes: HashMap<ClassId, ClassNode>,
    by_name: HashMap<String, ClassId>,
    by_source_field: HashMap<String, ClassId>,
    order: Vec<ClassId>,
}

impl OwnershipTree {
    /// Build from the root declaration
    ///
    /// # Errors
    /// Returns error if a class is unknown to the metadata, declared twice,
    /// claims a source field another class already claims, or carries a
    /// malformed alternate source field table
    pub fn from_declaration(
        root: &ClassDeclaration,
        metadata: Arc<MetadataRegistry>,
    ) -> Result<Self, SchemaError> {
        let root_id = metadata
            .class_id(&root.class)
            .ok_or_else(|| SchemaError::UnknownClass(root.class.clone()))?;
        let mut tree = Self {
            metadata,
            root: root_id,
            nodes: HashMap::new(),
            by_name: HashMap::new(),
            by_source_field: HashMap::new(),
            order: Vec::new(),
        };
        tree.declare(root, None, 0)?;

        tracing::debug!("Built ownership tree rooted at {} with {} classes", root.class, tree.len());
        Ok(tree)
    }

    fn declare(
        &mut self,
        decl: &ClassDeclaration,
        parent: Option<ClassId>,
        depth: usize,
    ) -> Result<ClassId, SchemaError> {
        let class = self
            .metadata
            .class_id(&decl.class)
            .ok_or_else(|| SchemaError::UnknownClass(decl.class.clone()))?;
        if self.nodes.contains_key(&class) {
            return Err(SchemaError::DuplicateClass(decl.class.clone()));
        }

        let alt_source_fields = match &decl.alt_source_field {
            Some(raw) => parse_alt_source_fields(&decl.class, raw)?,
            None => IndexMap::new(),
        };
        let claimed = std::iter::once(&decl.source_field).chain(alt_source_fields.values());
        for field in claimed {
            if let Some(&other) = self.by_source_field.get(field) {
                if other != class {
                    return Err(SchemaError::DuplicateSourceField {
                        field: field.clone(),
                        first: self.nodes[&other].name.clone(),
                        second: decl.class.clone(),
                    });
                }
            }
            self.by_source_field.insert(field.clone(), class);
        }

        self.nodes.insert(
            class,
            ClassNode {
                class,
                name: decl.class.clone(),
                parent,
                children: Vec::with_capacity(decl.owns.len()),
                depth,
                source_field: decl.source_field.clone(),
                alt_source_fields,
            },
        );
        self.by_name.insert(decl.class.clone(), class);
        self.order.push(class);

        for owned in &decl.owns {
            let child = self.declare(owned, Some(class), depth + 1)?;
            if let Some(node) = self.nodes.get_mut(&class) {
                node.children.push(child);
            }
        }
        Ok(class)
    }

    /// Metadata the tree was built against
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &Arc<MetadataRegistry> {
        &self.metadata
    }

    /// Root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> &ClassNode {
        &self.nodes[&self.root]
    }

    /// Node declared for exactly `class`
    #[inline]
    #[must_use]
    pub fn node(&self, class: ClassId) -> Option<&ClassNode> {
        self.nodes.get(&class)
    }

    /// Node for `class`, or for its nearest declared base class
    #[must_use]
    pub fn node_for(&self, class: ClassId) -> Option<&ClassNode> {
        self.metadata
            .lineage(class)
            .find_map(|c| self.nodes.get(&c))
    }

    /// Node by class name
    #[inline]
    #[must_use]
    pub fn node_named(&self, name: &str) -> Option<&ClassNode> {
        self.by_name.get(name).and_then(|c| self.nodes.get(c))
    }

    /// Node whose source field (or an alternate) is `field`
    #[inline]
    #[must_use]
    pub fn node_for_source_field(&self, field: &str) -> Option<&ClassNode> {
        self.by_source_field.get(field).and_then(|c| self.nodes.get(c))
    }

    /// Parent node
    #[inline]
    #[must_use]
    pub fn parent(&self, node: &ClassNode) -> Option<&ClassNode> {
        node.parent.and_then(|p| self.nodes.get(&p))
    }

    /// Strict ancestors of `class`'s node, nearest first
    pub fn ancestors(&self, class: ClassId) -> impl Iterator<Item = &ClassNode> + '_ {
        let start = self.node_for(class).and_then(|n| self.parent(n));
        std::iter::successors(start, move |n| self.parent(n))
    }

    /// True if `ancestor`'s node strictly owns `class`'s node, directly or transitively
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ClassId, class: ClassId) -> bool {
        self.node_for(ancestor)
            .is_some_and(|a| self.ancestors(class).any(|n| n.class == a.class))
    }

    /// True if `class` is `other` or inherits from it
    #[inline]
    #[must_use]
    pub fn is_same_or_subclass(&self, class: ClassId, other: ClassId) -> bool {
        self.metadata.is_same_or_subclass(class, other)
    }

    /// Source field to list `class` when bulk-editing `edited_field`
    ///
    /// Uses the alternate table when it has an entry for the edited field.
    #[must_use]
    pub fn source_field_for(&self, class: ClassId, edited_field: Option<&str>) -> Option<&str> {
        let node = self.node_for(class)?;
        let alt = edited_field.and_then(|f| node.alt_source_fields.get(f));
        Some(alt.map_or(node.source_field.as_str(), String::as_str))
    }

    /// Nodes in declaration (pre-)order
    pub fn nodes(&self) -> impl Iterator<Item = &ClassNode> {
        self.order.iter().filter_map(|c| self.nodes.get(c))
    }

    /// Strict descendants of `node`, in declaration order
    #[must_use]
    pub fn descendants(&self, node: &ClassNode) -> Vec<&ClassNode> {
        let mut out = Vec::new();
        let mut stack: Vec<ClassId> = node.children.iter().rev().copied().collect();
        while let Some(class) = stack.pop() {
            if let Some(child) = self.nodes.get(&class) {
                out.push(child);
                stack.extend(child.children.iter().rev().copied());
            }
        }
        out
    }

    /// Number of classes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn parse_alt_source_fields(
    class: &str,
    raw: &str,
) -> Result<IndexMap<String, String>, SchemaError> {
    let invalid = || SchemaError::InvalidAltSourceField {
        class: class.to_string(),
        value: raw.to_string(),
    };

    let mut table = IndexMap::new();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (target, alt) = entry.split_once(':').ok_or_else(invalid)?;
        let (target, alt) = (target.trim(), alt.trim());
        if target.is_empty() || alt.is_empty() {
            return Err(invalid());
        }
        table.insert(target.to_string(), alt.to_string());
    }
    Ok(table)
}
