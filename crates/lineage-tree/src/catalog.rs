//! Path catalog
//!
//! Maps `(owner class, list field)` to a compiled [`PathSpec`]. Ids take the
//! form `Owner-Relation-Field`, e.g. `LexEntry-owns-AllSenses`; the relation
//! keyword is configurable and checked at load time.

use crate::document::StepDocument;
use crate::error::SchemaError;
use crate::path::{PathSpec, TraversalMode};
use crate::tree::OwnershipTree;
use indexmap::IndexMap;
use lineage_meta::{ClassId, MetadataRegistry, ObjectId, ObjectRepository};
use std::sync::Arc;

/// Compiled paths for one traversal mode
#[derive(Debug, Clone)]
pub struct PathCatalog {
    metadata: Arc<MetadataRegistry>,
    mode: TraversalMode,
    relation: String,
    entries: IndexMap<(ClassId, String), PathSpec>,
}

impl PathCatalog {
    /// Compile every path in `paths`
    ///
    /// # Errors
    /// Returns error for malformed ids, unexpected relation keywords, unknown
    /// owner classes and invalid steps
    pub fn compile(
        paths: &IndexMap<String, Vec<StepDocument>>,
        metadata: Arc<MetadataRegistry>,
        relation: &str,
        mode: TraversalMode,
    ) -> Result<Self, SchemaError> {
        let mut entries = IndexMap::with_capacity(paths.len());
        for (id, steps) in paths {
            let (owner_name, field) = split_path_id(id, relation)?;
            let owner = metadata
                .class_id(owner_name)
                .ok_or_else(|| SchemaError::UnknownClass(owner_name.to_string()))?;
            let spec = PathSpec::compile(id, owner, field, steps, &metadata, mode)?;
            entries.insert((owner, field.to_string()), spec);
        }
        tracing::debug!("compiled {} paths ({:?})", entries.len(), mode);
        Ok(Self {
            metadata,
            mode,
            relation: relation.to_string(),
            entries,
        })
    }

    /// Traversal mode baked into every entry
    #[inline]
    #[must_use]
    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    /// Relation keyword used in path ids
    #[inline]
    #[must_use]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Path declared for exactly `owner`
    #[must_use]
    pub fn path_for(&self, owner: &str, field: &str) -> Option<&PathSpec> {
        let class = self.metadata.class_id(owner)?;
        self.entries.get(&(class, field.to_string()))
    }

    /// Path for `class` or its nearest base class declaring one
    #[must_use]
    pub fn path_for_class(&self, class: ClassId, field: &str) -> Option<&PathSpec> {
        let key = field.to_string();
        self.metadata
            .lineage(class)
            .find_map(|c| self.entries.get(&(c, key.clone())))
    }

    /// Descendants of `owner` shown by the list field `field`
    ///
    /// `None` when no path covers the owner's class.
    #[must_use]
    pub fn descendants<R: ObjectRepository>(
        &self,
        owner: ObjectId,
        field: &str,
        repo: &R,
    ) -> Option<Vec<ObjectId>> {
        let class = repo.class_of(owner)?;
        let spec = self.path_for_class(class, field)?;
        Some(spec.descendants(owner, repo, &self.metadata))
    }

    /// Ids of ancestor/descendant pairs in `tree` with no path
    ///
    /// A descendant's alternate source fields need paths as well.
    #[must_use]
    pub fn missing_entries(&self, tree: &OwnershipTree) -> Vec<String> {
        let mut missing = Vec::new();
        for ancestor in tree.nodes() {
            for descendant in tree.descendants(ancestor) {
                let fields = std::iter::once(descendant.source_field())
                    .chain(descendant.alt_source_fields().values().map(String::as_str));
                for field in fields {
                    if self.path_for_class(ancestor.class(), field).is_none() {
                        missing.push(format!("{}-{}-{}", ancestor.name(), self.relation, field));
                    }
                }
            }
        }
        missing
    }

    /// Iterate entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &PathSpec> {
        self.entries.values()
    }

    /// Number of paths
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no paths are declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn split_path_id<'a>(id: &'a str, relation: &str) -> Result<(&'a str, &'a str), SchemaError> {
    let parts: Vec<&str> = id.split('-').collect();
    let [owner, found, field] = parts.as_slice() else {
        return Err(SchemaError::InvalidPathId(id.to_string()));
    };
    if owner.is_empty() || field.is_empty() {
        return Err(SchemaError::InvalidPathId(id.to_string()));
    }
    if *found != relation {
        return Err(SchemaError::UnexpectedRelation {
            id: id.to_string(),
            found: (*found).to_string(),
            expected: relation.to_string(),
        });
    }
    Ok((owner, field))
}
