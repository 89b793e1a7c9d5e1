//! Correspondence resolution
//!
//! Maps objects shown under one list field to the objects that correspond to
//! them under another. The relationship between the two destination classes
//! decides the strategy:
//!
//! | Relationship | Strategy                                                     |
//! |--------------|--------------------------------------------------------------|
//! | Sibling      | none; the result is empty                                    |
//! | Ancestor     | owner of the new destination class                           |
//! | Descendant   | the object itself is the common ancestor, expanded by path   |
//! | Cousin       | owner of the lowest common ancestor class, expanded by path  |
//!
//! Each common ancestor is expanded once per call however many previous
//! objects lead to it.

use crate::classify::{RelationshipClassifier, RelationshipKind};
use indexmap::IndexSet;
use lineage_meta::{ClassId, FieldId, GhostFields, MetadataRegistry, ObjectId, ObjectRepository};
use lineage_tree::{LineageSchema, PathCatalog, TraversalMode};
use serde::Serialize;

/// Objects known under one field, to be mapped onto another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrespondenceRequest {
    /// Field the objects were shown under
    pub previous_field: FieldId,
    /// Objects to map
    pub previous_ids: Vec<ObjectId>,
    /// Field to map onto
    pub new_field: FieldId,
}

impl CorrespondenceRequest {
    /// Create request
    pub fn new(
        previous_field: FieldId,
        previous_ids: impl IntoIterator<Item = ObjectId>,
        new_field: FieldId,
    ) -> Self {
        Self {
            previous_field,
            previous_ids: previous_ids.into_iter().collect(),
            new_field,
        }
    }
}

/// Result of [`CorrespondenceResolver::resolve`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Correspondence {
    /// Objects valid under the new field, in discovery order
    pub relatives: IndexSet<ObjectId>,
    /// Common ancestors used to find them
    pub common_ancestors: IndexSet<ObjectId>,
    /// Relationship used; `None` when a destination class is unknown
    pub relationship: Option<RelationshipKind>,
}

impl Correspondence {
    /// True if nothing was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relatives.is_empty() && self.common_ancestors.is_empty()
    }
}

/// Resolves correspondences through one path catalog
pub struct CorrespondenceResolver<'a, R, G> {
    schema: &'a LineageSchema,
    catalog: &'a PathCatalog,
    repo: &'a R,
    ghosts: &'a G,
}

impl<'a, R: ObjectRepository, G: GhostFields> CorrespondenceResolver<'a, R, G> {
    /// Create resolver using the catalog for `mode`
    #[must_use]
    pub fn new(schema: &'a LineageSchema, mode: TraversalMode, repo: &'a R, ghosts: &'a G) -> Self {
        Self {
            schema,
            catalog: schema.catalog(mode),
            repo,
            ghosts,
        }
    }

    /// Traversal mode of the catalog in use
    #[inline]
    #[must_use]
    pub fn mode(&self) -> TraversalMode {
        self.catalog.mode()
    }

    /// Classifier over the schema's tree
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> RelationshipClassifier<'a> {
        RelationshipClassifier::new(self.schema.tree())
    }

    /// Convenience wrapper building the request
    #[must_use]
    pub fn resolve_ids(
        &self,
        previous_field: FieldId,
        previous_ids: impl IntoIterator<Item = ObjectId>,
        new_field: FieldId,
    ) -> Correspondence {
        self.resolve(&CorrespondenceRequest::new(previous_field, previous_ids, new_field))
    }

    /// Map `request.previous_ids` onto `request.new_field`
    ///
    /// Never fails: stale ids are skipped and a missing path contributes no
    /// descendants.
    #[must_use]
    pub fn resolve(&self, request: &CorrespondenceRequest) -> Correspondence {
        let mut out = Correspondence::default();
        let prev_dest = self.ghosts.destination_class(request.previous_field);
        let new_dest = self.ghosts.destination_class(request.new_field);
        let (Some(prev_dest), Some(new_dest)) = (prev_dest, new_dest) else {
            tracing::debug!(
                "no destination class for {} or {}",
                request.previous_field,
                request.new_field
            );
            return out;
        };

        let kind = self.classifier().classify(prev_dest, new_dest);
        out.relationship = Some(kind);
        match kind {
            RelationshipKind::Sibling => {
                tracing::debug!("sibling switch {} -> {}: nothing to resolve", prev_dest, new_dest);
            }
            RelationshipKind::Ancestor => self.resolve_ancestor(request, new_dest, &mut out),
            RelationshipKind::Descendant => self.resolve_descendant(request, new_dest, None, &mut out),
            RelationshipKind::Cousin => {
                match self.classifier().lowest_common_ancestor(prev_dest, new_dest) {
                    Some(lca) => self.resolve_descendant(request, new_dest, Some(lca), &mut out),
                    None => tracing::debug!("no common ancestor for {} and {}", prev_dest, new_dest),
                }
            }
        }

        tracing::debug!(
            "resolved {} ids as {}: {} relatives, {} common ancestors",
            request.previous_ids.len(),
            kind,
            out.relatives.len(),
            out.common_ancestors.len()
        );
        out
    }

    fn metadata(&self) -> &MetadataRegistry {
        self.schema.metadata()
    }

    fn resolve_ancestor(&self, request: &CorrespondenceRequest, new_dest: ClassId, out: &mut Correspondence) {
        let meta = self.metadata();
        for &id in &request.previous_ids {
            if !self.repo.is_valid(id) {
                continue;
            }
            let ancestor = if self.ghosts.is_ghost_owner(id, request.previous_field)
                && self.repo.is_instance_of(meta, id, new_dest)
            {
                Some(id)
            } else {
                self.repo.owner_of_class(meta, id, new_dest)
            };
            if let Some(ancestor) = ancestor {
                out.relatives.insert(ancestor);
                out.common_ancestors.insert(ancestor);
            }
        }
    }

    fn resolve_descendant(
        &self,
        request: &CorrespondenceRequest,
        new_dest: ClassId,
        common_class: Option<ClassId>,
        out: &mut Correspondence,
    ) {
        let meta = self.metadata();
        let Some(field_name) = meta.field_name(request.new_field) else {
            return;
        };

        for &id in &request.previous_ids {
            if !self.repo.is_valid(id) {
                continue;
            }
            if self.repo.is_instance_of(meta, id, new_dest) {
                out.relatives.insert(id);
                continue;
            }
            let ancestor = match common_class {
                None => id,
                Some(class) if self.repo.is_instance_of(meta, id, class) => id,
                Some(class) => match self.repo.owner_of_class(meta, id, class) {
                    Some(owner) => owner,
                    None => continue,
                },
            };
            if out.common_ancestors.insert(ancestor) {
                self.expand(ancestor, field_name, request.new_field, out);
            }
        }
    }

    fn expand(&self, ancestor: ObjectId, field_name: &str, new_field: FieldId, out: &mut Correspondence) {
        let Some(class) = self.repo.class_of(ancestor) else {
            return;
        };
        let descendants = match self.catalog.path_for_class(class, field_name) {
            Some(path) => path.descendants(ancestor, self.repo, self.metadata()),
            None => {
                self.missing_path(class, field_name);
                Vec::new()
            }
        };

        if descendants.is_empty() {
            if self.ghosts.is_ghost_owner(ancestor, new_field) {
                out.relatives.insert(ancestor);
            }
        } else {
            out.relatives.extend(descendants);
        }
    }

    fn missing_path(&self, class: ClassId, field_name: &str) {
        let owner = self.metadata().class_name(class).unwrap_or("?");
        tracing::warn!(
            "no path declared for {}-{}-{}",
            owner,
            self.catalog.relation(),
            field_name
        );

        #[cfg(feature = "strict-debug")]
        panic!(
            "Missing path entry: {}-{}-{}",
            owner,
            self.catalog.relation(),
            field_name
        );
    }
}
