//! List switch coordination
//!
//! A bulk-edit list can be retargeted from one field to another (entries to
//! senses, say). [`ListSwitchCoordinator`] remembers the switch and uses the
//! correspondence resolver to carry the current row and the remembered items
//! over to the new field.

use crate::items::{ItemSet, TaggedItem};
use indexmap::IndexSet;
use lineage_meta::{FieldId, GhostFields, ObjectId, ObjectRepository};
use lineage_resolve::{CorrespondenceResolver, RelationshipKind};
use lineage_tree::{LineageSchema, TraversalMode};
use std::sync::Arc;

/// Outcome of [`ListSwitchCoordinator::convert_item_set`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Groups that produced at least one relative
    pub converted_groups: usize,
    /// Original items removed
    pub removed: usize,
    /// Relatives inserted under the current field
    pub inserted: usize,
    /// Items left untouched because their group resolved to nothing
    pub unresolved: usize,
}

/// Tracks the field a list shows and the field it showed before
#[derive(Debug, Clone)]
pub struct ListSwitchCoordinator {
    schema: Arc<LineageSchema>,
    current_field: FieldId,
    previous_field: Option<FieldId>,
}

impl ListSwitchCoordinator {
    /// Create coordinator for a list showing `field`
    #[must_use]
    pub fn new(schema: Arc<LineageSchema>, field: FieldId) -> Self {
        Self {
            schema,
            current_field: field,
            previous_field: None,
        }
    }

    /// Schema in use
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<LineageSchema> {
        &self.schema
    }

    /// Field the list shows now
    #[inline]
    #[must_use]
    pub fn current_field(&self) -> FieldId {
        self.current_field
    }

    /// Field shown before the last switch
    #[inline]
    #[must_use]
    pub fn previous_field(&self) -> Option<FieldId> {
        self.previous_field
    }

    /// Retarget the list; returns the field it showed before
    ///
    /// Switching to the current field changes nothing.
    pub fn switch_field(&mut self, field: FieldId) -> Option<FieldId> {
        if field != self.current_field {
            tracing::debug!("switching list from {} to {}", self.current_field, field);
            self.previous_field = Some(self.current_field);
            self.current_field = field;
        }
        self.previous_field
    }

    /// Position in `list` that best corresponds to `previous_current`
    ///
    /// `list` is the new, sorted list of the current field. Returns `None`
    /// when nothing in the list corresponds.
    #[must_use]
    pub fn recompute_current_index<R, G>(
        &self,
        repo: &R,
        ghosts: &G,
        list: &[ObjectId],
        previous_current: ObjectId,
    ) -> Option<usize>
    where
        R: ObjectRepository,
        G: GhostFields,
    {
        if previous_current.is_null() || !repo.is_valid(previous_current) {
            return None;
        }
        if let Some(index) = position(list, previous_current) {
            return Some(index);
        }
        let previous_field = self.previous_field?;
        if ghosts.destination_class(previous_field) == ghosts.destination_class(self.current_field) {
            return None;
        }

        let first = CorrespondenceResolver::new(&self.schema, TraversalMode::FirstOnly, repo, ghosts)
            .resolve_ids(previous_field, [previous_current], self.current_field);
        if let Some(index) = first_present(list, &first.relatives) {
            return Some(index);
        }

        // The representative may be filtered out of the list; try its siblings.
        let expects_descendants = matches!(
            first.relationship,
            Some(RelationshipKind::Descendant | RelationshipKind::Cousin)
        );
        if expects_descendants {
            let all = CorrespondenceResolver::new(&self.schema, TraversalMode::Exhaustive, repo, ghosts)
                .resolve_ids(previous_field, [previous_current], self.current_field);
            if let Some(index) = first_present(list, &all.relatives) {
                return Some(index);
            }
        }

        first_present(list, &first.common_ancestors)
    }

    /// Convert remembered items tagged with other fields to the current field
    ///
    /// Items whose group resolves to nothing stay as they are. Each relative is
    /// inserted once, and never over an object already in the set.
    pub fn convert_item_set<R, G>(&self, repo: &R, ghosts: &G, items: &mut ItemSet) -> ConversionSummary
    where
        R: ObjectRepository,
        G: GhostFields,
    {
        let resolver = CorrespondenceResolver::new(&self.schema, TraversalMode::Exhaustive, repo, ghosts);
        let mut summary = ConversionSummary::default();
        let mut resolved = Vec::new();
        let mut relatives = IndexSet::new();

        for (field, ids) in items.groups_except(self.current_field) {
            let result = resolver.resolve_ids(field, ids.iter().copied(), self.current_field);
            if result.relatives.is_empty() {
                tracing::debug!("{} items under {} did not resolve", ids.len(), field);
                summary.unresolved += ids.len();
                continue;
            }
            summary.converted_groups += 1;
            resolved.extend(ids);
            relatives.extend(result.relatives);
        }

        for id in resolved {
            if items.remove(id).is_some() {
                summary.removed += 1;
            }
        }
        for id in relatives {
            if items.insert_if_absent(TaggedItem::new(id, self.current_field)) {
                summary.inserted += 1;
            }
        }

        tracing::debug!(
            "converted {} groups: {} removed, {} inserted, {} unresolved",
            summary.converted_groups,
            summary.removed,
            summary.inserted,
            summary.unresolved
        );
        summary
    }
}

fn position(list: &[ObjectId], id: ObjectId) -> Option<usize> {
    list.iter().position(|&item| item == id)
}

fn first_present(list: &[ObjectId], candidates: &IndexSet<ObjectId>) -> Option<usize> {
    candidates.iter().find_map(|&id| position(list, id))
}
