//! Collaborator interfaces over the live object repository
//!
//! The resolver never owns or mutates objects. It reads them through
//! [`ObjectRepository`] and asks [`GhostFields`] about synthetic list rows.

use crate::id::{ClassId, FieldId, ObjectId};
use crate::metadata::MetadataRegistry;

/// Upper bound on ownership-chain walks over live data
pub const MAX_OWNER_DEPTH: usize = 64;

/// Read access to live objects
pub trait ObjectRepository {
    /// True if `id` names a live object
    fn is_valid(&self, id: ObjectId) -> bool;

    /// Class of a live object
    fn class_of(&self, id: ObjectId) -> Option<ClassId>;

    /// Direct owner of a live object
    fn owner(&self, id: ObjectId) -> Option<ObjectId>;

    /// Values of an object-valued field, in field order
    fn field_values(&self, id: ObjectId, field: FieldId) -> Vec<ObjectId>;

    /// Nearest strict owner of `id` whose class is `class` or a subclass
    ///
    /// Walks at most [`MAX_OWNER_DEPTH`] owners.
    fn owner_of_class(
        &self,
        metadata: &MetadataRegistry,
        id: ObjectId,
        class: ClassId,
    ) -> Option<ObjectId> {
        let mut current = self.owner(id)?;
        for _ in 0..MAX_OWNER_DEPTH {
            let current_class = self.class_of(current)?;
            if metadata.is_same_or_subclass(current_class, class) {
                return Some(current);
            }
            current = self.owner(current)?;
        }
        None
    }

    /// True if `id` is live and of `class` or a subclass
    fn is_instance_of(&self, metadata: &MetadataRegistry, id: ObjectId, class: ClassId) -> bool {
        self.class_of(id)
            .is_some_and(|c| metadata.is_same_or_subclass(c, class))
    }
}

/// Knowledge about list fields and their ghost rows
///
/// A ghost aggregation is a list field that shows an owner object in place of
/// the objects it would normally own (an entry without senses shown in a
/// sense list).
pub trait GhostFields {
    /// Class whose instances stand in as ghost rows of `field`, if any
    fn ghost_owner_class(&self, field: FieldId) -> Option<ClassId>;

    /// True if `id` currently appears as a ghost row of `field`
    fn is_ghost_owner(&self, id: ObjectId, field: FieldId) -> bool;

    /// Class of the objects `field` enumerates
    fn destination_class(&self, field: FieldId) -> Option<ClassId>;

    /// True if `field` is a ghost aggregation
    fn is_ghost_field(&self, field: FieldId) -> bool {
        self.ghost_owner_class(field).is_some()
    }
}

/// [`GhostFields`] for applications without ghost aggregations
///
/// Destination classes come straight from the field metadata.
#[derive(Debug, Clone, Copy)]
pub struct NoGhosts<'a> {
    metadata: &'a MetadataRegistry,
}

impl<'a> NoGhosts<'a> {
    /// Wrap a metadata registry
    #[inline]
    #[must_use]
    pub fn new(metadata: &'a MetadataRegistry) -> Self {
        Self { metadata }
    }
}

impl GhostFields for NoGhosts<'_> {
    fn ghost_owner_class(&self, _field: FieldId) -> Option<ClassId> {
        None
    }

    fn is_ghost_owner(&self, _id: ObjectId, _field: FieldId) -> bool {
        false
    }

    fn destination_class(&self, field: FieldId) -> Option<ClassId> {
        self.metadata.field(field).and_then(|f| f.destination)
    }
}
