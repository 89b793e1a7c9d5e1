//! Remembered items tagged with the field they were chosen under

use indexmap::IndexMap;
use lineage_meta::{FieldId, ObjectId};

/// An object together with the list field it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaggedItem {
    /// Remembered object
    pub object: ObjectId,
    /// Field the object was chosen under
    pub field: FieldId,
}

impl TaggedItem {
    /// Create item
    #[inline]
    #[must_use]
    pub const fn new(object: ObjectId, field: FieldId) -> Self {
        Self { object, field }
    }
}

/// Insertion-ordered set of tagged items, one tag per object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSet {
    items: IndexMap<ObjectId, FieldId>,
}

impl ItemSet {
    /// Create empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or retag an item, returning the previous tag
    pub fn insert(&mut self, item: TaggedItem) -> Option<FieldId> {
        self.items.insert(item.object, item.field)
    }

    /// Insert only if the object is absent; true if inserted
    pub fn insert_if_absent(&mut self, item: TaggedItem) -> bool {
        if self.items.contains_key(&item.object) {
            return false;
        }
        self.items.insert(item.object, item.field);
        true
    }

    /// Remove an object, returning its tag
    pub fn remove(&mut self, object: ObjectId) -> Option<FieldId> {
        self.items.shift_remove(&object)
    }

    /// True if `object` is present
    #[inline]
    #[must_use]
    pub fn contains(&self, object: ObjectId) -> bool {
        self.items.contains_key(&object)
    }

    /// Tag of `object`
    #[inline]
    #[must_use]
    pub fn field_of(&self, object: ObjectId) -> Option<FieldId> {
        self.items.get(&object).copied()
    }

    /// Items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = TaggedItem> + '_ {
        self.items.iter().map(|(&object, &field)| TaggedItem { object, field })
    }

    /// Objects grouped by tag, skipping `except`
    #[must_use]
    pub fn groups_except(&self, except: FieldId) -> IndexMap<FieldId, Vec<ObjectId>> {
        let mut groups: IndexMap<FieldId, Vec<ObjectId>> = IndexMap::new();
        for item in self.iter().filter(|i| i.field != except) {
            groups.entry(item.field).or_default().push(item.object);
        }
        groups
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<TaggedItem> for ItemSet {
    fn from_iter<I: IntoIterator<Item = TaggedItem>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl Extend<TaggedItem> for ItemSet {
    fn extend<I: IntoIterator<Item = TaggedItem>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}
