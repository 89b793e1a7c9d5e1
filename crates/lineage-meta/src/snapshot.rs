//! In-memory repository snapshot
//!
//! [`SnapshotRepository`] holds a self-contained copy of an object graph. It
//! backs the command-line inspector and the test fixtures, and implements both
//! collaborator traits.

use crate::error::{MetadataError, SnapshotError};
use crate::id::{ClassId, FieldId, ObjectId};
use crate::metadata::{FieldKind, MetadataRegistry};
use crate::repository::{GhostFields, ObjectRepository};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Ghost aggregation rule for one list field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostRule {
    /// Class whose instances may stand in as rows
    pub owner_class: ClassId,
    /// Field whose emptiness turns an owner into a ghost row
    pub owned_field: FieldId,
}

#[derive(Debug, Clone)]
struct StoredObject {
    class: ClassId,
    owner: Option<ObjectId>,
    fields: HashMap<FieldId, Vec<ObjectId>>,
}

/// Object graph snapshot
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    metadata: Arc<MetadataRegistry>,
    objects: HashMap<ObjectId, StoredObject>,
    ghosts: HashMap<FieldId, GhostRule>,
}

impl SnapshotRepository {
    /// Empty snapshot
    #[inline]
    #[must_use]
    pub fn new(metadata: Arc<MetadataRegistry>) -> Self {
        Self {
            metadata,
            objects: HashMap::new(),
            ghosts: HashMap::new(),
        }
    }

    /// Parse a YAML snapshot document
    ///
    /// # Errors
    /// Returns error on syntax errors or unresolvable references
    pub fn from_yaml(text: &str, metadata: Arc<MetadataRegistry>) -> Result<Self, SnapshotError> {
        let doc: SnapshotDocument =
            serde_yaml::from_str(text).map_err(|e| SnapshotError::Syntax(e.to_string()))?;
        Self::from_document(&doc, metadata)
    }

    /// Build from a parsed document
    ///
    /// Objects are inserted first so field values may reference objects
    /// declared later in the document.
    ///
    /// # Errors
    /// Returns error on unresolvable classes, fields or objects
    pub fn from_document(
        doc: &SnapshotDocument,
        metadata: Arc<MetadataRegistry>,
    ) -> Result<Self, SnapshotError> {
        let mut repo = Self::new(metadata);

        for object in &doc.objects {
            let class = repo.resolve_class(&object.class)?;
            repo.insert(object.id, class, object.owner)?;
        }
        for object in &doc.objects {
            if let Some(owner) = object.owner {
                if !repo.objects.contains_key(&owner) {
                    return Err(SnapshotError::UnknownObject(owner));
                }
            }
        }
        for object in &doc.objects {
            let class = repo.resolve_class(&object.class)?;
            for (name, values) in &object.fields {
                let field = repo
                    .metadata
                    .field_id(class, name)
                    .ok_or_else(|| MetadataError::unknown_field(&object.class, name))?;
                for &value in values {
                    repo.append(object.id, field, value)?;
                }
            }
        }
        for (path, ghost) in &doc.ghosts {
            let field = repo.metadata.field_by_path(path)?;
            let owner_class = repo.resolve_class(&ghost.owner_class)?;
            let owned_field = repo
                .metadata
                .field_id(owner_class, &ghost.owned_field)
                .ok_or_else(|| MetadataError::unknown_field(&ghost.owner_class, &ghost.owned_field))?;
            repo.register_ghost(field, owner_class, owned_field);
        }

        Ok(repo)
    }

    fn resolve_class(&self, name: &str) -> Result<ClassId, SnapshotError> {
        self.metadata
            .class_id(name)
            .ok_or_else(|| MetadataError::UnknownClass(name.to_string()).into())
    }

    /// Metadata the snapshot was built against
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &Arc<MetadataRegistry> {
        &self.metadata
    }

    /// Insert an object
    ///
    /// The owner is recorded as given; it is not required to exist yet.
    ///
    /// # Errors
    /// Returns error for the null id, a duplicate id or an unknown class
    pub fn insert(
        &mut self,
        id: ObjectId,
        class: ClassId,
        owner: Option<ObjectId>,
    ) -> Result<(), SnapshotError> {
        if id.is_null() {
            return Err(SnapshotError::NullObject);
        }
        if self.objects.contains_key(&id) {
            return Err(SnapshotError::DuplicateObject(id));
        }
        if self.metadata.class(class).is_none() {
            return Err(MetadataError::UnknownClass(class.to_string()).into());
        }
        self.objects.insert(
            id,
            StoredObject {
                class,
                owner,
                fields: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Append `value` to `field` of `object`
    ///
    /// # Errors
    /// Returns error if either object is unknown, the field does not apply to
    /// the object's class, or an atomic field already holds a value
    pub fn append(
        &mut self,
        object: ObjectId,
        field: FieldId,
        value: ObjectId,
    ) -> Result<(), SnapshotError> {
        if !self.objects.contains_key(&value) {
            return Err(SnapshotError::UnknownObject(value));
        }
        let stored = self
            .objects
            .get_mut(&object)
            .ok_or(SnapshotError::UnknownObject(object))?;
        let def = self
            .metadata
            .field(field)
            .filter(|_| self.metadata.field_applies_to(field, stored.class))
            .ok_or(SnapshotError::FieldNotApplicable { object, field })?;

        let values = stored.fields.entry(field).or_default();
        if def.kind == FieldKind::Atomic && !values.is_empty() {
            return Err(SnapshotError::AtomicOverflow { object, field });
        }
        values.push(value);
        Ok(())
    }

    /// Declare `field` a ghost aggregation
    pub fn register_ghost(&mut self, field: FieldId, owner_class: ClassId, owned_field: FieldId) {
        self.ghosts.insert(
            field,
            GhostRule {
                owner_class,
                owned_field,
            },
        );
    }

    /// Remove an object and everything it owns
    ///
    /// References to removed objects are dropped from remaining field values.
    /// Returns number of objects removed.
    pub fn remove(&mut self, id: ObjectId) -> usize {
        if !self.objects.contains_key(&id) {
            return 0;
        }

        let mut doomed = vec![id];
        let mut seen = HashSet::from([id]);
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor];
            let children: Vec<ObjectId> = self
                .objects
                .iter()
                .filter(|(_, o)| o.owner == Some(parent))
                .map(|(&child, _)| child)
                .collect();
            doomed.extend(children.into_iter().filter(|&child| seen.insert(child)));
            cursor += 1;
        }

        for gone in &doomed {
            self.objects.remove(gone);
        }
        for object in self.objects.values_mut() {
            for values in object.fields.values_mut() {
                values.retain(|v| !seen.contains(v));
            }
        }
        doomed.len()
    }

    /// Number of objects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the snapshot holds no objects
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectRepository for SnapshotRepository {
    fn is_valid(&self, id: ObjectId) -> bool {
        !id.is_null() && self.objects.contains_key(&id)
    }

    fn class_of(&self, id: ObjectId) -> Option<ClassId> {
        self.objects.get(&id).map(|o| o.class)
    }

    fn owner(&self, id: ObjectId) -> Option<ObjectId> {
        self.objects.get(&id).and_then(|o| o.owner)
    }

    fn field_values(&self, id: ObjectId, field: FieldId) -> Vec<ObjectId> {
        self.objects
            .get(&id)
            .and_then(|o| o.fields.get(&field))
            .cloned()
            .unwrap_or_default()
    }
}

impl GhostFields for SnapshotRepository {
    fn ghost_owner_class(&self, field: FieldId) -> Option<ClassId> {
        self.ghosts.get(&field).map(|g| g.owner_class)
    }

    fn is_ghost_owner(&self, id: ObjectId, field: FieldId) -> bool {
        let Some(rule) = self.ghosts.get(&field) else {
            return false;
        };
        self.is_instance_of(&self.metadata, id, rule.owner_class)
            && self.field_values(id, rule.owned_field).is_empty()
    }

    fn destination_class(&self, field: FieldId) -> Option<ClassId> {
        self.metadata.field(field).and_then(|f| f.destination)
    }
}

/// Serialized snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Objects
    #[serde(default)]
    pub objects: Vec<ObjectDocument>,
    /// Ghost rules keyed by `Class.Field` of the list field
    #[serde(default)]
    pub ghosts: BTreeMap<String, GhostDocument>,
}

/// Serialized object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDocument {
    /// Object id
    pub id: ObjectId,
    /// Class name
    pub class: String,
    /// Owning object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ObjectId>,
    /// Field values keyed by field name
    #[serde(default)]
    pub fields: BTreeMap<String, Vec<ObjectId>>,
}

/// Serialized ghost rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostDocument {
    /// Class name of the stand-in owners
    pub owner_class: String,
    /// Field name on the owner class
    pub owned_field: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Arc<MetadataRegistry> {
        let mut b = MetadataRegistry::builder();
        b.class("LexDb", None).unwrap();
        b.class("LexEntry", None).unwrap();
        b.class("LexSense", None).unwrap();
        b.field("LexDb", "AllSenses", FieldKind::Collection, Some("LexSense"))
            .unwrap();
        b.field("LexEntry", "Senses", FieldKind::Sequence, Some("LexSense"))
            .unwrap();
        b.field("LexEntry", "MainSense", FieldKind::Atomic, Some("LexSense"))
            .unwrap();
        Arc::new(b.build())
    }

    const DOC: &str = r"
objects:
  - id: 1
    class: LexDb
  - id: 10
    class: LexEntry
    owner: 1
    fields:
      Senses: [11, 12]
  - id: 11
    class: LexSense
    owner: 10
  - id: 12
    class: LexSense
    owner: 10
  - id: 20
    class: LexEntry
    owner: 1
ghosts:
  LexDb.AllSenses:
    owner_class: LexEntry
    owned_field: Senses
";

    #[test]
    fn load_document() {
        let meta = metadata();
        let repo = SnapshotRepository::from_yaml(DOC, meta.clone()).unwrap();
        let senses = meta.field_by_path("LexEntry.Senses").unwrap();

        assert_eq!(repo.len(), 5);
        assert_eq!(
            repo.field_values(ObjectId::new(10), senses),
            vec![ObjectId::new(11), ObjectId::new(12)]
        );
        assert_eq!(repo.owner(ObjectId::new(11)), Some(ObjectId::new(10)));
        assert_eq!(repo.class_of(ObjectId::new(11)), meta.class_id("LexSense"));
        assert!(!repo.is_valid(ObjectId::NULL));
    }

    #[test]
    fn ghost_owner_requires_empty_owned_field() {
        let meta = metadata();
        let repo = SnapshotRepository::from_yaml(DOC, meta.clone()).unwrap();
        let all_senses = meta.field_by_path("LexDb.AllSenses").unwrap();

        assert!(repo.is_ghost_field(all_senses));
        assert_eq!(repo.ghost_owner_class(all_senses), meta.class_id("LexEntry"));
        assert!(repo.is_ghost_owner(ObjectId::new(20), all_senses));
        assert!(!repo.is_ghost_owner(ObjectId::new(10), all_senses));
        assert!(!repo.is_ghost_owner(ObjectId::new(11), all_senses));
        assert_eq!(repo.destination_class(all_senses), meta.class_id("LexSense"));
    }

    #[test]
    fn remove_cascades_and_strips_references() {
        let meta = metadata();
        let mut repo = SnapshotRepository::from_yaml(DOC, meta.clone()).unwrap();
        let senses = meta.field_by_path("LexEntry.Senses").unwrap();

        assert_eq!(repo.remove(ObjectId::new(11)), 1);
        assert_eq!(repo.field_values(ObjectId::new(10), senses), vec![ObjectId::new(12)]);

        assert_eq!(repo.remove(ObjectId::new(10)), 2);
        assert!(!repo.is_valid(ObjectId::new(12)));
        assert_eq!(repo.remove(ObjectId::new(10)), 0);
    }

    #[test]
    fn insert_validation() {
        let meta = metadata();
        let entry = meta.class_id("LexEntry").unwrap();
        let mut repo = SnapshotRepository::new(meta);

        assert!(matches!(
            repo.insert(ObjectId::NULL, entry, None),
            Err(SnapshotError::NullObject)
        ));
        repo.insert(ObjectId::new(1), entry, None).unwrap();
        assert!(matches!(
            repo.insert(ObjectId::new(1), entry, None),
            Err(SnapshotError::DuplicateObject(_))
        ));
        assert!(matches!(
            repo.insert(ObjectId::new(2), ClassId::new(99), None),
            Err(SnapshotError::Metadata(_))
        ));
    }

    #[test]
    fn append_validation() {
        let meta = metadata();
        let entry = meta.class_id("LexEntry").unwrap();
        let sense = meta.class_id("LexSense").unwrap();
        let senses = meta.field_by_path("LexEntry.Senses").unwrap();
        let main = meta.field_by_path("LexEntry.MainSense").unwrap();
        let mut repo = SnapshotRepository::new(meta);

        repo.insert(ObjectId::new(1), entry, None).unwrap();
        repo.insert(ObjectId::new(2), sense, Some(ObjectId::new(1))).unwrap();
        repo.insert(ObjectId::new(3), sense, Some(ObjectId::new(1))).unwrap();

        repo.append(ObjectId::new(1), main, ObjectId::new(2)).unwrap();
        assert!(matches!(
            repo.append(ObjectId::new(1), main, ObjectId::new(3)),
            Err(SnapshotError::AtomicOverflow { .. })
        ));
        assert!(matches!(
            repo.append(ObjectId::new(2), senses, ObjectId::new(3)),
            Err(SnapshotError::FieldNotApplicable { .. })
        ));
        assert!(matches!(
            repo.append(ObjectId::new(1), senses, ObjectId::new(9)),
            Err(SnapshotError::UnknownObject(_))
        ));
    }

    #[test]
    fn unknown_owner_rejected() {
        let doc = "objects:\n  - id: 5\n    class: LexEntry\n    owner: 6\n";
        let result = SnapshotRepository::from_yaml(doc, metadata());
        assert!(matches!(result, Err(SnapshotError::UnknownObject(_))));
    }

    #[test]
    fn unknown_field_name_rejected() {
        let doc = "objects:\n  - id: 5\n    class: LexEntry\n    fields:\n      Nope: []\n";
        let result = SnapshotRepository::from_yaml(doc, metadata());
        assert!(matches!(
            result,
            Err(SnapshotError::Metadata(MetadataError::UnknownField { .. }))
        ));
    }
}
