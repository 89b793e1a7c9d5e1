//! Testing utilities for the lineage workspace
//!
//! Embedded lexicon fixtures and a small object graph builder.

#![allow(missing_docs)]

use lineage_meta::{ClassId, FieldId, MetadataRegistry, ObjectId, SnapshotRepository};
use lineage_tree::{LineageSchema, SchemaConfig};
use std::sync::Arc;

pub const LEXICON_METADATA: &str = include_str!("../fixtures/lexicon-metadata.yaml");
pub const LEXICON_SCHEMA: &str = include_str!("../fixtures/lexicon-schema.yaml");
pub const LEXICON_SNAPSHOT: &str = include_str!("../fixtures/lexicon-snapshot.yaml");

pub fn lexicon_metadata() -> Arc<MetadataRegistry> {
    Arc::new(MetadataRegistry::from_yaml(LEXICON_METADATA).unwrap())
}

pub fn lexicon_schema() -> Arc<LineageSchema> {
    lexicon_schema_with(lexicon_metadata())
}

pub fn lexicon_schema_with(metadata: Arc<MetadataRegistry>) -> Arc<LineageSchema> {
    Arc::new(LineageSchema::from_yaml(LEXICON_SCHEMA, metadata, &SchemaConfig::default()).unwrap())
}

pub fn lexicon_snapshot(metadata: Arc<MetadataRegistry>) -> SnapshotRepository {
    SnapshotRepository::from_yaml(LEXICON_SNAPSHOT, metadata).unwrap()
}

pub fn class(metadata: &MetadataRegistry, name: &str) -> ClassId {
    metadata
        .class_id(name)
        .unwrap_or_else(|| panic!("unknown class {name}"))
}

pub fn field(metadata: &MetadataRegistry, path: &str) -> FieldId {
    metadata.field_by_path(path).unwrap()
}

/// Builds a [`SnapshotRepository`] with sequential object ids
pub struct GraphBuilder {
    repo: SnapshotRepository,
    next: u32,
}

impl GraphBuilder {
    pub fn new(metadata: Arc<MetadataRegistry>) -> Self {
        Self {
            repo: SnapshotRepository::new(metadata),
            next: 100,
        }
    }

    /// Builder over the lexicon model with the `LexDb.AllSenses` ghost rule
    pub fn lexicon() -> Self {
        let mut builder = Self::new(lexicon_metadata());
        builder.ghost("LexDb.AllSenses", "LexEntry", "LexEntry.Senses");
        builder
    }

    pub fn metadata(&self) -> Arc<MetadataRegistry> {
        self.repo.metadata().clone()
    }

    pub fn class(&self, name: &str) -> ClassId {
        class(self.repo.metadata(), name)
    }

    pub fn field(&self, path: &str) -> FieldId {
        field(self.repo.metadata(), path)
    }

    /// Insert an unowned object
    pub fn root(&mut self, class: &str) -> ObjectId {
        self.insert(class, None)
    }

    /// Insert an object owned by `owner` through `path` (`Class.Field`)
    pub fn owned(&mut self, owner: ObjectId, path: &str, class: &str) -> ObjectId {
        let id = self.insert(class, Some(owner));
        self.link(owner, path, id);
        id
    }

    /// Append `value` to a field without changing ownership
    pub fn link(&mut self, object: ObjectId, path: &str, value: ObjectId) {
        let field = self.field(path);
        self.repo.append(object, field, value).unwrap();
    }

    pub fn ghost(&mut self, path: &str, owner_class: &str, owned_field: &str) {
        let field = self.field(path);
        let owner_class = self.class(owner_class);
        let owned_field = self.field(owned_field);
        self.repo.register_ghost(field, owner_class, owned_field);
    }

    pub fn build(self) -> SnapshotRepository {
        self.repo
    }

    fn insert(&mut self, class: &str, owner: Option<ObjectId>) -> ObjectId {
        let id = ObjectId::new(self.next);
        self.next += 1;
        let class = self.class(class);
        self.repo.insert(id, class, owner).unwrap();
        id
    }
}

/// Lexicon graph with named handles
///
/// ```text
/// entry_a ─ Senses ─ sense_a1 ─ Senses ─ sense_a1a
///         │        │          └ Examples ─ example_a1 ─ Translations ─ translation_a1
///         │        └ sense_a2
///         ├ LexemeForm ─ stem_a
///         └ AlternateForms ─ affix_a, stem_a2
/// entry_b ─ LexemeForm ─ stem_b          (no senses: ghost row in AllSenses)
/// ```
pub struct SampleLexicon {
    pub repo: SnapshotRepository,
    pub db: ObjectId,
    pub entry_a: ObjectId,
    pub sense_a1: ObjectId,
    pub sense_a1a: ObjectId,
    pub sense_a2: ObjectId,
    pub example_a1: ObjectId,
    pub translation_a1: ObjectId,
    pub stem_a: ObjectId,
    pub affix_a: ObjectId,
    pub stem_a2: ObjectId,
    pub entry_b: ObjectId,
    pub stem_b: ObjectId,
}

impl SampleLexicon {
    pub fn build() -> Self {
        let mut g = GraphBuilder::lexicon();
        let db = g.root("LexDb");
        let entry_a = g.owned(db, "LexDb.Entries", "LexEntry");
        let sense_a1 = g.owned(entry_a, "LexEntry.Senses", "LexSense");
        let sense_a1a = g.owned(sense_a1, "LexSense.Senses", "LexSense");
        let example_a1 = g.owned(sense_a1, "LexSense.Examples", "LexExampleSentence");
        let translation_a1 = g.owned(example_a1, "LexExampleSentence.Translations", "CmTranslation");
        let sense_a2 = g.owned(entry_a, "LexEntry.Senses", "LexSense");
        let stem_a = g.owned(entry_a, "LexEntry.LexemeForm", "MoStemAllomorph");
        let affix_a = g.owned(entry_a, "LexEntry.AlternateForms", "MoAffixAllomorph");
        let stem_a2 = g.owned(entry_a, "LexEntry.AlternateForms", "MoStemAllomorph");
        let entry_b = g.owned(db, "LexDb.Entries", "LexEntry");
        let stem_b = g.owned(entry_b, "LexEntry.LexemeForm", "MoStemAllomorph");

        Self {
            repo: g.build(),
            db,
            entry_a,
            sense_a1,
            sense_a1a,
            sense_a2,
            example_a1,
            translation_a1,
            stem_a,
            affix_a,
            stem_a2,
            entry_b,
            stem_b,
        }
    }

    pub fn metadata(&self) -> &Arc<MetadataRegistry> {
        self.repo.metadata()
    }

    pub fn field(&self, path: &str) -> FieldId {
        field(self.repo.metadata(), path)
    }

    pub fn class(&self, name: &str) -> ClassId {
        class(self.repo.metadata(), name)
    }
}
