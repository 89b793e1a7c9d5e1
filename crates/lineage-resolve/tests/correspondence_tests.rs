use lineage_meta::{MetadataRegistry, ObjectId, ObjectRepository, SnapshotRepository};
use lineage_resolve::{CorrespondenceResolver, RelationshipClassifier, RelationshipKind};
use lineage_test_utils::{lexicon_schema_with, GraphBuilder, SampleLexicon};
use lineage_tree::{LineageSchema, SchemaConfig, TraversalMode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::cell::Cell;
use std::sync::Arc;

const FAMILY_METADATA: &str = r"
classes:
  - name: Root
  - name: Parent
  - name: Child
  - name: Sense
  - name: Allomorph
fields:
  - { owner: Root, name: Parents, kind: sequence, destination: Parent }
  - { owner: Root, name: AllChildren, kind: collection, destination: Child }
  - { owner: Root, name: AllSenses, kind: collection, destination: Sense }
  - { owner: Root, name: AllAllomorphs, kind: collection, destination: Allomorph }
  - { owner: Parent, name: Children, kind: sequence, destination: Child }
  - { owner: Parent, name: Senses, kind: sequence, destination: Sense }
  - { owner: Parent, name: Allomorphs, kind: sequence, destination: Allomorph }
";

const FAMILY_SCHEMA: &str = r"
ownership:
  class: Parent
  source_field: Parents
  owns:
    - class: Child
      source_field: AllChildren
    - class: Sense
      source_field: AllSenses
    - class: Allomorph
      source_field: AllAllomorphs
paths:
  Parent-owns-AllChildren:
    - seq: Children
  Parent-owns-AllSenses:
    - seq: Senses
  Parent-owns-AllAllomorphs:
    - seq: Allomorphs
";

struct Family {
    schema: LineageSchema,
    repo: SnapshotRepository,
    parent1: ObjectId,
    child1: ObjectId,
    child2: ObjectId,
    sense1: ObjectId,
    allo1: ObjectId,
    allo2: ObjectId,
}

impl Family {
    fn build() -> Self {
        let metadata = Arc::new(MetadataRegistry::from_yaml(FAMILY_METADATA).unwrap());
        let schema =
            LineageSchema::from_yaml(FAMILY_SCHEMA, metadata.clone(), &SchemaConfig::default())
                .unwrap();

        let mut g = GraphBuilder::new(metadata);
        let root = g.root("Root");
        let parent1 = g.owned(root, "Root.Parents", "Parent");
        let child1 = g.owned(parent1, "Parent.Children", "Child");
        let child2 = g.owned(parent1, "Parent.Children", "Child");
        let sense1 = g.owned(parent1, "Parent.Senses", "Sense");
        let allo1 = g.owned(parent1, "Parent.Allomorphs", "Allomorph");
        let allo2 = g.owned(parent1, "Parent.Allomorphs", "Allomorph");

        Self {
            schema,
            repo: g.build(),
            parent1,
            child1,
            child2,
            sense1,
            allo1,
            allo2,
        }
    }

    fn field(&self, path: &str) -> lineage_meta::FieldId {
        self.schema.metadata().field_by_path(path).unwrap()
    }

    fn resolver(&self) -> CorrespondenceResolver<'_, SnapshotRepository, SnapshotRepository> {
        CorrespondenceResolver::new(&self.schema, TraversalMode::Exhaustive, &self.repo, &self.repo)
    }
}

fn ids(set: &indexmap::IndexSet<ObjectId>) -> Vec<ObjectId> {
    set.iter().copied().collect()
}

#[test]
fn test_identity_short_circuit() {
    let fx = Family::build();
    let result = fx.resolver().resolve_ids(
        fx.field("Root.Parents"),
        [fx.child1, fx.child2],
        fx.field("Root.AllChildren"),
    );
    assert_eq!(result.relationship, Some(RelationshipKind::Descendant));
    assert_eq!(ids(&result.relatives), [fx.child1, fx.child2]);
    assert!(result.common_ancestors.is_empty());
}

#[test]
fn test_ancestor_dedups_shared_owner() {
    let fx = Family::build();
    let result = fx.resolver().resolve_ids(
        fx.field("Root.AllChildren"),
        [fx.child1, fx.child2],
        fx.field("Root.Parents"),
    );
    assert_eq!(result.relationship, Some(RelationshipKind::Ancestor));
    assert_eq!(ids(&result.relatives), [fx.parent1]);
    assert_eq!(ids(&result.common_ancestors), [fx.parent1]);
}

#[test]
fn test_descendant_expands_owner() {
    let fx = Family::build();
    let result = fx.resolver().resolve_ids(
        fx.field("Root.Parents"),
        [fx.parent1],
        fx.field("Root.AllChildren"),
    );
    assert_eq!(ids(&result.relatives), [fx.child1, fx.child2]);
    assert_eq!(ids(&result.common_ancestors), [fx.parent1]);
}

#[test]
fn test_descendant_expands_each_ancestor_once() {
    let fx = Family::build();
    let result = fx.resolver().resolve_ids(
        fx.field("Root.Parents"),
        [fx.parent1, fx.parent1],
        fx.field("Root.AllChildren"),
    );
    assert_eq!(ids(&result.relatives), [fx.child1, fx.child2]);
    assert_eq!(ids(&result.common_ancestors), [fx.parent1]);
}

/// Counts `field_values` calls, i.e. path traversal work
struct CountingRepo<'a> {
    inner: &'a SnapshotRepository,
    reads: Cell<usize>,
}

impl<'a> CountingRepo<'a> {
    fn new(inner: &'a SnapshotRepository) -> Self {
        Self {
            inner,
            reads: Cell::new(0),
        }
    }

    fn take(&self) -> usize {
        self.reads.replace(0)
    }
}

impl ObjectRepository for CountingRepo<'_> {
    fn is_valid(&self, id: ObjectId) -> bool {
        self.inner.is_valid(id)
    }

    fn class_of(&self, id: ObjectId) -> Option<lineage_meta::ClassId> {
        self.inner.class_of(id)
    }

    fn owner(&self, id: ObjectId) -> Option<ObjectId> {
        self.inner.owner(id)
    }

    fn field_values(&self, id: ObjectId, field: lineage_meta::FieldId) -> Vec<ObjectId> {
        self.reads.set(self.reads.get() + 1);
        self.inner.field_values(id, field)
    }
}

#[test]
fn test_shared_ancestor_is_traversed_once() {
    let fx = Family::build();
    let repo = CountingRepo::new(&fx.repo);
    let resolver = CorrespondenceResolver::new(&fx.schema, TraversalMode::Exhaustive, &repo, &fx.repo);
    let (children, senses) = (fx.field("Root.AllChildren"), fx.field("Root.AllSenses"));

    let one = resolver.resolve_ids(children, [fx.child1], senses);
    let one_reads = repo.take();
    let two = resolver.resolve_ids(children, [fx.child1, fx.child2], senses);
    let two_reads = repo.take();

    assert_eq!(ids(&one.relatives), [fx.sense1]);
    assert_eq!(ids(&two.relatives), [fx.sense1]);
    assert_eq!(ids(&two.common_ancestors), [fx.parent1]);
    assert!(one_reads > 0);
    assert_eq!(two_reads, one_reads);
}

#[test]
fn test_identity_short_circuit_skips_traversal() {
    let fx = Family::build();
    let repo = CountingRepo::new(&fx.repo);
    let resolver = CorrespondenceResolver::new(&fx.schema, TraversalMode::Exhaustive, &repo, &fx.repo);

    let result = resolver.resolve_ids(
        fx.field("Root.Parents"),
        [fx.child1, fx.child2],
        fx.field("Root.AllChildren"),
    );
    assert_eq!(ids(&result.relatives), [fx.child1, fx.child2]);
    assert_eq!(repo.take(), 0);
}

#[test]
fn test_cousin_goes_through_common_ancestor() {
    let fx = Family::build();
    let classifier = RelationshipClassifier::new(fx.schema.tree());
    let meta = fx.schema.metadata();
    let sense = meta.class_id("Sense").unwrap();
    let allomorph = meta.class_id("Allomorph").unwrap();
    assert_eq!(classifier.classify(sense, allomorph), RelationshipKind::Cousin);
    assert_eq!(classifier.lowest_common_ancestor(sense, allomorph), meta.class_id("Parent"));

    let result = fx.resolver().resolve_ids(
        fx.field("Root.AllSenses"),
        [fx.sense1],
        fx.field("Root.AllAllomorphs"),
    );
    assert_eq!(result.relationship, Some(RelationshipKind::Cousin));
    assert_eq!(ids(&result.common_ancestors), [fx.parent1]);
    assert_eq!(ids(&result.relatives), [fx.allo1, fx.allo2]);
}

#[test]
fn test_sibling_is_a_no_op() {
    let fx = Family::build();
    let meta = fx.schema.metadata();
    let child = meta.class_id("Child").unwrap();
    let classifier = RelationshipClassifier::new(fx.schema.tree());
    assert_eq!(classifier.classify(child, child), RelationshipKind::Sibling);

    let all_children = fx.field("Root.AllChildren");
    let result = fx.resolver().resolve_ids(all_children, [fx.child1], all_children);
    assert_eq!(result.relationship, Some(RelationshipKind::Sibling));
    assert!(result.is_empty());
}

#[test]
fn test_stale_ids_are_skipped() {
    let mut fx = Family::build();
    let stale = fx.child2;
    fx.repo.remove(stale);
    assert!(!fx.repo.is_valid(stale));

    let result = fx.resolver().resolve_ids(
        fx.field("Root.AllChildren"),
        [ObjectId::NULL, stale, ObjectId::new(9999), fx.child1],
        fx.field("Root.Parents"),
    );
    assert_eq!(ids(&result.relatives), [fx.parent1]);
}

#[test]
fn test_lexicon_cousin_from_sense_to_stem_allomorphs() {
    let lex = SampleLexicon::build();
    let schema = lexicon_schema_with(lex.metadata().clone());
    let resolver =
        CorrespondenceResolver::new(&schema, TraversalMode::Exhaustive, &lex.repo, &lex.repo);

    let result = resolver.resolve_ids(
        lex.field("LexDb.AllSenses"),
        [lex.sense_a1a, lex.sense_a2],
        lex.field("LexDb.AllStemAllomorphs"),
    );
    assert_eq!(result.relationship, Some(RelationshipKind::Cousin));
    assert_eq!(ids(&result.common_ancestors), [lex.entry_a]);
    assert_eq!(ids(&result.relatives), [lex.stem_a, lex.stem_a2]);
}

#[test]
fn test_lexicon_translation_to_senses() {
    let lex = SampleLexicon::build();
    let schema = lexicon_schema_with(lex.metadata().clone());
    let resolver =
        CorrespondenceResolver::new(&schema, TraversalMode::Exhaustive, &lex.repo, &lex.repo);

    let result = resolver.resolve_ids(
        lex.field("LexDb.AllTranslations"),
        [lex.translation_a1],
        lex.field("LexDb.AllSenses"),
    );
    assert_eq!(result.relationship, Some(RelationshipKind::Ancestor));
    assert_eq!(ids(&result.relatives), [lex.sense_a1]);
}

const LEXICON_LISTS: [&str; 8] = [
    "LexDb.Entries",
    "LexDb.AllSenses",
    "LexDb.AllAllomorphs",
    "LexDb.AllStemAllomorphs",
    "LexDb.AllAffixAllomorphs",
    "LexDb.AllExampleSentences",
    "LexDb.AllTranslations",
    "LexDb.AllPronunciations",
];

proptest! {
    #[test]
    fn prop_resolve_is_idempotent(
        from in 0..LEXICON_LISTS.len(),
        to in 0..LEXICON_LISTS.len(),
        picks in proptest::collection::vec(0u32..140, 0..8),
        first_only in any::<bool>(),
    ) {
        let lex = SampleLexicon::build();
        let schema = lexicon_schema_with(lex.metadata().clone());
        let mode = if first_only { TraversalMode::FirstOnly } else { TraversalMode::Exhaustive };
        let resolver = CorrespondenceResolver::new(&schema, mode, &lex.repo, &lex.repo);
        let ids: Vec<ObjectId> = picks.into_iter().map(ObjectId::new).collect();

        let first = resolver.resolve_ids(lex.field(LEXICON_LISTS[from]), ids.clone(), lex.field(LEXICON_LISTS[to]));
        let second = resolver.resolve_ids(lex.field(LEXICON_LISTS[from]), ids, lex.field(LEXICON_LISTS[to]));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_relatives_belong_to_new_list(
        from in 0..LEXICON_LISTS.len(),
        to in 0..LEXICON_LISTS.len(),
        picks in proptest::collection::vec(95u32..120, 0..8),
    ) {
        let lex = SampleLexicon::build();
        let schema = lexicon_schema_with(lex.metadata().clone());
        let resolver = CorrespondenceResolver::new(&schema, TraversalMode::Exhaustive, &lex.repo, &lex.repo);
        let new_field = lex.field(LEXICON_LISTS[to]);
        let new_dest = lex.metadata().field(new_field).and_then(|f| f.destination).unwrap();

        let ids: Vec<ObjectId> = picks.into_iter().map(ObjectId::new).collect();
        let result = resolver.resolve_ids(lex.field(LEXICON_LISTS[from]), ids, new_field);
        for id in result.relatives {
            let fits = lex.repo.is_instance_of(lex.metadata(), id, new_dest)
                || lineage_meta::GhostFields::is_ghost_owner(&lex.repo, id, new_field);
            prop_assert!(fits, "{} does not belong to {}", id, LEXICON_LISTS[to]);
        }
    }
}
