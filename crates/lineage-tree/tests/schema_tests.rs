use lineage_meta::ObjectId;
use lineage_test_utils::{lexicon_metadata, lexicon_schema, lexicon_schema_with, SampleLexicon, LEXICON_SCHEMA};
use lineage_tree::{LineageSchema, SchemaConfig, SchemaError, TraversalMode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn load(text: &str) -> Result<LineageSchema, SchemaError> {
    LineageSchema::from_yaml(text, lexicon_metadata(), &SchemaConfig::default())
}

#[test]
fn test_lexicon_schema_is_complete() {
    let schema = lexicon_schema();
    let tree = schema.tree();
    assert_eq!(tree.root().name(), "LexEntry");
    assert_eq!(tree.len(), 6);
    for mode in [TraversalMode::FirstOnly, TraversalMode::Exhaustive] {
        let catalog = schema.catalog(mode);
        assert_eq!(catalog.mode(), mode);
        assert_eq!(catalog.len(), 10);
        assert!(catalog.missing_entries(tree).is_empty());
    }
}

#[test]
fn test_lookups() {
    let schema = lexicon_schema();
    let meta = schema.metadata();
    let tree = schema.tree();
    let c = |n: &str| meta.class_id(n).unwrap();

    assert_eq!(tree.node_named("LexSense").map(|n| n.source_field()), Some("AllSenses"));
    assert_eq!(
        tree.node_for_source_field("AllStemAllomorphs").map(|n| n.name()),
        Some("MoForm")
    );
    assert_eq!(tree.node_for(c("MoAffixAllomorph")).map(|n| n.name()), Some("MoForm"));
    assert!(tree.node_for(c("LexDb")).is_none());

    let ancestors: Vec<&str> = tree.ancestors(c("CmTranslation")).map(|n| n.name()).collect();
    assert_eq!(ancestors, ["LexExampleSentence", "LexSense", "LexEntry"]);

    assert_eq!(tree.source_field_for(c("MoForm"), Some("InflectionClasses")), Some("AllAffixAllomorphs"));
    assert_eq!(tree.source_field_for(c("MoForm"), Some("Form")), Some("AllAllomorphs"));
    assert_eq!(tree.source_field_for(c("LexSense"), None), Some("AllSenses"));

    let catalog = schema.catalog(TraversalMode::Exhaustive);
    assert!(catalog.path_for("LexEntry", "AllSenses").is_some());
    assert!(catalog.path_for("LexSense", "AllSenses").is_none());
    assert!(catalog.path_for("Nope", "AllSenses").is_none());
}

#[test]
fn test_catalog_descendants_over_sample() {
    let lex = SampleLexicon::build();
    let schema = lexicon_schema_with(lex.metadata().clone());
    let all = schema.catalog(TraversalMode::Exhaustive);
    let first = schema.catalog(TraversalMode::FirstOnly);

    assert_eq!(
        all.descendants(lex.entry_a, "AllSenses", &lex.repo),
        Some(vec![lex.sense_a1, lex.sense_a1a, lex.sense_a2])
    );
    assert_eq!(
        first.descendants(lex.entry_a, "AllSenses", &lex.repo),
        Some(vec![lex.sense_a1])
    );
    assert_eq!(
        all.descendants(lex.entry_a, "AllAllomorphs", &lex.repo),
        Some(vec![lex.stem_a, lex.affix_a, lex.stem_a2])
    );
    assert_eq!(
        all.descendants(lex.entry_a, "AllAffixAllomorphs", &lex.repo),
        Some(vec![lex.affix_a])
    );
    assert_eq!(
        all.descendants(lex.entry_a, "AllTranslations", &lex.repo),
        Some(vec![lex.translation_a1])
    );
    assert_eq!(all.descendants(lex.entry_b, "AllSenses", &lex.repo), Some(vec![]));
    assert_eq!(all.descendants(lex.sense_a1, "AllSenses", &lex.repo), None);
    assert_eq!(all.descendants(ObjectId::new(9999), "AllSenses", &lex.repo), None);
}

#[test]
fn test_missing_alternate_source_path_is_reported() {
    let stems = "  LexEntry-owns-AllStemAllomorphs:
    - seq: LexemeForm
      then:
        - choice:
            - when: MoStemAllomorph
              then: [this]
    - seq: AlternateForms
      then:
        - choice:
            - when: MoStemAllomorph
              then: [this]
";
    let text = LEXICON_SCHEMA.replace(stems, "");
    assert_ne!(text, LEXICON_SCHEMA);
    let schema = load(&text).unwrap();
    let catalog = schema.catalog(TraversalMode::Exhaustive);
    assert_eq!(
        catalog.missing_entries(schema.tree()),
        ["LexEntry-owns-AllStemAllomorphs"]
    );
}

#[test]
fn test_rejects_unknown_class_in_tree() {
    let text = LEXICON_SCHEMA.replace("class: LexPronunciation", "class: LexPronunciatoin");
    assert!(matches!(load(&text), Err(SchemaError::UnknownClass(name)) if name == "LexPronunciatoin"));
}

#[test]
fn test_rejects_duplicate_class() {
    let text = LEXICON_SCHEMA.replace(
        "    - class: LexPronunciation\n      source_field: AllPronunciations\n",
        "    - class: LexPronunciation\n      source_field: AllPronunciations\n      owns:\n        - class: LexEntry\n          source_field: MoreEntries\n",
    );
    assert!(matches!(load(&text), Err(SchemaError::DuplicateClass(name)) if name == "LexEntry"));
}

#[test]
fn test_rejects_malformed_path_ids() {
    let text = LEXICON_SCHEMA.replace("LexEntry-owns-AllPronunciations:", "LexEntry-AllPronunciations:");
    assert!(matches!(load(&text), Err(SchemaError::InvalidPathId(_))));

    let text = LEXICON_SCHEMA.replace("LexEntry-owns-AllPronunciations:", "Lexeme-owns-AllPronunciations:");
    assert!(matches!(load(&text), Err(SchemaError::UnknownClass(_))));

    let text = LEXICON_SCHEMA.replace("LexEntry-owns-AllPronunciations:", "LexEntry-has-AllPronunciations:");
    assert!(matches!(load(&text), Err(SchemaError::UnexpectedRelation { .. })));
}

#[test]
fn test_rejects_bad_steps_and_alt_fields() {
    let text = LEXICON_SCHEMA.replace("- seq: Pronunciations", "- seq: Pronunciation");
    assert!(matches!(load(&text), Err(SchemaError::InvalidStep { .. })));

    let text = LEXICON_SCHEMA.replace("StemName:AllStemAllomorphs;", "StemName;");
    assert!(matches!(load(&text), Err(SchemaError::InvalidAltSourceField { .. })));
}

proptest! {
    #[test]
    fn prop_first_only_is_a_subset_of_exhaustive(
        owner in 100u32..112,
        field in prop::sample::select(vec![
            "AllSenses", "AllAllomorphs", "AllStemAllomorphs", "AllAffixAllomorphs",
            "AllExampleSentences", "AllTranslations", "AllPronunciations",
        ]),
    ) {
        let lex = SampleLexicon::build();
        let schema = lexicon_schema_with(lex.metadata().clone());
        let owner = ObjectId::new(owner);
        let first = schema.catalog(TraversalMode::FirstOnly).descendants(owner, field, &lex.repo);
        let all = schema.catalog(TraversalMode::Exhaustive).descendants(owner, field, &lex.repo);

        prop_assert_eq!(first.is_some(), all.is_some());
        if let (Some(first), Some(all)) = (first, all) {
            prop_assert!(first.len() <= 1);
            for id in first {
                prop_assert!(all.contains(&id));
            }
        }
    }
}
