//! Subcommand implementations
//!
//! Each command writes its report to the given writer so it can be driven
//! from tests as well as from `main`.

use crate::config::LineageConfig;
use anyhow::{Context, Result};
use lineage_meta::{ClassId, FieldId, MetadataRegistry, ObjectId, SnapshotRepository};
use lineage_resolve::{CorrespondenceResolver, RelationshipClassifier};
use lineage_tree::{LineageSchema, TraversalMode};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Loaded metadata and schema
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Configuration in effect
    pub config: LineageConfig,
    /// Class metadata
    pub metadata: Arc<MetadataRegistry>,
    /// Ownership tree and path catalogs
    pub schema: Arc<LineageSchema>,
}

impl Workspace {
    /// Load metadata and schema files
    ///
    /// # Errors
    /// Returns error if either file is unreadable or invalid
    pub fn load(config: LineageConfig, metadata_path: &Path, schema_path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(metadata_path)
            .with_context(|| format!("reading metadata {}", metadata_path.display()))?;
        let metadata = Arc::new(
            MetadataRegistry::from_yaml(&text)
                .with_context(|| format!("loading metadata {}", metadata_path.display()))?,
        );
        tracing::debug!(
            path = %metadata_path.display(),
            classes = metadata.class_count(),
            fields = metadata.field_count(),
            "Loaded metadata"
        );
        let text = std::fs::read_to_string(schema_path)
            .with_context(|| format!("reading schema {}", schema_path.display()))?;
        Self::from_schema_text(config, metadata, &text)
            .with_context(|| format!("loading schema {}", schema_path.display()))
    }

    /// Build from already loaded metadata and schema text
    ///
    /// # Errors
    /// Returns error if the schema is invalid
    pub fn from_schema_text(
        config: LineageConfig,
        metadata: Arc<MetadataRegistry>,
        schema_text: &str,
    ) -> Result<Self> {
        let schema = LineageSchema::from_yaml(schema_text, metadata.clone(), &config.schema)?;
        Ok(Self {
            config,
            metadata,
            schema: Arc::new(schema),
        })
    }

    fn class(&self, name: &str) -> Result<ClassId> {
        self.metadata
            .class_id(name)
            .with_context(|| format!("unknown class '{name}'"))
    }

    fn field(&self, path: &str) -> Result<FieldId> {
        Ok(self.metadata.field_by_path(path)?)
    }
}

/// Result of `check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Root class name
    pub root: String,
    /// Classes in the ownership tree
    pub classes: usize,
    /// Declared paths
    pub paths: usize,
    /// Ids of paths the tree needs but the catalog lacks
    pub missing: Vec<String>,
}

impl CheckReport {
    /// True if no paths are missing
    #[must_use]
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Summarize the tree and audit the catalog
///
/// # Errors
/// Returns error if writing fails
pub fn check(ws: &Workspace, json: bool, out: &mut impl Write) -> Result<CheckReport> {
    let tree = ws.schema.tree();
    let catalog = ws.schema.catalog(TraversalMode::Exhaustive);
    let report = CheckReport {
        root: tree.root().name().to_string(),
        classes: tree.len(),
        paths: catalog.len(),
        missing: catalog.missing_entries(tree),
    };
    if !report.passed() {
        tracing::warn!(missing = report.missing.len(), "Path catalog is incomplete");
    }

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(report);
    }

    writeln!(out, "Ownership tree")?;
    writeln!(out, "==============")?;
    for node in tree.nodes() {
        let indent = "  ".repeat(node.depth());
        write!(out, "{indent}{} ({})", node.name(), node.source_field())?;
        for (edited, alt) in node.alt_source_fields() {
            write!(out, " [{edited}: {alt}]")?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;
    writeln!(out, "Classes: {}", report.classes)?;
    writeln!(out, "Paths: {}", report.paths)?;
    if report.passed() {
        writeln!(out, "Missing paths: none")?;
    } else {
        writeln!(out, "Missing paths:")?;
        for id in &report.missing {
            writeln!(out, "  {id}")?;
        }
    }
    Ok(report)
}

/// Print the relationship between two classes
///
/// # Errors
/// Returns error for unknown class names or if writing fails
pub fn classify(ws: &Workspace, prev: &str, new: &str, out: &mut impl Write) -> Result<()> {
    let (prev_id, new_id) = (ws.class(prev)?, ws.class(new)?);
    let classifier = RelationshipClassifier::new(ws.schema.tree());
    let kind = classifier.classify(prev_id, new_id);
    writeln!(out, "{prev} -> {new}: {kind}")?;

    let lca = classifier
        .lowest_common_ancestor(prev_id, new_id)
        .and_then(|c| ws.metadata.class_name(c));
    writeln!(out, "lowest common ancestor: {}", lca.unwrap_or("none"))?;
    Ok(())
}

/// Options for [`resolve`]
#[derive(Debug, Clone)]
pub struct ResolveArgs<'a> {
    /// Snapshot YAML file
    pub snapshot: &'a Path,
    /// Previous field as `Class.Field`
    pub from: &'a str,
    /// New field as `Class.Field`
    pub to: &'a str,
    /// Use the first-only catalog
    pub first_only: bool,
    /// Emit JSON
    pub json: bool,
    /// Previous object ids
    pub ids: Vec<u32>,
}

/// Resolve ids from one field onto another over a snapshot
///
/// # Errors
/// Returns error if the snapshot or field paths are invalid, or writing fails
pub fn resolve(ws: &Workspace, args: &ResolveArgs<'_>, out: &mut impl Write) -> Result<()> {
    let text = std::fs::read_to_string(args.snapshot)
        .with_context(|| format!("reading snapshot {}", args.snapshot.display()))?;
    let repo = SnapshotRepository::from_yaml(&text, ws.metadata.clone())
        .with_context(|| format!("loading snapshot {}", args.snapshot.display()))?;

    tracing::debug!(objects = repo.len(), "Loaded snapshot");

    let (from, to) = (ws.field(args.from)?, ws.field(args.to)?);
    let mode = if args.first_only {
        TraversalMode::FirstOnly
    } else {
        TraversalMode::Exhaustive
    };
    let resolver = CorrespondenceResolver::new(&ws.schema, mode, &repo, &repo);
    let result = resolver.resolve_ids(from, args.ids.iter().copied().map(ObjectId::new), to);

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        return Ok(());
    }

    let relationship = result
        .relationship
        .map_or("unknown", lineage_resolve::RelationshipKind::as_str);
    writeln!(out, "relationship: {relationship}")?;
    writeln!(out, "relatives: {}", join(&result.relatives))?;
    writeln!(out, "common ancestors: {}", join(&result.common_ancestors))?;
    Ok(())
}

/// Print the source field listing a class
///
/// # Errors
/// Returns error if the class is not covered by the tree or writing fails
pub fn source_field(
    ws: &Workspace,
    class: &str,
    edited: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let id = ws.class(class)?;
    let field = ws
        .schema
        .tree()
        .source_field_for(id, edited)
        .with_context(|| format!("class '{class}' is not in the ownership tree"))?;
    writeln!(out, "{field}")?;
    Ok(())
}

fn join<'a>(ids: impl IntoIterator<Item = &'a ObjectId>) -> String {
    let parts: Vec<String> = ids.into_iter().map(|id| id.get().to_string()).collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}
