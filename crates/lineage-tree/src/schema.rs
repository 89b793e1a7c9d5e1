//! Loaded schema
//!
//! Bundles the ownership tree with both compiled path catalogs. A schema is
//! immutable once built and is shared behind an `Arc` by coordinators.

use crate::catalog::PathCatalog;
use crate::document::SchemaDocument;
use crate::error::SchemaError;
use crate::path::TraversalMode;
use crate::tree::OwnershipTree;
use lineage_meta::MetadataRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default relation keyword in path ids
pub const DEFAULT_RELATION_KEYWORD: &str = "owns";

/// Schema loading options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Middle component of every path id
    pub relation_keyword: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            relation_keyword: DEFAULT_RELATION_KEYWORD.to_string(),
        }
    }
}

impl SchemaConfig {
    /// Builder: set relation keyword
    #[must_use]
    pub fn with_relation_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.relation_keyword = keyword.into();
        self
    }
}

/// Ownership tree plus first-only and exhaustive path catalogs
#[derive(Debug, Clone)]
pub struct LineageSchema {
    tree: OwnershipTree,
    first_only: PathCatalog,
    exhaustive: PathCatalog,
}

impl LineageSchema {
    /// Parse and build from YAML text
    ///
    /// # Errors
    /// Returns [`SchemaError::Syntax`] for malformed YAML, otherwise any
    /// validation error from [`LineageSchema::from_document`]
    pub fn from_yaml(
        text: &str,
        metadata: Arc<MetadataRegistry>,
        config: &SchemaConfig,
    ) -> Result<Self, SchemaError> {
        let doc = SchemaDocument::from_yaml(text).map_err(|e| SchemaError::Syntax(e.to_string()))?;
        Self::from_document(&doc, metadata, config)
    }

    /// Build from a parsed document
    ///
    /// # Errors
    /// Returns error if the tree or any path fails validation
    pub fn from_document(
        doc: &SchemaDocument,
        metadata: Arc<MetadataRegistry>,
        config: &SchemaConfig,
    ) -> Result<Self, SchemaError> {
        let tree = OwnershipTree::from_declaration(&doc.ownership, metadata.clone())?;
        let keyword = config.relation_keyword.as_str();
        let first_only =
            PathCatalog::compile(&doc.paths, metadata.clone(), keyword, TraversalMode::FirstOnly)?;
        let exhaustive =
            PathCatalog::compile(&doc.paths, metadata, keyword, TraversalMode::Exhaustive)?;

        let schema = Self {
            tree,
            first_only,
            exhaustive,
        };
        for id in schema.exhaustive.missing_entries(&schema.tree) {
            tracing::debug!("no path declared for {}", id);
        }
        tracing::info!(
            "loaded schema: {} classes, {} paths",
            schema.tree.len(),
            schema.exhaustive.len()
        );
        Ok(schema)
    }

    /// Class metadata
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &Arc<MetadataRegistry> {
        self.tree.metadata()
    }

    /// Ownership tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &OwnershipTree {
        &self.tree
    }

    /// Catalog for a traversal mode
    #[inline]
    #[must_use]
    pub fn catalog(&self, mode: TraversalMode) -> &PathCatalog {
        match mode {
            TraversalMode::FirstOnly => &self.first_only,
            TraversalMode::Exhaustive => &self.exhaustive,
        }
    }
}
