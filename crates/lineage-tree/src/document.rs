//! Serialized schema document
//!
//! Mirrors the YAML layout one-to-one. Nothing here is validated; see
//! [`LineageSchema::from_document`](crate::LineageSchema::from_document).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Root of the class ownership tree
    pub ownership: ClassDeclaration,

    /// Descendant paths keyed by `Owner-Relation-Field`
    #[serde(default)]
    pub paths: IndexMap<String, Vec<StepDocument>>,
}

impl SchemaDocument {
    /// Parse YAML text
    ///
    /// # Errors
    /// Returns the underlying YAML error
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

/// One class in the ownership tree, with the classes it owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDeclaration {
    /// Class name
    pub class: String,

    /// Root-aggregate field yielding instances of this class
    pub source_field: String,

    /// `Target:Alt;Target:Alt` overrides of the source field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_source_field: Option<String>,

    /// Owned classes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owns: Vec<ClassDeclaration>,
}

/// One traversal step
///
/// ```yaml
/// - this
/// - field: Senses
/// - seq: Senses
///   then: [this]
/// - choice:
///     - when: MoStemAllomorph
///       then: [this]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepDocument {
    /// Bare keyword; only `this` is defined
    Keyword(String),

    /// Navigate into each value of a field
    Sequence {
        /// Field name
        seq: String,
        /// Steps applied to each value; empty yields the values
        #[serde(default)]
        then: Vec<StepDocument>,
    },

    /// Yield the values of a field
    Field {
        /// Field name
        field: String,
    },

    /// First matching arm wins
    Choice {
        /// Arms in priority order
        choice: Vec<ArmDocument>,
    },
}

/// One arm of a choice step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmDocument {
    /// Class the current object must be (or inherit from); `None` always matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,

    /// Steps applied when the arm matches
    #[serde(default)]
    pub then: Vec<StepDocument>,
}
