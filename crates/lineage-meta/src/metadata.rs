//! Class and field metadata
//!
//! [`MetadataRegistry`] is the in-memory metadata system: classes with single
//! inheritance and the fields they declare. Ids are assigned in declaration
//! order starting at 1, and a base class must be declared before its
//! subclasses, so the inheritance chain can never loop.

use crate::error::MetadataError;
use crate::id::{ClassId, FieldId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cardinality of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// At most one value
    Atomic,

    /// Ordered values
    Sequence,

    /// Unordered values
    #[default]
    Collection,
}

/// Class declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Class id
    pub id: ClassId,
    /// Class name
    pub name: String,
    /// Base class, `None` for a root class
    pub base: Option<ClassId>,
}

/// Field declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field id
    pub id: FieldId,
    /// Declaring class
    pub owner: ClassId,
    /// Field name, unique within the declaring class
    pub name: String,
    /// Cardinality
    pub kind: FieldKind,
    /// Class of the objects the field yields, if it yields objects
    pub destination: Option<ClassId>,
}

/// Registry of classes and fields
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    classes: Vec<ClassDef>,
    class_names: HashMap<String, ClassId>,
    fields: Vec<FieldDef>,
    field_names: HashMap<(ClassId, String), FieldId>,
}

impl MetadataRegistry {
    /// Start building a registry
    #[inline]
    #[must_use]
    pub fn builder() -> MetadataBuilder {
        MetadataBuilder::default()
    }

    /// Parse a YAML metadata document
    ///
    /// # Errors
    /// Returns error on syntax errors or unresolvable references
    pub fn from_yaml(text: &str) -> Result<Self, MetadataError> {
        let doc: MetadataDocument =
            serde_yaml::from_str(text).map_err(|e| MetadataError::Syntax(e.to_string()))?;
        Self::from_document(&doc)
    }

    /// Build from a parsed document
    ///
    /// # Errors
    /// Returns error on duplicates or unresolvable references
    pub fn from_document(doc: &MetadataDocument) -> Result<Self, MetadataError> {
        let mut builder = Self::builder();
        for class in &doc.classes {
            builder.class(&class.name, class.base.as_deref())?;
        }
        for field in &doc.fields {
            builder.field(
                &field.owner,
                &field.name,
                field.kind,
                field.destination.as_deref(),
            )?;
        }
        Ok(builder.build())
    }

    /// Class declaration by id
    #[inline]
    #[must_use]
    pub fn class(&self, id: ClassId) -> Option<&ClassDef> {
        let index = (id.get() as usize).checked_sub(1)?;
        self.classes.get(index)
    }

    /// Class id by name
    #[inline]
    #[must_use]
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_names.get(name).copied()
    }

    /// Class name by id
    #[inline]
    #[must_use]
    pub fn class_name(&self, id: ClassId) -> Option<&str> {
        self.class(id).map(|c| c.name.as_str())
    }

    /// Direct base class
    #[inline]
    #[must_use]
    pub fn base_class(&self, id: ClassId) -> Option<ClassId> {
        self.class(id).and_then(|c| c.base)
    }

    /// Iterate `class` and its base classes, most derived first
    pub fn lineage(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::successors(self.class(class).map(|c| c.id), move |&c| self.base_class(c))
    }

    /// True if `class` is `ancestor` or inherits from it
    #[must_use]
    pub fn is_same_or_subclass(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.lineage(class).any(|c| c == ancestor)
    }

    /// Field declaration by id
    #[inline]
    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&FieldDef> {
        let index = (id.get() as usize).checked_sub(1)?;
        self.fields.get(index)
    }

    /// Field name by id
    #[inline]
    #[must_use]
    pub fn field_name(&self, id: FieldId) -> Option<&str> {
        self.field(id).map(|f| f.name.as_str())
    }

    /// Find a field by name on `class` or any of its bases
    #[must_use]
    pub fn field_id(&self, class: ClassId, name: &str) -> Option<FieldId> {
        self.lineage(class)
            .find_map(|c| self.field_names.get(&(c, name.to_string())).copied())
    }

    /// Resolve `Class.Field`
    ///
    /// # Errors
    /// Returns error if the path is malformed or does not resolve
    pub fn field_by_path(&self, path: &str) -> Result<FieldId, MetadataError> {
        let (class_name, field_name) = path
            .split_once('.')
            .filter(|(c, f)| !c.is_empty() && !f.is_empty())
            .ok_or_else(|| MetadataError::InvalidFieldPath(path.to_string()))?;
        let class = self
            .class_id(class_name)
            .ok_or_else(|| MetadataError::UnknownClass(class_name.to_string()))?;
        self.field_id(class, field_name)
            .ok_or_else(|| MetadataError::unknown_field(class_name, field_name))
    }

    /// `Class.Field` for a field id
    #[must_use]
    pub fn field_path(&self, id: FieldId) -> Option<String> {
        let field = self.field(id)?;
        let class = self.class_name(field.owner)?;
        Some(format!("{}.{}", class, field.name))
    }

    /// True if `field` is declared on `class` or one of its bases
    #[must_use]
    pub fn field_applies_to(&self, field: FieldId, class: ClassId) -> bool {
        self.field(field)
            .is_some_and(|f| self.is_same_or_subclass(class, f.owner))
    }

    /// All classes in declaration order
    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.iter()
    }

    /// Number of classes
    #[inline]
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Incremental builder for [`MetadataRegistry`]
#[derive(Debug, Default)]
pub struct MetadataBuilder {
    registry: MetadataRegistry,
}

impl MetadataBuilder {
    /// Declare a class
    ///
    /// # Errors
    /// Returns error if the name is taken or the base is not declared yet
    pub fn class(&mut self, name: &str, base: Option<&str>) -> Result<ClassId, MetadataError> {
        let reg = &mut self.registry;
        if reg.class_names.contains_key(name) {
            return Err(MetadataError::DuplicateClass(name.to_string()));
        }
        let base = base
            .map(|b| {
                reg.class_id(b)
                    .ok_or_else(|| MetadataError::UnknownClass(b.to_string()))
            })
            .transpose()?;

        let id = ClassId::new(next_id(reg.classes.len()));
        reg.classes.push(ClassDef {
            id,
            name: name.to_string(),
            base,
        });
        reg.class_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Declare a field on `owner`
    ///
    /// # Errors
    /// Returns error if a class is unknown or the field is already declared
    pub fn field(
        &mut self,
        owner: &str,
        name: &str,
        kind: FieldKind,
        destination: Option<&str>,
    ) -> Result<FieldId, MetadataError> {
        let reg = &mut self.registry;
        let owner_id = reg
            .class_id(owner)
            .ok_or_else(|| MetadataError::UnknownClass(owner.to_string()))?;
        let destination = destination
            .map(|d| {
                reg.class_id(d)
                    .ok_or_else(|| MetadataError::UnknownClass(d.to_string()))
            })
            .transpose()?;
        let key = (owner_id, name.to_string());
        if reg.field_names.contains_key(&key) {
            return Err(MetadataError::DuplicateField {
                class: owner.to_string(),
                field: name.to_string(),
            });
        }

        let id = FieldId::new(next_id(reg.fields.len()));
        reg.fields.push(FieldDef {
            id,
            owner: owner_id,
            name: name.to_string(),
            kind,
            destination,
        });
        reg.field_names.insert(key, id);
        Ok(id)
    }

    /// Finish building
    #[inline]
    #[must_use]
    pub fn build(self) -> MetadataRegistry {
        self.registry
    }
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len + 1).unwrap_or(u32::MAX)
}

/// Serialized form of a metadata registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Classes, bases first
    #[serde(default)]
    pub classes: Vec<ClassDocument>,
    /// Fields
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
}

/// Serialized class declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDocument {
    /// Class name
    pub name: String,
    /// Base class name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

/// Serialized field declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDocument {
    /// Declaring class name
    pub owner: String,
    /// Field name
    pub name: String,
    /// Cardinality
    #[serde(default)]
    pub kind: FieldKind,
    /// Destination class name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}
