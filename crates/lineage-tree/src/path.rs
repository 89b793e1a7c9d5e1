//! Descendant paths
//!
//! A [`PathSpec`] says how to enumerate, from one owner object, the objects a
//! list field would show beneath it. Specs are compiled once from
//! [`StepDocument`]s: field names are resolved against the class reached at
//! each step and the [`TraversalMode`] is baked into every sequence step.

use crate::document::StepDocument;
use crate::error::SchemaError;
use indexmap::IndexSet;
use lineage_meta::{ClassId, FieldId, MetadataRegistry, ObjectId, ObjectRepository};

/// How much of a path to traverse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TraversalMode {
    /// Follow sequence values only until one yields a descendant and stop at
    /// the first descendant found
    FirstOnly,

    /// Return every descendant
    #[default]
    Exhaustive,
}

/// Compiled traversal step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Navigate into the values of `field`; with no nested steps, yield them
    Sequence {
        /// Field followed
        field: FieldId,
        /// Values are followed only until one of them yields a descendant
        first_only: bool,
        /// Steps applied to each value
        steps: Vec<PathStep>,
    },

    /// Yield the values of a field
    Field(FieldId),

    /// Yield the current object
    This,

    /// Apply the first arm whose class matches the current object
    Choice(Vec<ChoiceArm>),
}

/// One arm of a [`PathStep::Choice`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceArm {
    /// Required class (or base class) of the current object; `None` matches all
    pub when: Option<ClassId>,
    /// Steps applied when the arm matches
    pub steps: Vec<PathStep>,
}

/// Compiled path for one `(owner class, field)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    id: String,
    owner: ClassId,
    field: String,
    mode: TraversalMode,
    steps: Vec<PathStep>,
}

impl PathSpec {
    /// Compile a path from its document form
    ///
    /// # Errors
    /// Returns error for unknown keywords, classes or fields, and for fields
    /// that are navigated or yielded but do not hold objects
    pub fn compile(
        id: &str,
        owner: ClassId,
        field: &str,
        docs: &[StepDocument],
        metadata: &MetadataRegistry,
        mode: TraversalMode,
    ) -> Result<Self, SchemaError> {
        let compiler = Compiler { id, metadata, mode };
        let steps = compiler.steps(docs, owner)?;
        Ok(Self {
            id: id.to_string(),
            owner,
            field: field.to_string(),
            mode,
            steps,
        })
    }

    /// Declared id (`Owner-Relation-Field`)
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Owner class the path starts from
    #[inline]
    #[must_use]
    pub fn owner(&self) -> ClassId {
        self.owner
    }

    /// Target list field name
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Traversal mode baked into this path
    #[inline]
    #[must_use]
    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    /// Compiled steps
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Enumerate descendants of `owner`, in path order, without duplicates
    ///
    /// Stale objects are skipped. In [`TraversalMode::FirstOnly`] at most one
    /// descendant is returned.
    #[must_use]
    pub fn descendants<R: ObjectRepository>(
        &self,
        owner: ObjectId,
        repo: &R,
        metadata: &MetadataRegistry,
    ) -> Vec<ObjectId> {
        if !repo.is_valid(owner) {
            return Vec::new();
        }
        let mut walk = Walk {
            repo,
            metadata,
            limit: match self.mode {
                TraversalMode::FirstOnly => Some(1),
                TraversalMode::Exhaustive => None,
            },
            found: IndexSet::new(),
        };
        walk.steps(&self.steps, owner);
        walk.found.into_iter().collect()
    }
}

struct Compiler<'a> {
    id: &'a str,
    metadata: &'a MetadataRegistry,
    mode: TraversalMode,
}

impl Compiler<'_> {
    fn steps(&self, docs: &[StepDocument], class: ClassId) -> Result<Vec<PathStep>, SchemaError> {
        docs.iter().map(|doc| self.step(doc, class)).collect()
    }

    fn step(&self, doc: &StepDocument, class: ClassId) -> Result<PathStep, SchemaError> {
        match doc {
            StepDocument::Keyword(word) if word == "this" => Ok(PathStep::This),
            StepDocument::Keyword(word) => Err(self.invalid(format!("unknown keyword '{word}'"))),
            StepDocument::Field { field } => {
                let (id, _) = self.object_field(class, field)?;
                Ok(PathStep::Field(id))
            }
            StepDocument::Sequence { seq, then } => {
                let (id, destination) = self.object_field(class, seq)?;
                Ok(PathStep::Sequence {
                    field: id,
                    first_only: self.mode == TraversalMode::FirstOnly,
                    steps: self.steps(then, destination)?,
                })
            }
            StepDocument::Choice { choice } => {
                if choice.is_empty() {
                    return Err(self.invalid("choice without arms"));
                }
                let arms = choice
                    .iter()
                    .map(|arm| {
                        let when = arm
                            .when
                            .as_deref()
                            .map(|name| {
                                self.metadata
                                    .class_id(name)
                                    .ok_or_else(|| SchemaError::UnknownClass(name.to_string()))
                            })
                            .transpose()?;
                        Ok(ChoiceArm {
                            when,
                            steps: self.steps(&arm.then, when.unwrap_or(class))?,
                        })
                    })
                    .collect::<Result<Vec<_>, SchemaError>>()?;
                Ok(PathStep::Choice(arms))
            }
        }
    }

    fn object_field(&self, class: ClassId, name: &str) -> Result<(FieldId, ClassId), SchemaError> {
        let class_name = self.metadata.class_name(class).unwrap_or("?");
        let field = self
            .metadata
            .field_id(class, name)
            .ok_or_else(|| self.invalid(format!("unknown field {class_name}.{name}")))?;
        let destination = self
            .metadata
            .field(field)
            .and_then(|f| f.destination)
            .ok_or_else(|| self.invalid(format!("{class_name}.{name} does not hold objects")))?;
        Ok((field, destination))
    }

    fn invalid(&self, reason: impl Into<String>) -> SchemaError {
        SchemaError::invalid_step(self.id, reason)
    }
}

struct Walk<'a, R> {
    repo: &'a R,
    metadata: &'a MetadataRegistry,
    limit: Option<usize>,
    found: IndexSet<ObjectId>,
}

impl<R: ObjectRepository> Walk<'_, R> {
    fn full(&self) -> bool {
        self.limit.is_some_and(|limit| self.found.len() >= limit)
    }

    fn emit(&mut self, id: ObjectId) {
        if !self.full() && self.repo.is_valid(id) {
            self.found.insert(id);
        }
    }

    fn steps(&mut self, steps: &[PathStep], current: ObjectId) {
        for step in steps {
            if self.full() {
                return;
            }
            self.step(step, current);
        }
    }

    fn step(&mut self, step: &PathStep, current: ObjectId) {
        match step {
            PathStep::This => self.emit(current),
            PathStep::Field(field) => {
                for value in self.repo.field_values(current, *field) {
                    self.emit(value);
                }
            }
            PathStep::Sequence {
                field,
                first_only,
                steps,
            } => {
                let before = self.found.len();
                for value in self.repo.field_values(current, *field) {
                    if self.full() || (*first_only && self.found.len() > before) {
                        return;
                    }
                    if !self.repo.is_valid(value) {
                        continue;
                    }
                    if steps.is_empty() {
                        self.emit(value);
                    } else {
                        self.steps(steps, value);
                    }
                }
            }
            PathStep::Choice(arms) => {
                let class = self.repo.class_of(current);
                let arm = arms.iter().find(|arm| match arm.when {
                    None => true,
                    Some(when) => class.is_some_and(|c| self.metadata.is_same_or_subclass(c, when)),
                });
                if let Some(arm) = arm {
                    self.steps(&arm.steps, current);
                }
            }
        }
    }
}
