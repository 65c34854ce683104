//! Schema descriptors and the type registry.
//!
//! Each renderable type declares its field list once in a [`TypeSchema`];
//! relations name their target type symbolically and are resolved lazily
//! through the [`SchemaRegistry`], so mutually referential schemas can be
//! registered in any order. All configuration faults are caught by
//! [`SchemaRegistry::validate`] at startup, never per-request.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::WILDCARD;

/// Cardinality of the underlying storage relation.
///
/// Decides whether the eager-load planner emits a batch-join hint (to-one)
/// or a batch-prefetch hint (to-many) for a traversed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    #[default]
    ToOne,
    ToMany,
}

/// Configuration of one expandable relation on a type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Relation {
    /// Symbolic name of the nested type, resolved through the registry.
    pub target: String,
    /// To-one or to-many.
    #[serde(default)]
    pub kind: RelationKind,
    /// True when the unexpanded field renders as a URL-style reference.
    /// Reference relations are the ones rewritten by an identifier override.
    #[serde(default)]
    pub reference: bool,
    /// Always expanded, independent of the `expand` request. Used for
    /// structural sub-documents rather than lazily-expandable references.
    #[serde(default)]
    pub forced: bool,
    /// Storage field name when it differs from the relation name.
    #[serde(default)]
    pub source: Option<String>,
    /// Default sparse fieldset applied to the nested level when the request
    /// does not forward one.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Default omit list for the nested level.
    #[serde(default)]
    pub omit: Vec<String>,
    /// Fields always excluded at the nested level, merged into omit on top
    /// of whatever the request forwards.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Default expand list for the nested level.
    #[serde(default)]
    pub expand: Vec<String>,
    /// Alternate type the eager-load planner walks through instead of
    /// `target`, for relations whose render type is a specialization of the
    /// stored type.
    #[serde(default)]
    pub plan_target: Option<String>,
}

impl Relation {
    fn new(target: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            target: target.into(),
            kind,
            reference: false,
            forced: false,
            source: None,
            fields: Vec::new(),
            omit: Vec::new(),
            exclude: Vec::new(),
            expand: Vec::new(),
            plan_target: None,
        }
    }

    /// A to-one relation to the given type.
    pub fn to_one(target: impl Into<String>) -> Self {
        Self::new(target, RelationKind::ToOne)
    }

    /// A to-many relation to the given type.
    pub fn to_many(target: impl Into<String>) -> Self {
        Self::new(target, RelationKind::ToMany)
    }

    /// Mark the relation as rendering a URL-style reference when unexpanded.
    pub fn reference(mut self) -> Self {
        self.reference = true;
        self
    }

    /// Mark the relation as always expanded.
    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    /// Override the storage field name.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the nested default sparse fieldset.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the nested default omit list.
    pub fn omit<I, S>(mut self, omit: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit = omit.into_iter().map(Into::into).collect();
        self
    }

    /// Set the nested always-excluded fields.
    pub fn exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// Set the nested default expand list.
    pub fn expand<I, S>(mut self, expand: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand = expand.into_iter().map(Into::into).collect();
        self
    }

    /// Set the alternate type used by the eager-load planner.
    pub fn plan_target(mut self, plan_target: impl Into<String>) -> Self {
        self.plan_target = Some(plan_target.into());
        self
    }

    /// The storage field name backing this relation.
    pub fn storage_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.source.as_deref().unwrap_or(name)
    }

    /// The type name the eager-load planner walks through.
    pub fn plan_target_name(&self) -> &str {
        self.plan_target.as_deref().unwrap_or(&self.target)
    }
}

/// Static shape of one renderable type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TypeSchema {
    /// Declared field names, in output order.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Purely link-oriented fields (canonical URLs), dropped entirely under
    /// an identifier override.
    #[serde(default)]
    pub links: Vec<String>,
    /// Expandable relations by field name.
    #[serde(default)]
    pub relations: BTreeMap<String, Relation>,
}

impl TypeSchema {
    /// Create a schema with the given declared field list.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            links: Vec::new(),
            relations: BTreeMap::new(),
        }
    }

    /// Declare the link-oriented fields.
    pub fn links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links = links.into_iter().map(Into::into).collect();
        self
    }

    /// Declare an expandable relation.
    pub fn relation(mut self, name: impl Into<String>, relation: Relation) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    /// True when the field is a declared link field.
    pub fn is_link(&self, name: &str) -> bool {
        self.links.iter().any(|l| l == name)
    }
}

/// Explicit mapping from symbolic type name to schema, registered at startup.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: HashMap<String, TypeSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type schema under a symbolic name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateType` if the name is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        schema: TypeSchema,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(ConfigError::DuplicateType { name });
        }
        self.types.insert(name, schema);
        Ok(())
    }

    /// Look up a schema, or `None` if unregistered.
    pub fn get(&self, name: &str) -> Option<&TypeSchema> {
        self.types.get(name)
    }

    /// Look up a schema, failing with a configuration error if unregistered.
    pub fn lookup(&self, name: &str) -> Result<&TypeSchema, ConfigError> {
        self.types
            .get(name)
            .ok_or_else(|| ConfigError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validate the whole registry, fail-fast.
    ///
    /// Checks that every relation target (and `plan_target`) is registered,
    /// that relation and link names are declared fields of their type, and
    /// that forced relations and relation default-expand lists cannot chain
    /// into an unbounded expansion cycle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort_unstable();

        for type_name in &names {
            let schema = &self.types[*type_name];

            for link in &schema.links {
                if !schema.fields.contains(link) {
                    return Err(ConfigError::UndeclaredLink {
                        type_name: type_name.to_string(),
                        field: link.clone(),
                    });
                }
            }

            for (relation_name, relation) in &schema.relations {
                if !schema.fields.contains(relation_name) {
                    return Err(ConfigError::UndeclaredRelation {
                        type_name: type_name.to_string(),
                        relation: relation_name.clone(),
                    });
                }
                for target in [Some(&relation.target), relation.plan_target.as_ref()]
                    .into_iter()
                    .flatten()
                {
                    if !self.types.contains_key(target) {
                        return Err(ConfigError::UnknownTarget {
                            type_name: type_name.to_string(),
                            relation: relation_name.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        self.check_expansion_cycles()
    }

    /// Reject schemas where expansion can recurse without a request driving it.
    ///
    /// Request-driven expansion is bounded by the expand path length, but a
    /// forced relation or a relation's default expand list re-triggers
    /// expansion at the nested level with no request input. A cycle in that
    /// graph would recurse forever, so it is a configuration error.
    fn check_expansion_cycles(&self) -> Result<(), ConfigError> {
        // Nodes are (type, relation) occurrences; an edge leads to each
        // relation of the target that expands by default underneath it.
        let mut state: HashMap<(String, String), Color> = HashMap::new();

        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort_unstable();

        for type_name in names {
            let schema = &self.types[type_name];
            for relation_name in schema.relations.keys() {
                let mut stack = Vec::new();
                self.visit(type_name, relation_name, &mut state, &mut stack)?;
            }
        }
        Ok(())
    }

    fn visit(
        &self,
        type_name: &str,
        relation_name: &str,
        state: &mut HashMap<(String, String), Color>,
        stack: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        let key = (type_name.to_string(), relation_name.to_string());
        match state.get(&key) {
            Some(Color::Done) => return Ok(()),
            Some(Color::Active) => {
                let node = format!("{}.{}", type_name, relation_name);
                let start = stack.iter().position(|n| n == &node).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].to_vec();
                path.push(node);
                return Err(ConfigError::ExpansionCycle { path });
            }
            None => {}
        }

        state.insert(key.clone(), Color::Active);
        stack.push(format!("{}.{}", type_name, relation_name));

        let relation = &self.types[type_name].relations[relation_name];
        if let Some(target_schema) = self.types.get(&relation.target) {
            let defaults = default_expand_names(relation, target_schema);
            for (nested_name, nested) in &target_schema.relations {
                if nested.forced || defaults.contains(nested_name.as_str()) {
                    self.visit(&relation.target, nested_name, state, stack)?;
                }
            }
        }

        stack.pop();
        state.insert(key, Color::Done);
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    Active,
    Done,
}

/// First-level names a relation's default expand list triggers on its target.
fn default_expand_names<'a>(relation: &'a Relation, target: &'a TypeSchema) -> HashSet<&'a str> {
    let mut names = HashSet::new();
    for path in &relation.expand {
        let first = path.split('.').next().unwrap_or(path);
        if first == WILDCARD {
            names.extend(target.relations.keys().map(String::as_str));
        } else {
            names.insert(first);
        }
    }
    names
}
