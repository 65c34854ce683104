//! Core types for field resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::split::split_list;

/// Wildcard name meaning "every schema-known name at this level".
pub const WILDCARD: &str = "*";

/// Sentinel rendered when an identifier-override attribute is absent
/// on the referenced object.
pub const UNKNOWN_IDENTIFIER: &str = "Unknown identifier";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render-wide choice of how relation references are represented in place
/// of a URL-style link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Identifier {
    /// Render the target's primary key.
    Id,
    /// Render the target's `name` attribute, with a sentinel fallback.
    Name,
    /// Render the target's `reference` attribute, with a sentinel fallback.
    Reference,
}

impl Identifier {
    /// Parse an identifier mode from a string.
    ///
    /// Returns `None` for unknown values; callers treat that as "no override"
    /// (request-shape input is filtered permissively, never rejected).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(Identifier::Id),
            "name" => Some(Identifier::Name),
            "reference" => Some(Identifier::Reference),
            _ => None,
        }
    }

    /// The attribute looked up on the referenced object.
    pub fn attribute(&self) -> &'static str {
        match self {
            Identifier::Id => "id",
            Identifier::Name => "name",
            Identifier::Reference => "reference",
        }
    }

    /// True for the modes that render a human-readable slug rather than a key.
    ///
    /// Slug modes make the eager-load planner join every reference relation
    /// up front, since each reference then needs the target row's attributes.
    pub fn is_slug(&self) -> bool {
        matches!(self, Identifier::Name | Identifier::Reference)
    }
}

/// Per-render resolution parameters: sparse fieldsets, omissions, expansions
/// and the optional identifier override.
///
/// Constructed once per render. The root level may parse these from an inbound
/// request's query parameters via [`RenderOptions::from_query`]; nested levels
/// are built internally from what the parent forwards and never read the
/// ambient request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Dot-delimited paths of fields to retain. Empty means "all fields".
    pub fields: Vec<String>,
    /// Dot-delimited paths of fields to drop. Omit wins over fields.
    pub omit: Vec<String>,
    /// Dot-delimited paths of relations to expand into nested documents.
    pub expand: Vec<String>,
    /// Optional override for how relation references render.
    pub identifier: Option<Identifier>,
}

impl RenderOptions {
    /// Create empty options: all fields, nothing omitted, nothing expanded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sparse fieldset paths.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the omit paths.
    pub fn omit<I, S>(mut self, omit: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit = omit.into_iter().map(Into::into).collect();
        self
    }

    /// Set the expand paths.
    pub fn expand<I, S>(mut self, expand: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand = expand.into_iter().map(Into::into).collect();
        self
    }

    /// Set the identifier override.
    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Build options from query parameters (root level only).
    ///
    /// Recognized keys: `fields`, `omit`, `expand`, `exclude` (alias merged
    /// into omit) and `identifier`. List values tolerate commas, whitespace
    /// and mixed/empty input. Unknown keys and unknown identifier values are
    /// ignored. Later duplicates of a key override earlier ones.
    pub fn from_query<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        let mut exclude = Vec::new();

        for (key, value) in params {
            match key {
                "fields" => options.fields = split_list(value),
                "omit" => options.omit = split_list(value),
                "expand" => options.expand = split_list(value),
                "exclude" => exclude = split_list(value),
                "identifier" => options.identifier = Identifier::parse(value),
                _ => {}
            }
        }

        options.omit.extend(exclude);
        options
    }
}
