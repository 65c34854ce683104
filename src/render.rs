//! Field resolution - shapes a JSON object graph per the requested
//! fields, omissions and expansions.
//!
//! Each level computes its retained field set, renders plain fields and
//! unexpanded relation references, and recurses into expanded relations with
//! the next-level path suffixes. The output is built from scratch per
//! resolution; the schema is never mutated.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::error::RenderError;
use crate::schema::{Relation, RelationKind, SchemaRegistry, TypeSchema};
use crate::split::split_levels;
use crate::types::{json_type_name, Identifier, RenderOptions, UNKNOWN_IDENTIFIER, WILDCARD};

/// Render an object (or array of objects) of the named type.
///
/// Unknown names in `fields`/`omit`/`expand` are silently ignored; the only
/// errors are configuration faults (unregistered type) and structurally
/// wrong data at an expansion point.
pub fn render(
    object: &Value,
    type_name: &str,
    registry: &SchemaRegistry,
    options: &RenderOptions,
) -> Result<Value, RenderError> {
    let schema = registry.lookup(type_name)?;

    match object {
        Value::Array(items) => {
            let mut result = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                result.push(render_object(item, schema, registry, options, &format!("/{}", i))?);
            }
            Ok(Value::Array(result))
        }
        other => render_object(other, schema, registry, options, ""),
    }
}

// --- Internal implementation ---

fn render_object(
    value: &Value,
    schema: &TypeSchema,
    registry: &SchemaRegistry,
    options: &RenderOptions,
    path: &str,
) -> Result<Value, RenderError> {
    let Value::Object(object) = value else {
        return Err(RenderError::TypeMismatch {
            path: path.to_string(),
            expected: "object",
            actual: json_type_name(value),
        });
    };

    let (fields_current, fields_next) = split_levels(&options.fields);
    let (expand_current, expand_next) = split_levels(&options.expand);
    let (_, omit_next) = split_levels(&options.omit);
    let omit_current = wholesale_omissions(&options.omit, schema);

    // Sparse fieldset: empty or wildcard means every declared field.
    let keep_all = fields_current.is_empty() || fields_current.contains(WILDCARD);

    // Expansion triggers: explicit request (wildcard = all relations) plus
    // forced relations.
    let expand_all = expand_current.contains(WILDCARD);

    let mut result = Map::new();

    for field in &schema.fields {
        if !keep_all && !fields_current.contains(field) {
            continue;
        }
        if omit_current.contains(field.as_str()) {
            continue;
        }
        // Link fields drop entirely under an identifier override.
        if options.identifier.is_some() && schema.is_link(field) {
            continue;
        }

        let field_path = format!("{}/{}", path, field);

        match schema.relations.get(field) {
            Some(relation) => {
                let raw = object.get(relation.storage_name(field));
                let triggered = expand_all || expand_current.contains(field) || relation.forced;

                if triggered {
                    let nested_options = nested_options(
                        relation,
                        field,
                        &fields_next,
                        &omit_next,
                        &expand_next,
                        options.identifier,
                    );
                    let expanded = render_expanded(
                        raw,
                        relation,
                        registry,
                        &nested_options,
                        &field_path,
                    )?;
                    result.insert(field.clone(), expanded);
                } else {
                    result.insert(
                        field.clone(),
                        render_reference(raw, relation, options.identifier),
                    );
                }
            }
            None => {
                result.insert(field.clone(), object.get(field).cloned().unwrap_or(Value::Null));
            }
        }
    }

    Ok(Value::Object(result))
}

/// Names omitted wholesale at this level.
///
/// Only bare (dotless) omit entries remove the field itself; a name with
/// nested omissions stays, with the suffixes forwarded one level deeper.
/// `omit=["a", "a.b"]` therefore omits `a` exactly like `omit=["a"]` would.
/// A wildcard omits every declared field.
fn wholesale_omissions<'a>(omit: &'a [String], schema: &'a TypeSchema) -> HashSet<&'a str> {
    let mut names = HashSet::new();
    for entry in omit {
        if entry.contains('.') {
            continue;
        }
        if entry == WILDCARD {
            names.extend(schema.fields.iter().map(String::as_str));
        } else {
            names.insert(entry.as_str());
        }
    }
    names
}

/// Options for a nested resolution: forwarded suffixes take precedence over
/// the relation's declared defaults, and the identifier override is inherited.
fn nested_options(
    relation: &Relation,
    name: &str,
    fields_next: &HashMap<String, Vec<String>>,
    omit_next: &HashMap<String, Vec<String>>,
    expand_next: &HashMap<String, Vec<String>>,
    identifier: Option<Identifier>,
) -> RenderOptions {
    let fields = fields_next
        .get(name)
        .cloned()
        .unwrap_or_else(|| relation.fields.clone());
    let mut omit = omit_next
        .get(name)
        .cloned()
        .unwrap_or_else(|| relation.omit.clone());
    omit.extend(relation.exclude.iter().cloned());
    let expand = expand_next
        .get(name)
        .cloned()
        .unwrap_or_else(|| relation.expand.clone());

    RenderOptions {
        fields,
        omit,
        expand,
        identifier,
    }
}

fn render_expanded(
    raw: Option<&Value>,
    relation: &Relation,
    registry: &SchemaRegistry,
    options: &RenderOptions,
    path: &str,
) -> Result<Value, RenderError> {
    let target = registry.lookup(&relation.target)?;

    let Some(value) = raw else {
        return Ok(Value::Null);
    };

    match relation.kind {
        RelationKind::ToOne => match value {
            Value::Null => Ok(Value::Null),
            other => render_object(other, target, registry, options, path),
        },
        RelationKind::ToMany => match value {
            Value::Null => Ok(Value::Null),
            Value::Array(items) => {
                let mut result = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    result.push(render_object(
                        item,
                        target,
                        registry,
                        options,
                        &format!("{}/{}", path, i),
                    )?);
                }
                Ok(Value::Array(result))
            }
            other => Err(RenderError::TypeMismatch {
                path: path.to_string(),
                expected: "array",
                actual: json_type_name(other),
            }),
        },
    }
}

/// Render an unexpanded relation as a reference value.
///
/// Reference-style relations pick the target's `url` attribute, or the
/// identifier-override attribute when one is set; `name`/`reference` modes
/// fall back to a fixed sentinel instead of failing when the attribute is
/// absent. Non-reference relations always pick the target's `id`. Scalar
/// values pass through unchanged.
fn render_reference(raw: Option<&Value>, relation: &Relation, identifier: Option<Identifier>) -> Value {
    let Some(value) = raw else {
        return Value::Null;
    };

    match (value, relation.kind) {
        (Value::Array(items), RelationKind::ToMany) => Value::Array(
            items
                .iter()
                .map(|item| reference_value(item, relation, identifier))
                .collect(),
        ),
        _ => reference_value(value, relation, identifier),
    }
}

fn reference_value(value: &Value, relation: &Relation, identifier: Option<Identifier>) -> Value {
    let Value::Object(object) = value else {
        // Already a bare reference (key, URL string, ...).
        return value.clone();
    };

    if !relation.reference {
        return object.get("id").cloned().unwrap_or(Value::Null);
    }

    match identifier {
        None => object.get("url").cloned().unwrap_or(Value::Null),
        Some(Identifier::Id) => object.get("id").cloned().unwrap_or(Value::Null),
        Some(mode) => object
            .get(mode.attribute())
            .cloned()
            .unwrap_or_else(|| Value::String(UNKNOWN_IDENTIFIER.to_string())),
    }
}
