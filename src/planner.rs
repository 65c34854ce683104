//! Eager-load planning - turns expand paths into data-access hints.
//!
//! The planner walks the same dot-delimited expand paths as the field
//! resolver, but against the storage relations, and accumulates per-branch
//! join paths. The data-access layer applies the resulting hints so that
//! expansion never triggers a per-row fetch for each nested object.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::ConfigError;
use crate::schema::{RelationKind, SchemaRegistry, TypeSchema};
use crate::types::WILDCARD;

/// Accumulated eager-load hints for one query.
///
/// `select_related` paths can be satisfied by a single joined fetch;
/// `prefetch_related` paths need a dependent batch fetch per parent set.
/// Paths are `__`-joined storage names. Duplicate hints collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub select_related: BTreeSet<String>,
    pub prefetch_related: BTreeSet<String>,
}

impl QueryPlan {
    /// True when no hints were produced.
    pub fn is_empty(&self) -> bool {
        self.select_related.is_empty() && self.prefetch_related.is_empty()
    }

    fn add(&mut self, segments: &[(String, bool)]) {
        if segments.is_empty() {
            return;
        }
        let path = segments
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join("__");
        // One to-many hop anywhere makes the whole path a prefetch: joining
        // across it would multiply parent rows.
        if segments.iter().any(|(_, to_many)| *to_many) {
            self.prefetch_related.insert(path);
        } else {
            self.select_related.insert(path);
        }
    }
}

/// Plan eager-load hints for the given expand paths against a root type.
///
/// With `slug_mode` (identifier rendered as `name`/`reference`), every
/// reference-style relation on the root schema gets a hint up front, since
/// each reference then needs attributes from the target row.
///
/// Segments that are not declared relations stop the walk silently - the
/// valid prefix (if any) still gets its hint, the remainder is simply not
/// optimized. A wildcard segment repeats the walk for every relation at
/// that level.
///
/// # Errors
///
/// Returns `ConfigError` if the root type or a traversed relation target is
/// unregistered.
pub fn plan(
    expand_paths: &[String],
    root_type: &str,
    registry: &SchemaRegistry,
    slug_mode: bool,
) -> Result<QueryPlan, ConfigError> {
    let root = registry.lookup(root_type)?;
    let mut plan = QueryPlan::default();

    if slug_mode {
        for (name, relation) in &root.relations {
            if !relation.reference {
                continue;
            }
            let storage = relation.storage_name(name).to_string();
            match relation.kind {
                RelationKind::ToOne => plan.select_related.insert(storage),
                RelationKind::ToMany => plan.prefetch_related.insert(storage),
            };
        }
    }

    for path in expand_paths {
        let segments: Vec<&str> = path.split('.').collect();
        walk(&segments, root, registry, Vec::new(), &mut plan)?;
    }

    Ok(plan)
}

fn walk(
    segments: &[&str],
    schema: &TypeSchema,
    registry: &SchemaRegistry,
    prefix: Vec<(String, bool)>,
    plan: &mut QueryPlan,
) -> Result<(), ConfigError> {
    let Some((segment, rest)) = segments.split_first() else {
        plan.add(&prefix);
        return Ok(());
    };

    if *segment == WILDCARD {
        for name in schema.relations.keys() {
            let mut branch: Vec<&str> = vec![name.as_str()];
            branch.extend_from_slice(rest);
            walk(&branch, schema, registry, prefix.clone(), plan)?;
        }
        return Ok(());
    }

    let Some(relation) = schema.relations.get(*segment) else {
        // Unknown segment: the request still renders correctly, it just
        // does not get a hint beyond the valid prefix.
        plan.add(&prefix);
        return Ok(());
    };

    let mut prefix = prefix;
    prefix.push((
        relation.storage_name(segment).to_string(),
        relation.kind == RelationKind::ToMany,
    ));

    let next = registry.lookup(relation.plan_target_name())?;
    walk(rest, next, registry, prefix, plan)
}
