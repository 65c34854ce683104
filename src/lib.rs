//! flexfields
//!
//! Request-driven sparse fieldsets and relation expansion for JSON documents.
//!
//! This library shapes a nested JSON object graph per three request
//! parameters - `fields`, `omit` and `expand` (dot-delimited, with a `*`
//! wildcard) - against a statically declared schema of expandable relations,
//! and derives the eager-load hints the data-access layer needs so that
//! expansion never costs one fetch per row.
//!
//! # Example
//!
//! ```
//! use flexfields::{render, Relation, RenderOptions, SchemaRegistry, TypeSchema};
//! use serde_json::json;
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(
//!         "Pet",
//!         TypeSchema::new(["id", "name", "species", "owner"])
//!             .relation("owner", Relation::to_one("Person").reference()),
//!     )
//!     .unwrap();
//! registry
//!     .register("Person", TypeSchema::new(["id", "name", "url"]).links(["url"]))
//!     .unwrap();
//! registry.validate().unwrap();
//!
//! let pet = json!({
//!     "id": 1,
//!     "name": "Garfield",
//!     "species": "cat",
//!     "owner": { "id": 2, "url": "/people/2", "name": "Jon" }
//! });
//!
//! // Sparse fieldset: only the requested fields survive; the unexpanded
//! // relation renders as a reference.
//! let options = RenderOptions::new().fields(["name", "owner"]);
//! let doc = render(&pet, "Pet", &registry, &options).unwrap();
//! assert_eq!(doc, json!({ "name": "Garfield", "owner": "/people/2" }));
//!
//! // Expansion replaces the reference with a nested document.
//! let options = RenderOptions::new().fields(["name", "owner"]).expand(["owner"]);
//! let doc = render(&pet, "Pet", &registry, &options).unwrap();
//! assert_eq!(
//!     doc,
//!     json!({
//!         "name": "Garfield",
//!         "owner": { "id": 2, "name": "Jon", "url": "/people/2" }
//!     })
//! );
//! ```
//!
//! # Resolution Rules
//!
//! | Input | Effect at the current level |
//! |-------|-----------------------------|
//! | `fields` empty or `*` | keep every declared field |
//! | `fields=["a","b.c"]` | keep `a` and `b`; forward `c` under `b` |
//! | `omit=["a"]` | drop `a` (omit always wins over fields) |
//! | `omit=["a.b"]` | keep `a`; forward the omission of `b` |
//! | `expand=["a"]` | replace `a`'s reference with a nested document |
//! | `expand=["*"]` | expand every declared relation |
//!
//! Unknown names in any list are silently ignored; only schema
//! configuration faults are errors, and those fail fast at registration.

mod error;
mod loader;
mod planner;
mod render;
mod schema;
mod split;
mod types;

pub use error::{ConfigError, LoadError, RenderError};
pub use loader::{is_url, load_json, load_registry, load_registry_auto, load_registry_str};
pub use planner::{plan, QueryPlan};
pub use render::render;
pub use schema::{Relation, RelationKind, SchemaRegistry, TypeSchema};
pub use split::{split_levels, split_list};
pub use types::{
    json_type_name, Identifier, RenderOptions, UNKNOWN_IDENTIFIER, WILDCARD,
};

#[cfg(feature = "remote")]
pub use loader::load_registry_url;
