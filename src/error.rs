//! Error types for schema configuration, rendering and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors in the declared schema itself.
///
/// Configuration errors are fatal and surface at registration/validation
/// time, never per-request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown type '{name}': not registered in the schema registry")]
    UnknownType { name: String },

    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    #[error("relation '{type_name}.{relation}' targets unknown type '{target}'")]
    UnknownTarget {
        type_name: String,
        relation: String,
        target: String,
    },

    #[error("type '{type_name}' declares relation '{relation}' that is not in its field list")]
    UndeclaredRelation { type_name: String, relation: String },

    #[error("type '{type_name}' declares link field '{field}' that is not in its field list")]
    UndeclaredLink { type_name: String, field: String },

    #[error("unbounded default expansion cycle: {}", path.join(" -> "))]
    ExpansionCycle { path: Vec<String> },
}

/// Errors during document rendering.
///
/// Request-shape problems (unknown field names, odd paths) are not errors;
/// only configuration faults and structurally wrong data reach here.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("expected {expected} at {path}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Errors while loading schema declaration files.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse and declaration errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl RenderError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}
