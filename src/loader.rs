//! Schema declaration loading from files, strings and HTTP URLs.
//!
//! A declaration file is a JSON document mapping type names to their
//! schemas:
//!
//! ```json
//! {
//!     "Pet": {
//!         "fields": ["id", "url", "name", "owner"],
//!         "links": ["url"],
//!         "relations": {
//!             "owner": { "target": "Person", "reference": true }
//!         }
//!     },
//!     "Person": { "fields": ["id", "name"] }
//! }
//! ```
//!
//! Loading always validates the resulting registry, so configuration errors
//! surface at load time, never per-request.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;
use crate::schema::{SchemaRegistry, TypeSchema};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load an arbitrary JSON document from a file path.
///
/// Used for schema declaration files and for the object documents the CLI
/// renders.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load and validate a schema registry from a declaration file.
pub fn load_registry(path: &Path) -> Result<SchemaRegistry, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_registry_str(&content)
}

/// Load and validate a schema registry from a JSON string.
pub fn load_registry_str(content: &str) -> Result<SchemaRegistry, LoadError> {
    let declarations: BTreeMap<String, TypeSchema> =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;

    build_registry(declarations)
}

/// Load and validate a schema registry from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
#[cfg(feature = "remote")]
pub fn load_registry_url(url: &str) -> Result<SchemaRegistry, LoadError> {
    let network = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    let response = client.get(url).send().map_err(network)?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(network)?;

    let declarations: BTreeMap<String, TypeSchema> = response.json().map_err(network)?;
    build_registry(declarations)
}

/// Load a schema registry from a file path or URL.
///
/// Automatically detects whether the source is a URL or file path.
/// URL loading requires the `remote` feature.
pub fn load_registry_auto(source: &str) -> Result<SchemaRegistry, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_registry_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_registry(Path::new(source))
    }
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn build_registry(
    declarations: BTreeMap<String, TypeSchema>,
) -> Result<SchemaRegistry, LoadError> {
    let mut registry = SchemaRegistry::new();
    for (name, schema) in declarations {
        registry.register(name, schema)?;
    }
    registry.validate()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PET_DECLARATION: &str = r#"{
        "Pet": {
            "fields": ["id", "url", "name", "owner"],
            "links": ["url"],
            "relations": {
                "owner": { "target": "Person", "reference": true }
            }
        },
        "Person": { "fields": ["id", "name"] }
    }"#;

    #[test]
    fn load_registry_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", PET_DECLARATION).unwrap();

        let registry = load_registry(file.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("Pet").unwrap().relations.contains_key("owner"));
    }

    #[test]
    fn load_registry_file_not_found() {
        let result = load_registry(Path::new("/nonexistent/schema.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_registry_str_invalid_json() {
        let result = load_registry_str("not json");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_registry_str_wrong_shape() {
        let result = load_registry_str(r#"["Pet"]"#);
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_registry_str_validates() {
        // owner targets a type that is never declared
        let result = load_registry_str(
            r#"{
                "Pet": {
                    "fields": ["id", "owner"],
                    "relations": { "owner": { "target": "Person" } }
                }
            }"#,
        );
        assert!(matches!(
            result,
            Err(LoadError::Config(ConfigError::UnknownTarget { .. }))
        ));
    }

    #[test]
    fn load_json_valid() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"name": "Garfield"}}"#).unwrap();

        let value = load_json(file.path()).unwrap();
        assert_eq!(value["name"], "Garfield");
    }

    #[test]
    fn load_json_missing_file() {
        let result = load_json(Path::new("/nonexistent/object.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn is_url_detection() {
        assert!(is_url("https://example.com/schema.json"));
        assert!(is_url("http://example.com/schema.json"));
        assert!(!is_url("/path/to/schema.json"));
        assert!(!is_url("schema.json"));
    }

    #[test]
    fn load_registry_auto_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", PET_DECLARATION).unwrap();

        let registry = load_registry_auto(file.path().to_str().unwrap()).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_registry_url_valid() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/schema.json")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(PET_DECLARATION)
                .create();

            let registry = load_registry_url(&format!("{}/schema.json", server.url())).unwrap();
            assert_eq!(registry.len(), 2);
            mock.assert();
        }

        #[test]
        fn load_registry_url_404() {
            let mut server = mockito::Server::new();
            server
                .mock("GET", "/missing.json")
                .with_status(404)
                .create();

            let result = load_registry_url(&format!("{}/missing.json", server.url()));
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }

        #[test]
        fn load_registry_auto_url() {
            let mut server = mockito::Server::new();
            server
                .mock("GET", "/schema.json")
                .with_status(200)
                .with_body(PET_DECLARATION)
                .create();

            let result = load_registry_auto(&format!("{}/schema.json", server.url()));
            assert!(result.is_ok());
        }
    }
}
