//! # Schema Registry
//!
//! One compiled [`SchemaDocument`] per regular file of the schema
//! directory. Sub-directories are not searched.
//!
//! Schemas default to Draft 7; a schema may select another draft through
//! its own `$schema` keyword.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use datacheck_core::AddressChecker;
use jsonschema::{Draft, ValidationOptions, Validator};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Name of the custom format backed by the address checker.
pub const ADDRESS_FORMAT: &str = "address";

/// Fatal error while building the registry.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The schema directory itself could not be listed.
    #[error("schema directory \"{}\" cannot be read: {source}", path.display())]
    UnreadableDirectory {
        /// Schema directory path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A schema file could not be read.
    #[error("\"{}\" cannot be read: {source}", path.display())]
    Unreadable {
        /// Schema file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A schema file is not valid JSON.
    #[error("\"{}\" is not a valid schema (invalid JSON: {source})", path.display())]
    InvalidJson {
        /// Schema file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A schema file is JSON but does not compile as a schema.
    #[error("\"{}\" is not a valid schema ({reason})", path.display())]
    InvalidSchema {
        /// Schema file path.
        path: PathBuf,
        /// Compiler message.
        reason: String,
    },

    /// Two schema files map to the same identifier (e.g. `a.json` and `a.yaml`).
    #[error("\"{}\" duplicates schema identifier \"{identifier}\"", path.display())]
    DuplicateIdentifier {
        /// The second file claiming the identifier.
        path: PathBuf,
        /// The shared identifier.
        identifier: String,
    },
}

impl SchemaLoadError {
    /// The schema file (or directory) the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::UnreadableDirectory { path, .. }
            | Self::Unreadable { path, .. }
            | Self::InvalidJson { path, .. }
            | Self::InvalidSchema { path, .. }
            | Self::DuplicateIdentifier { path, .. } => path,
        }
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Schema keyword that failed (`required`, `type`, `format`, ...).
    pub keyword: String,
    /// JSON Pointer to the violating value in the document; empty for the root.
    pub instance_path: String,
    /// JSON Pointer to the failing keyword within the schema.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.keyword, self.instance_path, self.message)
    }
}

/// A compiled schema and the identifier it is registered under.
pub struct SchemaDocument {
    identifier: String,
    path: PathBuf,
    validator: Validator,
}

impl fmt::Debug for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDocument")
            .field("identifier", &self.identifier)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SchemaDocument {
    /// Registry key of this schema.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// File the schema was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate `instance`, returning every violation in schema order.
    ///
    /// # Errors
    ///
    /// Returns the non-empty list of violations if the instance does not conform.
    pub fn validate(&self, instance: &Value) -> Result<(), Vec<Violation>> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| {
                let schema_path = e.schema_path.to_string();
                Violation {
                    keyword: keyword_of(&schema_path),
                    instance_path: e.instance_path.to_string(),
                    schema_path,
                    message: e.to_string(),
                }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// The last segment of a schema path that names a keyword rather than an
/// array index.
fn keyword_of(schema_path: &str) -> String {
    schema_path
        .rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or_default()
        .to_string()
}

/// Compiled schemas keyed by identifier.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, SchemaDocument>,
}

impl SchemaRegistry {
    /// Load and compile every regular file in `schema_dir`.
    ///
    /// Non-file entries (directories, symlinks) are skipped silently.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be read, parsed, or compiled.
    pub fn load(
        schema_dir: impl AsRef<Path>,
        checker: Arc<dyn AddressChecker>,
    ) -> Result<Self, SchemaLoadError> {
        let schema_dir = schema_dir.as_ref();
        let entries =
            std::fs::read_dir(schema_dir).map_err(|source| SchemaLoadError::UnreadableDirectory {
                path: schema_dir.to_path_buf(),
                source,
            })?;

        let mut registry = Self::default();

        for entry in entries {
            let entry = entry.map_err(|source| SchemaLoadError::UnreadableDirectory {
                path: schema_dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|source| SchemaLoadError::Unreadable {
                    path: path.clone(),
                    source,
                })?;
            if !file_type.is_file() {
                tracing::debug!(path = %path.display(), "skipping non-file schema entry");
                continue;
            }

            let content = std::fs::read_to_string(&path).map_err(|source| {
                SchemaLoadError::Unreadable {
                    path: path.clone(),
                    source,
                }
            })?;
            let value: Value =
                serde_json::from_str(&content).map_err(|source| SchemaLoadError::InvalidJson {
                    path: path.clone(),
                    source,
                })?;

            let identifier = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            registry.insert(&checker, identifier, path, &value)?;
        }

        tracing::info!(
            schema_dir = %schema_dir.display(),
            count = registry.len(),
            "loaded schemas"
        );
        Ok(registry)
    }

    /// Compile in-memory schemas. The identifier doubles as the reported path.
    ///
    /// # Errors
    ///
    /// Fails on the first schema that does not compile.
    pub fn from_schemas<I, S>(schemas: I, checker: Arc<dyn AddressChecker>) -> Result<Self, SchemaLoadError>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        for (identifier, value) in schemas {
            let identifier = identifier.into();
            let path = PathBuf::from(&identifier);
            registry.insert(&checker, identifier, path, &value)?;
        }
        Ok(registry)
    }

    fn insert(
        &mut self,
        checker: &Arc<dyn AddressChecker>,
        identifier: String,
        path: PathBuf,
        value: &Value,
    ) -> Result<(), SchemaLoadError> {
        if self.schemas.contains_key(&identifier) {
            return Err(SchemaLoadError::DuplicateIdentifier { path, identifier });
        }

        let validator = build_options(checker, value)
            .build(value)
            .map_err(|e| SchemaLoadError::InvalidSchema {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(identifier = %identifier, path = %path.display(), "compiled schema");
        self.schemas.insert(
            identifier.clone(),
            SchemaDocument {
                identifier,
                path,
                validator,
            },
        );
        Ok(())
    }

    /// Look up a schema by identifier. Case-sensitive.
    pub fn lookup(&self, identifier: &str) -> Option<&SchemaDocument> {
        self.schemas.get(identifier)
    }

    /// Number of loaded schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no schemas were loaded.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Compilation options for one schema.
///
/// Draft 7 applies only when the schema does not name its own draft with a
/// top-level `$schema` string; otherwise `jsonschema` detects it.
fn build_options(checker: &Arc<dyn AddressChecker>, schema: &Value) -> ValidationOptions {
    let mut opts = jsonschema::options();
    if schema.get("$schema").and_then(Value::as_str).is_none() {
        opts.with_draft(Draft::Draft7);
    }
    opts.should_validate_formats(true);
    let checker = Arc::clone(checker);
    opts.with_format(ADDRESS_FORMAT, move |value: &str| checker.is_address(value));
    opts
}
