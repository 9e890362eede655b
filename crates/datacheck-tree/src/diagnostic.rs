//! # Diagnostics and Reports
//!
//! Every accumulative failure found during traversal is a [`Diagnostic`].
//! A [`ValidationReport`] carries the aggregate flag and the diagnostics in
//! emission order. Rendering to console lines is the `Display` impl.

use std::fmt;
use std::path::PathBuf;

use datacheck_core::layout::SCHEMA_FIELD;
use datacheck_schema::Violation;
use serde::Serialize;

/// A single failure found during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The document could not be read or parsed as JSON.
    InvalidJson {
        /// Document path.
        path: PathBuf,
        /// Read or parse error.
        reason: String,
    },

    /// The document has no usable schema field.
    MissingSchemaField {
        /// Document path.
        path: PathBuf,
    },

    /// The document names a schema that is not in the registry.
    UnknownSchema {
        /// Document path.
        path: PathBuf,
        /// The schema field's value.
        schema: String,
    },

    /// The document does not conform to its schema.
    SchemaViolations {
        /// Document path.
        path: PathBuf,
        /// Schema identifier.
        schema: String,
        /// Individual violations, never empty.
        violations: Vec<Violation>,
    },

    /// An address-named directory is not an address at all.
    InvalidAddress {
        /// Directory path.
        path: PathBuf,
        /// Directory name.
        name: String,
        /// Checker error.
        reason: String,
    },

    /// An address-named directory is a valid address but not in checksummed form.
    NotChecksummed {
        /// Directory path.
        path: PathBuf,
        /// Directory name.
        name: String,
        /// The checksummed rendering the name should have.
        expected: String,
    },

    /// Nobody owns the entry.
    NoCodeowners {
        /// Entry path.
        path: PathBuf,
    },

    /// A directory below the data root could not be listed.
    UnreadableDirectory {
        /// Directory path.
        path: PathBuf,
        /// IO error.
        reason: String,
    },
}

impl Diagnostic {
    /// The entry the diagnostic refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::InvalidJson { path, .. }
            | Self::MissingSchemaField { path }
            | Self::UnknownSchema { path, .. }
            | Self::SchemaViolations { path, .. }
            | Self::InvalidAddress { path, .. }
            | Self::NotChecksummed { path, .. }
            | Self::NoCodeowners { path }
            | Self::UnreadableDirectory { path, .. } => path,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson { path, .. } => {
                write!(f, "Error: \"{}\" is not a valid JSON file.", path.display())
            }
            Self::MissingSchemaField { path } => write!(
                f,
                "Error: \"{}\" is not a valid JSON file (\"{SCHEMA_FIELD}\" is not present).",
                path.display()
            ),
            Self::UnknownSchema { path, schema } => write!(
                f,
                "Error: \"{}\" is not a valid JSON file (\"{schema}\" is not a valid schema).",
                path.display()
            ),
            Self::SchemaViolations {
                path,
                schema,
                violations,
            } => {
                write!(
                    f,
                    "Error: \"{}\" does not follow \"{schema}\" schema:",
                    path.display()
                )?;
                for violation in violations {
                    write!(f, "\n - {violation}")?;
                }
                Ok(())
            }
            Self::InvalidAddress { path, name, .. } => write!(
                f,
                "Error: \"{name}\" is not a valid address. (\"{}\")",
                path.display()
            ),
            Self::NotChecksummed { path, name, .. } => write!(
                f,
                "Error: \"{name}\" is not checksummed. (\"{}\")",
                path.display()
            ),
            Self::NoCodeowners { path } => {
                write!(f, "Error: \"{}\" has no codeowners.", path.display())
            }
            Self::UnreadableDirectory { path, reason } => write!(
                f,
                "Error: \"{}\" could not be read ({reason}).",
                path.display()
            ),
        }
    }
}

/// Aggregate result of validating a directory tree.
///
/// `valid` is the logical AND over every entry of the tree and is false
/// exactly when at least one diagnostic was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    valid: bool,
    documents: usize,
    directories: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            valid: true,
            documents: 0,
            directories: 0,
            diagnostics: Vec::new(),
        }
    }
}

impl ValidationReport {
    /// True if the whole tree passed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Diagnostics in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of JSON documents inspected.
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Number of directories traversed, including the root.
    pub fn directories(&self) -> usize {
        self.directories
    }

    /// Console lines, one per failure and one per schema violation.
    pub fn lines(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .flat_map(|d| {
                d.to_string()
                    .lines()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        self.valid = false;
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn count_document(&mut self) {
        self.documents += 1;
    }

    pub(crate) fn count_directory(&mut self) {
        self.directories += 1;
    }

    /// Fold a subtree's report into this one.
    pub(crate) fn absorb(&mut self, child: ValidationReport) {
        self.valid = self.valid && child.valid;
        self.documents += child.documents;
        self.directories += child.directories;
        self.diagnostics.extend(child.diagnostics);
    }
}
