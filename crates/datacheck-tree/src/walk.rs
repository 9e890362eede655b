//! # Tree Walk
//!
//! Depth-first, post-order traversal of a data directory.
//!
//! For every entry (in the order the file system lists them):
//!
//! 1. Hidden entries and `index.json` are skipped entirely.
//! 2. `*.json` regular files are parsed, their `$schema` field resolved in
//!    the registry, and validated against it.
//! 3. Directories named `0x...` must be checksummed addresses; every
//!    directory is then recursed into.
//! 4. Anything else gets no content checks.
//! 5. Every non-skipped entry must have at least one owner.
//!
//! Nothing short-circuits: every entry is visited and every failure is
//! recorded. Entry types come from `DirEntry::file_type`, so symlinks are
//! never followed and land in [`EntryKind::Other`].

use std::fs::DirEntry;
use std::path::{Path, PathBuf};

use datacheck_core::layout::{self, SCHEMA_FIELD};
use datacheck_core::AddressChecker;
use datacheck_owners::OwnershipResolver;
use datacheck_schema::SchemaRegistry;
use serde_json::Value;
use thiserror::Error;

use crate::diagnostic::{Diagnostic, ValidationReport};

/// Fatal traversal error. Only the root data directory can produce one.
#[derive(Error, Debug)]
pub enum WalkError {
    /// The root data directory could not be listed.
    #[error("data directory \"{}\" cannot be read: {source}", path.display())]
    UnreadableRoot {
        /// Data directory path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Classification of a directory entry, decided once per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file with the data extension.
    Document,
    /// Directory (not a symlink to one).
    Directory,
    /// Anything else: other files, symlinks, sockets.
    Other,
}

impl EntryKind {
    /// Classify a path given its (non-followed) file type.
    pub fn classify(path: &Path, file_type: std::fs::FileType) -> Self {
        if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == layout::DATA_EXTENSION)
        {
            Self::Document
        } else {
            Self::Other
        }
    }
}

/// Result of resolving a document's schema field.
enum SchemaField<'v> {
    Missing,
    Named(&'v str),
    NotAString(&'v Value),
}

fn schema_field(document: &Value) -> SchemaField<'_> {
    match document.get(SCHEMA_FIELD) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => SchemaField::Missing,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => SchemaField::Missing,
        Some(Value::String(s)) if s.is_empty() => SchemaField::Missing,
        Some(Value::String(s)) => SchemaField::Named(s.as_str()),
        Some(other) => SchemaField::NotAString(other),
    }
}

/// Validates a data tree against a schema registry, address naming rules,
/// and ownership.
pub struct TreeValidator<'a> {
    registry: &'a SchemaRegistry,
    addresses: &'a dyn AddressChecker,
    owners: &'a dyn OwnershipResolver,
}

impl<'a> TreeValidator<'a> {
    /// Bind the collaborators used for every entry.
    pub fn new(
        registry: &'a SchemaRegistry,
        addresses: &'a dyn AddressChecker,
        owners: &'a dyn OwnershipResolver,
    ) -> Self {
        Self {
            registry,
            addresses,
            owners,
        }
    }

    /// Validate every entry below `root`.
    ///
    /// The root itself is not ownership- or name-checked; its children are.
    ///
    /// # Errors
    ///
    /// [`WalkError::UnreadableRoot`] if `root` cannot be listed. Failures
    /// below the root are diagnostics in the returned report.
    pub fn validate(&self, root: &Path) -> Result<ValidationReport, WalkError> {
        let entries = std::fs::read_dir(root).map_err(|source| WalkError::UnreadableRoot {
            path: root.to_path_buf(),
            source,
        })?;

        let report = self.validate_entries(root, entries);
        tracing::info!(
            root = %root.display(),
            documents = report.documents(),
            directories = report.directories(),
            diagnostics = report.diagnostics().len(),
            "validated data tree"
        );
        Ok(report)
    }

    fn validate_dir(&self, dir: &Path) -> ValidationReport {
        match std::fs::read_dir(dir) {
            Ok(entries) => self.validate_entries(dir, entries),
            Err(e) => {
                let mut report = ValidationReport::default();
                report.record(Diagnostic::UnreadableDirectory {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                });
                report
            }
        }
    }

    fn validate_entries(&self, dir: &Path, entries: std::fs::ReadDir) -> ValidationReport {
        tracing::debug!(dir = %dir.display(), "entering directory");
        let mut report = ValidationReport::default();
        report.count_directory();

        for entry in entries {
            match entry {
                Ok(entry) => {
                    let child = self.validate_entry(&entry);
                    report.absorb(child);
                }
                Err(e) => report.record(Diagnostic::UnreadableDirectory {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                }),
            }
        }
        report
    }

    fn validate_entry(&self, entry: &DirEntry) -> ValidationReport {
        let mut report = ValidationReport::default();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if layout::is_skipped_name(&name) {
            return report;
        }

        let path = entry.path();
        let kind = match entry.file_type() {
            Ok(file_type) => EntryKind::classify(&path, file_type),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot stat entry");
                EntryKind::Other
            }
        };

        match kind {
            EntryKind::Document => {
                report.count_document();
                if let Some(diagnostic) = self.check_document(&path) {
                    report.record(diagnostic);
                }
            }
            EntryKind::Directory => {
                if layout::is_address_name(&name) {
                    if let Some(diagnostic) = self.check_address(&path, &name) {
                        report.record(diagnostic);
                    }
                }
                report.absorb(self.validate_dir(&path));
            }
            EntryKind::Other => {}
        }

        if self.owners.owners_of(&path).is_empty() {
            report.record(Diagnostic::NoCodeowners { path });
        }
        report
    }

    fn check_document(&self, path: &Path) -> Option<Diagnostic> {
        let document = match read_json(path) {
            Ok(document) => document,
            Err(reason) => {
                tracing::debug!(path = %path.display(), %reason, "invalid JSON document");
                return Some(Diagnostic::InvalidJson {
                    path: path.to_path_buf(),
                    reason,
                });
            }
        };

        let identifier = match schema_field(&document) {
            SchemaField::Named(identifier) => identifier,
            SchemaField::Missing => {
                return Some(Diagnostic::MissingSchemaField {
                    path: path.to_path_buf(),
                })
            }
            SchemaField::NotAString(value) => {
                return Some(Diagnostic::UnknownSchema {
                    path: path.to_path_buf(),
                    schema: value.to_string(),
                })
            }
        };

        let Some(schema) = self.registry.lookup(identifier) else {
            return Some(Diagnostic::UnknownSchema {
                path: path.to_path_buf(),
                schema: identifier.to_string(),
            });
        };

        match schema.validate(&document) {
            Ok(()) => None,
            Err(violations) => Some(Diagnostic::SchemaViolations {
                path: path.to_path_buf(),
                schema: identifier.to_string(),
                violations,
            }),
        }
    }

    fn check_address(&self, path: &Path, name: &str) -> Option<Diagnostic> {
        match self.addresses.checksum(name) {
            Ok(address) if address.as_str() == name => None,
            Ok(address) => Some(Diagnostic::NotChecksummed {
                path: path.to_path_buf(),
                name: name.to_string(),
                expected: address.to_string(),
            }),
            Err(e) => Some(Diagnostic::InvalidAddress {
                path: path.to_path_buf(),
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn read_json(path: &Path) -> Result<Value, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;
    serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}"))
}
