//! # datacheck-cli — Command-Line Interface
//!
//! Provides the `datacheck` binary. Run from the root of a data repository:
//!
//! ```bash
//! datacheck                       # schema/ + data/ + CODEOWNERS
//! datacheck --format json         # machine-readable report
//! datacheck --data-dir data/tokens -vv
//! ```
//!
//! Exit status is 0 when every file matches its schema, every address
//! directory is checksummed, and every entry has an owner; 1 otherwise or
//! on any fatal error.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the run logic in [`verify`].
//! - Validation logic lives in the library crates; this crate only wires
//!   collaborators together and renders the report.

pub mod verify;

use std::path::{Path, PathBuf};

/// Resolve a path that may be relative to the repository root.
///
/// Absolute paths are returned as-is. Relative paths are joined onto
/// `repo_root`, except when the root is `.` so printed paths stay short.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() || repo_root == Path::new(".") {
        return path.to_path_buf();
    }
    repo_root.join(path)
}
