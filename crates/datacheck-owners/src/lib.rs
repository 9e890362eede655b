//! # datacheck-owners — Code Ownership Resolution
//!
//! Answers "who owns this path?" for the tree validator. The production
//! implementation reads a GitHub/GitLab style `CODEOWNERS` file; the
//! [`OwnershipResolver`] trait keeps the validator independent of it.
//!
//! ## Rule Semantics
//!
//! - Patterns follow gitignore matching, relative to the repository root.
//! - The last matching rule wins.
//! - A rule with no owners un-assigns the paths it matches.

pub mod codeowners;

use std::path::Path;

pub use codeowners::{CodeOwners, CodeownersError, CODEOWNERS_LOCATIONS};

/// Resolves the owners of a file-system path.
pub trait OwnershipResolver: Send + Sync {
    /// Owners responsible for `path`. Empty if nobody owns it.
    fn owners_of(&self, path: &Path) -> &[String];
}
