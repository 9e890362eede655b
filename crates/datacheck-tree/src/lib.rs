//! # datacheck-tree — Recursive Data Tree Validation
//!
//! Walks a data directory, classifies each entry, dispatches JSON documents
//! to their declared schema, checks address-named directories and
//! ownership, and folds the per-entry results into one
//! [`ValidationReport`].
//!
//! ## Failure Classes
//!
//! - **Fatal**: the root data directory cannot be listed ([`WalkError`]).
//! - **Accumulative**: everything else. Recorded as a [`Diagnostic`] and
//!   traversal continues, so one run reports every defect.
//!
//! The validator never writes to the console. Rendering the report is the
//! caller's job.

pub mod diagnostic;
pub mod walk;

pub use diagnostic::{Diagnostic, ValidationReport};
pub use walk::{EntryKind, TreeValidator, WalkError};
