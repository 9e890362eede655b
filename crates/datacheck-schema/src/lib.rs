//! # datacheck-schema — Schema Registry
//!
//! Loads every JSON Schema in a schema directory, compiles each one with
//! the `jsonschema` crate, and indexes the compiled predicates by schema
//! identifier (the file name with its extension removed).
//!
//! ## Custom Formats
//!
//! Schemas may use `"format": "address"`; a string satisfies it iff the
//! configured [`AddressChecker`](datacheck_core::AddressChecker) accepts it.
//! Standard formats (`uri`, `email`, `date-time`, ...) are asserted too.
//!
//! ## Crate Policy
//!
//! - A schema that fails to parse or compile fails the whole load. There is
//!   no partially populated registry.
//! - Lookup of an unknown identifier is not an error; callers report it.

pub mod registry;

pub use registry::{SchemaDocument, SchemaLoadError, SchemaRegistry, Violation};
