//! # datacheck-core — Foundational Types for datacheck
//!
//! Leaf crate of the datacheck workspace. Defines the primitives that the
//! schema registry, the ownership resolver, and the tree validator share.
//!
//! ## Key Design Principles
//!
//! 1. **`Address` newtype.** A checksummed address can only be obtained
//!    through [`AddressChecker::checksum`], so holding an `Address` means the
//!    string is already in canonical EIP-55 form.
//!
//! 2. **Narrow collaborator traits.** Address checking sits behind the
//!    [`AddressChecker`] trait so the tree validator and the schema `address`
//!    format rule can be exercised with any implementation.
//!
//! 3. **Layout constants in one place.** The reserved schema field, the
//!    index file name, the hidden-entry prefix, the address directory prefix,
//!    and the recognised data extension live in [`layout`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `datacheck-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod address;
pub mod error;
pub mod layout;

pub use address::{Address, AddressChecker, Eip55Checker};
pub use error::AddressError;
