//! # Error Types
//!
//! Errors shared across the datacheck workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Error produced when a string cannot be turned into a checksummed address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The string is not 40 hex digits with an optional `0x` prefix.
    #[error("malformed address '{0}': expected 40 hex digits with optional 0x prefix")]
    Malformed(String),

    /// The string uses mixed case that disagrees with its EIP-55 checksum.
    #[error("bad address checksum '{input}': expected '{expected}'")]
    BadChecksum {
        /// The string as supplied.
        input: String,
        /// The canonical checksummed rendering.
        expected: String,
    },
}
