//! # Checksummed Addresses
//!
//! EIP-55 mixed-case checksum encoding for 20-byte hex addresses.
//!
//! The checksum is computed over the Keccak-256 hash of the lowercase hex
//! digits: the letter at position `i` is uppercased iff nibble `i` of the
//! hash is `>= 8`.
//!
//! ## Acceptance Rules
//!
//! - `^(0x)?[0-9a-fA-F]{40}$`, anything else is malformed.
//! - All-lowercase and all-uppercase inputs carry no checksum and are
//!   accepted.
//! - Mixed-case inputs must match the checksum exactly.

use sha3::{Digest, Keccak256};

use crate::error::AddressError;

const HEX_DIGITS: usize = 40;

/// An address in canonical `0x`-prefixed EIP-55 checksummed form.
///
/// Only constructible through an [`AddressChecker`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// The canonical checksummed string, including the `0x` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Decides whether a string is an address and produces its canonical form.
pub trait AddressChecker: Send + Sync {
    /// Canonicalise `input`, failing if it is malformed or carries a wrong
    /// mixed-case checksum.
    fn checksum(&self, input: &str) -> Result<Address, AddressError>;

    /// Returns true if `input` is accepted by [`checksum`](Self::checksum).
    fn is_address(&self, input: &str) -> bool {
        self.checksum(input).is_ok()
    }
}

/// [`AddressChecker`] implementing EIP-55.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eip55Checker;

impl AddressChecker for Eip55Checker {
    fn checksum(&self, input: &str) -> Result<Address, AddressError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        if digits.len() != HEX_DIGITS || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::Malformed(input.to_string()));
        }

        let canonical = format!("0x{}", eip55_digits(digits));

        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        if has_upper && has_lower && canonical[2..] != *digits {
            return Err(AddressError::BadChecksum {
                input: input.to_string(),
                expected: canonical,
            });
        }

        Ok(Address(canonical))
    }
}

/// Apply the EIP-55 casing to 40 hex digits (no prefix).
fn eip55_digits(digits: &str) -> String {
    let lower = digits.to_ascii_lowercase();
    let hash = Keccak256::digest(lower.as_bytes());

    lower
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}
