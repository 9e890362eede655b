//! # Data Tree Layout
//!
//! Reserved names of the data repository layout.

/// Top-level document field naming the schema the document conforms to.
pub const SCHEMA_FIELD: &str = "$schema";

/// Directory index file, excluded from validation and ownership checks.
pub const INDEX_FILE_NAME: &str = "index.json";

/// Entries whose name starts with this prefix are hidden and skipped.
pub const HIDDEN_PREFIX: &str = ".";

/// Directories whose name starts with this prefix must be checksummed addresses.
pub const ADDRESS_PREFIX: &str = "0x";

/// The only file extension treated as a data document (without the dot).
pub const DATA_EXTENSION: &str = "json";

/// Returns true if an entry with this name is excluded from traversal.
pub fn is_skipped_name(name: &str) -> bool {
    name.starts_with(HIDDEN_PREFIX) || name == INDEX_FILE_NAME
}

/// Returns true if a directory with this name must be validated as an address.
pub fn is_address_name(name: &str) -> bool {
    name.starts_with(ADDRESS_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_and_index_entries_are_skipped() {
        assert!(is_skipped_name(".git"));
        assert!(is_skipped_name(".DS_Store"));
        assert!(is_skipped_name("index.json"));
        assert!(!is_skipped_name("index.json.bak"));
        assert!(!is_skipped_name("Index.json"));
        assert!(!is_skipped_name("token.json"));
    }

    #[test]
    fn address_prefix_is_case_sensitive() {
        assert!(is_address_name("0xabc"));
        assert!(is_address_name("0x"));
        assert!(!is_address_name("0Xabc"));
        assert!(!is_address_name("tokens"));
    }
}
