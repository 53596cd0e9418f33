//! Blob name validation.
//!
//! Valid blob names:
//! - Must be non-empty
//! - Must consist only of ASCII letters, digits, `.`, `_` and `-`
//! - Must not start with `.` (hidden files and `..` traversal)
//! - Must not end with `.tmp` (reserved for in-flight filesystem writes)

use crate::error::{StoreError, StoreResult};

/// Suffix used by [`FsBlobStore`](crate::FsBlobStore) for staged writes.
pub(crate) const TEMP_SUFFIX: &str = ".tmp";

/// Validate a blob name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use objdb_store::names::validate_blob_name;
///
/// assert!(validate_blob_name("42.dat").is_ok());
/// assert!(validate_blob_name("id.txt").is_ok());
/// assert!(validate_blob_name("../etc").is_err());
/// ```
pub fn validate_blob_name(name: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(invalid(&format!("contains forbidden character: {ch:?}")));
    }
    if name.starts_with('.') {
        return Err(invalid("must not start with '.'"));
    }
    if name.ends_with(TEMP_SUFFIX) {
        return Err(invalid("'.tmp' suffix is reserved"));
    }
    Ok(())
}
