//! Catalog object names are case-insensitive.

use std::borrow::Cow;

/// Returns the key under which a database or table name is registered.
pub fn canonical(name: &str) -> Cow<'_, str> {
    if name.chars().any(|c| c.to_lowercase().ne([c])) {
        Cow::Owned(name.to_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// Compares two catalog names ignoring case.
pub fn eq(a: &str, b: &str) -> bool {
    canonical(a) == canonical(b)
}
