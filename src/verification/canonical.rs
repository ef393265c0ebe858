//! Lookup key normalization.

/// Map a raw value to the key it is stored and looked up under.
///
/// Leading and trailing Unicode whitespace is trimmed and the remainder is
/// lower-cased with the full Unicode mapping, so `" ÅNGSTRÖM\n"` and
/// `"ångström"` share a key.
pub fn canonical(value: &str) -> String {
    value.trim().to_lowercase()
}
