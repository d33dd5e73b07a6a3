//! Short code syntax.

use regex::Regex;
use std::sync::LazyLock;

/// Codes and aliases are 1-64 characters of ASCII letters, digits, `_` or `-`.
static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("static code pattern is valid")
});

/// Returns true if `code` could name a link.
///
/// Anything else is answered with 404 without touching the store.
pub fn is_valid_code(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}
