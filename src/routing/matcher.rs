//! Route matching logic.
//!
//! Matching compares the raw request target with the route pattern. Both kinds
//! are case-sensitive and do not strip query strings.

/// How a route pattern is compared against a request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// The target must equal the pattern.
    Exact,
    /// The target must start with the pattern.
    Prefix,
}

impl Match {
    /// Returns true if `target` satisfies `pattern` under this match kind.
    pub fn matches(&self, target: &str, pattern: &str) -> bool {
        match self {
            Match::Exact => target == pattern,
            Match::Prefix => target.starts_with(pattern),
        }
    }
}
