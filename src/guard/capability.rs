//! Capability predicate for version-gated calls

use crate::scope::Scope;
use crate::version::Version;
use std::cmp::Ordering;

/// Whether `current` satisfies `min`. An unset version satisfies nothing.
///
/// Both [`is_supported`] and the version step of the guard chain go
/// through this function.
pub fn version_satisfies(current: Option<&Version>, min: &Version) -> bool {
    match current {
        Some(current) => current.cmp(min) != Ordering::Less,
        None => false,
    }
}

/// Whether a call requiring `min_version` is usable under the global scope.
///
/// Ignores environment and mount state; use it to branch before calling a
/// version-gated operation.
pub fn is_supported(min_version: &Version) -> bool {
    Scope::global().is_supported(min_version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_unset_never_satisfies() {
        assert!(!version_satisfies(None, &v("0.0")));
        assert!(!version_satisfies(None, &v("6.1")));
    }

    #[test]
    fn test_satisfies_numeric() {
        let min = v("6.1");
        assert!(!version_satisfies(Some(&v("6.0")), &min));
        assert!(version_satisfies(Some(&v("6.1")), &min));
        assert!(version_satisfies(Some(&v("6.1.0")), &min));
        assert!(version_satisfies(Some(&v("10")), &min));
        assert!(!version_satisfies(Some(&v("5.99")), &min));
    }
}
