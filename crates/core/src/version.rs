//! Per-key versions for optimistic concurrency at the store boundary.

/// Version of a world-state key. `0` means the key has never been written.
pub type KeyVersion = u64;

/// Optimistic concurrency expectation for a key read inside a unit of work.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (blind write).
    Any,
    /// Require the key to still be at an exact version at commit time.
    Exact(KeyVersion),
}

impl ExpectedVersion {
    pub fn matches(self, actual: KeyVersion) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_only_same_version() {
        assert!(ExpectedVersion::Exact(0).matches(0));
        assert!(!ExpectedVersion::Exact(0).matches(1));
        assert!(ExpectedVersion::Any.matches(42));
    }
}
