//! Once-only controller initialization.
//!
//! Markup may be re-hydrated after a client-side page transition, so setup
//! runs many times. [`InitRegistry`] records which controllers have already
//! attached their listeners; only the first claim for a name succeeds.

use std::collections::HashSet;

/// Set of controller names whose listeners are attached.
#[derive(Debug, Default)]
pub struct InitRegistry {
    attached: HashSet<&'static str>,
}

impl InitRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-set: returns `true` only the first time `name` is claimed.
    pub fn claim(&mut self, name: &'static str) -> bool {
        self.attached.insert(name)
    }

    /// Whether `name` has been claimed.
    pub fn is_attached(&self, name: &str) -> bool {
        self.attached.contains(name)
    }

    /// Number of attached controllers.
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    /// Whether nothing has been claimed yet.
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_claim_wins() {
        let mut reg = InitRegistry::new();
        assert!(reg.claim("dialog"));
        assert!(!reg.claim("dialog"));
        assert!(reg.is_attached("dialog"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn names_are_independent() {
        let mut reg = InitRegistry::default();
        assert!(reg.is_empty());
        assert!(reg.claim("dropdown"));
        assert!(reg.claim("select"));
        assert!(!reg.is_attached("tabs"));
    }
}
