//! Table from probe kind name to its `Configurer` prototype.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::{Configurer, HttpConf, TcpConf};
use crate::error::RegistryError;

/// Builds the prototype for one probe kind.
pub type ConfigurerFactory = fn() -> Box<dyn Configurer>;

/// Probe kinds shipped with the observer.
pub const BUILTIN_PROBES: &[(&str, ConfigurerFactory)] = &[
    (HttpConf::KIND, HttpConf::prototype),
    (TcpConf::KIND, TcpConf::prototype),
];

/// Registry of probe kinds.
///
/// Populated once at start-up and read-only afterwards. Kind names are exact
/// strings; callers normalize before registering or looking up.
#[derive(Default)]
pub struct ProbeRegistry {
    kinds: HashMap<String, Box<dyn Configurer>>,
}

impl ProbeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in probe kinds.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_factories(BUILTIN_PROBES)
    }

    /// Build a registry from an explicit list of kind factories.
    pub fn from_factories(factories: &[(&str, ConfigurerFactory)]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (kind, factory) in factories {
            registry.register(kind, factory())?;
        }
        Ok(registry)
    }

    /// Add a prototype under `kind`. A kind can only be registered once.
    pub fn register(
        &mut self,
        kind: &str,
        prototype: Box<dyn Configurer>,
    ) -> Result<(), RegistryError> {
        if self.kinds.contains_key(kind) {
            return Err(RegistryError::DuplicateKind(kind.to_string()));
        }
        debug!(%kind, "registered probe kind");
        self.kinds.insert(kind.to_string(), prototype);
        Ok(())
    }

    /// Look up the prototype registered under `kind`.
    pub fn lookup(&self, kind: &str) -> Option<&dyn Configurer> {
        self.kinds.get(kind).map(|c| c.as_ref())
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeRegistry").field("kinds", &self.kinds()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds() {
        let registry = ProbeRegistry::builtin().unwrap();
        assert_eq!(registry.kinds(), vec!["http", "tcp"]);
        assert!(registry.lookup("http").is_some());
        assert!(registry.lookup("tcp").is_some());
    }

    #[test]
    fn test_lookup_unknown_kind() {
        let registry = ProbeRegistry::builtin().unwrap();
        assert!(registry.lookup("dns").is_none());
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = ProbeRegistry::builtin().unwrap();
        assert!(registry.lookup("HTTP").is_none());
        assert!(registry.lookup(" http").is_none());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = ProbeRegistry::new();
        registry.register("http", Box::new(HttpConf::default())).unwrap();

        let err = registry.register("http", Box::new(TcpConf::default())).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKind(ref kind) if kind == "http"));
        assert_eq!(registry.kinds(), vec!["http"]);
    }

    #[test]
    fn test_duplicate_factory_list() {
        let factories: &[(&str, ConfigurerFactory)] = &[
            ("http", HttpConf::prototype),
            ("http", HttpConf::prototype),
        ];
        assert!(ProbeRegistry::from_factories(factories).is_err());
    }
}
