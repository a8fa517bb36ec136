//! The managed configuration as currently published by the OS.

use std::collections::{BTreeMap, HashMap};

use crate::error::{CapabilityError, CapabilityResult};
use crate::platform::ConfigStore;

/// Snapshot of the managed configuration.
///
/// Keys are kept ordered so that everything derived from a snapshot is
/// deterministic. Snapshots are never cached; every query reads a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictionSet {
    entries: BTreeMap<String, String>,
}

impl RestrictionSet {
    /// Reads the configuration, degrading any failure to an empty set.
    ///
    /// This is the single read path shared by inference, diagnostics and the
    /// change notifier.
    #[must_use]
    pub fn read(store: &dyn ConfigStore) -> Self {
        match Self::try_read(store) {
            Ok(set) => set,
            Err(err) if err.is_unavailable() => Self::default(),
            Err(err) => {
                log::warn!("failed to read managed configuration: {err}");
                Self::default()
            }
        }
    }

    /// Reads the configuration. An unavailable store yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the read itself fails.
    pub fn try_read(store: &dyn ConfigStore) -> CapabilityResult<Self> {
        if !store.is_available() {
            return Err(CapabilityError::Unavailable("config store".to_string()));
        }
        store.read().map(Self::from)
    }

    /// Whether no key is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The flat map handed across the foreign boundary.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl From<HashMap<String, String>> for RestrictionSet {
    fn from(map: HashMap<String, String>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RestrictionSet {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::MemoryConfigStore;

    #[test]
    fn test_unavailable_store_reads_empty() {
        let store = MemoryConfigStore::unavailable();
        store.set_configuration([("AccountName", "jane")]);
        assert!(RestrictionSet::read(&store).is_empty());
        assert!(RestrictionSet::try_read(&store).unwrap_err().is_unavailable());
    }

    #[test]
    fn test_failing_store_degrades_to_empty() {
        let store = MemoryConfigStore::new();
        store.set_configuration([("AccountName", "jane")]);
        store.fail_reads("binder died");
        assert!(RestrictionSet::read(&store).is_empty());
        assert!(matches!(
            RestrictionSet::try_read(&store),
            Err(CapabilityError::Platform(_))
        ));
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let set = RestrictionSet::from([("b", "2"), ("a", "1"), ("c", "3")]);
        let keys: Vec<_> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.get("b"), Some("2"));
        assert_eq!(set.to_map().len(), 3);
    }
}
