//! Named distribution table with case-insensitive lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::dist::Distribution;

/// Map from parameter name to distribution.
///
/// Keys are case-folded on insert and on lookup, so `Gamma`, `gamma` and
/// `GAMMA` all refer to the same entry.
#[derive(Debug, Clone, Default)]
pub struct DistributionTable {
    entries: BTreeMap<String, Arc<Distribution>>,
}

impl DistributionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the distribution for `name`, returning the old one.
    pub fn insert(
        &mut self,
        name: &str,
        dist: impl Into<Arc<Distribution>>,
    ) -> Option<Arc<Distribution>> {
        self.entries.insert(name.to_lowercase(), dist.into())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Distribution>> {
        self.entries.get(&name.to_lowercase()).cloned()
    }

    /// Iterate `(case-folded name, distribution)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Distribution>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Distribution)> for DistributionTable {
    fn from_iter<I: IntoIterator<Item = (S, Distribution)>>(iter: I) -> Self {
        let mut table = DistributionTable::new();
        for (name, dist) in iter {
            table.insert(name.as_ref(), dist);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let mut table = DistributionTable::new();
        table.insert("GammaL", Distribution::constant(1.0));
        assert!(table.lookup("gammal").is_some());
        assert!(table.lookup("GAMMAL").is_some());
        assert!(table.lookup("gammar").is_none());
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut table = DistributionTable::new();
        assert!(table.insert("v", Distribution::constant(1.0)).is_none());
        assert!(table.insert("V", Distribution::constant(2.0)).is_some());
        assert_eq!(table.len(), 1);
        match table.lookup("v").as_deref() {
            Some(Distribution::Constant { value }) => assert_eq!(*value, 2.0),
            other => panic!("unexpected entry: {other:?}"),
        }
    }
}
