use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::faults::{FaultMode, Faults};
use crate::Result;
use crate::traits::KeywordIndex;

const PROVIDER: &str = "keyword index";

/// Keyword index keeping both directions of the mapping.
#[derive(Debug, Default)]
pub struct InMemoryKeywordIndex {
    by_node: Mutex<BTreeMap<String, Vec<String>>>,
    faults: Faults,
}

impl InMemoryKeywordIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_faults(mode: FaultMode) -> Self {
        Self {
            by_node: Mutex::default(),
            faults: Faults::new(mode),
        }
    }

    #[must_use]
    pub fn calls(&self) -> u32 {
        self.faults.calls()
    }

    /// Ids of nodes tagged with `keyword`, in id order.
    #[must_use]
    pub fn nodes_for(&self, keyword: &str) -> Vec<String> {
        self.by_node
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| k == keyword))
            .map(|(node_id, _)| node_id.clone())
            .collect()
    }

    #[must_use]
    pub fn keywords_for(&self, node_id: &str) -> Vec<String> {
        self.by_node
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(node_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl KeywordIndex for InMemoryKeywordIndex {
    fn index_keywords(&self, node_id: &str, keywords: &[String]) -> Result<()> {
        self.faults.check(PROVIDER)?;
        let unique: BTreeSet<_> = keywords.iter().cloned().collect();
        debug!(node_id, count = unique.len(), "indexed keywords");
        self.by_node
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node_id.to_string(), unique.into_iter().collect());
        Ok(())
    }

    fn remove_keywords(&self, node_id: &str) -> Result<Vec<String>> {
        self.faults.check(PROVIDER)?;
        let removed = self
            .by_node
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(node_id)
            .unwrap_or_default();
        debug!(node_id, count = removed.len(), "removed keywords");
        Ok(removed)
    }
}
