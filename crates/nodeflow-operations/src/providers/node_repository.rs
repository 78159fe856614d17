use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::faults::{FaultMode, Faults};
use crate::traits::NodeRepository;
use crate::types::Node;
use crate::{OperationError, Result};

const PROVIDER: &str = "node repository";

#[derive(Debug, Default)]
pub struct InMemoryNodeRepository {
    nodes: Mutex<HashMap<String, Node>>,
    faults: Faults,
}

impl InMemoryNodeRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_faults(mode: FaultMode) -> Self {
        Self {
            nodes: Mutex::default(),
            faults: Faults::new(mode),
        }
    }

    /// Number of calls made to this repository, failed ones included.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.faults.calls()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NodeRepository for InMemoryNodeRepository {
    fn save_node(&self, node: &Node) -> Result<()> {
        self.faults.check(PROVIDER)?;
        let mut nodes = self.nodes.lock().unwrap_or_else(PoisonError::into_inner);
        if nodes.contains_key(&node.id) {
            return Err(OperationError::NodeAlreadyExists(node.id.clone()));
        }
        debug!(node_id = %node.id, "stored node");
        nodes.insert(node.id.clone(), node.clone());
        Ok(())
    }

    fn delete_node(&self, node_id: &str) -> Result<()> {
        self.faults.check(PROVIDER)?;
        let removed = self
            .nodes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(node_id);
        debug!(node_id, existed = removed.is_some(), "deleted node");
        Ok(())
    }

    fn get_node(&self, node_id: &str) -> Result<Option<Node>> {
        self.faults.check(PROVIDER)?;
        Ok(self
            .nodes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(node_id)
            .cloned())
    }
}
