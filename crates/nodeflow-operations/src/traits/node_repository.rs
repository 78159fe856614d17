use crate::Result;
use crate::types::Node;

/// Durable storage for nodes.
pub trait NodeRepository: Send + Sync {
    /// Stores a new node.
    ///
    /// # Errors
    ///
    /// Returns `NodeAlreadyExists` if a node with the same id is stored, or an
    /// error if the storage backend cannot be reached.
    fn save_node(&self, node: &Node) -> Result<()>;

    /// Removes a node. Removing a node that does not exist is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be reached.
    fn delete_node(&self, node_id: &str) -> Result<()>;

    /// Fetches a node by id. Returns `Ok(None)` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be reached.
    fn get_node(&self, node_id: &str) -> Result<Option<Node>>;
}
