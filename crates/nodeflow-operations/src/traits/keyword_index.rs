use crate::Result;

/// Search index mapping keywords to nodes.
pub trait KeywordIndex: Send + Sync {
    /// Associates `keywords` with `node_id`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be updated.
    fn index_keywords(&self, node_id: &str, keywords: &[String]) -> Result<()>;

    /// Removes every keyword associated with `node_id` and returns them.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be updated.
    fn remove_keywords(&self, node_id: &str) -> Result<Vec<String>>;
}
