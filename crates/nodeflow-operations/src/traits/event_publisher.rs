use crate::Result;
use crate::types::NodeEvent;

/// Publishes node change notifications to downstream consumers.
pub trait EventPublisher: Send + Sync {
    /// Publishes an event and returns the id the broker assigned to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be encoded or delivered.
    fn publish(&self, event: &NodeEvent) -> Result<String>;
}
