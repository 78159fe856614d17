use std::sync::{Mutex, PoisonError};

use tracing::info;

use super::faults::{FaultMode, Faults};
use crate::traits::EventPublisher;
use crate::types::NodeEvent;
use crate::{OperationError, Result};

const PROVIDER: &str = "event publisher";

/// Publisher that keeps encoded events in memory, in publish order.
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    published: Mutex<Vec<(String, String)>>,
    faults: Faults,
}

impl InMemoryEventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_faults(mode: FaultMode) -> Self {
        Self {
            published: Mutex::default(),
            faults: Faults::new(mode),
        }
    }

    #[must_use]
    pub fn calls(&self) -> u32 {
        self.faults.calls()
    }

    /// Published `(event id, JSON body)` pairs.
    #[must_use]
    pub fn published(&self) -> Vec<(String, String)> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventPublisher for InMemoryEventPublisher {
    fn publish(&self, event: &NodeEvent) -> Result<String> {
        self.faults.check(PROVIDER)?;
        let body = serde_json::to_string(event).map_err(|source| OperationError::EventEncode {
            node_id: event.node_id.clone(),
            source,
        })?;

        let mut published = self.published.lock().unwrap_or_else(PoisonError::into_inner);
        let event_id = format!("evt-{}", published.len() + 1);
        info!(event_id = %event_id, node_id = %event.node_id, kind = ?event.kind, "published event");
        published.push((event_id.clone(), body));
        Ok(event_id)
    }
}
