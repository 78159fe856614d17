use std::sync::Arc;

use crate::traits::{EventPublisher, KeywordIndex, NodeRepository};

/// Handles every node workflow step needs, owned by the composition root.
pub struct NodeSagaContext<R, K, P> {
    repository: Arc<R>,
    keyword_index: Arc<K>,
    publisher: Arc<P>,
}

impl<R, K, P> Clone for NodeSagaContext<R, K, P> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            keyword_index: Arc::clone(&self.keyword_index),
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<R, K, P> NodeSagaContext<R, K, P>
where
    R: NodeRepository,
    K: KeywordIndex,
    P: EventPublisher,
{
    pub fn new(repository: Arc<R>, keyword_index: Arc<K>, publisher: Arc<P>) -> Self {
        Self {
            repository,
            keyword_index,
            publisher,
        }
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    #[must_use]
    pub fn keyword_index(&self) -> &K {
        &self.keyword_index
    }

    #[must_use]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}
