mod event_publisher;
mod faults;
mod keyword_index;
mod node_repository;

pub use event_publisher::InMemoryEventPublisher;
pub use faults::FaultMode;
pub use keyword_index::InMemoryKeywordIndex;
pub use node_repository::InMemoryNodeRepository;
