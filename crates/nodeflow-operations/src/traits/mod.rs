mod event_publisher;
mod keyword_index;
mod node_repository;

pub use event_publisher::EventPublisher;
pub use keyword_index::KeywordIndex;
pub use node_repository::NodeRepository;
