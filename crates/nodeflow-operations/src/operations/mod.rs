mod context;
mod create_node;
mod delete_node;
mod outcome;
mod settings;

pub use context::NodeSagaContext;
pub use create_node::{CREATE_NODE_SAGA, CreateNodeData, CreateNodeInput, CreateNodeWorkflow};
pub use delete_node::{DELETE_NODE_SAGA, DeleteNodeData, DeleteNodeWorkflow};
pub use outcome::WorkflowRun;
pub use settings::WorkflowSettings;
