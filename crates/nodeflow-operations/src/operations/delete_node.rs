use std::sync::Arc;

use nodeflow_saga::{Saga, SagaBuilder, Sleeper, Step};
use tracing::{debug, info};

use super::context::NodeSagaContext;
use super::outcome::WorkflowRun;
use super::settings::WorkflowSettings;
use crate::traits::{EventPublisher, KeywordIndex, NodeRepository};
use crate::types::{Node, NodeEvent};
use crate::{OperationError, Result};

pub const DELETE_NODE_SAGA: &str = "DeleteNodeWorkflow";

/// Payload threaded through the delete-node saga.
///
/// The snapshot taken by the first step is what the later compensations
/// restore from.
#[derive(Debug, Clone)]
pub struct DeleteNodeData {
    pub node_id: String,
    pub snapshot: Option<Node>,
    pub removed_keywords: Vec<String>,
    pub deleted: bool,
    pub event_id: Option<String>,
}

impl DeleteNodeData {
    #[must_use]
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            snapshot: None,
            removed_keywords: Vec::new(),
            deleted: false,
            event_id: None,
        }
    }

    fn snapshot(&self) -> Result<&Node> {
        self.snapshot
            .as_ref()
            .ok_or_else(|| OperationError::NodeNotFound(self.node_id.clone()))
    }
}

type Ctx<R, K, P> = NodeSagaContext<R, K, P>;
type DeleteStep<R, K, P> = Step<DeleteNodeData, Ctx<R, K, P>, OperationError>;

fn load_node_step<R, K, P>() -> DeleteStep<R, K, P>
where
    R: NodeRepository + 'static,
    K: KeywordIndex + 'static,
    P: EventPublisher + 'static,
{
    Step::new(
        "load-node",
        |ctx: &Ctx<R, K, P>, mut data: DeleteNodeData| -> Result<DeleteNodeData> {
            let node = ctx
                .repository()
                .get_node(&data.node_id)?
                .ok_or_else(|| OperationError::NodeNotFound(data.node_id.clone()))?;
            data.snapshot = Some(node);
            Ok(data)
        },
    )
}

fn remove_keywords_step<R, K, P>() -> DeleteStep<R, K, P>
where
    R: NodeRepository + 'static,
    K: KeywordIndex + 'static,
    P: EventPublisher + 'static,
{
    Step::new(
        "remove-keywords",
        |ctx: &Ctx<R, K, P>, mut data: DeleteNodeData| -> Result<DeleteNodeData> {
            data.removed_keywords = ctx.keyword_index().remove_keywords(&data.node_id)?;
            Ok(data)
        },
    )
    .with_compensation(|ctx: &Ctx<R, K, P>, data: DeleteNodeData| {
        debug!(
            node_id = %data.node_id,
            count = data.removed_keywords.len(),
            "re-indexing removed keywords"
        );
        ctx.keyword_index()
            .index_keywords(&data.node_id, &data.removed_keywords)
    })
    .with_compensation_description("restore-keywords")
}

fn delete_node_step<R, K, P>() -> DeleteStep<R, K, P>
where
    R: NodeRepository + 'static,
    K: KeywordIndex + 'static,
    P: EventPublisher + 'static,
{
    Step::new(
        "delete-node",
        |ctx: &Ctx<R, K, P>, mut data: DeleteNodeData| -> Result<DeleteNodeData> {
            ctx.repository().delete_node(&data.node_id)?;
            data.deleted = true;
            Ok(data)
        },
    )
    .with_compensation(|ctx: &Ctx<R, K, P>, data: DeleteNodeData| -> Result<()> {
        debug!(node_id = %data.node_id, "restoring deleted node");
        ctx.repository().save_node(data.snapshot()?)
    })
    .with_compensation_description("restore-node")
}

fn publish_event_step<R, K, P>() -> DeleteStep<R, K, P>
where
    R: NodeRepository + 'static,
    K: KeywordIndex + 'static,
    P: EventPublisher + 'static,
{
    Step::new(
        "publish-event",
        |ctx: &Ctx<R, K, P>, mut data: DeleteNodeData| -> Result<DeleteNodeData> {
            let event = NodeEvent::deleted(data.snapshot()?);
            data.event_id = Some(ctx.publisher().publish(&event)?);
            Ok(data)
        },
    )
}

/// Removes a node and its keywords and announces the deletion, restoring
/// both if the announcement cannot be made.
pub struct DeleteNodeWorkflow<R, K, P> {
    context: NodeSagaContext<R, K, P>,
    settings: WorkflowSettings,
    sleeper: Option<Sleeper>,
}

impl<R, K, P> DeleteNodeWorkflow<R, K, P>
where
    R: NodeRepository + 'static,
    K: KeywordIndex + 'static,
    P: EventPublisher + 'static,
{
    pub fn new(context: NodeSagaContext<R, K, P>, settings: WorkflowSettings) -> Self {
        Self {
            context,
            settings,
            sleeper: None,
        }
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    #[must_use]
    pub fn saga(&self, node_id: &str) -> Saga<DeleteNodeData, Ctx<R, K, P>, OperationError> {
        let mut builder = SagaBuilder::new(DELETE_NODE_SAGA)
            .add_step(load_node_step())
            .add_step(remove_keywords_step().with_retry(self.settings.remove_keywords))
            .add_step(delete_node_step())
            .add_step(publish_event_step().with_retry(self.settings.publish_event))
            .metadata("node_id", node_id);

        if let Some(sleeper) = &self.sleeper {
            let sleeper = Arc::clone(sleeper);
            builder = builder.sleeper(move |delay| sleeper(delay));
        }

        builder.build()
    }

    /// Run the workflow and keep the saga's execution details. On success the
    /// result holds the node as it was before deletion.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNode` if `node_id` is blank; the saga is not started in
    /// that case.
    pub fn run(&self, node_id: &str) -> Result<WorkflowRun<Node>> {
        let node_id = node_id.trim();
        if node_id.is_empty() {
            return Err(OperationError::InvalidNode(
                "id must not be empty".to_string(),
            ));
        }

        let mut saga = self.saga(node_id);
        info!(saga_id = saga.id(), node_id, "deleting node");

        let (result, audit_log) =
            saga.execute_with_audit(&self.context, DeleteNodeData::new(node_id));

        let result = result
            .map_err(OperationError::from)
            .and_then(|data| {
                let node_id = data.node_id;
                data.snapshot.ok_or(OperationError::NodeNotFound(node_id))
            });

        Ok(WorkflowRun {
            saga_id: saga.id().to_string(),
            state: saga.state(),
            audit_log,
            result,
        })
    }

    /// Run the workflow and return the deleted node.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` wrapped in `SagaFailed` if the node does not
    /// exist, or another saga error if a step failed.
    pub fn execute(&self, node_id: &str) -> Result<Node> {
        self.run(node_id)?.into_result()
    }
}
