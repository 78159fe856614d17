use std::sync::Arc;

use nodeflow_saga::{Saga, SagaBuilder, Sleeper, Step};
use tracing::{debug, info};

use super::context::NodeSagaContext;
use super::outcome::WorkflowRun;
use super::settings::WorkflowSettings;
use crate::traits::{EventPublisher, KeywordIndex, NodeRepository};
use crate::types::{Node, NodeEvent};
use crate::{OperationError, Result};

pub const CREATE_NODE_SAGA: &str = "CreateNodeWorkflow";

/// Request to create a node, before validation.
#[derive(Debug, Clone, Default)]
pub struct CreateNodeInput {
    pub id: String,
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
}

impl CreateNodeInput {
    /// Validates the request and normalizes keywords (trimmed, lowercased,
    /// first occurrence wins).
    fn into_node(self) -> Result<Node> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(OperationError::InvalidNode("id must not be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(OperationError::InvalidNode(format!(
                "node '{id}' has an empty title"
            )));
        }

        let mut keywords: Vec<String> = Vec::new();
        for keyword in self.keywords {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }

        Ok(Node {
            id,
            title: self.title,
            content: self.content,
            keywords,
        })
    }
}

/// Payload threaded through the create-node saga.
#[derive(Debug, Clone)]
pub struct CreateNodeData {
    pub node: Node,
    pub persisted: bool,
    pub indexed_keywords: Vec<String>,
    pub event_id: Option<String>,
}

impl CreateNodeData {
    #[must_use]
    pub fn new(node: Node) -> Self {
        Self {
            node,
            persisted: false,
            indexed_keywords: Vec::new(),
            event_id: None,
        }
    }
}

type Ctx<R, K, P> = NodeSagaContext<R, K, P>;
type CreateStep<R, K, P> = Step<CreateNodeData, Ctx<R, K, P>, OperationError>;

fn persist_node_step<R, K, P>() -> CreateStep<R, K, P>
where
    R: NodeRepository + 'static,
    K: KeywordIndex + 'static,
    P: EventPublisher + 'static,
{
    Step::new(
        "persist-node",
        |ctx: &Ctx<R, K, P>, mut data: CreateNodeData| -> Result<CreateNodeData> {
            ctx.repository().save_node(&data.node)?;
            data.persisted = true;
            Ok(data)
        },
    )
    .with_compensation(|ctx: &Ctx<R, K, P>, data: CreateNodeData| {
        debug!(node_id = %data.node.id, "removing persisted node");
        ctx.repository().delete_node(&data.node.id)
    })
    .with_compensation_description("delete-node")
}

fn index_keywords_step<R, K, P>() -> CreateStep<R, K, P>
where
    R: NodeRepository + 'static,
    K: KeywordIndex + 'static,
    P: EventPublisher + 'static,
{
    Step::new(
        "index-keywords",
        |ctx: &Ctx<R, K, P>, mut data: CreateNodeData| -> Result<CreateNodeData> {
            ctx.keyword_index()
                .index_keywords(&data.node.id, &data.node.keywords)?;
            data.indexed_keywords.clone_from(&data.node.keywords);
            Ok(data)
        },
    )
    .with_compensation(|ctx: &Ctx<R, K, P>, data: CreateNodeData| {
        debug!(
            node_id = %data.node.id,
            count = data.indexed_keywords.len(),
            "removing indexed keywords"
        );
        ctx.keyword_index().remove_keywords(&data.node.id).map(drop)
    })
    .with_compensation_description("remove-keywords")
}

fn publish_event_step<R, K, P>() -> CreateStep<R, K, P>
where
    R: NodeRepository + 'static,
    K: KeywordIndex + 'static,
    P: EventPublisher + 'static,
{
    Step::new(
        "publish-event",
        |ctx: &Ctx<R, K, P>, mut data: CreateNodeData| -> Result<CreateNodeData> {
            let event_id = ctx.publisher().publish(&NodeEvent::created(&data.node))?;
            data.event_id = Some(event_id);
            Ok(data)
        },
    )
}

/// Stores a node, indexes its keywords and announces it, undoing the
/// storage and index writes if a later step fails.
pub struct CreateNodeWorkflow<R, K, P> {
    context: NodeSagaContext<R, K, P>,
    settings: WorkflowSettings,
    sleeper: Option<Sleeper>,
}

impl<R, K, P> CreateNodeWorkflow<R, K, P>
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

    /// Replace the wait between retry attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Assemble a fresh saga for creating `node`.
    #[must_use]
    pub fn saga(&self, node: &Node) -> Saga<CreateNodeData, Ctx<R, K, P>, OperationError> {
        let mut builder = SagaBuilder::new(CREATE_NODE_SAGA)
            .add_step(persist_node_step())
            .add_step(index_keywords_step().with_retry(self.settings.index_keywords))
            .add_step(publish_event_step().with_retry(self.settings.publish_event))
            .metadata("node_id", node.id.clone())
            .metadata("keyword_count", node.keywords.len());

        if let Some(sleeper) = &self.sleeper {
            let sleeper = Arc::clone(sleeper);
            builder = builder.sleeper(move |delay| sleeper(delay));
        }

        builder.build()
    }

    /// Run the workflow and keep the saga's execution details.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNode` if the input fails validation; the saga is not
    /// started in that case. Saga failures are reported in
    /// [`WorkflowRun::result`].
    pub fn run(&self, input: CreateNodeInput) -> Result<WorkflowRun<Node>> {
        let node = input.into_node()?;
        let mut saga = self.saga(&node);
        info!(
            saga_id = saga.id(),
            node_id = %node.id,
            keywords = node.keywords.len(),
            "creating node"
        );

        let (result, audit_log) =
            saga.execute_with_audit(&self.context, CreateNodeData::new(node));

        Ok(WorkflowRun {
            saga_id: saga.id().to_string(),
            state: saga.state(),
            audit_log,
            result: result.map(|data| data.node).map_err(OperationError::from),
        })
    }

    /// Run the workflow and return the created node.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNode` for invalid input, or `SagaFailed` /
    /// `SagaCompensationFailed` if a step failed.
    pub fn execute(&self, input: CreateNodeInput) -> Result<Node> {
        self.run(input)?.into_result()
    }
}
