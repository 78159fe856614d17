use std::sync::Arc;

use clap::Args;
use nodeflow_operations::operations::{
    CreateNodeInput, CreateNodeWorkflow, NodeSagaContext, WorkflowRun,
};
use nodeflow_operations::providers::{
    FaultMode, InMemoryEventPublisher, InMemoryKeywordIndex, InMemoryNodeRepository,
};
use nodeflow_operations::types::Node;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;

#[derive(Args)]
pub(crate) struct CreateNodeArgs {
    /// Node identifier
    #[arg(long)]
    id: String,

    /// Node title
    #[arg(long)]
    title: String,

    /// Node body text
    #[arg(long, default_value = "")]
    content: String,

    /// Keyword to index the node under (repeatable)
    #[arg(long = "keyword", short = 'k')]
    keywords: Vec<String>,

    /// Make the keyword index fail its first N calls
    #[arg(long, value_name = "N")]
    fail_index: Option<u32>,

    /// Make the event publisher fail its first N calls
    #[arg(long, value_name = "N")]
    fail_publish: Option<u32>,
}

fn fault_mode(failures: Option<u32>) -> FaultMode {
    failures.map_or(FaultMode::Healthy, FaultMode::FailFirst)
}

pub(crate) fn run(args: CreateNodeArgs, config: &Config) -> Result<()> {
    let context = NodeSagaContext::new(
        Arc::new(InMemoryNodeRepository::new()),
        Arc::new(InMemoryKeywordIndex::with_faults(fault_mode(args.fail_index))),
        Arc::new(InMemoryEventPublisher::with_faults(fault_mode(
            args.fail_publish,
        ))),
    );
    let workflow = CreateNodeWorkflow::new(context, config.workflow_settings());

    let run = workflow.run(CreateNodeInput {
        id: args.id,
        title: args.title,
        content: args.content,
        keywords: args.keywords,
    })?;

    match &run.result {
        Ok(node) => info!(
            saga_id = %run.saga_id,
            node_id = %node.id,
            state = %run.state,
            "node created"
        ),
        Err(e) => warn!(
            saga_id = %run.saga_id,
            state = %run.state,
            error = %e,
            "node was not created"
        ),
    }
    print_run(&run);

    run.into_result()?;
    Ok(())
}

fn print_run(run: &WorkflowRun<Node>) {
    match &run.result {
        Ok(node) => println!("Created node '{}'", node.id),
        Err(_) => println!("Node was not created"),
    }
    println!("Saga: {}", run.saga_id);
    println!("State: {}", run.state);
    println!();
    println!("Steps:");
    for line in run.audit_log.summary().lines() {
        println!("  {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_failure_count_is_healthy() {
        assert_eq!(fault_mode(None), FaultMode::Healthy);
    }

    #[test]
    fn failure_count_fails_first_calls() {
        assert_eq!(fault_mode(Some(2)), FaultMode::FailFirst(2));
    }
}
