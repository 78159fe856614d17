use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeEventKind {
    Created,
    Deleted,
}

/// Message published after a node workflow has changed storage and index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeEvent {
    pub kind: NodeEventKind,
    pub node_id: String,
    pub keywords: Vec<String>,
}

impl NodeEvent {
    #[must_use]
    pub fn created(node: &Node) -> Self {
        Self {
            kind: NodeEventKind::Created,
            node_id: node.id.clone(),
            keywords: node.keywords.clone(),
        }
    }

    #[must_use]
    pub fn deleted(node: &Node) -> Self {
        Self {
            kind: NodeEventKind::Deleted,
            node_id: node.id.clone(),
            keywords: node.keywords.clone(),
        }
    }
}
