//! Agent (pipeline) definition.
//!
//! The pipeline is immutable reference data embedded in every execution
//! snapshot: declared inputs and outputs plus the node graph.

use crate::ids::AgentId;
use crate::node::Node;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A declared pipeline input slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_history: Option<bool>,
}

/// A declared pipeline output slot, optionally with a binding expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOutput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_history: Option<bool>,
}

/// An agent pipeline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    pub inputs: Vec<AgentInput>,
    pub outputs: Vec<AgentOutput>,
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl Agent {
    /// Empty pipeline with the given id. Used by tests and mocks.
    pub fn empty(id: impl Into<AgentId>) -> Self {
        Self {
            id: Some(id.into()),
            version: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            nodes: Vec::new(),
            account_id: None,
        }
    }
}
