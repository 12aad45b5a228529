//! Pipeline node definition.
//!
//! Nodes are static reference data carried inside the pipeline definition of
//! an execution snapshot. The fold engine never mutates them.

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named input binding on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInput {
    pub name: String,
    pub value: Value,
    /// When true, `value` is taken verbatim instead of being resolved as a
    /// reference to another node's output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<bool>,
}

/// An output substituted when the node fails and a fail branch exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackOutput {
    pub name: String,
    pub value: Value,
}

/// Dynamic dispatch target for router-style nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCall {
    /// Template reference resolved at runtime, e.g. `{{1.output}}`.
    #[serde(rename = "ref")]
    pub reference: String,
    pub description: String,
}

/// A single node of a pipeline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<NodeInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_outputs: Option<Vec<FallbackOutput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<NodeCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_agent_if_fails: Option<bool>,
}

impl Node {
    /// Minimal node with just an id and display name.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inputs: None,
            fallback_outputs: None,
            call: None,
            max_retries: None,
            retry_delay_ms: None,
            error_message: None,
            fail_agent_if_fails: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_serde_roundtrip() {
        let node = Node {
            inputs: Some(vec![NodeInput {
                name: "prompt".into(),
                value: json!("{{input.question}}"),
                literal: None,
            }]),
            max_retries: Some(2),
            ..Node::new("1", "generate")
        };
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"maxRetries\":2"));
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn call_ref_field_spelling() {
        let call = NodeCall {
            reference: "{{1.output}}".into(),
            description: "route".into(),
        };
        let json = serde_json::to_string(&call).unwrap();
        assert!(json.contains("\"ref\":\"{{1.output}}\""));
    }
}
