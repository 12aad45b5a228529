//! Per-node execution state.
//!
//! Each node of the pipeline gets a `NodeExecutionState` entry in the
//! snapshot's state map, created lazily by the fold engine the first time an
//! event references the node. Each named output slot on a node gets its own
//! `OutputState` with independent streaming status.

use crate::stats::ExecutionStats;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of a single named output slot on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStateStatus {
    Pending,
    Running,
    Finished,
    Cancelled,
}

/// State of one named output slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputState {
    pub status: OutputStateStatus,
    /// Arbitrary value; string outputs are built incrementally via append
    /// events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl OutputState {
    /// Default state for an output slot seen for the first time.
    pub fn pending() -> Self {
        Self {
            status: OutputStateStatus::Pending,
            value: None,
        }
    }
}

/// Lifecycle of a node execution.
///
/// `pending → {starting | retry} → running → {finished | error | cancelled}`;
/// `retry` loops back to `starting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeExecutionStatus {
    // Waiting.
    Pending,
    Retry,

    // Starting.
    Starting,

    // Started.
    Running,

    // Ended.
    Finished,
    Cancelled,
    Error,
}

/// Execution state of a single pipeline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecutionState {
    pub status: NodeExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, OutputState>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ExecutionStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_branch: Option<bool>,
}

impl NodeExecutionState {
    fn seed(status: NodeExecutionStatus, at: DateTime<Utc>) -> Self {
        Self {
            status,
            inputs: None,
            outputs: IndexMap::new(),
            updated_at: at,
            errors: None,
            message: None,
            retries: 1,
            stats: None,
            fail_branch: None,
        }
    }

    /// Default state synthesized by a node-level event for an unseen node.
    pub fn seed_pending(at: DateTime<Utc>) -> Self {
        Self::seed(NodeExecutionStatus::Pending, at)
    }

    /// Default state synthesized by a node-output event for an unseen node.
    ///
    /// Deliberately diverges from [`Self::seed_pending`]: an output event
    /// implies the node is already producing.
    pub fn seed_running(at: DateTime<Utc>) -> Self {
        Self::seed(NodeExecutionStatus::Running, at)
    }

    /// Waiting to be scheduled.
    pub fn is_waiting(&self) -> bool {
        self.status == NodeExecutionStatus::Pending
    }

    /// Scheduled for execution.
    pub fn is_starting(&self) -> bool {
        matches!(
            self.status,
            NodeExecutionStatus::Starting | NodeExecutionStatus::Retry
        )
    }

    /// Execution started.
    pub fn is_started(&self) -> bool {
        self.status == NodeExecutionStatus::Running
    }

    /// Execution ended, successfully or not.
    pub fn is_ended(&self) -> bool {
        matches!(
            self.status,
            NodeExecutionStatus::Finished
                | NodeExecutionStatus::Error
                | NodeExecutionStatus::Cancelled
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(
            self.status,
            NodeExecutionStatus::Error | NodeExecutionStatus::Cancelled
        )
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == NodeExecutionStatus::Finished
    }
}
