//! The execution snapshot aggregate.
//!
//! An `AgentExecution` is a fully materialized view of one pipeline run: the
//! pipeline definition, per-node state, aggregate stats, timestamps, and a
//! buffer of not-yet-applied events. The fold engine in `weft-replay` turns
//! event streams into snapshots; this module only defines the value.

use crate::agent::Agent;
use crate::event::ExecutionEvent;
use crate::ids::{ExecutionId, NodeId};
use crate::node_execution::NodeExecutionState;
use crate::stats::ExecutionStats;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Agent-level execution lifecycle.
///
/// `pending → running → {cancelling → cancelled | finished | error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Cancelling,
    Cancelled,
    Finished,
    Error,
}

impl ExecutionStatus {
    /// No further status transitions happen after a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Error | Self::Cancelled)
    }
}

/// A materialized execution snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentExecution {
    #[serde(rename = "_id")]
    pub id: ExecutionId,
    pub status: ExecutionStatus,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,
    /// Static pipeline definition. Immutable reference data.
    pub pipeline: Agent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Per-node execution state, keyed by node id.
    #[serde(default)]
    pub state: IndexMap<NodeId, NodeExecutionState>,
    /// Aggregate counters. Always the elementwise sum of node stats;
    /// recomputed by the fold engine after every mutation.
    #[serde(default, skip_serializing_if = "ExecutionStats::is_empty")]
    pub stats: ExecutionStats,
    #[serde(default)]
    pub inputs: IndexMap<String, Value>,
    #[serde(default)]
    pub outputs: IndexMap<String, Value>,
    /// Events received but not yet folded in. Empty after a fold completes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ExecutionEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "_errors", default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_execution_id: Option<String>,
}

impl AgentExecution {
    /// Fresh pending snapshot, as handed out by the service when a run is
    /// queued.
    pub fn pending(id: impl Into<ExecutionId>, pipeline: Agent, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: ExecutionStatus::Pending,
            updated_at: at,
            queued_at: None,
            started_at: None,
            finished_at: None,
            pipeline_id: None,
            pipeline,
            external_id: None,
            state: IndexMap::new(),
            stats: ExecutionStats::new(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            events: Vec::new(),
            message: None,
            errors: None,
            parent_execution_id: None,
        }
    }

    /// The run ended, successfully or with an error.
    pub fn is_ended(&self) -> bool {
        matches!(
            self.status,
            ExecutionStatus::Finished | ExecutionStatus::Error
        )
    }
}
