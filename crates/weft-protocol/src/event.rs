//! The execution event protocol.
//!
//! Every mutation the service applies to a running execution is streamed to
//! clients as one `ExecutionEvent`, tagged by an `"op"` string and scoped to
//! agent, node, or node-output granularity. The union is closed: dispatch
//! sites match exhaustively, so adding a variant is a compile-time update
//! site everywhere.
//!
//! `ping`, `log` and `node.output.signal` are housekeeping: valid wire
//! events that carry no snapshot mutation.

use crate::execution::{AgentExecution, ExecutionStatus};
use crate::ids::{ExecutionId, NodeId};
use crate::node_execution::{NodeExecutionStatus, OutputStateStatus};
use crate::stats::ExecutionStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Severity of a streamed log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Whether a log event sets or clears the UI status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatusTextAction {
    Set,
    Clear,
}

/// One streamed execution event.
///
/// All variants carry `createdAt` (event time, used for ordering and for
/// every timestamp the fold engine writes) and an optional `executionId`
/// used to discard events misrouted from another execution's stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all_fields = "camelCase")]
pub enum ExecutionEvent {
    /// Full snapshot replacement. First event of every stream; a non-first
    /// `init` discards all prior state.
    #[serde(rename = "init")]
    Init {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_id: Option<ExecutionId>,
        created_at: DateTime<Utc>,
        execution: Box<AgentExecution>,
    },

    /// Agent-level status change.
    #[serde(rename = "updateStatus")]
    UpdateStatus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_id: Option<ExecutionId>,
        created_at: DateTime<Utc>,
        status: ExecutionStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(rename = "_errors", default, skip_serializing_if = "Option::is_none")]
        errors: Option<Vec<Value>>,
    },

    /// Agent-level named output update, optionally appended.
    #[serde(rename = "output.update")]
    OutputUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_id: Option<ExecutionId>,
        created_at: DateTime<Utc>,
        output: String,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        append: Option<bool>,
    },

    /// Node-level status change, with optional diagnostics and stats.
    #[serde(rename = "node.updateStatus")]
    NodeUpdateStatus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_id: Option<ExecutionId>,
        created_at: DateTime<Utc>,
        node_id: NodeId,
        status: NodeExecutionStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        errors: Option<Vec<Value>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stats: Option<ExecutionStats>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retries: Option<u32>,
    },

    /// Status change of one named output slot on a node.
    #[serde(rename = "node.output.updateStatus")]
    NodeOutputUpdateStatus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_id: Option<ExecutionId>,
        created_at: DateTime<Utc>,
        node_id: NodeId,
        output: String,
        status: OutputStateStatus,
    },

    /// Value (and status) update of one named output slot, optionally
    /// appended for streaming text.
    #[serde(rename = "node.output.update")]
    NodeOutputUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_id: Option<ExecutionId>,
        created_at: DateTime<Utc>,
        node_id: NodeId,
        output: String,
        status: OutputStateStatus,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        append: Option<bool>,
    },

    /// Out-of-band signal on an output slot. Housekeeping; fold no-op.
    #[serde(rename = "node.output.signal")]
    NodeOutputSignal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_id: Option<ExecutionId>,
        created_at: DateTime<Utc>,
        node_id: NodeId,
        output: String,
        value: Value,
    },

    /// Transport keepalive. Housekeeping.
    #[serde(rename = "ping")]
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_id: Option<ExecutionId>,
        created_at: DateTime<Utc>,
    },

    /// Streamed log line. Housekeeping.
    #[serde(rename = "log")]
    Log {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_id: Option<ExecutionId>,
        created_at: DateTime<Utc>,
        level: LogLevel,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_text: Option<LogStatusTextAction>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
}

/// The `"op"` tag values, as a standalone enum for wire mapping tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionEventOp {
    Init,
    UpdateStatus,
    OutputUpdate,
    NodeUpdateStatus,
    NodeOutputUpdateStatus,
    NodeOutputUpdate,
    NodeOutputSignal,
    Ping,
    Log,
}

impl ExecutionEventOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::UpdateStatus => "updateStatus",
            Self::OutputUpdate => "output.update",
            Self::NodeUpdateStatus => "node.updateStatus",
            Self::NodeOutputUpdateStatus => "node.output.updateStatus",
            Self::NodeOutputUpdate => "node.output.update",
            Self::NodeOutputSignal => "node.output.signal",
            Self::Ping => "ping",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for ExecutionEventOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExecutionEvent {
    /// The operation tag of this event.
    pub fn op(&self) -> ExecutionEventOp {
        match self {
            Self::Init { .. } => ExecutionEventOp::Init,
            Self::UpdateStatus { .. } => ExecutionEventOp::UpdateStatus,
            Self::OutputUpdate { .. } => ExecutionEventOp::OutputUpdate,
            Self::NodeUpdateStatus { .. } => ExecutionEventOp::NodeUpdateStatus,
            Self::NodeOutputUpdateStatus { .. } => ExecutionEventOp::NodeOutputUpdateStatus,
            Self::NodeOutputUpdate { .. } => ExecutionEventOp::NodeOutputUpdate,
            Self::NodeOutputSignal { .. } => ExecutionEventOp::NodeOutputSignal,
            Self::Ping { .. } => ExecutionEventOp::Ping,
            Self::Log { .. } => ExecutionEventOp::Log,
        }
    }

    /// Event time. Orders the fold and stamps every snapshot timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Init { created_at, .. }
            | Self::UpdateStatus { created_at, .. }
            | Self::OutputUpdate { created_at, .. }
            | Self::NodeUpdateStatus { created_at, .. }
            | Self::NodeOutputUpdateStatus { created_at, .. }
            | Self::NodeOutputUpdate { created_at, .. }
            | Self::NodeOutputSignal { created_at, .. }
            | Self::Ping { created_at, .. }
            | Self::Log { created_at, .. } => *created_at,
        }
    }

    /// The execution this event belongs to, when the stream carries it.
    pub fn execution_id(&self) -> Option<&ExecutionId> {
        match self {
            Self::Init { execution_id, .. }
            | Self::UpdateStatus { execution_id, .. }
            | Self::OutputUpdate { execution_id, .. }
            | Self::NodeUpdateStatus { execution_id, .. }
            | Self::NodeOutputUpdateStatus { execution_id, .. }
            | Self::NodeOutputUpdate { execution_id, .. }
            | Self::NodeOutputSignal { execution_id, .. }
            | Self::Ping { execution_id, .. }
            | Self::Log { execution_id, .. } => execution_id.as_ref(),
        }
    }

    /// True for events that never mutate a snapshot.
    pub fn is_housekeeping(&self) -> bool {
        matches!(
            self,
            Self::Ping { .. } | Self::Log { .. } | Self::NodeOutputSignal { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_status_wire_shape() {
        let event = ExecutionEvent::UpdateStatus {
            execution_id: Some("execution1".into()),
            created_at: Utc::now(),
            status: ExecutionStatus::Running,
            message: None,
            errors: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"op\":\"updateStatus\""));
        assert!(json.contains("\"executionId\":\"execution1\""));
        assert!(!json.contains("\"message\""));
        let back: ExecutionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn dotted_op_tags_roundtrip() {
        let event = ExecutionEvent::NodeOutputUpdate {
            execution_id: None,
            created_at: Utc::now(),
            node_id: "node1".into(),
            output: "output1".into(),
            status: OutputStateStatus::Running,
            value: json!("chunk"),
            append: Some(true),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"op\":\"node.output.update\""));
        assert!(json.contains("\"nodeId\":\"node1\""));
        let back: ExecutionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn agent_errors_use_underscore_spelling() {
        let event = ExecutionEvent::UpdateStatus {
            execution_id: None,
            created_at: Utc::now(),
            status: ExecutionStatus::Error,
            message: Some("boom".into()),
            errors: Some(vec![json!({"code": 500})]),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"_errors\""));
        let back: ExecutionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn created_at_parses_iso8601() {
        let event: ExecutionEvent =
            serde_json::from_str(r#"{"op":"ping","createdAt":"2026-08-29T12:00:00Z"}"#).unwrap();
        assert_eq!(event.op(), ExecutionEventOp::Ping);
        assert!(event.is_housekeeping());
        assert!(event.execution_id().is_none());
    }

    #[test]
    fn log_event_roundtrip() {
        let event = ExecutionEvent::Log {
            execution_id: Some("e1".into()),
            created_at: Utc::now(),
            level: LogLevel::Info,
            status_text: Some(LogStatusTextAction::Set),
            node_id: Some("node1".into()),
            output: None,
            message: "generating".into(),
            data: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"statusText\":\"set\""));
        let back: ExecutionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
