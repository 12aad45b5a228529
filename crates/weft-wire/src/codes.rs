//! Two-way integer code maps for the mini encoding.
//!
//! Every enum the verbose wire spells as a string gets a fixed integer code
//! here. The maps are exhaustive in both directions; an unknown code on
//! decode is a fatal [`WireError`]. Code ranges group by level: `0x1x` agent,
//! `0x2x` agent output, `0x3x` node, `0x4x` node output, `0xFx` misc.

use crate::error::WireError;
use serde_json::Value;
use weft_protocol::{
    ExecutionEventOp, ExecutionStatus, LogLevel, LogStatusTextAction, NodeExecutionStatus,
    OutputStateStatus,
};

pub fn op_code(op: ExecutionEventOp) -> u64 {
    match op {
        ExecutionEventOp::Init => 0x10,
        ExecutionEventOp::UpdateStatus => 0x11,
        ExecutionEventOp::OutputUpdate => 0x20,
        ExecutionEventOp::NodeUpdateStatus => 0x30,
        ExecutionEventOp::NodeOutputUpdateStatus => 0x40,
        ExecutionEventOp::NodeOutputUpdate => 0x41,
        ExecutionEventOp::NodeOutputSignal => 0x42,
        ExecutionEventOp::Ping => 0xF0,
        ExecutionEventOp::Log => 0xF1,
    }
}

pub fn op_from_code(code: u64) -> Result<ExecutionEventOp, WireError> {
    match code {
        0x10 => Ok(ExecutionEventOp::Init),
        0x11 => Ok(ExecutionEventOp::UpdateStatus),
        0x20 => Ok(ExecutionEventOp::OutputUpdate),
        0x30 => Ok(ExecutionEventOp::NodeUpdateStatus),
        0x40 => Ok(ExecutionEventOp::NodeOutputUpdateStatus),
        0x41 => Ok(ExecutionEventOp::NodeOutputUpdate),
        0x42 => Ok(ExecutionEventOp::NodeOutputSignal),
        0xF0 => Ok(ExecutionEventOp::Ping),
        0xF1 => Ok(ExecutionEventOp::Log),
        other => Err(WireError::UnknownOp(other)),
    }
}

pub fn execution_status_code(status: ExecutionStatus) -> u64 {
    match status {
        ExecutionStatus::Pending => 0x10,
        ExecutionStatus::Running => 0x20,
        ExecutionStatus::Cancelling => 0x30,
        ExecutionStatus::Cancelled => 0x40,
        ExecutionStatus::Finished => 0x50,
        ExecutionStatus::Error => 0x60,
    }
}

pub fn execution_status_from_code(code: u64) -> Result<ExecutionStatus, WireError> {
    match code {
        0x10 => Ok(ExecutionStatus::Pending),
        0x20 => Ok(ExecutionStatus::Running),
        0x30 => Ok(ExecutionStatus::Cancelling),
        0x40 => Ok(ExecutionStatus::Cancelled),
        0x50 => Ok(ExecutionStatus::Finished),
        0x60 => Ok(ExecutionStatus::Error),
        other => Err(WireError::UnknownCode {
            kind: "execution status",
            code: other,
        }),
    }
}

pub fn node_status_code(status: NodeExecutionStatus) -> u64 {
    match status {
        NodeExecutionStatus::Pending => 0x10,
        NodeExecutionStatus::Retry => 0x11,
        NodeExecutionStatus::Starting => 0x20,
        NodeExecutionStatus::Running => 0x30,
        NodeExecutionStatus::Finished => 0x40,
        NodeExecutionStatus::Cancelled => 0x41,
        NodeExecutionStatus::Error => 0x42,
    }
}

pub fn node_status_from_code(code: u64) -> Result<NodeExecutionStatus, WireError> {
    match code {
        0x10 => Ok(NodeExecutionStatus::Pending),
        0x11 => Ok(NodeExecutionStatus::Retry),
        0x20 => Ok(NodeExecutionStatus::Starting),
        0x30 => Ok(NodeExecutionStatus::Running),
        0x40 => Ok(NodeExecutionStatus::Finished),
        0x41 => Ok(NodeExecutionStatus::Cancelled),
        0x42 => Ok(NodeExecutionStatus::Error),
        other => Err(WireError::UnknownCode {
            kind: "node status",
            code: other,
        }),
    }
}

pub fn output_status_code(status: OutputStateStatus) -> u64 {
    match status {
        OutputStateStatus::Pending => 0x10,
        OutputStateStatus::Running => 0x20,
        OutputStateStatus::Finished => 0x30,
        OutputStateStatus::Cancelled => 0x40,
    }
}

pub fn output_status_from_code(code: u64) -> Result<OutputStateStatus, WireError> {
    match code {
        0x10 => Ok(OutputStateStatus::Pending),
        0x20 => Ok(OutputStateStatus::Running),
        0x30 => Ok(OutputStateStatus::Finished),
        0x40 => Ok(OutputStateStatus::Cancelled),
        other => Err(WireError::UnknownCode {
            kind: "output status",
            code: other,
        }),
    }
}

pub fn log_level_code(level: LogLevel) -> u64 {
    match level {
        LogLevel::Debug => 0x10,
        LogLevel::Info => 0x20,
        LogLevel::Warn => 0x30,
        LogLevel::Error => 0x40,
    }
}

pub fn log_level_from_code(code: u64) -> Result<LogLevel, WireError> {
    match code {
        0x10 => Ok(LogLevel::Debug),
        0x20 => Ok(LogLevel::Info),
        0x30 => Ok(LogLevel::Warn),
        0x40 => Ok(LogLevel::Error),
        other => Err(WireError::UnknownCode {
            kind: "log level",
            code: other,
        }),
    }
}

pub fn status_text_action_code(action: LogStatusTextAction) -> u64 {
    match action {
        LogStatusTextAction::Set => 0x10,
        LogStatusTextAction::Clear => 0x20,
    }
}

pub fn status_text_action_from_code(code: u64) -> Result<LogStatusTextAction, WireError> {
    match code {
        0x10 => Ok(LogStatusTextAction::Set),
        0x20 => Ok(LogStatusTextAction::Clear),
        other => Err(WireError::UnknownCode {
            kind: "status-text action",
            code: other,
        }),
    }
}

/// Tri-state wire boolean: emitted as `1`/`0`, accepted as `true`/`false`
/// too. Returns `None` for anything else.
pub fn mini_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

pub fn mini_bool_value(value: bool) -> Value {
    Value::from(if value { 1 } else { 0 })
}
