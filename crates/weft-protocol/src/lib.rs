//! # weft-protocol — shared execution data model
//!
//! This crate defines the data contract between the weft agent cloud and its
//! clients: execution snapshots, per-node state, the streamed
//! `ExecutionEvent` union, and the pipeline definition types embedded in a
//! snapshot.
//!
//! It is intentionally dependency-light (no runtime deps like tokio or an
//! HTTP stack) so it can be used as a pure contract crate. The fold engine
//! lives in `weft-replay`; the compact wire codec in `weft-wire`.
//!
//! ## Module Overview
//!
//! - [`ids`] — Typed ID wrappers (ExecutionId, AgentId, NodeId)
//! - [`agent`] / [`node`] — pipeline definition reference data
//! - [`node_execution`] — per-node state and output-slot state
//! - [`execution`] — the `AgentExecution` snapshot aggregate
//! - [`event`] — the `ExecutionEvent` discriminated union
//! - [`stats`] — open-map numeric counters with per-key aggregation

pub mod agent;
pub mod event;
pub mod execution;
pub mod ids;
pub mod node;
pub mod node_execution;
pub mod stats;

pub use agent::{Agent, AgentInput, AgentOutput};
pub use event::{ExecutionEvent, ExecutionEventOp, LogLevel, LogStatusTextAction};
pub use execution::{AgentExecution, ExecutionStatus};
pub use ids::{AgentId, ExecutionId, NodeId};
pub use node::{FallbackOutput, Node, NodeCall, NodeInput};
pub use node_execution::{
    NodeExecutionState, NodeExecutionStatus, OutputState, OutputStateStatus,
};
pub use stats::{ExecutionStats, STAT_COST, STAT_INPUT_TOKENS, STAT_OUTPUT_TOKENS};
