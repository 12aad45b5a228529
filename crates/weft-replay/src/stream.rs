//! Incremental stream folding.
//!
//! A transport (HTTP chunk reader, websocket, replayed log) delivers events
//! one at a time. `ExecutionStream` threads the snapshot through
//! [`apply_events`](crate::apply_events) so that incremental consumption
//! produces exactly the same snapshot as folding the whole batch at once.

use tracing::debug;
use weft_protocol::{AgentExecution, ExecutionEvent};

use crate::apply::apply_events;

/// Snapshot accumulator for a live event stream.
///
/// Starts empty; the stream's `init` event installs the first snapshot.
/// Events arriving before `init` cannot be applied and are dropped, matching
/// the service contract that `init` is the first record of every stream.
#[derive(Debug, Default)]
pub struct ExecutionStream {
    execution: Option<AgentExecution>,
}

impl ExecutionStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a known snapshot, e.g. after a reconnect.
    pub fn resume(execution: AgentExecution) -> Self {
        Self {
            execution: Some(execution),
        }
    }

    /// Apply one arriving event and return the snapshot after it.
    ///
    /// Callers driving a per-event callback hand `(event, push(event))` to
    /// their consumer.
    pub fn push(&mut self, event: &ExecutionEvent) -> Option<&AgentExecution> {
        match event {
            ExecutionEvent::Init {
                execution: snapshot,
                ..
            } => {
                debug!(execution_id = %snapshot.id, "stream initialized");
                self.execution = Some((**snapshot).clone());
            }
            _ => {
                if let Some(mut execution) = self.execution.take() {
                    execution.events.push(event.clone());
                    self.execution = Some(apply_events(execution));
                } else {
                    debug!(op = %event.op(), "dropping event received before init");
                }
            }
        }
        self.execution.as_ref()
    }

    /// The latest materialized snapshot, if any event stream has begun.
    pub fn snapshot(&self) -> Option<&AgentExecution> {
        self.execution.as_ref()
    }

    /// Consume the stream, yielding the final snapshot.
    pub fn into_snapshot(self) -> Option<AgentExecution> {
        self.execution
    }
}
