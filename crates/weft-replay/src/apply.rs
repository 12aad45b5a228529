//! The fold engine.
//!
//! [`apply_events`] drains a snapshot's buffered events, ordered by
//! `createdAt`, through [`apply_event`]. Both are pure: they consume the
//! snapshot by value and return a new one, never touching the event values.
//! Re-folding the same snapshot with the same ordered events yields a
//! bit-identical result, and applying events one at a time equals folding
//! them as a batch.
//!
//! Every timestamp written here comes from the event's `createdAt`, never
//! from the wall clock, so replays are deterministic.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use weft_protocol::{
    AgentExecution, ExecutionEvent, ExecutionStats, NodeExecutionState, NodeId, OutputState,
};

/// Fold all buffered events into the snapshot, oldest first.
///
/// Ties on `createdAt` keep their arrival order (stable sort). Returns the
/// snapshot with an empty event buffer; a no-op when the buffer already is
/// empty.
pub fn apply_events(mut execution: AgentExecution) -> AgentExecution {
    if execution.events.is_empty() {
        return execution;
    }
    let mut events = std::mem::take(&mut execution.events);
    events.sort_by_key(ExecutionEvent::created_at);
    debug!(count = events.len(), execution_id = %execution.id, "folding buffered events");
    for event in &events {
        execution = apply_event(execution, event);
    }
    execution.events.clear();
    execution
}

/// Apply a single event to the snapshot.
///
/// Housekeeping events (`ping`, `log`, `node.output.signal`) pass through
/// unchanged. An event addressed to a different execution is silently
/// dropped: streams can be multiplexed and a misrouted event must not
/// corrupt the snapshot.
pub fn apply_event(execution: AgentExecution, event: &ExecutionEvent) -> AgentExecution {
    if let Some(event_execution_id) = event.execution_id()
        && *event_execution_id != execution.id
    {
        warn!(
            op = %event.op(),
            event_execution_id = %event_execution_id,
            snapshot_execution_id = %execution.id,
            "dropping event addressed to a different execution"
        );
        return execution;
    }

    match event {
        ExecutionEvent::Init {
            execution: snapshot,
            ..
        } => (**snapshot).clone(),

        ExecutionEvent::UpdateStatus {
            created_at,
            status,
            message,
            errors,
            ..
        } => update(execution, *created_at, |execution| {
            execution.status = *status;
            if let Some(message) = message {
                execution.message = Some(message.clone());
            }
            if let Some(errors) = errors {
                execution.errors = Some(errors.clone());
            }
        }),

        ExecutionEvent::OutputUpdate {
            created_at,
            output,
            value,
            append,
            ..
        } => update_agent_output(execution, *created_at, output, |current| {
            next_value(current, value, *append)
        }),

        ExecutionEvent::NodeUpdateStatus {
            created_at,
            node_id,
            status,
            message,
            errors,
            stats,
            retries,
            ..
        } => update_node(
            execution,
            *created_at,
            node_id,
            NodeExecutionState::seed_pending,
            |node| {
                node.status = *status;
                if let Some(retries) = retries {
                    node.retries = *retries;
                }
                if let Some(message) = message {
                    node.message = Some(message.clone());
                }
                if let Some(errors) = errors {
                    node.errors = Some(errors.clone());
                }
                if let Some(stats) = stats {
                    // Replaced wholesale, not merged.
                    node.stats = Some(stats.clone());
                }
            },
        ),

        ExecutionEvent::NodeOutputUpdateStatus {
            created_at,
            node_id,
            output,
            status,
            ..
        } => update_node_output(execution, *created_at, node_id, output, |slot| {
            // Status only; the streamed value so far is preserved.
            slot.status = *status;
        }),

        ExecutionEvent::NodeOutputUpdate {
            created_at,
            node_id,
            output,
            status,
            value,
            append,
            ..
        } => update_node_output(execution, *created_at, node_id, output, |slot| {
            slot.value = Some(next_value(slot.value.as_ref(), value, *append));
            slot.status = *status;
        }),

        ExecutionEvent::NodeOutputSignal { .. }
        | ExecutionEvent::Ping { .. }
        | ExecutionEvent::Log { .. } => execution,
    }
}

/// Common mutation primitive. Every state change funnels through here so the
/// snapshot invariants hold after each event:
/// aggregate stats are the elementwise sum of node stats, `startedAt` is set
/// on the first mutation, `updatedAt` tracks the event time, and
/// `finishedAt` is stamped exactly once when the status first turns
/// terminal.
fn update(
    mut execution: AgentExecution,
    at: DateTime<Utc>,
    f: impl FnOnce(&mut AgentExecution),
) -> AgentExecution {
    f(&mut execution);
    execution.stats = ExecutionStats::sum(
        execution
            .state
            .values()
            .filter_map(|node| node.stats.as_ref()),
    );
    if execution.started_at.is_none() {
        execution.started_at = Some(at);
    }
    execution.updated_at = at;
    if execution.status.is_terminal() && execution.finished_at.is_none() {
        execution.finished_at = Some(at);
    }
    execution
}

fn update_node(
    execution: AgentExecution,
    at: DateTime<Utc>,
    node_id: &NodeId,
    seed: fn(DateTime<Utc>) -> NodeExecutionState,
    f: impl FnOnce(&mut NodeExecutionState),
) -> AgentExecution {
    update(execution, at, |execution| {
        let node = execution
            .state
            .entry(node_id.clone())
            .or_insert_with(|| seed(at));
        f(node);
        node.updated_at = at;
    })
}

fn update_node_output(
    execution: AgentExecution,
    at: DateTime<Utc>,
    node_id: &NodeId,
    output: &str,
    f: impl FnOnce(&mut OutputState),
) -> AgentExecution {
    // Node defaults differ here: an output event for an unseen node implies
    // the node is already running, while a node-level event seeds pending.
    update_node(
        execution,
        at,
        node_id,
        NodeExecutionState::seed_running,
        |node| {
            let slot = node
                .outputs
                .entry(output.to_owned())
                .or_insert_with(OutputState::pending);
            f(slot);
        },
    )
}

fn update_agent_output(
    execution: AgentExecution,
    at: DateTime<Utc>,
    output: &str,
    f: impl FnOnce(Option<&Value>) -> Value,
) -> AgentExecution {
    update(execution, at, |execution| {
        let next = f(execution.outputs.get(output));
        execution.outputs.insert(output.to_owned(), next);
    })
}

/// Replace-or-append rule shared by agent outputs and node output slots.
///
/// Append concatenates onto the current string value; a missing or
/// non-string current value contributes an empty base. A non-string incoming
/// value is appended as its compact JSON rendering.
fn next_value(current: Option<&Value>, incoming: &Value, append: Option<bool>) -> Value {
    if append != Some(true) {
        return incoming.clone();
    }
    let mut text = current
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    match incoming {
        Value::String(chunk) => text.push_str(chunk),
        other => text.push_str(&other.to_string()),
    }
    Value::String(text)
}
