//! # weft-replay — deterministic execution snapshot folding
//!
//! Folds ordered `ExecutionEvent` streams from `weft-protocol` into
//! materialized `AgentExecution` snapshots.
//!
//! The engine is a pure, synchronous function of its inputs: no wall-clock
//! reads, no shared state. The same initial snapshot and the same ordered
//! event list always produce a bit-identical result, which is what makes
//! client-side caching, reconnect resumption, and fixture-driven tests
//! possible.
//!
//! - [`apply_events`] / [`apply_event`] — the batch and single-event folds
//! - [`ExecutionStream`] — incremental accumulation for live transports

pub mod apply;
pub mod stream;

pub use apply::{apply_event, apply_events};
pub use stream::ExecutionStream;
