//! # weft-wire — compact execution event encoding
//!
//! The service streams execution events in two interchangeable forms: the
//! verbose tagged-object form (`weft-protocol`'s serde derives) and the
//! compact "mini" form defined here, which drops field names in favor of
//! positional tuples and replaces string enums with integer codes. The mini
//! form exists purely to shrink high-frequency streams; both decode to the
//! same [`ExecutionEvent`](weft_protocol::ExecutionEvent).
//!
//! - [`encode_event`] / [`decode_event`] — the tuple codec
//! - [`codes`] — the integer code tables
//! - [`WireError`] — fail-fast decode errors

pub mod codes;
pub mod error;
pub mod mini;

pub use error::WireError;
pub use mini::{decode_event, encode_event};
