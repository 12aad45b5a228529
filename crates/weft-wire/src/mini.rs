//! The mini event codec.
//!
//! A mini event is a positional JSON array
//! `[executionId, createdAt, opCode, ...fields]` with every enum replaced by
//! its integer code from [`crate::codes`]. Optional fields are explicit
//! `null` holes at fixed positions; trailing holes may be absent on decode.
//! `createdAt` is emitted as an RFC 3339 string and accepted as either a
//! string or epoch milliseconds.

use crate::codes;
use crate::error::WireError;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;
use weft_protocol::{ExecutionEvent, ExecutionEventOp, ExecutionId, NodeId};

/// Encode one event as a mini tuple.
///
/// The output always carries the full field list for its op, with `null` in
/// every absent optional slot.
pub fn encode_event(event: &ExecutionEvent) -> Result<Vec<Value>, WireError> {
    let mut tuple = vec![
        event
            .execution_id()
            .map_or(Value::Null, |id| Value::String(id.to_string())),
        Value::String(
            event
                .created_at()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ),
        Value::from(codes::op_code(event.op())),
    ];

    match event {
        ExecutionEvent::Init { execution, .. } => {
            tuple.push(serde_json::to_value(execution)?);
        }
        ExecutionEvent::UpdateStatus {
            status,
            message,
            errors,
            ..
        } => {
            tuple.push(Value::from(codes::execution_status_code(*status)));
            tuple.push(opt_string(message));
            tuple.push(opt_array(errors));
        }
        ExecutionEvent::OutputUpdate {
            output,
            value,
            append,
            ..
        } => {
            tuple.push(Value::String(output.clone()));
            tuple.push(value.clone());
            tuple.push(opt_bool_value(*append));
        }
        ExecutionEvent::NodeUpdateStatus {
            node_id,
            status,
            message,
            errors,
            stats,
            retries,
            ..
        } => {
            tuple.push(node_id_value(node_id));
            tuple.push(Value::from(codes::node_status_code(*status)));
            tuple.push(opt_string(message));
            tuple.push(opt_array(errors));
            tuple.push(match stats {
                Some(stats) => serde_json::to_value(stats)?,
                None => Value::Null,
            });
            tuple.push(retries.map_or(Value::Null, Value::from));
        }
        ExecutionEvent::NodeOutputUpdateStatus {
            node_id,
            output,
            status,
            ..
        } => {
            tuple.push(node_id_value(node_id));
            tuple.push(Value::String(output.clone()));
            tuple.push(Value::from(codes::output_status_code(*status)));
        }
        ExecutionEvent::NodeOutputUpdate {
            node_id,
            output,
            status,
            value,
            append,
            ..
        } => {
            tuple.push(node_id_value(node_id));
            tuple.push(Value::String(output.clone()));
            tuple.push(Value::from(codes::output_status_code(*status)));
            tuple.push(value.clone());
            tuple.push(opt_bool_value(*append));
        }
        ExecutionEvent::NodeOutputSignal {
            node_id,
            output,
            value,
            ..
        } => {
            tuple.push(node_id_value(node_id));
            tuple.push(Value::String(output.clone()));
            tuple.push(value.clone());
        }
        ExecutionEvent::Ping { .. } => {}
        ExecutionEvent::Log {
            level,
            status_text,
            node_id,
            output,
            message,
            data,
            ..
        } => {
            tuple.push(Value::from(codes::log_level_code(*level)));
            tuple.push(status_text.map_or(Value::Null, |action| {
                Value::from(codes::status_text_action_code(action))
            }));
            tuple.push(node_id.as_ref().map_or(Value::Null, node_id_value));
            tuple.push(opt_string(output));
            tuple.push(Value::String(message.clone()));
            // An explicit JSON null payload and an absent one share the
            // null hole; decode normalizes both to `None`.
            tuple.push(data.clone().unwrap_or(Value::Null));
        }
    }

    Ok(tuple)
}

/// Decode one mini tuple back into an event. Fail-fast: the first unknown
/// code or ill-typed field aborts the whole event.
pub fn decode_event(tuple: &[Value]) -> Result<ExecutionEvent, WireError> {
    if tuple.len() < 3 {
        return Err(WireError::TooShort { len: tuple.len() });
    }
    let execution_id = opt_str(tuple, 0, "executionId")?.map(ExecutionId::from);
    let created_at = decode_created_at(tuple)?;
    let op = codes::op_from_code(req_code(tuple, 2, "op")?)?;

    match op {
        ExecutionEventOp::Init => {
            let snapshot = req(tuple, 3, "execution", "object")?;
            let execution = serde_json::from_value(snapshot.clone())?;
            Ok(ExecutionEvent::Init {
                execution_id,
                created_at,
                execution: Box::new(execution),
            })
        }
        ExecutionEventOp::UpdateStatus => Ok(ExecutionEvent::UpdateStatus {
            execution_id,
            created_at,
            status: codes::execution_status_from_code(req_code(tuple, 3, "status")?)?,
            message: opt_str(tuple, 4, "message")?.map(str::to_owned),
            errors: opt_errors(tuple, 5)?,
        }),
        ExecutionEventOp::OutputUpdate => Ok(ExecutionEvent::OutputUpdate {
            execution_id,
            created_at,
            output: req_str(tuple, 3, "output")?.to_owned(),
            value: raw(tuple, 4),
            append: opt_bool(tuple, 5, "append")?,
        }),
        ExecutionEventOp::NodeUpdateStatus => Ok(ExecutionEvent::NodeUpdateStatus {
            execution_id,
            created_at,
            node_id: NodeId::from(req_str(tuple, 3, "nodeId")?),
            status: codes::node_status_from_code(req_code(tuple, 4, "status")?)?,
            message: opt_str(tuple, 5, "message")?.map(str::to_owned),
            errors: opt_errors(tuple, 6)?,
            stats: opt_stats(tuple, 7)?,
            retries: opt_u32(tuple, 8, "retries")?,
        }),
        ExecutionEventOp::NodeOutputUpdateStatus => Ok(ExecutionEvent::NodeOutputUpdateStatus {
            execution_id,
            created_at,
            node_id: NodeId::from(req_str(tuple, 3, "nodeId")?),
            output: req_str(tuple, 4, "output")?.to_owned(),
            status: codes::output_status_from_code(req_code(tuple, 5, "status")?)?,
        }),
        ExecutionEventOp::NodeOutputUpdate => Ok(ExecutionEvent::NodeOutputUpdate {
            execution_id,
            created_at,
            node_id: NodeId::from(req_str(tuple, 3, "nodeId")?),
            output: req_str(tuple, 4, "output")?.to_owned(),
            status: codes::output_status_from_code(req_code(tuple, 5, "status")?)?,
            value: raw(tuple, 6),
            append: opt_bool(tuple, 7, "append")?,
        }),
        ExecutionEventOp::NodeOutputSignal => Ok(ExecutionEvent::NodeOutputSignal {
            execution_id,
            created_at,
            node_id: NodeId::from(req_str(tuple, 3, "nodeId")?),
            output: req_str(tuple, 4, "output")?.to_owned(),
            value: raw(tuple, 5),
        }),
        ExecutionEventOp::Ping => Ok(ExecutionEvent::Ping {
            execution_id,
            created_at,
        }),
        ExecutionEventOp::Log => Ok(ExecutionEvent::Log {
            execution_id,
            created_at,
            level: codes::log_level_from_code(req_code(tuple, 3, "level")?)?,
            status_text: match opt_code(tuple, 4, "statusText")? {
                Some(code) => Some(codes::status_text_action_from_code(code)?),
                None => None,
            },
            node_id: opt_str(tuple, 5, "nodeId")?.map(NodeId::from),
            output: opt_str(tuple, 6, "output")?.map(str::to_owned),
            message: req_str(tuple, 7, "message")?.to_owned(),
            data: opt(tuple, 8).cloned(),
        }),
    }
}

fn node_id_value(node_id: &NodeId) -> Value {
    Value::String(node_id.as_str().to_owned())
}

fn opt_string(value: &Option<String>) -> Value {
    value
        .as_ref()
        .map_or(Value::Null, |s| Value::String(s.clone()))
}

fn opt_array(value: &Option<Vec<Value>>) -> Value {
    value
        .as_ref()
        .map_or(Value::Null, |items| Value::Array(items.clone()))
}

fn opt_bool_value(value: Option<bool>) -> Value {
    value.map_or(Value::Null, codes::mini_bool_value)
}

/// Absent and `null` slots are equivalent on decode.
fn opt(tuple: &[Value], index: usize) -> Option<&Value> {
    match tuple.get(index) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn raw(tuple: &[Value], index: usize) -> Value {
    tuple.get(index).cloned().unwrap_or(Value::Null)
}

fn req<'a>(
    tuple: &'a [Value],
    index: usize,
    name: &'static str,
    expected: &'static str,
) -> Result<&'a Value, WireError> {
    opt(tuple, index).ok_or(WireError::Field {
        index,
        name,
        expected,
    })
}

fn req_str<'a>(
    tuple: &'a [Value],
    index: usize,
    name: &'static str,
) -> Result<&'a str, WireError> {
    req(tuple, index, name, "string")?
        .as_str()
        .ok_or(WireError::Field {
            index,
            name,
            expected: "string",
        })
}

fn req_code(tuple: &[Value], index: usize, name: &'static str) -> Result<u64, WireError> {
    req(tuple, index, name, "integer code")?
        .as_u64()
        .ok_or(WireError::Field {
            index,
            name,
            expected: "integer code",
        })
}

fn opt_str<'a>(
    tuple: &'a [Value],
    index: usize,
    name: &'static str,
) -> Result<Option<&'a str>, WireError> {
    match opt(tuple, index) {
        None => Ok(None),
        Some(value) => value.as_str().map(Some).ok_or(WireError::Field {
            index,
            name,
            expected: "string",
        }),
    }
}

fn opt_code(
    tuple: &[Value],
    index: usize,
    name: &'static str,
) -> Result<Option<u64>, WireError> {
    match opt(tuple, index) {
        None => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or(WireError::Field {
            index,
            name,
            expected: "integer code",
        }),
    }
}

fn opt_bool(
    tuple: &[Value],
    index: usize,
    name: &'static str,
) -> Result<Option<bool>, WireError> {
    match opt(tuple, index) {
        None => Ok(None),
        Some(value) => codes::mini_bool(value).map(Some).ok_or(WireError::Field {
            index,
            name,
            expected: "boolean or 0/1",
        }),
    }
}

fn opt_u32(
    tuple: &[Value],
    index: usize,
    name: &'static str,
) -> Result<Option<u32>, WireError> {
    match opt(tuple, index) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or(WireError::Field {
                index,
                name,
                expected: "non-negative integer",
            }),
    }
}

fn opt_errors(tuple: &[Value], index: usize) -> Result<Option<Vec<Value>>, WireError> {
    match opt(tuple, index) {
        None => Ok(None),
        Some(value) => value
            .as_array()
            .cloned()
            .map(Some)
            .ok_or(WireError::Field {
                index,
                name: "errors",
                expected: "array",
            }),
    }
}

fn opt_stats(
    tuple: &[Value],
    index: usize,
) -> Result<Option<weft_protocol::ExecutionStats>, WireError> {
    match opt(tuple, index) {
        None => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
    }
}

fn decode_created_at(tuple: &[Value]) -> Result<DateTime<Utc>, WireError> {
    let value = req(tuple, 1, "createdAt", "timestamp")?;
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| WireError::Timestamp(text.clone())),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .ok_or_else(|| WireError::Timestamp(value.to_string())),
        other => Err(WireError::Timestamp(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use weft_protocol::{
        Agent, AgentExecution, ExecutionStatus, LogLevel, LogStatusTextAction,
        NodeExecutionStatus, OutputStateStatus,
    };

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn roundtrip(event: ExecutionEvent) {
        let tuple = encode_event(&event).unwrap();
        let back = decode_event(&tuple).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn init_roundtrip() {
        roundtrip(ExecutionEvent::Init {
            execution_id: Some("execution1".into()),
            created_at: ts(),
            execution: Box::new(AgentExecution::pending(
                "execution1",
                Agent::empty("agent1"),
                ts(),
            )),
        });
    }

    #[test]
    fn update_status_roundtrip() {
        roundtrip(ExecutionEvent::UpdateStatus {
            execution_id: Some("execution1".into()),
            created_at: ts(),
            status: ExecutionStatus::Error,
            message: Some("boom".into()),
            errors: Some(vec![json!({"code": 500})]),
        });
        roundtrip(ExecutionEvent::UpdateStatus {
            execution_id: None,
            created_at: ts(),
            status: ExecutionStatus::Running,
            message: None,
            errors: None,
        });
    }

    #[test]
    fn output_update_roundtrip() {
        roundtrip(ExecutionEvent::OutputUpdate {
            execution_id: None,
            created_at: ts(),
            output: "answer".into(),
            value: json!("chunk"),
            append: Some(true),
        });
        roundtrip(ExecutionEvent::OutputUpdate {
            execution_id: None,
            created_at: ts(),
            output: "answer".into(),
            value: json!({"structured": [1, 2]}),
            append: None,
        });
    }

    #[test]
    fn node_update_status_roundtrip() {
        roundtrip(ExecutionEvent::NodeUpdateStatus {
            execution_id: Some("execution1".into()),
            created_at: ts(),
            node_id: "node1".into(),
            status: NodeExecutionStatus::Retry,
            message: Some("rate limited".into()),
            errors: Some(vec![json!("429")]),
            stats: Some(serde_json::from_value(json!({"cost": 0.5})).unwrap()),
            retries: Some(2),
        });
        roundtrip(ExecutionEvent::NodeUpdateStatus {
            execution_id: None,
            created_at: ts(),
            node_id: "node1".into(),
            status: NodeExecutionStatus::Running,
            message: None,
            errors: None,
            stats: None,
            retries: None,
        });
    }

    #[test]
    fn node_output_events_roundtrip() {
        roundtrip(ExecutionEvent::NodeOutputUpdateStatus {
            execution_id: None,
            created_at: ts(),
            node_id: "node1".into(),
            output: "output1".into(),
            status: OutputStateStatus::Finished,
        });
        roundtrip(ExecutionEvent::NodeOutputUpdate {
            execution_id: None,
            created_at: ts(),
            node_id: "node1".into(),
            output: "output1".into(),
            status: OutputStateStatus::Running,
            value: json!("streamed "),
            append: Some(true),
        });
        roundtrip(ExecutionEvent::NodeOutputSignal {
            execution_id: None,
            created_at: ts(),
            node_id: "node1".into(),
            output: "output1".into(),
            value: json!("interrupt"),
        });
    }

    #[test]
    fn housekeeping_roundtrip() {
        roundtrip(ExecutionEvent::Ping {
            execution_id: Some("execution1".into()),
            created_at: ts(),
        });
        roundtrip(ExecutionEvent::Log {
            execution_id: None,
            created_at: ts(),
            level: LogLevel::Warn,
            status_text: Some(LogStatusTextAction::Clear),
            node_id: Some("node1".into()),
            output: Some("output1".into()),
            message: "retrying".into(),
            data: Some(json!({"attempt": 2})),
        });
        roundtrip(ExecutionEvent::Log {
            execution_id: None,
            created_at: ts(),
            level: LogLevel::Info,
            status_text: None,
            node_id: None,
            output: None,
            message: "hello".into(),
            data: None,
        });
    }

    #[test]
    fn sub_millisecond_timestamps_roundtrip() {
        let precise = Utc.timestamp_opt(1_754_049_600, 123_456_789).unwrap();
        roundtrip(ExecutionEvent::Ping {
            execution_id: None,
            created_at: precise,
        });
        roundtrip(ExecutionEvent::UpdateStatus {
            execution_id: Some("execution1".into()),
            created_at: precise,
            status: ExecutionStatus::Running,
            message: None,
            errors: None,
        });
    }

    #[test]
    fn null_log_data_normalizes_to_absent() {
        let event = ExecutionEvent::Log {
            execution_id: None,
            created_at: ts(),
            level: LogLevel::Debug,
            status_text: None,
            node_id: None,
            output: None,
            message: "noop".into(),
            data: Some(Value::Null),
        };
        let tuple = encode_event(&event).unwrap();
        match decode_event(&tuple).unwrap() {
            ExecutionEvent::Log { data, .. } => assert_eq!(data, None),
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn encoded_tuple_shape() {
        let event = ExecutionEvent::NodeOutputUpdate {
            execution_id: Some("execution1".into()),
            created_at: ts(),
            node_id: "node1".into(),
            output: "output1".into(),
            status: OutputStateStatus::Running,
            value: json!("chunk"),
            append: Some(true),
        };
        let tuple = encode_event(&event).unwrap();
        assert_eq!(tuple[0], json!("execution1"));
        assert_eq!(tuple[2], json!(0x41));
        assert_eq!(tuple[3], json!("node1"));
        assert_eq!(tuple[5], json!(0x20));
        // Booleans go out as 1/0.
        assert_eq!(tuple[7], json!(1));
    }

    #[test]
    fn absent_trailing_optionals_decode() {
        // updateStatus without the message and errors holes.
        let tuple = vec![
            Value::Null,
            json!("2026-08-01T12:00:00Z"),
            json!(0x11),
            json!(0x20),
        ];
        let event = decode_event(&tuple).unwrap();
        assert_eq!(
            event,
            ExecutionEvent::UpdateStatus {
                execution_id: None,
                created_at: ts(),
                status: ExecutionStatus::Running,
                message: None,
                errors: None,
            }
        );
    }

    #[test]
    fn created_at_accepts_epoch_millis() {
        let tuple = vec![
            Value::Null,
            json!(ts().timestamp_millis()),
            json!(0xF0),
        ];
        let event = decode_event(&tuple).unwrap();
        assert_eq!(event.created_at(), ts());
    }

    #[test]
    fn append_accepts_plain_booleans() {
        let tuple = vec![
            Value::Null,
            json!("2026-08-01T12:00:00Z"),
            json!(0x20),
            json!("answer"),
            json!("chunk"),
            json!(true),
        ];
        let event = decode_event(&tuple).unwrap();
        assert!(matches!(
            event,
            ExecutionEvent::OutputUpdate {
                append: Some(true),
                ..
            }
        ));
    }

    #[test]
    fn unknown_op_is_fatal() {
        let tuple = vec![Value::Null, json!("2026-08-01T12:00:00Z"), json!(0x99)];
        assert!(matches!(
            decode_event(&tuple),
            Err(WireError::UnknownOp(0x99))
        ));
    }

    #[test]
    fn short_tuple_is_fatal() {
        assert!(matches!(
            decode_event(&[Value::Null, json!("2026-08-01T12:00:00Z")]),
            Err(WireError::TooShort { len: 2 })
        ));
    }

    #[test]
    fn bad_timestamp_is_fatal() {
        let tuple = vec![Value::Null, json!("yesterday"), json!(0xF0)];
        assert!(matches!(decode_event(&tuple), Err(WireError::Timestamp(_))));
    }

    #[test]
    fn wrong_field_type_is_fatal() {
        // nodeId must be a string.
        let tuple = vec![
            Value::Null,
            json!("2026-08-01T12:00:00Z"),
            json!(0x30),
            json!(42),
            json!(0x30),
        ];
        assert!(matches!(
            decode_event(&tuple),
            Err(WireError::Field { name: "nodeId", .. })
        ));
    }
}
