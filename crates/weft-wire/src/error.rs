use thiserror::Error;

/// Decode failures for the mini tuple encoding.
///
/// Decoding is fail-fast: any unknown code or malformed field aborts the
/// whole event, so the fold engine never sees a partially decoded value.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("mini event tuple too short ({len} elements, need at least 3)")]
    TooShort { len: usize },

    #[error("unknown mini op code {0:#04x}")]
    UnknownOp(u64),

    #[error("unknown mini {kind} code {code:#04x}")]
    UnknownCode { kind: &'static str, code: u64 },

    #[error("mini field {index} ({name}): expected {expected}")]
    Field {
        index: usize,
        name: &'static str,
        expected: &'static str,
    },

    #[error("unparseable createdAt timestamp {0:?}")]
    Timestamp(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
