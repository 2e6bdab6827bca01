use bitcoin::{BlockHash, ScriptBuf, Txid};

use crate::error::CoreError;

/// `true` for the all-zero hash explorers use to mean "no block".
///
/// Accepts any length (64 hex digits, `0x`-prefixed, or empty) since
/// backends disagree on how they spell it.
pub fn is_sentinel_hash(s: &str) -> bool {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    digits.bytes().all(|b| b == b'0')
}

/// Normalize a "next block" field: missing, null, or sentinel become `None`.
pub(crate) fn normalize_next_hash(raw: Option<&str>) -> Result<Option<BlockHash>, CoreError> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some(s) if is_sentinel_hash(s) => Ok(None),
        Some(s) => parse_block_hash(s, "next block hash").map(Some),
    }
}

pub(crate) fn parse_block_hash(value: &str, field: &str) -> Result<BlockHash, CoreError> {
    value
        .parse()
        .map_err(|e| CoreError::InvalidResponse(format!("invalid {field} `{value}`: {e}")))
}

pub(crate) fn parse_txid(value: &str, field: &str) -> Result<Txid, CoreError> {
    value
        .parse()
        .map_err(|e| CoreError::InvalidResponse(format!("invalid {field} `{value}`: {e}")))
}

pub(crate) fn script_from_hex(hex_str: &str) -> Result<ScriptBuf, CoreError> {
    ScriptBuf::from_hex(hex_str)
        .map_err(|e| CoreError::InvalidResponse(format!("invalid output script hex: {e}")))
}

/// JSON truthiness: null, `false`, zero, and empty strings/arrays/objects
/// are falsy; everything else is truthy.
pub(crate) fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}
