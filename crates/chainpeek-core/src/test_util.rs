//! Shared test helpers for `chainpeek-core` unit tests.
//!
//! Deterministic hash strings plus JSON fixture builders for the Btc.com
//! response envelope, so adapter tests across modules build canned bodies
//! the same way.

use bitcoin::{BlockHash, Txid};

// ==============================================================================
// Hash Helpers
// ==============================================================================

/// A 64-hex-digit hash string distinguished by its first byte. Never the
/// all-zero sentinel.
pub fn hash_hex(b: u8) -> String {
    format!("{b:02x}{}", "ab".repeat(31))
}

pub fn block_hash(b: u8) -> BlockHash {
    hash_hex(b).parse().expect("static block hash must parse")
}

pub fn txid(b: u8) -> Txid {
    hash_hex(b).parse().expect("static txid must parse")
}

pub fn sentinel() -> String {
    "0".repeat(64)
}

/// The 66-character spelling some responses use for "no next block".
pub fn long_sentinel() -> String {
    "0".repeat(66)
}

// ==============================================================================
// Btc.com Envelopes
// ==============================================================================

pub fn btccom_ok(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "err_no": 0, "err_msg": null, "data": data })
}

pub fn btccom_not_found() -> serde_json::Value {
    serde_json::json!({ "err_no": 1, "err_msg": "Resource Not Found", "data": null })
}

/// A Btc.com paged-transaction entry with one output per `(address, value,
/// spent_by_tx)` triple.
pub fn btccom_block_tx(
    hash: &str,
    outputs: &[(&str, u64, serde_json::Value)],
) -> serde_json::Value {
    let outputs: Vec<_> = outputs
        .iter()
        .map(|(address, value, spent_by_tx)| {
            serde_json::json!({
                "addresses": [address],
                "value": value,
                "spent_by_tx": spent_by_tx,
            })
        })
        .collect();
    serde_json::json!({ "hash": hash, "outputs": outputs })
}
