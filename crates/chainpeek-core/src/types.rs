//! Output records shared by every explorer backend.
//!
//! Each adapter reshapes its backend's JSON into these types so callers can
//! swap backends without touching the consuming code.

use bitcoin::{Amount, BlockHash, ScriptBuf, Txid};
use serde::{Deserialize, Serialize};

// ==============================================================================
// Blocks
// ==============================================================================

/// A block as reported by an explorer, reduced to the fields callers need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub hash: BlockHash,
    /// `true` when the block is not on the main chain.
    pub orphan: bool,
    /// `None` at the chain tip. Never carries the all-zero sentinel.
    pub next: Option<BlockHash>,
    pub prev: BlockHash,
    pub transactions: Vec<TransactionSummary>,
}

/// A transaction inside a [`BlockSummary`], holding only the outputs kept by
/// the backend's spent-state filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: Txid,
    pub outputs: Vec<OutputSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSummary {
    pub address: String,
    pub value: Amount,
}

// ==============================================================================
// Unspent Outputs
// ==============================================================================

/// A spendable output, with everything needed to fund a new transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub value: Amount,
    pub txid: Txid,
    pub vout: u32,
    pub confirmations: u64,
    pub script: ScriptBuf,
}
