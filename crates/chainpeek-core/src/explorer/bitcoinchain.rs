use std::sync::Arc;

use async_trait::async_trait;
use bitcoin::{Amount, BlockHash};
use serde::Deserialize;
use tracing::info;

use crate::error::CoreError;
use crate::fetch::{get_json, Fetcher};
use crate::types::{BlockSummary, OutputSummary, TransactionSummary, UnspentOutput};

use super::parsing::{is_truthy, normalize_next_hash, parse_block_hash, parse_txid};
use super::{not_supported, parse_base_url, Backend, Explorer};

pub(super) const DEFAULT_BASE_URL: &str = "https://api-r.bitcoinchain.com/v1";

// ==============================================================================
// BitcoinchainClient
// ==============================================================================

/// Adapter for the Bitcoinchain explorer API.
///
/// Offers balances, the chain tip and block detail. Pricing, fee estimation,
/// UTXO listing and broadcast are not exposed by this service.
pub struct BitcoinchainClient {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl BitcoinchainClient {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    pub fn with_base_url(fetcher: Arc<dyn Fetcher>, base_url: &str) -> Result<Self, CoreError> {
        Ok(Self {
            fetcher,
            base_url: parse_base_url(base_url)?,
        })
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        let url = format!("{}/{}", self.base_url, path);
        get_json(self.fetcher.as_ref(), &url).await
    }
}

#[async_trait]
impl Explorer for BitcoinchainClient {
    fn backend(&self) -> Backend {
        Backend::Bitcoinchain
    }

    async fn price(&self, _currency: &str) -> Result<f64, CoreError> {
        not_supported(self.backend(), "price", "no pricing feed")
    }

    async fn balance(&self, address: &str) -> Result<Amount, CoreError> {
        let records: Vec<AddressRecord> = self.fetch(&format!("address/{address}")).await?;
        let balance = records
            .first()
            .map_or(Amount::ZERO, |record| Amount::from_sat(record.balance));
        info!(backend = %self.backend(), %address, balance = balance.to_sat(), "balance");
        Ok(balance)
    }

    async fn fees(&self) -> Result<u64, CoreError> {
        not_supported(self.backend(), "fees", "no fee estimation endpoint")
    }

    async fn latest(&self) -> Result<BlockHash, CoreError> {
        let status: StatusRecord = self.fetch("status").await?;
        parse_block_hash(&status.hash, "status.hash")
    }

    async fn utxos(&self, _sources: &[String]) -> Result<Vec<UnspentOutput>, CoreError> {
        not_supported(self.backend(), "utxos", "no per-address unspent listing")
    }

    async fn push(&self, _raw_tx_hex: &str) -> Result<(), CoreError> {
        not_supported(self.backend(), "push", "no broadcast endpoint")
    }

    async fn block(&self, hash: &BlockHash) -> Result<BlockSummary, CoreError> {
        let headers: Vec<BlockHeaderRecord> = self.fetch(&format!("block/{hash}")).await?;
        let header = headers
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound(format!("block {hash}")))?;

        let pages: Vec<BlockTxsRecord> = self.fetch(&format!("block/txs/{hash}")).await?;
        let transactions = pages
            .into_iter()
            .next()
            .map(|page| page.txs)
            .unwrap_or_default()
            .into_iter()
            .map(summarize_tx)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BlockSummary {
            hash: parse_block_hash(&header.hash, "block.hash")?,
            orphan: !header.is_main,
            next: normalize_next_hash(header.next_block.as_deref())?,
            prev: parse_block_hash(&header.prev_block, "block.prev_block")?,
            transactions,
        })
    }
}

/// Keeps only outputs whose `spent` field is truthy. This is the opposite
/// polarity of Btc.com's `spent_by_tx` filter; it mirrors the service's
/// field as-is until confirmed against the live API. Outputs without a
/// receiver (OP_RETURN) get an empty address.
fn summarize_tx(tx: TxRecord) -> Result<TransactionSummary, CoreError> {
    Ok(TransactionSummary {
        hash: parse_txid(&tx.self_hash, "tx.self_hash")?,
        outputs: tx
            .outputs
            .into_iter()
            .filter(|output| output.spent.as_ref().is_some_and(is_truthy))
            .map(|output| OutputSummary {
                address: output.receiver.unwrap_or_default(),
                value: Amount::from_sat(output.value),
            })
            .collect(),
    })
}

// ==============================================================================
// Response Models
// ==============================================================================

#[derive(Deserialize)]
struct AddressRecord {
    balance: u64,
}

#[derive(Deserialize)]
struct StatusRecord {
    hash: String,
}

#[derive(Deserialize)]
struct BlockHeaderRecord {
    hash: String,
    is_main: bool,
    #[serde(default)]
    next_block: Option<String>,
    prev_block: String,
}

#[derive(Deserialize)]
struct BlockTxsRecord {
    #[serde(default)]
    txs: Vec<TxRecord>,
}

#[derive(Deserialize)]
struct TxRecord {
    self_hash: String,
    #[serde(default)]
    outputs: Vec<OutputRecord>,
}

#[derive(Deserialize)]
struct OutputRecord {
    #[serde(default)]
    receiver: Option<String>,
    value: u64,
    #[serde(default)]
    spent: Option<serde_json::Value>,
}
