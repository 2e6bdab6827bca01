use std::sync::Arc;

use async_trait::async_trait;
use bitcoin::{Amount, BlockHash};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::fetch::{get_json, Fetcher};
use crate::types::{BlockSummary, OutputSummary, TransactionSummary, UnspentOutput};

use super::parsing::{is_truthy, normalize_next_hash, parse_block_hash, parse_txid, script_from_hex};
use super::{not_supported, parse_base_url, Backend, Explorer};

pub(super) const DEFAULT_BASE_URL: &str = "https://chain.api.btc.com/v3";

/// Transactions requested per page when listing a block's transactions.
const PAGE_SIZE: usize = 50;

/// `err_no` the service uses for an unknown address, block or transaction.
const ERR_NOT_FOUND: i64 = 1;

// ==============================================================================
// BtcComClient
// ==============================================================================

/// Adapter for the Btc.com explorer API.
///
/// Every response arrives wrapped in an `{err_no, err_msg, data}` envelope;
/// `err_no == 1` (or a null `data`) means the requested object is unknown.
pub struct BtcComClient {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl BtcComClient {
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

    /// Hash of the block following `hash`, or `None` at the tip.
    pub async fn next_of(&self, hash: &BlockHash) -> Result<Option<BlockHash>, CoreError> {
        let block = self.block_detail(hash).await?;
        let next = normalize_next_hash(block.next_block_hash.as_deref())?;
        info!(%hash, next = ?next.map(|h| h.to_string()), "next block");
        Ok(next)
    }

    pub async fn height(&self, hash: &BlockHash) -> Result<u64, CoreError> {
        let block = self.block_detail(hash).await?;
        info!(%hash, height = block.height, "block height");
        Ok(block.height)
    }

    /// GET `path` and unwrap the response envelope. `Ok(None)` when the
    /// service reports the object as unknown.
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CoreError> {
        let url = format!("{}/{}", self.base_url, path);
        let envelope: Envelope<T> = get_json(self.fetcher.as_ref(), &url).await?;
        envelope.into_data(&url)
    }

    async fn block_detail(&self, hash: &BlockHash) -> Result<BlockRecord, CoreError> {
        self.fetch(&format!("block/{hash}"))
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("block {hash}")))
    }

    async fn unspent(&self, address: &str) -> Result<Option<Vec<UnspentRecord>>, CoreError> {
        let listing: Option<UnspentListing> =
            self.fetch(&format!("address/{address}/unspent")).await?;
        Ok(listing.map(|listing| listing.list))
    }

    /// Page through `block/{hash}/tx`, keeping only outputs with no spending
    /// transaction. Stops at the first page shorter than [`PAGE_SIZE`], so a
    /// block holding an exact multiple of the page size costs one extra,
    /// empty request.
    async fn block_transactions(
        &self,
        hash: &BlockHash,
    ) -> Result<Vec<TransactionSummary>, CoreError> {
        let mut transactions = Vec::new();
        let mut page: u32 = 1;
        loop {
            let path = format!("block/{hash}/tx?page={page}&pagesize={PAGE_SIZE}");
            let batch = self
                .fetch::<TxPage>(&path)
                .await?
                .map(|p| p.list)
                .unwrap_or_default();
            let fetched = batch.len();
            debug!(%hash, page, fetched, "block transaction page");

            for tx in batch {
                transactions.push(summarize_unspent_outputs(tx)?);
            }

            if fetched < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(transactions)
    }
}

#[async_trait]
impl Explorer for BtcComClient {
    fn backend(&self) -> Backend {
        Backend::BtcCom
    }

    async fn price(&self, _currency: &str) -> Result<f64, CoreError> {
        not_supported(self.backend(), "price", "btc.com exposes no price ticker")
    }

    async fn balance(&self, address: &str) -> Result<Amount, CoreError> {
        let Some(entries) = self.unspent(address).await? else {
            info!(%address, "address unknown to btc.com; balance is zero");
            return Ok(Amount::ZERO);
        };

        let balance = entries
            .iter()
            .map(|entry| Amount::from_sat(entry.value))
            .try_fold(Amount::ZERO, |acc, value| acc.checked_add(value))
            .ok_or_else(|| {
                CoreError::InvalidResponse(format!("unspent total for {address} overflows"))
            })?;
        info!(backend = %self.backend(), %address, balance = balance.to_sat(), "balance");
        Ok(balance)
    }

    async fn fees(&self) -> Result<u64, CoreError> {
        not_supported(self.backend(), "fees", "btc.com exposes no fee estimate")
    }

    async fn latest(&self) -> Result<BlockHash, CoreError> {
        let block: BlockRecord = self
            .fetch("block/latest")
            .await?
            .ok_or_else(|| CoreError::NotFound("latest block".to_owned()))?;
        let hash = parse_block_hash(&block.hash, "block.hash")?;
        info!(%hash, height = block.height, "latest block");
        Ok(hash)
    }

    async fn utxos(&self, sources: &[String]) -> Result<Vec<UnspentOutput>, CoreError> {
        let mut utxos = Vec::new();
        for address in sources {
            let Some(entries) = self.unspent(address).await? else {
                debug!(%address, "address unknown to btc.com; no unspent outputs");
                continue;
            };

            for entry in entries {
                let tx: TxDetail = self
                    .fetch(&format!("tx/{}?verbose=3", entry.tx_hash))
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("transaction {}", entry.tx_hash)))?;
                let txid = parse_txid(&tx.hash, "tx.hash")?;

                for (vout, output) in tx.outputs.iter().enumerate() {
                    if !output.addresses.iter().any(|a| a == address) {
                        continue;
                    }
                    let vout = u32::try_from(vout).map_err(|_| {
                        CoreError::InvalidResponse(format!("output index {vout} out of range"))
                    })?;
                    utxos.push(UnspentOutput {
                        value: Amount::from_sat(output.value),
                        txid,
                        vout,
                        confirmations: entry.confirmations,
                        script: script_from_hex(&output.script_hex)?,
                    });
                }
            }
        }
        debug!(addresses = sources.len(), utxos = utxos.len(), "collected unspent outputs");
        Ok(utxos)
    }

    async fn push(&self, _raw_tx_hex: &str) -> Result<(), CoreError> {
        not_supported(self.backend(), "push", "btc.com's public API is read-only")
    }

    async fn block(&self, hash: &BlockHash) -> Result<BlockSummary, CoreError> {
        let block = self.block_detail(hash).await?;
        let next = normalize_next_hash(block.next_block_hash.as_deref())?;
        let transactions = self.block_transactions(hash).await?;

        Ok(BlockSummary {
            hash: parse_block_hash(&block.hash, "block.hash")?,
            orphan: block.is_orphan,
            next,
            prev: parse_block_hash(&block.prev_block_hash, "block.prev_block_hash")?,
            transactions,
        })
    }
}

fn summarize_unspent_outputs(tx: PagedTx) -> Result<TransactionSummary, CoreError> {
    Ok(TransactionSummary {
        hash: parse_txid(&tx.hash, "tx.hash")?,
        outputs: tx
            .outputs
            .into_iter()
            .filter(|output| !output.spent_by_tx.as_ref().is_some_and(is_truthy))
            .map(|output| OutputSummary {
                address: output.addresses.into_iter().next().unwrap_or_default(),
                value: Amount::from_sat(output.value),
            })
            .collect(),
    })
}

// ==============================================================================
// Response Models
// ==============================================================================

#[derive(Deserialize)]
struct Envelope<T> {
    err_no: i64,
    #[serde(default)]
    err_msg: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self, url: &str) -> Result<Option<T>, CoreError> {
        match self.err_no {
            0 => Ok(self.data),
            ERR_NOT_FOUND => Ok(None),
            code => Err(CoreError::InvalidResponse(format!(
                "btc.com error {code} for {url}: {}",
                self.err_msg.as_deref().unwrap_or("no message")
            ))),
        }
    }
}

#[derive(Deserialize)]
struct UnspentListing {
    #[serde(default)]
    list: Vec<UnspentRecord>,
}

#[derive(Deserialize)]
struct UnspentRecord {
    tx_hash: String,
    value: u64,
    #[serde(default)]
    confirmations: u64,
}

#[derive(Deserialize)]
struct BlockRecord {
    hash: String,
    height: u64,
    prev_block_hash: String,
    #[serde(default)]
    next_block_hash: Option<String>,
    #[serde(default)]
    is_orphan: bool,
}

#[derive(Deserialize)]
struct TxPage {
    #[serde(default)]
    list: Vec<PagedTx>,
}

#[derive(Deserialize)]
struct PagedTx {
    hash: String,
    #[serde(default)]
    outputs: Vec<PagedOutput>,
}

#[derive(Deserialize)]
struct PagedOutput {
    #[serde(default)]
    addresses: Vec<String>,
    value: u64,
    #[serde(default)]
    spent_by_tx: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct TxDetail {
    hash: String,
    #[serde(default)]
    outputs: Vec<TxDetailOutput>,
}

#[derive(Deserialize)]
struct TxDetailOutput {
    #[serde(default)]
    addresses: Vec<String>,
    value: u64,
    script_hex: String,
}
