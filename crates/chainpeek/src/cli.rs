use bitcoin::BlockHash;
use chainpeek_core::Backend;
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};

/// chainpeek — query Bitcoin block explorers through one uniform interface.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Explorer backend to query.
    #[arg(
        long,
        default_value = "btccom",
        env = "CHAINPEEK_BACKEND",
        value_parser = PossibleValuesParser::new(["bitcoinchain", "btccom"])
            .try_map(|name| name.parse::<Backend>()),
    )]
    pub backend: Backend,

    /// Override the backend's API base URL (for mirrors or local testing).
    #[arg(long, env = "CHAINPEEK_BASE_URL")]
    pub base_url: Option<String>,

    /// Log request URLs without contacting the explorer.
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum outbound requests per second (unlimited if omitted).
    #[arg(long, env = "CHAINPEEK_REQUESTS_PER_SECOND")]
    pub requests_per_second: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Confirmed balance of an address, in satoshi.
    Balance { address: String },

    /// Hash of the current chain tip.
    Latest,

    /// Block summary with its unspent outputs.
    Block { hash: BlockHash },

    /// Unspent outputs across one or more addresses.
    Utxos { addresses: Vec<String> },

    /// Recommended fee rate in sat/byte.
    Fees,

    /// Price of one BTC in the given currency.
    Price { currency: String },

    /// Broadcast a signed, hex-encoded transaction.
    Push { raw_tx_hex: String },

    /// Height of a block (btccom only).
    Height { hash: BlockHash },

    /// Hash of the block after the given one (btccom only).
    Next { hash: BlockHash },
}
