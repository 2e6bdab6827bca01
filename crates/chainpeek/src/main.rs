mod cli;

use std::sync::Arc;
use std::time::Duration;

use bitcoin::{Amount, BlockHash};
use chainpeek_core::types::{BlockSummary, UnspentOutput};
use chainpeek_core::{
    build_explorer, Backend, BtcComClient, CoreError, FetchError, Fetcher, FetcherConfig,
    HttpFetcher,
};
use clap::Parser;
use eyre::{eyre, WrapErr};
use serde::Serialize;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let fetcher: Arc<dyn Fetcher> = Arc::new(
        HttpFetcher::new(FetcherConfig {
            timeout: Duration::from_secs(args.timeout_secs),
            requests_per_second: args.requests_per_second,
            dry_run: args.dry_run,
            ..FetcherConfig::default()
        })
        .context("configure HTTP fetcher")?,
    );

    tracing::debug!(backend = %args.backend, base_url = ?args.base_url, "starting");

    let output = run(&args, fetcher).await.map_err(|err| {
        eyre!(describe_failure(args.backend, &err))
            .wrap_err(format!("while querying {}", args.backend))
    })?;

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("encode output")?
    );
    Ok(())
}

/// Everything a subcommand can print.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Output {
    Amount(Amount),
    Hash(BlockHash),
    NextHash(Option<BlockHash>),
    Block(BlockSummary),
    Utxos(Vec<UnspentOutput>),
    Count(u64),
    Price(f64),
    Pushed { pushed: bool },
}

/// Run the selected operation against the configured backend.
async fn run(args: &Cli, fetcher: Arc<dyn Fetcher>) -> Result<Output, CoreError> {
    let explorer = build_explorer(args.backend, fetcher.clone(), args.base_url.as_deref())?;

    Ok(match &args.command {
        Command::Balance { address } => Output::Amount(explorer.balance(address).await?),
        Command::Latest => Output::Hash(explorer.latest().await?),
        Command::Block { hash } => Output::Block(explorer.block(hash).await?),
        Command::Utxos { addresses } => Output::Utxos(explorer.utxos(addresses).await?),
        Command::Fees => Output::Count(explorer.fees().await?),
        Command::Price { currency } => Output::Price(explorer.price(currency).await?),
        Command::Push { raw_tx_hex } => {
            explorer.push(raw_tx_hex).await?;
            Output::Pushed { pushed: true }
        }
        Command::Height { hash } => {
            Output::Count(btccom_client(args, fetcher, "height")?.height(hash).await?)
        }
        Command::Next { hash } => {
            Output::NextHash(btccom_client(args, fetcher, "next")?.next_of(hash).await?)
        }
    })
}

/// `height` and `next` are Btc.com extensions outside the shared trait.
fn btccom_client(
    args: &Cli,
    fetcher: Arc<dyn Fetcher>,
    operation: &'static str,
) -> Result<BtcComClient, CoreError> {
    if args.backend != Backend::BtcCom {
        return Err(CoreError::NotSupported {
            backend: args.backend,
            operation,
            reason: "only offered by the btccom backend",
        });
    }
    BtcComClient::with_base_url(
        fetcher,
        args.base_url
            .as_deref()
            .unwrap_or(Backend::BtcCom.default_base_url()),
    )
}

fn describe_failure(backend: Backend, err: &CoreError) -> String {
    let mut lines = vec![err.to_string()];

    match err {
        CoreError::NotSupported { .. } => {
            let others: Vec<String> = Backend::ALL
                .iter()
                .filter(|b| **b != backend)
                .map(ToString::to_string)
                .collect();
            lines.push(format!(
                "hint: this is permanent for {backend}; try --backend {}",
                others.join(" or ")
            ));
        }
        CoreError::Fetch(FetchError::DryRun { .. }) => {
            lines.push("hint: drop --dry-run to contact the explorer".into());
        }
        CoreError::Fetch(FetchError::Status { status: 429, .. }) => {
            lines.push("hint: the explorer is rate limiting; set --requests-per-second".into());
        }
        CoreError::Fetch(FetchError::Transport(_)) => {
            lines.push(
                "hint: request could not be sent; verify network access and --base-url".into(),
            );
        }
        CoreError::Decode { .. } => {
            lines.push(
                "hint: the explorer answered with non-JSON; it may be down or the base URL wrong"
                    .into(),
            );
        }
        _ => {}
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_supported_suggests_the_other_backend() {
        let err = CoreError::NotSupported {
            backend: Backend::Bitcoinchain,
            operation: "fees",
            reason: "no fee estimation endpoint",
        };
        let message = describe_failure(Backend::Bitcoinchain, &err);
        assert!(message.contains("bitcoinchain does not support fees"));
        assert!(message.contains("--backend btccom"));
    }

    #[test]
    fn rate_limit_hint_mentions_flag() {
        let err = CoreError::Fetch(FetchError::Status {
            url: "https://chain.api.btc.com/v3/block/latest".into(),
            status: 429,
        });
        assert!(describe_failure(Backend::BtcCom, &err).contains("--requests-per-second"));
    }

    #[test]
    fn not_found_has_no_hint() {
        let err = CoreError::NotFound("block 00ab".into());
        assert_eq!(describe_failure(Backend::BtcCom, &err), "not found: block 00ab");
    }

    #[tokio::test]
    async fn height_on_bitcoinchain_is_rejected_before_any_request() {
        let hash = "ab".repeat(32);
        let args = Cli::try_parse_from([
            "chainpeek",
            "--backend",
            "bitcoinchain",
            "--dry-run",
            "height",
            hash.as_str(),
        ])
        .expect("must parse");
        let fetcher: Arc<dyn Fetcher> = Arc::new(
            HttpFetcher::new(FetcherConfig {
                dry_run: true,
                ..FetcherConfig::default()
            })
            .expect("valid config"),
        );
        let err = run(&args, fetcher).await.expect_err("must be unsupported");
        assert!(matches!(
            err,
            CoreError::NotSupported {
                operation: "height",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn dry_run_surfaces_as_fetch_error() {
        let args = Cli::try_parse_from(["chainpeek", "--dry-run", "latest"]).expect("must parse");
        let fetcher: Arc<dyn Fetcher> = Arc::new(
            HttpFetcher::new(FetcherConfig {
                dry_run: true,
                ..FetcherConfig::default()
            })
            .expect("valid config"),
        );
        let err = run(&args, fetcher).await.expect_err("dry run never succeeds");
        assert!(matches!(err, CoreError::Fetch(FetchError::DryRun { .. })));
    }
}
