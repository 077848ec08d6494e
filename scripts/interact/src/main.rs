//! Walks an EcoNFT collection through mints, transfers and approvals, either
//! on a JSON-RPC node or on an in-process devnet.

use alloy::primitives::Address;
use clap::Parser;
use econft_client::{Account, Erc721Client, RpcRemote, DEFAULT_CONFIRMATIONS};
use econft_devnet::Devnet;
use eyre::{eyre, ContextCompat};
use log::info;

mod interact;

#[derive(Debug, Parser)]
#[command(name = "econft-interact")]
#[command(about = "Exercise an EcoNFT collection", long_about = None)]
#[command(version)]
struct Args {
    /// JSON-RPC endpoint. Runs against an in-process devnet when omitted.
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,
    /// Address of a deployed collection. Required with `--rpc-url`.
    #[arg(long = "contract", env = "CONTRACT_ADDRESS")]
    contract: Option<Address>,
    /// Private key of the collection owner.
    #[arg(long, env = "OWNER_PRIVATE_KEY", hide_env_values = true)]
    owner_key: Option<String>,
    /// Private key of the collector.
    #[arg(long, env = "COLLECTOR_PRIVATE_KEY", hide_env_values = true)]
    collector_key: Option<String>,
    /// First token id to mint.
    #[arg(long, default_value_t = 91)]
    first_token: u64,
    /// Last token id to mint, inclusive.
    #[arg(long, default_value_t = 100)]
    last_token: u64,
    /// Blocks to wait for before a transaction counts as confirmed.
    #[arg(long, default_value_t = DEFAULT_CONFIRMATIONS)]
    confirmations: u64,
    /// Whether to print debug info.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    let log_level =
        if args.verbose { log::Level::Debug } else { log::Level::Info };
    simple_logger::init_with_level(log_level)?;

    if args.first_token > args.last_token {
        return Err(eyre!(
            "empty token range {}..={}",
            args.first_token,
            args.last_token
        ));
    }
    let tokens = args.first_token..=args.last_token;

    match &args.rpc_url {
        Some(url) => {
            let remote =
                RpcRemote::connect(url)?.with_confirmations(args.confirmations);
            let address =
                args.contract.context("--contract is required with --rpc-url")?;
            let owner = key(args.owner_key.as_deref(), "--owner-key")?;
            let collector =
                key(args.collector_key.as_deref(), "--collector-key")?;

            info!("Using collection {address} on {url}");
            let nft = Erc721Client::new(remote, address, owner);
            interact::run(&nft, collector, tokens).await
        }
        None => {
            let devnet = Devnet::new();
            let owner = devnet.accounts().first().context("no dev accounts")?;
            let collector =
                devnet.accounts().get(3).context("too few dev accounts")?;
            let address =
                devnet.deploy_econft(owner, "EcoNFT", "ECO").await?;

            info!("Deployed collection {address} on a devnet");
            let nft = Erc721Client::new(devnet.clone(), address, owner.clone());
            interact::run(&nft, collector.clone(), tokens).await
        }
    }
}

fn key(key: Option<&str>, flag: &str) -> eyre::Result<Account> {
    let key =
        key.with_context(|| format!("{flag} is required with --rpc-url"))?;
    Ok(Account::from_private_key(key)?)
}
