use std::ops::RangeInclusive;

use alloy::primitives::Address;
use econft_client::{Account, Erc721Client, Remote, TokenId};
use log::info;

/// Mint `tokens` to the owner, move the first one to the collector and back,
/// then let the collector take every token as an operator.
pub(crate) async fn run<R: Remote>(
    nft: &Erc721Client<R>,
    collector: Account,
    tokens: RangeInclusive<u64>,
) -> eyre::Result<()> {
    let owner = nft.account().address();
    let as_collector = nft.connect(collector);
    let collector = as_collector.account().address();

    info!("Querying NFT collection name...");
    let name = nft.name().await?;
    info!("Token Collection Name: {name}");

    info!("Querying NFT collection symbol...");
    let symbol = nft.symbol().await?;
    info!("Token Collection Symbol: {symbol}");

    info!("Minting new NFTs from the collection to the owner...");
    let mut minted = Vec::new();
    for token_id in tokens.map(TokenId::from) {
        // Confirm each mint before the next one.
        nft.mint(owner, token_id).await?.watch().await?;
        minted.push(token_id);
    }
    let ids: Vec<_> = minted.iter().map(ToString::to_string).collect();
    info!("{symbol} NFTs {} minted to {owner}", ids.join(", "));

    balances(nft, &symbol, owner, collector).await?;

    let token_id =
        *minted.first().ok_or_else(|| eyre::eyre!("nothing minted"))?;
    info!("Owner of {symbol}#{token_id}: {}", nft.owner_of(token_id).await?);

    info!("Transferring {symbol}#{token_id} from {owner} to {collector}...");
    nft.transfer(owner, collector, token_id).await?.watch().await?;
    info!("Owner of {symbol}#{token_id}: {}", nft.owner_of(token_id).await?);
    balances(nft, &symbol, owner, collector).await?;

    info!("Approving {owner} to spend {symbol}#{token_id} of {collector}...");
    as_collector.approve(owner, token_id).await?.watch().await?;
    match nft.get_approved(token_id).await? {
        Some(spender) => {
            info!("{spender} has the approval to spend {symbol}#{token_id}");
        }
        None => info!("Nobody may spend {symbol}#{token_id}"),
    }

    info!("Transferring {symbol}#{token_id} from {collector} to {owner}...");
    nft.transfer(collector, owner, token_id).await?.watch().await?;
    info!("Owner of {symbol}#{token_id}: {}", nft.owner_of(token_id).await?);
    balances(nft, &symbol, owner, collector).await?;

    info!("Approving {collector} to spend all {symbol} NFTs of {owner}...");
    nft.set_approval_for_all(collector, true).await?.watch().await?;
    let approved = nft.is_approved_for_all(owner, collector).await?;
    info!("Is {collector} approved for all NFTs of {owner}: {approved}");

    info!("Collector transferring all NFTs of the owner to itself...");
    for &token_id in &minted {
        as_collector
            .transfer(owner, collector, token_id)
            .await?
            .watch()
            .await?;
    }
    info!("NFT transfer completed");
    balances(nft, &symbol, owner, collector).await
}

async fn balances<R: Remote>(
    nft: &Erc721Client<R>,
    symbol: &str,
    owner: Address,
    collector: Address,
) -> eyre::Result<()> {
    for account in [owner, collector] {
        let balance = nft.balance_of(account).await?;
        info!("{account} has {balance} NFTs from this {symbol} collection");
    }
    Ok(())
}
