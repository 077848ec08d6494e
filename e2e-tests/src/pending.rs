use std::time::Duration;

use econft_client::{ErrorKind, TokenId, TxState};
use econft_devnet::DevnetConfig;

use crate::context::Context;

/// A context whose later transactions wait in the mempool until mined.
async fn manual_mining(confirm_timeout: Duration) -> eyre::Result<Context> {
    let config = DevnetConfig { confirm_timeout, ..Default::default() };
    let ctx = Context::with_config(config).await?;
    ctx.devnet.set_automine(false).await;
    Ok(ctx)
}

#[tokio::test]
async fn stays_submitted_until_mined() -> eyre::Result<()> {
    let ctx = manual_mining(Duration::from_millis(50)).await?;
    let token_id = ctx.initial_mint[0];

    let mut pending = ctx
        .owner
        .transfer(ctx.owner_address(), ctx.collector_address(), token_id)
        .await?;
    assert_eq!(pending.state(), &TxState::Submitted);
    assert_eq!(pending.method(), "safeTransferFrom(address,address,uint256)");
    assert_eq!(
        ctx.devnet.pending_transactions().await,
        vec![pending.tx_hash()]
    );

    // Not durable yet.
    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.owner_address());

    let err = pending.confirm().await.expect_err("nothing was mined");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(pending.state(), &TxState::Submitted);

    let block = ctx.devnet.mine().await;
    let receipt = pending.confirm().await?;
    assert_eq!(receipt.block_number, block);
    assert_eq!(pending.state(), &TxState::Confirmed(receipt));
    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.collector_address());
    Ok(())
}

#[tokio::test]
async fn confirms_once_mined_concurrently() -> eyre::Result<()> {
    let ctx = manual_mining(Duration::from_secs(5)).await?;
    let token_id = TokenId::from(4u64);

    let pending = ctx.owner.mint(ctx.collector_address(), token_id).await?;
    let (receipt, block) =
        tokio::join!(pending.watch(), async { ctx.devnet.mine().await });

    assert_eq!(receipt?.block_number, block);
    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.collector_address());
    Ok(())
}

#[tokio::test]
async fn fails_when_reverted_at_inclusion() -> eyre::Result<()> {
    let ctx = manual_mining(Duration::from_secs(5)).await?;
    let token_id = ctx.initial_mint[0];

    // Both are valid against the latest block, only the first one can be
    // executed once mined.
    let mut first = ctx
        .owner
        .transfer(ctx.owner_address(), ctx.collector_address(), token_id)
        .await?;
    let mut second = ctx
        .owner
        .transfer(ctx.owner_address(), ctx.collector_address(), token_id)
        .await?;
    assert_ne!(first.tx_hash(), second.tx_hash());
    ctx.devnet.mine().await;

    first.confirm().await?;
    let err = second.confirm().await.expect_err("owner changed");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(err.to_string().contains("is not approved for token"));
    assert_eq!(second.state(), &TxState::Failed(err.clone()));

    // Terminal states are final.
    let again = second.confirm().await.expect_err("still failed");
    assert_eq!(again, err);
    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.collector_address());
    Ok(())
}

#[tokio::test]
async fn rejects_writes_depending_on_unconfirmed_ones() -> eyre::Result<()> {
    let ctx = manual_mining(Duration::from_secs(5)).await?;
    let token_id = TokenId::from(4u64);

    let mint = ctx.owner.mint(ctx.owner_address(), token_id).await?;
    let err = ctx
        .owner
        .transfer(ctx.owner_address(), ctx.collector_address(), token_id)
        .await
        .expect_err("the mint is not confirmed yet");
    assert_eq!(err.kind(), ErrorKind::UnknownToken);
    assert_eq!(ctx.devnet.pending_transactions().await, vec![mint.tx_hash()]);

    ctx.devnet.mine().await;
    mint.watch().await?;

    let transfer = ctx
        .owner
        .transfer(ctx.owner_address(), ctx.collector_address(), token_id)
        .await?;
    let (receipt, _) =
        tokio::join!(transfer.watch(), async { ctx.devnet.mine().await });
    assert!(receipt?.status);
    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.collector_address());
    Ok(())
}

#[tokio::test]
async fn mines_pending_transactions_in_submission_order() -> eyre::Result<()> {
    let ctx = manual_mining(Duration::from_secs(5)).await?;
    let [t1, t2, t3] = ctx.initial_mint[..] else {
        eyre::bail!("unexpected initial mint");
    };

    let mut pending = Vec::new();
    for token_id in [t1, t2, t3] {
        let transfer = ctx.owner.transfer(
            ctx.owner_address(),
            ctx.collector_address(),
            token_id,
        );
        pending.push(transfer.await?);
    }
    let hashes: Vec<_> = pending.iter().map(|p| p.tx_hash()).collect();
    assert_eq!(ctx.devnet.pending_transactions().await, hashes);

    let block = ctx.devnet.mine().await;
    for p in pending {
        assert_eq!(p.watch().await?.block_number, block);
    }
    assert!(ctx.devnet.pending_transactions().await.is_empty());
    Ok(())
}
