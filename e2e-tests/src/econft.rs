use alloy::primitives::{aliases::B32, Address, U256};
use econft_client::{
    abi::{ERC165_INTERFACE_ID, ERC721_INTERFACE_ID},
    event::{Approval, ApprovalForAll, Transfer},
    Emits, Erc721Event, ErrorKind, TokenId,
};
use futures::future::try_join_all;

use crate::context::{random_token_id, Context, NAME, SYMBOL};

#[tokio::test]
async fn creates_collection_with_name_and_symbol() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    assert_eq!(ctx.owner.name().await?, NAME);
    assert_eq!(ctx.collector.symbol().await?, SYMBOL);
    Ok(())
}

#[tokio::test]
async fn mints_initial_set_to_owner() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    for &token_id in &ctx.initial_mint {
        assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.owner_address());
    }
    Ok(())
}

#[tokio::test]
async fn queries_balances() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let balance = ctx.owner.balance_of(ctx.owner_address()).await?;
    assert_eq!(balance, U256::from(ctx.initial_mint.len()));

    let balance = ctx.owner.balance_of(ctx.collector_address()).await?;
    assert_eq!(balance, U256::ZERO);
    Ok(())
}

#[tokio::test]
async fn mints_to_collector() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = TokenId::from(4u64);
    send!(ctx.owner.mint(ctx.collector_address(), token_id))?;
    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.collector_address());
    assert_eq!(
        ctx.owner.balance_of(ctx.collector_address()).await?,
        U256::from(1)
    );
    Ok(())
}

#[tokio::test]
async fn emits_transfer_from_zero_address_on_mint() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = TokenId::from(4u64);
    let receipt = send!(ctx.owner.mint(ctx.owner_address(), token_id))?;

    assert!(receipt.emits(Transfer {
        from: Address::ZERO,
        to: ctx.owner_address(),
        tokenId: token_id.into(),
    }));
    assert!(receipt.events().iter().all(Erc721Event::is_mint));
    Ok(())
}

#[tokio::test]
async fn transfers_when_called_by_owner() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = ctx.initial_mint[0];
    let receipt = send!(ctx.owner.transfer(
        ctx.owner_address(),
        ctx.collector_address(),
        token_id
    ))?;

    assert!(receipt.emits(Transfer {
        from: ctx.owner_address(),
        to: ctx.collector_address(),
        tokenId: token_id.into(),
    }));
    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.collector_address());
    Ok(())
}

#[tokio::test]
async fn approves_operator_for_token() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = ctx.initial_mint[0];
    let receipt =
        send!(ctx.owner.approve(ctx.collector_address(), token_id))?;

    assert!(receipt.emits(Approval {
        owner: ctx.owner_address(),
        approved: ctx.collector_address(),
        tokenId: token_id.into(),
    }));
    assert_eq!(
        ctx.owner.get_approved(token_id).await?,
        Some(ctx.collector_address())
    );
    Ok(())
}

#[tokio::test]
async fn approved_operator_transfers_and_approval_resets() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = ctx.initial_mint[0];
    send!(ctx.owner.approve(ctx.collector_address(), token_id))?;

    send!(ctx.collector.transfer(
        ctx.owner_address(),
        ctx.collector_address(),
        token_id
    ))?;

    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.collector_address());
    assert_eq!(ctx.owner.get_approved(token_id).await?, None);
    Ok(())
}

#[tokio::test]
async fn approves_operator_for_all() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let receipt =
        send!(ctx.owner.set_approval_for_all(ctx.collector_address(), true))?;

    assert!(receipt.emits(ApprovalForAll {
        owner: ctx.owner_address(),
        operator: ctx.collector_address(),
        approved: true,
    }));
    assert!(
        ctx.owner
            .is_approved_for_all(ctx.owner_address(), ctx.collector_address())
            .await?
    );
    Ok(())
}

#[tokio::test]
async fn removes_operator() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    send!(ctx.owner.set_approval_for_all(ctx.collector_address(), true))?;
    let receipt =
        send!(ctx.owner.set_approval_for_all(ctx.collector_address(), false))?;

    assert!(receipt.emits(ApprovalForAll {
        owner: ctx.owner_address(),
        operator: ctx.collector_address(),
        approved: false,
    }));
    assert!(
        !ctx.owner
            .is_approved_for_all(ctx.owner_address(), ctx.collector_address())
            .await?
    );
    Ok(())
}

#[tokio::test]
async fn operator_transfers_all_tokens_of_owner() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    send!(ctx.owner.set_approval_for_all(ctx.collector_address(), true))?;

    for &token_id in &ctx.initial_mint {
        send!(ctx.collector.transfer(
            ctx.owner_address(),
            ctx.collector_address(),
            token_id
        ))?;
    }

    assert_eq!(
        ctx.owner.balance_of(ctx.collector_address()).await?,
        U256::from(ctx.initial_mint.len())
    );
    assert_eq!(ctx.owner.balance_of(ctx.owner_address()).await?, U256::ZERO);
    Ok(())
}

#[tokio::test]
async fn error_when_non_owner_mints() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = TokenId::from(100u64);

    let err = send!(ctx.collector.mint(ctx.collector_address(), token_id))
        .expect_err("only the owner should mint");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = ctx
        .owner
        .owner_of(token_id)
        .await
        .expect_err("nothing should have been minted");
    assert_eq!(err.kind(), ErrorKind::UnknownToken);
    assert_eq!(
        ctx.owner.balance_of(ctx.collector_address()).await?,
        U256::ZERO
    );
    Ok(())
}

#[tokio::test]
async fn ownership_scenario() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let (a, b) = (ctx.owner_address(), ctx.collector_address());
    let [t1, t2, _] = ctx.initial_mint[..] else {
        eyre::bail!("unexpected initial mint");
    };
    assert_eq!(ctx.owner.balance_of(a).await?, U256::from(3));

    send!(ctx.owner.transfer(a, b, t1))?;
    assert_eq!(ctx.owner.owner_of(t1).await?, b);
    assert_eq!(ctx.owner.balance_of(a).await?, U256::from(2));
    assert_eq!(ctx.owner.balance_of(b).await?, U256::from(1));

    send!(ctx.owner.approve(b, t2))?;
    assert_eq!(ctx.owner.get_approved(t2).await?, Some(b));

    send!(ctx.collector.transfer(a, b, t2))?;
    assert_eq!(ctx.owner.owner_of(t2).await?, b);
    assert_eq!(ctx.owner.get_approved(t2).await?, None);
    assert_eq!(ctx.owner.balance_of(a).await?, U256::from(1));
    assert_eq!(ctx.owner.balance_of(b).await?, U256::from(2));
    Ok(())
}

#[tokio::test]
async fn error_when_querying_unknown_token() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = random_token_id();

    let err = ctx.owner.owner_of(token_id).await.expect_err("not minted");
    assert_eq!(err.kind(), ErrorKind::UnknownToken);

    let err = ctx.owner.get_approved(token_id).await.expect_err("not minted");
    assert_eq!(err.kind(), ErrorKind::UnknownToken);
    Ok(())
}

#[tokio::test]
async fn error_when_minting_duplicate_token() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = ctx.initial_mint[0];
    let err = send!(ctx.owner.mint(ctx.collector_address(), token_id))
        .expect_err("should not mint a token id twice");
    assert_eq!(err.kind(), ErrorKind::DuplicateToken);
    Ok(())
}

#[tokio::test]
async fn error_when_account_is_zero() -> eyre::Result<()> {
    let ctx = Context::new().await?;

    let err = ctx
        .owner
        .balance_of(Address::ZERO)
        .await
        .expect_err("zero cannot own tokens");
    assert_eq!(err.kind(), ErrorKind::InvalidAccount);

    let err = send!(ctx.owner.set_approval_for_all(Address::ZERO, true))
        .expect_err("zero cannot be an operator");
    assert_eq!(err.kind(), ErrorKind::InvalidAccount);
    Ok(())
}

#[tokio::test]
async fn error_when_transferring_to_zero_address() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let err = send!(ctx.owner.transfer(
        ctx.owner_address(),
        Address::ZERO,
        ctx.initial_mint[0]
    ))
    .expect_err("should not burn through a transfer");
    assert_eq!(err.kind(), ErrorKind::InvalidRecipient);
    Ok(())
}

#[tokio::test]
async fn error_when_transferring_without_rights() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = ctx.initial_mint[0];

    let err = send!(ctx.collector.transfer(
        ctx.owner_address(),
        ctx.collector_address(),
        token_id
    ))
    .expect_err("collector was not approved");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = send!(ctx.owner.transfer(
        ctx.collector_address(),
        ctx.owner_address(),
        token_id
    ))
    .expect_err("`from` is not the owner");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = send!(ctx.owner.transfer(
        ctx.owner_address(),
        ctx.collector_address(),
        random_token_id()
    ))
    .expect_err("token does not exist");
    assert_eq!(err.kind(), ErrorKind::UnknownToken);

    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.owner_address());
    Ok(())
}

#[tokio::test]
async fn error_when_approving_without_rights() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = ctx.initial_mint[0];

    let err = send!(ctx.collector.approve(ctx.collector_address(), token_id))
        .expect_err("collector does not own the token");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    // Approved accounts may transfer, but not approve others.
    send!(ctx.owner.approve(ctx.collector_address(), token_id))?;
    let stranger = ctx.stranger()?;
    let err = send!(ctx.collector.approve(stranger.address(), token_id))
        .expect_err("single-token approvals cannot approve");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    Ok(())
}

#[tokio::test]
async fn operators_may_approve() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = ctx.initial_mint[1];
    let stranger = ctx.stranger()?;

    send!(ctx.owner.set_approval_for_all(ctx.collector_address(), true))?;
    let receipt = send!(ctx.collector.approve(stranger.address(), token_id))?;
    assert!(receipt.emits(Approval {
        owner: ctx.owner_address(),
        approved: stranger.address(),
        tokenId: token_id.into(),
    }));
    Ok(())
}

#[tokio::test]
async fn error_when_writing_without_signer() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let watcher = ctx.owner.connect(ctx.owner.account().to_watch_only());

    let err = watcher
        .mint(ctx.owner_address(), random_token_id())
        .await
        .expect_err("watch-only accounts cannot sign");
    assert_eq!(err.kind(), ErrorKind::ReadOnly);
    assert!(ctx.owner.remote().pending_transactions().await.is_empty());

    // Reads still work.
    assert_eq!(watcher.name().await?, NAME);
    Ok(())
}

#[tokio::test]
async fn transfer_from_skips_receiver_check() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let token_id = ctx.initial_mint[2];
    let receipt = send!(ctx.owner.transfer_from(
        ctx.owner_address(),
        ctx.collector_address(),
        token_id
    ))?;
    assert!(receipt.status);
    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.collector_address());
    Ok(())
}

#[tokio::test]
async fn reports_owner_and_interfaces() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    assert_eq!(ctx.collector.owner().await?, ctx.owner_address());
    assert!(ctx.owner.supports_interface(ERC721_INTERFACE_ID).await?);
    assert!(ctx.owner.supports_interface(ERC165_INTERFACE_ID).await?);
    assert!(!ctx.owner.supports_interface(B32::new([0xff; 4])).await?);
    Ok(())
}

#[tokio::test]
async fn reads_concurrently() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let reads = ctx
        .initial_mint
        .iter()
        .map(|&token_id| ctx.collector.owner_of(token_id));
    let owners = try_join_all(reads).await?;
    assert!(owners.iter().all(|&owner| owner == ctx.owner_address()));
    Ok(())
}

#[tokio::test]
async fn queries_event_log() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let from_block = ctx.devnet.block_number().await + 1;
    let token_id = ctx.initial_mint[0];
    send!(ctx.owner.approve(ctx.collector_address(), token_id))?;
    send!(ctx.owner.transfer(
        ctx.owner_address(),
        ctx.collector_address(),
        token_id
    ))?;

    let all = ctx.owner.events(0).await?;
    assert_eq!(all.iter().filter(|e| e.is_mint()).count(), 3);

    let recent = ctx.owner.events(from_block).await?;
    assert_eq!(
        recent,
        vec![
            Erc721Event::Approval {
                owner: ctx.owner_address(),
                approved: ctx.collector_address(),
                token_id,
            },
            Erc721Event::Transfer {
                from: ctx.owner_address(),
                to: ctx.collector_address(),
                token_id,
            },
        ]
    );
    Ok(())
}
