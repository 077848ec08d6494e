use alloy::primitives::{Address, Bytes};
use econft_client::{event::Transfer, Emits, ErrorKind, TokenId};
use econft_devnet::{Received, Receiver};

use crate::context::Context;

async fn deploy(ctx: &Context, receiver: Receiver) -> eyre::Result<Address> {
    let deployer = ctx.stranger()?;
    Ok(ctx.devnet.deploy_receiver(&deployer, receiver).await)
}

#[tokio::test]
async fn transfers_to_accepting_receiver() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let receiver = deploy(&ctx, Receiver::Accept).await?;
    let token_id = ctx.initial_mint[0];
    let data = Bytes::from_static(b"eco");

    let receipt = send!(ctx.owner.transfer_with_data(
        ctx.owner_address(),
        receiver,
        token_id,
        data.clone()
    ))?;

    assert!(receipt.emits(Transfer {
        from: ctx.owner_address(),
        to: receiver,
        tokenId: token_id.into(),
    }));
    assert!(receipt.emits(Received {
        operator: ctx.owner_address(),
        from: ctx.owner_address(),
        tokenId: token_id.into(),
        data,
    }));
    assert_eq!(ctx.owner.owner_of(token_id).await?, receiver);
    Ok(())
}

#[tokio::test]
async fn mints_to_accepting_receiver() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let receiver = deploy(&ctx, Receiver::Accept).await?;
    let token_id = TokenId::from(4u64);

    let receipt = send!(ctx.owner.mint(receiver, token_id))?;
    assert!(receipt.emits(Received {
        operator: ctx.owner_address(),
        from: Address::ZERO,
        tokenId: token_id.into(),
        data: Bytes::new(),
    }));
    Ok(())
}

#[tokio::test]
async fn error_when_receiver_returns_wrong_selector() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let receiver = deploy(&ctx, Receiver::WrongSelector).await?;
    let token_id = ctx.initial_mint[0];

    let err = send!(ctx.owner.transfer(ctx.owner_address(), receiver, token_id))
        .expect_err("receiver rejected the token");
    assert_eq!(err.kind(), ErrorKind::InvalidRecipient);
    assert_eq!(ctx.owner.owner_of(token_id).await?, ctx.owner_address());
    Ok(())
}

#[tokio::test]
async fn error_when_receiver_is_not_implemented() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let receiver = deploy(&ctx, Receiver::Absent).await?;

    let err = send!(ctx.owner.mint(receiver, TokenId::from(4u64)))
        .expect_err("receiver cannot hold tokens");
    assert_eq!(err.kind(), ErrorKind::InvalidRecipient);

    let err = send!(ctx.owner.transfer(
        ctx.owner_address(),
        receiver,
        ctx.initial_mint[0]
    ))
    .expect_err("receiver cannot hold tokens");
    assert_eq!(err.kind(), ErrorKind::InvalidRecipient);

    // Unchecked transfers go through.
    send!(ctx.owner.transfer_from(
        ctx.owner_address(),
        receiver,
        ctx.initial_mint[0]
    ))?;
    assert_eq!(ctx.owner.owner_of(ctx.initial_mint[0]).await?, receiver);
    Ok(())
}

#[tokio::test]
async fn error_when_receiver_reverts_with_reason() -> eyre::Result<()> {
    let ctx = Context::new().await?;
    let reason = "collection closed";
    let receiver = deploy(&ctx, Receiver::Revert(reason.to_owned())).await?;

    let err = send!(ctx.owner.transfer(
        ctx.owner_address(),
        receiver,
        ctx.initial_mint[0]
    ))
    .expect_err("receiver reverted");
    assert_eq!(err.kind(), ErrorKind::InvalidRecipient);
    assert!(err.to_string().contains(reason));

    let err = send!(ctx.owner.mint(receiver, TokenId::from(4u64)))
        .expect_err("receiver reverted");
    assert_eq!(err.kind(), ErrorKind::InvalidRecipient);
    assert!(err.to_string().contains(reason));
    assert_eq!(
        ctx.owner.owner_of(ctx.initial_mint[0]).await?,
        ctx.owner_address()
    );
    Ok(())
}
