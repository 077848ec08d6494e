/*!
# EcoNFT Client

A typed client for the EcoNFT collection, an ERC-721 token whose owner mints
collectible tokens to collectors.

Every contract method is an async function on [`Erc721Client`]. Reads return
decoded values. Writes return a [`PendingTransaction`] whose effects are only
durable once [`PendingTransaction::confirm`] returns a [`Receipt`].

The client reaches the contract through a [`Remote`]. [`RpcRemote`] talks to
an Ethereum JSON-RPC node; the `econft-devnet` crate provides an in-process
network for tests and demos.

## Usage

```ignore
use econft_client::{Account, Erc721Client, RpcRemote, TokenId};

let remote = RpcRemote::connect("http://localhost:8545")?;
let owner = Account::from_private_key(&key)?;
let nft = Erc721Client::new(remote, contract, owner);

nft.mint(collector, TokenId::from(1u64)).await?.confirm().await?;
assert_eq!(nft.owner_of(TokenId::from(1u64)).await?, collector);
```

Failures are reported as [`Error`]s classified by [`ErrorKind`]. Contract
reverts are decoded into the kind that best describes them, nothing is retried.
*/

#![allow(clippy::module_name_repetitions)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod abi;
mod account;
mod client;
mod error;
pub mod event;
mod pending;
mod receipt;
mod remote;
mod rpc;
mod token;

pub use account::Account;
pub use client::Erc721Client;
pub use error::{Error, ErrorKind, Result};
pub use event::Erc721Event;
pub use pending::{PendingTransaction, TxState};
pub use receipt::{Emits, Receipt};
pub use remote::{Remote, RemoteError};
pub use rpc::{RpcRemote, DEFAULT_CONFIRMATIONS, DEFAULT_CONFIRM_TIMEOUT};
pub use token::TokenId;
