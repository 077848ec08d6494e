/*!
# EcoNFT Devnet

An ephemeral, in-process development network that hosts EcoNFT collections
and implements [`Remote`], so that [`econft_client::Erc721Client`] can run
against it exactly as it runs against a JSON-RPC node.

The network has funded development accounts, per-account nonces, a mempool,
receipts and an event log. Blocks are mined on every transaction by default;
with automining disabled, transactions wait in the mempool until
[`Devnet::mine`] is called.

```ignore
use econft_client::Erc721Client;
use econft_devnet::Devnet;

let devnet = Devnet::new();
let [owner, collector, ..] = devnet.accounts() else { unreachable!() };
let address = devnet.deploy_econft(owner, "EcoNFT", "ECO").await?;
let nft = Erc721Client::new(devnet.clone(), address, owner.clone());
```
*/

#![allow(clippy::module_name_repetitions)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::{sync::Arc, time::Duration};

use alloy::{
    primitives::{keccak256, Address, Bytes, Log, TxHash},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use econft_client::{Account, Receipt, Remote, RemoteError};
use tokio::{sync::Mutex, time::Instant};

mod chain;
mod econft;
mod evm;
mod ownable;
mod receiver;

use chain::Chain;
use econft::EcoNft;
use evm::Contract;
pub use receiver::{Received, Receiver};

/// Configuration of a [`Devnet`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DevnetConfig {
    /// Whether every submitted transaction is mined into its own block.
    pub automine: bool,
    /// Number of development accounts.
    pub accounts: usize,
    /// How long confirmations wait for a transaction to be mined.
    pub confirm_timeout: Duration,
    /// Chain id, mixed into transaction hashes.
    pub chain_id: u64,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            automine: true,
            accounts: 10,
            confirm_timeout: Duration::from_secs(5),
            chain_id: 31337,
        }
    }
}

/// An in-process development network.
///
/// Clones share the same network state.
#[derive(Clone)]
pub struct Devnet {
    chain: Arc<Mutex<Chain>>,
    accounts: Arc<[Account]>,
    config: DevnetConfig,
}

impl Default for Devnet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Devnet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Devnet")
            .field("accounts", &self.accounts.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Devnet {
    /// Start a network with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DevnetConfig::default())
    }

    /// Start a network configured by `config`.
    #[must_use]
    pub fn with_config(config: DevnetConfig) -> Self {
        let accounts = dev_keys()
            .take(config.accounts)
            .map(Account::from_signer)
            .collect();
        Self {
            chain: Arc::new(Mutex::new(Chain::new(
                config.chain_id,
                config.automine,
            ))),
            accounts,
            config,
        }
    }

    /// The development accounts, all able to sign.
    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// The network's configuration.
    #[must_use]
    pub fn config(&self) -> &DevnetConfig {
        &self.config
    }

    /// Deploy an EcoNFT collection named `name` with `symbol`, owned by
    /// `deployer`.
    ///
    /// Deployments take effect immediately, without waiting for a block.
    ///
    /// # Errors
    ///
    /// * [`RemoteError::Revert`] - If `deployer` is the zero address.
    pub async fn deploy_econft(
        &self,
        deployer: &Account,
        name: &str,
        symbol: &str,
    ) -> Result<Address, RemoteError> {
        let contract = EcoNft::new(deployer.address(), name, symbol)
            .map_err(|e| RemoteError::Revert(e.into()))?;
        let mut chain = self.chain.lock().await;
        let contract = Contract::EcoNft(Box::new(contract));
        Ok(chain.deploy(deployer.address(), contract))
    }

    /// Deploy a contract answering `onERC721Received` as `receiver` says.
    pub async fn deploy_receiver(
        &self,
        deployer: &Account,
        receiver: Receiver,
    ) -> Address {
        let mut chain = self.chain.lock().await;
        chain.deploy(deployer.address(), Contract::Receiver(receiver))
    }

    /// Mine all pending transactions into a new block. Returns its number.
    pub async fn mine(&self) -> u64 {
        self.chain.lock().await.mine()
    }

    /// Enable or disable mining a block for every transaction.
    ///
    /// Pending transactions stay pending when automining is enabled again.
    pub async fn set_automine(&self, automine: bool) {
        self.chain.lock().await.set_automine(automine);
    }

    /// Number of the latest block.
    pub async fn block_number(&self) -> u64 {
        self.chain.lock().await.block_number()
    }

    /// Hashes of the transactions in the mempool, in submission order.
    pub async fn pending_transactions(&self) -> Vec<TxHash> {
        self.chain.lock().await.pending_transactions()
    }
}

#[async_trait]
impl Remote for Devnet {
    async fn call(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<Bytes, RemoteError> {
        let chain = self.chain.lock().await;
        chain.call(from, to, &input).map_err(RemoteError::Revert)
    }

    async fn submit(
        &self,
        from: &Account,
        to: Address,
        input: Bytes,
    ) -> Result<TxHash, RemoteError> {
        if !from.can_sign() {
            return Err(RemoteError::Transport(format!(
                "{from} cannot sign transactions"
            )));
        }
        let mut chain = self.chain.lock().await;
        chain.submit(from.address(), to, input).map_err(RemoteError::Revert)
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Receipt, RemoteError> {
        let deadline = Instant::now() + self.config.confirm_timeout;
        loop {
            let mut head = {
                let chain = self.chain.lock().await;
                if let Some(receipt) = chain.receipt(&tx_hash) {
                    return Ok(receipt.clone());
                }
                if !chain.is_pending(&tx_hash) {
                    return Err(RemoteError::UnknownTransaction(tx_hash));
                }
                // Subscribed under the lock, so no block is missed.
                chain.subscribe()
            };

            match tokio::time::timeout_at(deadline, head.changed()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => {
                    return Err(RemoteError::Transport(
                        "devnet shut down".to_owned(),
                    ))
                }
                Err(_) => return Err(RemoteError::Timeout(tx_hash)),
            }
        }
    }

    async fn logs(
        &self,
        address: Address,
        from_block: u64,
    ) -> Result<Vec<Log>, RemoteError> {
        Ok(self.chain.lock().await.logs(address, from_block))
    }
}

/// Deterministic development keys.
fn dev_keys() -> impl Iterator<Item = PrivateKeySigner> {
    (0u64..).filter_map(|i| {
        let seed = keccak256(format!("econft devnet account {i}"));
        PrivateKeySigner::from_bytes(&seed).ok()
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::{
        primitives::{uint, Address},
        sol_types::SolCall,
    };
    use econft_client::{abi::IEcoNft, Remote, RemoteError};

    use super::{Devnet, DevnetConfig};

    #[test]
    fn accounts_are_distinct_and_deterministic() {
        let a = Devnet::new();
        let b = Devnet::new();
        assert_eq!(a.accounts().len(), 10);
        assert_eq!(a.accounts(), b.accounts());
        assert_ne!(a.accounts()[0], a.accounts()[1]);
        assert!(a.accounts().iter().all(econft_client::Account::can_sign));
    }

    #[tokio::test]
    async fn deploys_at_create_addresses() {
        let devnet = Devnet::new();
        let deployer = &devnet.accounts()[0];
        let first = devnet.deploy_econft(deployer, "A", "A").await.unwrap();
        let second = devnet.deploy_econft(deployer, "B", "B").await.unwrap();
        assert_eq!(first, deployer.address().create(0));
        assert_eq!(second, deployer.address().create(1));
    }

    #[tokio::test]
    async fn manual_mining_holds_transactions() {
        let devnet = Devnet::with_config(DevnetConfig {
            automine: false,
            confirm_timeout: Duration::from_millis(50),
            ..DevnetConfig::default()
        });
        let owner = devnet.accounts()[0].clone();
        let address = devnet.deploy_econft(&owner, "EcoNFT", "ECO").await.unwrap();

        let input = IEcoNft::mintCollectionNFTCall {
            collector: owner.address(),
            tokenId: uint!(1_U256),
        }
        .abi_encode();
        let tx_hash =
            devnet.submit(&owner, address, input.into()).await.unwrap();
        assert_eq!(devnet.pending_transactions().await, vec![tx_hash]);

        let err = devnet.confirm(tx_hash).await.expect_err("not mined yet");
        assert_eq!(err, RemoteError::Timeout(tx_hash));

        let block = devnet.mine().await;
        let receipt = devnet.confirm(tx_hash).await.expect("should be mined");
        assert!(receipt.status);
        assert_eq!(receipt.block_number, block);
        assert!(devnet.pending_transactions().await.is_empty());
    }

    #[tokio::test]
    async fn confirm_wakes_up_when_block_is_mined() {
        let devnet = Devnet::with_config(DevnetConfig {
            automine: false,
            ..DevnetConfig::default()
        });
        let owner = devnet.accounts()[0].clone();
        let address = devnet.deploy_econft(&owner, "EcoNFT", "ECO").await.unwrap();
        let input = IEcoNft::setApprovalForAllCall {
            operator: devnet.accounts()[1].address(),
            approved: true,
        }
        .abi_encode();
        let tx_hash =
            devnet.submit(&owner, address, input.into()).await.unwrap();

        let waiter = tokio::spawn({
            let devnet = devnet.clone();
            async move { devnet.confirm(tx_hash).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        devnet.mine().await;

        let receipt = waiter.await.unwrap().expect("should be confirmed");
        assert_eq!(receipt.logs.len(), 1);
    }

    #[tokio::test]
    async fn unknown_transactions_are_reported() {
        let devnet = Devnet::new();
        let err = devnet
            .confirm(Default::default())
            .await
            .expect_err("nothing was submitted");
        assert!(matches!(err, RemoteError::UnknownTransaction(_)));
    }

    #[tokio::test]
    async fn calls_to_accounts_without_code_return_nothing() {
        let devnet = Devnet::new();
        let output = devnet
            .call(Address::ZERO, Address::repeat_byte(7), vec![1, 2].into())
            .await
            .unwrap();
        assert!(output.is_empty());
    }
}
