//! [`Remote`] backed by an Ethereum JSON-RPC endpoint.
use std::{fmt, time::Duration};

use alloy::{
    consensus::Transaction as _,
    network::{EthereumWallet, TransactionBuilder, TransactionResponse as _},
    primitives::{Address, Bytes, Log, TxHash},
    providers::{
        DynProvider, PendingTransactionBuilder, PendingTransactionError,
        Provider, ProviderBuilder, WatchTxError,
    },
    rpc::types::{
        BlockId, Filter, Transaction, TransactionReceipt, TransactionRequest,
    },
    transports::{http::reqwest::Url, TransportError},
};
use async_trait::async_trait;

use crate::{
    account::Account,
    error::{Error, Result},
    receipt::Receipt,
    remote::{Remote, RemoteError},
};

/// Default number of blocks to wait for before a transaction is confirmed.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Default time to wait for a transaction to be confirmed.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// A node reachable over HTTP JSON-RPC.
///
/// Reads go through a shared provider. Writes are signed locally with the
/// submitting account's key through a wallet provider built for that account.
#[derive(Clone)]
pub struct RpcRemote {
    url: Url,
    provider: DynProvider,
    confirmations: u64,
    timeout: Duration,
}

impl RpcRemote {
    /// Connect to the node at `url`.
    ///
    /// No request is made until the first call.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] - If `url` is not a valid URL.
    pub fn connect(url: &str) -> Result<Self> {
        let url: Url = url.parse().map_err(|e| {
            Error::Transport(format!("invalid RPC URL `{url}`: {e}"))
        })?;
        let provider =
            ProviderBuilder::new().connect_http(url.clone()).erased();
        Ok(Self {
            url,
            provider,
            confirmations: DEFAULT_CONFIRMATIONS,
            timeout: DEFAULT_CONFIRM_TIMEOUT,
        })
    }

    /// Require `confirmations` blocks before a transaction is confirmed.
    #[must_use]
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Give up waiting for a confirmation after `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The node's URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RpcRemote {
    /// Execute `tx` again on the state its block started from, to recover
    /// the revert data the receipt does not carry.
    async fn replay(
        &self,
        tx: &Transaction,
        block_number: u64,
    ) -> Option<Bytes> {
        let mut request = TransactionRequest::default()
            .with_from(tx.from())
            .with_input(tx.input().clone());
        if let Some(to) = tx.to() {
            request = request.with_to(to);
        }
        let parent = BlockId::number(block_number.saturating_sub(1));
        match self.provider.call(request).block(parent).await {
            Ok(_) => None,
            Err(err) => match remote_error(err) {
                RemoteError::Revert(data) => Some(data),
                _ => None,
            },
        }
    }
}

impl fmt::Debug for RpcRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcRemote")
            .field("url", &self.url.as_str())
            .field("confirmations", &self.confirmations)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Remote for RpcRemote {
    async fn call(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<Bytes, RemoteError> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(input);
        self.provider.call(tx).await.map_err(remote_error)
    }

    async fn submit(
        &self,
        from: &Account,
        to: Address,
        input: Bytes,
    ) -> Result<TxHash, RemoteError> {
        let signer = from.signer().cloned().ok_or_else(|| {
            RemoteError::Transport(format!("{from} cannot sign transactions"))
        })?;
        let wallet = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(self.url.clone());

        let tx = TransactionRequest::default()
            .with_from(from.address())
            .with_to(to)
            .with_input(input);
        let pending =
            wallet.send_transaction(tx).await.map_err(remote_error)?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Receipt, RemoteError> {
        let known = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await
            .map_err(remote_error)?;
        let Some(tx) = known else {
            return Err(RemoteError::UnknownTransaction(tx_hash));
        };

        let root = self.provider.root().clone();
        let receipt = PendingTransactionBuilder::new(root, tx_hash)
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.timeout))
            .get_receipt()
            .await
            .map_err(|e| match e {
                PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                    RemoteError::Timeout(tx_hash)
                }
                e => RemoteError::Transport(e.to_string()),
            })?;
        let mut receipt = into_receipt(&receipt);
        if !receipt.status {
            receipt.revert = self.replay(&tx, receipt.block_number).await;
        }
        Ok(receipt)
    }

    async fn logs(
        &self,
        address: Address,
        from_block: u64,
    ) -> Result<Vec<Log>, RemoteError> {
        let filter = Filter::new().address(address).from_block(from_block);
        let logs = self.provider.get_logs(&filter).await.map_err(remote_error)?;
        Ok(logs.into_iter().map(|log| log.inner).collect())
    }
}

/// Separate reverts, whose data the client decodes, from transport failures.
fn remote_error(err: TransportError) -> RemoteError {
    match err.as_error_resp() {
        Some(payload) if payload.message.contains("revert") => {
            RemoteError::Revert(payload.as_revert_data().unwrap_or_default())
        }
        _ => RemoteError::Transport(err.to_string()),
    }
}

fn into_receipt(receipt: &TransactionReceipt) -> Receipt {
    Receipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number.unwrap_or_default(),
        status: receipt.status(),
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect(),
        revert: None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{RpcRemote, DEFAULT_CONFIRMATIONS};
    use crate::ErrorKind;

    #[test]
    fn connect_parses_url_and_applies_builders() {
        let remote = RpcRemote::connect("http://localhost:8545")
            .expect("should parse the URL")
            .with_confirmations(0)
            .with_timeout(Duration::from_secs(3));
        assert_eq!(remote.url().as_str(), "http://localhost:8545/");
        assert_eq!(remote.confirmations, DEFAULT_CONFIRMATIONS);
        assert_eq!(remote.timeout, Duration::from_secs(3));
    }

    #[test]
    fn error_when_url_is_malformed() {
        let err = RpcRemote::connect("not a url").expect_err("should reject");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
