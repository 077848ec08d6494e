//! Submitted write calls awaiting confirmation.
use alloy::primitives::TxHash;
use log::debug;

use crate::{
    error::{Error, Result},
    receipt::Receipt,
    remote::{Remote, RemoteError},
};

/// Lifecycle of a submitted transaction.
///
/// `Confirmed` and `Failed` are terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxState {
    /// Accepted by the remote, not yet known to be included in a block.
    Submitted,
    /// Included in a block and executed successfully.
    Confirmed(Receipt),
    /// Included in a block but reverted, or dropped by the remote.
    Failed(Error),
}

impl TxState {
    /// Whether the state can no longer change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxState::Submitted)
    }
}

/// A handle to a write call that was submitted but whose effects are not yet
/// durable.
///
/// Nothing a write call changes should be relied upon before
/// [`PendingTransaction::confirm`] returns a receipt.
#[derive(Debug)]
#[must_use = "a transaction's effects are only durable once confirmed"]
pub struct PendingTransaction<R> {
    remote: R,
    tx_hash: TxHash,
    method: &'static str,
    state: TxState,
}

impl<R: Remote> PendingTransaction<R> {
    pub(crate) fn new(
        remote: R,
        tx_hash: TxHash,
        method: &'static str,
    ) -> Self {
        debug!("submitted {method} in transaction {tx_hash}");
        Self { remote, tx_hash, method, state: TxState::Submitted }
    }

    /// Hash of the submitted transaction.
    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Signature of the contract method this transaction calls.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The last observed lifecycle state.
    pub fn state(&self) -> &TxState {
        &self.state
    }

    /// Wait until the transaction is included in a block.
    ///
    /// Once the transaction reached a terminal state, further calls return
    /// the stored outcome without querying the remote again.
    ///
    /// # Errors
    ///
    /// * [`Error::TransactionFailed`] - If the transaction reverted when it
    ///   was mined, or the remote dropped it. When the receipt carries revert
    ///   data, the error is classified from it instead.
    /// * [`Error::Transport`] - If the remote could not be reached, or did not
    ///   include the transaction in time. The transaction stays
    ///   [`TxState::Submitted`] and may be confirmed again.
    pub async fn confirm(&mut self) -> Result<Receipt> {
        match &self.state {
            TxState::Confirmed(receipt) => return Ok(receipt.clone()),
            TxState::Failed(err) => return Err(err.clone()),
            TxState::Submitted => {}
        }

        match self.remote.confirm(self.tx_hash).await {
            Ok(receipt) if receipt.status => {
                debug!(
                    "confirmed {} in transaction {} at block {}",
                    self.method, self.tx_hash, receipt.block_number
                );
                self.state = TxState::Confirmed(receipt.clone());
                Ok(receipt)
            }
            Ok(receipt) => {
                let err = match &receipt.revert {
                    Some(data) if !data.is_empty() => {
                        Error::from_call_revert(self.method, data)
                    }
                    _ => Error::reverted(
                        self.method,
                        self.tx_hash,
                        receipt.block_number,
                    ),
                };
                debug!("{err}");
                self.state = TxState::Failed(err.clone());
                Err(err)
            }
            Err(err @ RemoteError::UnknownTransaction(_)) => {
                let err = Error::from(err);
                self.state = TxState::Failed(err.clone());
                Err(err)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Consume the handle and wait for the transaction's receipt.
    ///
    /// # Errors
    ///
    /// See [`PendingTransaction::confirm`].
    pub async fn watch(mut self) -> Result<Receipt> {
        self.confirm().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use alloy::{
        primitives::{Address, Bytes, Log, TxHash, U256},
        sol_types::SolError,
    };
    use async_trait::async_trait;

    use super::{PendingTransaction, TxState};
    use crate::{
        abi::IEcoNft::ERC721InsufficientApproval, Account, ErrorKind, Receipt,
        Remote, RemoteError,
    };

    /// Replies to confirmations from a fixed script, counting the queries.
    #[derive(Clone)]
    struct Scripted {
        replies: Arc<Vec<Result<Receipt, RemoteError>>>,
        queries: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<Receipt, RemoteError>>) -> Self {
            Self {
                replies: Arc::new(replies),
                queries: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn queries(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Remote for Scripted {
        async fn call(
            &self,
            _: Address,
            _: Address,
            _: Bytes,
        ) -> Result<Bytes, RemoteError> {
            unimplemented!()
        }

        async fn submit(
            &self,
            _: &Account,
            _: Address,
            _: Bytes,
        ) -> Result<TxHash, RemoteError> {
            unimplemented!()
        }

        async fn confirm(&self, _: TxHash) -> Result<Receipt, RemoteError> {
            let n = self.queries.fetch_add(1, Ordering::SeqCst);
            self.replies[n].clone()
        }

        async fn logs(
            &self,
            _: Address,
            _: u64,
        ) -> Result<Vec<Log>, RemoteError> {
            unimplemented!()
        }
    }

    const HASH: TxHash = TxHash::new([7; 32]);

    fn receipt(status: bool) -> Receipt {
        Receipt {
            tx_hash: HASH,
            block_number: 3,
            status,
            logs: vec![],
            revert: None,
        }
    }

    #[tokio::test]
    async fn timeout_keeps_transaction_submitted() {
        let remote = Scripted::new(vec![
            Err(RemoteError::Timeout(HASH)),
            Ok(receipt(true)),
        ]);
        let mut pending = PendingTransaction::new(remote.clone(), HASH, "m()");

        let err = pending.confirm().await.expect_err("should time out");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(pending.state(), &TxState::Submitted);

        let confirmed = pending.confirm().await.expect("should confirm");
        assert_eq!(confirmed, receipt(true));
        assert_eq!(pending.state(), &TxState::Confirmed(receipt(true)));
    }

    #[tokio::test]
    async fn terminal_states_are_final() {
        let remote = Scripted::new(vec![Ok(receipt(false))]);
        let mut pending = PendingTransaction::new(remote.clone(), HASH, "m()");

        let first = pending.confirm().await.expect_err("should fail");
        assert_eq!(first.kind(), ErrorKind::TransactionFailed);
        assert!(pending.state().is_terminal());

        let second = pending.confirm().await.expect_err("should still fail");
        assert_eq!(first, second);
        assert_eq!(remote.queries(), 1);
    }

    #[tokio::test]
    async fn failed_receipt_is_classified_by_its_revert_data() {
        let data = ERC721InsufficientApproval {
            operator: Address::repeat_byte(2),
            tokenId: U256::from(1),
        }
        .abi_encode();
        let remote = Scripted::new(vec![Ok(Receipt {
            revert: Some(data.into()),
            ..receipt(false)
        })]);
        let mut pending = PendingTransaction::new(remote, HASH, "m()");

        let err = pending.confirm().await.expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(pending.state(), &TxState::Failed(err));
    }
}
