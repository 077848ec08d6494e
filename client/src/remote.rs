//! The boundary between the client and the environment hosting the contract.
use alloy::primitives::{Address, Bytes, Log, TxHash};
use async_trait::async_trait;

use crate::{account::Account, receipt::Receipt};

/// A failure reported by a [`Remote`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Execution reverted with the given ABI-encoded revert data.
    #[error("execution reverted: {0}")]
    Revert(Bytes),
    /// The remote does not know the transaction.
    #[error("unknown transaction {0}")]
    UnknownTransaction(TxHash),
    /// The transaction was not confirmed within the configured time.
    #[error("transaction {0} was not confirmed in time")]
    Timeout(TxHash),
    /// The remote could not be reached or answered nonsense.
    #[error("{0}")]
    Transport(String),
}

/// An environment that executes calls against deployed contracts.
///
/// Implementations are cheap to clone and safe to share between tasks.
#[async_trait]
pub trait Remote: Clone + Send + Sync + 'static {
    /// Execute a read-only call and return the raw return data.
    ///
    /// # Errors
    ///
    /// * [`RemoteError::Revert`] - If execution reverted.
    /// * [`RemoteError::Transport`] - If the remote could not be reached.
    async fn call(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<Bytes, RemoteError>;

    /// Submit a state-changing call signed by `from`.
    ///
    /// Returns as soon as the transaction was accepted for inclusion.
    ///
    /// # Errors
    ///
    /// * [`RemoteError::Revert`] - If the remote rejected the transaction
    ///   because its execution would revert.
    /// * [`RemoteError::Transport`] - If the remote could not be reached.
    async fn submit(
        &self,
        from: &Account,
        to: Address,
        input: Bytes,
    ) -> Result<TxHash, RemoteError>;

    /// Wait until `tx_hash` is included in a block.
    ///
    /// # Errors
    ///
    /// * [`RemoteError::Timeout`] - If no block included the transaction in
    ///   time. The transaction may still be included later.
    /// * [`RemoteError::UnknownTransaction`] - If `tx_hash` was never
    ///   submitted.
    /// * [`RemoteError::Transport`] - If the remote could not be reached.
    async fn confirm(&self, tx_hash: TxHash) -> Result<Receipt, RemoteError>;

    /// Logs emitted by `address` in blocks starting at `from_block`.
    ///
    /// # Errors
    ///
    /// * [`RemoteError::Transport`] - If the remote could not be reached.
    async fn logs(
        &self,
        address: Address,
        from_block: u64,
    ) -> Result<Vec<Log>, RemoteError>;
}
