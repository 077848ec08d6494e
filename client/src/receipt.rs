//! Confirmation receipts.
use alloy::{
    primitives::{Bytes, Log, TxHash},
    sol_types::SolEvent,
};

use crate::event::Erc721Event;

/// The outcome of a transaction once it was included in a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the transaction.
    pub tx_hash: TxHash,
    /// Number of the block that included the transaction.
    pub block_number: u64,
    /// Whether execution succeeded.
    pub status: bool,
    /// Logs emitted during execution, empty for failed transactions.
    pub logs: Vec<Log>,
    /// Revert data of a failed transaction, when the remote recovered it.
    pub revert: Option<Bytes>,
}

impl Receipt {
    /// Decoded collection events, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<Erc721Event> {
        self.logs.iter().filter_map(Erc721Event::decode).collect()
    }
}

/// Extension trait for checking whether an event was emitted.
pub trait Emits<E> {
    /// Whether the transaction emitted the `expected` event.
    fn emits(&self, expected: E) -> bool;
}

impl<E> Emits<E> for Receipt
where
    E: SolEvent,
    E: PartialEq,
{
    fn emits(&self, expected: E) -> bool {
        self.logs
            .iter()
            .filter(|log| log.topics().first() == Some(&E::SIGNATURE_HASH))
            .filter_map(|log| E::decode_log_data(&log.data).ok())
            .any(|event| expected == event)
    }
}
