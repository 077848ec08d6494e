//! Domain events emitted by the collection.
use alloy::{
    primitives::{Address, Log},
    sol_types::SolEvent,
};

pub use crate::abi::IEcoNft::{Approval, ApprovalForAll, Transfer};
use crate::token::TokenId;

/// A decoded collection event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Erc721Event {
    /// `tokenId` moved from `from` to `to`. Mints come from the zero address.
    Transfer {
        /// Previous owner.
        from: Address,
        /// New owner.
        to: Address,
        /// Transferred token.
        token_id: TokenId,
    },
    /// `owner` enabled `approved` to manage `tokenId`.
    Approval {
        /// Owner of the token.
        owner: Address,
        /// Approved account, zero when cleared.
        approved: Address,
        /// Approved token.
        token_id: TokenId,
    },
    /// `owner` enabled or disabled `operator` for all of its tokens.
    ApprovalForAll {
        /// Owner of the tokens.
        owner: Address,
        /// The operator.
        operator: Address,
        /// Whether permission was granted.
        approved: bool,
    },
}

impl Erc721Event {
    /// Decode `log`, returning `None` for logs that are not collection
    /// events.
    #[must_use]
    pub fn decode(log: &Log) -> Option<Self> {
        let topic = *log.topics().first()?;
        if topic == Transfer::SIGNATURE_HASH {
            let Transfer { from, to, tokenId: token_id } =
                Transfer::decode_log_data(&log.data).ok()?;
            Some(Self::Transfer { from, to, token_id: token_id.into() })
        } else if topic == Approval::SIGNATURE_HASH {
            let Approval { owner, approved, tokenId: token_id } =
                Approval::decode_log_data(&log.data).ok()?;
            Some(Self::Approval { owner, approved, token_id: token_id.into() })
        } else if topic == ApprovalForAll::SIGNATURE_HASH {
            let ApprovalForAll { owner, operator, approved } =
                ApprovalForAll::decode_log_data(&log.data).ok()?;
            Some(Self::ApprovalForAll { owner, operator, approved })
        } else {
            None
        }
    }

    /// Whether this event is a mint, i.e. a transfer from the zero address.
    #[must_use]
    pub fn is_mint(&self) -> bool {
        matches!(self, Self::Transfer { from, .. } if from.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{address, uint, Address, Bytes, Log, LogData, B256},
        sol_types::SolEvent,
    };

    use super::{ApprovalForAll, Erc721Event, Transfer};
    use crate::TokenId;

    const CONTRACT: Address =
        address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const ALICE: Address = address!("A11CEacF9aa32246d767FCCD72e02d6bCbcC375d");
    const BOB: Address = address!("F4EaCDAbEf3c8f1EdE91b6f2A6840bc2E4DD3526");

    #[test]
    fn decodes_mint_transfer() {
        let event =
            Transfer { from: Address::ZERO, to: ALICE, tokenId: uint!(3_U256) };
        let log = Log { address: CONTRACT, data: event.encode_log_data() };

        let decoded = Erc721Event::decode(&log).expect("should decode");
        assert_eq!(
            decoded,
            Erc721Event::Transfer {
                from: Address::ZERO,
                to: ALICE,
                token_id: TokenId::from(3u64)
            }
        );
        assert!(decoded.is_mint());
    }

    #[test]
    fn decodes_approval_for_all() {
        let event =
            ApprovalForAll { owner: ALICE, operator: BOB, approved: false };
        let log = Log { address: CONTRACT, data: event.encode_log_data() };

        let decoded = Erc721Event::decode(&log).expect("should decode");
        assert!(!decoded.is_mint());
        assert_eq!(
            decoded,
            Erc721Event::ApprovalForAll {
                owner: ALICE,
                operator: BOB,
                approved: false
            }
        );
    }

    #[test]
    fn ignores_foreign_logs() {
        let data = LogData::new_unchecked(
            vec![B256::repeat_byte(0x42)],
            Bytes::new(),
        );
        let log = Log { address: CONTRACT, data };
        assert_eq!(Erc721Event::decode(&log), None);

        let empty = Log { address: CONTRACT, data: LogData::default() };
        assert_eq!(Erc721Event::decode(&empty), None);
    }
}
