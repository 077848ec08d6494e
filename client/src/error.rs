//! Errors surfaced by the client.
//!
//! Every failure the remote environment reports is propagated with its kind
//! and message. Nothing is retried or recovered locally.
use alloy::{
    hex,
    primitives::{Address, TxHash},
    sol_types::{ContractError, SolCall, SolInterface},
};

use crate::{
    abi::IEcoNft::{self, IEcoNftErrors},
    remote::RemoteError,
};

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error returned by [`crate::Erc721Client`] operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The caller lacks the rights required by the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The token identifier does not exist.
    #[error("unknown token: {0}")]
    UnknownToken(String),
    /// The token identifier is already minted.
    #[error("duplicate token: {0}")]
    DuplicateToken(String),
    /// The account is malformed or not acceptable where it was used.
    #[error("invalid account: {0}")]
    InvalidAccount(String),
    /// The destination cannot accept the token.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    /// The write call was rejected or reverted for any other reason.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
    /// The client's account has no signer, so it cannot submit writes.
    #[error("account {0} cannot sign transactions")]
    ReadOnly(Address),
    /// The remote environment could not be reached, or did not answer in time.
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote returned data that does not match the contract interface,
    /// or text did not parse as a token id.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// The kind of an [`Error`], without its message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Unauthorized`].
    Unauthorized,
    /// See [`Error::UnknownToken`].
    UnknownToken,
    /// See [`Error::DuplicateToken`].
    DuplicateToken,
    /// See [`Error::InvalidAccount`].
    InvalidAccount,
    /// See [`Error::InvalidRecipient`].
    InvalidRecipient,
    /// See [`Error::TransactionFailed`].
    TransactionFailed,
    /// See [`Error::ReadOnly`].
    ReadOnly,
    /// See [`Error::Transport`].
    Transport,
    /// See [`Error::Decode`].
    Decode,
}

impl Error {
    /// The kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::UnknownToken(_) => ErrorKind::UnknownToken,
            Error::DuplicateToken(_) => ErrorKind::DuplicateToken,
            Error::InvalidAccount(_) => ErrorKind::InvalidAccount,
            Error::InvalidRecipient(_) => ErrorKind::InvalidRecipient,
            Error::TransactionFailed(_) => ErrorKind::TransactionFailed,
            Error::ReadOnly(_) => ErrorKind::ReadOnly,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Decode(_) => ErrorKind::Decode,
        }
    }

    /// Classify ABI-encoded revert data returned by the contract.
    ///
    /// Understands the ERC-6093 and `Ownable` custom errors, `Error(string)`
    /// reasons of older OpenZeppelin releases, and `Panic(uint256)`.
    #[must_use]
    pub fn from_revert(data: &[u8]) -> Self {
        if data.is_empty() {
            return Error::TransactionFailed(
                "execution reverted without data".to_owned(),
            );
        }

        match ContractError::<IEcoNftErrors>::abi_decode(data) {
            Ok(ContractError::CustomError(err)) => err.into(),
            Ok(ContractError::Revert(revert)) => {
                Self::from_reason(&revert.reason)
            }
            Ok(ContractError::Panic(panic)) => {
                Error::TransactionFailed(match panic.kind() {
                    Some(kind) => format!("panic: {kind}"),
                    None => format!("panic with code {}", panic.code),
                })
            }
            Err(_) => Error::TransactionFailed(format!(
                "unrecognized revert data 0x{}",
                hex::encode(data)
            )),
        }
    }

    /// Classify revert data of a write call to `method`.
    ///
    /// Safe transfers and mints pass on whatever the recipient's
    /// `onERC721Received` reverted with. Reverts the collection never
    /// produces itself are reported as [`Error::InvalidRecipient`] for them,
    /// keeping the recipient's message.
    #[must_use]
    pub fn from_call_revert(method: &str, data: &[u8]) -> Self {
        let err = Self::from_revert(data);
        if data.is_empty() || !RECIPIENT_CHECKED.contains(&method) {
            return err;
        }
        let own = matches!(
            ContractError::<IEcoNftErrors>::abi_decode(data),
            Ok(ContractError::CustomError(_) | ContractError::Panic(_))
        );
        match err {
            Error::TransactionFailed(msg) if !own => Error::InvalidRecipient(
                format!("recipient rejected the token: {msg}"),
            ),
            err => err,
        }
    }

    /// Classify a failure of a write call to `method`.
    pub(crate) fn from_remote(method: &str, err: RemoteError) -> Self {
        match err {
            RemoteError::Revert(data) => Self::from_call_revert(method, &data),
            err => err.into(),
        }
    }

    /// Classify an `Error(string)` revert reason.
    #[must_use]
    pub fn from_reason(reason: &str) -> Self {
        const UNAUTHORIZED: &[&str] = &[
            "caller is not the owner",
            "caller is not token owner or approved",
            "transfer from incorrect owner",
            "approve caller is not token owner",
        ];
        const UNKNOWN_TOKEN: &[&str] =
            &["invalid token ID", "nonexistent token"];
        const DUPLICATE_TOKEN: &[&str] = &["token already minted"];
        const INVALID_RECIPIENT: &[&str] = &[
            "non ERC721Receiver implementer",
            "transfer to the zero address",
            "mint to the zero address",
        ];
        const INVALID_ACCOUNT: &[&str] =
            &["address zero is not a valid owner", "approve to caller"];

        let matches = |needles: &[&str]| {
            needles.iter().any(|needle| reason.contains(needle))
        };
        let reason = reason.to_owned();
        if matches(UNAUTHORIZED) {
            Error::Unauthorized(reason)
        } else if matches(UNKNOWN_TOKEN) {
            Error::UnknownToken(reason)
        } else if matches(DUPLICATE_TOKEN) {
            Error::DuplicateToken(reason)
        } else if matches(INVALID_RECIPIENT) {
            Error::InvalidRecipient(reason)
        } else if matches(INVALID_ACCOUNT) {
            Error::InvalidAccount(reason)
        } else {
            Error::TransactionFailed(reason)
        }
    }

    /// A failed receipt for `tx_hash`.
    pub(crate) fn reverted(method: &str, tx_hash: TxHash, block: u64) -> Self {
        Error::TransactionFailed(format!(
            "{method} in transaction {tx_hash} reverted in block {block}"
        ))
    }
}

/// Methods that ask contract recipients to accept the token.
const RECIPIENT_CHECKED: &[&str] = &[
    IEcoNft::mintCollectionNFTCall::SIGNATURE,
    IEcoNft::safeTransferFrom_0Call::SIGNATURE,
    IEcoNft::safeTransferFrom_1Call::SIGNATURE,
];

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Revert(data) => Self::from_revert(&data),
            RemoteError::UnknownTransaction(tx_hash) => {
                Error::TransactionFailed(format!(
                    "transaction {tx_hash} is unknown to the remote"
                ))
            }
            RemoteError::Timeout(tx_hash) => Error::Transport(format!(
                "timed out waiting for transaction {tx_hash}"
            )),
            RemoteError::Transport(msg) => Error::Transport(msg),
        }
    }
}

impl From<IEcoNftErrors> for Error {
    fn from(err: IEcoNftErrors) -> Self {
        use IEcoNft::{
            ERC721IncorrectOwner, ERC721InsufficientApproval,
            ERC721InvalidApprover, ERC721InvalidOperator, ERC721InvalidOwner,
            ERC721InvalidReceiver, ERC721InvalidSender, ERC721NonexistentToken,
            OwnableInvalidOwner, OwnableUnauthorizedAccount,
        };

        match err {
            IEcoNftErrors::ERC721InvalidOwner(ERC721InvalidOwner { owner }) => {
                Error::InvalidAccount(format!("{owner} cannot own tokens"))
            }
            IEcoNftErrors::ERC721NonexistentToken(ERC721NonexistentToken {
                tokenId: token_id,
            }) => {
                Error::UnknownToken(format!("token {token_id} does not exist"))
            }
            IEcoNftErrors::ERC721IncorrectOwner(ERC721IncorrectOwner {
                sender,
                tokenId: token_id,
                owner,
            }) => Error::Unauthorized(format!(
                "token {token_id} is owned by {owner}, not {sender}"
            )),
            IEcoNftErrors::ERC721InvalidSender(ERC721InvalidSender {
                sender,
            }) => {
                if sender.is_zero() {
                    Error::DuplicateToken("token is already minted".to_owned())
                } else {
                    Error::InvalidAccount(format!(
                        "{sender} cannot send tokens"
                    ))
                }
            }
            IEcoNftErrors::ERC721InvalidReceiver(ERC721InvalidReceiver {
                receiver,
            }) => Error::InvalidRecipient(format!(
                "{receiver} cannot receive tokens"
            )),
            IEcoNftErrors::ERC721InsufficientApproval(
                ERC721InsufficientApproval { operator, tokenId: token_id },
            ) => Error::Unauthorized(format!(
                "{operator} is not approved for token {token_id}"
            )),
            IEcoNftErrors::ERC721InvalidApprover(ERC721InvalidApprover {
                approver,
            }) => Error::Unauthorized(format!(
                "{approver} cannot approve this token"
            )),
            IEcoNftErrors::ERC721InvalidOperator(ERC721InvalidOperator {
                operator,
            }) => Error::InvalidAccount(format!(
                "{operator} cannot be an operator"
            )),
            IEcoNftErrors::OwnableUnauthorizedAccount(
                OwnableUnauthorizedAccount { account },
            ) => Error::Unauthorized(format!(
                "{account} is not the collection owner"
            )),
            IEcoNftErrors::OwnableInvalidOwner(OwnableInvalidOwner {
                owner,
            }) => Error::InvalidAccount(format!(
                "{owner} cannot own the collection"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{address, uint, Address, TxHash},
        sol_types::{Panic, Revert, SolError},
    };

    use super::{Error, ErrorKind};
    use crate::{
        abi::IEcoNft::{
            ERC721InsufficientApproval, ERC721InvalidReceiver,
            ERC721InvalidSender, ERC721NonexistentToken,
            OwnableUnauthorizedAccount,
        },
        remote::RemoteError,
    };

    const BOB: Address = address!("F4EaCDAbEf3c8f1EdE91b6f2A6840bc2E4DD3526");

    #[test]
    fn classifies_custom_errors() {
        let data =
            ERC721NonexistentToken { tokenId: uint!(7_U256) }.abi_encode();
        let err = Error::from_revert(&data);
        assert_eq!(err, Error::UnknownToken("token 7 does not exist".into()));

        let data = ERC721InvalidSender { sender: Address::ZERO }.abi_encode();
        assert_eq!(Error::from_revert(&data).kind(), ErrorKind::DuplicateToken);

        let data = OwnableUnauthorizedAccount { account: BOB }.abi_encode();
        assert_eq!(Error::from_revert(&data).kind(), ErrorKind::Unauthorized);

        let data = ERC721InsufficientApproval {
            operator: BOB,
            tokenId: uint!(1_U256),
        }
        .abi_encode();
        assert_eq!(Error::from_revert(&data).kind(), ErrorKind::Unauthorized);

        let data = ERC721InvalidReceiver { receiver: BOB }.abi_encode();
        assert_eq!(
            Error::from_revert(&data).kind(),
            ErrorKind::InvalidRecipient
        );
    }

    #[test]
    fn classifies_revert_reasons() {
        let reason = |r: &str| {
            Error::from_revert(&Revert { reason: r.to_owned() }.abi_encode())
                .kind()
        };
        assert_eq!(
            reason("Ownable: caller is not the owner"),
            ErrorKind::Unauthorized
        );
        assert_eq!(reason("ERC721: invalid token ID"), ErrorKind::UnknownToken);
        assert_eq!(
            reason("ERC721: token already minted"),
            ErrorKind::DuplicateToken
        );
        assert_eq!(
            reason("ERC721: transfer to non ERC721Receiver implementer"),
            ErrorKind::InvalidRecipient
        );
        assert_eq!(
            reason("ERC721: address zero is not a valid owner"),
            ErrorKind::InvalidAccount
        );
        assert_eq!(reason("out of gas"), ErrorKind::TransactionFailed);
    }

    #[test]
    fn remote_errors_keep_their_kind() {
        let data =
            ERC721NonexistentToken { tokenId: uint!(9_U256) }.abi_encode();
        let err: Error = RemoteError::Revert(data.into()).into();
        assert_eq!(err.kind(), ErrorKind::UnknownToken);

        let err: Error = RemoteError::Timeout(TxHash::ZERO).into();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err: Error = RemoteError::UnknownTransaction(TxHash::ZERO).into();
        assert_eq!(err.kind(), ErrorKind::TransactionFailed);
    }

    #[test]
    fn panics_and_garbage_are_transaction_failures() {
        let data = Panic { code: uint!(0x11_U256) }.abi_encode();
        let err = Error::from_revert(&data);
        assert_eq!(err.kind(), ErrorKind::TransactionFailed);
        assert!(err.to_string().contains("panic"));

        assert_eq!(
            Error::from_revert(&[]).kind(),
            ErrorKind::TransactionFailed
        );
        assert_eq!(
            Error::from_revert(&[0xde, 0xad, 0xbe, 0xef]).kind(),
            ErrorKind::TransactionFailed
        );
    }

    #[test]
    fn recipient_reverts_of_safe_transfers_are_invalid_recipients() {
        const TRANSFER: &str = "safeTransferFrom(address,address,uint256)";
        let data =
            Revert { reason: "collection closed".to_owned() }.abi_encode();

        let err = Error::from_call_revert(TRANSFER, &data);
        assert_eq!(err.kind(), ErrorKind::InvalidRecipient);
        assert!(err.to_string().contains("collection closed"));

        // Plain transfers never ask the recipient.
        let err = Error::from_call_revert(
            "transferFrom(address,address,uint256)",
            &data,
        );
        assert_eq!(err.kind(), ErrorKind::TransactionFailed);

        // The collection's own errors keep their kind.
        let data = ERC721InsufficientApproval {
            operator: BOB,
            tokenId: uint!(1_U256),
        }
        .abi_encode();
        let err = Error::from_call_revert(TRANSFER, &data);
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = Error::from_call_revert(TRANSFER, &[]);
        assert_eq!(err.kind(), ErrorKind::TransactionFailed);
    }
}
