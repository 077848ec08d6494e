//! Basic access control, where one account (the owner) is granted exclusive
//! access to specific functions.
//!
//! The initial owner is the account that deployed the contract. Functions are
//! restricted to the owner through [`Ownable::only_owner`].
use alloy::primitives::Address;
use econft_client::abi::IEcoNft::{
    OwnableInvalidOwner, OwnableUnauthorizedAccount,
};

/// An [`Ownable`] error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Error {
    /// The caller account is not authorized to perform an operation.
    UnauthorizedAccount(OwnableUnauthorizedAccount),
    /// The owner is not a valid owner account.
    InvalidOwner(OwnableInvalidOwner),
}

/// State of an [`Ownable`] contract.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Make `initial_owner` the owner.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidOwner`] - If `initial_owner` is `Address::ZERO`.
    pub(crate) fn new(initial_owner: Address) -> Result<Self, Error> {
        if initial_owner.is_zero() {
            return Err(Error::InvalidOwner(OwnableInvalidOwner {
                owner: Address::ZERO,
            }));
        }
        Ok(Self { owner: initial_owner })
    }

    /// The address of the current owner.
    pub(crate) fn owner(&self) -> Address {
        self.owner
    }

    /// Checks if `sender` is the owner.
    ///
    /// # Errors
    ///
    /// * [`Error::UnauthorizedAccount`] - If called by any account other than
    ///   the owner.
    pub(crate) fn only_owner(&self, sender: Address) -> Result<(), Error> {
        if sender != self.owner {
            return Err(Error::UnauthorizedAccount(
                OwnableUnauthorizedAccount { account: sender },
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Address};

    use super::{Error, Ownable};

    const ALICE: Address = address!("A11CEacF9aa32246d767FCCD72e02d6bCbcC375d");
    const BOB: Address = address!("F4EaCDAbEf3c8f1EdE91b6f2A6840bc2E4DD3526");

    #[test]
    fn reads_owner() {
        let contract = Ownable::new(ALICE).expect("should own");
        assert_eq!(contract.owner(), ALICE);
        assert!(contract.only_owner(ALICE).is_ok());
    }

    #[test]
    fn error_when_not_owner() {
        let contract = Ownable::new(ALICE).expect("should own");
        let err = contract.only_owner(BOB).expect_err("should reject Bob");
        assert!(
            matches!(err, Error::UnauthorizedAccount(e) if e.account == BOB)
        );
    }

    #[test]
    fn error_when_owner_is_zero() {
        let err = Ownable::new(Address::ZERO).expect_err("should reject zero");
        assert!(matches!(err, Error::InvalidOwner(e) if e.owner.is_zero()));
    }
}
