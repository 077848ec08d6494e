//! Caller identities.
use std::{fmt, str::FromStr};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};

use crate::error::Error;

/// An account identity: an address and, optionally, the key that signs on its
/// behalf.
///
/// Accounts without a signer are watch-only. They can be used as arguments and
/// for read calls, but a client bound to one cannot submit transactions.
#[derive(Clone)]
pub struct Account {
    address: Address,
    signer: Option<PrivateKeySigner>,
}

impl Account {
    /// Create a signing account from a local private key wrapper.
    #[must_use]
    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        Self { address: signer.address(), signer: Some(signer) }
    }

    /// Create a signing account from a hex-encoded private key.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidAccount`] - If `key` is not a valid secp256k1 key.
    pub fn from_private_key(key: &str) -> Result<Self, Error> {
        key.trim()
            .parse::<PrivateKeySigner>()
            .map(Self::from_signer)
            .map_err(|e| Error::InvalidAccount(format!("bad private key: {e}")))
    }

    /// Create a signing account with a freshly generated key.
    #[must_use]
    pub fn random() -> Self {
        Self::from_signer(PrivateKeySigner::random())
    }

    /// Create a watch-only account.
    #[must_use]
    pub fn watch_only(address: Address) -> Self {
        Self { address, signer: None }
    }

    /// Retrieve this account's address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// The account's local private key wrapper, if it can sign.
    #[must_use]
    pub fn signer(&self) -> Option<&PrivateKeySigner> {
        self.signer.as_ref()
    }

    /// Whether transactions can be submitted on behalf of this account.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Drop the signing capability, keeping the identity.
    #[must_use]
    pub fn to_watch_only(&self) -> Self {
        Self::watch_only(self.address)
    }
}

// Keys never end up in logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.address, f)
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.can_sign() == other.can_sign()
    }
}

impl Eq for Account {}

impl From<&Account> for Address {
    fn from(account: &Account) -> Self {
        account.address
    }
}

impl FromStr for Account {
    type Err = Error;

    /// Parses a watch-only account from a hex address.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Address>()
            .map(Self::watch_only)
            .map_err(|e| Error::InvalidAccount(format!("`{s}`: {e}")))
    }
}
