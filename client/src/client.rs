//! Typed access to a deployed EcoNFT collection.
use alloy::{
    primitives::{aliases::B32, Address, Bytes, U256},
    sol_types::SolCall,
};

use crate::{
    abi::IEcoNft,
    account::Account,
    error::{Error, Result},
    event::Erc721Event,
    pending::PendingTransaction,
    remote::Remote,
    token::TokenId,
};

/// A handle to one collection contract, acting as one account.
///
/// Read calls return decoded values. Write calls return a
/// [`PendingTransaction`] that must be confirmed before their effects can be
/// relied upon. Ownership and approvals are never cached, every read queries
/// the remote.
#[derive(Clone, Debug)]
pub struct Erc721Client<R> {
    remote: R,
    address: Address,
    account: Account,
}

impl<R: Remote> Erc721Client<R> {
    /// Bind to the contract deployed at `address`, acting as `account`.
    pub fn new(remote: R, address: Address, account: Account) -> Self {
        Self { remote, address, account }
    }

    /// A client for the same contract and remote acting as `account`.
    #[must_use]
    pub fn connect(&self, account: Account) -> Self {
        Self::new(self.remote.clone(), self.address, account)
    }

    /// Address of the contract.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The account this client acts as.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The remote this client talks to.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Name of the collection.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] - If the remote could not be reached.
    pub async fn name(&self) -> Result<String> {
        self.call(IEcoNft::nameCall {}).await
    }

    /// Symbol of the collection.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] - If the remote could not be reached.
    pub async fn symbol(&self) -> Result<String> {
        self.call(IEcoNft::symbolCall {}).await
    }

    /// Number of tokens owned by `owner`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidAccount`] - If `owner` is the zero address.
    pub async fn balance_of(&self, owner: Address) -> Result<U256> {
        self.call(IEcoNft::balanceOfCall { owner }).await
    }

    /// Owner of `token_id`.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownToken`] - If `token_id` was never minted.
    pub async fn owner_of(&self, token_id: TokenId) -> Result<Address> {
        self.call(IEcoNft::ownerOfCall { tokenId: token_id.into() }).await
    }

    /// Mint `token_id` to `to`.
    ///
    /// # Errors
    ///
    /// * [`Error::ReadOnly`] - If the client's account cannot sign.
    /// * [`Error::Unauthorized`] - If the account may not mint.
    /// * [`Error::DuplicateToken`] - If `token_id` already exists.
    /// * [`Error::InvalidRecipient`] - If `to` cannot receive tokens.
    pub async fn mint(
        &self,
        to: Address,
        token_id: TokenId,
    ) -> Result<PendingTransaction<R>> {
        self.send(IEcoNft::mintCollectionNFTCall {
            collector: to,
            tokenId: token_id.into(),
        })
        .await
    }

    /// Move `token_id` from `from` to `to`, checking that a contract
    /// recipient accepts it.
    ///
    /// # Errors
    ///
    /// * [`Error::ReadOnly`] - If the client's account cannot sign.
    /// * [`Error::Unauthorized`] - If the account is neither the owner, nor
    ///   approved for the token, nor an operator of the owner, or if `from`
    ///   is not the owner.
    /// * [`Error::UnknownToken`] - If `token_id` does not exist.
    /// * [`Error::InvalidRecipient`] - If `to` cannot receive tokens.
    pub async fn transfer(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<PendingTransaction<R>> {
        self.send(IEcoNft::safeTransferFrom_0Call {
            from,
            to,
            tokenId: token_id.into(),
        })
        .await
    }

    /// Like [`Erc721Client::transfer`], forwarding `data` to the recipient's
    /// `onERC721Received` hook.
    ///
    /// # Errors
    ///
    /// See [`Erc721Client::transfer`].
    pub async fn transfer_with_data(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
        data: Bytes,
    ) -> Result<PendingTransaction<R>> {
        self.send(IEcoNft::safeTransferFrom_1Call {
            from,
            to,
            tokenId: token_id.into(),
            data,
        })
        .await
    }

    /// Move `token_id` from `from` to `to` without asking contract recipients.
    ///
    /// Tokens sent to contracts that cannot handle them are lost.
    ///
    /// # Errors
    ///
    /// See [`Erc721Client::transfer`], except that contract recipients are
    /// not checked.
    pub async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<PendingTransaction<R>> {
        self.send(IEcoNft::transferFromCall {
            from,
            to,
            tokenId: token_id.into(),
        })
        .await
    }

    /// Allow `operator` to transfer `token_id`. The zero address clears the
    /// approval.
    ///
    /// # Errors
    ///
    /// * [`Error::ReadOnly`] - If the client's account cannot sign.
    /// * [`Error::Unauthorized`] - If the account is neither the owner nor an
    ///   operator of the owner.
    /// * [`Error::UnknownToken`] - If `token_id` does not exist.
    pub async fn approve(
        &self,
        operator: Address,
        token_id: TokenId,
    ) -> Result<PendingTransaction<R>> {
        self.send(IEcoNft::approveCall {
            to: operator,
            tokenId: token_id.into(),
        })
        .await
    }

    /// Account approved for `token_id`, if any.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownToken`] - If `token_id` does not exist.
    pub async fn get_approved(
        &self,
        token_id: TokenId,
    ) -> Result<Option<Address>> {
        let approved = self
            .call(IEcoNft::getApprovedCall { tokenId: token_id.into() })
            .await?;
        Ok((!approved.is_zero()).then_some(approved))
    }

    /// Allow or forbid `operator` to manage all tokens of the client's
    /// account.
    ///
    /// # Errors
    ///
    /// * [`Error::ReadOnly`] - If the client's account cannot sign.
    /// * [`Error::InvalidAccount`] - If `operator` is the zero address.
    pub async fn set_approval_for_all(
        &self,
        operator: Address,
        approved: bool,
    ) -> Result<PendingTransaction<R>> {
        self.send(IEcoNft::setApprovalForAllCall { operator, approved }).await
    }

    /// Whether `operator` may manage all tokens of `owner`.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] - If the remote could not be reached.
    pub async fn is_approved_for_all(
        &self,
        owner: Address,
        operator: Address,
    ) -> Result<bool> {
        self.call(IEcoNft::isApprovedForAllCall { owner, operator }).await
    }

    /// The account allowed to mint.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] - If the remote could not be reached.
    pub async fn owner(&self) -> Result<Address> {
        self.call(IEcoNft::ownerCall {}).await
    }

    /// Whether the contract implements the ERC-165 interface `interface_id`.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] - If the remote could not be reached.
    pub async fn supports_interface(&self, interface_id: B32) -> Result<bool> {
        self.call(IEcoNft::supportsInterfaceCall { interfaceId: interface_id })
            .await
    }

    /// Collection events emitted in blocks starting at `from_block`.
    ///
    /// # Errors
    ///
    /// * [`Error::Transport`] - If the remote could not be reached.
    pub async fn events(&self, from_block: u64) -> Result<Vec<Erc721Event>> {
        let logs = self.remote.logs(self.address, from_block).await?;
        Ok(logs
            .iter()
            .filter(|log| log.address == self.address)
            .filter_map(Erc721Event::decode)
            .collect())
    }

    async fn call<C: SolCall + Send>(&self, call: C) -> Result<C::Return> {
        let output = self
            .remote
            .call(
                self.account.address(),
                self.address,
                call.abi_encode().into(),
            )
            .await?;
        C::abi_decode_returns(&output)
            .map_err(|e| Error::Decode(format!("{}: {e}", C::SIGNATURE)))
    }

    async fn send<C: SolCall + Send>(
        &self,
        call: C,
    ) -> Result<PendingTransaction<R>> {
        if !self.account.can_sign() {
            return Err(Error::ReadOnly(self.account.address()));
        }
        let tx_hash = self
            .remote
            .submit(&self.account, self.address, call.abi_encode().into())
            .await
            .map_err(|e| Error::from_remote(C::SIGNATURE, e))?;
        Ok(PendingTransaction::new(self.remote.clone(), tx_hash, C::SIGNATURE))
    }
}
