//! The EcoNFT collection: an ERC-721 token whose owner mints tokens to
//! collectors.
use std::collections::HashMap;

use alloy::{
    primitives::{aliases::B32, uint, Address, Bytes, U256},
    sol_types::{SolError, SolInterface, SolValue},
};
use econft_client::abi::{
    IEcoNft::{
        Approval, ApprovalForAll, ERC721IncorrectOwner,
        ERC721InsufficientApproval, ERC721InvalidApprover,
        ERC721InvalidOperator, ERC721InvalidOwner, ERC721InvalidReceiver,
        ERC721InvalidSender, ERC721NonexistentToken, IEcoNftCalls, Transfer,
    },
    ERC165_INTERFACE_ID, ERC721_INTERFACE_ID, RECEIVER_FN_SELECTOR,
};

use crate::{evm::Env, ownable, ownable::Ownable};

/// An [`EcoNft`] error defined as described in [ERC-6093].
///
/// [ERC-6093]: https://eips.ethereum.org/EIPS/eip-6093
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Error {
    /// Indicates that an address can't be an owner.
    InvalidOwner(ERC721InvalidOwner),
    /// Indicates a `token_id` whose `owner` is the zero address.
    NonexistentToken(ERC721NonexistentToken),
    /// Indicates an error related to the ownership over a particular token.
    IncorrectOwner(ERC721IncorrectOwner),
    /// Indicates a failure with the token `sender`.
    InvalidSender(ERC721InvalidSender),
    /// Indicates a failure with the token `receiver`.
    InvalidReceiver(ERC721InvalidReceiver),
    /// The receiver reverted with a reason, which is bubbled up as is.
    InvalidReceiverWithReason(Bytes),
    /// Indicates a failure with the `operator`’s approval.
    InsufficientApproval(ERC721InsufficientApproval),
    /// Indicates a failure with the `approver` of a token to be approved.
    InvalidApprover(ERC721InvalidApprover),
    /// Indicates a failure with the `operator` to be approved.
    InvalidOperator(ERC721InvalidOperator),
    /// Minting rights were violated.
    Ownable(ownable::Error),
}

macro_rules! impl_from_sol_error {
    ($($variant:ident($err:ty)),* $(,)?) => {
        $(
            impl From<$err> for Error {
                fn from(value: $err) -> Self {
                    Error::$variant(value)
                }
            }
        )*

        impl From<Error> for Bytes {
            fn from(value: Error) -> Self {
                match value {
                    $(Error::$variant(e) => e.abi_encode().into(),)*
                    Error::InvalidReceiverWithReason(data) => data,
                    Error::Ownable(ownable::Error::UnauthorizedAccount(e)) => {
                        e.abi_encode().into()
                    }
                    Error::Ownable(ownable::Error::InvalidOwner(e)) => {
                        e.abi_encode().into()
                    }
                }
            }
        }
    };
}

impl_from_sol_error! {
    InvalidOwner(ERC721InvalidOwner),
    NonexistentToken(ERC721NonexistentToken),
    IncorrectOwner(ERC721IncorrectOwner),
    InvalidSender(ERC721InvalidSender),
    InvalidReceiver(ERC721InvalidReceiver),
    InsufficientApproval(ERC721InsufficientApproval),
    InvalidApprover(ERC721InvalidApprover),
    InvalidOperator(ERC721InvalidOperator),
}

impl From<ownable::Error> for Error {
    fn from(value: ownable::Error) -> Self {
        Error::Ownable(value)
    }
}

/// State of an [`EcoNft`] collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EcoNft {
    name: String,
    symbol: String,
    ownable: Ownable,
    /// Maps tokens to owners.
    owners: HashMap<U256, Address>,
    /// Maps users to balances.
    balances: HashMap<Address, U256>,
    /// Maps tokens to approvals.
    token_approvals: HashMap<U256, Address>,
    /// Maps owners to a mapping of operator approvals.
    operator_approvals: HashMap<Address, HashMap<Address, bool>>,
}

impl EcoNft {
    /// Create a collection owned by `owner`.
    ///
    /// # Errors
    ///
    /// * [`Error::Ownable`] - If `owner` is `Address::ZERO`.
    pub(crate) fn new(
        owner: Address,
        name: &str,
        symbol: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            ownable: Ownable::new(owner)?,
            owners: HashMap::new(),
            balances: HashMap::new(),
            token_approvals: HashMap::new(),
            operator_approvals: HashMap::new(),
        })
    }

    /// Decode `input`, run the called method and encode its result.
    pub(crate) fn execute(
        &mut self,
        env: &mut Env<'_>,
        input: &[u8],
    ) -> Result<Bytes, Bytes> {
        // Unknown selectors hit a missing fallback.
        let call = IEcoNftCalls::abi_decode(input).map_err(|_| Bytes::new())?;
        let sender = env.sender();

        let output = match call {
            IEcoNftCalls::name(_) => (self.name.clone(),).abi_encode_params(),
            IEcoNftCalls::symbol(_) => {
                (self.symbol.clone(),).abi_encode_params()
            }
            IEcoNftCalls::owner(_) => {
                (self.ownable.owner(),).abi_encode_params()
            }
            IEcoNftCalls::supportsInterface(c) => {
                (Self::supports_interface(c.interfaceId),).abi_encode_params()
            }
            IEcoNftCalls::balanceOf(c) => {
                (self.balance_of(c.owner)?,).abi_encode_params()
            }
            IEcoNftCalls::ownerOf(c) => {
                (self.owner_of(c.tokenId)?,).abi_encode_params()
            }
            IEcoNftCalls::mintCollectionNFT(c) => {
                self.mint_collection_nft(env, c.collector, c.tokenId)?;
                Vec::new()
            }
            IEcoNftCalls::safeTransferFrom_0(c) => {
                self.safe_transfer_from(env, c.from, c.to, c.tokenId)?;
                Vec::new()
            }
            IEcoNftCalls::safeTransferFrom_1(c) => {
                self.safe_transfer_from_with_data(
                    env, c.from, c.to, c.tokenId, &c.data,
                )?;
                Vec::new()
            }
            IEcoNftCalls::transferFrom(c) => {
                self.transfer_from(env, c.from, c.to, c.tokenId)?;
                Vec::new()
            }
            IEcoNftCalls::approve(c) => {
                self.approve(env, c.to, c.tokenId, sender, true)?;
                Vec::new()
            }
            IEcoNftCalls::getApproved(c) => {
                (self.get_approved(c.tokenId)?,).abi_encode_params()
            }
            IEcoNftCalls::setApprovalForAll(c) => {
                self.set_approval_for_all(env, sender, c.operator, c.approved)?;
                Vec::new()
            }
            IEcoNftCalls::isApprovedForAll(c) => {
                (self.is_approved_for_all(c.owner, c.operator),)
                    .abi_encode_params()
            }
        };
        Ok(output.into())
    }

    /// Mints `token_id` to `collector`. Only the owner may mint.
    ///
    /// # Errors
    ///
    /// * [`Error::Ownable`] - If the caller is not the owner.
    /// * [`Error::InvalidSender`] - If `token_id` already exists.
    /// * [`Error::InvalidReceiver`] - If `collector` is `Address::ZERO`, or a
    ///   contract that does not accept the token.
    ///
    /// # Events
    ///
    /// * [`Transfer`].
    pub(crate) fn mint_collection_nft(
        &mut self,
        env: &mut Env<'_>,
        collector: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        self.ownable.only_owner(env.sender())?;
        self.safe_mint(env, collector, token_id, &Bytes::new())
    }

    pub(crate) fn balance_of(&self, owner: Address) -> Result<U256, Error> {
        if owner.is_zero() {
            return Err(ERC721InvalidOwner { owner: Address::ZERO }.into());
        }
        Ok(self.balances.get(&owner).copied().unwrap_or_default())
    }

    pub(crate) fn owner_of(&self, token_id: U256) -> Result<Address, Error> {
        self.require_owned(token_id)
    }

    pub(crate) fn safe_transfer_from(
        &mut self,
        env: &mut Env<'_>,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        self.safe_transfer_from_with_data(
            env,
            from,
            to,
            token_id,
            &Bytes::new(),
        )
    }

    pub(crate) fn safe_transfer_from_with_data(
        &mut self,
        env: &mut Env<'_>,
        from: Address,
        to: Address,
        token_id: U256,
        data: &Bytes,
    ) -> Result<(), Error> {
        let operator = env.sender();
        self.transfer_from(env, from, to, token_id)?;
        self.check_on_erc721_received(env, operator, from, to, token_id, data)
    }

    /// Transfers `token_id` from `from` to `to` on behalf of the caller.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::NonexistentToken`] - If the token does not exist.
    /// * [`Error::InsufficientApproval`] - If the caller is not allowed to
    ///   manage the token.
    /// * [`Error::IncorrectOwner`] - If the previous owner is not `from`.
    pub(crate) fn transfer_from(
        &mut self,
        env: &mut Env<'_>,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        if to.is_zero() {
            return Err(
                ERC721InvalidReceiver { receiver: Address::ZERO }.into()
            );
        }

        // The auth check also verifies that the token exists.
        let auth = env.sender();
        let previous_owner = self.update(env, to, token_id, auth)?;
        if previous_owner != from {
            return Err(ERC721IncorrectOwner {
                sender: from,
                tokenId: token_id,
                owner: previous_owner,
            }
            .into());
        }
        Ok(())
    }

    pub(crate) fn get_approved(
        &self,
        token_id: U256,
    ) -> Result<Address, Error> {
        self.require_owned(token_id)?;
        Ok(self.token_approval(token_id))
    }

    pub(crate) fn is_approved_for_all(
        &self,
        owner: Address,
        operator: Address,
    ) -> bool {
        self.operator_approvals
            .get(&owner)
            .and_then(|operators| operators.get(&operator))
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn supports_interface(interface_id: B32) -> bool {
        interface_id == ERC721_INTERFACE_ID
            || interface_id == ERC165_INTERFACE_ID
    }

    fn token_approval(&self, token_id: U256) -> Address {
        self.token_approvals.get(&token_id).copied().unwrap_or_default()
    }

    /// Returns whether `spender` may manage `owner`'s tokens, or `token_id` in
    /// particular, assuming `owner` owns `token_id`.
    fn is_authorized(
        &self,
        owner: Address,
        spender: Address,
        token_id: U256,
    ) -> bool {
        !spender.is_zero()
            && (owner == spender
                || self.is_approved_for_all(owner, spender)
                || self.token_approval(token_id) == spender)
    }

    fn check_authorized(
        &self,
        owner: Address,
        operator: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        if self.is_authorized(owner, operator, token_id) {
            return Ok(());
        }

        if owner.is_zero() {
            Err(ERC721NonexistentToken { tokenId: token_id }.into())
        } else {
            Err(ERC721InsufficientApproval { operator, tokenId: token_id }
                .into())
        }
    }

    /// Moves `token_id` to `to`, minting it when it has no owner. Returns the
    /// owner before the update.
    ///
    /// When `auth` is non-zero it must be allowed to manage the token.
    fn update(
        &mut self,
        env: &mut Env<'_>,
        to: Address,
        token_id: U256,
        auth: Address,
    ) -> Result<Address, Error> {
        let from = self.owners.get(&token_id).copied().unwrap_or_default();

        if !auth.is_zero() {
            self.check_authorized(from, auth, token_id)?;
        }

        if !from.is_zero() {
            // Clear approval without emitting `Approval`.
            self.token_approvals.remove(&token_id);
            let balance = self.balances.entry(from).or_default();
            *balance -= uint!(1_U256);
        }

        if !to.is_zero() {
            *self.balances.entry(to).or_default() += uint!(1_U256);
        }

        self.owners.insert(token_id, to);
        env.log(&Transfer { from, to, tokenId: token_id });
        Ok(from)
    }

    fn mint(
        &mut self,
        env: &mut Env<'_>,
        to: Address,
        token_id: U256,
    ) -> Result<(), Error> {
        if to.is_zero() {
            return Err(
                ERC721InvalidReceiver { receiver: Address::ZERO }.into()
            );
        }

        let previous_owner = self.update(env, to, token_id, Address::ZERO)?;
        if !previous_owner.is_zero() {
            return Err(ERC721InvalidSender { sender: Address::ZERO }.into());
        }
        Ok(())
    }

    fn safe_mint(
        &mut self,
        env: &mut Env<'_>,
        to: Address,
        token_id: U256,
        data: &Bytes,
    ) -> Result<(), Error> {
        let operator = env.sender();
        self.mint(env, to, token_id)?;
        self.check_on_erc721_received(
            env,
            operator,
            Address::ZERO,
            to,
            token_id,
            data,
        )
    }

    /// Approve `to` to operate on `token_id`.
    ///
    /// When `auth` is non-zero it must be the owner or an operator of the
    /// owner.
    pub(crate) fn approve(
        &mut self,
        env: &mut Env<'_>,
        to: Address,
        token_id: U256,
        auth: Address,
        emit_event: bool,
    ) -> Result<(), Error> {
        if emit_event || !auth.is_zero() {
            let owner = self.require_owned(token_id)?;

            // Single-token approvals may not approve.
            if !auth.is_zero()
                && owner != auth
                && !self.is_approved_for_all(owner, auth)
            {
                return Err(ERC721InvalidApprover { approver: auth }.into());
            }

            if emit_event {
                env.log(&Approval { owner, approved: to, tokenId: token_id });
            }
        }

        self.token_approvals.insert(token_id, to);
        Ok(())
    }

    pub(crate) fn set_approval_for_all(
        &mut self,
        env: &mut Env<'_>,
        owner: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), Error> {
        if operator.is_zero() {
            return Err(ERC721InvalidOperator { operator }.into());
        }

        self.operator_approvals
            .entry(owner)
            .or_default()
            .insert(operator, approved);
        env.log(&ApprovalForAll { owner, operator, approved });
        Ok(())
    }

    fn require_owned(&self, token_id: U256) -> Result<Address, Error> {
        match self.owners.get(&token_id) {
            Some(owner) if !owner.is_zero() => Ok(*owner),
            _ => Err(ERC721NonexistentToken { tokenId: token_id }.into()),
        }
    }

    /// Performs the acceptance check on contract recipients. Accounts without
    /// code always accept.
    fn check_on_erc721_received(
        &mut self,
        env: &mut Env<'_>,
        operator: Address,
        from: Address,
        to: Address,
        token_id: U256,
        data: &Bytes,
    ) -> Result<(), Error> {
        if !env.has_code(to) {
            return Ok(());
        }

        match env.on_erc721_received(to, operator, from, token_id, data) {
            Ok(id) if id == RECEIVER_FN_SELECTOR => Ok(()),
            // Token rejected.
            Ok(_) => Err(ERC721InvalidReceiver { receiver: to }.into()),
            // Non-IERC721Receiver implementer.
            Err(reason) if reason.is_empty() => {
                Err(ERC721InvalidReceiver { receiver: to }.into())
            }
            Err(reason) => Err(Error::InvalidReceiverWithReason(reason)),
        }
    }

    /// Number of tokens owned by each account, computed from ownership.
    #[cfg(test)]
    pub(crate) fn owned_counts(&self) -> HashMap<Address, U256> {
        let mut counts = HashMap::new();
        for owner in self.owners.values().filter(|o| !o.is_zero()) {
            *counts.entry(*owner).or_insert(U256::ZERO) += uint!(1_U256);
        }
        counts
    }

    /// Balances of every account that ever held a token.
    #[cfg(test)]
    pub(crate) fn balances(&self) -> &HashMap<Address, U256> {
        &self.balances
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use alloy::primitives::{address, uint, Address, Bytes, U256};
    use econft_client::abi::{
        IEcoNft::{
            ERC721IncorrectOwner, ERC721InsufficientApproval,
            ERC721InvalidApprover, ERC721InvalidOperator, ERC721InvalidOwner,
            ERC721InvalidReceiver, ERC721InvalidSender, ERC721NonexistentToken,
        },
        ERC721_INTERFACE_ID,
    };

    use super::{EcoNft, Error};
    use crate::{
        evm::{Contract, Env},
        ownable,
        receiver::Receiver,
    };

    const OWNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const ALICE: Address = address!("A11CEacF9aa32246d767FCCD72e02d6bCbcC375d");
    const BOB: Address = address!("F4EaCDAbEf3c8f1EdE91b6f2A6840bc2E4DD3526");
    const DAVE: Address = address!("0BB78F7e7132d1651B4Fd884B7624394e92156F1");
    const THIS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

    const TOKEN_ID: U256 = uint!(1_U256);

    fn contract() -> EcoNft {
        EcoNft::new(OWNER, "EcoNFT", "ECO").expect("should deploy")
    }

    fn env(sender: Address, code: &HashMap<Address, Contract>) -> Env<'_> {
        Env::new(sender, THIS, code)
    }

    fn minted(to: Address) -> EcoNft {
        let mut contract = contract();
        let code = HashMap::new();
        contract
            .mint_collection_nft(&mut env(OWNER, &code), to, TOKEN_ID)
            .expect("should mint");
        contract
    }

    #[test]
    fn error_when_checking_balance_of_invalid_owner() {
        let err = contract()
            .balance_of(Address::ZERO)
            .expect_err("should return `Error::InvalidOwner`");
        assert!(matches!(
            err,
            Error::InvalidOwner(ERC721InvalidOwner { owner: Address::ZERO })
        ));
    }

    #[test]
    fn error_when_checking_owner_of_nonexistent_token() {
        let err = contract()
            .owner_of(TOKEN_ID)
            .expect_err("should return `Error::NonexistentToken`");
        assert!(matches!(
            err,
            Error::NonexistentToken(ERC721NonexistentToken {
                tokenId: token_id,
            })
                if token_id == TOKEN_ID
        ));
    }

    #[test]
    fn mints() {
        let contract = minted(ALICE);
        assert_eq!(contract.owner_of(TOKEN_ID).unwrap(), ALICE);
        assert_eq!(contract.balance_of(ALICE).unwrap(), uint!(1_U256));
    }

    #[test]
    fn error_when_minting_token_id_twice() {
        let mut contract = minted(ALICE);
        let code = HashMap::new();
        let err = contract
            .mint_collection_nft(&mut env(OWNER, &code), BOB, TOKEN_ID)
            .expect_err("should not mint a token twice");
        assert!(matches!(
            err,
            Error::InvalidSender(ERC721InvalidSender { sender: Address::ZERO })
        ));
    }

    #[test]
    fn error_when_minting_without_ownership() {
        let mut contract = contract();
        let code = HashMap::new();
        let err = contract
            .mint_collection_nft(&mut env(ALICE, &code), ALICE, TOKEN_ID)
            .expect_err("should only let the owner mint");
        assert!(matches!(
            err,
            Error::Ownable(ownable::Error::UnauthorizedAccount(e))
                if e.account == ALICE
        ));
    }

    #[test]
    fn error_when_minting_to_zero_address() {
        let mut contract = contract();
        let code = HashMap::new();
        let err = contract
            .mint_collection_nft(
                &mut env(OWNER, &code),
                Address::ZERO,
                TOKEN_ID,
            )
            .expect_err("should not mint to zero");
        assert!(matches!(
            err,
            Error::InvalidReceiver(ERC721InvalidReceiver {
                receiver: Address::ZERO
            })
        ));
    }

    #[test]
    fn transfers_from_approved_token() {
        let mut contract = minted(ALICE);
        let code = HashMap::new();
        contract
            .approve(&mut env(ALICE, &code), BOB, TOKEN_ID, ALICE, true)
            .expect("should approve Bob");
        contract
            .transfer_from(&mut env(BOB, &code), ALICE, BOB, TOKEN_ID)
            .expect("should transfer as approved");

        assert_eq!(contract.owner_of(TOKEN_ID).unwrap(), BOB);
        assert_eq!(contract.get_approved(TOKEN_ID).unwrap(), Address::ZERO);
        assert_eq!(contract.balance_of(ALICE).unwrap(), U256::ZERO);
    }

    #[test]
    fn transfers_from_approved_for_all() {
        let mut contract = minted(ALICE);
        let code = HashMap::new();
        contract
            .set_approval_for_all(&mut env(ALICE, &code), ALICE, BOB, true)
            .expect("should approve Bob for all");
        contract
            .transfer_from(&mut env(BOB, &code), ALICE, DAVE, TOKEN_ID)
            .expect("should transfer as operator");
        assert_eq!(contract.owner_of(TOKEN_ID).unwrap(), DAVE);
    }

    #[test]
    fn error_when_transfer_from_incorrect_owner() {
        let mut contract = minted(ALICE);
        let code = HashMap::new();
        let err = contract
            .transfer_from(&mut env(ALICE, &code), DAVE, BOB, TOKEN_ID)
            .expect_err("should reject the wrong owner");
        assert!(matches!(
            err,
            Error::IncorrectOwner(ERC721IncorrectOwner { sender, owner, .. })
                if sender == DAVE && owner == ALICE
        ));
    }

    #[test]
    fn error_when_transfer_with_insufficient_approval() {
        let mut contract = minted(ALICE);
        let code = HashMap::new();
        let err = contract
            .transfer_from(&mut env(BOB, &code), ALICE, BOB, TOKEN_ID)
            .expect_err("should reject Bob");
        assert!(matches!(
            err,
            Error::InsufficientApproval(ERC721InsufficientApproval {
                operator,
                ..
            }) if operator == BOB
        ));
    }

    #[test]
    fn error_when_approving_without_rights() {
        let mut contract = minted(ALICE);
        let code = HashMap::new();
        let err = contract
            .approve(&mut env(BOB, &code), BOB, TOKEN_ID, BOB, true)
            .expect_err("should reject Bob");
        assert!(matches!(
            err,
            Error::InvalidApprover(ERC721InvalidApprover { approver })
                if approver == BOB
        ));
    }

    #[test]
    fn error_when_operator_is_zero() {
        let mut contract = contract();
        let code = HashMap::new();
        let err = contract
            .set_approval_for_all(
                &mut env(ALICE, &code),
                ALICE,
                Address::ZERO,
                true,
            )
            .expect_err("should reject the zero operator");
        assert!(matches!(
            err,
            Error::InvalidOperator(ERC721InvalidOperator { .. })
        ));
    }

    #[test]
    fn safe_transfer_checks_receivers() {
        let mut code = HashMap::new();
        code.insert(BOB, Contract::Receiver(Receiver::Accept));
        code.insert(DAVE, Contract::Receiver(Receiver::WrongSelector));

        let mut contract = minted(ALICE);
        let err = contract
            .safe_transfer_from(&mut env(ALICE, &code), ALICE, DAVE, TOKEN_ID)
            .expect_err("should be rejected by Dave");
        assert!(matches!(
            err,
            Error::InvalidReceiver(ERC721InvalidReceiver { receiver })
                if receiver == DAVE
        ));

        let mut contract = minted(ALICE);
        let mut env = env(ALICE, &code);
        contract
            .safe_transfer_from_with_data(
                &mut env,
                ALICE,
                BOB,
                TOKEN_ID,
                &Bytes::from_static(b"eco"),
            )
            .expect("should be accepted by Bob");
        // Transfer from the collection, `Received` from Bob.
        let logs = env.into_logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].address, BOB);
    }

    #[test]
    fn receiver_revert_reason_bubbles_up() {
        let mut code = HashMap::new();
        code.insert(BOB, Contract::Receiver(Receiver::Revert("nope".into())));

        let mut contract = minted(ALICE);
        let err = contract
            .safe_transfer_from(&mut env(ALICE, &code), ALICE, BOB, TOKEN_ID)
            .expect_err("should be rejected by Bob");
        assert!(matches!(
            err,
            Error::InvalidReceiverWithReason(ref r) if !r.is_empty()
        ));
    }

    #[test]
    fn supports_interface() {
        assert!(EcoNft::supports_interface(ERC721_INTERFACE_ID));
        assert!(!EcoNft::supports_interface([0xff; 4].into()));
    }
}

#[cfg(test)]
mod proptests {
    use std::collections::HashMap;

    use alloy::primitives::{Address, U256};
    use proptest::prelude::*;

    use super::EcoNft;
    use crate::evm::Env;

    const OWNER: Address = Address::new([0x01; 20]);

    fn account(i: u8) -> Address {
        Address::repeat_byte(0x10 + i)
    }

    #[derive(Clone, Debug)]
    enum Op {
        Mint { to: u8, token: u8 },
        Transfer { caller: u8, from: u8, to: u8, token: u8 },
        Approve { caller: u8, operator: u8, token: u8 },
        ApproveAll { caller: u8, operator: u8, approved: bool },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..4u8, 0..6u8).prop_map(|(to, token)| Op::Mint { to, token }),
            (0..4u8, 0..4u8, 0..4u8, 0..6u8).prop_map(
                |(caller, from, to, token)| Op::Transfer {
                    caller,
                    from,
                    to,
                    token
                }
            ),
            (0..4u8, 0..4u8, 0..6u8).prop_map(|(caller, operator, token)| {
                Op::Approve { caller, operator, token }
            }),
            (0..4u8, 0..4u8, any::<bool>()).prop_map(
                |(caller, operator, approved)| Op::ApproveAll {
                    caller,
                    operator,
                    approved
                }
            ),
        ]
    }

    proptest! {
        #[test]
        fn balances_track_ownership(ops in prop::collection::vec(op(), 1..64)) {
            let mut contract =
                EcoNft::new(OWNER, "EcoNFT", "ECO").expect("should deploy");
            let code = HashMap::new();

            for op in ops {
                // Execution is transactional: failed operations are dropped.
                let mut next = contract.clone();
                let ok = match op {
                    Op::Mint { to, token } => next
                        .mint_collection_nft(
                            &mut Env::new(OWNER, OWNER, &code),
                            account(to),
                            U256::from(token),
                        )
                        .is_ok(),
                    Op::Transfer { caller, from, to, token } => {
                        let token = U256::from(token);
                        let approved = next.get_approved(token).ok();
                        let ok = next
                            .transfer_from(
                                &mut Env::new(account(caller), OWNER, &code),
                                account(from),
                                account(to),
                                token,
                            )
                            .is_ok();
                        if ok {
                            prop_assert_eq!(
                                next.owner_of(token).ok(),
                                Some(account(to))
                            );
                            prop_assert_eq!(
                                next.get_approved(token).ok(),
                                Some(Address::ZERO)
                            );
                            prop_assert!(approved.is_some());
                        }
                        ok
                    }
                    Op::Approve { caller, operator, token } => next
                        .approve(
                            &mut Env::new(account(caller), OWNER, &code),
                            account(operator),
                            U256::from(token),
                            account(caller),
                            true,
                        )
                        .is_ok(),
                    Op::ApproveAll { caller, operator, approved } => next
                        .set_approval_for_all(
                            &mut Env::new(account(caller), OWNER, &code),
                            account(caller),
                            account(operator),
                            approved,
                        )
                        .is_ok(),
                };
                if ok {
                    contract = next;
                }

                let counts = contract.owned_counts();
                for (holder, balance) in contract.balances() {
                    let owned = counts.get(holder).copied().unwrap_or_default();
                    prop_assert_eq!(*balance, owned);
                }
            }
        }
    }
}
