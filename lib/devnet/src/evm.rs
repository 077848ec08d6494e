//! Execution context of a contract call.
use std::collections::HashMap;

use alloy::{
    primitives::{aliases::B32, Address, Bytes, Log, U256},
    sol_types::SolEvent,
};

use crate::{econft::EcoNft, receiver::Receiver};

/// Code deployed at an address.
#[derive(Clone, Debug)]
pub(crate) enum Contract {
    /// An EcoNFT collection.
    EcoNft(Box<EcoNft>),
    /// An ERC-721 receiver.
    Receiver(Receiver),
}

impl Contract {
    /// Run `input` against this contract, returning its output or revert data.
    pub(crate) fn execute(
        &mut self,
        env: &mut Env<'_>,
        input: &[u8],
    ) -> Result<Bytes, Bytes> {
        match self {
            Contract::EcoNft(contract) => contract.execute(env, input),
            Contract::Receiver(receiver) => receiver.execute(env, input),
        }
    }
}

/// The environment of a single call: who called, which contract runs, the
/// logs emitted so far, and read access to the code of every account.
pub(crate) struct Env<'a> {
    sender: Address,
    this: Address,
    logs: Vec<Log>,
    code: &'a HashMap<Address, Contract>,
}

impl<'a> Env<'a> {
    pub(crate) fn new(
        sender: Address,
        this: Address,
        code: &'a HashMap<Address, Contract>,
    ) -> Self {
        Self { sender, this, logs: Vec::new(), code }
    }

    /// The caller of the current call.
    pub(crate) fn sender(&self) -> Address {
        self.sender
    }

    /// Whether `account` is a contract.
    pub(crate) fn has_code(&self, account: Address) -> bool {
        self.code.contains_key(&account)
    }

    /// Emit `event` from the executing contract.
    pub(crate) fn log<E: SolEvent>(&mut self, event: &E) {
        self.logs
            .push(Log { address: self.this, data: event.encode_log_data() });
    }

    /// Call `onERC721Received` on `to` as the executing contract.
    ///
    /// Logs of the callee are kept only if the call succeeded.
    pub(crate) fn on_erc721_received(
        &mut self,
        to: Address,
        operator: Address,
        from: Address,
        token_id: U256,
        data: &Bytes,
    ) -> Result<B32, Bytes> {
        let Some(Contract::Receiver(receiver)) = self.code.get(&to) else {
            // Contracts without the hook revert without data.
            return Err(Bytes::new());
        };

        let mut inner = Env::new(self.this, to, self.code);
        let id = receiver.on_erc721_received(
            &mut inner, operator, from, token_id, data,
        )?;
        self.logs.append(&mut inner.logs);
        Ok(id)
    }

    /// Logs emitted during the call.
    pub(crate) fn into_logs(self) -> Vec<Log> {
        self.logs
    }
}
