//! Contracts that are sent tokens through safe transfers.
use alloy::{
    primitives::{aliases::B32, Address, Bytes, U256},
    sol,
    sol_types::{Revert, SolError, SolInterface, SolValue},
};
use econft_client::abi::{
    IErc721Receiver::{self, IErc721ReceiverCalls},
    RECEIVER_FN_SELECTOR,
};

use crate::evm::Env;

sol! {
    /// Emitted by an accepting receiver for every token it accepts.
    #[derive(Debug, PartialEq, Eq)]
    #[allow(missing_docs)]
    event Received(address operator, address from, uint256 tokenId, bytes data);
}

/// How a receiver contract answers `onERC721Received`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// Returns the expected selector and accepts the token.
    Accept,
    /// Returns a value other than the expected selector.
    WrongSelector,
    /// Reverts with `Error(string)`.
    Revert(String),
    /// Does not implement `onERC721Received` at all.
    Absent,
}

impl Receiver {
    /// Handle a direct call to the receiver.
    pub(crate) fn execute(
        &self,
        env: &mut Env<'_>,
        input: &[u8],
    ) -> Result<Bytes, Bytes> {
        let Ok(IErc721ReceiverCalls::onERC721Received(call)) =
            IErc721ReceiverCalls::abi_decode(input)
        else {
            return Err(Bytes::new());
        };
        let IErc721Receiver::onERC721ReceivedCall {
            operator,
            from,
            tokenId: token_id,
            data,
        } = call;

        let id = self.on_erc721_received(env, operator, from, token_id, &data)?;
        Ok((id,).abi_encode_params().into())
    }

    pub(crate) fn on_erc721_received(
        &self,
        env: &mut Env<'_>,
        operator: Address,
        from: Address,
        token_id: U256,
        data: &Bytes,
    ) -> Result<B32, Bytes> {
        match self {
            Receiver::Accept => {
                env.log(&Received {
                    operator,
                    from,
                    tokenId: token_id,
                    data: data.clone(),
                });
                Ok(RECEIVER_FN_SELECTOR)
            }
            Receiver::WrongSelector => Ok(B32::new([0xde, 0xad, 0xbe, 0xef])),
            Receiver::Revert(reason) => {
                Err(Revert { reason: reason.clone() }.abi_encode().into())
            }
            Receiver::Absent => Err(Bytes::new()),
        }
    }
}
