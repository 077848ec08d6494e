//! Solidity bindings of the EcoNFT collection.
//!
//! The collection is an ERC-721 token with an owner-gated mint function and
//! ERC-6093 custom errors. Both the client and the development network encode
//! and decode calls through these types.
#![allow(missing_docs)]

use alloy::{primitives::aliases::B32, sol};

/// ERC-165 interface id of `supportsInterface` itself.
pub const ERC165_INTERFACE_ID: B32 = B32::new([0x01, 0xff, 0xc9, 0xa7]);

/// ERC-165 interface id of ERC-721.
pub const ERC721_INTERFACE_ID: B32 = B32::new([0x80, 0xac, 0x58, 0xcd]);

/// The value a receiver must return from `onERC721Received` to accept a token.
pub const RECEIVER_FN_SELECTOR: B32 = B32::new([0x15, 0x0b, 0x7a, 0x02]);

sol! {
    #[sol(all_derives)]
    interface IEcoNft {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function owner() external view returns (address);
        function supportsInterface(bytes4 interfaceId) external view returns (bool);

        function balanceOf(address owner) external view returns (uint256 balance);
        function ownerOf(uint256 tokenId) external view returns (address holder);
        function mintCollectionNFT(address collector, uint256 tokenId) external;
        function safeTransferFrom(address from, address to, uint256 tokenId) external;
        function safeTransferFrom(address from, address to, uint256 tokenId, bytes calldata data) external;
        function transferFrom(address from, address to, uint256 tokenId) external;
        function approve(address to, uint256 tokenId) external;
        function getApproved(uint256 tokenId) external view returns (address approved);
        function setApprovalForAll(address operator, bool approved) external;
        function isApprovedForAll(address owner, address operator) external view returns (bool);

        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
        event Approval(address indexed owner, address indexed approved, uint256 indexed tokenId);
        event ApprovalForAll(address indexed owner, address indexed operator, bool approved);

        error ERC721InvalidOwner(address owner);
        error ERC721NonexistentToken(uint256 tokenId);
        error ERC721IncorrectOwner(address sender, uint256 tokenId, address owner);
        error ERC721InvalidSender(address sender);
        error ERC721InvalidReceiver(address receiver);
        error ERC721InsufficientApproval(address operator, uint256 tokenId);
        error ERC721InvalidApprover(address approver);
        error ERC721InvalidOperator(address operator);

        error OwnableUnauthorizedAccount(address account);
        error OwnableInvalidOwner(address owner);
    }

    #[sol(all_derives)]
    interface IErc721Receiver {
        function onERC721Received(
            address operator,
            address from,
            uint256 tokenId,
            bytes calldata data
        ) external returns (bytes4);
    }
}

#[cfg(test)]
mod tests {
    use alloy::sol_types::SolCall;

    use super::{IErc721Receiver, RECEIVER_FN_SELECTOR};

    #[test]
    fn receiver_selector_matches_binding() {
        assert_eq!(
            IErc721Receiver::onERC721ReceivedCall::SELECTOR,
            RECEIVER_FN_SELECTOR.0
        );
    }
}
