//! Solidity interfaces spoken over CCIP-Read.

use alloy_sol_types::sol;

sol! {
    /// ENSIP-10 wildcard resolution. Every CCIP-Read request carries a `resolve` call.
    interface IExtendedResolver {
        function resolve(bytes name, bytes data) external view returns (bytes memory);
    }

    /// ENSIP-1 address record.
    interface IAddrResolver {
        function addr(bytes32 node) external view returns (address);
    }

    /// ENSIP-9 multicoin address record.
    interface IAddressResolver {
        function addr(bytes32 node, uint256 coinType) external view returns (bytes memory);
    }

    /// ENSIP-5 text record.
    interface ITextResolver {
        function text(bytes32 node, string key) external view returns (string memory);
    }

    /// ENSIP-7 content hash.
    interface IContentHashResolver {
        function contenthash(bytes32 node) external view returns (bytes memory);
    }
}

/// SLIP-44 coin type of Ether.
pub const COIN_TYPE_ETH: u64 = 60;
