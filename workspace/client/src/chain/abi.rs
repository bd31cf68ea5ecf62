//! Generated bindings for the registry contract surface consumed by
//! the client (`§4.5`). Names are design-level per spec.md; the
//! Solidity interface below is this crate's concrete choice of
//! signatures for that surface.
use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface TacoRegistry {
        function owner() external view returns (address);

        function getLibraryInfo(string calldata name)
            external
            view
            returns (
                address owner,
                string memory description,
                string[] memory tags,
                bool isPrivate,
                string memory language,
                uint256 licenseFee,
                bool licenseRequired
            );

        function getVersionNumbers(string calldata name)
            external
            view
            returns (string[] memory versions);

        function getVersionInfo(string calldata name, string calldata version)
            external
            view
            returns (
                string memory ipfsHash,
                address publisher,
                uint256 publishedAt,
                bool deprecated,
                string[] memory dependencyNames,
                string[] memory dependencyConstraints
            );

        function hasAccess(string calldata name, address user) external view returns (bool);
        function hasUserLicense(string calldata name, address user) external view returns (bool);
        function getAllLibraryNames() external view returns (string[] memory names);

        function registerLibrary(
            string calldata name,
            string calldata description,
            string[] calldata tags,
            string calldata language,
            bool isPrivate
        ) external;

        function publishVersion(
            string calldata name,
            string calldata version,
            string calldata ipfsHash,
            string[] calldata dependencyNames,
            string[] calldata dependencyConstraints
        ) external;

        function deprecateVersion(string calldata name, string calldata version) external;
        function authorizeUser(string calldata name, address user) external;
        function revokeAuthorization(string calldata name, address user) external;
        function deleteLibrary(string calldata name) external;
        function setLibraryLicense(string calldata name, uint256 fee, bool required) external;
        function purchaseLibraryLicense(string calldata name) external payable;
        function transferOwnership(address newOwner) external;
    }
}
