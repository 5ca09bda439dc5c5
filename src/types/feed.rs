use alloy::sol;

sol! {
    /// A Chainlink price feed.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IAggregatorV3 {
        function decimals() external view returns (uint8);

        function latestRoundData()
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );
    }
}
