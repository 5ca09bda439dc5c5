use super::PriceOracle;
use crate::{error::ContractError, types::IAggregatorV3, wallet::WalletProvider};
use alloy::{
    network::TransactionBuilder,
    primitives::Address,
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use rust_decimal::Decimal;
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::interval};
use tracing::{error, trace};

/// Reads the native price from a Chainlink aggregator.
#[derive(Debug, Clone)]
pub struct ChainlinkFeed {
    provider: Arc<dyn WalletProvider>,
    address: Address,
}

impl ChainlinkFeed {
    /// Creates a reader for the feed deployed at `address`.
    pub fn new(provider: Arc<dyn WalletProvider>, address: Address) -> Self {
        Self { provider, address }
    }

    /// Spawns a task that pushes the latest answer of the feed to `oracle` every `period`.
    pub fn launch(self, oracle: PriceOracle, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut clock = interval(period);
            loop {
                clock.tick().await;
                match self.latest_rate().await {
                    Ok(rate) => oracle.update(rate),
                    Err(err) => error!(feed = %self.address, %err, "Failed to read native price"),
                }
            }
        })
    }

    /// Returns the latest answer of the feed, scaled by its decimals.
    pub async fn latest_rate(&self) -> Result<Decimal, ContractError> {
        let decimals = self.read(IAggregatorV3::decimalsCall {}).await?;
        let round = self.read(IAggregatorV3::latestRoundDataCall {}).await?;
        trace!(round = %round.roundId, answer = %round.answer, "Native price round");

        i128::try_from(round.answer)
            .ok()
            .filter(|answer| *answer > 0)
            .and_then(|answer| Decimal::try_from_i128_with_scale(answer, decimals as u32).ok())
            .ok_or_else(|| ContractError::read(format!("unusable feed answer {}", round.answer)))
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, ContractError> {
        let tx = TransactionRequest::default().with_to(self.address).with_input(call.abi_encode());
        let output = self.provider.call(tx).await.map_err(ContractError::read)?;
        C::abi_decode_returns(&output).map_err(ContractError::read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        price::{NativeRate, PriceOracleConfig},
        wallet::InMemoryWallet,
    };
    use alloy::{
        primitives::{I256, U256, address},
        sol_types::SolValue,
    };

    const FEED: Address = address!("0x0000000000000000000000000000000000000fee");

    fn round(answer: I256) -> Vec<u8> {
        (U256::from(7), answer, U256::ZERO, U256::ZERO, U256::from(7)).abi_encode_params()
    }

    fn wallet(answer: I256) -> InMemoryWallet {
        InMemoryWallet::new(56)
            .with_call_response::<IAggregatorV3::decimalsCall>(U256::from(8).abi_encode())
            .with_call_response::<IAggregatorV3::latestRoundDataCall>(round(answer))
    }

    #[tokio::test]
    async fn scales_answer_by_feed_decimals() {
        let wallet = wallet(I256::unchecked_from(61_234_500_000i64));
        let feed = ChainlinkFeed::new(Arc::new(wallet), FEED);
        assert_eq!(feed.latest_rate().await.unwrap(), "612.345".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn rejects_non_positive_answers() {
        let feed = ChainlinkFeed::new(Arc::new(wallet(I256::ZERO)), FEED);
        assert!(matches!(feed.latest_rate().await, Err(ContractError::ReadUnavailable(_))));

        let feed = ChainlinkFeed::new(Arc::new(wallet(I256::MINUS_ONE)), FEED);
        assert!(matches!(feed.latest_rate().await, Err(ContractError::ReadUnavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn launched_feed_updates_oracle() {
        let oracle = PriceOracle::new(PriceOracleConfig { rate_ttl: Duration::from_secs(120) })
            .with_constant_rate(Some(Decimal::from(300)));
        let wallet = wallet(I256::unchecked_from(61_200_000_000i64));
        let task = ChainlinkFeed::new(Arc::new(wallet.clone()), FEED)
            .launch(oracle.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(oracle.fiat_per_native().await, Some(Decimal::from(612)));

        wallet.set_call_response::<IAggregatorV3::latestRoundDataCall>(round(
            I256::unchecked_from(58_000_000_000i64),
        ));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(oracle.fiat_per_native().await, Some(Decimal::from(580)));

        task.abort();
    }

    #[tokio::test]
    async fn unreadable_feed_keeps_fallback_rate() {
        let oracle = PriceOracle::default().with_constant_rate(Some(Decimal::from(300)));
        let task = ChainlinkFeed::new(
            Arc::new(InMemoryWallet::new(56).failing_calls("execution reverted")),
            FEED,
        )
        .launch(oracle.clone(), Duration::from_secs(60));

        tokio::task::yield_now().await;
        assert_eq!(oracle.fiat_per_native().await, Some(Decimal::from(300)));

        task.abort();
    }
}
