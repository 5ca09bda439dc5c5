//! Payflow constants.

use alloy::primitives::{Address, address};
use std::time::Duration;

/// EIP-1193 error code returned when the user rejects a wallet prompt.
pub const USER_REJECTED_REQUEST_CODE: i64 = 4001;

/// Error code returned by `wallet_switchEthereumChain` when the wallet does not know the chain.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// The BNB Smart Chain mainnet chain id.
pub const BSC_MAINNET_CHAIN_ID: u64 = 56;

/// The public BNB Smart Chain RPC URL.
pub const BSC_MAINNET_RPC_URL: &str = "https://bsc-dataseed.binance.org/";

/// The BNB Smart Chain block explorer.
pub const BSC_MAINNET_EXPLORER_URL: &str = "https://bscscan.com/";

/// BUSD on BNB Smart Chain.
pub const BSC_BUSD_ADDRESS: Address = address!("0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56");

/// Tether USD on BNB Smart Chain.
pub const BSC_USDT_ADDRESS: Address = address!("0x55d398326f99059fF775485246999027B3197955");

/// The deployed payment processor on BNB Smart Chain.
pub const BSC_PAYMENT_PROCESSOR_ADDRESS: Address =
    address!("0x679cc85aFDDca3d717A290Cc2cC97caedF4B781C");

/// The Chainlink BNB/USD feed on BNB Smart Chain.
pub const BSC_BNB_USD_FEED_ADDRESS: Address =
    address!("0x0567f2323251f0aab15c8dfb1967e4e8a7d42aee");

/// Interval between native price feed reads.
pub const PRICE_FETCH_INTERVAL: Duration = Duration::from_secs(60);

/// Default time to wait for a payment receipt.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default interval between receipt polls. BNB Smart Chain produces a block every ~3s.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default bound for a single wallet request, including the time a user needs for prompts.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Decimals of the native coin on EVM chains.
pub const NATIVE_DECIMALS: u8 = 18;
