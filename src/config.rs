//! Dashboard configuration.
use crate::{
    constants::{
        BSC_BNB_USD_FEED_ADDRESS, BSC_BUSD_ADDRESS, BSC_MAINNET_CHAIN_ID, BSC_MAINNET_EXPLORER_URL, BSC_MAINNET_RPC_URL,
        BSC_PAYMENT_PROCESSOR_ADDRESS, BSC_USDT_ADDRESS, DEFAULT_POLL_INTERVAL,
        DEFAULT_RECEIPT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, NATIVE_DECIMALS,
    },
    types::TokenDescriptor,
};
use alloy::primitives::{Address, B256, ChainId};
use eyre::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use url::Url;

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// The network payments are made on.
    #[serde(default = "NetworkConfig::bsc")]
    pub network: NetworkConfig,
    /// Payment processor address.
    #[serde(default = "default_contract")]
    pub contract: Address,
    /// Tokens offered for payment.
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenDescriptor>,
    /// Payment flow configuration.
    #[serde(default)]
    pub payments: PaymentConfig,
}

fn default_contract() -> Address {
    BSC_PAYMENT_PROCESSOR_ADDRESS
}

fn default_tokens() -> Vec<TokenDescriptor> {
    vec![
        TokenDescriptor::new(BSC_BUSD_ADDRESS, "BUSD", 18),
        TokenDescriptor::new(BSC_USDT_ADDRESS, "USDT", 18),
    ]
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::bsc(),
            contract: default_contract(),
            tokens: default_tokens(),
            payments: PaymentConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Sets the RPC endpoint of the network.
    pub fn with_rpc_url(mut self, rpc_url: Option<Url>) -> Self {
        if let Some(rpc_url) = rpc_url {
            self.network.rpc_url = rpc_url;
        }
        self
    }

    /// Sets the payment processor address.
    pub fn with_contract(mut self, contract: Option<Address>) -> Self {
        if let Some(contract) = contract {
            self.contract = contract;
        }
        self
    }

    /// Sets the tokens offered for payment.
    pub fn with_tokens(mut self, tokens: Vec<TokenDescriptor>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Sets the fiat price of one native coin.
    pub fn with_native_rate(mut self, rate: Option<Decimal>) -> Self {
        if rate.is_some() {
            self.payments.native_rate = rate;
        }
        self
    }

    /// Sets the native price feed.
    pub fn with_price_feed(mut self, feed: Option<Address>) -> Self {
        if feed.is_some() {
            self.payments.price_feed = feed;
        }
        self
    }

    /// Sets the receipt timeout.
    pub fn with_receipt_timeout(mut self, timeout: Option<Duration>) -> Self {
        if let Some(timeout) = timeout {
            self.payments.receipt_timeout = timeout;
        }
        self
    }

    /// Sets the receipt poll interval.
    pub fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        if let Some(interval) = interval {
            self.payments.poll_interval = interval;
        }
        self
    }

    /// Looks up a configured token by symbol, ignoring case.
    pub fn token(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|token| token.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// The native currency of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name.
    pub name: String,
    /// Currency symbol.
    pub symbol: String,
    /// Currency decimals.
    pub decimals: u8,
}

/// The network payments are made on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Chain id.
    pub chain_id: ChainId,
    /// Human readable chain name, as registered in wallets.
    pub chain_name: String,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// RPC endpoint.
    pub rpc_url: Url,
    /// Block explorer.
    pub explorer_url: Url,
}

impl NetworkConfig {
    /// BNB Smart Chain mainnet.
    pub fn bsc() -> Self {
        Self {
            chain_id: BSC_MAINNET_CHAIN_ID,
            chain_name: "Binance Smart Chain".to_string(),
            native_currency: NativeCurrency {
                name: "BNB".to_string(),
                symbol: "BNB".to_string(),
                decimals: NATIVE_DECIMALS,
            },
            rpc_url: Url::parse(BSC_MAINNET_RPC_URL).expect("valid url"),
            explorer_url: Url::parse(BSC_MAINNET_EXPLORER_URL).expect("valid url"),
        }
    }

    /// Explorer link for a transaction.
    pub fn tx_url(&self, tx_hash: B256) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_url.as_str().trim_end_matches('/'))
    }
}

/// Payment flow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Fiat price of one native coin. Native payments are unavailable without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_rate: Option<Decimal>,
    /// Chainlink feed quoting the native coin in fiat. Takes precedence over `native_rate` while
    /// its answers are fresh.
    #[serde(default = "default_price_feed")]
    pub price_feed: Option<Address>,
    /// How long to wait for a payment receipt.
    #[serde(with = "crate::serde::duration")]
    pub receipt_timeout: Duration,
    /// Interval between receipt polls.
    #[serde(with = "crate::serde::duration")]
    pub poll_interval: Duration,
    /// Upper bound for a single wallet request.
    #[serde(with = "crate::serde::duration")]
    pub request_timeout: Duration,
}

fn default_price_feed() -> Option<Address> {
    Some(BSC_BNB_USD_FEED_ADDRESS)
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            native_rate: None,
            price_feed: default_price_feed(),
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
