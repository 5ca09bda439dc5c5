//! # Payflow CLI
use crate::{
    config::DashboardConfig,
    error::PaymentError,
    history::{PaymentHistory, PaymentScope},
    orchestrator::PaymentRequest,
    price::to_smallest_unit,
    spawn::{Dashboard, try_spawn_with_args},
    transactions::PendingTransaction,
    types::{DiscountRate, PaymentType, TokenDescriptor},
};
use alloy::primitives::{Address, utils::format_units};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Pay through and manage an on-chain payment processor.
#[derive(Debug, Parser)]
#[command(author, about = "Payflow", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, a default one will be used and stored in the working directory under
    /// `payflow.yaml`.
    #[arg(long, value_name = "CONFIG", env = "PAYFLOW_CONFIG", default_value = "payflow.yaml")]
    pub config: PathBuf,
    /// The RPC endpoint of the payment network.
    #[arg(long = "rpc-url", value_name = "RPC_URL")]
    pub rpc_url: Option<Url>,
    /// The address of the payment processor.
    #[arg(long, value_name = "ADDRESS")]
    pub contract: Option<Address>,
    /// The fiat price of one native coin, used for native payments.
    #[arg(long = "native-rate", value_name = "PRICE")]
    pub native_rate: Option<Decimal>,
    /// The Chainlink feed quoting the native coin in fiat.
    #[arg(long = "price-feed", value_name = "ADDRESS")]
    pub price_feed: Option<Address>,
    /// How long to wait for a transaction receipt.
    #[arg(long = "receipt-timeout", value_name = "SECONDS", value_parser = parse_duration_secs)]
    pub receipt_timeout: Option<Duration>,
    /// Interval between receipt polls.
    #[arg(long = "poll-interval", value_name = "SECONDS", value_parser = parse_duration_secs)]
    pub poll_interval: Option<Duration>,
    /// The secret key to sign transactions with.
    #[arg(long = "secret-key", value_name = "SECRET_KEY", env = "PAYFLOW_SK", hide_env_values = true)]
    pub secret_key: Option<String>,
    /// Let the RPC endpoint manage accounts and sign transactions.
    #[arg(long = "remote-signer", conflicts_with = "secret_key")]
    pub remote_signer: bool,
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Dashboard commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Pay a fiat amount, discounted for the connected account.
    Pay {
        /// The nominal amount.
        amount: Decimal,
        /// Symbol of a configured token to pay with. Pays with the native coin if omitted.
        #[arg(long)]
        token: Option<String>,
    },
    /// Approve the processor to spend a configured token.
    Approve {
        /// Symbol of a configured token.
        token: String,
        /// Amount in whole tokens.
        amount: Decimal,
    },
    /// List recorded payments.
    History {
        /// Only list payments of the connected account.
        #[arg(long)]
        mine: bool,
    },
    /// List `PaymentProcessed` events.
    Events {
        /// First block to search.
        #[arg(long = "from-block", default_value_t = 0)]
        from_block: u64,
    },
    /// Show the discount of an account.
    Discount {
        /// The account. Defaults to the connected account.
        account: Option<Address>,
    },
    /// Show the native balance held by the processor.
    Balance,
    /// Owner commands.
    #[command(subcommand)]
    Admin(AdminCommand),
}

/// Owner-only commands.
#[derive(Debug, Clone, Subcommand)]
pub enum AdminCommand {
    /// Accept a token for payments.
    AddToken {
        /// The token address.
        token: Address,
    },
    /// Set the discount percentage of an account.
    SetDiscount {
        /// The account.
        account: Address,
        /// Discount percentage, 0 to 100.
        percent: u8,
    },
    /// Withdraw the processor's native balance.
    Withdraw,
}

impl Args {
    /// Run the dashboard command.
    pub async fn run(self) -> eyre::Result<()> {
        let dashboard = try_spawn_with_args(&self, &self.config).await?;
        self.command.execute(&dashboard).await
    }

    /// Merges [`DashboardConfig`] values with CLI arguments.
    pub fn merge_dashboard_config(&self, config: DashboardConfig) -> DashboardConfig {
        config
            .with_rpc_url(self.rpc_url.clone())
            .with_contract(self.contract)
            .with_native_rate(self.native_rate)
            .with_price_feed(self.price_feed)
            .with_receipt_timeout(self.receipt_timeout)
            .with_poll_interval(self.poll_interval)
    }
}

impl Command {
    /// Executes the command against a spawned dashboard.
    pub async fn execute(self, dashboard: &Dashboard) -> eyre::Result<()> {
        let native = &dashboard.config.network.native_currency;
        match self {
            Self::Pay { amount, token } => {
                dashboard.session.connect().await?;
                let request = match token {
                    Some(symbol) => PaymentRequest::token(amount, resolve_token(dashboard, &symbol)?),
                    None => PaymentRequest::native(amount),
                };
                let outcome = dashboard.orchestrator.pay(request).await?;
                let (symbol, decimals) = match outcome.payment.asset.token() {
                    Some(token) => (token.symbol.as_str(), token.decimals),
                    None => (native.symbol.as_str(), native.decimals),
                };
                println!(
                    "Paid {} {symbol} ({} discount) from {}",
                    format_units(outcome.payment.payable, decimals)?,
                    outcome.payment.discount_applied,
                    outcome.payer,
                );
                println!("{}", outcome.explorer_url);
            }
            Self::Approve { token, amount } => {
                let session = dashboard.session.connect().await?;
                let token = resolve_token(dashboard, &token)?;
                let amount = to_smallest_unit(amount, token.decimals)?;
                let pending =
                    dashboard.client.approve_token(&session.signer, token.address, amount).await?;
                confirm(dashboard, &pending).await?;
            }
            Self::History { mine } => {
                let scope = if mine {
                    dashboard.session.connect().await?;
                    PaymentScope::Mine
                } else {
                    PaymentScope::All
                };
                print_history(dashboard.history.load_payments(scope).await?, native.decimals)?;
            }
            Self::Events { from_block } => {
                for event in dashboard.history.load_events(from_block).await? {
                    println!(
                        "#{} {} {} block={} tx={}",
                        event.payment_id,
                        event.payer,
                        event.amount,
                        event.block_number.map(|n| n.to_string()).unwrap_or_default(),
                        event.transaction_hash.map(|h| h.to_string()).unwrap_or_default(),
                    );
                }
            }
            Self::Discount { account } => {
                let account = match account {
                    Some(account) => account,
                    None => dashboard.session.connect().await?.account,
                };
                let discount = DiscountRate::try_from(dashboard.client.get_discount(account).await?)?;
                println!("{account}: {discount}");
            }
            Self::Balance => {
                let balance = dashboard.client.get_balance().await?;
                println!("{} {}", format_units(balance, native.decimals)?, native.symbol);
            }
            Self::Admin(command) => {
                let session = dashboard.session.connect().await?;
                let client = &dashboard.client;
                let pending = match command {
                    AdminCommand::AddToken { token } => {
                        client.add_accepted_token(&session.signer, token).await?
                    }
                    AdminCommand::SetDiscount { account, percent } => {
                        client.set_discount(&session.signer, account, DiscountRate::new(percent)?).await?
                    }
                    AdminCommand::Withdraw => client.withdraw(&session.signer).await?,
                };
                confirm(dashboard, &pending).await?;
            }
        }
        Ok(())
    }
}

fn resolve_token(dashboard: &Dashboard, symbol: &str) -> Result<TokenDescriptor, PaymentError> {
    dashboard
        .config
        .token(symbol)
        .cloned()
        .ok_or_else(|| PaymentError::UnsupportedToken(symbol.to_string()))
}

async fn confirm(dashboard: &Dashboard, pending: &PendingTransaction) -> eyre::Result<()> {
    let receipt = dashboard.confirm(pending).await?;
    println!(
        "Confirmed in block {}: {}",
        receipt.block_number.map(|n| n.to_string()).unwrap_or_default(),
        dashboard.config.network.tx_url(pending.tx_hash)
    );
    Ok(())
}

fn print_history(history: PaymentHistory, native_decimals: u8) -> eyre::Result<()> {
    if history.len() == 0 {
        println!("No payments");
        return Ok(());
    }
    for entry in history {
        match entry {
            Ok(record) => {
                let amount = match record.payment_type {
                    PaymentType::Native => format_units(record.amount, native_decimals)?,
                    // The processor does not record which token was paid.
                    PaymentType::Token => format_units(record.amount, 18)?,
                };
                println!(
                    "{} {} {amount} {}{}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.payer,
                    record.payment_type,
                    if record.is_discounted { " (discounted)" } else { "" },
                );
            }
            Err(err) => println!("unreadable entry: {err}"),
        }
    }
    Ok(())
}

/// Parses a string representing seconds to a [`Duration`].
fn parse_duration_secs(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let seconds = arg.parse()?;
    Ok(Duration::from_secs(seconds))
}
