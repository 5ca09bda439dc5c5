//! # Payflow
//!
//! Client for an on-chain payment processor: wallet session and network handling, discounted
//! payments in the native coin or accepted tokens, and payment history.

pub mod account;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod price;
pub mod serde;
pub mod spawn;
pub mod transactions;
pub mod transport;
pub mod types;
pub mod wallet;
