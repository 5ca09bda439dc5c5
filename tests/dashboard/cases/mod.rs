//! Dashboard end-to-end test cases

mod account;
mod errors;
mod native;
mod network;
mod token;
