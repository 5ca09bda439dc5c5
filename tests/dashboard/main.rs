//! Dashboard end-to-end tests against a scripted wallet.
#![allow(missing_docs)]

mod cases;
mod environment;
