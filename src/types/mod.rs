//! Shared primitive types.
mod erc20;
pub use erc20::*;

mod feed;
pub use feed::*;

mod payment;
pub use payment::*;

mod processor;
pub use processor::*;

mod token;
pub use token::*;
