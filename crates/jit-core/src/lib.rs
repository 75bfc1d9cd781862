//! Core domain types for the JIT maker bot.
//!
//! This crate provides the fundamental types used throughout the system:
//! - `Order`: immutable snapshot of a taker's Dutch-auction order
//! - `QuoteParams`: per-market maker quote configuration
//! - `auction_price`: the slot-indexed auction price schedule
//! - `FillError`: the shared fill-failure taxonomy
//!
//! Everything here is pure and synchronous; I/O lives in the engine and
//! client crates.

pub mod auction;
pub mod error;
pub mod order;
pub mod quote;

pub use auction::{auction_bounds, auction_price, auction_step_size, PRICE_PRECISION};
pub use error::{CoreError, FillError, Result};
pub use order::{Direction, MarketType, Order, OrderType};
pub use quote::{OrderConstraint, PostOnlyParam, PriceType, QuoteParams};
