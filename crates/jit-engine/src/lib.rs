//! Auction-crossing prediction and fill-timing engine.
//!
//! The flow per observed taker order:
//! - the registry ([`Jitter`]) claims the order signature (at most one
//!   live task per order) and spawns a fill task
//! - the task looks up the configured quote, resolves referrer context,
//!   and (sniper strategy) predicts the crossing slot with
//!   [`predict_cross`] and suspends on [`SlotWaiter`] until that slot or
//!   auction expiry
//! - a bounded retry loop submits fills through the proxy client,
//!   classifying each failure as retry-and-continue or abandon
//!
//! All terminal paths release the dedup entry exactly once.

pub mod config;
pub mod error;
mod executor;
pub mod jitter;
pub mod predictor;
pub mod slot_feed;
pub mod strategy;
pub mod waiter;

pub use config::{EngineConfig, StrategyChoice};
pub use error::{EngineError, Result};
pub use jitter::Jitter;
pub use predictor::{predict_cross, AuctionAndOrderDetails};
pub use slot_feed::{SlotFeed, SlotPublisher};
pub use strategy::StrategyParams;
pub use waiter::{SlotWaiter, WaitOutcome};
