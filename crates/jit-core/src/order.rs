//! Taker order snapshot and trading enums.
//!
//! `Order` is a read-only view of an order observed on the feed; the
//! engine never mutates it, it only re-evaluates prices against it.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market class an order trades in.
///
/// Variant order matches the on-chain encoding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    Perp,
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spot => write!(f, "spot"),
            Self::Perp => write!(f, "perp"),
        }
    }
}

/// Taker direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Returns the opposite direction (the side a maker fills from).
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// On-chain order type.
///
/// Auction pricing only distinguishes `Oracle` (start/end are offsets
/// from the live oracle price) from everything else (absolute prices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    TriggerMarket,
    TriggerLimit,
    Oracle,
}

/// A taker's Dutch-auction order as observed from the order feed.
///
/// Prices are fixed-point integers in [`crate::PRICE_PRECISION`] units.
/// For `OrderType::Oracle` orders, `auction_start_price` and
/// `auction_end_price` hold signed offsets from the oracle price instead
/// of absolute prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u32,
    pub market_index: u16,
    pub market_type: MarketType,
    pub direction: Direction,
    pub order_type: OrderType,
    /// Slot the order was placed in; the auction schedule is relative to it.
    pub slot: u64,
    /// Auction length in slots.
    pub auction_duration: u8,
    pub auction_start_price: i64,
    pub auction_end_price: i64,
}

impl Order {
    /// First slot at which the auction is over.
    #[must_use]
    pub fn expiry_slot(&self) -> u64 {
        self.slot + u64::from(self.auction_duration)
    }
}
