//! Maker quote configuration and constraint types.

use crate::error::{CoreError, Result};
use crate::order::MarketType;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How quote prices are interpreted.
///
/// Variant order matches the on-chain encoding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    /// `bid`/`ask` are absolute prices.
    #[default]
    Limit,
    /// `bid`/`ask` are signed offsets from the live oracle price.
    Oracle,
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "limit"),
            Self::Oracle => write!(f, "oracle"),
        }
    }
}

/// Post-only behavior requested for the maker fill.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PostOnlyParam {
    #[default]
    None,
    MustPostOnly,
    TryPostOnly,
}

/// Per-market maker quote.
///
/// One active value per (market type, market index); a market with no
/// registered quote is simply not filled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteParams {
    pub bid: i64,
    pub ask: i64,
    /// Inventory floor after a fill.
    pub min_position: i64,
    /// Inventory ceiling after a fill.
    pub max_position: i64,
    pub price_type: PriceType,
    pub sub_account_id: u16,
}

impl QuoteParams {
    /// Bid converted into auction price space for the given oracle sample.
    #[must_use]
    pub fn bid_at(&self, oracle_price: i64) -> i64 {
        match self.price_type {
            PriceType::Limit => self.bid,
            PriceType::Oracle => oracle_price.saturating_add(self.bid),
        }
    }

    /// Ask converted into auction price space for the given oracle sample.
    #[must_use]
    pub fn ask_at(&self, oracle_price: i64) -> i64 {
        match self.price_type {
            PriceType::Limit => self.ask,
            PriceType::Oracle => oracle_price.saturating_add(self.ask),
        }
    }

    /// Validate internal consistency before the quote is registered.
    pub fn validate(&self) -> Result<()> {
        if self.bid > self.ask {
            return Err(CoreError::InvalidQuote(format!(
                "bid {} above ask {}",
                self.bid, self.ask
            )));
        }
        if self.min_position > self.max_position {
            return Err(CoreError::InvalidQuote(format!(
                "min_position {} above max_position {}",
                self.min_position, self.max_position
            )));
        }
        Ok(())
    }
}

/// Position bounds validated by the read-only constraint-check
/// instruction, off the fill path.
///
/// Field order is the wire order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct OrderConstraint {
    pub max_position: i64,
    pub min_position: i64,
    pub market_index: u16,
    pub market_type: MarketType,
}
