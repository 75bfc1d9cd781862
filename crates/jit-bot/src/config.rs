//! Application configuration.

use crate::error::{AppError, AppResult};
use jit_client::TxParams;
use jit_core::{PriceType, QuoteParams, PRICE_PRECISION};
use jit_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// On-chain program addressing and transaction tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JIT proxy program address (base58).
    pub program_id: String,
    /// Exchange program address (base58).
    pub drift_program_id: String,
    #[serde(default)]
    pub cu_limit: Option<u32>,
    #[serde(default)]
    pub cu_price_micro_lamports: Option<u64>,
}

impl ClientConfig {
    pub fn program_id(&self) -> AppResult<Pubkey> {
        Pubkey::from_str(&self.program_id).map_err(|_| AppError::InvalidPubkey {
            field: "program_id",
            value: self.program_id.clone(),
        })
    }

    pub fn drift_program_id(&self) -> AppResult<Pubkey> {
        Pubkey::from_str(&self.drift_program_id).map_err(|_| AppError::InvalidPubkey {
            field: "drift_program_id",
            value: self.drift_program_id.clone(),
        })
    }

    /// Compute-budget parameters, when any are configured.
    #[must_use]
    pub fn tx_params(&self) -> Option<TxParams> {
        if self.cu_limit.is_none() && self.cu_price_micro_lamports.is_none() {
            return None;
        }
        Some(TxParams {
            cu_limit: self.cu_limit,
            cu_price_micro_lamports: self.cu_price_micro_lamports,
        })
    }
}

/// Quote configuration for one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuoteConfig {
    pub market_index: u16,
    pub bid: i64,
    pub ask: i64,
    pub min_position: i64,
    pub max_position: i64,
    #[serde(default)]
    pub price_type: PriceType,
    #[serde(default)]
    pub sub_account_id: u16,
    /// Starting oracle price for the paper harness.
    #[serde(default = "default_oracle_price")]
    pub oracle_price: i64,
}

fn default_oracle_price() -> i64 {
    100 * PRICE_PRECISION
}

impl MarketQuoteConfig {
    #[must_use]
    pub fn quote_params(&self) -> QuoteParams {
        QuoteParams {
            bid: self.bid,
            ask: self.ask,
            min_position: self.min_position,
            max_position: self.max_position,
            price_type: self.price_type,
            sub_account_id: self.sub_account_id,
        }
    }
}

/// Paper-trading harness tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Simulated slot clock interval (ms).
    #[serde(default = "default_slot_interval_ms")]
    pub slot_interval_ms: u64,
    /// Cadence of synthetic taker orders (ms).
    #[serde(default = "default_order_interval_ms")]
    pub order_interval_ms: u64,
    /// Auction duration of synthetic orders (slots).
    #[serde(default = "default_auction_duration")]
    pub auction_duration: u8,
    /// Auction start/end distance from the oracle (bps).
    #[serde(default = "default_auction_spread_bps")]
    pub auction_spread_bps: i64,
    /// Stop after this long; run until Ctrl-C when unset.
    #[serde(default)]
    pub run_ms: Option<u64>,
}

fn default_slot_interval_ms() -> u64 {
    400
}

fn default_order_interval_ms() -> u64 {
    2_000
}

fn default_auction_duration() -> u8 {
    20
}

fn default_auction_spread_bps() -> i64 {
    200
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            slot_interval_ms: default_slot_interval_ms(),
            order_interval_ms: default_order_interval_ms(),
            auction_duration: default_auction_duration(),
            auction_spread_bps: default_auction_spread_bps(),
            run_ms: None,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub client: ClientConfig,
    #[serde(default)]
    pub perp_markets: Vec<MarketQuoteConfig>,
    #[serde(default)]
    pub spot_markets: Vec<MarketQuoteConfig>,
    #[serde(default)]
    pub sim: SimConfig,
}

impl AppConfig {
    /// Load from a TOML file with `JIT_`-prefixed environment overrides.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("JIT").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
