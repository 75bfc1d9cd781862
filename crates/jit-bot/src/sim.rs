//! Simulated exchange for paper trading.
//!
//! `SimExchange` stands in for the live exchange SDK: an in-memory
//! oracle map, deterministic account keys, and a submission path that
//! decodes the fill instruction it is handed and replays the auction
//! math against the simulated slot clock. Fills that have not crossed
//! yet are rejected with the same classified errors the chain would
//! return, so the whole retry loop runs for real.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use borsh::BorshDeserialize;
use dashmap::DashMap;
use jit_client::{
    anchor_discriminator, ExchangeClient, JitParams, ReferrerInfo, RemainingAccountsRequest,
    TxReceipt,
};
use jit_core::{auction_price, Direction, FillError, MarketType, Order};
use jit_engine::SlotFeed;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::info;
use uuid::Uuid;

/// In-memory exchange implementation backing the paper harness.
pub struct SimExchange {
    authority: Pubkey,
    state: Pubkey,
    user_stats: Pubkey,
    users: DashMap<u16, Pubkey>,
    oracle: DashMap<(MarketType, u16), i64>,
    takers: DashMap<Pubkey, Order>,
    feed: SlotFeed,
    fills: AtomicU64,
    rejections: AtomicU64,
}

impl SimExchange {
    #[must_use]
    pub fn new(feed: SlotFeed) -> Self {
        Self {
            authority: Pubkey::new_unique(),
            state: Pubkey::new_unique(),
            user_stats: Pubkey::new_unique(),
            users: DashMap::new(),
            oracle: DashMap::new(),
            takers: DashMap::new(),
            feed,
            fills: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
        }
    }

    /// Set the oracle price for a market.
    pub fn set_oracle_price(&self, market_type: MarketType, market_index: u16, price: i64) {
        self.oracle.insert((market_type, market_index), price);
    }

    /// Register a synthetic taker order so submissions against it can be
    /// evaluated.
    pub fn register_taker(&self, taker_key: Pubkey, order: Order) {
        self.takers.insert(taker_key, order);
    }

    /// Number of simulated fills accepted so far.
    #[must_use]
    pub fn fill_count(&self) -> u64 {
        self.fills.load(Ordering::SeqCst)
    }

    /// Number of not-yet-crossed rejections returned so far.
    #[must_use]
    pub fn rejection_count(&self) -> u64 {
        self.rejections.load(Ordering::SeqCst)
    }

    fn synthetic_signature() -> Signature {
        let mut bytes = [0u8; 64];
        bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
        bytes[16..32].copy_from_slice(Uuid::new_v4().as_bytes());
        Signature::from(bytes)
    }
}

#[async_trait]
impl ExchangeClient for SimExchange {
    fn authority(&self) -> Pubkey {
        self.authority
    }

    fn state_pubkey(&self) -> Pubkey {
        self.state
    }

    fn user_pubkey(&self, sub_account_id: u16) -> Pubkey {
        *self
            .users
            .entry(sub_account_id)
            .or_insert_with(Pubkey::new_unique)
    }

    fn user_stats_pubkey(&self) -> Pubkey {
        self.user_stats
    }

    fn oracle_price(&self, market_index: u16, market_type: MarketType) -> Result<i64, FillError> {
        self.oracle
            .get(&(market_type, market_index))
            .map(|price| *price)
            .ok_or(FillError::StaleOracle)
    }

    async fn referrer_info(&self, _authority: &Pubkey) -> Result<Option<ReferrerInfo>, FillError> {
        Ok(None)
    }

    fn remaining_accounts(
        &self,
        request: &RemainingAccountsRequest,
    ) -> Result<Vec<AccountMeta>, FillError> {
        let mut metas = Vec::new();
        for _ in request
            .writable_perp_markets
            .iter()
            .chain(&request.writable_spot_markets)
        {
            metas.push(AccountMeta::new(Pubkey::new_unique(), false));
        }
        for _ in request
            .readable_perp_markets
            .iter()
            .chain(&request.readable_spot_markets)
        {
            metas.push(AccountMeta::new_readonly(Pubkey::new_unique(), false));
        }
        Ok(metas)
    }

    fn spot_market_vaults(&self, _market_index: u16) -> Result<(Pubkey, Pubkey), FillError> {
        Ok((Pubkey::new_unique(), Pubkey::new_unique()))
    }

    async fn send_instructions(
        &self,
        instructions: Vec<Instruction>,
    ) -> Result<TxReceipt, FillError> {
        let jit_discriminator = anchor_discriminator("jit");
        let ix = instructions
            .iter()
            .find(|ix| ix.data.len() > 8 && ix.data[..8] == jit_discriminator)
            .ok_or_else(|| FillError::Rpc("no fill instruction in transaction".into()))?;

        let params = JitParams::try_from_slice(&ix.data[8..])
            .map_err(|e| FillError::Rpc(format!("malformed fill params: {e}")))?;
        let taker_key = ix
            .accounts
            .get(3)
            .ok_or_else(|| FillError::Rpc("missing taker account".into()))?
            .pubkey;

        let order = self
            .takers
            .get(&taker_key)
            .map(|entry| entry.value().clone())
            .ok_or(FillError::TakerOrderNotFound)?;
        if order.order_id != params.taker_order_id {
            return Err(FillError::TakerOrderNotFound);
        }

        let slot = self.feed.current();
        let oracle_price = self.oracle_price(order.market_index, order.market_type)?;
        let price = auction_price(&order, slot, oracle_price);

        let bid = match params.price_type {
            jit_core::PriceType::Limit => params.bid,
            jit_core::PriceType::Oracle => oracle_price.saturating_add(params.bid),
        };
        let ask = match params.price_type {
            jit_core::PriceType::Limit => params.ask,
            jit_core::PriceType::Oracle => oracle_price.saturating_add(params.ask),
        };

        let crossed = match order.direction {
            Direction::Long => price <= ask,
            Direction::Short => price >= bid,
        };
        if !crossed {
            self.rejections.fetch_add(1, Ordering::SeqCst);
            return Err(match order.direction {
                Direction::Long => FillError::AskNotCrossed,
                Direction::Short => FillError::BidNotCrossed,
            });
        }

        self.fills.fetch_add(1, Ordering::SeqCst);
        info!(
            order_id = order.order_id,
            market_index = order.market_index,
            slot,
            price,
            "simulated fill"
        );
        Ok(TxReceipt {
            signature: Self::synthetic_signature(),
            slot,
        })
    }
}
