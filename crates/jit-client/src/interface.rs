//! Boundary to the external exchange SDK.
//!
//! Wallets, RPC plumbing, account subscriptions, and oracle decoding all
//! live behind [`ExchangeClient`]; the engine and proxy client only ever
//! talk to this trait.

use async_trait::async_trait;
use jit_core::{FillError, MarketType, Order};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::sync::Arc;

/// Referrer account pair attached to a fill when the taker was referred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferrerInfo {
    pub referrer: Pubkey,
    pub referrer_stats: Pubkey,
}

/// Read-only snapshot of a user account as delivered by the order feed.
#[derive(Debug, Clone)]
pub struct UserAccountSnapshot {
    pub authority: Pubkey,
    pub sub_account_id: u16,
    pub orders: Vec<Order>,
}

impl UserAccountSnapshot {
    /// Find an open order by id.
    #[must_use]
    pub fn order(&self, order_id: u32) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }
}

/// One delivery from the order-observation feed.
///
/// The feed may deliver the same order more than once; deduplication by
/// `signature` is the registry's job, not the feed's.
#[derive(Debug, Clone)]
pub struct OrderBundle {
    pub taker: Arc<UserAccountSnapshot>,
    pub taker_key: Pubkey,
    pub taker_stats_key: Pubkey,
    pub order: Order,
    /// Stable per-order signature used as the dedup key.
    pub signature: String,
}

/// Market/oracle account metadata to append beyond an instruction's fixed
/// account list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemainingAccountsRequest {
    /// User accounts whose positions must be covered (taker and maker).
    pub user_keys: Vec<Pubkey>,
    pub writable_perp_markets: Vec<u16>,
    pub writable_spot_markets: Vec<u16>,
    pub readable_perp_markets: Vec<u16>,
    pub readable_spot_markets: Vec<u16>,
}

/// Optional transaction tuning applied ahead of the fill instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxParams {
    pub cu_limit: Option<u32>,
    pub cu_price_micro_lamports: Option<u64>,
}

/// Result of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub signature: Signature,
    pub slot: u64,
}

/// Surface of the external exchange client consumed by the fill path.
///
/// Submission failures must be decoded into [`FillError`] by the
/// implementation so the retry loop can classify them structurally.
#[async_trait]
pub trait ExchangeClient: Send + Sync + 'static {
    /// Signing authority for maker fills.
    fn authority(&self) -> Pubkey;

    /// Exchange state account.
    fn state_pubkey(&self) -> Pubkey;

    /// Maker user account for a sub account.
    fn user_pubkey(&self, sub_account_id: u16) -> Pubkey;

    /// Maker user-stats account.
    fn user_stats_pubkey(&self) -> Pubkey;

    /// Latest oracle price for a market, in `PRICE_PRECISION` units.
    ///
    /// Must be a cheap cache read: the slot waiter calls this on every
    /// poll tick.
    fn oracle_price(&self, market_index: u16, market_type: MarketType) -> Result<i64, FillError>;

    /// Referrer of the given taker authority, if any. May hit the network.
    async fn referrer_info(&self, authority: &Pubkey) -> Result<Option<ReferrerInfo>, FillError>;

    /// Assemble market/oracle account metadata for the given request.
    fn remaining_accounts(
        &self,
        request: &RemainingAccountsRequest,
    ) -> Result<Vec<AccountMeta>, FillError>;

    /// Base and quote vault accounts of a spot market.
    fn spot_market_vaults(&self, market_index: u16) -> Result<(Pubkey, Pubkey), FillError>;

    /// Build, sign, and submit a transaction from the given instructions.
    async fn send_instructions(
        &self,
        instructions: Vec<Instruction>,
    ) -> Result<TxReceipt, FillError>;
}
