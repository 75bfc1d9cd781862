//! Per-market quote registry, in-flight dedup, and fill-task supervision.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use jit_client::{ExchangeClient, JitProxyClient, OrderBundle, TxParams};
use jit_core::{MarketType, QuoteParams};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::slot_feed::SlotFeed;
use crate::strategy::StrategyParams;

/// The engine's shared registry and task supervisor.
///
/// Holds the per-market maker quotes (written only by the `update_*`
/// methods, read by fill tasks) and the in-flight set keyed by order
/// signature: at most one live fill task per signature, inserted at task
/// creation and removed exactly once on every terminal path.
pub struct Jitter<E> {
    pub(crate) proxy: JitProxyClient<E>,
    pub(crate) perp_quotes: DashMap<u16, QuoteParams>,
    pub(crate) spot_quotes: DashMap<u16, QuoteParams>,
    pub(crate) in_flight: DashMap<String, ()>,
    pub(crate) slot_feed: SlotFeed,
    pub(crate) strategy: StrategyParams,
    pub(crate) poll_interval: Duration,
    pub(crate) tx_params: Option<TxParams>,
    pub(crate) tasks: TaskTracker,
    pub(crate) shutdown: CancellationToken,
}

impl<E: ExchangeClient> Jitter<E> {
    #[must_use]
    pub fn new(
        proxy: JitProxyClient<E>,
        slot_feed: SlotFeed,
        config: &EngineConfig,
        tx_params: Option<TxParams>,
    ) -> Arc<Self> {
        Arc::new(Self {
            proxy,
            perp_quotes: DashMap::new(),
            spot_quotes: DashMap::new(),
            in_flight: DashMap::new(),
            slot_feed,
            strategy: config.strategy_params(),
            poll_interval: config.poll_interval(),
            tx_params,
            tasks: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Register or replace the quote for a perp market.
    pub fn update_perp_quote(&self, market_index: u16, params: QuoteParams) -> jit_core::Result<()> {
        params.validate()?;
        debug!(market_index, "perp quote updated");
        self.perp_quotes.insert(market_index, params);
        Ok(())
    }

    /// Register or replace the quote for a spot market.
    pub fn update_spot_quote(&self, market_index: u16, params: QuoteParams) -> jit_core::Result<()> {
        params.validate()?;
        debug!(market_index, "spot quote updated");
        self.spot_quotes.insert(market_index, params);
        Ok(())
    }

    /// Stop quoting a market. In-flight waits observe the removal on
    /// their next re-evaluation tick and abandon.
    pub fn clear_quote(&self, market_type: MarketType, market_index: u16) {
        match market_type {
            MarketType::Perp => self.perp_quotes.remove(&market_index),
            MarketType::Spot => self.spot_quotes.remove(&market_index),
        };
    }

    /// Current quote for a market, if configured.
    #[must_use]
    pub fn quote_for(&self, market_type: MarketType, market_index: u16) -> Option<QuoteParams> {
        match market_type {
            MarketType::Perp => self.perp_quotes.get(&market_index).map(|q| *q),
            MarketType::Spot => self.spot_quotes.get(&market_index).map(|q| *q),
        }
    }

    /// Number of orders currently being worked.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Claim the order signature and spawn its fill task.
    ///
    /// Returns false (and spawns nothing) when a task already owns the
    /// signature or the engine is shutting down; the feed may deliver the
    /// same order repeatedly and this is where that collapses.
    pub fn create_try_fill(self: &Arc<Self>, bundle: OrderBundle) -> bool {
        if self.shutdown.is_cancelled() {
            return false;
        }
        if self
            .in_flight
            .insert(bundle.signature.clone(), ())
            .is_some()
        {
            debug!(signature = %bundle.signature, "order already in flight");
            return false;
        }

        let jitter = Arc::clone(self);
        self.tasks.spawn(async move {
            jitter.try_fill(bundle).await;
        });
        true
    }

    /// Wait for all in-flight tasks to finish without cancelling them.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }

    /// Cancel every in-flight wait and sleep, then await task exit.
    pub async fn shutdown(&self) {
        info!("jitter shutting down");
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;
    }
}
