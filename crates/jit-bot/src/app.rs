//! Application wiring for the paper-trading harness.
//!
//! Builds the simulated exchange, seeds quotes from configuration, and
//! drives a slot clock plus a synthetic taker-order generator through
//! the real engine until Ctrl-C (or a configured duration).

use std::sync::Arc;
use std::time::Duration;

use jit_client::{ExchangeClient, JitProxyClient, OrderBundle, UserAccountSnapshot};
use jit_core::{Direction, MarketType, Order, OrderType};
use jit_engine::{Jitter, SlotFeed, SlotPublisher};
use solana_sdk::pubkey::Pubkey;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{AppConfig, MarketQuoteConfig, SimConfig};
use crate::error::AppResult;
use crate::sim::SimExchange;

/// The bot application.
pub struct Application {
    config: AppConfig,
}

impl Application {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the paper harness until Ctrl-C or `sim.run_ms` elapses.
    pub async fn run(self) -> AppResult<()> {
        let config = self.config;
        let program_id = config.client.program_id()?;
        let drift_program_id = config.client.drift_program_id()?;

        let (publisher, feed) = SlotFeed::channel(1);
        let sim = Arc::new(SimExchange::new(feed.clone()));
        let proxy = JitProxyClient::new(Arc::clone(&sim), program_id, drift_program_id);
        let jitter = Jitter::new(proxy, feed.clone(), &config.engine, config.client.tx_params());

        for market in &config.perp_markets {
            sim.set_oracle_price(MarketType::Perp, market.market_index, market.oracle_price);
            jitter.update_perp_quote(market.market_index, market.quote_params())?;
        }
        for market in &config.spot_markets {
            sim.set_oracle_price(MarketType::Spot, market.market_index, market.oracle_price);
            jitter.update_spot_quote(market.market_index, market.quote_params())?;
        }

        let stop = CancellationToken::new();
        let clock = tokio::spawn(run_slot_clock(
            publisher,
            config.sim.slot_interval_ms,
            stop.clone(),
        ));
        let generator = if config.perp_markets.is_empty() {
            warn!("no perp markets configured; generating no synthetic orders");
            None
        } else {
            Some(tokio::spawn(run_order_generator(
                Arc::clone(&sim),
                Arc::clone(&jitter),
                feed,
                config.perp_markets.clone(),
                config.sim.clone(),
                stop.clone(),
            )))
        };

        info!(
            perp_markets = config.perp_markets.len(),
            spot_markets = config.spot_markets.len(),
            strategy = ?config.engine.strategy,
            "paper harness running"
        );

        match config.sim.run_ms {
            Some(run_ms) => {
                tokio::select! {
                    () = tokio::time::sleep(Duration::from_millis(run_ms)) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }

        info!("stopping");
        stop.cancel();
        let _ = clock.await;
        if let Some(generator) = generator {
            let _ = generator.await;
        }
        jitter.shutdown().await;
        info!(
            fills = sim.fill_count(),
            rejections = sim.rejection_count(),
            "paper session finished"
        );
        Ok(())
    }
}

/// Advance the simulated slot clock at a fixed cadence.
async fn run_slot_clock(publisher: SlotPublisher, interval_ms: u64, stop: CancellationToken) {
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    loop {
        tokio::select! {
            () = stop.cancelled() => return,
            _ = ticker.tick() => publisher.publish(publisher.current() + 1),
        }
    }
}

/// Emit synthetic taker auctions that sweep through the configured
/// quotes, round-robin across markets with alternating direction.
async fn run_order_generator(
    sim: Arc<SimExchange>,
    jitter: Arc<Jitter<SimExchange>>,
    feed: SlotFeed,
    markets: Vec<MarketQuoteConfig>,
    sim_config: SimConfig,
    stop: CancellationToken,
) {
    let mut ticker = tokio::time::interval(Duration::from_millis(sim_config.order_interval_ms.max(1)));
    let mut counter: u32 = 0;

    loop {
        tokio::select! {
            () = stop.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let market = &markets[counter as usize % markets.len()];
        let oracle_price = match sim.oracle_price(market.market_index, MarketType::Perp) {
            Ok(price) => price,
            Err(e) => {
                warn!(market_index = market.market_index, error = %e, "no sim oracle");
                continue;
            }
        };

        let direction = if counter % 2 == 0 {
            Direction::Long
        } else {
            Direction::Short
        };
        let spread = oracle_price / 10_000 * sim_config.auction_spread_bps;
        let (start, end) = match direction {
            // Long taker auctions sweep down through the maker ask,
            // short ones sweep up through the bid.
            Direction::Long => (oracle_price + spread, oracle_price - spread),
            Direction::Short => (oracle_price - spread, oracle_price + spread),
        };

        let order = Order {
            order_id: counter,
            market_index: market.market_index,
            market_type: MarketType::Perp,
            direction,
            order_type: OrderType::Market,
            slot: feed.current(),
            auction_duration: sim_config.auction_duration,
            auction_start_price: start,
            auction_end_price: end,
        };

        let taker_key = Pubkey::new_unique();
        sim.register_taker(taker_key, order.clone());

        let bundle = OrderBundle {
            taker: Arc::new(UserAccountSnapshot {
                authority: Pubkey::new_unique(),
                sub_account_id: 0,
                orders: vec![order.clone()],
            }),
            taker_key,
            taker_stats_key: Pubkey::new_unique(),
            order,
            signature: format!("{taker_key}-{counter}"),
        };
        jitter.create_try_fill(bundle);
        counter = counter.wrapping_add(1);
    }
}
