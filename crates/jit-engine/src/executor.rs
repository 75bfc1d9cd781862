//! Per-order fill task: referrer resolution, crossing wait, retry loop.

use std::time::Duration;

use dashmap::DashMap;
use jit_client::{ExchangeClient, JitIxParams, OrderBundle};
use jit_core::PostOnlyParam;
use tracing::{debug, info, warn};

use crate::jitter::Jitter;
use crate::predictor::predict_cross;
use crate::waiter::{SlotWaiter, WaitOutcome};

/// Removes the order's dedup entry when the task exits, whichever path
/// it exits through.
struct InFlightGuard<'a> {
    set: &'a DashMap<String, ()>,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

impl<E: ExchangeClient> Jitter<E> {
    /// Run the fill task for one claimed order.
    ///
    /// Never panics or propagates errors; every outcome is local to this
    /// order and ends with the dedup entry released.
    pub(crate) async fn try_fill(&self, bundle: OrderBundle) {
        let _guard = InFlightGuard {
            set: &self.in_flight,
            key: bundle.signature.clone(),
        };
        let order = &bundle.order;

        let Some(quote) = self.quote_for(order.market_type, order.market_index) else {
            debug!(
                market_index = order.market_index,
                market_type = %order.market_type,
                "no quote configured; skipping order"
            );
            return;
        };

        let exchange = self.proxy.exchange();
        let referrer = match exchange.referrer_info(&bundle.taker.authority).await {
            Ok(referrer) => referrer,
            Err(e) => {
                warn!(signature = %bundle.signature, error = %e, "referrer lookup failed; abandoning");
                return;
            }
        };

        if self.strategy.predict {
            let oracle_price =
                match exchange.oracle_price(order.market_index, order.market_type) {
                    Ok(price) => price,
                    Err(e) => {
                        warn!(signature = %bundle.signature, error = %e, "oracle unavailable; abandoning");
                        return;
                    }
                };
            let details = predict_cross(order, &quote, oracle_price);
            debug!(
                signature = %bundle.signature,
                will_cross = details.will_cross,
                slots_til_cross = details.slots_til_cross,
                oracle_price = details.oracle_price,
                "initial crossing prediction"
            );

            let waiter = SlotWaiter::new(self.slot_feed.clone(), self.poll_interval);
            let outcome = waiter
                .wait(
                    order,
                    || self.quote_for(order.market_type, order.market_index),
                    || exchange.oracle_price(order.market_index, order.market_type),
                    details,
                    &self.shutdown,
                )
                .await;
            match outcome {
                WaitOutcome::Ready { slot, details } => {
                    debug!(
                        signature = %bundle.signature,
                        slot,
                        slots_til_cross = details.slots_til_cross,
                        "crossing slot reached"
                    );
                }
                WaitOutcome::Expired { .. } => {
                    debug!(signature = %bundle.signature, "auction expired before crossing");
                    return;
                }
            }
        }

        for attempt in 1..=self.strategy.max_attempts {
            // Re-read the quote so mid-flight updates apply per attempt.
            let Some(quote) = self.quote_for(order.market_type, order.market_index) else {
                debug!(signature = %bundle.signature, "quote removed mid-flight; abandoning");
                return;
            };
            let params = JitIxParams {
                taker_key: bundle.taker_key,
                taker_stats_key: bundle.taker_stats_key,
                taker: bundle.taker.clone(),
                taker_order_id: order.order_id,
                max_position: quote.max_position,
                min_position: quote.min_position,
                bid: quote.bid,
                ask: quote.ask,
                price_type: quote.price_type,
                post_only: Some(PostOnlyParam::MustPostOnly),
                referrer,
                sub_account_id: quote.sub_account_id,
            };

            match self.proxy.jit(&params, self.tx_params).await {
                Ok(receipt) => {
                    info!(
                        signature = %bundle.signature,
                        tx = %receipt.signature,
                        slot = receipt.slot,
                        attempt,
                        "fill submitted"
                    );
                    self.sleep_unless_shutdown(self.strategy.success_cooldown)
                        .await;
                    return;
                }
                Err(e) if e.is_retryable() => {
                    debug!(
                        signature = %bundle.signature,
                        attempt,
                        error = %e,
                        "retryable rejection"
                    );
                    if attempt < self.strategy.max_attempts {
                        if !self.sleep_unless_shutdown(self.strategy.backoff).await {
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        signature = %bundle.signature,
                        attempt,
                        error = %e,
                        "fill failed; abandoning"
                    );
                    return;
                }
            }
        }

        debug!(
            signature = %bundle.signature,
            attempts = self.strategy.max_attempts,
            "attempts exhausted without fill"
        );
    }

    /// Sleep that resolves early (returning false) on engine shutdown.
    async fn sleep_unless_shutdown(&self, duration: Duration) -> bool {
        tokio::select! {
            () = tokio::time::sleep(duration) => true,
            () = self.shutdown.cancelled() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, StrategyChoice};
    use crate::slot_feed::SlotFeed;
    use async_trait::async_trait;
    use jit_client::{
        ExchangeClient, JitProxyClient, ReferrerInfo, RemainingAccountsRequest, TxReceipt,
        UserAccountSnapshot,
    };
    use jit_core::{
        Direction, FillError, MarketType, Order, OrderType, PriceType, QuoteParams,
        PRICE_PRECISION,
    };
    use solana_sdk::instruction::{AccountMeta, Instruction};
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::Signature;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Exchange stub with a scripted submission outcome.
    struct StubExchange {
        authority: Pubkey,
        attempts: AtomicU32,
        outcome: Option<FillError>,
        fail_referrer: bool,
        hold: Option<Arc<Notify>>,
    }

    impl StubExchange {
        fn with_outcome(outcome: Option<FillError>) -> Self {
            Self {
                authority: Pubkey::new_unique(),
                attempts: AtomicU32::new(0),
                outcome,
                fail_referrer: false,
                hold: None,
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExchangeClient for StubExchange {
        fn authority(&self) -> Pubkey {
            self.authority
        }

        fn state_pubkey(&self) -> Pubkey {
            Pubkey::new_unique()
        }

        fn user_pubkey(&self, _sub_account_id: u16) -> Pubkey {
            Pubkey::new_unique()
        }

        fn user_stats_pubkey(&self) -> Pubkey {
            Pubkey::new_unique()
        }

        fn oracle_price(
            &self,
            _market_index: u16,
            _market_type: MarketType,
        ) -> Result<i64, FillError> {
            Ok(95 * PRICE_PRECISION)
        }

        async fn referrer_info(
            &self,
            _authority: &Pubkey,
        ) -> Result<Option<ReferrerInfo>, FillError> {
            if self.fail_referrer {
                return Err(FillError::Rpc("stats lookup failed".into()));
            }
            Ok(None)
        }

        fn remaining_accounts(
            &self,
            _request: &RemainingAccountsRequest,
        ) -> Result<Vec<AccountMeta>, FillError> {
            Ok(Vec::new())
        }

        fn spot_market_vaults(&self, _market_index: u16) -> Result<(Pubkey, Pubkey), FillError> {
            Ok((Pubkey::new_unique(), Pubkey::new_unique()))
        }

        async fn send_instructions(
            &self,
            _instructions: Vec<Instruction>,
        ) -> Result<TxReceipt, FillError> {
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            self.attempts.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Some(err) => Err(err.clone()),
                None => Ok(TxReceipt {
                    signature: Signature::default(),
                    slot: 105,
                }),
            }
        }
    }

    fn crossing_order() -> Order {
        // Start price already at the ask: crossing at offset 0.
        Order {
            order_id: 9,
            market_index: 3,
            market_type: MarketType::Perp,
            direction: Direction::Long,
            order_type: OrderType::Market,
            slot: 100,
            auction_duration: 10,
            auction_start_price: 94 * PRICE_PRECISION,
            auction_end_price: 90 * PRICE_PRECISION,
        }
    }

    fn bundle(signature: &str) -> OrderBundle {
        let order = crossing_order();
        OrderBundle {
            taker: Arc::new(UserAccountSnapshot {
                authority: Pubkey::new_unique(),
                sub_account_id: 0,
                orders: vec![order.clone()],
            }),
            taker_key: Pubkey::new_unique(),
            taker_stats_key: Pubkey::new_unique(),
            order,
            signature: signature.to_string(),
        }
    }

    fn quote() -> QuoteParams {
        QuoteParams {
            bid: 80 * PRICE_PRECISION,
            ask: 95 * PRICE_PRECISION,
            min_position: -1_000,
            max_position: 1_000,
            price_type: PriceType::Limit,
            sub_account_id: 0,
        }
    }

    fn jitter_with(
        exchange: StubExchange,
        strategy: StrategyChoice,
        initial_slot: u64,
    ) -> (
        Arc<Jitter<StubExchange>>,
        Arc<StubExchange>,
        crate::slot_feed::SlotPublisher,
    ) {
        let exchange = Arc::new(exchange);
        let proxy = JitProxyClient::new(
            Arc::clone(&exchange),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        let (publisher, feed) = SlotFeed::channel(initial_slot);
        let config = EngineConfig {
            strategy,
            ..Default::default()
        };
        let jitter = Jitter::new(proxy, feed, &config, None);
        jitter.update_perp_quote(3, quote()).unwrap();
        (jitter, exchange, publisher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_shotgun_exhausts_ten_attempts() {
        let (jitter, exchange, _publisher) = jitter_with(
            StubExchange::with_outcome(Some(FillError::BidNotCrossed)),
            StrategyChoice::Shotgun,
            100,
        );

        assert!(jitter.create_try_fill(bundle("sig-1")));
        jitter.drain().await;

        assert_eq!(exchange.attempts(), 10);
        assert_eq!(jitter.in_flight_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sniper_exhausts_three_attempts() {
        let (jitter, exchange, _publisher) = jitter_with(
            StubExchange::with_outcome(Some(FillError::AskNotCrossed)),
            StrategyChoice::Sniper,
            100,
        );

        assert!(jitter.create_try_fill(bundle("sig-1")));
        jitter.drain().await;

        assert_eq!(exchange.attempts(), 3);
        assert_eq!(jitter.in_flight_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_abandons_after_one_attempt() {
        let (jitter, exchange, _publisher) = jitter_with(
            StubExchange::with_outcome(Some(FillError::Program { code: 6100 })),
            StrategyChoice::Shotgun,
            100,
        );

        assert!(jitter.create_try_fill(bundle("sig-1")));
        jitter.drain().await;

        assert_eq!(exchange.attempts(), 1);
        assert_eq!(jitter.in_flight_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_releases_after_cooldown() {
        let (jitter, exchange, _publisher) =
            jitter_with(StubExchange::with_outcome(None), StrategyChoice::Sniper, 100);

        assert!(jitter.create_try_fill(bundle("sig-1")));
        jitter.drain().await;

        assert_eq!(exchange.attempts(), 1);
        assert_eq!(jitter.in_flight_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_delivery_is_deduplicated() {
        let hold = Arc::new(Notify::new());
        let mut stub = StubExchange::with_outcome(None);
        stub.hold = Some(Arc::clone(&hold));
        let (jitter, exchange, _publisher) = jitter_with(stub, StrategyChoice::Shotgun, 100);

        assert!(jitter.create_try_fill(bundle("sig-dup")));
        // Let the task reach the held submission.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(jitter.in_flight_count(), 1);
        assert!(!jitter.create_try_fill(bundle("sig-dup")));

        hold.notify_one();
        jitter.drain().await;

        assert_eq!(exchange.attempts(), 1);
        assert_eq!(jitter.in_flight_count(), 0);

        // Settled signature can be claimed again.
        assert!(jitter.in_flight.get("sig-dup").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_market_is_silent_noop() {
        let (jitter, exchange, _publisher) = jitter_with(
            StubExchange::with_outcome(None),
            StrategyChoice::Shotgun,
            100,
        );
        jitter.clear_quote(MarketType::Perp, 3);

        assert!(jitter.create_try_fill(bundle("sig-1")));
        jitter.drain().await;

        assert_eq!(exchange.attempts(), 0);
        assert_eq!(jitter.in_flight_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_referrer_failure_is_fatal() {
        let mut stub = StubExchange::with_outcome(None);
        stub.fail_referrer = true;
        let (jitter, exchange, _publisher) = jitter_with(stub, StrategyChoice::Shotgun, 100);

        assert!(jitter.create_try_fill(bundle("sig-1")));
        jitter.drain().await;

        assert_eq!(exchange.attempts(), 0);
        assert_eq!(jitter.in_flight_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sniper_abandons_expired_auction() {
        // Current slot already past expiry: the waiter resolves Expired
        // immediately and no attempt is made.
        let (jitter, exchange, _publisher) = jitter_with(
            StubExchange::with_outcome(None),
            StrategyChoice::Sniper,
            120,
        );

        assert!(jitter.create_try_fill(bundle("sig-1")));
        jitter.drain().await;

        assert_eq!(exchange.attempts(), 0);
        assert_eq!(jitter.in_flight_count(), 0);
    }
}
