//! Slot waiter: suspend until a predicted crossing slot or auction expiry.

use std::time::Duration;

use jit_core::{FillError, Order, QuoteParams};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::predictor::{predict_cross, AuctionAndOrderDetails};
use crate::slot_feed::SlotFeed;

/// Outcome of waiting for a crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The crossing slot was reached; proceed to fill attempts.
    Ready {
        slot: u64,
        details: AuctionAndOrderDetails,
    },
    /// The auction expired, the market was deconfigured, or the engine
    /// shut down before a crossing. Abandon the order.
    Expired { details: AuctionAndOrderDetails },
}

/// Waits for an auction crossing while re-evaluating the prediction.
///
/// One `select!` loop multiplexes the slot-feed notification, a fixed
/// re-evaluation tick, and cancellation; resolving any branch drops the
/// other watchers with it, so nothing leaks across orders.
#[derive(Debug, Clone)]
pub struct SlotWaiter {
    feed: SlotFeed,
    poll_interval: Duration,
}

impl SlotWaiter {
    #[must_use]
    pub fn new(feed: SlotFeed, poll_interval: Duration) -> Self {
        Self {
            feed,
            poll_interval,
        }
    }

    /// Suspend until the crossing target from `initial` (updated as the
    /// oracle and quote move) is reached, or until the auction expires.
    ///
    /// `quote_lookup` re-reads the market's configured quote on every
    /// tick; `oracle_read` samples the live oracle. A failed oracle read
    /// keeps the previous prediction for that tick.
    pub async fn wait<Q, O>(
        &self,
        order: &Order,
        quote_lookup: Q,
        oracle_read: O,
        initial: AuctionAndOrderDetails,
        cancel: &CancellationToken,
    ) -> WaitOutcome
    where
        Q: Fn() -> Option<QuoteParams>,
        O: Fn() -> std::result::Result<i64, FillError>,
    {
        let expiry = order.expiry_slot();
        let mut details = initial;

        // Already past the auction: resolve without arming any watcher.
        if self.feed.current() > expiry {
            return WaitOutcome::Expired { details };
        }

        let mut target = details.target_slot(order);
        let mut feed = self.feed.clone();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return WaitOutcome::Expired { details };
                }
                changed = feed.changed() => {
                    let slot = match changed {
                        Ok(slot) => slot,
                        Err(_) => return WaitOutcome::Expired { details },
                    };
                    if slot > expiry {
                        return WaitOutcome::Expired { details };
                    }
                    if details.will_cross && slot >= target {
                        return WaitOutcome::Ready { slot, details };
                    }
                }
                _ = ticker.tick() => {
                    let slot = self.feed.current();
                    if slot > expiry {
                        return WaitOutcome::Expired { details };
                    }
                    let Some(quote) = quote_lookup() else {
                        // Market deconfigured mid-wait.
                        return WaitOutcome::Expired { details };
                    };
                    match oracle_read() {
                        Ok(oracle_price) => {
                            details = predict_cross(order, &quote, oracle_price);
                            if details.will_cross {
                                target = details.target_slot(order);
                                if slot >= target {
                                    return WaitOutcome::Ready { slot, details };
                                }
                            }
                        }
                        Err(e) => {
                            trace!(error = %e, "oracle read failed; keeping previous prediction");
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot_feed::SlotFeed;
    use jit_core::{Direction, MarketType, OrderType, PriceType, PRICE_PRECISION};

    fn order() -> Order {
        Order {
            order_id: 1,
            market_index: 0,
            market_type: MarketType::Perp,
            direction: Direction::Long,
            order_type: OrderType::Market,
            slot: 100,
            auction_duration: 10,
            auction_start_price: 100 * PRICE_PRECISION,
            auction_end_price: 90 * PRICE_PRECISION,
        }
    }

    fn quote(ask: i64) -> QuoteParams {
        QuoteParams {
            bid: 0,
            ask,
            min_position: -1_000,
            max_position: 1_000,
            price_type: PriceType::Limit,
            sub_account_id: 0,
        }
    }

    #[tokio::test]
    async fn test_expired_auction_resolves_immediately() {
        let (_publisher, feed) = SlotFeed::channel(111);
        let waiter = SlotWaiter::new(feed, Duration::from_millis(50));
        let o = order();
        let q = quote(95 * PRICE_PRECISION);
        let initial = predict_cross(&o, &q, 0);
        let cancel = CancellationToken::new();

        let outcome = waiter
            .wait(&o, || Some(q), || Ok(0), initial, &cancel)
            .await;
        assert!(matches!(outcome, WaitOutcome::Expired { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_feed_reaches_target() {
        let (publisher, feed) = SlotFeed::channel(100);
        let waiter = SlotWaiter::new(feed, Duration::from_millis(50));
        let o = order();
        let q = quote(95 * PRICE_PRECISION);
        let initial = predict_cross(&o, &q, 0);
        assert_eq!(initial.target_slot(&o), 105);
        let cancel = CancellationToken::new();

        let wait = waiter.wait(&o, || Some(q), || Ok(0), initial, &cancel);
        let publish = async move {
            for slot in 101..=105 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                publisher.publish(slot);
            }
        };

        let (outcome, ()) = tokio::join!(wait, publish);
        match outcome {
            WaitOutcome::Ready { slot, details } => {
                assert_eq!(slot, 105);
                assert!(details.will_cross);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_via_slot_feed() {
        let (publisher, feed) = SlotFeed::channel(100);
        let waiter = SlotWaiter::new(feed, Duration::from_millis(50));
        let o = order();
        // Quote never crosses; the waiter sits until past expiry.
        let q = quote(80 * PRICE_PRECISION);
        let initial = predict_cross(&o, &q, 0);
        assert!(!initial.will_cross);
        let cancel = CancellationToken::new();

        let wait = waiter.wait(&o, || Some(q), || Ok(0), initial, &cancel);
        let publish = async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            publisher.publish(111);
        };

        let (outcome, ()) = tokio::join!(wait, publish);
        assert!(matches!(outcome, WaitOutcome::Expired { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reprediction_picks_up_moving_quote() {
        let (_publisher, feed) = SlotFeed::channel(105);
        let waiter = SlotWaiter::new(feed, Duration::from_millis(50));
        let o = order();
        // First prediction with a never-crossing quote, then the
        // re-evaluation tick sees a crossing one at slot 105.
        let initial = predict_cross(&o, &quote(80 * PRICE_PRECISION), 0);
        assert!(!initial.will_cross);
        let crossing = quote(95 * PRICE_PRECISION);
        let cancel = CancellationToken::new();

        let outcome = waiter
            .wait(&o, || Some(crossing), || Ok(0), initial, &cancel)
            .await;
        match outcome {
            WaitOutcome::Ready { slot, details } => {
                assert_eq!(slot, 105);
                assert_eq!(details.slots_til_cross, 5);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deconfigured_market_expires() {
        let (_publisher, feed) = SlotFeed::channel(100);
        let waiter = SlotWaiter::new(feed, Duration::from_millis(50));
        let o = order();
        let initial = predict_cross(&o, &quote(80 * PRICE_PRECISION), 0);
        let cancel = CancellationToken::new();

        let outcome = waiter
            .wait(&o, || None, || Ok(0), initial, &cancel)
            .await;
        assert!(matches!(outcome, WaitOutcome::Expired { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_expires() {
        let (_publisher, feed) = SlotFeed::channel(100);
        let waiter = SlotWaiter::new(feed, Duration::from_millis(50));
        let o = order();
        let initial = predict_cross(&o, &quote(80 * PRICE_PRECISION), 0);
        let cancel = CancellationToken::new();

        let wait = waiter.wait(&o, || Some(quote(80 * PRICE_PRECISION)), || Ok(0), initial, &cancel);
        let trigger = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            cancel.cancel();
        };

        let (outcome, ()) = tokio::join!(wait, trigger);
        assert!(matches!(outcome, WaitOutcome::Expired { .. }));
    }
}
