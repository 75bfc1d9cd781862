//! Crossing prediction for Dutch-auction taker orders.

use jit_core::{
    auction_bounds, auction_price, auction_step_size, Direction, Order, QuoteParams,
};

/// Result of one crossing evaluation.
///
/// Recomputed fresh on every evaluation (the oracle sample it embeds is
/// the one used for the computation); never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionAndOrderDetails {
    /// Slots from the order's creation slot to the first crossing slot;
    /// equals the auction duration when no crossing happens.
    pub slots_til_cross: u64,
    pub will_cross: bool,
    /// Maker bid converted into auction price space.
    pub bid: i64,
    /// Maker ask converted into auction price space.
    pub ask: i64,
    pub auction_start_price: i64,
    pub auction_end_price: i64,
    /// Per-slot price delta of the schedule. Diagnostic.
    pub step_size: i64,
    /// Oracle sample the evaluation was computed against.
    pub oracle_price: i64,
}

impl AuctionAndOrderDetails {
    /// Slot the waiter should arm for: the predicted crossing slot, or
    /// one past expiry when the quote never crosses.
    #[must_use]
    pub fn target_slot(&self, order: &Order) -> u64 {
        if self.will_cross {
            order.slot + self.slots_til_cross
        } else {
            order.expiry_slot() + 1
        }
    }
}

/// Predict whether and when `quote` crosses `order`'s auction.
///
/// A long taker is met by the maker's ask (crossing once the auction
/// price falls to it); a short taker is met by the maker's bid (crossing
/// once the auction price rises to it). Pure and cheap: the waiter calls
/// this on every poll tick.
#[must_use]
pub fn predict_cross(
    order: &Order,
    quote: &QuoteParams,
    oracle_price: i64,
) -> AuctionAndOrderDetails {
    let bid = quote.bid_at(oracle_price);
    let ask = quote.ask_at(oracle_price);
    let duration = u64::from(order.auction_duration);

    let mut slots_til_cross = duration;
    let mut will_cross = false;
    for offset in 0..duration {
        let price = auction_price(order, order.slot + offset, oracle_price);
        let crossed = match order.direction {
            Direction::Long => price <= ask,
            Direction::Short => price >= bid,
        };
        if crossed {
            slots_til_cross = offset;
            will_cross = true;
            break;
        }
    }

    let (auction_start_price, auction_end_price) = auction_bounds(order, oracle_price);
    AuctionAndOrderDetails {
        slots_til_cross,
        will_cross,
        bid,
        ask,
        auction_start_price,
        auction_end_price,
        step_size: auction_step_size(order, oracle_price),
        oracle_price,
    }
}
