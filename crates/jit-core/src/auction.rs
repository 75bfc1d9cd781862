//! Dutch-auction price schedule.
//!
//! The enforced fill price of a taker order moves linearly from the
//! auction start price to the end price over `auction_duration` slots,
//! then rests at the end price. Oracle auctions quote start/end as
//! offsets from the live oracle, so the same slot can price differently
//! as the oracle moves; callers pass the oracle sample they hold *now*.

use crate::order::{Order, OrderType};

/// Fixed-point price unit shared with the on-chain program.
pub const PRICE_PRECISION: i64 = 1_000_000;

/// Start and end prices of the auction schedule, converted into absolute
/// price space for the given oracle sample.
#[must_use]
pub fn auction_bounds(order: &Order, oracle_price: i64) -> (i64, i64) {
    match order.order_type {
        OrderType::Oracle => (
            oracle_price.saturating_add(order.auction_start_price),
            oracle_price.saturating_add(order.auction_end_price),
        ),
        _ => (order.auction_start_price, order.auction_end_price),
    }
}

/// Price of `order`'s auction when observed at `slot`.
///
/// Slots before `order.slot` price at the start; slots at or past
/// `order.slot + auction_duration` price at the end. A duration of 0 or 1
/// collapses the schedule to a constant.
#[must_use]
pub fn auction_price(order: &Order, slot: u64, oracle_price: i64) -> i64 {
    let (start, end) = auction_bounds(order, oracle_price);
    let duration = u64::from(order.auction_duration);
    let elapsed = slot.saturating_sub(order.slot);

    if elapsed >= duration {
        return end;
    }
    if duration == 1 {
        return start;
    }

    // elapsed < duration and duration >= 2 here; i128 keeps the
    // intermediate product exact for any i64 price pair.
    let delta = (i128::from(end) - i128::from(start)) * i128::from(elapsed)
        / (i128::from(duration) - 1);
    (i128::from(start) + delta) as i64
}

/// Per-slot price delta of the auction schedule. Diagnostic only.
///
/// Zero when `auction_duration <= 1` (no interpolation to step through).
#[must_use]
pub fn auction_step_size(order: &Order, oracle_price: i64) -> i64 {
    if order.auction_duration <= 1 {
        return 0;
    }
    let (start, end) = auction_bounds(order, oracle_price);
    (end - start) / (i64::from(order.auction_duration) - 1)
}
