//! Error types for jit-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid quote: {0}")]
    InvalidQuote(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Program error code for a bid that has not crossed yet (0x1770).
pub const ERR_BID_NOT_CROSSED: u32 = 6000;
/// Program error code for an ask that has not crossed yet (0x1771).
pub const ERR_ASK_NOT_CROSSED: u32 = 6001;
/// Program error code for a missing taker order (0x1772).
pub const ERR_TAKER_ORDER_NOT_FOUND: u32 = 6002;
/// Program error code for a fill that would breach position bounds (0x1773).
pub const ERR_ORDER_SIZE_BREACHED: u32 = 6003;

/// Failure of a single fill submission, classified for the retry loop.
///
/// The submission layer decodes the program's numeric error code into
/// these variants; nothing in the system matches on error message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FillError {
    /// Auction price has not reached the maker bid yet. Expected while
    /// racing; retry.
    #[error("bid not crossed")]
    BidNotCrossed,

    /// Auction price has not reached the maker ask yet. Expected while
    /// racing; retry.
    #[error("ask not crossed")]
    AskNotCrossed,

    /// Venue rejected the oracle sample as stale or invalid. Retry.
    #[error("stale oracle")]
    StaleOracle,

    /// Taker order is no longer on the account (filled or cancelled).
    #[error("taker order not found")]
    TakerOrderNotFound,

    /// Fill would take the maker position outside its configured bounds.
    #[error("order size breached")]
    OrderSizeBreached,

    /// Any other on-chain program error.
    #[error("program error {code}")]
    Program { code: u32 },

    /// Transport or RPC failure surfaced by the submission layer.
    #[error("rpc failure: {0}")]
    Rpc(String),
}

impl FillError {
    /// Map a program error code to its classified variant.
    #[must_use]
    pub fn from_program_code(code: u32) -> Self {
        match code {
            ERR_BID_NOT_CROSSED => Self::BidNotCrossed,
            ERR_ASK_NOT_CROSSED => Self::AskNotCrossed,
            ERR_TAKER_ORDER_NOT_FOUND => Self::TakerOrderNotFound,
            ERR_ORDER_SIZE_BREACHED => Self::OrderSizeBreached,
            _ => Self::Program { code },
        }
    }

    /// Whether the retry loop may attempt again after this failure.
    ///
    /// Only not-yet-crossed and stale-oracle rejections are transient;
    /// everything else abandons the order.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BidNotCrossed | Self::AskNotCrossed | Self::StaleOracle
        )
    }
}
