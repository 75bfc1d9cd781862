//! Instruction assembly and submission boundary for the JIT proxy program.
//!
//! `JitProxyClient` turns a maker quote plus a taker order snapshot into
//! the program's `jit` fill instruction (and the read-only
//! `check_order_constraints` instruction) and submits transactions through
//! the [`ExchangeClient`] trait, which is the only surface this repository
//! expects from the external exchange SDK.

pub mod client;
pub mod interface;
pub mod ix;

pub use client::JitProxyClient;
pub use interface::{
    ExchangeClient, OrderBundle, ReferrerInfo, RemainingAccountsRequest, TxParams, TxReceipt,
    UserAccountSnapshot,
};
pub use ix::{anchor_discriminator, JitIxParams, JitParams};
