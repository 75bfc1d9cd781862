//! Wire-level instruction layouts for the JIT proxy program.

use borsh::{BorshDeserialize, BorshSerialize};
use jit_core::{PostOnlyParam, PriceType};
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

use crate::interface::{ReferrerInfo, UserAccountSnapshot};

/// Anchor instruction discriminator: first 8 bytes of
/// `sha256("global:<name>")`.
#[must_use]
pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Borsh layout of the `jit` instruction arguments.
///
/// Field order is the wire order; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct JitParams {
    pub taker_order_id: u32,
    pub max_position: i64,
    pub min_position: i64,
    pub bid: i64,
    pub ask: i64,
    pub price_type: PriceType,
    pub post_only: Option<PostOnlyParam>,
}

/// Inputs for assembling a fill instruction for one taker order.
#[derive(Debug, Clone)]
pub struct JitIxParams {
    pub taker_key: Pubkey,
    pub taker_stats_key: Pubkey,
    pub taker: Arc<UserAccountSnapshot>,
    pub taker_order_id: u32,
    pub max_position: i64,
    pub min_position: i64,
    pub bid: i64,
    pub ask: i64,
    pub price_type: PriceType,
    pub post_only: Option<PostOnlyParam>,
    pub referrer: Option<ReferrerInfo>,
    pub sub_account_id: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminator_is_deterministic() {
        let a = anchor_discriminator("jit");
        let b = anchor_discriminator("jit");
        assert_eq!(a, b);
        assert_ne!(a, anchor_discriminator("check_order_constraints"));
    }

    #[test]
    fn test_jit_params_layout() {
        let params = JitParams {
            taker_order_id: 42,
            max_position: 1_000,
            min_position: -1_000,
            bid: -5,
            ask: 5,
            price_type: PriceType::Oracle,
            post_only: Some(PostOnlyParam::MustPostOnly),
        };
        let bytes = borsh::to_vec(&params).unwrap();
        // u32 + 4 * i64 + price_type tag + option tag + post_only tag
        assert_eq!(bytes.len(), 4 + 32 + 1 + 2);
        assert_eq!(&bytes[0..4], &42u32.to_le_bytes());
        assert_eq!(bytes[36], 1); // PriceType::Oracle
        assert_eq!(bytes[37], 1); // Some
        assert_eq!(bytes[38], 1); // MustPostOnly

        let decoded = JitParams::try_from_slice(&bytes).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_jit_params_no_post_only() {
        let params = JitParams {
            taker_order_id: 1,
            max_position: 0,
            min_position: 0,
            bid: 0,
            ask: 0,
            price_type: PriceType::Limit,
            post_only: None,
        };
        let bytes = borsh::to_vec(&params).unwrap();
        assert_eq!(bytes.len(), 4 + 32 + 1 + 1);
        assert_eq!(bytes[37], 0); // None
    }
}
