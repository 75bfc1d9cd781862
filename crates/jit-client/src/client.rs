//! JIT proxy client: fill and constraint-check instruction assembly.

use jit_core::{FillError, MarketType, OrderConstraint};
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::trace;

use crate::interface::{ExchangeClient, RemainingAccountsRequest, TxParams, TxReceipt};
use crate::ix::{anchor_discriminator, JitIxParams, JitParams};

/// Client for the on-chain JIT proxy program.
///
/// Builds the `jit` and `check_order_constraints` instructions against
/// the proxy program and submits transactions through the exchange
/// client. Submission failures are surfaced unmodified so the caller's
/// retry loop can classify them.
pub struct JitProxyClient<E> {
    exchange: Arc<E>,
    program_id: Pubkey,
    drift_program_id: Pubkey,
}

impl<E: ExchangeClient> JitProxyClient<E> {
    pub fn new(exchange: Arc<E>, program_id: Pubkey, drift_program_id: Pubkey) -> Self {
        Self {
            exchange,
            program_id,
            drift_program_id,
        }
    }

    /// The exchange client behind this proxy.
    #[must_use]
    pub fn exchange(&self) -> &Arc<E> {
        &self.exchange
    }

    /// Submit a maker fill for one taker order.
    ///
    /// Prepends compute-budget instructions when `tx_params` asks for
    /// them, then submits via the exchange client.
    pub async fn jit(
        &self,
        params: &JitIxParams,
        tx_params: Option<TxParams>,
    ) -> Result<TxReceipt, FillError> {
        let ix = self.jit_ix(params)?;

        let mut instructions = Vec::with_capacity(3);
        if let Some(tp) = tx_params {
            if let Some(limit) = tp.cu_limit {
                instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(limit));
            }
            if let Some(price) = tp.cu_price_micro_lamports {
                instructions.push(ComputeBudgetInstruction::set_compute_unit_price(price));
            }
        }
        instructions.push(ix);

        trace!(
            taker_order_id = params.taker_order_id,
            "submitting jit fill"
        );
        self.exchange.send_instructions(instructions).await
    }

    /// Build the `jit` fill instruction.
    pub fn jit_ix(&self, params: &JitIxParams) -> Result<Instruction, FillError> {
        let order = params
            .taker
            .order(params.taker_order_id)
            .ok_or(FillError::TakerOrderNotFound)?;

        let mut request = RemainingAccountsRequest {
            user_keys: vec![
                params.taker_key,
                self.exchange.user_pubkey(params.sub_account_id),
            ],
            ..Default::default()
        };
        match order.market_type {
            MarketType::Perp => request.writable_perp_markets.push(order.market_index),
            MarketType::Spot => request.writable_spot_markets.push(order.market_index),
        }
        let mut remaining = self.exchange.remaining_accounts(&request)?;

        if let Some(referrer) = params.referrer {
            remaining.push(AccountMeta::new(referrer.referrer, false));
            remaining.push(AccountMeta::new(referrer.referrer_stats, false));
        }

        if order.market_type == MarketType::Spot {
            let (base_vault, quote_vault) =
                self.exchange.spot_market_vaults(order.market_index)?;
            remaining.push(AccountMeta::new_readonly(base_vault, false));
            remaining.push(AccountMeta::new_readonly(quote_vault, false));
        }

        let args = JitParams {
            taker_order_id: params.taker_order_id,
            max_position: params.max_position,
            min_position: params.min_position,
            bid: params.bid,
            ask: params.ask,
            price_type: params.price_type,
            post_only: params.post_only,
        };
        let mut data = anchor_discriminator("jit").to_vec();
        data.extend(borsh::to_vec(&args).expect("fixed-layout params encode"));

        let mut accounts = vec![
            AccountMeta::new_readonly(self.exchange.state_pubkey(), false),
            AccountMeta::new(self.exchange.user_pubkey(params.sub_account_id), false),
            AccountMeta::new(self.exchange.user_stats_pubkey(), false),
            AccountMeta::new(params.taker_key, false),
            AccountMeta::new(params.taker_stats_key, false),
            AccountMeta::new_readonly(self.exchange.authority(), true),
            AccountMeta::new_readonly(self.drift_program_id, false),
        ];
        accounts.append(&mut remaining);

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }

    /// Build the read-only `check_order_constraints` instruction.
    ///
    /// Validates proposed position bounds off the fill path; performs no
    /// state change on chain.
    pub fn check_order_constraints_ix(
        &self,
        sub_account_id: u16,
        constraints: &[OrderConstraint],
    ) -> Result<Instruction, FillError> {
        let user = self.exchange.user_pubkey(sub_account_id);

        let mut request = RemainingAccountsRequest {
            user_keys: vec![user],
            ..Default::default()
        };
        for constraint in constraints {
            match constraint.market_type {
                MarketType::Perp => request.readable_perp_markets.push(constraint.market_index),
                MarketType::Spot => request.readable_spot_markets.push(constraint.market_index),
            }
        }
        let mut remaining = self.exchange.remaining_accounts(&request)?;

        let mut data = anchor_discriminator("check_order_constraints").to_vec();
        data.extend(borsh::to_vec(&constraints.to_vec()).expect("fixed-layout params encode"));

        let mut accounts = vec![AccountMeta::new_readonly(user, false)];
        accounts.append(&mut remaining);

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}
