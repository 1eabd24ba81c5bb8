use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};

use crate::FeeSplit;

/// Measured result of one leg
#[cw_serde]
pub struct LegOutcome {
    pub index: usize,
    pub input_asset: Addr,
    pub amount_in: Uint128,
    /// Output-asset balance delta observed across this leg's exchange call
    pub amount_out: Uint128,
}

/// Result of a committed settlement, derived fresh on every call
#[cw_serde]
pub struct SettlementOutcome {
    pub caller: Addr,
    pub output_asset: Addr,
    pub legs: Vec<LegOutcome>,
    /// Fresh end-of-loop read of the engine's output-asset balance
    pub total_output: Uint128,
    pub fee: Uint128,
    pub net: Uint128,
}

impl SettlementOutcome {
    pub fn new(caller: Addr, output_asset: Addr, legs: Vec<LegOutcome>, split: FeeSplit) -> Self {
        Self {
            caller,
            output_asset,
            legs,
            total_output: split.total,
            fee: split.fee,
            net: split.net,
        }
    }

    /// Sum of the per-leg deltas
    ///
    /// Diverges from `total_output` when the engine already held output asset
    /// or the balance moved outside the measured exchange calls.
    pub fn measured_output(&self) -> Uint128 {
        self.legs
            .iter()
            .fold(Uint128::zero(), |acc, leg| acc.saturating_add(leg.amount_out))
    }
}
