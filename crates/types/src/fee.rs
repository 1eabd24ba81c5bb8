use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;
use thiserror::Error;

use crate::BPS_DENOMINATOR;

/// Split of a gross output amount into protocol fee and caller payout
#[cw_serde]
#[derive(Copy, Eq)]
pub struct FeeSplit {
    pub total: Uint128,
    pub fee: Uint128,
    pub net: Uint128,
}

impl FeeSplit {
    /// fee = floor(total * rate_bps / 10_000), net = total - fee
    ///
    /// The product is taken in 256-bit precision, so every `total` up to
    /// `Uint128::MAX` is exact.
    pub fn compute(total: Uint128, rate_bps: u16) -> Result<Self, FeeError> {
        if u128::from(rate_bps) > BPS_DENOMINATOR {
            return Err(FeeError::RateOutOfRange { rate_bps });
        }

        let fee = total
            .checked_multiply_ratio(rate_bps, BPS_DENOMINATOR)
            .map_err(|e| FeeError::Arithmetic(e.to_string()))?;
        let net = total
            .checked_sub(fee)
            .map_err(|e| FeeError::Arithmetic(e.to_string()))?;

        Ok(Self { total, fee, net })
    }

    pub fn has_fee(&self) -> bool {
        !self.fee.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    #[error("fee rate {rate_bps} bps exceeds 100%")]
    RateOutOfRange { rate_bps: u16 },

    #[error("fee arithmetic failed: {0}")]
    Arithmetic(String),
}
