use cosmwasm_std::{Addr, Uint128};
use multiswap_types::{FeeError, RequestError};
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("failed to pull input asset at index {index}: {source}")]
    PullFailed { index: usize, source: LedgerError },

    #[error("no exchange deployed at {exchange} (index {index})")]
    UnknownExchange { index: usize, exchange: Addr },

    #[error("exchange call failed at index {index}: {reason}")]
    ExchangeFailed { index: usize, reason: String },

    #[error("insufficient output: got {total}, minimum {minimum}")]
    InsufficientOutput { total: Uint128, minimum: Uint128 },

    #[error("fee rate {rate_bps} bps exceeds cap of {max_bps} bps")]
    FeeRateTooHigh { rate_bps: u16, max_bps: u16 },

    #[error("invalid recipient")]
    InvalidRecipient,

    #[error("invalid controller")]
    InvalidController,

    #[error("nothing to recover for {asset}")]
    NothingToRecover { asset: Addr },

    #[error("unauthorized: {caller}")]
    Unauthorized { caller: Addr },

    #[error("reentrant call: a settlement is already running on this engine")]
    Reentrant,

    #[error("settlement is paused")]
    Paused,

    #[error("already paused")]
    AlreadyPaused,

    #[error("not paused")]
    NotPaused,

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Coarse classification of settlement errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed request
    Request,
    /// A collaborator (exchange or asset ledger) failed mid-flight
    Execution,
    /// Output below the caller's floor
    Economic,
    /// Admin validation, authorization, reentrancy, pause
    Administrative,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Request => "request",
            ErrorCategory::Execution => "execution",
            ErrorCategory::Economic => "economic",
            ErrorCategory::Administrative => "administrative",
        }
    }
}

impl SettlementError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SettlementError::Request(_) => ErrorCategory::Request,
            SettlementError::PullFailed { .. }
            | SettlementError::UnknownExchange { .. }
            | SettlementError::ExchangeFailed { .. }
            | SettlementError::Fee(_)
            | SettlementError::Ledger(_) => ErrorCategory::Execution,
            SettlementError::InsufficientOutput { .. } => ErrorCategory::Economic,
            SettlementError::FeeRateTooHigh { .. }
            | SettlementError::InvalidRecipient
            | SettlementError::InvalidController
            | SettlementError::NothingToRecover { .. }
            | SettlementError::Unauthorized { .. }
            | SettlementError::Reentrant
            | SettlementError::Paused
            | SettlementError::AlreadyPaused
            | SettlementError::NotPaused
            | SettlementError::InvalidConfig(_) => ErrorCategory::Administrative,
        }
    }

    /// Stable snake_case label, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            SettlementError::Request(e) => match e {
                RequestError::LengthMismatch { .. } => "length_mismatch",
                RequestError::Empty => "empty_request",
                RequestError::TooManyAssets { .. } => "too_many_assets",
                RequestError::InvalidOutputAsset => "invalid_output_asset",
                RequestError::InvalidExchange => "invalid_exchange",
                RequestError::InvalidAsset { .. } => "invalid_asset",
                RequestError::ZeroAmount { .. } => "zero_amount",
            },
            SettlementError::PullFailed { .. } => "pull_failed",
            SettlementError::UnknownExchange { .. } => "unknown_exchange",
            SettlementError::ExchangeFailed { .. } => "exchange_failed",
            SettlementError::InsufficientOutput { .. } => "insufficient_output",
            SettlementError::FeeRateTooHigh { .. } => "fee_rate_too_high",
            SettlementError::InvalidRecipient => "invalid_recipient",
            SettlementError::InvalidController => "invalid_controller",
            SettlementError::NothingToRecover { .. } => "nothing_to_recover",
            SettlementError::Unauthorized { .. } => "unauthorized",
            SettlementError::Reentrant => "reentrant",
            SettlementError::Paused => "paused",
            SettlementError::AlreadyPaused => "already_paused",
            SettlementError::NotPaused => "not_paused",
            SettlementError::InvalidConfig(_) => "invalid_config",
            SettlementError::Fee(_) => "fee_arithmetic",
            SettlementError::Ledger(_) => "ledger",
        }
    }
}
