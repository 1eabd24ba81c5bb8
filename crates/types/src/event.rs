use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};

/// Records emitted by the engine
///
/// Settlement records are only ever published together with the balance
/// changes they describe; an aborted settlement publishes none.
#[cw_serde]
pub enum EngineEvent {
    /// One leg converted
    Swapped {
        caller: Addr,
        input_asset: Addr,
        amount_in: Uint128,
        amount_out: Uint128,
    },

    /// Whole basket settled and paid out
    BatchCompleted {
        caller: Addr,
        asset_count: u32,
        output_asset: Addr,
        net_amount: Uint128,
    },

    /// Protocol fee transferred to the recipient
    FeeCollected {
        recipient: Addr,
        asset: Addr,
        amount: Uint128,
    },

    /// Stranded balance swept out by the controller
    Recovered {
        asset: Addr,
        to: Addr,
        amount: Uint128,
    },

    FeeRateUpdated { old_bps: u16, new_bps: u16 },

    FeeRecipientUpdated { old: Addr, new: Addr },

    Paused { by: Addr },

    Unpaused { by: Addr },

    ControlTransferred { previous: Addr, new: Addr },
}

impl EngineEvent {
    /// Stable label used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Swapped { .. } => "swapped",
            EngineEvent::BatchCompleted { .. } => "batch_completed",
            EngineEvent::FeeCollected { .. } => "fee_collected",
            EngineEvent::Recovered { .. } => "recovered",
            EngineEvent::FeeRateUpdated { .. } => "fee_rate_updated",
            EngineEvent::FeeRecipientUpdated { .. } => "fee_recipient_updated",
            EngineEvent::Paused { .. } => "paused",
            EngineEvent::Unpaused { .. } => "unpaused",
            EngineEvent::ControlTransferred { .. } => "control_transferred",
        }
    }
}
