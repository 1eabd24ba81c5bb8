use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;

/// Snapshot of the engine's persisted administrative state
#[cw_serde]
pub struct EngineStatus {
    pub engine: Addr,
    pub controller: Addr,
    pub fee_rate_bps: u16,
    pub fee_recipient: Addr,
    pub paused: bool,
    pub settlements_committed: u64,
}
