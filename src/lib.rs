//! multiswap: atomic multi-asset conversion settlement
//!
//! Re-exports the member crates and wires them together in [`bootstrap`].

pub mod bootstrap;

pub use multiswap_config as config;
pub use multiswap_metrics as metrics;
pub use multiswap_settlement as settlement;
pub use multiswap_types as types;

pub use bootstrap::{build_engine, from_config, from_config_with_collector, load_config, Runtime};
pub use multiswap_settlement::{SettlementEngine, SettlementError};
pub use multiswap_types::{ConversionRequest, SettlementOutcome};
