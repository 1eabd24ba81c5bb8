//! Atomic multi-asset conversion settlement
//!
//! A caller hands the engine a batch of input assets and one output asset.
//! The engine pulls each input, routes it through an external exchange,
//! measures what actually arrived, checks the slippage floor, takes the
//! protocol fee and pays the caller. Any failure leaves every balance as it
//! was.

pub mod accountant;
pub mod admin;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod fees;
pub mod guard;
pub mod ledger;
pub mod mock;

pub use accountant::{BalanceAccountant, BalanceDelta};
pub use engine::{EngineBuilder, SettlementEngine, SettlementObserver};
pub use error::*;
pub use exchange::{Exchange, ExchangeAdapter, ExchangeContext, ExchangeError, ExchangeRegistry};
pub use fees::FeeLedger;
pub use guard::{Entered, ReentrancyGuard};
pub use ledger::{AssetLedger, BalanceReader, Changeset, Ledger, LedgerError, LedgerTransaction};
