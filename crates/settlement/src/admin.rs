//! Controller-only operations
//!
//! Each operation checks the caller against the stored controller before
//! touching anything. None of them consult the pause flag.

use cosmwasm_std::{Addr, Uint128};
use multiswap_types::{is_null_addr, EngineEvent};
use tracing::{info, warn};

use crate::engine::{EngineState, SettlementEngine};
use crate::ledger::{AssetLedger, BalanceReader};
use crate::SettlementError;

impl SettlementEngine {
    /// Run one controller-only mutation and publish the event it produces
    fn administer<T>(
        &self,
        caller: &Addr,
        action: &'static str,
        apply: impl FnOnce(&mut EngineState) -> Result<(T, EngineEvent), SettlementError>,
    ) -> Result<T, SettlementError> {
        let result = self.lock_state().and_then(|mut state| {
            if *caller != state.controller {
                return Err(SettlementError::Unauthorized {
                    caller: caller.clone(),
                });
            }
            let (value, event) = apply(&mut *state)?;
            state.publish([event.clone()]);
            Ok((value, event))
        });

        match result {
            Ok((value, event)) => {
                info!(action, caller = %caller, event = event.name(), "admin action applied");
                if let Some(observer) = &self.observer {
                    observer.on_admin(&event);
                }
                Ok(value)
            }
            Err(e) => {
                warn!(action, caller = %caller, error = %e, "admin action rejected");
                Err(e)
            }
        }
    }

    /// Set the protocol fee rate in basis points (at most 100)
    pub fn set_fee_rate(&self, caller: &Addr, rate_bps: u16) -> Result<(), SettlementError> {
        self.administer(caller, "set_fee_rate", |state| {
            let old_bps = state.fees.set_rate(rate_bps)?;
            Ok((
                (),
                EngineEvent::FeeRateUpdated {
                    old_bps,
                    new_bps: rate_bps,
                },
            ))
        })
    }

    pub fn set_fee_recipient(&self, caller: &Addr, recipient: Addr) -> Result<(), SettlementError> {
        self.administer(caller, "set_fee_recipient", |state| {
            let old = state.fees.set_recipient(recipient.clone())?;
            Ok(((), EngineEvent::FeeRecipientUpdated { old, new: recipient }))
        })
    }

    /// Block new settlements; admin operations stay available
    pub fn pause(&self, caller: &Addr) -> Result<(), SettlementError> {
        self.administer(caller, "pause", |state| {
            if state.paused {
                return Err(SettlementError::AlreadyPaused);
            }
            state.paused = true;
            Ok(((), EngineEvent::Paused { by: caller.clone() }))
        })
    }

    pub fn unpause(&self, caller: &Addr) -> Result<(), SettlementError> {
        self.administer(caller, "unpause", |state| {
            if !state.paused {
                return Err(SettlementError::NotPaused);
            }
            state.paused = false;
            Ok(((), EngineEvent::Unpaused { by: caller.clone() }))
        })
    }

    /// Sweep the engine's whole balance of `asset` to `to`
    pub fn recover(&self, caller: &Addr, asset: &Addr, to: &Addr) -> Result<Uint128, SettlementError> {
        let engine = self.address().clone();
        self.administer(caller, "recover", |state| {
            if is_null_addr(to) {
                return Err(SettlementError::InvalidRecipient);
            }
            let amount = state.ledger.balance_of(asset, &engine);
            if amount.is_zero() {
                return Err(SettlementError::NothingToRecover {
                    asset: asset.clone(),
                });
            }
            state.ledger.transfer(asset, &engine, to, amount)?;
            Ok((
                amount,
                EngineEvent::Recovered {
                    asset: asset.clone(),
                    to: to.clone(),
                    amount,
                },
            ))
        })
    }

    /// Hand the controller role to `new_controller`
    pub fn transfer_control(&self, caller: &Addr, new_controller: Addr) -> Result<(), SettlementError> {
        self.administer(caller, "transfer_control", |state| {
            if is_null_addr(&new_controller) {
                return Err(SettlementError::InvalidController);
            }
            let previous = std::mem::replace(&mut state.controller, new_controller.clone());
            Ok((
                (),
                EngineEvent::ControlTransferred {
                    previous,
                    new: new_controller,
                },
            ))
        })
    }
}
