use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cosmwasm_std::{Addr, Uint128};
use multiswap_types::{
    is_null_addr, ConversionRequest, EngineEvent, EngineStatus, FeeSplit, LegOutcome,
    SettlementOutcome, DEFAULT_FEE_BPS,
};
use tracing::{debug, info, info_span, warn};

use crate::accountant::BalanceAccountant;
use crate::exchange::{Exchange, ExchangeAdapter, ExchangeRegistry};
use crate::fees::FeeLedger;
use crate::guard::ReentrancyGuard;
use crate::ledger::{AssetLedger, BalanceReader, Ledger};
use crate::SettlementError;

// ═══════════════════════════════════════════════════════════════════════════
// OBSERVER
// ═══════════════════════════════════════════════════════════════════════════

/// Notified after each operation has committed or aborted
///
/// Callbacks run after the engine's state lock is released.
pub trait SettlementObserver: Send + Sync {
    fn on_settled(&self, _outcome: &SettlementOutcome) {}

    fn on_rejected(&self, _caller: &Addr, _error: &SettlementError) {}

    fn on_admin(&self, _event: &EngineEvent) {}
}

// ═══════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════

/// Everything a settlement reads or writes, guarded by one lock
pub(crate) struct EngineState {
    pub(crate) ledger: Ledger,
    pub(crate) exchanges: ExchangeRegistry,
    pub(crate) fees: FeeLedger,
    pub(crate) controller: Addr,
    pub(crate) paused: bool,
    pub(crate) events: Vec<EngineEvent>,
    pub(crate) settlements_committed: u64,
}

impl EngineState {
    pub(crate) fn publish(&mut self, events: impl IntoIterator<Item = EngineEvent>) {
        for event in events {
            debug!(event = event.name(), ?event, "event published");
            self.events.push(event);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════

/// Atomic multi-asset conversion engine
///
/// Share it behind an `Arc`; every entry point takes `&self`. While a
/// settlement is running, every other call into the engine fails with
/// [`SettlementError::Reentrant`], whichever thread it comes from. Callers
/// that are genuinely independent are serialized by the host, outside the
/// engine.
pub struct SettlementEngine {
    address: Addr,
    pub(crate) state: Mutex<EngineState>,
    pub(crate) guard: ReentrancyGuard,
    pub(crate) observer: Option<Arc<dyn SettlementObserver>>,
}

impl SettlementEngine {
    pub fn builder(
        address: impl Into<String>,
        controller: impl Into<String>,
        fee_recipient: impl Into<String>,
    ) -> EngineBuilder {
        EngineBuilder {
            address: Addr::unchecked(address.into()),
            controller: Addr::unchecked(controller.into()),
            fee_recipient: Addr::unchecked(fee_recipient.into()),
            fee_rate_bps: DEFAULT_FEE_BPS,
            paused: false,
            ledger: Ledger::new(),
            exchanges: ExchangeRegistry::new(),
            observer: None,
        }
    }

    /// Address under which the engine holds assets
    pub fn address(&self) -> &Addr {
        &self.address
    }

    /// Lock engine state, rejecting calls made while a settlement is running
    pub(crate) fn lock_state(&self) -> Result<MutexGuard<'_, EngineState>, SettlementError> {
        self.guard.check()?;
        Ok(self.lock_unguarded())
    }

    fn lock_unguarded(&self) -> MutexGuard<'_, EngineState> {
        // Committed state is only written after a settlement has fully
        // succeeded, so a panic mid-settlement leaves it consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SETTLEMENT
    // ═══════════════════════════════════════════════════════════════════════

    /// Convert every input leg into the output asset and pay the caller
    ///
    /// Either the whole settlement commits (caller debited, fee and net paid,
    /// events published) or nothing changes and an error is returned.
    pub fn settle(
        &self,
        caller: &Addr,
        request: &ConversionRequest,
    ) -> Result<SettlementOutcome, SettlementError> {
        let span = info_span!(
            "settlement",
            caller = %caller,
            exchange = %request.exchange,
            output_asset = %request.output_asset,
            legs = request.len(),
        );
        let _span = span.enter();

        let result = self.execute_settlement(caller, request);

        match &result {
            Ok(outcome) => {
                info!(
                    total_output = %outcome.total_output,
                    fee = %outcome.fee,
                    net = %outcome.net,
                    "settlement committed"
                );
                if let Some(observer) = &self.observer {
                    observer.on_settled(outcome);
                }
            }
            Err(e) => {
                warn!(error_kind = e.kind(), error = %e, "settlement rejected");
                if let Some(observer) = &self.observer {
                    observer.on_rejected(caller, e);
                }
            }
        }

        result
    }

    fn execute_settlement(
        &self,
        caller: &Addr,
        request: &ConversionRequest,
    ) -> Result<SettlementOutcome, SettlementError> {
        // Entered before the lock: only calls that are not waiting on this
        // settlement can still be holding it
        let _entered = self.guard.enter()?;
        let mut locked = self.lock_unguarded();
        let state = &mut *locked;

        if state.paused {
            return Err(SettlementError::Paused);
        }
        request.validate_shape()?;

        let engine = &self.address;
        let output_asset = &request.output_asset;

        let (changeset, events, outcome) = {
            let mut tx = state.ledger.begin();
            let adapter = ExchangeAdapter::new(&state.exchanges);
            let accountant = BalanceAccountant::new(engine, output_asset);

            let mut legs = Vec::with_capacity(request.len());
            let mut events = Vec::with_capacity(request.len() + 2);

            for leg in request.legs() {
                leg.validate()?;

                let before = accountant.measure(&tx);

                tx.transfer_from(leg.asset, engine, caller, engine, leg.amount)
                    .map_err(|source| SettlementError::PullFailed {
                        index: leg.index,
                        source,
                    })?;

                // Standing authorization, not scoped to this leg's amount
                tx.approve(leg.asset, engine, &request.exchange, Uint128::MAX);

                adapter.invoke(leg.index, &request.exchange, engine, &mut tx, leg.instruction)?;

                let delta = accountant.delta(before, accountant.measure(&tx));
                if delta.is_loss() {
                    warn!(
                        index = leg.index,
                        before = %delta.before,
                        after = %delta.after,
                        "output balance decreased across exchange call"
                    );
                }
                debug!(
                    index = leg.index,
                    asset = %leg.asset,
                    amount_in = %leg.amount,
                    amount_out = %delta.gained(),
                    "leg executed"
                );

                legs.push(LegOutcome {
                    index: leg.index,
                    input_asset: leg.asset.clone(),
                    amount_in: leg.amount,
                    amount_out: delta.gained(),
                });
                events.push(EngineEvent::Swapped {
                    caller: caller.clone(),
                    input_asset: leg.asset.clone(),
                    amount_in: leg.amount,
                    amount_out: delta.gained(),
                });
            }

            // Fresh read: this is what the engine can actually disburse
            let total_output = accountant.measure(&tx);
            if total_output < request.min_output {
                return Err(SettlementError::InsufficientOutput {
                    total: total_output,
                    minimum: request.min_output,
                });
            }

            let split = state.fees.split(total_output)?;
            if split.has_fee() {
                let recipient = state.fees.recipient();
                tx.transfer(output_asset, engine, recipient, split.fee)?;
                events.push(EngineEvent::FeeCollected {
                    recipient: recipient.clone(),
                    asset: output_asset.clone(),
                    amount: split.fee,
                });
            }

            tx.transfer(output_asset, engine, caller, split.net)?;
            events.push(EngineEvent::BatchCompleted {
                caller: caller.clone(),
                asset_count: legs.len() as u32,
                output_asset: output_asset.clone(),
                net_amount: split.net,
            });

            let outcome = SettlementOutcome::new(caller.clone(), output_asset.clone(), legs, split);
            (tx.into_changeset(), events, outcome)
        };

        state.ledger.apply(changeset);
        state.publish(events);
        state.settlements_committed += 1;

        Ok(outcome)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════

    pub fn status(&self) -> Result<EngineStatus, SettlementError> {
        let state = self.lock_state()?;
        Ok(EngineStatus {
            engine: self.address.clone(),
            controller: state.controller.clone(),
            fee_rate_bps: state.fees.rate_bps(),
            fee_recipient: state.fees.recipient().clone(),
            paused: state.paused,
            settlements_committed: state.settlements_committed,
        })
    }

    pub fn fee_rate(&self) -> Result<u16, SettlementError> {
        Ok(self.lock_state()?.fees.rate_bps())
    }

    pub fn fee_recipient(&self) -> Result<Addr, SettlementError> {
        Ok(self.lock_state()?.fees.recipient().clone())
    }

    pub fn controller(&self) -> Result<Addr, SettlementError> {
        Ok(self.lock_state()?.controller.clone())
    }

    pub fn is_paused(&self) -> Result<bool, SettlementError> {
        Ok(self.lock_state()?.paused)
    }

    /// Fee and payout a settlement producing `total` would yield at the current rate
    pub fn quote_fee(&self, total: Uint128) -> Result<FeeSplit, SettlementError> {
        self.lock_state()?.fees.split(total)
    }

    pub fn balance_of(&self, asset: &Addr, holder: &Addr) -> Result<Uint128, SettlementError> {
        Ok(self.lock_state()?.ledger.balance_of(asset, holder))
    }

    /// Every committed event, oldest first
    pub fn events(&self) -> Result<Vec<EngineEvent>, SettlementError> {
        Ok(self.lock_state()?.events.clone())
    }

    /// Remove and return every committed event
    pub fn drain_events(&self) -> Result<Vec<EngineEvent>, SettlementError> {
        let mut state = self.lock_state()?;
        Ok(std::mem::take(&mut state.events))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // HOST
    // ═══════════════════════════════════════════════════════════════════════

    /// Run `f` against the committed asset ledger
    ///
    /// Stands in for the asset host: funding accounts and granting the engine
    /// allowances happen here, outside any settlement.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> Result<R, SettlementError> {
        let mut state = self.lock_state()?;
        Ok(f(&mut state.ledger))
    }

    /// Deploy an exchange at `address`
    pub fn register_exchange(
        &self,
        address: impl Into<String>,
        exchange: Arc<dyn Exchange>,
    ) -> Result<(), SettlementError> {
        let address = Addr::unchecked(address.into());
        if is_null_addr(&address) {
            return Err(SettlementError::InvalidConfig(
                "exchange address must not be empty".to_string(),
            ));
        }
        let mut state = self.lock_state()?;
        if state.exchanges.contains(&address) {
            warn!(exchange = %address, "replacing registered exchange");
        }
        state.exchanges.register(address, exchange);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════

pub struct EngineBuilder {
    address: Addr,
    controller: Addr,
    fee_recipient: Addr,
    fee_rate_bps: u16,
    paused: bool,
    ledger: Ledger,
    exchanges: ExchangeRegistry,
    observer: Option<Arc<dyn SettlementObserver>>,
}

impl EngineBuilder {
    pub fn fee_rate_bps(mut self, rate_bps: u16) -> Self {
        self.fee_rate_bps = rate_bps;
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn exchange(mut self, address: impl Into<String>, exchange: Arc<dyn Exchange>) -> Self {
        self.exchanges
            .register(Addr::unchecked(address.into()), exchange);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn SettlementObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> Result<SettlementEngine, SettlementError> {
        if is_null_addr(&self.address) {
            return Err(SettlementError::InvalidConfig(
                "engine address must not be empty".to_string(),
            ));
        }
        if is_null_addr(&self.controller) {
            return Err(SettlementError::InvalidController);
        }
        let fees = FeeLedger::with_rate(self.fee_rate_bps, self.fee_recipient)?;

        Ok(SettlementEngine {
            address: self.address,
            state: Mutex::new(EngineState {
                ledger: self.ledger,
                exchanges: self.exchanges,
                fees,
                controller: self.controller,
                paused: self.paused,
                events: Vec::new(),
                settlements_committed: 0,
            }),
            guard: ReentrancyGuard::new(),
            observer: self.observer,
        })
    }
}
