use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use cosmwasm_std::{Addr, Binary, Uint128};
use thiserror::Error;

use crate::ledger::{AssetLedger, BalanceReader, LedgerError, LedgerTransaction};
use crate::SettlementError;

/// External service that converts assets given an opaque instruction
///
/// Implementations are untrusted: they may move less than asked, pay less
/// than promised, or fail. The engine only relies on the balances they leave
/// behind.
pub trait Exchange: Send + Sync {
    fn execute(
        &self,
        ctx: &mut ExchangeContext<'_, '_>,
        instruction: &Binary,
    ) -> Result<(), ExchangeError>;
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("reverted: {0}")]
    Reverted(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// What an exchange may do during one call: act on the staged ledger as itself
pub struct ExchangeContext<'t, 'l> {
    ledger: &'t mut LedgerTransaction<'l>,
    exchange: &'t Addr,
    engine: &'t Addr,
}

impl<'t, 'l> ExchangeContext<'t, 'l> {
    pub fn new(ledger: &'t mut LedgerTransaction<'l>, exchange: &'t Addr, engine: &'t Addr) -> Self {
        Self {
            ledger,
            exchange,
            engine,
        }
    }

    /// Address of the exchange being called
    pub fn exchange(&self) -> &Addr {
        self.exchange
    }

    /// Address of the engine that made the call
    pub fn engine(&self) -> &Addr {
        self.engine
    }

    pub fn balance_of(&self, asset: &Addr, holder: &Addr) -> Uint128 {
        self.ledger.balance_of(asset, holder)
    }

    /// Allowance the engine has granted this exchange
    pub fn allowance(&self, asset: &Addr) -> Uint128 {
        self.ledger.allowance(asset, self.engine, self.exchange)
    }

    /// Spend the engine's authorization to take `amount` of `asset`
    pub fn pull_from_engine(&mut self, asset: &Addr, amount: Uint128) -> Result<(), ExchangeError> {
        self.ledger
            .transfer_from(asset, self.exchange, self.engine, self.exchange, amount)?;
        Ok(())
    }

    /// Send `amount` of `asset` from the exchange's own holdings to the engine
    pub fn pay_engine(&mut self, asset: &Addr, amount: Uint128) -> Result<(), ExchangeError> {
        self.ledger.transfer(asset, self.exchange, self.engine, amount)?;
        Ok(())
    }

    /// Send `amount` of `asset` from the exchange's own holdings to anyone
    pub fn transfer(&mut self, asset: &Addr, to: &Addr, amount: Uint128) -> Result<(), ExchangeError> {
        self.ledger.transfer(asset, self.exchange, to, amount)?;
        Ok(())
    }
}

/// Exchanges reachable by address
#[derive(Default, Clone)]
pub struct ExchangeRegistry {
    exchanges: HashMap<Addr, Arc<dyn Exchange>>,
}

impl ExchangeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy `exchange` at `address`, replacing whatever was there
    pub fn register(&mut self, address: Addr, exchange: Arc<dyn Exchange>) {
        self.exchanges.insert(address, exchange);
    }

    pub fn get(&self, address: &Addr) -> Option<Arc<dyn Exchange>> {
        self.exchanges.get(address).cloned()
    }

    pub fn contains(&self, address: &Addr) -> bool {
        self.exchanges.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl fmt::Debug for ExchangeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut addresses: Vec<_> = self.exchanges.keys().map(Addr::as_str).collect();
        addresses.sort_unstable();
        f.debug_struct("ExchangeRegistry")
            .field("exchanges", &addresses)
            .finish()
    }
}

/// Invokes one leg's instruction and reports only success or failure
pub struct ExchangeAdapter<'r> {
    registry: &'r ExchangeRegistry,
}

impl<'r> ExchangeAdapter<'r> {
    pub fn new(registry: &'r ExchangeRegistry) -> Self {
        Self { registry }
    }

    pub fn invoke(
        &self,
        index: usize,
        exchange: &Addr,
        engine: &Addr,
        ledger: &mut LedgerTransaction<'_>,
        instruction: &Binary,
    ) -> Result<(), SettlementError> {
        let target = self
            .registry
            .get(exchange)
            .ok_or_else(|| SettlementError::UnknownExchange {
                index,
                exchange: exchange.clone(),
            })?;

        let mut ctx = ExchangeContext::new(ledger, exchange, engine);
        // The staged ledger is discarded on any failure, so whatever the
        // exchange left half-written is never observed
        let result = panic::catch_unwind(AssertUnwindSafe(|| target.execute(&mut ctx, instruction)))
            .unwrap_or_else(|payload| {
                Err(ExchangeError::Reverted(format!(
                    "exchange panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

        result.map_err(|e| SettlementError::ExchangeFailed {
            index,
            reason: e.to_string(),
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;

    /// Pays a fixed amount of output and never looks at the instruction
    struct FixedPayout {
        output: Addr,
        amount: Uint128,
    }

    impl Exchange for FixedPayout {
        fn execute(
            &self,
            ctx: &mut ExchangeContext<'_, '_>,
            _instruction: &Binary,
        ) -> Result<(), ExchangeError> {
            let output = self.output.clone();
            ctx.pay_engine(&output, self.amount)
        }
    }

    /// Panics on every call
    struct Panicking;

    impl Exchange for Panicking {
        fn execute(
            &self,
            ctx: &mut ExchangeContext<'_, '_>,
            _instruction: &Binary,
        ) -> Result<(), ExchangeError> {
            let usdc = Addr::unchecked("uusdc");
            let engine = ctx.engine().clone();
            ctx.transfer(&usdc, &engine, Uint128::new(5))
                .expect("router is funded");
            panic!("pool state corrupted");
        }
    }

    #[test]
    fn test_invoke_unknown_exchange() {
        let registry = ExchangeRegistry::new();
        let ledger = Ledger::new();
        let mut tx = ledger.begin();

        let err = ExchangeAdapter::new(&registry)
            .invoke(
                2,
                &Addr::unchecked("nowhere"),
                &Addr::unchecked("engine"),
                &mut tx,
                &Binary::default(),
            )
            .unwrap_err();
        assert!(matches!(err, SettlementError::UnknownExchange { index: 2, .. }));
    }

    #[test]
    fn test_invoke_maps_failure_to_index() {
        let mut registry = ExchangeRegistry::new();
        registry.register(
            Addr::unchecked("router"),
            Arc::new(FixedPayout {
                output: Addr::unchecked("uusdc"),
                amount: Uint128::new(10),
            }),
        );

        // router holds no uusdc, so paying out fails
        let ledger = Ledger::new();
        let mut tx = ledger.begin();
        let err = ExchangeAdapter::new(&registry)
            .invoke(
                4,
                &Addr::unchecked("router"),
                &Addr::unchecked("engine"),
                &mut tx,
                &Binary::default(),
            )
            .unwrap_err();
        assert!(matches!(err, SettlementError::ExchangeFailed { index: 4, .. }));
    }

    #[test]
    fn test_invoke_writes_into_transaction() {
        let router = Addr::unchecked("router");
        let engine = Addr::unchecked("engine");
        let usdc = Addr::unchecked("uusdc");

        let mut registry = ExchangeRegistry::new();
        registry.register(
            router.clone(),
            Arc::new(FixedPayout {
                output: usdc.clone(),
                amount: Uint128::new(10),
            }),
        );
        assert_eq!(registry.len(), 1);

        let mut ledger = Ledger::new();
        ledger.mint(&usdc, &router, Uint128::new(10)).unwrap();

        let mut tx = ledger.begin();
        ExchangeAdapter::new(&registry)
            .invoke(0, &router, &engine, &mut tx, &Binary::default())
            .unwrap();

        assert_eq!(tx.balance_of(&usdc, &engine), Uint128::new(10));
        assert_eq!(ledger.balance_of(&usdc, &engine), Uint128::zero());
    }

    #[test]
    fn test_invoke_turns_panic_into_failure() {
        let router = Addr::unchecked("router");
        let engine = Addr::unchecked("engine");
        let usdc = Addr::unchecked("uusdc");

        let mut registry = ExchangeRegistry::new();
        registry.register(router.clone(), Arc::new(Panicking));
        assert!(registry.contains(&router));
        assert!(!registry.contains(&engine));

        let mut ledger = Ledger::new();
        ledger.mint(&usdc, &router, Uint128::new(10)).unwrap();

        let mut tx = ledger.begin();
        let err = ExchangeAdapter::new(&registry)
            .invoke(3, &router, &engine, &mut tx, &Binary::default())
            .unwrap_err();
        match err {
            SettlementError::ExchangeFailed { index, reason } => {
                assert_eq!(index, 3);
                assert!(reason.contains("pool state corrupted"));
            }
            other => panic!("expected exchange failure, got {other:?}"),
        }
        assert_eq!(ledger.balance_of(&usdc, &engine), Uint128::zero());
    }
}
