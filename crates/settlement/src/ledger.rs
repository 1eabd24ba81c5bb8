//! Asset balances and the staged transaction used to make settlement atomic
//!
//! [`Ledger`] is the committed state: who holds how much of which asset and
//! who may spend on whose behalf. [`LedgerTransaction`] is a copy-on-write
//! overlay over a borrowed ledger. Every write made during a settlement lands
//! in the overlay; the overlay is turned into a [`Changeset`] and applied only
//! once every step has succeeded. Dropping a transaction discards it.

use std::collections::HashMap;

use cosmwasm_std::{Addr, Uint128};
use multiswap_types::is_null_addr;
use thiserror::Error;

type BalanceKey = (Addr, Addr);
type AllowanceKey = (Addr, Addr, Addr);

// ═══════════════════════════════════════════════════════════════════════════
// ERROR TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient {asset} balance for {holder}: needed {needed}, available {available}")]
    InsufficientBalance {
        asset: Addr,
        holder: Addr,
        needed: Uint128,
        available: Uint128,
    },

    #[error("insufficient {asset} allowance from {owner} to {spender}: needed {needed}, available {available}")]
    InsufficientAllowance {
        asset: Addr,
        owner: Addr,
        spender: Addr,
        needed: Uint128,
        available: Uint128,
    },

    #[error("invalid receiver")]
    InvalidReceiver,

    #[error("{asset} balance overflow for {holder}")]
    Overflow { asset: Addr, holder: Addr },
}

// ═══════════════════════════════════════════════════════════════════════════
// LEDGER TRAITS
// ═══════════════════════════════════════════════════════════════════════════

/// Read access to balances and allowances
pub trait BalanceReader {
    fn balance_of(&self, asset: &Addr, holder: &Addr) -> Uint128;

    fn allowance(&self, asset: &Addr, owner: &Addr, spender: &Addr) -> Uint128;
}

mod sealed {
    use cosmwasm_std::{Addr, Uint128};

    /// Raw writes; only reachable through the checked operations of `AssetLedger`
    pub trait Store: super::BalanceReader {
        fn write_balance(&mut self, asset: &Addr, holder: &Addr, amount: Uint128);

        fn write_allowance(&mut self, asset: &Addr, owner: &Addr, spender: &Addr, amount: Uint128);
    }
}

/// Checked asset movements, shared by the committed ledger and transactions
///
/// An allowance of `Uint128::MAX` is a standing authorization and is never
/// decremented.
pub trait AssetLedger: sealed::Store {
    /// Credit newly issued units to `to`
    fn mint(&mut self, asset: &Addr, to: &Addr, amount: Uint128) -> Result<(), LedgerError> {
        if is_null_addr(to) {
            return Err(LedgerError::InvalidReceiver);
        }
        let balance = self
            .balance_of(asset, to)
            .checked_add(amount)
            .map_err(|_| LedgerError::Overflow {
                asset: asset.clone(),
                holder: to.clone(),
            })?;
        self.write_balance(asset, to, balance);
        Ok(())
    }

    fn transfer(
        &mut self,
        asset: &Addr,
        from: &Addr,
        to: &Addr,
        amount: Uint128,
    ) -> Result<(), LedgerError> {
        if is_null_addr(to) {
            return Err(LedgerError::InvalidReceiver);
        }

        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.clone(),
                holder: from.clone(),
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }

        // Compute both sides before writing so a failure leaves no partial write
        let debited = available - amount;
        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .map_err(|_| LedgerError::Overflow {
                asset: asset.clone(),
                holder: to.clone(),
            })?;

        self.write_balance(asset, from, debited);
        self.write_balance(asset, to, credited);
        Ok(())
    }

    fn approve(&mut self, asset: &Addr, owner: &Addr, spender: &Addr, amount: Uint128) {
        self.write_allowance(asset, owner, spender, amount);
    }

    /// Move `amount` from `from` to `to` on the strength of `spender`'s allowance
    fn transfer_from(
        &mut self,
        asset: &Addr,
        spender: &Addr,
        from: &Addr,
        to: &Addr,
        amount: Uint128,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(asset, from, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset: asset.clone(),
                owner: from.clone(),
                spender: spender.clone(),
                needed: amount,
                available: allowance,
            });
        }

        self.transfer(asset, from, to, amount)?;

        if allowance != Uint128::MAX {
            self.write_allowance(asset, from, spender, allowance - amount);
        }
        Ok(())
    }
}

impl<T: sealed::Store> AssetLedger for T {}

// ═══════════════════════════════════════════════════════════════════════════
// COMMITTED LEDGER
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Clone)]
pub struct Ledger {
    balances: HashMap<BalanceKey, Uint128>,
    allowances: HashMap<AllowanceKey, Uint128>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a staged transaction over this ledger
    pub fn begin(&self) -> LedgerTransaction<'_> {
        LedgerTransaction {
            base: self,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    /// Write every staged entry in one step
    pub fn apply(&mut self, changeset: Changeset) {
        for (key, amount) in changeset.balances {
            if amount.is_zero() {
                self.balances.remove(&key);
            } else {
                self.balances.insert(key, amount);
            }
        }
        for (key, amount) in changeset.allowances {
            if amount.is_zero() {
                self.allowances.remove(&key);
            } else {
                self.allowances.insert(key, amount);
            }
        }
    }

    /// Every non-zero balance held by `holder`, sorted by asset
    pub fn holdings(&self, holder: &Addr) -> Vec<(Addr, Uint128)> {
        let mut holdings: Vec<_> = self
            .balances
            .iter()
            .filter(|((_, h), _)| h == holder)
            .map(|((asset, _), amount)| (asset.clone(), *amount))
            .collect();
        holdings.sort();
        holdings
    }

    /// Total units of `asset` across all holders
    pub fn supply(&self, asset: &Addr) -> Uint128 {
        self.balances
            .iter()
            .filter(|((a, _), _)| a == asset)
            .fold(Uint128::zero(), |acc, (_, amount)| acc.saturating_add(*amount))
    }
}

impl BalanceReader for Ledger {
    fn balance_of(&self, asset: &Addr, holder: &Addr) -> Uint128 {
        self.balances
            .get(&(asset.clone(), holder.clone()))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, asset: &Addr, owner: &Addr, spender: &Addr) -> Uint128 {
        self.allowances
            .get(&(asset.clone(), owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default()
    }
}

impl sealed::Store for Ledger {
    fn write_balance(&mut self, asset: &Addr, holder: &Addr, amount: Uint128) {
        self.apply(Changeset {
            balances: HashMap::from([((asset.clone(), holder.clone()), amount)]),
            allowances: HashMap::new(),
        });
    }

    fn write_allowance(&mut self, asset: &Addr, owner: &Addr, spender: &Addr, amount: Uint128) {
        self.apply(Changeset {
            balances: HashMap::new(),
            allowances: HashMap::from([((asset.clone(), owner.clone(), spender.clone()), amount)]),
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// STAGED TRANSACTION
// ═══════════════════════════════════════════════════════════════════════════

/// Buffered writes over a borrowed ledger
pub struct LedgerTransaction<'l> {
    base: &'l Ledger,
    balances: HashMap<BalanceKey, Uint128>,
    allowances: HashMap<AllowanceKey, Uint128>,
}

impl LedgerTransaction<'_> {
    /// Close the transaction, keeping its writes for `Ledger::apply`
    pub fn into_changeset(self) -> Changeset {
        Changeset {
            balances: self.balances,
            allowances: self.allowances,
        }
    }

    /// Number of staged entries
    pub fn staged_writes(&self) -> usize {
        self.balances.len() + self.allowances.len()
    }
}

impl BalanceReader for LedgerTransaction<'_> {
    fn balance_of(&self, asset: &Addr, holder: &Addr) -> Uint128 {
        match self.balances.get(&(asset.clone(), holder.clone())) {
            Some(amount) => *amount,
            None => self.base.balance_of(asset, holder),
        }
    }

    fn allowance(&self, asset: &Addr, owner: &Addr, spender: &Addr) -> Uint128 {
        match self
            .allowances
            .get(&(asset.clone(), owner.clone(), spender.clone()))
        {
            Some(amount) => *amount,
            None => self.base.allowance(asset, owner, spender),
        }
    }
}

impl sealed::Store for LedgerTransaction<'_> {
    fn write_balance(&mut self, asset: &Addr, holder: &Addr, amount: Uint128) {
        self.balances.insert((asset.clone(), holder.clone()), amount);
    }

    fn write_allowance(&mut self, asset: &Addr, owner: &Addr, spender: &Addr, amount: Uint128) {
        self.allowances
            .insert((asset.clone(), owner.clone(), spender.clone()), amount);
    }
}

/// Writes produced by a completed transaction
#[derive(Debug, Default)]
pub struct Changeset {
    balances: HashMap<BalanceKey, Uint128>,
    allowances: HashMap<AllowanceKey, Uint128>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty() && self.allowances.is_empty()
    }
}
