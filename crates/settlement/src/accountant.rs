use cosmwasm_std::{Addr, Uint128};

use crate::ledger::BalanceReader;

/// Measures proceeds by reading the holder's balance around an external call
///
/// The exchange never reports its own output; what counts is what actually
/// arrived in the holder's balance.
#[derive(Debug, Clone, Copy)]
pub struct BalanceAccountant<'a> {
    holder: &'a Addr,
    asset: &'a Addr,
}

/// Balance reading taken before and after one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    pub before: Uint128,
    pub after: Uint128,
}

impl<'a> BalanceAccountant<'a> {
    pub fn new(holder: &'a Addr, asset: &'a Addr) -> Self {
        Self { holder, asset }
    }

    pub fn measure<R: BalanceReader + ?Sized>(&self, reader: &R) -> Uint128 {
        reader.balance_of(self.asset, self.holder)
    }

    pub fn delta(&self, before: Uint128, after: Uint128) -> BalanceDelta {
        BalanceDelta { before, after }
    }
}

impl BalanceDelta {
    /// Units gained across the step; a decrease counts as zero
    pub fn gained(&self) -> Uint128 {
        self.after.saturating_sub(self.before)
    }

    pub fn is_loss(&self) -> bool {
        self.after < self.before
    }
}
