//! Scripted exchange for tests and local runs
//!
//! Each leg's instruction is a JSON-encoded [`MockInstruction`] telling the
//! exchange exactly what to do with the engine's assets.

use std::sync::atomic::{AtomicUsize, Ordering};

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{from_json, to_json_binary, Addr, Binary, StdResult, Uint128};
use tracing::debug;

use crate::exchange::{Exchange, ExchangeContext, ExchangeError};

#[cw_serde]
pub enum MockInstruction {
    /// Pull `amount_in` of `input` from the engine and pay back `amount_out` of `output`
    Swap {
        input: Addr,
        amount_in: Uint128,
        output: Addr,
        amount_out: Uint128,
    },
    /// Fail the call
    Revert { reason: String },
    /// Pay `amount` of `asset` to the engine without taking anything
    Donate { asset: Addr, amount: Uint128 },
    /// Pull `amount` of `asset` from the engine and pay nothing
    Drain { asset: Addr, amount: Uint128 },
    /// Swap, but send the proceeds to `to` instead of the engine
    Divert {
        input: Addr,
        amount_in: Uint128,
        output: Addr,
        amount_out: Uint128,
        to: Addr,
    },
    /// Succeed without moving anything
    Noop,
}

impl MockInstruction {
    pub fn swap(input: &str, amount_in: u128, output: &str, amount_out: u128) -> Self {
        Self::Swap {
            input: Addr::unchecked(input),
            amount_in: Uint128::new(amount_in),
            output: Addr::unchecked(output),
            amount_out: Uint128::new(amount_out),
        }
    }

    pub fn revert(reason: impl Into<String>) -> Self {
        Self::Revert {
            reason: reason.into(),
        }
    }

    pub fn donate(asset: &str, amount: u128) -> Self {
        Self::Donate {
            asset: Addr::unchecked(asset),
            amount: Uint128::new(amount),
        }
    }

    pub fn drain(asset: &str, amount: u128) -> Self {
        Self::Drain {
            asset: Addr::unchecked(asset),
            amount: Uint128::new(amount),
        }
    }

    pub fn divert(input: &str, amount_in: u128, output: &str, amount_out: u128, to: &str) -> Self {
        Self::Divert {
            input: Addr::unchecked(input),
            amount_in: Uint128::new(amount_in),
            output: Addr::unchecked(output),
            amount_out: Uint128::new(amount_out),
            to: Addr::unchecked(to),
        }
    }

    pub fn to_binary(&self) -> StdResult<Binary> {
        to_json_binary(self)
    }
}

/// Exchange that follows [`MockInstruction`]s, paying out of its own holdings
#[derive(Debug, Default)]
pub struct ScriptedExchange {
    calls: AtomicUsize,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the exchange has been invoked, including failed calls
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Exchange for ScriptedExchange {
    fn execute(
        &self,
        ctx: &mut ExchangeContext<'_, '_>,
        instruction: &Binary,
    ) -> Result<(), ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let instruction: MockInstruction = from_json(instruction)
            .map_err(|e| ExchangeError::Reverted(format!("malformed instruction: {e}")))?;
        debug!(
            exchange = %ctx.exchange(),
            engine = %ctx.engine(),
            ?instruction,
            "scripted exchange called"
        );

        match instruction {
            MockInstruction::Swap {
                input,
                amount_in,
                output,
                amount_out,
            } => {
                pull_allowed(ctx, &input, amount_in)?;
                ctx.pay_engine(&output, amount_out)
            }
            MockInstruction::Divert {
                input,
                amount_in,
                output,
                amount_out,
                to,
            } => {
                pull_allowed(ctx, &input, amount_in)?;
                ctx.transfer(&output, &to, amount_out)
            }
            MockInstruction::Revert { reason } => Err(ExchangeError::Reverted(reason)),
            MockInstruction::Donate { asset, amount } => ctx.pay_engine(&asset, amount),
            MockInstruction::Drain { asset, amount } => ctx.pull_from_engine(&asset, amount),
            MockInstruction::Noop => Ok(()),
        }
    }
}

fn pull_allowed(
    ctx: &mut ExchangeContext<'_, '_>,
    asset: &Addr,
    amount: Uint128,
) -> Result<(), ExchangeError> {
    let allowance = ctx.allowance(asset);
    if allowance < amount {
        return Err(ExchangeError::Reverted(format!(
            "allowance {allowance} {asset} below {amount}"
        )));
    }
    ctx.pull_from_engine(asset, amount)
}
