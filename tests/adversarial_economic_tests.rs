/// Adversarial economic tests
///
/// These tests simulate economic attacks on the conversion flow:
/// - Exchanges shortchanging the caller
/// - Fee extraction beyond the cap
/// - Fee avoidance by splitting batches
/// - Zero-value griefing
/// - Fee changes between quote and settlement

use std::sync::Arc;

use cosmwasm_std::{Addr, Uint128};
use multiswap::settlement::mock::{MockInstruction, ScriptedExchange};
use multiswap::settlement::AssetLedger;
use multiswap::types::{FeeSplit, RequestError, MAX_FEE_BPS};
use multiswap::{ConversionRequest, SettlementEngine, SettlementError};

const ROUTER: &str = "router";
const USDC: &str = "uusdc";

fn addr(s: &str) -> Addr {
    Addr::unchecked(s)
}

fn engine(fee_rate_bps: u16) -> SettlementEngine {
    let engine = SettlementEngine::builder("engine", "controller", "treasury")
        .fee_rate_bps(fee_rate_bps)
        .exchange(ROUTER, Arc::new(ScriptedExchange::new()))
        .build()
        .unwrap();
    engine
        .with_ledger(|ledger| {
            ledger
                .mint(&addr("uatom"), &addr("victim"), Uint128::new(100_000_000))
                .unwrap();
            ledger.approve(&addr("uatom"), &addr("victim"), &addr("engine"), Uint128::MAX);
            ledger
                .mint(&addr(USDC), &addr(ROUTER), Uint128::new(1_000_000_000))
                .unwrap();
        })
        .unwrap();
    engine
}

fn request(amount_in: u128, amount_out: u128, min_output: u128) -> ConversionRequest {
    ConversionRequest::builder(ROUTER, USDC)
        .leg(
            "uatom",
            amount_in,
            MockInstruction::swap("uatom", amount_in, USDC, amount_out)
                .to_binary()
                .unwrap(),
        )
        .min_output(min_output)
        .build()
}

// ═══════════════════════════════════════════════════════════════════════════
// SHORTCHANGE TESTS
// ═══════════════════════════════════════════════════════════════════════════

/// Exchange pays far less than quoted; the floor stops it
#[test]
fn test_shortchange_blocked_by_min_output() {
    let engine = engine(10);
    let err = engine
        .settle(&addr("victim"), &request(1_000_000, 500_000, 990_000))
        .unwrap_err();

    assert!(matches!(err, SettlementError::InsufficientOutput { .. }));
    assert_eq!(
        engine.balance_of(&addr("uatom"), &addr("victim")).unwrap(),
        Uint128::new(100_000_000)
    );
    assert_eq!(
        engine.balance_of(&addr(USDC), &addr("treasury")).unwrap(),
        Uint128::zero()
    );
}

/// The floor applies to the gross total, before the fee
#[test]
fn test_floor_is_checked_before_fee() {
    let engine = engine(MAX_FEE_BPS);
    let outcome = engine
        .settle(&addr("victim"), &request(1_000_000, 1_000_000, 1_000_000))
        .unwrap();

    assert_eq!(outcome.total_output, Uint128::new(1_000_000));
    assert_eq!(outcome.net, Uint128::new(990_000));
}

// ═══════════════════════════════════════════════════════════════════════════
// FEE EXTRACTION TESTS
// ═══════════════════════════════════════════════════════════════════════════

/// Even the controller cannot push the fee above 1%
#[test]
fn test_fee_rate_cannot_exceed_cap() {
    let engine = engine(10);
    for rate in [MAX_FEE_BPS + 1, 500, 10_000, u16::MAX] {
        assert!(matches!(
            engine.set_fee_rate(&addr("controller"), rate),
            Err(SettlementError::FeeRateTooHigh { .. })
        ));
    }
    assert_eq!(engine.fee_rate().unwrap(), 10);
}

/// Fee and payout always add up to the total, with the fee rounded down
#[test]
fn test_fee_never_exceeds_rate() {
    let totals = [0u128, 1, 99, 999, 1_000, 10_001, 123_456_789, u64::MAX as u128, u128::MAX];
    for rate in 0..=MAX_FEE_BPS {
        for total in totals {
            let split = FeeSplit::compute(Uint128::new(total), rate).unwrap();
            assert_eq!(split.fee + split.net, Uint128::new(total));
            assert!(split.fee.u128() <= total / 10_000 * rate as u128 + rate as u128);
        }
    }
}

/// Quote, then the controller raises the rate; settlement uses the new rate
#[test]
fn test_fee_change_between_quote_and_settle() {
    let engine = engine(10);
    let quote = engine.quote_fee(Uint128::new(1_000_000)).unwrap();
    assert_eq!(quote.fee, Uint128::new(1_000));

    engine.set_fee_rate(&addr("controller"), MAX_FEE_BPS).unwrap();

    // a floor set from the gross quote does not protect the net payout
    let outcome = engine
        .settle(&addr("victim"), &request(1_000_000, 1_000_000, quote.total.u128()))
        .unwrap();
    assert_eq!(outcome.fee, Uint128::new(10_000));
    assert!(outcome.net < quote.net);
}

// ═══════════════════════════════════════════════════════════════════════════
// FEE AVOIDANCE TESTS
// ═══════════════════════════════════════════════════════════════════════════

/// Batching many legs into one settlement is charged on the combined total
#[test]
fn test_fee_charged_on_batch_total() {
    let engine = engine(10);
    let mut builder = ConversionRequest::builder(ROUTER, USDC);
    for _ in 0..10 {
        builder = builder.leg(
            "uatom",
            500,
            MockInstruction::swap("uatom", 500, USDC, 500)
                .to_binary()
                .unwrap(),
        );
    }

    let outcome = engine.settle(&addr("victim"), &builder.build()).unwrap();
    assert_eq!(outcome.total_output, Uint128::new(5_000));
    assert_eq!(outcome.fee, Uint128::new(5));
}

/// Settlements small enough that the fee rounds to zero
#[test]
fn test_dust_settlements_pay_no_fee() {
    let engine = engine(10);
    for _ in 0..5 {
        let outcome = engine
            .settle(&addr("victim"), &request(999, 999, 999))
            .unwrap();
        assert_eq!(outcome.fee, Uint128::zero());
    }
    assert_eq!(
        engine.balance_of(&addr(USDC), &addr("treasury")).unwrap(),
        Uint128::zero()
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// GRIEFING TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_zero_value_griefing() {
    let engine = engine(10);
    assert!(matches!(
        engine.settle(&addr("victim"), &request(0, 0, 0)),
        Err(SettlementError::Request(RequestError::ZeroAmount { index: 0 }))
    ));
    assert_eq!(engine.status().unwrap().settlements_committed, 0);
}

/// Spending someone else's allowance is impossible: the caller is always the payer
#[test]
fn test_caller_cannot_spend_victims_funds() {
    let engine = engine(10);
    let err = engine
        .settle(&addr("attacker"), &request(1_000, 1_000, 0))
        .unwrap_err();

    assert!(matches!(err, SettlementError::PullFailed { index: 0, .. }));
    assert_eq!(
        engine.balance_of(&addr("uatom"), &addr("victim")).unwrap(),
        Uint128::new(100_000_000)
    );
}
