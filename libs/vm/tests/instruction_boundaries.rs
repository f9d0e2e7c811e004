//! Edge values of fee, concentration and decay instructions

use proptest::prelude::*;
use std::sync::Arc;
use swapvm::{
    clamp_balance, Direction, Engine, ManualClock, Order, StaticFeeProvider, SwapRequest,
    VmError,
};
use swapvm_amm::{CurveError, BPS_DENOMINATOR};
use swapvm_codec::{Address, ProgramBuilder};

const NOW: u64 = 1_700_000_000;

fn tokens() -> (Address, Address, Address) {
    (
        Address::from_low_byte(0xA),
        Address::from_low_byte(0xB),
        Address::from_low_byte(0x7),
    )
}

fn maker() -> Address {
    Address::from_low_byte(0x1)
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

fn fee_program(fee_bps: u16) -> Order {
    let (a, b, _) = tokens();
    let program = ProgramBuilder::new()
        .static_balances(&[(a, 1_000), (b, 1_000)])
        .unwrap()
        .flat_fee_amount_in(fee_bps)
        .constant_product_swap(None)
        .build();
    Order::new(maker(), program)
}

#[test]
fn test_full_fee_rejected_at_registration() {
    let engine = Engine::new();
    let err = engine
        .register_order(&fee_program(BPS_DENOMINATOR as u16))
        .unwrap_err();
    // after a two-entry balances instruction
    assert_eq!(err.pc(), Some(2 + 1 + 2 * 36));
    assert_eq!(
        err.root_cause(),
        &VmError::Curve(CurveError::InvalidFee {
            fee_bps: BPS_DENOMINATOR,
            denominator: BPS_DENOMINATOR
        })
    );
}

#[test]
fn test_full_fee_rejected_in_exact_out_walk() {
    let (a, b, taker) = tokens();
    let engine = Engine::new();
    let result = engine.quote(
        &fee_program(BPS_DENOMINATOR as u16),
        &SwapRequest::exact_out(taker, a, b, 90),
    );
    assert!(matches!(
        result,
        Err(VmError::Curve(CurveError::InvalidFee { .. }))
    ));
}

#[test]
fn test_highest_fee_gives_finite_input() {
    let (a, b, taker) = tokens();
    let engine = Engine::new();
    let order = fee_program(BPS_DENOMINATOR as u16 - 1);
    engine.register_order(&order).unwrap();

    // the curve asks ceil(90 * 1000 / 910) = 99, grossed up by 10_000 / 1
    let quote = engine
        .quote(&order, &SwapRequest::exact_out(taker, a, b, 90))
        .unwrap();
    assert_eq!(quote.amount_out, 90);
    assert_eq!(quote.amount_in, 990_000);
}

#[test]
fn test_output_fee_in_both_directions() {
    let (a, b, taker) = tokens();
    let program = ProgramBuilder::new()
        .static_balances(&[(a, 1_000), (b, 1_000)])
        .unwrap()
        .flat_fee_amount_out(100)
        .constant_product_swap(None)
        .build();
    let order = Order::new(maker(), program);
    let engine = Engine::new();

    // 90 from the curve, 1% fee rounded up
    let exact_in = engine
        .quote(&order, &SwapRequest::exact_in(taker, a, b, 100))
        .unwrap();
    assert_eq!((exact_in.amount_in, exact_in.amount_out), (100, 89));

    // the curve must produce ceil(89 / 0.99) = 90, costing ceil(90 * 1000 / 910)
    let exact_out = engine
        .quote(&order, &SwapRequest::exact_out(taker, a, b, 89))
        .unwrap();
    assert_eq!((exact_out.amount_in, exact_out.amount_out), (99, 89));
}

#[test]
fn test_provider_fee_checked_at_execution() {
    let (a, b, taker) = tokens();
    let provider = Address::from_low_byte(0xFE);
    let fees = Arc::new(StaticFeeProvider::new());
    let engine = Engine::builder().fee_provider(fees.clone()).build();
    let program = ProgramBuilder::new()
        .static_balances(&[(a, 1_000), (b, 1_000)])
        .unwrap()
        .dynamic_fee_amount_in(&provider)
        .constant_product_swap(None)
        .build();
    let order = Order::new(maker(), program);
    let request = SwapRequest::exact_in(taker, a, b, 100);

    // registration cannot know the provider's answer
    engine.register_order(&order).unwrap();
    assert!(matches!(
        engine.quote(&order, &request),
        Err(VmError::ExternalCall { target, .. }) if target == provider
    ));

    fees.set_fee(provider, BPS_DENOMINATOR);
    assert!(matches!(
        engine.quote(&order, &request),
        Err(VmError::Curve(CurveError::InvalidFee { .. }))
    ));

    fees.set_fee(provider, 1_000);
    let quote = engine.quote(&order, &request).unwrap();
    // 10% of 100 leaves 90 for the curve: floor(90 * 1000 / 1090)
    assert_eq!((quote.amount_in, quote.amount_out), (100, 82));
}

#[test]
fn test_fee_placement_decides_tracked_credit() {
    let (a, b, taker) = tokens();
    let engine = Engine::new();
    let request = SwapRequest::exact_in(taker, a, b, 100);

    // the fee restores the gross input only after the inner balances credited
    let fee_outside = Order::new(
        maker(),
        ProgramBuilder::new()
            .flat_fee_amount_in(100)
            .dynamic_balances(&[(a, 1_000), (b, 1_000)])
            .unwrap()
            .constant_product_swap(None)
            .build(),
    );
    let quote = engine.swap(&fee_outside, &request).unwrap();
    assert_eq!((quote.amount_in, quote.amount_out), (100, 90));
    assert_eq!(engine.tracked_balance(&fee_outside.hash(), &a).unwrap(), 1_099);

    let fee_inside = Order::new(
        maker(),
        ProgramBuilder::new()
            .dynamic_balances(&[(a, 1_000), (b, 1_000)])
            .unwrap()
            .flat_fee_amount_in(100)
            .constant_product_swap(None)
            .build(),
    );
    let quote = engine.swap(&fee_inside, &request).unwrap();
    assert_eq!((quote.amount_in, quote.amount_out), (100, 90));
    assert_eq!(engine.tracked_balance(&fee_inside.hash(), &a).unwrap(), 1_100);
}

// ---------------------------------------------------------------------------
// Concentration
// ---------------------------------------------------------------------------

fn concentrated(initial_liquidity: u128) -> Order {
    let (a, b, _) = tokens();
    let program = ProgramBuilder::new()
        .dynamic_balances(&[(a, 1_000), (b, 1_000)])
        .unwrap()
        .concentrate(500, 500, initial_liquidity)
        .constant_product_swap(None)
        .build();
    Order::new(maker(), program)
}

#[test]
fn test_zero_initial_liquidity_rejected_at_registration() {
    let err = Engine::new().register_order(&concentrated(0)).unwrap_err();
    assert_eq!(err.root_cause(), &VmError::ZeroInitialLiquidity);
}

#[test]
fn test_second_trade_uses_persisted_scale() {
    let (a, b, taker) = tokens();
    let engine = Engine::new();
    let order = concentrated(1_000);
    let hash = engine.register_order(&order).unwrap();

    // virtual 1500/1500: floor(100 * 1500 / 1600)
    let first = engine
        .swap(&order, &SwapRequest::exact_in(taker, a, b, 100))
        .unwrap();
    assert_eq!(first.amount_out, 93);
    // sqrt(1600 * 1407)
    assert_eq!(engine.liquidity_scale(&hash).unwrap(), 1_500);
    assert_eq!(engine.tracked_balance(&hash, &a).unwrap(), 1_100);
    assert_eq!(engine.tracked_balance(&hash, &b).unwrap(), 907);

    // deltas scale by 1500 / 1000: virtual 1100 + 750 and 907 + 750
    let second = engine
        .swap(&order, &SwapRequest::exact_in(taker, b, a, 100))
        .unwrap();
    assert_eq!(second.amount_out, 1_850 * 100 / 1_757);
    assert!(engine.liquidity_scale(&hash).unwrap() > 0);
}

#[test]
fn test_repeated_trades_never_divide_by_zero() {
    let (a, b, taker) = tokens();
    let engine = Engine::new();
    let program = ProgramBuilder::new()
        .static_balances(&[(a, 1_000), (b, 1_000)])
        .unwrap()
        .concentrate(0, 0, 1)
        .constant_product_swap(None)
        .build();
    let order = Order::new(maker(), program);
    for _ in 0..3 {
        engine
            .swap(&order, &SwapRequest::exact_in(taker, a, b, 10))
            .unwrap();
    }
    assert!(engine.liquidity_scale(&order.hash()).unwrap() > 0);
}

// ---------------------------------------------------------------------------
// Decay
// ---------------------------------------------------------------------------

#[test]
fn test_zero_decay_period_rejected_at_registration() {
    let (a, b, _) = tokens();
    let program = ProgramBuilder::new()
        .static_balances(&[(a, 1_000), (b, 1_000)])
        .unwrap()
        .decay(0)
        .constant_product_swap(None)
        .build();
    let err = Engine::new()
        .register_order(&Order::new(maker(), program))
        .unwrap_err();
    assert_eq!(err.root_cause(), &VmError::ZeroDecayPeriod);
}

#[test]
fn test_reverse_trade_sees_pre_trade_balances() {
    let (a, b, taker) = tokens();
    let clock = Arc::new(ManualClock::new(NOW));
    let engine = Engine::builder().clock(clock.clone()).build();
    let program = ProgramBuilder::new()
        .dynamic_balances(&[(a, 1_000), (b, 1_000)])
        .unwrap()
        .decay(60)
        .constant_product_swap(None)
        .build();
    let order = Order::new(maker(), program);
    let hash = order.hash();

    let forward = engine
        .swap(&order, &SwapRequest::exact_in(taker, a, b, 100))
        .unwrap();
    assert_eq!(forward.amount_out, 90);
    assert_eq!(engine.decay_offset(&hash, &a, Direction::In).unwrap(), 100);
    assert_eq!(engine.decay_offset(&hash, &b, Direction::Out).unwrap(), 90);

    // offsets undo the first trade: 1000/1000 again
    let reverse = SwapRequest::exact_in(taker, b, a, 100);
    assert_eq!(engine.quote(&order, &reverse).unwrap().amount_out, 90);

    // half-way through the period half of each offset remains
    clock.advance(30);
    assert_eq!(engine.decay_offset(&hash, &a, Direction::In).unwrap(), 50);

    // once expired the tracked balances 910 / 1100 apply
    clock.advance(30);
    assert_eq!(engine.decay_offset(&hash, &a, Direction::In).unwrap(), 0);
    assert_eq!(
        engine.quote(&order, &reverse).unwrap().amount_out,
        100 * 1_100 / 1_010
    );
}

#[test]
fn test_offset_larger_than_balance_clamps_to_zero() {
    let (a, b, taker) = tokens();
    let engine = Engine::builder()
        .clock(Arc::new(ManualClock::new(NOW)))
        .build();
    let program = ProgramBuilder::new()
        .static_balances(&[(a, 1_000), (b, 50)])
        .unwrap()
        .decay(600)
        .constant_product_swap(None)
        .build();
    let order = Order::new(maker(), program);

    let first = engine
        .swap(&order, &SwapRequest::exact_in(taker, a, b, 1_000))
        .unwrap();
    assert_eq!(first.amount_out, 25);

    // received offset on A (1000) swallows A's static balance (1000)
    let reverse = engine
        .quote(&order, &SwapRequest::exact_in(taker, b, a, 10))
        .unwrap();
    assert_eq!(reverse.amount_out, 0);
}

proptest! {
    #[test]
    fn prop_clamp_never_underflows(balance in any::<u128>(), excess in 1u128..=u128::MAX) {
        let offset = balance.saturating_add(excess);
        prop_assert_eq!(clamp_balance(balance, offset), 0);
        prop_assert_eq!(clamp_balance(balance, balance), 0);
        prop_assert!(clamp_balance(balance, balance / 2) <= balance);
    }
}
