//! End-to-end pricing through each swap instruction

use swapvm::{Engine, Order, SwapRequest, VmError};
use swapvm_amm::Shape;
use swapvm_codec::{Address, DensitySwapArgs, ProgramBuilder};
use swapvm_math::ONE;

fn tokens() -> (Address, Address, Address) {
    (
        Address::from_low_byte(0xA),
        Address::from_low_byte(0xB),
        Address::from_low_byte(0x7),
    )
}

fn power_order(alpha: Option<u64>) -> Order {
    let (a, b, _) = tokens();
    let program = ProgramBuilder::new()
        .static_balances(&[(a, 1_000 * ONE), (b, 1_000 * ONE)])
        .unwrap()
        .constant_product_swap(alpha)
        .build();
    Order::new(Address::from_low_byte(1), program)
}

#[test]
fn test_alpha_scenario() {
    let (a, b, taker) = tokens();
    let engine = Engine::new();
    let request = SwapRequest::exact_in(taker, a, b, 100 * ONE);

    let no_fee = engine.quote(&power_order(None), &request).unwrap();
    assert_eq!(no_fee.amount_out, 90_909_090_909_090_909_090);

    let alphas = [
        999_000_000_000_000_000u64,
        997_000_000_000_000_000,
        990_000_000_000_000_000,
        950_000_000_000_000_000,
        900_000_000_000_000_000,
        500_000_000_000_000_000,
    ];
    let mut previous = no_fee.amount_out;
    for alpha in alphas {
        let quote = engine.quote(&power_order(Some(alpha)), &request).unwrap();
        assert!(quote.amount_out > 0, "alpha {alpha}");
        assert!(quote.amount_out < 100 * ONE, "alpha {alpha}");
        // alpha below one keeps part of the input as fee, so less comes out
        assert!(quote.amount_out < previous, "alpha {alpha}");
        previous = quote.amount_out;
    }

    let quote = engine
        .quote(&power_order(Some(997_000_000_000_000_000)), &request)
        .unwrap();
    assert!(quote.amount_out.abs_diff(90_649 * ONE / 1_000) < ONE / 1_000);
}

#[test]
fn test_exact_out_round_trip() {
    let (a, b, taker) = tokens();
    let engine = Engine::new();
    let order = power_order(Some(997_000_000_000_000_000));

    let wanted = 50 * ONE;
    let exact_out = engine
        .quote(&order, &SwapRequest::exact_out(taker, a, b, wanted))
        .unwrap();
    assert_eq!(exact_out.amount_out, wanted);

    let back = engine
        .quote(
            &order,
            &SwapRequest::exact_in(taker, a, b, exact_out.amount_in),
        )
        .unwrap();
    assert!(back.amount_out >= wanted);
}

#[test]
fn test_output_must_stay_below_balance() {
    let (a, b, taker) = tokens();
    let result = Engine::new().quote(
        &power_order(None),
        &SwapRequest::exact_out(taker, a, b, 1_000 * ONE),
    );
    assert!(matches!(result, Err(VmError::Curve(_))));
}

#[test]
fn test_limit_swap_direction() {
    let (a, b, taker) = tokens();
    let program = ProgramBuilder::new()
        .static_balances(&[(a, 1_000), (b, 1_000)])
        .unwrap()
        .limit_swap(2 * ONE)
        .build();
    let order = Order::new(Address::from_low_byte(1), program);
    let engine = Engine::new();

    // A is the lower address and is worth 2 B
    let sell_a = engine
        .quote(&order, &SwapRequest::exact_in(taker, a, b, 100))
        .unwrap();
    assert_eq!(sell_a.amount_out, 200);

    let sell_b = engine
        .quote(&order, &SwapRequest::exact_in(taker, b, a, 100))
        .unwrap();
    assert_eq!(sell_b.amount_out, 50);

    let buy_b = engine
        .quote(&order, &SwapRequest::exact_out(taker, a, b, 201))
        .unwrap();
    assert_eq!(buy_b.amount_in, 101);

    assert!(engine
        .quote(&order, &SwapRequest::exact_in(taker, a, b, 501))
        .is_err());
}

#[test]
fn test_density_constant_price() {
    let (a, b, taker) = tokens();
    let params = DensitySwapArgs {
        base_price: 2 * ONE,
        amplitude: 0,
        capacity: 1_000 * ONE,
        spread_bps: 0,
        shape: Shape::CONSTANT,
        shape_param: 0,
    };
    let program = ProgramBuilder::new()
        .static_balances(&[(a, 0), (b, 1_000 * ONE)])
        .unwrap()
        .density_swap(&params)
        .build();
    let order = Order::new(Address::from_low_byte(1), program);
    let engine = Engine::new();

    let exact_out = engine
        .quote(&order, &SwapRequest::exact_out(taker, a, b, 10 * ONE))
        .unwrap();
    assert_eq!(exact_out.amount_in, 20 * ONE);

    let exact_in = engine
        .quote(&order, &SwapRequest::exact_in(taker, a, b, 20 * ONE))
        .unwrap();
    assert_eq!(exact_in.amount_out, 10 * ONE);
}

#[test]
fn test_density_spread_charges_taker() {
    let (a, b, taker) = tokens();
    let mut params = DensitySwapArgs {
        base_price: ONE,
        amplitude: ONE as u64,
        capacity: 1_000 * ONE,
        spread_bps: 0,
        shape: Shape::LINEAR,
        shape_param: 0,
    };
    let engine = Engine::new();
    let quote_with = |params: &DensitySwapArgs| {
        let program = ProgramBuilder::new()
            .static_balances(&[(a, 0), (b, 1_000 * ONE)])
            .unwrap()
            .density_swap(params)
            .build();
        engine
            .quote(
                &Order::new(Address::from_low_byte(1), program),
                &SwapRequest::exact_out(taker, a, b, 100 * ONE),
            )
            .unwrap()
    };

    let plain = quote_with(&params);
    params.spread_bps = 50;
    let spread = quote_with(&params);
    // the linear premium over the first tenth averages 5%
    assert!(plain.amount_in >= 105 * ONE);
    assert!(plain.amount_in < 105 * ONE + ONE / 1_000);
    assert!(spread.amount_in > plain.amount_in);
}
