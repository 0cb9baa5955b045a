//! Stress tests - push the engine to its limits.
//!
//! Correctness under extreme conditions: near-capacity operation, heavy
//! contention at single ticks, rapid order churn, and the edges of the
//! price and quantity domains.

use tick_match::{Engine, EngineConfig, LimitOrder, OrderError, Side, TradeLog};

type TestEngine = Engine<TradeLog>;

fn engine_with_capacity(capacity: u32) -> TestEngine {
    Engine::new(EngineConfig::new(capacity), TradeLog::new())
}

fn place(engine: &mut TestEngine, id: u64, side: Side, price: u32, qty: u32) {
    engine
        .process_new_order(LimitOrder::new(id, side, price, qty))
        .expect("order accepted");
}

// ============================================================================
// Capacity Stress Tests
// ============================================================================

#[test]
fn test_near_capacity_operation() {
    const CAPACITY: u32 = 10_000;
    let mut engine = engine_with_capacity(CAPACITY);

    // Fill to 95% capacity with non-crossing orders:
    // bids in 800..900, asks in 3000..3100.
    let target = (CAPACITY as f64 * 0.95) as u64;

    for i in 0..target {
        let (side, price) = if i % 2 == 0 {
            (Side::Bid, 800 + (i % 100) as u32)
        } else {
            (Side::Ask, 3000 + (i % 100) as u32)
        };
        place(&mut engine, i, side, price, 100);
    }

    assert_eq!(engine.resting_orders() as u64, target);
    assert_eq!(engine.trades_executed(), 0);
}

#[test]
fn test_arena_full_rejection_and_reuse() {
    const CAPACITY: u32 = 100;
    let mut engine = engine_with_capacity(CAPACITY);

    for i in 0..CAPACITY as u64 {
        place(&mut engine, i, Side::Bid, 900 + i as u32, 100);
    }

    // The inbound needs a slot for the duration of the call, so a full
    // arena rejects every order, crossing or not.
    let err = engine
        .process_new_order(LimitOrder::new(1000, Side::Ask, 900, 100))
        .unwrap_err();
    assert_eq!(err, OrderError::ArenaExhausted);
    assert_eq!(engine.resting_orders(), CAPACITY);
}

#[test]
fn test_full_fill_frees_both_slots() {
    const CAPACITY: u32 = 100;
    let mut engine = engine_with_capacity(CAPACITY);

    // One slot left free so a crossing order can enter.
    for i in 0..(CAPACITY - 1) as u64 {
        place(&mut engine, i, Side::Bid, 900 + i as u32, 100);
    }

    // Sweeps the best bid (998) exactly; the maker's slot is freed and
    // the taker never rests.
    place(&mut engine, 1001, Side::Ask, 900, 100);
    assert_eq!(engine.trades_executed(), 1);
    assert_eq!(engine.resting_orders(), CAPACITY - 2);

    place(&mut engine, 1002, Side::Bid, 850, 100);
    place(&mut engine, 1003, Side::Bid, 851, 100);
    assert_eq!(engine.resting_orders(), CAPACITY);

    let err = engine
        .process_new_order(LimitOrder::new(1004, Side::Bid, 852, 100))
        .unwrap_err();
    assert_eq!(err, OrderError::ArenaExhausted);
}

// ============================================================================
// High Contention Tests
// ============================================================================

#[test]
fn test_single_tick_contention() {
    const ORDERS: u64 = 1_000;
    let mut engine = engine_with_capacity(10_000);

    for i in 0..ORDERS {
        place(&mut engine, i, Side::Ask, 2000, 100);
    }
    assert_eq!(engine.depth_at(Side::Ask, 2000), (100 * ORDERS, ORDERS as u32));

    // One sweep clears the whole level.
    place(&mut engine, ORDERS, Side::Bid, 2000, (ORDERS * 100) as u32);

    assert_eq!(engine.trades_executed(), ORDERS);
    assert_eq!(engine.resting_orders(), 0);
    assert_eq!(engine.best_ask(), None);
    assert_eq!(engine.depth_at(Side::Ask, 2000), (0, 0));
}

#[test]
fn test_fifo_priority_under_contention() {
    let mut engine = engine_with_capacity(1_000);

    for i in 0..100u64 {
        place(&mut engine, i, Side::Ask, 2000, 10);
    }

    // Take out exactly half the queue.
    place(&mut engine, 1000, Side::Bid, 2000, 500);

    let makers: Vec<u64> = engine
        .sink()
        .trades()
        .iter()
        .map(|t| t.maker_order_id)
        .collect();

    assert_eq!(makers.len(), 50);
    for (i, &maker) in makers.iter().enumerate() {
        assert_eq!(maker, i as u64, "fill {} out of arrival order", i);
    }
    assert_eq!(engine.depth_at(Side::Ask, 2000), (500, 50));
}

#[test]
fn test_handle_stability_across_unrelated_flow() {
    let mut engine = engine_with_capacity(10_000);

    // Three resting asks whose queue position must survive churn elsewhere.
    for i in 0..3u64 {
        place(&mut engine, i, Side::Ask, 2000, 10);
    }

    // Heavy unrelated traffic: matched pairs at a distant tick, far
    // enough below the watched asks that nothing crosses them.
    for i in 0..1_000u64 {
        place(&mut engine, 10_000 + i * 2, Side::Bid, 1000, 5);
        place(&mut engine, 10_001 + i * 2, Side::Ask, 1000, 5);
    }

    engine.sink_mut().drain();
    place(&mut engine, 99_999, Side::Bid, 2000, 30);

    let makers: Vec<u64> = engine
        .sink()
        .trades()
        .iter()
        .map(|t| t.maker_order_id)
        .collect();
    assert_eq!(makers, vec![0, 1, 2]);
}

// ============================================================================
// Rapid Churn Tests
// ============================================================================

#[test]
fn test_rapid_match_cycles() {
    const CYCLES: u64 = 10_000;
    let mut engine = engine_with_capacity(100);

    for cycle in 0..CYCLES {
        place(&mut engine, cycle * 2, Side::Ask, 2000, 100);
        place(&mut engine, cycle * 2 + 1, Side::Bid, 2000, 100);
    }

    assert_eq!(engine.trades_executed(), CYCLES);
    assert_eq!(engine.resting_orders(), 0);
    assert_eq!(engine.best_bid(), None);
    assert_eq!(engine.best_ask(), None);
}

#[test]
fn test_alternating_sweep_cycles() {
    const CYCLES: u64 = 1_000;
    let mut engine = engine_with_capacity(1_000);

    for cycle in 0..CYCLES {
        let base = cycle * 8;
        // Ladder of three asks, swept by one bid, then the mirror image.
        place(&mut engine, base, Side::Ask, 2000, 10);
        place(&mut engine, base + 1, Side::Ask, 2001, 10);
        place(&mut engine, base + 2, Side::Ask, 2002, 10);
        place(&mut engine, base + 3, Side::Bid, 2002, 30);

        place(&mut engine, base + 4, Side::Bid, 1998, 10);
        place(&mut engine, base + 5, Side::Bid, 1997, 10);
        place(&mut engine, base + 6, Side::Bid, 1996, 10);
        place(&mut engine, base + 7, Side::Ask, 1996, 30);
    }

    assert_eq!(engine.trades_executed(), CYCLES * 6);
    assert_eq!(engine.resting_orders(), 0);
}

// ============================================================================
// Edge Case Tests
// ============================================================================

#[test]
fn test_tick_zero() {
    let mut engine = engine_with_capacity(1_000);

    place(&mut engine, 1, Side::Bid, 0, 100);
    assert_eq!(engine.best_bid(), Some(0));

    place(&mut engine, 2, Side::Ask, 0, 100);
    assert_eq!(engine.trades_executed(), 1);
    assert_eq!(engine.best_bid(), None);
}

#[test]
fn test_top_of_tick_domain() {
    let mut engine = engine_with_capacity(1_000);

    place(&mut engine, 1, Side::Ask, 4095, 100);
    assert_eq!(engine.best_ask(), Some(4095));

    place(&mut engine, 2, Side::Bid, 4095, 100);
    assert_eq!(engine.trades_executed(), 1);
    assert_eq!(engine.best_ask(), None);

    assert_eq!(
        engine
            .process_new_order(LimitOrder::new(3, Side::Ask, 4096, 1))
            .unwrap_err(),
        OrderError::PriceOutOfRange(4096)
    );
}

#[test]
fn test_max_quantity_orders() {
    let mut engine = engine_with_capacity(10);

    place(&mut engine, 1, Side::Ask, 2000, u32::MAX);
    assert_eq!(engine.depth_at(Side::Ask, 2000), (u32::MAX as u64, 1));

    place(&mut engine, 2, Side::Bid, 2000, u32::MAX);
    assert_eq!(engine.trades_executed(), 1);
    assert_eq!(engine.sink().trades()[0].qty, u32::MAX);
    assert_eq!(engine.resting_orders(), 0);
}

#[test]
fn test_level_total_exceeding_u32() {
    let mut engine = engine_with_capacity(10);

    // Two max-quantity orders at one tick overflow a 32-bit total.
    place(&mut engine, 1, Side::Ask, 2000, u32::MAX);
    place(&mut engine, 2, Side::Ask, 2000, u32::MAX);

    assert_eq!(
        engine.depth_at(Side::Ask, 2000),
        (2 * u32::MAX as u64, 2)
    );
}

#[test]
fn test_book_never_crossed() {
    let mut engine = engine_with_capacity(10_000);

    // Deterministic pseudo-random interleaving around one band.
    let mut x = 0x9E3779B9u64;
    for i in 0..20_000u64 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        let side = if x & 1 == 0 { Side::Bid } else { Side::Ask };
        let price = 1950 + (x % 100) as u32;
        let qty = 1 + (x % 50) as u32;
        place(&mut engine, i, side, price, qty);

        if let (Some(bid), Some(ask)) = (engine.best_bid(), engine.best_ask()) {
            assert!(bid < ask, "crossed book at op {}: bid {} >= ask {}", i, bid, ask);
        }
    }
}
