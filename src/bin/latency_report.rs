//! Per-order latency report for the matching engine.
//!
//! Drives a deterministic, tightly-banded order flow (heavy trading
//! activity) through the engine and records per-order wall time into an
//! HDR histogram.

use hdrhistogram::Histogram;
use std::time::Instant;
use tick_match::{Engine, EngineConfig, LimitOrder, NullSink, Side};

const ITERATIONS: u64 = 1_000_000;
const WARMUP_OPS: u64 = 10_000;

// Price band matching the benchmark flow the engine is tuned for:
// 50 ticks wide, so both sides constantly cross.
const BAND_LO: u32 = 2000;
const BAND_WIDTH: u64 = 50;

fn order_for(i: u64) -> LimitOrder {
    let side = if i % 2 == 0 { Side::Bid } else { Side::Ask };
    let price = BAND_LO + ((i * 31) % BAND_WIDTH) as u32;
    let qty = 10 + ((i * 13) % 91) as u32;
    LimitOrder::new(i, side, price, qty)
}

fn main() {
    println!("Preparing latency benchmark...");

    let mut engine: Engine<NullSink> = Engine::new(EngineConfig::default(), NullSink);
    engine.pin_to_core();
    engine.warm_up();

    let mut histogram = Histogram::<u64>::new_with_bounds(1, 1_000_000, 3).unwrap();

    // Train the branch predictor before timing anything.
    println!("Warming up ({} ops)...", WARMUP_OPS);
    for i in 0..WARMUP_OPS {
        std::hint::black_box(engine.process_new_order(order_for(i)).ok());
    }

    println!("Running {} iterations...", ITERATIONS);

    let mut rejected = 0u64;
    let mut total = std::time::Duration::ZERO;

    for i in 0..ITERATIONS {
        let order = order_for(WARMUP_OPS + i);

        let start = Instant::now();
        let result = std::hint::black_box(engine.process_new_order(order));
        let elapsed = start.elapsed();

        if result.is_err() {
            rejected += 1;
        }

        histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
        total += elapsed;
    }

    println!("\n=== Latency Report (ns) ===");
    println!("Total Ops:  {}", ITERATIONS);
    println!("Trades:     {}", engine.trades_executed());
    println!("Resting:    {}", engine.resting_orders());
    println!("Rejected:   {}", rejected);
    println!("Throughput: {:.2} ops/sec", ITERATIONS as f64 / total.as_secs_f64());
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
}
