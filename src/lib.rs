//! # Tick-Match
//!
//! A single-symbol, in-memory limit order matching engine.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: One thread owns the engine exclusively (no locks)
//! - **O(1) Top-of-Book**: Best bid/ask found with two hardware bit scans
//! - **Cache-Optimized**: 64-byte aligned order nodes, 32-bit handles
//! - **Arena Allocation**: No heap allocation in the hot path
//!
//! ## Architecture
//!
//! ```text
//! process_new_order --> [Arena] --> [Matching Loop] --> TradeSink
//!                                        |
//!                          [Book: tick ladders + bitset indices]
//! ```
//!
//! Prices are integer ticks in `[0, P)` where `P` is a const generic
//! parameter (default 4096, the most a two-level bitset index can cover).

pub mod arena;
pub mod book;
pub mod engine;
pub mod price_index;
pub mod price_level;
pub mod types;

// Re-exports for convenience
pub use arena::{Arena, OrderHandle, OrderNode};
pub use book::Book;
pub use engine::{Engine, EngineConfig};
pub use price_index::PriceIndex;
pub use price_level::PriceLevel;
pub use types::{
    FnSink, LimitOrder, NullSink, OrderError, OrderId, PlaceOutcome, Price, Qty, Side, TradeEvent,
    TradeLog, TradeSink,
};
