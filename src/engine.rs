//! Matching engine - the per-order state machine.
//!
//! Each inbound limit order is validated, given an arena record, matched
//! against the opposite side while its limit crosses the top of book, and
//! finally either rested at its own price or returned to the arena. Price
//! priority falls out of always draining the best opposite tick; time
//! priority falls out of always consuming the level head.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::arena::{Arena, OrderHandle};
use crate::book::Book;
use crate::types::{LimitOrder, OrderError, PlaceOutcome, Price, Side, TradeEvent, TradeSink};

/// Engine construction parameters.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Maximum number of simultaneously live orders (arena slots).
    pub capacity: u32,
}

impl EngineConfig {
    #[inline]
    pub const fn new(capacity: u32) -> Self {
        Self { capacity }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
        }
    }
}

/// Single-symbol matching engine.
///
/// `P` is the tick domain: all prices live in `[0, P)`. The trade sink `S`
/// is monomorphized in, so fill reporting inlines into the matching loop.
///
/// The engine is strictly single-threaded: every call runs to completion
/// on the caller's thread, and order-to-order sequencing is exactly the
/// call order. Shard by symbol, one engine per shard, to parallelize.
pub struct Engine<S: TradeSink, const P: u32 = 4096> {
    arena: Arena,
    book: Book<P>,
    sink: S,
    trades_executed: u64,
}

impl<S: TradeSink, const P: u32> Engine<S, P> {
    /// Create an engine with the given capacity and trade sink.
    pub fn new(config: EngineConfig, sink: S) -> Self {
        Self {
            arena: Arena::new(config.capacity),
            book: Book::new(),
            sink,
            trades_executed: 0,
        }
    }

    /// Inject a new limit order.
    ///
    /// Fills are reported to the sink in matching order before this
    /// returns; any residual quantity rests at the order's limit price.
    /// A rejected order leaves the engine untouched.
    pub fn process_new_order(&mut self, order: LimitOrder) -> Result<PlaceOutcome, OrderError> {
        if order.qty == 0 {
            return Err(OrderError::ZeroQuantity);
        }
        if order.price >= P {
            return Err(OrderError::PriceOutOfRange(order.price));
        }

        // The inbound holds an arena record for the whole call, so
        // exhaustion surfaces here, before any matching.
        let inbound = self
            .arena
            .alloc(order.order_id, order.price, order.qty, order.side)
            .ok_or(OrderError::ArenaExhausted)?;

        match order.side {
            Side::Bid => self.match_buy(inbound),
            Side::Ask => self.match_sell(inbound),
        }

        let resting_qty = self.arena.get(inbound).qty;
        if resting_qty > 0 {
            self.book.insert(&mut self.arena, order.side, order.price, inbound);
        } else {
            self.arena.free(inbound);
        }

        debug_assert!(self.book.is_uncrossed());

        Ok(PlaceOutcome {
            filled_qty: order.qty - resting_qty,
            resting_qty,
        })
    }

    /// Drain ask levels at or below the buy's limit, best (lowest) first.
    fn match_buy(&mut self, inbound: OrderHandle) {
        loop {
            let node = self.arena.get(inbound);
            if node.qty == 0 {
                break;
            }
            let limit = node.price;

            let best = match self.book.best_ask() {
                Some(ask) if ask <= limit => ask,
                _ => break, // no crossable liquidity
            };

            self.execute_at(inbound, Side::Ask, best);
        }
    }

    /// Drain bid levels at or above the sell's limit, best (highest) first.
    fn match_sell(&mut self, inbound: OrderHandle) {
        loop {
            let node = self.arena.get(inbound);
            if node.qty == 0 {
                break;
            }
            let limit = node.price;

            let best = match self.book.best_bid() {
                Some(bid) if bid >= limit => bid,
                _ => break,
            };

            self.execute_at(inbound, Side::Bid, best);
        }
    }

    /// Fill the inbound against the head order of one opposite level.
    ///
    /// Trades print at the maker's resting tick. A fully filled maker is
    /// popped and its record freed; a partial fill leaves it at the head
    /// with its time priority intact.
    fn execute_at(&mut self, inbound: OrderHandle, book_side: Side, price: Price) {
        let maker = self.book.level(book_side, price).peek_head();
        debug_assert!(maker.is_some(), "active tick with an empty queue");

        let taker_node = self.arena.get(inbound);
        let taker_id = taker_node.order_id;
        let taker_qty = taker_node.qty;

        let maker_node = self.arena.get(maker);
        let maker_id = maker_node.order_id;
        let maker_qty = maker_node.qty;

        let fill = taker_qty.min(maker_qty);

        self.sink.on_trade(TradeEvent {
            taker_order_id: taker_id,
            maker_order_id: maker_id,
            price,
            qty: fill,
        });
        self.trades_executed += 1;

        self.arena.get_mut(inbound).qty = taker_qty - fill;
        self.arena.get_mut(maker).qty = maker_qty - fill;

        if maker_qty == fill {
            let popped = self.book.pop_front(&mut self.arena, book_side, price);
            debug_assert_eq!(popped, Some(maker));
            self.arena.free(maker);
        } else {
            self.book.level_mut(book_side, price).subtract_qty(fill);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Cumulative number of fills since construction.
    #[inline]
    pub fn trades_executed(&self) -> u64 {
        self.trades_executed
    }

    /// Highest active bid tick.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid()
    }

    /// Lowest active ask tick.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask()
    }

    /// Spread in ticks.
    #[inline]
    pub fn spread(&self) -> Option<Price> {
        self.book.spread()
    }

    /// Resting quantity and order count at one tick.
    #[inline]
    pub fn depth_at(&self, side: Side, price: Price) -> (u64, u32) {
        self.book.depth_at(side, price)
    }

    /// Number of orders currently resting in the book.
    #[inline]
    pub fn resting_orders(&self) -> u32 {
        self.arena.allocated()
    }

    /// Borrow the trade sink.
    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Borrow the trade sink mutably.
    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// True when the index agrees with the queue at this tick. Test hook.
    pub fn index_consistent_at(&self, side: Side, price: Price) -> bool {
        self.book.index_consistent_at(side, price)
    }

    // ========================================================================
    // Operational
    // ========================================================================

    /// Pre-fault the arena's pages before the first order arrives.
    pub fn warm_up(&mut self) {
        self.arena.warm_up();
    }

    /// Pin the current thread to the last available CPU core.
    ///
    /// The last core is typically the quietest; drivers call this before
    /// a latency run.
    pub fn pin_to_core(&self) {
        if let Some(core_ids) = core_affinity::get_core_ids() {
            if let Some(last_core) = core_ids.last() {
                core_affinity::set_for_current(*last_core);
            }
        }
    }

    /// Fingerprint of the observable book state, for determinism checks.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.book.best_bid().hash(&mut hasher);
        self.book.best_ask().hash(&mut hasher);
        self.arena.allocated().hash(&mut hasher);
        self.trades_executed.hash(&mut hasher);

        hasher.finish()
    }
}
