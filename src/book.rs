//! Order book - dense per-tick ladders with bitset-indexed top of book.
//!
//! Each side owns an array of `P` price levels plus a two-level bitset
//! index. All index maintenance happens here: a bit is set exactly when an
//! empty level receives its first order and cleared exactly when a level
//! gives up its last one. Crossing is not the book's concern; the engine
//! drains any cross before resting.

use crate::arena::{Arena, OrderHandle};
use crate::price_index::PriceIndex;
use crate::price_level::PriceLevel;
use crate::types::{Price, Side};

/// Both sides of the book for one symbol.
pub struct Book<const P: u32> {
    /// Bid levels, indexed by tick
    bids: Box<[PriceLevel]>,
    /// Ask levels, indexed by tick
    asks: Box<[PriceLevel]>,
    /// Active bid ticks
    bid_index: PriceIndex<P>,
    /// Active ask ticks
    ask_index: PriceIndex<P>,
}

impl<const P: u32> Book<P> {
    pub fn new() -> Self {
        Self {
            bids: vec![PriceLevel::new(); P as usize].into_boxed_slice(),
            asks: vec![PriceLevel::new(); P as usize].into_boxed_slice(),
            bid_index: PriceIndex::new(),
            ask_index: PriceIndex::new(),
        }
    }

    // ========================================================================
    // Best Price Access
    // ========================================================================

    /// Highest active bid tick.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bid_index.highest()
    }

    /// Lowest active ask tick.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.ask_index.lowest()
    }

    /// Spread in ticks, when both sides have liquidity.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask > bid => Some(ask - bid),
            _ => None,
        }
    }

    /// True unless the best bid meets or crosses the best ask.
    ///
    /// Holds after every completed order by construction; checked via
    /// `debug_assert!` in the engine.
    #[inline]
    pub fn is_uncrossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid < ask,
            _ => true,
        }
    }

    // ========================================================================
    // Level Access
    // ========================================================================

    #[inline]
    pub fn level(&self, side: Side, price: Price) -> &PriceLevel {
        debug_assert!(price < P, "tick outside domain");
        match side {
            Side::Bid => &self.bids[price as usize],
            Side::Ask => &self.asks[price as usize],
        }
    }

    #[inline]
    pub fn level_mut(&mut self, side: Side, price: Price) -> &mut PriceLevel {
        debug_assert!(price < P, "tick outside domain");
        match side {
            Side::Bid => &mut self.bids[price as usize],
            Side::Ask => &mut self.asks[price as usize],
        }
    }

    /// Resting quantity and order count at one tick.
    #[inline]
    pub fn depth_at(&self, side: Side, price: Price) -> (u64, u32) {
        let level = self.level(side, price);
        (level.total_qty, level.count)
    }

    // ========================================================================
    // Order Placement / Removal
    // ========================================================================

    /// Rest an order at its limit price, activating the tick if needed.
    pub fn insert(&mut self, arena: &mut Arena, side: Side, price: Price, handle: OrderHandle) {
        debug_assert!(price < P, "tick outside domain");
        let (levels, index) = match side {
            Side::Bid => (&mut self.bids, &mut self.bid_index),
            Side::Ask => (&mut self.asks, &mut self.ask_index),
        };

        let level = &mut levels[price as usize];
        if level.is_empty() {
            index.set(price);
        }
        level.push_back(arena, handle);
    }

    /// Detach the oldest order at a tick, deactivating it when it empties.
    ///
    /// The record is NOT freed from the arena; the caller does that.
    pub fn pop_front(&mut self, arena: &mut Arena, side: Side, price: Price) -> Option<OrderHandle> {
        debug_assert!(price < P, "tick outside domain");
        let (levels, index) = match side {
            Side::Bid => (&mut self.bids, &mut self.bid_index),
            Side::Ask => (&mut self.asks, &mut self.ask_index),
        };

        let level = &mut levels[price as usize];
        let popped = level.pop_front(arena);
        if level.is_empty() {
            index.clear(price);
        }
        popped
    }

    /// True when the index agrees with the queue at this tick. Test hook.
    pub fn index_consistent_at(&self, side: Side, price: Price) -> bool {
        let index = match side {
            Side::Bid => &self.bid_index,
            Side::Ask => &self.ask_index,
        };
        index.contains(price) == !self.level(side, price).is_empty()
    }
}

impl<const P: u32> Default for Book<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const P: u32> std::fmt::Debug for Book<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Book")
            .field("ticks", &P)
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .finish()
    }
}
