//! Price index - two-level bitset over the tick domain.
//!
//! One summary word tracks which of 64 data words is non-zero; each data
//! word tracks 64 ticks. Finding the lowest or highest active tick is two
//! hardware bit scans, constant time at any book depth. The index is pure
//! bookkeeping: it never inspects the queues it describes.

use crate::types::Price;

const WORD_BITS: u32 = 64;

/// Active-tick index for one side of the book.
///
/// Bit `b` of data word `w` is set iff tick `64w + b` has resting orders.
/// Summary bit `w` is set iff data word `w` is non-zero. `P` is the tick
/// domain; two levels of 64-bit words cover at most `64 * 64 = 4096`
/// ticks, enforced when the type is instantiated.
#[derive(Clone, Copy, Debug)]
pub struct PriceIndex<const P: u32> {
    summary: u64,
    words: [u64; WORD_BITS as usize],
}

impl<const P: u32> PriceIndex<P> {
    const DOMAIN_FITS: () = assert!(
        P <= WORD_BITS * WORD_BITS,
        "tick domain exceeds two-level bitset capacity (4096)"
    );

    #[inline]
    pub const fn new() -> Self {
        // Monomorphization-time check of the P bound.
        let _ = Self::DOMAIN_FITS;
        Self {
            summary: 0,
            words: [0u64; WORD_BITS as usize],
        }
    }

    /// Mark a tick active. Idempotent.
    ///
    /// # Complexity
    /// O(1) - two bitwise ORs
    #[inline]
    pub fn set(&mut self, price: Price) {
        debug_assert!(price < P, "tick outside domain");
        let word = price / WORD_BITS;
        let bit = price % WORD_BITS;

        self.words[word as usize] |= 1u64 << bit;
        self.summary |= 1u64 << word;
    }

    /// Mark a tick inactive. Idempotent on already-inactive ticks.
    ///
    /// # Complexity
    /// O(1) - bitwise AND-NOT, plus a summary update when the word empties
    #[inline]
    pub fn clear(&mut self, price: Price) {
        debug_assert!(price < P, "tick outside domain");
        let word = price / WORD_BITS;
        let bit = price % WORD_BITS;

        self.words[word as usize] &= !(1u64 << bit);
        if self.words[word as usize] == 0 {
            self.summary &= !(1u64 << word);
        }
    }

    /// Lowest active tick (the best ask), or `None` when the side is empty.
    ///
    /// Compiles to two trailing-zero counts (tzcnt on x86, rbit+clz on ARM).
    #[inline]
    pub fn lowest(&self) -> Option<Price> {
        if self.summary == 0 {
            return None;
        }
        let word = self.summary.trailing_zeros();
        let bit = self.words[word as usize].trailing_zeros();
        Some(word * WORD_BITS + bit)
    }

    /// Highest active tick (the best bid), or `None` when the side is empty.
    #[inline]
    pub fn highest(&self) -> Option<Price> {
        if self.summary == 0 {
            return None;
        }
        let word = WORD_BITS - 1 - self.summary.leading_zeros();
        let bit = WORD_BITS - 1 - self.words[word as usize].leading_zeros();
        Some(word * WORD_BITS + bit)
    }

    /// True iff the tick is currently marked active.
    #[inline]
    pub fn contains(&self, price: Price) -> bool {
        debug_assert!(price < P, "tick outside domain");
        self.words[(price / WORD_BITS) as usize] & (1u64 << (price % WORD_BITS)) != 0
    }

    /// True when no tick is active.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.summary == 0
    }
}

impl<const P: u32> Default for PriceIndex<P> {
    fn default() -> Self {
        Self::new()
    }
}
