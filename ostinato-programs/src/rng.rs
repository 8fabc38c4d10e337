//! Seedable pseudo-random source
//!
//! xorshift64*: fast, small state, identical output on every target. Not
//! suitable for anything security related.

use ostinato_core::traits::KnobValue;

/// Probability on a fixed-point scale, `ONE` = 65536
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Probability(u32);

impl Probability {
    /// Never
    pub const ZERO: Self = Self(0);
    /// Always
    pub const ONE: Self = Self(1 << 16);

    /// Create from the fixed-point value, `None` above `ONE`
    pub const fn new(raw: u32) -> Option<Self> {
        if raw <= Self::ONE.0 {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Create from a ratio, clamped to `ONE`
    pub fn from_ratio(numerator: u32, denominator: u32) -> Self {
        if denominator == 0 {
            return Self::ZERO;
        }
        let raw = ((numerator as u64) << 16) / denominator as u64;
        Self(raw.min(Self::ONE.0 as u64) as u32)
    }

    /// Map a knob position onto `ZERO..=ONE`
    ///
    /// Fully counter-clockwise is `ZERO`, fully clockwise is `ONE`.
    pub fn from_knob(knob: KnobValue) -> Self {
        let raw = knob.raw() as u32;
        Self((raw * Self::ONE.0 + u16::MAX as u32 / 2) / u16::MAX as u32)
    }

    /// Fixed-point value
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Deterministic RNG with a single 64-bit state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG. A zero seed is remapped to a non-zero constant to
    /// avoid the xorshift lockup state.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    /// Fold extra entropy (e.g. the start time) into the state
    pub fn mix(&mut self, entropy: u64) {
        *self = Self::new(self.state ^ entropy.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.next_u64();
    }

    /// Next 64-bit value
    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Next 32-bit value (high bits of the 64-bit output)
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Next 16-bit value, e.g. a full-scale CV
    pub fn next_u16(&mut self) -> u16 {
        (self.next_u64() >> 48) as u16
    }

    /// Fair coin
    pub fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// Generate a value in `[lo, hi_exclusive)`
    pub fn gen_range(&mut self, lo: u32, hi_exclusive: u32) -> u32 {
        debug_assert!(lo < hi_exclusive);
        let span = hi_exclusive.saturating_sub(lo).max(1) as u64;
        (lo as u64 + (self.next_u64() % span)) as u32
    }

    /// Return `true` with probability `p`
    pub fn chance(&mut self, p: Probability) -> bool {
        (self.next_u32() >> 16) < p.raw()
    }

    /// Pick a random element
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.gen_range(0, items.len() as u32) as usize)
    }
}
