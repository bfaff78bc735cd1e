//! Deterministic Xorshift64 PRNG used for every one-time randomized draw.
//!
//! Agent parameters, school species, particle attributes and pebble scatter
//! are all drawn from this generator at construction time, so a fixed
//! `AquariumConfig::seed` reproduces the whole tank bit for bit.

use crate::config::Range;
use std::f64::consts::TAU;

/// Xorshift64 PRNG with shifts (13, 7, 17).
///
/// A seed of 0 is a fixed point of the algorithm and is replaced by a
/// non-zero fallback.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_F15B_B0B_CAFE;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Derives an independent generator for a named sub-stream.
    ///
    /// Mixing the label into the state keeps the bubble draws from shifting
    /// when, say, the fish count changes.
    pub fn fork(&self, label: &str) -> Self {
        let mixed = label
            .bytes()
            .fold(self.state ^ 0x9E37_79B9_7F4A_7C15, |acc, b| {
                (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01B3)
            });
        Self::new(mixed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in `[range.min, range.max)`.
    pub fn next_in(&mut self, range: Range) -> f64 {
        range.min + self.next_f64() * (range.max - range.min)
    }

    /// Uniform f64 in `[-extent / 2, extent / 2)`.
    pub fn next_centered(&mut self, extent: f64) -> f64 {
        (self.next_f64() - 0.5) * extent
    }

    /// Uniform angle in [0, 2π).
    pub fn next_angle(&mut self) -> f64 {
        self.next_f64() * TAU
    }

    /// Picks one element uniformly, or `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.next_u64() % items.len() as u64) as usize;
        items.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        // If this breaks, every seeded tank layout changes.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_stick_at_zero() {
        let mut rng = Xorshift64::new(0);
        assert!((0..3).all(|_| rng.next_u64() != 0));
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Xorshift64::new(7);
        let mut b = Xorshift64::new(7);
        for i in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64(), "diverged at {i}");
        }
    }

    #[test]
    fn fork_is_deterministic_and_label_dependent() {
        let root = Xorshift64::new(99);
        let mut a = root.fork("bubbles");
        let mut b = root.fork("bubbles");
        let mut c = root.fork("seaweed");
        let va = a.next_u64();
        assert_eq!(va, b.next_u64());
        assert_ne!(va, c.next_u64());
    }

    #[test]
    fn next_centered_spans_symmetric_interval() {
        let mut rng = Xorshift64::new(3);
        for _ in 0..10_000 {
            let v = rng.next_centered(40.0);
            assert!((-20.0..20.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn next_angle_in_full_turn() {
        let mut rng = Xorshift64::new(11);
        for _ in 0..10_000 {
            let a = rng.next_angle();
            assert!((0.0..TAU).contains(&a), "angle out of range: {a}");
        }
    }

    #[test]
    fn pick_empty_is_none() {
        let mut rng = Xorshift64::new(5);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
    }

    #[test]
    fn pick_eventually_visits_every_element() {
        let mut rng = Xorshift64::new(5);
        let items = ["koi", "betta", "blue_tang"];
        let mut seen = [false; 3];
        for _ in 0..200 {
            let chosen = rng.pick(&items).unwrap();
            let idx = items.iter().position(|i| i == chosen).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f64_in_unit_interval_for_any_seed(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_f64();
                    prop_assert!((0.0..1.0).contains(&v), "next_f64() = {v}");
                }
            }

            #[test]
            fn next_in_respects_range(
                seed: u64,
                min in -1e3_f64..1e3,
                width in 1e-3_f64..1e3,
            ) {
                let range = Range::new(min, min + width);
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_in(range);
                    prop_assert!(v >= range.min && v <= range.max, "{v} outside {range:?}");
                }
            }
        }
    }
}
