//! A small, fast, non-cryptographic PRNG used only to pick a random starting
//! offset for victim selection (see `stealing.rs`). Ported from this
//! codebase's existing xorshift generator rather than pulling in `rand` for
//! a single `next_usize` call on a hot path.

const MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;

/// Fixed base seed, folded with the worker index so each worker's stealing
/// order is independent without needing a true entropy source.
const FIXED_STATE: u64 = 0x9a70_13f4_75bb_8c23;

pub(crate) struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    /// Deterministic per-worker seed. The state must never be zero.
    pub(crate) fn seeded(worker_index: usize) -> Self {
        let folded = FIXED_STATE ^ (worker_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            state: folded | 1,
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(MULTIPLIER)
    }

    /// A value in `0..n`. `n` must be nonzero.
    pub(crate) fn next_usize(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        (self.next_u64() % n as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_in_bounds() {
        let mut rng = XorShift64Star::seeded(3);
        for _ in 0..1000 {
            assert!(rng.next_usize(7) < 7);
        }
    }

    #[test]
    fn different_workers_diverge() {
        let mut a = XorShift64Star::seeded(0);
        let mut b = XorShift64Star::seeded(1);
        let seq_a: Vec<_> = (0..16).map(|_| a.next_usize(1_000_000)).collect();
        let seq_b: Vec<_> = (0..16).map(|_| b.next_usize(1_000_000)).collect();
        assert_ne!(seq_a, seq_b);
    }
}
