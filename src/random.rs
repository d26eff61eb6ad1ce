//! `Random` seam (section 1): problem selection needs pluggable randomness
//! so tests can pin the outcome. Job ids deliberately bypass this and use
//! `uuid::Uuid::new_v4()` directly (section 1 rationale).

pub trait Random: Send + Sync {
    /// Returns a value in `0..bound`. Panics if `bound == 0`, mirroring `fastrand::usize`.
    fn below(&self, bound: usize) -> usize;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FastrandRandom;

impl Random for FastrandRandom {
    fn below(&self, bound: usize) -> usize {
        fastrand::usize(0..bound)
    }
}

/// Deterministic double for tests: always returns a fixed index (clamped to bound).
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub usize);

impl Random for FixedRandom {
    fn below(&self, bound: usize) -> usize {
        if bound == 0 {
            0
        } else {
            self.0 % bound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_random_wraps_within_bound() {
        let r = FixedRandom(5);
        assert_eq!(r.below(3), 2);
        assert_eq!(r.below(10), 5);
    }
}
