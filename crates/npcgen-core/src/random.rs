//! Random number sources used during generation.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces uniformly distributed integers.
///
/// Generation only ever asks for numbers in `[start, end)`, so tests can
/// swap in a scripted source that returns fixed draws.
pub trait RandomSource {
    /// A uniform integer in `range`. `range` is never empty.
    fn next_in(&mut self, range: Range<u64>) -> u64;
}

/// Adapts any [`rand::Rng`] to [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    /// Deterministic source for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_in(&mut self, range: Range<u64>) -> u64 {
        self.0.random_range(range)
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_in(&mut self, range: Range<u64>) -> u64 {
        (**self).next_in(range)
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;
    use std::ops::Range;

    use super::RandomSource;

    /// Returns queued draws in order, then falls back to the range start.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedSource {
        draws: VecDeque<u64>,
    }

    impl ScriptedSource {
        pub(crate) fn new(draws: &[u64]) -> Self {
            Self {
                draws: draws.iter().copied().collect(),
            }
        }
    }

    impl RandomSource for ScriptedSource {
        fn next_in(&mut self, range: Range<u64>) -> u64 {
            let draw = self.draws.pop_front().unwrap_or(range.start);
            assert!(range.contains(&draw), "scripted draw {draw} outside {range:?}");
            draw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_in_range() {
        let mut source = RngSource::seeded(7);
        for _ in 0..1000 {
            let v = source.next_in(3..9);
            assert!((3..9).contains(&v));
        }
    }

    #[test]
    fn seeded_sources_agree() {
        let mut a = RngSource::seeded(99);
        let mut b = RngSource::seeded(99);
        for _ in 0..20 {
            assert_eq!(a.next_in(0..1000), b.next_in(0..1000));
        }
    }

    #[test]
    fn single_value_range() {
        let mut source = RngSource::seeded(1);
        assert_eq!(source.next_in(4..5), 4);
    }
}
