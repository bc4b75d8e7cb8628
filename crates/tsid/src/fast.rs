//! Lock-free, node-less generation for single-process use.
//!
//! Every id is `time << 22 | counter`, where `counter` is one process-wide
//! atomic seeded once from a secure RNG. There is no node field, so two
//! processes using this path can hand out the same ids. Use it for things
//! like log correlation ids; use a [`TsidFactory`] with a pinned node id
//! where ids must not collide across processes.
//!
//! [`TsidFactory`]: crate::TsidFactory

use std::sync::LazyLock;

use portable_atomic::{AtomicU32, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    RandSource, SystemClock, ThreadRandom, TimeSource, Tsid, time::TSID_EPOCH_MILLIS,
};

static GLOBAL_FAST: LazyLock<FastGenerator> =
    LazyLock::new(|| FastGenerator::new(SystemClock, &ThreadRandom));

/// A counter-only generator.
///
/// Ids from one generator are unique as long as fewer than 2^22 are taken
/// within a single millisecond.
pub struct FastGenerator<T = SystemClock>
where
    T: TimeSource<u64>,
{
    #[cfg(feature = "cache-padded")]
    counter: crossbeam_utils::CachePadded<AtomicU32>,
    #[cfg(not(feature = "cache-padded"))]
    counter: AtomicU32,
    epoch_millis: u64,
    time: T,
}

impl FastGenerator {
    /// The process-wide generator behind [`Tsid::fast`].
    ///
    /// Initialised on first use with the system clock and a counter seed
    /// from [`ThreadRandom`]; the seed is never drawn again.
    pub fn global() -> &'static Self {
        &GLOBAL_FAST
    }
}

impl<T> FastGenerator<T>
where
    T: TimeSource<u64>,
{
    /// Creates a generator whose counter starts at one draw from `rng`.
    pub fn new(time: T, rng: &impl RandSource<u32>) -> Self {
        let seed = rng.rand();
        Self {
            #[cfg(feature = "cache-padded")]
            counter: crossbeam_utils::CachePadded::new(AtomicU32::new(seed)),
            #[cfg(not(feature = "cache-padded"))]
            counter: AtomicU32::new(seed),
            epoch_millis: TSID_EPOCH_MILLIS,
            time,
        }
    }

    /// Returns the next id. Never blocks.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Tsid {
        let elapsed = self
            .time
            .current_millis()
            .saturating_sub(self.epoch_millis)
            & Tsid::TIME_MASK;
        let counter = self.counter.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
        Tsid::from_raw((elapsed << Tsid::TIME_SHIFT) | (u64::from(counter) & Tsid::RANDOM_MASK))
    }
}

impl Tsid {
    /// Returns a new id from the process-wide [`FastGenerator`].
    ///
    /// ```
    /// use tsid::Tsid;
    ///
    /// let a = Tsid::fast();
    /// let b = Tsid::fast();
    /// assert_ne!(a, b);
    /// ```
    pub fn fast() -> Self {
        FastGenerator::global().next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZeroRandom;
    use std::collections::HashSet;
    use std::thread::scope;

    struct FixedTime(u64);

    impl TimeSource<u64> for FixedTime {
        fn current_millis(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn counter_follows_the_seed() {
        let time = TSID_EPOCH_MILLIS + 10;
        let generator = FastGenerator::new(FixedTime(time), &|| 41_u32);
        let a = generator.next_id();
        let b = generator.next_id();
        assert_eq!(a.timestamp(), 10);
        assert_eq!(a.random(), 42);
        assert_eq!(b.random(), 43);
    }

    #[test]
    fn counter_wraps_into_22_bits() {
        let generator = FastGenerator::new(FixedTime(0), &|| u32::MAX);
        assert_eq!(generator.next_id().to_raw(), 0);

        let generator = FastGenerator::new(FixedTime(0), &|| (1_u32 << 22) - 2);
        assert_eq!(generator.next_id().random(), Tsid::RANDOM_MASK);
        assert_eq!(generator.next_id().random(), 0);
    }

    #[test]
    fn unique_across_threads() {
        let generator = FastGenerator::new(SystemClock, &ZeroRandom);
        let ids: Vec<Vec<Tsid>> = scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| (0..10_000).map(|_| generator.next_id()).collect::<Vec<_>>()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let unique: HashSet<Tsid> = ids.into_iter().flatten().collect();
        assert_eq!(unique.len(), 80_000);
    }

    #[test]
    fn global_is_shared() {
        assert!(core::ptr::eq(FastGenerator::global(), FastGenerator::global()));
        let ids: HashSet<Tsid> = (0..1_000).map(|_| Tsid::fast()).collect();
        assert_eq!(ids.len(), 1_000);
        let now = SystemClock.current_millis();
        assert!(Tsid::fast().unix_millis() <= now + 1_000);
    }

    #[test]
    fn separate_generators_with_the_same_seed_collide() {
        let time = TSID_EPOCH_MILLIS + 99;
        let a = FastGenerator::new(FixedTime(time), &ZeroRandom);
        let b = FastGenerator::new(FixedTime(time), &ZeroRandom);
        assert_eq!(a.next_id(), b.next_id());
    }
}
