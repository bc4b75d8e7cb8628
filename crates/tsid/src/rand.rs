use ::rand::{Rng, rng};

/// A source of random values for seeding counters.
///
/// Any `Fn() -> T` closure is also a source, which makes deterministic
/// seeding in tests a one-liner:
///
/// ```
/// use tsid::RandSource;
///
/// let fixed = || 7_u32;
/// assert_eq!(fixed.rand(), 7);
/// ```
pub trait RandSource<T> {
    /// Returns a random value.
    fn rand(&self) -> T;
}

impl<T, F: Fn() -> T> RandSource<T> for F {
    fn rand(&self) -> T {
        self()
    }
}

/// A `RandSource` backed by the thread-local RNG (`rand::rng()`).
///
/// The RNG is cryptographically secure (ChaCha-based) and reseeded
/// periodically. This type does not store the RNG; each call reaches for the
/// calling thread's generator, so it is `Send + Sync` and contention-free.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource<u32> for ThreadRandom {
    fn rand(&self) -> u32 {
        rng().random()
    }
}

impl RandSource<u64> for ThreadRandom {
    fn rand(&self) -> u64 {
        rng().random()
    }
}

/// Always returns zero, so every millisecond's counter starts at 0.
#[derive(Default, Clone, Copy, Debug)]
pub struct ZeroRandom;

impl RandSource<u32> for ZeroRandom {
    fn rand(&self) -> u32 {
        0
    }
}

impl RandSource<u64> for ZeroRandom {
    fn rand(&self) -> u64 {
        0
    }
}
