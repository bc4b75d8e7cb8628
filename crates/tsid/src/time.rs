use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// Default custom epoch: Wednesday, January 1, 2020 00:00:00 UTC
pub const TSID_EPOCH: Duration = Duration::from_millis(TSID_EPOCH_MILLIS);

pub(crate) const TSID_EPOCH_MILLIS: u64 = 1_577_836_800_000;

/// Epoch of the worker/process generator: Thursday, January 1, 2015 00:00:00
/// UTC
pub const SERVICE_EPOCH: Duration = Duration::from_millis(SERVICE_EPOCH_MILLIS);

pub(crate) const SERVICE_EPOCH_MILLIS: u64 = 1_420_070_400_000;

/// A source of wall-clock or monotonic time.
///
/// The unit is **milliseconds since 1970-01-01 UTC**. Generators subtract
/// their own custom epoch, so one clock can serve generators with different
/// epochs. Tests plug in mocked sources.
///
/// # Example
///
/// ```
/// use tsid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> T;
}

impl<T, S: TimeSource<T> + ?Sized> TimeSource<T> for Arc<S> {
    fn current_millis(&self) -> T {
        (**self).current_millis()
    }
}

/// Reads `SystemTime::now()` on every call.
///
/// The wall clock can move backwards (NTP, manual changes). Generators hold
/// their last timestamp when that happens.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource<u64> for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}

#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A time source that never goes backwards.
///
/// The wall clock is sampled once at construction. After that a background
/// thread advances a shared counter from `Instant`, once per millisecond, and
/// reads only touch that counter. Clones share the ticker; the thread exits
/// after the last clone is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    unix_offset: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Anchors a new ticker at the current wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        let start = Instant::now();
        let unix_offset = SystemClock.current_millis();

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;
            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                let target = start + Duration::from_millis(tick);
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                inner_ref.current.store(now_ms, Ordering::Relaxed);
                tick = now_ms + 1;
            }
        });
        let _ = inner._handle.set(handle);

        Self { inner, unix_offset }
    }
}

impl TimeSource<u64> for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.unix_offset + self.inner.current.load(Ordering::Acquire)
    }
}
