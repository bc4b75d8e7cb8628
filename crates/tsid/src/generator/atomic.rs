use core::time::Duration;

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdGenStatus, IdGenerator, RandSource, SystemClock, ThreadRandom, TimeSource, Tsid,
    TsidGenerator, generator::layout::Layout,
};

/// A lock-free TSID factory.
///
/// Same layout and counter protocol as [`TsidFactory`], but the last issued
/// id is kept in a single [`AtomicU64`] and advanced with compare-and-swap. A
/// thread that loses the race gets `Pending { yield_for: 0 }` and retries
/// immediately.
///
/// Built with [`TsidFactoryBuilder::build_atomic`].
///
/// [`TsidFactory`]: crate::TsidFactory
/// [`TsidFactoryBuilder::build_atomic`]: crate::TsidFactoryBuilder::build_atomic
pub struct AtomicTsidFactory<T = SystemClock, R = ThreadRandom>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    layout: Layout,
    time: T,
    rng: R,
}

impl<T, R> AtomicTsidFactory<T, R>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    pub(crate) fn from_layout(layout: Layout, time: T, rng: R) -> Self {
        let raw = layout.initial().to_raw();
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(raw)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(raw),
            layout,
            time,
            rng,
        }
    }

    /// The node id stamped on every id.
    pub const fn node(&self) -> u32 {
        self.layout.node()
    }

    /// Width of the node field; the counter gets the remaining `22 - node_bits`.
    pub const fn node_bits(&self) -> u32 {
        self.layout.node_bits()
    }

    /// The custom epoch, as a duration since 1970-01-01 UTC.
    pub const fn epoch(&self) -> Duration {
        self.layout.epoch()
    }

    /// Attempts to generate the next id.
    ///
    /// Returns [`IdGenStatus::Pending`] when the counter is exhausted, and
    /// `Pending { yield_for: 0 }` when another thread won the CAS.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> IdGenStatus {
        let now = self.layout.elapsed(self.time.current_millis());
        let current_raw = self.state.load(Ordering::Acquire);
        let status = self
            .layout
            .advance(Tsid::from_raw(current_raw), now, || self.rng.rand());

        let IdGenStatus::Ready { id } = status else {
            return status;
        };
        if self
            .state
            .compare_exchange(current_raw, id.to_raw(), Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            status
        } else {
            IdGenStatus::Pending { yield_for: 0 }
        }
    }
}

impl<T, R> core::fmt::Debug for AtomicTsidFactory<T, R>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AtomicTsidFactory")
            .field("node", &self.node())
            .field("node_bits", &self.node_bits())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

impl<T, R> TsidGenerator for AtomicTsidFactory<T, R>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    fn try_next_id(&self) -> IdGenStatus {
        self.try_next_id()
    }
}

impl<T, R> IdGenerator for AtomicTsidFactory<T, R>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    fn generate(&self) -> u64 {
        self.create().to_raw()
    }
}
