use core::time::Duration;
use std::sync::Arc;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdGenStatus, IdGenerator, RandSource, Result, SystemClock, ThreadRandom, TimeSource, Tsid,
    TsidFactoryBuilder, TsidGenerator, generator::layout::Layout,
};

/// A lock-based TSID factory suitable for multi-threaded environments.
///
/// The last issued id lives behind an [`Arc<Mutex<_>>`]; every call reads the
/// clock, then updates the state inside one critical section. Clones share
/// that state, so handing clones to worker threads is the same as sharing one
/// factory.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Monotonic for a single caller
/// - ✅ Unique across processes as long as every process has its own node id
///
/// Each new millisecond seeds the counter from the lower half of the counter
/// space, so at least half of it is left before rollover. The price is half
/// as many distinct seeds: two factories with the **same** node id do not
/// coordinate, and if their seeds meet in the same millisecond they hand out
/// the same ids. Share one factory between threads, or give each its own
/// node.
///
/// # Example
///
/// ```
/// use tsid::{TsidFactory, TsidGenerator};
///
/// let factory = TsidFactory::new_instance_with_node_bits(8, 200)?;
/// let a = factory.create();
/// let b = factory.create();
/// assert!(a < b);
/// assert_eq!(b.node(8), 200);
/// # Ok::<(), tsid::Error>(())
/// ```
pub struct TsidFactory<T = SystemClock, R = ThreadRandom>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    #[cfg(feature = "cache-padded")]
    pub(crate) state: Arc<crossbeam_utils::CachePadded<Mutex<Tsid>>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Arc<Mutex<Tsid>>,
    pub(crate) layout: Layout,
    pub(crate) time: T,
    pub(crate) rng: R,
}

impl TsidFactory {
    /// Starts a builder with the system clock and thread-local RNG.
    #[must_use]
    pub fn builder() -> TsidFactoryBuilder {
        TsidFactoryBuilder::new()
    }

    /// Creates a factory with `node_bits` node bits and node id `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`](crate::Error::InvalidNode) unless
    /// `node_bits <= 20` and `node < 2^node_bits`.
    pub fn new_instance_with_node_bits(node_bits: u32, node: u32) -> Result<Self> {
        Self::builder()
            .with_node_bits(node_bits)
            .with_node(node)
            .build()
    }

    /// Creates a factory with the default 10 node bits and node id `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`](crate::Error::InvalidNode) if `node`
    /// is 1024 or more.
    pub fn new_instance_with_node(node: u32) -> Result<Self> {
        Self::new_instance_with_node_bits(TsidFactoryBuilder::DEFAULT_NODE_BITS, node)
    }
}

impl<T, R> TsidFactory<T, R>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    pub(crate) fn from_layout(layout: Layout, time: T, rng: R) -> Self {
        let id = layout.initial();
        Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(id))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(id)),
            layout,
            time,
            rng,
        }
    }

    /// The node id stamped on every id.
    pub const fn node(&self) -> u32 {
        self.layout.node()
    }

    /// Width of the node field.
    pub const fn node_bits(&self) -> u32 {
        self.layout.node_bits()
    }

    /// Custom epoch, as a duration since 1970-01-01 UTC.
    pub const fn epoch(&self) -> Duration {
        self.layout.epoch()
    }

    /// Attempts to generate the next id.
    ///
    /// Returns [`IdGenStatus::Pending`] when the counter of the current
    /// millisecond is exhausted.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> IdGenStatus {
        let now = self.layout.elapsed(self.time.current_millis());
        let mut last = self.state.lock();
        let status = self.layout.advance(*last, now, || self.rng.rand());
        if let IdGenStatus::Ready { id } = status {
            *last = id;
        }
        status
    }
}

impl<T, R> Clone for TsidFactory<T, R>
where
    T: TimeSource<u64> + Clone,
    R: RandSource<u32> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            layout: self.layout,
            time: self.time.clone(),
            rng: self.rng.clone(),
        }
    }
}

impl<T, R> core::fmt::Debug for TsidFactory<T, R>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TsidFactory")
            .field("node", &self.node())
            .field("node_bits", &self.node_bits())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

impl<T, R> TsidGenerator for TsidFactory<T, R>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    fn try_next_id(&self) -> IdGenStatus {
        self.try_next_id()
    }
}

impl<T, R> IdGenerator for TsidFactory<T, R>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    fn generate(&self) -> u64 {
        self.create().to_raw()
    }
}
