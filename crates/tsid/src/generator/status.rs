use crate::Tsid;

/// The result of one non-blocking generation attempt.
///
/// - [`IdGenStatus::Ready`]: a new id was produced.
/// - [`IdGenStatus::Pending`]: the counter space for the current millisecond
///   is used up (or the caller lost a race on a lock-free generator). Try
///   again after `yield_for` milliseconds; `0` means retry immediately.
///
/// # Example
///
/// ```
/// use tsid::{IdGenStatus, TimeSource, TsidFactory, TsidGenerator, ZeroRandom};
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_700_000_000_000
///     }
/// }
///
/// let factory = TsidFactory::builder()
///     .with_node_bits(20)
///     .with_node(0)
///     .with_time_source(FixedTime)
///     .with_random(ZeroRandom)
///     .build()?;
///
/// // 20 node bits leave a 2-bit counter: four ids per millisecond
/// for _ in 0..4 {
///     assert!(matches!(factory.try_next_id(), IdGenStatus::Ready { .. }));
/// }
/// assert_eq!(factory.try_next_id(), IdGenStatus::Pending { yield_for: 1 });
/// # Ok::<(), tsid::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique id was generated and is ready to use.
    Ready {
        /// The generated id.
        id: Tsid,
    },
    /// No id could be generated right now.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}

/// How a blocking call waits while a generator reports
/// [`IdGenStatus::Pending`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backoff {
    /// Busy-waits in a tight loop.
    ///
    /// Offers maximum throughput at the cost of high CPU usage.
    #[default]
    Spin,

    /// Yields to the OS scheduler to allow other threads to run.
    Yield,

    /// Sleeps for the requested retry delay in milliseconds.
    ///
    /// Lowest CPU usage, but may oversleep depending on scheduler resolution.
    Sleep,
}

impl Backoff {
    /// Waits once according to the strategy.
    pub fn wait(self, yield_for: u64) {
        match self {
            Self::Spin => core::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::Sleep if yield_for == 0 => core::hint::spin_loop(),
            Self::Sleep => std::thread::sleep(core::time::Duration::from_millis(yield_for)),
        }
    }
}
