use core::{cmp::Ordering, time::Duration};

use crate::{IdGenStatus, RANDOM_BITS, Tsid};

/// The fixed part of a generator: epoch, node and the node/counter split.
///
/// Validated once by the builder, then shared by the lock-based and the
/// lock-free factory, which differ only in how they store the last issued id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Layout {
    epoch_millis: u64,
    node_bits: u32,
    node: u32,
    counter_mask: u64,
}

impl Layout {
    /// Callers must have checked `node_bits <= MAX_NODE_BITS` and
    /// `node < 2^node_bits`.
    pub(crate) const fn new(epoch_millis: u64, node_bits: u32, node: u32) -> Self {
        Self {
            epoch_millis,
            node_bits,
            node,
            counter_mask: (1 << (RANDOM_BITS - node_bits)) - 1,
        }
    }

    pub(crate) const fn node(&self) -> u32 {
        self.node
    }

    pub(crate) const fn node_bits(&self) -> u32 {
        self.node_bits
    }

    pub(crate) const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }

    /// The state a fresh generator starts from: time 0, counter 0.
    pub(crate) const fn initial(&self) -> Tsid {
        self.compose(0, 0)
    }

    /// Converts a Unix timestamp into the 42-bit time component.
    pub(crate) const fn elapsed(&self, unix_millis: u64) -> u64 {
        unix_millis.saturating_sub(self.epoch_millis) & Tsid::TIME_MASK
    }

    const fn compose(&self, time: u64, counter: u64) -> Tsid {
        Tsid::from_components(time, self.node as u64, counter, self.node_bits)
    }

    /// Runs one step of the counter state machine.
    ///
    /// - a later millisecond starts over from a random seed drawn from the
    ///   lower half of the counter space
    /// - the same millisecond increments the counter, or reports
    ///   `Pending { yield_for: 1 }` once it is exhausted
    /// - an earlier millisecond keeps counting on the last issued timestamp
    pub(crate) fn advance(&self, last: Tsid, now: u64, seed: impl FnOnce() -> u32) -> IdGenStatus {
        let last_ts = last.timestamp();
        match now.cmp(&last_ts) {
            Ordering::Greater => {
                let counter = u64::from(seed()) & (self.counter_mask >> 1);
                IdGenStatus::Ready {
                    id: self.compose(now, counter),
                }
            }
            Ordering::Equal => {
                let counter = last.counter(self.node_bits);
                if counter < self.counter_mask {
                    IdGenStatus::Ready {
                        id: self.compose(last_ts, counter + 1),
                    }
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(timestamp = last_ts, "counter exhausted, waiting for next millisecond");
                    IdGenStatus::Pending { yield_for: 1 }
                }
            }
            Ordering::Less => self.cold_clock_behind(last, now),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, last: Tsid, now: u64) -> IdGenStatus {
        let last_ts = last.timestamp();
        let counter = last.counter(self.node_bits);
        #[cfg(feature = "tracing")]
        tracing::debug!(now, last = last_ts, "clock moved backwards, holding last timestamp");
        if counter < self.counter_mask {
            IdGenStatus::Ready {
                id: self.compose(last_ts, counter + 1),
            }
        } else {
            IdGenStatus::Pending {
                yield_for: last_ts - now + 1,
            }
        }
    }
}
