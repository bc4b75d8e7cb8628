//! Service ids built from a worker and a process number.
//!
//! The 10-bit node field is split into a 5-bit worker id and a 5-bit process
//! id, and time counts from [`SERVICE_EPOCH`]:
//!
//! ```text
//!  Bit Index:  63          22 21      17 16       12 11          0
//!              +-------------+----------+-----------+-------------+
//!  Field:      |  time (42)  | worker(5)| process(5)| sequence(12)|
//!              +-------------+----------+-----------+-------------+
//! ```
//!
//! Counters start at zero each millisecond, so [`TsidParts::sequence`] is the
//! position of the id within its millisecond.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{
    Error, IdGenerator, Result, SERVICE_EPOCH, SystemClock, TimeSource, TsidFactory,
    TsidFactoryBuilder, TsidGenerator, ZeroRandom, time::SERVICE_EPOCH_MILLIS,
};

/// Width of the worker and process fields.
pub const WORKER_BITS: u32 = 5;

/// Largest worker or process number.
pub const MAX_WORKER: u32 = (1 << WORKER_BITS) - 1;

const NODE_BITS: u32 = 2 * WORKER_BITS;
const SEQUENCE_BITS: u32 = 12;
const WORKER_SHIFT: u32 = SEQUENCE_BITS + WORKER_BITS;
const WORKER_MASK: u64 = (MAX_WORKER as u64) << WORKER_SHIFT;
const PROCESS_MASK: u64 = (MAX_WORKER as u64) << SEQUENCE_BITS;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// The decoded fields of a service id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TsidParts {
    /// Creation time, milliseconds since 1970-01-01 UTC.
    pub unix_millis: u64,
    /// Worker id, `0..=31`.
    pub worker: u32,
    /// Process id within the worker, `0..=31`.
    pub process: u32,
    /// Position of the id within its millisecond.
    pub sequence: u32,
}

/// Generates raw 64-bit service ids for one worker/process pair.
///
/// ```
/// use tsid::{IdGenerator, WorkerTsidGenerator};
///
/// let generator = WorkerTsidGenerator::new(3, 17)?;
/// let id = generator.generate();
/// let parts = WorkerTsidGenerator::parse(id);
/// assert_eq!((parts.worker, parts.process), (3, 17));
/// # Ok::<(), tsid::Error>(())
/// ```
#[derive(Debug)]
pub struct WorkerTsidGenerator<T = SystemClock>
where
    T: TimeSource<u64>,
{
    factory: TsidFactory<T, ZeroRandom>,
}

impl WorkerTsidGenerator {
    /// Creates a generator on the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`] if `worker` or `process` is above 31.
    pub fn new(worker: u32, process: u32) -> Result<Self> {
        Self::with_time_source(worker, process, SystemClock)
    }

    /// Splits a service id into its fields.
    pub fn parse(id: u64) -> TsidParts {
        TsidParts {
            unix_millis: (id >> (NODE_BITS + SEQUENCE_BITS)) + SERVICE_EPOCH_MILLIS,
            worker: ((id & WORKER_MASK) >> WORKER_SHIFT) as u32,
            process: ((id & PROCESS_MASK) >> SEQUENCE_BITS) as u32,
            sequence: (id & SEQUENCE_MASK) as u32,
        }
    }

    /// Creation instant of a service id.
    pub fn generated_at(id: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(Self::parse(id).unix_millis)
    }
}

impl<T> WorkerTsidGenerator<T>
where
    T: TimeSource<u64>,
{
    /// Creates a generator reading time from `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNode`] if `worker` or `process` is above 31.
    pub fn with_time_source(worker: u32, process: u32, time: T) -> Result<Self> {
        for part in [worker, process] {
            if part > MAX_WORKER {
                return Err(Error::InvalidNode {
                    node: part,
                    node_bits: WORKER_BITS,
                });
            }
        }
        let factory = TsidFactoryBuilder::new()
            .with_epoch(SERVICE_EPOCH)
            .with_node_bits(NODE_BITS)
            .with_node((worker << WORKER_BITS) | process)
            .with_time_source(time)
            .with_random(ZeroRandom)
            .build()?;
        Ok(Self { factory })
    }

    /// The worker id stamped on every id.
    pub fn worker(&self) -> u32 {
        self.factory.node() >> WORKER_BITS
    }

    /// The process id stamped on every id.
    pub fn process(&self) -> u32 {
        self.factory.node() & MAX_WORKER
    }
}

impl<T> IdGenerator for WorkerTsidGenerator<T>
where
    T: TimeSource<u64>,
{
    fn generate(&self) -> u64 {
        self.factory.create().to_raw()
    }
}
