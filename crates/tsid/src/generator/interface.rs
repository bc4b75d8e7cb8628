use crate::{Backoff, IdGenStatus, Tsid};

/// Common interface of the node-aware TSID generators.
///
/// Implementors only provide [`try_next_id`]; the blocking calls loop over
/// it, waiting with a [`Backoff`] strategy while it reports
/// [`IdGenStatus::Pending`].
///
/// [`try_next_id`]: TsidGenerator::try_next_id
pub trait TsidGenerator {
    /// Attempts to produce the next id without blocking.
    fn try_next_id(&self) -> IdGenStatus;

    /// Returns the next id, spinning through counter rollover.
    ///
    /// Never fails. It only waits when the counter space of the current
    /// millisecond is used up or the clock is behind the last issued id.
    fn create(&self) -> Tsid {
        self.create_with_backoff(Backoff::Spin)
    }

    /// Returns the next id, waiting with `backoff` while pending.
    fn create_with_backoff(&self, backoff: Backoff) -> Tsid {
        loop {
            match self.try_next_id() {
                IdGenStatus::Ready { id } => break id,
                IdGenStatus::Pending { yield_for } => backoff.wait(yield_for),
            }
        }
    }
}

/// Produces raw 64-bit identifiers.
///
/// ```
/// use tsid::{IdGenerator, WorkerTsidGenerator};
///
/// fn next_key(generator: &impl IdGenerator) -> u64 {
///     generator.generate()
/// }
///
/// let generator = WorkerTsidGenerator::new(1, 1)?;
/// assert!(next_key(&generator) < next_key(&generator));
/// # Ok::<(), tsid::Error>(())
/// ```
pub trait IdGenerator {
    /// Returns the next id as a raw `u64`, blocking through counter
    /// rollover.
    fn generate(&self) -> u64;
}
