use core::time::Duration;

use crate::{
    AtomicTsidFactory, Error, MAX_NODE_BITS, RandSource, Result, SystemClock, TSID_EPOCH,
    ThreadRandom, TimeSource, TsidFactory, generator::layout::Layout,
};

/// Environment variable read for the node id when none is set explicitly.
pub const NODE_ENV: &str = "TSIDCREATOR_NODE";

/// Environment variable read for the number of nodes when no node width is
/// set explicitly. The width becomes `ceil(log2(count))`.
pub const NODE_COUNT_ENV: &str = "TSIDCREATOR_NODE_COUNT";

/// Configures and validates a [`TsidFactory`] or [`AtomicTsidFactory`].
///
/// | setting     | default                                                  |
/// |-------------|----------------------------------------------------------|
/// | epoch       | [`TSID_EPOCH`]                                           |
/// | node bits   | `TSIDCREATOR_NODE_COUNT`, else 10                        |
/// | node id     | `TSIDCREATOR_NODE`, else random                          |
/// | time source | [`SystemClock`]                                          |
/// | random      | [`ThreadRandom`]                                         |
///
/// Only pinning the node id explicitly (or through the environment) keeps
/// ids from different processes apart.
///
/// ```
/// use std::time::Duration;
/// use tsid::{TsidFactoryBuilder, TsidGenerator};
///
/// let factory = TsidFactoryBuilder::new()
///     .with_epoch(Duration::from_millis(1_420_070_400_000))
///     .with_node_bits(4)
///     .with_node(15)
///     .build()?;
/// assert_eq!(factory.create().node(4), 15);
///
/// let err = TsidFactoryBuilder::new().with_node_bits(4).with_node(16).build();
/// assert!(err.is_err());
/// # Ok::<(), tsid::Error>(())
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct TsidFactoryBuilder<T = SystemClock, R = ThreadRandom> {
    epoch: Duration,
    node_bits: Option<u32>,
    node: Option<u32>,
    time: T,
    rng: R,
}

impl Default for TsidFactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TsidFactoryBuilder {
    /// Node width used when neither the builder nor the environment sets one:
    /// 1024 nodes with 4096 counter values each.
    pub const DEFAULT_NODE_BITS: u32 = 10;

    /// Starts from [`TSID_EPOCH`], the system clock and thread-local random
    /// numbers, with node settings left to the environment.
    pub fn new() -> Self {
        Self {
            epoch: TSID_EPOCH,
            node_bits: None,
            node: None,
            time: SystemClock,
            rng: ThreadRandom,
        }
    }
}

impl<T, R> TsidFactoryBuilder<T, R>
where
    T: TimeSource<u64>,
    R: RandSource<u32>,
{
    /// Sets the custom epoch as a duration since 1970-01-01 UTC.
    pub fn with_epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    /// Sets the width of the node field, `0..=20`.
    pub fn with_node_bits(mut self, node_bits: u32) -> Self {
        self.node_bits = Some(node_bits);
        self
    }

    /// Sets the node id, `0..2^node_bits`.
    pub fn with_node(mut self, node: u32) -> Self {
        self.node = Some(node);
        self
    }

    /// Sets the clock the factory reads Unix milliseconds from.
    pub fn with_time_source<T2: TimeSource<u64>>(self, time: T2) -> TsidFactoryBuilder<T2, R> {
        TsidFactoryBuilder {
            epoch: self.epoch,
            node_bits: self.node_bits,
            node: self.node,
            time,
            rng: self.rng,
        }
    }

    /// Sets the source of counter seeds, also used to draw a random node id.
    pub fn with_random<R2: RandSource<u32>>(self, rng: R2) -> TsidFactoryBuilder<T, R2> {
        TsidFactoryBuilder {
            epoch: self.epoch,
            node_bits: self.node_bits,
            node: self.node,
            time: self.time,
            rng,
        }
    }

    /// Builds a lock-based factory.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidNode`] if the node width exceeds 20 bits or the node
    ///   id does not fit in it
    /// - [`Error::InvalidEpoch`] if the epoch does not fit in `u64`
    ///   milliseconds
    /// - [`Error::InvalidEnv`] if `TSIDCREATOR_NODE` or
    ///   `TSIDCREATOR_NODE_COUNT` is consulted and is not an unsigned integer
    pub fn build(self) -> Result<TsidFactory<T, R>> {
        let layout = self.layout()?;
        Ok(TsidFactory::from_layout(layout, self.time, self.rng))
    }

    /// Builds a lock-free factory.
    ///
    /// # Errors
    ///
    /// Same as [`TsidFactoryBuilder::build`].
    pub fn build_atomic(self) -> Result<AtomicTsidFactory<T, R>> {
        let layout = self.layout()?;
        Ok(AtomicTsidFactory::from_layout(layout, self.time, self.rng))
    }

    fn layout(&self) -> Result<Layout> {
        self.resolve(|key| std::env::var(key).ok())
    }

    /// Resolves epoch, node width and node id, reading fallbacks through `env`.
    fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> Result<Layout> {
        let epoch_millis = self.epoch.as_millis();
        let epoch_millis = u64::try_from(epoch_millis)
            .map_err(|_| Error::InvalidEpoch { millis: epoch_millis })?;
        let node_bits = match self.node_bits {
            Some(bits) => bits,
            None => node_bits_from_count(env_u32(&env, NODE_COUNT_ENV)?),
        };
        let node = match self.node {
            Some(node) => Some(node),
            None => env_u32(&env, NODE_ENV)?,
        };
        let node = match node {
            Some(node) => node,
            None if node_bits > MAX_NODE_BITS => 0,
            None => self.rng.rand() & ((1 << node_bits) - 1),
        };
        if node_bits > MAX_NODE_BITS || node >> node_bits != 0 {
            return Err(Error::InvalidNode { node, node_bits });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(node, node_bits, epoch_millis, "resolved tsid node");
        Ok(Layout::new(epoch_millis, node_bits, node))
    }
}

/// Reads `key` as a `u32`. Unset or blank is `None`, anything else must parse.
fn env_u32(env: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<u32>> {
    match env(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(Error::InvalidEnv { key, value }),
        },
    }
}

/// Smallest width that can address `count` nodes, capped at 20 bits.
fn node_bits_from_count(count: Option<u32>) -> u32 {
    match count {
        None => TsidFactoryBuilder::DEFAULT_NODE_BITS,
        Some(0 | 1) => 0,
        Some(n) => (u32::BITS - (n - 1).leading_zeros()).min(MAX_NODE_BITS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_bits_from_count_rounds_up() {
        assert_eq!(node_bits_from_count(None), 10);
        assert_eq!(node_bits_from_count(Some(0)), 0);
        assert_eq!(node_bits_from_count(Some(1)), 0);
        assert_eq!(node_bits_from_count(Some(2)), 1);
        assert_eq!(node_bits_from_count(Some(3)), 2);
        assert_eq!(node_bits_from_count(Some(1024)), 10);
        assert_eq!(node_bits_from_count(Some(1025)), 11);
        assert_eq!(node_bits_from_count(Some(u32::MAX)), 20);
    }

    #[test]
    fn rejects_wide_node_field() {
        let err = TsidFactoryBuilder::new()
            .with_node_bits(21)
            .with_node(0)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidNode {
                node: 0,
                node_bits: 21
            }
        );
        assert!(TsidFactoryBuilder::new().with_node_bits(21).build_atomic().is_err());
    }

    #[test]
    fn rejects_node_outside_field() {
        for (bits, node) in [(0, 1), (1, 2), (10, 1024), (20, 1 << 20)] {
            let err = TsidFactory::new_instance_with_node_bits(bits, node).unwrap_err();
            assert_eq!(err, Error::InvalidNode { node, node_bits: bits });
        }
        assert!(TsidFactory::new_instance_with_node(1024).is_err());
    }

    #[test]
    fn accepts_boundaries() {
        for (bits, node) in [(0, 0), (1, 1), (10, 1023), (20, (1 << 20) - 1)] {
            let factory = TsidFactory::new_instance_with_node_bits(bits, node).unwrap();
            assert_eq!(factory.node(), node);
            assert_eq!(factory.node_bits(), bits);
            assert_eq!(factory.epoch(), TSID_EPOCH);
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn random_node_fits_the_field() {
        for bits in [0, 3, 10, 20] {
            let layout = TsidFactoryBuilder::new()
                .with_node_bits(bits)
                .with_random(|| u32::MAX)
                .resolve(no_env)
                .unwrap();
            assert_eq!(layout.node(), u32::MAX & ((1 << bits) - 1));
        }
    }

    #[test]
    fn explicit_node_beats_environment() {
        let env = env_of(&[(NODE_ENV, "7"), (NODE_COUNT_ENV, "4")]);
        let layout = TsidFactoryBuilder::new()
            .with_node_bits(5)
            .with_node(3)
            .with_random(|| -> u32 { unreachable!() })
            .resolve(env)
            .unwrap();
        assert_eq!(layout.node(), 3);
        assert_eq!(layout.node_bits(), 5);
    }

    #[test]
    fn environment_node_beats_random() {
        let env = env_of(&[(NODE_ENV, " 7 ")]);
        let layout = TsidFactoryBuilder::new()
            .with_node_bits(5)
            .with_random(|| -> u32 { unreachable!() })
            .resolve(env)
            .unwrap();
        assert_eq!(layout.node(), 7);
    }

    #[test]
    fn node_count_sets_width() {
        let env = env_of(&[(NODE_COUNT_ENV, "256"), (NODE_ENV, "255")]);
        let layout = TsidFactoryBuilder::new().resolve(env).unwrap();
        assert_eq!(layout.node_bits(), 8);
        assert_eq!(layout.node(), 255);

        let layout = TsidFactoryBuilder::new()
            .with_random(|| 0_u32)
            .resolve(no_env)
            .unwrap();
        assert_eq!(layout.node_bits(), TsidFactoryBuilder::DEFAULT_NODE_BITS);
        assert_eq!(layout.node(), 0);
    }

    #[test]
    fn environment_node_is_validated() {
        let env = env_of(&[(NODE_COUNT_ENV, "2"), (NODE_ENV, "2")]);
        let err = TsidFactoryBuilder::new().resolve(env).unwrap_err();
        assert_eq!(err, Error::InvalidNode { node: 2, node_bits: 1 });
    }

    #[test]
    fn unparsable_environment_is_rejected() {
        let err = TsidFactoryBuilder::new()
            .with_node_bits(4)
            .resolve(env_of(&[(NODE_ENV, "abc")]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidEnv {
                key: NODE_ENV,
                value: "abc".into()
            }
        );

        let err = TsidFactoryBuilder::new()
            .with_node(0)
            .resolve(env_of(&[(NODE_COUNT_ENV, "-1")]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidEnv {
                key: NODE_COUNT_ENV,
                value: "-1".into()
            }
        );

        // not consulted when set explicitly
        let layout = TsidFactoryBuilder::new()
            .with_node_bits(4)
            .with_node(1)
            .resolve(env_of(&[(NODE_ENV, "abc"), (NODE_COUNT_ENV, "x")]))
            .unwrap();
        assert_eq!(layout.node(), 1);
    }

    #[test]
    fn blank_environment_counts_as_unset() {
        let layout = TsidFactoryBuilder::new()
            .with_node_bits(4)
            .with_random(|| 9_u32)
            .resolve(env_of(&[(NODE_ENV, "  ")]))
            .unwrap();
        assert_eq!(layout.node(), 9);
    }

    #[test]
    fn rejects_epoch_beyond_u64_millis() {
        let err = TsidFactoryBuilder::new()
            .with_epoch(Duration::MAX)
            .with_node_bits(0)
            .with_node(0)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidEpoch {
                millis: Duration::MAX.as_millis()
            }
        );

        let layout = TsidFactoryBuilder::new()
            .with_epoch(Duration::from_millis(u64::MAX))
            .with_node_bits(0)
            .with_node(0)
            .resolve(no_env)
            .unwrap();
        assert_eq!(layout.epoch(), Duration::from_millis(u64::MAX));
    }
}
