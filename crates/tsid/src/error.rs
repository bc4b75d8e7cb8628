/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `tsid` can emit.
///
/// Every variant is produced synchronously by the call that detected the
/// problem. Generation itself never fails: node and layout problems are
/// rejected when a factory is built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The input did not have the fixed length required by the codec.
    #[error("invalid length: got {len}, expected {expected}")]
    InvalidLength {
        /// Length of the rejected input.
        len: usize,
        /// Length the codec requires.
        expected: usize,
    },

    /// The input is not a canonical TSID string, or a template or formatted
    /// string did not match.
    #[error("invalid format: {reason}")]
    InvalidFormat {
        /// What did not match.
        reason: &'static str,
    },

    /// A character outside the alphabet of the requested radix.
    #[error("invalid character {:?} at index {index}", char::from(*.byte))]
    InvalidCharacter {
        /// The offending byte.
        byte: u8,
        /// Its position in the input.
        index: usize,
    },

    /// A radix outside `2..=62`.
    #[error("invalid base: {base}")]
    InvalidBase {
        /// The rejected radix.
        base: u32,
    },

    /// The decoded magnitude does not fit in 64 bits.
    #[error("decoded value overflows 64 bits")]
    Overflow,

    /// The node id does not fit in the node bits, or the node bits are
    /// outside `0..=20`.
    #[error("invalid node {node} for {node_bits} node bits")]
    InvalidNode {
        /// The rejected node id.
        node: u32,
        /// The node bit width it was checked against.
        node_bits: u32,
    },

    /// The epoch does not fit in 64-bit Unix milliseconds.
    #[error("invalid epoch: {millis} ms")]
    InvalidEpoch {
        /// The rejected epoch in milliseconds.
        millis: u128,
    },

    /// An environment variable is set but is not an unsigned integer.
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv {
        /// The variable name.
        key: &'static str,
        /// Its raw value.
        value: String,
    },
}
