//! Time-sorted unique identifiers.
//!
//! A [`Tsid`] is a 64-bit value made of a 42-bit millisecond timestamp
//! (relative to a custom epoch) followed by a 22-bit random component. The
//! random component is split into a node field (0 to 20 bits) and a counter
//! field (the remaining 2 to 22 bits).
//!
//! ```text
//!  Bit Index:  63             22 21               C-1             0
//!              +----------------+------------------+---------------+
//!  Field:      |    time (42)   |  node (0..=20)   | counter (C)   |
//!              +----------------+------------------+---------------+
//!              |<----- MSB ---------- 64 bits --------- LSB ------>|
//! ```
//!
//! Identifiers are produced by a [`TsidFactory`] (lock-based), an
//! [`AtomicTsidFactory`] (lock-free) or the process-wide [`Tsid::fast`] path.
//!
//! ```
//! use tsid::{Tsid, TsidFactory, TsidGenerator};
//!
//! let factory = TsidFactory::builder().with_node_bits(10).with_node(7).build()?;
//! let id = factory.create();
//! assert_eq!(id.node(10), 7);
//!
//! let text = id.to_string();
//! assert_eq!(text.len(), 13);
//! assert_eq!(text.parse::<Tsid>()?, id);
//! # Ok::<(), tsid::Error>(())
//! ```

mod base32;
mod base_n;
mod error;
mod fast;
mod format;
mod generator;
mod id;
mod rand;
#[cfg(feature = "serde")]
pub mod serde;
mod time;
mod worker;

pub use crate::base32::TSID_CHARS;
pub use crate::base_n::*;
pub use crate::error::*;
pub use crate::fast::*;
pub use crate::format::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::rand::*;
pub use crate::time::*;
pub use crate::worker::*;
