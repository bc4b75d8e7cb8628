//! Serde support.
//!
//! [`Tsid`] serializes as its canonical 13-character string. Use
//! [`as_number`] with `#[serde(with = "...")]` to store the raw `u64`
//! instead.

use core::fmt;

use ::serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{TSID_CHARS, Tsid};

impl Serialize for Tsid {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

struct CanonicalVisitor;

impl de::Visitor<'_> for CanonicalVisitor {
    type Value = Tsid;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {TSID_CHARS}-character Crockford base32 string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Tsid, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Tsid {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_str(CanonicalVisitor)
    }
}

/// (De)serializes a [`Tsid`] as its raw `u64`.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tsid::Tsid;
///
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     #[serde(with = "tsid::serde::as_number")]
///     id: Tsid,
/// }
///
/// let row = Row { id: Tsid::from_raw(42) };
/// assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"id":42}"#);
/// ```
pub mod as_number {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::Tsid;

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(id: &Tsid, s: S) -> Result<S::Ok, S::Error> {
        id.to_raw().serialize(s)
    }

    /// # Errors
    ///
    /// Returns an error if the input is not an unsigned 64-bit integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Tsid, D::Error> {
        u64::deserialize(d).map(Tsid::from_raw)
    }
}
