use core::{fmt, str::FromStr, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    Error, Result, TSID_EPOCH,
    base_n::{decode_base_n, encode_base_n},
    base32::{ALPHABET_LOWER, ALPHABET_UPPER, TSID_CHARS, decode_crockford, encode_crockford, is_valid_crockford},
    format::Template,
};

/// Number of bytes in the binary form of a TSID.
pub const TSID_BYTES: usize = 8;

/// Width of the time component.
pub const TIME_BITS: u32 = 42;

/// Width of the random component (node and counter together).
pub const RANDOM_BITS: u32 = 22;

/// Largest node field width. The counter always keeps at least 2 bits.
pub const MAX_NODE_BITS: u32 = 20;

/// A time-sorted unique identifier.
///
/// - 42 bits time (ms since a custom epoch, [`TSID_EPOCH`] by default)
/// - 22 bits random component: `node_bits` node id followed by the counter
///
/// ```text
///  Bit Index:  63             22 21                                0
///              +----------------+----------------------------------+
///  Field:      |    time (42)   | node (N) | counter (22 - N)      |
///              +----------------+----------------------------------+
///              |<----- MSB ---------- 64 bits --------- LSB ------>|
/// ```
///
/// Values are immutable. Equality and ordering follow the wrapped number read
/// as an **unsigned** 64-bit integer, which is also the lexicographic order of
/// the canonical string.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tsid {
    id: u64,
}

impl Tsid {
    /// Bitmask for the 42-bit time component once shifted down.
    pub const TIME_MASK: u64 = (1 << TIME_BITS) - 1;

    /// Bitmask for the 22-bit random component.
    pub const RANDOM_MASK: u64 = (1 << RANDOM_BITS) - 1;

    /// Number of bits to shift the time component to its position (bit 22).
    pub const TIME_SHIFT: u32 = RANDOM_BITS;

    /// Wraps a raw 64-bit value.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self { id }
    }

    /// Returns the raw 64-bit value.
    #[must_use]
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Packs a time component and a random component split at `node_bits`.
    ///
    /// Fields wider than their slot are truncated to fit. `node_bits` above
    /// [`MAX_NODE_BITS`] is treated as [`MAX_NODE_BITS`].
    ///
    /// ```
    /// use tsid::Tsid;
    ///
    /// let id = Tsid::from_components(1_000, 3, 17, 10);
    /// assert_eq!(id.timestamp(), 1_000);
    /// assert_eq!(id.node(10), 3);
    /// assert_eq!(id.counter(10), 17);
    /// ```
    #[must_use]
    pub const fn from_components(time: u64, node: u64, counter: u64, node_bits: u32) -> Self {
        let node_bits = clamp_node_bits(node_bits);
        let counter_bits = RANDOM_BITS - node_bits;
        let node_mask = (1 << node_bits) - 1;
        let counter_mask = (1 << counter_bits) - 1;
        let time = (time & Self::TIME_MASK) << Self::TIME_SHIFT;
        let node = (node & node_mask) << counter_bits;
        Self {
            id: time | node | (counter & counter_mask),
        }
    }

    /// Builds a TSID from exactly 8 big-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLength`] unless `bytes` is 8 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; TSID_BYTES] = bytes.try_into().map_err(|_| Error::InvalidLength {
            len: bytes.len(),
            expected: TSID_BYTES,
        })?;
        Ok(Self::from_raw(u64::from_be_bytes(array)))
    }

    /// Returns the big-endian byte form.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; TSID_BYTES] {
        self.id.to_be_bytes()
    }

    /// Returns the time component: milliseconds since the custom epoch.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.id >> Self::TIME_SHIFT
    }

    /// Returns the 22-bit random component.
    #[must_use]
    pub const fn random(&self) -> u64 {
        self.id & Self::RANDOM_MASK
    }

    /// Returns the node field for a layout with `node_bits` node bits,
    /// clamped to [`MAX_NODE_BITS`].
    #[must_use]
    pub const fn node(&self, node_bits: u32) -> u64 {
        let node_bits = clamp_node_bits(node_bits);
        let counter_bits = RANDOM_BITS - node_bits;
        (self.random() >> counter_bits) & ((1 << node_bits) - 1)
    }

    /// Returns the counter field for a layout with `node_bits` node bits,
    /// clamped to [`MAX_NODE_BITS`].
    #[must_use]
    pub const fn counter(&self, node_bits: u32) -> u64 {
        let counter_bits = RANDOM_BITS - clamp_node_bits(node_bits);
        self.random() & ((1 << counter_bits) - 1)
    }

    /// Milliseconds since 1970-01-01 for an id built against [`TSID_EPOCH`].
    #[must_use]
    pub fn unix_millis(&self) -> u64 {
        self.unix_millis_since(TSID_EPOCH)
    }

    /// Milliseconds since 1970-01-01 for an id built against `epoch`.
    ///
    /// Saturates at `u64::MAX` for epochs too far out to add.
    #[must_use]
    pub fn unix_millis_since(&self, epoch: Duration) -> u64 {
        let epoch = u64::try_from(epoch.as_millis()).unwrap_or(u64::MAX);
        self.timestamp().saturating_add(epoch)
    }

    /// Creation instant for an id built against [`TSID_EPOCH`].
    #[must_use]
    pub fn instant(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.unix_millis())
    }

    /// Creation instant for an id built against `epoch`.
    ///
    /// Returns `None` if the instant is past what [`SystemTime`] can hold.
    #[must_use]
    pub fn instant_since(&self, epoch: Duration) -> Option<SystemTime> {
        UNIX_EPOCH.checked_add(Duration::from_millis(self.unix_millis_since(epoch)))
    }

    /// Returns the canonical string in lower case.
    ///
    /// ```
    /// use tsid::Tsid;
    ///
    /// let id: Tsid = "0AWE5HZP3SKTK".parse()?;
    /// assert_eq!(id.to_lower(), "0awe5hzp3sktk");
    /// # Ok::<(), tsid::Error>(())
    /// ```
    #[must_use]
    pub fn to_lower(&self) -> String {
        ascii_string(&encode_crockford(self.id, ALPHABET_LOWER))
    }

    /// Returns `true` if `s` is a valid canonical string.
    ///
    /// A valid string has 13 characters from Crockford's base32 alphabet
    /// (case-insensitive) and a first character between `0` and `F`.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        is_valid_crockford(s)
    }

    /// Encodes the id in `base`, zero-padded to the fixed width of that
    /// radix.
    ///
    /// ```
    /// use tsid::Tsid;
    ///
    /// let id: Tsid = "0AXS476XSZ43M".parse()?;
    /// assert_eq!(id.encode(16)?, "05772439BB9F9074");
    /// # Ok::<(), tsid::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBase`] when `base` is outside `2..=62`.
    pub fn encode(&self, base: u32) -> Result<String> {
        encode_base_n(self.id, base)
    }

    /// Decodes a zero-padded `base` string. Case-sensitive.
    ///
    /// # Errors
    ///
    /// See [`decode_base_n`](crate::decode_base_n).
    pub fn decode(s: &str, base: u32) -> Result<Self> {
        decode_base_n(s, base).map(Self::from_raw)
    }

    /// Renders the id through a template holding one placeholder.
    ///
    /// | placeholder | representation               |
    /// |-------------|------------------------------|
    /// | `%S`        | canonical string, upper case |
    /// | `%s`        | canonical string, lower case |
    /// | `%X`        | hexadecimal, upper case      |
    /// | `%x`        | hexadecimal, lower case      |
    /// | `%d`        | base-10                      |
    /// | `%z`        | base-62                      |
    ///
    /// ```
    /// use tsid::Tsid;
    ///
    /// let id = Tsid::from_raw(0x0575_FDC1_7861_37D6);
    /// assert_eq!(id.format("DOC-%X.PDF")?, "DOC-0575FDC1786137D6.PDF");
    /// # Ok::<(), tsid::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the template has no `%`, ends with
    /// `%`, or names an unknown placeholder.
    pub fn format(&self, template: &str) -> Result<String> {
        Template::parse(template)?.render(*self)
    }

    /// Reverses [`Tsid::format`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for a bad template or when `formatted`
    /// does not start and end with the template's literal text, and any
    /// decoding error of the embedded representation.
    pub fn unformat(formatted: &str, template: &str) -> Result<Self> {
        Template::parse(template)?.extract(formatted)
    }

    fn write_canonical(&self, f: &mut fmt::Formatter<'_>, alphabet: &[u8; 32]) -> fmt::Result {
        let buf = encode_crockford(self.id, alphabet);
        for &b in &buf {
            fmt::Write::write_char(f, char::from(b))?;
        }
        Ok(())
    }
}

fn ascii_string(buf: &[u8; TSID_CHARS]) -> String {
    buf.iter().copied().map(char::from).collect()
}

const fn clamp_node_bits(node_bits: u32) -> u32 {
    if node_bits > MAX_NODE_BITS {
        MAX_NODE_BITS
    } else {
        node_bits
    }
}

impl From<u64> for Tsid {
    fn from(id: u64) -> Self {
        Self::from_raw(id)
    }
}

impl From<Tsid> for u64 {
    fn from(id: Tsid) -> Self {
        id.to_raw()
    }
}

impl TryFrom<&[u8]> for Tsid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl FromStr for Tsid {
    type Err = Error;

    /// Parses the canonical 13-character form.
    fn from_str(s: &str) -> Result<Self> {
        decode_crockford(s).map(Self::from_raw)
    }
}

impl fmt::Display for Tsid {
    /// Writes the canonical upper case string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_canonical(f, ALPHABET_UPPER)
    }
}

impl fmt::Debug for Tsid {
    /// `{:?}` prints the fields on one line; `{:#?}` draws the bit layout.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return write_bit_layout(f, self);
        }
        f.debug_struct("Tsid")
            .field("id", &self.id)
            .field("canonical", &format_args!("{self}"))
            .field("timestamp", &self.timestamp())
            .field("random", &self.random())
            .finish()
    }
}

fn write_bit_layout(f: &mut fmt::Formatter<'_>, id: &Tsid) -> fmt::Result {
    let fields = [
        ("time", TIME_BITS, id.timestamp()),
        ("random", RANDOM_BITS, id.random()),
    ];

    // widest of label, decimal and hex, plus one space each side
    let columns = fields.map(|(name, bits, value)| {
        let label = format!("{name} ({bits})").len();
        let dec = value.to_string().len();
        let hex = format!("0x{value:x}").len();
        label.max(dec).max(hex) + 2
    });

    fn center(s: impl ToString, width: usize) -> String {
        let s = s.to_string();
        let pad = width.saturating_sub(s.len());
        let left = pad / 2;
        format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
    }

    fn border(f: &mut fmt::Formatter<'_>, columns: &[usize]) -> fmt::Result {
        write!(f, "        +")?;
        for &w in columns {
            write!(f, "{}+", "-".repeat(w))?;
        }
        writeln!(f)
    }

    writeln!(f, "Tsid {{")?;
    writeln!(f, "    raw id     : 0x{:016x} ({})", id.id, id.id)?;
    writeln!(f, "    canonical  : {id}")?;
    writeln!(f, "    layout     :")?;

    border(f, &columns)?;
    write!(f, "        |")?;
    for ((name, bits, _), &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(format!("{name} ({bits})"), w))?;
    }
    writeln!(f)?;
    border(f, &columns)?;

    write!(f, "        |")?;
    for ((_, _, value), &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(value, w))?;
    }
    writeln!(f)?;
    write!(f, "        |")?;
    for ((_, _, value), &w) in fields.iter().zip(&columns) {
        write!(f, "{}|", center(format!("0x{value:x}"), w))?;
    }
    writeln!(f)?;
    border(f, &columns)?;

    write!(f, "}}")
}
