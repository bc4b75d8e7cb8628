//! Fixed-width radix codec for 64-bit values.
//!
//! Every radix in `2..=62` maps a `u64` to a zero-padded string whose width
//! is `ceil(64 / log2(base))`, using the alphabet `0-9 A-Z a-z`. The value
//! is treated as an unsigned bit pattern throughout.

use crate::{Error, Result};

/// Digits for every supported radix, in ascending value.
pub const BASE_N_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Smallest supported radix.
pub const MIN_BASE: u32 = 2;

/// Largest supported radix.
pub const MAX_BASE: u32 = 62;

const NO_VALUE: u8 = 255;

const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0;
    while i < BASE_N_ALPHABET.len() {
        lut[BASE_N_ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    lut
};

/// Encoded widths indexed by radix, computed once with integer arithmetic:
/// the smallest `n` such that `base^n >= 2^64`.
const LENGTHS: [usize; 63] = {
    let mut table = [0; 63];
    let mut base = MIN_BASE as usize;
    while base <= MAX_BASE as usize {
        let mut n = 0;
        let mut acc: u128 = 1;
        while acc <= u64::MAX as u128 {
            acc *= base as u128;
            n += 1;
        }
        table[base] = n;
        base += 1;
    }
    table
};

fn check_base(base: u32) -> Result<()> {
    if base < MIN_BASE || base > MAX_BASE {
        return Err(Error::InvalidBase { base });
    }
    Ok(())
}

/// Returns the fixed width of a 64-bit value encoded in `base`.
///
/// # Errors
///
/// Returns [`Error::InvalidBase`] when `base` is outside `2..=62`.
///
/// # Example
/// ```
/// assert_eq!(tsid::base_n_length(2)?, 64);
/// assert_eq!(tsid::base_n_length(10)?, 20);
/// assert_eq!(tsid::base_n_length(16)?, 16);
/// assert_eq!(tsid::base_n_length(62)?, 11);
/// # Ok::<(), tsid::Error>(())
/// ```
pub fn base_n_length(base: u32) -> Result<usize> {
    check_base(base)?;
    Ok(LENGTHS[base as usize])
}

/// Encodes `value` in `base`, left padded with zeros to the fixed width.
///
/// # Errors
///
/// Returns [`Error::InvalidBase`] when `base` is outside `2..=62`.
pub fn encode_base_n(value: u64, base: u32) -> Result<String> {
    let len = base_n_length(base)?;
    let radix = u64::from(base);
    let mut buf = vec![b'0'; len];
    let mut x = value;
    let mut i = len;
    while x > 0 {
        i -= 1;
        buf[i] = BASE_N_ALPHABET[(x % radix) as usize];
        x /= radix;
    }
    Ok(buf.into_iter().map(char::from).collect())
}

/// Decodes a fixed-width `base` string produced by [`encode_base_n`].
///
/// Decoding is case-sensitive: in radices above 36 upper and lower case
/// letters are distinct digits.
///
/// The accumulation wraps like native 64-bit multiplication would. Once all
/// digits are read, the final step is repeated in 128-bit arithmetic from the
/// value before the last digit, and anything above `u64::MAX` is rejected.
///
/// # Errors
///
/// - [`Error::InvalidBase`] when `base` is outside `2..=62`
/// - [`Error::InvalidLength`] when the input is not exactly
///   [`base_n_length`] characters
/// - [`Error::InvalidCharacter`] for characters that are not a digit of
///   `base`
/// - [`Error::Overflow`] when the value exceeds 64 bits
pub fn decode_base_n(s: &str, base: u32) -> Result<u64> {
    let expected = base_n_length(base)?;
    if s.len() != expected {
        return Err(Error::InvalidLength {
            len: s.len(),
            expected,
        });
    }

    let radix = u64::from(base);
    let mut x = 0_u64;
    let mut last = 0_u64;
    let mut plus = 0_u64;
    for (index, byte) in s.bytes().enumerate() {
        let digit = LOOKUP[byte as usize];
        if digit == NO_VALUE || u32::from(digit) >= base {
            return Err(Error::InvalidCharacter { byte, index });
        }
        plus = u64::from(digit);
        last = x;
        x = x.wrapping_mul(radix).wrapping_add(plus);
    }

    // base^(width - 1) < 2^64, so only the final step can wrap.
    let wide = u128::from(last) * u128::from(radix) + u128::from(plus);
    if wide > u128::from(u64::MAX) {
        return Err(Error::Overflow);
    }
    Ok(x)
}
