//! Crockford base32 codec for the canonical 13-character form.
//!
//! 13 characters carry 65 bits, so the first character only holds the top
//! 4 bits of the value and must decode to something below 16.

use crate::{Error, Result};

/// Number of characters in a canonical TSID string.
pub const TSID_CHARS: usize = 13;

pub(crate) const ALPHABET_UPPER: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
pub(crate) const ALPHABET_LOWER: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";

const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: u32 = 5;
const MASK: u64 = 0x1F;

/// Lookup table for Crockford base32 decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    // Main alphabet, allow lower-case
    while i < 32 {
        lut[ALPHABET_UPPER[i as usize] as usize] = i;
        lut[ALPHABET_LOWER[i as usize] as usize] = i;
        i += 1;
    }
    // Crockford-specific aliases
    lut[b'O' as usize] = 0;
    lut[b'o' as usize] = 0;
    lut[b'I' as usize] = 1;
    lut[b'i' as usize] = 1;
    lut[b'L' as usize] = 1;
    lut[b'l' as usize] = 1;
    lut
};

/// Encodes `value` as 13 characters drawn from `alphabet`, most significant
/// group first.
pub(crate) fn encode_crockford(value: u64, alphabet: &[u8; 32]) -> [u8; TSID_CHARS] {
    let mut buf = [0_u8; TSID_CHARS];
    for (i, out) in buf.iter_mut().enumerate() {
        let shift = BITS_PER_CHAR * (TSID_CHARS - 1 - i) as u32;
        *out = alphabet[((value >> shift) & MASK) as usize];
    }
    buf
}

/// Decodes a canonical string, case-insensitively and with the `O`/`I`/`L`
/// aliases.
pub(crate) fn decode_crockford(s: &str) -> Result<u64> {
    let bytes = s.as_bytes();
    if bytes.len() != TSID_CHARS {
        return Err(Error::InvalidFormat {
            reason: "canonical string must be 13 characters",
        });
    }

    let mut acc = 0_u64;
    for &b in bytes {
        let val = LOOKUP[b as usize];
        if val == NO_VALUE {
            return Err(Error::InvalidFormat {
                reason: "character outside the Crockford base32 alphabet",
            });
        }
        acc = (acc << BITS_PER_CHAR) | u64::from(val);
    }

    // The 65th bit lives in the first character.
    if LOOKUP[bytes[0] as usize] & 0b1_0000 != 0 {
        return Err(Error::InvalidFormat {
            reason: "first character must be between 0 and F",
        });
    }
    Ok(acc)
}

pub(crate) fn is_valid_crockford(s: &str) -> bool {
    decode_crockford(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(val: u64) {
        let buf = encode_crockford(val, ALPHABET_UPPER);
        let s = core::str::from_utf8(&buf).unwrap();
        let decoded = decode_crockford(s).unwrap();
        assert_eq!(val, decoded, "roundtrip: input={val}, b32={s}");
    }

    #[test]
    fn encode_decode_preserves_values() {
        for &v in &[
            0,
            1,
            u64::MAX,
            42,
            1 << 63,
            0xFF00_FF00_FF00_FF00,
            0x1234_5678_90AB_CDEF,
        ] {
            roundtrip(v);
        }
    }

    #[test]
    fn encodes_the_extremes() {
        assert_eq!(&encode_crockford(0, ALPHABET_UPPER), b"0000000000000");
        assert_eq!(&encode_crockford(u64::MAX, ALPHABET_UPPER), b"FZZZZZZZZZZZZ");
        assert_eq!(&encode_crockford(u64::MAX, ALPHABET_LOWER), b"fzzzzzzzzzzzz");
    }

    #[test]
    fn decode_accepts_mixed_case_characters() {
        let upper = decode_crockford("0AWE5HZP3SKTK").unwrap();
        let lower = decode_crockford("0awe5hzp3sktk").unwrap();
        let mixed = decode_crockford("0aWe5HzP3sKtK").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper, mixed);
    }

    #[test]
    fn decode_treats_crockford_aliases_as_canonical_values() {
        let aliases = [
            (b'O', b'0'),
            (b'o', b'0'),
            (b'I', b'1'),
            (b'i', b'1'),
            (b'L', b'1'),
            (b'l', b'1'),
        ];

        for (alias, canonical) in aliases {
            let alias_buf = [alias; TSID_CHARS];
            let canonical_buf = [canonical; TSID_CHARS];

            let alias_str = core::str::from_utf8(&alias_buf).unwrap();
            let canonical_str = core::str::from_utf8(&canonical_buf).unwrap();

            assert_eq!(
                decode_crockford(alias_str).unwrap(),
                decode_crockford(canonical_str).unwrap(),
                "alias {} should decode to same value as {}",
                alias as char,
                canonical as char
            );
        }
    }

    #[test]
    fn decode_rejects_first_character_at_or_above_16() {
        assert!(decode_crockford("FZZZZZZZZZZZZ").is_ok());
        for first in ["G", "H", "Z", "z", "g"] {
            let s = format!("{first}000000000000");
            assert!(
                matches!(decode_crockford(&s), Err(Error::InvalidFormat { .. })),
                "{s} should overflow"
            );
        }
    }

    #[test]
    fn decode_rejects_invalid_characters_and_lengths() {
        for s in ["012345678901@", "0123456789U12", "000000000000", "00000000000000", ""] {
            assert!(
                matches!(decode_crockford(s), Err(Error::InvalidFormat { .. })),
                "{s:?} should be rejected"
            );
        }
        // 13 bytes but not 13 ASCII characters
        assert!(decode_crockford("00000000000é").is_err());
    }
}
