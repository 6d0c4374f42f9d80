//! Sign-magnitude bignum conversion.
//!
//! Bignum magnitudes arrive as base-256 digits, least significant first. They
//! are rendered most-significant first as hexadecimal text and parsed as a
//! base-16 [`Integer`].

use malachite::base::num::conversion::traits::FromStringBase;
use malachite::Integer;

use crate::error::BertError;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Hex text for a magnitude given least significant byte first, with a
/// leading `-` when `negative` is set.
pub fn magnitude_to_hex(negative: bool, magnitude: &[u8]) -> String {
    let mut text = String::with_capacity(magnitude.len() * 2 + 1);
    if negative {
        text.push('-');
    }
    for &byte in magnitude.iter().rev() {
        text.push(HEX[(byte >> 4) as usize] as char);
        text.push(HEX[(byte & 0xf) as usize] as char);
    }
    text
}

/// Converts a sign byte and little-endian magnitude into an [`Integer`].
///
/// Any nonzero `sign` means negative. An empty magnitude is zero for either
/// sign.
pub fn bignum_from_le_bytes(sign: u8, magnitude: &[u8]) -> Result<Integer, BertError> {
    if magnitude.is_empty() {
        return Ok(Integer::from(0));
    }
    let text = magnitude_to_hex(sign != 0, magnitude);
    Integer::from_string_base(16, &text).ok_or(BertError::InvalidBignum(text))
}
