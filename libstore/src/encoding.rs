//! Unicode code point to UTF-8 conversion for `\uXXXX` escapes.

use std::ops::Deref;

use crate::error::EncodingError;

/// The UTF-8 encoding of a single code point, one to four bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Sequence {
    bytes: [u8; 4],
    len: usize,
}

impl Utf8Sequence {
    fn one(b0: u8) -> Self {
        Self {
            bytes: [b0, 0, 0, 0],
            len: 1,
        }
    }

    fn two(b0: u8, b1: u8) -> Self {
        Self {
            bytes: [b0, b1, 0, 0],
            len: 2,
        }
    }

    fn three(b0: u8, b1: u8, b2: u8) -> Self {
        Self {
            bytes: [b0, b1, b2, 0],
            len: 3,
        }
    }

    fn four(b0: u8, b1: u8, b2: u8, b3: u8) -> Self {
        Self {
            bytes: [b0, b1, b2, b3],
            len: 4,
        }
    }
}

impl Deref for Utf8Sequence {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Encode a code point as UTF-8.
///
/// ```text
/// code point               byte 1    byte 2    byte 3    byte 4
/// 0000 - 007F              0xxxxxxx
/// 0080 - 07FF              110yyyyy  10xxxxxx
/// 0800 - D7FF, E000 - FFFF 1110zzzz  10yyyyyy  10xxxxxx
/// 10000 - 10FFFF           11110uuu  10zzzzzz  10yyyyyy  10xxxxxx
/// ```
///
/// Surrogates and values above U+10FFFF have no encoding.
pub fn encode_utf8(codepoint: u32) -> Result<Utf8Sequence, EncodingError> {
    let cont = |shift: u32| 0x80 | ((codepoint >> shift) & 0x3f) as u8;

    match codepoint {
        0x0000..=0x007f => Ok(Utf8Sequence::one(codepoint as u8)),
        0x0080..=0x07ff => Ok(Utf8Sequence::two(0xc0 | (codepoint >> 6) as u8, cont(0))),
        0xd800..=0xdfff => Err(EncodingError::Surrogate(codepoint)),
        0x0800..=0xffff => Ok(Utf8Sequence::three(
            0xe0 | (codepoint >> 12) as u8,
            cont(6),
            cont(0),
        )),
        0x1_0000..=0x10_ffff => Ok(Utf8Sequence::four(
            0xf0 | ((codepoint >> 18) & 0x07) as u8,
            cont(12),
            cont(6),
            cont(0),
        )),
        _ => Err(EncodingError::OutOfRange(codepoint)),
    }
}
