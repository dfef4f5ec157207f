//! Small shared utilities: the zig-zag table and byte/word readers.
use std::io::Read;

use crate::errors::DecodeErrors;

/// Maps the *i*-th coefficient in zig-zag scan order to its natural
/// (row-major) position in an 8x8 block.
///
/// `ZIGZAG[i]` is the natural-order index that the `i`-th zig-zag-ordered
/// coefficient belongs at.
#[rustfmt::skip]
pub const ZIGZAG: [usize; 64] = [
    0,  1,  8,  16, 9,  2,  3, 10,
    17, 24, 32, 25, 18, 11, 4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6,  7,  14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Read a single byte from `reader`.
#[inline]
pub fn read_u8<R: Read>(reader: &mut R) -> Result<u8, DecodeErrors> {
    let mut buf = [0u8; 1];
    reader
        .read_exact(&mut buf)
        .map_err(|_| DecodeErrors::IOFailure("Unexpected end of stream".to_string()))?;
    Ok(buf[0])
}

/// Read a big-endian 16 bit value from `reader`.
#[inline]
pub fn read_u16_be<R: Read>(reader: &mut R) -> Result<u16, DecodeErrors> {
    let mut buf = [0u8; 2];
    reader
        .read_exact(&mut buf)
        .map_err(|_| DecodeErrors::IOFailure("Unexpected end of stream".to_string()))?;
    Ok(u16::from_be_bytes(buf))
}

/// Skip `n` bytes from `reader` by reading and discarding them.
#[inline]
pub fn skip_bytes<R: Read>(reader: &mut R, n: usize) -> Result<(), DecodeErrors> {
    let mut remaining = n;
    let mut scratch = [0u8; 256];
    while remaining > 0 {
        let chunk = remaining.min(scratch.len());
        reader
            .read_exact(&mut scratch[..chunk])
            .map_err(|_| DecodeErrors::IOFailure("Unexpected end of stream".to_string()))?;
        remaining -= chunk;
    }
    Ok(())
}
