//! Fixed-width byte-array arithmetic.
//!
//! Sequences are interpreted as big-endian unsigned integers of exactly
//! `8 * len` bits; every operation wraps modulo `2^(8 * len)`. The same
//! routines serve the key scrambler and manual CTR counter offsets, so they
//! have to agree bit-for-bit with the hardware byte order.

use crate::Error;

/// Bitwise XOR of two equal-length sequences.
pub fn xor(x: &[u8], y: &[u8]) -> Result<Vec<u8>, Error> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch(x.len(), y.len()));
    }
    Ok(x.iter().zip(y).map(|(a, b)| a ^ b).collect())
}

/// Big-endian addition of two equal-length sequences.
///
/// The carry propagates from the last byte toward the first; carry out of
/// the most significant byte is discarded.
pub fn sum(x: &[u8], y: &[u8]) -> Result<Vec<u8>, Error> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch(x.len(), y.len()));
    }
    let mut out = vec![0; x.len()];
    let mut carry = 0u16;
    for i in (0..x.len()).rev() {
        let sum = x[i] as u16 + y[i] as u16 + carry;
        out[i] = sum as u8;
        carry = sum >> 8;
    }
    Ok(out)
}

/// Add a u32 into the low-order 4 bytes of `x`.
///
/// The carry propagates into the remaining high-order bytes via [`sum`],
/// but the amount itself cannot exceed 32 bits. That is all the CTR block
/// offsets ever need; `x` must be at least 4 bytes long.
pub fn add_scalar(x: &[u8], amount: u32) -> Result<Vec<u8>, Error> {
    if x.len() < 4 {
        return Err(Error::LengthMismatch(4, x.len()));
    }
    let mut addend = vec![0; x.len()];
    let tail = x.len() - 4;
    addend[tail..].copy_from_slice(&amount.to_be_bytes());
    sum(x, &addend)
}

/// Rotate the whole sequence left by `bits`, taken modulo the total bit
/// width.
///
/// The rotation decomposes into a cyclic byte rotation (`bits / 8`) and a
/// uniform sub-byte shift (`bits % 8`) where each byte's high bits carry
/// into the next byte, wrapping from the last byte into the first.
pub fn rotate_left(x: &[u8], bits: usize) -> Vec<u8> {
    if x.is_empty() {
        return Vec::new();
    }
    let len = x.len();
    let bits = bits % (len * 8);
    let byte_shift = (bits / 8) as isize;
    let bit_shift = bits % 8;

    let mut rotated = vec![0; len];
    for (i, &byte) in x.iter().enumerate() {
        let target = (i as isize - byte_shift).rem_euclid(len as isize) as usize;
        rotated[target] = byte;
    }
    if bit_shift == 0 {
        return rotated;
    }

    let mut out = vec![0; len];
    let mut carry = 0;
    for i in (0..len).rev() {
        out[i] = (rotated[i] << bit_shift) | carry;
        carry = rotated[i] >> (8 - bit_shift);
    }
    // the bits shifted out of the first byte wrap into the last
    out[len - 1] |= carry;
    out
}
