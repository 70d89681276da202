//! Big-endian bitfield packing.
//!
//! A byte string is read as one big-endian integer. Fields are taken from
//! the least-significant end first, so the first width passed to [`unpack`]
//! describes the lowest bits of the last byte.

/// Widest single field supported by [`pack`] and [`unpack`].
pub const MAX_FIELD_WIDTH: u32 = u64::BITS;

fn mask(width: u32) -> u64 {
    if width >= MAX_FIELD_WIDTH {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

fn bit_at(data: &[u8], bit: usize) -> bool {
    let byte_from_end = bit / 8;
    if byte_from_end >= data.len() {
        return false;
    }
    let byte = data[data.len() - 1 - byte_from_end];
    (byte >> (bit % 8)) & 1 == 1
}

/// Splits `data` into unsigned fields of the given bit widths, lowest bits first.
///
/// Bits past the end of `data` read as zero.
pub fn unpack(data: &[u8], widths: &[u32]) -> Vec<u64> {
    let mut offset = 0usize;
    let mut out = Vec::with_capacity(widths.len());
    for &width in widths {
        let width = width.min(MAX_FIELD_WIDTH);
        let mut value = 0u64;
        for i in 0..width as usize {
            if bit_at(data, offset + i) {
                value |= 1 << i;
            }
        }
        out.push(value);
        offset += width as usize;
    }
    out
}

/// Packs `(value, width)` pairs into the smallest big-endian byte string that
/// holds their total width. Values are masked to their width; unused high
/// bits are zero.
pub fn pack(fields: &[(u64, u32)]) -> Vec<u8> {
    let total: usize = fields
        .iter()
        .map(|&(_, width)| width.min(MAX_FIELD_WIDTH) as usize)
        .sum();
    let len = total.div_ceil(8);
    let mut out = vec![0u8; len];

    let mut offset = 0usize;
    for &(value, width) in fields {
        let width = width.min(MAX_FIELD_WIDTH);
        let value = value & mask(width);
        for i in 0..width as usize {
            if (value >> i) & 1 == 1 {
                let bit = offset + i;
                out[len - 1 - bit / 8] |= 1 << (bit % 8);
            }
        }
        offset += width as usize;
    }
    out
}

/// Encodes the decimal digits of `value` as BCD nibbles (`59` -> `0x59`).
///
/// Digits beyond what the target field holds are dropped later by [`pack`].
pub fn to_bcd(mut value: u64) -> u64 {
    let mut out = 0u64;
    let mut shift = 0u32;
    while value > 0 && shift < MAX_FIELD_WIDTH {
        out |= (value % 10) << shift;
        value /= 10;
        shift += 4;
    }
    out
}

/// Decodes BCD nibbles back into a decimal value (`0x59` -> `59`).
///
/// Returns `None` when any nibble is not a decimal digit.
pub fn from_bcd(mut raw: u64) -> Option<u64> {
    let mut out = 0u64;
    let mut scale = 1u64;
    while raw > 0 {
        let digit = raw & 0xF;
        if digit > 9 {
            return None;
        }
        out += digit * scale;
        scale *= 10;
        raw >>= 4;
    }
    Some(out)
}
