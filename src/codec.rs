//! Conversion between Modbus registers (big-endian 16-bit words) and host values
//!
//! All functions panic if the buffer is shorter than the value encoded, same as slice indexing.
use ieee754::Ieee754;

/// Get a big-endian register as u16
#[inline]
pub fn reg_to_u16(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[0], buf[1]])
}

/// Put u16 into a register (big-endian)
#[inline]
pub fn u16_to_reg(value: u16, buf: &mut [u8]) {
    buf[..2].copy_from_slice(&value.to_be_bytes());
}

/// Get two registers as u32, first register is the high word
pub fn reg_to_u32(buf: &[u8]) -> u32 {
    (u32::from(reg_to_u16(&buf[0..2])) << 16) | u32::from(reg_to_u16(&buf[2..4]))
}

/// Put u32 into two registers, high word first
#[allow(clippy::cast_possible_truncation)]
pub fn u32_to_reg(value: u32, buf: &mut [u8]) {
    u16_to_reg((value >> 16) as u16, &mut buf[0..2]);
    u16_to_reg(value as u16, &mut buf[2..4]);
}

/// Get two word-swapped registers as IEEE754 32-bit float
///
/// Many devices put the low word of a float into the first register. Any bit pattern is
/// accepted, the result may be NaN.
pub fn f32_byte_swap(buf: &[u8]) -> f32 {
    let lo = u32::from(reg_to_u16(&buf[0..2]));
    let hi = u32::from(reg_to_u16(&buf[2..4]));
    Ieee754::from_bits((hi << 16) | lo)
}

/// Put IEEE754 32-bit float into two word-swapped registers, inverse of [`f32_byte_swap`]
#[allow(clippy::cast_possible_truncation)]
pub fn f32_to_reg(value: f32, buf: &mut [u8]) {
    let bits = value.bits();
    u16_to_reg(bits as u16, &mut buf[0..2]);
    u16_to_reg((bits >> 16) as u16, &mut buf[2..4]);
}
