//! Fixed-width integer serialization and textual number formats.
//!
//! Values serialized here cross machine and network boundaries, so byte
//! order is always an explicit [`Endian`] argument and never the host's
//! native order.

use std::fmt;

use alloy_primitives::U256;

use crate::error::TypeError;

/// Width of a serialized `u64`.
pub const U64_SIZE: usize = 8;
/// Width of a serialized [`U256`].
pub const U256_SIZE: usize = 32;

/// Byte order of a serialized integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Radix of a textual number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberBase {
    Decimal,
    Hex,
}

impl NumberBase {
    fn radix(self) -> u32 {
        match self {
            NumberBase::Decimal => 10,
            NumberBase::Hex => 16,
        }
    }
}

// ---------------------------------------------------------------------------
// Byte sequences
// ---------------------------------------------------------------------------

/// Serialize a `u64` into exactly 8 bytes.
pub fn u64_to_bytes(value: u64, endian: Endian) -> [u8; U64_SIZE] {
    match endian {
        Endian::Little => value.to_le_bytes(),
        Endian::Big => value.to_be_bytes(),
    }
}

/// Read a `u64` from the first 8 bytes of `bytes`.
pub fn u64_from_bytes(bytes: &[u8], endian: Endian) -> Result<u64, TypeError> {
    let raw: [u8; U64_SIZE] = leading::<U64_SIZE>(bytes)?;
    Ok(match endian {
        Endian::Little => u64::from_le_bytes(raw),
        Endian::Big => u64::from_be_bytes(raw),
    })
}

/// Serialize a [`U256`] into exactly 32 bytes, zero-padded.
pub fn u256_to_bytes(value: &U256, endian: Endian) -> [u8; U256_SIZE] {
    match endian {
        Endian::Little => value.to_le_bytes::<U256_SIZE>(),
        Endian::Big => value.to_be_bytes::<U256_SIZE>(),
    }
}

/// Read a [`U256`] from the first 32 bytes of `bytes`.
///
/// Fails when fewer than 32 bytes are available.
pub fn u256_from_bytes(bytes: &[u8], endian: Endian) -> Result<U256, TypeError> {
    let raw: [u8; U256_SIZE] = leading::<U256_SIZE>(bytes)?;
    Ok(match endian {
        Endian::Little => U256::from_le_bytes(raw),
        Endian::Big => U256::from_be_bytes(raw),
    })
}

/// Append the serialized `u64` to `out`.
pub fn append_u64(out: &mut Vec<u8>, value: u64, endian: Endian) {
    out.extend_from_slice(&u64_to_bytes(value, endian));
}

/// Append the serialized [`U256`] to `out`.
pub fn append_u256(out: &mut Vec<u8>, value: &U256, endian: Endian) {
    out.extend_from_slice(&u256_to_bytes(value, endian));
}

fn leading<const W: usize>(bytes: &[u8]) -> Result<[u8; W], TypeError> {
    let head = bytes.get(..W).ok_or(TypeError::InvalidLength {
        expected: W,
        actual: bytes.len(),
    })?;
    let mut raw = [0u8; W];
    raw.copy_from_slice(head);
    Ok(raw)
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Decimal representation of a `u64`.
pub fn u64_to_dec_string(value: u64) -> String {
    value.to_string()
}

/// Lowercase hex representation of a `u64`, without a `0x` prefix.
pub fn u64_to_hex_string(value: u64) -> String {
    format!("{value:x}")
}

/// Decimal representation of a [`U256`].
pub fn u256_to_dec_string(value: &U256) -> String {
    value.to_string()
}

/// Lowercase hex representation of a [`U256`], without a `0x` prefix.
pub fn u256_to_hex_string(value: &U256) -> String {
    format!("{value:x}")
}

/// Parse an unsigned 32-bit decimal number.
pub fn parse_u32_dec(text: &str) -> Result<u32, TypeError> {
    parse_digits(text, NumberBase::Decimal)
}

/// Parse an unsigned 64-bit number in the given base.
pub fn parse_u64(text: &str, base: NumberBase) -> Result<u64, TypeError> {
    parse_digits(text, base)
}

/// Parse an unsigned 256-bit number in the given base.
///
/// Signs, `0x` prefixes and separators are rejected; leading zeros are not.
pub fn parse_u256(text: &str, base: NumberBase) -> Result<U256, TypeError> {
    parse_digits(text, base)
}

trait Accumulator: Sized + Copy {
    const BITS: u32;
    const ZERO: Self;

    fn push_digit(self, radix: u32, digit: u32) -> Option<Self>;
}

macro_rules! primitive_accumulator {
    ($($ty:ty),*) => {$(
        impl Accumulator for $ty {
            const BITS: u32 = <$ty>::BITS;
            const ZERO: Self = 0;

            fn push_digit(self, radix: u32, digit: u32) -> Option<Self> {
                self.checked_mul(<$ty>::from(radix))?
                    .checked_add(<$ty>::from(digit))
            }
        }
    )*};
}

primitive_accumulator!(u32, u64);

impl Accumulator for U256 {
    const BITS: u32 = 256;
    const ZERO: Self = U256::ZERO;

    fn push_digit(self, radix: u32, digit: u32) -> Option<Self> {
        self.checked_mul(U256::from(radix))?
            .checked_add(U256::from(digit))
    }
}

fn parse_digits<T: Accumulator>(text: &str, base: NumberBase) -> Result<T, TypeError> {
    if text.is_empty() {
        return Err(TypeError::EmptyNumber);
    }
    let radix = base.radix();
    text.chars()
        .enumerate()
        .try_fold(T::ZERO, |acc, (position, character)| {
            let digit = character
                .to_digit(radix)
                .ok_or(TypeError::InvalidDigit {
                    position,
                    character,
                })?;
            acc.push_digit(radix, digit)
                .ok_or(TypeError::NumericOverflow { bits: T::BITS })
        })
}

// ---------------------------------------------------------------------------
// Fixed point
// ---------------------------------------------------------------------------

/// Largest number of fractional digits [`float_to_fixed_point`] writes.
pub const MAX_FIXED_POINT_PRECISION: u32 = 64;

/// Render `value` as a decimal with exactly `precision` fractional digits.
///
/// Extra fractional digits are truncated, not rounded, so two parties that
/// hash an amount as text produce the same bytes. The integer part is always
/// present (`0.50`, never `.50`). `precision` is capped at
/// [`MAX_FIXED_POINT_PRECISION`].
pub fn float_to_fixed_point(value: f32, precision: u32) -> String {
    FixedPoint {
        value,
        precision: precision.min(MAX_FIXED_POINT_PRECISION),
    }
    .to_string()
}

struct FixedPoint {
    value: f32,
    precision: u32,
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.value.is_finite() {
            return write!(f, "{}", self.value);
        }
        let value = f64::from(self.value);
        let integer = value.trunc();
        if value < 0.0 {
            f.write_str("-")?;
        }
        write!(f, "{:.0}", integer.abs())?;
        if self.precision > 0 {
            f.write_str(".")?;
            // One digit per step keeps every intermediate below 10.
            let mut fraction = (value - integer).abs();
            for _ in 0..self.precision {
                fraction *= 10.0;
                let digit = fraction.trunc();
                fraction -= digit;
                write!(f, "{}", (digit as u8).min(9))?;
            }
        }
        Ok(())
    }
}
