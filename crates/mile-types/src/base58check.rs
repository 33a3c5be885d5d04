//! Base58Check text codec.
//!
//! Payload bytes are suffixed with a 4-byte checksum and expanded with the
//! Bitcoin base-58 alphabet, which omits the look-alike glyphs `0`, `O`,
//! `I` and `l`:
//!
//! ```text
//! text = base58(payload || le32(crc32(payload)))
//! ```
//!
//! The checksum is CRC-32 (IEEE), stored little-endian. Leading zero bytes
//! encode as leading `1` characters, so fixed-size buffers keep their size
//! through a round trip.

use tracing::debug;

use crate::error::TypeError;

/// Number of checksum bytes appended to every payload.
pub const CHECKSUM_SIZE: usize = 4;

fn checksum(payload: &[u8]) -> u32 {
    crc32fast::hash(payload)
}

/// Encode `payload` as a Base58Check string. Never fails.
pub fn encode(payload: &[u8]) -> String {
    let mut framed = Vec::with_capacity(payload.len() + CHECKSUM_SIZE);
    framed.extend_from_slice(payload);
    framed.extend_from_slice(&checksum(payload).to_le_bytes());
    bs58::encode(framed).into_string()
}

/// Decode a Base58Check string of any payload length.
///
/// Fails on characters outside the alphabet, on input too short to carry a
/// checksum, and with [`TypeError::ChecksumMismatch`] when the trailing
/// checksum does not match the payload.
pub fn decode(text: &str) -> Result<Vec<u8>, TypeError> {
    let mut framed = bs58::decode(text)
        .into_vec()
        .map_err(|e| map_bs58_error(text, e))?;

    if framed.len() < CHECKSUM_SIZE {
        return Err(TypeError::MissingChecksum { len: framed.len() });
    }

    let split = framed.len() - CHECKSUM_SIZE;
    let mut suffix = [0u8; CHECKSUM_SIZE];
    suffix.copy_from_slice(&framed[split..]);
    let actual = u32::from_le_bytes(suffix);
    framed.truncate(split);

    let expected = checksum(&framed);
    if expected != actual {
        debug!(expected, actual, "base58check checksum mismatch");
        return Err(TypeError::ChecksumMismatch { expected, actual });
    }
    Ok(framed)
}

/// Decode a Base58Check string whose payload must be exactly `N` bytes.
///
/// `out` is written only when decoding succeeds.
pub fn decode_into<const N: usize>(text: &str, out: &mut [u8; N]) -> Result<(), TypeError> {
    let payload = decode(text)?;
    if payload.len() != N {
        return Err(TypeError::InvalidLength {
            expected: N,
            actual: payload.len(),
        });
    }
    out.copy_from_slice(&payload);
    Ok(())
}

fn map_bs58_error(text: &str, err: bs58::decode::Error) -> TypeError {
    match err {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            TypeError::InvalidBase58Character {
                character,
                position: index,
            }
        }
        bs58::decode::Error::NonAsciiCharacter { index } => TypeError::InvalidBase58Character {
            character: text
                .get(index..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
            position: index,
        },
        other => TypeError::InvalidBase58(other.to_string()),
    }
}
