use thiserror::Error;

/// Errors produced by buffer, text codec and numeric conversions.
///
/// Every variant is an expected outcome of probing untrusted input, so all
/// of them are returned, never raised as panics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("bad data size: {actual} <> {expected}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("bad data size or offset: (offset {offset} + array size {size}) > data size {available}")]
    OffsetOutOfRange {
        offset: usize,
        size: usize,
        available: usize,
    },

    #[error("empty hex string")]
    EmptyHex,

    #[error("bad hex string size: {actual} <> {expected}")]
    InvalidHexLength { expected: usize, actual: usize },

    #[error("bad {position} hex symbol '{symbol}'")]
    InvalidHexDigit { position: usize, symbol: String },

    #[error("invalid base58 character {character:?} at position {position}")]
    InvalidBase58Character { character: char, position: usize },

    #[error("invalid base58 string: {0}")]
    InvalidBase58(String),

    #[error("base58check data too short for checksum: {len} bytes")]
    MissingChecksum { len: usize },

    #[error("base58check checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("empty number string")]
    EmptyNumber,

    #[error("invalid digit {character:?} at position {position}")]
    InvalidDigit { position: usize, character: char },

    #[error("number does not fit in {bits} bits")]
    NumericOverflow { bits: u32 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl TypeError {
    /// Input had the wrong size or shape for the target type.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            TypeError::InvalidLength { .. }
                | TypeError::OffsetOutOfRange { .. }
                | TypeError::EmptyHex
                | TypeError::InvalidHexLength { .. }
                | TypeError::EmptyNumber
                | TypeError::NumericOverflow { .. }
        )
    }

    /// Input contained a symbol outside the expected alphabet.
    pub fn is_encoding_error(&self) -> bool {
        matches!(
            self,
            TypeError::InvalidHexDigit { .. }
                | TypeError::InvalidBase58Character { .. }
                | TypeError::InvalidBase58(_)
                | TypeError::InvalidDigit { .. }
        )
    }

    /// Input was well-formed but failed its checksum (corrupted or tampered).
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            TypeError::ChecksumMismatch { .. } | TypeError::MissingChecksum { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_error_names_both_sizes() {
        let err = TypeError::InvalidLength {
            expected: 32,
            actual: 31,
        };
        assert_eq!(err.to_string(), "bad data size: 31 <> 32");
    }

    #[test]
    fn classification_is_disjoint() {
        let errors = [
            TypeError::EmptyHex,
            TypeError::InvalidHexDigit {
                position: 3,
                symbol: "zz".into(),
            },
            TypeError::ChecksumMismatch {
                expected: 1,
                actual: 2,
            },
        ];
        for err in &errors {
            let hits = [
                err.is_shape_error(),
                err.is_encoding_error(),
                err.is_integrity_error(),
            ];
            assert_eq!(hits.iter().filter(|h| **h).count(), 1, "{err}");
        }
    }

    #[test]
    fn checksum_mismatch_is_integrity_not_shape() {
        let err = TypeError::ChecksumMismatch {
            expected: 0xdeadbeef,
            actual: 0,
        };
        assert!(err.is_integrity_error());
        assert!(!err.is_shape_error());
        assert!(err.to_string().contains("deadbeef"));
    }
}
