use std::fmt;

use mile_types::numeric::{u256_to_bytes, u64_to_bytes};
use mile_types::{BufferKind, Digest, Endian, FixedBuffer, U256};
use sha3::{Digest as _, Sha3_256};
use tracing::warn;

/// A typed value fed into a [`DigestCalculator`].
///
/// Each variant has a fixed serialization, so two parties hashing the same
/// fields in the same order always agree on the digest:
///
/// | variant      | bytes hashed                                   |
/// |--------------|------------------------------------------------|
/// | `Bytes`      | as is                                          |
/// | `Bool`       | one byte, `0` or `1`                           |
/// | `Byte`       | one byte                                       |
/// | `U16`..`U64` | 2/4/8 bytes in the given byte order            |
/// | `U256`       | 32 bytes in the given byte order               |
/// | `PaddedText` | UTF-8 bytes, zero-padded up to `width`         |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestInput<'a> {
    Bytes(&'a [u8]),
    Bool(bool),
    Byte(u8),
    U16(u16, Endian),
    U32(u32, Endian),
    U64(u64, Endian),
    U256(U256, Endian),
    PaddedText { text: &'a str, width: usize },
}

impl<'a> DigestInput<'a> {
    /// Text right-padded with zero bytes to at least `width` bytes.
    ///
    /// Variable-length fields of a structured record must be padded to an
    /// agreed width for the digest layout to be reproducible.
    pub fn text(text: &'a str, width: usize) -> Self {
        DigestInput::PaddedText { text, width }
    }

    /// Change the byte order of an integer input. Other inputs are returned
    /// unchanged.
    pub fn with_endian(self, endian: Endian) -> Self {
        match self {
            DigestInput::U16(v, _) => DigestInput::U16(v, endian),
            DigestInput::U32(v, _) => DigestInput::U32(v, endian),
            DigestInput::U64(v, _) => DigestInput::U64(v, endian),
            DigestInput::U256(v, _) => DigestInput::U256(v, endian),
            other => other,
        }
    }

    fn feed(&self, hasher: &mut Sha3_256) {
        match *self {
            DigestInput::Bytes(bytes) => hasher.update(bytes),
            DigestInput::Bool(v) => hasher.update([u8::from(v)]),
            DigestInput::Byte(v) => hasher.update([v]),
            DigestInput::U16(v, endian) => hasher.update(match endian {
                Endian::Little => v.to_le_bytes(),
                Endian::Big => v.to_be_bytes(),
            }),
            DigestInput::U32(v, endian) => hasher.update(match endian {
                Endian::Little => v.to_le_bytes(),
                Endian::Big => v.to_be_bytes(),
            }),
            DigestInput::U64(v, endian) => hasher.update(u64_to_bytes(v, endian)),
            DigestInput::U256(v, endian) => hasher.update(u256_to_bytes(&v, endian)),
            DigestInput::PaddedText { text, width } => {
                const ZEROS: [u8; 64] = [0u8; 64];
                hasher.update(text.as_bytes());
                let mut missing = width.saturating_sub(text.len());
                while missing > 0 {
                    let step = missing.min(ZEROS.len());
                    hasher.update(&ZEROS[..step]);
                    missing -= step;
                }
            }
        }
    }
}

impl<'a> From<&'a [u8]> for DigestInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        DigestInput::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for DigestInput<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        DigestInput::Bytes(bytes)
    }
}

impl<'a, const N: usize, K: BufferKind> From<&'a FixedBuffer<N, K>> for DigestInput<'a> {
    fn from(buffer: &'a FixedBuffer<N, K>) -> Self {
        DigestInput::Bytes(buffer.as_bytes())
    }
}

impl<'a> From<&'a str> for DigestInput<'a> {
    fn from(text: &'a str) -> Self {
        DigestInput::text(text, 0)
    }
}

impl<'a> From<&'a String> for DigestInput<'a> {
    fn from(text: &'a String) -> Self {
        DigestInput::text(text, 0)
    }
}

impl From<bool> for DigestInput<'_> {
    fn from(v: bool) -> Self {
        DigestInput::Bool(v)
    }
}

impl From<u8> for DigestInput<'_> {
    fn from(v: u8) -> Self {
        DigestInput::Byte(v)
    }
}

impl From<u16> for DigestInput<'_> {
    fn from(v: u16) -> Self {
        DigestInput::U16(v, Endian::default())
    }
}

impl From<u32> for DigestInput<'_> {
    fn from(v: u32) -> Self {
        DigestInput::U32(v, Endian::default())
    }
}

impl From<u64> for DigestInput<'_> {
    fn from(v: u64) -> Self {
        DigestInput::U64(v, Endian::default())
    }
}

impl From<U256> for DigestInput<'_> {
    fn from(v: U256) -> Self {
        DigestInput::U256(v, Endian::default())
    }
}

enum State {
    Created,
    Initialized(Sha3_256),
    Finalized,
}

/// Incremental SHA3-256 calculator producing a [`Digest`].
///
/// Lifecycle: [`new`](Self::new) → [`initialize`](Self::initialize) →
/// any number of [`update`](Self::update) calls → one
/// [`finalize`](Self::finalize). Updating or finalizing outside that order
/// is a [`DigestError`]; a finalized calculator must be re-initialized
/// before reuse. The order of updates is part of the digest.
pub struct DigestCalculator {
    state: State,
}

impl DigestCalculator {
    /// A calculator that still needs [`initialize`](Self::initialize).
    pub fn new() -> Self {
        Self {
            state: State::Created,
        }
    }

    /// A calculator that is already initialized.
    pub fn started() -> Self {
        let mut calculator = Self::new();
        calculator.initialize();
        calculator
    }

    /// Digest of a complete input sequence.
    pub fn digest_of<'a, I>(inputs: I) -> Digest
    where
        I: IntoIterator<Item = DigestInput<'a>>,
    {
        let mut hasher = Sha3_256::new();
        for input in inputs {
            input.feed(&mut hasher);
        }
        Digest::from_array(hasher.finalize().into())
    }

    /// Start a fresh calculation, discarding any previous state.
    pub fn initialize(&mut self) {
        self.state = State::Initialized(Sha3_256::new());
    }

    /// `true` between `initialize` and `finalize`.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Initialized(_))
    }

    /// Absorb one typed input.
    pub fn update<'a>(
        &mut self,
        input: impl Into<DigestInput<'a>>,
    ) -> Result<&mut Self, DigestError> {
        match &mut self.state {
            State::Initialized(hasher) => input.into().feed(hasher),
            State::Created => return Err(misuse(DigestError::NotInitialized)),
            State::Finalized => return Err(misuse(DigestError::AlreadyFinalized)),
        }
        Ok(self)
    }

    /// Drain the state into a [`Digest`].
    pub fn finalize(&mut self) -> Result<Digest, DigestError> {
        match std::mem::replace(&mut self.state, State::Finalized) {
            State::Initialized(hasher) => Ok(Digest::from_array(hasher.finalize().into())),
            State::Created => {
                self.state = State::Created;
                Err(misuse(DigestError::NotInitialized))
            }
            State::Finalized => Err(misuse(DigestError::AlreadyFinalized)),
        }
    }
}

impl Default for DigestCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DigestCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Created => "created",
            State::Initialized(_) => "initialized",
            State::Finalized => "finalized",
        };
        write!(f, "DigestCalculator({state})")
    }
}

fn misuse(err: DigestError) -> DigestError {
    warn!(error = %err, "digest calculator misuse");
    err
}

/// Errors from using a [`DigestCalculator`] out of order.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("digest calculator is not initialized")]
    NotInitialized,
    #[error("digest calculator is already finalized")]
    AlreadyFinalized,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mile_types::PublicKey;
    use proptest::prelude::*;

    const EMPTY_DIGEST_B58: &str = "2GzK7Z1gisn3iqUHDu97PnhmeRqAwK5ZpLLZRWSr4MguQCzBce";

    #[test]
    fn empty_digest_fixture() {
        let mut calculator = DigestCalculator::new();
        calculator.initialize();
        let digest = calculator.finalize().unwrap();
        assert_eq!(digest.to_base58check_string(), EMPTY_DIGEST_B58);
        assert_eq!(
            digest.to_hex_string(),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn text_is_raw_bytes() {
        let digest = DigestCalculator::digest_of([DigestInput::from("abc")]);
        assert_eq!(
            digest.to_hex_string(),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn typed_inputs_vector() {
        let mut calculator = DigestCalculator::started();
        calculator
            .update(true)
            .unwrap()
            .update(0x0102u16)
            .unwrap()
            .update(DigestInput::text("abc", 8))
            .unwrap();
        assert_eq!(
            calculator.finalize().unwrap().to_hex_string(),
            "a11a3bb296e9a533edffc84338b471a0be81ae0d4f0311cf0f484a6a538da3c7"
        );
    }

    #[test]
    fn padded_text_equals_explicit_zeros() {
        let padded = DigestCalculator::digest_of([DigestInput::text("ab", 100)]);
        let mut raw = b"ab".to_vec();
        raw.resize(100, 0);
        let explicit = DigestCalculator::digest_of([DigestInput::from(&raw)]);
        assert_eq!(padded, explicit);
    }

    #[test]
    fn long_text_is_not_truncated() {
        let a = DigestCalculator::digest_of([DigestInput::text("abcdef", 2)]);
        let b = DigestCalculator::digest_of([DigestInput::from("abcdef")]);
        assert_eq!(a, b);
    }

    #[test]
    fn integer_serializations() {
        let le = DigestCalculator::digest_of([DigestInput::from(7u32)]);
        let be = DigestCalculator::digest_of([DigestInput::from(7u32).with_endian(Endian::Big)]);
        assert_ne!(le, be);
        assert_eq!(le, DigestCalculator::digest_of([DigestInput::from(&[7u8, 0, 0, 0][..])]));
        assert_eq!(be, DigestCalculator::digest_of([DigestInput::from(&[0u8, 0, 0, 7][..])]));

        let wide = DigestCalculator::digest_of([DigestInput::from(U256::from(7u64))]);
        let mut bytes = [0u8; 32];
        bytes[0] = 7;
        assert_eq!(wide, DigestCalculator::digest_of([DigestInput::from(&bytes[..])]));

        let long = DigestCalculator::digest_of([DigestInput::from(7u64)]);
        assert_eq!(
            long,
            DigestCalculator::digest_of([DigestInput::from(&7u64.to_le_bytes()[..])])
        );
    }

    #[test]
    fn bool_and_byte_are_single_bytes() {
        assert_eq!(
            DigestCalculator::digest_of([DigestInput::from(true)]),
            DigestCalculator::digest_of([DigestInput::from(1u8)])
        );
        assert_eq!(
            DigestCalculator::digest_of([DigestInput::from(false)]),
            DigestCalculator::digest_of([DigestInput::from(0u8)])
        );
    }

    #[test]
    fn fixed_buffers_feed_raw_bytes() {
        let key = PublicKey::from_array([3; 32]);
        assert_eq!(
            DigestCalculator::digest_of([DigestInput::from(&key)]),
            DigestCalculator::digest_of([DigestInput::from(&[3u8; 32][..])])
        );
    }

    #[test]
    fn order_matters() {
        let ab = DigestCalculator::digest_of([DigestInput::from(1u8), DigestInput::from(2u8)]);
        let ba = DigestCalculator::digest_of([DigestInput::from(2u8), DigestInput::from(1u8)]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn update_before_initialize_fails() {
        let mut calculator = DigestCalculator::new();
        assert_eq!(calculator.update(1u8).unwrap_err(), DigestError::NotInitialized);
        assert_eq!(calculator.finalize().unwrap_err(), DigestError::NotInitialized);
        assert!(!calculator.is_initialized());
    }

    #[test]
    fn use_after_finalize_fails_until_reinitialized() {
        let mut calculator = DigestCalculator::started();
        calculator.finalize().unwrap();
        assert_eq!(calculator.update(1u8).unwrap_err(), DigestError::AlreadyFinalized);
        assert_eq!(calculator.finalize().unwrap_err(), DigestError::AlreadyFinalized);

        calculator.initialize();
        assert_eq!(
            calculator.finalize().unwrap().to_base58check_string(),
            EMPTY_DIGEST_B58
        );
    }

    #[test]
    fn initialize_discards_previous_updates() {
        let mut calculator = DigestCalculator::started();
        calculator.update("noise").unwrap();
        calculator.initialize();
        assert_eq!(
            calculator.finalize().unwrap().to_base58check_string(),
            EMPTY_DIGEST_B58
        );
    }

    #[test]
    fn debug_shows_state() {
        let calculator = DigestCalculator::started();
        assert_eq!(format!("{calculator:?}"), "DigestCalculator(initialized)");
    }

    proptest! {
        #[test]
        fn incremental_matches_one_shot(chunks in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..32), 0..8)
        ) {
            let mut calculator = DigestCalculator::started();
            let mut joined = Vec::new();
            for chunk in &chunks {
                calculator.update(chunk).unwrap();
                joined.extend_from_slice(chunk);
            }
            prop_assert_eq!(
                calculator.finalize().unwrap(),
                DigestCalculator::digest_of([DigestInput::from(&joined)])
            );
        }
    }
}
